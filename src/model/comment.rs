//! Comments of a topic

use super::Extensions;
use crate::timestamp::Timestamp;
use uuid::Uuid;

/// A comment inside a topic
///
/// The viewpoint and reply-to links are stored identifiers, resolved on
/// demand through [`ProjectGraph::resolve`](crate::graph::ProjectGraph::resolve).
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    /// Identifier, immutable once assigned
    pub guid: Uuid,
    /// Creation time
    pub date: Option<Timestamp>,
    /// Author, usually an e-mail address
    pub author: String,
    /// Comment body
    pub text: String,
    /// Viewpoint of the same topic this comment refers to
    pub viewpoint: Option<Uuid>,
    /// Comment of the same topic this one answers
    pub reply_to: Option<Uuid>,
    /// Last modification time
    pub modified_date: Option<Timestamp>,
    /// Last modification author
    pub modified_author: Option<String>,
    /// Unknown attributes and elements
    pub extensions: Extensions,
}

impl Comment {
    /// Create a comment
    pub fn new(guid: Uuid, author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            guid,
            date: None,
            author: author.into(),
            text: text.into(),
            viewpoint: None,
            reply_to: None,
            modified_date: None,
            modified_author: None,
            extensions: Extensions::new(),
        }
    }
}
