//! Plain field records used by the mutation API
//!
//! `*Fields` structs describe a new entity; the graph assigns its identifier.
//! `*Changes` structs describe an update: `None` leaves a field alone, and for
//! optional fields `Some(None)` clears it. Every `*Changes` struct also has an
//! identifier slot; setting it to anything but the current identifier is
//! rejected with [`Error::IdentifierImmutable`](crate::Error::IdentifierImmutable).

use super::{BimSnippet, DocumentLocation};
use crate::container::Blob;
use crate::timestamp::Timestamp;
use uuid::Uuid;

/// Fields of a new topic
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicFields {
    /// Title
    pub title: String,
    /// Creation author
    pub author: Option<String>,
    /// Classification
    pub topic_type: Option<String>,
    /// Status
    pub topic_status: Option<String>,
    /// Priority
    pub priority: Option<String>,
    /// Sort index
    pub index: Option<i64>,
    /// Labels
    pub labels: Vec<String>,
    /// Due date
    pub due_date: Option<Timestamp>,
    /// Assignee
    pub assigned_to: Option<String>,
    /// Project stage
    pub stage: Option<String>,
    /// Long description
    pub description: Option<String>,
    /// Links to external resources
    pub reference_links: Vec<String>,
    /// Topics this one relates to; each must exist
    pub related_topics: Vec<Uuid>,
    /// Attached code snippet
    pub bim_snippet: Option<BimSnippet>,
}

impl TopicFields {
    /// Fields with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Changes to a topic
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicChanges {
    /// Identifier; must match the topic if given
    pub guid: Option<Uuid>,
    /// Author of the change, written to `ModifiedAuthor`
    pub author: Option<String>,
    /// New title
    pub title: Option<String>,
    /// New classification
    pub topic_type: Option<Option<String>>,
    /// New status
    pub topic_status: Option<Option<String>>,
    /// New priority
    pub priority: Option<Option<String>>,
    /// New sort index
    pub index: Option<Option<i64>>,
    /// Replacement label list
    pub labels: Option<Vec<String>>,
    /// New due date
    pub due_date: Option<Option<Timestamp>>,
    /// New assignee
    pub assigned_to: Option<Option<String>>,
    /// New stage
    pub stage: Option<Option<String>>,
    /// New description
    pub description: Option<Option<String>>,
    /// Replacement reference links
    pub reference_links: Option<Vec<String>>,
    /// New code snippet
    pub bim_snippet: Option<Option<BimSnippet>>,
}

/// Fields of a new comment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentFields {
    /// Author
    pub author: String,
    /// Body
    pub text: String,
    /// Viewpoint of the same topic
    pub viewpoint: Option<Uuid>,
    /// Comment of the same topic being answered
    pub reply_to: Option<Uuid>,
}

/// Changes to a comment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentChanges {
    /// Identifier; must match the comment if given
    pub guid: Option<Uuid>,
    /// Author of the change, written to `ModifiedAuthor`
    pub author: Option<String>,
    /// New body
    pub text: Option<String>,
    /// New viewpoint link
    pub viewpoint: Option<Option<Uuid>>,
    /// New reply-to link
    pub reply_to: Option<Option<Uuid>>,
}

/// Fields of a new viewpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewpointFields {
    /// Definition (`.bcfv`) bytes
    pub definition: Option<Blob>,
    /// Snapshot image bytes (PNG or JPEG)
    pub snapshot: Option<Blob>,
    /// Sort index
    pub index: Option<i64>,
}

/// Changes to a viewpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewpointChanges {
    /// Identifier; must match the viewpoint if given
    pub guid: Option<Uuid>,
    /// Replacement definition
    pub definition: Option<Blob>,
    /// Replacement snapshot, `Some(None)` removes it
    pub snapshot: Option<Option<Blob>>,
    /// New sort index
    pub index: Option<Option<i64>>,
}

/// Fields of a new document reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentReferenceFields {
    /// Where the document is
    pub location: Option<DocumentLocation>,
    /// Description
    pub description: Option<String>,
    /// Bytes to store at an internal location
    pub content: Option<Blob>,
}

/// Changes to a document reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentReferenceChanges {
    /// Identifier; must match the reference if given
    pub guid: Option<Uuid>,
    /// New location
    pub location: Option<Option<DocumentLocation>>,
    /// New description
    pub description: Option<Option<String>>,
}

/// Fields of a new file reference
#[derive(Debug, Clone, PartialEq)]
pub struct FileReferenceFields {
    /// `IfcProject` GUID
    pub ifc_project: Option<String>,
    /// `IfcSpatialStructureElement` GUID
    pub ifc_spatial_structure_element: Option<String>,
    /// Whether `reference` points outside the container
    pub is_external: bool,
    /// File name
    pub filename: Option<String>,
    /// Date of the model file
    pub date: Option<Timestamp>,
    /// Path or URL
    pub reference: Option<String>,
}

impl Default for FileReferenceFields {
    fn default() -> Self {
        Self {
            ifc_project: None,
            ifc_spatial_structure_element: None,
            is_external: true,
            filename: None,
            date: None,
            reference: None,
        }
    }
}

/// Changes to a file reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileReferenceChanges {
    /// Identifier; must match the reference if given
    pub id: Option<Uuid>,
    /// New `IfcProject`
    pub ifc_project: Option<Option<String>>,
    /// New `IfcSpatialStructureElement`
    pub ifc_spatial_structure_element: Option<Option<String>>,
    /// New external flag
    pub is_external: Option<bool>,
    /// New file name
    pub filename: Option<Option<String>>,
    /// New date
    pub date: Option<Option<Timestamp>>,
    /// New path or URL
    pub reference: Option<Option<String>>,
}

/// Changes to the project metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectChanges {
    /// New name
    pub name: Option<Option<String>>,
    /// New extension schema path
    pub extension_schema: Option<Option<String>>,
}
