//! Data structures for BCF projects
//!
//! The ownership tree is Project → Topic → {Comment, Viewpoint,
//! DocumentReference, FileReference}. Links between entities (comment to
//! viewpoint, reply-to, related topics) are stored as identifiers only.

mod comment;
mod extension;
mod fields;
mod project;
mod topic;
mod viewpoint;

pub use crate::container::Blob;
pub use crate::timestamp::Timestamp;
pub use comment::Comment;
pub use extension::{Extensions, RawElement};
pub use fields::{
    CommentChanges, CommentFields, DocumentReferenceChanges, DocumentReferenceFields,
    FileReferenceChanges, FileReferenceFields, ProjectChanges, TopicChanges, TopicFields,
    ViewpointChanges, ViewpointFields,
};
pub use project::{CURRENT_VERSION, Project, Version};
pub use topic::{
    BimSnippet, DocumentLocation, DocumentReference, FileReference, MarkupExtensions, Topic,
};
pub use viewpoint::{
    AttributeBag, ColorGroup, ComponentRef, Viewpoint, Visibility, VisualizationInfo,
};
