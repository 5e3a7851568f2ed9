//! Topics and the entities they own

use super::{Comment, Extensions, Viewpoint};
use crate::container::Blob;
use crate::timestamp::Timestamp;
use uuid::Uuid;

/// Where a referenced document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLocation {
    /// Path inside the container, relative to the topic folder as written
    Internal(String),
    /// URL or path outside the container
    External(String),
}

impl DocumentLocation {
    /// The path or URL as written
    pub fn as_str(&self) -> &str {
        match self {
            DocumentLocation::Internal(path) | DocumentLocation::External(path) => path,
        }
    }

    /// Whether the document lives outside the container
    pub fn is_external(&self) -> bool {
        matches!(self, DocumentLocation::External(_))
    }
}

/// A document attached to a topic
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentReference {
    /// Identifier, immutable once assigned
    pub guid: Uuid,
    /// Where the document is
    pub location: Option<DocumentLocation>,
    /// Human readable description
    pub description: Option<String>,
    /// Unknown attributes and elements
    pub extensions: Extensions,
    /// Bytes to store for an internal document added in this session
    pub(crate) content: Option<Blob>,
}

impl DocumentReference {
    /// Create a reference
    pub fn new(guid: Uuid, location: Option<DocumentLocation>) -> Self {
        Self {
            guid,
            location,
            description: None,
            extensions: Extensions::new(),
            content: None,
        }
    }
}

/// A model file the topic refers to (`Header/File`)
///
/// The file format gives these no identifier, so one is assigned per
/// session for API use. It is never written.
#[derive(Debug, Clone, PartialEq)]
pub struct FileReference {
    /// Session identifier
    pub id: Uuid,
    /// `IfcProject` GUID of the model
    pub ifc_project: Option<String>,
    /// `IfcSpatialStructureElement` GUID
    pub ifc_spatial_structure_element: Option<String>,
    /// Whether `reference` points outside the container
    pub is_external: bool,
    /// File name of the model
    pub filename: Option<String>,
    /// Date of the model file
    pub date: Option<Timestamp>,
    /// Path or URL of the model
    pub reference: Option<String>,
    /// Unknown attributes and elements
    pub extensions: Extensions,
}

impl FileReference {
    /// Create an external file reference
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            ifc_project: None,
            ifc_spatial_structure_element: None,
            is_external: true,
            filename: None,
            date: None,
            reference: None,
            extensions: Extensions::new(),
        }
    }
}

/// A reference to a code snippet (BCF-API, IfcDocument, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BimSnippet {
    /// Type of the snippet
    pub snippet_type: String,
    /// Whether the reference points outside the container
    pub is_external: bool,
    /// Path or URL of the snippet
    pub reference: String,
    /// Schema of the snippet
    pub reference_schema: String,
}

/// Unknown content around the topic, keyed by where it was found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkupExtensions {
    /// On the `Markup` root
    pub markup: Extensions,
    /// On `Header`
    pub header: Extensions,
    /// On `Topic`
    pub topic: Extensions,
}

/// A topic with everything it owns
#[derive(Debug, Clone, PartialEq)]
pub struct Topic {
    /// Identifier, immutable once assigned
    pub guid: Uuid,
    /// Title
    pub title: String,
    /// Classification, e.g. `"Issue"` or `"Clash"`
    pub topic_type: Option<String>,
    /// Status, e.g. `"Open"`
    pub topic_status: Option<String>,
    /// Links to external resources
    pub reference_links: Vec<String>,
    /// Priority
    pub priority: Option<String>,
    /// Sort index
    pub index: Option<i64>,
    /// Free-form labels
    pub labels: Vec<String>,
    /// Creation time
    pub creation_date: Option<Timestamp>,
    /// Creation author
    pub creation_author: Option<String>,
    /// Last modification time
    pub modified_date: Option<Timestamp>,
    /// Last modification author
    pub modified_author: Option<String>,
    /// Due date
    pub due_date: Option<Timestamp>,
    /// Assignee
    pub assigned_to: Option<String>,
    /// Project stage
    pub stage: Option<String>,
    /// Long description
    pub description: Option<String>,
    /// Attached code snippet
    pub bim_snippet: Option<BimSnippet>,
    /// Attached documents
    pub document_references: Vec<DocumentReference>,
    /// Identifiers of related topics
    pub related_topics: Vec<Uuid>,
    /// Comments in order
    pub comments: Vec<Comment>,
    /// Viewpoints
    pub viewpoints: Vec<Viewpoint>,
    /// Referenced model files
    pub files: Vec<FileReference>,
    /// Unknown content of the markup part
    pub extensions: MarkupExtensions,
    pub(crate) folder: String,
    pub(crate) dirty: bool,
}

impl Topic {
    /// Create a topic with a title and nothing else
    ///
    /// The topic folder is named after the identifier.
    pub fn new(guid: Uuid, title: impl Into<String>) -> Self {
        Self {
            guid,
            title: title.into(),
            topic_type: None,
            topic_status: None,
            reference_links: Vec::new(),
            priority: None,
            index: None,
            labels: Vec::new(),
            creation_date: None,
            creation_author: None,
            modified_date: None,
            modified_author: None,
            due_date: None,
            assigned_to: None,
            stage: None,
            description: None,
            bim_snippet: None,
            document_references: Vec::new(),
            related_topics: Vec::new(),
            comments: Vec::new(),
            viewpoints: Vec::new(),
            files: Vec::new(),
            extensions: MarkupExtensions::default(),
            folder: guid.to_string(),
            dirty: false,
        }
    }

    /// Name of the topic folder in the container
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Whether the topic changed since the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Comment by identifier
    pub fn comment(&self, guid: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.guid == guid)
    }

    /// Viewpoint by identifier
    pub fn viewpoint(&self, guid: Uuid) -> Option<&Viewpoint> {
        self.viewpoints.iter().find(|v| v.guid == guid)
    }

    /// Document reference by identifier
    pub fn document_reference(&self, guid: Uuid) -> Option<&DocumentReference> {
        self.document_references.iter().find(|d| d.guid == guid)
    }

    /// File reference by session identifier
    pub fn file_reference(&self, id: Uuid) -> Option<&FileReference> {
        self.files.iter().find(|f| f.id == id)
    }

    /// Fill in the values markup cannot do without
    ///
    /// A missing creation date falls back to the modification date, then to
    /// `now`; a missing creation author to the modification author, then to
    /// an empty name. Undated comments take their own modification date, then
    /// the topic's creation date. Returns the number of values filled.
    pub fn fill_required(&mut self, now: Timestamp) -> usize {
        let mut filled = 0;
        if self.creation_date.is_none() {
            self.creation_date = Some(self.modified_date.unwrap_or(now));
            filled += 1;
        }
        if self.creation_author.is_none() {
            self.creation_author = Some(self.modified_author.clone().unwrap_or_default());
            filled += 1;
        }
        let created = self.creation_date.unwrap_or(now);
        for comment in self.comments.iter_mut().filter(|c| c.date.is_none()) {
            comment.date = Some(comment.modified_date.unwrap_or(created));
            filled += 1;
        }
        filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_topic_is_empty() {
        let guid = Uuid::new_v4();
        let topic = Topic::new(guid, "Clash on Level 2");
        assert_eq!(topic.folder(), guid.to_string());
        assert!(topic.comments.is_empty());
        assert!(topic.viewpoints.is_empty());
        assert!(topic.document_references.is_empty());
        assert!(!topic.is_dirty());
    }

    #[test]
    fn test_document_location() {
        let internal = DocumentLocation::Internal("../Documents/spec.pdf".to_string());
        assert!(!internal.is_external());
        assert_eq!(internal.as_str(), "../Documents/spec.pdf");
        assert!(DocumentLocation::External("https://example.com".to_string()).is_external());
    }

    #[test]
    fn test_fill_required() {
        let utc = chrono::FixedOffset::east_opt(0).unwrap();
        let now = chrono::DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z").unwrap();
        let modified = chrono::DateTime::parse_from_rfc3339("2024-04-01T08:00:00Z")
            .unwrap()
            .with_timezone(&utc);

        let mut topic = Topic::new(Uuid::new_v4(), "t");
        topic.modified_date = Some(modified);
        topic.comments.push(Comment::new(Uuid::new_v4(), "a", "undated"));
        let mut edited = Comment::new(Uuid::new_v4(), "b", "edited");
        edited.modified_date = Some(now);
        topic.comments.push(edited);

        assert_eq!(topic.fill_required(now), 4);
        assert_eq!(topic.creation_date, Some(modified));
        assert_eq!(topic.creation_author.as_deref(), Some(""));
        assert_eq!(topic.comments[0].date, Some(modified));
        assert_eq!(topic.comments[1].date, Some(now));
        assert_eq!(topic.fill_required(now), 0);
    }
}
