//! Error types for BCF container operations
//!
//! Errors abort the operation that raised them. Schema violations and parse
//! degradations are not errors: they are collected as
//! [`Diagnostic`](crate::diagnostic::Diagnostic) records and returned next to a
//! best-effort result.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and container errors
//! - **E2xxx**: XML serialization errors
//! - **E3xxx**: Misuse of the project graph API
//! - **E5xxx**: Lifecycle errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error
//! - `E1002`: ZIP archive format error
//! - `E1101`: Container could not be read
//! - `E1102`: Container could not be written
//! - `E2005`: XML writing error
//! - `E3001`: Entity not found
//! - `E3002`: Duplicate identifier
//! - `E3003`: Invalid reference
//! - `E3004`: Attempt to change an identifier
//! - `E5001`: Operation not valid in the current state

use std::fmt;
use std::io;
use thiserror::Error;
use uuid::Uuid;

/// Result type for BCF operations
pub type Result<T> = std::result::Result<T, Error>;

/// Kinds of entities held by the project graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Project metadata (`project.bcfp`)
    Project,
    /// A topic folder with its markup
    Topic,
    /// A comment inside a topic
    Comment,
    /// A viewpoint inside a topic
    Viewpoint,
    /// A document reference inside a topic
    DocumentReference,
    /// A referenced model file inside a topic header
    FileReference,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Project => "project",
            EntityKind::Topic => "topic",
            EntityKind::Comment => "comment",
            EntityKind::Viewpoint => "viewpoint",
            EntityKind::DocumentReference => "document reference",
            EntityKind::FileReference => "file reference",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when working with BCF containers
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing a file
    ///
    /// **Error Code**: E1001
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted ZIP file
    /// - Unsupported compression method
    /// - Truncated archive
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The container could not be opened or one of its parts could not be read
    ///
    /// **Error Code**: E1101
    ///
    /// **Suggestions**:
    /// - Verify the file is a BCF (ZIP) archive, typically with a `.bcf` or `.bcfzip` extension
    /// - Try re-exporting the file from the authoring tool
    #[error("[E1101] Container unreadable: {0}")]
    ContainerUnreadable(String),

    /// The container could not be written
    ///
    /// **Error Code**: E1102
    ///
    /// The previous file on disk, if any, is left untouched.
    #[error("[E1102] Container write failed: {0}")]
    ContainerWriteFailed(String),

    /// XML writing error
    ///
    /// **Error Code**: E2005
    #[error("[E2005] XML writing error: {0}")]
    XmlWrite(String),

    /// No entity of the given kind carries the identifier
    ///
    /// **Error Code**: E3001
    #[error("[E3001] {kind} '{id}' not found")]
    NotFound {
        /// Kind of the missing entity
        kind: EntityKind,
        /// Identifier that was looked up
        id: Uuid,
    },

    /// An entity with the same identifier already exists
    ///
    /// **Error Code**: E3002
    #[error("[E3002] Duplicate {kind} identifier '{id}'")]
    DuplicateIdentifier {
        /// Kind of the entity being inserted
        kind: EntityKind,
        /// The conflicting identifier
        id: Uuid,
    },

    /// A cross reference points at something that does not exist or is out of scope
    ///
    /// **Error Code**: E3003
    ///
    /// **Common Causes**:
    /// - Comment referencing a viewpoint of another topic
    /// - Related topic link to a topic that is not part of the project
    /// - Reply to a comment of another topic
    #[error("[E3003] Invalid reference: {0}")]
    InvalidReference(String),

    /// Identifiers are assigned once and never change
    ///
    /// **Error Code**: E3004
    #[error("[E3004] Identifier of {kind} '{id}' cannot be changed")]
    IdentifierImmutable {
        /// Kind of the entity
        kind: EntityKind,
        /// Its current identifier
        id: Uuid,
    },

    /// Operation attempted outside its valid lifecycle state
    ///
    /// **Error Code**: E5001
    #[error("[E5001] Cannot {operation} while the container is {state}")]
    InvalidState {
        /// The rejected operation
        operation: &'static str,
        /// Name of the current state
        state: &'static str,
    },
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlWrite(err.to_string())
    }
}

impl Error {
    /// Create a NotFound error
    pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Error::NotFound { kind, id }
    }

    /// Create a DuplicateIdentifier error
    pub fn duplicate(kind: EntityKind, id: Uuid) -> Self {
        Error::DuplicateIdentifier { kind, id }
    }

    /// Create a ContainerUnreadable error with context about what failed
    ///
    /// # Arguments
    /// * `context` - What was being read (e.g., a part name)
    /// * `message` - Description of the error
    pub fn container_unreadable(context: &str, message: impl fmt::Display) -> Self {
        Error::ContainerUnreadable(format!("{}: {}", context, message))
    }

    /// Create a ContainerWriteFailed error with context about what failed
    pub fn container_write_failed(context: &str, message: impl fmt::Display) -> Self {
        Error::ContainerWriteFailed(format!("{}: {}", context, message))
    }

    /// Create an XmlWrite error
    pub fn xml_write(message: String) -> Self {
        Error::XmlWrite(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let io_err = Error::Io(io::Error::new(io::ErrorKind::NotFound, "test"));
        assert!(io_err.to_string().contains("[E1001]"));

        let unreadable = Error::container_unreadable("topic/markup.bcf", "truncated");
        assert!(unreadable.to_string().contains("[E1101]"));
        assert!(unreadable.to_string().contains("topic/markup.bcf"));

        let write_failed = Error::container_write_failed("out.bcf", "disk full");
        assert!(write_failed.to_string().contains("[E1102]"));

        let not_found = Error::not_found(EntityKind::Comment, Uuid::nil());
        assert!(not_found.to_string().contains("[E3001]"));
        assert!(not_found.to_string().contains("comment"));

        let dup = Error::duplicate(EntityKind::Topic, Uuid::nil());
        assert!(dup.to_string().contains("[E3002]"));

        let state = Error::InvalidState {
            operation: "save",
            state: "closed",
        };
        assert_eq!(
            state.to_string(),
            "[E5001] Cannot save while the container is closed"
        );
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::DocumentReference.to_string(), "document reference");
        assert_eq!(EntityKind::Viewpoint.to_string(), "viewpoint");
    }
}
