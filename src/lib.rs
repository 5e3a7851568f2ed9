//! # libbcf
//!
//! A pure Rust engine for BCF (BIM Collaboration Format) 2.x containers.
//!
//! A BCF container is a ZIP archive with an optional `project.bcfp`, a
//! `bcf.version` and one folder per topic holding `markup.bcf`, viewpoint
//! definitions (`.bcfv`), snapshot images and attached documents. This crate
//! loads such an archive into an editable [`ProjectGraph`], and writes it back
//! so that untouched parts keep their exact bytes.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Partial-validity loading: a broken topic folder costs only that topic
//! - Schema validation against built-in BCF 2.1 rules, reported as
//!   [`Diagnostic`]s rather than errors
//! - Identifier-based editing of topics, comments, viewpoints, document and
//!   file references
//! - Verbatim copy of unchanged parts and atomic saves
//!
//! ## Example
//!
//! ```no_run
//! use libbcf::BcfFile;
//! use libbcf::model::{CommentFields, TopicFields};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut file = BcfFile::open("coordination.bcfzip")?;
//! println!("{} topics", file.graph()?.len());
//!
//! let graph = file.graph_mut()?;
//! let topic = graph.add_topic(TopicFields::titled("Clash on Level 2"))?;
//! graph.add_comment(topic, CommentFields {
//!     author: "jane@example.com".to_string(),
//!     text: "Duct runs through the beam".to_string(),
//!     ..CommentFields::default()
//! })?;
//!
//! file.save()?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod container;
pub mod diagnostic;
pub mod error;
pub mod graph;
pub mod model;
pub mod parser;
pub mod persistence;
pub mod schema;
mod timestamp;
mod writer;
mod xml;

pub use config::BcfConfig;
pub use container::{Container, Part};
pub use diagnostic::{Diagnostic, DiagnosticKind, Severity};
pub use error::{EntityKind, Error, Result};
pub use graph::{Entity, LoadOutcome, ProjectGraph, Reference};
pub use model::{
    Comment, DocumentLocation, DocumentReference, FileReference, Project, Topic, Version,
    Viewpoint, VisualizationInfo,
};
pub use persistence::{BcfFile, SessionState};
pub use schema::{SchemaKind, SchemaSet, Violation};
