//! The in-memory project graph
//!
//! [`ProjectGraph`] owns every entity of a container and keeps an index from
//! identifier to owning topic. Ownership is a strict tree (project, topics,
//! then comments, viewpoints, document and file references). Links between
//! entities are stored identifiers and materialized on demand with
//! [`ProjectGraph::resolve`].
//!
//! Every mutation marks the entities it touches dirty. A part-ownership index
//! maps container parts to the entity that produces them, so that saving only
//! regenerates the parts of dirty entities and copies the rest verbatim.

mod edit;
mod load;
mod parts;

pub use load::LoadOutcome;
pub(crate) use parts::PartOwner;

use crate::container::{self, MARKUP_FILE};
use crate::error::{EntityKind, Error, Result};
use crate::model::{
    Comment, DocumentReference, FileReference, Project, Topic, Version, Viewpoint,
};
use parts::PartIndex;
use std::collections::HashMap;
use uuid::Uuid;

/// A typed identifier of an entity in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Kind of the referenced entity
    pub kind: EntityKind,
    /// Its identifier
    pub id: Uuid,
}

impl Reference {
    /// Reference a topic
    pub fn topic(id: Uuid) -> Self {
        Self {
            kind: EntityKind::Topic,
            id,
        }
    }

    /// Reference a comment
    pub fn comment(id: Uuid) -> Self {
        Self {
            kind: EntityKind::Comment,
            id,
        }
    }

    /// Reference a viewpoint
    pub fn viewpoint(id: Uuid) -> Self {
        Self {
            kind: EntityKind::Viewpoint,
            id,
        }
    }

    /// Reference a document reference
    pub fn document_reference(id: Uuid) -> Self {
        Self {
            kind: EntityKind::DocumentReference,
            id,
        }
    }

    /// Reference a file reference by its session identifier
    pub fn file_reference(id: Uuid) -> Self {
        Self {
            kind: EntityKind::FileReference,
            id,
        }
    }
}

/// A borrowed entity returned by [`ProjectGraph::resolve`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Entity<'a> {
    /// The project metadata
    Project(&'a Project),
    /// A topic
    Topic(&'a Topic),
    /// A comment and the topic owning it
    Comment(&'a Topic, &'a Comment),
    /// A viewpoint and the topic owning it
    Viewpoint(&'a Topic, &'a Viewpoint),
    /// A document reference and the topic owning it
    DocumentReference(&'a Topic, &'a DocumentReference),
    /// A file reference and the topic owning it
    FileReference(&'a Topic, &'a FileReference),
}

impl Entity<'_> {
    /// Kind of the entity
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Project(_) => EntityKind::Project,
            Entity::Topic(_) => EntityKind::Topic,
            Entity::Comment(..) => EntityKind::Comment,
            Entity::Viewpoint(..) => EntityKind::Viewpoint,
            Entity::DocumentReference(..) => EntityKind::DocumentReference,
            Entity::FileReference(..) => EntityKind::FileReference,
        }
    }
}

/// All entities of one BCF container
///
/// # Example
///
/// ```
/// use libbcf::graph::ProjectGraph;
/// use libbcf::model::{CommentFields, TopicFields};
///
/// # fn main() -> libbcf::Result<()> {
/// let mut graph = ProjectGraph::new_project("Hospital");
/// let topic = graph.add_topic(TopicFields::titled("Clash on Level 2"))?;
/// graph.add_comment(topic, CommentFields {
///     author: "jane@example.com".to_string(),
///     text: "Duct hits beam".to_string(),
///     ..CommentFields::default()
/// })?;
/// assert_eq!(graph.comments(topic)?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProjectGraph {
    version: Option<Version>,
    version_dirty: bool,
    project: Option<Project>,
    project_dirty: bool,
    topics: Vec<Topic>,
    /// (kind, id) to the identifier of the owning topic
    index: HashMap<(EntityKind, Uuid), Uuid>,
    parts: PartIndex,
}

impl Default for ProjectGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectGraph {
    /// Create an empty graph without project metadata
    ///
    /// The version part is written on the first save.
    pub fn new() -> Self {
        let mut parts = PartIndex::default();
        parts.claim(container::VERSION_PATH, PartOwner::Version);
        Self {
            version: Some(Version::current()),
            version_dirty: true,
            project: None,
            project_dirty: false,
            topics: Vec::new(),
            index: HashMap::new(),
            parts,
        }
    }

    /// Create an empty graph with a named project and a fresh project identifier
    pub fn new_project(name: impl Into<String>) -> Self {
        let mut graph = Self::new();
        graph.project = Some(Project::new(Uuid::new_v4().to_string(), name));
        graph.project_dirty = true;
        graph.parts.claim(container::PROJECT_PATH, PartOwner::Project);
        graph
    }

    /// Contents of `bcf.version`, if the container has one
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Project metadata, if the container has any
    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    /// All topics in container order
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Topic by identifier
    pub fn topic(&self, id: Uuid) -> Option<&Topic> {
        self.topics.iter().find(|t| t.guid == id)
    }

    /// Comments of a topic in order
    pub fn comments(&self, topic: Uuid) -> Result<&[Comment]> {
        Ok(&self.require_topic(topic)?.comments)
    }

    /// Comments of a topic that refer to the given viewpoint
    pub fn comments_for_viewpoint(&self, topic: Uuid, viewpoint: Uuid) -> Result<Vec<&Comment>> {
        let topic = self.require_topic(topic)?;
        if topic.viewpoint(viewpoint).is_none() {
            return Err(Error::not_found(EntityKind::Viewpoint, viewpoint));
        }
        Ok(topic
            .comments
            .iter()
            .filter(|c| c.viewpoint == Some(viewpoint))
            .collect())
    }

    /// Viewpoints of a topic
    pub fn viewpoints(&self, topic: Uuid) -> Result<&[Viewpoint]> {
        Ok(&self.require_topic(topic)?.viewpoints)
    }

    /// Part names of the snapshots of a topic
    pub fn snapshots(&self, topic: Uuid) -> Result<Vec<String>> {
        let topic = self.require_topic(topic)?;
        Ok(topic
            .viewpoints
            .iter()
            .filter_map(|v| v.snapshot_file.as_deref())
            .filter_map(|file| container::resolve_relative(topic.folder(), file))
            .collect())
    }

    /// Document references of a topic
    pub fn document_references(&self, topic: Uuid) -> Result<&[DocumentReference]> {
        Ok(&self.require_topic(topic)?.document_references)
    }

    /// File references of a topic
    pub fn file_references(&self, topic: Uuid) -> Result<&[FileReference]> {
        Ok(&self.require_topic(topic)?.files)
    }

    /// Look up any entity by identifier
    ///
    /// Returns `None` if nothing of that kind carries the identifier. A
    /// project is found when its `ProjectId` is the identifier's hyphenated
    /// form.
    pub fn resolve(&self, reference: Reference) -> Option<Entity<'_>> {
        if reference.kind == EntityKind::Project {
            return self
                .project
                .as_ref()
                .filter(|p| {
                    p.project_id
                        .as_deref()
                        .and_then(crate::parser::parse_guid)
                        == Some(reference.id)
                })
                .map(Entity::Project);
        }

        let owner = *self.index.get(&(reference.kind, reference.id))?;
        let topic = self.topic(owner)?;
        let id = reference.id;
        match reference.kind {
            EntityKind::Topic => Some(Entity::Topic(topic)),
            EntityKind::Comment => topic.comment(id).map(|c| Entity::Comment(topic, c)),
            EntityKind::Viewpoint => topic.viewpoint(id).map(|v| Entity::Viewpoint(topic, v)),
            EntityKind::DocumentReference => topic
                .document_reference(id)
                .map(|d| Entity::DocumentReference(topic, d)),
            EntityKind::FileReference => topic
                .file_reference(id)
                .map(|f| Entity::FileReference(topic, f)),
            EntityKind::Project => None,
        }
    }

    /// Identifier of the topic owning an entity
    pub fn owner_of(&self, reference: Reference) -> Option<Uuid> {
        self.index.get(&(reference.kind, reference.id)).copied()
    }

    /// Whether anything changed since the graph was loaded or last saved
    pub fn is_dirty(&self) -> bool {
        self.version_dirty
            || self.project_dirty
            || self.topics.iter().any(Topic::is_dirty)
            || self.parts.has_removals()
    }

    /// Number of topics
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Check if the graph has no topics
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    fn require_topic(&self, id: Uuid) -> Result<&Topic> {
        self.topic(id)
            .ok_or_else(|| Error::not_found(EntityKind::Topic, id))
    }

    fn require_topic_mut(&mut self, id: Uuid) -> Result<&mut Topic> {
        self.topics
            .iter_mut()
            .find(|t| t.guid == id)
            .ok_or_else(|| Error::not_found(EntityKind::Topic, id))
    }

    /// Draw identifiers until one is unused for `kind`
    fn fresh_id(&self, kind: EntityKind) -> Uuid {
        loop {
            let id = Uuid::new_v4();
            if !self.index.contains_key(&(kind, id)) {
                return id;
            }
        }
    }
}

fn markup_part(topic: &Topic) -> String {
    format!("{}/{}", topic.folder(), MARKUP_FILE)
}
