//! Which container parts belong to which entity

use super::{ProjectGraph, markup_part};
use crate::container::{self, Blob};
use crate::error::Result;
use crate::model::{DocumentLocation, DocumentReference, Topic, Viewpoint};
use crate::timestamp;
use crate::writer::{self, MarkupDialect};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// The entity a part is produced from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PartOwner {
    Version,
    Project,
    Markup { topic: Uuid },
    Definition { topic: Uuid, viewpoint: Uuid },
    Snapshot { topic: Uuid, viewpoint: Uuid },
    Document { topic: Uuid, document: Uuid },
}

impl PartOwner {
    fn topic(&self) -> Option<Uuid> {
        match *self {
            PartOwner::Version | PartOwner::Project => None,
            PartOwner::Markup { topic }
            | PartOwner::Definition { topic, .. }
            | PartOwner::Snapshot { topic, .. }
            | PartOwner::Document { topic, .. } => Some(topic),
        }
    }
}

/// Part-ownership index plus the parts deleted since the last save
///
/// Part names are stored normalized (no leading slash).
#[derive(Debug, Clone, Default)]
pub(crate) struct PartIndex {
    owners: BTreeMap<String, PartOwner>,
    removed_parts: BTreeSet<String>,
    removed_folders: BTreeSet<String>,
}

impl PartIndex {
    /// Record that `owner` produces the part
    pub fn claim(&mut self, name: &str, owner: PartOwner) {
        let name = container::normalize_path(name);
        self.removed_parts.remove(name);
        self.owners.insert(name.to_string(), owner);
    }

    /// Forget the owner of a part without deleting it
    pub fn release(&mut self, name: &str) {
        self.owners.remove(container::normalize_path(name));
    }

    /// Forget the owner of a part and drop the part on the next save
    pub fn remove(&mut self, name: &str) {
        let name = container::normalize_path(name);
        self.owners.remove(name);
        self.removed_parts.insert(name.to_string());
    }

    /// Drop every part below a folder on the next save
    pub fn remove_folder(&mut self, folder: &str) {
        let prefix = format!("{}/", folder);
        self.owners.retain(|name, _| !name.starts_with(&prefix));
        self.removed_parts.retain(|name| !name.starts_with(&prefix));
        self.removed_folders.insert(folder.to_string());
    }

    /// Forget every part produced by a topic
    pub fn release_topic(&mut self, topic: Uuid) {
        self.owners.retain(|_, owner| owner.topic() != Some(topic));
    }

    pub fn owner(&self, name: &str) -> Option<PartOwner> {
        self.owners.get(container::normalize_path(name)).copied()
    }

    pub fn is_claimed(&self, name: &str) -> bool {
        self.owners.contains_key(container::normalize_path(name))
    }

    /// Whether the part is dropped on save
    ///
    /// A claimed part is never dropped, even inside a removed folder.
    pub fn is_removed(&self, name: &str) -> bool {
        let name = container::normalize_path(name);
        if self.owners.contains_key(name) {
            return false;
        }
        self.removed_parts.contains(name)
            || container::folder_of(name).is_some_and(|f| self.removed_folders.contains(f))
    }

    pub fn has_removals(&self) -> bool {
        !self.removed_parts.is_empty() || !self.removed_folders.is_empty()
    }

    pub fn clear_removals(&mut self) {
        self.removed_parts.clear();
        self.removed_folders.clear();
    }

    pub fn owned(&self) -> impl Iterator<Item = (&str, PartOwner)> {
        self.owners.iter().map(|(name, owner)| (name.as_str(), *owner))
    }
}

impl ProjectGraph {
    /// The entity producing a part, if any
    pub(crate) fn part_owner(&self, name: &str) -> Option<PartOwner> {
        self.parts.owner(name)
    }

    /// Whether a part is deleted by the pending changes
    pub(crate) fn is_part_removed(&self, name: &str) -> bool {
        self.parts.is_removed(name)
    }

    /// New content for a part, or `None` if its owner is clean
    pub(crate) fn render_part(&self, owner: PartOwner) -> Result<Option<Blob>> {
        let rendered: Option<Blob> = match owner {
            PartOwner::Version => match &self.version {
                Some(version) if self.version_dirty => Some(writer::write_version(version)?.into()),
                _ => None,
            },
            PartOwner::Project => match &self.project {
                Some(project) if self.project_dirty => Some(writer::write_project(project)?.into()),
                _ => None,
            },
            PartOwner::Markup { topic } => match self.topic(topic) {
                Some(topic) if topic.dirty => {
                    Some(writer::write_markup(topic, self.markup_dialect())?.into())
                }
                _ => None,
            },
            PartOwner::Definition { topic, viewpoint } => self
                .topic(topic)
                .and_then(|t| t.viewpoint(viewpoint))
                .filter(|v| v.dirty)
                .and_then(|v| v.definition.clone()),
            PartOwner::Snapshot { topic, viewpoint } => self
                .topic(topic)
                .and_then(|t| t.viewpoint(viewpoint))
                .filter(|v| v.dirty)
                .and_then(|v| v.snapshot.clone()),
            PartOwner::Document { topic, document } => self
                .topic(topic)
                .and_then(|t| t.document_reference(document))
                .and_then(|d| d.content.clone()),
        };
        Ok(rendered)
    }

    /// Owned parts in the order new parts are appended to a container
    ///
    /// Version first, then project, then each topic's parts in topic order.
    pub(crate) fn owned_parts(&self) -> Vec<(String, PartOwner)> {
        let position = |owner: &PartOwner| match owner {
            PartOwner::Version => (0, 0),
            PartOwner::Project => (1, 0),
            other => {
                let topic = other.topic();
                let index = self
                    .topics
                    .iter()
                    .position(|t| Some(t.guid) == topic)
                    .unwrap_or(usize::MAX);
                (2, index)
            }
        };
        let mut owned: Vec<(String, PartOwner)> = self
            .parts
            .owned()
            .map(|(name, owner)| (name.to_string(), owner))
            .collect();
        owned.sort_by_key(|(name, owner)| {
            let markup_first = !matches!(owner, PartOwner::Markup { .. });
            (position(owner), markup_first, name.clone())
        });
        owned
    }

    fn markup_dialect(&self) -> MarkupDialect {
        MarkupDialect::for_version(self.version.as_ref().map(|v| v.version_id.as_str()))
    }

    /// Backfill required values of every topic about to be regenerated
    ///
    /// Values dropped while loading stay missing until the topic is edited;
    /// a regenerated markup part always carries them.
    pub(crate) fn fill_required(&mut self) {
        let now = timestamp::now();
        for topic in self.topics.iter_mut().filter(|t| t.dirty) {
            let filled = topic.fill_required(now);
            if filled > 0 {
                log::debug!("Filled {} required values of topic {}", filled, topic.guid);
            }
        }
    }

    /// Forget all pending changes after a successful save
    pub(crate) fn mark_clean(&mut self) {
        self.version_dirty = false;
        self.project_dirty = false;
        for topic in &mut self.topics {
            topic.dirty = false;
            for viewpoint in &mut topic.viewpoints {
                viewpoint.dirty = false;
            }
            for document in &mut topic.document_references {
                document.content = None;
            }
        }
        self.parts.clear_removals();
    }

    /// Claim the parts of a topic that was just added or inserted
    pub(super) fn claim_topic_parts(&mut self, topic: Uuid) {
        let Some(t) = self.topic(topic) else {
            return;
        };
        for (name, owner) in topic_claims(t) {
            self.parts.claim(&name, owner);
        }
    }
}

/// Parts a topic produces: its markup, viewpoint files and internal documents
pub(super) fn topic_claims(topic: &Topic) -> Vec<(String, PartOwner)> {
    let guid = topic.guid;
    let mut claims = vec![(markup_part(topic), PartOwner::Markup { topic: guid })];
    for viewpoint in &topic.viewpoints {
        claims.extend(viewpoint_claims(topic.folder(), guid, viewpoint));
    }
    for document in &topic.document_references {
        if let Some(name) = document_part(topic.folder(), document) {
            claims.push((
                name,
                PartOwner::Document {
                    topic: guid,
                    document: document.guid,
                },
            ));
        }
    }
    claims
}

/// Parts a viewpoint produces: its definition and snapshot
pub(super) fn viewpoint_claims(
    folder: &str,
    topic: Uuid,
    viewpoint: &Viewpoint,
) -> Vec<(String, PartOwner)> {
    let mut claims = Vec::new();
    if viewpoint.definition.is_some()
        && let Some(name) = viewpoint
            .viewpoint_file
            .as_deref()
            .and_then(|f| container::resolve_relative(folder, f))
    {
        claims.push((
            name,
            PartOwner::Definition {
                topic,
                viewpoint: viewpoint.guid,
            },
        ));
    }
    if viewpoint.snapshot.is_some()
        && let Some(name) = viewpoint
            .snapshot_file
            .as_deref()
            .and_then(|f| container::resolve_relative(folder, f))
    {
        claims.push((
            name,
            PartOwner::Snapshot {
                topic,
                viewpoint: viewpoint.guid,
            },
        ));
    }
    claims
}

/// Part holding the content of an internal document
pub(super) fn document_part(
    folder: &str,
    document: &DocumentReference,
) -> Option<String> {
    match &document.location {
        Some(DocumentLocation::Internal(path)) => {
            container::resolve_relative(folder, path)
        }
        _ => None,
    }
}
