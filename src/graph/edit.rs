//! Mutations of the project graph
//!
//! Every operation validates first and changes nothing on error. On success
//! the owning topic is marked dirty; operations that replace blobs also mark
//! the viewpoint dirty so its files are written on the next save.

use super::parts::{PartIndex, PartOwner, document_part, topic_claims, viewpoint_claims};
use super::ProjectGraph;
use crate::config::BcfConfig;
use crate::container::{self, Blob, PROJECT_PATH};
use crate::error::{EntityKind, Error, Result};
use crate::model::{
    Comment, CommentChanges, CommentFields, DocumentLocation, DocumentReference,
    DocumentReferenceChanges, DocumentReferenceFields, FileReference, FileReferenceChanges,
    FileReferenceFields, Project, ProjectChanges, Topic, TopicChanges, TopicFields, Viewpoint,
    ViewpointChanges, ViewpointFields, VisualizationInfo,
};
use crate::parser::parse_visualization_info;
use crate::timestamp;
use std::collections::HashSet;
use uuid::Uuid;

impl ProjectGraph {
    /// Create a topic with a fresh identifier
    ///
    /// Creation date is now; creation author is `fields.author` (empty if
    /// not given). Every related topic must exist.
    pub fn add_topic(&mut self, fields: TopicFields) -> Result<Uuid> {
        for related in &fields.related_topics {
            self.require_related(*related)?;
        }

        let guid = self.fresh_id(EntityKind::Topic);
        let mut topic = Topic::new(guid, fields.title);
        topic.creation_date = Some(timestamp::now());
        topic.creation_author = Some(fields.author.unwrap_or_default());
        topic.topic_type = fields.topic_type;
        topic.topic_status = fields.topic_status;
        topic.priority = fields.priority;
        topic.index = fields.index;
        topic.due_date = fields.due_date;
        topic.assigned_to = fields.assigned_to;
        topic.stage = fields.stage;
        topic.description = fields.description;
        topic.reference_links = fields.reference_links;
        topic.bim_snippet = fields.bim_snippet;
        topic.labels = fields.labels;
        normalize_labels(&mut topic.labels);
        topic.related_topics = fields.related_topics;
        topic.related_topics.sort_unstable();
        topic.related_topics.dedup();
        topic.dirty = true;

        self.register(&topic);
        self.topics.push(topic);
        self.claim_topic_parts(guid);
        log::debug!("Added topic {}", guid);
        Ok(guid)
    }

    /// Insert a fully built topic, keeping its identifiers
    ///
    /// Fails with [`Error::DuplicateIdentifier`] if the topic or any entity it
    /// owns reuses an identifier of a live entity. Viewpoint blobs without a
    /// file name get one, and all of the topic's parts are written on save.
    pub fn insert_topic(&mut self, mut topic: Topic) -> Result<()> {
        let mut seen = HashSet::new();
        let ids = std::iter::once((EntityKind::Topic, topic.guid))
            .chain(topic.comments.iter().map(|c| (EntityKind::Comment, c.guid)))
            .chain(topic.viewpoints.iter().map(|v| (EntityKind::Viewpoint, v.guid)))
            .chain(
                topic
                    .document_references
                    .iter()
                    .map(|d| (EntityKind::DocumentReference, d.guid)),
            )
            .chain(topic.files.iter().map(|f| (EntityKind::FileReference, f.id)));
        for (kind, id) in ids {
            if self.index.contains_key(&(kind, id)) || !seen.insert((kind, id)) {
                return Err(Error::duplicate(kind, id));
            }
        }
        if self.topics.iter().any(|t| t.folder() == topic.folder()) {
            return Err(Error::InvalidReference(format!(
                "Topic folder '{}' is already in use",
                topic.folder()
            )));
        }
        for related in &topic.related_topics {
            self.require_related(*related)?;
        }

        for position in 0..topic.viewpoints.len() {
            let n = free_viewpoint_number(&self.parts, &topic);
            let viewpoint = &mut topic.viewpoints[position];
            if viewpoint.definition.is_some() && viewpoint.viewpoint_file.is_none() {
                viewpoint.viewpoint_file = Some(format!("viewpoint{}.bcfv", n));
            }
            if let Some(snapshot) = &viewpoint.snapshot
                && viewpoint.snapshot_file.is_none()
            {
                viewpoint.snapshot_file =
                    Some(format!("snapshot{}.{}", n, snapshot_extension(snapshot)));
            }
            viewpoint.dirty = true;
        }
        topic.fill_required(timestamp::now());
        topic.dirty = true;

        let guid = topic.guid;
        self.register(&topic);
        self.topics.push(topic);
        self.claim_topic_parts(guid);
        log::debug!("Inserted topic {}", guid);
        Ok(())
    }

    /// Apply field changes to a topic
    ///
    /// Sets the modification date to now and the modification author to
    /// `changes.author` if given.
    pub fn update_topic(&mut self, id: Uuid, changes: TopicChanges) -> Result<()> {
        let topic = self.require_topic_mut(id)?;
        check_identifier(EntityKind::Topic, id, changes.guid)?;

        if let Some(title) = changes.title {
            topic.title = title;
        }
        if let Some(topic_type) = changes.topic_type {
            topic.topic_type = topic_type;
        }
        if let Some(status) = changes.topic_status {
            topic.topic_status = status;
        }
        if let Some(priority) = changes.priority {
            topic.priority = priority;
        }
        if let Some(index) = changes.index {
            topic.index = index;
        }
        if let Some(mut labels) = changes.labels {
            normalize_labels(&mut labels);
            topic.labels = labels;
        }
        if let Some(due_date) = changes.due_date {
            topic.due_date = due_date;
        }
        if let Some(assigned_to) = changes.assigned_to {
            topic.assigned_to = assigned_to;
        }
        if let Some(stage) = changes.stage {
            topic.stage = stage;
        }
        if let Some(description) = changes.description {
            topic.description = description;
        }
        if let Some(links) = changes.reference_links {
            topic.reference_links = links;
        }
        if let Some(snippet) = changes.bim_snippet {
            topic.bim_snippet = snippet;
        }
        touch(topic, changes.author);
        Ok(())
    }

    /// Delete a topic with everything it owns
    ///
    /// Links from other topics to it are removed and those topics marked
    /// dirty. The topic folder is dropped from the container on save.
    pub fn delete_topic(&mut self, id: Uuid) -> Result<()> {
        let position = self
            .topics
            .iter()
            .position(|t| t.guid == id)
            .ok_or_else(|| Error::not_found(EntityKind::Topic, id))?;
        let topic = self.topics.remove(position);

        self.unregister(&topic);
        self.parts.remove_folder(topic.folder());
        self.parts.release_topic(id);

        // Parts of the folder other topics still point at survive
        let prefix = format!("{}/", topic.folder());
        let shared: Vec<(String, PartOwner)> = self
            .topics
            .iter()
            .flat_map(topic_claims)
            .filter(|(name, _)| name.starts_with(&prefix) && !self.parts.is_claimed(name))
            .collect();
        for (name, owner) in shared {
            log::debug!("Keeping shared part '{}' of deleted topic {}", name, id);
            self.parts.claim(&name, owner);
        }

        for other in &mut self.topics {
            if other.related_topics.contains(&id) {
                other.related_topics.retain(|r| *r != id);
                other.dirty = true;
                log::debug!("Removed link from topic {} to deleted topic {}", other.guid, id);
            }
        }
        log::debug!("Deleted topic {}", id);
        Ok(())
    }

    /// Link a topic to another existing topic
    pub fn add_related_topic(&mut self, topic: Uuid, related: Uuid) -> Result<()> {
        self.require_topic(topic)?;
        if topic == related {
            return Err(Error::InvalidReference(format!(
                "Topic '{}' cannot relate to itself",
                topic
            )));
        }
        self.require_related(related)?;

        let topic = self.require_topic_mut(topic)?;
        if !topic.related_topics.contains(&related) {
            topic.related_topics.push(related);
            topic.dirty = true;
        }
        Ok(())
    }

    /// Remove a link between topics, returning whether it existed
    pub fn remove_related_topic(&mut self, topic: Uuid, related: Uuid) -> Result<bool> {
        let topic = self.require_topic_mut(topic)?;
        let before = topic.related_topics.len();
        topic.related_topics.retain(|r| *r != related);
        let removed = topic.related_topics.len() != before;
        if removed {
            topic.dirty = true;
        }
        Ok(removed)
    }

    /// Add a label unless the topic already has it
    ///
    /// Labels are kept sorted.
    pub fn add_label(&mut self, topic: Uuid, label: impl Into<String>) -> Result<bool> {
        let topic = self.require_topic_mut(topic)?;
        let label = label.into();
        if topic.labels.contains(&label) {
            return Ok(false);
        }
        topic.labels.push(label);
        normalize_labels(&mut topic.labels);
        topic.dirty = true;
        Ok(true)
    }

    /// Remove a label, returning whether the topic had it
    pub fn remove_label(&mut self, topic: Uuid, label: &str) -> Result<bool> {
        let topic = self.require_topic_mut(topic)?;
        let before = topic.labels.len();
        topic.labels.retain(|l| l != label);
        let removed = topic.labels.len() != before;
        if removed {
            topic.dirty = true;
        }
        Ok(removed)
    }

    /// Append a comment to a topic
    ///
    /// The viewpoint and reply-to links must point into the same topic.
    pub fn add_comment(&mut self, topic: Uuid, fields: CommentFields) -> Result<Uuid> {
        let owner = self.require_topic(topic)?;
        check_links(owner, fields.viewpoint, fields.reply_to)?;

        let guid = self.fresh_id(EntityKind::Comment);
        let mut comment = Comment::new(guid, fields.author, fields.text);
        comment.date = Some(timestamp::now());
        comment.viewpoint = fields.viewpoint;
        comment.reply_to = fields.reply_to;

        let owner = self.require_topic_mut(topic)?;
        owner.comments.push(comment);
        owner.dirty = true;
        self.index.insert((EntityKind::Comment, guid), topic);
        Ok(guid)
    }

    /// Apply changes to a comment
    pub fn update_comment(
        &mut self,
        topic: Uuid,
        comment: Uuid,
        changes: CommentChanges,
    ) -> Result<()> {
        let owner = self.require_topic(topic)?;
        let current = owner
            .comment(comment)
            .ok_or_else(|| Error::not_found(EntityKind::Comment, comment))?;
        check_identifier(EntityKind::Comment, comment, changes.guid)?;
        let viewpoint = changes.viewpoint.unwrap_or(current.viewpoint);
        let reply_to = changes.reply_to.unwrap_or(current.reply_to);
        if reply_to == Some(comment) {
            return Err(Error::InvalidReference(format!(
                "Comment '{}' cannot reply to itself",
                comment
            )));
        }
        check_links(owner, viewpoint, reply_to)?;

        let owner = self.require_topic_mut(topic)?;
        if let Some(target) = owner.comments.iter_mut().find(|c| c.guid == comment) {
            if let Some(text) = changes.text {
                target.text = text;
            }
            target.viewpoint = viewpoint;
            target.reply_to = reply_to;
            target.modified_date = Some(timestamp::now());
            if changes.author.is_some() {
                target.modified_author = changes.author;
            }
        }
        owner.dirty = true;
        Ok(())
    }

    /// Delete a comment; replies to it lose their reply-to link
    pub fn delete_comment(&mut self, topic: Uuid, comment: Uuid) -> Result<()> {
        let owner = self.require_topic_mut(topic)?;
        let position = owner
            .comments
            .iter()
            .position(|c| c.guid == comment)
            .ok_or_else(|| Error::not_found(EntityKind::Comment, comment))?;
        owner.comments.remove(position);
        for reply in owner.comments.iter_mut() {
            if reply.reply_to == Some(comment) {
                reply.reply_to = None;
            }
        }
        owner.dirty = true;
        self.index.remove(&(EntityKind::Comment, comment));
        Ok(())
    }

    /// Add a viewpoint to a topic
    ///
    /// Files are named `viewpoint{N}.bcfv` and `snapshot{N}.png` (or `.jpg`
    /// for JPEG data) with the smallest `N` not used in the topic.
    pub fn add_viewpoint(&mut self, topic: Uuid, fields: ViewpointFields) -> Result<Uuid> {
        let owner = self.require_topic(topic)?;
        let number = free_viewpoint_number(&self.parts, owner);
        let folder = owner.folder().to_string();

        let guid = self.fresh_id(EntityKind::Viewpoint);
        let mut viewpoint = Viewpoint::new(guid);
        viewpoint.index = fields.index;
        if let Some(definition) = fields.definition {
            viewpoint.viewpoint_file = Some(format!("viewpoint{}.bcfv", number));
            viewpoint.visualization = summarize(&definition);
            viewpoint.definition = Some(definition);
        }
        if let Some(snapshot) = fields.snapshot {
            viewpoint.snapshot_file =
                Some(format!("snapshot{}.{}", number, snapshot_extension(&snapshot)));
            viewpoint.snapshot = Some(snapshot);
        }
        viewpoint.dirty = true;
        let claims = viewpoint_claims(&folder, topic, &viewpoint);

        let owner = self.require_topic_mut(topic)?;
        owner.viewpoints.push(viewpoint);
        owner.dirty = true;
        self.index.insert((EntityKind::Viewpoint, guid), topic);
        for (name, part_owner) in claims {
            self.parts.claim(&name, part_owner);
        }
        Ok(guid)
    }

    /// Replace a viewpoint's definition or snapshot, or change its index
    pub fn update_viewpoint(
        &mut self,
        topic: Uuid,
        viewpoint: Uuid,
        changes: ViewpointChanges,
    ) -> Result<()> {
        let owner = self.require_topic(topic)?;
        if owner.viewpoint(viewpoint).is_none() {
            return Err(Error::not_found(EntityKind::Viewpoint, viewpoint));
        }
        check_identifier(EntityKind::Viewpoint, viewpoint, changes.guid)?;
        let number = free_viewpoint_number(&self.parts, owner);
        let folder = owner.folder().to_string();

        let owner = self.require_topic_mut(topic)?;
        let Some(target) = owner.viewpoints.iter_mut().find(|v| v.guid == viewpoint) else {
            return Err(Error::not_found(EntityKind::Viewpoint, viewpoint));
        };
        let mut released = None;
        if let Some(definition) = changes.definition {
            if target.viewpoint_file.is_none() {
                target.viewpoint_file = Some(format!("viewpoint{}.bcfv", number));
            }
            target.visualization = summarize(&definition);
            target.definition = Some(definition);
            target.dirty = true;
        }
        match changes.snapshot {
            Some(Some(snapshot)) => {
                if target.snapshot_file.is_none() {
                    target.snapshot_file =
                        Some(format!("snapshot{}.{}", number, snapshot_extension(&snapshot)));
                }
                target.snapshot = Some(snapshot);
                target.dirty = true;
            }
            Some(None) => {
                released = target.snapshot_file.take();
                target.snapshot = None;
            }
            None => {}
        }
        if let Some(index) = changes.index {
            target.index = index;
        }
        let claims = viewpoint_claims(&folder, topic, target);
        owner.dirty = true;

        if let Some(name) = released.and_then(|f| container::resolve_relative(&folder, &f)) {
            self.drop_part(&folder, &name);
        }
        for (name, part_owner) in claims {
            self.parts.claim(&name, part_owner);
        }
        Ok(())
    }

    /// Delete a viewpoint and its files
    ///
    /// Comments that referred to it keep existing with no viewpoint link.
    pub fn delete_viewpoint(&mut self, topic: Uuid, viewpoint: Uuid) -> Result<()> {
        let owner = self.require_topic_mut(topic)?;
        let position = owner
            .viewpoints
            .iter()
            .position(|v| v.guid == viewpoint)
            .ok_or_else(|| Error::not_found(EntityKind::Viewpoint, viewpoint))?;
        let removed = owner.viewpoints.remove(position);
        for comment in owner.comments.iter_mut() {
            if comment.viewpoint == Some(viewpoint) {
                comment.viewpoint = None;
            }
        }
        owner.dirty = true;
        let folder = owner.folder().to_string();

        self.index.remove(&(EntityKind::Viewpoint, viewpoint));
        for file in [removed.viewpoint_file, removed.snapshot_file].into_iter().flatten() {
            if let Some(name) = container::resolve_relative(&folder, &file) {
                self.drop_part(&folder, &name);
            }
        }
        Ok(())
    }

    /// Attach a document to a topic
    ///
    /// With `content`, the location must be internal; the bytes are stored
    /// at that path, resolved against the topic folder.
    pub fn add_document_reference(
        &mut self,
        topic: Uuid,
        fields: DocumentReferenceFields,
    ) -> Result<Uuid> {
        let owner = self.require_topic(topic)?;
        let part = match &fields.content {
            Some(_) => Some(content_part(owner.folder(), fields.location.as_ref())?),
            None => None,
        };

        let guid = self.fresh_id(EntityKind::DocumentReference);
        let mut document = DocumentReference::new(guid, fields.location);
        document.description = fields.description;
        document.content = fields.content;

        let owner = self.require_topic_mut(topic)?;
        owner.document_references.push(document);
        owner.dirty = true;
        self.index
            .insert((EntityKind::DocumentReference, guid), topic);
        if let Some(name) = part {
            self.parts.claim(
                &name,
                PartOwner::Document {
                    topic,
                    document: guid,
                },
            );
        }
        Ok(guid)
    }

    /// Apply changes to a document reference
    pub fn update_document_reference(
        &mut self,
        topic: Uuid,
        document: Uuid,
        changes: DocumentReferenceChanges,
    ) -> Result<()> {
        let owner = self.require_topic(topic)?;
        let current = owner
            .document_reference(document)
            .ok_or_else(|| Error::not_found(EntityKind::DocumentReference, document))?;
        check_identifier(EntityKind::DocumentReference, document, changes.guid)?;

        let folder = owner.folder().to_string();
        let old_part = document_part(&folder, current);
        if let Some(location) = &changes.location
            && current.content.is_some()
        {
            content_part(&folder, location.as_ref())?;
        }

        let owner = self.require_topic_mut(topic)?;
        let Some(target) = owner
            .document_references
            .iter_mut()
            .find(|d| d.guid == document)
        else {
            return Err(Error::not_found(EntityKind::DocumentReference, document));
        };
        if let Some(location) = changes.location {
            target.location = location;
        }
        if let Some(description) = changes.description {
            target.description = description;
        }
        let new_part = document_part(&folder, target);
        owner.dirty = true;

        if old_part != new_part {
            if let Some(old) = old_part {
                self.drop_part(&folder, &old);
            }
            if let Some(new) = new_part {
                self.parts.claim(&new, PartOwner::Document { topic, document });
            }
        }
        Ok(())
    }

    /// Delete a document reference
    ///
    /// An internal document inside the topic folder is removed from the
    /// container unless another reference still points at it.
    pub fn delete_document_reference(&mut self, topic: Uuid, document: Uuid) -> Result<()> {
        let owner = self.require_topic_mut(topic)?;
        let position = owner
            .document_references
            .iter()
            .position(|d| d.guid == document)
            .ok_or_else(|| Error::not_found(EntityKind::DocumentReference, document))?;
        let removed = owner.document_references.remove(position);
        owner.dirty = true;
        let folder = owner.folder().to_string();

        self.index
            .remove(&(EntityKind::DocumentReference, document));
        if let Some(name) = document_part(&folder, &removed) {
            self.drop_part(&folder, &name);
        }
        Ok(())
    }

    /// Reference a model file from a topic
    pub fn add_file_reference(&mut self, topic: Uuid, fields: FileReferenceFields) -> Result<Uuid> {
        self.require_topic(topic)?;
        let id = self.fresh_id(EntityKind::FileReference);
        let mut file = FileReference::new(id);
        file.ifc_project = fields.ifc_project;
        file.ifc_spatial_structure_element = fields.ifc_spatial_structure_element;
        file.is_external = fields.is_external;
        file.filename = fields.filename;
        file.date = fields.date;
        file.reference = fields.reference;

        let owner = self.require_topic_mut(topic)?;
        owner.files.push(file);
        owner.dirty = true;
        self.index.insert((EntityKind::FileReference, id), topic);
        Ok(id)
    }

    /// Apply changes to a file reference
    pub fn update_file_reference(
        &mut self,
        topic: Uuid,
        file: Uuid,
        changes: FileReferenceChanges,
    ) -> Result<()> {
        let owner = self.require_topic_mut(topic)?;
        let target = owner
            .files
            .iter_mut()
            .find(|f| f.id == file)
            .ok_or_else(|| Error::not_found(EntityKind::FileReference, file))?;
        check_identifier(EntityKind::FileReference, file, changes.id)?;

        if let Some(ifc_project) = changes.ifc_project {
            target.ifc_project = ifc_project;
        }
        if let Some(element) = changes.ifc_spatial_structure_element {
            target.ifc_spatial_structure_element = element;
        }
        if let Some(is_external) = changes.is_external {
            target.is_external = is_external;
        }
        if let Some(filename) = changes.filename {
            target.filename = filename;
        }
        if let Some(date) = changes.date {
            target.date = date;
        }
        if let Some(reference) = changes.reference {
            target.reference = reference;
        }
        owner.dirty = true;
        Ok(())
    }

    /// Remove a file reference
    pub fn delete_file_reference(&mut self, topic: Uuid, file: Uuid) -> Result<()> {
        let owner = self.require_topic_mut(topic)?;
        let position = owner
            .files
            .iter()
            .position(|f| f.id == file)
            .ok_or_else(|| Error::not_found(EntityKind::FileReference, file))?;
        owner.files.remove(position);
        owner.dirty = true;
        self.index.remove(&(EntityKind::FileReference, file));
        Ok(())
    }

    /// Change project metadata, creating it with a fresh identifier if absent
    pub fn update_project(&mut self, changes: ProjectChanges) -> Result<()> {
        let project = self.project.get_or_insert_with(|| Project {
            project_id: Some(Uuid::new_v4().to_string()),
            ..Project::default()
        });
        if project.project_id.is_none() {
            project.project_id = Some(Uuid::new_v4().to_string());
        }
        if let Some(name) = changes.name {
            project.name = name;
        }
        if let Some(schema) = changes.extension_schema {
            project.extension_schema = schema;
        }
        self.project_dirty = true;
        self.parts.claim(PROJECT_PATH, PartOwner::Project);
        Ok(())
    }

    fn require_related(&self, related: Uuid) -> Result<()> {
        match self.topic(related) {
            Some(_) => Ok(()),
            None => Err(Error::InvalidReference(format!(
                "Related topic '{}' is not in the project",
                related
            ))),
        }
    }

    /// Remove a topic and its children from the identifier index
    fn unregister(&mut self, topic: &Topic) {
        self.index.retain(|_, owner| *owner != topic.guid);
    }

    /// Stop producing a part that lost its entity
    ///
    /// The part is deleted only if it lives in the topic folder and no other
    /// entity refers to it.
    fn drop_part(&mut self, folder: &str, name: &str) {
        self.parts.release(name);
        if let Some(user) = self.referencing_topic(name) {
            self.claim_topic_parts(user);
        } else if container::folder_of(name) == Some(folder) {
            self.parts.remove(name);
        }
    }

    fn referencing_topic(&self, name: &str) -> Option<Uuid> {
        let refers = |topic: &Topic| {
            let folder = topic.folder();
            let files = topic
                .viewpoints
                .iter()
                .flat_map(|v| [v.viewpoint_file.as_deref(), v.snapshot_file.as_deref()])
                .flatten()
                .filter_map(|f| container::resolve_relative(folder, f));
            let documents = topic
                .document_references
                .iter()
                .filter_map(|d| document_part(folder, d));
            files.chain(documents).any(|part| part == name)
        };
        self.topics.iter().find(|t| refers(t)).map(|t| t.guid)
    }
}

fn check_identifier(kind: EntityKind, current: Uuid, requested: Option<Uuid>) -> Result<()> {
    match requested {
        Some(id) if id != current => Err(Error::IdentifierImmutable { kind, id: current }),
        _ => Ok(()),
    }
}

fn check_links(topic: &Topic, viewpoint: Option<Uuid>, reply_to: Option<Uuid>) -> Result<()> {
    if let Some(viewpoint) = viewpoint
        && topic.viewpoint(viewpoint).is_none()
    {
        return Err(Error::InvalidReference(format!(
            "Viewpoint '{}' is not part of topic '{}'",
            viewpoint, topic.guid
        )));
    }
    if let Some(reply_to) = reply_to
        && topic.comment(reply_to).is_none()
    {
        return Err(Error::InvalidReference(format!(
            "Comment '{}' is not part of topic '{}'",
            reply_to, topic.guid
        )));
    }
    Ok(())
}

/// Labels form a set; keep them sorted and unique
fn normalize_labels(labels: &mut Vec<String>) {
    labels.sort_unstable();
    labels.dedup();
}

fn touch(topic: &mut Topic, author: Option<String>) {
    topic.modified_date = Some(timestamp::now());
    if author.is_some() {
        topic.modified_author = author;
    }
    topic.dirty = true;
}

/// Part name for embedded document content
fn content_part(folder: &str, location: Option<&DocumentLocation>) -> Result<String> {
    let Some(DocumentLocation::Internal(path)) = location else {
        return Err(Error::InvalidReference(
            "Document content needs an internal location".to_string(),
        ));
    };
    let name = container::resolve_relative(folder, path).ok_or_else(|| {
        Error::InvalidReference(format!("Document path '{}' leaves the container", path))
    })?;
    container::validate_part_name(&name)?;
    Ok(name)
}

/// Smallest `N` whose viewpoint and snapshot names are free in the topic
fn free_viewpoint_number(parts: &PartIndex, topic: &Topic) -> u32 {
    let used = |file: String| {
        topic
            .viewpoints
            .iter()
            .any(|v| v.viewpoint_file.as_ref() == Some(&file) || v.snapshot_file.as_ref() == Some(&file))
            || parts.is_claimed(&format!("{}/{}", topic.folder(), file))
    };
    (1..)
        .find(|n| {
            !used(format!("viewpoint{}.bcfv", n))
                && !used(format!("snapshot{}.png", n))
                && !used(format!("snapshot{}.jpg", n))
        })
        .unwrap_or(1)
}

fn snapshot_extension(data: &Blob) -> &'static str {
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else {
        "png"
    }
}

fn summarize(definition: &[u8]) -> Option<VisualizationInfo> {
    parse_visualization_info("", definition, &[], &BcfConfig::default()).value
}
