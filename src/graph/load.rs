//! Building a graph from container parts
//!
//! Each part is validated and parsed on its own, so a broken part costs only
//! the entities it defines. Diagnostics from every stage are concatenated in
//! the order the parts were visited.

use super::parts::PartOwner;
use super::{ProjectGraph, markup_part};
use crate::config::BcfConfig;
use crate::container::{self, Container, MARKUP_FILE, PROJECT_PATH, Part, VERSION_PATH};
use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::error::EntityKind;
use crate::model::{DocumentLocation, Topic};
use crate::parser::{self, parse_markup, parse_project, parse_version};
use crate::schema::{self, SchemaKind, Violation};
use std::collections::HashMap;
use uuid::Uuid;

/// Result of [`ProjectGraph::load`]
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// Everything that could be loaded
    pub graph: ProjectGraph,
    /// Every diagnostic raised while validating and parsing
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadOutcome {
    /// Check if any diagnostic has [`Severity::Error`]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

struct Loader<'a> {
    container: &'a Container,
    config: &'a BcfConfig,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Loader<'a> {
    /// Validate a part, recording each violation as a diagnostic
    fn validate(&mut self, part_name: &str, data: &[u8], kind: SchemaKind) -> Vec<Violation> {
        if !self.config.validation_enabled() {
            return Vec::new();
        }
        let Some(schema) = self.config.schemas().get(kind) else {
            return Vec::new();
        };
        let violations = schema::validate(data, schema);
        for violation in &violations {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::SchemaViolation,
                Severity::Warning,
                part_name,
                format!(
                    "{} (line {}, column {})",
                    violation.location, violation.line, violation.column
                ),
                violation.message.clone(),
            ));
        }
        violations
    }
}

impl ProjectGraph {
    /// Build a graph from the parts of a container
    ///
    /// Never fails: a part that cannot be used is skipped and explained in
    /// the returned diagnostics. A topic folder whose markup is unreadable
    /// yields no topic; the remaining folders still load.
    pub fn load(container: &Container, config: &BcfConfig) -> LoadOutcome {
        let mut loader = Loader {
            container,
            config,
            diagnostics: Vec::new(),
        };
        let mut graph = ProjectGraph {
            version: None,
            version_dirty: false,
            project: None,
            project_dirty: false,
            topics: Vec::new(),
            index: HashMap::new(),
            parts: Default::default(),
        };

        graph.load_version(&mut loader);
        graph.load_project(&mut loader);
        for folder in container.folders() {
            graph.load_topic(&mut loader, &folder);
        }
        graph.check_references(&mut loader);

        log::debug!(
            "Loaded {} topics from {} parts with {} diagnostics",
            graph.topics.len(),
            container.len(),
            loader.diagnostics.len()
        );
        LoadOutcome {
            graph,
            diagnostics: loader.diagnostics,
        }
    }

    fn load_version(&mut self, loader: &mut Loader<'_>) {
        let archive = loader.container;
        let Some(part) = archive.get(VERSION_PATH) else {
            log::warn!("Container has no {}", VERSION_PATH);
            loader.diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnsupportedVersion,
                Severity::Warning,
                VERSION_PATH,
                "",
                "Container has no version part, assuming a supported version",
            ));
            return;
        };

        self.parts.claim(&part.name, PartOwner::Version);
        let violations = loader.validate(&part.name, &part.data, SchemaKind::Version);
        let parsed = parse_version(&part.name, &part.data, &violations, loader.config);
        loader.diagnostics.extend(parsed.diagnostics);

        if let Some(version) = &parsed.value
            && !loader.config.is_supported_version(&version.version_id)
        {
            log::warn!("Unsupported BCF version {}", version.version_id);
            loader.diagnostics.push(Diagnostic::new(
                DiagnosticKind::UnsupportedVersion,
                Severity::Error,
                &part.name,
                "/Version/@VersionId",
                format!(
                    "Version '{}' is not supported (supported: {})",
                    version.version_id,
                    loader.config.supported_versions().join(", ")
                ),
            ));
        }
        self.version = parsed.value;
    }

    fn load_project(&mut self, loader: &mut Loader<'_>) {
        let archive = loader.container;
        let Some(part) = archive.get(PROJECT_PATH) else {
            return;
        };

        self.parts.claim(&part.name, PartOwner::Project);
        let violations = loader.validate(&part.name, &part.data, SchemaKind::Project);
        let parsed = parse_project(&part.name, &part.data, &violations, loader.config);
        loader.diagnostics.extend(parsed.diagnostics);

        if let Some(schema_path) = parsed
            .value
            .as_ref()
            .and_then(|p| p.extension_schema.as_deref())
        {
            let found = container::resolve_relative("", schema_path)
                .and_then(|name| archive.get(&name));
            match found {
                Some(schema_part) => {
                    loader.validate(&schema_part.name, &schema_part.data, SchemaKind::Extensions);
                }
                None => loader.diagnostics.push(Diagnostic::dangling(
                    &part.name,
                    "/ProjectExtension/ExtensionSchema",
                    format!("Extension schema '{}' is not in the container", schema_path),
                )),
            }
        }
        self.project = parsed.value;
    }

    fn load_topic(&mut self, loader: &mut Loader<'_>, folder: &str) {
        let part_name = format!("{}/{}", folder, MARKUP_FILE);
        let archive = loader.container;
        let Some(part) = archive.get(&part_name) else {
            // Shared folders such as Documents/ hold no markup
            if parser::parse_guid(folder).is_some() {
                log::warn!("Skipping topic folder {}: no {}", folder, MARKUP_FILE);
                loader.diagnostics.push(Diagnostic::degraded(
                    &part_name,
                    "",
                    format!("Topic folder '{}' has no {}", folder, MARKUP_FILE),
                ));
            }
            return;
        };

        let violations = loader.validate(&part_name, &part.data, SchemaKind::Markup);
        let parsed = parse_markup(&part_name, &part.data, &violations, loader.config);
        loader.diagnostics.extend(parsed.diagnostics);
        let Some(mut topic) = parsed.value else {
            log::warn!("Skipping topic folder {}: markup is unusable", folder);
            return;
        };

        if self.index.contains_key(&(EntityKind::Topic, topic.guid)) {
            log::warn!("Skipping topic folder {}: duplicate topic {}", folder, topic.guid);
            loader.diagnostics.push(Diagnostic::degraded(
                &part_name,
                "/Markup/Topic/@Guid",
                format!("Topic '{}' already exists in another folder, dropped", topic.guid),
            ));
            return;
        }
        if let Some(folder_guid) = parser::parse_guid(folder)
            && folder_guid != topic.guid
        {
            loader.diagnostics.push(Diagnostic::new(
                DiagnosticKind::ParseDegraded,
                Severity::Warning,
                &part_name,
                "/Markup/Topic/@Guid",
                format!(
                    "Topic '{}' is stored in folder '{}' named after another identifier",
                    topic.guid, folder
                ),
            ));
        }

        self.drop_duplicate_children(loader, &part_name, &mut topic);
        self.attach_viewpoint_files(loader, &mut topic);
        self.check_internal_files(loader, &part_name, &topic);

        let guid = topic.guid;
        self.register(&topic);
        self.topics.push(topic);
        self.claim_topic_parts(guid);
    }

    /// Drop children whose identifier is already taken elsewhere
    fn drop_duplicate_children(
        &self,
        loader: &mut Loader<'_>,
        part_name: &str,
        topic: &mut Topic,
    ) {
        let mut seen = std::collections::HashSet::new();
        let mut keep = |kind: EntityKind, id: Uuid| {
            let unique = !self.index.contains_key(&(kind, id)) && seen.insert((kind, id));
            if !unique {
                loader.diagnostics.push(Diagnostic::degraded(
                    part_name,
                    "",
                    format!("Duplicate {} identifier '{}', dropped", kind, id),
                ));
            }
            unique
        };
        topic.comments.retain(|c| keep(EntityKind::Comment, c.guid));
        topic.viewpoints.retain(|v| keep(EntityKind::Viewpoint, v.guid));
        topic
            .document_references
            .retain(|d| keep(EntityKind::DocumentReference, d.guid));
    }

    /// Pick up definition and snapshot blobs, and summarize definitions
    fn attach_viewpoint_files(&self, loader: &mut Loader<'_>, topic: &mut Topic) {
        let folder = topic.folder().to_string();
        let markup = markup_part(topic);
        for viewpoint in &mut topic.viewpoints {
            if let Some(file) = viewpoint.viewpoint_file.clone() {
                match lookup(loader.container, &folder, &file) {
                    Some(part) => {
                        let violations = loader.validate(
                            &part.name,
                            &part.data,
                            SchemaKind::VisualizationInfo,
                        );
                        let parsed = parser::parse_visualization_info(
                            &part.name,
                            &part.data,
                            &violations,
                            loader.config,
                        );
                        loader.diagnostics.extend(parsed.diagnostics);
                        viewpoint.visualization = parsed.value;
                        viewpoint.definition = Some(part.data.clone());
                    }
                    None => loader.diagnostics.push(Diagnostic::dangling(
                        &markup,
                        format!("/Markup/Viewpoints[@Guid='{}']/Viewpoint", viewpoint.guid),
                        format!("Viewpoint file '{}' is not in the container", file),
                    )),
                }
            }
            if let Some(file) = viewpoint.snapshot_file.clone() {
                match lookup(loader.container, &folder, &file) {
                    Some(part) => viewpoint.snapshot = Some(part.data.clone()),
                    None => loader.diagnostics.push(Diagnostic::dangling(
                        &markup,
                        format!("/Markup/Viewpoints[@Guid='{}']/Snapshot", viewpoint.guid),
                        format!("Snapshot '{}' is not in the container", file),
                    )),
                }
            }
        }
    }

    /// Internal documents and model files must exist in the container
    fn check_internal_files(&self, loader: &mut Loader<'_>, part_name: &str, topic: &Topic) {
        for document in &topic.document_references {
            if let Some(DocumentLocation::Internal(path)) = &document.location
                && lookup(loader.container, topic.folder(), path).is_none()
            {
                loader.diagnostics.push(Diagnostic::dangling(
                    part_name,
                    format!(
                        "/Markup/Topic/DocumentReference[@Guid='{}']/ReferencedDocument",
                        document.guid
                    ),
                    format!("Document '{}' is not in the container", path),
                ));
            }
        }
        for file in topic.files.iter().filter(|f| !f.is_external) {
            if let Some(reference) = &file.reference
                && lookup(loader.container, topic.folder(), reference).is_none()
            {
                loader.diagnostics.push(Diagnostic::dangling(
                    part_name,
                    "/Markup/Header/File/Reference",
                    format!("Model file '{}' is not in the container", reference),
                ));
            }
        }
    }

    /// Links between entities must resolve within the project
    fn check_references(&self, loader: &mut Loader<'_>) {
        for topic in &self.topics {
            let part_name = markup_part(topic);
            for comment in &topic.comments {
                if let Some(viewpoint) = comment.viewpoint
                    && topic.viewpoint(viewpoint).is_none()
                {
                    loader.diagnostics.push(Diagnostic::dangling(
                        &part_name,
                        format!("/Markup/Comment[@Guid='{}']/Viewpoint", comment.guid),
                        format!("Viewpoint '{}' is not part of this topic", viewpoint),
                    ));
                }
                if let Some(reply_to) = comment.reply_to
                    && topic.comment(reply_to).is_none()
                {
                    loader.diagnostics.push(Diagnostic::dangling(
                        &part_name,
                        format!("/Markup/Comment[@Guid='{}']/ReplyToComment", comment.guid),
                        format!("Comment '{}' is not part of this topic", reply_to),
                    ));
                }
            }
            for related in &topic.related_topics {
                if self.topic(*related).is_none() {
                    loader.diagnostics.push(Diagnostic::dangling(
                        &part_name,
                        format!("/Markup/Topic/RelatedTopic[@Guid='{}']", related),
                        format!("Related topic '{}' is not in the project", related),
                    ));
                }
            }
        }
    }

    /// Index a topic and everything it owns
    pub(super) fn register(&mut self, topic: &Topic) {
        let owner = topic.guid;
        self.index.insert((EntityKind::Topic, owner), owner);
        for comment in &topic.comments {
            self.index.insert((EntityKind::Comment, comment.guid), owner);
        }
        for viewpoint in &topic.viewpoints {
            self.index.insert((EntityKind::Viewpoint, viewpoint.guid), owner);
        }
        for document in &topic.document_references {
            self.index
                .insert((EntityKind::DocumentReference, document.guid), owner);
        }
        for file in &topic.files {
            self.index.insert((EntityKind::FileReference, file.id), owner);
        }
    }
}

fn lookup<'c>(archive: &'c Container, folder: &str, reference: &str) -> Option<&'c Part> {
    container::resolve_relative(folder, reference).and_then(|name| archive.get(&name))
}
