//! Parser for `markup.bcf`

use super::{NodeResult, ParseContext, PartParse};
use crate::config::BcfConfig;
use crate::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::model::{
    BimSnippet, Comment, DocumentLocation, DocumentReference, FileReference, MarkupExtensions,
    Topic, Viewpoint,
};
use crate::schema::Violation;
use crate::xml::{self, XmlElement};
use uuid::Uuid;

const MARKUP_CHILDREN: &[&str] = &["Header", "Topic", "Comment", "Viewpoints"];

const TOPIC_ATTRIBUTES: &[&str] = &["Guid", "TopicType", "TopicStatus"];

const TOPIC_CHILDREN: &[&str] = &[
    "ReferenceLink",
    "Title",
    "Priority",
    "Index",
    "Labels",
    "CreationDate",
    "CreationAuthor",
    "ModifiedDate",
    "ModifiedAuthor",
    "DueDate",
    "AssignedTo",
    "Stage",
    "Description",
    "BimSnippet",
    "DocumentReference",
    "RelatedTopic",
];

const COMMENT_CHILDREN: &[&str] = &[
    "Date",
    "Author",
    "Comment",
    "Viewpoint",
    "ReplyToComment",
    "ModifiedDate",
    "ModifiedAuthor",
];

const VIEWPOINT_CHILDREN: &[&str] = &["Viewpoint", "Snapshot", "Index"];

const FILE_ATTRIBUTES: &[&str] = &["IfcProject", "IfcSpatialStructureElement", "isExternal"];

const FILE_CHILDREN: &[&str] = &["Filename", "Date", "Reference"];

const DOCUMENT_ATTRIBUTES: &[&str] = &["Guid", "isExternal"];

const DOCUMENT_CHILDREN: &[&str] = &["ReferencedDocument", "Description"];

/// Parse a topic's markup part
///
/// The topic is dropped only if the document cannot be read or the topic has
/// no usable `Guid`. Any other problem drops the offending node and is
/// reported in the returned diagnostics. The topic folder is taken from
/// `part_name`.
pub fn parse_markup(
    part_name: &str,
    source: &[u8],
    violations: &[Violation],
    config: &BcfConfig,
) -> PartParse<Topic> {
    let mut ctx = ParseContext::new(part_name, source, violations, config);
    let topic = read_markup(&mut ctx);
    ctx.finish(topic)
}

fn read_markup(ctx: &mut ParseContext<'_>) -> Option<Topic> {
    let root = ctx.document("Markup")?;

    let children = xml::child_paths(&root, "/Markup");
    let Some((topic_el, topic_path)) = children.iter().find(|(c, _)| c.local_name() == "Topic")
    else {
        let diagnostic = ctx.skip(&root, "/Markup/Topic", "Markup has no <Topic>");
        ctx.note(diagnostic);
        return None;
    };

    let guid = ctx.required_guid(topic_el, "Guid", topic_path);
    let guid = ctx.accept(guid)?;

    let mut topic = read_topic(ctx, topic_el, topic_path, guid);
    if let Some(folder) = crate::container::folder_of(ctx.part_name()) {
        topic.folder = folder.to_string();
    }

    let mut header_ext = Default::default();
    for (child, path) in &children {
        match child.local_name() {
            "Header" => {
                header_ext = ctx.extensions(child, &[], &["File"]);
                for (file, file_path) in xml::child_paths(child, path) {
                    if file.local_name() == "File" {
                        let parsed = read_file(ctx, file, &file_path);
                        topic.files.push(parsed);
                    }
                }
            }
            "Comment" => {
                let comment = read_comment(ctx, child, path);
                if let Some(comment) = ctx.accept(comment) {
                    topic.comments.push(comment);
                }
            }
            "Viewpoints" => {
                let viewpoint = read_viewpoint(ctx, child, path);
                if let Some(viewpoint) = ctx.accept(viewpoint) {
                    topic.viewpoints.push(viewpoint);
                }
            }
            _ => {}
        }
    }

    topic.extensions = MarkupExtensions {
        markup: ctx.extensions(&root, &[], MARKUP_CHILDREN),
        header: header_ext,
        topic: ctx.extensions(topic_el, TOPIC_ATTRIBUTES, TOPIC_CHILDREN),
    };
    Some(topic)
}

fn read_topic(ctx: &mut ParseContext<'_>, el: &XmlElement, path: &str, guid: Uuid) -> Topic {
    let mut topic = Topic::new(guid, ctx.text(el, "Title").unwrap_or_default());
    topic.topic_type = el.attr("TopicType").map(str::to_string);
    topic.topic_status = el.attr("TopicStatus").map(str::to_string);
    topic.reference_links = ctx.texts(el, "ReferenceLink");
    topic.priority = ctx.text(el, "Priority");
    let index = ctx.integer(el, "Index", path);
    topic.index = ctx.accept(index).flatten();
    topic.labels = ctx.texts(el, "Labels");
    let creation_date = ctx.timestamp(el, "CreationDate", path);
    topic.creation_date = ctx.accept(creation_date).flatten();
    topic.creation_author = ctx.text(el, "CreationAuthor");
    let modified_date = ctx.timestamp(el, "ModifiedDate", path);
    topic.modified_date = ctx.accept(modified_date).flatten();
    topic.modified_author = ctx.text(el, "ModifiedAuthor");
    let due_date = ctx.timestamp(el, "DueDate", path);
    topic.due_date = ctx.accept(due_date).flatten();
    topic.assigned_to = ctx.text(el, "AssignedTo");
    topic.stage = ctx.text(el, "Stage");
    topic.description = ctx.text(el, "Description");

    for (child, child_path) in xml::child_paths(el, path) {
        match child.local_name() {
            "BimSnippet" => {
                let snippet = read_bim_snippet(ctx, child, &child_path);
                topic.bim_snippet = ctx.accept(snippet);
            }
            "DocumentReference" => {
                let document = read_document_reference(ctx, child, &child_path);
                topic.document_references.push(document);
            }
            "RelatedTopic" => {
                let related = ctx.required_guid(child, "Guid", &child_path);
                if let Some(related) = ctx.accept(related) {
                    topic.related_topics.push(related);
                }
            }
            _ => {}
        }
    }
    topic
}

fn read_bim_snippet(ctx: &ParseContext<'_>, el: &XmlElement, path: &str) -> NodeResult<BimSnippet> {
    let Some(snippet_type) = el.attr("SnippetType") else {
        return NodeResult::Skipped(ctx.skip(el, path, "BimSnippet has no SnippetType"));
    };
    let is_external = match ctx.boolean_attr(el, "isExternal", false, path) {
        NodeResult::Parsed(value) => value,
        NodeResult::Skipped(diagnostic) => return NodeResult::Skipped(diagnostic),
    };
    NodeResult::Parsed(BimSnippet {
        snippet_type: snippet_type.to_string(),
        is_external,
        reference: ctx.text(el, "Reference").unwrap_or_default(),
        reference_schema: ctx.text(el, "ReferenceSchema").unwrap_or_default(),
    })
}

fn read_document_reference(
    ctx: &mut ParseContext<'_>,
    el: &XmlElement,
    path: &str,
) -> DocumentReference {
    let guid = ctx.guid_attr(el, "Guid", path);
    let guid = match ctx.accept(guid).flatten() {
        Some(guid) => guid,
        None => {
            // BCF 2.0 document references carry no Guid
            let assigned = Uuid::new_v4();
            ctx.note(Diagnostic::new(
                DiagnosticKind::ParseDegraded,
                Severity::Info,
                ctx.part_name(),
                ctx.location(el, path),
                format!("DocumentReference has no Guid, assigned {}", assigned),
            ));
            assigned
        }
    };

    let is_external = ctx.boolean_attr(el, "isExternal", false, path);
    let is_external = ctx.accept(is_external).unwrap_or(false);
    let location = ctx.text(el, "ReferencedDocument").map(|path| {
        if is_external {
            DocumentLocation::External(path)
        } else {
            DocumentLocation::Internal(path)
        }
    });

    let mut document = DocumentReference::new(guid, location);
    document.description = ctx.text(el, "Description");
    document.extensions = ctx.extensions(el, DOCUMENT_ATTRIBUTES, DOCUMENT_CHILDREN);
    document
}

fn read_file(ctx: &mut ParseContext<'_>, el: &XmlElement, path: &str) -> FileReference {
    let mut file = FileReference::new(Uuid::new_v4());
    file.ifc_project = el.attr("IfcProject").map(str::to_string);
    file.ifc_spatial_structure_element =
        el.attr("IfcSpatialStructureElement").map(str::to_string);
    let is_external = ctx.boolean_attr(el, "isExternal", true, path);
    file.is_external = ctx.accept(is_external).unwrap_or(true);
    file.filename = ctx.text(el, "Filename");
    let date = ctx.timestamp(el, "Date", path);
    file.date = ctx.accept(date).flatten();
    file.reference = ctx.text(el, "Reference");
    file.extensions = ctx.extensions(el, FILE_ATTRIBUTES, FILE_CHILDREN);
    file
}

fn read_comment(ctx: &mut ParseContext<'_>, el: &XmlElement, path: &str) -> NodeResult<Comment> {
    let guid = match ctx.required_guid(el, "Guid", path) {
        NodeResult::Parsed(guid) => guid,
        NodeResult::Skipped(diagnostic) => return NodeResult::Skipped(diagnostic),
    };

    let mut comment = Comment::new(
        guid,
        ctx.text(el, "Author").unwrap_or_default(),
        // The body keeps its whitespace
        el.child_text("Comment").unwrap_or_default(),
    );
    let date = ctx.timestamp(el, "Date", path);
    comment.date = ctx.accept(date).flatten();
    comment.viewpoint = linked_guid(ctx, el, "Viewpoint", path);
    comment.reply_to = linked_guid(ctx, el, "ReplyToComment", path);
    let modified_date = ctx.timestamp(el, "ModifiedDate", path);
    comment.modified_date = ctx.accept(modified_date).flatten();
    comment.modified_author = ctx.text(el, "ModifiedAuthor");
    comment.extensions = ctx.extensions(el, &["Guid"], COMMENT_CHILDREN);
    NodeResult::Parsed(comment)
}

/// `Guid` attribute of an empty link element such as `<Viewpoint Guid=".."/>`
fn linked_guid(ctx: &mut ParseContext<'_>, el: &XmlElement, child: &str, path: &str) -> Option<Uuid> {
    let link = el.child(child)?;
    let result = ctx.required_guid(link, "Guid", &format!("{}/{}", path, child));
    ctx.accept(result)
}

fn read_viewpoint(ctx: &mut ParseContext<'_>, el: &XmlElement, path: &str) -> NodeResult<Viewpoint> {
    let guid = match ctx.required_guid(el, "Guid", path) {
        NodeResult::Parsed(guid) => guid,
        NodeResult::Skipped(diagnostic) => return NodeResult::Skipped(diagnostic),
    };

    let mut viewpoint = Viewpoint::new(guid);
    viewpoint.viewpoint_file = ctx.text(el, "Viewpoint").filter(|f| !f.is_empty());
    viewpoint.snapshot_file = ctx.text(el, "Snapshot").filter(|f| !f.is_empty());
    let index = ctx.integer(el, "Index", path);
    viewpoint.index = ctx.accept(index).flatten();
    viewpoint.extensions = ctx.extensions(el, &["Guid"], VIEWPOINT_CHILDREN);
    NodeResult::Parsed(viewpoint)
}
