//! Writer for `markup.bcf`

use super::{
    bool_str, empty, end, new_writer, optional_text, optional_timestamp, push_extension_attributes,
    start, text_element, write_declaration, write_raw_elements,
};
use crate::error::Result;
use crate::model::{
    BimSnippet, Comment, DocumentLocation, DocumentReference, FileReference, Topic, Viewpoint,
};
use quick_xml::Writer;
use quick_xml::events::BytesStart;
use std::collections::BTreeSet;
use std::io::Write as IoWrite;

/// Markup flavour to emit
///
/// BCF 2.0 has `ReplyToComment`; 2.1 dropped it, so reply links are not
/// written for 2.1 containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkupDialect {
    Bcf20,
    Bcf21,
}

impl MarkupDialect {
    /// Dialect matching the container's `VersionId`; 2.1 unless it says 2.0
    pub fn for_version(version_id: Option<&str>) -> Self {
        match version_id {
            Some("2.0") => MarkupDialect::Bcf20,
            _ => MarkupDialect::Bcf21,
        }
    }
}

/// Serialize a topic with everything it owns into a markup document
pub(crate) fn write_markup(topic: &Topic, dialect: MarkupDialect) -> Result<Vec<u8>> {
    let mut writer = new_writer();
    write_declaration(&mut writer)?;

    let mut root = BytesStart::new("Markup");
    push_extension_attributes(&mut root, &topic.extensions.markup);
    start(&mut writer, root)?;

    if !topic.files.is_empty() || !topic.extensions.header.is_empty() {
        let mut header = BytesStart::new("Header");
        push_extension_attributes(&mut header, &topic.extensions.header);
        start(&mut writer, header)?;

        let mut files: Vec<&FileReference> = topic.files.iter().collect();
        files.sort_by(|a, b| (&a.filename, &a.reference).cmp(&(&b.filename, &b.reference)));
        for file in files {
            write_file(&mut writer, file)?;
        }
        write_raw_elements(&mut writer, &topic.extensions.header)?;
        end(&mut writer, "Header")?;
    }

    write_topic(&mut writer, topic)?;

    for comment in &topic.comments {
        write_comment(&mut writer, comment, dialect)?;
    }

    let mut viewpoints: Vec<&Viewpoint> = topic.viewpoints.iter().collect();
    viewpoints.sort_by_key(|v| (v.index.unwrap_or(i64::MAX), v.guid));
    for viewpoint in viewpoints {
        write_viewpoint(&mut writer, viewpoint)?;
    }

    write_raw_elements(&mut writer, &topic.extensions.markup)?;
    end(&mut writer, "Markup")?;

    Ok(writer.into_inner())
}

fn write_file<W: IoWrite>(writer: &mut Writer<W>, file: &FileReference) -> Result<()> {
    let mut elem = BytesStart::new("File");
    if let Some(project) = &file.ifc_project {
        elem.push_attribute(("IfcProject", project.as_str()));
    }
    if let Some(element) = &file.ifc_spatial_structure_element {
        elem.push_attribute(("IfcSpatialStructureElement", element.as_str()));
    }
    elem.push_attribute(("isExternal", bool_str(file.is_external)));
    push_extension_attributes(&mut elem, &file.extensions);

    if file.filename.is_none()
        && file.date.is_none()
        && file.reference.is_none()
        && file.extensions.elements.is_empty()
    {
        return empty(writer, elem);
    }

    start(writer, elem)?;
    optional_text(writer, "Filename", file.filename.as_deref())?;
    optional_timestamp(writer, "Date", file.date.as_ref())?;
    optional_text(writer, "Reference", file.reference.as_deref())?;
    write_raw_elements(writer, &file.extensions)?;
    end(writer, "File")
}

fn write_topic<W: IoWrite>(writer: &mut Writer<W>, topic: &Topic) -> Result<()> {
    let guid = topic.guid.to_string();
    let mut elem = BytesStart::new("Topic");
    elem.push_attribute(("Guid", guid.as_str()));
    if let Some(topic_type) = &topic.topic_type {
        elem.push_attribute(("TopicType", topic_type.as_str()));
    }
    if let Some(status) = &topic.topic_status {
        elem.push_attribute(("TopicStatus", status.as_str()));
    }
    push_extension_attributes(&mut elem, &topic.extensions.topic);
    start(writer, elem)?;

    for link in &topic.reference_links {
        text_element(writer, "ReferenceLink", link)?;
    }
    text_element(writer, "Title", &topic.title)?;
    optional_text(writer, "Priority", topic.priority.as_deref())?;
    if let Some(index) = topic.index {
        text_element(writer, "Index", &index.to_string())?;
    }
    let labels: BTreeSet<&String> = topic.labels.iter().collect();
    for label in labels {
        text_element(writer, "Labels", label)?;
    }
    optional_timestamp(writer, "CreationDate", topic.creation_date.as_ref())?;
    optional_text(writer, "CreationAuthor", topic.creation_author.as_deref())?;
    optional_timestamp(writer, "ModifiedDate", topic.modified_date.as_ref())?;
    optional_text(writer, "ModifiedAuthor", topic.modified_author.as_deref())?;
    optional_timestamp(writer, "DueDate", topic.due_date.as_ref())?;
    optional_text(writer, "AssignedTo", topic.assigned_to.as_deref())?;
    optional_text(writer, "Stage", topic.stage.as_deref())?;
    optional_text(writer, "Description", topic.description.as_deref())?;
    if let Some(snippet) = &topic.bim_snippet {
        write_bim_snippet(writer, snippet)?;
    }

    let mut documents: Vec<&DocumentReference> = topic.document_references.iter().collect();
    documents.sort_by_key(|d| d.guid);
    for document in documents {
        write_document_reference(writer, document)?;
    }

    let mut related = topic.related_topics.clone();
    related.sort();
    related.dedup();
    for guid in related {
        let guid = guid.to_string();
        let mut elem = BytesStart::new("RelatedTopic");
        elem.push_attribute(("Guid", guid.as_str()));
        empty(writer, elem)?;
    }

    write_raw_elements(writer, &topic.extensions.topic)?;
    end(writer, "Topic")
}

fn write_bim_snippet<W: IoWrite>(writer: &mut Writer<W>, snippet: &BimSnippet) -> Result<()> {
    let mut elem = BytesStart::new("BimSnippet");
    elem.push_attribute(("SnippetType", snippet.snippet_type.as_str()));
    if snippet.is_external {
        elem.push_attribute(("isExternal", "true"));
    }
    start(writer, elem)?;
    text_element(writer, "Reference", &snippet.reference)?;
    text_element(writer, "ReferenceSchema", &snippet.reference_schema)?;
    end(writer, "BimSnippet")
}

fn write_document_reference<W: IoWrite>(
    writer: &mut Writer<W>,
    document: &DocumentReference,
) -> Result<()> {
    let guid = document.guid.to_string();
    let mut elem = BytesStart::new("DocumentReference");
    elem.push_attribute(("Guid", guid.as_str()));
    if let Some(DocumentLocation::External(_)) = &document.location {
        elem.push_attribute(("isExternal", "true"));
    }
    push_extension_attributes(&mut elem, &document.extensions);
    start(writer, elem)?;
    optional_text(
        writer,
        "ReferencedDocument",
        document.location.as_ref().map(DocumentLocation::as_str),
    )?;
    optional_text(writer, "Description", document.description.as_deref())?;
    write_raw_elements(writer, &document.extensions)?;
    end(writer, "DocumentReference")
}

fn write_comment<W: IoWrite>(
    writer: &mut Writer<W>,
    comment: &Comment,
    dialect: MarkupDialect,
) -> Result<()> {
    let guid = comment.guid.to_string();
    let mut elem = BytesStart::new("Comment");
    elem.push_attribute(("Guid", guid.as_str()));
    push_extension_attributes(&mut elem, &comment.extensions);
    start(writer, elem)?;

    optional_timestamp(writer, "Date", comment.date.as_ref())?;
    text_element(writer, "Author", &comment.author)?;
    text_element(writer, "Comment", &comment.text)?;
    if let Some(viewpoint) = comment.viewpoint {
        let viewpoint = viewpoint.to_string();
        let mut link = BytesStart::new("Viewpoint");
        link.push_attribute(("Guid", viewpoint.as_str()));
        empty(writer, link)?;
    }
    if let Some(reply_to) = comment.reply_to
        && dialect == MarkupDialect::Bcf20
    {
        let reply_to = reply_to.to_string();
        let mut link = BytesStart::new("ReplyToComment");
        link.push_attribute(("Guid", reply_to.as_str()));
        empty(writer, link)?;
    }
    optional_timestamp(writer, "ModifiedDate", comment.modified_date.as_ref())?;
    optional_text(writer, "ModifiedAuthor", comment.modified_author.as_deref())?;

    write_raw_elements(writer, &comment.extensions)?;
    end(writer, "Comment")
}

fn write_viewpoint<W: IoWrite>(writer: &mut Writer<W>, viewpoint: &Viewpoint) -> Result<()> {
    let guid = viewpoint.guid.to_string();
    let mut elem = BytesStart::new("Viewpoints");
    elem.push_attribute(("Guid", guid.as_str()));
    push_extension_attributes(&mut elem, &viewpoint.extensions);
    start(writer, elem)?;
    optional_text(writer, "Viewpoint", viewpoint.viewpoint_file.as_deref())?;
    optional_text(writer, "Snapshot", viewpoint.snapshot_file.as_deref())?;
    if let Some(index) = viewpoint.index {
        text_element(writer, "Index", &index.to_string())?;
    }
    write_raw_elements(writer, &viewpoint.extensions)?;
    end(writer, "Viewpoints")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BcfConfig;
    use crate::model::{Extensions, RawElement};
    use crate::parser::parse_markup;
    use crate::schema::{SchemaKind, SchemaSet, validate};
    use uuid::Uuid;

    fn sample_topic() -> Topic {
        let mut topic = Topic::new(Uuid::new_v4(), "Clash on Level 2");
        topic.topic_type = Some("Clash".to_string());
        topic.creation_date = crate::timestamp::parse(
            "2019-08-16T10:31:54Z",
            chrono::FixedOffset::east_opt(0).unwrap(),
        );
        topic.creation_author = Some("jane@example.com".to_string());
        topic.labels = vec!["MEP".to_string()];

        let viewpoint = Uuid::new_v4();
        let mut vp = Viewpoint::new(viewpoint);
        vp.viewpoint_file = Some("viewpoint.bcfv".to_string());
        topic.viewpoints.push(vp);

        let mut comment = Comment::new(Uuid::new_v4(), "joe@example.com", "See view");
        comment.date = topic.creation_date;
        comment.viewpoint = Some(viewpoint);
        topic.comments.push(comment);

        let mut file = FileReference::new(Uuid::new_v4());
        file.filename = Some("model.ifc".to_string());
        topic.files.push(file);

        topic.extensions.topic = Extensions {
            attributes: vec![("xmlns:v".to_string(), "urn:vendor".to_string())],
            elements: vec![RawElement {
                name: "v:Cost".to_string(),
                xml: "<v:Cost>12</v:Cost>".to_string(),
            }],
        };
        topic
    }

    #[test]
    fn test_written_markup_is_schema_valid_apart_from_extensions() {
        let mut topic = sample_topic();
        topic.extensions = Default::default();
        let bytes = write_markup(&topic, MarkupDialect::Bcf21).unwrap();

        let schemas = SchemaSet::bcf_2_1();
        let violations = validate(&bytes, schemas.get(SchemaKind::Markup).unwrap());
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_write_parse_write_is_stable() {
        let topic = sample_topic();
        let first = write_markup(&topic, MarkupDialect::Bcf21).unwrap();

        let part = format!("{}/markup.bcf", topic.guid);
        let reparsed = parse_markup(&part, &first, &[], &BcfConfig::new()).value.unwrap();
        let second = write_markup(&reparsed, MarkupDialect::Bcf21).unwrap();
        assert_eq!(
            String::from_utf8(first).unwrap(),
            String::from_utf8(second).unwrap()
        );
    }

    #[test]
    fn test_canonical_form() {
        let topic = sample_topic();
        let out = String::from_utf8(write_markup(&topic, MarkupDialect::Bcf21).unwrap()).unwrap();

        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Markup>"));
        assert!(out.contains("<CreationDate>2019-08-16T10:31:54.000+00:00</CreationDate>"));
        assert!(out.contains("<File isExternal=\"true\">"));
        assert!(out.contains(&format!(" Guid=\"{}\" TopicType=\"Clash\" xmlns:v=\"urn:vendor\">", topic.guid)));
        assert!(out.contains("\n    <v:Cost>12</v:Cost>\n  </Topic>"));

        let header = out.find("<Header>").unwrap();
        let topic_pos = out.find("<Topic ").unwrap();
        let comment = out.find("<Comment ").unwrap();
        let viewpoints = out.find("<Viewpoints ").unwrap();
        assert!(header < topic_pos && topic_pos < comment && comment < viewpoints);
    }

    #[test]
    fn test_related_topics_sorted_regardless_of_insert_order() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let mut first = Topic::new(Uuid::from_u128(9), "t");
        first.related_topics = vec![b, a];
        let mut second = first.clone();
        second.related_topics = vec![a, b];
        assert_eq!(
            write_markup(&first, MarkupDialect::Bcf21).unwrap(),
            write_markup(&second, MarkupDialect::Bcf21).unwrap()
        );
    }

    #[test]
    fn test_labels_written_as_sorted_set() {
        let mut first = Topic::new(Uuid::from_u128(9), "t");
        first.labels = vec!["Structure".to_string(), "MEP".to_string(), "Structure".to_string()];
        let mut second = first.clone();
        second.labels = vec!["MEP".to_string(), "Structure".to_string()];

        let out = write_markup(&first, MarkupDialect::Bcf21).unwrap();
        assert_eq!(out, write_markup(&second, MarkupDialect::Bcf21).unwrap());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("<Labels>").count(), 2);
        assert!(text.find("<Labels>MEP").unwrap() < text.find("<Labels>Structure").unwrap());
    }

    #[test]
    fn test_reply_links_only_in_bcf_2_0() {
        let mut topic = sample_topic();
        let first = topic.comments[0].guid;
        let mut reply = Comment::new(Uuid::new_v4(), "joe@example.com", "Agreed");
        reply.date = topic.creation_date;
        reply.reply_to = Some(first);
        topic.comments.push(reply);
        topic.extensions = Default::default();

        let modern = String::from_utf8(write_markup(&topic, MarkupDialect::Bcf21).unwrap()).unwrap();
        assert!(!modern.contains("ReplyToComment"));
        let violations = validate(
            modern.as_bytes(),
            SchemaSet::bcf_2_1().get(SchemaKind::Markup).unwrap(),
        );
        assert!(violations.is_empty(), "{:?}", violations);

        let legacy = String::from_utf8(write_markup(&topic, MarkupDialect::Bcf20).unwrap()).unwrap();
        assert!(legacy.contains(&format!("<ReplyToComment Guid=\"{}\"/>", first)));
    }

    #[test]
    fn test_dialect_follows_version() {
        assert_eq!(MarkupDialect::for_version(Some("2.0")), MarkupDialect::Bcf20);
        assert_eq!(MarkupDialect::for_version(Some("2.1")), MarkupDialect::Bcf21);
        assert_eq!(MarkupDialect::for_version(None), MarkupDialect::Bcf21);
    }
}
