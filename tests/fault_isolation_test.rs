//! Partial-validity loading: broken parts cost only what they define

mod common;

use common::*;
use libbcf::model::TopicChanges;
use libbcf::{
    BcfConfig, BcfFile, Container, DiagnosticKind, Error, ProjectGraph, Severity,
};
use std::io::Cursor;
use uuid::Uuid;

fn load(entries: &[(String, Vec<u8>)]) -> libbcf::LoadOutcome {
    let container = Container::from_reader(Cursor::new(build(entries))).unwrap();
    ProjectGraph::load(&container, &BcfConfig::new())
}

fn topic_entries(count: usize) -> (Vec<(String, Vec<u8>)>, Vec<Uuid>) {
    let mut entries = vec![("bcf.version".to_string(), version("2.1"))];
    let mut ids = Vec::new();
    for i in 0..count {
        let id = Uuid::new_v4();
        ids.push(id);
        entries.push((
            format!("{}/markup.bcf", id),
            markup(&id.to_string(), &format!("Topic {}", i), "", ""),
        ));
    }
    (entries, ids)
}

#[test]
fn test_one_malformed_folder_among_many() {
    let (mut entries, ids) = topic_entries(4);
    let broken = Uuid::new_v4().to_string();
    entries.insert(
        2,
        (
            format!("{}/markup.bcf", broken),
            b"<Markup><Topic Guid=\"oops\"><Title>cut off".to_vec(),
        ),
    );

    let outcome = load(&entries);
    assert_eq!(outcome.graph.len(), 4);
    let loaded: Vec<Uuid> = outcome.graph.topics().iter().map(|t| t.guid).collect();
    assert_eq!(loaded, ids);
    assert!(outcome.diagnostics.iter().any(|d| d.concerns(&broken)));
    assert!(outcome.has_errors());
}

#[test]
fn test_broken_viewpoint_keeps_topic() {
    let mut entries = sample_entries();
    entries[3].1 = b"not xml at all".to_vec();

    let outcome = load(&entries);
    assert_eq!(outcome.graph.len(), 2);
    let viewpoints = outcome
        .graph
        .viewpoints(Uuid::parse_str(TOPIC_1).unwrap())
        .unwrap();
    // The blob is kept; only the summary is missing
    assert!(viewpoints[0].definition.is_some());
    assert!(viewpoints[0].visualization.is_none());
    assert!(
        outcome
            .diagnostics
            .iter()
            .any(|d| d.part_name == format!("{}/viewpoint.bcfv", TOPIC_1))
    );
}

#[test]
fn test_missing_snapshot_is_a_dangling_reference() {
    let entries: Vec<_> = sample_entries()
        .into_iter()
        .filter(|(name, _)| !name.ends_with("snapshot.png"))
        .collect();

    let outcome = load(&entries);
    assert_eq!(outcome.graph.len(), 2);
    let dangling: Vec<_> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.kind == DiagnosticKind::DanglingReference)
        .collect();
    assert_eq!(dangling.len(), 1);
    assert!(dangling[0].message.contains("snapshot.png"));
    assert_eq!(dangling[0].severity, Severity::Warning);
}

#[test]
fn test_schema_violation_is_advisory() {
    let extra = "        <Index>first</Index>";
    let (mut entries, _) = topic_entries(0);
    let id = Uuid::new_v4();
    entries.push((
        format!("{}/markup.bcf", id),
        markup(&id.to_string(), "t", "", extra),
    ));

    let outcome = load(&entries);
    assert_eq!(outcome.graph.len(), 1);
    assert!(
        outcome
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::SchemaViolation)
    );
}

#[test]
fn test_broken_parts_are_saved_verbatim() {
    let (mut entries, _) = topic_entries(1);
    let broken = format!("{}/markup.bcf", Uuid::new_v4());
    let broken_bytes = b"<Markup><Topic".to_vec();
    entries.push((broken.clone(), broken_bytes.clone()));

    let mut file = BcfFile::from_reader(Cursor::new(build(&entries)), BcfConfig::new()).unwrap();
    assert!(!file.diagnostics().unwrap().is_empty());
    let saved = file
        .to_writer(Cursor::new(Vec::new()))
        .unwrap()
        .into_inner();
    let container = Container::from_reader(Cursor::new(saved)).unwrap();
    assert_eq!(container.get(&broken).unwrap().data.as_ref(), broken_bytes.as_slice());
}

#[test]
fn test_edited_topic_with_dropped_dates_saves_schema_valid() {
    let topic = Uuid::new_v4();
    let markup = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Markup>
    <Topic Guid="{topic}">
        <Title>Undated</Title>
        <CreationDate>not-a-date</CreationDate>
        <CreationAuthor>jane@example.com</CreationAuthor>
    </Topic>
    <Comment Guid="{COMMENT_1}">
        <Date>yesterday</Date>
        <Author>joe@example.com</Author>
        <Comment>When was this?</Comment>
    </Comment>
</Markup>
"#
    );
    let entries = vec![
        ("bcf.version".to_string(), version("2.1")),
        (format!("{}/markup.bcf", topic), markup.into_bytes()),
    ];

    let mut file = BcfFile::from_reader(Cursor::new(build(&entries)), BcfConfig::new()).unwrap();
    assert!(!file.diagnostics().unwrap().is_empty());
    assert!(file.graph().unwrap().topic(topic).unwrap().creation_date.is_none());

    file.graph_mut()
        .unwrap()
        .update_topic(
            topic,
            TopicChanges {
                title: Some("Dated".to_string()),
                author: Some("joe@example.com".to_string()),
                ..TopicChanges::default()
            },
        )
        .unwrap();
    let saved = file
        .to_writer(Cursor::new(Vec::new()))
        .unwrap()
        .into_inner();

    let reloaded = BcfFile::from_reader(Cursor::new(saved), BcfConfig::new()).unwrap();
    assert!(
        reloaded.diagnostics().unwrap().is_empty(),
        "{:?}",
        reloaded.diagnostics().unwrap()
    );
    let stored = reloaded.graph().unwrap().topic(topic).unwrap();
    assert_eq!(stored.title, "Dated");
    assert_eq!(stored.creation_date, stored.modified_date);
    assert!(stored.comments[0].date.is_some());
}

#[test]
fn test_unsupported_version_loads_best_effort() {
    let mut entries = sample_entries();
    entries[0].1 = version("3.0");

    let outcome = load(&entries);
    assert_eq!(outcome.graph.len(), 2);
    assert!(outcome.diagnostics.iter().any(|d| {
        d.kind == DiagnosticKind::UnsupportedVersion && d.severity == Severity::Error
    }));
}

#[test]
fn test_not_a_zip_is_unreadable() {
    let err = BcfFile::from_reader(Cursor::new(b"PK but not really".to_vec()), BcfConfig::new())
        .unwrap_err();
    assert!(matches!(err, Error::ContainerUnreadable(_)));

    let err = BcfFile::open("/nonexistent/dir/project.bcf").unwrap_err();
    assert!(matches!(err, Error::ContainerUnreadable(_)));
}
