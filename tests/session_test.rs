//! On-disk lifecycle of a BcfFile handle

mod common;

use common::*;
use libbcf::model::{ProjectChanges, TopicFields};
use libbcf::{BcfFile, Container, Error, SessionState};
use tempfile::tempdir;

#[test]
fn test_open_edit_save_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("coordination.bcfzip");
    std::fs::write(&path, sample_container()).unwrap();

    let mut file = BcfFile::open(&path).unwrap();
    assert_eq!(file.state(), SessionState::Clean);
    assert_eq!(file.path(), Some(path.as_path()));

    let topic = file
        .graph_mut()
        .unwrap()
        .add_topic(TopicFields {
            author: Some("jane@example.com".to_string()),
            labels: vec!["Structure".to_string()],
            ..TopicFields::titled("Slab opening too small")
        })
        .unwrap();
    assert_eq!(file.state(), SessionState::Dirty);
    file.save().unwrap();
    assert_eq!(file.state(), SessionState::Clean);
    file.close();

    let reopened = BcfFile::open(&path).unwrap();
    assert!(reopened.diagnostics().unwrap().is_empty());
    let graph = reopened.graph().unwrap();
    assert_eq!(graph.len(), 3);
    let created = graph.topic(topic).unwrap();
    assert_eq!(created.labels, vec!["Structure"]);
    assert_eq!(created.creation_author.as_deref(), Some("jane@example.com"));
}

#[test]
fn test_failed_save_leaves_file_and_changes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("p.bcf");
    std::fs::write(&path, sample_container()).unwrap();
    let before = std::fs::read(&path).unwrap();

    let mut file = BcfFile::open(&path).unwrap();
    file.graph_mut()
        .unwrap()
        .update_project(ProjectChanges {
            name: Some(Some("Renamed".to_string())),
            ..ProjectChanges::default()
        })
        .unwrap();

    let elsewhere = dir.path().join("missing").join("p.bcf");
    let err = file.save_as(&elsewhere).unwrap_err();
    assert!(matches!(err, Error::ContainerWriteFailed(_)));
    assert_eq!(file.state(), SessionState::Dirty);
    assert_eq!(file.path(), Some(path.as_path()));
    assert_eq!(std::fs::read(&path).unwrap(), before);

    file.save().unwrap();
    let container = Container::open(&path).unwrap();
    let project = String::from_utf8(container.get("project.bcfp").unwrap().data.to_vec()).unwrap();
    assert!(project.contains("<Name>Renamed</Name>"));
}

#[test]
fn test_create_then_save_as() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("new.bcf");

    let mut file = BcfFile::create("Library");
    file.graph_mut()
        .unwrap()
        .add_topic(TopicFields::titled("First"))
        .unwrap();
    file.save_as(&path).unwrap();
    assert_eq!(file.state(), SessionState::Clean);

    // Saving again without changes rewrites identical parts
    let first = Container::open(&path).unwrap();
    file.save().unwrap();
    assert_eq!(Container::open(&path).unwrap(), first);

    let reopened = BcfFile::open(&path).unwrap();
    assert!(reopened.diagnostics().unwrap().is_empty());
    let graph = reopened.graph().unwrap();
    assert_eq!(graph.project().unwrap().name.as_deref(), Some("Library"));
    assert_eq!(graph.topics()[0].title, "First");
}

#[test]
fn test_closed_handle_rejects_operations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("p.bcf");
    std::fs::write(&path, sample_container()).unwrap();

    let mut file = BcfFile::open(&path).unwrap();
    file.close();
    assert_eq!(file.state(), SessionState::Closed);
    for err in [
        file.save().unwrap_err(),
        file.graph().map(|_| ()).unwrap_err(),
        file.diagnostics().map(|_| ()).unwrap_err(),
    ] {
        assert!(matches!(
            err,
            Error::InvalidState {
                state: "closed",
                ..
            }
        ));
    }
}
