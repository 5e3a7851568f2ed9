//! Property-based tests for the project graph
//!
//! Random edit sequences must never produce two live entities of the same
//! kind with one identifier, and saving must be stable across re-saves.

use libbcf::model::{CommentFields, TopicFields, ViewpointFields};
use libbcf::{BcfConfig, BcfFile, EntityKind, ProjectGraph};
use proptest::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    AddTopic(String),
    AddComment(usize, String),
    AddViewpoint(usize),
    DeleteTopic(usize),
    DeleteComment(usize),
    DeleteViewpoint(usize),
    Relate(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => "[A-Za-z ]{1,20}".prop_map(Op::AddTopic),
        3 => (0usize..8, "[a-z &<>]{0,30}").prop_map(|(t, s)| Op::AddComment(t, s)),
        2 => (0usize..8).prop_map(Op::AddViewpoint),
        1 => (0usize..8).prop_map(Op::DeleteTopic),
        1 => (0usize..8).prop_map(Op::DeleteComment),
        1 => (0usize..8).prop_map(Op::DeleteViewpoint),
        1 => (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Relate(a, b)),
    ]
}

fn pick(graph: &ProjectGraph, i: usize) -> Option<Uuid> {
    let topics = graph.topics();
    if topics.is_empty() {
        None
    } else {
        Some(topics[i % topics.len()].guid)
    }
}

fn apply(graph: &mut ProjectGraph, op: &Op) {
    match op {
        Op::AddTopic(title) => {
            graph.add_topic(TopicFields::titled(title.clone())).unwrap();
        }
        Op::AddComment(i, text) => {
            if let Some(topic) = pick(graph, *i) {
                graph
                    .add_comment(
                        topic,
                        CommentFields {
                            author: "a@example.com".to_string(),
                            text: text.clone(),
                            ..CommentFields::default()
                        },
                    )
                    .unwrap();
            }
        }
        Op::AddViewpoint(i) => {
            if let Some(topic) = pick(graph, *i) {
                graph
                    .add_viewpoint(
                        topic,
                        ViewpointFields {
                            definition: Some(b"<VisualizationInfo/>".to_vec().into()),
                            ..ViewpointFields::default()
                        },
                    )
                    .unwrap();
            }
        }
        Op::DeleteTopic(i) => {
            if let Some(topic) = pick(graph, *i) {
                graph.delete_topic(topic).unwrap();
            }
        }
        Op::DeleteComment(i) => {
            if let Some(topic) = pick(graph, *i)
                && let Some(comment) = graph.comments(topic).unwrap().first().map(|c| c.guid)
            {
                graph.delete_comment(topic, comment).unwrap();
            }
        }
        Op::DeleteViewpoint(i) => {
            if let Some(topic) = pick(graph, *i)
                && let Some(viewpoint) = graph.viewpoints(topic).unwrap().last().map(|v| v.guid)
            {
                graph.delete_viewpoint(topic, viewpoint).unwrap();
            }
        }
        Op::Relate(a, b) => {
            if let (Some(a), Some(b)) = (pick(graph, *a), pick(graph, *b))
                && a != b
            {
                graph.add_related_topic(a, b).unwrap();
            }
        }
    }
}

fn live_ids(graph: &ProjectGraph) -> Vec<(EntityKind, Uuid)> {
    let mut ids = Vec::new();
    for topic in graph.topics() {
        ids.push((EntityKind::Topic, topic.guid));
        ids.extend(topic.comments.iter().map(|c| (EntityKind::Comment, c.guid)));
        ids.extend(topic.viewpoints.iter().map(|v| (EntityKind::Viewpoint, v.guid)));
    }
    ids
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_identifiers_stay_unique(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut graph = ProjectGraph::new_project("p");
        for op in &ops {
            apply(&mut graph, op);
        }

        let ids = live_ids(&graph);
        let unique: HashSet<_> = ids.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());

        // No related-topic link survives its target
        let topics: HashSet<Uuid> = graph.topics().iter().map(|t| t.guid).collect();
        for topic in graph.topics() {
            for related in &topic.related_topics {
                prop_assert!(topics.contains(related));
            }
        }
    }

    #[test]
    fn prop_resave_is_stable(ops in prop::collection::vec(op_strategy(), 1..25)) {
        let mut file = BcfFile::create("p");
        for op in &ops {
            apply(file.graph_mut().unwrap(), op);
        }

        let first = file.to_writer(Cursor::new(Vec::new())).unwrap().into_inner();
        let second = file.to_writer(Cursor::new(Vec::new())).unwrap().into_inner();
        prop_assert_eq!(&first, &second);

        // What was written loads back to the same topics
        let reloaded = BcfFile::from_reader(Cursor::new(first), BcfConfig::new()).unwrap();
        let before: Vec<Uuid> = file.graph().unwrap().topics().iter().map(|t| t.guid).collect();
        let after: Vec<Uuid> = reloaded.graph().unwrap().topics().iter().map(|t| t.guid).collect();
        let before: HashSet<Uuid> = before.into_iter().collect();
        let after: HashSet<Uuid> = after.into_iter().collect();
        prop_assert_eq!(before, after);
    }
}
