use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use libbcf::model::TopicChanges;
use libbcf::{BcfConfig, BcfFile};
use std::hint::black_box;
use std::io::{Cursor, Write};
use uuid::Uuid;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Generate a BCF container with `topics` topics of `comments` comments each
fn generate_bcf(topics: usize, comments: usize) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    zip.start_file("bcf.version", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Version VersionId="2.1"/>"#)
        .unwrap();

    for t in 0..topics {
        let topic = Uuid::new_v4();
        let viewpoint = Uuid::new_v4();
        let mut markup = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Markup>
  <Topic Guid="{topic}" TopicType="Clash" TopicStatus="Open">
    <Title>Generated topic {t}</Title>
    <CreationDate>2019-08-16T10:31:54Z</CreationDate>
    <CreationAuthor>bench@example.com</CreationAuthor>
  </Topic>
"#
        );
        for c in 0..comments {
            markup.push_str(&format!(
                r#"  <Comment Guid="{}">
    <Date>2019-08-16T10:31:54Z</Date>
    <Author>bench@example.com</Author>
    <Comment>Comment {} on topic {}</Comment>
    <Viewpoint Guid="{viewpoint}"/>
  </Comment>
"#,
                Uuid::new_v4(),
                c,
                t
            ));
        }
        markup.push_str(&format!(
            "  <Viewpoints Guid=\"{viewpoint}\">\n    <Viewpoint>viewpoint.bcfv</Viewpoint>\n  </Viewpoints>\n</Markup>\n"
        ));

        zip.start_file(format!("{}/markup.bcf", topic), options)
            .unwrap();
        zip.write_all(markup.as_bytes()).unwrap();

        let visinfo = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<VisualizationInfo Guid="{viewpoint}">
  <Components><Visibility DefaultVisibility="true"/></Components>
  <PerspectiveCamera>
    <CameraViewPoint><X>1</X><Y>2</Y><Z>3</Z></CameraViewPoint>
    <FieldOfView>60</FieldOfView>
  </PerspectiveCamera>
</VisualizationInfo>
"#
        );
        zip.start_file(format!("{}/viewpoint.bcfv", topic), options)
            .unwrap();
        zip.write_all(visinfo.as_bytes()).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for topics in [10, 100, 500] {
        let data = generate_bcf(topics, 5);
        group.bench_with_input(BenchmarkId::new("topics", topics), &data, |b, data| {
            b.iter(|| {
                let file = BcfFile::from_reader(Cursor::new(data.clone()), BcfConfig::new()).unwrap();
                black_box(file.graph().unwrap().len())
            });
        });
    }

    group.finish();
}

fn bench_load_without_validation(c: &mut Criterion) {
    let data = generate_bcf(100, 5);
    c.bench_function("load_no_validation_100", |b| {
        b.iter(|| {
            let config = BcfConfig::new().with_validation(false);
            let file = BcfFile::from_reader(Cursor::new(data.clone()), config).unwrap();
            black_box(file.graph().unwrap().len())
        });
    });
}

fn bench_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("save");
    let data = generate_bcf(200, 5);

    group.bench_function("untouched", |b| {
        let mut file = BcfFile::from_reader(Cursor::new(data.clone()), BcfConfig::new()).unwrap();
        b.iter(|| black_box(file.to_writer(Cursor::new(Vec::new())).unwrap()));
    });

    group.bench_function("one_topic_edited", |b| {
        let mut file = BcfFile::from_reader(Cursor::new(data.clone()), BcfConfig::new()).unwrap();
        let topic = file.graph().unwrap().topics()[0].guid;
        b.iter(|| {
            file.graph_mut()
                .unwrap()
                .update_topic(
                    topic,
                    TopicChanges {
                        title: Some("Edited".to_string()),
                        ..TopicChanges::default()
                    },
                )
                .unwrap();
            black_box(file.to_writer(Cursor::new(Vec::new())).unwrap())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_load, bench_load_without_validation, bench_save);
criterion_main!(benches);
