//! Fixture containers shared by the integration tests
//!
//! Containers are built in memory with `zip::ZipWriter` so that every test
//! controls part order, compression and timestamps exactly.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

pub const TOPIC_1: &str = "3ffb4df2-0187-49a9-8a4a-23992696bafd";
pub const TOPIC_2: &str = "7a36e3d6-97e9-4bdf-a3e7-4fd1c5b5e4c9";
pub const COMMENT_1: &str = "0a36e3d6-97e9-4bdf-a3e7-4fd1c5b5e4c1";
pub const COMMENT_2: &str = "1b36e3d6-97e9-4bdf-a3e7-4fd1c5b5e4c2";
pub const VIEWPOINT_1: &str = "2c36e3d6-97e9-4bdf-a3e7-4fd1c5b5e4c3";
pub const DOCUMENT_1: &str = "4d36e3d6-97e9-4bdf-a3e7-4fd1c5b5e4c4";
pub const PROJECT_ID: &str = "b2c5a4f0-1e7c-4c43-9d1a-2f3b8c1d9e01";

/// A tiny PNG signature, enough to stand in for a snapshot
pub const SNAPSHOT: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// Build a ZIP archive from `(name, bytes)` entries in order
///
/// Entries alternate between deflated and stored so that tests notice when
/// a compression method is not preserved.
pub fn zip_container(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let stamp = DateTime::from_date_and_time(2021, 3, 14, 15, 9, 26).unwrap();
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (i, (name, data)) in entries.iter().enumerate() {
        let method = if i % 2 == 0 {
            CompressionMethod::Deflated
        } else {
            CompressionMethod::Stored
        };
        let options = SimpleFileOptions::default()
            .compression_method(method)
            .last_modified_time(stamp);
        zip.start_file(*name, options).unwrap();
        zip.write_all(data).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn version(id: &str) -> Vec<u8> {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Version VersionId=\"{}\">\n  <DetailedVersion>{}</DetailedVersion>\n</Version>\n",
        id, id
    )
    .into_bytes()
}

pub fn project() -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<ProjectExtension xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <Project ProjectId="{}">
        <Name>Hospital</Name>
    </Project>
    <ExtensionSchema></ExtensionSchema>
</ProjectExtension>
"#,
        PROJECT_ID
    )
    .into_bytes()
}

/// Markup of a topic with the given extra content after `Topic`
pub fn markup(topic: &str, title: &str, topic_extra: &str, body: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Markup xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <Topic Guid="{topic}" TopicType="Clash" TopicStatus="Open">
        <Title>{title}</Title>
        <CreationDate>2019-08-16T10:31:54+02:00</CreationDate>
        <CreationAuthor>jane@example.com</CreationAuthor>
{topic_extra}
    </Topic>
{body}
</Markup>
"#
    )
    .into_bytes()
}

pub fn visinfo(guid: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<VisualizationInfo Guid="{}">
    <Components>
        <Visibility DefaultVisibility="true"/>
    </Components>
    <PerspectiveCamera>
        <CameraViewPoint><X>1.5</X><Y>2</Y><Z>3</Z></CameraViewPoint>
        <CameraDirection><X>0</X><Y>1</Y><Z>0</Z></CameraDirection>
        <CameraUpVector><X>0</X><Y>0</Y><Z>1</Z></CameraUpVector>
        <FieldOfView>60</FieldOfView>
    </PerspectiveCamera>
</VisualizationInfo>
"#,
        guid
    )
    .into_bytes()
}

/// Markup of the first sample topic: two comments, one viewpoint the second
/// comment refers to, and an internal document
pub fn topic_1_markup() -> Vec<u8> {
    let topic_extra = format!(
        r#"        <DocumentReference Guid="{DOCUMENT_1}">
            <ReferencedDocument>../Documents/spec%20sheet.pdf</ReferencedDocument>
            <Description>Spec sheet</Description>
        </DocumentReference>"#
    );
    let body = format!(
        r#"    <Comment Guid="{COMMENT_1}">
        <Date>2019-08-16T10:35:00+02:00</Date>
        <Author>jane@example.com</Author>
        <Comment>Duct runs through the beam</Comment>
    </Comment>
    <Comment Guid="{COMMENT_2}">
        <Date>2019-08-16T11:00:00+02:00</Date>
        <Author>joe@example.com</Author>
        <Comment>See the viewpoint</Comment>
        <Viewpoint Guid="{VIEWPOINT_1}"/>
    </Comment>
    <Viewpoints Guid="{VIEWPOINT_1}">
        <Viewpoint>viewpoint.bcfv</Viewpoint>
        <Snapshot>snapshot.png</Snapshot>
    </Viewpoints>"#
    );
    markup(TOPIC_1, "Clash on Level 2", &topic_extra, &body)
}

pub fn topic_2_markup() -> Vec<u8> {
    let topic_extra = format!(r#"        <RelatedTopic Guid="{TOPIC_1}"/>"#);
    markup(TOPIC_2, "Missing fire damper", &topic_extra, "")
}

/// Entries of a complete, valid sample project
pub fn sample_entries() -> Vec<(String, Vec<u8>)> {
    vec![
        ("bcf.version".to_string(), version("2.1")),
        ("project.bcfp".to_string(), project()),
        (format!("{}/markup.bcf", TOPIC_1), topic_1_markup()),
        (format!("{}/viewpoint.bcfv", TOPIC_1), visinfo(VIEWPOINT_1)),
        (format!("{}/snapshot.png", TOPIC_1), SNAPSHOT.to_vec()),
        (format!("{}/markup.bcf", TOPIC_2), topic_2_markup()),
        ("Documents/spec sheet.pdf".to_string(), b"%PDF-1.4 spec".to_vec()),
    ]
}

pub fn build(entries: &[(String, Vec<u8>)]) -> Vec<u8> {
    let borrowed: Vec<(&str, Vec<u8>)> = entries
        .iter()
        .map(|(name, data)| (name.as_str(), data.clone()))
        .collect();
    zip_container(&borrowed)
}

pub fn sample_container() -> Vec<u8> {
    build(&sample_entries())
}
