//! Checking a document against a schema

use super::{Content, ElementDecl, Particle, Schema, Violation};
use crate::xml::{self, XmlElement};

/// Validate a byte stream against a schema
///
/// Returns every violation in document order. An empty list means the
/// document conforms. This function never fails; malformed XML is reported as
/// a violation at the position where reading stopped.
///
/// # Example
///
/// ```
/// use libbcf::schema::{validate, SchemaKind, SchemaSet};
///
/// let schemas = SchemaSet::bcf_2_1();
/// let version = schemas.get(SchemaKind::Version).unwrap();
///
/// assert!(validate(br#"<Version VersionId="2.1"/>"#, version).is_empty());
/// assert_eq!(validate(b"<Version/>", version).len(), 1);
/// ```
pub fn validate(source: &[u8], schema: &Schema) -> Vec<Violation> {
    let mut checker = Checker {
        source,
        violations: Vec::new(),
    };

    let root = match xml::parse_document(source) {
        Ok(root) => root,
        Err(fault) => {
            checker.report_at(
                "/",
                fault.position,
                format!("Document is not well-formed: {}", fault.message),
            );
            return checker.violations;
        }
    };

    let path = format!("/{}", root.local_name());
    if root.local_name() != schema.root.name {
        checker.report(
            &root,
            &path,
            format!(
                "Expected root element <{}>, found <{}>",
                schema.root.name,
                root.local_name()
            ),
        );
        return checker.violations;
    }

    checker.check_element(&root, &schema.root, &path);
    checker.violations
}

struct Checker<'s> {
    source: &'s [u8],
    violations: Vec<Violation>,
}

impl Checker<'_> {
    fn report_at(&mut self, location: &str, offset: usize, message: String) {
        let (line, column) = xml::line_column(self.source, offset);
        self.violations.push(Violation {
            location: location.to_string(),
            line,
            column,
            message,
        });
    }

    fn report(&mut self, element: &XmlElement, location: &str, message: String) {
        self.report_at(location, element.span.start, message);
    }

    fn check_element(&mut self, element: &XmlElement, decl: &ElementDecl, path: &str) {
        if decl.content == Content::Any {
            return;
        }

        self.check_attributes(element, decl, path);

        match &decl.content {
            Content::Any => {}
            Content::Empty => {
                for (child, child_path) in xml::child_paths(element, path) {
                    self.report(
                        child,
                        &child_path,
                        format!("Element <{}> must be empty", decl.name),
                    );
                }
                if !element.text.trim().is_empty() {
                    self.report(element, path, format!("Element <{}> must be empty", decl.name));
                }
            }
            Content::Text(value_type) => {
                for (child, child_path) in xml::child_paths(element, path) {
                    self.report(
                        child,
                        &child_path,
                        format!(
                            "Unexpected element <{}> inside text element <{}>",
                            child.local_name(),
                            decl.name
                        ),
                    );
                }
                if !value_type.accepts(&element.text) {
                    self.report(
                        element,
                        path,
                        format!("'{}' is not a valid {}", element.text.trim(), value_type),
                    );
                }
            }
            Content::Sequence(particles) => {
                if !element.text.trim().is_empty() {
                    self.report(
                        element,
                        path,
                        format!("Element <{}> cannot contain text", decl.name),
                    );
                }
                self.check_sequence(element, particles, path);
            }
        }
    }

    fn check_attributes(&mut self, element: &XmlElement, decl: &ElementDecl, path: &str) {
        for (key, value) in &element.attributes {
            // Namespace declarations and xsi:/xml: attributes are always allowed
            if key.starts_with("xmlns") || key.starts_with("xsi:") || key.starts_with("xml:") {
                continue;
            }
            let name = xml::local_name(key);
            let attr_path = format!("{}/@{}", path, name);
            match decl.attribute(name) {
                Some(attr) if !attr.value_type.accepts(value) => self.report(
                    element,
                    &attr_path,
                    format!("'{}' is not a valid {}", value, attr.value_type),
                ),
                Some(_) => {}
                None => self.report(
                    element,
                    &attr_path,
                    format!("Attribute '{}' is not allowed on <{}>", name, decl.name),
                ),
            }
        }

        for attr in decl.attributes.iter().filter(|a| a.required) {
            if element.attr(&attr.name).is_none() {
                self.report(
                    element,
                    &format!("{}/@{}", path, attr.name),
                    format!(
                        "Required attribute '{}' is missing on <{}>",
                        attr.name, decl.name
                    ),
                );
            }
        }
    }

    fn check_sequence(&mut self, element: &XmlElement, particles: &[Particle], path: &str) {
        let mut counts = vec![0u32; particles.len()];
        let mut cursor = 0;

        for (child, child_path) in xml::child_paths(element, path) {
            let name = child.local_name();

            if let Some(offset) = particles[cursor..]
                .iter()
                .position(|p| p.element.name == name)
            {
                let found = cursor + offset;
                for skipped in cursor..found {
                    self.check_min(element, &particles[skipped], counts[skipped], path);
                }
                cursor = found;
                counts[found] += 1;

                let particle = &particles[found];
                if particle.max_occurs.is_some_and(|max| counts[found] > max) {
                    self.report(
                        child,
                        &child_path,
                        format!("Too many <{}> elements in <{}>", name, element.local_name()),
                    );
                }
                self.check_element(child, &particle.element, &child_path);
                continue;
            }

            if let Some(earlier) = particles[..cursor].iter().find(|p| p.element.name == name) {
                self.report(
                    child,
                    &child_path,
                    format!(
                        "Element <{}> must appear before <{}>",
                        name, particles[cursor].element.name
                    ),
                );
                self.check_element(child, &earlier.element, &child_path);
                continue;
            }

            self.report(
                child,
                &child_path,
                format!(
                    "Unexpected element <{}> in <{}>",
                    name,
                    element.local_name()
                ),
            );
        }

        for index in cursor..particles.len() {
            self.check_min(element, &particles[index], counts[index], path);
        }
    }

    fn check_min(&mut self, parent: &XmlElement, particle: &Particle, count: u32, path: &str) {
        if count < particle.min_occurs {
            self.report(
                parent,
                &format!("{}/{}", path, particle.element.name),
                format!(
                    "Missing required element <{}> in <{}>",
                    particle.element.name,
                    parent.local_name()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaKind, SchemaSet};

    const TOPIC_GUID: &str = "3ffb4df2-0187-49a9-8a4a-23992696bafd";

    fn markup_schema() -> Schema {
        SchemaSet::bcf_2_1().get(SchemaKind::Markup).unwrap().clone()
    }

    fn markup(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Markup xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <Topic Guid="{}" TopicType="Issue">
    <Title>Clash</Title>
    <CreationDate>2019-08-16T10:31:54Z</CreationDate>
    <CreationAuthor>jane@example.com</CreationAuthor>
  </Topic>
{}
</Markup>"#,
            TOPIC_GUID, body
        )
    }

    #[test]
    fn test_valid_markup_has_no_violations() {
        let doc = markup(
            r#"  <Comment Guid="0a36e3d6-97e9-4bdf-a3e7-4fd1c5b5e4c1">
    <Date>2019-08-16T10:32:00Z</Date>
    <Author>jane@example.com</Author>
    <Comment>Please check</Comment>
  </Comment>"#,
        );
        assert_eq!(validate(doc.as_bytes(), &markup_schema()), Vec::new());
    }

    #[test]
    fn test_bad_date_is_located() {
        let doc = markup(
            r#"  <Comment Guid="0a36e3d6-97e9-4bdf-a3e7-4fd1c5b5e4c1">
    <Date>2019-08-16T10:32:00Z</Date>
    <Author>a</Author>
    <Comment>ok</Comment>
  </Comment>
  <Comment Guid="1a36e3d6-97e9-4bdf-a3e7-4fd1c5b5e4c1">
    <Date>last tuesday</Date>
    <Author>a</Author>
    <Comment>bad</Comment>
  </Comment>"#,
        );
        let violations = validate(doc.as_bytes(), &markup_schema());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location, "/Markup/Comment[2]/Date");
        assert_eq!(violations[0].line, 14);
        assert!(violations[0].message.contains("dateTime"));
    }

    #[test]
    fn test_missing_and_misordered_elements() {
        let doc = format!(
            r#"<Markup>
  <Topic Guid="{}">
    <CreationDate>2019-08-16T10:31:54Z</CreationDate>
    <Title>Late title</Title>
    <CreationAuthor>a</CreationAuthor>
  </Topic>
</Markup>"#,
            TOPIC_GUID
        );
        let violations = validate(doc.as_bytes(), &markup_schema());
        let locations: Vec<&str> = violations.iter().map(|v| v.location.as_str()).collect();
        assert_eq!(locations, vec!["/Markup/Topic/Title", "/Markup/Topic/Title"]);
        assert!(violations[0].message.contains("Missing required element <Title>"));
        assert!(violations[1].message.contains("must appear before"));
    }

    #[test]
    fn test_attributes() {
        let doc = r#"<Markup><Topic TopicType="x" Vendor="y"><Title>t</Title>
<CreationDate>2019-08-16</CreationDate><CreationAuthor>a</CreationAuthor></Topic></Markup>"#;
        let violations = validate(doc.as_bytes(), &markup_schema());
        let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(violations.len(), 2, "{:?}", messages);
        assert_eq!(violations[0].location, "/Markup/Topic/@Vendor");
        assert_eq!(violations[1].location, "/Markup/Topic/@Guid");
    }

    #[test]
    fn test_unexpected_element_and_text() {
        let doc = markup("  <Vendor>data</Vendor>");
        let violations = validate(doc.as_bytes(), &markup_schema());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location, "/Markup/Vendor");
        assert!(violations[0].message.contains("Unexpected element"));
    }

    #[test]
    fn test_too_many() {
        let doc = format!(
            r#"<Markup><Topic Guid="{0}"><Title>t</Title><CreationDate>2019-08-16</CreationDate><CreationAuthor>a</CreationAuthor></Topic><Topic Guid="{0}"><Title>t</Title><CreationDate>2019-08-16</CreationDate><CreationAuthor>a</CreationAuthor></Topic></Markup>"#,
            TOPIC_GUID
        );
        let violations = validate(doc.as_bytes(), &markup_schema());
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].location, "/Markup/Topic[2]");
    }

    #[test]
    fn test_malformed_and_wrong_root() {
        let schema = markup_schema();
        let violations = validate(b"<Markup><Topic></Markup>", &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("not well-formed"));

        let violations = validate(b"<VisualizationInfo/>", &schema);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("Expected root element <Markup>"));
    }

    #[test]
    fn test_visinfo_cameras_are_opaque() {
        let schemas = SchemaSet::bcf_2_1();
        let schema = schemas.get(SchemaKind::VisualizationInfo).unwrap();
        let doc = r#"<VisualizationInfo Guid="3ffb4df2-0187-49a9-8a4a-23992696bafd">
  <Components><Visibility DefaultVisibility="true"/></Components>
  <PerspectiveCamera><CameraViewPoint><X>1</X></CameraViewPoint><Anything/></PerspectiveCamera>
</VisualizationInfo>"#;
        assert!(validate(doc.as_bytes(), schema).is_empty());
    }
}
