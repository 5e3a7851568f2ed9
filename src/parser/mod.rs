//! Mapping XML parts into entities
//!
//! Parsing is tolerant. Every node is parsed into a [`NodeResult`]: either the
//! value, or a diagnostic explaining why the node was dropped. The
//! parse context aggregates those results, so a bad date in one comment
//! costs that date and nothing else. Only a part that cannot be read at all
//! (not well-formed, wrong root, unusable identifier) yields no entity.
//!
//! Elements and attributes the engine does not model are captured as
//! [`Extensions`] with their exact source text.

mod markup;
mod project;
mod visinfo;

pub use markup::parse_markup;
pub use project::{parse_project, parse_version};
pub use visinfo::parse_visualization_info;

use crate::config::BcfConfig;
use crate::diagnostic::Diagnostic;
use crate::model::{Extensions, RawElement};
use crate::schema::Violation;
use crate::timestamp::{self, Timestamp};
use crate::xml::{self, XmlElement};
use chrono::FixedOffset;
use uuid::Uuid;

/// Outcome of parsing one node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeResult<T> {
    /// The node was mapped
    Parsed(T),
    /// The node was dropped
    Skipped(Diagnostic),
}

impl<T> NodeResult<T> {
    /// Map the parsed value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NodeResult<U> {
        match self {
            NodeResult::Parsed(value) => NodeResult::Parsed(f(value)),
            NodeResult::Skipped(diagnostic) => NodeResult::Skipped(diagnostic),
        }
    }

    /// The parsed value, if any
    pub fn ok(self) -> Option<T> {
        match self {
            NodeResult::Parsed(value) => Some(value),
            NodeResult::Skipped(_) => None,
        }
    }

    /// Check if the node was mapped
    pub fn is_parsed(&self) -> bool {
        matches!(self, NodeResult::Parsed(_))
    }
}

/// Outcome of parsing one part
#[derive(Debug, Clone, PartialEq)]
pub struct PartParse<T> {
    /// The entity, `None` if the part was unusable
    pub value: Option<T>,
    /// Everything that was dropped or assumed on the way
    pub diagnostics: Vec<Diagnostic>,
}

/// State shared by the parsers of one part
pub(crate) struct ParseContext<'a> {
    part_name: &'a str,
    source: &'a [u8],
    violations: &'a [Violation],
    naive_offset: FixedOffset,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ParseContext<'a> {
    pub fn new(
        part_name: &'a str,
        source: &'a [u8],
        violations: &'a [Violation],
        config: &BcfConfig,
    ) -> Self {
        Self {
            part_name,
            source,
            violations,
            naive_offset: config.naive_offset(),
            diagnostics: Vec::new(),
        }
    }

    pub fn source(&self) -> &'a [u8] {
        self.source
    }

    /// Parse the document, or give up on the whole part
    pub fn document(&mut self, root_name: &str) -> Option<XmlElement> {
        let root = match xml::parse_document(self.source) {
            Ok(root) => root,
            Err(fault) => {
                let (line, column) = xml::line_column(self.source, fault.position);
                self.diagnostics.push(Diagnostic::degraded(
                    self.part_name,
                    format!("/ (line {}, column {})", line, column),
                    format!("Part is not well-formed XML: {}", fault.message),
                ));
                return None;
            }
        };

        if root.local_name() != root_name {
            let diagnostic = self.skip(
                &root,
                &format!("/{}", root.local_name()),
                format!("Expected <{}> as root element", root_name),
            );
            self.diagnostics.push(diagnostic);
            return None;
        }
        Some(root)
    }

    /// Build the diagnostic for a dropped node
    ///
    /// Schema violations reported inside the node are quoted so the caller
    /// sees the underlying cause.
    pub fn skip(&self, element: &XmlElement, path: &str, message: impl Into<String>) -> Diagnostic {
        let mut message = message.into();
        let causes: Vec<&str> = self
            .violations
            .iter()
            .filter(|v| v.is_within(path))
            .map(|v| v.message.as_str())
            .collect();
        if !causes.is_empty() {
            message = format!("{} ({})", message, causes.join("; "));
        }
        Diagnostic::degraded(self.part_name, self.location(element, path), message)
    }

    /// Location string of a node: its path and position
    pub fn location(&self, element: &XmlElement, path: &str) -> String {
        let (line, column) = xml::line_column(self.source, element.span.start);
        format!("{} (line {}, column {})", path, line, column)
    }

    /// Record a diagnostic
    pub fn note(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Unwrap a node result, recording the diagnostic of a skipped node
    pub fn accept<T>(&mut self, result: NodeResult<T>) -> Option<T> {
        match result {
            NodeResult::Parsed(value) => Some(value),
            NodeResult::Skipped(diagnostic) => {
                self.diagnostics.push(diagnostic);
                None
            }
        }
    }

    pub fn finish<T>(self, value: Option<T>) -> PartParse<T> {
        PartParse {
            value,
            diagnostics: self.diagnostics,
        }
    }

    /// Part name being parsed
    pub fn part_name(&self) -> &'a str {
        self.part_name
    }

    /// Trimmed text of a child, `None` if the child is absent
    pub fn text(&self, element: &XmlElement, child: &str) -> Option<String> {
        element.child_text(child).map(|t| t.trim().to_string())
    }

    /// Trimmed text of every child with the given name
    pub fn texts(&self, element: &XmlElement, child: &str) -> Vec<String> {
        element
            .children_named(child)
            .map(|c| c.text.trim().to_string())
            .collect()
    }

    /// An optional GUID attribute
    pub fn guid_attr(
        &self,
        element: &XmlElement,
        attr: &str,
        path: &str,
    ) -> NodeResult<Option<Uuid>> {
        match element.attr(attr) {
            None => NodeResult::Parsed(None),
            Some(value) => match parse_guid(value) {
                Some(guid) => NodeResult::Parsed(Some(guid)),
                None => NodeResult::Skipped(self.skip(
                    element,
                    &format!("{}/@{}", path, attr),
                    format!("'{}' is not a valid GUID", value),
                )),
            },
        }
    }

    /// A GUID attribute the node cannot exist without
    pub fn required_guid(&self, element: &XmlElement, attr: &str, path: &str) -> NodeResult<Uuid> {
        match self.guid_attr(element, attr, path) {
            NodeResult::Parsed(Some(guid)) => NodeResult::Parsed(guid),
            NodeResult::Parsed(None) => NodeResult::Skipped(self.skip(
                element,
                path,
                format!("<{}> has no {} attribute", element.local_name(), attr),
            )),
            NodeResult::Skipped(diagnostic) => NodeResult::Skipped(diagnostic),
        }
    }

    /// An optional timestamp child
    pub fn timestamp(
        &self,
        element: &XmlElement,
        child: &str,
        path: &str,
    ) -> NodeResult<Option<Timestamp>> {
        let Some(node) = element.child(child) else {
            return NodeResult::Parsed(None);
        };
        match timestamp::parse(&node.text, self.naive_offset) {
            Some(instant) => NodeResult::Parsed(Some(instant)),
            None => NodeResult::Skipped(self.skip(
                node,
                &format!("{}/{}", path, child),
                format!("Dropped {}: '{}' is not a date", child, node.text.trim()),
            )),
        }
    }

    /// An optional integer child
    pub fn integer(&self, element: &XmlElement, child: &str, path: &str) -> NodeResult<Option<i64>> {
        let Some(node) = element.child(child) else {
            return NodeResult::Parsed(None);
        };
        match node.text.trim().parse::<i64>() {
            Ok(value) => NodeResult::Parsed(Some(value)),
            Err(_) => NodeResult::Skipped(self.skip(
                node,
                &format!("{}/{}", path, child),
                format!("Dropped {}: '{}' is not an integer", child, node.text.trim()),
            )),
        }
    }

    /// A boolean attribute with a default
    pub fn boolean_attr(
        &self,
        element: &XmlElement,
        attr: &str,
        default: bool,
        path: &str,
    ) -> NodeResult<bool> {
        match element.attr(attr).map(str::trim) {
            None => NodeResult::Parsed(default),
            Some("true") | Some("1") => NodeResult::Parsed(true),
            Some("false") | Some("0") => NodeResult::Parsed(false),
            Some(other) => NodeResult::Skipped(self.skip(
                element,
                &format!("{}/@{}", path, attr),
                format!("Ignored {}: '{}' is not a boolean", attr, other),
            )),
        }
    }

    /// Capture attributes and children that are not in the known lists
    pub fn extensions(
        &self,
        element: &XmlElement,
        known_attributes: &[&str],
        known_children: &[&str],
    ) -> Extensions {
        let attributes = element
            .attributes
            .iter()
            .filter(|(key, _)| {
                key.starts_with("xmlns") || !known_attributes.contains(&xml::local_name(key))
            })
            .cloned()
            .collect();

        let elements = element
            .children
            .iter()
            .filter(|child| !known_children.contains(&child.local_name()))
            .map(|child| RawElement {
                name: child.name.clone(),
                xml: String::from_utf8_lossy(child.raw(self.source)).into_owned(),
            })
            .collect();

        Extensions {
            attributes,
            elements,
        }
    }
}

/// Parse a GUID as written in BCF
pub(crate) fn parse_guid(value: &str) -> Option<Uuid> {
    let value = value.trim();
    if crate::schema::is_guid(value) {
        Uuid::try_parse(value).ok()
    } else {
        None
    }
}
