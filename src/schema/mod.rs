//! Schema validation of BCF parts
//!
//! Each XML part kind has a schema: a tree of element declarations with their
//! attributes, child sequences and value types. [`validate`] checks a byte
//! stream against one of them and reports every problem it finds as a
//! [`Violation`]. It never fails: a document that is not even well-formed is
//! reported as a single violation.
//!
//! The built-in [`SchemaSet::bcf_2_1`] mirrors the published BCF 2.1 XSDs
//! (`version.xsd`, `project.xsd`, `markup.xsd`, `visinfo.xsd`,
//! `extensions.xsd`). Loading XSD documents from disk is left to the caller,
//! who can build an equivalent [`SchemaSet`] and pass it through
//! [`BcfConfig::with_schema_set`](crate::BcfConfig::with_schema_set).

mod bcf21;
mod rules;

pub use rules::validate;

use chrono::{Offset, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Part kinds that have a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SchemaKind {
    /// `bcf.version`
    Version,
    /// `project.bcfp`
    Project,
    /// `markup.bcf` of a topic
    Markup,
    /// `.bcfv` viewpoint definitions
    VisualizationInfo,
    /// `extensions.xsd` shipped inside a project
    Extensions,
}

/// Lexical types of attribute values and text content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Any string
    String,
    /// A GUID in `8-4-4-4-12` hex form
    Guid,
    /// `xs:boolean`
    Boolean,
    /// `xs:dateTime` (a bare `xs:date` is tolerated)
    DateTime,
    /// `xs:integer`
    Integer,
    /// `xs:double`
    Double,
    /// `xs:anyURI`
    Uri,
}

impl ValueType {
    /// Check whether `value` is in the lexical space of this type
    pub fn accepts(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            ValueType::String | ValueType::Uri => true,
            ValueType::Guid => is_guid(value),
            ValueType::Boolean => matches!(value, "true" | "false" | "1" | "0"),
            ValueType::DateTime => crate::timestamp::parse(value, Utc.fix()).is_some(),
            ValueType::Integer => value.parse::<i64>().is_ok(),
            ValueType::Double => {
                matches!(value, "INF" | "-INF" | "NaN") || value.parse::<f64>().is_ok()
            }
        }
    }
}

/// GUIDs in BCF are written `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`
pub(crate) fn is_guid(value: &str) -> bool {
    value.len() == 36 && uuid::Uuid::try_parse(value).is_ok()
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Guid => "GUID",
            ValueType::Boolean => "boolean",
            ValueType::DateTime => "dateTime",
            ValueType::Integer => "integer",
            ValueType::Double => "double",
            ValueType::Uri => "anyURI",
        };
        f.write_str(name)
    }
}

/// Declaration of an attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDecl {
    /// Local name of the attribute
    pub name: String,
    /// Type of the value
    pub value_type: ValueType,
    /// Whether the attribute must be present
    pub required: bool,
}

/// What an element may contain
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// No children, no text
    Empty,
    /// Text of the given type, no children
    Text(ValueType),
    /// Child elements in the given order
    Sequence(Vec<Particle>),
    /// Anything; the subtree is not checked
    Any,
}

/// An element occurring within a sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// The declared element
    pub element: ElementDecl,
    /// Minimum number of occurrences
    pub min_occurs: u32,
    /// Maximum number of occurrences, `None` for unbounded
    pub max_occurs: Option<u32>,
}

/// Declaration of an element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    /// Local name of the element
    pub name: String,
    /// Declared attributes
    pub attributes: Vec<AttributeDecl>,
    /// Declared content
    pub content: Content,
}

impl ElementDecl {
    /// Element with text content of the given type
    pub fn text(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            content: Content::Text(value_type),
        }
    }

    /// Element without content
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            content: Content::Empty,
        }
    }

    /// Element whose content is not checked
    pub fn any(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            content: Content::Any,
        }
    }

    /// Element with a sequence of children
    pub fn sequence(name: &str, particles: Vec<Particle>) -> Self {
        Self {
            name: name.to_string(),
            attributes: Vec::new(),
            content: Content::Sequence(particles),
        }
    }

    /// Add a required attribute
    pub fn with_required(mut self, name: &str, value_type: ValueType) -> Self {
        self.attributes.push(AttributeDecl {
            name: name.to_string(),
            value_type,
            required: true,
        });
        self
    }

    /// Add an optional attribute
    pub fn with_optional(mut self, name: &str, value_type: ValueType) -> Self {
        self.attributes.push(AttributeDecl {
            name: name.to_string(),
            value_type,
            required: false,
        });
        self
    }

    /// Exactly one occurrence
    pub fn once(self) -> Particle {
        self.occurs(1, Some(1))
    }

    /// Zero or one occurrence
    pub fn optional(self) -> Particle {
        self.occurs(0, Some(1))
    }

    /// Any number of occurrences
    pub fn many(self) -> Particle {
        self.occurs(0, None)
    }

    /// One or more occurrences
    pub fn at_least_once(self) -> Particle {
        self.occurs(1, None)
    }

    /// Explicit occurrence bounds
    pub fn occurs(self, min_occurs: u32, max_occurs: Option<u32>) -> Particle {
        Particle {
            element: self,
            min_occurs,
            max_occurs,
        }
    }

    /// Declared attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A schema for one part kind
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Part kind the schema applies to
    pub kind: SchemaKind,
    /// Declaration of the root element
    pub root: ElementDecl,
}

/// Mapping from schema identity to schema content
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: BTreeMap<SchemaKind, Schema>,
}

impl SchemaSet {
    /// A set without any schema; validation then reports nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// The BCF 2.1 schemas
    pub fn bcf_2_1() -> Self {
        let mut set = Self::empty();
        set.insert(bcf21::version());
        set.insert(bcf21::project());
        set.insert(bcf21::markup());
        set.insert(bcf21::visualization_info());
        set.insert(bcf21::extensions());
        set
    }

    /// Add or replace the schema for its kind
    pub fn insert(&mut self, schema: Schema) {
        self.schemas.insert(schema.kind, schema);
    }

    /// Add or replace a schema, builder style
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.insert(schema);
        self
    }

    /// Schema for a part kind
    pub fn get(&self, kind: SchemaKind) -> Option<&Schema> {
        self.schemas.get(&kind)
    }
}

/// One problem found by [`validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Element path, e.g. `/Markup/Comment[2]/Date` or `/Markup/Topic/@Guid`
    pub location: String,
    /// 1-based line of the offending node
    pub line: usize,
    /// 1-based column of the offending node
    pub column: usize,
    /// Description of the problem
    pub message: String,
}

impl Violation {
    /// Whether the violation is located at `path` or inside it
    pub fn is_within(&self, path: &str) -> bool {
        match self.location.strip_prefix(path) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {}): {}",
            self.location, self.line, self.column, self.message
        )
    }
}
