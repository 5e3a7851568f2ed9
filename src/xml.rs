//! Minimal XML element tree shared by the schema validator and the entity parser
//!
//! BCF documents are small, so each part is read once into a tree of
//! [`XmlElement`]s. Every element remembers the byte span it occupies in the
//! source, which lets the parser keep unknown nodes as the exact source text.

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::ops::Range;

/// Default buffer capacity for XML parsing (4KB)
const XML_BUFFER_CAPACITY: usize = 4096;

/// An element of a parsed document
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct XmlElement {
    /// Qualified name as written in the source
    pub name: String,
    /// Attributes in source order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child elements in source order
    pub children: Vec<XmlElement>,
    /// Unescaped character data directly inside this element
    pub text: String,
    /// Byte range of the whole element in the source
    pub span: Range<usize>,
}

/// A document that is not well-formed
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct XmlFault {
    /// Byte offset at which the reader gave up
    pub position: usize,
    /// Description of the problem
    pub message: String,
}

impl XmlElement {
    fn from_start(e: &BytesStart<'_>, start: usize) -> Result<Self, XmlFault> {
        let name = std::str::from_utf8(e.name().as_ref())
            .map_err(|err| XmlFault::at(start, format!("Element name is not UTF-8: {}", err)))?
            .to_string();

        let mut attributes = Vec::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|err| XmlFault::at(start, err.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|err| XmlFault::at(start, err.to_string()))?;
            let raw = std::str::from_utf8(&attr.value)
                .map_err(|err| XmlFault::at(start, err.to_string()))?;
            let value = unescape(raw).map_err(|err| XmlFault::at(start, err.to_string()))?;
            attributes.push((key.to_string(), value.into_owned()));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
            span: start..start,
        })
    }

    /// Element name without namespace prefix
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Attribute value by local name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == name && !key.starts_with("xmlns"))
            .map(|(_, value)| value.as_str())
    }

    /// First child with the given local name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name() == name)
    }

    /// All children with the given local name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local_name() == name)
    }

    /// Text of the first child with the given local name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// The exact source text of this element
    pub fn raw<'s>(&self, source: &'s [u8]) -> &'s [u8] {
        &source[self.span.clone()]
    }
}

impl XmlFault {
    fn at(position: usize, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// Extract local name from a potentially prefixed XML name
///
/// - `"xsi:schemaLocation"` returns `"schemaLocation"`
/// - `"Topic"` returns `"Topic"`
pub(crate) fn local_name(name: &str) -> &str {
    match name.rfind(':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

/// Parse a whole document into its root element
pub(crate) fn parse_document(source: &[u8]) -> Result<XmlElement, XmlFault> {
    let mut reader = Reader::from_reader(source);
    // Whitespace is kept as separate events so element spans start exactly at '<'
    reader.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(XML_BUFFER_CAPACITY);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        buf.clear();
        let before = reader.buffer_position() as usize;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| XmlFault::at(reader.error_position() as usize, err.to_string()))?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(ref e) => {
                stack.push(XmlElement::from_start(e, before)?);
            }
            Event::Empty(ref e) => {
                let mut element = XmlElement::from_start(e, before)?;
                element.span = before..after;
                attach(&mut stack, &mut root, element, before)?;
            }
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| XmlFault::at(before, "Unmatched end tag"))?;
                element.span.end = after;
                attach(&mut stack, &mut root, element, before)?;
            }
            Event::Text(ref t) => {
                let raw = std::str::from_utf8(t)
                    .map_err(|err| XmlFault::at(before, err.to_string()))?;
                match stack.last_mut() {
                    Some(top) => {
                        let text = unescape(raw).map_err(|err| XmlFault::at(before, err.to_string()))?;
                        top.text.push_str(&text);
                    }
                    None if raw.trim_start_matches('\u{feff}').trim().is_empty() => {}
                    None => return Err(XmlFault::at(before, "Text outside of the root element")),
                }
            }
            Event::GeneralRef(ref r) => {
                let name = std::str::from_utf8(r)
                    .map_err(|err| XmlFault::at(before, err.to_string()))?;
                let reference = format!("&{};", name);
                let resolved = unescape(&reference)
                    .map_err(|err| XmlFault::at(before, err.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&resolved);
                }
            }
            Event::CData(ref c) => {
                let text = std::str::from_utf8(c)
                    .map_err(|err| XmlFault::at(before, err.to_string()))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(text);
                }
            }
            Event::DocType(_) => {
                // DTDs can pull in external entities
                return Err(XmlFault::at(
                    before,
                    "DTD declarations are not allowed in BCF documents",
                ));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlFault::at(
            source.len(),
            format!("Element <{}> is not closed", open.name),
        ));
    }

    root.ok_or_else(|| XmlFault::at(0, "Document has no root element"))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    position: usize,
) -> Result<(), XmlFault> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(XmlFault::at(position, "Document has more than one root element")),
    }
}

/// Children of `parent` paired with their element paths
///
/// The position is only written when several siblings share a name, so the
/// single topic of a markup file is `/Markup/Topic` while its comments are
/// `/Markup/Comment[1]`, `/Markup/Comment[2]`, ...
pub(crate) fn child_paths<'a>(
    parent: &'a XmlElement,
    parent_path: &str,
) -> Vec<(&'a XmlElement, String)> {
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for child in &parent.children {
        *totals.entry(child.local_name()).or_default() += 1;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    parent
        .children
        .iter()
        .map(|child| {
            let name = child.local_name();
            let position = seen.entry(name).or_default();
            *position += 1;
            let path = if totals.get(name).copied().unwrap_or(0) > 1 {
                format!("{}/{}[{}]", parent_path, name, position)
            } else {
                format!("{}/{}", parent_path, name)
            };
            (child, path)
        })
        .collect()
}

/// 1-based line and column of a byte offset
pub(crate) fn line_column(source: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0);
    (line, offset - line_start + 1)
}
