//! XML writing for BCF parts
//!
//! Serializes entities back into schema-conforming XML. Output is canonical:
//! elements follow schema order, unordered collections are sorted, and
//! timestamps use one fixed lexical form, so writing an unchanged entity twice
//! gives identical bytes. Captured extension content is written back verbatim
//! after the modelled content of its element.

mod markup;
mod project;

pub(crate) use markup::{MarkupDialect, write_markup};
pub(crate) use project::{write_project, write_version};

use crate::error::{Error, Result};
use crate::model::Extensions;
use crate::timestamp::{self, Timestamp};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Write as IoWrite;

/// Create an indenting writer over a byte buffer
fn new_writer() -> Writer<Vec<u8>> {
    Writer::new_with_indent(Vec::new(), b' ', 2)
}

fn write_declaration<W: IoWrite>(writer: &mut Writer<W>) -> Result<()> {
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| Error::xml_write(format!("Failed to write XML declaration: {}", e)))
}

fn start<W: IoWrite>(writer: &mut Writer<W>, elem: BytesStart<'_>) -> Result<()> {
    let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    writer
        .write_event(Event::Start(elem))
        .map_err(|e| Error::xml_write(format!("Failed to write {} element: {}", name, e)))
}

fn end<W: IoWrite>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| Error::xml_write(format!("Failed to close {} element: {}", name, e)))
}

fn empty<W: IoWrite>(writer: &mut Writer<W>, elem: BytesStart<'_>) -> Result<()> {
    let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
    writer
        .write_event(Event::Empty(elem))
        .map_err(|e| Error::xml_write(format!("Failed to write {} element: {}", name, e)))
}

/// Write `<name>value</name>`
fn text_element<W: IoWrite>(writer: &mut Writer<W>, name: &str, value: &str) -> Result<()> {
    start(writer, BytesStart::new(name))?;
    writer
        .write_event(Event::Text(BytesText::new(value)))
        .map_err(|e| Error::xml_write(format!("Failed to write {} text: {}", name, e)))?;
    end(writer, name)
}

fn optional_text<W: IoWrite>(writer: &mut Writer<W>, name: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(value) => text_element(writer, name, value),
        None => Ok(()),
    }
}

fn optional_timestamp<W: IoWrite>(
    writer: &mut Writer<W>,
    name: &str,
    value: Option<&Timestamp>,
) -> Result<()> {
    match value {
        Some(value) => text_element(writer, name, &timestamp::format(value)),
        None => Ok(()),
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Append captured attributes after the known ones
fn push_extension_attributes(elem: &mut BytesStart<'_>, extensions: &Extensions) {
    for (key, value) in &extensions.attributes {
        elem.push_attribute((key.as_str(), value.as_str()));
    }
}

/// Write captured elements exactly as they were read
fn write_raw_elements<W: IoWrite>(writer: &mut Writer<W>, extensions: &Extensions) -> Result<()> {
    for element in &extensions.elements {
        writer
            .write_indent()
            .and_then(|_| writer.get_mut().write_all(element.xml.as_bytes()))
            .map_err(|e| {
                Error::xml_write(format!(
                    "Failed to write extension element {}: {}",
                    element.name, e
                ))
            })?;
    }
    Ok(())
}
