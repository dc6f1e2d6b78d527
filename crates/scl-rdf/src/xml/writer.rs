// crates/scl-rdf/src/xml/writer.rs

//! Serializes an `Element` tree back to XML text with `quick-xml`.
//!
//! Indentation is written explicitly as text events so that verbatim blocks
//! can be spliced in unchanged at any depth.

use super::{Document, Element, Node};
use crate::error::CodecError;
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use std::borrow::Cow;

/// Output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level; `0` writes everything on one line.
    pub indent: usize,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: true,
        }
    }
}

impl WriteOptions {
    pub fn compact() -> Self {
        Self {
            indent: 0,
            declaration: false,
        }
    }
}

/// Serializes a document, restoring the namespace declarations on its root.
pub fn write_document(doc: &Document, options: &WriteOptions) -> Result<String, CodecError> {
    let mut writer = Writer::new(Vec::new());
    if options.declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;
        raw(&mut writer, "\n")?;
    }
    write_element(&mut writer, &doc.root, 0, options)?;
    if options.indent > 0 {
        raw(&mut writer, "\n")?;
    }
    into_string(writer)
}

/// Serializes a single element without declaration or indentation.
pub fn element_to_string(element: &Element) -> Result<String, CodecError> {
    let mut writer = Writer::new(Vec::new());
    write_element(&mut writer, element, 0, &WriteOptions::compact())?;
    into_string(writer)
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    depth: usize,
    options: &WriteOptions,
) -> Result<(), CodecError> {
    let mut start = BytesStart::new(element.name.as_str());
    for ns in &element.namespaces {
        let key = ns.attribute_name();
        start.push_attribute(attribute(&key, &ns.uri));
    }
    for attr in &element.attributes {
        start.push_attribute(attribute(&attr.name, &attr.value));
    }

    if element.text.is_none() && element.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(write_error)?;
    }
    for child in &element.children {
        newline(writer, depth + 1, options)?;
        match child {
            Node::Element(e) => write_element(writer, e, depth + 1, options)?,
            Node::Verbatim(v) => raw(writer, &v.xml)?,
        }
    }
    if !element.children.is_empty() {
        newline(writer, depth, options)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(write_error)
}

/// Escapes `value` for a double-quoted attribute. Tabs and line breaks become
/// character references, otherwise a reader normalizes them to spaces.
fn attribute<'a>(name: &'a str, value: &'a str) -> Attribute<'a> {
    let escaped = match escape(value) {
        Cow::Borrowed(s) if !s.contains(['\t', '\n', '\r']) => Cow::Borrowed(s.as_bytes()),
        other => Cow::Owned(
            other
                .replace('\t', "&#9;")
                .replace('\n', "&#10;")
                .replace('\r', "&#13;")
                .into_bytes(),
        ),
    };
    Attribute {
        key: QName(name.as_bytes()),
        value: escaped,
    }
}

fn newline(writer: &mut Writer<Vec<u8>>, depth: usize, options: &WriteOptions) -> Result<(), CodecError> {
    if options.indent == 0 {
        return Ok(());
    }
    let mut ws = String::with_capacity(1 + depth * options.indent);
    ws.push('\n');
    ws.extend(std::iter::repeat_n(' ', depth * options.indent));
    raw(writer, &ws)
}

/// Writes already-escaped markup unchanged.
fn raw(writer: &mut Writer<Vec<u8>>, markup: &str) -> Result<(), CodecError> {
    writer
        .write_event(Event::Text(BytesText::from_escaped(markup)))
        .map_err(write_error)
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String, CodecError> {
    String::from_utf8(writer.into_inner()).map_err(write_error)
}

fn write_error(e: impl std::fmt::Display) -> CodecError {
    CodecError::Write(e.to_string())
}
