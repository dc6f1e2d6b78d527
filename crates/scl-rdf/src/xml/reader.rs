// crates/scl-rdf/src/xml/reader.rs

//! Builds an `Element` tree from XML text with `quick-xml`.

use super::{Attribute, Document, Element, Namespace, Node, VerbatimBlock, local_name};
use crate::error::CodecError;
use log::trace;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use std::collections::BTreeSet;

/// Controls which elements are captured as verbatim source text.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Local names of elements kept verbatim instead of being parsed into
    /// the tree. The document root is never captured.
    pub verbatim_tags: BTreeSet<String>,
}

impl ParseOptions {
    pub fn with_verbatim_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            verbatim_tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    fn is_verbatim(&self, qualified: &str) -> bool {
        self.verbatim_tags.contains(local_name(qualified))
    }
}

/// An element being built, with the raw text collected before its first child.
struct Frame {
    element: Element,
    text: String,
}

impl Frame {
    fn new(element: Element) -> Self {
        Self {
            element,
            text: String::new(),
        }
    }

    /// Moves the collected text into the element, trimmed.
    fn close_text(&mut self) {
        if self.element.text.is_none() && self.element.children.is_empty() {
            let trimmed = self.text.trim();
            if !trimmed.is_empty() {
                self.element.text = Some(trimmed.to_string());
            }
        }
        self.text.clear();
    }

    fn push_child(&mut self, child: Node) {
        self.close_text();
        self.element.children.push(child);
    }

    fn accepts_text(&self) -> bool {
        self.element.children.is_empty()
    }
}

/// Parses `input` into a `Document`.
///
/// Comments, processing instructions and the DOCTYPE are skipped. Text that
/// follows an element's first child is not kept.
///
/// # Errors
/// Returns `CodecError::Parse` for malformed XML, a missing root element or
/// content after the root element.
pub fn parse_document(input: &str, options: &ParseOptions) -> Result<Document, CodecError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| syntax_error(reader.error_position() as u64, e))?;

        match event {
            Event::Start(e) => {
                let (name, namespaces, attributes) = read_start(&e, start)?;
                ensure_single_root(&root, start)?;
                if !stack.is_empty() && options.is_verbatim(&name) {
                    let end_name = e.name().as_ref().to_vec();
                    reader
                        .read_to_end(QName(&end_name))
                        .map_err(|err| syntax_error(reader.error_position() as u64, err))?;
                    let stop = reader.buffer_position() as usize;
                    // `read_to_end` only balances same-named tags; check the inside too.
                    let block = read_verbatim(&input[start..stop]).map_err(|err| match err {
                        CodecError::Parse { position, message } => CodecError::Parse {
                            position: position + start as u64,
                            message,
                        },
                        other => other,
                    })?;
                    trace!("captured verbatim <{}> ({} bytes)", block.name, block.xml.len());
                    if let Some(parent) = stack.last_mut() {
                        parent.push_child(Node::Verbatim(block));
                    }
                } else {
                    stack.push(Frame::new(Element {
                        name,
                        namespaces,
                        attributes,
                        ..Default::default()
                    }));
                }
            }
            Event::Empty(e) => {
                let (name, namespaces, attributes) = read_start(&e, start)?;
                ensure_single_root(&root, start)?;
                let stop = reader.buffer_position() as usize;
                match stack.last_mut() {
                    Some(parent) if options.is_verbatim(&name) => {
                        parent.push_child(Node::Verbatim(VerbatimBlock {
                            name,
                            attributes,
                            xml: input[start..stop].to_string(),
                        }));
                    }
                    Some(parent) => parent.push_child(Node::Element(Element {
                        name,
                        namespaces,
                        attributes,
                        ..Default::default()
                    })),
                    None => {
                        root = Some(Element {
                            name,
                            namespaces,
                            attributes,
                            ..Default::default()
                        })
                    }
                }
            }
            Event::End(_) => {
                let mut frame = stack.pop().ok_or_else(|| CodecError::Parse {
                    position: start as u64,
                    message: "unexpected end tag".into(),
                })?;
                frame.close_text();
                match stack.last_mut() {
                    Some(parent) => parent.push_child(Node::Element(frame.element)),
                    None => root = Some(frame.element),
                }
            }
            Event::Text(t) => {
                if let Some(frame) = stack.last_mut().filter(|f| f.accepts_text()) {
                    let raw = utf8(&t, start)?;
                    let text = quick_xml::escape::unescape(raw)
                        .map_err(|e| syntax_error(start as u64, e))?;
                    frame.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(frame) = stack.last_mut().filter(|f| f.accepts_text()) {
                    frame.text.push_str(utf8(&c, start)?);
                }
            }
            Event::GeneralRef(r) => {
                if let Some(frame) = stack.last_mut().filter(|f| f.accepts_text()) {
                    let entity = utf8(&r, start)?;
                    frame.text.push(resolve_reference(entity, start)?);
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and DOCTYPE.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(CodecError::Parse {
            position: input.len() as u64,
            message: format!("unexpected end of input inside <{}>", open.element.name),
        });
    }
    root.map(Document::new).ok_or(CodecError::Parse {
        position: 0,
        message: "document has no root element".into(),
    })
}

/// Re-reads the start tag of a verbatim payload and checks that the payload
/// is well-formed XML with a single top-level element.
pub(crate) fn read_verbatim(xml: &str) -> Result<VerbatimBlock, CodecError> {
    let mut reader = Reader::from_str(xml);
    let mut head: Option<(String, Vec<Attribute>)> = None;
    let mut depth = 0usize;

    loop {
        let start = reader.buffer_position() as usize;
        match reader
            .read_event()
            .map_err(|e| syntax_error(reader.error_position() as u64, e))?
        {
            Event::Start(e) | Event::Empty(e) if depth == 0 && head.is_some() => {
                return Err(CodecError::Parse {
                    position: start as u64,
                    message: format!(
                        "verbatim block has a second top-level element <{}>",
                        String::from_utf8_lossy(e.name().as_ref())
                    ),
                });
            }
            Event::Start(e) => {
                if head.is_none() {
                    let (name, _, attributes) = read_start(&e, start)?;
                    head = Some((name, attributes));
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if head.is_none() {
                    let (name, _, attributes) = read_start(&e, start)?;
                    head = Some((name, attributes));
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(CodecError::Parse {
            position: xml.len() as u64,
            message: "verbatim block is not closed".into(),
        });
    }
    let (name, attributes) = head.ok_or(CodecError::Parse {
        position: 0,
        message: "verbatim block contains no element".into(),
    })?;
    Ok(VerbatimBlock {
        name,
        attributes,
        xml: xml.to_string(),
    })
}

fn ensure_single_root(root: &Option<Element>, position: usize) -> Result<(), CodecError> {
    if root.is_some() {
        return Err(CodecError::Parse {
            position: position as u64,
            message: "content after the root element".into(),
        });
    }
    Ok(())
}

/// Splits a start tag into its name, namespace declarations and attributes.
fn read_start(
    e: &BytesStart<'_>,
    position: usize,
) -> Result<(String, Vec<Namespace>, Vec<Attribute>), CodecError> {
    let name = utf8(e.name().as_ref(), position)?.to_string();
    let mut namespaces = Vec::new();
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr.map_err(|err| syntax_error(position as u64, err))?;
        let key = utf8(attr.key.as_ref(), position)?;
        let value = quick_xml::escape::unescape(utf8(&attr.value, position)?)
            .map_err(|err| syntax_error(position as u64, err))?
            .into_owned();
        match Namespace::declared_prefix(key) {
            Some(prefix) => namespaces.push(Namespace {
                prefix: prefix.map(str::to_string),
                uri: value,
            }),
            None => attributes.push(Attribute::new(key, value)),
        }
    }
    Ok((name, namespaces, attributes))
}

/// Resolves the body of an `&...;` reference to its character.
fn resolve_reference(entity: &str, position: usize) -> Result<char, CodecError> {
    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        quick_xml::escape::resolve_xml_entity(entity).and_then(|s| s.chars().next().map(u32::from))
    };
    code.and_then(char::from_u32).ok_or_else(|| CodecError::Parse {
        position: position as u64,
        message: format!("unknown entity reference &{};", entity),
    })
}

fn utf8(bytes: &[u8], position: usize) -> Result<&str, CodecError> {
    std::str::from_utf8(bytes).map_err(|e| syntax_error(position as u64, e))
}

fn syntax_error(position: u64, e: impl std::fmt::Display) -> CodecError {
    CodecError::Parse {
        position,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn private_options() -> ParseOptions {
        ParseOptions::with_verbatim_tags(["Private"])
    }

    #[test]
    fn test_parse_structure_text_and_namespaces() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated -->
<SCL xmlns="http://www.iec.ch/61850/2003/SCL" xmlns:rte="http://www.rte-international.com" version="2007">
  <Header id="demo"/>
  <Substation name="S1">
    <Text>  Main &amp; backup  </Text>
  </Substation>
</SCL>"#;
        let doc = parse_document(xml, &ParseOptions::default()).unwrap();
        let root = &doc.root;
        assert_eq!(root.name, "SCL");
        assert_eq!(
            root.namespaces,
            vec![
                Namespace::default_ns("http://www.iec.ch/61850/2003/SCL"),
                Namespace::prefixed("rte", "http://www.rte-international.com"),
            ]
        );
        assert_eq!(root.attributes, vec![Attribute::new("version", "2007")]);
        assert_eq!(root.text, None);
        assert_eq!(root.children.len(), 2);

        let substation = root.children[1].as_element().unwrap();
        let text = substation.children[0].as_element().unwrap();
        assert_eq!(text.text.as_deref(), Some("Main & backup"));
    }

    #[test]
    fn test_private_is_captured_verbatim() {
        let xml = "<SCL><Header/><Private type=\"vendor-x\">\n  <custom:blob attr=\"1\"/>\n</Private><IED name=\"a\"/></SCL>";
        let doc = parse_document(xml, &private_options()).unwrap();
        let children = &doc.root.children;
        assert_eq!(children.len(), 3);
        let block = children[1].as_verbatim().unwrap();
        assert_eq!(block.name, "Private");
        assert_eq!(block.attribute("type"), Some("vendor-x"));
        assert_eq!(
            block.xml,
            "<Private type=\"vendor-x\">\n  <custom:blob attr=\"1\"/>\n</Private>"
        );
        assert_eq!(children[2].local_name(), "IED");
    }

    #[test]
    fn test_empty_private_is_captured_verbatim() {
        let xml = "<SCL><Private type=\"t\"/></SCL>";
        let doc = parse_document(xml, &private_options()).unwrap();
        let block = doc.root.children[0].as_verbatim().unwrap();
        assert_eq!(block.xml, "<Private type=\"t\"/>");
    }

    #[test]
    fn test_character_references() {
        let xml = "<a>caf&#xE9; &#65;&lt;</a>";
        let doc = parse_document(xml, &ParseOptions::default()).unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("café A<"));
    }

    #[test]
    fn test_text_after_first_child_is_dropped() {
        let xml = "<a>head<b/>tail</a>";
        let doc = parse_document(xml, &ParseOptions::default()).unwrap();
        assert_eq!(doc.root.text.as_deref(), Some("head"));
        assert_eq!(doc.root.children.len(), 1);
    }

    #[test]
    fn test_malformed_inputs() {
        let opts = ParseOptions::default();
        assert!(matches!(
            parse_document("<a><b></a>", &opts),
            Err(CodecError::Parse { .. })
        ));
        assert!(matches!(
            parse_document("<a><b>", &opts),
            Err(CodecError::Parse { .. })
        ));
        assert!(matches!(parse_document("", &opts), Err(CodecError::Parse { .. })));
        assert!(matches!(
            parse_document("<a/><b/>", &opts),
            Err(CodecError::Parse { .. })
        ));
    }

    #[test]
    fn test_read_verbatim() {
        let block = read_verbatim("<Private type=\"x\"><p:q a=\"1\"/></Private>").unwrap();
        assert_eq!(block.name, "Private");
        assert_eq!(block.attribute("type"), Some("x"));

        assert!(read_verbatim("<Private>").is_err());
        assert!(read_verbatim("just text").is_err());
        assert!(read_verbatim("<a/><b/>").is_err());
    }
}
