// crates/scl-rdf/src/encoder.rs

//! Encodes a document tree into triples.
//!
//! Every element and opaque block takes the next value of a per-call
//! `OrderCounter` in pre-order. The value is written as a triple and embedded
//! in the entity IRI, which makes IRIs unique even when thousands of siblings
//! share a name, and lets the decoder restore the exact sibling sequence.

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::escape::encode_component;
use crate::graph::{Graph, Term};
use crate::registry::{Role, TagRegistry};
use crate::vocab::{RDF_TYPE, Vocabulary};
use crate::xml::{Document, Element, Node, element_to_string};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info};
use std::borrow::Cow;

/// Result of encoding one document.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub graph: Graph,
    /// IRI of the document-root entity.
    pub root: String,
    /// Regular elements, root included.
    pub element_count: usize,
    pub opaque_count: usize,
}

/// Pre-order position source, owned by a single encode call.
#[derive(Debug, Default)]
pub struct OrderCounter {
    last: u64,
}

impl OrderCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next order value. The first value is 1.
    pub fn next_order(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    pub fn last(&self) -> u64 {
        self.last
    }
}

/// Builds the IRI of an element.
///
/// - parent and id/name: `{parent}/{id}_{order}`
/// - id/name only: `{namespace}{tag}/{id}`
/// - parent only: `{parent}/{tag}_{order}`
/// - neither: `{namespace}{tag}_{order}`
pub fn element_uri(
    element_namespace: &str,
    parent: Option<&str>,
    tag: &str,
    id_or_name: Option<&str>,
    order: u64,
) -> String {
    match (parent, id_or_name) {
        (Some(parent), Some(id)) => format!("{}/{}_{}", parent, encode_component(id), order),
        (None, Some(id)) => format!("{}{}/{}", element_namespace, tag, encode_component(id)),
        (Some(parent), None) => format!("{}/{}_{}", parent, tag, order),
        (None, None) => format!("{}{}_{}", element_namespace, tag, order),
    }
}

/// Mutable state of one encode call.
struct EncodeState {
    graph: Graph,
    counter: OrderCounter,
    element_count: usize,
    opaque_count: usize,
}

/// Encodes documents with a fixed configuration.
pub struct Encoder {
    vocab: Vocabulary,
    registry: TagRegistry,
}

impl Encoder {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            vocab: Vocabulary::new(config),
            registry: TagRegistry::new(config),
        }
    }

    /// Encodes `doc` into a fresh graph.
    ///
    /// # Errors
    /// Only fails when an opaque element that was built in code (not captured
    /// verbatim by the parser) cannot be rendered to XML.
    pub fn encode(&self, doc: &Document) -> Result<Encoded, CodecError> {
        let mut state = EncodeState {
            graph: Graph::with_capacity(doc.root.node_count() * 6),
            counter: OrderCounter::new(),
            element_count: 0,
            opaque_count: 0,
        };

        let root = self.encode_element(&doc.root, None, self.registry.root_role(), &mut state)?;

        info!(
            "Encoded <{}>: {} elements, {} opaque blocks, {} triples",
            doc.root.name,
            state.element_count,
            state.opaque_count,
            state.graph.len()
        );
        Ok(Encoded {
            graph: state.graph,
            root,
            element_count: state.element_count,
            opaque_count: state.opaque_count,
        })
    }

    fn encode_element(
        &self,
        element: &Element,
        parent: Option<&str>,
        role: Role,
        state: &mut EncodeState,
    ) -> Result<String, CodecError> {
        let order = state.counter.next_order();
        let tag = element.local_name();
        let uri = element_uri(
            self.vocab.element_namespace(),
            parent,
            tag,
            element.id_or_name(),
            order,
        );
        let subject = Term::iri(&uri);
        let graph = &mut state.graph;

        graph.add_triple(subject.clone(), self.vocab.order(), Term::integer(order as i64));
        graph.add_triple(subject.clone(), RDF_TYPE, Term::iri(self.vocab.element_type(tag)));

        if role == Role::DocumentRoot {
            graph.add_triple(subject.clone(), RDF_TYPE, Term::iri(self.vocab.document_root()));
            for ns in &element.namespaces {
                let predicate = match &ns.prefix {
                    None => self.vocab.default_namespace().to_string(),
                    Some(prefix) => self.vocab.namespace(prefix),
                };
                graph.add_triple(subject.clone(), predicate, Term::string(&ns.uri));
            }
        } else {
            // Declarations below the root travel as ordinary attributes.
            for ns in &element.namespaces {
                graph.add_triple(
                    subject.clone(),
                    self.vocab.attribute(&ns.attribute_name()),
                    Term::string(&ns.uri),
                );
            }
        }

        if let Some(prefix) = element.prefix() {
            graph.add_triple(subject.clone(), self.vocab.element_prefix(), Term::string(prefix));
        }

        if let Some(parent) = parent {
            graph.add_triple(
                Term::iri(parent),
                self.vocab.child_relation(tag),
                subject.clone(),
            );
        }

        for attr in &element.attributes {
            graph.add_triple(
                subject.clone(),
                self.vocab.attribute(&attr.name),
                Term::string(&attr.value),
            );
        }

        if let Some(text) = element.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            graph.add_triple(subject, self.vocab.text_content(), Term::string(text));
        }

        state.element_count += 1;

        for child in &element.children {
            match child {
                Node::Element(e) if self.registry.role_of(child) == Role::Regular => {
                    self.encode_element(e, Some(&uri), Role::Regular, state)?;
                }
                _ => self.encode_opaque(child, &uri, state)?,
            }
        }
        Ok(uri)
    }

    /// Stores an opaque block as one leaf entity with a base64 payload.
    fn encode_opaque(&self, node: &Node, parent: &str, state: &mut EncodeState) -> Result<(), CodecError> {
        let order = state.counter.next_order();
        let (xml, attributes) = match node {
            Node::Verbatim(v) => (Cow::Borrowed(v.xml.as_str()), &v.attributes),
            Node::Element(e) => (Cow::Owned(element_to_string(e)?), &e.attributes),
        };
        let discriminator = attributes
            .iter()
            .find(|a| a.name == "type")
            .map(|a| a.value.as_str());
        let id_or_name = match node {
            Node::Verbatim(v) => v.id_or_name(),
            Node::Element(e) => e.id_or_name(),
        };

        let uri = element_uri(
            self.vocab.element_namespace(),
            Some(parent),
            node.local_name(),
            id_or_name,
            order,
        );
        let subject = Term::iri(&uri);
        let graph = &mut state.graph;

        graph.add_triple(subject.clone(), RDF_TYPE, Term::iri(self.vocab.private_section()));
        graph.add_triple(subject.clone(), self.vocab.private_order(), Term::integer(order as i64));
        graph.add_triple(Term::iri(parent), self.vocab.has_private(), subject.clone());
        graph.add_triple(
            subject.clone(),
            self.vocab.xml_content(),
            Term::string(STANDARD.encode(xml.as_bytes())),
        );
        if let Some(kind) = discriminator {
            graph.add_triple(subject, self.vocab.private_type(), Term::string(kind));
        }

        debug!("Stored opaque <{}> as {} ({} bytes)", node.name(), uri, xml.len());
        state.opaque_count += 1;
        Ok(())
    }
}

/// Encodes `doc` with `config`.
pub fn encode(doc: &Document, config: &CodecConfig) -> Result<Encoded, CodecError> {
    Encoder::new(config).encode(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{Namespace, ParseOptions, parse_document};
    use std::collections::HashSet;

    const NS: &str = "http://iec61850.com/SCL#";

    #[test]
    fn test_element_uri_rules() {
        assert_eq!(
            element_uri(NS, Some("http://p/A_1"), "IED", Some("Bay 1"), 7),
            "http://p/A_1/Bay%201_7"
        );
        assert_eq!(element_uri(NS, None, "SCL", Some("doc"), 1), "http://iec61850.com/SCL#SCL/doc");
        assert_eq!(element_uri(NS, Some("http://p/A_1"), "Header", None, 2), "http://p/A_1/Header_2");
        assert_eq!(element_uri(NS, None, "SCL", None, 1), "http://iec61850.com/SCL#SCL_1");
    }

    #[test]
    fn test_order_counter_is_strictly_increasing() {
        let mut counter = OrderCounter::new();
        assert_eq!(counter.next_order(), 1);
        assert_eq!(counter.next_order(), 2);
        assert_eq!(counter.last(), 2);
    }

    #[test]
    fn test_scenario_one_triples() {
        let xml = r#"<Root xmlns="ns1" xmlns:p="ns2"><A name="x"/><B id="y">hello</B><A name="x"/></Root>"#;
        let doc = parse_document(xml, &ParseOptions::default()).unwrap();
        let config = CodecConfig::default();
        let encoded = encode(&doc, &config).unwrap();
        let vocab = Vocabulary::new(&config);
        let g = &encoded.graph;

        assert_eq!(encoded.root, "http://iec61850.com/SCL#Root_1");
        assert_eq!(encoded.element_count, 4);

        let children: Vec<&str> = g
            .iter()
            .filter(|t| t.subject_iri() == Some(encoded.root.as_str()))
            .filter(|t| t.predicate.starts_with("http://iec61850.com/SCL#has"))
            .filter_map(|t| t.object.as_iri())
            .collect();
        assert_eq!(
            children,
            vec![
                "http://iec61850.com/SCL#Root_1/x_2",
                "http://iec61850.com/SCL#Root_1/y_3",
                "http://iec61850.com/SCL#Root_1/x_4",
            ]
        );

        let text: Vec<_> = g
            .iter()
            .filter(|t| &*t.predicate == vocab.text_content())
            .collect();
        assert_eq!(text.len(), 1);
        assert_eq!(text[0].subject_iri(), Some("http://iec61850.com/SCL#Root_1/y_3"));
        assert_eq!(text[0].object, Term::string("hello"));

        assert_eq!(
            g.objects(&encoded.root, vocab.default_namespace()).collect::<Vec<_>>(),
            vec![&Term::string("ns1")]
        );
        assert_eq!(
            g.objects(&encoded.root, &vocab.namespace("p")).collect::<Vec<_>>(),
            vec![&Term::string("ns2")]
        );
        let root_marker = Term::iri(vocab.document_root());
        assert_eq!(g.subjects(RDF_TYPE, &root_marker).count(), 1);
    }

    #[test]
    fn test_duplicate_names_get_distinct_uris() {
        let mut root = Element::new("DOI");
        for _ in 0..10_000 {
            root.children.push(Element::new("DAI").with_attribute("name", "x").into());
        }
        let encoded = encode(&Document::new(root), &CodecConfig::default()).unwrap();
        let vocab = Vocabulary::new(&CodecConfig::default());
        let relation = vocab.child_relation("DAI");
        let uris: HashSet<&str> = encoded
            .graph
            .objects(&encoded.root, &relation)
            .filter_map(Term::as_iri)
            .collect();
        assert_eq!(uris.len(), 10_000);
    }

    #[test]
    fn test_opaque_element_built_in_code() {
        let root = Element::new("SCL").with_child(
            Element::new("Private")
                .with_attribute("type", "vendor-x")
                .with_child(Element::new("custom:blob").with_attribute("attr", "1")),
        );
        let config = CodecConfig::default();
        let encoded = encode(&Document::new(root), &config).unwrap();
        let vocab = Vocabulary::new(&config);
        assert_eq!(encoded.opaque_count, 1);
        assert_eq!(encoded.element_count, 1);

        let block = "http://iec61850.com/SCL#SCL_1/Private_2";
        let payload = encoded.graph.objects(block, vocab.xml_content()).next().unwrap();
        let bytes = STANDARD
            .decode(payload.as_literal().unwrap().lexical())
            .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "<Private type=\"vendor-x\"><custom:blob attr=\"1\"/></Private>"
        );
        assert_eq!(
            encoded.graph.objects(block, vocab.private_type()).next(),
            Some(&Term::string("vendor-x"))
        );
    }

    #[test]
    fn test_nested_namespace_declaration_becomes_attribute() {
        let root = Element::new("SCL").with_child(
            Element::new("eIEC61850-6-100:Function")
                .with_namespace(Namespace::prefixed("eIEC61850-6-100", "http://www.iec.ch/61850/2019/SCL/6-100")),
        );
        let config = CodecConfig::default();
        let encoded = encode(&Document::new(root), &config).unwrap();
        let vocab = Vocabulary::new(&config);
        let child = "http://iec61850.com/SCL#SCL_1/Function_2";
        assert_eq!(
            encoded
                .graph
                .objects(child, &vocab.attribute("xmlns:eIEC61850-6-100"))
                .next(),
            Some(&Term::string("http://www.iec.ch/61850/2019/SCL/6-100"))
        );
        assert_eq!(
            encoded.graph.objects(child, vocab.element_prefix()).next(),
            Some(&Term::string("eIEC61850-6-100"))
        );
    }
}
