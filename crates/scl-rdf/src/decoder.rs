// crates/scl-rdf/src/decoder.rs

//! Rebuilds a document tree from an arbitrary triple set.
//!
//! The decoder only trusts what the encoder writes: the document-root
//! marker, element types, orders, child relations, attributes and opaque
//! payloads. Triples in any other namespace are ignored, so a graph that
//! carries extra facts (mapping results, provenance) still decodes.

use crate::config::{CodecConfig, UnknownTypePolicy};
use crate::error::CodecError;
use crate::graph::{Graph, Term, Triple};
use crate::vocab::{PredicateRole, RDF_TYPE, Vocabulary};
use crate::xml::{Attribute, Document, Element, Namespace, Node, VerbatimBlock, read_verbatim};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

/// Result of decoding one triple set.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub document: Document,
    pub warnings: Vec<DecodeWarning>,
}

/// Non-fatal findings raised while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// A child without a recognized type was dropped (`UnknownTypePolicy::Skip`).
    SkippedUnknownType { subject: String, parent: String },
    /// A child had no order value and was placed after its ordered siblings.
    MissingOrder { subject: String },
}

/// How a child was referenced by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Element,
    Opaque,
}

/// Everything the encoder may have said about one entity.
#[derive(Default)]
struct EntityFacts<'g> {
    tag: Option<&'g str>,
    prefix: Option<&'g str>,
    private_section: bool,
    order: Option<i64>,
    text: Option<&'g str>,
    payload: Option<&'g str>,
    attributes: Vec<Attribute>,
    namespaces: Vec<Namespace>,
    children: Vec<(&'g Term, Link)>,
}

/// Per-call traversal state.
struct DecodeState<'g> {
    index: HashMap<&'g Term, Vec<&'g Triple>>,
    ancestors: HashSet<&'g Term>,
    warnings: Vec<DecodeWarning>,
    elements: usize,
    opaque: usize,
}

/// Decodes graphs with a fixed configuration.
pub struct Decoder {
    vocab: Vocabulary,
    policy: UnknownTypePolicy,
    fallback_default_namespace: Option<String>,
}

impl Decoder {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            vocab: Vocabulary::new(config),
            policy: config.unknown_type_policy,
            fallback_default_namespace: config.fallback_default_namespace.clone(),
        }
    }

    pub fn decode(&self, graph: &Graph) -> Result<Decoded, CodecError> {
        let mut index: HashMap<&Term, Vec<&Triple>> = HashMap::new();
        for triple in graph.iter() {
            index.entry(&triple.subject).or_default().push(triple);
        }

        let marker = Term::iri(self.vocab.document_root());
        let mut roots: Vec<&Term> = Vec::new();
        for triple in graph.iter() {
            if &*triple.predicate == RDF_TYPE
                && triple.object == marker
                && !roots.contains(&&triple.subject)
            {
                roots.push(&triple.subject);
            }
        }
        let root = match roots.as_slice() {
            [root] => *root,
            _ => return Err(CodecError::RootNotFound { found: roots.len() }),
        };
        debug!("Decoding from document root {}", root);

        let mut state = DecodeState {
            index,
            ancestors: HashSet::new(),
            warnings: Vec::new(),
            elements: 0,
            opaque: 0,
        };

        let mut element = match self.decode_element(root, None, &mut state)? {
            Some(element) => element,
            None => {
                return Err(CodecError::UnknownType {
                    subject: label(root),
                    parent: String::new(),
                });
            }
        };

        if element.namespaces.is_empty() {
            if let Some(uri) = &self.fallback_default_namespace {
                element.namespaces.push(Namespace::default_ns(uri.as_str()));
            }
        }

        info!(
            "Decoded <{}>: {} elements, {} opaque blocks, {} warnings",
            element.name,
            state.elements,
            state.opaque,
            state.warnings.len()
        );
        Ok(Decoded {
            document: Document::new(element),
            warnings: state.warnings,
        })
    }

    /// Reads every codec fact about `subject` in one pass over its triples.
    fn facts<'g>(&self, subject: &Term, state: &DecodeState<'g>) -> EntityFacts<'g> {
        let mut facts = EntityFacts::default();
        let Some(triples) = state.index.get(subject) else {
            return facts;
        };
        for &triple in triples {
            let object = &triple.object;
            let literal = object.as_literal().map(|l| l.lexical());
            match self.vocab.classify(&triple.predicate) {
                PredicateRole::Type => {
                    if let Some(iri) = object.as_iri() {
                        if iri == self.vocab.private_section() {
                            facts.private_section = true;
                        } else if facts.tag.is_none() {
                            facts.tag = self.vocab.tag_of_type(iri);
                        }
                    }
                }
                PredicateRole::Order | PredicateRole::PrivateOrder => {
                    if facts.order.is_none() {
                        facts.order = object.as_literal().and_then(|l| l.as_integer());
                    }
                }
                PredicateRole::TextContent => facts.text = facts.text.or(literal),
                PredicateRole::PrivateContent => facts.payload = facts.payload.or(literal),
                PredicateRole::ElementPrefix => facts.prefix = facts.prefix.or(literal),
                PredicateRole::Child(_) => facts.children.push((object, Link::Element)),
                PredicateRole::PrivateLink => facts.children.push((object, Link::Opaque)),
                PredicateRole::Attribute(name) => {
                    let Some(value) = literal else { continue };
                    match Namespace::declared_prefix(&name) {
                        Some(None) => facts.namespaces.push(Namespace::default_ns(value)),
                        Some(Some(prefix)) => facts.namespaces.push(Namespace::prefixed(prefix, value)),
                        None => facts.attributes.push(Attribute::new(name, value)),
                    }
                }
                PredicateRole::DefaultNamespace => {
                    if let Some(value) = literal {
                        facts.namespaces.push(Namespace::default_ns(value));
                    }
                }
                PredicateRole::Namespace(prefix) => {
                    if let Some(value) = literal {
                        facts.namespaces.push(Namespace::prefixed(prefix, value));
                    }
                }
                PredicateRole::PrivateType | PredicateRole::Foreign => {}
            }
        }
        facts
    }

    /// Decodes one regular element. Returns `None` when it has no element
    /// type; the caller applies the unknown-type policy.
    fn decode_element<'g>(
        &self,
        subject: &'g Term,
        parent: Option<&'g Term>,
        state: &mut DecodeState<'g>,
    ) -> Result<Option<Element>, CodecError> {
        let facts = self.facts(subject, state);
        let Some(tag) = facts.tag else {
            return Ok(None);
        };
        if !state.ancestors.insert(subject) {
            return Err(CodecError::CyclicReference {
                subject: label(subject),
            });
        }

        let name = match facts.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, tag),
            _ => tag.to_string(),
        };
        let mut element = Element {
            name,
            namespaces: facts.namespaces,
            attributes: facts.attributes,
            text: facts.text.map(str::to_string),
            children: Vec::with_capacity(facts.children.len()),
        };

        for (child, link) in self.ordered_children(facts.children, state) {
            match link {
                Link::Opaque => {
                    element.children.push(self.decode_opaque(child, state)?.into());
                }
                Link::Element => match self.decode_element(child, Some(subject), state)? {
                    Some(e) => element.children.push(Node::Element(e)),
                    None => self.unknown_type(child, subject, state)?,
                },
            }
        }

        state.ancestors.remove(subject);
        state.elements += 1;
        if parent.is_none() {
            debug!("Root entity {} has {} children", subject, element.children.len());
        }
        Ok(Some(element))
    }

    /// Collapses duplicate references and sorts all children by order in one
    /// pass. Unordered children keep their graph order after the ordered ones.
    fn ordered_children<'g>(
        &self,
        refs: Vec<(&'g Term, Link)>,
        state: &mut DecodeState<'g>,
    ) -> Vec<(&'g Term, Link)> {
        let mut seen = HashSet::new();
        let mut keyed: Vec<(Option<i64>, &'g Term, Link)> = Vec::with_capacity(refs.len());
        for (child, link) in refs {
            if !seen.insert(child) {
                continue;
            }
            let facts = self.facts(child, state);
            let order = facts.order;
            // A private section reached through a regular relation is still opaque.
            let link = if facts.private_section { Link::Opaque } else { link };
            if order.is_none() {
                warn!("Child {} has no order value; placing it last", child);
                state.warnings.push(DecodeWarning::MissingOrder {
                    subject: label(child),
                });
            }
            keyed.push((order, child, link));
        }
        // Stable sort keeps graph order among equal keys.
        keyed.sort_by_key(|(order, _, _)| (order.is_none(), *order));
        keyed.into_iter().map(|(_, child, link)| (child, link)).collect()
    }

    fn decode_opaque(&self, subject: &Term, state: &mut DecodeState<'_>) -> Result<VerbatimBlock, CodecError> {
        let facts = self.facts(subject, state);
        let invalid = |reason: String| CodecError::InvalidPayload {
            subject: label(subject),
            reason,
        };
        let payload = facts
            .payload
            .ok_or_else(|| invalid("missing xmlContent".into()))?;
        // Stores and exports may wrap long literals.
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD
            .decode(&compact)
            .map_err(|e| invalid(format!("bad base64: {}", e)))?;
        let xml = String::from_utf8(bytes).map_err(|e| invalid(format!("not UTF-8: {}", e)))?;
        let block = read_verbatim(&xml).map_err(|e| invalid(e.to_string()))?;
        state.opaque += 1;
        Ok(block)
    }

    fn unknown_type(&self, child: &Term, parent: &Term, state: &mut DecodeState<'_>) -> Result<(), CodecError> {
        match self.policy {
            UnknownTypePolicy::Fail => Err(CodecError::UnknownType {
                subject: label(child),
                parent: label(parent),
            }),
            UnknownTypePolicy::Skip => {
                warn!("Skipping child {} of {}: no element type", child, parent);
                state.warnings.push(DecodeWarning::SkippedUnknownType {
                    subject: label(child),
                    parent: label(parent),
                });
                Ok(())
            }
        }
    }
}

/// Bare IRI of a term, for errors and warnings.
fn label(term: &Term) -> String {
    term.as_iri().map_or_else(|| term.to_string(), str::to_string)
}

/// Decodes `graph` with `config`.
pub fn decode(graph: &Graph, config: &CodecConfig) -> Result<Decoded, CodecError> {
    Decoder::new(config).decode(graph)
}
