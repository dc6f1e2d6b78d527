// crates/scl-rdf/src/vocab.rs

//! IRIs of the reserved types and predicates.
//!
//! Element types, attributes and child relations live in the element
//! namespace (`iec:`). Opaque blocks use the private namespace. The document
//! root marker and the namespace bookkeeping live in their own namespace so
//! that no document tag or attribute can collide with them.

use crate::config::CodecConfig;
use crate::escape;
use std::borrow::Cow;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

const ORDER: &str = "order";
const TEXT_CONTENT: &str = "textContent";
const HAS: &str = "has";
const PRIVATE_SECTION: &str = "PrivateSection";
const HAS_PRIVATE: &str = "hasPrivate";
const XML_CONTENT: &str = "xmlContent";
const PRIVATE_TYPE: &str = "type";
const DOCUMENT_ROOT: &str = "DocumentRoot";
const DEFAULT_NAMESPACE: &str = "defaultNamespace";
const NAMESPACE_PREFIX: &str = "namespace_";
const ELEMENT_PREFIX: &str = "prefix";

/// What a predicate means to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateRole<'a> {
    Type,
    Order,
    TextContent,
    /// `iec:has{Tag}`; carries the tag.
    Child(&'a str),
    /// A document attribute; carries the decoded attribute name.
    Attribute(Cow<'a, str>),
    PrivateOrder,
    PrivateLink,
    PrivateContent,
    PrivateType,
    DefaultNamespace,
    /// `codec:namespace_{prefix}`; carries the decoded prefix.
    Namespace(Cow<'a, str>),
    ElementPrefix,
    /// Not produced by the codec; ignored.
    Foreign,
}

/// The vocabulary bound to one configuration.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    element_ns: String,
    private_ns: String,
    codec_ns: String,
    order: String,
    text_content: String,
    private_section: String,
    private_order: String,
    has_private: String,
    xml_content: String,
    private_type: String,
    document_root: String,
    default_namespace: String,
    element_prefix: String,
}

impl Vocabulary {
    pub fn new(config: &CodecConfig) -> Self {
        let e = &config.element_namespace;
        let p = &config.private_namespace;
        let c = &config.codec_namespace;
        Self {
            element_ns: e.clone(),
            private_ns: p.clone(),
            codec_ns: c.clone(),
            order: format!("{e}{ORDER}"),
            text_content: format!("{e}{TEXT_CONTENT}"),
            private_section: format!("{p}{PRIVATE_SECTION}"),
            private_order: format!("{p}{ORDER}"),
            has_private: format!("{p}{HAS_PRIVATE}"),
            xml_content: format!("{p}{XML_CONTENT}"),
            private_type: format!("{p}{PRIVATE_TYPE}"),
            document_root: format!("{c}{DOCUMENT_ROOT}"),
            default_namespace: format!("{c}{DEFAULT_NAMESPACE}"),
            element_prefix: format!("{c}{ELEMENT_PREFIX}"),
        }
    }

    pub fn element_namespace(&self) -> &str {
        &self.element_ns
    }

    /// `iec:{tag}`
    pub fn element_type(&self, local_tag: &str) -> String {
        format!("{}{}", self.element_ns, local_tag)
    }

    /// `iec:has{tag}`
    pub fn child_relation(&self, local_tag: &str) -> String {
        format!("{}{}{}", self.element_ns, HAS, local_tag)
    }

    /// `iec:{name}` or `iec:attr_{escaped}`.
    pub fn attribute(&self, name: &str) -> String {
        format!("{}{}", self.element_ns, escape::attribute_local(name))
    }

    /// `codec:namespace_{prefix}`
    pub fn namespace(&self, prefix: &str) -> String {
        format!(
            "{}{}{}",
            self.codec_ns,
            NAMESPACE_PREFIX,
            escape::encode_component(prefix)
        )
    }

    pub fn order(&self) -> &str {
        &self.order
    }

    pub fn text_content(&self) -> &str {
        &self.text_content
    }

    pub fn private_section(&self) -> &str {
        &self.private_section
    }

    pub fn private_order(&self) -> &str {
        &self.private_order
    }

    pub fn has_private(&self) -> &str {
        &self.has_private
    }

    pub fn xml_content(&self) -> &str {
        &self.xml_content
    }

    pub fn private_type(&self) -> &str {
        &self.private_type
    }

    pub fn document_root(&self) -> &str {
        &self.document_root
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn element_prefix(&self) -> &str {
        &self.element_prefix
    }

    /// Returns the tag of an `iec:` type IRI.
    pub fn tag_of_type<'a>(&self, type_iri: &'a str) -> Option<&'a str> {
        type_iri
            .strip_prefix(self.element_ns.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn classify<'a>(&self, predicate: &'a str) -> PredicateRole<'a> {
        if predicate == RDF_TYPE {
            return PredicateRole::Type;
        }
        if let Some(local) = predicate.strip_prefix(self.element_ns.as_str()) {
            return match local {
                ORDER => PredicateRole::Order,
                TEXT_CONTENT => PredicateRole::TextContent,
                _ if local.starts_with(HAS) && local.len() > HAS.len() => {
                    PredicateRole::Child(&local[HAS.len()..])
                }
                _ if local.is_empty() => PredicateRole::Foreign,
                _ => match escape::attribute_name(local) {
                    Some(name) => PredicateRole::Attribute(name),
                    None => PredicateRole::Foreign,
                },
            };
        }
        if let Some(local) = predicate.strip_prefix(self.private_ns.as_str()) {
            return match local {
                ORDER => PredicateRole::PrivateOrder,
                HAS_PRIVATE => PredicateRole::PrivateLink,
                XML_CONTENT => PredicateRole::PrivateContent,
                PRIVATE_TYPE => PredicateRole::PrivateType,
                _ => PredicateRole::Foreign,
            };
        }
        if let Some(local) = predicate.strip_prefix(self.codec_ns.as_str()) {
            if local == DEFAULT_NAMESPACE {
                return PredicateRole::DefaultNamespace;
            }
            if local == ELEMENT_PREFIX {
                return PredicateRole::ElementPrefix;
            }
            if let Some(prefix) = local.strip_prefix(NAMESPACE_PREFIX) {
                if let Some(prefix) = escape::decode_component(prefix).filter(|p| !p.is_empty()) {
                    return PredicateRole::Namespace(prefix);
                }
            }
        }
        PredicateRole::Foreign
    }
}
