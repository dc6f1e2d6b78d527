//! Structural roles of document nodes, resolved once per call.

use crate::config::CodecConfig;
use crate::xml::Node;
use std::collections::BTreeSet;

/// How the encoder treats a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The top-level element; carries the namespace declarations.
    DocumentRoot,
    /// Vendor extension stored as one opaque payload.
    Opaque,
    /// Decomposed into type, attribute, text and child triples.
    Regular,
}

#[derive(Debug, Clone)]
pub struct TagRegistry {
    opaque: BTreeSet<String>,
}

impl TagRegistry {
    pub fn new(config: &CodecConfig) -> Self {
        Self {
            opaque: config.opaque_tags.iter().cloned().collect(),
        }
    }

    /// Role of a child node. Verbatim blocks are always opaque.
    pub fn role_of(&self, node: &Node) -> Role {
        match node {
            Node::Verbatim(_) => Role::Opaque,
            Node::Element(e) if self.opaque.contains(e.local_name()) => Role::Opaque,
            Node::Element(_) => Role::Regular,
        }
    }

    /// Role of the document's top-level element, whatever its tag.
    pub fn root_role(&self) -> Role {
        Role::DocumentRoot
    }
}
