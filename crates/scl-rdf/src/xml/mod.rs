//! In-memory XML tree exchanged with the codec.
//!
//! The tree keeps exactly what the round trip has to preserve: qualified
//! names, namespace declarations, attribute order, direct text and child
//! order. Opaque blocks are held as their exact source text.

mod reader;
mod writer;

pub(crate) use reader::read_verbatim;
pub use reader::{ParseOptions, parse_document};
pub use writer::{WriteOptions, element_to_string, write_document};

/// A parsed document. Namespace declarations live on `root.namespaces`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self { root }
    }
}

/// One `xmlns` (prefix `None`) or `xmlns:prefix` declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Namespace {
    pub prefix: Option<String>,
    pub uri: String,
}

impl Namespace {
    pub fn default_ns(uri: impl Into<String>) -> Self {
        Self {
            prefix: None,
            uri: uri.into(),
        }
    }

    pub fn prefixed(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            uri: uri.into(),
        }
    }

    /// The attribute name this declaration is written with.
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("xmlns:{}", p),
            None => "xmlns".to_string(),
        }
    }

    /// Interprets an attribute name as a namespace declaration.
    /// Returns the declared prefix (`Some(None)` for the default namespace).
    pub fn declared_prefix(attribute_name: &str) -> Option<Option<&str>> {
        if attribute_name == "xmlns" {
            Some(None)
        } else {
            attribute_name.strip_prefix("xmlns:").map(Some)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A regular element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written (`prefix:local` or `local`).
    pub name: String,
    pub namespaces: Vec<Namespace>,
    pub attributes: Vec<Attribute>,
    /// Text before the first child, trimmed. `None` when blank.
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn prefix(&self) -> Option<&str> {
        prefix(&self.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        find_attribute(&self.attributes, name)
    }

    /// The `id` attribute, else the `name` attribute. Empty values count as absent.
    pub fn id_or_name(&self) -> Option<&str> {
        id_or_name(&self.attributes)
    }

    /// Number of elements and verbatim blocks in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|c| match c {
                Node::Element(e) => e.node_count(),
                Node::Verbatim(_) => 1,
            })
            .sum::<usize>()
    }
}

/// An element kept as its exact source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerbatimBlock {
    /// Qualified name of the outer element.
    pub name: String,
    /// Attributes of the outer start tag (for discriminators such as `type`).
    pub attributes: Vec<Attribute>,
    /// Source text from `<name` through the matching end tag.
    pub xml: String,
}

impl VerbatimBlock {
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        find_attribute(&self.attributes, name)
    }

    pub fn id_or_name(&self) -> Option<&str> {
        id_or_name(&self.attributes)
    }
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Verbatim(VerbatimBlock),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Element(e) => &e.name,
            Node::Verbatim(v) => &v.name,
        }
    }

    pub fn local_name(&self) -> &str {
        local_name(self.name())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Verbatim(_) => None,
        }
    }

    pub fn as_verbatim(&self) -> Option<&VerbatimBlock> {
        match self {
            Node::Verbatim(v) => Some(v),
            Node::Element(_) => None,
        }
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<VerbatimBlock> for Node {
    fn from(v: VerbatimBlock) -> Self {
        Node::Verbatim(v)
    }
}

pub(crate) fn local_name(qualified: &str) -> &str {
    qualified.rsplit_once(':').map_or(qualified, |(_, l)| l)
}

pub(crate) fn prefix(qualified: &str) -> Option<&str> {
    qualified.split_once(':').map(|(p, _)| p)
}

fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.value.as_str())
}

fn id_or_name(attributes: &[Attribute]) -> Option<&str> {
    find_attribute(attributes, "id")
        .filter(|v| !v.is_empty())
        .or_else(|| find_attribute(attributes, "name").filter(|v| !v.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_parts() {
        let e = Element::new("eIEC61850-6-100:Function");
        assert_eq!(e.local_name(), "Function");
        assert_eq!(e.prefix(), Some("eIEC61850-6-100"));
        let plain = Element::new("Substation");
        assert_eq!(plain.local_name(), "Substation");
        assert_eq!(plain.prefix(), None);
    }

    #[test]
    fn test_id_or_name_prefers_id_and_skips_empty() {
        let e = Element::new("IED").with_attribute("name", "P1").with_attribute("id", "");
        assert_eq!(e.id_or_name(), Some("P1"));
        let e = Element::new("IED").with_attribute("name", "P1").with_attribute("id", "I1");
        assert_eq!(e.id_or_name(), Some("I1"));
        assert_eq!(Element::new("Header").id_or_name(), None);
    }

    #[test]
    fn test_namespace_declaration_names() {
        assert_eq!(Namespace::declared_prefix("xmlns"), Some(None));
        assert_eq!(Namespace::declared_prefix("xmlns:rte"), Some(Some("rte")));
        assert_eq!(Namespace::declared_prefix("xmlnsx"), None);
        assert_eq!(Namespace::prefixed("p", "u").attribute_name(), "xmlns:p");
    }

    #[test]
    fn test_node_count() {
        let tree = Element::new("SCL")
            .with_child(Element::new("Header"))
            .with_child(Element::new("Substation").with_child(Element::new("VoltageLevel")));
        assert_eq!(tree.node_count(), 4);
    }
}
