// crates/scl-rdf/src/validate.rs

//! Round-trip validation: byte identity first, then canonical tree equality.

use crate::error::CodecError;
use crate::xml::{Document, Element, Node, ParseOptions, parse_document};
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

/// Outcome of comparing an original document with its regenerated form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Byte-for-byte identical. Carries the hex SHA-256 of both.
    Identical { digest: String },
    /// Different bytes, same canonical tree.
    Equivalent,
    /// The trees differ; carries the first difference found.
    Diverged(Divergence),
}

impl Verdict {
    /// `true` for `Identical` and `Equivalent`.
    pub fn is_success(&self) -> bool {
        !matches!(self, Verdict::Diverged(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Identical { .. } => write!(f, "Perfect round-trip: files are identical"),
            Verdict::Equivalent => write!(f, "Round-trip successful (XML semantically identical)"),
            Verdict::Diverged(d) => write!(f, "Round-trip validation failed: XML differs at {}", d),
        }
    }
}

/// First point where two trees disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Divergence {
    /// XPath-like location, e.g. `/SCL/Substation[2]/VoltageLevel`.
    pub path: String,
    pub detail: String,
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.detail)
    }
}

/// Hex-encoded SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Classifies a regenerated document against the original.
///
/// # Errors
/// Returns `CodecError::Parse` if either text is not well-formed XML. The
/// parse is skipped entirely when the two texts are byte-identical.
pub fn validate_round_trip(
    original: &str,
    regenerated: &str,
    options: &ParseOptions,
) -> Result<Verdict, CodecError> {
    let original_digest = sha256_hex(original.as_bytes());
    let regenerated_digest = sha256_hex(regenerated.as_bytes());
    debug!("Original SHA-256 {}, regenerated SHA-256 {}", original_digest, regenerated_digest);

    if original_digest == regenerated_digest && original == regenerated {
        info!("Round trip is byte-identical");
        return Ok(Verdict::Identical {
            digest: original_digest,
        });
    }

    let a = parse_document(original, options)?;
    let b = parse_document(regenerated, options)?;
    let verdict = match compare_documents(&a, &b) {
        None => Verdict::Equivalent,
        Some(divergence) => Verdict::Diverged(divergence),
    };
    info!("{}", verdict);
    Ok(verdict)
}

/// Compares two trees canonically. Returns `None` when they are equivalent.
pub fn compare_documents(a: &Document, b: &Document) -> Option<Divergence> {
    compare_elements(&a.root, &b.root).map(|mut d| {
        d.path = format!("/{}{}", a.root.name, d.path);
        d
    })
}

/// The returned path is relative to `a`; callers prefix their own step while
/// unwinding, so sibling positions are only computed for a divergence.
fn compare_elements(a: &Element, b: &Element) -> Option<Divergence> {
    let diverged = |detail: String| {
        Some(Divergence {
            path: String::new(),
            detail,
        })
    };

    if a.name != b.name {
        return diverged(format!("tag `{}` became `{}`", a.name, b.name));
    }

    let mut ns_a = a.namespaces.clone();
    let mut ns_b = b.namespaces.clone();
    ns_a.sort();
    ns_b.sort();
    if ns_a != ns_b {
        return diverged(format!(
            "namespace declarations differ ({} vs {})",
            ns_a.len(),
            ns_b.len()
        ));
    }

    let attrs_a: BTreeMap<&str, &str> = a
        .attributes
        .iter()
        .map(|at| (at.name.as_str(), at.value.as_str()))
        .collect();
    let attrs_b: BTreeMap<&str, &str> = b
        .attributes
        .iter()
        .map(|at| (at.name.as_str(), at.value.as_str()))
        .collect();
    for (name, value) in &attrs_a {
        match attrs_b.get(name) {
            None => return diverged(format!("attribute `{}` is missing", name)),
            Some(other) if other != value => {
                return diverged(format!("attribute `{}`: `{}` became `{}`", name, value, other));
            }
            Some(_) => {}
        }
    }
    if let Some(extra) = attrs_b.keys().find(|k| !attrs_a.contains_key(*k)) {
        return diverged(format!("unexpected attribute `{}`", extra));
    }

    let text_a = a.text.as_deref().map(str::trim).unwrap_or("");
    let text_b = b.text.as_deref().map(str::trim).unwrap_or("");
    if text_a != text_b {
        return diverged(format!("text `{}` became `{}`", text_a, text_b));
    }

    for (i, (ca, cb)) in a.children.iter().zip(&b.children).enumerate() {
        let result = match (ca, cb) {
            (Node::Element(ea), Node::Element(eb)) => compare_elements(ea, eb),
            (Node::Verbatim(va), Node::Verbatim(vb)) if va.xml != vb.xml => {
                diverged("opaque block content differs".into())
            }
            (Node::Verbatim(_), Node::Verbatim(_)) => None,
            _ if ca.name() != cb.name() => {
                diverged(format!("tag `{}` became `{}`", ca.name(), cb.name()))
            }
            _ => diverged("opaque block and element swapped".into()),
        };
        if let Some(mut d) = result {
            d.path = format!("/{}{}", step(&a.children, i), d.path);
            return Some(d);
        }
    }

    if a.children.len() != b.children.len() {
        return diverged(format!(
            "{} children became {}",
            a.children.len(),
            b.children.len()
        ));
    }
    None
}

/// Path step for `siblings[index]`: the name, with a 1-based position when
/// the name is shared by several siblings.
fn step(siblings: &[Node], index: usize) -> String {
    let name = siblings[index].name();
    let mut shared = 0;
    let mut position = 0;
    for (i, node) in siblings.iter().enumerate() {
        if node.name() == name {
            shared += 1;
            if i <= index {
                position = shared;
            }
        }
    }
    if shared > 1 {
        format!("{}[{}]", name, position)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ParseOptions {
        ParseOptions::with_verbatim_tags(["Private"])
    }

    #[test]
    fn test_identical() {
        let xml = "<SCL><Header id=\"h\"/></SCL>";
        let verdict = validate_round_trip(xml, xml, &options()).unwrap();
        assert_eq!(
            verdict,
            Verdict::Identical {
                digest: sha256_hex(xml.as_bytes())
            }
        );
        assert_eq!(verdict.to_string(), "Perfect round-trip: files are identical");
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_formatting_and_attribute_order_are_equivalent() {
        let a = "<SCL xmlns=\"http://www.iec.ch/61850/2003/SCL\"><IED name=\"P1\" type=\"R\"/></SCL>";
        let b = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<SCL xmlns=\"http://www.iec.ch/61850/2003/SCL\">\n  <IED type=\"R\" name=\"P1\"/>\n</SCL>\n";
        let verdict = validate_round_trip(a, b, &options()).unwrap();
        assert_eq!(verdict, Verdict::Equivalent);
        assert!(verdict.is_success());
    }

    #[test]
    fn test_divergence_path() {
        let a = "<SCL><Substation name=\"S1\"/><Substation name=\"S2\"><VoltageLevel name=\"V\"/></Substation></SCL>";
        let b = "<SCL><Substation name=\"S1\"/><Substation name=\"S2\"><VoltageLevel name=\"W\"/></Substation></SCL>";
        let verdict = validate_round_trip(a, b, &options()).unwrap();
        match verdict {
            Verdict::Diverged(d) => {
                assert_eq!(d.path, "/SCL/Substation[2]/VoltageLevel");
                assert!(d.detail.contains("`V` became `W`"));
            }
            other => panic!("expected divergence, got {:?}", other),
        }
    }

    #[test]
    fn test_child_order_matters() {
        let a = "<SCL><A/><B/></SCL>";
        let b = "<SCL><B/><A/></SCL>";
        let verdict = validate_round_trip(a, b, &options()).unwrap();
        assert!(!verdict.is_success());
    }

    #[test]
    fn test_missing_child_and_namespace() {
        let a = "<SCL><A/><B/></SCL>";
        let b = "<SCL><A/></SCL>";
        let Verdict::Diverged(d) = validate_round_trip(a, b, &options()).unwrap() else {
            panic!("expected divergence");
        };
        assert_eq!(d.path, "/SCL");
        assert_eq!(d.detail, "2 children became 1");

        let a = "<SCL xmlns:p=\"u\"/>";
        let b = "<SCL xmlns:p=\"v\"/>";
        assert!(!validate_round_trip(a, b, &options()).unwrap().is_success());
    }

    #[test]
    fn test_opaque_blocks_compare_exactly() {
        let a = "<SCL><Private type=\"x\"><v:a  k=\"1\"/></Private></SCL>";
        let b = "<SCL><Private type=\"x\"><v:a k=\"1\"/></Private></SCL>";
        let Verdict::Diverged(d) = validate_round_trip(a, b, &options()).unwrap() else {
            panic!("expected divergence");
        };
        assert_eq!(d.path, "/SCL/Private");
    }

    #[test]
    fn test_many_same_name_siblings() {
        let count = 20_000;
        let mut a = String::from("<SCL>");
        for _ in 0..count {
            a.push_str("<DAI name=\"x\"/>");
        }
        a.push_str("</SCL>");

        let b = format!("{} ", a);
        assert_eq!(validate_round_trip(&a, &b, &options()).unwrap(), Verdict::Equivalent);

        let last = a.rfind("name=\"x\"").unwrap();
        let mut c = a.clone();
        c.replace_range(last..last + 8, "name=\"y\"");
        let Verdict::Diverged(d) = validate_round_trip(&a, &c, &options()).unwrap() else {
            panic!("expected divergence");
        };
        assert_eq!(d.path, format!("/SCL/DAI[{}]", count));
        assert_eq!(d.detail, "attribute `name`: `x` became `y`");
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let err = validate_round_trip("<SCL>", "<SCL/>", &options()).unwrap_err();
        assert!(matches!(err, CodecError::Parse { .. }));
    }
}
