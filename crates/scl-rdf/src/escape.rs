//! Reversible escaping of document names embedded in IRIs.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use std::borrow::Cow;

/// Everything except ASCII alphanumerics and `-._~` is percent-encoded,
/// which matches URL quoting with no extra safe characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Marks an attribute predicate whose local part is percent-encoded.
pub(crate) const ESCAPED_ATTRIBUTE_MARKER: &str = "attr_";

/// Local parts of element-namespace predicates that are not attributes.
const RESERVED_LOCALS: [&str; 2] = ["order", "textContent"];

/// Percent-encodes one IRI path component.
pub fn encode_component(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, COMPONENT).into()
}

/// Reverses `encode_component`. Returns `None` when the bytes are not UTF-8.
pub fn decode_component(value: &str) -> Option<Cow<'_, str>> {
    percent_decode_str(value).decode_utf8().ok()
}

/// Maps an attribute name onto the local part of its predicate.
///
/// Plain names are used as they are. Any name that could be mistaken for a
/// reserved predicate, or that is not a plain ASCII name (namespace-qualified
/// names such as `xsi:type`), is prefixed with `attr_` and percent-encoded.
/// Since plain names never start with `attr_`, the mapping is injective.
pub fn attribute_local(name: &str) -> Cow<'_, str> {
    if is_plain_attribute(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{}{}", ESCAPED_ATTRIBUTE_MARKER, encode_component(name)))
    }
}

/// Reverses `attribute_local`.
pub fn attribute_name(local: &str) -> Option<Cow<'_, str>> {
    match local.strip_prefix(ESCAPED_ATTRIBUTE_MARKER) {
        Some(encoded) => decode_component(encoded),
        None => Some(Cow::Borrowed(local)),
    }
}

fn is_plain_attribute(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        && !name.starts_with(ESCAPED_ATTRIBUTE_MARKER)
        && !name.starts_with("has")
        && !RESERVED_LOCALS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component_matches_url_quoting() {
        assert_eq!(encode_component("Bay 1/A"), "Bay%201%2FA");
        assert_eq!(encode_component("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_component("é"), "%C3%A9");
        assert_eq!(decode_component("Bay%201%2FA").unwrap(), "Bay 1/A");
    }

    #[test]
    fn test_plain_attributes_stay_readable() {
        assert_eq!(attribute_local("name"), "name");
        assert_eq!(attribute_local("desc"), "desc");
        assert_eq!(attribute_local("lnClass"), "lnClass");
    }

    #[test]
    fn test_qualified_and_reserved_attributes_are_escaped() {
        assert_eq!(attribute_local("xsi:type"), "attr_xsi%3Atype");
        assert_eq!(attribute_local("order"), "attr_order");
        assert_eq!(attribute_local("textContent"), "attr_textContent");
        assert_eq!(attribute_local("hasDefault"), "attr_hasDefault");
        assert_eq!(attribute_local("attr_x"), "attr_attr_x");
    }

    #[test]
    fn test_attribute_escaping_is_reversible() {
        for name in [
            "name",
            "xsi:type",
            "{http://ns}local",
            "attr_x",
            "order",
            "hasX",
            "a b",
            "xmlns:rte",
            "ünïcode",
        ] {
            let local = attribute_local(name);
            assert_eq!(attribute_name(&local).unwrap(), name, "for {}", name);
        }
    }

    #[test]
    fn test_distinct_names_never_collide() {
        // "attr_x" and the escaped form of "x" if it were escaped must differ.
        let a = attribute_local("attr_x").into_owned();
        let b = attribute_local("x").into_owned();
        assert_ne!(a, b);
        let c = attribute_local("p:x").into_owned();
        let d = attribute_local("p%3Ax").into_owned();
        assert_ne!(c, d);
    }
}
