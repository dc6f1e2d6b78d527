//! RDF terms: IRIs, blank nodes and literals.

use std::fmt;
use std::sync::Arc;

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// The datatype of a literal.
///
/// The three datatypes the codec emits get their own variant; anything read
/// from foreign data is kept as `Other` so it survives a write/read cycle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Datatype {
    String,
    Integer,
    Boolean,
    Other(Arc<str>),
}

impl Datatype {
    /// Maps a datatype IRI onto a `Datatype`.
    pub fn from_iri(iri: &str) -> Self {
        match iri {
            XSD_STRING => Datatype::String,
            XSD_INTEGER => Datatype::Integer,
            XSD_BOOLEAN => Datatype::Boolean,
            other => Datatype::Other(Arc::from(other)),
        }
    }

    pub fn iri(&self) -> &str {
        match self {
            Datatype::String => XSD_STRING,
            Datatype::Integer => XSD_INTEGER,
            Datatype::Boolean => XSD_BOOLEAN,
            Datatype::Other(iri) => iri,
        }
    }
}

/// A literal: lexical form, datatype and optional language tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    lexical: Arc<str>,
    datatype: Datatype,
    language: Option<Arc<str>>,
}

impl Literal {
    pub fn new(lexical: impl AsRef<str>, datatype: Datatype) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype,
            language: None,
        }
    }

    /// A language-tagged string (`"..."@en`).
    pub fn lang_string(lexical: impl AsRef<str>, language: impl AsRef<str>) -> Self {
        Self {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Datatype::Other(Arc::from(RDF_LANG_STRING)),
            language: Some(Arc::from(language.as_ref())),
        }
    }

    pub fn lexical(&self) -> &str {
        &self.lexical
    }

    pub fn datatype(&self) -> &Datatype {
        &self.datatype
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Reads the literal as an integer. Any datatype is accepted as long as
    /// the lexical form parses, since stores do not always keep `xsd:integer`.
    pub fn as_integer(&self) -> Option<i64> {
        self.lexical.trim().parse().ok()
    }
}

/// A node of the graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Iri(Arc<str>),
    /// Blank node label, without the `_:` prefix.
    Blank(Arc<str>),
    Literal(Literal),
}

impl Term {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Term::Iri(Arc::from(iri.as_ref()))
    }

    pub fn blank(label: impl AsRef<str>) -> Self {
        Term::Blank(Arc::from(label.as_ref()))
    }

    /// A plain `xsd:string` literal.
    pub fn string(value: impl AsRef<str>) -> Self {
        Term::Literal(Literal::new(value, Datatype::String))
    }

    pub fn integer(value: i64) -> Self {
        Term::Literal(Literal::new(value.to_string(), Datatype::Integer))
    }

    pub fn boolean(value: bool) -> Self {
        Term::Literal(Literal::new(value.to_string(), Datatype::Boolean))
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Blank(label) => write!(f, "_:{}", label),
            Term::Literal(lit) => match (&lit.language, &lit.datatype) {
                (Some(lang), _) => write!(f, "\"{}\"@{}", lit.lexical, lang),
                (None, Datatype::String) => write!(f, "\"{}\"", lit.lexical),
                (None, dt) => write!(f, "\"{}\"^^<{}>", lit.lexical, dt.iri()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datatype_iri_mapping() {
        assert_eq!(Datatype::from_iri(XSD_INTEGER), Datatype::Integer);
        assert_eq!(Datatype::from_iri(XSD_STRING), Datatype::String);
        let custom = Datatype::from_iri("http://example.org/dt");
        assert_eq!(custom.iri(), "http://example.org/dt");
    }

    #[test]
    fn test_integer_literal_accessors() {
        let term = Term::integer(42);
        let lit = term.as_literal().unwrap();
        assert_eq!(lit.as_integer(), Some(42));
        assert_eq!(lit.datatype(), &Datatype::Integer);

        // A plain string holding digits still reads as an integer.
        let plain = Literal::new(" 7 ", Datatype::String);
        assert_eq!(plain.as_integer(), Some(7));
        assert_eq!(Literal::new("seven", Datatype::String).as_integer(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Term::iri("http://a/b").to_string(), "<http://a/b>");
        assert_eq!(Term::string("x").to_string(), "\"x\"");
        assert_eq!(
            Term::boolean(true).to_string(),
            "\"true\"^^<http://www.w3.org/2001/XMLSchema#boolean>"
        );
        assert_eq!(
            Term::Literal(Literal::lang_string("hi", "en")).to_string(),
            "\"hi\"@en"
        );
    }
}
