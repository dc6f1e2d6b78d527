//! Conversions between codec terms and the `oxigraph` data model.
//!
//! Stores and N-Triples I/O work on `oxigraph` terms; the codec itself only
//! sees `Term`/`Triple`. IRIs, blank node labels and language tags are
//! validated on the way in.

use super::{Datatype, Literal, Term, Triple};
use oxigraph::model::{self as ox, BlankNode, GraphName, NamedNode, NamedOrBlankNode, Quad};
use std::fmt;
use thiserror::Error;

/// A term `oxigraph` rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {term}: {reason}")]
pub struct InvalidTerm {
    pub term: String,
    pub reason: String,
}

impl InvalidTerm {
    fn new(term: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self {
            term: term.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub(crate) fn named_node(iri: &str) -> Result<NamedNode, InvalidTerm> {
    NamedNode::new(iri).map_err(|e| InvalidTerm::new(format_args!("<{}>", iri), e))
}

fn blank_node(label: &str) -> Result<BlankNode, InvalidTerm> {
    BlankNode::new(label).map_err(|e| InvalidTerm::new(format_args!("_:{}", label), e))
}

fn to_ox_literal(literal: &Literal) -> Result<ox::Literal, InvalidTerm> {
    if let Some(language) = literal.language() {
        return ox::Literal::new_language_tagged_literal(literal.lexical(), language)
            .map_err(|e| InvalidTerm::new(Term::Literal(literal.clone()), e));
    }
    Ok(match literal.datatype() {
        Datatype::String => ox::Literal::new_simple_literal(literal.lexical()),
        other => ox::Literal::new_typed_literal(literal.lexical(), named_node(other.iri())?),
    })
}

pub(crate) fn to_ox_term(term: &Term) -> Result<ox::Term, InvalidTerm> {
    Ok(match term {
        Term::Iri(iri) => named_node(iri)?.into(),
        Term::Blank(label) => blank_node(label)?.into(),
        Term::Literal(literal) => to_ox_literal(literal)?.into(),
    })
}

/// Subject position term. `None` for a literal, which can never be a subject.
pub(crate) fn to_ox_subject(term: &Term) -> Result<Option<NamedOrBlankNode>, InvalidTerm> {
    Ok(match term {
        Term::Iri(iri) => Some(named_node(iri)?.into()),
        Term::Blank(label) => Some(blank_node(label)?.into()),
        Term::Literal(_) => None,
    })
}

fn required_subject(term: &Term) -> Result<NamedOrBlankNode, InvalidTerm> {
    to_ox_subject(term)?.ok_or_else(|| InvalidTerm::new(term, "a literal cannot be a subject"))
}

pub(crate) fn to_ox_triple(triple: &Triple) -> Result<ox::Triple, InvalidTerm> {
    Ok(ox::Triple::new(
        required_subject(&triple.subject)?,
        named_node(&triple.predicate)?,
        to_ox_term(&triple.object)?,
    ))
}

/// `triple` placed in the named graph `graph`.
pub(crate) fn to_quad(triple: &Triple, graph: &NamedNode) -> Result<Quad, InvalidTerm> {
    Ok(Quad::new(
        required_subject(&triple.subject)?,
        named_node(&triple.predicate)?,
        to_ox_term(&triple.object)?,
        GraphName::NamedNode(graph.clone()),
    ))
}

pub(crate) fn from_ox_term(term: ox::Term) -> Result<Term, InvalidTerm> {
    match term {
        ox::Term::NamedNode(node) => Ok(Term::iri(node.as_str())),
        ox::Term::BlankNode(node) => Ok(Term::blank(node.as_str())),
        ox::Term::Literal(literal) => Ok(Term::Literal(match literal.language() {
            Some(language) => Literal::lang_string(literal.value(), language),
            None => Literal::new(literal.value(), Datatype::from_iri(literal.datatype().as_str())),
        })),
        #[allow(unreachable_patterns)]
        other => Err(InvalidTerm::new(other, "quoted triples are not supported")),
    }
}

/// The triple of a quad; the graph name is dropped.
pub(crate) fn from_quad(quad: Quad) -> Result<Triple, InvalidTerm> {
    Ok(Triple::new(
        from_ox_term(quad.subject.into())?,
        quad.predicate.as_str(),
        from_ox_term(quad.object)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terms_convert_both_ways() {
        let terms = [
            Term::iri("http://iec61850.com/SCL#SCL_1/Header_2"),
            Term::blank("b0"),
            Term::string("line one\nline two"),
            Term::integer(-4),
            Term::boolean(false),
            Term::Literal(Literal::lang_string("Poste", "fr")),
            Term::Literal(Literal::new("2024-01-01", Datatype::from_iri("http://www.w3.org/2001/XMLSchema#date"))),
        ];
        for term in terms {
            let converted = to_ox_term(&term).unwrap();
            assert_eq!(from_ox_term(converted).unwrap(), term);
        }
    }

    #[test]
    fn test_quad_keeps_triple_and_graph() {
        let triple = Triple::new(
            Term::iri("http://x/SCL_1"),
            "http://iec61850.com/SCL#order",
            Term::integer(1),
        );
        let graph = named_node("http://iec61850.com/dataset/d").unwrap();
        let quad = to_quad(&triple, &graph).unwrap();
        assert_eq!(quad.graph_name, GraphName::NamedNode(graph));
        assert_eq!(from_quad(quad).unwrap(), triple);
    }

    #[test]
    fn test_invalid_terms_are_rejected() {
        let err = to_ox_term(&Term::iri("not an iri")).unwrap_err();
        assert_eq!(err.term, "<not an iri>");

        let literal_subject = Triple::new(Term::string("x"), "http://p", Term::string("y"));
        assert!(to_ox_triple(&literal_subject).is_err());
        assert_eq!(to_ox_subject(&Term::string("x")).unwrap(), None);
    }
}
