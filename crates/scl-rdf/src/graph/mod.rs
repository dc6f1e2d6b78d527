//! Append-only triple container.
//!
//! The graph keeps triples in insertion order (bag semantics). The encoder
//! relies on that order only for readability of the output; nothing in the
//! decoder depends on it except the tie-break for children without an order.

pub(crate) mod convert;
pub mod ntriples;
mod term;

pub use term::{Datatype, Literal, Term, RDF_LANG_STRING, XSD_BOOLEAN, XSD_INTEGER, XSD_STRING};

use std::sync::Arc;

/// A single (subject, predicate, object) fact.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Arc<str>,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl AsRef<str>, object: Term) -> Self {
        Self {
            subject,
            predicate: Arc::from(predicate.as_ref()),
            object,
        }
    }

    pub fn subject_iri(&self) -> Option<&str> {
        self.subject.as_iri()
    }
}

/// A selection over triples; `None` positions match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TriplePattern {
    pub subject: Option<Term>,
    pub predicate: Option<String>,
    pub object: Option<Term>,
}

impl TriplePattern {
    /// The pattern matching every triple.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_subject(mut self, subject: Term) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn with_object(mut self, object: Term) -> Self {
        self.object = Some(object);
        self
    }
}

/// A collection of triples.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triples: Vec::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    /// Add a triple by components.
    pub fn add_triple(&mut self, subject: Term, predicate: impl AsRef<str>, object: Term) {
        self.add(Triple::new(subject, predicate, object));
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Sort triples by SPO for deterministic output.
    pub fn sort(&mut self) {
        self.triples.sort();
    }

    /// Sort and remove duplicate triples (set semantics).
    pub fn dedupe(&mut self) {
        self.triples.sort();
        self.triples.dedup();
    }

    /// All objects of `(subject, predicate, ?)`.
    pub fn objects<'a>(&'a self, subject: &'a str, predicate: &'a str) -> impl Iterator<Item = &'a Term> {
        self.triples
            .iter()
            .filter(move |t| t.subject_iri() == Some(subject) && &*t.predicate == predicate)
            .map(|t| &t.object)
    }

    /// All IRI subjects of `(?, predicate, object)`.
    pub fn subjects<'a>(&'a self, predicate: &'a str, object: &'a Term) -> impl Iterator<Item = &'a str> {
        self.triples
            .iter()
            .filter(move |t| &*t.predicate == predicate && t.object == *object)
            .filter_map(Triple::subject_iri)
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut g = Graph::new();
        g.add_triple(Term::iri("http://a/1"), "http://p/name", Term::string("x"));
        g.add_triple(Term::iri("http://a/1"), "http://p/child", Term::iri("http://a/2"));
        g.add_triple(Term::iri("http://a/2"), "http://p/name", Term::string("y"));
        g
    }

    #[test]
    fn test_objects_and_subjects() {
        let g = sample();
        let names: Vec<_> = g.objects("http://a/1", "http://p/name").collect();
        assert_eq!(names, vec![&Term::string("x")]);

        let obj = Term::iri("http://a/2");
        let parents: Vec<_> = g.subjects("http://p/child", &obj).collect();
        assert_eq!(parents, vec!["http://a/1"]);
    }

    #[test]
    fn test_dedupe() {
        let mut g = sample();
        g.extend(sample());
        assert_eq!(g.len(), 6);
        g.dedupe();
        assert_eq!(g.len(), 3);
        assert_eq!(g.objects("http://a/1", "http://p/child").count(), 1);
    }
}
