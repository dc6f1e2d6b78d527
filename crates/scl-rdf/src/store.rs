// crates/scl-rdf/src/store.rs

//! The triple-store boundary.
//!
//! Converted documents are persisted one dataset per document. `TripleStore`
//! is the seam a remote store client implements; `MemoryStore` is the
//! in-process implementation used by the pipeline, the CLI and the tests.

use crate::graph::convert::{self, InvalidTerm};
use crate::graph::{Graph, TriplePattern};
use log::debug;
use oxigraph::model::{GraphNameRef, NamedNode, NamedOrBlankNode, Quad};
use oxigraph::store::Store;
use std::fmt;
use thiserror::Error;

/// Named graphs of `MemoryStore` datasets live under this prefix.
const DATASET_GRAPH_NS: &str = "http://iec61850.com/dataset/";

/// Errors reported by a `TripleStore`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("dataset `{0}` does not exist")]
    DatasetNotFound(String),

    #[error("invalid dataset name `{0}`")]
    InvalidDatasetName(String),

    /// Failure inside a store backend (connection, HTTP status, ...).
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl From<InvalidTerm> for StoreError {
    fn from(e: InvalidTerm) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Dataset-scoped triple storage with set semantics.
pub trait TripleStore {
    /// Creates `dataset` if it does not exist yet. Returns `true` if it was created.
    fn create_dataset(&mut self, dataset: &str) -> Result<bool, StoreError>;

    /// Inserts every triple of `graph`. Returns how many were new.
    fn bulk_load(&mut self, dataset: &str, graph: &Graph) -> Result<usize, StoreError>;

    /// Returns the triples of `dataset` selected by `pattern`.
    fn query(&self, dataset: &str, pattern: &TriplePattern) -> Result<Graph, StoreError>;

    /// Removes the triples selected by `pattern`. Returns how many were removed.
    fn delete(&mut self, dataset: &str, pattern: &TriplePattern) -> Result<usize, StoreError>;

    /// Removes `dataset` and all of its triples.
    fn drop_dataset(&mut self, dataset: &str) -> Result<(), StoreError>;

    /// Names of the existing datasets, sorted.
    fn datasets(&self) -> Result<Vec<String>, StoreError>;
}

/// An in-memory `oxigraph` store. Each dataset is one named graph, so
/// datasets never share triples.
pub struct MemoryStore {
    store: Store,
}

impl MemoryStore {
    pub fn new() -> Result<Self, StoreError> {
        let store = Store::new()
            .map_err(|e| StoreError::Backend(format!("failed to create oxigraph store: {}", e)))?;
        Ok(Self { store })
    }

    /// Number of triples in `dataset`.
    pub fn len(&self, dataset: &str) -> Result<usize, StoreError> {
        let graph = self.graph(dataset)?;
        let mut count = 0;
        for quad in self
            .store
            .quads_for_pattern(None, None, None, Some(GraphNameRef::NamedNode(graph.as_ref())))
        {
            quad.map_err(backend)?;
            count += 1;
        }
        Ok(count)
    }

    /// Named graph of an existing dataset.
    fn graph(&self, dataset: &str) -> Result<NamedNode, StoreError> {
        let graph = graph_name(dataset)?;
        if self.store.contains_named_graph(graph.as_ref()).map_err(backend)? {
            Ok(graph)
        } else {
            Err(StoreError::DatasetNotFound(dataset.to_string()))
        }
    }

    /// Quads of `graph` selected by `pattern`. A literal subject selects nothing.
    fn matching(&self, graph: &NamedNode, pattern: &TriplePattern) -> Result<Vec<Quad>, StoreError> {
        let subject = match &pattern.subject {
            Some(term) => match convert::to_ox_subject(term)? {
                Some(subject) => Some(subject),
                None => return Ok(Vec::new()),
            },
            None => None,
        };
        let predicate = pattern.predicate.as_deref().map(convert::named_node).transpose()?;
        let object = pattern.object.as_ref().map(convert::to_ox_term).transpose()?;

        self.store
            .quads_for_pattern(
                subject.as_ref().map(|s| s.as_ref().into()),
                predicate.as_ref().map(NamedNode::as_ref),
                object.as_ref().map(|o| o.as_ref()),
                Some(GraphNameRef::NamedNode(graph.as_ref())),
            )
            .collect::<Result<Vec<_>, _>>()
            .map_err(backend)
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

fn backend(e: impl fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Dataset names are used as path segments by remote stores.
fn check_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidDatasetName(name.to_string()))
    }
}

fn graph_name(dataset: &str) -> Result<NamedNode, StoreError> {
    check_name(dataset)?;
    NamedNode::new(format!("{}{}", DATASET_GRAPH_NS, dataset))
        .map_err(|_| StoreError::InvalidDatasetName(dataset.to_string()))
}

impl TripleStore for MemoryStore {
    fn create_dataset(&mut self, dataset: &str) -> Result<bool, StoreError> {
        let graph = graph_name(dataset)?;
        if self.store.contains_named_graph(graph.as_ref()).map_err(backend)? {
            return Ok(false);
        }
        debug!("Creating dataset {}", dataset);
        self.store.insert_named_graph(graph.as_ref()).map_err(backend)?;
        Ok(true)
    }

    fn bulk_load(&mut self, dataset: &str, graph: &Graph) -> Result<usize, StoreError> {
        let name = self.graph(dataset)?;
        let mut added = 0;
        for triple in graph.iter() {
            let quad = convert::to_quad(triple, &name)?;
            if !self.store.contains(&quad).map_err(backend)? {
                self.store.insert(&quad).map_err(backend)?;
                added += 1;
            }
        }
        debug!("Loaded {} new triples into {} ({} given)", added, dataset, graph.len());
        Ok(added)
    }

    fn query(&self, dataset: &str, pattern: &TriplePattern) -> Result<Graph, StoreError> {
        let graph = self.graph(dataset)?;
        self.matching(&graph, pattern)?
            .into_iter()
            .map(|quad| convert::from_quad(quad).map_err(StoreError::from))
            .collect()
    }

    fn delete(&mut self, dataset: &str, pattern: &TriplePattern) -> Result<usize, StoreError> {
        let graph = self.graph(dataset)?;
        let quads = self.matching(&graph, pattern)?;
        for quad in &quads {
            self.store.remove(quad).map_err(backend)?;
        }
        Ok(quads.len())
    }

    fn drop_dataset(&mut self, dataset: &str) -> Result<(), StoreError> {
        let graph = self.graph(dataset)?;
        self.store.remove_named_graph(graph.as_ref()).map_err(backend)?;
        debug!("Dropped dataset {}", dataset);
        Ok(())
    }

    fn datasets(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for graph in self.store.named_graphs() {
            if let NamedOrBlankNode::NamedNode(node) = graph.map_err(backend)? {
                if let Some(name) = node.as_str().strip_prefix(DATASET_GRAPH_NS) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
