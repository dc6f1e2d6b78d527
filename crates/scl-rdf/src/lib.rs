// src/lib.rs

#![doc = "Lossless conversion between IEC 61850 SCL documents and RDF triples."]
#![doc = ""]
#![doc = "The codec turns an SCL tree into a flat triple set that any triple store can"]
#![doc = "bulk-load, and rebuilds the tree from such a set with its sibling order,"]
#![doc = "attributes, text and namespace declarations intact. `<Private>` vendor"]
#![doc = "blocks are carried as opaque payloads and come back byte-identical."]
#![doc = ""]
#![doc = "It provides:"]
#![doc = "- `encode`: document tree → triples."]
#![doc = "- `decode`: triples → document tree."]
#![doc = "- `validate_round_trip`: identical / equivalent / diverged verdicts."]
#![doc = "- `convert_and_validate`: the whole trip through a `TripleStore`."]

// --- Crate Modules ---

pub mod config;
pub mod decoder;
pub mod encoder;
mod error;
mod escape;
pub mod graph;
pub mod pipeline;
pub mod registry;
pub mod store;
pub mod validate;
pub mod vocab;
pub mod xml;

// --- Public API Re-exports ---

pub use config::{CodecConfig, UnknownTypePolicy};
pub use decoder::{DecodeWarning, Decoded, decode};
pub use encoder::{Encoded, encode};
pub use error::CodecError;
pub use escape::{decode_component, encode_component};
pub use graph::ntriples::{parse_ntriples, to_ntriples_string, write_ntriples};
pub use graph::{Graph, Term, Triple, TriplePattern};
pub use pipeline::{ConversionReport, ConversionStatus, convert_and_validate, dataset_name};
pub use store::{MemoryStore, StoreError, TripleStore};
pub use validate::{Divergence, Verdict, compare_documents, validate_round_trip};
pub use xml::{Document, Element, Node, parse_document, write_document};
