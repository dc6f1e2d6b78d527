// crates/scl-rdf/src/pipeline.rs

//! Full conversion of one document through a triple store.
//!
//! parse → encode → load into the document's dataset → read the dataset back
//! → decode → write → validate against the original text.

use crate::config::CodecConfig;
use crate::decoder::{DecodeWarning, Decoded, decode};
use crate::encoder::{Encoded, encode};
use crate::error::CodecError;
use crate::graph::{Graph, TriplePattern};
use crate::store::{StoreError, TripleStore};
use crate::validate::{Verdict, validate_round_trip};
use crate::xml::{Document, parse_document, write_document};
use log::{info, warn};
use std::fmt;

/// Dataset name for a stored document id, e.g. `scl_file_7`.
pub fn dataset_name(file_id: u64) -> String {
    format!("scl_file_{}", file_id)
}

/// State of a document after `convert_and_validate`.
///
/// A failed conversion is reported as `Err(CodecError)` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
    /// Stored and the round trip reproduced the document.
    Validated,
    /// Stored, but the regenerated document diverges.
    Converted,
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStatus::Validated => write!(f, "validated"),
            ConversionStatus::Converted => write!(f, "converted"),
        }
    }
}

/// Summary of one conversion.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub dataset: String,
    /// Triples produced by the encoder.
    pub triple_count: usize,
    pub element_count: usize,
    pub opaque_count: usize,
    pub verdict: Verdict,
    pub status: ConversionStatus,
    pub warnings: Vec<DecodeWarning>,
    /// The document regenerated from the stored triples.
    pub regenerated: String,
}

/// Name of the dataset a replacement is loaded into before it touches `dataset`.
fn staging_name(dataset: &str) -> String {
    format!("{}.staging", dataset)
}

/// Encodes `doc` and replaces the content of `dataset` with the triples.
///
/// A new dataset is loaded directly. An existing one is only cleared once the
/// new triples loaded completely into its staging dataset, so a failing load
/// leaves the previous document in place. If the final copy into `dataset`
/// fails, the staging dataset is kept and still holds the whole document.
pub fn store_document<S>(
    store: &mut S,
    dataset: &str,
    doc: &Document,
    config: &CodecConfig,
) -> Result<Encoded, CodecError>
where
    S: TripleStore + ?Sized,
{
    let encoded = encode(doc, config)?;
    if store.create_dataset(dataset)? {
        store.bulk_load(dataset, &encoded.graph)?;
        return Ok(encoded);
    }

    let staging = staging_name(dataset);
    replace_contents(store, &staging, &encoded.graph).inspect_err(|_| {
        if let Err(e) = store.drop_dataset(&staging) {
            warn!("Could not drop {} after a failed load: {}", staging, e);
        }
    })?;
    replace_contents(store, dataset, &encoded.graph)?;
    store.drop_dataset(&staging)?;
    Ok(encoded)
}

/// Empties `dataset`, creating it if needed, then loads `graph` into it.
fn replace_contents<S>(store: &mut S, dataset: &str, graph: &Graph) -> Result<(), StoreError>
where
    S: TripleStore + ?Sized,
{
    if !store.create_dataset(dataset)? {
        let removed = store.delete(dataset, &TriplePattern::any())?;
        info!("Cleared {} stale triples from {}", removed, dataset);
    }
    store.bulk_load(dataset, graph)?;
    Ok(())
}

/// Reads the whole of `dataset` back and decodes it.
pub fn load_document<S>(store: &S, dataset: &str, config: &CodecConfig) -> Result<Decoded, CodecError>
where
    S: TripleStore + ?Sized,
{
    let graph = store.query(dataset, &TriplePattern::any())?;
    decode(&graph, config)
}

/// Converts `xml` into `dataset` and validates the round trip through the store.
pub fn convert_and_validate<S>(
    store: &mut S,
    dataset: &str,
    xml: &str,
    config: &CodecConfig,
) -> Result<ConversionReport, CodecError>
where
    S: TripleStore + ?Sized,
{
    let parse_options = config.parse_options();
    let doc = parse_document(xml, &parse_options)?;
    let encoded = store_document(store, dataset, &doc, config)?;

    let decoded = load_document(store, dataset, config)?;
    let regenerated = write_document(&decoded.document, &config.write_options())?;
    let verdict = validate_round_trip(xml, &regenerated, &parse_options)?;

    let status = if verdict.is_success() {
        ConversionStatus::Validated
    } else {
        warn!("{}: {}", dataset, verdict);
        ConversionStatus::Converted
    };
    info!(
        "{}: {} triples, status {}",
        dataset,
        encoded.graph.len(),
        status
    );

    Ok(ConversionReport {
        dataset: dataset.to_string(),
        triple_count: encoded.graph.len(),
        element_count: encoded.element_count,
        opaque_count: encoded.opaque_count,
        verdict,
        status,
        warnings: decoded.warnings,
        regenerated,
    })
}
