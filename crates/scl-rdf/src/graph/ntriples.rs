// crates/scl-rdf/src/graph/ntriples.rs

//! N-Triples reading and writing through `oxigraph`'s RDF I/O.
//!
//! This is the bulk-load format handed to triple stores, and the format in
//! which graphs exported by other tools are decoded.

use super::Graph;
use super::convert::{from_quad, to_ox_triple};
use crate::error::CodecError;
use oxigraph::io::{RdfFormat, RdfParseError, RdfParser, RdfSerializer};
use std::io::{self, Write};

/// Writes every triple of `graph` as one N-Triples line.
///
/// A term that is not valid RDF (a malformed IRI, a literal subject) fails
/// with `io::ErrorKind::InvalidData`.
pub fn write_ntriples<W: Write>(graph: &Graph, out: W) -> io::Result<()> {
    let mut serializer = RdfSerializer::from_format(RdfFormat::NTriples).for_writer(out);
    for triple in graph.iter() {
        let triple = to_ox_triple(triple).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        serializer.serialize_triple(&triple)?;
    }
    let mut out = serializer.finish()?;
    out.flush()
}

/// Renders `graph` as an N-Triples document.
pub fn to_ntriples_string(graph: &Graph) -> Result<String, CodecError> {
    let mut buffer = Vec::with_capacity(graph.len() * 96);
    write_ntriples(graph, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| CodecError::Write(e.to_string()))
}

/// Parses an N-Triples document into a graph.
///
/// # Errors
/// Returns `CodecError::NTriples` with the 1-based line number of the first
/// malformed statement.
pub fn parse_ntriples(input: &str) -> Result<Graph, CodecError> {
    let mut graph = Graph::new();
    for quad in RdfParser::from_format(RdfFormat::NTriples).for_reader(input.as_bytes()) {
        let quad = quad.map_err(syntax_error)?;
        let triple = from_quad(quad).map_err(|e| CodecError::NTriples {
            line: 0,
            message: e.to_string(),
        })?;
        graph.add(triple);
    }
    Ok(graph)
}

fn syntax_error(e: RdfParseError) -> CodecError {
    match e {
        RdfParseError::Syntax(e) => CodecError::NTriples {
            line: e
                .location()
                .map_or(0, |location| location.start.line as usize + 1),
            message: e.to_string(),
        },
        RdfParseError::Io(e) => e.into(),
    }
}
