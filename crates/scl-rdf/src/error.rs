// crates/scl-rdf/src/error.rs

use crate::store::StoreError;
use thiserror::Error;

/// Errors that can occur while parsing, encoding, decoding or writing a document.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The XML input is malformed. Raised by the parser before the codec runs.
    #[error("XML parsing error at byte {position}: {message}")]
    Parse { position: u64, message: String },

    /// An error from the underlying `quick-xml` writer.
    #[error("XML writing error: {0}")]
    Write(String),

    /// The triple set contains zero or more than one document-root entity.
    #[error("expected exactly one document root in the triple set, found {found}")]
    RootNotFound { found: usize },

    /// A child reference points at an entity without a recognized type.
    #[error("entity <{subject}> (child of <{parent}>) has no recognized element type")]
    UnknownType { subject: String, parent: String },

    /// The child relations of the triple set loop back onto an ancestor.
    #[error("entity <{subject}> is its own ancestor")]
    CyclicReference { subject: String },

    /// A `<Private>` payload could not be turned back into XML.
    #[error("invalid opaque payload on <{subject}>: {reason}")]
    InvalidPayload { subject: String, reason: String },

    /// A line of N-Triples input could not be parsed.
    #[error("N-Triples syntax error on line {line}: {message}")]
    NTriples { line: usize, message: String },

    /// The triple store rejected a read or a write.
    #[error("triple store error: {0}")]
    Serialization(#[from] StoreError),
}

impl From<quick_xml::Error> for CodecError {
    fn from(e: quick_xml::Error) -> Self {
        CodecError::Parse {
            position: 0,
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError::Write(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::CodecError;
    use crate::store::StoreError;

    #[test]
    fn test_from_xml_error() {
        let xml_err = quick_xml::Error::Io(std::sync::Arc::new(std::io::Error::other("eof")));
        let err: CodecError = xml_err.into();
        assert!(matches!(err, CodecError::Parse { position: 0, .. }));
    }

    #[test]
    fn test_from_io_error() {
        let err: CodecError = std::io::Error::other("disk full").into();
        assert!(matches!(err, CodecError::Write(ref m) if m.contains("disk full")));
    }

    #[test]
    fn test_from_store_error() {
        let err: CodecError = StoreError::DatasetNotFound("scl_file_1".into()).into();
        assert!(matches!(
            err,
            CodecError::Serialization(StoreError::DatasetNotFound(_))
        ));
        assert_eq!(
            err.to_string(),
            "triple store error: dataset `scl_file_1` does not exist"
        );
    }

    #[test]
    fn test_root_not_found_message() {
        let err = CodecError::RootNotFound { found: 2 };
        assert_eq!(
            err.to_string(),
            "expected exactly one document root in the triple set, found 2"
        );
    }
}
