// crates/scl-rdf/src/config.rs

//! Codec configuration.

use serde::{Deserialize, Serialize};

/// Element namespace of the original converter (`iec:`).
pub const DEFAULT_ELEMENT_NAMESPACE: &str = "http://iec61850.com/SCL#";
/// Namespace of opaque `<Private>` blocks (`private:`).
pub const DEFAULT_PRIVATE_NAMESPACE: &str = "http://iec61850.com/private#";
/// Namespace of codec bookkeeping terms (`codec:`).
pub const DEFAULT_CODEC_NAMESPACE: &str = "http://iec61850.com/codec#";
/// The XML namespace of SCL documents.
pub const SCL_NAMESPACE: &str = "http://www.iec.ch/61850/2003/SCL";

/// What the decoder does with a child entity that has no recognized type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Abort the whole decode with `CodecError::UnknownType`.
    #[default]
    Fail,
    /// Drop the child, log a warning and report it in `Decoded::warnings`.
    Skip,
}

/// Settings shared by the encoder, decoder, parser and writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub element_namespace: String,
    pub private_namespace: String,
    pub codec_namespace: String,
    /// Local names of elements stored as opaque payloads.
    pub opaque_tags: Vec<String>,
    pub unknown_type_policy: UnknownTypePolicy,
    /// Default namespace put on the decoded root when the graph records none.
    pub fallback_default_namespace: Option<String>,
    /// Indentation of decoded output, `0` for a single line.
    pub indent: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            element_namespace: DEFAULT_ELEMENT_NAMESPACE.into(),
            private_namespace: DEFAULT_PRIVATE_NAMESPACE.into(),
            codec_namespace: DEFAULT_CODEC_NAMESPACE.into(),
            opaque_tags: vec!["Private".into()],
            unknown_type_policy: UnknownTypePolicy::Fail,
            fallback_default_namespace: None,
            indent: 2,
        }
    }
}

impl CodecConfig {
    /// Parser options capturing the opaque tags verbatim.
    pub fn parse_options(&self) -> crate::xml::ParseOptions {
        crate::xml::ParseOptions::with_verbatim_tags(self.opaque_tags.iter().cloned())
    }

    pub fn write_options(&self) -> crate::xml::WriteOptions {
        crate::xml::WriteOptions {
            indent: self.indent,
            declaration: true,
        }
    }

    pub fn with_unknown_type_policy(mut self, policy: UnknownTypePolicy) -> Self {
        self.unknown_type_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = CodecConfig::default();
        assert_eq!(cfg.element_namespace, "http://iec61850.com/SCL#");
        assert_eq!(cfg.opaque_tags, vec!["Private".to_string()]);
        assert_eq!(cfg.unknown_type_policy, UnknownTypePolicy::Fail);
        assert!(cfg.parse_options().verbatim_tags.contains("Private"));
        assert_eq!(cfg.write_options().indent, 2);
    }
}
