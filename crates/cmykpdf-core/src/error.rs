// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for cmykpdf.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for every stage of a conversion run.
#[derive(Debug, Error)]
pub enum ConvertError {
    // -- Input --
    #[error("invalid input: {0}")]
    Input(String),

    // -- Pipeline stages --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("color conversion failed: {0}")]
    Convert(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("document assembly failed: {0}")]
    Assemble(String),

    #[error("PDF serialization failed: {0}")]
    Serialize(String),

    // -- Output --
    #[error("writing output failed: {0}")]
    Write(String),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Command output --
    #[error("formatting command output failed: {0}")]
    Report(String),

    #[error("configuration parse error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConvertError {
    /// Coarse classification reported back to callers in a `ConversionResult`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Convert(_) => ErrorKind::Convert,
            Self::Encode(_) => ErrorKind::Encode,
            Self::Assemble(_) => ErrorKind::Assemble,
            Self::Serialize(_) | Self::Report(_) => ErrorKind::Serialize,
            Self::Write(_) => ErrorKind::Write,
            Self::Config(_) | Self::Serialization(_) => ErrorKind::Config,
        }
    }
}

/// Error taxonomy exposed across the crate boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "InputError")]
    Input,
    #[serde(rename = "DecodeError")]
    Decode,
    #[serde(rename = "ConvertError")]
    Convert,
    #[serde(rename = "EncodeError")]
    Encode,
    #[serde(rename = "AssembleError")]
    Assemble,
    #[serde(rename = "SerializeError")]
    Serialize,
    #[serde(rename = "WriteError")]
    Write,
    #[serde(rename = "ConfigError")]
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Input => "InputError",
            Self::Decode => "DecodeError",
            Self::Convert => "ConvertError",
            Self::Encode => "EncodeError",
            Self::Assemble => "AssembleError",
            Self::Serialize => "SerializeError",
            Self::Write => "WriteError",
            Self::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_parse_errors_classify_as_config() {
        let err = ConvertError::from(serde_json::from_str::<u8>("nope").unwrap_err());
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(ConvertError::Report("x".into()).kind(), ErrorKind::Serialize);
    }

    #[test]
    fn kind_serializes_with_error_suffix() {
        let json = serde_json::to_string(&ErrorKind::Input).unwrap();
        assert_eq!(json, "\"InputError\"");
        assert_eq!(ErrorKind::Encode.to_string(), "EncodeError");
    }
}
