//! Error types for the text codec.

use std::path::PathBuf;

use thiserror::Error;
use vdoc_model::Version;

/// Errors that can occur while reading or writing the text format.
#[derive(Debug, Error)]
pub enum TextError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Malformed textual record. Carries the 1-based line number, the
    /// offending token and, when present, the lower-level cause.
    #[error("invalid text stream at line {line}: {message} (near {token:?})")]
    InvalidFormat {
        line: usize,
        token: String,
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller requested encoding at a version this implementation does
    /// not know how to produce.
    #[error("unsupported target version {requested} (maximum {maximum})")]
    UnsupportedVersion { requested: Version, maximum: Version },

    /// The document carries data the target version cannot represent.
    #[error("{feature} not representable at version {version}")]
    UnsupportedFeature {
        feature: &'static str,
        version: Version,
    },

    /// A named paper that is not in the catalogue at the target version.
    #[error("unknown paper name {name:?} at version {version}")]
    UnknownPaper { name: String, version: Version },

    /// A coordinate that does not fit the integer encoding used below
    /// version 2.0.
    #[error("coordinate {value} out of range for integer encoding")]
    CoordinateRange { value: f64 },

    /// Underlying stream failure, always wrapped.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for text codec operations.
pub type Result<T> = std::result::Result<T, TextError>;

impl TextError {
    /// Create an `InvalidFormat` error at a line.
    pub fn invalid_format(
        line: usize,
        token: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidFormat {
            line,
            token: token.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Create an `InvalidFormat` error wrapping a lower-level cause.
    pub fn invalid_format_caused_by(
        line: usize,
        token: impl Into<String>,
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidFormat {
            line,
            token: token.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// The 1-based line number for format errors, if this is one.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidFormat { line, .. } => Some(*line),
            _ => None,
        }
    }
}
