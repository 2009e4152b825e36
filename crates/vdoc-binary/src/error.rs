//! Error types for the binary codec.

use std::path::PathBuf;

use thiserror::Error;
use vdoc_model::Version;

/// Errors that can occur while reading or writing the binary format.
#[derive(Debug, Error)]
pub enum BinaryError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Malformed or unrecognized bytes. Carries the byte offset at which
    /// decoding failed and, when the failure originated lower down, the
    /// original cause.
    #[error("invalid drawing stream at byte {offset}: {message}")]
    InvalidFormat {
        offset: usize,
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The caller requested encoding at a version this implementation does
    /// not know how to produce.
    #[error("unsupported target version {requested} (maximum {maximum})")]
    UnsupportedVersion { requested: Version, maximum: Version },

    /// The document carries data the target version cannot represent.
    /// Encoding refuses rather than silently dropping it.
    #[error("{feature} not representable at version {version}")]
    UnsupportedFeature {
        feature: &'static str,
        version: Version,
    },

    /// A named paper that is not in the catalogue at the target version.
    #[error("unknown paper name {name:?} at version {version}")]
    UnknownPaper { name: String, version: Version },

    /// A coordinate that does not fit the 32-bit integer encoding used
    /// below version 2.0.
    #[error("coordinate {value} out of range for 32-bit encoding")]
    CoordinateRange { value: f64 },

    /// Underlying stream failure, always wrapped.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for binary codec operations.
pub type Result<T> = std::result::Result<T, BinaryError>;

impl BinaryError {
    /// Create an `InvalidFormat` error at a byte offset.
    pub fn invalid_format(offset: usize, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            offset,
            message: message.into(),
            cause: None,
        }
    }

    /// Create an `InvalidFormat` error wrapping a lower-level cause.
    pub fn invalid_format_caused_by(
        offset: usize,
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidFormat {
            offset,
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// The byte offset for format errors, if this is one.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::InvalidFormat { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BinaryError::invalid_format(128, "unknown record tag 0x7e");
        assert_eq!(
            format!("{err}"),
            "invalid drawing stream at byte 128: unknown record tag 0x7e"
        );
        assert_eq!(err.offset(), Some(128));
    }

    #[test]
    fn test_cause_is_preserved() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err = BinaryError::invalid_format_caused_by(12, "truncated record", io_err);
        let source = std::error::Error::source(&err).expect("cause");
        assert!(source.to_string().contains("short read"));
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = BinaryError::UnsupportedVersion {
            requested: Version::new(3, 0),
            maximum: Version::CURRENT,
        };
        assert!(format!("{err}").contains("3.0"));
    }
}
