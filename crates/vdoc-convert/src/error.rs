//! Error type for the conversion facade.

use thiserror::Error;
use vdoc_binary::BinaryError;
use vdoc_text::TextError;

/// Errors that can occur during a conversion.
///
/// Codec errors are wrapped, not flattened, so callers keep the byte offset
/// or line number the codec attached.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input carries neither of the self-identifying magics.
    #[error("unrecognized input: not a drawing document stream")]
    UnknownFormat,

    /// Binary codec failure.
    #[error(transparent)]
    Binary(#[from] BinaryError),

    /// Text codec failure.
    #[error(transparent)]
    Text(#[from] TextError),

    /// Failure on the facade's own reads and writes.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for facade operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
