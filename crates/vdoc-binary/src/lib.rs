//! Binary drawing document codec.
//!
//! Streaming reader and writer for the compact on-disk form of drawing
//! documents. The wire layout is version-gated: what a stream may contain
//! is decided by the version table in `vdoc-model`, shared with the text
//! codec so the two can never diverge on what is valid at a version.
//!
//! # Example
//!
//! ```
//! use vdoc_binary::{EncodeOptions, decode_bytes, encode_to_vec};
//! use vdoc_model::{Document, SettingsMode, Version};
//!
//! let doc = Document::default().with_description("empty canvas");
//! let options = EncodeOptions::new(Version::CURRENT, SettingsMode::None);
//! let bytes = encode_to_vec(&doc, &options).unwrap();
//!
//! let decoded = decode_bytes(&bytes).unwrap();
//! assert_eq!(decoded.document, doc);
//! assert_eq!(decoded.version, Version::CURRENT);
//! ```

mod error;
pub mod record;
mod reader;
mod writer;

pub use error::{BinaryError, Result};
pub use reader::{BinaryReader, Decoded, decode_bytes, read_binary};
pub use writer::{BinaryWriter, EncodeOptions, encode_to_vec, write_binary};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
