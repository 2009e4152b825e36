//! Text drawing document codec.
//!
//! Line-oriented, hand-editable rendition of the same documents the binary
//! codec carries. One record per line, quoted strings with a small escape
//! set, hex payloads for opaque bytes. The version table and settings
//! policy live in `vdoc-model` and are shared with the binary codec.
//!
//! # Example
//!
//! ```
//! use vdoc_text::{EncodeOptions, encode_to_string, parse_str};
//! use vdoc_model::{Document, SettingsMode, Version};
//!
//! let doc = Document::default().with_description("empty canvas");
//! let options = EncodeOptions::new(Version::CURRENT, SettingsMode::None);
//! let text = encode_to_string(&doc, &options).unwrap();
//! assert!(text.starts_with("%VDRW 2.3 none\n"));
//!
//! let decoded = parse_str(&text).unwrap();
//! assert_eq!(decoded.document, doc);
//! ```

mod error;
mod reader;
pub mod token;
mod writer;

pub use error::{Result, TextError};
pub use reader::{Decoded, END_KEYWORD, HEADER_KEYWORD, TextReader, parse_str, read_text};
pub use writer::{EncodeOptions, TextWriter, encode_to_string, write_text};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
