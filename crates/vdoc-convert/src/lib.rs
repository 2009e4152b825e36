//! Conversion facade over the drawing document codecs.
//!
//! Ties the binary and text codecs together behind one pipeline: detect
//! the source format, decode, resolve the settings-inclusion policy for
//! the destination, infer a paper descriptor when the destination needs
//! one the source never had, and encode.
//!
//! # Example
//!
//! ```
//! use vdoc_convert::{ConversionRequest, Converter, Format};
//!
//! let input = b"%VDRW 1.5 none\ngroup\nend\n%end\n";
//! let mut output = Vec::new();
//!
//! let request = ConversionRequest::new(Format::Binary);
//! let report = Converter::new(request)
//!     .convert(input.as_slice(), &mut output)
//!     .unwrap();
//! assert_eq!(report.source_format, Format::Text);
//! assert!(output.starts_with(b"VDRW"));
//! ```

mod convert;
mod error;
mod format;

pub use convert::{ConversionReport, ConversionRequest, Converter, Diagnostic};
pub use error::{ConvertError, Result};
pub use format::{DETECT_PREFIX_LEN, Format, detect_format};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
