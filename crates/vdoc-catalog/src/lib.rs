//! Predefined paper catalogue and paper-size inference.
//!
//! The catalogue is process-wide immutable data; it is queried by the
//! codecs to validate named papers and by the inference engine to
//! synthesize canvas metadata for documents that carry none.

mod catalog;
mod infer;

pub use catalog::{PaperEntry, entries_at, lookup};
pub use infer::{InferenceMode, infer_paper};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
