//! Data model for versioned drawing documents.
//!
//! This crate defines the in-memory document tree shared by the binary and
//! text codecs, the format version table with its feature gates, and the
//! settings-inclusion policy. It carries no I/O of its own.

mod document;
mod geometry;
mod policy;
mod settings;
mod version;

pub use document::{
    Document, FlowKind, FlowMetadata, Group, Object, ObjectAttrs, ObjectCounts,
};
pub use geometry::{Point, Rect};
pub use policy::{Resolution, resolve_settings_mode, unrepresentable_feature};
pub use settings::{CanvasSettings, PaperDescriptor, SettingsEntry, SettingsMode};
pub use version::{KNOWN_VERSIONS, ParseVersionError, Version};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
