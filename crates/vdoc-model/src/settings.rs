//! Canvas settings, paper descriptors and the settings-inclusion modes.

use serde::Serialize;

/// How much global canvas state is embedded in an encoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingsMode {
    /// No global settings written or expected.
    #[default]
    None,
    /// Full settings block (paper descriptor plus opaque entries).
    All,
    /// Only the paper descriptor. Representable from format version 1.3.
    PaperOnly,
}

impl SettingsMode {
    /// Wire tag shared by the binary header and version table.
    #[must_use]
    pub const fn wire_tag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::All => 1,
            Self::PaperOnly => 2,
        }
    }

    /// Inverse of [`wire_tag`](Self::wire_tag).
    #[must_use]
    pub const fn from_wire_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::None),
            1 => Some(Self::All),
            2 => Some(Self::PaperOnly),
            _ => None,
        }
    }

    /// Keyword used by the text format and the CLI.
    #[must_use]
    pub const fn as_keyword(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::All => "all",
            Self::PaperOnly => "paper-only",
        }
    }

    /// Inverse of [`as_keyword`](Self::as_keyword).
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "none" => Some(Self::None),
            "all" => Some(Self::All),
            "paper-only" => Some(Self::PaperOnly),
            _ => None,
        }
    }
}

impl std::fmt::Display for SettingsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_keyword())
    }
}

/// Canvas paper metadata: either a predefined named size or an explicit
/// width/height pair in storage units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaperDescriptor {
    /// Reference to a predefined paper size, e.g. `"a4"`.
    Named(String),
    /// Explicit custom paper size in millimetres.
    Custom { width: f64, height: f64 },
}

impl PaperDescriptor {
    /// Create a named descriptor, normalised to lowercase.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into().to_lowercase())
    }

    /// Create a custom descriptor.
    #[must_use]
    pub const fn custom(width: f64, height: f64) -> Self {
        Self::Custom { width, height }
    }
}

/// One opaque global setting, preserved byte-for-byte across round-trips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingsEntry {
    pub key: String,
    #[serde(skip)]
    pub value: Vec<u8>,
}

impl SettingsEntry {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Global canvas state attached to a document root.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CanvasSettings {
    /// Paper descriptor, absent until read or synthesized by inference.
    pub paper: Option<PaperDescriptor>,
    /// Remaining opaque settings blobs, in document order.
    pub extras: Vec<SettingsEntry>,
}

impl CanvasSettings {
    /// Settings consisting of just a paper descriptor.
    #[must_use]
    pub fn with_paper(paper: PaperDescriptor) -> Self {
        Self {
            paper: Some(paper),
            extras: Vec::new(),
        }
    }
}
