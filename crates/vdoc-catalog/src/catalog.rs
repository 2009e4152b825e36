//! The predefined paper catalogue.
//!
//! Four sizes have been valid since the first format revision; the rest
//! arrived with the extended catalogue in 1.4. Dimensions are millimetres,
//! portrait orientation except ledger.

use serde::Serialize;
use vdoc_model::Version;

/// One predefined paper size with the version it became available at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaperEntry {
    pub name: &'static str,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "since")]
    pub min_version: Version,
}

const fn base(name: &'static str, width: f64, height: f64) -> PaperEntry {
    PaperEntry {
        name,
        width,
        height,
        min_version: Version::new(1, 0),
    }
}

const fn extended(name: &'static str, width: f64, height: f64) -> PaperEntry {
    PaperEntry {
        name,
        width,
        height,
        min_version: Version::new(1, 4),
    }
}

/// The full catalogue, in canonical order. Tie-breaking during inference
/// falls back to this order, so it must stay stable.
pub const CATALOGUE: &[PaperEntry] = &[
    base("a4", 210.0, 297.0),
    base("a3", 297.0, 420.0),
    base("letter", 216.0, 279.0),
    base("legal", 216.0, 356.0),
    extended("a0", 841.0, 1189.0),
    extended("a1", 594.0, 841.0),
    extended("a2", 420.0, 594.0),
    extended("a5", 148.0, 210.0),
    extended("b4", 250.0, 353.0),
    extended("b5", 176.0, 250.0),
    extended("tabloid", 279.0, 432.0),
    extended("ledger", 432.0, 279.0),
];

/// Entries valid at the given format version, in canonical order.
pub fn entries_at(version: Version) -> impl Iterator<Item = &'static PaperEntry> {
    CATALOGUE
        .iter()
        .filter(move |entry| entry.min_version <= version)
}

/// Look up a named paper, case-insensitively, at the given version.
///
/// Returns `None` when the name is unknown or not yet available at that
/// version; both codecs treat that as an invalid stream.
#[must_use]
pub fn lookup(name: &str, version: Version) -> Option<&'static PaperEntry> {
    entries_at(version).find(|entry| entry.name.eq_ignore_ascii_case(name))
}
