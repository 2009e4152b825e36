//! Settings policy resolution.
//!
//! The resolver is consulted exactly once per encode operation, before any
//! bytes are written, so the effective mode is stable for the whole stream.

use crate::document::Document;
use crate::settings::SettingsMode;
use crate::version::Version;

/// Outcome of resolving a requested settings mode against a target version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// The mode the encoder will actually use.
    pub effective: SettingsMode,
    /// Whether the requested mode had to be adjusted. Callers surface this
    /// as a warning; the operation itself still succeeds.
    pub downgraded: bool,
}

/// Resolve the effective settings mode for a target version.
///
/// Paper-only settings are representable from 1.3. For older targets the
/// request is promoted to a full settings block, which keeps the paper
/// descriptor on disk instead of silently losing it.
#[must_use]
pub fn resolve_settings_mode(requested: SettingsMode, target: Version) -> Resolution {
    if requested == SettingsMode::PaperOnly && !target.supports_paper_only() {
        return Resolution {
            effective: SettingsMode::All,
            downgraded: true,
        };
    }
    Resolution {
        effective: requested,
        downgraded: false,
    }
}

/// Report the first feature of `document` that `version` cannot carry
/// with the given effective mode, or `None` when everything fits.
///
/// Both codecs consult this before writing so that they agree exactly on
/// what is representable; a hit means the encode must fail rather than
/// drop data.
#[must_use]
pub fn unrepresentable_feature(
    document: &Document,
    version: Version,
    mode: SettingsMode,
) -> Option<&'static str> {
    if mode == SettingsMode::PaperOnly && !version.supports_paper_only() {
        return Some("paper-only settings");
    }
    if document.contains_tags() && !version.supports_tags() {
        return Some("object tags");
    }
    if document.contains_images() && !version.supports_images() {
        return Some("image objects");
    }
    if document.contains_flow_metadata() && !version.supports_flow_metadata() {
        return Some("flow metadata");
    }
    None
}
