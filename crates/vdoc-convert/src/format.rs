//! Stream format detection.
//!
//! Both formats are self-identifying: the binary stream opens with the
//! magic `VDRW`, the text stream with a `%VDRW` header line. Detection
//! needs only the first few bytes and never consumes the stream.

use std::fmt;

use serde::Serialize;

/// On-disk rendition of a drawing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Binary,
    Text,
}

impl Format {
    /// Keyword used by the CLI and reports.
    #[must_use]
    pub const fn as_keyword(self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_keyword())
    }
}

/// Number of prefix bytes [`detect_format`] needs to decide.
pub const DETECT_PREFIX_LEN: usize = 5;

/// Identify the stream format from its first bytes.
///
/// Returns `None` when the prefix matches neither magic; a prefix shorter
/// than [`DETECT_PREFIX_LEN`] may still match the binary magic.
#[must_use]
pub fn detect_format(prefix: &[u8]) -> Option<Format> {
    // The text magic starts with '%', so the order of the checks does not
    // matter; text is tested first because its magic is longer.
    if prefix.starts_with(b"%VDRW") {
        Some(Format::Text)
    } else if prefix.starts_with(b"VDRW") {
        Some(Format::Binary)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_binary_magic() {
        assert_eq!(detect_format(b"VDRW\x01\x05\x00\x00"), Some(Format::Binary));
    }

    #[test]
    fn test_detects_text_header() {
        assert_eq!(detect_format(b"%VDRW 1.5 none\n"), Some(Format::Text));
    }

    #[test]
    fn test_rejects_foreign_content() {
        assert_eq!(detect_format(b"%PDF-1.7"), None);
        assert_eq!(detect_format(b"VDR"), None);
        assert_eq!(detect_format(b""), None);
    }
}
