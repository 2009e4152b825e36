//! Format version identifiers and the version table.
//!
//! Every on-disk revision of the drawing formats is identified by a
//! `major.minor` pair. The table below is the single source of truth for
//! which features a version may carry; both codecs consult it so that they
//! can never diverge on what is valid at a given version.
//!
//! | Feature | Available from |
//! |---------|----------------|
//! | Document description, per-object tags | 1.1 |
//! | Image objects | 1.2 |
//! | Paper-only settings mode | 1.3 |
//! | Extended paper catalogue | 1.4 |
//! | Flow metadata annotations | 1.5 |
//! | 64-bit float coordinates | 2.0 |

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// A drawing format version.
///
/// Versions are totally ordered by `(major, minor)`. Decoders accept any
/// known version; encoders refuse versions outside the known set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

/// All format revisions this implementation understands, oldest first.
pub const KNOWN_VERSIONS: &[Version] = &[
    Version::new(1, 0),
    Version::new(1, 1),
    Version::new(1, 2),
    Version::new(1, 3),
    Version::new(1, 4),
    Version::new(1, 5),
    Version::new(1, 6),
    Version::new(1, 7),
    Version::new(1, 8),
    Version::new(1, 9),
    Version::new(2, 0),
    Version::new(2, 1),
    Version::new(2, 2),
    Version::new(2, 3),
];

impl Version {
    /// The newest format revision this implementation can produce.
    pub const CURRENT: Version = Version::new(2, 3);

    /// Create a version identifier.
    #[must_use]
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Whether this exact version appears in the version table.
    #[must_use]
    pub fn is_known(self) -> bool {
        KNOWN_VERSIONS.contains(&self)
    }

    /// Document descriptions and per-object tags (since 1.1).
    #[must_use]
    pub fn supports_tags(self) -> bool {
        self >= Version::new(1, 1)
    }

    /// Embedded image objects (since 1.2).
    #[must_use]
    pub fn supports_images(self) -> bool {
        self >= Version::new(1, 2)
    }

    /// The paper-only settings mode (since 1.3). Below this, paper-only
    /// must be promoted to a full settings block on write.
    #[must_use]
    pub fn supports_paper_only(self) -> bool {
        self >= Version::new(1, 3)
    }

    /// The extended paper catalogue entries (since 1.4).
    #[must_use]
    pub fn supports_extended_papers(self) -> bool {
        self >= Version::new(1, 4)
    }

    /// Flow metadata annotations (since 1.5).
    #[must_use]
    pub fn supports_flow_metadata(self) -> bool {
        self >= Version::new(1, 5)
    }

    /// 64-bit float coordinates (since 2.0). Earlier revisions store
    /// coordinates as 32-bit signed integers.
    #[must_use]
    pub fn supports_float_coords(self) -> bool {
        self >= Version::new(2, 0)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version string: {text:?} (expected \"major.minor\")")]
pub struct ParseVersionError {
    pub text: String,
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseVersionError {
            text: s.to_string(),
        };
        let (major, minor) = s.split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u8>().map_err(|_| invalid())?;
        let minor = minor.parse::<u8>().map_err(|_| invalid())?;
        Ok(Version::new(major, minor))
    }
}
