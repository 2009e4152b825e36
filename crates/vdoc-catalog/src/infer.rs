//! Paper-size inference.
//!
//! Synthesizes a paper descriptor from a document bounding box when the
//! source stream carried no settings but the destination requires them.
//! Pure: identical inputs always produce the identical descriptor.

use serde::Serialize;
use vdoc_model::{PaperDescriptor, Rect, Version};

use crate::catalog::{PaperEntry, entries_at};

/// How a predefined paper is matched against the document dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InferenceMode {
    /// Smallest Euclidean distance between (width, height) pairs; ties go
    /// to the smaller paper area, then catalogue order.
    #[default]
    ClosestFit,
    /// Smallest paper fully containing the bounding box. Used by import
    /// paths where content must not be clipped.
    ClosestEnclosing,
}

/// Infer a paper descriptor for the given bounding box at a target version.
///
/// When no catalogue entry satisfies the mode's criterion (the document is
/// larger than every entry, or the catalogue is empty for that version), a
/// custom descriptor matching the bounding box is returned. This never
/// fails.
#[must_use]
pub fn infer_paper(bbox: &Rect, version: Version, mode: InferenceMode) -> PaperDescriptor {
    let best = match mode {
        InferenceMode::ClosestFit => closest_fit(bbox, version),
        InferenceMode::ClosestEnclosing => closest_enclosing(bbox, version),
    };
    match best {
        Some(entry) => PaperDescriptor::named(entry.name),
        None => PaperDescriptor::custom(bbox.width, bbox.height),
    }
}

fn closest_fit(bbox: &Rect, version: Version) -> Option<&'static PaperEntry> {
    // A document that exceeds every entry in both dimensions gets a custom
    // size; naming the nearest catalogue entry would misstate the canvas.
    if entries_at(version).all(|entry| bbox.width > entry.width && bbox.height > entry.height) {
        return None;
    }

    let mut best: Option<(&PaperEntry, f64)> = None;
    for entry in entries_at(version) {
        let dw = entry.width - bbox.width;
        let dh = entry.height - bbox.height;
        let distance = dw * dw + dh * dh;
        let better = match best {
            None => true,
            Some((current, current_distance)) => {
                distance < current_distance
                    || (distance == current_distance && area(entry) < area(current))
            }
        };
        if better {
            best = Some((entry, distance));
        }
    }
    best.map(|(entry, _)| entry)
}

fn closest_enclosing(bbox: &Rect, version: Version) -> Option<&'static PaperEntry> {
    entries_at(version)
        .filter(|entry| entry.width >= bbox.width && entry.height >= bbox.height)
        .fold(None, |best: Option<&'static PaperEntry>, entry| match best {
            Some(current) if area(current) <= area(entry) => Some(current),
            _ => Some(entry),
        })
}

fn area(entry: &PaperEntry) -> f64 {
    entry.width * entry.height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(width: f64, height: f64) -> Rect {
        Rect::new(0.0, 0.0, width, height)
    }

    #[test]
    fn test_exact_match_picks_named_entry() {
        let paper = infer_paper(&bbox(210.0, 297.0), Version::new(1, 3), InferenceMode::ClosestFit);
        assert_eq!(paper, PaperDescriptor::named("a4"));
    }

    #[test]
    fn test_inference_is_deterministic() {
        let b = bbox(200.0, 290.0);
        let first = infer_paper(&b, Version::CURRENT, InferenceMode::ClosestFit);
        let second = infer_paper(&b, Version::CURRENT, InferenceMode::ClosestFit);
        assert_eq!(first, second);
    }

    #[test]
    fn test_oversized_document_gets_custom_paper() {
        let b = bbox(2000.0, 3000.0);
        for mode in [InferenceMode::ClosestFit, InferenceMode::ClosestEnclosing] {
            assert_eq!(
                infer_paper(&b, Version::CURRENT, mode),
                PaperDescriptor::custom(2000.0, 3000.0)
            );
        }
    }

    #[test]
    fn test_wide_but_short_document_still_matches_a_name() {
        // Wider than every entry but not taller, so a named entry is still
        // the closest fit rather than the custom fallback.
        let paper = infer_paper(
            &bbox(2000.0, 250.0),
            Version::CURRENT,
            InferenceMode::ClosestFit,
        );
        assert!(matches!(paper, PaperDescriptor::Named(_)));
    }

    #[test]
    fn test_enclosing_picks_smallest_containing() {
        // 200x250 fits a4 (210x297) but not a5 (148x210) or b5 (176x250).
        let paper = infer_paper(
            &bbox(200.0, 250.0),
            Version::CURRENT,
            InferenceMode::ClosestEnclosing,
        );
        assert_eq!(paper, PaperDescriptor::named("a4"));
    }

    #[test]
    fn test_enclosing_ignores_entries_after_version_gate() {
        // At 1.0 the smallest enclosing entry for a tiny box is a4, because
        // a5 only exists from 1.4.
        let paper = infer_paper(
            &bbox(100.0, 100.0),
            Version::new(1, 0),
            InferenceMode::ClosestEnclosing,
        );
        assert_eq!(paper, PaperDescriptor::named("a4"));

        let paper = infer_paper(
            &bbox(100.0, 100.0),
            Version::new(1, 4),
            InferenceMode::ClosestEnclosing,
        );
        assert_eq!(paper, PaperDescriptor::named("a5"));
    }

    #[test]
    fn test_zero_bbox_selects_smallest_paper() {
        let paper = infer_paper(
            &bbox(0.0, 0.0),
            Version::CURRENT,
            InferenceMode::ClosestEnclosing,
        );
        assert_eq!(paper, PaperDescriptor::named("a5"));
    }
}
