//! Minimal geometry used by the codecs.
//!
//! The object geometry itself is opaque payload as far as the codecs are
//! concerned; the only derived quantity they need is the axis-aligned
//! bounding box, recomputed on demand and never stored on disk.

use serde::Serialize;

/// A point in document storage units (millimetres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in document storage units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The degenerate rectangle at a single point.
    #[must_use]
    pub const fn at_point(p: Point) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    /// The smallest rectangle covering a set of points, or `None` when the
    /// set is empty.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// The smallest rectangle covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        assert_eq!(Rect::from_points(&[]), None);

        let rect = Rect::from_points(&[Point::new(10.0, 20.0)]).unwrap();
        assert_eq!(rect, Rect::new(10.0, 20.0, 0.0, 0.0));

        let rect = Rect::from_points(&[
            Point::new(10.0, 80.0),
            Point::new(110.0, 20.0),
            Point::new(60.0, 50.0),
        ])
        .unwrap();
        assert_eq!(rect, Rect::new(10.0, 20.0, 100.0, 60.0));
    }

    #[test]
    fn test_union() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 20.0, 2.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 25.0, 10.0));
        assert_eq!(b.union(&a), a.union(&b));
    }
}
