//! Geometric primitives for positions in document user space.
//!
//! # Coordinate System
//!
//! Coordinates follow the SVG convention:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Branch endpoints and label anchors are both expressed as [`Point`]s, so the
//! graph inference can compare them directly.

use std::fmt;

/// A 2D point in document user-space units.
///
/// # Examples
///
/// ```
/// # use phylosvg_core::geometry::Point;
/// let start = Point::new(0.0, 0.0);
/// let end = Point::new(3.0, 4.0);
///
/// assert_eq!(start.distance(end), 5.0);
/// assert_eq!(start.add_point(end), end);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Adds another point to this point, returning a new point.
    ///
    /// Used to accumulate relative movement deltas.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_point_accessors() {
        let p = Point::new(1.5, -2.25);
        assert_eq!(p.x(), 1.5);
        assert_eq!(p.y(), -2.25);
    }

    #[test]
    fn test_point_add() {
        let p = Point::new(283.68839, 33.110976).add_point(Point::new(0.0, -11.282258));
        assert!(approx_eq!(f64, p.x(), 283.68839, epsilon = 1e-9));
        assert!(approx_eq!(f64, p.y(), 21.828718, epsilon = 1e-9));
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(1.0, 1.0);
        let b = Point::new(4.0, 5.0);
        assert!(approx_eq!(f64, a.distance(b), 5.0, ulps = 2));
        assert_eq!(a.distance(a), 0.0);
    }

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(2.5, 3.0).to_string(), "2.5,3");
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            ax in -1.0e4f64..1.0e4, ay in -1.0e4f64..1.0e4,
            bx in -1.0e4f64..1.0e4, by in -1.0e4f64..1.0e4,
        ) {
            let a = Point::new(ax, ay);
            let b = Point::new(bx, by);
            prop_assert!(approx_eq!(f64, a.distance(b), b.distance(a), ulps = 4));
            prop_assert!(a.distance(b) >= 0.0);
        }
    }
}
