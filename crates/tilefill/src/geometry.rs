//! Core geometry types for tilefill.
//!
//! Everything here works in planar coordinates. Geographic input is
//! projected before it reaches these types (see [`crate::projection`]).
//!
//! ## Rust Lesson #3: Structs & Derives
//!
//! The `#[derive(...)]` macro auto-generates common functionality:
//! - `Debug` = lets you print with `{:?}`
//! - `Clone` = can duplicate the value
//! - `Copy` = can copy implicitly (small stack values only)
//! - `PartialEq` = can compare with `==`
//! - `Serialize`/`Deserialize` = serde can turn it into JSON and back

use serde::{Deserialize, Serialize};

/// Below this absolute area a ring is treated as having no interior.
pub const AREA_EPSILON: f64 = 1e-12;

/// A 2D point with x,y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A simple polygon stored as an implicitly closed vertex ring.
///
/// The first vertex is NOT repeated at the end. Use [`Polygon::from_ring`]
/// when the source data carries an explicit closing vertex, and
/// [`Polygon::closed_ring`] when a consumer wants one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    /// Boundary vertices in order.
    pub outer: Vec<Point>,
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl Point {
    /// Create a new point.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point at `radius` from `center` in direction `angle_rad`.
    #[inline]
    pub fn polar(center: Point, radius: f64, angle_rad: f64) -> Self {
        Self {
            x: center.x + radius * angle_rad.cos(),
            y: center.y + radius * angle_rad.sin(),
        }
    }

    /// Distance to another point.
    ///
    /// `&self` = borrow self (read-only access).
    /// `other: Point` = taken by value, which is free because Point is `Copy`.
    #[inline]
    pub fn distance(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between this point and another.
    #[inline]
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Polygon {
    /// Create a polygon from an implicitly closed ring.
    pub fn new(outer: Vec<Point>) -> Self {
        Self { outer }
    }

    /// Create a polygon from a ring that may repeat its first vertex at the end.
    pub fn from_ring(mut ring: Vec<Point>) -> Self {
        if ring.len() >= 2 && ring.first() == ring.last() {
            ring.pop();
        }
        Self { outer: ring }
    }

    /// Copy of the ring with runs of repeated vertices collapsed and any
    /// closing copies of the first vertex removed.
    pub fn normalized(&self) -> Polygon {
        let mut ring = self.outer.clone();
        ring.dedup();
        while ring.len() >= 2 && ring.first() == ring.last() {
            ring.pop();
        }
        Polygon { outer: ring }
    }

    /// Number of distinct vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.outer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.outer.is_empty()
    }

    /// Iterate over the edges as `(start, end)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.outer.len();
        (0..n).map(move |i| (self.outer[i], self.outer[(i + 1) % n]))
    }

    /// The vertex ring with the first vertex repeated at the end.
    pub fn closed_ring(&self) -> Vec<Point> {
        let mut ring = self.outer.clone();
        if let Some(first) = self.outer.first() {
            ring.push(*first);
        }
        ring
    }

    /// Get the bounding box as (min_x, min_y, max_x, max_y).
    ///
    /// ## Rust Lesson #6: Option<T>
    ///
    /// Rust has no `null`. An empty polygon has no bounding box, so we
    /// return `None` and the compiler makes every caller deal with it.
    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        if self.outer.is_empty() {
            return None;
        }

        let min_x = self.outer.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = self.outer.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = self.outer.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = self.outer.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        Some((min_x, min_y, max_x, max_y))
    }

    /// Calculate signed area using the shoelace formula.
    ///
    /// Positive for counter-clockwise winding, negative for clockwise.
    #[inline]
    pub fn signed_area(&self) -> f64 {
        signed_area_of_points(&self.outer)
    }

    /// Unsigned area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// True when the ring encloses no area (point, segment, collinear ring).
    pub fn is_degenerate(&self) -> bool {
        self.outer.len() < 3 || self.area() < AREA_EPSILON
    }

    /// Area centroid of the ring.
    ///
    /// Falls back to the vertex average for zero-area rings.
    pub fn centroid(&self) -> Option<Point> {
        let n = self.outer.len();
        if n == 0 {
            return None;
        }

        let area = self.signed_area();
        if area.abs() < AREA_EPSILON {
            let sum_x: f64 = self.outer.iter().map(|p| p.x).sum();
            let sum_y: f64 = self.outer.iter().map(|p| p.y).sum();
            return Some(Point::new(sum_x / n as f64, sum_y / n as f64));
        }

        // Shift to the first vertex so large projected coordinates
        // don't swamp the cross products.
        let origin = self.outer[0];
        let mut cx = 0.0;
        let mut cy = 0.0;
        for (a, b) in self.edges() {
            let (ax, ay) = (a.x - origin.x, a.y - origin.y);
            let (bx, by) = (b.x - origin.x, b.y - origin.y);
            let cross = ax * by - bx * ay;
            cx += (ax + bx) * cross;
            cy += (ay + by) * cross;
        }
        let factor = 1.0 / (6.0 * area);
        Some(Point::new(origin.x + cx * factor, origin.y + cy * factor))
    }
}

/// Calculate signed area of a point sequence using the shoelace formula.
///
/// Coordinates are taken relative to the first point, so rings far from the
/// origin keep their precision.
pub fn signed_area_of_points(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let origin = points[0];
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let (ax, ay) = (points[i].x - origin.x, points[i].y - origin.y);
        let (bx, by) = (points[j].x - origin.x, points[j].y - origin.y);
        area += ax * by - bx * ay;
    }
    area / 2.0
}

// ============================================================================
// TESTS
// ============================================================================
