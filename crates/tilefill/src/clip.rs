//! Polygon clipping: the geometry engine behind the boundary filler.
//!
//! The filler only needs three things from geometry: intersect a tile with
//! the boundary (zero, one or many pieces), take a centroid, and ask whether
//! a result is empty. [`GeometryEngine`] is that seam. [`GeoEngine`] is the
//! default implementation, backed by the `geo` crate's boolean operations.
//!
//! This is the HOT PATH - every visited tile and every probed neighbor
//! goes through [`GeometryEngine::intersection`].

use geo::{BooleanOps, Coord, LineString, Polygon as GeoPolygon};

use crate::error::GeometryError;
use crate::geometry::{Point, Polygon};

/// Pieces smaller than this fraction of the tile's area are dropped.
///
/// Boolean ops leave snapping slivers along shared edges; this removes
/// them. It also drops any genuine overlap below the same threshold, so a
/// tile that grazes the boundary by less than `SLIVER_RATIO` of its own
/// area counts as outside.
pub const SLIVER_RATIO: f64 = 1e-7;

// ============================================================================
// SEGMENT CROSSING
// ============================================================================

/// Orientation of `c` relative to the directed line `a -> b`.
#[inline]
fn orient(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// `c` is collinear with `a -> b`; is it within the segment's box?
#[inline]
fn on_segment(a: Point, b: Point, c: Point) -> bool {
    c.x >= a.x.min(b.x) && c.x <= a.x.max(b.x) && c.y >= a.y.min(b.y) && c.y <= a.y.max(b.y)
}

/// True when segments `a1-a2` and `b1-b2` share at least one point,
/// including endpoint touches and collinear overlap.
pub fn segments_touch(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let d1 = orient(b1, b2, a1);
    let d2 = orient(b1, b2, a2);
    let d3 = orient(a1, a2, b1);
    let d4 = orient(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0)) {
        return true;
    }

    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

/// Find the first pair of non-adjacent edges that touch or cross.
///
/// Edge `i` runs from vertex `i` to vertex `i + 1`. O(n²), which is fine
/// because it runs once per fill, not once per tile.
pub fn find_self_intersection(polygon: &Polygon) -> Option<(usize, usize)> {
    let n = polygon.len();
    if n < 4 {
        return None;
    }

    let pts = &polygon.outer;
    for i in 0..n {
        let (a1, a2) = (pts[i], pts[(i + 1) % n]);
        for j in (i + 2)..n {
            // The closing edge is adjacent to edge 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let (b1, b2) = (pts[j], pts[(j + 1) % n]);
            if segments_touch(a1, a2, b1, b2) {
                return Some((i, j));
            }
        }
    }
    None
}

/// Check that every coordinate is finite and no edges cross.
pub fn validate_simple(polygon: &Polygon) -> Result<(), GeometryError> {
    if let Some(index) = polygon.outer.iter().position(|p| !p.is_finite()) {
        return Err(GeometryError::NonFinite { index });
    }
    if let Some((first_edge, second_edge)) = find_self_intersection(polygon) {
        return Err(GeometryError::SelfIntersecting { first_edge, second_edge });
    }
    Ok(())
}

// ============================================================================
// GEOMETRY ENGINE
// ============================================================================

/// Polygon intersection provider used by the boundary filler.
///
/// `prepare` runs once per fill and may validate or pre-convert the
/// boundary; `intersection` runs once per probed tile.
pub trait GeometryEngine {
    type Prepared;

    fn prepare(&self, boundary: &Polygon) -> Result<Self::Prepared, GeometryError>;

    /// Intersect the prepared boundary with a tile.
    ///
    /// An empty vector means the intersection has no area. Every returned
    /// piece is a simple polygon with positive area. Implementations may
    /// drop pieces below a tolerance; [`GeoEngine`] drops pieces smaller
    /// than [`SLIVER_RATIO`] of the tile's area.
    fn intersection(
        &self,
        boundary: &Self::Prepared,
        tile: &Polygon,
    ) -> Result<Vec<Polygon>, GeometryError>;
}

/// [`GeometryEngine`] backed by `geo::BooleanOps`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoEngine;

/// A boundary converted to `geo` types, with its bounding box for fast rejection.
#[derive(Debug, Clone)]
pub struct PreparedBoundary {
    polygon: GeoPolygon<f64>,
    bounds: (f64, f64, f64, f64),
}

impl GeometryEngine for GeoEngine {
    type Prepared = PreparedBoundary;

    /// Repeated vertices and an explicit closing vertex are accepted; the
    /// ring is normalized before it is validated.
    fn prepare(&self, boundary: &Polygon) -> Result<PreparedBoundary, GeometryError> {
        let boundary = boundary.normalized();
        validate_simple(&boundary)?;
        let bounds = boundary
            .bounding_box()
            .ok_or_else(|| GeometryError::Engine("boundary has no vertices".to_string()))?;
        Ok(PreparedBoundary { polygon: to_geo(&boundary), bounds })
    }

    fn intersection(
        &self,
        boundary: &PreparedBoundary,
        tile: &Polygon,
    ) -> Result<Vec<Polygon>, GeometryError> {
        let Some(tile_bounds) = tile.bounding_box() else {
            return Ok(Vec::new());
        };
        if !boxes_overlap(boundary.bounds, tile_bounds) {
            return Ok(Vec::new());
        }

        let clipped = boundary.polygon.intersection(&to_geo(tile));
        let min_area = tile.area() * SLIVER_RATIO;

        // ## Rust Lesson #14: Iterators & Collecting
        //
        // filter_map combines filter + map: return Some(x) to keep, None to skip.
        let pieces = clipped
            .0
            .iter()
            .filter_map(|piece| {
                let ring: Vec<Point> = piece.exterior().coords().map(|c| Point::new(c.x, c.y)).collect();
                let poly = Polygon::from_ring(ring);
                (!poly.is_degenerate() && poly.area() > min_area).then_some(poly)
            })
            .collect();
        Ok(pieces)
    }
}

fn to_geo(polygon: &Polygon) -> GeoPolygon<f64> {
    let coords: Vec<Coord<f64>> = polygon.outer.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    GeoPolygon::new(LineString::from(coords), vec![])
}

/// Strict overlap; boxes that only share an edge cannot have an intersection with area.
fn boxes_overlap(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> bool {
    a.0 < b.2 && b.0 < a.2 && a.1 < b.3 && b.1 < a.3
}

// ============================================================================
// TESTS
// ============================================================================
