//! Boundary filler: breadth-first expansion over the tile lattice.
//!
//! Starting from the tile centered on the anchor point, the filler pops
//! tiles off a FIFO frontier, clips each against the boundary, collects
//! the non-empty pieces, and enqueues the neighbors that still touch the
//! boundary's interior. A tile is marked visited the moment it is first
//! probed, whether it is enqueued or rejected, so each lattice cell is
//! clipped at most once and rejected cells are never probed again.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::clip::{GeoEngine, GeometryEngine};
use crate::error::{FillError, Result};
use crate::geometry::{Point, Polygon};
use crate::lattice::{Tile, TileGenerator, TileId, TilingParams};

/// One clipped piece of a tile.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    /// Lattice cell the piece was cut from.
    pub tile: TileId,
    pub polygon: Polygon,
}

/// Counters describing one fill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FillStats {
    /// Distinct lattice cells probed (enqueued or rejected).
    pub visited: usize,
    /// Tiles whose clip was non-empty.
    pub clipped_tiles: usize,
    /// Pieces collected; more than `clipped_tiles` when a concave boundary splits a tile.
    pub pieces: usize,
    /// Neighbors probed and found outside the boundary.
    pub rejected: usize,
}

/// Result of a fill: pieces in BFS visitation order plus counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillResult {
    pub pieces: Vec<Piece>,
    pub stats: FillStats,
}

impl FillResult {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.pieces.iter().map(|p| &p.polygon)
    }

    pub fn into_polygons(self) -> Vec<Polygon> {
        self.pieces.into_iter().map(|p| p.polygon).collect()
    }

    /// Sum of piece areas.
    pub fn total_area(&self) -> f64 {
        self.polygons().map(Polygon::area).sum()
    }
}

/// Fills one boundary polygon with clipped lattice tiles.
///
/// Configuration is immutable once built: attach parameters with
/// [`with_params`](Self::with_params), then call [`fill`](Self::fill) as
/// often as needed. Each call owns its own frontier and visited set.
#[derive(Debug, Clone)]
pub struct BoundaryFiller<E = GeoEngine> {
    boundary: Polygon,
    anchor: Point,
    params: Option<TilingParams>,
    engine: E,
}

impl BoundaryFiller<GeoEngine> {
    /// Fill `boundary` starting from the tile centered at `anchor`.
    pub fn new(boundary: Polygon, anchor: Point) -> Self {
        Self { boundary, anchor, params: None, engine: GeoEngine }
    }

    /// Fill `boundary` starting from its centroid.
    pub fn from_centroid(boundary: Polygon) -> Self {
        let anchor = boundary.centroid().unwrap_or(Point::new(0.0, 0.0));
        Self::new(boundary, anchor)
    }
}

impl<E: GeometryEngine> BoundaryFiller<E> {
    /// Swap in a different geometry engine.
    pub fn with_engine<F: GeometryEngine>(self, engine: F) -> BoundaryFiller<F> {
        BoundaryFiller {
            boundary: self.boundary,
            anchor: self.anchor,
            params: self.params,
            engine,
        }
    }

    pub fn with_params(mut self, params: TilingParams) -> Self {
        self.params = Some(params);
        self
    }

    #[inline]
    pub fn params(&self) -> Option<&TilingParams> {
        self.params.as_ref()
    }

    #[inline]
    pub fn boundary(&self) -> &Polygon {
        &self.boundary
    }

    #[inline]
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Run the fill to completion.
    pub fn fill(&self) -> Result<FillResult> {
        self.run(|| false)
    }

    /// Run the fill, giving up with [`FillError::Cancelled`] once `cancel` is set.
    ///
    /// The flag is checked between queue pops; a tile that is being
    /// clipped always finishes.
    pub fn fill_with_cancel(&self, cancel: &AtomicBool) -> Result<FillResult> {
        self.run(|| cancel.load(Ordering::Relaxed))
    }

    fn run(&self, should_stop: impl Fn() -> bool) -> Result<FillResult> {
        let params = self.params.ok_or(FillError::NotConfigured)?;
        let started = Instant::now();

        debug!(
            k = params.k(),
            radius = params.radius(),
            theta = params.theta(),
            anchor_x = self.anchor.x,
            anchor_y = self.anchor.y,
            boundary_vertices = self.boundary.len(),
            "starting fill"
        );

        if self.boundary.is_degenerate() {
            debug!("boundary has no area, nothing to fill");
            return Ok(FillResult::default());
        }

        let prepared = self.engine.prepare(&self.boundary)?;
        let tile_gen = TileGenerator::new(params);

        let start = tile_gen.tile_at(self.anchor);
        let start_clip = self.engine.intersection(&prepared, start.polygon())?;

        let mut visited: HashSet<TileId> = HashSet::new();
        visited.insert(start.id());

        // Each queued tile carries the clip computed when it was probed.
        let mut frontier: VecDeque<(Tile, Vec<Polygon>)> = VecDeque::new();
        frontier.push_back((start, start_clip));

        let mut pieces = Vec::new();
        let mut stats = FillStats::default();

        loop {
            if should_stop() {
                return Err(FillError::Cancelled { visited: visited.len() });
            }
            let Some((tile, clip)) = frontier.pop_front() else {
                break;
            };

            let id = tile.id();
            trace!(tile = %id, pieces = clip.len(), "visit");
            if !clip.is_empty() {
                stats.clipped_tiles += 1;
                pieces.extend(clip.into_iter().map(|polygon| Piece { tile: id, polygon }));
            }

            for neighbor in tile_gen.neighbors_of(&tile) {
                // insert() returns false for cells already probed.
                if !visited.insert(neighbor.id()) {
                    continue;
                }
                let neighbor_clip = self.engine.intersection(&prepared, neighbor.polygon())?;
                if neighbor_clip.is_empty() {
                    stats.rejected += 1;
                    continue;
                }
                frontier.push_back((neighbor, neighbor_clip));
            }
        }

        stats.visited = visited.len();
        stats.pieces = pieces.len();

        info!(
            visited = stats.visited,
            clipped_tiles = stats.clipped_tiles,
            pieces = stats.pieces,
            rejected = stats.rejected,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "fill complete"
        );

        Ok(FillResult { pieces, stats })
    }
}

/// Fill `boundary` from `anchor` with the default geometry engine.
pub fn fill_boundary(boundary: &Polygon, anchor: Point, params: TilingParams) -> Result<FillResult> {
    BoundaryFiller::new(boundary.clone(), anchor).with_params(params).fill()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::PreparedBoundary;
    use crate::error::GeometryError;
    use std::cell::Cell;

    fn square() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ])
    }

    /// U shape opening upward.
    fn u_shape() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(30.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(20.0, 30.0),
            Point::new(20.0, 8.0),
            Point::new(10.0, 8.0),
            Point::new(10.0, 30.0),
            Point::new(0.0, 30.0),
        ])
    }

    /// A concave, irregular outline in projected-coordinate range.
    fn district() -> Polygon {
        let (ox, oy) = (502_345.0, 3_342_110.0);
        Polygon::new(
            [
                (0.0, 0.0),
                (9_200.0, -1_300.0),
                (12_800.0, 3_900.0),
                (8_100.0, 6_200.0),
                (10_400.0, 11_700.0),
                (3_300.0, 9_800.0),
                (-2_100.0, 12_300.0),
                (-4_400.0, 5_600.0),
            ]
            .iter()
            .map(|(x, y)| Point::new(ox + x, oy + y))
            .collect(),
        )
    }

    fn params(radius: f64, k: u32, theta: f64) -> TilingParams {
        TilingParams::new(radius, k, theta).unwrap()
    }

    fn assert_covers(boundary: &Polygon, result: &FillResult) {
        let rel = (result.total_area() - boundary.area()).abs() / boundary.area();
        assert!(
            rel < 1e-6,
            "pieces cover {} of boundary area {}",
            result.total_area(),
            boundary.area()
        );
    }

    fn assert_contained(boundary: &Polygon, result: &FillResult) {
        let engine = GeoEngine;
        let prepared = engine.prepare(boundary).unwrap();
        for piece in result.polygons() {
            let inside: f64 = engine
                .intersection(&prepared, piece)
                .unwrap()
                .iter()
                .map(Polygon::area)
                .sum();
            assert!((inside - piece.area()).abs() <= 1e-6 * piece.area().max(1.0));
        }
    }

    #[test]
    fn square_boundary_square_tiles() {
        let result = fill_boundary(&square(), Point::new(5.0, 5.0), params(2.0, 4, 0.0)).unwrap();
        assert!(!result.is_empty());
        assert_contained(&square(), &result);

        // The first piece is the start tile: a diamond of side 2·√2 around (5, 5).
        let first = &result.pieces[0].polygon;
        assert_eq!(first.len(), 4);
        let side = first.outer[0].distance(first.outer[1]);
        assert!((side - 2.0 * 2.0_f64.sqrt()).abs() < 1e-9, "side = {side}");
        let c = first.centroid().unwrap();
        assert!(c.distance(Point::new(5.0, 5.0)) < 1e-9);
        assert_eq!(result.pieces[0].tile, TileId::of(Point::new(5.0, 5.0)));
    }

    #[test]
    fn fill_covers_boundary_for_every_side_count() {
        for k in [3, 4, 6] {
            for theta in [0.0, 17.0, 45.0] {
                let result = fill_boundary(&square(), Point::new(5.0, 5.0), params(1.3, k, theta)).unwrap();
                assert_covers(&square(), &result);
                assert_contained(&square(), &result);
            }
        }
    }

    #[test]
    fn concave_boundary_splits_tiles() {
        let boundary = u_shape();
        // The start hexagon sits above the bottom of the U and is wider than
        // the gap, so it is cut into one piece per prong.
        let result = fill_boundary(&boundary, Point::new(15.0, 20.0), params(7.0, 6, 0.0)).unwrap();
        assert_covers(&boundary, &result);
        assert!(result.stats.pieces > result.stats.clipped_tiles);
        assert_eq!(result.pieces[0].tile, result.pieces[1].tile);
    }

    #[test]
    fn projected_scale_district_is_covered() {
        let boundary = district();
        let anchor = boundary.centroid().unwrap();
        for k in [3, 4, 6] {
            let result = fill_boundary(&boundary, anchor, params(1000.0, k, 0.0)).unwrap();
            assert_covers(&boundary, &result);
        }
    }

    #[test]
    fn dense_projected_fill_has_one_id_per_cell() {
        // 8 km square, r = 37: thousands of hexagons far from the origin.
        let (ox, oy) = (512_345.678, 3_342_110.123);
        let side = 8_000.0;
        let boundary = Polygon::new(vec![
            Point::new(ox, oy),
            Point::new(ox + side, oy),
            Point::new(ox + side, oy + side),
            Point::new(ox, oy + side),
        ]);
        let anchor = Point::new(ox + side / 2.0, oy + side / 2.0);
        let result = fill_boundary(&boundary, anchor, params(37.0, 6, 13.0)).unwrap();
        assert!(result.stats.clipped_tiles > 10_000);
        assert_covers(&boundary, &result);

        // Ids one quantum apart would be the same cell reached twice.
        let ids: HashSet<TileId> = result.pieces.iter().map(|p| p.tile).collect();
        assert_eq!(ids.len(), result.stats.clipped_tiles);
        for id in &ids {
            for dx in -1..=1 {
                for dy in -1..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let near = TileId { x: id.x + dx, y: id.y + dy };
                    assert!(!ids.contains(&near), "tile {id} duplicated as {near}");
                }
            }
        }
    }

    #[test]
    fn repeated_and_closing_vertices_are_accepted() {
        let repeated = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        let closed = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(0.0, 0.0),
        ]);
        for boundary in [repeated, closed] {
            let result = fill_boundary(&boundary, Point::new(5.0, 5.0), params(1.3, 6, 0.0)).unwrap();
            assert_covers(&square(), &result);
        }
    }

    #[test]
    fn each_tile_is_clipped_once() {
        let boundary = u_shape();
        let result = fill_boundary(&boundary, Point::new(5.0, 5.0), params(2.5, 6, 0.0)).unwrap();

        // Pieces of one tile are contiguous, and no tile shows up in two runs.
        let mut seen = HashSet::new();
        let mut previous: Option<TileId> = None;
        for piece in &result.pieces {
            if previous != Some(piece.tile) {
                assert!(seen.insert(piece.tile), "tile {} clipped twice", piece.tile);
            }
            previous = Some(piece.tile);
        }
        assert_eq!(seen.len(), result.stats.clipped_tiles);
        assert_eq!(result.stats.pieces, result.len());
    }

    #[test]
    fn fill_is_deterministic() {
        let filler = BoundaryFiller::from_centroid(district()).with_params(params(800.0, 6, 10.0));
        let a = filler.fill().unwrap();
        let b = filler.fill().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_boundaries_give_empty_results() {
        let point = Polygon::new(vec![Point::new(1.0, 1.0)]);
        let line = Polygon::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 10.0)]);
        for boundary in [point, line, Polygon::default()] {
            for k in [3, 4, 6] {
                let result = fill_boundary(&boundary, Point::new(1.0, 1.0), params(1.0, k, 0.0)).unwrap();
                assert!(result.is_empty());
            }
        }
    }

    #[test]
    fn anchor_far_outside_gives_empty_result() {
        let result = fill_boundary(&square(), Point::new(100.0, 100.0), params(1.0, 4, 0.0)).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.stats.visited, 5);
        assert_eq!(result.stats.rejected, 4);
    }

    #[test]
    fn anchor_just_outside_still_reaches_the_boundary() {
        // The start tile misses, but one of its neighbors overlaps the square.
        let result = fill_boundary(&square(), Point::new(11.5, 5.0), params(1.0, 4, 45.0)).unwrap();
        assert_covers(&square(), &result);
    }

    #[test]
    fn fill_without_params_is_not_configured() {
        let filler = BoundaryFiller::new(square(), Point::new(5.0, 5.0));
        assert_eq!(filler.fill(), Err(FillError::NotConfigured));
    }

    #[test]
    fn self_intersecting_boundary_aborts() {
        // Lopsided so the signed area is non-zero.
        let bowtie = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 4.0),
        ]);
        let err = fill_boundary(&bowtie, Point::new(5.0, 5.0), params(1.0, 4, 0.0)).unwrap_err();
        assert!(matches!(err, FillError::Geometry(GeometryError::SelfIntersecting { .. })));
    }

    #[test]
    fn cancelled_fill_stops_before_first_pop() {
        let cancel = AtomicBool::new(true);
        let filler = BoundaryFiller::new(square(), Point::new(5.0, 5.0)).with_params(params(1.0, 6, 0.0));
        assert_eq!(filler.fill_with_cancel(&cancel), Err(FillError::Cancelled { visited: 1 }));

        cancel.store(false, Ordering::Relaxed);
        assert!(filler.fill_with_cancel(&cancel).is_ok());
    }

    /// Delegates to GeoEngine but fails after a fixed number of clips.
    struct FlakyEngine {
        remaining: Cell<usize>,
    }

    impl GeometryEngine for FlakyEngine {
        type Prepared = PreparedBoundary;

        fn prepare(&self, boundary: &Polygon) -> std::result::Result<PreparedBoundary, GeometryError> {
            GeoEngine.prepare(boundary)
        }

        fn intersection(
            &self,
            boundary: &PreparedBoundary,
            tile: &Polygon,
        ) -> std::result::Result<Vec<Polygon>, GeometryError> {
            if self.remaining.get() == 0 {
                return Err(GeometryError::Engine("out of budget".to_string()));
            }
            self.remaining.set(self.remaining.get() - 1);
            GeoEngine.intersection(boundary, tile)
        }
    }

    #[test]
    fn engine_errors_propagate() {
        let filler = BoundaryFiller::new(square(), Point::new(5.0, 5.0))
            .with_params(params(1.0, 4, 0.0))
            .with_engine(FlakyEngine { remaining: Cell::new(3) });
        assert_eq!(
            filler.fill(),
            Err(FillError::Geometry(GeometryError::Engine("out of budget".to_string())))
        );
    }
}
