//! Tile generator: regular k-gon geometry and lattice adjacency.
//!
//! Every tile the crate ever produces comes out of [`regular_vertices`],
//! so all tiles are congruent and share one orientation rule. Vertex `i`
//! of a tile with rotation `rot` (degrees) sits at angle
//! `2π·(i/k + rot/360)` from the tile center.
//!
//! Only k ∈ {3, 4, 6} tile the plane edge-to-edge. For k = 4 and 6 every
//! lattice cell has the same rotation. For k = 3 the cells alternate
//! between the configured rotation and its 180° flip.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FillError;
use crate::geometry::{Point, Polygon};

/// Tile identities are tile centers quantized to this many units per planar unit
/// (6 decimal digits).
pub const ID_SCALE: f64 = 1e6;

// ============================================================================
// PARAMETERS
// ============================================================================

/// Number of sides of the tiling polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum SideCount {
    Triangle,
    Square,
    Hexagon,
}

impl SideCount {
    pub fn new(k: u32) -> Result<Self, FillError> {
        match k {
            3 => Ok(SideCount::Triangle),
            4 => Ok(SideCount::Square),
            6 => Ok(SideCount::Hexagon),
            other => Err(FillError::invalid(format!(
                "k must be one of 3, 4, 6, got {other}"
            ))),
        }
    }

    #[inline]
    pub fn get(self) -> u32 {
        match self {
            SideCount::Triangle => 3,
            SideCount::Square => 4,
            SideCount::Hexagon => 6,
        }
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self.get() as f64
    }

    /// Odd polygons flip orientation across every edge.
    #[inline]
    fn alternates(self) -> bool {
        self.get() % 2 == 1
    }

    pub fn name(self) -> &'static str {
        match self {
            SideCount::Triangle => "triangle",
            SideCount::Square => "square",
            SideCount::Hexagon => "hexagon",
        }
    }

    /// Parse a shape name or side count ("hexagon", "hex", "6", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "3" | "tri" | "triangle" => Some(SideCount::Triangle),
            "4" | "square" => Some(SideCount::Square),
            "6" | "hex" | "hexagon" => Some(SideCount::Hexagon),
            _ => None,
        }
    }
}

impl TryFrom<u32> for SideCount {
    type Error = FillError;

    fn try_from(k: u32) -> Result<Self, Self::Error> {
        SideCount::new(k)
    }
}

impl From<SideCount> for u32 {
    fn from(sides: SideCount) -> u32 {
        sides.get()
    }
}

impl fmt::Display for SideCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// Validated tiling configuration.
///
/// Construct with [`TilingParams::new`]; fields are private so an invalid
/// value can't be built by hand. Deserialization goes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTilingParams")]
pub struct TilingParams {
    radius: f64,
    sides: SideCount,
    theta: f64,
}

#[derive(Deserialize)]
struct RawTilingParams {
    radius: f64,
    sides: u32,
    #[serde(default)]
    theta: f64,
}

impl TryFrom<RawTilingParams> for TilingParams {
    type Error = FillError;

    fn try_from(raw: RawTilingParams) -> Result<Self, Self::Error> {
        TilingParams::new(raw.radius, raw.sides, raw.theta)
    }
}

impl TilingParams {
    /// Validate and build tiling parameters.
    ///
    /// * `radius` - circumradius of each tile, must be finite and > 0
    /// * `k` - number of sides, one of 3, 4, 6
    /// * `theta` - starting rotation in degrees
    pub fn new(radius: f64, k: u32, theta: f64) -> Result<Self, FillError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(FillError::invalid(format!("radius must be > 0, got {radius}")));
        }
        if !theta.is_finite() {
            return Err(FillError::invalid(format!("theta must be finite, got {theta}")));
        }
        let sides = SideCount::new(k)?;
        Ok(Self { radius, sides, theta })
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn sides(&self) -> SideCount {
        self.sides
    }

    #[inline]
    pub fn k(&self) -> u32 {
        self.sides.get()
    }

    #[inline]
    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// Distance from a tile center to the midpoint of any edge.
    #[inline]
    pub fn inradius(&self) -> f64 {
        self.radius * (PI / self.sides.as_f64()).cos()
    }
}

// ============================================================================
// TILES
// ============================================================================

/// Lattice cell identity: the tile center quantized to [`ID_SCALE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId {
    pub x: i64,
    pub y: i64,
}

impl TileId {
    pub fn of(point: Point) -> Self {
        Self {
            x: (point.x * ID_SCALE).round() as i64,
            y: (point.y * ID_SCALE).round() as i64,
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.x as f64 / ID_SCALE, self.y as f64 / ID_SCALE)
    }
}

/// Integer position of a cell relative to the lattice origin, in units of
/// the two basis steps (neighbor 0 and neighbor 1 of an unflipped tile).
pub type Cell = (i64, i64);

/// One regular polygon placed on the lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    origin: Point,
    cell: Cell,
    center: Point,
    flipped: bool,
    polygon: Polygon,
}

impl Tile {
    /// Tile center, which is also its area centroid.
    #[inline]
    pub fn centroid(&self) -> Point {
        self.center
    }

    #[inline]
    pub fn id(&self) -> TileId {
        TileId::of(self.center)
    }

    /// Lattice coordinates of this tile relative to the tile it was grown from.
    #[inline]
    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// True for the 180°-rotated cells of a triangle lattice.
    #[inline]
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    #[inline]
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Vertex `i`, counted from the rotation offset.
    #[inline]
    pub fn vertex(&self, i: usize) -> Point {
        self.polygon.outer[i % self.polygon.len()]
    }

    pub fn into_polygon(self) -> Polygon {
        self.polygon
    }
}

/// Vertices of a regular `k`-gon.
///
/// Vertex `i` is at angle `2π·(i/k + rotation/360)` from `center`.
pub fn regular_vertices(center: Point, radius: f64, k: u32, rotation_degrees: f64) -> Vec<Point> {
    (0..k)
        .map(|i| Point::polar(center, radius, vertex_angle(i as f64, k as f64, rotation_degrees)))
        .collect()
}

#[inline]
fn vertex_angle(i: f64, k: f64, rotation_degrees: f64) -> f64 {
    2.0 * PI * (i / k + rotation_degrees / 360.0)
}

/// Cell offset of neighbor `j` for each side count, in basis steps.
///
/// Neighbor offsets of an unflipped tile are `o_j`; `o_0` and `o_1` are the
/// basis. Hexagons: `o_2 = o_1 - o_0` and `o_{j+3} = -o_j`. Triangles:
/// `o_2 = -o_0 - o_1`, and a flipped triangle's offsets are negated.
fn cell_steps(sides: SideCount, flipped: bool) -> &'static [Cell] {
    match sides {
        SideCount::Triangle if flipped => &[(-1, 0), (0, -1), (1, 1)],
        SideCount::Triangle => &[(1, 0), (0, 1), (-1, -1)],
        SideCount::Square => &[(1, 0), (0, 1), (-1, 0), (0, -1)],
        SideCount::Hexagon => &[(1, 0), (0, 1), (-1, 1), (-1, 0), (0, -1), (1, -1)],
    }
}

/// Produces tiles and their edge neighbors for one set of [`TilingParams`].
#[derive(Debug, Clone, Copy)]
pub struct TileGenerator {
    params: TilingParams,
    basis: (Point, Point),
}

impl TileGenerator {
    pub fn new(params: TilingParams) -> Self {
        let k = params.k();
        let step = 2.0 * params.inradius();
        let rotation = params.theta + 180.0 / k as f64;
        let basis = (
            Point::polar(Point::new(0.0, 0.0), step, vertex_angle(0.0, k as f64, rotation)),
            Point::polar(Point::new(0.0, 0.0), step, vertex_angle(1.0, k as f64, rotation)),
        );
        Self { params, basis }
    }

    #[inline]
    pub fn params(&self) -> &TilingParams {
        &self.params
    }

    /// The tile with the configured rotation centered at `center`.
    ///
    /// `center` becomes the lattice origin for every tile reached from this
    /// one through [`neighbors_of`](Self::neighbors_of).
    pub fn tile_at(&self, center: Point) -> Tile {
        self.build(center, (0, 0), false)
    }

    /// The tile whose vertex `index` is `vertex`.
    ///
    /// Inverse of the vertex-angle rule: the center is `vertex` stepped back
    /// by `radius` along the direction of vertex `index`.
    pub fn tile_from_vertex(&self, vertex: Point, index: usize) -> Tile {
        let angle = vertex_angle(index as f64, self.params.sides.as_f64(), self.params.theta);
        let center = Point::polar(vertex, -self.params.radius, angle);
        self.tile_at(center)
    }

    /// The k tiles sharing an edge with `tile`.
    ///
    /// Each neighbor is `tile` point-reflected through the midpoint of the
    /// shared edge. Its center lies at twice the inradius from `tile`'s
    /// center, in the direction of that edge's midpoint, i.e. on the
    /// vertices of a k-gon with circumradius `2·r·cos(π/k)` rotated by an
    /// extra `180/k` degrees. Neighbor `j` sits across edge `j`
    /// (vertex `j` to vertex `j + 1`).
    ///
    /// Centers are computed from integer cell coordinates and the lattice
    /// origin, never by adding to `tile`'s center, so every path to a cell
    /// yields the bit-identical center and [`TileId`].
    pub fn neighbors_of(&self, tile: &Tile) -> Vec<Tile> {
        let flipped = tile.flipped ^ self.params.sides.alternates();
        cell_steps(self.params.sides, tile.flipped)
            .iter()
            .map(|(da, db)| self.build(tile.origin, (tile.cell.0 + da, tile.cell.1 + db), flipped))
            .collect()
    }

    #[inline]
    fn rotation(&self, flipped: bool) -> f64 {
        if flipped {
            self.params.theta + 180.0
        } else {
            self.params.theta
        }
    }

    fn cell_center(&self, origin: Point, (a, b): Cell) -> Point {
        let (e0, e1) = self.basis;
        let (a, b) = (a as f64, b as f64);
        Point::new(origin.x + (a * e0.x + b * e1.x), origin.y + (a * e0.y + b * e1.y))
    }

    fn build(&self, origin: Point, cell: Cell, flipped: bool) -> Tile {
        let center = self.cell_center(origin, cell);
        let vertices = regular_vertices(center, self.params.radius, self.params.k(), self.rotation(flipped));
        Tile { origin, cell, center, flipped, polygon: Polygon::new(vertices) }
    }
}

// ============================================================================
// TESTS
// ============================================================================
