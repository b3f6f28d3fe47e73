//! # tilefill
//!
//! Fill a polygonal boundary with a lattice of congruent regular polygons
//! (triangles, squares or hexagons), clipping the tiles that straddle the
//! boundary.
//!
//! ```no_run
//! use tilefill::{BoundaryFiller, Point, Polygon, TilingParams};
//!
//! let boundary = Polygon::new(vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(10.0, 0.0),
//!     Point::new(10.0, 10.0),
//!     Point::new(0.0, 10.0),
//! ]);
//! let params = TilingParams::new(2.0, 6, 0.0)?;
//! let result = BoundaryFiller::from_centroid(boundary).with_params(params).fill()?;
//! println!("{} pieces", result.len());
//! # Ok::<(), tilefill::FillError>(())
//! ```
//!
//! ## Rust Lesson #7: Modules
//!
//! Every module is declared explicitly with `mod`; `pub use` re-exports
//! the types most callers need so they can write `tilefill::Polygon`
//! instead of `tilefill::geometry::Polygon`.

pub mod clip;
pub mod error;
pub mod fill;
pub mod geometry;
pub mod lattice;
pub mod output;
pub mod projection;
pub mod svg;

pub use clip::{GeoEngine, GeometryEngine};
pub use error::{FillError, GeometryError};
pub use fill::{BoundaryFiller, FillResult, FillStats, Piece, fill_boundary};
pub use geometry::{Point, Polygon};
pub use lattice::{Cell, SideCount, Tile, TileGenerator, TileId, TilingParams};
pub use output::{OutputError, WebNames, write_web_data};
pub use projection::{GaussKruger, LonLat, Projection, ProjectionError};
pub use svg::{SvgError, extract_boundary_from_svg, extract_polygons_from_svg, pieces_to_svg};
