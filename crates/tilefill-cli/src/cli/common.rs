//! Boundary loading shared across CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use tilefill::output::{points_to_coordinates, ring_coordinates};
use tilefill::{GaussKruger, Point, Polygon, Projection, extract_boundary_from_svg};

use super::BoundaryArgs;

/// JSON boundary layouts accepted on input.
#[derive(Deserialize)]
#[serde(untagged)]
enum BoundaryFile {
    Ring(Vec<[f64; 2]>),
    Object { coordinates: Vec<[f64; 2]> },
}

/// A boundary ready to fill, plus what is needed to write results back.
#[derive(Debug)]
pub struct LoadedBoundary {
    /// Coordinates exactly as read.
    pub source: Vec<[f64; 2]>,
    /// Boundary in the fill's planar frame.
    pub planar: Polygon,
    /// Set when `source` is lon/lat.
    pub projection: Option<GaussKruger>,
}

impl LoadedBoundary {
    /// Map a point given in input coordinates into the planar frame.
    pub fn to_plane(&self, point: Point) -> Result<Point> {
        match &self.projection {
            Some(proj) => Ok(proj.to_plane([point.x, point.y])?),
            None => Ok(point),
        }
    }

    /// Closed rings of each piece in input coordinates.
    pub fn output_rings<'a>(&self, pieces: impl IntoIterator<Item = &'a Polygon>) -> Result<Vec<Vec<[f64; 2]>>> {
        pieces
            .into_iter()
            .map(|piece| match &self.projection {
                Some(proj) => Ok(proj.unproject_all(&piece.closed_ring())?),
                None => Ok(ring_coordinates(piece)),
            })
            .collect()
    }
}

/// Read a boundary from JSON or SVG.
///
/// SVG input is always planar. JSON input is projected unless `--planar`.
pub fn load_boundary(args: &BoundaryArgs) -> Result<LoadedBoundary> {
    let path = args.boundary.as_path();
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    if is_svg(path) {
        let planar = extract_boundary_from_svg(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(vertices = planar.len(), "loaded svg boundary");
        return Ok(LoadedBoundary { source: points_to_coordinates(&planar.outer), planar, projection: None });
    }

    let source = match serde_json::from_str::<BoundaryFile>(&content)
        .with_context(|| format!("{} is not a JSON coordinate list", path.display()))?
    {
        BoundaryFile::Ring(coords) | BoundaryFile::Object { coordinates: coords } => coords,
    };
    if source.len() < 3 {
        bail!("Boundary needs at least 3 vertices, got {}", source.len());
    }

    let (planar, projection) = if args.planar {
        let points = source.iter().map(|&[x, y]| Point::new(x, y)).collect();
        (Polygon::from_ring(points), None)
    } else {
        let proj = GaussKruger::from_epsg(args.epsg)?;
        (Polygon::from_ring(proj.project_all(&source)?), Some(proj))
    };
    debug!(vertices = planar.len(), projected = projection.is_some(), "loaded json boundary");

    Ok(LoadedBoundary { source, planar, projection })
}

fn is_svg(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}
