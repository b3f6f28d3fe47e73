//! JavaScript data files for the map viewer.
//!
//! Each file holds a single assignment of the form
//! `NAME = [{"coordinates": ...}];` written as UTF-8. The boundary file
//! carries the boundary ring as given; the bricks file carries one closed
//! ring per piece.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::geometry::{Point, Polygon};

pub const BOUNDARIES_FILE: &str = "data_boundaries.js";
pub const BRICKS_FILE: &str = "data_bricks.js";
pub const DEFAULT_BOUNDARY_VAR: &str = "MS.data.blockBoundaries";
pub const DEFAULT_BRICKS_VAR: &str = "MS.data.bricks";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode coordinates: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Payload<'a, T: ?Sized> {
    coordinates: &'a T,
}

/// Render `NAME = [{"coordinates": ...}];`.
pub fn js_assignment<T: Serialize + ?Sized>(var_name: &str, coordinates: &T) -> Result<String, OutputError> {
    let json = serde_json::to_string(&Payload { coordinates })?;
    Ok(format!("{var_name} = [{json}];"))
}

/// Write one assignment to `path`, replacing any existing file.
pub fn write_js<T: Serialize + ?Sized>(path: &Path, var_name: &str, coordinates: &T) -> Result<(), OutputError> {
    let contents = js_assignment(var_name, coordinates)?;
    fs::write(path, contents).map_err(|source| OutputError::Io { path: path.to_path_buf(), source })?;
    debug!(path = %path.display(), var_name, "wrote js data file");
    Ok(())
}

/// A polygon as an explicitly closed `[x, y]` ring.
pub fn ring_coordinates(polygon: &Polygon) -> Vec<[f64; 2]> {
    points_to_coordinates(&polygon.closed_ring())
}

pub fn points_to_coordinates(points: &[Point]) -> Vec<[f64; 2]> {
    points.iter().map(|&p| p.into()).collect()
}

/// Variable names for the two viewer files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebNames {
    pub boundary_var: String,
    pub bricks_var: String,
}

impl Default for WebNames {
    fn default() -> Self {
        Self {
            boundary_var: DEFAULT_BOUNDARY_VAR.to_string(),
            bricks_var: DEFAULT_BRICKS_VAR.to_string(),
        }
    }
}

/// Paths written by [`write_web_data`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebFiles {
    pub boundaries: PathBuf,
    pub bricks: PathBuf,
}

/// Write `data_boundaries.js` and `data_bricks.js` into `dir`, creating it if needed.
pub fn write_web_data(
    dir: &Path,
    names: &WebNames,
    boundary: &[[f64; 2]],
    bricks: &[Vec<[f64; 2]>],
) -> Result<WebFiles, OutputError> {
    fs::create_dir_all(dir).map_err(|source| OutputError::Io { path: dir.to_path_buf(), source })?;

    let files = WebFiles {
        boundaries: dir.join(BOUNDARIES_FILE),
        bricks: dir.join(BRICKS_FILE),
    };
    write_js(&files.boundaries, &names.boundary_var, boundary)?;
    write_js(&files.bricks, &names.bricks_var, bricks)?;
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_wraps_coordinates_object_in_array() {
        let js = js_assignment("MS.data.blockBoundaries", &[[1.5, 2.0], [3.0, 4.25]]).unwrap();
        assert_eq!(js, r#"MS.data.blockBoundaries = [{"coordinates":[[1.5,2.0],[3.0,4.25]]}];"#);
    }

    #[test]
    fn rings_are_explicitly_closed() {
        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]);
        let ring = ring_coordinates(&square);
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn writes_both_files_into_new_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("web");
        let boundary = vec![[120.1, 30.2], [120.2, 30.2], [120.2, 30.3]];
        let bricks = vec![vec![[120.1, 30.2], [120.2, 30.2], [120.2, 30.3], [120.1, 30.2]]];

        let files = write_web_data(&dir, &WebNames::default(), &boundary, &bricks).unwrap();

        let b = fs::read_to_string(&files.boundaries).unwrap();
        assert!(b.starts_with("MS.data.blockBoundaries = [{\"coordinates\":[[120.1,30.2],"));
        assert!(b.ends_with("];"));

        let k = fs::read_to_string(&files.bricks).unwrap();
        assert!(k.starts_with("MS.data.bricks = [{\"coordinates\":[[[120.1,30.2],"));
        assert_eq!(files.bricks.file_name().unwrap(), BRICKS_FILE);
    }

    #[test]
    fn unwritable_path_reports_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where a directory is expected.
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let err = write_web_data(&blocker, &WebNames::default(), &[], &[]).unwrap_err();
        assert!(matches!(err, OutputError::Io { .. }));
    }
}
