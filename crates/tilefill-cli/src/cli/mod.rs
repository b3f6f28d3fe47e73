//! CLI command implementations.
//!
//! - `fill` - Fill a boundary and write the viewer data files
//! - `tile` - Print one tile and its edge neighbors
//! - `benchmark` - Time repeated fills of a boundary

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use tilefill::output::{DEFAULT_BOUNDARY_VAR, DEFAULT_BRICKS_VAR};
use tilefill::projection::DEFAULT_EPSG;
use tilefill::{Point, SideCount, TilingParams};

pub mod benchmark;
pub mod common;
pub mod fill;
pub mod tile;

pub use benchmark::cmd_benchmark;
pub use fill::cmd_fill;
pub use tile::cmd_tile;

#[derive(Parser)]
#[command(name = "tilefill")]
#[command(version)]
#[command(about = "Fill a map boundary with triangles, squares or hexagons")]
pub struct Cli {
    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fill a boundary and write data_boundaries.js / data_bricks.js
    Fill(FillArgs),

    /// Print the tile at a point and its edge neighbors as JSON
    Tile(TileArgs),

    /// Time repeated fills of a boundary
    Benchmark(BenchmarkArgs),
}

/// Lattice settings shared by every command.
#[derive(Args, Debug, Clone)]
pub struct TilingArgs {
    /// Circumradius of each tile, in planar units (meters when projected)
    #[arg(short, long)]
    pub radius: f64,

    /// Tile shape: 3/4/6 or triangle/square/hexagon
    #[arg(short = 'k', long, default_value = "6", value_parser = parse_sides)]
    pub sides: SideCount,

    /// Lattice rotation in degrees
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub theta: f64,
}

impl TilingArgs {
    pub fn params(&self) -> Result<TilingParams> {
        Ok(TilingParams::new(self.radius, self.sides.get(), self.theta)?)
    }
}

/// Where the boundary comes from and how to read it.
#[derive(Args, Debug, Clone)]
pub struct BoundaryArgs {
    /// Boundary file: JSON `[[lon, lat], ...]`, `{"coordinates": [...]}`, or .svg
    pub boundary: PathBuf,

    /// Gauss-Krüger system used to project lon/lat (EPSG:4502-4512)
    #[arg(long, default_value_t = DEFAULT_EPSG)]
    pub epsg: u32,

    /// Treat JSON coordinates as already planar
    #[arg(long)]
    pub planar: bool,
}

#[derive(Args, Debug)]
pub struct FillArgs {
    #[command(flatten)]
    pub input: BoundaryArgs,

    #[command(flatten)]
    pub tiling: TilingArgs,

    /// Start tile center, in input coordinates (default: boundary centroid)
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub anchor: Option<Point>,

    /// Directory for the viewer data files
    #[arg(short, long, default_value = "web")]
    pub out_dir: PathBuf,

    /// Variable assigned in data_boundaries.js
    #[arg(long, default_value = DEFAULT_BOUNDARY_VAR)]
    pub boundary_var: String,

    /// Variable assigned in data_bricks.js
    #[arg(long, default_value = DEFAULT_BRICKS_VAR)]
    pub bricks_var: String,

    /// Also write a planar SVG preview
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Print a JSON summary to stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TileArgs {
    #[command(flatten)]
    pub tiling: TilingArgs,

    /// Tile center as X,Y
    #[arg(long, default_value = "0,0", value_parser = parse_point, allow_hyphen_values = true)]
    pub at: Point,
}

#[derive(Args, Debug)]
pub struct BenchmarkArgs {
    #[command(flatten)]
    pub input: BoundaryArgs,

    #[command(flatten)]
    pub tiling: TilingArgs,

    /// Number of fills to time
    #[arg(short = 'n', long, default_value_t = 10)]
    pub iterations: u32,
}

fn parse_sides(s: &str) -> Result<SideCount, String> {
    SideCount::from_name(s).ok_or_else(|| format!("expected 3, 4, 6, triangle, square or hexagon, got '{s}'"))
}

/// Parse `X,Y`.
pub fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid X coordinate '{x}'"))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid Y coordinate '{y}'"))?;
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_point_accepts_negative_and_spaces() {
        assert_eq!(parse_point("-1.5, 2").unwrap(), Point::new(-1.5, 2.0));
        assert!(parse_point("1.5").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn fill_defaults() {
        let cli = Cli::try_parse_from(["tilefill", "fill", "district.json", "--radius", "1000"]).unwrap();
        let Command::Fill(args) = cli.command else {
            panic!("expected fill");
        };
        assert_eq!(args.tiling.sides, SideCount::Hexagon);
        assert_eq!(args.tiling.theta, 0.0);
        assert_eq!(args.input.epsg, 4508);
        assert_eq!(args.out_dir, PathBuf::from("web"));
        assert_eq!(args.boundary_var, "MS.data.blockBoundaries");
        assert!(args.anchor.is_none());
    }

    #[test]
    fn sides_accepts_names() {
        let cli = Cli::try_parse_from(["tilefill", "tile", "-r", "2", "-k", "square", "--at", "-3,4"]).unwrap();
        let Command::Tile(args) = cli.command else {
            panic!("expected tile");
        };
        assert_eq!(args.tiling.sides, SideCount::Square);
        assert_eq!(args.at, Point::new(-3.0, 4.0));
    }

    #[test]
    fn rejects_unsupported_sides() {
        assert!(Cli::try_parse_from(["tilefill", "tile", "-r", "2", "-k", "5"]).is_err());
    }
}
