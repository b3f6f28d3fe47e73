//! Fill command implementation.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use tilefill::{BoundaryFiller, FillStats, Point, TilingParams, WebNames, pieces_to_svg, write_web_data};

use super::FillArgs;
use super::common::load_boundary;

/// Summary printed with `--json`.
#[derive(Serialize)]
struct JsonSummary {
    params: TilingParams,
    anchor: Point,
    projected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    epsg: Option<u32>,
    stats: FillStats,
    boundary_area: f64,
    total_area: f64,
    elapsed_ms: f64,
    files: JsonFiles,
}

#[derive(Serialize)]
struct JsonFiles {
    boundaries: PathBuf,
    bricks: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    svg: Option<PathBuf>,
}

/// Execute the fill command.
pub fn cmd_fill(args: FillArgs) -> Result<()> {
    let params = args.tiling.params()?;
    let boundary = load_boundary(&args.input)?;

    let filler = match args.anchor {
        Some(anchor) => BoundaryFiller::new(boundary.planar.clone(), boundary.to_plane(anchor)?),
        None => BoundaryFiller::from_centroid(boundary.planar.clone()),
    }
    .with_params(params);

    let start = Instant::now();
    let result = filler.fill().context("Fill failed")?;
    let elapsed = start.elapsed();

    let bricks = boundary.output_rings(result.polygons())?;
    let names = WebNames { boundary_var: args.boundary_var, bricks_var: args.bricks_var };
    let files = write_web_data(&args.out_dir, &names, &boundary.source, &bricks)?;
    info!(boundaries = %files.boundaries.display(), bricks = %files.bricks.display(), "wrote viewer data");

    if let Some(svg_path) = &args.svg {
        fs::write(svg_path, pieces_to_svg(&boundary.planar, result.polygons()))
            .with_context(|| format!("Failed to write {}", svg_path.display()))?;
    }

    let boundary_area = boundary.planar.area();
    let total_area = result.total_area();

    if args.json {
        let summary = JsonSummary {
            params,
            anchor: filler.anchor(),
            projected: boundary.projection.is_some(),
            epsg: boundary.projection.and_then(|p| p.epsg()),
            stats: result.stats,
            boundary_area,
            total_area,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            files: JsonFiles { boundaries: files.boundaries, bricks: files.bricks, svg: args.svg },
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let stats = result.stats;
    println!("Boundary: {} ({} vertices)", args.input.boundary.display(), boundary.planar.len());
    println!(
        "Tiling: {} (k={}), radius {}, theta {}",
        params.sides().name(),
        params.k(),
        params.radius(),
        params.theta()
    );
    println!(
        "Pieces: {} from {} tiles ({} visited, {} rejected)",
        stats.pieces, stats.clipped_tiles, stats.visited, stats.rejected
    );
    if boundary_area > 0.0 {
        println!("Coverage: {:.4}%", total_area / boundary_area * 100.0);
    }
    println!("Time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);
    println!("Wrote {}", files.boundaries.display());
    println!("Wrote {}", files.bricks.display());
    if let Some(svg_path) = &args.svg {
        println!("Wrote {}", svg_path.display());
    }

    Ok(())
}
