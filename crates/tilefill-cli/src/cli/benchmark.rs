//! Benchmark command implementation.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};

use tilefill::BoundaryFiller;

use super::BenchmarkArgs;
use super::common::load_boundary;

/// Execute the benchmark command.
pub fn cmd_benchmark(args: BenchmarkArgs) -> Result<()> {
    if args.iterations == 0 {
        bail!("--iterations must be at least 1");
    }
    let params = args.tiling.params()?;

    println!("Loading: {}", args.input.boundary.display());
    let start_load = Instant::now();
    let boundary = load_boundary(&args.input)?;
    println!("Loaded {} vertices in {:?}", boundary.planar.len(), start_load.elapsed());

    let filler = BoundaryFiller::from_centroid(boundary.planar).with_params(params);

    println!("\nRunning {} fill x{}...", params.sides().name(), args.iterations);
    let mut elapsed = Duration::ZERO;
    let mut fastest = Duration::MAX;
    let mut stats = None;
    for _ in 0..args.iterations {
        let start = Instant::now();
        let result = filler.fill()?;
        let run = start.elapsed();
        elapsed += run;
        fastest = fastest.min(run);
        stats = Some(result.stats);
    }
    let stats = stats.unwrap_or_default();
    let avg_ms = elapsed.as_secs_f64() * 1000.0 / args.iterations as f64;

    println!();
    println!("═══════════════════════════════════════════════");
    println!("  RUST BENCHMARK: {} FILL", params.sides().name().to_uppercase());
    println!("═══════════════════════════════════════════════");
    println!("  Radius: {}", params.radius());
    println!("  Theta: {}", params.theta());
    println!("  Iterations: {}", args.iterations);
    println!("  Tiles visited: {}", stats.visited);
    println!("  Pieces: {}", stats.pieces);
    println!("  Time: {:?}", elapsed);
    println!("  Time (ms): {:.2}", elapsed.as_secs_f64() * 1000.0);
    println!("  Avg per fill: {:.3}ms", avg_ms);
    println!("  Fastest: {:.3}ms", fastest.as_secs_f64() * 1000.0);
    if stats.visited > 0 {
        println!("  Avg per tile: {:.3}µs", avg_ms * 1000.0 / stats.visited as f64);
    }
    println!("═══════════════════════════════════════════════");

    Ok(())
}
