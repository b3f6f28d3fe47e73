//! tilefill - fill a map boundary with regular polygon tiles
//!
//! Usage:
//!   tilefill fill <boundary> -r <radius> [-k 3|4|6] [-t theta]   Write web/data_*.js
//!   tilefill tile -r <radius> -k <sides> --at X,Y                 Inspect the lattice
//!   tilefill benchmark <boundary> -r <radius>                     Time repeated fills

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod cli;

use cli::{Cli, Command, cmd_benchmark, cmd_fill, cmd_tile};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fill(args) => cmd_fill(args),
        Command::Tile(args) => cmd_tile(args),
        Command::Benchmark(args) => cmd_benchmark(args),
    }
}

/// Log to stderr so stdout stays clean for JSON output.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `-v`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}
