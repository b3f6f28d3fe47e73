//! Tile command implementation: inspect the lattice around one point.

use anyhow::Result;
use serde::Serialize;

use tilefill::{Tile, TileGenerator, TilingParams};

use super::TileArgs;

#[derive(Serialize)]
struct JsonTile {
    id: String,
    center: [f64; 2],
    /// Lattice coordinates relative to the inspected tile.
    cell: [i64; 2],
    flipped: bool,
    vertices: Vec<[f64; 2]>,
}

impl From<&Tile> for JsonTile {
    fn from(tile: &Tile) -> Self {
        Self {
            id: tile.id().to_string(),
            center: tile.centroid().into(),
            cell: [tile.cell().0, tile.cell().1],
            flipped: tile.is_flipped(),
            vertices: tile.polygon().outer.iter().map(|&p| p.into()).collect(),
        }
    }
}

#[derive(Serialize)]
struct JsonOutput {
    params: TilingParams,
    tile: JsonTile,
    /// Neighbor `j` shares edge `j` (vertex `j` to `j + 1`).
    neighbors: Vec<JsonTile>,
}

/// Execute the tile command.
pub fn cmd_tile(args: TileArgs) -> Result<()> {
    let params = args.tiling.params()?;
    let tile_gen = TileGenerator::new(params);

    let tile = tile_gen.tile_at(args.at);
    let neighbors = tile_gen.neighbors_of(&tile);

    let output = JsonOutput {
        params,
        tile: JsonTile::from(&tile),
        neighbors: neighbors.iter().map(JsonTile::from).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
