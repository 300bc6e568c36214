//! Info command - describe the tile database.

use std::path::PathBuf;

use trailmap::config::{config_file_path, ConfigFile};
use trailmap::coord::tile_key;
use trailmap::tiles::{MbTiles, TileError, TileSource};

use super::common::{PREVIEW_LATITUDE, PREVIEW_LONGITUDE};
use crate::error::CliError;

pub fn run(config_path: Option<PathBuf>, db: Option<PathBuf>) -> Result<(), CliError> {
    let config_path = config_path.unwrap_or_else(config_file_path);
    let config = ConfigFile::load_from(&config_path)?;
    config.validate()?;
    let path = db.unwrap_or_else(|| config.tiles.path.clone());

    let db = MbTiles::open(&path)?;
    let metadata = db.metadata()?;

    println!("Tile database: {}", path.display());
    println!();

    if metadata.entries.is_empty() {
        println!("Metadata: (none)");
    } else {
        println!("Metadata");
        println!("────────");
        for (name, value) in &metadata.entries {
            println!("  {:<12} {}", name, value);
        }
    }
    println!();

    println!("Tiles per zoom");
    println!("──────────────");
    let counts = db.tile_counts()?;
    if counts.is_empty() {
        println!("  (no tiles)");
    }
    for (zoom, count) in &counts {
        let marker = if *zoom == config.tiles.zoom {
            "  <- configured"
        } else {
            ""
        };
        println!("  z{:<3} {:>8}{}", zoom, count, marker);
    }
    println!();

    let key = tile_key(PREVIEW_LATITUDE, PREVIEW_LONGITUDE, config.tiles.zoom);
    let present = match db.tile_data(key) {
        Ok(_) => "present",
        Err(TileError::NotFound(_)) => "missing",
        Err(e) => return Err(e.into()),
    };
    println!(
        "Preview tile {} ({:.5}, {:.5}): {}",
        key, PREVIEW_LATITUDE, PREVIEW_LONGITUDE, present
    );
    Ok(())
}
