//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use clap::Args;
use tracing::info;
use trailmap::compose::Compositor;
use trailmap::config::ConfigFile;
use trailmap::gps::GeoFix;
use trailmap::render::MapView;
use trailmap::tiles::{MbTiles, TileStore};

use crate::error::CliError;

/// Default preview position: Oak Park, Sacramento.
pub const PREVIEW_LATITUDE: f64 = 38.55107;
pub const PREVIEW_LONGITUDE: f64 = -121.46074;

/// Tile database overrides shared by map-producing commands.
#[derive(Debug, Clone, Default, Args)]
pub struct MapArgs {
    /// MBTiles database (overrides tiles.path)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Zoom level (overrides tiles.zoom)
    #[arg(long)]
    pub zoom: Option<u8>,
}

impl MapArgs {
    /// CLI takes precedence over the configuration file.
    pub fn apply(&self, config: &mut ConfigFile) {
        if let Some(db) = &self.db {
            config.tiles.path = db.clone();
        }
        if let Some(zoom) = self.zoom {
            config.tiles.zoom = zoom;
        }
    }
}

/// A fixed position given on the command line.
#[derive(Debug, Clone, Args)]
pub struct PositionArgs {
    /// Latitude in decimal degrees
    #[arg(long, default_value_t = PREVIEW_LATITUDE, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, default_value_t = PREVIEW_LONGITUDE, allow_negative_numbers = true)]
    pub lon: f64,

    /// Heading in degrees (0 = east, counter-clockwise)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub heading: f64,
}

impl PositionArgs {
    pub fn fix(&self) -> GeoFix {
        GeoFix::new(self.lat, self.lon, self.heading, true)
    }
}

/// Open the tile database and build the map view described by `config`.
pub fn open_view(config: &ConfigFile) -> Result<MapView<MbTiles>, CliError> {
    let db = MbTiles::open(&config.tiles.path)?;
    let metadata = db.metadata()?;
    info!(
        path = %config.tiles.path.display(),
        name = metadata.name().unwrap_or("(unnamed)"),
        format = metadata.format().unwrap_or("unknown"),
        "Tile database opened"
    );
    if let Some((min, max)) = metadata.zoom_range() {
        if !(min..=max).contains(&config.tiles.zoom) {
            tracing::warn!(
                zoom = config.tiles.zoom,
                min,
                max,
                "Zoom level outside the tileset's range, expect placeholder tiles"
            );
        }
    }

    let store = TileStore::new(db, config.tiles.tile_size, config.tiles.cache_tiles);
    let compositor = Compositor::new(store, config.screen_size())?;
    Ok(MapView::new(compositor, config.tiles.zoom))
}
