//! Map tile acquisition.
//!
//! Tiles come from an MBTiles database ([`MbTiles`]) through the
//! [`TileSource`] seam and are served by [`TileStore`], which decodes them,
//! substitutes a gray placeholder for tiles the database lacks and keeps the
//! results in a bounded cache.
//!
//! # Example
//!
//! ```ignore
//! use trailmap::tiles::{MbTiles, TileStore};
//!
//! let db = MbTiles::open("/home/pi/GPS/maps/samplemap.mbtiles")?;
//! let store = TileStore::new(db, 256, 256);
//! let tile = store.fetch(15, 5328, 12575)?;
//! assert_eq!(tile.dimensions(), (256, 256));
//! ```

mod error;
mod placeholder;
mod source;
mod store;

pub use error::TileError;
pub use placeholder::{placeholder_tile, PLACEHOLDER_COLOR};
pub use source::{MbTiles, TileSource, TilesetMetadata};
pub use store::{TileImage, TileStore, TileStoreStats, DEFAULT_CACHE_TILES};

use crate::coord::{TileKey, MAX_ZOOM};

/// Reject keys whose zoom level is past [`MAX_ZOOM`].
pub(crate) fn check_zoom(key: TileKey) -> Result<(), TileError> {
    if key.has_supported_zoom() {
        Ok(())
    } else {
        Err(TileError::InvalidGeometry(format!(
            "zoom {} of tile {} exceeds the maximum of {}",
            key.zoom, key, MAX_ZOOM
        )))
    }
}
