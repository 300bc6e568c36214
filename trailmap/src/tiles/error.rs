//! Error types for tile lookup.

use std::path::PathBuf;

use thiserror::Error;

use crate::coord::TileKey;

/// Errors that can occur while looking up or decoding a tile.
#[derive(Debug, Error)]
pub enum TileError {
    /// The database holds no row for this tile.
    ///
    /// Recovered inside the tile store by substituting a placeholder.
    #[error("tile {0} not found in tile database")]
    NotFound(TileKey),

    /// The stored bytes could not be decoded into an image.
    #[error("failed to decode tile {key}: {source}")]
    Decode {
        key: TileKey,
        #[source]
        source: image::ImageError,
    },

    /// The tile database could not be opened.
    #[error("failed to open tile database {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A query against an open database failed.
    #[error("tile database query failed: {0}")]
    Database(#[from] rusqlite::Error),

    /// Tile or screen geometry is unusable.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
}
