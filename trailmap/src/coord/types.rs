//! Tile identity types.

use std::fmt;

/// Highest zoom level accepted by configuration and the tile store.
///
/// MBTiles sets rarely go past 20; 22 leaves headroom while keeping
/// `2^zoom` comfortably inside `i64`.
pub const MAX_ZOOM: u8 = 22;

/// Identifies one map tile in the XYZ (slippy-map) scheme.
///
/// Row 0 is at the top of the map. Columns and rows are signed so that the
/// neighbours of an edge tile (for example `x = -1`) are representable; such
/// keys simply never match a database row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    /// Zoom level
    pub zoom: u8,
    /// Tile column (X)
    pub x: i64,
    /// Tile row (Y), XYZ numbering
    pub y: i64,
}

impl TileKey {
    /// Create a new tile key.
    pub fn new(zoom: u8, x: i64, y: i64) -> Self {
        Self { zoom, x, y }
    }

    /// Returns the key offset by `(dx, dy)` at the same zoom level.
    #[inline]
    pub fn neighbor(&self, dx: i64, dy: i64) -> Self {
        Self {
            zoom: self.zoom,
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// Whether the zoom level is within [`MAX_ZOOM`].
    #[inline]
    pub fn has_supported_zoom(&self) -> bool {
        self.zoom <= MAX_ZOOM
    }

    /// Row number of this tile in the TMS scheme used by MBTiles.
    #[inline]
    pub fn tms_row(&self) -> i64 {
        super::tms_row(self.zoom, self.y)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}
