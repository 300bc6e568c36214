//! Tile grid compositing.
//!
//! Builds the screen-sized map view around a position: the tile containing
//! the position and its neighbours out to [`GRID_RADIUS`] are pasted onto a
//! square canvas, and a screen-sized window is cropped from the canvas
//! center.
//!
//! ```text
//!   canvas (5 × tile)
//!   ┌────┬────┬────┬────┬────┐
//!   │    │    │    │    │    │
//!   ├────┼────┼────┼────┼────┤
//!   │    │ ┌──┼────┼──┐ │    │
//!   ├────┼─┼──┼────┼──┼─┼────┤
//!   │    │ │  │ C  │  │ │    │   C = center tile
//!   ├────┼─┼──┼────┼──┼─┼────┤   inner box = cropped frame
//!   │    │ └──┼────┼──┘ │    │
//!   ├────┼────┼────┼────┼────┤
//!   │    │    │    │    │    │
//!   └────┴────┴────┴────┴────┘
//! ```

use image::{Rgb, RgbImage};
use tracing::trace;

use crate::coord::tile_key;
use crate::tiles::{TileError, TileSource, TileStore};

/// Screen-sized raster passed to the overlay renderer and the display.
pub type Frame = RgbImage;

/// Number of neighbouring tiles pasted on each side of the center tile.
pub const GRID_RADIUS: i64 = 2;

/// Tiles along each side of the canvas.
pub const GRID_SIZE: u32 = (2 * GRID_RADIUS + 1) as u32;

/// Canvas background, visible only if a tile were ever smaller than the grid cell.
const CANVAS_BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Screen geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl ScreenSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Assembles screen frames from a [`TileStore`].
pub struct Compositor<S> {
    store: TileStore<S>,
    screen: ScreenSize,
}

impl<S: TileSource> Compositor<S> {
    /// Create a compositor for the given screen.
    ///
    /// # Errors
    ///
    /// Returns [`TileError::InvalidGeometry`] if the screen is empty or does
    /// not fit inside the tile grid canvas.
    pub fn new(store: TileStore<S>, screen: ScreenSize) -> Result<Self, TileError> {
        let canvas = canvas_side(store.tile_size());
        if screen.width == 0 || screen.height == 0 {
            return Err(TileError::InvalidGeometry(format!(
                "screen {}×{} has no pixels",
                screen.width, screen.height
            )));
        }
        if screen.width > canvas || screen.height > canvas {
            return Err(TileError::InvalidGeometry(format!(
                "screen {}×{} does not fit the {}×{} tile canvas",
                screen.width, screen.height, canvas, canvas
            )));
        }
        Ok(Self { store, screen })
    }

    /// Screen geometry of composed frames.
    pub fn screen(&self) -> ScreenSize {
        self.screen
    }

    /// The tile store frames are built from.
    pub fn store(&self) -> &TileStore<S> {
        &self.store
    }

    /// Compose the frame centered on the tile containing `(lat, lon)`.
    ///
    /// The result is always exactly `screen.width × screen.height`, whether
    /// or not the surrounding tiles exist in the database.
    ///
    /// # Errors
    ///
    /// Propagates [`TileError::Database`] from the store, and
    /// [`TileError::InvalidGeometry`] for unsupported zoom levels.
    pub fn compose(&self, lat: f64, lon: f64, zoom: u8) -> Result<Frame, TileError> {
        let tile_size = self.store.tile_size();
        let side = canvas_side(tile_size);
        let center = tile_key(lat, lon, zoom);
        trace!(tile = %center, "Composing tile grid");

        let mut canvas = RgbImage::from_pixel(side, side, CANVAS_BACKGROUND);
        for dx in -GRID_RADIUS..=GRID_RADIUS {
            for dy in -GRID_RADIUS..=GRID_RADIUS {
                let tile = self.store.fetch_key(center.neighbor(dx, dy))?;
                let px = (dx + GRID_RADIUS) * tile_size as i64;
                let py = (dy + GRID_RADIUS) * tile_size as i64;
                image::imageops::replace(&mut canvas, &*tile, px, py);
            }
        }

        let (crop_x, crop_y) = crop_origin(side, self.screen);
        Ok(
            image::imageops::crop_imm(
                &canvas,
                crop_x,
                crop_y,
                self.screen.width,
                self.screen.height,
            )
            .to_image(),
        )
    }
}

/// Side length of the tile grid canvas.
#[inline]
pub fn canvas_side(tile_size: u32) -> u32 {
    GRID_SIZE * tile_size
}

/// Top-left corner of the screen window centered in a square canvas.
///
/// Uses floor division, so an odd margin leaves the extra pixel on the
/// right/bottom.
#[inline]
pub fn crop_origin(canvas_side: u32, screen: ScreenSize) -> (u32, u32) {
    (
        (canvas_side - screen.width) / 2,
        (canvas_side - screen.height) / 2,
    )
}
