//! Uniform gray placeholder tile.
//!
//! When the database has no row for a requested tile we paste a flat gray
//! square instead, so the composited frame never has holes and always keeps
//! its full size.

use image::{Rgb, RgbImage};

/// Placeholder fill color (mid gray).
pub const PLACEHOLDER_COLOR: Rgb<u8> = Rgb([128, 128, 128]);

/// Generate a placeholder tile of `size × size` pixels.
pub fn placeholder_tile(size: u32) -> RgbImage {
    RgbImage::from_pixel(size, size, PLACEHOLDER_COLOR)
}
