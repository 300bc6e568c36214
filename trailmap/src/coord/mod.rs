//! Coordinate conversion module
//!
//! Converts geographic coordinates (latitude/longitude) into Web Mercator
//! slippy-map tile indices, and XYZ tile rows into the TMS rows stored in
//! MBTiles databases.

mod types;

pub use types::{TileKey, MAX_ZOOM};

use std::f64::consts::PI;

/// Converts geographic coordinates to an XYZ tile index.
///
/// Longitude is scaled linearly; latitude goes through the inverse Mercator
/// formula `ln(tan φ + sec φ)`. The fractional tile position is truncated
/// toward zero, never rounded.
///
/// Latitudes at or beyond the poles are not guarded: the projection is
/// undefined there and the float-to-int cast saturates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees
/// * `lon` - Longitude in degrees
/// * `zoom` - Zoom level
///
/// # Returns
///
/// `(x, y)` tile column and row.
#[inline]
pub fn tile_index(lat: f64, lon: f64, zoom: u8) -> (i64, i64) {
    // Number of tiles along each axis at this zoom level
    let n = 2.0_f64.powi(zoom as i32);

    let x = ((lon + 180.0) / 360.0 * n) as i64;

    let lat_rad = lat.to_radians();
    let mercator = (lat_rad.tan() + 1.0 / lat_rad.cos()).ln();
    let y = ((1.0 - mercator / PI) / 2.0 * n) as i64;

    (x, y)
}

/// Converts geographic coordinates to the key of the tile containing them.
#[inline]
pub fn tile_key(lat: f64, lon: f64, zoom: u8) -> TileKey {
    let (x, y) = tile_index(lat, lon, zoom);
    TileKey::new(zoom, x, y)
}

/// Flips a tile row between the XYZ and TMS schemes.
///
/// XYZ numbers rows from the top of the map, TMS from the bottom:
/// `row_tms = (2^zoom - 1) - row_xyz`. The transform is its own inverse, so
/// the same function converts in both directions.
///
/// Zoom levels past 63 have no representable row count; the last row
/// saturates at `i64::MAX` there, as does the subtraction.
#[inline]
pub fn tms_row(zoom: u8, row: i64) -> i64 {
    let last_row = i64::MAX >> (63 - u32::from(zoom.min(63)));
    last_row.saturating_sub(row)
}
