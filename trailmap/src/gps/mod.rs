//! GPS fix acquisition from an NMEA 0183 stream.
//!
//! # Example
//!
//! ```ignore
//! use std::io::BufReader;
//! use trailmap::gps::GpsDecoder;
//!
//! let mut reader = BufReader::new(serial_port);
//! let fix = GpsDecoder::new(20).next_fix(&mut reader)?;
//! println!("{:.5}, {:.5} heading {}", fix.latitude, fix.longitude, fix.heading);
//! ```

mod decoder;
mod error;
mod sentence;

pub use decoder::{decode_line, GpsDecoder, DEFAULT_MAX_LINES};
pub use error::{GpsError, SentenceParseError};
pub use sentence::{checksum, Position, Sentence};

/// One decoded GPS reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFix {
    /// Latitude in decimal degrees, north positive.
    pub latitude: f64,
    /// Longitude in decimal degrees, east positive.
    pub longitude: f64,
    /// Heading in degrees as reported by the receiver; 0 when unknown.
    pub heading: f64,
    /// Whether the receiver reported an actual fix.
    pub valid: bool,
}

impl GeoFix {
    pub fn new(latitude: f64, longitude: f64, heading: f64, valid: bool) -> Self {
        Self {
            latitude,
            longitude,
            heading,
            valid,
        }
    }
}
