//! Bounded-retry fix decoder.
//!
//! The decoder pulls `\n`-terminated lines from a buffered reader until one
//! yields a position. Every read counts against a line budget, including
//! empty reads and serial time-outs, so a silent or babbling receiver ends in
//! [`GpsError::FixTimeout`] instead of blocking forever.

use std::io::{self, BufRead};

use tracing::{debug, trace};

use super::sentence::Sentence;
use super::{GeoFix, GpsError};

/// Default number of line reads before giving up on a fix.
pub const DEFAULT_MAX_LINES: u32 = 20;

/// Reads NMEA lines until a usable fix arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpsDecoder {
    max_lines: u32,
}

impl Default for GpsDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl GpsDecoder {
    /// Create a decoder with the given line budget.
    pub fn new(max_lines: u32) -> Self {
        Self { max_lines }
    }

    /// Line budget per [`GpsDecoder::next_fix`] call.
    pub fn max_lines(&self) -> u32 {
        self.max_lines
    }

    /// Read lines from `reader` until a fix is decoded.
    ///
    /// An active RMC sentence returns its position with the true course as
    /// heading. A GGA sentence returns its position with heading 0, valid
    /// only when the fix quality is non-zero. Void RMC sentences, other
    /// sentence types and unparseable lines are skipped.
    ///
    /// # Errors
    ///
    /// - [`GpsError::FixTimeout`] once `max_lines` reads produced no fix
    /// - [`GpsError::Transport`] for I/O errors other than time-outs
    pub fn next_fix<R: BufRead + ?Sized>(&self, reader: &mut R) -> Result<GeoFix, GpsError> {
        let mut buf = Vec::with_capacity(128);

        for attempt in 1..=self.max_lines {
            // A time-out can land mid-line; the bytes read so far stay in
            // `buf` and the next attempt completes the line.
            match reader.read_until(b'\n', &mut buf) {
                Ok(_) if buf.is_empty() => {
                    trace!(attempt, "GPS stream returned no data");
                    continue;
                }
                Ok(_) => {}
                Err(e) if is_retryable(&e) => {
                    trace!(attempt, partial = buf.len(), error = %e, "GPS read timed out");
                    continue;
                }
                Err(e) => return Err(GpsError::Transport(e)),
            }

            let line = ascii_lossy(&buf);
            buf.clear();
            match decode_line(&line) {
                Ok(Some(fix)) => {
                    debug!(
                        attempt,
                        latitude = fix.latitude,
                        longitude = fix.longitude,
                        heading = fix.heading,
                        valid = fix.valid,
                        "GPS fix decoded"
                    );
                    return Ok(fix);
                }
                Ok(None) => {}
                Err(e) => trace!(attempt, error = %e, "Skipping NMEA line"),
            }
        }

        Err(GpsError::FixTimeout {
            attempts: self.max_lines,
        })
    }
}

/// Decode a single NMEA line into a fix.
///
/// Returns `Ok(None)` for sentences that carry no usable position.
///
/// # Errors
///
/// Returns [`GpsError::Parse`] when the line is not a well-formed sentence.
pub fn decode_line(line: &str) -> Result<Option<GeoFix>, GpsError> {
    let fix = match Sentence::parse(line)? {
        Sentence::PositionAndCourse {
            position: Some(position),
            course,
        } => Some(GeoFix::new(position.latitude, position.longitude, course, true)),
        Sentence::PositionAndCourse { position: None, .. } => None,
        Sentence::PositionOnly {
            position,
            fix_quality,
        } => Some(GeoFix::new(
            position.latitude,
            position.longitude,
            0.0,
            fix_quality > 0,
        )),
        Sentence::Unrecognized(_) => None,
    };
    Ok(fix)
}

/// Drop every non-ASCII byte.
fn ascii_lossy(bytes: &[u8]) -> String {
    bytes
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| b as char)
        .collect()
}

fn is_retryable(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}
