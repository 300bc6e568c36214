//! Render cycle errors and their classification.

use thiserror::Error;

use crate::display::DisplayError;
use crate::gps::GpsError;
use crate::tiles::TileError;

/// Errors from one render cycle.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Gps(#[from] GpsError),

    #[error(transparent)]
    Tiles(#[from] TileError),

    #[error(transparent)]
    Display(#[from] DisplayError),

    /// The loop gave up after too many consecutive fatal failures.
    #[error("giving up after {failures} consecutive failures: {last}")]
    Exhausted {
        failures: u32,
        #[source]
        last: Box<RenderError>,
    },
}

impl RenderError {
    /// Whether retrying the cycle is unlikely to help.
    ///
    /// GPS time-outs and tile database errors are transient. A broken panel
    /// link, a mis-sized frame, or a serial port that stopped working are
    /// fatal.
    pub fn is_fatal(&self) -> bool {
        match self {
            RenderError::Gps(e) => !e.is_timeout() && !matches!(e, GpsError::Parse(_)),
            RenderError::Tiles(TileError::InvalidGeometry(_)) => true,
            RenderError::Tiles(_) => false,
            RenderError::Display(_) => true,
            RenderError::Exhausted { .. } => true,
        }
    }
}
