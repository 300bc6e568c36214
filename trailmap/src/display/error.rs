//! Error types for the panel driver.

use thiserror::Error;

/// Errors raised while driving the panel.
///
/// Hardware errors are carried as their debug rendering so the driver's
/// error type does not depend on the concrete HAL.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The SPI bus rejected a transfer.
    #[error("SPI transfer failed: {0}")]
    Spi(String),

    /// A control pin (DC, RST, CS) could not be driven.
    #[error("GPIO pin {pin} failed: {message}")]
    Pin { pin: &'static str, message: String },

    /// The frame does not match the panel geometry.
    #[error("frame is {frame_width}×{frame_height} but the panel is {width}×{height}")]
    FrameSize {
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

impl DisplayError {
    pub(crate) fn spi<E: std::fmt::Debug>(err: E) -> Self {
        DisplayError::Spi(format!("{:?}", err))
    }

    pub(crate) fn pin<E: std::fmt::Debug>(pin: &'static str) -> impl FnOnce(E) -> Self {
        move |err| DisplayError::Pin {
            pin,
            message: format!("{:?}", err),
        }
    }
}
