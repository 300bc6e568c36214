//! Panel output.
//!
//! [`Panel`] is the seam between the render loop and the hardware. The
//! [`St7796`] driver implements it over any `embedded-hal` 1.0 SPI bus and
//! output pins; on Linux those come from `linux-embedded-hal` (see
//! [`crate::hardware`]).
//!
//! # Example
//!
//! ```ignore
//! use trailmap::display::{PanelPins, St7796, St7796Config};
//!
//! let mut panel = St7796::new(spi, PanelPins { dc, rst, cs }, delay, St7796Config::default())?;
//! panel.display(&frame)?;
//! ```

mod error;
mod pixel;
mod st7796;

pub use error::DisplayError;
pub use pixel::{frame_to_rgb565_be, rgb565};
pub use st7796::{
    cmd, DriverState, PanelPins, Rotation, St7796, St7796Config, DEFAULT_CHUNK_SIZE,
    DEFAULT_HEIGHT, DEFAULT_WIDTH,
};

use crate::compose::Frame;

/// A display that accepts full frames.
pub trait Panel {
    /// Panel geometry as `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    /// Show `frame`. The frame must match [`Panel::size`].
    fn display(&mut self, frame: &Frame) -> Result<(), DisplayError>;
}

impl<P: Panel + ?Sized> Panel for Box<P> {
    fn size(&self) -> (u32, u32) {
        (**self).size()
    }

    fn display(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        (**self).display(frame)
    }
}
