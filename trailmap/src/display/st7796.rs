//! ST7796 TFT controller driver.
//!
//! The controller is driven over a 4-wire SPI link: a data/command (DC) line
//! selects whether the bytes on the bus are a command opcode (low) or its
//! parameters (high), and chip select (CS) frames every burst. CS is toggled
//! by the driver, not by the SPI peripheral.
//!
//! Lifecycle:
//!
//! ```text
//! Uninitialized ──reset()──► Reset ──SLPOUT/MADCTL/COLMOD──► Configured ──DISPON──► Ready
//! ```
//!
//! Only a `Ready` driver accepts frames.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use tracing::{debug, info, trace};

use super::pixel::frame_to_rgb565_be;
use super::{DisplayError, Panel};
use crate::compose::Frame;

/// ST7796 command opcodes.
pub mod cmd {
    pub const SLPOUT: u8 = 0x11;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A; // Column address set
    pub const RASET: u8 = 0x2B; // Row address set
    pub const RAMWR: u8 = 0x2C; // Memory write
    pub const MADCTL: u8 = 0x36; // Memory access control
    pub const COLMOD: u8 = 0x3A; // Interface pixel format
}

/// COLMOD parameter for 16 bits per pixel.
const COLMOD_RGB565: u8 = 0x55;

/// Settle time after each reset edge, SLPOUT and DISPON.
const SETTLE_MS: u32 = 100;

/// Default pixel transfer chunk in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

pub const DEFAULT_WIDTH: u32 = 480;
pub const DEFAULT_HEIGHT: u32 = 320;

/// Panel orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// MADCTL byte for this orientation, BGR color order.
    pub fn madctl(self) -> u8 {
        match self {
            Rotation::Deg0 => 0x48,
            Rotation::Deg90 => 0x28,
            Rotation::Deg180 => 0x88,
            Rotation::Deg270 => 0xE8,
        }
    }

    /// Parse a rotation in degrees; only right angles are accepted.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::Deg0),
            90 => Some(Rotation::Deg90),
            180 => Some(Rotation::Deg180),
            270 => Some(Rotation::Deg270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// Protocol state of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Reset,
    Configured,
    Ready,
}

/// Panel geometry and transfer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct St7796Config {
    pub width: u32,
    pub height: u32,
    pub rotation: Rotation,
    /// Maximum bytes per SPI write during a pixel transfer.
    pub chunk_size: usize,
}

impl Default for St7796Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            rotation: Rotation::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl St7796Config {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// Control lines of the panel.
pub struct PanelPins<DC, RST, CS> {
    pub dc: DC,
    pub rst: RST,
    pub cs: CS,
}

/// ST7796 driver over an `embedded-hal` SPI bus and output pins.
pub struct St7796<SPI, DC, RST, CS, D> {
    spi: SPI,
    pins: PanelPins<DC, RST, CS>,
    delay: D,
    config: St7796Config,
    state: DriverState,
}

impl<SPI, DC, RST, CS, D> St7796<SPI, DC, RST, CS, D>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the bus and pins, reset the panel and bring it up.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::Pin`] or [`DisplayError::Spi`] if any step of
    /// the start-up sequence fails.
    pub fn new(
        spi: SPI,
        pins: PanelPins<DC, RST, CS>,
        delay: D,
        config: St7796Config,
    ) -> Result<Self, DisplayError> {
        let mut driver = Self {
            spi,
            pins,
            delay,
            config,
            state: DriverState::Uninitialized,
        };
        driver.reset()?;
        driver.configure()?;
        info!(
            width = config.width,
            height = config.height,
            rotation = config.rotation.degrees(),
            "ST7796 panel ready"
        );
        Ok(driver)
    }

    /// Current protocol state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &St7796Config {
        &self.config
    }

    /// Hardware reset: RST high, low, high with a settle after each edge.
    pub fn reset(&mut self) -> Result<(), DisplayError> {
        self.pins.rst.set_high().map_err(DisplayError::pin("rst"))?;
        self.delay.delay_ms(SETTLE_MS);
        self.pins.rst.set_low().map_err(DisplayError::pin("rst"))?;
        self.delay.delay_ms(SETTLE_MS);
        self.pins.rst.set_high().map_err(DisplayError::pin("rst"))?;
        self.delay.delay_ms(SETTLE_MS);

        self.state = DriverState::Reset;
        debug!("ST7796 reset");
        Ok(())
    }

    fn configure(&mut self) -> Result<(), DisplayError> {
        self.write_command(cmd::SLPOUT)?;
        self.delay.delay_ms(SETTLE_MS);

        self.write_command(cmd::MADCTL)?;
        self.write_data(&[self.config.rotation.madctl()])?;

        self.write_command(cmd::COLMOD)?;
        self.write_data(&[COLMOD_RGB565])?;
        self.state = DriverState::Configured;

        self.write_command(cmd::DISPON)?;
        self.delay.delay_ms(SETTLE_MS);
        self.state = DriverState::Ready;
        Ok(())
    }

    /// Send one command opcode: DC low, CS low, write, CS high.
    pub fn write_command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.pins.dc.set_low().map_err(DisplayError::pin("dc"))?;
        self.burst(&[command])
    }

    /// Send command parameters: DC high, CS low, write, CS high.
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.pins.dc.set_high().map_err(DisplayError::pin("dc"))?;
        self.burst(data)
    }

    /// Address the full panel: columns `0..width`, rows `0..height`.
    pub fn set_address_window(&mut self) -> Result<(), DisplayError> {
        let (width, height) = (self.config.width, self.config.height);

        self.write_command(cmd::CASET)?;
        self.write_data(&window_bounds(width))?;
        self.write_command(cmd::RASET)?;
        self.write_data(&window_bounds(height))?;
        Ok(())
    }

    /// Push a full frame to the panel.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::FrameSize`] if `frame` does not match the panel
    /// geometry; nothing is written in that case.
    pub fn display(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        let (frame_width, frame_height) = frame.dimensions();
        if (frame_width, frame_height) != (self.config.width, self.config.height) {
            return Err(DisplayError::FrameSize {
                width: self.config.width,
                height: self.config.height,
                frame_width,
                frame_height,
            });
        }

        let pixels = frame_to_rgb565_be(frame);

        self.set_address_window()?;
        self.write_command(cmd::RAMWR)?;
        self.pins.dc.set_high().map_err(DisplayError::pin("dc"))?;
        self.pins.cs.set_low().map_err(DisplayError::pin("cs"))?;
        let written = self.write_pixels(&pixels);
        self.end_burst(written)?;

        trace!(bytes = pixels.len(), "Frame transferred");
        Ok(())
    }

    /// Give back the bus, pins and delay source.
    pub fn release(self) -> (SPI, PanelPins<DC, RST, CS>, D) {
        (self.spi, self.pins, self.delay)
    }

    fn burst(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.pins.cs.set_low().map_err(DisplayError::pin("cs"))?;
        let written = self
            .spi
            .write(bytes)
            .and_then(|()| self.spi.flush())
            .map_err(DisplayError::spi);
        self.end_burst(written)
    }

    fn write_pixels(&mut self, pixels: &[u8]) -> Result<(), DisplayError> {
        for chunk in pixels.chunks(self.config.chunk_size.max(1)) {
            self.spi.write(chunk).map_err(DisplayError::spi)?;
        }
        self.spi.flush().map_err(DisplayError::spi)
    }

    /// Deassert CS after a transfer, failed or not. A transfer error takes
    /// precedence over a CS error.
    fn end_burst(&mut self, written: Result<(), DisplayError>) -> Result<(), DisplayError> {
        let released = self.pins.cs.set_high().map_err(DisplayError::pin("cs"));
        written.and(released)
    }
}

impl<SPI, DC, RST, CS, D> Panel for St7796<SPI, DC, RST, CS, D>
where
    SPI: SpiBus<u8>,
    DC: OutputPin,
    RST: OutputPin,
    CS: OutputPin,
    D: DelayNs,
{
    fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn display(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        St7796::display(self, frame)
    }
}

/// `[start_hi, start_lo, end_hi, end_lo]` for a window starting at 0.
fn window_bounds(extent: u32) -> [u8; 4] {
    let end = extent.saturating_sub(1);
    [0, 0, (end >> 8) as u8, (end & 0xFF) as u8]
}
