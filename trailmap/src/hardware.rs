//! Hardware bootstrap for Linux boards.
//!
//! Opens the GPS serial port, the spidev bus and the GPIO control lines named
//! in the configuration, and brings the panel up. Everything above this
//! module sees only `BufRead` and [`Panel`](crate::display::Panel).

use std::io::BufReader;
use std::path::PathBuf;
use std::time::Duration;

use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, SpidevBus};
use serialport::SerialPort;
use thiserror::Error;
use tracing::info;

use crate::config::{ConfigFile, DisplaySettings, GpsSettings};
use crate::display::{DisplayError, PanelPins, St7796};

/// GPIO consumer label shown by `gpioinfo`.
const GPIO_CONSUMER: &str = "trailmap";

/// Buffered GPS serial stream.
pub type GpsReader = BufReader<Box<dyn SerialPort>>;

/// ST7796 on spidev with GPIO character-device control lines.
pub type LinuxPanel = St7796<SpidevBus, CdevPin, CdevPin, CdevPin, Delay>;

/// Errors opening hardware.
#[derive(Debug, Error)]
pub enum HardwareError {
    #[error("failed to open GPS port {device}: {source}")]
    Serial {
        device: String,
        #[source]
        source: serialport::Error,
    },

    #[error("failed to open SPI device {}: {message}", device.display())]
    Spi { device: PathBuf, message: String },

    #[error("failed to claim GPIO line {line} on {}: {message}", chip.display())]
    Gpio {
        chip: PathBuf,
        line: u32,
        message: String,
    },

    #[error("panel start-up failed: {0}")]
    Display(#[from] DisplayError),
}

/// Open the GPS receiver's serial port.
pub fn open_gps(settings: &GpsSettings) -> Result<GpsReader, HardwareError> {
    let port = serialport::new(&settings.device, settings.baud_rate)
        .timeout(Duration::from_millis(settings.read_timeout_ms))
        .open()
        .map_err(|source| HardwareError::Serial {
            device: settings.device.clone(),
            source,
        })?;

    info!(
        device = %settings.device,
        baud_rate = settings.baud_rate,
        "GPS serial port opened"
    );
    Ok(BufReader::new(port))
}

/// Open the SPI bus and control lines, then reset and configure the panel.
pub fn open_panel(config: &ConfigFile) -> Result<LinuxPanel, HardwareError> {
    let settings = &config.display;
    let spi = open_spi(settings)?;
    let pins = PanelPins {
        dc: output_line(settings, settings.dc_pin)?,
        rst: output_line(settings, settings.rst_pin)?,
        cs: output_line(settings, settings.cs_pin)?,
    };

    info!(
        spi = %settings.spi_device.display(),
        speed_hz = settings.spi_speed_hz,
        dc = settings.dc_pin,
        rst = settings.rst_pin,
        cs = settings.cs_pin,
        "Panel interface opened"
    );
    Ok(St7796::new(spi, pins, Delay, config.st7796_config())?)
}

fn open_spi(settings: &DisplaySettings) -> Result<SpidevBus, HardwareError> {
    let spi_error = |e: &dyn std::fmt::Debug| HardwareError::Spi {
        device: settings.spi_device.clone(),
        message: format!("{:?}", e),
    };

    let mut bus = SpidevBus::open(&settings.spi_device).map_err(|e| spi_error(&e))?;
    // Chip select is a GPIO line driven by the panel driver
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(settings.spi_speed_hz)
        .mode(SpiModeFlags::SPI_MODE_0 | SpiModeFlags::SPI_NO_CS)
        .build();
    bus.configure(&options).map_err(|e| spi_error(&e))?;
    Ok(bus)
}

fn output_line(settings: &DisplaySettings, line: u32) -> Result<CdevPin, HardwareError> {
    let gpio_error = |e: &dyn std::fmt::Debug| HardwareError::Gpio {
        chip: settings.gpio_chip.clone(),
        line,
        message: format!("{:?}", e),
    };

    let mut chip = Chip::new(&settings.gpio_chip).map_err(|e| gpio_error(&e))?;
    let handle = chip
        .get_line(line)
        .and_then(|l| l.request(LineRequestFlags::OUTPUT, 1, GPIO_CONSUMER))
        .map_err(|e| gpio_error(&e))?;
    CdevPin::new(handle).map_err(|e| gpio_error(&e))
}
