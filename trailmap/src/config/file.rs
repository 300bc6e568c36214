//! INI configuration file.
//!
//! ```ini
//! [tiles]
//! path = /home/pi/GPS/maps/samplemap.mbtiles
//! zoom = 15
//! tile_size = 256
//! cache_tiles = 256
//!
//! [screen]
//! width = 480
//! height = 320
//!
//! [gps]
//! device = /dev/ttyAMA0
//! baud_rate = 115200
//! read_timeout_ms = 1000
//! max_lines = 20
//!
//! [display]
//! spi_device = /dev/spidev0.0
//! spi_speed_hz = 40000000
//! chunk_size = 4096
//! rotation = 0
//! gpio_chip = /dev/gpiochip0
//! dc_pin = 24
//! rst_pin = 25
//! cs_pin = 8
//!
//! [render]
//! interval_secs = 3
//! retry_initial_ms = 2000
//! retry_max_secs = 60
//! max_fatal_failures = 5
//!
//! [logging]
//! level = info
//! file = /var/log/trailmap.log
//! ```
//!
//! Missing keys fall back to their defaults; a missing file is the same as
//! an empty one.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::{ConfigError, ConfigKey};
use crate::compose::{canvas_side, ScreenSize};
use crate::coord::MAX_ZOOM;
use crate::display::{Rotation, St7796Config, DEFAULT_CHUNK_SIZE};
use crate::gps::{GpsDecoder, DEFAULT_MAX_LINES};
use crate::render::{
    Backoff, RenderLoopConfig, DEFAULT_INITIAL_DELAY_MS, DEFAULT_INTERVAL_SECS,
    DEFAULT_MAX_DELAY_SECS, DEFAULT_MAX_FATAL_FAILURES,
};
use crate::tiles::DEFAULT_CACHE_TILES;

/// Location of the configuration file: `<config dir>/trailmap/config.ini`.
///
/// Falls back to the working directory when the platform has no
/// configuration directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trailmap")
        .join("config.ini")
}

/// `[tiles]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesSettings {
    /// MBTiles database.
    pub path: PathBuf,
    pub zoom: u8,
    /// Tile side length in pixels.
    pub tile_size: u32,
    /// Maximum decoded tiles kept in memory.
    pub cache_tiles: u64,
}

impl Default for TilesSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/home/pi/GPS/maps/samplemap.mbtiles"),
            zoom: 15,
            tile_size: 256,
            cache_tiles: DEFAULT_CACHE_TILES,
        }
    }
}

/// `[screen]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            width: 480,
            height: 320,
        }
    }
}

/// `[gps]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpsSettings {
    /// Serial device of the receiver.
    pub device: String,
    pub baud_rate: u32,
    /// Per-read serial time-out.
    pub read_timeout_ms: u64,
    /// Line budget per fix.
    pub max_lines: u32,
}

impl Default for GpsSettings {
    fn default() -> Self {
        Self {
            device: "/dev/ttyAMA0".to_string(),
            baud_rate: 115_200,
            read_timeout_ms: 1_000,
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

/// `[display]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySettings {
    pub spi_device: PathBuf,
    pub spi_speed_hz: u32,
    pub chunk_size: usize,
    pub rotation: Rotation,
    /// GPIO character device holding the control lines.
    pub gpio_chip: PathBuf,
    /// Line offsets (BCM numbering on a Raspberry Pi).
    pub dc_pin: u32,
    pub rst_pin: u32,
    pub cs_pin: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            spi_device: PathBuf::from("/dev/spidev0.0"),
            spi_speed_hz: 40_000_000,
            chunk_size: DEFAULT_CHUNK_SIZE,
            rotation: Rotation::Deg0,
            gpio_chip: PathBuf::from("/dev/gpiochip0"),
            dc_pin: 24,
            rst_pin: 25,
            cs_pin: 8,
        }
    }
}

/// `[render]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    pub interval_secs: u64,
    pub retry_initial_ms: u64,
    pub retry_max_secs: u64,
    pub max_fatal_failures: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            retry_initial_ms: DEFAULT_INITIAL_DELAY_MS,
            retry_max_secs: DEFAULT_MAX_DELAY_SECS,
            max_fatal_failures: DEFAULT_MAX_FATAL_FAILURES,
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Log file; stderr only when unset.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub tiles: TilesSettings,
    pub screen: ScreenSettings,
    pub gps: GpsSettings,
    pub display: DisplaySettings,
    pub render: RenderSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from [`config_file_path`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed INI and
    /// [`ConfigError::InvalidValue`] for values of the wrong type.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Write every key to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini.write_to_file(path).map_err(io_error)?;

        debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Check that the values work together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));

        if self.tiles.zoom > MAX_ZOOM {
            return invalid(format!(
                "zoom {} exceeds the maximum of {}",
                self.tiles.zoom, MAX_ZOOM
            ));
        }
        if self.tiles.tile_size == 0 {
            return invalid("tile_size must be positive".to_string());
        }
        if self.tiles.cache_tiles == 0 {
            return invalid("cache_tiles must be positive".to_string());
        }
        if self.screen.width == 0 || self.screen.height == 0 {
            return invalid(format!(
                "screen {}×{} has no pixels",
                self.screen.width, self.screen.height
            ));
        }
        let canvas = canvas_side(self.tiles.tile_size);
        if self.screen.width > canvas || self.screen.height > canvas {
            return invalid(format!(
                "screen {}×{} does not fit the {}×{} tile canvas",
                self.screen.width, self.screen.height, canvas, canvas
            ));
        }
        if self.gps.baud_rate == 0 {
            return invalid("baud_rate must be positive".to_string());
        }
        if self.gps.max_lines == 0 {
            return invalid("max_lines must be positive".to_string());
        }
        if self.display.spi_speed_hz == 0 {
            return invalid("spi_speed_hz must be positive".to_string());
        }
        if self.display.chunk_size == 0 {
            return invalid("chunk_size must be positive".to_string());
        }
        if self.render.max_fatal_failures == 0 {
            return invalid("max_fatal_failures must be positive".to_string());
        }
        Ok(())
    }

    pub fn screen_size(&self) -> ScreenSize {
        ScreenSize::new(self.screen.width, self.screen.height)
    }

    /// Panel settings for the ST7796 driver.
    pub fn st7796_config(&self) -> St7796Config {
        St7796Config::default()
            .with_size(self.screen.width, self.screen.height)
            .with_rotation(self.display.rotation)
            .with_chunk_size(self.display.chunk_size)
    }

    pub fn gps_decoder(&self) -> GpsDecoder {
        GpsDecoder::new(self.gps.max_lines)
    }

    pub fn render_loop_config(&self) -> RenderLoopConfig {
        RenderLoopConfig {
            interval: Duration::from_secs(self.render.interval_secs),
            backoff: Backoff::new(
                Duration::from_millis(self.render.retry_initial_ms),
                Duration::from_secs(self.render.retry_max_secs),
            ),
            max_fatal_failures: self.render.max_fatal_failures,
        }
    }
}
