//! Typed access to individual configuration keys.
//!
//! Each [`ConfigKey`] names one `section.key` entry and knows how to read it
//! from, and write it to, a [`ConfigFile`]. Loading and saving the INI file
//! goes through the same accessors, so the key table is the single list of
//! supported settings.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};
use crate::display::Rotation;

/// A configuration key in `section.key` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    TilesPath,
    TilesZoom,
    TilesTileSize,
    TilesCacheTiles,
    ScreenWidth,
    ScreenHeight,
    GpsDevice,
    GpsBaudRate,
    GpsReadTimeoutMs,
    GpsMaxLines,
    DisplaySpiDevice,
    DisplaySpiSpeedHz,
    DisplayChunkSize,
    DisplayRotation,
    DisplayGpioChip,
    DisplayDcPin,
    DisplayRstPin,
    DisplayCsPin,
    RenderIntervalSecs,
    RenderRetryInitialMs,
    RenderRetryMaxSecs,
    RenderMaxFatalFailures,
    LoggingLevel,
    LoggingFile,
}

const ALL_KEYS: [ConfigKey; 24] = [
    ConfigKey::TilesPath,
    ConfigKey::TilesZoom,
    ConfigKey::TilesTileSize,
    ConfigKey::TilesCacheTiles,
    ConfigKey::ScreenWidth,
    ConfigKey::ScreenHeight,
    ConfigKey::GpsDevice,
    ConfigKey::GpsBaudRate,
    ConfigKey::GpsReadTimeoutMs,
    ConfigKey::GpsMaxLines,
    ConfigKey::DisplaySpiDevice,
    ConfigKey::DisplaySpiSpeedHz,
    ConfigKey::DisplayChunkSize,
    ConfigKey::DisplayRotation,
    ConfigKey::DisplayGpioChip,
    ConfigKey::DisplayDcPin,
    ConfigKey::DisplayRstPin,
    ConfigKey::DisplayCsPin,
    ConfigKey::RenderIntervalSecs,
    ConfigKey::RenderRetryInitialMs,
    ConfigKey::RenderRetryMaxSecs,
    ConfigKey::RenderMaxFatalFailures,
    ConfigKey::LoggingLevel,
    ConfigKey::LoggingFile,
];

impl ConfigKey {
    /// Every key, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::TilesPath => "tiles.path",
            ConfigKey::TilesZoom => "tiles.zoom",
            ConfigKey::TilesTileSize => "tiles.tile_size",
            ConfigKey::TilesCacheTiles => "tiles.cache_tiles",
            ConfigKey::ScreenWidth => "screen.width",
            ConfigKey::ScreenHeight => "screen.height",
            ConfigKey::GpsDevice => "gps.device",
            ConfigKey::GpsBaudRate => "gps.baud_rate",
            ConfigKey::GpsReadTimeoutMs => "gps.read_timeout_ms",
            ConfigKey::GpsMaxLines => "gps.max_lines",
            ConfigKey::DisplaySpiDevice => "display.spi_device",
            ConfigKey::DisplaySpiSpeedHz => "display.spi_speed_hz",
            ConfigKey::DisplayChunkSize => "display.chunk_size",
            ConfigKey::DisplayRotation => "display.rotation",
            ConfigKey::DisplayGpioChip => "display.gpio_chip",
            ConfigKey::DisplayDcPin => "display.dc_pin",
            ConfigKey::DisplayRstPin => "display.rst_pin",
            ConfigKey::DisplayCsPin => "display.cs_pin",
            ConfigKey::RenderIntervalSecs => "render.interval_secs",
            ConfigKey::RenderRetryInitialMs => "render.retry_initial_ms",
            ConfigKey::RenderRetryMaxSecs => "render.retry_max_secs",
            ConfigKey::RenderMaxFatalFailures => "render.max_fatal_failures",
            ConfigKey::LoggingLevel => "logging.level",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// INI section.
    pub fn section(&self) -> &'static str {
        self.split().0
    }

    /// Key within the section.
    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or(("", name))
    }

    /// Current value rendered as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::TilesPath => config.tiles.path.display().to_string(),
            ConfigKey::TilesZoom => config.tiles.zoom.to_string(),
            ConfigKey::TilesTileSize => config.tiles.tile_size.to_string(),
            ConfigKey::TilesCacheTiles => config.tiles.cache_tiles.to_string(),
            ConfigKey::ScreenWidth => config.screen.width.to_string(),
            ConfigKey::ScreenHeight => config.screen.height.to_string(),
            ConfigKey::GpsDevice => config.gps.device.clone(),
            ConfigKey::GpsBaudRate => config.gps.baud_rate.to_string(),
            ConfigKey::GpsReadTimeoutMs => config.gps.read_timeout_ms.to_string(),
            ConfigKey::GpsMaxLines => config.gps.max_lines.to_string(),
            ConfigKey::DisplaySpiDevice => config.display.spi_device.display().to_string(),
            ConfigKey::DisplaySpiSpeedHz => config.display.spi_speed_hz.to_string(),
            ConfigKey::DisplayChunkSize => config.display.chunk_size.to_string(),
            ConfigKey::DisplayRotation => config.display.rotation.degrees().to_string(),
            ConfigKey::DisplayGpioChip => config.display.gpio_chip.display().to_string(),
            ConfigKey::DisplayDcPin => config.display.dc_pin.to_string(),
            ConfigKey::DisplayRstPin => config.display.rst_pin.to_string(),
            ConfigKey::DisplayCsPin => config.display.cs_pin.to_string(),
            ConfigKey::RenderIntervalSecs => config.render.interval_secs.to_string(),
            ConfigKey::RenderRetryInitialMs => config.render.retry_initial_ms.to_string(),
            ConfigKey::RenderRetryMaxSecs => config.render.retry_max_secs.to_string(),
            ConfigKey::RenderMaxFatalFailures => config.render.max_fatal_failures.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config
                .logging
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Parse `value` and store it in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `value` does not parse as the
    /// key's type.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::TilesPath => config.tiles.path = PathBuf::from(value),
            ConfigKey::TilesZoom => config.tiles.zoom = self.parse(value)?,
            ConfigKey::TilesTileSize => config.tiles.tile_size = self.parse(value)?,
            ConfigKey::TilesCacheTiles => config.tiles.cache_tiles = self.parse(value)?,
            ConfigKey::ScreenWidth => config.screen.width = self.parse(value)?,
            ConfigKey::ScreenHeight => config.screen.height = self.parse(value)?,
            ConfigKey::GpsDevice => config.gps.device = value.to_string(),
            ConfigKey::GpsBaudRate => config.gps.baud_rate = self.parse(value)?,
            ConfigKey::GpsReadTimeoutMs => config.gps.read_timeout_ms = self.parse(value)?,
            ConfigKey::GpsMaxLines => config.gps.max_lines = self.parse(value)?,
            ConfigKey::DisplaySpiDevice => config.display.spi_device = PathBuf::from(value),
            ConfigKey::DisplaySpiSpeedHz => config.display.spi_speed_hz = self.parse(value)?,
            ConfigKey::DisplayChunkSize => config.display.chunk_size = self.parse(value)?,
            ConfigKey::DisplayRotation => {
                let degrees: u16 = self.parse(value)?;
                config.display.rotation =
                    Rotation::from_degrees(degrees).ok_or_else(|| ConfigError::InvalidValue {
                        key: self.name().to_string(),
                        value: value.to_string(),
                        reason: "rotation must be 0, 90, 180 or 270".to_string(),
                    })?;
            }
            ConfigKey::DisplayGpioChip => config.display.gpio_chip = PathBuf::from(value),
            ConfigKey::DisplayDcPin => config.display.dc_pin = self.parse(value)?,
            ConfigKey::DisplayRstPin => config.display.rst_pin = self.parse(value)?,
            ConfigKey::DisplayCsPin => config.display.cs_pin = self.parse(value)?,
            ConfigKey::RenderIntervalSecs => config.render.interval_secs = self.parse(value)?,
            ConfigKey::RenderRetryInitialMs => {
                config.render.retry_initial_ms = self.parse(value)?
            }
            ConfigKey::RenderRetryMaxSecs => config.render.retry_max_secs = self.parse(value)?,
            ConfigKey::RenderMaxFatalFailures => {
                config.render.max_fatal_failures = self.parse(value)?
            }
            ConfigKey::LoggingLevel => config.logging.level = value.to_string(),
            ConfigKey::LoggingFile => {
                config.logging.file = (!value.is_empty()).then(|| PathBuf::from(value))
            }
        }
        Ok(())
    }

    fn parse<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: self.name().to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
