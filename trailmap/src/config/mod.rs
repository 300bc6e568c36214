//! Configuration file handling.
//!
//! Settings live in an INI file at [`config_file_path`]. Command-line
//! arguments override file values when specified.
//!
//! # Example
//!
//! ```ignore
//! use trailmap::config::ConfigFile;
//!
//! let config = ConfigFile::load().unwrap_or_default();
//! config.validate()?;
//! println!("tiles from {}", config.tiles.path.display());
//! ```

mod error;
mod file;
mod keys;

pub use error::ConfigError;
pub use file::{
    config_file_path, ConfigFile, DisplaySettings, GpsSettings, LoggingSettings, RenderSettings,
    ScreenSettings, TilesSettings,
};
pub use keys::ConfigKey;
