//! CLI error type.

use std::fmt;

use trailmap::config::ConfigError;
use trailmap::logging::LoggingError;
use trailmap::render::RenderError;
use trailmap::tiles::TileError;

/// Errors surfaced to the user by the CLI.
#[derive(Debug)]
pub enum CliError {
    /// Invalid arguments or settings.
    Config(String),
    /// The configuration file could not be read, written or validated.
    ConfigFile(ConfigError),
    Logging(LoggingError),
    Tiles(TileError),
    Render(RenderError),
    /// Writing a snapshot image failed.
    Snapshot(image::ImageError),
    #[cfg(target_os = "linux")]
    Hardware(trailmap::hardware::HardwareError),
    /// The command is not available on this platform.
    #[cfg_attr(target_os = "linux", allow(dead_code))]
    Unsupported(&'static str),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "{}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::Tiles(e) => write!(f, "Tile database error: {}", e),
            CliError::Render(e) => write!(f, "Render failed: {}", e),
            CliError::Snapshot(e) => write!(f, "Failed to write snapshot: {}", e),
            #[cfg(target_os = "linux")]
            CliError::Hardware(e) => write!(f, "Hardware error: {}", e),
            CliError::Unsupported(what) => write!(f, "Not supported on this platform: {}", what),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Logging(e) => Some(e),
            CliError::Tiles(e) => Some(e),
            CliError::Render(e) => Some(e),
            CliError::Snapshot(e) => Some(e),
            #[cfg(target_os = "linux")]
            CliError::Hardware(e) => Some(e),
            CliError::Config(_) | CliError::Unsupported(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<TileError> for CliError {
    fn from(e: TileError) -> Self {
        CliError::Tiles(e)
    }
}

impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        CliError::Render(e)
    }
}

#[cfg(target_os = "linux")]
impl From<trailmap::hardware::HardwareError> for CliError {
    fn from(e: trailmap::hardware::HardwareError) -> Self {
        CliError::Hardware(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailmap::coord::TileKey;

    #[test]
    fn test_config_message_is_shown_verbatim() {
        let err = CliError::Config("zoom must be set".to_string());
        assert_eq!(err.to_string(), "zoom must be set");
    }

    #[test]
    fn test_wrapped_errors_keep_source() {
        let err = CliError::from(TileError::NotFound(TileKey::new(3, 1, 2)));
        assert_eq!(
            err.to_string(),
            "Tile database error: tile 3/1/2 not found in tile database"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
