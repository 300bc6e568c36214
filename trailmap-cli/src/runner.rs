//! Shared command setup: configuration and logging.

use std::path::PathBuf;

use tracing::info;
use trailmap::config::{config_file_path, ConfigFile};
use trailmap::logging::{init_logging, LoggingGuard};

use crate::error::CliError;

/// Loaded configuration plus the logging guard for the command's lifetime.
pub struct CliRunner {
    config: ConfigFile,
    config_path: PathBuf,
    _log_guard: LoggingGuard,
}

impl CliRunner {
    /// Load the configuration (default location unless `config_path` is
    /// given) and install logging.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(config_file_path);
        let config = ConfigFile::load_from(&config_path)?;
        let log_guard = init_logging(&config.logging)?;

        Ok(Self {
            config,
            config_path,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Apply command-line overrides before [`CliRunner::validate`].
    pub fn config_mut(&mut self) -> &mut ConfigFile {
        &mut self.config
    }

    /// Validate the effective configuration.
    pub fn validate(&self) -> Result<(), CliError> {
        self.config.validate()?;
        Ok(())
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = trailmap::VERSION,
            command,
            config = %self.config_path.display(),
            "Trailmap starting"
        );
    }
}
