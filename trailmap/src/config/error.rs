//! Configuration errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors loading, saving or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// A key holds a value of the wrong type.
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The key is not a known `section.key` name.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Values parse individually but do not work together.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
