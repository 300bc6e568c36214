//! Error types for GPS decoding.

use std::io;

use thiserror::Error;

/// Reasons a single NMEA line could not be turned into a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SentenceParseError {
    /// The line does not begin with `$`.
    #[error("line does not start with '$'")]
    MissingStart,

    /// The `*hh` suffix is not two hexadecimal digits.
    #[error("malformed checksum '{0}'")]
    MalformedChecksum(String),

    /// The transmitted checksum does not match the sentence body.
    #[error("checksum mismatch: expected {expected:02X}, computed {computed:02X}")]
    ChecksumMismatch { expected: u8, computed: u8 },

    /// A required field is absent or empty.
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// A field is present but cannot be interpreted.
    #[error("invalid {field} '{value}'")]
    InvalidField { field: &'static str, value: String },
}

/// Errors returned while waiting for a GPS fix.
#[derive(Debug, Error)]
pub enum GpsError {
    /// A line could not be parsed.
    ///
    /// The decoder skips these lines; the variant surfaces only from
    /// [`decode_line`](super::decode_line).
    #[error("unparseable NMEA sentence: {0}")]
    Parse(#[from] SentenceParseError),

    /// The line budget ran out before a usable sentence arrived.
    #[error("no GPS fix after {attempts} line reads")]
    FixTimeout { attempts: u32 },

    /// The serial stream failed.
    #[error("GPS transport error: {0}")]
    Transport(#[from] io::Error),
}

impl GpsError {
    /// Whether this error is a read time-out rather than a broken stream.
    pub fn is_timeout(&self) -> bool {
        match self {
            GpsError::FixTimeout { .. } => true,
            GpsError::Transport(e) => matches!(
                e.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
            ),
            GpsError::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_mismatch_display() {
        let err = SentenceParseError::ChecksumMismatch {
            expected: 0x6A,
            computed: 0x0B,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected 6A, computed 0B"
        );
    }

    #[test]
    fn test_fix_timeout_display() {
        let err = GpsError::FixTimeout { attempts: 20 };
        assert_eq!(err.to_string(), "no GPS fix after 20 line reads");
    }

    #[test]
    fn test_timeout_classification() {
        assert!(GpsError::FixTimeout { attempts: 1 }.is_timeout());
        assert!(GpsError::Transport(io::Error::from(io::ErrorKind::TimedOut)).is_timeout());
        assert!(!GpsError::Transport(io::Error::from(io::ErrorKind::BrokenPipe)).is_timeout());
        assert!(!GpsError::Parse(SentenceParseError::MissingStart).is_timeout());
    }
}
