//! Error types for protocol parsing

use thiserror::Error;

/// Errors that can occur while parsing an incoming command frame
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Frame shorter than the minimum command length
    #[error("command too short: {0:?}")]
    CommandTooShort(String),

    /// Command code not in the dispatch table
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Frequency field malformed or outside the tunable range
    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    /// Mode value outside the supported set
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// Numeric angle field malformed
    #[error("invalid angle: {0:?}")]
    InvalidAngle(String),

    /// Angle outside the rotator's mechanical range
    #[error("angle out of range: {0}")]
    AngleOutOfRange(i32),

    /// Parameter field malformed for the given command
    #[error("invalid parameter for {command}: {params:?}")]
    InvalidParameter {
        /// Two-letter command code
        command: String,
        /// Raw parameter bytes as received
        params: String,
    },
}
