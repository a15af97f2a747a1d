//! Error types for serial port operations.
//!
//! Misuse of the handle (opening twice, using it while closed) is reported
//! with dedicated variants so callers can tell programming errors apart from
//! OS-level failures.

use std::time::Duration;

use thiserror::Error;

/// Convenient `Result` type for port operations.
pub type Result<T> = std::result::Result<T, PortError>;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// Attempted to open a port that's already open.
    #[error("serial port is already open")]
    AlreadyOpen,

    /// Attempted to use a port that's not open.
    #[error("serial port is not open")]
    NotOpen,

    /// Opening the device or applying the initial line settings failed.
    #[error("failed to open serial port: {0}")]
    OpenFailed(String),

    /// The requested baud rate was rejected by the OS, or the device did not
    /// accept the rate that was set.
    #[error("unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// A settings value was outside the legal set, or the OS rejected a
    /// settings write as invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A bounded read elapsed without any data arriving.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortError {
    /// Create an `OpenFailed` error from the underlying OS error.
    pub fn open_failed(source: impl std::fmt::Display) -> Self {
        Self::OpenFailed(source.to_string())
    }

    /// Create an `InvalidArgument` error from a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Returns `true` for errors caused by misusing the handle rather than
    /// by an OS failure.
    pub fn is_misuse(&self) -> bool {
        matches!(self, Self::AlreadyOpen | Self::NotOpen)
    }
}
