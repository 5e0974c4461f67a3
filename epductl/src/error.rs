//! Error types for epductl.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Main error type for epductl operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Failure while establishing the SSH connection
    #[error("Connection error: {0}")]
    Connect(#[from] ConnectError),

    /// Failure on an established shell session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Device identity did not pass validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid builder configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while connecting and authenticating.
///
/// None of these are retried; a caller that wants another attempt opens a
/// fresh connection.
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Connecting or handshaking took longer than the configured timeout
    #[error("{host}:{port} timed out after {after:?}")]
    Timeout {
        host: String,
        port: u16,
        after: Duration,
    },

    /// The server's host key is unknown (strict mode) or does not match known_hosts
    #[error("Host key for {host}:{port} could not be verified: {reason}")]
    HostKeyRejected {
        host: String,
        port: u16,
        reason: String,
    },

    /// The server refused the credentials
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// The private key could not be loaded
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// SSH protocol or network failure
    #[error("Unable to establish SSH connection: {0}")]
    Transport(#[from] russh::Error),
}

/// Errors on an open shell session.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The session was already closed
    #[error("Session not connected")]
    NotConnected,

    /// The device closed the channel
    #[error("Channel closed by device")]
    Closed,

    /// No prompt arrived after the shell was requested
    #[error("No prompt received within {0:?}")]
    PromptTimeout(Duration),

    /// The login banner ended without a prompt line
    #[error("Login banner contained no prompt")]
    NoPrompt,

    /// The device did not re-display its prompt after a command
    #[error("No complete reply to '{command}' within {after:?}")]
    ResponseTimeout { command: String, after: Duration },

    /// The command text cannot be sent as a single line
    #[error("Command must be a single line: {command:?}")]
    InvalidCommand { command: String },

    /// SSH error while reading from or writing to the channel
    #[error("Channel SSH error: {0}")]
    Channel(#[from] russh::Error),
}

/// Identity fields checked during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    FirmwareVersion,
    SerialNumber,
    PartNumber,
    OutletCount,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FirmwareVersion => "FW version",
            Self::SerialNumber => "Serial Number",
            Self::PartNumber => "Part Number",
            Self::OutletCount => "Outlet Count",
        };
        f.write_str(name)
    }
}

/// Device identity validation failures. Each carries the offending value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("FW version '{0}'")]
    InvalidFirmwareVersion(String),

    #[error("Serial Number '{0}'")]
    InvalidSerialNumber(String),

    #[error("Part Number '{0}' is not supported")]
    InvalidPartNumber(String),

    #[error("Outlet Count '{0}' is not a positive integer")]
    InvalidOutletCount(String),
}

impl ValidationError {
    /// The identity field that failed.
    pub fn field(&self) -> IdentityField {
        match self {
            Self::InvalidFirmwareVersion(_) => IdentityField::FirmwareVersion,
            Self::InvalidSerialNumber(_) => IdentityField::SerialNumber,
            Self::InvalidPartNumber(_) => IdentityField::PartNumber,
            Self::InvalidOutletCount(_) => IdentityField::OutletCount,
        }
    }

    /// The value the device reported.
    pub fn value(&self) -> &str {
        match self {
            Self::InvalidFirmwareVersion(v)
            | Self::InvalidSerialNumber(v)
            | Self::InvalidPartNumber(v)
            | Self::InvalidOutletCount(v) => v,
        }
    }
}

/// Builder misuse.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required builder field was not set
    #[error("{0} is required")]
    Missing(&'static str),
}

/// Result type alias using epductl's Error.
pub type Result<T> = std::result::Result<T, Error>;
