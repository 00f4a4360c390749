//! # Error Types
//!
//! Error types for setup code (configuration, serial port) using `thiserror`.
//!
//! The protocol engine itself never returns errors: malformed input is
//! dropped and only shows up in the engine counters.

use thiserror::Error;

/// Main error type for iBUS telemetry setup
#[derive(Debug, Error)]
pub enum IbusError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for iBUS telemetry
pub type Result<T> = std::result::Result<T, IbusError>;
