//! # Error Types
//!
//! Custom error types for Field Logger using `thiserror`.

use thiserror::Error;

/// Main error type for Field Logger
#[derive(Debug, Error)]
pub enum FieldLoggerError {
    /// NMEA sentence errors (framing, checksum, field syntax)
    #[error("NMEA error: {0}")]
    Nmea(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// None of the candidate serial ports could be opened
    #[error("No serial port could be opened (tried: {0})")]
    SerialPortNotFound(String),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// Sensor driver not found or not responding at startup
    #[error("Sensor initialization failed: {0}")]
    SensorInit(String),

    /// Sensor read failed during a cycle
    #[error("Sensor read failed: {0}")]
    SensorRead(String),

    /// Persistent log could not be opened or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Field Logger
pub type Result<T> = std::result::Result<T, FieldLoggerError>;
