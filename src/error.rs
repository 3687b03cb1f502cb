//! # Error Types
//!
//! Custom error types for magjoy using `thiserror`.
//!
//! Only the fallible edges of the crate return these: configuration I/O,
//! the serial sensor link and telemetry files. The per-tick joystick pipeline
//! never fails; it degrades instead.

use thiserror::Error;

/// Main error type for magjoy
#[derive(Debug, Error)]
pub enum JoystickError {
    /// Sensor link framing errors
    #[error("Sensor link error: {0}")]
    SensorLink(String),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(String),

    /// No usable serial device among the candidates
    #[error("No sensor bridge found (tried: {0})")]
    SerialPortNotFound(String),

    /// No sample arrived from the sensor bridge in time
    #[error("Sensor bridge sent no sample within {0} ms")]
    SensorTimeout(u64),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration serialization errors
    #[error("Configuration save error: {0}")]
    ConfigSave(#[from] toml::ser::Error),

    /// Telemetry record serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for magjoy
pub type Result<T> = std::result::Result<T, JoystickError>;
