//! # Configuration Module
//!
//! Handles loading, validating and saving configuration as TOML.
//!
//! The file is both input and output: a calibration run writes the captured
//! points back into the `[calibration]` section so they survive restarts.

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::Path;

use crate::error::{JoystickError, Result};
use crate::joystick::calibration::CalibrationSet;
use crate::joystick::controller::{JoystickSettings, CENTER_BUFFER_SIZE};
use crate::joystick::direction::Direction;
use crate::joystick::point::FloatPoint;
use crate::joystick::response::{OperatingMode, MAX_SPEED_LEVEL};

/// Largest calibration coordinate accepted from the file, in mT.
const MAX_CALIBRATION_MT: f64 = 130.0;

/// Calibration values are stored to 0.001 mT.
const CALIBRATION_DECIMALS: f64 = 1000.0;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub joystick: JoystickConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Sensor bridge link configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Device path, or "auto"
    #[serde(default = "default_sensor_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// How long to wait for the first sample at startup
    #[serde(default = "default_startup_timeout_ms")]
    pub startup_timeout_ms: u64,
}

/// Joystick pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoystickConfig {
    #[serde(default)]
    pub operating_mode: OperatingMode,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,

    #[serde(default = "default_deadzone_enabled")]
    pub deadzone_enabled: bool,

    #[serde(default = "default_deadzone_factor")]
    pub deadzone_factor: f64,

    #[serde(default = "default_speed_level")]
    pub speed_level: u8,

    #[serde(default)]
    pub direction_x: Direction,

    #[serde(default)]
    pub direction_y: Direction,
}

/// Stored calibration points, in mT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    #[serde(default)]
    pub center: [f64; 2],

    /// Top left, top right, bottom right, bottom left
    #[serde(default)]
    pub corners: [[f64; 2]; 4],

    /// Time spent capturing each corner during calibration
    #[serde(default = "default_corner_hold_ms")]
    pub corner_hold_ms: u64,

    /// Resting samples averaged into the center
    #[serde(default = "default_center_samples")]
    pub center_samples: u32,
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,

    #[serde(default = "default_log_interval_ms")]
    pub log_interval_ms: u64,

    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_sensor_port() -> String { "auto".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_startup_timeout_ms() -> u64 { 2000 }

fn default_poll_interval_ms() -> u64 { 10 }
fn default_status_interval_ms() -> u64 { 1000 }
fn default_deadzone_enabled() -> bool { true }
fn default_deadzone_factor() -> f64 { 0.05 }
fn default_speed_level() -> u8 { 5 }

fn default_corner_hold_ms() -> u64 { 3000 }
fn default_center_samples() -> u32 { CENTER_BUFFER_SIZE as u32 }

fn default_telemetry_enabled() -> bool { false }
fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }
fn default_log_interval_ms() -> u64 { 100 }
fn default_log_format() -> String { "jsonl".to_string() }

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            port: default_sensor_port(),
            baud_rate: default_baud_rate(),
            startup_timeout_ms: default_startup_timeout_ms(),
        }
    }
}

impl Default for JoystickConfig {
    fn default() -> Self {
        Self {
            operating_mode: OperatingMode::default(),
            poll_interval_ms: default_poll_interval_ms(),
            status_interval_ms: default_status_interval_ms(),
            deadzone_enabled: default_deadzone_enabled(),
            deadzone_factor: default_deadzone_factor(),
            speed_level: default_speed_level(),
            direction_x: Direction::Default,
            direction_y: Direction::Default,
        }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            center: [0.0; 2],
            corners: [[0.0; 2]; 4],
            corner_hold_ms: default_corner_hold_ms(),
            center_samples: default_center_samples(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
            log_interval_ms: default_log_interval_ms(),
            format: default_log_format(),
        }
    }
}

/// Sensor reading in mT, rounded for storage.
fn round_mt(value: f32) -> f64 {
    (f64::from(value) * CALIBRATION_DECIMALS).round() / CALIBRATION_DECIMALS
}

fn invalid(msg: impl Display) -> JoystickError {
    JoystickError::Config(toml::de::Error::custom(msg))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use magjoy::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate and write the configuration to a TOML file
    ///
    /// The file is rewritten from the parsed values; comments are not kept.
    ///
    /// # Errors
    ///
    /// Returns error if validation, serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.validate()?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    fn validate(&self) -> Result<()> {
        // Sensor link
        if self.sensor.port.is_empty() {
            return Err(invalid("sensor port cannot be empty (use \"auto\" to detect)"));
        }

        if ![9600, 57600, 115200, 230400, 460800, 921600].contains(&self.sensor.baud_rate) {
            return Err(invalid(
                "baud_rate must be one of: 9600, 57600, 115200, 230400, 460800, 921600",
            ));
        }

        if self.sensor.startup_timeout_ms == 0 || self.sensor.startup_timeout_ms > 60000 {
            return Err(invalid("startup_timeout_ms must be between 1 and 60000"));
        }

        // Joystick
        if self.joystick.poll_interval_ms == 0 || self.joystick.poll_interval_ms > 1000 {
            return Err(invalid("poll_interval_ms must be between 1 and 1000"));
        }

        if self.joystick.status_interval_ms < 100 || self.joystick.status_interval_ms > 60000 {
            return Err(invalid("status_interval_ms must be between 100 and 60000"));
        }

        if !(0.0..=1.0).contains(&self.joystick.deadzone_factor) {
            return Err(invalid("deadzone_factor must be between 0.0 and 1.0"));
        }

        if self.joystick.speed_level > MAX_SPEED_LEVEL {
            return Err(invalid(format!("speed_level must be between 0 and {}", MAX_SPEED_LEVEL)));
        }

        for (name, direction) in [
            ("direction_x", self.joystick.direction_x),
            ("direction_y", self.joystick.direction_y),
        ] {
            if direction == Direction::Fault {
                return Err(invalid(format!("{} must be 'default' or 'inverse'", name)));
            }
        }

        // Calibration
        let points = std::iter::once(&self.calibration.center).chain(self.calibration.corners.iter());
        for point in points {
            for &value in point {
                if !value.is_finite() || value.abs() > MAX_CALIBRATION_MT {
                    return Err(invalid(format!(
                        "calibration values must be finite and within ±{} mT",
                        MAX_CALIBRATION_MT
                    )));
                }
            }
        }

        if self.calibration.corner_hold_ms < 100 || self.calibration.corner_hold_ms > 30000 {
            return Err(invalid("corner_hold_ms must be between 100 and 30000"));
        }

        if self.calibration.center_samples == 0
            || self.calibration.center_samples as usize > CENTER_BUFFER_SIZE
        {
            return Err(invalid(format!(
                "center_samples must be between 1 and {}",
                CENTER_BUFFER_SIZE
            )));
        }

        // Telemetry
        if self.telemetry.enabled && self.telemetry.log_dir.is_empty() {
            return Err(invalid("telemetry log_dir cannot be empty when enabled"));
        }

        if self.telemetry.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.telemetry.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        if self.telemetry.log_interval_ms == 0 || self.telemetry.log_interval_ms > 60000 {
            return Err(invalid("log_interval_ms must be between 1 and 60000"));
        }

        if self.telemetry.format != "jsonl" {
            return Err(invalid("log format must be 'jsonl' (only supported format)"));
        }

        Ok(())
    }

    /// Stored calibration points.
    #[must_use]
    pub fn calibration_set(&self) -> CalibrationSet {
        let point = |p: [f64; 2]| FloatPoint::new(p[0] as f32, p[1] as f32);
        CalibrationSet::new(
            point(self.calibration.center),
            self.calibration.corners.map(point),
        )
    }

    /// Replace the stored calibration points.
    pub fn set_calibration(&mut self, calibration: &CalibrationSet) {
        let stored = |p: FloatPoint| [round_mt(p.x), round_mt(p.y)];
        self.calibration.center = stored(calibration.center());
        self.calibration.corners = calibration.corners().map(stored);
    }

    /// Controller settings for this configuration.
    #[must_use]
    pub fn joystick_settings(&self) -> JoystickSettings {
        JoystickSettings {
            mode: self.joystick.operating_mode,
            direction_x: self.joystick.direction_x,
            direction_y: self.joystick.direction_y,
            deadzone_enabled: self.joystick.deadzone_enabled,
            deadzone_factor: self.joystick.deadzone_factor as f32,
            speed_level: self.joystick.speed_level,
            calibration: self.calibration_set(),
        }
    }

    /// Corner capture length in polling ticks (at least one).
    #[must_use]
    pub fn corner_hold_ticks(&self) -> u32 {
        let ticks = self.calibration.corner_hold_ms / self.joystick.poll_interval_ms.max(1);
        u32::try_from(ticks).unwrap_or(u32::MAX).max(1)
    }
}
