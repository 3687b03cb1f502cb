//! # Telemetry Module
//!
//! Records the joystick pipeline to JSONL files with rotation.
//!
//! This module handles:
//! - One [`TickRecord`] per sampled tick (raw, mapped and shaped values)
//! - Formatting as JSONL (JSON Lines)
//! - Writing to rotating log files
//! - Managing file rotation (max N records per file)
//! - Retaining only last M files

pub mod logger;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::joystick::controller::JoystickController;
use crate::joystick::point::{FloatPoint, IntPoint};
use crate::joystick::response::OperatingMode;
use crate::sensor::MagneticSensor;

pub use logger::TelemetryLogger;

/// Snapshot of one pipeline tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub timestamp: DateTime<Utc>,
    pub mode: OperatingMode,
    /// Raw reading in joystick axes, mT
    pub raw: FloatPoint,
    /// Mapped input, [-1024, 1024]
    pub input: IntPoint,
    /// Shaped output
    pub output: IntPoint,
    /// Whether the change-skip filter dropped this tick
    pub skipped: bool,
}

impl TickRecord {
    /// Capture the controller's latest committed values.
    #[must_use]
    pub fn capture<S: MagneticSensor>(joystick: &JoystickController<S>) -> Self {
        Self {
            timestamp: Utc::now(),
            mode: joystick.operating_mode(),
            raw: joystick.raw_point(),
            input: joystick.input_point(),
            output: joystick.output_point(),
            skipped: joystick.last_update_skipped(),
        }
    }
}
