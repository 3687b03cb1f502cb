//! # Response Shaper
//!
//! Applies the output deadzone and the speed/range scaling to mapped input
//! coordinates.
//!
//! ## Deadzone
//!
//! The deadzone works at both ends of each axis. Values within
//! `deadzone_value` of zero are forced to zero to stop drift while the user
//! rests; values within `deadzone_value` of full deflection are forced to
//! full deflection so maximum speed does not need a perfect reach.
//!
//! `deadzone_value = round(factor × 1024)` while enabled, `0` otherwise.
//!
//! ## Range
//!
//! The shaped output is rescaled to `[-range_value, range_value]`:
//!
//! - **Mouse**: `range_value = floor(0.125·level² + 0.3·level + 2)` for speed
//!   level 0 to 10, i.e. `[2, 2, 3, 4, 5, 6, 8, 10, 12, 14, 17]`
//! - **Gamepad**: fixed at 127, the speed level is ignored
//!
//! ## Usage
//!
//! ```
//! use magjoy::joystick::point::IntPoint;
//! use magjoy::joystick::response::{OperatingMode, ResponseShaper};
//!
//! let shaper = ResponseShaper::new(OperatingMode::Mouse, true, 0.05, 5);
//! assert_eq!(shaper.deadzone_value(), 51);
//! assert_eq!(shaper.range_value(), 6);
//! assert_eq!(shaper.process(IntPoint::new(512, 0)), IntPoint::new(3, 0));
//! ```

use serde::{Deserialize, Serialize};

use super::geometry::INPUT_XY_MAX;
use super::point::{map_int, IntPoint};

/// Highest speed level.
pub const MAX_SPEED_LEVEL: u8 = 10;

/// Default speed level.
pub const DEFAULT_SPEED_LEVEL: u8 = 5;

/// Output half-range in gamepad mode.
pub const GAMEPAD_OUTPUT_XY_MAX: i32 = 127;

/// Default output deadzone state.
pub const DEFAULT_DEADZONE_ENABLED: bool = true;

/// Default output deadzone factor (5% of full deflection).
pub const DEFAULT_DEADZONE_FACTOR: f32 = 0.05;

/// How the shaped output is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    /// Relative pointer movement; speed level scales the output.
    #[default]
    Mouse,
    /// Absolute gamepad axes at a fixed range.
    Gamepad,
}

/// Range value for a speed level in the given mode.
///
/// Levels above [`MAX_SPEED_LEVEL`] are clamped.
///
/// # Examples
///
/// ```
/// use magjoy::joystick::response::{range_value, OperatingMode};
///
/// assert_eq!(range_value(OperatingMode::Mouse, 0), 2);
/// assert_eq!(range_value(OperatingMode::Mouse, 10), 17);
/// assert_eq!(range_value(OperatingMode::Gamepad, 3), 127);
/// ```
#[must_use]
pub fn range_value(mode: OperatingMode, level: u8) -> i32 {
    match mode {
        OperatingMode::Mouse => {
            let level = f32::from(level.min(MAX_SPEED_LEVEL));
            (0.125 * level * level + 0.3 * level + 2.0) as i32
        }
        OperatingMode::Gamepad => GAMEPAD_OUTPUT_XY_MAX,
    }
}

/// Deadzone and range stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseShaper {
    mode: OperatingMode,
    deadzone_enabled: bool,
    /// Deadzone as a fraction of full deflection (0.0 to 1.0).
    deadzone_factor: f32,
    deadzone_value: i32,
    speed_level: u8,
    range_value: i32,
}

impl Default for ResponseShaper {
    fn default() -> Self {
        Self::new(
            OperatingMode::default(),
            DEFAULT_DEADZONE_ENABLED,
            DEFAULT_DEADZONE_FACTOR,
            DEFAULT_SPEED_LEVEL,
        )
    }
}

impl ResponseShaper {
    /// Creates a shaper.
    ///
    /// # Arguments
    ///
    /// * `mode` - Mouse or gamepad output
    /// * `deadzone_enabled` - Whether the deadzone applies at all
    /// * `deadzone_factor` - Fraction of full deflection (0.0 to 1.0). Values outside this range are clamped.
    /// * `speed_level` - Speed level (0 to 10). Values above 10 are clamped.
    #[must_use]
    pub fn new(mode: OperatingMode, deadzone_enabled: bool, deadzone_factor: f32, speed_level: u8) -> Self {
        let mut shaper = Self {
            mode,
            deadzone_enabled: false,
            deadzone_factor: 0.0,
            deadzone_value: 0,
            speed_level: 0,
            range_value: 0,
        };
        shaper.set_deadzone(deadzone_enabled, deadzone_factor);
        shaper.set_speed_level(speed_level);
        shaper
    }

    #[must_use]
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Switches operating mode and recomputes the range value.
    pub fn set_mode(&mut self, mode: OperatingMode) {
        self.mode = mode;
        self.range_value = range_value(mode, self.speed_level);
    }

    #[must_use]
    pub fn deadzone_enabled(&self) -> bool {
        self.deadzone_enabled
    }

    #[must_use]
    pub fn deadzone_factor(&self) -> f32 {
        self.deadzone_factor
    }

    /// Absolute deadzone threshold in mapped units.
    #[must_use]
    pub fn deadzone_value(&self) -> i32 {
        self.deadzone_value
    }

    /// Enables or disables the deadzone and sets its factor.
    pub fn set_deadzone(&mut self, enabled: bool, factor: f32) {
        let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };
        self.deadzone_enabled = enabled;
        self.deadzone_factor = factor;
        self.deadzone_value = if enabled {
            (INPUT_XY_MAX as f32 * factor).round() as i32
        } else {
            0
        };
    }

    #[must_use]
    pub fn speed_level(&self) -> u8 {
        self.speed_level
    }

    /// Maximum magnitude of the shaped output.
    #[must_use]
    pub fn range_value(&self) -> i32 {
        self.range_value
    }

    /// Sets the speed level (0 to 10) and recomputes the range value.
    pub fn set_speed_level(&mut self, level: u8) {
        self.speed_level = level.min(MAX_SPEED_LEVEL);
        self.range_value = range_value(self.mode, self.speed_level);
    }

    /// Applies the two-sided deadzone to one axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use magjoy::joystick::response::{OperatingMode, ResponseShaper};
    ///
    /// let shaper = ResponseShaper::new(OperatingMode::Mouse, true, 0.05, 5);
    /// assert_eq!(shaper.apply_deadzone(30), 0);
    /// assert_eq!(shaper.apply_deadzone(-1000), -1024);
    /// assert_eq!(shaper.apply_deadzone(400), 400);
    /// ```
    #[must_use]
    pub fn apply_deadzone(&self, value: i32) -> i32 {
        if !self.deadzone_enabled {
            return value;
        }

        if value.abs() < self.deadzone_value {
            0
        } else if value.abs() > INPUT_XY_MAX - self.deadzone_value {
            value.signum() * INPUT_XY_MAX
        } else {
            value
        }
    }

    /// Rescales each axis from `[-1024, 1024]` to `[-range, range]`.
    #[must_use]
    pub fn linearize_output(&self, point: IntPoint) -> IntPoint {
        let range = self.range_value;
        IntPoint::new(
            map_int(point.x, -INPUT_XY_MAX, INPUT_XY_MAX, -range, range),
            map_int(point.y, -INPUT_XY_MAX, INPUT_XY_MAX, -range, range),
        )
    }

    /// Deadzone followed by linearization.
    #[must_use]
    pub fn process(&self, point: IntPoint) -> IntPoint {
        let deadzoned = IntPoint::new(self.apply_deadzone(point.x), self.apply_deadzone(point.y));
        self.linearize_output(deadzoned)
    }
}
