//! # Direction Corrector
//!
//! Resolves the polarity of each magnetic axis into the final x/y sign
//! multipliers applied by the geometry mapper.
//!
//! The z axis tells which way up the magnet faces. It is detected from the
//! sensor at startup: a strong positive field is the default orientation, a
//! strong negative field means the board is mounted flipped, and anything in
//! between means the orientation cannot be determined. That last case is a
//! mounting fault and zeroes both final multipliers, so downstream consumers
//! see a dead joystick at the origin rather than garbage.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Field strength in mT the averaged z reading must exceed to count as a
/// definite orientation.
pub const Z_DIRECTION_THRESHOLD: f32 = 9.0;

/// Number of z samples averaged for orientation detection.
pub const Z_SAMPLE_COUNT: usize = 5;

/// Polarity of one magnetic axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Default,
    Inverse,
    Fault,
}

impl Direction {
    /// Numeric multiplier for arithmetic: `1`, `-1` or `0`.
    #[inline]
    #[must_use]
    pub fn multiplier(self) -> i8 {
        match self {
            Direction::Default => 1,
            Direction::Inverse => -1,
            Direction::Fault => 0,
        }
    }

    /// Classifies an averaged z-axis reading.
    ///
    /// # Examples
    ///
    /// ```
    /// use magjoy::joystick::direction::Direction;
    ///
    /// assert_eq!(Direction::from_z_average(-25.0), Direction::Inverse);
    /// assert_eq!(Direction::from_z_average(25.0), Direction::Default);
    /// assert_eq!(Direction::from_z_average(3.0), Direction::Fault);
    /// ```
    #[must_use]
    pub fn from_z_average(z_average: f32) -> Self {
        if z_average < -Z_DIRECTION_THRESHOLD {
            Direction::Inverse
        } else if z_average > Z_DIRECTION_THRESHOLD {
            Direction::Default
        } else {
            Direction::Fault
        }
    }
}

/// Per-axis polarity of the joystick.
///
/// `x` and `y` come from configuration; `z` is detected from the sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionConfig {
    pub x: Direction,
    pub y: Direction,
    pub z: Direction,
}

impl DirectionConfig {
    #[must_use]
    pub fn new(x: Direction, y: Direction, z: Direction) -> Self {
        Self { x, y, z }
    }

    /// Final `(x, y)` sign multipliers for the mapped joystick axes.
    ///
    /// The sensor sits flipped under the magnet, so x carries an extra `-1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use magjoy::joystick::direction::{Direction, DirectionConfig};
    ///
    /// let dirs = DirectionConfig::new(Direction::Default, Direction::Default, Direction::Default);
    /// assert_eq!(dirs.joystick_multipliers(), (-1, 1));
    ///
    /// let faulted = DirectionConfig::new(Direction::Default, Direction::Inverse, Direction::Fault);
    /// assert_eq!(faulted.joystick_multipliers(), (0, 0));
    /// ```
    #[must_use]
    pub fn joystick_multipliers(&self) -> (i8, i8) {
        let z = self.z.multiplier();
        (-z * self.x.multiplier(), z * self.y.multiplier())
    }

    /// Whether the orientation could not be determined.
    #[must_use]
    pub fn is_faulted(&self) -> bool {
        self.z == Direction::Fault
    }
}

/// Detects the z-axis polarity from a batch of z readings.
///
/// An empty batch is treated as a zero field, which is a fault.
#[must_use]
pub fn detect_z_direction(samples: &[f32]) -> Direction {
    let average = if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f32>() / samples.len() as f32
    };

    let direction = Direction::from_z_average(average);
    if direction == Direction::Fault {
        warn!(
            z_average = average,
            "Magnet orientation undetermined, joystick output disabled"
        );
    } else {
        debug!(z_average = average, ?direction, "Magnet orientation detected");
    }
    direction
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_values() {
        assert_eq!(Direction::Default.multiplier(), 1);
        assert_eq!(Direction::Inverse.multiplier(), -1);
        assert_eq!(Direction::Fault.multiplier(), 0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(Direction::from_z_average(Z_DIRECTION_THRESHOLD), Direction::Fault);
        assert_eq!(Direction::from_z_average(-Z_DIRECTION_THRESHOLD), Direction::Fault);
        assert_eq!(Direction::from_z_average(9.01), Direction::Default);
        assert_eq!(Direction::from_z_average(-9.01), Direction::Inverse);
    }

    #[test]
    fn test_detect_averages_samples() {
        // Mean is 10.0 even though two samples sit below the threshold
        let samples = [5.0, 8.0, 10.0, 12.0, 15.0];
        assert_eq!(detect_z_direction(&samples), Direction::Default);

        let samples = [-30.0, -30.0, 0.0, 0.0, 0.0];
        assert_eq!(detect_z_direction(&samples), Direction::Inverse);
    }

    #[test]
    fn test_detect_empty_is_fault() {
        assert_eq!(detect_z_direction(&[]), Direction::Fault);
    }

    #[test]
    fn test_multipliers_all_combinations() {
        use Direction::*;

        let cases = [
            (Default, Default, Default, (-1, 1)),
            (Inverse, Default, Default, (1, 1)),
            (Default, Inverse, Default, (-1, -1)),
            (Default, Default, Inverse, (1, -1)),
            (Inverse, Inverse, Inverse, (-1, 1)),
            (Default, Default, Fault, (0, 0)),
            (Inverse, Inverse, Fault, (0, 0)),
        ];

        for (x, y, z, expected) in cases {
            let dirs = DirectionConfig::new(x, y, z);
            assert_eq!(dirs.joystick_multipliers(), expected, "x={x:?} y={y:?} z={z:?}");
        }
    }

    #[test]
    fn test_fault_flag() {
        let dirs = DirectionConfig::new(Direction::Default, Direction::Default, Direction::Fault);
        assert!(dirs.is_faulted());
        assert!(!DirectionConfig::default().is_faulted());
    }
}
