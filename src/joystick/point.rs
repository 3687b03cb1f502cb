//! # Points
//!
//! Plain 2-D value types used along the pipeline plus the scalar helpers the
//! geometry and response stages share.
//!
//! - [`FloatPoint`]: magnetic readings and calibration points in mT
//! - [`IntPoint`]: mapped and shaped coordinates

use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// A raw or calibration-space magnetic reading in millitesla.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatPoint {
    pub x: f32,
    pub y: f32,
}

/// A mapped or output coordinate.
///
/// Before response shaping both axes lie in `[-1024, 1024]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntPoint {
    pub x: i32,
    pub y: i32,
}

impl FloatPoint {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared distance from the origin.
    #[inline]
    #[must_use]
    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Distance from the origin.
    #[inline]
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Distance from `offset`, usually the calibration center.
    ///
    /// # Examples
    ///
    /// ```
    /// use magjoy::joystick::point::FloatPoint;
    ///
    /// let corner = FloatPoint::new(4.0, 5.0);
    /// let center = FloatPoint::new(1.0, 1.0);
    /// assert!((corner.magnitude_from(center) - 5.0).abs() < 1e-6);
    /// ```
    #[inline]
    #[must_use]
    pub fn magnitude_from(&self, offset: FloatPoint) -> f32 {
        (*self - offset).magnitude()
    }

    /// Swaps the two axes.
    ///
    /// The sensor is mounted rotated relative to the joystick, so sensor y is
    /// joystick x and the other way round.
    #[inline]
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            x: self.y,
            y: self.x,
        }
    }
}

impl Sub for FloatPoint {
    type Output = FloatPoint;

    fn sub(self, rhs: FloatPoint) -> FloatPoint {
        FloatPoint {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl IntPoint {
    /// The origin.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Sign of a float as `-1`, `0` or `1`.
///
/// Unlike [`f32::signum`], zero maps to zero.
#[inline]
#[must_use]
pub fn sgn(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Linearly maps a float from `[in_start, in_end]` to `[out_start, out_end]`.
///
/// The result is truncated toward zero after the output offset is applied.
///
/// # Examples
///
/// ```
/// use magjoy::joystick::point::map_float_int;
///
/// assert_eq!(map_float_int(10.0, -20.0, 20.0, -1024, 1024), 512);
/// assert_eq!(map_float_int(0.0, -20.0, 20.0, -1024, 1024), 0);
/// ```
#[inline]
#[must_use]
pub fn map_float_int(input: f32, in_start: f32, in_end: f32, out_start: i32, out_end: i32) -> i32 {
    let in_range = in_end - in_start;
    let out_range = (out_end - out_start) as f32;
    ((input - in_start) * out_range / in_range + out_start as f32) as i32
}

/// Integer range map with truncating division.
///
/// `(value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min`
///
/// # Examples
///
/// ```
/// use magjoy::joystick::point::map_int;
///
/// assert_eq!(map_int(512, -1024, 1024, -6, 6), 3);
/// assert_eq!(map_int(1024, -1024, 1024, -6, 6), 6);
/// ```
#[inline]
#[must_use]
pub fn map_int(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let in_range = in_max - in_min;
    if in_range == 0 {
        return out_min;
    }
    (value - in_min) * (out_max - out_min) / in_range + out_min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sgn() {
        assert_eq!(sgn(3.2), 1.0);
        assert_eq!(sgn(-0.001), -1.0);
        assert_eq!(sgn(0.0), 0.0);
    }

    #[test]
    fn test_magnitude() {
        let p = FloatPoint::new(3.0, 4.0);
        assert!((p.magnitude() - 5.0).abs() < 1e-6);
        assert!((p.magnitude_squared() - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_magnitude_from_self_is_zero() {
        let p = FloatPoint::new(-7.5, 2.25);
        assert_eq!(p.magnitude_from(p), 0.0);
    }

    #[test]
    fn test_swapped() {
        assert_eq!(FloatPoint::new(1.0, 2.0).swapped(), FloatPoint::new(2.0, 1.0));
    }

    #[test]
    fn test_map_float_int_endpoints() {
        assert_eq!(map_float_int(-20.0, -20.0, 20.0, -1024, 1024), -1024);
        assert_eq!(map_float_int(20.0, -20.0, 20.0, -1024, 1024), 1024);
    }

    #[test]
    fn test_map_float_int_truncates_toward_zero() {
        // 0.01 of 20 mT is 0.512 counts
        assert_eq!(map_float_int(0.01, -20.0, 20.0, -1024, 1024), 0);
        assert_eq!(map_float_int(-0.01, -20.0, 20.0, -1024, 1024), 0);
    }

    #[test]
    fn test_map_int_gamepad_range() {
        assert_eq!(map_int(1024, -1024, 1024, -127, 127), 127);
        assert_eq!(map_int(-1024, -1024, 1024, -127, 127), -127);
        assert_eq!(map_int(0, -1024, 1024, -127, 127), 0);
    }

    #[test]
    fn test_map_int_negative_half() {
        assert_eq!(map_int(-512, -1024, 1024, -6, 6), -3);
    }

    #[test]
    fn test_map_int_empty_input_range() {
        assert_eq!(map_int(5, 3, 3, -1, 1), -1);
    }
}
