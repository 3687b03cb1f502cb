//! # Geometry Mapper
//!
//! Converts one raw magnetic reading into an integer joystick coordinate.
//!
//! ## Pipeline
//!
//! 1. **Noise gate**: readings whose magnitude from the origin is below
//!    [`INPUT_NOISE_GATE`] are treated as the resting center.
//! 2. **Centering**: subtract the calibration center and apply the per-axis
//!    direction multipliers.
//! 3. **Envelope clamp**: points at or beyond the operating radius are
//!    replaced by a limit point on the circle, built per axis as
//!    `sgn(axis) × |trig(theta) × radius|`.
//! 4. **Integer map**: each axis is mapped from `[-radius, radius]` to
//!    `[-INPUT_XY_MAX, INPUT_XY_MAX]`, truncating toward zero.
//!
//! The calibrated corners describe a roughly square region; the envelope is
//! the largest circle inscribed in it, so full deflection is reachable in
//! every direction.
//!
//! ## Usage
//!
//! ```
//! use magjoy::joystick::geometry::GeometryMapper;
//! use magjoy::joystick::point::{FloatPoint, IntPoint};
//!
//! let mapper = GeometryMapper::new(20.0, (1, 1));
//! let mapped = mapper.map(FloatPoint::new(10.0, 0.0), FloatPoint::ZERO);
//! assert_eq!(mapped, IntPoint::new(512, 0));
//! ```

use super::point::{map_float_int, sgn, FloatPoint, IntPoint};

/// Half-range of the mapped coordinate.
pub const INPUT_XY_MAX: i32 = 1024;

/// Readings closer to the origin than this (mT) are treated as centered.
pub const INPUT_NOISE_GATE: f32 = 1.0;

/// Per-axis change (mT) below which a new reading counts as unchanged.
pub const INPUT_CHANGE_TOLERANCE: f32 = 0.1;

/// Maps centered magnetic readings onto the circular operating envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryMapper {
    /// Operating envelope radius in mT.
    radius: f32,
    /// Final x/y sign multipliers from the direction corrector.
    signs: (i8, i8),
}

impl GeometryMapper {
    #[must_use]
    pub fn new(radius: f32, signs: (i8, i8)) -> Self {
        Self { radius, signs }
    }

    #[must_use]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius;
    }

    #[must_use]
    pub fn signs(&self) -> (i8, i8) {
        self.signs
    }

    pub fn set_signs(&mut self, signs: (i8, i8)) {
        self.signs = signs;
    }

    /// Centers `raw` on `center` and applies direction signs and the noise gate.
    #[must_use]
    pub fn center(&self, raw: FloatPoint, center: FloatPoint) -> FloatPoint {
        if raw.magnitude_squared() < INPUT_NOISE_GATE * INPUT_NOISE_GATE {
            return FloatPoint::ZERO;
        }
        FloatPoint::new(
            (raw.x - center.x) * f32::from(self.signs.0),
            (raw.y - center.y) * f32::from(self.signs.1),
        )
    }

    /// Clamps a centered point onto the operating envelope.
    ///
    /// Points strictly inside the circle pass through unchanged.
    #[must_use]
    pub fn clamp(&self, centered: FloatPoint) -> FloatPoint {
        let theta = centered.y.atan2(centered.x);
        let limit = FloatPoint::new(
            sgn(centered.x) * (theta.cos() * self.radius).abs(),
            sgn(centered.y) * (theta.sin() * self.radius).abs(),
        );

        if centered.magnitude_squared() >= self.radius * self.radius {
            limit
        } else {
            centered
        }
    }

    /// Full raw-to-integer mapping.
    ///
    /// Returns the origin when the radius is not positive, which only
    /// happens if the mapper was never given a calibrated radius.
    #[must_use]
    pub fn map(&self, raw: FloatPoint, center: FloatPoint) -> IntPoint {
        if self.radius <= 0.0 || !self.radius.is_finite() {
            return IntPoint::ZERO;
        }

        let clamped = self.clamp(self.center(raw, center));
        IntPoint::new(
            map_float_int(clamped.x, -self.radius, self.radius, -INPUT_XY_MAX, INPUT_XY_MAX),
            map_float_int(clamped.y, -self.radius, self.radius, -INPUT_XY_MAX, INPUT_XY_MAX),
        )
    }
}

/// Change-skip filter: `true` when `current` differs from `previous` by less
/// than [`INPUT_CHANGE_TOLERANCE`] on both axes.
///
/// # Examples
///
/// ```
/// use magjoy::joystick::geometry::can_skip_input_change;
/// use magjoy::joystick::point::FloatPoint;
///
/// let prev = FloatPoint::new(5.0, 5.0);
/// assert!(can_skip_input_change(FloatPoint::new(5.05, 4.95), prev));
/// assert!(!can_skip_input_change(FloatPoint::new(5.2, 5.0), prev));
/// ```
#[inline]
#[must_use]
pub fn can_skip_input_change(current: FloatPoint, previous: FloatPoint) -> bool {
    (current.x - previous.x).abs() < INPUT_CHANGE_TOLERANCE
        && (current.y - previous.y).abs() < INPUT_CHANGE_TOLERANCE
}
