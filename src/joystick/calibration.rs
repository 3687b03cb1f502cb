//! # Calibration Store
//!
//! Holds the five calibration points of the joystick and derives the radius
//! of the circular operating envelope from them.
//!
//! ## Layout
//!
//! | Index | Point |
//! |-------|-------|
//! | 0 | Center (joystick at rest) |
//! | 1 | Top-left corner |
//! | 2 | Top-right corner |
//! | 3 | Bottom-right corner |
//! | 4 | Bottom-left corner |
//!
//! A corner is *valid* once it has left the origin and its distance from the
//! center is non-zero. Until the first full calibration every corner sits at
//! the origin and the envelope falls back to the theoretical full-scale
//! radius, wherever the center lies.
//!
//! ## Usage
//!
//! ```
//! use magjoy::joystick::calibration::CalibrationSet;
//! use magjoy::joystick::point::FloatPoint;
//!
//! let mut cal = CalibrationSet::default();
//! cal.set_corner(1, FloatPoint::new(-20.0, 20.0));
//!
//! // Capture keeps the sample farthest from center
//! let kept = cal.capture(1, FloatPoint::new(-5.0, 5.0));
//! assert_eq!(kept, Some(FloatPoint::new(-20.0, 20.0)));
//! ```

use serde::{Deserialize, Serialize};
use std::f32::consts::SQRT_2;
use tracing::debug;

use super::point::FloatPoint;

/// Number of calibration points (center + 4 corners).
pub const CALIBRATION_POINTS: usize = 5;

/// Index of the center point.
pub const CENTER_INDEX: usize = 0;

/// Indices of the four corner points, in capture order.
pub const CORNER_INDICES: [usize; 4] = [1, 2, 3, 4];

/// Largest raw x or y reading of a calibration point in mT.
pub const RAW_XY_MAX: f32 = 30.0;

/// The five calibration points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSet {
    points: [FloatPoint; CALIBRATION_POINTS],
}

impl CalibrationSet {
    /// Creates a set from a center and four corners.
    #[must_use]
    pub fn new(center: FloatPoint, corners: [FloatPoint; 4]) -> Self {
        let mut points = [FloatPoint::ZERO; CALIBRATION_POINTS];
        points[CENTER_INDEX] = center;
        for (slot, corner) in CORNER_INDICES.iter().zip(corners) {
            points[*slot] = corner;
        }
        Self { points }
    }

    /// Current center point.
    #[inline]
    #[must_use]
    pub fn center(&self) -> FloatPoint {
        self.points[CENTER_INDEX]
    }

    /// Replaces the center point.
    pub fn set_center(&mut self, center: FloatPoint) {
        self.points[CENTER_INDEX] = center;
    }

    /// The four corners in index order 1..=4.
    #[must_use]
    pub fn corners(&self) -> [FloatPoint; 4] {
        [self.points[1], self.points[2], self.points[3], self.points[4]]
    }

    /// Point stored at `quad`, or `None` when the index is out of range.
    #[must_use]
    pub fn corner(&self, quad: usize) -> Option<FloatPoint> {
        self.points.get(quad).copied()
    }

    /// Overwrites the point at `quad`. Out-of-range indices are ignored.
    pub fn set_corner(&mut self, quad: usize, point: FloatPoint) {
        if let Some(slot) = self.points.get_mut(quad) {
            *slot = point;
        }
    }

    /// Resets the point at `quad` to the origin. Out-of-range indices are ignored.
    pub fn zero_corner(&mut self, quad: usize) {
        self.set_corner(quad, FloatPoint::ZERO);
    }

    /// Live capture: keeps `point` only when it lies strictly farther from
    /// the center than what is stored at `quad`. A zeroed slot counts as
    /// empty.
    ///
    /// Returns the stored point after the comparison so a caller can show
    /// progress while the user holds the stick, or `None` for an
    /// out-of-range index.
    pub fn capture(&mut self, quad: usize, point: FloatPoint) -> Option<FloatPoint> {
        let center = self.center();
        let stored = self.points.get_mut(quad)?;
        let reach = if *stored == FloatPoint::ZERO { 0.0 } else { stored.magnitude_from(center) };
        if point.magnitude_from(center) > reach {
            debug!(quad, x = point.x, y = point.y, "Calibration point extended");
            *stored = point;
        }
        Some(*stored)
    }

    /// Whether the corner at `quad` has been captured.
    ///
    /// A zeroed corner is never valid, even when the center is offset.
    #[must_use]
    pub fn is_corner_valid(&self, quad: usize) -> bool {
        if !CORNER_INDICES.contains(&quad) {
            return false;
        }
        let corner = self.points[quad];
        corner != FloatPoint::ZERO && corner.magnitude_from(self.center()) > 0.0
    }

    /// Radius of the circular operating envelope.
    ///
    /// Starts from the half-diagonal of the full-scale corner
    /// `(RAW_XY_MAX, RAW_XY_MAX)` relative to center and shrinks to the
    /// smallest half-diagonal among valid corners.
    ///
    /// # Examples
    ///
    /// ```
    /// use magjoy::joystick::calibration::CalibrationSet;
    /// use magjoy::joystick::point::FloatPoint;
    ///
    /// // Nothing captured yet: theoretical default
    /// let cal = CalibrationSet::default();
    /// assert!((cal.minimum_radius() - 30.0).abs() < 1e-4);
    ///
    /// let cal = CalibrationSet::new(
    ///     FloatPoint::ZERO,
    ///     [
    ///         FloatPoint::new(-20.0, 20.0),
    ///         FloatPoint::new(18.0, 18.0),
    ///         FloatPoint::new(20.0, -20.0),
    ///         FloatPoint::new(-20.0, -20.0),
    ///     ],
    /// );
    /// assert!((cal.minimum_radius() - 18.0).abs() < 1e-4);
    /// ```
    #[must_use]
    pub fn minimum_radius(&self) -> f32 {
        let center = self.center();
        let full_scale = FloatPoint::new(RAW_XY_MAX, RAW_XY_MAX);
        let mut radius = full_scale.magnitude_from(center) / SQRT_2;

        for quad in CORNER_INDICES {
            let half_diagonal = self.points[quad].magnitude_from(center) / SQRT_2;
            if self.is_corner_valid(quad) && half_diagonal < radius {
                radius = half_diagonal;
            }
        }

        radius
    }

    /// Resets all five points to the origin.
    pub fn clear(&mut self) {
        self.points = [FloatPoint::ZERO; CALIBRATION_POINTS];
    }
}

/// Arithmetic mean of a set of resting samples.
///
/// Returns `None` when `samples` is empty.
pub fn mean_point<I>(samples: I) -> Option<FloatPoint>
where
    I: IntoIterator<Item = FloatPoint>,
{
    let (sum, count) = samples
        .into_iter()
        .fold((FloatPoint::ZERO, 0usize), |(acc, n), p| {
            (FloatPoint::new(acc.x + p.x, acc.y + p.y), n + 1)
        });

    if count == 0 {
        return None;
    }
    Some(FloatPoint::new(sum.x / count as f32, sum.y / count as f32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_calibration(half: f32) -> CalibrationSet {
        CalibrationSet::new(
            FloatPoint::ZERO,
            [
                FloatPoint::new(-half, half),
                FloatPoint::new(half, half),
                FloatPoint::new(half, -half),
                FloatPoint::new(-half, -half),
            ],
        )
    }

    // ==================== Accessor Tests ====================

    #[test]
    fn test_default_is_all_zero() {
        let cal = CalibrationSet::default();
        assert_eq!(cal.center(), FloatPoint::ZERO);
        for quad in 0..CALIBRATION_POINTS {
            assert_eq!(cal.corner(quad), Some(FloatPoint::ZERO));
        }
    }

    #[test]
    fn test_center_is_index_zero() {
        let mut cal = CalibrationSet::default();
        cal.set_corner(0, FloatPoint::new(1.5, -2.5));
        assert_eq!(cal.center(), FloatPoint::new(1.5, -2.5));
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let mut cal = square_calibration(10.0);
        let before = cal;

        cal.set_corner(5, FloatPoint::new(99.0, 99.0));
        cal.zero_corner(17);

        assert_eq!(cal, before);
        assert_eq!(cal.corner(5), None);
        assert_eq!(cal.capture(5, FloatPoint::new(99.0, 99.0)), None);
    }

    #[test]
    fn test_zero_corner() {
        let mut cal = square_calibration(10.0);
        cal.zero_corner(2);
        assert_eq!(cal.corner(2), Some(FloatPoint::ZERO));
        assert!(!cal.is_corner_valid(2));
    }

    // ==================== Capture Tests ====================

    #[test]
    fn test_capture_keeps_larger_magnitude() {
        let mut cal = CalibrationSet::default();

        assert_eq!(cal.capture(1, FloatPoint::new(-5.0, 5.0)), Some(FloatPoint::new(-5.0, 5.0)));
        assert_eq!(cal.capture(1, FloatPoint::new(-12.0, 11.0)), Some(FloatPoint::new(-12.0, 11.0)));
        // Smaller excursion is ignored
        assert_eq!(cal.capture(1, FloatPoint::new(-3.0, 3.0)), Some(FloatPoint::new(-12.0, 11.0)));
    }

    #[test]
    fn test_capture_requires_strictly_larger() {
        let mut cal = CalibrationSet::default();
        cal.set_corner(3, FloatPoint::new(3.0, -4.0));

        // Same magnitude, different point
        let kept = cal.capture(3, FloatPoint::new(4.0, -3.0));
        assert_eq!(kept, Some(FloatPoint::new(3.0, -4.0)));
    }

    #[test]
    fn test_capture_measures_from_center() {
        let mut cal = CalibrationSet::default();
        cal.set_center(FloatPoint::new(10.0, 10.0));
        cal.set_corner(2, FloatPoint::new(20.0, 20.0));

        // Farther from origin but closer to center
        let kept = cal.capture(2, FloatPoint::new(12.0, 12.0));
        assert_eq!(kept, Some(FloatPoint::new(20.0, 20.0)));
    }

    // ==================== Radius Tests ====================

    #[test]
    fn test_radius_default_without_corners() {
        let cal = CalibrationSet::default();
        assert!((cal.minimum_radius() - RAW_XY_MAX).abs() < 1e-4);
    }

    #[test]
    fn test_radius_default_follows_center() {
        let mut cal = CalibrationSet::default();
        cal.set_center(FloatPoint::new(10.0, 10.0));
        // |(30,30) - (10,10)| / sqrt(2) = 20
        assert!((cal.minimum_radius() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_radius_smallest_valid_corner() {
        let mut cal = square_calibration(20.0);
        cal.set_corner(4, FloatPoint::new(-15.0, -15.0));
        assert!((cal.minimum_radius() - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_radius_skips_invalid_corners() {
        let mut cal = square_calibration(20.0);
        cal.zero_corner(1);
        cal.zero_corner(3);
        assert!((cal.minimum_radius() - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_radius_never_exceeds_default() {
        let cal = square_calibration(40.0);
        assert!((cal.minimum_radius() - RAW_XY_MAX).abs() < 1e-4);
    }

    #[test]
    fn test_zeroed_corners_invalid_with_offset_center() {
        let mut cal = CalibrationSet::default();
        cal.set_center(FloatPoint::new(2.0, 3.0));
        for quad in CORNER_INDICES {
            assert!(!cal.is_corner_valid(quad));
        }
        let expected = FloatPoint::new(RAW_XY_MAX, RAW_XY_MAX).magnitude_from(cal.center()) / SQRT_2;
        assert!((cal.minimum_radius() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_capture_into_zeroed_slot_with_offset_center() {
        let mut cal = CalibrationSet::default();
        cal.set_center(FloatPoint::new(5.0, 5.0));

        // Closer to center than the origin is, still the first capture
        let kept = cal.capture(2, FloatPoint::new(7.0, 7.0));
        assert_eq!(kept, Some(FloatPoint::new(7.0, 7.0)));
        assert!(cal.is_corner_valid(2));
    }

    #[test]
    fn test_corner_at_center_is_invalid() {
        let mut cal = CalibrationSet::default();
        cal.set_center(FloatPoint::new(2.0, 2.0));
        cal.set_corner(1, FloatPoint::new(2.0, 2.0));
        assert!(!cal.is_corner_valid(1));
        assert!(cal.minimum_radius() > 0.0);
    }

    // ==================== Mean Tests ====================

    #[test]
    fn test_mean_point() {
        let samples = [
            FloatPoint::new(1.0, -1.0),
            FloatPoint::new(2.0, -2.0),
            FloatPoint::new(3.0, -3.0),
        ];
        assert_eq!(mean_point(samples), Some(FloatPoint::new(2.0, -2.0)));
    }

    #[test]
    fn test_mean_point_empty() {
        assert_eq!(mean_point(std::iter::empty()), None);
    }
}
