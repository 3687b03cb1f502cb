//! # Joystick Controller
//!
//! Owns the sensor and every pipeline stage, and runs one pipeline pass per
//! polling tick.
//!
//! ## Tick
//!
//! 1. Read one sample (sensor y/x swapped into joystick x/y)
//! 2. Evaluate the change-skip filter against the last raw sample
//! 3. Push the raw sample (always)
//! 4. Unless skipped: map → push input → shape → push output
//!
//! Consumers pull the latest committed values through the getters; the
//! controller never pushes output anywhere.
//!
//! ## Usage
//!
//! ```
//! use magjoy::joystick::controller::{JoystickController, JoystickSettings};
//! use magjoy::sensor::{LinkSensor, MagSample};
//! use tokio::sync::watch;
//!
//! // Strong positive z: default magnet orientation
//! let (tx, rx) = watch::channel(MagSample::new(0.0, 0.0, 30.0));
//! let mut joystick = JoystickController::new(LinkSensor::new(rx), JoystickSettings::default());
//!
//! tx.send_replace(MagSample::new(0.0, 12.0, 30.0));
//! joystick.update();
//! assert!(joystick.x_out() != 0);
//! ```

use tracing::{debug, info, trace};

use super::buffer::SampleBuffer;
use super::calibration::{mean_point, CalibrationSet};
use super::direction::{detect_z_direction, Direction, DirectionConfig, Z_SAMPLE_COUNT};
use super::geometry::{can_skip_input_change, GeometryMapper};
use super::point::{FloatPoint, IntPoint};
use super::response::{OperatingMode, ResponseShaper, DEFAULT_DEADZONE_ENABLED, DEFAULT_DEADZONE_FACTOR, DEFAULT_SPEED_LEVEL};
use crate::sensor::MagneticSensor;

/// Raw sample history length.
pub const RAW_BUFFER_SIZE: usize = 10;

/// Mapped input history length.
pub const INPUT_BUFFER_SIZE: usize = 5;

/// Shaped output history length.
pub const OUTPUT_BUFFER_SIZE: usize = 5;

/// Resting samples averaged into the calibration center.
pub const CENTER_BUFFER_SIZE: usize = 5;

/// Everything the controller needs from persisted configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickSettings {
    pub mode: OperatingMode,
    pub direction_x: Direction,
    pub direction_y: Direction,
    pub deadzone_enabled: bool,
    pub deadzone_factor: f32,
    pub speed_level: u8,
    pub calibration: CalibrationSet,
}

impl Default for JoystickSettings {
    fn default() -> Self {
        Self {
            mode: OperatingMode::Mouse,
            direction_x: Direction::Default,
            direction_y: Direction::Default,
            deadzone_enabled: DEFAULT_DEADZONE_ENABLED,
            deadzone_factor: DEFAULT_DEADZONE_FACTOR,
            speed_level: DEFAULT_SPEED_LEVEL,
            calibration: CalibrationSet::default(),
        }
    }
}

/// Per-tick joystick pipeline.
///
/// Not reentrant: a single control loop owns it and calls [`update`](Self::update)
/// at a fixed cadence.
#[derive(Debug)]
pub struct JoystickController<S> {
    sensor: S,
    calibration: CalibrationSet,
    directions: DirectionConfig,
    mapper: GeometryMapper,
    shaper: ResponseShaper,
    raw_buffer: SampleBuffer<FloatPoint, RAW_BUFFER_SIZE>,
    input_buffer: SampleBuffer<IntPoint, INPUT_BUFFER_SIZE>,
    output_buffer: SampleBuffer<IntPoint, OUTPUT_BUFFER_SIZE>,
    center_buffer: SampleBuffer<FloatPoint, CENTER_BUFFER_SIZE>,
    skipped: bool,
}

impl<S: MagneticSensor> JoystickController<S> {
    /// Creates a controller from persisted settings.
    ///
    /// Samples the z axis to detect magnet orientation, applies deadzone and
    /// range settings, loads the calibration set, derives the operating
    /// radius and seeds the buffers with a resting sample.
    pub fn new(sensor: S, settings: JoystickSettings) -> Self {
        let mut controller = Self {
            sensor,
            calibration: settings.calibration,
            directions: DirectionConfig::default(),
            mapper: GeometryMapper::new(0.0, (0, 0)),
            shaper: ResponseShaper::new(
                settings.mode,
                settings.deadzone_enabled,
                settings.deadzone_factor,
                settings.speed_level,
            ),
            raw_buffer: SampleBuffer::new(),
            input_buffer: SampleBuffer::new(),
            output_buffer: SampleBuffer::new(),
            center_buffer: SampleBuffer::new(),
            skipped: false,
        };

        controller.set_magnet_direction(settings.direction_x, settings.direction_y);
        controller.set_minimum_radius();
        controller.reset();

        info!(
            mode = ?controller.shaper.mode(),
            radius = controller.mapper.radius(),
            deadzone = controller.shaper.deadzone_value(),
            range = controller.shaper.range_value(),
            "Joystick initialized"
        );
        controller
    }

    /// Clears all sample buffers and reseeds raw, input and output with a
    /// resting sample so the getters always have a value.
    pub fn reset(&mut self) {
        self.raw_buffer.clear();
        self.input_buffer.clear();
        self.output_buffer.clear();
        self.center_buffer.clear();

        self.raw_buffer.push(FloatPoint::ZERO);
        self.input_buffer.push(IntPoint::ZERO);
        self.output_buffer.push(IntPoint::ZERO);
        self.skipped = false;
    }

    /// Runs one pipeline pass.
    pub fn update(&mut self) {
        let raw = self.read_point();
        let previous = self.raw_buffer.last().unwrap_or_default();
        self.skipped = can_skip_input_change(raw, previous);
        self.raw_buffer.push(raw);

        if self.skipped {
            trace!(x = raw.x, y = raw.y, "Input unchanged, skipping");
            return;
        }

        let input = self.mapper.map(raw, self.calibration.center());
        self.input_buffer.push(input);

        let output = self.shaper.process(input);
        self.output_buffer.push(output);
        trace!(?raw, ?input, ?output, "Joystick updated");
    }

    /// Latches and reads one sample in joystick axes.
    fn read_point(&mut self) -> FloatPoint {
        self.sensor.refresh();
        FloatPoint::new(self.sensor.x(), self.sensor.y()).swapped()
    }

    // ==================== Output ====================

    /// Last shaped output x.
    #[must_use]
    pub fn x_out(&self) -> i32 {
        self.output_point().x
    }

    /// Last shaped output y.
    #[must_use]
    pub fn y_out(&self) -> i32 {
        self.output_point().y
    }

    /// Last shaped output point.
    #[must_use]
    pub fn output_point(&self) -> IntPoint {
        self.output_buffer.last().unwrap_or_default()
    }

    /// Last mapped input point (before deadzone and range).
    #[must_use]
    pub fn input_point(&self) -> IntPoint {
        self.input_buffer.last().unwrap_or_default()
    }

    /// Last raw reading in joystick axes.
    #[must_use]
    pub fn raw_point(&self) -> FloatPoint {
        self.raw_buffer.last().unwrap_or_default()
    }

    /// Whether the most recent tick was dropped by the change-skip filter.
    #[must_use]
    pub fn last_update_skipped(&self) -> bool {
        self.skipped
    }

    /// Raw sample history, oldest first.
    #[must_use]
    pub fn raw_buffer(&self) -> &SampleBuffer<FloatPoint, RAW_BUFFER_SIZE> {
        &self.raw_buffer
    }

    /// Mapped input history, oldest first.
    #[must_use]
    pub fn input_buffer(&self) -> &SampleBuffer<IntPoint, INPUT_BUFFER_SIZE> {
        &self.input_buffer
    }

    /// Shaped output history, oldest first.
    #[must_use]
    pub fn output_buffer(&self) -> &SampleBuffer<IntPoint, OUTPUT_BUFFER_SIZE> {
        &self.output_buffer
    }

    // ==================== Direction ====================

    #[must_use]
    pub fn directions(&self) -> DirectionConfig {
        self.directions
    }

    #[must_use]
    pub fn magnet_x_direction(&self) -> Direction {
        self.directions.x
    }

    pub fn set_magnet_x_direction(&mut self, direction: Direction) {
        self.directions.x = direction;
        self.mapper.set_signs(self.directions.joystick_multipliers());
    }

    #[must_use]
    pub fn magnet_y_direction(&self) -> Direction {
        self.directions.y
    }

    pub fn set_magnet_y_direction(&mut self, direction: Direction) {
        self.directions.y = direction;
        self.mapper.set_signs(self.directions.joystick_multipliers());
    }

    #[must_use]
    pub fn magnet_z_direction(&self) -> Direction {
        self.directions.z
    }

    /// Re-detects the z polarity from [`Z_SAMPLE_COUNT`] back-to-back reads.
    ///
    /// A [`LinkSensor`](crate::sensor::LinkSensor) latches the same sample
    /// until the link publishes a new one, so these reads may repeat. Use
    /// [`set_magnet_z_samples`](Self::set_magnet_z_samples) with readings
    /// collected over time when distinct samples matter.
    pub fn detect_magnet_z_direction(&mut self) {
        let mut samples = [0.0f32; Z_SAMPLE_COUNT];
        for sample in samples.iter_mut() {
            self.sensor.refresh();
            *sample = self.sensor.z();
        }
        self.set_magnet_z_samples(&samples);
    }

    /// Sets the z polarity from z readings gathered by the caller.
    pub fn set_magnet_z_samples(&mut self, samples: &[f32]) {
        self.directions.z = detect_z_direction(samples);
        self.mapper.set_signs(self.directions.joystick_multipliers());
    }

    /// Sets x/y polarity, re-detects z and recomputes the final multipliers.
    pub fn set_magnet_direction(&mut self, x: Direction, y: Direction) {
        self.directions.x = x;
        self.directions.y = y;
        self.detect_magnet_z_direction();
        debug!(
            directions = ?self.directions,
            signs = ?self.mapper.signs(),
            "Magnet direction set"
        );
    }

    // ==================== Response ====================

    #[must_use]
    pub fn operating_mode(&self) -> OperatingMode {
        self.shaper.mode()
    }

    /// Switches mouse/gamepad mode; the range value follows.
    pub fn set_operating_mode(&mut self, mode: OperatingMode) {
        self.shaper.set_mode(mode);
        info!(?mode, range = self.shaper.range_value(), "Operating mode changed");
    }

    /// Enables or disables the output deadzone and sets its factor (0.0 to 1.0).
    pub fn set_deadzone(&mut self, enabled: bool, factor: f32) {
        self.shaper.set_deadzone(enabled, factor);
    }

    #[must_use]
    pub fn deadzone_enabled(&self) -> bool {
        self.shaper.deadzone_enabled()
    }

    #[must_use]
    pub fn deadzone_factor(&self) -> f32 {
        self.shaper.deadzone_factor()
    }

    #[must_use]
    pub fn deadzone_value(&self) -> i32 {
        self.shaper.deadzone_value()
    }

    /// Current speed level (0 to 10).
    #[must_use]
    pub fn output_range(&self) -> u8 {
        self.shaper.speed_level()
    }

    /// Sets the speed level (0 to 10).
    pub fn set_output_range(&mut self, level: u8) {
        self.shaper.set_speed_level(level);
    }

    /// Maximum magnitude of the shaped output for the current level and mode.
    #[must_use]
    pub fn range_value(&self) -> i32 {
        self.shaper.range_value()
    }

    // ==================== Calibration ====================

    /// Snapshot of the five calibration points, for persistence.
    #[must_use]
    pub fn calibration(&self) -> CalibrationSet {
        self.calibration
    }

    /// Operating envelope radius in mT.
    #[must_use]
    pub fn minimum_radius(&self) -> f32 {
        self.mapper.radius()
    }

    /// Re-derives the operating radius from the calibration points.
    pub fn set_minimum_radius(&mut self) {
        let radius = self.calibration.minimum_radius();
        self.mapper.set_radius(radius);
        debug!(radius, "Operating radius updated");
    }

    /// Current calibration center.
    #[must_use]
    pub fn center(&self) -> FloatPoint {
        self.calibration.center()
    }

    /// Pushes one fresh resting sample into the center-average buffer.
    pub fn update_center_buffer(&mut self) {
        let point = self.read_point();
        self.center_buffer.push(point);
    }

    /// Drops any pending center samples.
    pub fn clear_center_buffer(&mut self) {
        self.center_buffer.clear();
    }

    /// Averages the center buffer into the calibration center.
    ///
    /// Must follow enough [`update_center_buffer`](Self::update_center_buffer)
    /// calls taken at rest. An empty buffer leaves the center unchanged.
    pub fn evaluate_center(&mut self) {
        if let Some(center) = mean_point(self.center_buffer.iter()) {
            self.calibration.set_center(center);
            info!(x = center.x, y = center.y, "Center evaluated");
        }
    }

    /// Stored calibration point at `quad` (0 = center, 1..=4 corners).
    #[must_use]
    pub fn corner(&self, quad: usize) -> Option<FloatPoint> {
        self.calibration.corner(quad)
    }

    /// Overwrites calibration point `quad`. Out-of-range indices are ignored.
    pub fn set_corner(&mut self, quad: usize, point: FloatPoint) {
        self.calibration.set_corner(quad, point);
    }

    /// Zeroes calibration point `quad`. Out-of-range indices are ignored.
    pub fn zero_corner(&mut self, quad: usize) {
        self.calibration.zero_corner(quad);
    }

    /// Reads one sample and keeps it at `quad` if it lies farther from the
    /// center than the stored point.
    ///
    /// Call repeatedly while the user holds the stick at the extreme; the
    /// returned point shows capture progress.
    pub fn capture_corner(&mut self, quad: usize) -> Option<FloatPoint> {
        let point = self.read_point();
        self.calibration.capture(quad, point)
    }

    /// Zeroes every calibration point and falls back to the default radius.
    pub fn clear_calibration(&mut self) {
        self.calibration.clear();
        self.set_minimum_radius();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joystick::geometry::INPUT_XY_MAX;
    use crate::sensor::{LinkSensor, MagSample, MockMagneticSensor};
    use tokio::sync::watch;

    const Z_UP: f32 = 30.0;

    fn square_calibration(center: FloatPoint, half: f32) -> CalibrationSet {
        CalibrationSet::new(
            center,
            [
                FloatPoint::new(center.x - half, center.y + half),
                FloatPoint::new(center.x + half, center.y + half),
                FloatPoint::new(center.x + half, center.y - half),
                FloatPoint::new(center.x - half, center.y - half),
            ],
        )
    }

    fn controller_with(
        settings: JoystickSettings,
    ) -> (watch::Sender<MagSample>, JoystickController<LinkSensor>) {
        let (tx, rx) = watch::channel(MagSample::new(0.0, 0.0, Z_UP));
        let controller = JoystickController::new(LinkSensor::new(rx), settings);
        (tx, controller)
    }

    /// Publishes a reading in joystick axes (the sensor reports them swapped).
    fn send(tx: &watch::Sender<MagSample>, x: f32, y: f32) {
        tx.send_replace(MagSample::new(y, x, Z_UP));
    }

    // ==================== Initialization Tests ====================

    #[test]
    fn test_new_seeds_buffers() {
        let (_tx, joystick) = controller_with(JoystickSettings::default());
        assert_eq!(joystick.raw_buffer().len(), 1);
        assert_eq!(joystick.input_buffer().len(), 1);
        assert_eq!(joystick.output_buffer().len(), 1);
        assert_eq!(joystick.output_point(), IntPoint::ZERO);
        assert_eq!(joystick.raw_point(), FloatPoint::ZERO);
    }

    #[test]
    fn test_new_uses_default_radius_without_calibration() {
        let (_tx, joystick) = controller_with(JoystickSettings::default());
        assert!((joystick.minimum_radius() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_new_detects_orientation() {
        let (_tx, joystick) = controller_with(JoystickSettings::default());
        assert_eq!(joystick.magnet_z_direction(), Direction::Default);
        assert_eq!(joystick.directions().joystick_multipliers(), (-1, 1));
    }

    #[test]
    fn test_z_detection_reads_five_samples() {
        let mut mock = MockMagneticSensor::new();
        mock.expect_refresh().times(Z_SAMPLE_COUNT).return_const(());
        mock.expect_z().times(Z_SAMPLE_COUNT).return_const(-20.0f32);

        let joystick = JoystickController::new(mock, JoystickSettings::default());
        assert_eq!(joystick.magnet_z_direction(), Direction::Inverse);
    }

    #[test]
    fn test_z_samples_override_latched_detection() {
        let (tx, rx) = watch::channel(MagSample::new(0.0, 0.0, 2.0));
        let mut joystick = JoystickController::new(LinkSensor::new(rx), JoystickSettings::default());
        assert_eq!(joystick.magnet_z_direction(), Direction::Fault);

        // Only the averaged batch decides: 2 + 4 * 20 = 82, average 16.4
        joystick.set_magnet_z_samples(&[2.0, 20.0, 20.0, 20.0, 20.0]);
        assert_eq!(joystick.magnet_z_direction(), Direction::Default);
        assert_eq!(joystick.directions().joystick_multipliers(), (-1, 1));

        tx.send_replace(MagSample::new(0.0, 10.0, 20.0));
        joystick.update();
        assert_ne!(joystick.input_point(), IntPoint::ZERO);
    }

    #[test]
    fn test_orientation_fault_collapses_output() {
        let (tx, rx) = watch::channel(MagSample::new(0.0, 0.0, 2.0));
        let mut joystick = JoystickController::new(LinkSensor::new(rx), JoystickSettings::default());
        assert_eq!(joystick.magnet_z_direction(), Direction::Fault);

        tx.send_replace(MagSample::new(15.0, -22.0, 2.0));
        joystick.update();
        assert_eq!(joystick.input_point(), IntPoint::ZERO);
        assert_eq!(joystick.output_point(), IntPoint::ZERO);
    }

    // ==================== Tick Tests ====================

    #[test]
    fn test_concrete_scenario() {
        // Center (0,0), radius 20, x sign +1 (x Inverse cancels the sensor flip)
        let settings = JoystickSettings {
            direction_x: Direction::Inverse,
            calibration: square_calibration(FloatPoint::ZERO, 20.0),
            ..JoystickSettings::default()
        };
        let (tx, mut joystick) = controller_with(settings);
        assert_eq!(joystick.directions().joystick_multipliers(), (1, 1));
        assert!((joystick.minimum_radius() - 20.0).abs() < 1e-4);

        send(&tx, 10.0, 0.0);
        joystick.update();

        assert_eq!(joystick.raw_point(), FloatPoint::new(10.0, 0.0));
        assert_eq!(joystick.input_point(), IntPoint::new(512, 0));
        assert_eq!(joystick.deadzone_value(), 51);
        assert_eq!(joystick.range_value(), 6);
        assert_eq!(joystick.output_point(), IntPoint::new(3, 0));
        assert_eq!((joystick.x_out(), joystick.y_out()), (3, 0));
    }

    #[test]
    fn test_sensor_axes_are_swapped() {
        let settings = JoystickSettings {
            direction_x: Direction::Inverse,
            calibration: square_calibration(FloatPoint::ZERO, 20.0),
            ..JoystickSettings::default()
        };
        let (tx, mut joystick) = controller_with(settings);

        // Sensor y carries joystick x
        tx.send_replace(MagSample::new(0.0, 10.0, Z_UP));
        joystick.update();
        assert_eq!(joystick.input_point(), IntPoint::new(512, 0));
    }

    #[test]
    fn test_raw_at_center_maps_to_origin() {
        let center = FloatPoint::new(4.0, -7.0);
        let settings = JoystickSettings {
            calibration: square_calibration(center, 15.0),
            ..JoystickSettings::default()
        };
        let (tx, mut joystick) = controller_with(settings);

        send(&tx, center.x, center.y);
        joystick.update();
        assert_eq!(joystick.input_point(), IntPoint::ZERO);
        assert_eq!(joystick.output_point(), IntPoint::ZERO);
    }

    #[test]
    fn test_skip_filter_leaves_input_and_output_untouched() {
        let settings = JoystickSettings {
            calibration: square_calibration(FloatPoint::ZERO, 20.0),
            ..JoystickSettings::default()
        };
        let (tx, mut joystick) = controller_with(settings);

        send(&tx, 10.0, 5.0);
        joystick.update();
        assert!(!joystick.last_update_skipped());

        let inputs: Vec<_> = joystick.input_buffer().iter().collect();
        let outputs: Vec<_> = joystick.output_buffer().iter().collect();
        let raw_len = joystick.raw_buffer().len();

        send(&tx, 10.05, 4.97);
        joystick.update();

        assert!(joystick.last_update_skipped());
        assert_eq!(joystick.input_buffer().iter().collect::<Vec<_>>(), inputs);
        assert_eq!(joystick.output_buffer().iter().collect::<Vec<_>>(), outputs);
        assert_eq!(joystick.raw_buffer().len(), raw_len + 1);
        assert_eq!(joystick.raw_point(), FloatPoint::new(10.05, 4.97));
    }

    #[test]
    fn test_first_tick_at_rest_is_skipped() {
        let (tx, mut joystick) = controller_with(JoystickSettings::default());
        send(&tx, 0.0, 0.05);
        joystick.update();
        assert!(joystick.last_update_skipped());
        assert_eq!(joystick.input_buffer().len(), 1);
    }

    #[test]
    fn test_buffers_are_bounded() {
        let (tx, mut joystick) = controller_with(JoystickSettings::default());
        for i in 0..50 {
            send(&tx, i as f32, -(i as f32));
            joystick.update();
        }
        assert_eq!(joystick.raw_buffer().len(), RAW_BUFFER_SIZE);
        assert_eq!(joystick.input_buffer().len(), INPUT_BUFFER_SIZE);
        assert_eq!(joystick.output_buffer().len(), OUTPUT_BUFFER_SIZE);
        assert_eq!(joystick.raw_point(), FloatPoint::new(49.0, -49.0));
    }

    #[test]
    fn test_outside_envelope_clamps() {
        let settings = JoystickSettings {
            calibration: square_calibration(FloatPoint::ZERO, 10.0),
            ..JoystickSettings::default()
        };
        let (tx, mut joystick) = controller_with(settings);

        send(&tx, 0.0, 40.0);
        joystick.update();
        assert_eq!(joystick.input_point(), IntPoint::new(0, INPUT_XY_MAX));
    }

    #[test]
    fn test_gamepad_mode_full_deflection() {
        let settings = JoystickSettings {
            mode: OperatingMode::Gamepad,
            calibration: square_calibration(FloatPoint::ZERO, 10.0),
            ..JoystickSettings::default()
        };
        let (tx, mut joystick) = controller_with(settings);

        send(&tx, 0.0, -40.0);
        joystick.update();
        assert_eq!(joystick.output_point(), IntPoint::new(0, -127));
    }

    #[test]
    fn test_reset_reseeds_buffers() {
        let (tx, mut joystick) = controller_with(JoystickSettings::default());
        send(&tx, 12.0, 3.0);
        joystick.update();
        assert_ne!(joystick.raw_point(), FloatPoint::ZERO);

        joystick.reset();
        assert_eq!(joystick.raw_buffer().len(), 1);
        assert_eq!(joystick.raw_point(), FloatPoint::ZERO);
        assert_eq!(joystick.output_point(), IntPoint::ZERO);
    }

    // ==================== Settings Tests ====================

    #[test]
    fn test_output_range_and_mode() {
        let (_tx, mut joystick) = controller_with(JoystickSettings::default());
        joystick.set_output_range(8);
        assert_eq!(joystick.output_range(), 8);
        assert_eq!(joystick.range_value(), 12);

        joystick.set_operating_mode(OperatingMode::Gamepad);
        assert_eq!(joystick.operating_mode(), OperatingMode::Gamepad);
        assert_eq!(joystick.range_value(), 127);
    }

    #[test]
    fn test_set_deadzone() {
        let (_tx, mut joystick) = controller_with(JoystickSettings::default());
        joystick.set_deadzone(false, 0.1);
        assert!(!joystick.deadzone_enabled());
        assert_eq!(joystick.deadzone_value(), 0);

        joystick.set_deadzone(true, 0.1);
        assert_eq!(joystick.deadzone_value(), 102);
    }

    #[test]
    fn test_axis_direction_setters() {
        let (_tx, mut joystick) = controller_with(JoystickSettings::default());
        joystick.set_magnet_x_direction(Direction::Inverse);
        joystick.set_magnet_y_direction(Direction::Inverse);
        assert_eq!(joystick.magnet_x_direction(), Direction::Inverse);
        assert_eq!(joystick.magnet_y_direction(), Direction::Inverse);
        assert_eq!(joystick.directions().joystick_multipliers(), (1, -1));
    }

    #[test]
    fn test_set_magnet_direction_redetects_z() {
        let (tx, mut joystick) = controller_with(JoystickSettings::default());
        tx.send_replace(MagSample::new(0.0, 0.0, -30.0));

        joystick.set_magnet_direction(Direction::Default, Direction::Default);
        assert_eq!(joystick.magnet_z_direction(), Direction::Inverse);
        assert_eq!(joystick.directions().joystick_multipliers(), (1, -1));
    }

    // ==================== Calibration Tests ====================

    #[test]
    fn test_center_evaluation_averages_buffer() {
        let (tx, mut joystick) = controller_with(JoystickSettings::default());

        for i in 0..CENTER_BUFFER_SIZE {
            send(&tx, 2.0 + i as f32, -1.0);
            joystick.update_center_buffer();
        }
        joystick.evaluate_center();

        let center = joystick.center();
        assert!((center.x - 4.0).abs() < 1e-5);
        assert!((center.y + 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_center_buffer_keeps_latest_samples() {
        let (tx, mut joystick) = controller_with(JoystickSettings::default());

        // An early outlier falls out of the buffer
        send(&tx, 50.0, 50.0);
        joystick.update_center_buffer();
        for _ in 0..CENTER_BUFFER_SIZE {
            send(&tx, 1.0, 2.0);
            joystick.update_center_buffer();
        }
        joystick.evaluate_center();
        assert_eq!(joystick.center(), FloatPoint::new(1.0, 2.0));
    }

    #[test]
    fn test_evaluate_center_with_empty_buffer_is_noop() {
        let settings = JoystickSettings {
            calibration: square_calibration(FloatPoint::new(1.0, 1.0), 10.0),
            ..JoystickSettings::default()
        };
        let (_tx, mut joystick) = controller_with(settings);
        joystick.evaluate_center();
        assert_eq!(joystick.center(), FloatPoint::new(1.0, 1.0));
    }

    #[test]
    fn test_capture_corner_keeps_extreme() {
        let (tx, mut joystick) = controller_with(JoystickSettings::default());

        send(&tx, -10.0, 10.0);
        assert_eq!(joystick.capture_corner(1), Some(FloatPoint::new(-10.0, 10.0)));

        send(&tx, -18.0, 17.0);
        assert_eq!(joystick.capture_corner(1), Some(FloatPoint::new(-18.0, 17.0)));

        send(&tx, -12.0, 12.0);
        assert_eq!(joystick.capture_corner(1), Some(FloatPoint::new(-18.0, 17.0)));
        assert_eq!(joystick.corner(1), Some(FloatPoint::new(-18.0, 17.0)));
    }

    #[test]
    fn test_invalid_quadrant_is_ignored() {
        let (tx, mut joystick) = controller_with(JoystickSettings::default());
        let before = joystick.calibration();

        send(&tx, 20.0, 20.0);
        assert_eq!(joystick.capture_corner(9), None);
        joystick.set_corner(5, FloatPoint::new(1.0, 1.0));
        joystick.zero_corner(6);

        assert_eq!(joystick.calibration(), before);
        assert_eq!(joystick.corner(5), None);
    }

    #[test]
    fn test_minimum_radius_follows_corners() {
        let (_tx, mut joystick) = controller_with(JoystickSettings::default());
        joystick.set_corner(1, FloatPoint::new(-12.0, 12.0));
        joystick.set_corner(2, FloatPoint::new(14.0, 14.0));
        // Not applied until requested
        assert!((joystick.minimum_radius() - 30.0).abs() < 1e-4);

        joystick.set_minimum_radius();
        assert!((joystick.minimum_radius() - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_clear_calibration() {
        let settings = JoystickSettings {
            calibration: square_calibration(FloatPoint::new(2.0, 2.0), 10.0),
            ..JoystickSettings::default()
        };
        let (_tx, mut joystick) = controller_with(settings);
        joystick.clear_calibration();
        assert_eq!(joystick.calibration(), CalibrationSet::default());
        assert!((joystick.minimum_radius() - 30.0).abs() < 1e-4);
    }
}
