//! # Calibration Session
//!
//! Sequences the controller's calibration operations one tick at a time.
//!
//! A full calibration samples the resting center first, then captures the
//! four corners in order (top left, top right, bottom right, bottom left).
//! A center reset only re-samples the center. Either way the operating radius
//! is recomputed once the last step finishes.
//!
//! The session never blocks: the control loop calls [`CalibrationSession::tick`]
//! at its normal cadence and shows [`CalibrationSession::prompt`] to the user.

use tracing::{debug, info};

use super::calibration::CORNER_INDICES;
use super::controller::JoystickController;
use crate::sensor::MagneticSensor;

/// Current step of a calibration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationStep {
    Idle,
    CapturingCenter,
    /// Capturing the corner at this calibration index (1 to 4).
    CapturingCorner(usize),
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionKind {
    Full,
    CenterReset,
}

/// Tick-driven calibration state machine.
///
/// # Examples
///
/// ```
/// use magjoy::joystick::controller::{JoystickController, JoystickSettings};
/// use magjoy::joystick::session::{CalibrationSession, CalibrationStep};
/// use magjoy::sensor::{LinkSensor, MagSample};
/// use tokio::sync::watch;
///
/// let (_tx, rx) = watch::channel(MagSample::new(0.0, 0.0, 30.0));
/// let mut joystick = JoystickController::new(LinkSensor::new(rx), JoystickSettings::default());
///
/// let mut session = CalibrationSession::center_reset(3);
/// session.start();
/// while !session.is_complete() {
///     session.tick(&mut joystick);
/// }
/// assert_eq!(session.step(), CalibrationStep::Complete);
/// ```
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    kind: SessionKind,
    step: CalibrationStep,
    ticks_in_step: u32,
    corner_hold_ticks: u32,
    center_samples: u32,
}

impl CalibrationSession {
    /// Full calibration: center, then all four corners.
    ///
    /// # Arguments
    ///
    /// * `corner_hold_ticks` - Ticks spent capturing each corner
    /// * `center_samples` - Resting samples averaged into the center
    #[must_use]
    pub fn full(corner_hold_ticks: u32, center_samples: u32) -> Self {
        Self::with_kind(SessionKind::Full, corner_hold_ticks, center_samples)
    }

    /// Re-samples the center only, keeping the stored corners.
    #[must_use]
    pub fn center_reset(center_samples: u32) -> Self {
        Self::with_kind(SessionKind::CenterReset, 0, center_samples)
    }

    fn with_kind(kind: SessionKind, corner_hold_ticks: u32, center_samples: u32) -> Self {
        Self {
            kind,
            step: CalibrationStep::Idle,
            ticks_in_step: 0,
            corner_hold_ticks: corner_hold_ticks.max(1),
            center_samples: center_samples.max(1),
        }
    }

    /// Begins (or restarts) the session at the center step.
    pub fn start(&mut self) {
        info!(kind = ?self.kind, "Calibration started");
        self.enter(CalibrationStep::CapturingCenter);
    }

    #[must_use]
    pub fn step(&self) -> CalibrationStep {
        self.step
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.step == CalibrationStep::Complete
    }

    /// Ticks already spent in the current step.
    #[must_use]
    pub fn ticks_in_step(&self) -> u32 {
        self.ticks_in_step
    }

    /// Instruction to show the user for the current step.
    #[must_use]
    pub fn prompt(&self) -> &'static str {
        match self.step {
            CalibrationStep::Idle => "Calibration not started",
            CalibrationStep::CapturingCenter => "Release, do not move joystick",
            CalibrationStep::CapturingCorner(1) => "Move joystick to top left and hold",
            CalibrationStep::CapturingCorner(2) => "Move joystick to top right and hold",
            CalibrationStep::CapturingCorner(3) => "Move joystick to bottom right and hold",
            CalibrationStep::CapturingCorner(_) => "Move joystick to bottom left and hold",
            CalibrationStep::Complete => "Joystick calibrated",
        }
    }

    /// Performs one calibration operation and advances when the current
    /// step's tick budget is used up. Returns the step after the tick.
    ///
    /// Does nothing while idle or complete.
    pub fn tick<S: MagneticSensor>(&mut self, joystick: &mut JoystickController<S>) -> CalibrationStep {
        match self.step {
            CalibrationStep::Idle | CalibrationStep::Complete => {}
            CalibrationStep::CapturingCenter => {
                if self.ticks_in_step == 0 {
                    joystick.clear_center_buffer();
                }
                joystick.update_center_buffer();
                self.ticks_in_step += 1;

                if self.ticks_in_step >= self.center_samples {
                    joystick.evaluate_center();
                    match self.kind {
                        SessionKind::Full => self.enter_corner(joystick, CORNER_INDICES[0]),
                        SessionKind::CenterReset => self.finish(joystick),
                    }
                }
            }
            CalibrationStep::CapturingCorner(quad) => {
                joystick.capture_corner(quad);
                self.ticks_in_step += 1;

                if self.ticks_in_step >= self.corner_hold_ticks {
                    match CORNER_INDICES.iter().position(|&q| q == quad) {
                        Some(i) if i + 1 < CORNER_INDICES.len() => {
                            self.enter_corner(joystick, CORNER_INDICES[i + 1]);
                        }
                        _ => self.finish(joystick),
                    }
                }
            }
        }
        self.step
    }

    fn enter(&mut self, step: CalibrationStep) {
        self.step = step;
        self.ticks_in_step = 0;
        debug!(?step, prompt = self.prompt(), "Calibration step");
    }

    fn enter_corner<S: MagneticSensor>(&mut self, joystick: &mut JoystickController<S>, quad: usize) {
        joystick.zero_corner(quad);
        self.enter(CalibrationStep::CapturingCorner(quad));
    }

    fn finish<S: MagneticSensor>(&mut self, joystick: &mut JoystickController<S>) {
        joystick.set_minimum_radius();
        self.enter(CalibrationStep::Complete);
        info!(
            center = ?joystick.center(),
            radius = joystick.minimum_radius(),
            "Calibration complete"
        );
    }
}
