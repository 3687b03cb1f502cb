//! # Joystick Module
//!
//! Turns raw 3-axis magnetic readings into bounded integer joystick output.
//!
//! This module handles:
//! - Fixed-size sample history ([`buffer`])
//! - Point types and scalar mapping helpers ([`point`])
//! - Calibration points and operating radius ([`calibration`])
//! - Magnet orientation and axis polarity ([`direction`])
//! - Centering, envelope clamp and integer mapping ([`geometry`])
//! - Deadzone and speed/range scaling ([`response`])
//! - Per-tick orchestration ([`controller`])
//! - Tick-driven calibration sequencing ([`session`])

pub mod buffer;
pub mod calibration;
pub mod controller;
pub mod direction;
pub mod geometry;
pub mod point;
pub mod response;
pub mod session;

pub use calibration::CalibrationSet;
pub use controller::{JoystickController, JoystickSettings};
pub use direction::Direction;
pub use point::{FloatPoint, IntPoint};
pub use response::OperatingMode;
pub use session::{CalibrationSession, CalibrationStep};
