//! # magjoy
//!
//! Calibrated magnetic-field joystick input pipeline.
//!
//! A magnet on the stick moves above a 3-axis magnetometer. This library turns
//! each raw field reading into bounded integer pointer or gamepad output:
//! centering on a calibrated rest point, clamping to a circular operating
//! envelope, correcting axis polarity, and shaping the result with a deadzone
//! and a speed-dependent range.
//!
//! The host binary reads samples from a sensor bridge board over USB serial.

pub mod config;
pub mod error;
pub mod joystick;
pub mod link;
pub mod sensor;
pub mod serial;
pub mod telemetry;
