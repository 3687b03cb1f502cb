//! # Sensor Module
//!
//! The magnetic sensor collaborator of the joystick pipeline.
//!
//! This module handles:
//! - The [`MagneticSensor`] trait the controller reads through
//! - [`MagSample`], one 3-axis reading in mT
//! - [`LinkSensor`], a sensor fed by the serial link task over a
//!   `tokio::sync::watch` channel
//!
//! Reads are synchronous and never fail: a sensor hands out the latest
//! validated sample it has, or the last known good one.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// One 3-axis magnetic field reading in millitesla.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MagSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MagSample {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Synchronous 3-axis magnetic sensor.
///
/// `refresh` latches a new reading; the axis accessors return the latched
/// values until the next refresh.
#[cfg_attr(test, mockall::automock)]
pub trait MagneticSensor {
    /// Latch the latest reading.
    fn refresh(&mut self);

    /// Field along the sensor x axis in mT.
    fn x(&self) -> f32;

    /// Field along the sensor y axis in mT.
    fn y(&self) -> f32;

    /// Field along the sensor z axis in mT.
    fn z(&self) -> f32;
}

/// Sensor backed by the latest sample published on a watch channel.
///
/// The serial link task owns the [`watch::Sender`]; the control loop owns
/// this end. If the link stalls or closes, `refresh` keeps returning the last
/// sample it saw.
///
/// # Examples
///
/// ```
/// use magjoy::sensor::{LinkSensor, MagSample, MagneticSensor};
/// use tokio::sync::watch;
///
/// let (tx, rx) = watch::channel(MagSample::default());
/// let mut sensor = LinkSensor::new(rx);
///
/// tx.send_replace(MagSample::new(1.0, 2.0, 30.0));
/// sensor.refresh();
/// assert_eq!(sensor.z(), 30.0);
/// ```
#[derive(Debug)]
pub struct LinkSensor {
    rx: watch::Receiver<MagSample>,
    latched: MagSample,
}

impl LinkSensor {
    #[must_use]
    pub fn new(rx: watch::Receiver<MagSample>) -> Self {
        let latched = *rx.borrow();
        Self { rx, latched }
    }

    /// The currently latched sample.
    #[must_use]
    pub fn sample(&self) -> MagSample {
        self.latched
    }
}

impl MagneticSensor for LinkSensor {
    fn refresh(&mut self) {
        self.latched = *self.rx.borrow_and_update();
    }

    fn x(&self) -> f32 {
        self.latched.x
    }

    fn y(&self) -> f32 {
        self.latched.y
    }

    fn z(&self) -> f32 {
        self.latched.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_sensor_latches_on_refresh() {
        let (tx, rx) = watch::channel(MagSample::new(1.0, 1.0, 1.0));
        let mut sensor = LinkSensor::new(rx);
        assert_eq!(sensor.sample(), MagSample::new(1.0, 1.0, 1.0));

        tx.send_replace(MagSample::new(4.0, 5.0, 6.0));
        // Not visible until refresh
        assert_eq!(sensor.x(), 1.0);

        sensor.refresh();
        assert_eq!(sensor.x(), 4.0);
        assert_eq!(sensor.y(), 5.0);
        assert_eq!(sensor.z(), 6.0);
    }

    #[test]
    fn test_link_sensor_keeps_last_sample_after_close() {
        let (tx, rx) = watch::channel(MagSample::default());
        let mut sensor = LinkSensor::new(rx);

        tx.send_replace(MagSample::new(-3.0, 2.0, 25.0));
        drop(tx);

        sensor.refresh();
        sensor.refresh();
        assert_eq!(sensor.sample(), MagSample::new(-3.0, 2.0, 25.0));
    }

    #[test]
    fn test_mock_sensor_contract() {
        let mut mock = MockMagneticSensor::new();
        mock.expect_refresh().times(1).return_const(());
        mock.expect_z().return_const(-12.0f32);

        mock.refresh();
        assert_eq!(mock.z(), -12.0);
    }
}
