//! # Sensor Link Protocol
//!
//! Frame constants and payload types of the sensor bridge link.

use crate::error::{JoystickError, Result};
use crate::sensor::MagSample;

/// Frame sync byte.
pub const SYNC_BYTE: u8 = 0xA5;

/// Magnetic sample frame type.
pub const FRAMETYPE_MAG_SAMPLE: u8 = 0x01;

/// Largest payload a frame may carry.
pub const MAX_PAYLOAD_SIZE: usize = 32;

/// Smallest `len` field: type + crc.
pub const MIN_FRAME_LENGTH: u8 = 2;

/// Largest `len` field: type + max payload + crc.
pub const MAX_FRAME_LENGTH: u8 = (MAX_PAYLOAD_SIZE + 2) as u8;

/// Sample payload: x, y, z as big-endian `i16`.
pub const MAG_SAMPLE_PAYLOAD_SIZE: usize = 6;

/// Field per count of the TLV493D-class sensor on the bridge.
pub const MT_PER_LSB: f32 = 0.098;

/// One link frame with its checksum already verified or not yet computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFrame {
    pub frame_type: u8,
    pub payload: Vec<u8>,
}

impl LinkFrame {
    /// Create a frame.
    ///
    /// # Errors
    ///
    /// Returns [`JoystickError::SensorLink`] if the payload exceeds
    /// [`MAX_PAYLOAD_SIZE`].
    pub fn new(frame_type: u8, payload: Vec<u8>) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(JoystickError::SensorLink(format!(
                "Payload size {} exceeds maximum {}",
                payload.len(),
                MAX_PAYLOAD_SIZE
            )));
        }
        Ok(Self { frame_type, payload })
    }

    /// Value of the `len` field: type + payload + crc.
    #[must_use]
    pub fn length(&self) -> u8 {
        (self.payload.len() + 2) as u8
    }

    /// Whether this frame carries a magnetic sample.
    #[must_use]
    pub fn is_mag_sample(&self) -> bool {
        self.frame_type == FRAMETYPE_MAG_SAMPLE
    }
}

/// Converts a field value in mT to sensor counts, saturating at the `i16` range.
#[must_use]
pub fn mt_to_counts(mt: f32) -> i16 {
    let counts = (mt / MT_PER_LSB).round();
    if counts.is_nan() {
        0
    } else {
        counts.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
    }
}

/// Converts sensor counts to mT.
#[inline]
#[must_use]
pub fn counts_to_mt(counts: i16) -> f32 {
    f32::from(counts) * MT_PER_LSB
}

/// Packs a sample into its 6-byte payload.
#[must_use]
pub fn encode_mag_sample(sample: MagSample) -> [u8; MAG_SAMPLE_PAYLOAD_SIZE] {
    let mut payload = [0u8; MAG_SAMPLE_PAYLOAD_SIZE];
    for (chunk, value) in payload.chunks_exact_mut(2).zip([sample.x, sample.y, sample.z]) {
        chunk.copy_from_slice(&mt_to_counts(value).to_be_bytes());
    }
    payload
}

/// Unpacks a sample payload.
///
/// # Errors
///
/// Returns [`JoystickError::SensorLink`] if the payload is shorter than
/// [`MAG_SAMPLE_PAYLOAD_SIZE`].
pub fn decode_mag_sample(payload: &[u8]) -> Result<MagSample> {
    if payload.len() < MAG_SAMPLE_PAYLOAD_SIZE {
        return Err(JoystickError::SensorLink(format!(
            "Sample payload too short: {} bytes",
            payload.len()
        )));
    }

    let axis = |i: usize| counts_to_mt(i16::from_be_bytes([payload[i], payload[i + 1]]));
    Ok(MagSample::new(axis(0), axis(2), axis(4)))
}
