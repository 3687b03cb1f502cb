//! # Sensor Link Encoder
//!
//! Builds complete frames. The host only receives samples, so this is used to
//! script the bridge side in tests and tooling.

use super::crc::Crc8;
use super::protocol::{encode_mag_sample, LinkFrame, FRAMETYPE_MAG_SAMPLE, SYNC_BYTE};
use crate::sensor::MagSample;

/// Encode a frame as `sync | len | type | payload | crc`.
///
/// # Examples
///
/// ```
/// use magjoy::link::encoder::encode_frame;
/// use magjoy::link::protocol::LinkFrame;
///
/// let frame = LinkFrame::new(0x01, vec![0; 6]).unwrap();
/// let bytes = encode_frame(&frame);
/// assert_eq!(bytes.len(), 10);
/// assert_eq!(bytes[0], 0xA5);
/// assert_eq!(bytes[1], 8);
/// ```
#[must_use]
pub fn encode_frame(frame: &LinkFrame) -> Vec<u8> {
    let length = frame.length();

    let mut crc = Crc8::new();
    crc.update(&[length, frame.frame_type]);
    crc.update(&frame.payload);

    let mut bytes = Vec::with_capacity(2 + length as usize);
    bytes.push(SYNC_BYTE);
    bytes.push(length);
    bytes.push(frame.frame_type);
    bytes.extend_from_slice(&frame.payload);
    bytes.push(crc.finish());
    bytes
}

/// Encode one magnetic sample frame (10 bytes).
#[must_use]
pub fn encode_mag_sample_frame(sample: MagSample) -> Vec<u8> {
    let frame = LinkFrame {
        frame_type: FRAMETYPE_MAG_SAMPLE,
        payload: encode_mag_sample(sample).to_vec(),
    };
    encode_frame(&frame)
}
