//! # Sensor Link Decoder
//!
//! Decodes frames from the bridge byte stream.
//!
//! [`decode_frame`] validates one complete frame. [`FrameDecoder`] accumulates
//! arbitrary read chunks, yields every complete frame in order and
//! resynchronizes on the next sync byte after garbage or a corrupted frame.

use bytes::{Buf, BytesMut};
use tracing::trace;

use super::crc::crc8_dvb_s2;
use super::protocol::{LinkFrame, MAX_FRAME_LENGTH, MIN_FRAME_LENGTH, SYNC_BYTE};
use crate::error::{JoystickError, Result};

/// Decode one complete frame.
///
/// # Arguments
///
/// * `frame` - Frame bytes starting at the sync byte; trailing bytes are ignored
///
/// # Errors
///
/// Returns [`JoystickError::SensorLink`] if:
/// - Frame is too short
/// - Sync byte is incorrect
/// - Length field is out of range
/// - CRC check fails
pub fn decode_frame(frame: &[u8]) -> Result<LinkFrame> {
    // sync(1) + len(1) + type(1) + crc(1)
    if frame.len() < 4 {
        return Err(JoystickError::SensorLink("Frame too short".to_string()));
    }

    if frame[0] != SYNC_BYTE {
        return Err(JoystickError::SensorLink(format!(
            "Invalid sync byte: 0x{:02X}",
            frame[0]
        )));
    }

    let length = frame[1];
    if !(MIN_FRAME_LENGTH..=MAX_FRAME_LENGTH).contains(&length) {
        return Err(JoystickError::SensorLink(format!(
            "Invalid frame length: {}",
            length
        )));
    }

    let length = usize::from(length);
    if frame.len() < 2 + length {
        return Err(JoystickError::SensorLink(format!(
            "Frame too short: expected {} bytes, got {}",
            2 + length,
            frame.len()
        )));
    }

    let received = frame[1 + length];
    let calculated = crc8_dvb_s2(&frame[1..1 + length]);
    if received != calculated {
        return Err(JoystickError::SensorLink(format!(
            "CRC mismatch: expected 0x{:02X}, got 0x{:02X}",
            calculated, received
        )));
    }

    LinkFrame::new(frame[2], frame[3..1 + length].to_vec())
}

/// Streaming frame decoder.
///
/// # Examples
///
/// ```
/// use magjoy::link::decoder::FrameDecoder;
/// use magjoy::link::encoder::encode_mag_sample_frame;
/// use magjoy::sensor::MagSample;
///
/// let bytes = encode_mag_sample_frame(MagSample::new(1.0, 2.0, 30.0));
/// let mut decoder = FrameDecoder::new();
///
/// decoder.extend(&bytes[..4]);
/// assert!(decoder.next_frame().is_none());
///
/// decoder.extend(&bytes[4..]);
/// assert!(decoder.next_frame().is_some());
/// ```
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
    crc_errors: u64,
    dropped_bytes: u64,
}

impl FrameDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(64),
            ..Self::default()
        }
    }

    /// Append bytes read from the link.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Next complete valid frame, or `None` until more bytes arrive.
    pub fn next_frame(&mut self) -> Option<LinkFrame> {
        loop {
            match self.buf.iter().position(|&b| b == SYNC_BYTE) {
                Some(0) => {}
                Some(skip) => self.drop_bytes(skip),
                None => {
                    let all = self.buf.len();
                    self.drop_bytes(all);
                    return None;
                }
            }

            if self.buf.len() < 2 {
                return None;
            }

            let length = self.buf[1];
            if !(MIN_FRAME_LENGTH..=MAX_FRAME_LENGTH).contains(&length) {
                // Not a real sync byte
                self.drop_bytes(1);
                continue;
            }

            let total = 2 + usize::from(length);
            if self.buf.len() < total {
                return None;
            }

            match decode_frame(&self.buf[..total]) {
                Ok(frame) => {
                    self.buf.advance(total);
                    return Some(frame);
                }
                Err(e) => {
                    trace!("Discarding frame: {}", e);
                    self.crc_errors += 1;
                    self.drop_bytes(1);
                }
            }
        }
    }

    fn drop_bytes(&mut self, count: usize) {
        self.buf.advance(count);
        self.dropped_bytes += count as u64;
    }

    /// Frames rejected by the checksum so far.
    #[must_use]
    pub fn crc_errors(&self) -> u64 {
        self.crc_errors
    }

    /// Bytes discarded while searching for a frame.
    #[must_use]
    pub fn dropped_bytes(&self) -> u64 {
        self.dropped_bytes
    }

    /// Bytes buffered but not yet consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
