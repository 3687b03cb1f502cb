//! # Sensor Link Module
//!
//! Wire protocol spoken by the sensor bridge board that streams magnetic
//! samples over USB serial.
//!
//! This module handles:
//! - Frame layout and sample payload conversion ([`protocol`])
//! - CRC8-DVB-S2 checksum ([`crc`])
//! - Frame encoding ([`encoder`])
//! - Whole-frame and streaming decoding with resynchronization ([`decoder`])
//!
//! ## Frame
//!
//! ```text
//! +------+-----+------+-----------+-----+
//! | 0xA5 | len | type | payload   | crc |
//! +------+-----+------+-----------+-----+
//! ```
//!
//! `len` counts `type + payload + crc`; the CRC covers `len + type + payload`.

pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod protocol;
