//! # Serial Communication Module
//!
//! Handles the USB serial connection to the sensor bridge board.
//!
//! This module handles:
//! - Opening the bridge port (explicit path or auto-detect)
//! - Reading the byte stream and decoding link frames
//! - Publishing each decoded sample to the control loop via `watch`
//!
//! The reader runs as its own task. The control loop never waits on it; it
//! always reads the latest published sample through
//! [`LinkSensor`](crate::sensor::LinkSensor).

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::watch;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

use crate::error::{JoystickError, Result};
use crate::link::decoder::FrameDecoder;
use crate::link::protocol::decode_mag_sample;
use crate::sensor::MagSample;

/// Default bridge baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Port name that selects auto-detection.
pub const AUTO_PORT: &str = "auto";

/// Bridge device paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyACM0", // USB CDC (native USB microcontrollers)
    "/dev/ttyUSB0", // USB-to-serial adapters
];

/// Read chunk size.
const READ_BUFFER_SIZE: usize = 256;

/// Sensor bridge serial port.
pub struct SensorSerial {
    port: tokio_serial::SerialStream,
    device_path: String,
}

impl std::fmt::Debug for SensorSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl SensorSerial {
    /// Open the bridge port.
    ///
    /// # Arguments
    ///
    /// * `port` - Device path, or `"auto"` to try the common USB serial paths
    /// * `baud_rate` - Link baud rate
    ///
    /// # Errors
    ///
    /// Returns [`JoystickError::SerialPortNotFound`] if no candidate opens.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use magjoy::serial::SensorSerial;
    ///
    /// let serial = SensorSerial::open("auto", 115_200)?;
    /// println!("Bridge at {}", serial.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(port: &str, baud_rate: u32) -> Result<Self> {
        if port == AUTO_PORT {
            Self::open_with_paths(DEFAULT_DEVICE_PATHS, baud_rate)
        } else {
            Self::open_with_paths(&[port], baud_rate)
        }
    }

    /// Open the first candidate path that works.
    pub fn open_with_paths(paths: &[&str], baud_rate: u32) -> Result<Self> {
        for path in paths {
            debug!("Trying to open serial port: {}", path);

            match Self::open_port(path, baud_rate) {
                Ok(port) => {
                    info!("Opened sensor bridge at {} ({} baud)", path, baud_rate);
                    return Ok(Self {
                        port,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                }
            }
        }

        Err(JoystickError::SerialPortNotFound(paths.join(", ")))
    }

    /// Open one port as 8N1 without flow control.
    fn open_port(path: &str, baud_rate: u32) -> Result<tokio_serial::SerialStream> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| JoystickError::Serial(format!("Failed to open {}: {}", path, e)))
    }

    /// Device path of the opened port.
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// The underlying async stream, for [`run_reader`].
    pub fn into_stream(self) -> tokio_serial::SerialStream {
        self.port
    }
}

/// Counters from one reader run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Valid frames decoded
    pub frames: u64,
    /// Samples published
    pub samples: u64,
    /// Frames of a type this host does not use
    pub skipped_frames: u64,
    /// Frames rejected by checksum
    pub crc_errors: u64,
    /// Bytes discarded while resynchronizing
    pub dropped_bytes: u64,
}

/// Pump the link byte stream into the sample channel.
///
/// Returns when the stream reaches EOF or every receiver is gone.
///
/// # Errors
///
/// Returns [`JoystickError::Serial`] if reading from the stream fails.
pub async fn run_reader<R>(mut reader: R, tx: watch::Sender<MagSample>) -> Result<LinkStats>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = FrameDecoder::new();
    let mut stats = LinkStats::default();
    let mut buf = [0u8; READ_BUFFER_SIZE];

    loop {
        let n = reader
            .read(&mut buf)
            .await
            .map_err(|e| JoystickError::Serial(format!("Failed to read sensor link: {}", e)))?;

        if n == 0 {
            warn!("Sensor link closed");
            break;
        }

        decoder.extend(&buf[..n]);
        while let Some(frame) = decoder.next_frame() {
            stats.frames += 1;

            if !frame.is_mag_sample() {
                debug!("Skipping frame type 0x{:02X}", frame.frame_type);
                stats.skipped_frames += 1;
                continue;
            }

            match decode_mag_sample(&frame.payload) {
                Ok(sample) => {
                    tx.send_replace(sample);
                    stats.samples += 1;
                }
                Err(e) => {
                    debug!("Bad sample frame: {}", e);
                    stats.skipped_frames += 1;
                }
            }
        }

        if tx.is_closed() {
            debug!("Sample receiver dropped, stopping reader");
            break;
        }
    }

    stats.crc_errors = decoder.crc_errors();
    stats.dropped_bytes = decoder.dropped_bytes();
    info!(
        frames = stats.frames,
        samples = stats.samples,
        crc_errors = stats.crc_errors,
        "Sensor link reader stopped"
    );
    Ok(stats)
}
