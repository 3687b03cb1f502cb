//! # magjoy
//!
//! Runs the magnetic joystick pipeline against a sensor bridge on USB serial.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber
//!    - Load configuration
//!    - Open the sensor bridge and start the link reader task
//!    - Wait for the first sample, then build the joystick controller
//!
//! 2. **Calibration** (`--calibrate` or `--center-reset`)
//!    - Step through the calibration session at the polling rate
//!    - Write the captured points back into the configuration file
//!
//! 3. **Main Loop**
//!    - Run one pipeline tick per polling interval
//!    - Record telemetry when enabled
//!    - Log status periodically
//!    - Handle Ctrl+C for graceful shutdown
//!
//! Expected output:
//! ```text
//! INFO magjoy: magjoy v0.1.0 starting...
//! INFO magjoy::serial: Opened sensor bridge at /dev/ttyACM0 (115200 baud)
//! INFO magjoy::joystick::controller: Joystick initialized mode=Mouse radius=18.2 deadzone=51 range=6
//! INFO magjoy: Polling joystick every 10 ms
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tokio::time::{interval, timeout, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use magjoy::config::Config;
use magjoy::error::JoystickError;
use magjoy::joystick::direction::Z_SAMPLE_COUNT;
use magjoy::joystick::{CalibrationSession, JoystickController};
use magjoy::sensor::{LinkSensor, MagSample, MagneticSensor};
use magjoy::serial::{run_reader, SensorSerial};
use magjoy::telemetry::{TelemetryLogger, TickRecord};

/// Magnetic joystick input pipeline
#[derive(Debug, Parser)]
#[command(name = "magjoy", version, about)]
struct Args {
    /// Configuration file (also receives calibration results)
    #[arg(short, long, default_value = "config/default.toml")]
    config: PathBuf,

    /// Run a full calibration (center and four corners) before polling
    #[arg(long, conflicts_with = "center_reset")]
    calibrate: bool,

    /// Re-sample the center only, keeping stored corners
    #[arg(long)]
    center_reset: bool,
}

impl Args {
    fn calibration_session(&self, config: &Config) -> Option<CalibrationSession> {
        let center_samples = config.calibration.center_samples;
        if self.calibrate {
            Some(CalibrationSession::full(config.corner_hold_ticks(), center_samples))
        } else if self.center_reset {
            Some(CalibrationSession::center_reset(center_samples))
        } else {
            None
        }
    }
}

/// Polling ticks per `period_ms`, at least one.
fn ticks_per(period_ms: u64, poll_interval_ms: u64) -> u64 {
    (period_ms / poll_interval_ms.max(1)).max(1)
}

/// Wait until the link reader publishes a sample not yet seen.
async fn wait_for_first_sample(rx: &mut watch::Receiver<MagSample>, timeout_ms: u64) -> Result<MagSample, JoystickError> {
    match timeout(Duration::from_millis(timeout_ms), rx.changed()).await {
        Ok(Ok(())) => Ok(*rx.borrow_and_update()),
        Ok(Err(_)) => Err(JoystickError::SensorLink(
            "link closed before the first sample".to_string(),
        )),
        Err(_) => Err(JoystickError::SensorTimeout(timeout_ms)),
    }
}

/// Collect `count` z readings, starting with `first`, from distinct link samples.
async fn collect_z_samples(
    rx: &mut watch::Receiver<MagSample>,
    first: MagSample,
    count: usize,
    timeout_ms: u64,
) -> Result<Vec<f32>, JoystickError> {
    let mut samples = Vec::with_capacity(count);
    samples.push(first.z);
    while samples.len() < count {
        let sample = wait_for_first_sample(rx, timeout_ms).await?;
        samples.push(sample.z);
    }
    Ok(samples)
}

/// Persist calibration results; failures keep the new calibration in memory only.
fn save_calibration<S: MagneticSensor>(config: &mut Config, path: &Path, joystick: &JoystickController<S>) {
    config.set_calibration(&joystick.calibration());
    match config.save(path) {
        Ok(()) => info!("Calibration saved to {}", path.display()),
        Err(e) => warn!("Failed to save calibration to {}: {}", path.display(), e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let args = Args::parse();
    info!("magjoy v{} starting...", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    // Sensor link
    let serial = SensorSerial::open(&config.sensor.port, config.sensor.baud_rate)?;
    info!("Sensor bridge opened at: {}", serial.device_path());

    let (tx, mut rx) = watch::channel(MagSample::default());
    let mut reader = tokio::spawn(run_reader(serial.into_stream(), tx));

    let first = wait_for_first_sample(&mut rx, config.sensor.startup_timeout_ms).await?;
    debug!(x = first.x, y = first.y, z = first.z, "First sample received");

    let z_samples = collect_z_samples(&mut rx, first, Z_SAMPLE_COUNT, config.sensor.startup_timeout_ms).await?;

    let mut joystick = JoystickController::new(LinkSensor::new(rx), config.joystick_settings());
    joystick.set_magnet_z_samples(&z_samples);
    if joystick.directions().is_faulted() {
        warn!("Magnet not detected above the sensor; output stays at rest until restart");
    }

    let mut telemetry = if config.telemetry.enabled {
        Some(TelemetryLogger::new(
            &config.telemetry.log_dir,
            config.telemetry.max_records_per_file,
            config.telemetry.max_files_to_keep,
        )?)
    } else {
        None
    };

    let mut session = args.calibration_session(&config);
    if let Some(session) = session.as_mut() {
        session.start();
        info!("{}", session.prompt());
    }

    let poll_ms = config.joystick.poll_interval_ms;
    let status_every = ticks_per(config.joystick.status_interval_ms, poll_ms);
    let telemetry_every = ticks_per(config.telemetry.log_interval_ms, poll_ms);

    let mut ticker = interval(Duration::from_millis(poll_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Polling joystick every {} ms", poll_ms);
    info!("Press Ctrl+C to exit");

    let mut tick_count: u64 = 0;

    // Main control loop
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tick_count += 1;

                if let Some(active) = session.as_mut() {
                    let before = active.step();
                    let after = active.tick(&mut joystick);
                    if after != before {
                        info!("{}", active.prompt());
                    }
                    if active.is_complete() {
                        save_calibration(&mut config, &args.config, &joystick);
                        joystick.reset();
                        session = None;
                    }
                    continue;
                }

                joystick.update();

                if tick_count % telemetry_every == 0 {
                    if let Some(logger) = telemetry.as_mut() {
                        if let Err(e) = logger.log(&TickRecord::capture(&joystick)) {
                            warn!("Telemetry write failed, recording disabled: {}", e);
                            telemetry = None;
                        }
                    }
                }

                if tick_count % status_every == 0 {
                    info!(
                        x = joystick.x_out(),
                        y = joystick.y_out(),
                        input = ?joystick.input_point(),
                        "Joystick status"
                    );
                }
            }

            result = &mut reader => {
                match result {
                    Ok(Ok(stats)) => warn!("Sensor link ended: {:?}", stats),
                    Ok(Err(e)) => warn!("Sensor link failed: {}", e),
                    Err(e) => warn!("Sensor link task aborted: {}", e),
                }
                break;
            }

            // Handle Ctrl+C for graceful shutdown
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    if let Some(logger) = telemetry.as_mut() {
        logger.flush()?;
        info!("Telemetry records written: {}", logger.records_written());
    }
    reader.abort();
    info!("Total ticks: {}", tick_count);

    Ok(())
}
