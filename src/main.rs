//! # Field Logger
//!
//! Logs GNSS, IMU and barometer data on a field device.
//!
//! Usage: `field-logger [CONFIG]`. Built-in defaults are used when no
//! configuration file is given.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use field_logger::config::Config;
use field_logger::gps::NmeaDecoder;
use field_logger::logging::init_logging;
use field_logger::pacing::{CooperativeWaiter, MonotonicClock};
use field_logger::runner::{CycleRunner, NoDataWatchdog};
use field_logger::sensors::iio::{Bmp280, Mpu6050};
use field_logger::serial::SerialTransport;
use field_logger::status::StatusLineRenderer;
use field_logger::telemetry::{FileStore, TelemetryLogger};

/// Main entry point for Field Logger
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration and set up logging
///    - Open the receiver serial port (configured port, then fallbacks)
///    - Open the IMU and barometer when telemetry is enabled
///
/// 2. **Main Loop** (one blocking thread)
///    - Print the status line
///    - Append one telemetry record
///    - Wait out the cycle interval while feeding the decoder
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C sets the shutdown flag
///    - The current cycle completes, then the loop exits
///
/// # Errors
///
/// Returns error if the configuration is invalid or no serial port can be
/// opened. A sensor that cannot be initialized halts the logger until
/// Ctrl+C instead, so no record is ever written with undefined readings.
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging.level, config.logging.file.as_deref())?;

    info!("Field Logger v{} starting...", env!("CARGO_PKG_VERSION"));

    let clock = MonotonicClock::start();

    let serial = SerialTransport::open_with_paths(&config.serial_paths(), config.serial.baud_rate)?;
    info!("GNSS serial port opened at: {}", serial.device_path());

    let telemetry = if config.telemetry.enabled {
        match open_sensors(&config) {
            Ok((imu, baro)) => Some(TelemetryLogger::new(
                imu,
                baro,
                FileStore::new(&config.telemetry.log_path),
            )),
            Err(e) => {
                error!("{:#}", e);
                error!("Halted: fix the sensor wiring and restart (Ctrl+C to exit)");
                tokio::signal::ctrl_c().await?;
                info!("Received Ctrl+C, exiting");
                return Ok(());
            }
        }
    } else {
        info!("Telemetry disabled");
        None
    };

    let status = config
        .status
        .enabled
        .then(|| StatusLineRenderer::new(config.reference_point()));

    let waiter = CooperativeWaiter::new(serial, NmeaDecoder::new(clock), clock);
    let mut runner = CycleRunner::new(
        waiter,
        status,
        telemetry,
        std::io::stdout(),
        config.cycle.interval(),
        NoDataWatchdog::new(config.cycle.no_data_grace(), config.cycle.no_data_min_chars),
    );

    if config.status.print_header {
        runner.print_header();
    }

    let shutdown = Arc::new(AtomicBool::new(false));

    info!("Starting cycle loop every {} ms", config.cycle.interval_ms);
    info!("Press Ctrl+C to exit");

    let loop_flag = Arc::clone(&shutdown);
    let cycle_loop = tokio::task::spawn_blocking(move || runner.run(&loop_flag));

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, finishing current cycle...");
    shutdown.store(true, Ordering::SeqCst);

    let cycles = cycle_loop.await?;
    info!("Total cycles: {}", cycles);

    Ok(())
}

/// Open both sensor drivers with the configured settings.
fn open_sensors(config: &Config) -> Result<(Mpu6050, Bmp280)> {
    let root = Path::new(&config.sensors.iio_root);

    let imu = Mpu6050::open(
        root,
        config.sensors.accel_range,
        config.sensors.gyro_range,
        config.sensors.filter_bandwidth,
    )
    .context("IMU (MPU6050) not found, check wiring")?;
    info!(
        "Accelerometer range ±{} g, gyro range ±{} deg/s, filter bandwidth {} Hz",
        config.sensors.accel_range.full_scale_g(),
        config.sensors.gyro_range.full_scale_dps(),
        config.sensors.filter_bandwidth.hz()
    );

    let baro = Bmp280::open(root, config.sensors.sea_level_hpa)
        .context("Could not find a valid BMP280 sensor, check wiring")?;

    Ok((imu, baro))
}
