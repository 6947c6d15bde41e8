//! # Linux IIO Drivers
//!
//! Sensor drivers backed by the kernel Industrial I/O sysfs interface
//! (`/sys/bus/iio/devices/iio:deviceN`).
//!
//! Devices are located by their `name` attribute. Range, filter and
//! oversampling settings are written once at startup; failures to apply a
//! setting are logged and the device keeps its current setting, since every
//! reading is scaled with the scale the device reports.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{
    altitude_from_pressure, AccelRange, FilterBandwidth, GyroRange, MotionEvent, MotionSensor,
    PressureEvent, PressureSensor, Vector3,
};
use crate::error::{FieldLoggerError, Result};

/// Default sysfs root of IIO devices
pub const DEFAULT_IIO_ROOT: &str = "/sys/bus/iio/devices";

/// Driver names of supported MPU6050-class IMUs
pub const IMU_NAMES: &[&str] = &["mpu6050", "mpu6500", "mpu9250"];

/// Driver names of supported BMP280-class barometers
pub const BAROMETER_NAMES: &[&str] = &["bmp280", "bme280"];

/// Barometer temperature oversampling ratio
pub const TEMPERATURE_OVERSAMPLING: u32 = 2;

/// Barometer pressure oversampling ratio
pub const PRESSURE_OVERSAMPLING: u32 = 16;

/// One IIO device directory.
#[derive(Debug, Clone)]
pub struct IioDevice {
    path: PathBuf,
    name: String,
}

impl IioDevice {
    /// Find the first device under `root` whose `name` is one of `names`.
    ///
    /// Entries are scanned in sorted order so the choice is deterministic
    /// when several matching devices are present.
    ///
    /// # Errors
    ///
    /// Returns [`FieldLoggerError::SensorInit`] if `root` cannot be read or
    /// no matching device exists.
    pub fn find(root: &Path, names: &[&str]) -> Result<Self> {
        let mut entries: Vec<_> = fs::read_dir(root)
            .map_err(|e| {
                FieldLoggerError::SensorInit(format!("Failed to read {}: {}", root.display(), e))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                FieldLoggerError::SensorInit(format!("Failed to read directory entry: {}", e))
            })?;

        entries.sort_by_key(|entry| entry.path());

        for entry in entries {
            let path = entry.path();

            let is_device = path
                .file_name()
                .map(|f| f.to_string_lossy().starts_with("iio:device"))
                .unwrap_or(false);
            if !is_device {
                continue;
            }

            match fs::read_to_string(path.join("name")) {
                Ok(name) => {
                    let name = name.trim();
                    debug!("Found IIO device: {} ({})", path.display(), name);
                    if names.contains(&name) {
                        info!("Using {} at {}", name, path.display());
                        return Ok(Self {
                            name: name.to_string(),
                            path,
                        });
                    }
                }
                Err(e) => {
                    debug!("Could not read name of {}: {}", path.display(), e);
                }
            }
        }

        Err(FieldLoggerError::SensorInit(format!(
            "No IIO device named {} under {}",
            names.join("/"),
            root.display()
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Kernel driver name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read a numeric attribute.
    ///
    /// # Errors
    ///
    /// Returns [`FieldLoggerError::SensorRead`] if the attribute is missing
    /// or not a number.
    pub fn read_f64(&self, attribute: &str) -> Result<f64> {
        let path = self.path.join(attribute);
        let raw = fs::read_to_string(&path).map_err(|e| {
            FieldLoggerError::SensorRead(format!("Failed to read {}: {}", path.display(), e))
        })?;
        raw.trim().parse().map_err(|_| {
            FieldLoggerError::SensorRead(format!(
                "Invalid value in {}: {:?}",
                path.display(),
                raw.trim()
            ))
        })
    }

    /// Write an existing attribute; never creates one.
    pub fn write(&self, attribute: &str, value: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(self.path.join(attribute))?;
        file.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Write a setting, logging instead of failing.
    fn apply(&self, attribute: &str, value: &str) {
        match self.write(attribute, value) {
            Ok(()) => debug!("{}: {} = {}", self.name, attribute, value),
            Err(e) => warn!("{}: could not set {} to {}: {}", self.name, attribute, value, e),
        }
    }
}

/// MPU6050-class IMU over IIO
#[derive(Debug)]
pub struct Mpu6050 {
    device: IioDevice,
    accel_scale: f64,
    gyro_scale: f64,
}

impl Mpu6050 {
    /// Locate the IMU, apply range and filter settings, and take one probe
    /// reading.
    ///
    /// # Errors
    ///
    /// Returns [`FieldLoggerError::SensorInit`] if the device is missing or
    /// does not produce a reading.
    pub fn open(
        root: &Path,
        accel_range: AccelRange,
        gyro_range: GyroRange,
        bandwidth: FilterBandwidth,
    ) -> Result<Self> {
        let device = IioDevice::find(root, IMU_NAMES)?;

        device.apply("in_accel_scale", accel_range.iio_scale());
        device.apply("in_anglvel_scale", gyro_range.iio_scale());
        device.apply("filter_low_pass_3db_frequency", &bandwidth.hz().to_string());

        let probe = || -> Result<Self> {
            let mut imu = Self {
                accel_scale: device.read_f64("in_accel_scale")?,
                gyro_scale: device.read_f64("in_anglvel_scale")?,
                device: device.clone(),
            };
            imu.read_event()?;
            Ok(imu)
        };

        let imu = probe().map_err(|e| {
            FieldLoggerError::SensorInit(format!("{} not responding: {}", device.name(), e))
        })?;

        info!(
            "IMU ready: accel scale {} m/s²/LSB, gyro scale {} rad/s/LSB",
            imu.accel_scale, imu.gyro_scale
        );
        Ok(imu)
    }

    fn axes(&self, channel: &str, scale: f64) -> Result<Vector3> {
        let axis = |a: &str| -> Result<f32> {
            Ok((self.device.read_f64(&format!("in_{}_{}_raw", channel, a))? * scale) as f32)
        };
        Ok(Vector3::new(axis("x")?, axis("y")?, axis("z")?))
    }
}

impl MotionSensor for Mpu6050 {
    fn read_event(&mut self) -> Result<MotionEvent> {
        let acceleration = self.axes("accel", self.accel_scale)?;
        let rotation = self.axes("anglvel", self.gyro_scale)?;

        let raw = self.device.read_f64("in_temp_raw")?;
        let offset = self.device.read_f64("in_temp_offset")?;
        let scale = self.device.read_f64("in_temp_scale")?;
        let temperature = ((raw + offset) * scale / 1000.0) as f32;

        Ok(MotionEvent {
            acceleration,
            rotation,
            temperature,
        })
    }
}

/// BMP280-class barometer over IIO
#[derive(Debug)]
pub struct Bmp280 {
    device: IioDevice,
    sea_level_hpa: f32,
}

impl Bmp280 {
    /// Locate the barometer, apply oversampling, and take one probe reading.
    ///
    /// # Errors
    ///
    /// Returns [`FieldLoggerError::SensorInit`] if the device is missing or
    /// does not produce a reading.
    pub fn open(root: &Path, sea_level_hpa: f32) -> Result<Self> {
        let device = IioDevice::find(root, BAROMETER_NAMES)?;

        device.apply("in_temp_oversampling_ratio", &TEMPERATURE_OVERSAMPLING.to_string());
        device.apply("in_pressure_oversampling_ratio", &PRESSURE_OVERSAMPLING.to_string());

        let mut baro = Self {
            device,
            sea_level_hpa,
        };
        baro.read_event().map_err(|e| {
            FieldLoggerError::SensorInit(format!("{} not responding: {}", baro.device.name(), e))
        })?;

        info!("Barometer ready: sea level {} hPa", sea_level_hpa);
        Ok(baro)
    }
}

impl PressureSensor for Bmp280 {
    fn read_event(&mut self) -> Result<PressureEvent> {
        // milli °C and kPa
        let temperature = (self.device.read_f64("in_temp_input")? / 1000.0) as f32;
        let pressure_hpa = (self.device.read_f64("in_pressure_input")? * 10.0) as f32;

        Ok(PressureEvent {
            temperature,
            pressure_hpa,
            altitude_m: altitude_from_pressure(pressure_hpa, self.sea_level_hpa),
        })
    }
}
