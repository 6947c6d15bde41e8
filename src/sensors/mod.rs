//! # Sensors Module
//!
//! One-shot readings from the inertial unit and the barometer.
//!
//! This module handles:
//! - Driver traits the telemetry logger reads from
//! - Event types and their units
//! - Range and filter settings applied at startup
//! - Barometric altitude
//! - Linux IIO drivers ([`iio`])

pub mod iio;

use serde::Deserialize;

use crate::error::Result;

/// Three-axis vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One IMU reading
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionEvent {
    /// Acceleration in m/s²
    pub acceleration: Vector3,
    /// Angular rate in rad/s
    pub rotation: Vector3,
    /// Die temperature in °C
    pub temperature: f32,
}

/// One barometer reading
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressureEvent {
    /// Ambient temperature in °C
    pub temperature: f32,
    /// Pressure in hPa
    pub pressure_hpa: f32,
    /// Altitude in meters relative to the configured sea-level pressure
    pub altitude_m: f32,
}

/// Inertial measurement unit
#[cfg_attr(test, mockall::automock)]
pub trait MotionSensor {
    /// Read the current acceleration, angular rate and temperature.
    fn read_event(&mut self) -> Result<MotionEvent>;
}

/// Barometric pressure sensor
#[cfg_attr(test, mockall::automock)]
pub trait PressureSensor {
    /// Read the current temperature, pressure and derived altitude.
    fn read_event(&mut self) -> Result<PressureEvent>;
}

/// Accelerometer full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AccelRange {
    #[serde(rename = "2g")]
    G2,
    #[serde(rename = "4g")]
    G4,
    #[serde(rename = "8g")]
    G8,
    #[serde(rename = "16g")]
    G16,
}

impl AccelRange {
    /// Full scale in g
    pub fn full_scale_g(self) -> u32 {
        match self {
            AccelRange::G2 => 2,
            AccelRange::G4 => 4,
            AccelRange::G8 => 8,
            AccelRange::G16 => 16,
        }
    }

    /// IIO `in_accel_scale` value (m/s² per LSB) selecting this range
    pub fn iio_scale(self) -> &'static str {
        match self {
            AccelRange::G2 => "0.000598",
            AccelRange::G4 => "0.001196",
            AccelRange::G8 => "0.002392",
            AccelRange::G16 => "0.004785",
        }
    }
}

/// Gyroscope full-scale range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum GyroRange {
    #[serde(rename = "250dps")]
    Dps250,
    #[serde(rename = "500dps")]
    Dps500,
    #[serde(rename = "1000dps")]
    Dps1000,
    #[serde(rename = "2000dps")]
    Dps2000,
}

impl GyroRange {
    /// Full scale in degrees per second
    pub fn full_scale_dps(self) -> u32 {
        match self {
            GyroRange::Dps250 => 250,
            GyroRange::Dps500 => 500,
            GyroRange::Dps1000 => 1000,
            GyroRange::Dps2000 => 2000,
        }
    }

    /// IIO `in_anglvel_scale` value (rad/s per LSB) selecting this range
    pub fn iio_scale(self) -> &'static str {
        match self {
            GyroRange::Dps250 => "0.000133090",
            GyroRange::Dps500 => "0.000266181",
            GyroRange::Dps1000 => "0.000532362",
            GyroRange::Dps2000 => "0.001064724",
        }
    }
}

/// IMU digital low-pass filter bandwidth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FilterBandwidth {
    #[serde(rename = "260hz")]
    Hz260,
    #[serde(rename = "184hz")]
    Hz184,
    #[serde(rename = "94hz")]
    Hz94,
    #[serde(rename = "44hz")]
    Hz44,
    #[serde(rename = "21hz")]
    Hz21,
    #[serde(rename = "10hz")]
    Hz10,
    #[serde(rename = "5hz")]
    Hz5,
}

impl FilterBandwidth {
    pub fn hz(self) -> u32 {
        match self {
            FilterBandwidth::Hz260 => 260,
            FilterBandwidth::Hz184 => 184,
            FilterBandwidth::Hz94 => 94,
            FilterBandwidth::Hz44 => 44,
            FilterBandwidth::Hz21 => 21,
            FilterBandwidth::Hz10 => 10,
            FilterBandwidth::Hz5 => 5,
        }
    }
}

/// Altitude in meters for `pressure_hpa` given the sea-level pressure.
///
/// International barometric formula: `44330 * (1 - (p / p0)^0.1903)`.
///
/// # Examples
///
/// ```
/// use field_logger::sensors::altitude_from_pressure;
///
/// assert_eq!(altitude_from_pressure(1013.0, 1013.0), 0.0);
/// assert!(altitude_from_pressure(900.0, 1013.0) > 900.0);
/// ```
pub fn altitude_from_pressure(pressure_hpa: f32, sea_level_hpa: f32) -> f32 {
    44330.0 * (1.0 - (pressure_hpa / sea_level_hpa).powf(0.1903))
}
