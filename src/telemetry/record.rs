//! Telemetry record serialization

use std::fmt;

use crate::sensors::{MotionEvent, PressureEvent};

/// Field delimiter
pub const DELIMITER: char = ',';

/// Record terminator
pub const TERMINATOR: char = '\n';

/// Column names in record order
pub const COLUMNS: [&str; 11] = [
    "elapsed_ms",
    "accel_x",
    "accel_y",
    "accel_z",
    "gyro_x",
    "gyro_y",
    "gyro_z",
    "imu_temp",
    "ambient_temp",
    "pressure_hpa",
    "altitude_m",
];

/// One cycle's readings, stamped with milliseconds since startup.
///
/// Serialized as comma-delimited decimal text terminated by a newline:
///
/// ```text
/// 1500,1.0,2.0,3.0,0.01,-0.02,0.0,31.5,24.87,1013.25,0.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRecord {
    pub elapsed_ms: u64,
    pub motion: MotionEvent,
    pub pressure: PressureEvent,
}

impl TelemetryRecord {
    pub fn new(elapsed_ms: u64, motion: MotionEvent, pressure: PressureEvent) -> Self {
        Self {
            elapsed_ms,
            motion,
            pressure,
        }
    }

    /// Readings in column order, after the timestamp
    pub fn values(&self) -> [f32; 10] {
        let MotionEvent {
            acceleration: a,
            rotation: g,
            temperature,
        } = self.motion;

        [
            a.x,
            a.y,
            a.z,
            g.x,
            g.y,
            g.z,
            temperature,
            self.pressure.temperature,
            self.pressure.pressure_hpa,
            self.pressure.altitude_m,
        ]
    }

    /// Full record including the terminator.
    pub fn to_line(&self) -> String {
        format!("{}{}", self, TERMINATOR)
    }
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.elapsed_ms)?;
        for value in self.values() {
            write!(f, "{}{}", DELIMITER, decimal(value))?;
        }
        Ok(())
    }
}

/// Shortest decimal text for `value`, always with a fractional part.
fn decimal(value: f32) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}
