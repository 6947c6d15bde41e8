//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! a working configuration. Settings are fixed at startup.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FieldLoggerError, Result};
use crate::nav::ReferencePoint;
use crate::sensors::{AccelRange, FilterBandwidth, GyroRange};

/// Baud rates accepted for the receiver link
pub const SUPPORTED_BAUD_RATES: [u32; 6] = [4800, 9600, 19200, 38400, 57600, 115200];

/// Accepted default log levels
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub serial: SerialConfig,
    pub reference: ReferenceConfig,
    pub cycle: CycleConfig,
    pub status: StatusConfig,
    pub telemetry: TelemetryConfig,
    pub sensors: SensorsConfig,
    pub logging: LoggingConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Tried in order when `port` cannot be opened
    #[serde(default = "default_fallback_ports")]
    pub fallback_ports: Vec<String>,
}

/// Fixed point distance and bearing are reported against
#[derive(Debug, Deserialize, Clone)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_name")]
    pub name: String,

    #[serde(default = "default_reference_latitude")]
    pub latitude: f64,

    #[serde(default = "default_reference_longitude")]
    pub longitude: f64,
}

/// Cycle pacing configuration
#[derive(Debug, Deserialize, Clone)]
pub struct CycleConfig {
    /// Wait between cycles, spent feeding the decoder
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Time allowed for receiver data to arrive before warning
    #[serde(default = "default_no_data_grace_ms")]
    pub no_data_grace_ms: u64,

    /// Fewer characters than this after the grace period raises the warning
    #[serde(default = "default_no_data_min_chars")]
    pub no_data_min_chars: u64,
}

/// Status line configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StatusConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub print_header: bool,
}

/// Telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_log_path")]
    pub log_path: String,
}

/// Sensor driver configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SensorsConfig {
    #[serde(default = "default_iio_root")]
    pub iio_root: String,

    #[serde(default = "default_accel_range")]
    pub accel_range: AccelRange,

    #[serde(default = "default_gyro_range")]
    pub gyro_range: GyroRange,

    #[serde(default = "default_filter_bandwidth")]
    pub filter_bandwidth: FilterBandwidth,

    /// Sea-level pressure used for altitude
    #[serde(default = "default_sea_level_hpa")]
    pub sea_level_hpa: f32,
}

/// Diagnostic logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file in addition to stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 9600 }
fn default_fallback_ports() -> Vec<String> {
    vec!["/dev/ttyACM0".to_string(), "/dev/ttyAMA0".to_string(), "/dev/serial0".to_string()]
}

fn default_reference_name() -> String { "Brasilia".to_string() }
fn default_reference_latitude() -> f64 { -15.73905 }
fn default_reference_longitude() -> f64 { -47.89370 }

fn default_interval_ms() -> u64 { 1000 }
fn default_no_data_grace_ms() -> u64 { 5000 }
fn default_no_data_min_chars() -> u64 { 10 }

fn default_true() -> bool { true }

fn default_log_path() -> String { "./logs/TELEMETRY.csv".to_string() }

fn default_iio_root() -> String { crate::sensors::iio::DEFAULT_IIO_ROOT.to_string() }
fn default_accel_range() -> AccelRange { AccelRange::G8 }
fn default_gyro_range() -> GyroRange { GyroRange::Dps500 }
fn default_filter_bandwidth() -> FilterBandwidth { FilterBandwidth::Hz21 }
fn default_sea_level_hpa() -> f32 { 1013.0 }

fn default_log_level() -> String { "info".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            fallback_ports: default_fallback_ports(),
        }
    }
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            name: default_reference_name(),
            latitude: default_reference_latitude(),
            longitude: default_reference_longitude(),
        }
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            no_data_grace_ms: default_no_data_grace_ms(),
            no_data_min_chars: default_no_data_min_chars(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            print_header: true,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: default_log_path(),
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            iio_root: default_iio_root(),
            accel_range: default_accel_range(),
            gyro_range: default_gyro_range(),
            filter_bandwidth: default_filter_bandwidth(),
            sea_level_hpa: default_sea_level_hpa(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> FieldLoggerError {
    FieldLoggerError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use field_logger::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // Serial
        if self.serial.port.is_empty() {
            return Err(invalid("serial port cannot be empty"));
        }

        if self.serial.fallback_ports.iter().any(|p| p.is_empty()) {
            return Err(invalid("fallback_ports cannot contain empty paths"));
        }

        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(
                "baud_rate must be one of: 4800, 9600, 19200, 38400, 57600, 115200",
            ));
        }

        // Reference point
        if self.reference.name.is_empty() {
            return Err(invalid("reference name cannot be empty"));
        }

        if !(-90.0..=90.0).contains(&self.reference.latitude) {
            return Err(invalid("reference latitude must be between -90 and 90"));
        }

        if !(-180.0..=180.0).contains(&self.reference.longitude) {
            return Err(invalid("reference longitude must be between -180 and 180"));
        }

        // Cycle timing
        if self.cycle.interval_ms > 600_000 {
            return Err(invalid("interval_ms must be between 0 and 600000"));
        }

        if self.cycle.no_data_grace_ms > 600_000 {
            return Err(invalid("no_data_grace_ms must be between 0 and 600000"));
        }

        // Telemetry
        if self.telemetry.enabled && self.telemetry.log_path.is_empty() {
            return Err(invalid("telemetry log_path cannot be empty when enabled"));
        }

        // Sensors
        if self.telemetry.enabled && self.sensors.iio_root.is_empty() {
            return Err(invalid("sensors iio_root cannot be empty when telemetry is enabled"));
        }

        if !(800.0..=1100.0).contains(&self.sensors.sea_level_hpa) {
            return Err(invalid("sea_level_hpa must be between 800 and 1100"));
        }

        // Logging
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(invalid(format!(
                "logging level must be one of: {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Configured reference point
    pub fn reference_point(&self) -> ReferencePoint {
        ReferencePoint::new(
            self.reference.name.clone(),
            self.reference.latitude,
            self.reference.longitude,
        )
    }

    /// Serial paths in the order they are tried
    pub fn serial_paths(&self) -> Vec<&str> {
        std::iter::once(self.serial.port.as_str())
            .chain(self.serial.fallback_ports.iter().map(String::as_str))
            .filter(|p| !p.is_empty())
            .collect()
    }
}

impl CycleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn no_data_grace(&self) -> Duration {
        Duration::from_millis(self.no_data_grace_ms)
    }
}
