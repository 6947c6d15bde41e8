//! # Field Logger Library
//!
//! Data logger for a field device: decodes a GNSS receiver stream, prints a
//! fixed-width status line per cycle and appends IMU and barometer readings
//! to a persistent log.
//!
//! The decoder is fed cooperatively: every wait and every formatting step
//! drains the receiver, so no positioning bytes are lost while the logger is
//! busy elsewhere.

pub mod config;
pub mod error;
pub mod field;
pub mod format;
pub mod gps;
pub mod logging;
pub mod nav;
pub mod pacing;
pub mod runner;
pub mod sensors;
pub mod serial;
pub mod status;
pub mod telemetry;
