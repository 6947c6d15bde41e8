//! # Telemetry Module
//!
//! Appends one delimited sensor record per cycle to a persistent log.
//!
//! This module handles:
//! - Serializing motion and pressure readings ([`record`])
//! - Append-only log sessions scoped to a single cycle ([`store`])
//! - The per-cycle read, serialize, open, append, close sequence ([`logger`])

pub mod logger;
pub mod record;
pub mod store;

pub use logger::{CycleOutcome, SkipReason, TelemetryLogger};
pub use record::TelemetryRecord;
pub use store::{FileStore, LogSession, LogStore};
