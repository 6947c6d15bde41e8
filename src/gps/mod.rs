//! # GNSS Module
//!
//! Byte-at-a-time NMEA 0183 decoding for the positioning receiver.
//!
//! This module handles:
//! - Sentence framing (`$` ... `*hh` CR LF)
//! - Checksum verification and health counters
//! - GGA/RMC parsing
//! - Exposing each decoded value as a [`Field`] with its own validity and age

pub mod checksum;
pub mod decoder;
pub mod sentence;

pub use decoder::NmeaDecoder;

use chrono::{NaiveDate, NaiveTime};

use crate::field::Field;
use crate::nav::GeoPoint;

/// Monotonically increasing decoder health counters.
///
/// These have no validity of their own and are always displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderCounters {
    /// Every byte fed to the decoder
    pub chars_processed: u64,
    /// Sentences that reported a position fix
    pub sentences_with_fix: u64,
    /// Sentences whose checksum did not match
    pub failed_checksum: u64,
    /// Sentences whose checksum matched
    pub passed_checksum: u64,
}

/// Positioning decoder fed one byte at a time.
///
/// Accessors are read-only and never cache; each call reports the current
/// value and its age.
pub trait FixDecoder {
    /// Feed one received byte.
    fn encode(&mut self, byte: u8);

    fn satellites(&self) -> Field<u32>;
    fn hdop(&self) -> Field<f64>;
    fn location(&self) -> Field<GeoPoint>;
    fn date(&self) -> Field<NaiveDate>;
    fn time(&self) -> Field<NaiveTime>;
    /// Altitude above mean sea level in meters
    fn altitude(&self) -> Field<f64>;
    /// Course over ground in degrees
    fn course(&self) -> Field<f64>;
    /// Ground speed in km/h
    fn speed(&self) -> Field<f64>;

    fn counters(&self) -> DecoderCounters;
}
