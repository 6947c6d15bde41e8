//! # NMEA Stream Decoder
//!
//! Frames sentences out of the byte stream, verifies checksums and commits
//! parsed values.
//!
//! Commit rules:
//! - RMC: date and time always; location, speed and course only with status `A`
//! - GGA: time, satellites and HDOP always; location and altitude only with
//!   fix quality > 0

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, trace};

use super::checksum::{hex_value, nmea_checksum};
use super::sentence::{parse_sentence, Gga, Rmc, Sentence, KNOTS_TO_KMPH};
use super::{DecoderCounters, FixDecoder};
use crate::field::Field;
use crate::nav::GeoPoint;
use crate::pacing::Clock;

/// Longest sentence body accepted (NMEA allows 82 bytes per line)
pub const MAX_SENTENCE_LEN: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameState {
    /// Waiting for `$`
    Idle,
    /// Collecting the body
    Body,
    /// Collecting the two checksum digits
    Checksum { high: Option<u8> },
    /// Checksum read, waiting for end of line
    Complete { received: u8 },
}

/// A value with the clock time of its last update
#[derive(Debug, Clone, Copy)]
struct Tracked<T> {
    value: Option<T>,
    updated_ms: u64,
}

impl<T: Copy> Tracked<T> {
    fn new() -> Self {
        Self {
            value: None,
            updated_ms: 0,
        }
    }

    fn commit(&mut self, value: Option<T>, now_ms: u64) {
        if let Some(value) = value {
            self.value = Some(value);
            self.updated_ms = now_ms;
        }
    }

    fn field(&self, now_ms: u64) -> Field<T> {
        match self.value {
            Some(value) => Field::valid(value, now_ms.saturating_sub(self.updated_ms)),
            None => Field::invalid(),
        }
    }
}

/// NMEA 0183 decoder
///
/// # Examples
///
/// ```
/// use field_logger::gps::{FixDecoder, NmeaDecoder};
/// use field_logger::pacing::MonotonicClock;
///
/// let mut gps = NmeaDecoder::new(MonotonicClock::start());
/// for &b in b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n" {
///     gps.encode(b);
/// }
/// assert!(gps.location().reading.is_valid());
/// assert_eq!(gps.counters().sentences_with_fix, 1);
/// ```
pub struct NmeaDecoder<C> {
    clock: C,
    state: FrameState,
    body: Vec<u8>,
    counters: DecoderCounters,
    satellites: Tracked<u32>,
    hdop: Tracked<f64>,
    location: Tracked<GeoPoint>,
    date: Tracked<NaiveDate>,
    time: Tracked<NaiveTime>,
    altitude: Tracked<f64>,
    course: Tracked<f64>,
    speed: Tracked<f64>,
}

impl<C: Clock> NmeaDecoder<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: FrameState::Idle,
            body: Vec::with_capacity(MAX_SENTENCE_LEN),
            counters: DecoderCounters::default(),
            satellites: Tracked::new(),
            hdop: Tracked::new(),
            location: Tracked::new(),
            date: Tracked::new(),
            time: Tracked::new(),
            altitude: Tracked::new(),
            course: Tracked::new(),
            speed: Tracked::new(),
        }
    }

    fn step(&mut self, byte: u8) {
        if byte == b'$' {
            self.body.clear();
            self.state = FrameState::Body;
            return;
        }

        let state = self.state;
        self.state = match state {
            FrameState::Idle => FrameState::Idle,
            FrameState::Body => match byte {
                b'*' => FrameState::Checksum { high: None },
                b'\r' | b'\n' => {
                    debug!("Sentence ended without checksum, dropped");
                    FrameState::Idle
                }
                _ if self.body.len() >= MAX_SENTENCE_LEN => {
                    debug!("Sentence longer than {} bytes, dropped", MAX_SENTENCE_LEN);
                    FrameState::Idle
                }
                _ => {
                    self.body.push(byte);
                    FrameState::Body
                }
            },
            FrameState::Checksum { high: None } => match hex_value(byte) {
                Some(high) => FrameState::Checksum { high: Some(high) },
                None => FrameState::Idle,
            },
            FrameState::Checksum { high: Some(high) } => match hex_value(byte) {
                Some(low) => FrameState::Complete {
                    received: (high << 4) | low,
                },
                None => FrameState::Idle,
            },
            FrameState::Complete { received } => match byte {
                b'\r' | b'\n' => {
                    self.finish(received);
                    FrameState::Idle
                }
                _ => FrameState::Idle,
            },
        };
    }

    fn finish(&mut self, received: u8) {
        let calculated = nmea_checksum(&self.body);
        if calculated != received {
            self.counters.failed_checksum += 1;
            debug!(
                "NMEA checksum mismatch: expected 0x{:02X}, got 0x{:02X}",
                calculated, received
            );
            return;
        }
        self.counters.passed_checksum += 1;

        let parsed = std::str::from_utf8(&self.body)
            .map_err(|e| crate::error::FieldLoggerError::Nmea(e.to_string()))
            .and_then(parse_sentence);

        match parsed {
            Ok(Sentence::Gga(gga)) => self.commit_gga(gga),
            Ok(Sentence::Rmc(rmc)) => self.commit_rmc(rmc),
            Ok(Sentence::Unsupported(tag)) => trace!("Ignoring {} sentence", tag),
            Err(e) => debug!("Dropping sentence: {}", e),
        }
    }

    fn commit_gga(&mut self, gga: Gga) {
        let now = self.clock.millis();
        self.time.commit(gga.time, now);
        self.satellites.commit(gga.satellites, now);
        self.hdop.commit(gga.hdop, now);
        if gga.has_fix() {
            self.counters.sentences_with_fix += 1;
            self.location.commit(gga.location, now);
            self.altitude.commit(gga.altitude_m, now);
        }
    }

    fn commit_rmc(&mut self, rmc: Rmc) {
        let now = self.clock.millis();
        self.date.commit(rmc.date, now);
        self.time.commit(rmc.time, now);
        if rmc.has_fix() {
            self.counters.sentences_with_fix += 1;
            self.location.commit(rmc.location, now);
            self.speed.commit(rmc.speed_knots.map(|kn| kn * KNOTS_TO_KMPH), now);
            self.course.commit(rmc.course_deg, now);
        }
    }
}

impl<C: Clock> FixDecoder for NmeaDecoder<C> {
    fn encode(&mut self, byte: u8) {
        self.counters.chars_processed += 1;
        self.step(byte);
    }

    fn satellites(&self) -> Field<u32> {
        self.satellites.field(self.clock.millis())
    }

    fn hdop(&self) -> Field<f64> {
        self.hdop.field(self.clock.millis())
    }

    fn location(&self) -> Field<GeoPoint> {
        self.location.field(self.clock.millis())
    }

    fn date(&self) -> Field<NaiveDate> {
        self.date.field(self.clock.millis())
    }

    fn time(&self) -> Field<NaiveTime> {
        self.time.field(self.clock.millis())
    }

    fn altitude(&self) -> Field<f64> {
        self.altitude.field(self.clock.millis())
    }

    fn course(&self) -> Field<f64> {
        self.course.field(self.clock.millis())
    }

    fn speed(&self) -> Field<f64> {
        self.speed.field(self.clock.millis())
    }

    fn counters(&self) -> DecoderCounters {
        self.counters
    }
}
