//! # NMEA Sentence Parsing
//!
//! Field-level parsing of the two sentences that carry a position fix:
//! GGA (fix data) and RMC (recommended minimum). The talker prefix
//! (`GP`, `GN`, `GL`, ...) is ignored.

use chrono::{NaiveDate, NaiveTime};

use crate::error::{FieldLoggerError, Result};
use crate::nav::GeoPoint;

/// Knots to kilometres per hour
pub const KNOTS_TO_KMPH: f64 = 1.852;

/// GGA: time, position and fix-quality data
#[derive(Debug, Clone, PartialEq)]
pub struct Gga {
    pub time: Option<NaiveTime>,
    pub location: Option<GeoPoint>,
    /// 0 = no fix, 1 = GPS, 2 = DGPS, ...
    pub fix_quality: u8,
    pub satellites: Option<u32>,
    pub hdop: Option<f64>,
    /// Altitude above mean sea level in meters
    pub altitude_m: Option<f64>,
}

impl Gga {
    pub fn has_fix(&self) -> bool {
        self.fix_quality > 0
    }
}

/// RMC: recommended minimum navigation data
#[derive(Debug, Clone, PartialEq)]
pub struct Rmc {
    pub time: Option<NaiveTime>,
    /// Status `A` (active) vs `V` (void)
    pub active: bool,
    pub location: Option<GeoPoint>,
    pub speed_knots: Option<f64>,
    /// Course over ground in degrees true
    pub course_deg: Option<f64>,
    pub date: Option<NaiveDate>,
}

impl Rmc {
    pub fn has_fix(&self) -> bool {
        self.active
    }
}

/// A parsed sentence
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    Gga(Gga),
    Rmc(Rmc),
    /// Valid sentence of a type this decoder does not use
    Unsupported(String),
}

/// Parse a checksum-verified sentence body (the text between `$` and `*`)
///
/// # Errors
///
/// Returns [`FieldLoggerError::Nmea`] if the tag is malformed or a known
/// sentence carries a field that cannot be parsed.
pub fn parse_sentence(body: &str) -> Result<Sentence> {
    let fields: Vec<&str> = body.split(',').collect();
    let tag = fields[0];

    if tag.len() != 5 || !tag.is_ascii() {
        return Err(FieldLoggerError::Nmea(format!("Invalid sentence tag: {:?}", tag)));
    }

    match &tag[2..] {
        "GGA" => parse_gga(&fields).map(Sentence::Gga),
        "RMC" => parse_rmc(&fields).map(Sentence::Rmc),
        _ => Ok(Sentence::Unsupported(tag.to_string())),
    }
}

fn parse_gga(fields: &[&str]) -> Result<Gga> {
    Ok(Gga {
        time: parse_time(field(fields, 1))?,
        location: parse_location(
            field(fields, 2),
            field(fields, 3),
            field(fields, 4),
            field(fields, 5),
        )?,
        fix_quality: parse_number::<u8>(field(fields, 6))?.unwrap_or(0),
        satellites: parse_number(field(fields, 7))?,
        hdop: parse_number(field(fields, 8))?,
        altitude_m: parse_number(field(fields, 9))?,
    })
}

fn parse_rmc(fields: &[&str]) -> Result<Rmc> {
    Ok(Rmc {
        time: parse_time(field(fields, 1))?,
        active: field(fields, 2) == "A",
        location: parse_location(
            field(fields, 3),
            field(fields, 4),
            field(fields, 5),
            field(fields, 6),
        )?,
        speed_knots: parse_number(field(fields, 7))?,
        course_deg: parse_number(field(fields, 8))?,
        date: parse_date(field(fields, 9))?,
    })
}

/// Field by index, empty if the sentence is shorter
fn field<'a>(fields: &[&'a str], index: usize) -> &'a str {
    fields.get(index).copied().unwrap_or("")
}

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<Option<T>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| FieldLoggerError::Nmea(format!("Invalid numeric field: {:?}", raw)))
}

/// `hhmmss[.sss]`
fn parse_time(raw: &str) -> Result<Option<NaiveTime>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let invalid = || FieldLoggerError::Nmea(format!("Invalid time field: {:?}", raw));
    if raw.len() < 6 || !raw.is_ascii() {
        return Err(invalid());
    }

    let hour: u32 = raw[0..2].parse().map_err(|_| invalid())?;
    let minute: u32 = raw[2..4].parse().map_err(|_| invalid())?;
    let seconds: f64 = raw[4..].parse().map_err(|_| invalid())?;
    let milli = ((seconds.fract() * 1000.0).round() as u32).min(999);

    NaiveTime::from_hms_milli_opt(hour, minute, seconds.trunc() as u32, milli)
        .map(Some)
        .ok_or_else(invalid)
}

/// `ddmmyy`; years are taken as 20yy
fn parse_date(raw: &str) -> Result<Option<NaiveDate>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let invalid = || FieldLoggerError::Nmea(format!("Invalid date field: {:?}", raw));
    if raw.len() != 6 || !raw.is_ascii() {
        return Err(invalid());
    }

    let day: u32 = raw[0..2].parse().map_err(|_| invalid())?;
    let month: u32 = raw[2..4].parse().map_err(|_| invalid())?;
    let year: i32 = raw[4..6].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(2000 + year, month, day)
        .map(Some)
        .ok_or_else(invalid)
}

/// `(d)ddmm.mmmm` + hemisphere letter to signed decimal degrees
fn parse_coordinate(raw: &str, hemisphere: &str) -> Result<Option<f64>> {
    let Some(value) = parse_number::<f64>(raw)? else {
        return Ok(None);
    };

    let degrees = (value / 100.0).trunc();
    let minutes = value - degrees * 100.0;
    let decimal = degrees + minutes / 60.0;

    match hemisphere {
        "N" | "E" => Ok(Some(decimal)),
        "S" | "W" => Ok(Some(-decimal)),
        other => Err(FieldLoggerError::Nmea(format!("Invalid hemisphere: {:?}", other))),
    }
}

fn parse_location(lat: &str, ns: &str, lng: &str, ew: &str) -> Result<Option<GeoPoint>> {
    let lat = parse_coordinate(lat, ns)?;
    let lng = parse_coordinate(lng, ew)?;
    Ok(match (lat, lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    })
}
