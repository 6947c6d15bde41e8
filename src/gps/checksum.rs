//! # NMEA Checksum
//!
//! XOR of every byte between `$` and `*`, transmitted as two hex digits.

/// Calculate the NMEA checksum of a sentence body
///
/// # Arguments
///
/// * `body` - Bytes between `$` and `*` (exclusive)
///
/// # Examples
///
/// ```
/// use field_logger::gps::checksum::nmea_checksum;
///
/// let body = b"GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,";
/// assert_eq!(nmea_checksum(body), 0x47);
/// ```
pub fn nmea_checksum(body: &[u8]) -> u8 {
    body.iter().fold(0u8, |acc, &b| acc ^ b)
}

/// Value of one ASCII hex digit (either case)
pub fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        _ => None,
    }
}
