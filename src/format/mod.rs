//! # Fixed-Width Field Formatting
//!
//! Renders values into columns of an exact character width. A value tagged
//! [`Reading::Invalid`] is replaced by a sentinel fill of `*` followed by a
//! single space, so a missing value never shifts the columns after it.
//!
//! Every function here is pure. Pacing between columns (feeding the GNSS
//! decoder while a line is being built) is done by
//! [`crate::status::ColumnWriter`], which calls these functions.
//!
//! ## Width contract
//!
//! For every sentinel, integer and text rendering the output is exactly
//! `width` characters. Valid floating-point values are padded to `width`; if
//! the formatted number itself is longer than `width` it is emitted whole and
//! the column overflows (no truncation of significant digits).
//!
//! ```
//! use field_logger::field::Reading;
//! use field_logger::format::{render_float, render_int};
//!
//! assert_eq!(render_int(Reading::Valid(7), 5), "7    ");
//! assert_eq!(render_float(Reading::Invalid, 6, 1), "***** ");
//! assert_eq!(render_float(Reading::Valid(-15.5), 8, 2), "-15.50  ");
//! ```

use chrono::{NaiveDate, NaiveTime};

use crate::field::Reading;

/// Width of the rendered date column (`MM/DD/YYYY `)
pub const DATE_WIDTH: usize = 11;

/// Width of the rendered time column (`HH:MM:SS `)
pub const TIME_WIDTH: usize = 9;

/// Sentinel fill: `width - 1` asterisks and one trailing space.
///
/// A zero width yields an empty string.
pub fn sentinel(width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let mut out = "*".repeat(width - 1);
    out.push(' ');
    out
}

/// Number of characters a valid float occupies before padding.
///
/// `precision + 1` for the decimal point, `+1` for a minus sign, plus the
/// digit count of the truncated integer magnitude bucketed as 1/2/3/4 for
/// magnitudes below 10, 100, 1000 and anything above.
pub fn float_consumed_len(value: f64, precision: usize) -> usize {
    let magnitude = value.trunc().abs();
    let digits = if magnitude >= 1000.0 {
        4
    } else if magnitude >= 100.0 {
        3
    } else if magnitude >= 10.0 {
        2
    } else {
        1
    };
    let sign = if value < 0.0 { 1 } else { 0 };
    precision + 1 + sign + digits
}

/// Render a floating-point reading at `precision` decimals, padded to `width`.
///
/// Invalid readings render as [`sentinel`]. For values with a magnitude
/// below 10000 the padding equals `width - float_consumed_len(..)`. Padding
/// is computed from the text actually produced, so a value that rounds up a
/// digit (`9.999` at 2 decimals) still lands on `width`.
pub fn render_float(reading: Reading<f64>, width: usize, precision: usize) -> String {
    match reading {
        Reading::Invalid => sentinel(width),
        Reading::Valid(value) => {
            let mut out = format!("{:.*}", precision, value);
            pad_to(&mut out, width);
            out
        }
    }
}

/// Render an integer reading into exactly `width` characters.
///
/// The last column is always forced to a space as a separator. When the
/// digits alone fill the width, that overwrites the final digit
/// (`12345` at width 5 renders as `"1234 "`); this is kept for
/// compatibility with existing log consumers.
pub fn render_int(reading: Reading<u64>, width: usize) -> String {
    let value = match reading {
        Reading::Invalid => return sentinel(width),
        Reading::Valid(value) => value,
    };

    let mut out: String = value.to_string().chars().take(width).collect();
    pad_to(&mut out, width);
    if width > 0 {
        out.pop();
        out.push(' ');
    }
    out
}

/// Copy up to `width` characters of `text`, padding with spaces.
///
/// Characters beyond `width` are dropped.
pub fn render_str(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    pad_to(&mut out, width);
    out
}

/// Render a date as `MM/DD/YYYY ` or the 11-character sentinel.
pub fn render_date(reading: Reading<NaiveDate>) -> String {
    match reading {
        Reading::Valid(date) => date.format("%m/%d/%Y ").to_string(),
        Reading::Invalid => sentinel(DATE_WIDTH),
    }
}

/// Render a time of day as `HH:MM:SS ` or the 9-character sentinel.
pub fn render_time(reading: Reading<NaiveTime>) -> String {
    match reading {
        Reading::Valid(time) => time.format("%H:%M:%S ").to_string(),
        Reading::Invalid => sentinel(TIME_WIDTH),
    }
}

fn pad_to(out: &mut String, width: usize) {
    let len = out.chars().count();
    if len < width {
        out.extend(std::iter::repeat(' ').take(width - len));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_lengths() {
        for width in 1..=20 {
            let out = sentinel(width);
            assert_eq!(out.chars().count(), width);
            assert!(out.ends_with(' '));
            assert_eq!(out.matches('*').count(), width - 1);
        }
        assert_eq!(sentinel(1), " ");
        assert_eq!(sentinel(0), "");
    }

    #[test]
    fn test_invalid_numeric_uses_sentinel() {
        assert_eq!(render_float(Reading::Invalid, 6, 1), "***** ");
        assert_eq!(render_float(Reading::Invalid, 11, 6), "********** ");
        assert_eq!(render_int(Reading::Invalid, 5), "**** ");
        assert_eq!(render_int(Reading::Invalid, 10), "********* ");
    }

    #[test]
    fn test_invalid_never_renders_zero() {
        assert!(!render_float(Reading::Invalid, 7, 2).contains('0'));
        assert!(!render_int(Reading::Invalid, 9).contains('0'));
    }

    #[test]
    fn test_float_valid_padded_to_width() {
        assert_eq!(render_float(Reading::Valid(1.2), 6, 1), "1.2   ");
        assert_eq!(render_float(Reading::Valid(-15.73905), 11, 6), "-15.739050 ");
        assert_eq!(render_float(Reading::Valid(-47.8937), 12, 6), "-47.893700  ");
        assert_eq!(render_float(Reading::Valid(123.456), 7, 2), "123.46 ");
    }

    #[test]
    fn test_float_lengths_for_typical_columns() {
        let cases: &[(f64, usize, usize)] = &[
            (0.9, 6, 1),
            (99.9, 6, 1),
            (-89.999999, 11, 6),
            (89.999999, 11, 6),
            (-179.123456, 12, 6),
            (1234.56, 7, 2),
            (359.99, 7, 2),
            (0.0, 6, 2),
            (-3.5, 7, 2),
        ];
        for &(value, width, precision) in cases {
            let out = render_float(Reading::Valid(value), width, precision);
            assert_eq!(out.chars().count(), width, "value {} -> {:?}", value, out);
        }
    }

    #[test]
    fn test_consumed_len_matches_rendered_text() {
        for &(value, precision) in &[
            (5.25, 2),
            (-5.25, 2),
            (42.0, 1),
            (-123.456789, 6),
            (999.5, 1),
            (4321.0, 2),
        ] {
            let text = format!("{:.*}", precision, value);
            assert_eq!(float_consumed_len(value, precision), text.len(), "{}", text);
        }
    }

    #[test]
    fn test_float_rounding_carry_keeps_width() {
        // 9.999 rounds to 10.00, one character longer than the bucketed count
        assert_eq!(float_consumed_len(9.999, 2), 4);
        assert_eq!(render_float(Reading::Valid(9.999), 7, 2), "10.00  ");
    }

    #[test]
    fn test_float_narrow_width_overflows_without_panic() {
        let out = render_float(Reading::Valid(-123.456), 3, 2);
        assert_eq!(out, "-123.46");
        assert_eq!(render_float(Reading::Valid(1.0), 0, 0), "1");
    }

    #[test]
    fn test_int_padded_and_separated() {
        assert_eq!(render_int(Reading::Valid(7), 5), "7    ");
        assert_eq!(render_int(Reading::Valid(1234), 5), "1234 ");
        assert_eq!(render_int(Reading::Valid(0), 6), "0     ");
    }

    #[test]
    fn test_int_full_width_drops_last_digit() {
        assert_eq!(render_int(Reading::Valid(12345), 5), "1234 ");
        assert_eq!(render_int(Reading::Valid(9_876_543), 5), "9876 ");
    }

    #[test]
    fn test_int_zero_width() {
        assert_eq!(render_int(Reading::Valid(42), 0), "");
        assert_eq!(render_int(Reading::Invalid, 0), "");
    }

    #[test]
    fn test_str_pads_and_truncates() {
        assert_eq!(render_str("NNE", 6), "NNE   ");
        assert_eq!(render_str("*** ", 6), "***   ");
        assert_eq!(render_str("TOOLONGVALUE", 6), "TOOLON");
        assert_eq!(render_str("", 3), "   ");
    }

    #[test]
    fn test_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let time = NaiveTime::from_hms_opt(4, 5, 6).unwrap();
        assert_eq!(render_date(Reading::Valid(date)), "03/07/2026 ");
        assert_eq!(render_time(Reading::Valid(time)), "04:05:06 ");
        assert_eq!(render_date(Reading::Invalid), "********** ");
        assert_eq!(render_time(Reading::Invalid), "******** ");
        assert_eq!(render_date(Reading::Valid(date)).len(), DATE_WIDTH);
        assert_eq!(render_time(Reading::Valid(time)).len(), TIME_WIDTH);
    }
}
