//! # Status Line
//!
//! One fixed-width diagnostic line per cycle, in this column order:
//!
//! | Column | Width | Source |
//! |---|---|---|
//! | Sats | 5 | satellites |
//! | HDOP | 6 (1 dp) | hdop |
//! | Latitude | 11 (6 dp) | location |
//! | Longitude | 12 (6 dp) | location |
//! | Fix age | 5 | location age |
//! | Date / Time / Date age | 11 / 9 / 5 | date, time |
//! | Alt | 7 (2 dp) | altitude |
//! | Course | 7 (2 dp) | course |
//! | Speed | 6 (2 dp) | speed |
//! | Card | 6 | compass point of course |
//! | Distance | 9 | km to reference point |
//! | Course | 7 (2 dp) | bearing to reference point |
//! | Card | 6 | compass point towards reference point |
//! | Chars RX | 6 | counter |
//! | Sentences | 10 | counter |
//! | Checksum fail | 9 | counter |
//!
//! Every column is rendered on its own validity; an invalid field never
//! prevents the rest of the line from rendering.

use crate::field::Reading;
use crate::format::{render_date, render_float, render_int, render_str, render_time};
use crate::gps::FixDecoder;
use crate::nav::{compass_point, distance_m, initial_bearing, ReferencePoint};
use crate::pacing::{Clock, CooperativeWaiter};
use crate::serial::ByteSource;

/// Total width of a status line when every value fits its column
pub const LINE_WIDTH: usize = 137;

/// Label shown in compass columns when the direction is unknown
const NO_DIRECTION: &str = "*** ";

/// Accumulates columns and paces the decoder after each one.
pub struct ColumnWriter<'a, T, D, C> {
    line: String,
    waiter: &'a mut CooperativeWaiter<T, D, C>,
}

impl<'a, T, D, C> ColumnWriter<'a, T, D, C>
where
    T: ByteSource,
    D: FixDecoder,
    C: Clock,
{
    pub fn new(waiter: &'a mut CooperativeWaiter<T, D, C>) -> Self {
        Self {
            line: String::with_capacity(LINE_WIDTH),
            waiter,
        }
    }

    /// Current decoder state (re-read per column).
    pub fn decoder(&self) -> &D {
        self.waiter.decoder()
    }

    pub fn float(&mut self, reading: Reading<f64>, width: usize, precision: usize) {
        self.push(render_float(reading, width, precision));
    }

    pub fn int(&mut self, reading: Reading<u64>, width: usize) {
        self.push(render_int(reading, width));
    }

    pub fn text(&mut self, text: &str, width: usize) {
        self.push(render_str(text, width));
    }

    /// Append a pre-rendered column and give the decoder a turn.
    pub fn push(&mut self, column: String) {
        self.line.push_str(&column);
        self.waiter.pace();
    }

    pub fn finish(self) -> String {
        self.line
    }
}

/// Renders the status line against a fixed reference point.
#[derive(Debug, Clone)]
pub struct StatusLineRenderer {
    reference: ReferencePoint,
}

impl StatusLineRenderer {
    pub fn new(reference: ReferencePoint) -> Self {
        Self { reference }
    }

    /// Column headings, printed once at startup.
    pub fn header_lines(&self) -> [String; 3] {
        let name: String = self.reference.name.chars().take(10).collect();
        [
            "Sats HDOP  Latitude   Longitude   Fix  Date       Time     Date Alt    Course Speed Card  Distance Course Card  Chars Sentences Checksum".to_string(),
            format!(
                "           (deg)      (deg)       Age                      Age  (m)    --- from GPS ----  ---- to {:<10}----  RX    RX        Fail",
                name
            ),
            "-".repeat(LINE_WIDTH),
        ]
    }

    /// Build one status line, feeding the decoder between columns.
    pub fn render<T, D, C>(&self, waiter: &mut CooperativeWaiter<T, D, C>) -> String
    where
        T: ByteSource,
        D: FixDecoder,
        C: Clock,
    {
        let target = self.reference.point;
        let mut col = ColumnWriter::new(waiter);

        let satellites = col.decoder().satellites();
        col.int(satellites.reading.map(u64::from), 5);

        let hdop = col.decoder().hdop();
        col.float(hdop.reading, 6, 1);

        let location = col.decoder().location();
        col.float(location.reading.map(|p| p.lat), 11, 6);
        let location = col.decoder().location();
        col.float(location.reading.map(|p| p.lng), 12, 6);
        let location = col.decoder().location();
        col.int(location.age(), 5);

        let date = col.decoder().date();
        let time = col.decoder().time();
        col.push(render_date(date.reading));
        col.push(render_time(time.reading));
        col.int(date.age(), 5);

        let altitude = col.decoder().altitude();
        col.float(altitude.reading, 7, 2);

        let course = col.decoder().course();
        col.float(course.reading, 7, 2);

        let speed = col.decoder().speed();
        col.float(speed.reading, 6, 2);

        let course = col.decoder().course();
        col.text(course.reading.map(compass_point).value().unwrap_or(NO_DIRECTION), 6);

        let location = col.decoder().location();
        let distance_km = location
            .reading
            .map(|p| (distance_m(p, target) / 1000.0) as u64);
        col.int(distance_km, 9);

        let location = col.decoder().location();
        let bearing = location.reading.map(|p| initial_bearing(p, target));
        col.float(bearing, 7, 2);

        let location = col.decoder().location();
        let bearing = location.reading.map(|p| initial_bearing(p, target));
        col.text(bearing.map(compass_point).value().unwrap_or(NO_DIRECTION), 6);

        let counters = col.decoder().counters();
        col.int(Reading::Valid(counters.chars_processed), 6);
        let counters = col.decoder().counters();
        col.int(Reading::Valid(counters.sentences_with_fix), 10);
        let counters = col.decoder().counters();
        col.int(Reading::Valid(counters.failed_checksum), 9);

        col.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::gps::mocks::{frame, StubDecoder};
    use crate::gps::{DecoderCounters, NmeaDecoder};
    use crate::nav::GeoPoint;
    use crate::pacing::mocks::ManualClock;
    use crate::serial::mocks::MockByteSource;
    use chrono::{NaiveDate, NaiveTime};

    fn brasilia() -> ReferencePoint {
        ReferencePoint::new("Brasilia", -15.73905, -47.89370)
    }

    /// Split a rendered line back into its columns.
    fn columns(line: &str) -> Vec<&str> {
        let widths = [5, 6, 11, 12, 5, 11, 9, 5, 7, 7, 6, 6, 9, 7, 6, 6, 10, 9];
        let mut out = Vec::new();
        let mut start = 0;
        for w in widths {
            out.push(&line[start..start + w]);
            start += w;
        }
        assert_eq!(start, line.len(), "line has trailing characters: {:?}", line);
        out
    }

    fn stub_waiter(
        decoder: StubDecoder,
    ) -> CooperativeWaiter<MockByteSource, StubDecoder, ManualClock> {
        CooperativeWaiter::new(MockByteSource::new(), decoder, ManualClock::new())
    }

    #[test]
    fn test_satellites_valid_hdop_invalid() {
        let mut decoder = StubDecoder::empty();
        decoder.satellites = Field::valid(7, 0);
        let mut waiter = stub_waiter(decoder);

        let line = StatusLineRenderer::new(brasilia()).render(&mut waiter);
        let cols = columns(&line);

        assert_eq!(cols[0], "7    ");
        assert_eq!(cols[1], "***** ");
    }

    #[test]
    fn test_all_invalid_line_is_structurally_complete() {
        let mut waiter = stub_waiter(StubDecoder::empty());
        let line = StatusLineRenderer::new(brasilia()).render(&mut waiter);

        assert_eq!(line.len(), LINE_WIDTH);
        let cols = columns(&line);
        assert_eq!(cols[2], "********** ");
        assert_eq!(cols[5], "********** ");
        assert_eq!(cols[6], "******** ");
        assert_eq!(cols[11], "***   ");
        assert_eq!(cols[12], "******** ");
        assert_eq!(cols[14], "***   ");
        // Counters have no validity and are always printed
        assert_eq!(cols[15], "0     ");
        assert_eq!(cols[16], "0         ");
        assert_eq!(cols[17], "0        ");
    }

    #[test]
    fn test_full_fix_line() {
        let mut decoder = StubDecoder::empty();
        decoder.satellites = Field::valid(9, 10);
        decoder.hdop = Field::valid(0.9, 10);
        decoder.location = Field::valid(GeoPoint::new(-23.5505, -46.6333), 250);
        decoder.date = Field::valid(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(), 40);
        decoder.time = Field::valid(NaiveTime::from_hms_opt(13, 2, 9).unwrap(), 40);
        decoder.altitude = Field::valid(760.25, 250);
        decoder.course = Field::valid(90.0, 250);
        decoder.speed = Field::valid(12.5, 250);
        decoder.counters = DecoderCounters {
            chars_processed: 4321,
            sentences_with_fix: 17,
            failed_checksum: 2,
            passed_checksum: 30,
        };
        let mut waiter = stub_waiter(decoder);

        let line = StatusLineRenderer::new(brasilia()).render(&mut waiter);

        assert_eq!(line.len(), LINE_WIDTH);
        let cols = columns(&line);
        assert_eq!(cols[0], "9    ");
        assert_eq!(cols[1], "0.9   ");
        assert_eq!(cols[2], "-23.550500 ");
        assert_eq!(cols[3], "-46.633300  ");
        assert_eq!(cols[4], "250  ");
        assert_eq!(cols[5], "10/15/2026 ");
        assert_eq!(cols[6], "13:02:09 ");
        assert_eq!(cols[7], "40   ");
        assert_eq!(cols[8], "760.25 ");
        assert_eq!(cols[9], "90.00  ");
        assert_eq!(cols[10], "12.50 ");
        assert_eq!(cols[11], "E     ");
        assert_eq!(cols[12], "878      ");
        let bearing = initial_bearing(GeoPoint::new(-23.5505, -46.6333), brasilia().point);
        assert_eq!(cols[13], format!("{:.2} ", bearing));
        assert_eq!(cols[13], "351.14 ");
        assert_eq!(cols[14], "N     ");
        assert_eq!(cols[15], "4321  ");
        assert_eq!(cols[16], "17        ");
        assert_eq!(cols[17], "2        ");
    }

    #[test]
    fn test_position_without_course_keeps_alignment() {
        let mut decoder = StubDecoder::empty();
        decoder.location = Field::valid(GeoPoint::new(-15.0, -47.0), 5);
        let mut waiter = stub_waiter(decoder);

        let line = StatusLineRenderer::new(brasilia()).render(&mut waiter);

        assert_eq!(line.len(), LINE_WIDTH);
        let cols = columns(&line);
        assert_eq!(cols[9], "****** ");
        assert_eq!(cols[11], "***   ");
        assert_ne!(cols[14], "***   ");
    }

    #[test]
    fn test_render_feeds_decoder_between_columns() {
        let source = MockByteSource::new();
        let gga = frame("GPGGA,101010,1544.343,S,04753.622,W,1,07,,1100.0,M,,M,,");
        source.push(&gga);
        let clock = ManualClock::new();
        let mut waiter =
            CooperativeWaiter::new(source.clone(), NmeaDecoder::new(clock.clone()), clock);

        let line = StatusLineRenderer::new(brasilia()).render(&mut waiter);
        let cols = columns(&line);

        // Satellites were read before the first pacing step
        assert_eq!(cols[0], "**** ");
        // Later columns see the sentence drained by that step
        assert_eq!(cols[2], "-15.739050 ");
        assert_eq!(cols[1], "***** ");
        assert_eq!(cols[12], "0        ");
        assert_eq!(cols[15], format!("{:<6}", gga.len()));
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn test_header_names_reference_point() {
        let renderer = StatusLineRenderer::new(brasilia());
        let header = renderer.header_lines();
        assert!(header[1].contains("---- to Brasilia  ----"));
        assert_eq!(header[2].len(), LINE_WIDTH);
        assert!(header[0].starts_with("Sats HDOP"));
    }
}
