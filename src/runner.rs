//! # Cycle Runner
//!
//! One cycle is: render the status line, log one telemetry record, then
//! wait out the cycle interval while feeding the decoder. Everything runs on
//! the caller's thread; the only suspension point is the waiter.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use crate::gps::FixDecoder;
use crate::pacing::{Clock, CooperativeWaiter};
use crate::sensors::{MotionSensor, PressureSensor};
use crate::serial::ByteSource;
use crate::status::StatusLineRenderer;
use crate::telemetry::{CycleOutcome, LogStore, TelemetryLogger};

/// Cycles between progress log messages
pub const PROGRESS_INTERVAL_CYCLES: u64 = 60;

/// Warns once when the receiver has stayed silent past a grace period.
#[derive(Debug, Clone)]
pub struct NoDataWatchdog {
    grace: Duration,
    min_chars: u64,
    warned: bool,
}

impl NoDataWatchdog {
    pub fn new(grace: Duration, min_chars: u64) -> Self {
        Self {
            grace,
            min_chars,
            warned: false,
        }
    }

    /// Returns `true` the first time `chars` is still below the minimum
    /// after the grace period.
    pub fn check(&mut self, now: Duration, chars: u64) -> bool {
        if self.warned || now <= self.grace || chars >= self.min_chars {
            return false;
        }
        self.warned = true;
        true
    }
}

/// What one cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Bytes fed to the decoder during the cycle
    pub bytes_fed: usize,
    /// Telemetry outcome, when telemetry is enabled
    pub telemetry: Option<CycleOutcome>,
    /// The no-data warning was raised this cycle
    pub no_data: bool,
}

/// Owns the waiter and drives cycles until shutdown.
pub struct CycleRunner<T, D, C, M, P, S, W> {
    waiter: CooperativeWaiter<T, D, C>,
    status: Option<StatusLineRenderer>,
    telemetry: Option<TelemetryLogger<M, P, S>>,
    out: W,
    interval: Duration,
    watchdog: NoDataWatchdog,
    cycles: u64,
}

impl<T, D, C, M, P, S, W> CycleRunner<T, D, C, M, P, S, W>
where
    T: ByteSource,
    D: FixDecoder,
    C: Clock,
    M: MotionSensor,
    P: PressureSensor,
    S: LogStore,
    W: Write,
{
    pub fn new(
        waiter: CooperativeWaiter<T, D, C>,
        status: Option<StatusLineRenderer>,
        telemetry: Option<TelemetryLogger<M, P, S>>,
        out: W,
        interval: Duration,
        watchdog: NoDataWatchdog,
    ) -> Self {
        Self {
            waiter,
            status,
            telemetry,
            out,
            interval,
            watchdog,
            cycles: 0,
        }
    }

    /// Print the column headings.
    pub fn print_header(&mut self) {
        let Some(renderer) = &self.status else {
            return;
        };
        for line in renderer.header_lines() {
            if let Err(e) = writeln!(self.out, "{}", line) {
                warn!("Failed to write status header: {}", e);
                return;
            }
        }
    }

    /// Run one full cycle.
    pub fn run_cycle(&mut self) -> CycleReport {
        let chars_before = self.waiter.decoder().counters().chars_processed;

        if let Some(renderer) = &self.status {
            let line = renderer.render(&mut self.waiter);
            if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
                warn!("Failed to write status line: {}", e);
            }
        }

        let telemetry = match self.telemetry.as_mut() {
            Some(logger) => {
                let elapsed_ms = self.waiter.clock().millis();
                Some(logger.log_cycle(elapsed_ms))
            }
            None => None,
        };

        self.waiter.wait_for(self.interval);

        let now = self.waiter.clock().now();
        let chars = self.waiter.decoder().counters().chars_processed;
        let bytes_fed = (chars - chars_before) as usize;
        let no_data = self.watchdog.check(now, chars);
        if no_data {
            warn!("No GPS data received: check wiring");
        }

        self.cycles += 1;
        if self.cycles % PROGRESS_INTERVAL_CYCLES == 0 {
            let counters = self.waiter.decoder().counters();
            info!(
                "{} cycles: {} chars, {} fixes, {} checksum failures",
                self.cycles,
                counters.chars_processed,
                counters.sentences_with_fix,
                counters.failed_checksum
            );
        }

        CycleReport {
            bytes_fed,
            telemetry,
            no_data,
        }
    }

    /// Run cycles until `shutdown` is set. The flag is checked between
    /// cycles; a cycle in progress always completes.
    pub fn run(&mut self, shutdown: &AtomicBool) -> u64 {
        while !shutdown.load(Ordering::SeqCst) {
            self.run_cycle();
        }
        info!("Stopped after {} cycles", self.cycles);
        self.cycles
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn waiter(&self) -> &CooperativeWaiter<T, D, C> {
        &self.waiter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::mocks::frame;
    use crate::gps::NmeaDecoder;
    use crate::nav::ReferencePoint;
    use crate::pacing::mocks::ManualClock;
    use crate::sensors::{MockMotionSensor, MockPressureSensor, MotionEvent, PressureEvent};
    use crate::serial::mocks::MockByteSource;
    use crate::status::LINE_WIDTH;
    use crate::telemetry::store::mocks::MemoryStore;

    type TestRunner = CycleRunner<
        MockByteSource,
        NmeaDecoder<ManualClock>,
        ManualClock,
        MockMotionSensor,
        MockPressureSensor,
        MemoryStore,
        Vec<u8>,
    >;

    fn logger(
        store: &MemoryStore,
    ) -> TelemetryLogger<MockMotionSensor, MockPressureSensor, MemoryStore> {
        let mut imu = MockMotionSensor::new();
        imu.expect_read_event().returning(|| Ok(MotionEvent::default()));
        let mut baro = MockPressureSensor::new();
        baro.expect_read_event().returning(|| Ok(PressureEvent::default()));
        TelemetryLogger::new(imu, baro, store.clone())
    }

    fn runner(
        source: &MockByteSource,
        clock: &ManualClock,
        store: Option<&MemoryStore>,
        interval_ms: u64,
    ) -> TestRunner {
        let waiter = CooperativeWaiter::new(
            source.clone(),
            NmeaDecoder::new(clock.clone()),
            clock.clone(),
        );
        CycleRunner::new(
            waiter,
            Some(StatusLineRenderer::new(ReferencePoint::new("Brasilia", -15.73905, -47.89370))),
            store.map(logger),
            Vec::new(),
            Duration::from_millis(interval_ms),
            NoDataWatchdog::new(Duration::from_millis(5000), 10),
        )
    }

    #[test]
    fn test_watchdog_waits_for_grace_period() {
        let mut watchdog = NoDataWatchdog::new(Duration::from_millis(5000), 10);
        assert!(!watchdog.check(Duration::from_millis(4000), 0));
        assert!(watchdog.check(Duration::from_millis(5001), 3));
        // Only once
        assert!(!watchdog.check(Duration::from_millis(9000), 3));
    }

    #[test]
    fn test_watchdog_quiet_with_data() {
        let mut watchdog = NoDataWatchdog::new(Duration::from_millis(5000), 10);
        assert!(!watchdog.check(Duration::from_millis(6000), 10));
        assert!(!watchdog.check(Duration::from_millis(60000), 500));
    }

    #[test]
    fn test_cycle_prints_line_and_logs() {
        let source = MockByteSource::new();
        let clock = ManualClock::new();
        let store = MemoryStore::new();
        let mut runner = runner(&source, &clock, Some(&store), 1000);
        clock.set_millis(1500);

        let report = runner.run_cycle();

        assert!(matches!(report.telemetry, Some(CycleOutcome::Written { .. })));
        assert!(store.contents().starts_with("1500,"));
        let output = String::from_utf8(runner.out.clone()).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert_eq!(output.lines().next().unwrap().len(), LINE_WIDTH);
        assert_eq!(clock.now(), Duration::from_millis(2500));
    }

    #[test]
    fn test_cycle_feeds_pending_bytes() {
        let source = MockByteSource::new();
        let clock = ManualClock::new();
        let mut runner = runner(&source, &clock, None, 100);
        let gga = frame("GPGGA,101010,1544.343,S,04753.622,W,1,07,0.9,1100.0,M,,M,,");
        source.push_later(&gga);

        let report = runner.run_cycle();

        assert_eq!(report.telemetry, None);
        assert_eq!(report.bytes_fed, gga.len());
        let counters = runner.waiter().decoder().counters();
        assert_eq!(counters.sentences_with_fix, 1);
        assert_eq!(counters.chars_processed, gga.len() as u64);
    }

    #[test]
    fn test_no_data_warning_after_grace() {
        let source = MockByteSource::new();
        let clock = ManualClock::new();
        let mut runner = runner(&source, &clock, None, 3000);

        assert!(!runner.run_cycle().no_data);
        assert!(runner.run_cycle().no_data);
        assert!(!runner.run_cycle().no_data);
    }

    #[test]
    fn test_header_printed_once() {
        let source = MockByteSource::new();
        let clock = ManualClock::new();
        let mut runner = runner(&source, &clock, None, 0);

        runner.print_header();
        let output = String::from_utf8(runner.out.clone()).unwrap();
        assert_eq!(output.lines().count(), 3);
        assert!(output.contains("Brasilia"));
    }

    #[test]
    fn test_run_stops_on_shutdown_flag() {
        let source = MockByteSource::new();
        let clock = ManualClock::new();
        let mut runner = runner(&source, &clock, None, 10);

        let shutdown = AtomicBool::new(true);
        assert_eq!(runner.run(&shutdown), 0);
        assert_eq!(runner.cycles(), 0);
    }

    #[test]
    fn test_status_disabled() {
        let source = MockByteSource::new();
        let clock = ManualClock::new();
        let store = MemoryStore::new();
        let waiter =
            CooperativeWaiter::new(source.clone(), NmeaDecoder::new(clock.clone()), clock.clone());
        let mut runner: TestRunner = CycleRunner::new(
            waiter,
            None,
            Some(logger(&store)),
            Vec::new(),
            Duration::from_millis(5),
            NoDataWatchdog::new(Duration::from_millis(5000), 10),
        );

        runner.print_header();
        runner.run_cycle();

        assert!(runner.out.is_empty());
        assert_eq!(store.contents().lines().count(), 1);
    }
}
