//! Per-cycle telemetry logging

use tracing::{debug, warn};

use super::record::TelemetryRecord;
use super::store::{LogSession, LogStore};
use crate::sensors::{MotionSensor, PressureSensor};

/// Why a cycle's record was not persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A sensor driver failed to produce a reading
    SensorRead,
    /// The log could not be opened for append
    StorageOpen,
    /// The record could not be written or the session not closed
    StorageWrite,
}

/// Result of one logging cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Record appended and the session closed
    Written { bytes: usize },
    /// Nothing persisted this cycle; the next cycle retries
    Skipped(SkipReason),
}

/// Reads both sensors and appends one record per cycle.
///
/// Every cycle is independent: the record is built fresh, the session is
/// opened, written and closed before [`log_cycle`](Self::log_cycle) returns,
/// and nothing is carried over when a cycle is skipped.
pub struct TelemetryLogger<M, P, S> {
    motion: M,
    pressure: P,
    store: S,
    written: u64,
    skipped: u64,
}

impl<M, P, S> TelemetryLogger<M, P, S>
where
    M: MotionSensor,
    P: PressureSensor,
    S: LogStore,
{
    pub fn new(motion: M, pressure: P, store: S) -> Self {
        Self {
            motion,
            pressure,
            store,
            written: 0,
            skipped: 0,
        }
    }

    /// Read, serialize and persist one record stamped `elapsed_ms`.
    ///
    /// Failures are reported as [`CycleOutcome::Skipped`] with a warning and
    /// never stop the run.
    pub fn log_cycle(&mut self, elapsed_ms: u64) -> CycleOutcome {
        let outcome = self.try_log(elapsed_ms);
        match outcome {
            CycleOutcome::Written { bytes } => {
                self.written += 1;
                debug!("{}>>> {} bytes logged", elapsed_ms, bytes);
            }
            CycleOutcome::Skipped(_) => self.skipped += 1,
        }
        outcome
    }

    fn try_log(&mut self, elapsed_ms: u64) -> CycleOutcome {
        let motion = match self.motion.read_event() {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping telemetry record: {}", e);
                return CycleOutcome::Skipped(SkipReason::SensorRead);
            }
        };
        let pressure = match self.pressure.read_event() {
            Ok(event) => event,
            Err(e) => {
                warn!("Skipping telemetry record: {}", e);
                return CycleOutcome::Skipped(SkipReason::SensorRead);
            }
        };

        let line = TelemetryRecord::new(elapsed_ms, motion, pressure).to_line();

        let mut session = match self.store.open_append() {
            Ok(session) => session,
            Err(e) => {
                warn!("Could not open telemetry log, skipping this cycle: {}", e);
                return CycleOutcome::Skipped(SkipReason::StorageOpen);
            }
        };

        if let Err(e) = session.append(line.as_bytes()) {
            warn!("Telemetry record not persisted: {}", e);
            if let Err(e) = session.discard() {
                warn!("Partial telemetry record left in log: {}", e);
            }
            return CycleOutcome::Skipped(SkipReason::StorageWrite);
        }

        match session.close() {
            Ok(()) => CycleOutcome::Written { bytes: line.len() },
            Err(e) => {
                warn!("Telemetry record not persisted: {}", e);
                CycleOutcome::Skipped(SkipReason::StorageWrite)
            }
        }
    }

    /// Records persisted so far
    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// Cycles skipped so far
    pub fn cycles_skipped(&self) -> u64 {
        self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldLoggerError;
    use crate::sensors::{
        MockMotionSensor, MockPressureSensor, MotionEvent, PressureEvent, Vector3,
    };
    use crate::telemetry::store::mocks::{MemoryStore, StoreEvent};

    fn motion() -> MockMotionSensor {
        let mut sensor = MockMotionSensor::new();
        sensor.expect_read_event().returning(|| {
            Ok(MotionEvent {
                acceleration: Vector3::new(1.0, 2.0, 3.0),
                rotation: Vector3::new(0.5, 0.25, -0.125),
                temperature: 30.0,
            })
        });
        sensor
    }

    fn pressure() -> MockPressureSensor {
        let mut sensor = MockPressureSensor::new();
        sensor.expect_read_event().returning(|| {
            Ok(PressureEvent {
                temperature: 25.5,
                pressure_hpa: 1000.0,
                altitude_m: 110.75,
            })
        });
        sensor
    }

    #[test]
    fn test_record_written() {
        let store = MemoryStore::new();
        let mut logger = TelemetryLogger::new(motion(), pressure(), store.clone());

        let outcome = logger.log_cycle(1500);

        let expected = "1500,1.0,2.0,3.0,0.5,0.25,-0.125,30.0,25.5,1000.0,110.75\n";
        assert_eq!(outcome, CycleOutcome::Written { bytes: expected.len() });
        assert_eq!(store.contents(), expected);
        assert!(store.contents().starts_with("1500,1.0,2.0,3.0,"));
        assert_eq!(logger.records_written(), 1);
    }

    #[test]
    fn test_open_failure_skips_one_cycle() {
        let store = MemoryStore::new();
        store.fail_next_opens(1);
        let mut logger = TelemetryLogger::new(motion(), pressure(), store.clone());

        assert_eq!(logger.log_cycle(1000), CycleOutcome::Skipped(SkipReason::StorageOpen));
        assert_eq!(store.contents(), "");

        assert!(matches!(logger.log_cycle(2000), CycleOutcome::Written { .. }));
        assert!(store.contents().starts_with("2000,"));
        assert_eq!(store.contents().lines().count(), 1);
        assert_eq!(logger.cycles_skipped(), 1);
        assert_eq!(logger.records_written(), 1);
    }

    #[test]
    fn test_sessions_never_interleave() {
        let store = MemoryStore::new();
        let mut logger = TelemetryLogger::new(motion(), pressure(), store.clone());

        logger.log_cycle(10);
        logger.log_cycle(20);

        let line_len = store.contents().lines().next().unwrap().len() + 1;
        assert_eq!(
            store.events(),
            vec![
                StoreEvent::Open,
                StoreEvent::Append(line_len),
                StoreEvent::Close,
                StoreEvent::Open,
                StoreEvent::Append(line_len),
                StoreEvent::Close,
            ]
        );
        assert_eq!(store.max_open_sessions(), 1);
    }

    #[test]
    fn test_sensor_failure_skips_without_opening() {
        let mut failing = MockMotionSensor::new();
        failing
            .expect_read_event()
            .times(1)
            .returning(|| Err(FieldLoggerError::SensorRead("i2c timeout".to_string())));
        let store = MemoryStore::new();
        let mut logger = TelemetryLogger::new(failing, pressure(), store.clone());

        assert_eq!(logger.log_cycle(5), CycleOutcome::Skipped(SkipReason::SensorRead));
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_each_cycle_reads_sensors_once() {
        let mut imu = MockMotionSensor::new();
        imu.expect_read_event().times(3).returning(|| Ok(MotionEvent::default()));
        let mut baro = MockPressureSensor::new();
        baro.expect_read_event().times(3).returning(|| Ok(PressureEvent::default()));
        let store = MemoryStore::new();
        let mut logger = TelemetryLogger::new(imu, baro, store.clone());

        for elapsed in [0, 5, 10] {
            logger.log_cycle(elapsed);
        }
        assert_eq!(store.contents().lines().count(), 3);
        assert_eq!(
            store.contents().lines().last().unwrap(),
            "10,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0,0.0"
        );
    }

    #[test]
    fn test_partial_append_does_not_corrupt_next_record() {
        let store = MemoryStore::new();
        store.fail_next_append_after(5);
        let mut logger = TelemetryLogger::new(motion(), pressure(), store.clone());

        assert_eq!(logger.log_cycle(1000), CycleOutcome::Skipped(SkipReason::StorageWrite));
        assert_eq!(store.contents(), "");

        assert!(matches!(logger.log_cycle(2000), CycleOutcome::Written { .. }));
        let contents = store.contents();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.starts_with("2000,"));
        assert_eq!(contents.trim_end().split(',').count(), 11);

        let events = store.events();
        assert_eq!(
            &events[..3],
            &[StoreEvent::Open, StoreEvent::AppendFailed(5), StoreEvent::Discard]
        );
        assert_eq!(store.max_open_sessions(), 1);
    }
}
