//! # Cooperative Pacing
//!
//! The positioning stream must be drained continuously: bytes left sitting in
//! the serial buffer for too long are lost. Every blocking delay in the
//! logger therefore goes through [`CooperativeWaiter::wait_for`], which keeps
//! moving bytes from the transport into the decoder until the requested time
//! has passed.
//!
//! There is a single timeline and no background task. A zero-duration wait
//! ([`CooperativeWaiter::pace`]) is used between formatting steps so that the
//! decoder advances even while a status line is being built.

use std::time::{Duration, Instant};

use crate::gps::FixDecoder;
use crate::serial::ByteSource;

/// Longest single idle step while waiting for time to pass
pub const IDLE_GRANULARITY: Duration = Duration::from_millis(1);

/// Source of monotonic time since startup.
pub trait Clock {
    /// Time elapsed since the clock was started.
    fn now(&self) -> Duration;

    /// Give up the timeline for at most `max` while nothing is available.
    fn idle(&self, max: Duration);

    /// Milliseconds since start, as logged in telemetry records.
    fn millis(&self) -> u64 {
        self.now().as_millis() as u64
    }
}

/// Wall-clock independent clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Start a clock at the current instant.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn idle(&self, max: Duration) {
        std::thread::sleep(max.min(IDLE_GRANULARITY));
    }
}

/// Where a waiter currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Inside a wait, draining the transport
    Waiting,
    /// Not waiting; the last wait drained everything that was available
    Drained,
}

/// Owns the transport, the decoder and the clock, and keeps them in step.
///
/// Invariant: a byte read from the transport is always fed to the decoder in
/// the same step.
pub struct CooperativeWaiter<T, D, C> {
    transport: T,
    decoder: D,
    clock: C,
    state: WaitState,
}

impl<T, D, C> CooperativeWaiter<T, D, C>
where
    T: ByteSource,
    D: FixDecoder,
    C: Clock,
{
    pub fn new(transport: T, decoder: D, clock: C) -> Self {
        Self {
            transport,
            decoder,
            clock,
            state: WaitState::Drained,
        }
    }

    /// Block for `duration` while feeding every available byte to the decoder.
    ///
    /// The drain runs at least once, so `wait_for(Duration::ZERO)` consumes
    /// everything already buffered and returns. Returns the number of bytes
    /// fed during this wait.
    pub fn wait_for(&mut self, duration: Duration) -> usize {
        self.state = WaitState::Waiting;
        let start = self.clock.now();
        let mut fed = 0;

        loop {
            fed += self.drain();

            let elapsed = self.clock.now().saturating_sub(start);
            if elapsed >= duration {
                break;
            }
            self.clock.idle(duration - elapsed);
        }

        self.state = WaitState::Drained;
        fed
    }

    /// Zero-duration wait used between formatting steps.
    pub fn pace(&mut self) -> usize {
        self.wait_for(Duration::ZERO)
    }

    fn drain(&mut self) -> usize {
        let mut fed = 0;
        while self.transport.available() > 0 {
            match self.transport.read_byte() {
                Some(byte) => {
                    self.decoder.encode(byte);
                    fed += 1;
                }
                None => break,
            }
        }
        fed
    }

    pub fn state(&self) -> WaitState {
        self.state
    }

    /// Read-only view of the decoder for rendering.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
