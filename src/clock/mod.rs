//! Monotonic clock capability
//!
//! The countdown never reads wall-clock time. Everything is measured from
//! opaque monotonic instants expressed in raw clock ticks, converted to
//! nanoseconds with a timebase supplied by the clock itself.

pub mod stopwatch;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

pub use stopwatch::Stopwatch;

/// Opaque point on a monotonic timeline, in raw clock ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonotonicInstant(u64);

impl MonotonicInstant {
    /// Wrap a raw tick count. Only clock implementations should need this.
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    pub const fn ticks(self) -> u64 {
        self.0
    }
}

/// Ratio converting raw clock ticks into nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timebase {
    pub numer: u32,
    pub denom: u32,
}

impl Timebase {
    /// One tick per nanosecond
    pub const NANOS: Timebase = Timebase { numer: 1, denom: 1 };

    pub const fn new(numer: u32, denom: u32) -> Self {
        Self { numer, denom }
    }

    /// Convert ticks to nanoseconds.
    ///
    /// The multiplication happens in 128 bits so large tick counts with a
    /// large numerator cannot overflow; the result saturates at `u64::MAX`.
    pub fn ticks_to_nanos(&self, ticks: u64) -> u64 {
        if self.denom == 0 {
            return 0;
        }
        let nanos = u128::from(ticks) * u128::from(self.numer) / u128::from(self.denom);
        u64::try_from(nanos).unwrap_or(u64::MAX)
    }
}

/// Source of monotonic instants
pub trait MonotonicClock: Send + Sync {
    /// Current instant
    fn now(&self) -> MonotonicInstant;

    /// Conversion factor from this clock's ticks to nanoseconds
    fn timebase(&self) -> Timebase;

    /// Nanoseconds from `earlier` to `later`.
    ///
    /// A `later` that precedes `earlier` yields zero rather than wrapping.
    fn nanos_between(&self, earlier: MonotonicInstant, later: MonotonicInstant) -> u64 {
        let ticks = later.ticks().saturating_sub(earlier.ticks());
        self.timebase().ticks_to_nanos(ticks)
    }
}

/// Production clock backed by `tokio::time::Instant`.
///
/// Ticks are nanoseconds since the clock was created. Under a paused tokio
/// runtime this follows virtual time, which keeps ticker tests deterministic.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    anchor: tokio::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            anchor: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> MonotonicInstant {
        let nanos = self.anchor.elapsed().as_nanos();
        MonotonicInstant::from_ticks(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// tokio's `Instant` already reports nanoseconds, so 1/1 is the
    /// platform factor for this clock's ticks
    fn timebase(&self) -> Timebase {
        Timebase::NANOS
    }
}

/// Clock that only moves when told to.
///
/// Cloning shares the underlying tick counter, so a test can keep one handle
/// and give another to the controller.
#[derive(Debug, Clone)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
    timebase: Timebase,
}

impl ManualClock {
    /// Manual clock counting in nanoseconds
    pub fn new() -> Self {
        Self::with_timebase(Timebase::NANOS)
    }

    /// Manual clock with a custom tick rate
    pub fn with_timebase(timebase: Timebase) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(0)),
            timebase,
        }
    }

    /// Move the clock forward by a number of raw ticks
    pub fn advance_ticks(&self, ticks: u64) {
        self.ticks.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Move the clock forward by a duration, expressed in this clock's ticks
    pub fn advance(&self, duration: Duration) {
        let nanos = duration.as_nanos();
        let numer = u128::from(self.timebase.numer.max(1));
        let ticks = nanos * u128::from(self.timebase.denom) / numer;
        self.advance_ticks(u64::try_from(ticks).unwrap_or(u64::MAX));
    }

    /// Move the clock forward by fractional seconds
    pub fn advance_secs_f64(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> MonotonicInstant {
        MonotonicInstant::from_ticks(self.ticks.load(Ordering::SeqCst))
    }

    fn timebase(&self) -> Timebase {
        self.timebase
    }
}
