//! Elapsed time measurement

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use super::{MonotonicClock, MonotonicInstant};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Measures time elapsed since creation or the last `reset`.
///
/// The reference instant is kept in an atomic so a reset racing a read never
/// produces a torn value.
pub struct Stopwatch {
    clock: Arc<dyn MonotonicClock>,
    reference: AtomicU64,
}

impl Stopwatch {
    /// Create a stopwatch whose reference point is now
    pub fn new(clock: Arc<dyn MonotonicClock>) -> Self {
        let reference = AtomicU64::new(clock.now().ticks());
        Self { clock, reference }
    }

    /// Capture the current instant as the new reference point
    pub fn reset(&self) {
        self.reference.store(self.clock.now().ticks(), Ordering::SeqCst);
    }

    /// Nanoseconds since the reference point
    pub fn elapsed_nanos(&self) -> u64 {
        let reference = MonotonicInstant::from_ticks(self.reference.load(Ordering::SeqCst));
        self.clock.nanos_between(reference, self.clock.now())
    }

    /// Whole seconds since the reference point, rounded down
    pub fn elapsed_whole_seconds(&self) -> u64 {
        self.elapsed_nanos() / NANOS_PER_SEC
    }

    /// Seconds since the reference point
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_nanos() as f64 / NANOS_PER_SEC as f64
    }

    /// Nanoseconds until elapsed time next crosses a whole second
    pub fn nanos_to_next_second(&self) -> u64 {
        NANOS_PER_SEC - self.elapsed_nanos() % NANOS_PER_SEC
    }
}

impl std::fmt::Debug for Stopwatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stopwatch")
            .field("elapsed_nanos", &self.elapsed_nanos())
            .finish()
    }
}
