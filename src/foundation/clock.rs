//! Monotonic time samples and the clock seam the controller reads time through.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic timestamp. Elapsed values are reported in seconds as `f32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSample(Instant);

impl TimeSample {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn from_instant(instant: Instant) -> Self {
        Self(instant)
    }

    pub fn instant(self) -> Instant {
        self.0
    }

    /// Wall time elapsed since this sample was taken.
    pub fn elapsed(self) -> f32 {
        self.0.elapsed().as_secs_f32()
    }

    /// Seconds from `earlier` to `self`; zero if `earlier` is actually later.
    pub fn since(self, earlier: TimeSample) -> f32 {
        self.0.saturating_duration_since(earlier.0).as_secs_f32()
    }

    /// This sample shifted forward by `secs` (negative values are treated as zero).
    pub fn after(self, secs: f32) -> Self {
        Self(self.0 + Duration::from_secs_f32(secs.max(0.0)))
    }

    pub fn reset(&mut self) {
        self.0 = Instant::now();
    }

    pub fn reset_to(&mut self, now: TimeSample) {
        *self = now;
    }
}

pub trait Clock: Send {
    fn now(&self) -> TimeSample;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeSample {
        TimeSample::now()
    }
}

/// A clock that only moves when told to. Clones share the same time line.
#[derive(Clone, Debug)]
pub struct ManualClock {
    base: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, secs: f32) {
        let nanos = Duration::from_secs_f32(secs.max(0.0)).as_nanos() as u64;
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn elapsed(&self) -> f32 {
        Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst)).as_secs_f32()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeSample {
        let offset = Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst));
        TimeSample(self.base + offset)
    }
}
