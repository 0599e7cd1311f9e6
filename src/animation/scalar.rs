use crate::foundation::clock::TimeSample;

/// Linear interpolation of one float over time, with an initial delay.
///
/// The animated value lives with the caller; `animate` writes into it. Nothing is written before
/// the delay has elapsed, and every call after completion writes exactly `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScalarAnimation {
    start: f32,
    end: f32,
    delay: f32,
    duration: f32,
    start_time: TimeSample,
}

impl ScalarAnimation {
    pub fn new(start: f32, end: f32, delay: f32, duration: f32, now: TimeSample) -> Self {
        Self {
            start,
            end,
            delay: delay.max(0.0),
            duration: duration.max(0.0),
            start_time: now,
        }
    }

    pub fn start_value(&self) -> f32 {
        self.start
    }

    pub fn end_value(&self) -> f32 {
        self.end
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Seconds since the delay ran out; negative while still delayed.
    fn progress_secs(&self, now: TimeSample) -> f32 {
        now.since(self.start_time) - self.delay
    }

    /// Interpolated value at `now`, or `None` while still inside the delay.
    pub fn value_at(&self, now: TimeSample) -> Option<f32> {
        let t = self.progress_secs(now);
        if t < 0.0 {
            return None;
        }
        if self.duration <= 0.0 || t >= self.duration {
            return Some(self.end);
        }
        Some(self.start + (self.end - self.start) * (t / self.duration))
    }

    /// Writes the current value into `target`; returns `true` once the animation has completed.
    pub fn animate(&self, now: TimeSample, target: &mut f32) -> bool {
        match self.value_at(now) {
            Some(v) => {
                *target = v;
                self.has_completed(now)
            }
            None => false,
        }
    }

    /// Delay elapsed and not yet complete.
    pub fn is_active(&self, now: TimeSample) -> bool {
        let t = self.progress_secs(now);
        t >= 0.0 && t < self.duration
    }

    pub fn has_completed(&self, now: TimeSample) -> bool {
        let t = self.progress_secs(now);
        t >= 0.0 && t >= self.duration
    }

    pub fn reset(&mut self, start: f32, end: f32, duration: f32, now: TimeSample) {
        self.start = start;
        self.end = end;
        self.duration = duration.max(0.0);
        self.start_time = now;
    }

    pub fn reset_time(&mut self, now: TimeSample) {
        self.start_time = now;
    }

    pub fn update_timings(&mut self, delay: f32, duration: f32) {
        self.delay = delay.max(0.0);
        self.duration = duration.max(0.0);
    }

    pub fn update_values(&mut self, start: f32, end: f32) {
        self.start = start;
        self.end = end;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/scalar.rs"]
mod tests;
