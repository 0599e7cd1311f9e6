use crate::animation::scalar::ScalarAnimation;
use crate::foundation::clock::TimeSample;

/// Seconds the popup takes to slide in or out.
pub const POPUP_TRANSITION_SECS: f32 = 0.5;

/// Popup height for a viewport height: a quarter of the screen, clamped to `[150, 450]`.
pub fn popup_height(viewport_height: u32) -> f32 {
    (viewport_height as f32 / 4.0).clamp(150.0, 450.0)
}

/// Slide-in, hold, slide-out choreography of a stage's info popup.
///
/// The animated value is the popup's top edge: `hide` keeps it just below the screen, `display`
/// puts it fully on screen.
#[derive(Clone, Copy, Debug)]
pub struct InfoPopupAnimation {
    appear: ScalarAnimation,
    disappear: ScalarAnimation,
    appear_completed: bool,
}

impl InfoPopupAnimation {
    pub fn new(
        initial_delay: f32,
        display_time: f32,
        hide: f32,
        display: f32,
        now: TimeSample,
    ) -> Self {
        let t = POPUP_TRANSITION_SECS;
        Self {
            appear: ScalarAnimation::new(hide, display, initial_delay, t, now),
            disappear: ScalarAnimation::new(display, hide, initial_delay + t + display_time, t, now),
            appear_completed: false,
        }
    }

    /// Popup for a viewport; height is taken from [`popup_height`].
    pub fn for_viewport(
        initial_delay: f32,
        display_time: f32,
        viewport_height: u32,
        now: TimeSample,
    ) -> Self {
        let (hide, display) = Self::heights(viewport_height);
        Self::new(initial_delay, display_time, hide, display, now)
    }

    fn heights(viewport_height: u32) -> (f32, f32) {
        let h = viewport_height as f32;
        (h, h - popup_height(viewport_height))
    }

    /// Advances the popup; returns `true` once it has slid out again.
    pub fn animate(&mut self, now: TimeSample, top: &mut f32) -> bool {
        if !self.appear_completed {
            self.appear_completed = self.appear.animate(now, top);
            return false;
        }
        self.disappear.animate(now, top)
    }

    pub fn has_completed(&self, now: TimeSample) -> bool {
        self.appear_completed && self.disappear.has_completed(now)
    }

    /// Whether any part of the popup is on screen.
    pub fn is_visible(&self, now: TimeSample) -> bool {
        self.appear.value_at(now).is_some() && !self.disappear.has_completed(now)
    }

    pub fn update_heights(&mut self, viewport_height: u32) {
        let (hide, display) = Self::heights(viewport_height);
        self.appear.update_values(hide, display);
        self.disappear.update_values(display, hide);
    }

    pub fn reset_time(&mut self, now: TimeSample) {
        self.appear.reset_time(now);
        self.disappear.reset_time(now);
        self.appear_completed = false;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/popup.rs"]
mod tests;
