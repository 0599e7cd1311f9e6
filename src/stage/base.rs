//! Behaviour every stage shares: fades, the info popup, frame counting, completion and the base
//! score. Concrete stages own a [`StageCore`] and call into it around their own drawing.

use std::time::Instant;

use crate::animation::popup::{InfoPopupAnimation, popup_height};
use crate::animation::scalar::ScalarAnimation;
use crate::config::ScoringConfig;
use crate::foundation::clock::TimeSample;
use crate::foundation::core::{Projection, Viewport};
use crate::foundation::error::{BenchError, BenchResult};
use crate::stage::renderer::{Overlay, PopupOverlay, StageRenderer};
use crate::stage::{StageData, StagePhase};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopupSettings {
    pub header: &'static str,
    pub message: &'static str,
    /// Seconds after the first frame before the popup starts sliding in.
    pub delay: f32,
    /// Seconds the popup stays fully shown.
    pub display: f32,
}

impl PopupSettings {
    pub const DEFAULT_DELAY: f32 = 3.0;
    pub const DEFAULT_DISPLAY: f32 = 3.5;

    pub fn new(header: &'static str, message: &'static str) -> Self {
        Self {
            header,
            message,
            delay: Self::DEFAULT_DELAY,
            display: Self::DEFAULT_DISPLAY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageSettings {
    pub name: &'static str,
    /// Seconds from the first frame to completion; `<= 0` never completes on its own.
    pub duration: f32,
    pub fade_secs: f32,
    pub near: f32,
    pub far: f32,
    pub popup: Option<PopupSettings>,
    /// Interactive stages are never scored and show no popup.
    pub interactive: bool,
}

impl StageSettings {
    pub const DEFAULT_FADE_SECS: f32 = 3.0;

    pub fn new(name: &'static str, duration: f32, near: f32, far: f32) -> Self {
        Self {
            name,
            duration,
            fade_secs: Self::DEFAULT_FADE_SECS,
            near,
            far,
            popup: None,
            interactive: false,
        }
    }

    pub fn with_popup(mut self, popup: PopupSettings) -> Self {
        self.popup = Some(popup);
        self
    }
}

/// Inputs to a stage's scoring hook.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreBasis {
    pub viewport: Viewport,
    pub frames: u64,
    /// Seconds from the first frame to the completing frame.
    pub elapsed: f32,
}

/// `fps * multiplier * (1 + area / baseline)`, rounded.
pub fn normalized_score(fps: f64, viewport: Viewport, scoring: &ScoringConfig) -> i64 {
    let factor = 1.0 + viewport.area() as f64 / scoring.resolution_baseline;
    (fps * scoring.fps_multiplier * factor).round() as i64
}

pub struct StageCore {
    settings: StageSettings,
    scoring: ScoringConfig,
    phase: StagePhase,
    loaded: bool,
    viewport: Option<Viewport>,
    projection: Option<Projection>,
    duration: f32,
    fade: f32,
    fade_in: Option<ScalarAnimation>,
    fade_out: Option<ScalarAnimation>,
    popup: Option<InfoPopupAnimation>,
    popup_top: f32,
    frames: u64,
    first_frame: Option<TimeSample>,
    data: StageData,
    result: Option<StageData>,
}

impl StageCore {
    pub fn new(settings: StageSettings, scoring: ScoringConfig) -> Self {
        Self {
            duration: settings.duration,
            settings,
            scoring,
            phase: StagePhase::Idle,
            loaded: false,
            viewport: None,
            projection: None,
            fade: 0.0,
            fade_in: None,
            fade_out: None,
            popup: None,
            popup_top: 0.0,
            frames: 0,
            first_frame: None,
            data: StageData::default(),
            result: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.settings.name
    }

    pub fn settings(&self) -> &StageSettings {
        &self.settings
    }

    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    pub fn is_interactive(&self) -> bool {
        self.settings.interactive
    }

    pub fn viewport(&self) -> BenchResult<Viewport> {
        self.viewport
            .ok_or_else(|| BenchError::lifecycle(format!("{} has no viewport", self.name())))
    }

    pub fn projection(&self) -> Option<Projection> {
        self.projection
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn fade(&self) -> f32 {
        self.fade
    }

    /// The record being filled in by the current run.
    pub fn data(&self) -> &StageData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut StageData {
        &mut self.data
    }

    pub fn result(&self) -> Option<&StageData> {
        self.result.as_ref()
    }

    /// Resets per-run state and arms the fades and popup. The stage is not renderable until
    /// [`finish_setup`](Self::finish_setup).
    pub fn begin_setup(&mut self, viewport: Viewport, now: TimeSample) {
        let fade_secs = self.settings.fade_secs;
        self.phase = StagePhase::Idle;
        self.duration = self.settings.duration;
        self.frames = 0;
        self.first_frame = None;
        self.data = StageData::default();
        self.result = None;
        self.fade = 1.0;
        self.fade_in = Some(ScalarAnimation::new(1.0, 0.0, 0.0, fade_secs, now));
        self.fade_out = (self.duration > 0.0).then(|| {
            ScalarAnimation::new(0.0, 1.0, self.duration - fade_secs, fade_secs, now)
        });
        self.popup = match self.settings.popup {
            Some(p) if !self.settings.interactive => Some(InfoPopupAnimation::for_viewport(
                p.delay,
                p.display,
                viewport.height,
                now,
            )),
            _ => None,
        };
        self.popup_top = viewport.height as f32;
        self.resize(viewport);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.projection = Some(Projection::perspective(
            viewport,
            self.settings.near,
            self.settings.far,
        ));
        if let Some(popup) = self.popup.as_mut() {
            popup.update_heights(viewport.height);
        }
    }

    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub fn finish_setup(&mut self, started: Instant) {
        self.data.load_time = started.elapsed().as_secs_f32();
        self.phase = StagePhase::Running;
        tracing::info!(
            stage = self.name(),
            load_time = self.data.load_time,
            "stage set up"
        );
    }

    /// Drops per-run state. Returns whether resources were loaded and need unloading.
    pub fn release(&mut self) -> bool {
        self.phase = StagePhase::Idle;
        self.fade_in = None;
        self.fade_out = None;
        self.popup = None;
        self.first_frame = None;
        std::mem::replace(&mut self.loaded, false)
    }

    /// Seconds since the first frame; zero before it.
    pub fn elapsed(&self, now: TimeSample) -> f32 {
        self.first_frame.map_or(0.0, |t| now.since(t))
    }

    /// Counts the frame and advances the fades. Fails unless the stage is running.
    pub fn begin_frame(&mut self, now: TimeSample) -> BenchResult<f32> {
        if self.phase != StagePhase::Running {
            return Err(BenchError::lifecycle(format!(
                "{} rendered while {:?}",
                self.name(),
                self.phase
            )));
        }
        if self.first_frame.is_none() {
            self.first_frame = Some(now);
            for anim in [self.fade_in.as_mut(), self.fade_out.as_mut()]
                .into_iter()
                .flatten()
            {
                anim.reset_time(now);
            }
            if let Some(popup) = self.popup.as_mut() {
                popup.reset_time(now);
            }
        }
        self.frames += 1;

        if let Some(fade_in) = self.fade_in
            && fade_in.animate(now, &mut self.fade)
        {
            self.fade_in = None;
        }
        if let Some(fade_out) = self.fade_out {
            fade_out.animate(now, &mut self.fade);
        }
        Ok(self.elapsed(now))
    }

    pub fn is_done(&self, now: TimeSample) -> bool {
        self.duration > 0.0 && self.elapsed(now) >= self.duration
    }

    pub fn has_fade_out(&self) -> bool {
        self.fade_out.is_some()
    }

    pub fn fade_out_active(&self, now: TimeSample) -> bool {
        self.fade_out.is_some_and(|a| a.is_active(now))
    }

    /// `true` when there is no popup or it has already slid away.
    pub fn popup_completed(&self, now: TimeSample) -> bool {
        self.popup.is_none_or(|p| p.has_completed(now))
    }

    /// Sets the total duration, re-timing (or creating, or dropping) the fade-out so it still
    /// ends exactly at the new duration.
    pub fn update_duration(&mut self, duration: f32, now: TimeSample) {
        let fade_secs = self.settings.fade_secs;
        self.duration = duration;
        if duration > 0.0 {
            match self.fade_out.as_mut() {
                Some(anim) => anim.update_timings(duration - fade_secs, fade_secs),
                None => {
                    let anchor = self.first_frame.unwrap_or(now);
                    self.fade_out = Some(ScalarAnimation::new(
                        0.0,
                        1.0,
                        duration - fade_secs,
                        fade_secs,
                        anchor,
                    ));
                }
            }
        } else {
            self.fade_out = None;
        }
        tracing::debug!(stage = self.name(), duration, "stage duration updated");
    }

    pub fn update_duration_from_now(&mut self, remaining: f32, now: TimeSample) {
        self.update_duration(self.elapsed(now) + remaining, now);
    }

    pub fn set_clip(&mut self, near: f32, far: f32) {
        if let Some(p) = self.projection.as_mut() {
            p.near = near;
            p.far = far;
        }
    }

    /// Completes the frame: on the completing frame computes the base score and hands it to
    /// `score` for stage-specific adjustment, then draws the fade and popup overlay.
    ///
    /// Returns whether the stage wants more frames.
    pub fn finish_frame(
        &mut self,
        now: TimeSample,
        renderer: &mut dyn StageRenderer,
        fps_meter: Option<f32>,
        score: impl FnOnce(&mut StageData, &ScoreBasis),
    ) -> bool {
        let done = self.is_done(now);
        if done {
            self.phase = StagePhase::Completed;
            if !self.settings.interactive
                && let Some(viewport) = self.viewport
            {
                let basis = ScoreBasis {
                    viewport,
                    frames: self.frames,
                    elapsed: self.elapsed(now),
                };
                self.update_score(&basis);
                score(&mut self.data, &basis);
                self.result = Some(self.data.clone());
                tracing::info!(
                    stage = self.name(),
                    fps = self.data.fps,
                    score = self.data.score,
                    "stage completed"
                );
            }
        }

        let mut overlay = Overlay {
            fade: (self.fade > 0.0).then_some(self.fade),
            popup: None,
            fps: fps_meter,
        };
        if let (Some(popup), Some(settings), Some(viewport)) =
            (self.popup.as_mut(), self.settings.popup, self.viewport)
        {
            popup.animate(now, &mut self.popup_top);
            if popup.is_visible(now) {
                overlay.popup = Some(PopupOverlay {
                    top: self.popup_top,
                    height: popup_height(viewport.height),
                    header: settings.header,
                    message: settings.message,
                });
            }
        }
        renderer.draw_overlay(&overlay);
        !done
    }

    fn update_score(&mut self, basis: &ScoreBasis) {
        let fps = if basis.elapsed > 0.0 {
            basis.frames as f64 / f64::from(basis.elapsed)
        } else {
            0.0
        };
        self.data.fps = fps as f32;
        self.data.score = normalized_score(fps, basis.viewport, &self.scoring);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/base.rs"]
mod tests;
