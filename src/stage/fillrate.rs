//! Fill-rate stage: four lighting variants, each timed once over a stack of full-screen layers.

use std::time::Instant;

use crate::config::{FillrateConfig, ScoringConfig};
use crate::foundation::clock::TimeSample;
use crate::foundation::core::Viewport;
use crate::foundation::error::{BenchError, BenchResult};
use crate::stage::base::{PopupSettings, StageCore, StageSettings};
use crate::stage::renderer::{FillPhase, FrameDetail, FrameInfo, StageRenderer};
use crate::stage::{Stage, StageData, StagePhase};

/// Diagnostic recorded when a sample is implausibly fast.
pub const FINISH_DIAGNOSTIC: &str = "finish";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleOutcome {
    Accepted { mpix_per_sec: f64 },
    /// The renderer returned before the work can have been done.
    Discarded { mpix_per_sec: f64 },
}

impl SampleOutcome {
    /// The rate to record: the measurement, or zero when discarded.
    pub fn rate(self) -> f64 {
        match self {
            SampleOutcome::Accepted { mpix_per_sec } => mpix_per_sec,
            SampleOutcome::Discarded { .. } => 0.0,
        }
    }
}

/// Converts a timed sample of `layers` full-screen passes into Mpix/s and applies the sanity
/// thresholds.
pub fn assess_sample(
    viewport: Viewport,
    layers: u32,
    sample_secs: f32,
    cfg: &FillrateConfig,
) -> SampleOutcome {
    let pixels = viewport.area() as f64 * f64::from(layers);
    let mpix_per_sec = if sample_secs > 0.0 {
        pixels / (f64::from(sample_secs) * 1_000_000.0)
    } else {
        f64::INFINITY
    };
    if mpix_per_sec > cfg.max_mpix_per_sec || sample_secs < cfg.min_sample_secs {
        return SampleOutcome::Discarded { mpix_per_sec };
    }
    SampleOutcome::Accepted { mpix_per_sec }
}

pub struct FillrateStage {
    core: StageCore,
    cfg: FillrateConfig,
    renderer: Box<dyn StageRenderer>,
    phase: FillPhase,
    /// Set by the first sample and reset after each one.
    phase_started: Option<TimeSample>,
}

impl FillrateStage {
    pub const NAME: &'static str = "fillrate";

    pub fn new(
        cfg: FillrateConfig,
        scoring: ScoringConfig,
        renderer: Box<dyn StageRenderer>,
    ) -> Self {
        let settings = StageSettings::new(Self::NAME, cfg.duration_secs, 0.1, 50.0).with_popup(
            PopupSettings {
                delay: 1.5,
                display: 2.0,
                ..PopupSettings::new(
                    "fill rate tests",
                    "unlighted / vertex / pixel lighted polys",
                )
            },
        );
        Self {
            core: StageCore::new(settings, scoring),
            cfg,
            renderer,
            phase: FillPhase::Unlighted,
            phase_started: None,
        }
    }

    pub fn current_phase(&self) -> FillPhase {
        self.phase
    }

    fn sample(&mut self, viewport: Viewport, now: TimeSample) {
        let started = Instant::now();
        self.renderer.fill_pass(self.phase, self.cfg.layers);
        let secs = started.elapsed().as_secs_f32();

        let outcome = assess_sample(viewport, self.cfg.layers, secs, &self.cfg);
        let data = self.core.data_mut();
        data.set_fill_rate(self.phase, outcome.rate() as f32);
        match outcome {
            SampleOutcome::Accepted { mpix_per_sec } => {
                tracing::debug!(phase = ?self.phase, secs, mpix_per_sec, "fill rate sampled");
            }
            SampleOutcome::Discarded { mpix_per_sec } => {
                data.missing_features = Some(FINISH_DIAGNOSTIC.to_string());
                tracing::info!(
                    phase = ?self.phase,
                    secs,
                    mpix_per_sec,
                    "fill rate sample failed sanity check, discarding"
                );
            }
        }

        if self.phase == FillPhase::MappedLit {
            let end = self.core.elapsed(now)
                + self.cfg.mapped_phase_secs
                + self.core.settings().fade_secs;
            self.core.update_duration(end, now);
        }
        self.phase_started = Some(now);
    }

    fn advance_phase(&mut self, now: TimeSample) {
        let Some(started) = self.phase_started else {
            return;
        };
        let next = match self.phase {
            FillPhase::Unlighted => self.phase.next(),
            FillPhase::VertexLit | FillPhase::PixelLit
                if now.since(started) >= self.cfg.phase_secs =>
            {
                self.phase.next()
            }
            _ => None,
        };
        if let Some(next) = next {
            tracing::debug!(from = ?self.phase, to = ?next, "fill rate phase change");
            self.phase = next;
        }
    }

    fn setup_inner(&mut self, viewport: Viewport, now: TimeSample) -> BenchResult<()> {
        let started = Instant::now();
        self.core.begin_setup(viewport, now);
        self.phase = FillPhase::Unlighted;
        self.phase_started = None;
        self.renderer.load(viewport)?;
        self.core.mark_loaded();
        self.core.finish_setup(started);
        Ok(())
    }
}

impl Stage for FillrateStage {
    fn name(&self) -> &str {
        self.core.name()
    }

    #[tracing::instrument(skip(self, now), fields(stage = Self::NAME))]
    fn setup(&mut self, viewport: Viewport, now: TimeSample) -> BenchResult<()> {
        if let Err(e) = self.setup_inner(viewport, now) {
            self.teardown();
            return Err(e);
        }
        Ok(())
    }

    fn render(&mut self, now: TimeSample) -> BenchResult<bool> {
        let elapsed = self.core.begin_frame(now)?;
        let viewport = self.core.viewport()?;

        let unmeasured = self.core.data().fill_rate(self.phase) < 0.0;
        let quiet = !self.core.fade_out_active(now) && self.core.popup_completed(now);
        if unmeasured && quiet {
            self.sample(viewport, now);
        } else {
            let projection = self
                .core
                .projection()
                .ok_or_else(|| BenchError::lifecycle("fillrate has no projection"))?;
            self.renderer.draw(&FrameInfo {
                frame: self.core.frames(),
                elapsed,
                viewport,
                projection,
                detail: FrameDetail::Fill { phase: self.phase },
            });
            self.advance_phase(now);
        }

        let weights = self.cfg.weights;
        Ok(self
            .core
            .finish_frame(now, self.renderer.as_mut(), None, |data, _| {
                let total: f64 = FillPhase::ALL
                    .iter()
                    .zip(weights)
                    .map(|(&phase, w)| w * f64::from(data.fill_rate(phase).max(0.0)))
                    .sum();
                data.fill_rate_score = total as i64;
                data.score = data.fill_rate_score;
            }))
    }

    fn teardown(&mut self) {
        self.phase_started = None;
        if self.core.release() {
            self.renderer.unload();
        }
    }

    fn viewport_resized(&mut self, viewport: Viewport) -> BenchResult<()> {
        self.core.resize(viewport);
        if self.core.phase() != StagePhase::Idle {
            self.renderer.resize(viewport)?;
        }
        Ok(())
    }

    fn stage_data(&self) -> Option<&StageData> {
        self.core.result()
    }

    fn phase(&self) -> StagePhase {
        self.core.phase()
    }

    fn update_duration_from_now(&mut self, remaining: f32, now: TimeSample) {
        self.core.update_duration_from_now(remaining, now);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/fillrate.rs"]
mod tests;
