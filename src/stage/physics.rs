//! Game-environment stage. The simulation itself lives in the renderer; this stage owns the
//! timeline of scripted scene changes and the score compensation.

use std::time::Instant;

use crate::config::{PhysicsConfig, ScoringConfig};
use crate::foundation::clock::TimeSample;
use crate::foundation::core::Viewport;
use crate::foundation::error::{BenchError, BenchResult};
use crate::stage::base::{PopupSettings, StageCore, StageSettings};
use crate::stage::renderer::{FrameDetail, FrameInfo, SceneEvent, StageRenderer};
use crate::stage::{Stage, StageData, StagePhase};

/// A scene change fired once when the stage clock passes `at` seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedEvent {
    pub at: f32,
    pub event: SceneEvent,
}

pub fn default_schedule() -> Vec<TimedEvent> {
    vec![
        TimedEvent {
            at: 50.0,
            event: SceneEvent::Frustum {
                near: 1.6,
                far: 18.0,
            },
        },
        TimedEvent {
            at: 52.0,
            event: SceneEvent::Frustum {
                near: 1.6,
                far: 300.0,
            },
        },
        TimedEvent {
            at: 55.0,
            event: SceneEvent::VehicleStart,
        },
        TimedEvent {
            at: 66.0,
            event: SceneEvent::VehicleAccelerate,
        },
        TimedEvent {
            at: 66.0,
            event: SceneEvent::Frustum {
                near: 2.5,
                far: 250.0,
            },
        },
    ]
}

pub struct PhysicsStage {
    core: StageCore,
    cfg: PhysicsConfig,
    renderer: Box<dyn StageRenderer>,
    schedule: Vec<TimedEvent>,
    next_event: usize,
}

impl PhysicsStage {
    pub const NAME: &'static str = "physics";

    pub fn new(cfg: PhysicsConfig, scoring: ScoringConfig, renderer: Box<dyn StageRenderer>) -> Self {
        Self::with_schedule(cfg, scoring, renderer, default_schedule())
    }

    /// `schedule` must be sorted by time.
    pub fn with_schedule(
        cfg: PhysicsConfig,
        scoring: ScoringConfig,
        renderer: Box<dyn StageRenderer>,
        schedule: Vec<TimedEvent>,
    ) -> Self {
        let settings = StageSettings::new(Self::NAME, cfg.duration_secs, 1.0, 300.0).with_popup(
            PopupSettings::new("game environment test", "physics / shadow mapping"),
        );
        Self {
            core: StageCore::new(settings, scoring),
            cfg,
            renderer,
            schedule,
            next_event: 0,
        }
    }

    fn fire_due_events(&mut self, elapsed: f32) {
        while let Some(ev) = self.schedule.get(self.next_event).copied() {
            if elapsed < ev.at {
                break;
            }
            if let SceneEvent::Frustum { near, far } = ev.event {
                self.core.set_clip(near, far);
            }
            self.renderer.scene_event(ev.event);
            tracing::debug!(at = ev.at, event = ?ev.event, "physics scene event");
            self.next_event += 1;
        }
    }

    fn setup_inner(&mut self, viewport: Viewport, now: TimeSample) -> BenchResult<()> {
        let started = Instant::now();
        self.core.begin_setup(viewport, now);
        self.next_event = 0;
        self.renderer.load(viewport)?;
        self.core.mark_loaded();
        self.core.finish_setup(started);
        Ok(())
    }
}

impl Stage for PhysicsStage {
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
        self.fire_due_events(elapsed);

        let viewport = self.core.viewport()?;
        let projection = self
            .core
            .projection()
            .ok_or_else(|| BenchError::lifecycle("physics has no projection"))?;
        self.renderer.draw(&FrameInfo {
            frame: self.core.frames(),
            elapsed,
            viewport,
            projection,
            detail: FrameDetail::Plain,
        });

        let multiplier = self.cfg.score_multiplier;
        let features = self.renderer.features();
        Ok(self
            .core
            .finish_frame(now, self.renderer.as_mut(), None, |data, _| {
                data.score = (data.score as f64 * multiplier) as i64;
                if !features.depth_texture {
                    data.score /= 2;
                    data.missing_features = Some("depth_texture".to_string());
                }
            }))
    }

    fn teardown(&mut self) {
        if self.core.release() {
            self.renderer.unload();
        }
    }

    fn viewport_resized(&mut self, viewport: Viewport) -> BenchResult<()> {
        let clip = self.core.projection().map(|p| (p.near, p.far));
        self.core.resize(viewport);
        // Keep any frustum a scene event has already set.
        if let Some((near, far)) = clip {
            self.core.set_clip(near, far);
        }
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
#[path = "../../tests/unit/stage/physics.rs"]
mod tests;
