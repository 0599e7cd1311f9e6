//! Basic GPU stage, and the same scene as the free-orbit interactive demo.

use std::time::Instant;

use crate::config::{ChessboardConfig, DemoConfig, ScoringConfig};
use crate::foundation::clock::TimeSample;
use crate::foundation::core::Viewport;
use crate::foundation::error::{BenchError, BenchResult};
use crate::stage::base::{PopupSettings, StageCore, StageSettings};
use crate::stage::renderer::{FrameDetail, FrameInfo, StageRenderer};
use crate::stage::{Stage, StageData, StagePhase};

const MIN_CAMERA_DISTANCE: f32 = 2.0;
const MAX_CAMERA_DISTANCE: f32 = 12.0;
/// Horizontal drag pixels per radian of orbit.
const ANGLE_DRAG_DIVISOR: f32 = 340.0;
/// Vertical drag pixels per unit of camera distance.
const DISTANCE_DRAG_DIVISOR: f32 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub angle: f32,
    pub distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            angle: 70f32.to_radians(),
            distance: 9.0,
        }
    }
}

impl OrbitCamera {
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.angle += dx / ANGLE_DRAG_DIVISOR;
        self.distance = (self.distance - dy / DISTANCE_DRAG_DIVISOR)
            .clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE);
    }
}

/// Frames per second over one-second windows.
#[derive(Clone, Copy, Debug, Default)]
struct FpsMeter {
    window_start: Option<TimeSample>,
    frames: u32,
    fps: Option<f32>,
}

impl FpsMeter {
    fn tick(&mut self, now: TimeSample) -> Option<f32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let secs = now.since(start);
        if secs >= 1.0 {
            self.fps = Some(self.frames as f32 / secs);
            self.frames = 0;
            self.window_start = Some(now);
        }
        self.fps
    }
}

pub struct ChessboardStage {
    core: StageCore,
    renderer: Box<dyn StageRenderer>,
    /// Present only for the interactive demo.
    camera: Option<OrbitCamera>,
    fps_meter: FpsMeter,
}

impl ChessboardStage {
    pub const NAME: &'static str = "chessboard";
    pub const DEMO_NAME: &'static str = "chessboard-demo";

    pub fn new(
        cfg: ChessboardConfig,
        scoring: ScoringConfig,
        renderer: Box<dyn StageRenderer>,
    ) -> Self {
        let settings = StageSettings::new(Self::NAME, cfg.duration_secs, 0.5, 35.0).with_popup(
            PopupSettings::new("basic gpu test", "multitexturing / postprocessing"),
        );
        Self {
            core: StageCore::new(settings, scoring),
            renderer,
            camera: None,
            fps_meter: FpsMeter::default(),
        }
    }

    /// Unscored, user-driven variant that runs until told to stop.
    pub fn demo(cfg: DemoConfig, scoring: ScoringConfig, renderer: Box<dyn StageRenderer>) -> Self {
        let settings = StageSettings {
            fade_secs: cfg.fade_secs,
            interactive: true,
            ..StageSettings::new(Self::DEMO_NAME, -1.0, 0.5, 35.0)
        };
        Self {
            core: StageCore::new(settings, scoring),
            renderer,
            camera: Some(OrbitCamera::default()),
            fps_meter: FpsMeter::default(),
        }
    }

    pub fn camera(&self) -> Option<OrbitCamera> {
        self.camera
    }

    fn setup_inner(&mut self, viewport: Viewport, now: TimeSample) -> BenchResult<()> {
        let started = Instant::now();
        self.core.begin_setup(viewport, now);
        if self.camera.is_some() {
            self.camera = Some(OrbitCamera::default());
        }
        self.fps_meter = FpsMeter::default();
        self.renderer.load(viewport)?;
        self.core.mark_loaded();
        self.core.finish_setup(started);
        Ok(())
    }
}

impl Stage for ChessboardStage {
    fn name(&self) -> &str {
        self.core.name()
    }

    #[tracing::instrument(skip(self, now), fields(stage = self.core.name()))]
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
        let projection = self
            .core
            .projection()
            .ok_or_else(|| BenchError::lifecycle("chessboard has no projection"))?;
        let detail = match self.camera {
            Some(cam) => FrameDetail::Orbit {
                angle: cam.angle,
                distance: cam.distance,
            },
            None => FrameDetail::Plain,
        };
        self.renderer.draw(&FrameInfo {
            frame: self.core.frames(),
            elapsed,
            viewport,
            projection,
            detail,
        });

        let fps = if self.camera.is_some() {
            self.fps_meter.tick(now)
        } else {
            None
        };
        let features = self.renderer.features();
        Ok(self
            .core
            .finish_frame(now, self.renderer.as_mut(), fps, |data, _| {
                if !features.packed_depth_stencil {
                    data.score /= 2;
                    data.missing_features = Some("packed_depth_stencil".to_string());
                }
            }))
    }

    fn teardown(&mut self) {
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

    fn is_interactive(&self) -> bool {
        self.core.is_interactive()
    }

    fn update_duration_from_now(&mut self, remaining: f32, now: TimeSample) {
        self.core.update_duration_from_now(remaining, now);
    }

    fn pointer_moved(&mut self, dx: f32, dy: f32) {
        // Ignore input once the demo has been told to end.
        if self.core.has_fade_out() {
            return;
        }
        if let Some(cam) = self.camera.as_mut() {
            cam.drag(dx, dy);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stage/chessboard.rs"]
mod tests;
