//! Benchmark stages and the life-cycle contract the controller drives them through.
//!
//! A stage is constructed once and may be set up and torn down many times. Between a successful
//! [`Stage::setup`] and [`Stage::teardown`] it receives [`Stage::render`] once per frame until it
//! returns `Ok(false)`, which happens exactly once for a stage with a positive duration.

use serde::{Deserialize, Serialize};

use crate::foundation::clock::TimeSample;
use crate::foundation::core::Viewport;
use crate::foundation::error::BenchResult;

pub mod base;
pub mod chessboard;
pub mod fillrate;
pub mod fractal;
pub mod physics;
pub mod renderer;

pub use self::base::{PopupSettings, ScoreBasis, StageCore, StageSettings, normalized_score};
pub use self::chessboard::ChessboardStage;
pub use self::fillrate::{FillrateStage, SampleOutcome, assess_sample};
pub use self::fractal::FractalStage;
pub use self::physics::PhysicsStage;
pub use self::renderer::{
    FillPhase, FrameDetail, FrameInfo, GpuFeatures, Overlay, PopupOverlay, SceneEvent,
    StageRenderer,
};

/// Result record of one completed stage run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageData {
    pub fps: f32,
    pub score: i64,
    pub cpu_score: i64,
    pub fill_rate_score: i64,
    pub num_images: u64,
    /// Seconds spent in setup.
    pub load_time: f32,
    /// Fill rates in Mpix/s; `-1` when not measured.
    pub unlighted_fill_rate: f32,
    pub vertex_lit_fill_rate: f32,
    pub pixel_lit_fill_rate: f32,
    pub mapped_lit_fill_rate: f32,
    pub missing_features: Option<String>,
}

impl Default for StageData {
    fn default() -> Self {
        Self {
            fps: 0.0,
            score: 0,
            cpu_score: 0,
            fill_rate_score: 0,
            num_images: 0,
            load_time: 0.0,
            unlighted_fill_rate: -1.0,
            vertex_lit_fill_rate: -1.0,
            pixel_lit_fill_rate: -1.0,
            mapped_lit_fill_rate: -1.0,
            missing_features: None,
        }
    }
}

impl StageData {
    pub fn fill_rate(&self, phase: FillPhase) -> f32 {
        match phase {
            FillPhase::Unlighted => self.unlighted_fill_rate,
            FillPhase::VertexLit => self.vertex_lit_fill_rate,
            FillPhase::PixelLit => self.pixel_lit_fill_rate,
            FillPhase::MappedLit => self.mapped_lit_fill_rate,
        }
    }

    pub fn set_fill_rate(&mut self, phase: FillPhase, rate: f32) {
        let slot = match phase {
            FillPhase::Unlighted => &mut self.unlighted_fill_rate,
            FillPhase::VertexLit => &mut self.vertex_lit_fill_rate,
            FillPhase::PixelLit => &mut self.pixel_lit_fill_rate,
            FillPhase::MappedLit => &mut self.mapped_lit_fill_rate,
        };
        *slot = rate;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StagePhase {
    /// Constructed, torn down, or setup failed.
    Idle,
    Running,
    /// `render` has returned `false`; waiting for teardown.
    Completed,
}

pub trait Stage: Send {
    fn name(&self) -> &str;

    /// Allocates everything the stage needs. On error nothing stays allocated.
    fn setup(&mut self, viewport: Viewport, now: TimeSample) -> BenchResult<()>;

    /// Advances one frame; `Ok(false)` once the stage has finished.
    fn render(&mut self, now: TimeSample) -> BenchResult<bool>;

    /// Releases everything. Idempotent.
    fn teardown(&mut self);

    /// Requests early termination of any background work.
    fn abort(&mut self) {}

    /// Fails with a busy error while background work prevents resizing.
    fn viewport_resized(&mut self, viewport: Viewport) -> BenchResult<()>;

    /// Set once the stage has completed and been scored.
    fn stage_data(&self) -> Option<&StageData>;

    fn phase(&self) -> StagePhase;

    fn is_interactive(&self) -> bool {
        false
    }

    /// Ends the stage `remaining` seconds from `now`, fading out on the way.
    fn update_duration_from_now(&mut self, remaining: f32, now: TimeSample);

    /// Pointer drag in pixels; only interactive stages react.
    fn pointer_moved(&mut self, _dx: f32, _dy: f32) {}
}
