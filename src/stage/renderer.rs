//! Drawing seam between a stage and whatever actually puts pixels on screen.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Projection, RasterImage, Viewport};
use crate::foundation::error::BenchResult;

/// Lighting variant drawn by the fill-rate stage, in measurement order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPhase {
    Unlighted,
    VertexLit,
    PixelLit,
    MappedLit,
}

impl FillPhase {
    pub const ALL: [FillPhase; 4] = [
        FillPhase::Unlighted,
        FillPhase::VertexLit,
        FillPhase::PixelLit,
        FillPhase::MappedLit,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<FillPhase> {
        match self {
            FillPhase::Unlighted => Some(FillPhase::VertexLit),
            FillPhase::VertexLit => Some(FillPhase::PixelLit),
            FillPhase::PixelLit => Some(FillPhase::MappedLit),
            FillPhase::MappedLit => None,
        }
    }
}

/// One-shot scene changes a stage pushes to its renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SceneEvent {
    Frustum { near: f32, far: f32 },
    VehicleStart,
    VehicleAccelerate,
}

/// Stage-specific drawing parameters for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameDetail {
    Plain,
    /// Uploaded raster drawn scaled around the screen centre.
    Zoom { scale: f32 },
    Fill { phase: FillPhase },
    /// Camera orbiting the scene centre; `angle` in radians.
    Orbit { angle: f32, distance: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInfo {
    pub frame: u64,
    /// Seconds since the stage's first frame.
    pub elapsed: f32,
    pub viewport: Viewport,
    pub projection: Projection,
    pub detail: FrameDetail,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PopupOverlay {
    /// Top edge in pixels from the top of the screen.
    pub top: f32,
    pub height: f32,
    pub header: &'static str,
    pub message: &'static str,
}

/// Drawn after the stage content every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Overlay {
    /// Full-screen black with this alpha; `None` when fully transparent.
    pub fade: Option<f32>,
    pub popup: Option<PopupOverlay>,
    /// Frame-rate meter for interactive stages.
    pub fps: Option<f32>,
}

/// Optional GPU capabilities that affect scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpuFeatures {
    pub packed_depth_stencil: bool,
    pub depth_texture: bool,
}

impl Default for GpuFeatures {
    fn default() -> Self {
        Self {
            packed_depth_stencil: true,
            depth_texture: true,
        }
    }
}

pub trait StageRenderer: Send {
    fn load(&mut self, viewport: Viewport) -> BenchResult<()>;
    fn resize(&mut self, viewport: Viewport) -> BenchResult<()>;
    fn draw(&mut self, frame: &FrameInfo);
    fn draw_overlay(&mut self, overlay: &Overlay);
    fn unload(&mut self);

    fn features(&self) -> GpuFeatures {
        GpuFeatures::default()
    }

    fn upload_raster(&mut self, _image: &RasterImage) {}

    /// Draws `layers` full-screen quads and returns once they are actually on the surface.
    fn fill_pass(&mut self, _phase: FillPhase, _layers: u32) {}

    fn scene_event(&mut self, _event: SceneEvent) {}
}
