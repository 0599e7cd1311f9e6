use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::foundation::core::{RasterImage, Viewport};
use crate::foundation::error::{BenchError, BenchResult};
use crate::stage::renderer::{
    FillPhase, FrameInfo, GpuFeatures, Overlay, SceneEvent, StageRenderer,
};

/// Everything a [`HeadlessRenderer`] was asked to do.
#[derive(Clone, Debug, Default)]
pub struct RenderLog {
    pub loads: u32,
    pub unloads: u32,
    pub resizes: u32,
    pub draws: u64,
    pub last_frame: Option<FrameInfo>,
    pub overlays: u64,
    pub last_overlay: Option<Overlay>,
    /// Overlays that carried a visible info popup.
    pub popup_overlays: u64,
    pub uploads: u64,
    pub fill_passes: Vec<(FillPhase, u32)>,
    pub scene_events: Vec<SceneEvent>,
}

/// Shared view of a renderer's log that outlives moving the renderer into a stage.
#[derive(Clone, Debug, Default)]
pub struct RenderLogHandle(Arc<Mutex<RenderLog>>);

impl RenderLogHandle {
    fn lock(&self) -> MutexGuard<'_, RenderLog> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> RenderLog {
        self.lock().clone()
    }
}

/// Software stand-in for a GPU renderer.
///
/// Keeps a framebuffer the size of the viewport; fill passes really touch every pixel once per
/// layer so fill-rate samples measure memory bandwidth.
#[derive(Debug)]
pub struct HeadlessRenderer {
    framebuffer: Option<RasterImage>,
    features: GpuFeatures,
    fail_load: bool,
    fill_delay: Option<Duration>,
    log: RenderLogHandle,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self {
            framebuffer: None,
            features: GpuFeatures::default(),
            fail_load: false,
            fill_delay: None,
            log: RenderLogHandle::default(),
        }
    }

    pub fn with_features(mut self, features: GpuFeatures) -> Self {
        self.features = features;
        self
    }

    /// Every `load` fails with a setup error.
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    /// Extra time each fill pass takes, on top of the real pixel work.
    pub fn with_fill_delay(mut self, delay: Duration) -> Self {
        self.fill_delay = Some(delay);
        self
    }

    pub fn log(&self) -> RenderLogHandle {
        self.log.clone()
    }

    pub fn framebuffer(&self) -> Option<&RasterImage> {
        self.framebuffer.as_ref()
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl StageRenderer for HeadlessRenderer {
    fn load(&mut self, viewport: Viewport) -> BenchResult<()> {
        if self.fail_load {
            return Err(BenchError::setup("headless renderer configured to fail"));
        }
        self.framebuffer = Some(RasterImage::new(viewport.width, viewport.height));
        self.log.lock().loads += 1;
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> BenchResult<()> {
        if self.framebuffer.is_some() {
            self.framebuffer = Some(RasterImage::new(viewport.width, viewport.height));
        }
        self.log.lock().resizes += 1;
        Ok(())
    }

    fn draw(&mut self, frame: &FrameInfo) {
        let mut log = self.log.lock();
        log.draws += 1;
        log.last_frame = Some(*frame);
    }

    fn draw_overlay(&mut self, overlay: &Overlay) {
        let mut log = self.log.lock();
        log.overlays += 1;
        if overlay.popup.is_some() {
            log.popup_overlays += 1;
        }
        log.last_overlay = Some(*overlay);
    }

    fn unload(&mut self) {
        self.framebuffer = None;
        self.log.lock().unloads += 1;
    }

    fn features(&self) -> GpuFeatures {
        self.features
    }

    fn upload_raster(&mut self, image: &RasterImage) {
        if let Some(fb) = self.framebuffer.as_mut()
            && fb.width == image.width
            && fb.height == image.height
        {
            fb.pixels.copy_from_slice(&image.pixels);
        }
        self.log.lock().uploads += 1;
    }

    fn fill_pass(&mut self, phase: FillPhase, layers: u32) {
        if let Some(fb) = self.framebuffer.as_mut() {
            let tint = 0x0001_0101u32.wrapping_mul(phase.index() as u32 + 1);
            for _ in 0..layers {
                for px in fb.pixels.iter_mut() {
                    *px = px.wrapping_add(tint) | 0xFF00_0000;
                }
            }
        }
        if let Some(delay) = self.fill_delay {
            std::thread::sleep(delay);
        }
        self.log.lock().fill_passes.push((phase, layers));
    }

    fn scene_event(&mut self, event: SceneEvent) {
        self.log.lock().scene_events.push(event);
    }
}
