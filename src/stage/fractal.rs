//! CPU stress stage: a zooming Mandelbrot computed by the worker pool.
//!
//! Frames are pipelined. While frame `n` is shown and scaled up by the zoom animation, frame
//! `n + 1` is computed in the background. The zoom lasts as long as the previous computation did,
//! so by the time it completes the next frame is normally ready and the join does not block.

use std::time::Instant;

use crate::animation::scalar::ScalarAnimation;
use crate::compute::mandelbrot::{FractalJob, MandelbrotKernel};
use crate::compute::pool::{FrameReport, WorkerPool};
use crate::config::{FractalConfig, ScoringConfig};
use crate::foundation::clock::TimeSample;
use crate::foundation::core::{RasterImage, Viewport};
use crate::foundation::error::{BenchError, BenchResult};
use crate::stage::base::{PopupSettings, StageCore, StageSettings};
use crate::stage::renderer::{FrameDetail, FrameInfo, StageRenderer};
use crate::stage::{Stage, StageData, StagePhase};

/// Pixels per unit of the fractal score's area correction.
const AREA_UNIT: u64 = 100_000;

pub struct FractalStage {
    core: StageCore,
    cfg: FractalConfig,
    renderer: Box<dyn StageRenderer>,
    pool: Option<WorkerPool<MandelbrotKernel>>,
    image: RasterImage,
    scale: f64,
    zoom: Option<ScalarAnimation>,
    bitmap_scale: f32,
    iterations: u32,
    total_iterations: u64,
    frames_computed: u64,
}

impl FractalStage {
    pub const NAME: &'static str = "fractal";

    pub fn new(
        cfg: FractalConfig,
        scoring: ScoringConfig,
        renderer: Box<dyn StageRenderer>,
    ) -> Self {
        let settings = StageSettings::new(Self::NAME, cfg.duration_secs, 0.1, 10.0)
            .with_popup(PopupSettings::new("cpu/fpu burn test", "parallel mandelbrot"));
        Self {
            core: StageCore::new(settings, scoring),
            iterations: cfg.initial_iterations,
            cfg,
            renderer,
            pool: None,
            image: RasterImage::new(0, 0),
            scale: 1.0,
            zoom: None,
            bitmap_scale: 1.0,
            total_iterations: 0,
            frames_computed: 0,
        }
    }

    pub fn total_iterations(&self) -> u64 {
        self.total_iterations
    }

    pub fn frames_computed(&self) -> u64 {
        self.frames_computed
    }

    /// Whether worker threads are still accepting frames.
    pub fn workers_alive(&self) -> bool {
        self.pool.as_ref().is_some_and(WorkerPool::is_alive)
    }

    /// Window for the next frame; every call zooms in by the configured factor.
    fn next_job(&mut self) -> FractalJob {
        let job = FractalJob::centered(
            self.cfg.target_re,
            self.cfg.target_im,
            self.cfg.initial_re_width * self.scale,
            self.image.width,
            self.image.height,
            self.iterations,
        );
        self.scale *= self.cfg.zoom_factor;
        job
    }

    fn pool(&self) -> BenchResult<&WorkerPool<MandelbrotKernel>> {
        self.pool
            .as_ref()
            .ok_or_else(|| BenchError::lifecycle("fractal worker pool not running"))
    }

    /// Accounts for a joined frame, uploads it and starts the next one.
    fn present_and_dispatch(&mut self, report: FrameReport, now: TimeSample) -> BenchResult<()> {
        self.total_iterations += u64::from(self.iterations);
        self.iterations += self.cfg.iteration_increment;
        self.frames_computed = report.frame;

        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| BenchError::lifecycle("fractal worker pool not running"))?;
        pool.copy_frame_into(&mut self.image)?;
        self.renderer.upload_raster(&self.image);

        self.bitmap_scale = 1.0;
        let zoom_to = (1.0 / self.cfg.zoom_factor) as f32;
        match self.zoom.as_mut() {
            Some(zoom) => zoom.reset(1.0, zoom_to, report.compute_secs, now),
            None => {
                self.zoom = Some(ScalarAnimation::new(
                    1.0,
                    zoom_to,
                    0.0,
                    report.compute_secs,
                    now,
                ))
            }
        }

        let job = self.next_job();
        self.pool()?.dispatch(job)?;
        tracing::trace!(
            frame = report.frame,
            compute_secs = report.compute_secs,
            iterations = self.iterations,
            "fractal frame presented"
        );
        Ok(())
    }

    fn setup_inner(&mut self, viewport: Viewport, now: TimeSample) -> BenchResult<()> {
        let started = Instant::now();
        self.core.begin_setup(viewport, now);
        self.renderer.load(viewport)?;
        self.core.mark_loaded();

        self.scale = 1.0;
        self.iterations = self.cfg.initial_iterations;
        self.total_iterations = 0;
        self.frames_computed = 0;
        self.bitmap_scale = 1.0;
        self.zoom = None;
        self.image = RasterImage::new(viewport.width, viewport.height);

        let workers = self.cfg.worker_count();
        self.pool = Some(WorkerPool::spawn(
            MandelbrotKernel::new(self.cfg.initial_iterations),
            viewport.width,
            viewport.height,
            workers,
        )?);

        // The first frame is computed synchronously so there is something to show.
        let job = self.next_job();
        self.pool()?.dispatch(job)?;
        let report = self
            .pool()?
            .join()
            .ok_or_else(|| BenchError::setup("fractal workers stopped during setup"))?;
        self.present_and_dispatch(report, now)?;

        self.core.finish_setup(started);
        tracing::debug!(workers, "fractal stage running");
        Ok(())
    }

    fn stop_workers(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            pool.shutdown();
        }
    }
}

impl Stage for FractalStage {
    fn name(&self) -> &str {
        self.core.name()
    }

    #[tracing::instrument(skip(self, now), fields(stage = Self::NAME))]
    fn setup(&mut self, viewport: Viewport, now: TimeSample) -> BenchResult<()> {
        if let Err(e) = self.setup_inner(viewport, now) {
            tracing::warn!(error = %e, "fractal setup failed");
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
            .ok_or_else(|| BenchError::lifecycle("fractal has no projection"))?;
        self.renderer.draw(&FrameInfo {
            frame: self.core.frames(),
            elapsed,
            viewport,
            projection,
            detail: FrameDetail::Zoom {
                scale: self.bitmap_scale,
            },
        });

        let zoom_done = self
            .zoom
            .is_some_and(|zoom| zoom.animate(now, &mut self.bitmap_scale));
        if zoom_done
            && self.workers_alive()
            && let Some(report) = self.pool()?.join()
        {
            self.present_and_dispatch(report, now)?;
        }

        // Once fading out, stop computing but keep zooming the last image.
        if self.core.fade_out_active(now)
            && let Some(pool) = self.pool.as_ref()
        {
            pool.request_shutdown();
        }

        let fill_units = viewport.area() / AREA_UNIT;
        let total_iterations = self.total_iterations;
        let frames_computed = self.frames_computed;
        Ok(self
            .core
            .finish_frame(now, self.renderer.as_mut(), None, |data, _| {
                let score = (total_iterations as f64 / 10.0) * fill_units as f64;
                data.cpu_score = (score / 2.0) as i64;
                data.score = data.cpu_score;
                data.num_images = frames_computed;
            }))
    }

    fn teardown(&mut self) {
        self.stop_workers();
        self.zoom = None;
        if self.core.release() {
            self.renderer.unload();
            tracing::debug!("fractal stage torn down");
        }
    }

    fn abort(&mut self) {
        self.stop_workers();
    }

    fn viewport_resized(&mut self, viewport: Viewport) -> BenchResult<()> {
        if self.workers_alive() {
            return Err(BenchError::busy(
                "fractal workers are computing; resize once they have stopped",
            ));
        }
        self.core.resize(viewport);
        self.image = RasterImage::new(viewport.width, viewport.height);
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
#[path = "../../tests/unit/stage/fractal.rs"]
mod tests;
