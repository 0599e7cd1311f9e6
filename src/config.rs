//! Run configuration. Every field has a default, so an empty JSON object is a valid config.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{BenchError, BenchResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Menu fade in/out length, seconds.
    pub fade_secs: f32,
    /// Start-menu background dimmer fade length, seconds.
    pub bg_fader_secs: f32,
    /// Dimmer alpha once the start menu is fully shown.
    pub bg_fader_alpha: f32,
    /// Start-menu slide in/out length, seconds.
    pub displace_secs: f32,
    /// How long the per-stage benchmark info text stays up, seconds.
    pub benchmark_info_secs: f32,
    /// How long the exit button stays up after a multi-touch, seconds.
    pub exit_visible_secs: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            fade_secs: 0.4,
            bg_fader_secs: 0.4,
            bg_fader_alpha: 0.5,
            displace_secs: 0.4,
            benchmark_info_secs: 10.0,
            exit_visible_secs: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Viewport area (px²) that adds +100% to a stage's raw score.
    pub resolution_baseline: f64,
    pub fps_multiplier: f64,
    /// Load-time score is `load_time_numerator / total_load_secs`.
    pub load_time_numerator: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            resolution_baseline: 15_728_640.0,
            fps_multiplier: 50.0,
            load_time_numerator: 3000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FractalConfig {
    pub duration_secs: f32,
    /// Worker threads; `0` sizes the pool from the available parallelism.
    pub workers: usize,
    pub initial_iterations: u32,
    pub iteration_increment: u32,
    /// Per-frame zoom factor, in `(0, 1)`.
    pub zoom_factor: f64,
    pub target_re: f64,
    pub target_im: f64,
    pub initial_re_width: f64,
}

impl Default for FractalConfig {
    fn default() -> Self {
        Self {
            duration_secs: 20.0,
            workers: 4,
            initial_iterations: 50,
            iteration_increment: 1,
            zoom_factor: 0.95,
            target_re: 0.256_698_309_34,
            target_im: 0.617_228_901_49,
            initial_re_width: 0.5,
        }
    }
}

impl FractalConfig {
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillrateConfig {
    /// Initial duration; the stage extends or shortens it once the last phase is measured.
    pub duration_secs: f32,
    /// Full-screen layers drawn per timed sample.
    pub layers: u32,
    pub phase_secs: f32,
    pub mapped_phase_secs: f32,
    /// Samples reporting more than this many Mpix/s are discarded.
    pub max_mpix_per_sec: f64,
    /// Samples shorter than this are discarded.
    pub min_sample_secs: f32,
    /// Weights for unlighted, vertex lit, pixel lit and mapped rates.
    pub weights: [f64; 4],
}

impl Default for FillrateConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60.0,
            layers: 200,
            phase_secs: 5.0,
            mapped_phase_secs: 8.0,
            max_mpix_per_sec: 3000.0,
            min_sample_secs: 0.11,
            weights: [0.75, 0.8, 1.0, 1.2],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChessboardConfig {
    pub duration_secs: f32,
}

impl Default for ChessboardConfig {
    fn default() -> Self {
        Self {
            duration_secs: 56.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub duration_secs: f32,
    /// Compensates for the scene's inherently lower frame rate.
    pub score_multiplier: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            duration_secs: 76.0,
            score_multiplier: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub fade_secs: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self { fade_secs: 0.4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub submit_url: String,
    /// Prefix the score uuid is appended to when opening the results page.
    pub view_url: String,
    pub signature_header: String,
    pub signature_salt: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            submit_url: "http://localhost:8000/upload".to_string(),
            view_url: "http://localhost:8000/view_score?c=m&uuid=".to_string(),
            signature_header: "X-Stagemark-Signature".to_string(),
            signature_salt: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub controller: ControllerConfig,
    pub scoring: ScoringConfig,
    pub fractal: FractalConfig,
    pub fillrate: FillrateConfig,
    pub chessboard: ChessboardConfig,
    pub physics: PhysicsConfig,
    pub demo: DemoConfig,
    pub submission: SubmissionConfig,
}

impl BenchConfig {
    pub fn from_json_str(s: &str) -> BenchResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| BenchError::config(format!("invalid config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> BenchResult<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .map_err(|e| BenchError::config(format!("reading {}: {e}", path.display())))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> BenchResult<()> {
        let f = &self.fractal;
        if !(f.zoom_factor > 0.0 && f.zoom_factor < 1.0) {
            return Err(BenchError::config(format!(
                "fractal.zoom_factor must be in (0, 1), got {}",
                f.zoom_factor
            )));
        }
        if f.initial_iterations == 0 {
            return Err(BenchError::config("fractal.initial_iterations must be > 0"));
        }
        if f.initial_re_width <= 0.0 {
            return Err(BenchError::config("fractal.initial_re_width must be > 0"));
        }
        if self.fillrate.layers == 0 {
            return Err(BenchError::config("fillrate.layers must be > 0"));
        }
        if self.fillrate.min_sample_secs < 0.0 || self.fillrate.max_mpix_per_sec <= 0.0 {
            return Err(BenchError::config(
                "fillrate sanity thresholds must be positive",
            ));
        }
        if self.scoring.resolution_baseline <= 0.0 {
            return Err(BenchError::config("scoring.resolution_baseline must be > 0"));
        }
        let c = &self.controller;
        if [c.fade_secs, c.bg_fader_secs, c.displace_secs]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(BenchError::config(
                "controller transition lengths must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
