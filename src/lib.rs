//! Stagemark is a device benchmark core.
//!
//! A run is a fixed sequence of timed stages driven one frame at a time by a [`Controller`]:
//!
//! 1. **Fractal**: a zooming Mandelbrot computed by a worker pool (CPU score).
//! 2. **Fill rate**: timed full-screen passes under four lighting models.
//! 3. **Chessboard**: a basic GPU scene.
//! 4. **Physics**: a game-like scene with timed camera and vehicle events.
//!
//! Each stage turns its measured frame rate into a resolution-normalized score; the controller
//! sums them with a load-time score and can submit a signed report.
//!
//! Drawing, windowing and networking are collaborator traits ([`stage::StageRenderer`],
//! [`controller::MenuScene`], [`controller::Platform`]). The [`headless`] module implements them
//! without a GPU so the whole flow runs on a plain CPU.
#![forbid(unsafe_code)]

pub mod animation;
/// Scanline worker pool and the Mandelbrot kernel.
pub mod compute;
pub mod config;
pub mod controller;
pub mod foundation;
pub mod headless;
pub mod stage;

pub use animation::popup::InfoPopupAnimation;
pub use animation::scalar::ScalarAnimation;
pub use compute::mandelbrot::{FractalJob, MandelbrotKernel};
pub use compute::pool::{FrameReport, RowCtx, ScanlineKernel, WorkerPool, partition_rows};
pub use config::BenchConfig;
pub use controller::{Button, Controller, ControllerState, RendererFactory, Scoreboard};
pub use foundation::clock::{Clock, ManualClock, SystemClock, TimeSample};
pub use foundation::core::{Projection, RasterImage, Viewport};
pub use foundation::error::{BenchError, BenchResult};
pub use stage::{Stage, StageData, StagePhase};
