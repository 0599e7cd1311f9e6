//! The menu scene seam: everything the controller shows outside of a stage.

use crate::controller::report::Scoreboard;
use crate::controller::state::{ControllerState, Widget};
use crate::foundation::core::Viewport;
use crate::foundation::error::BenchResult;

/// Short texts the menu may show, keyed by meaning rather than wording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Shown at the top of the start menu once it has slid in.
    SelectBenchmark,
    /// Shown for the first seconds of a run.
    RunInfo { full_test: bool },
    /// Shown in `Finished` while a full-test score can still be submitted.
    PressAnalyze,
    /// The last submission failed.
    SubmitFailed,
}

/// One frame of controller UI.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuView<'a> {
    pub state: ControllerState,
    /// Whether the menu background (image, fader and wireframe object) is drawn.
    pub background: bool,
    /// Full-screen black fader alpha, `0` when not fading.
    pub fade: f32,
    pub bg_fader_alpha: f32,
    /// Slide offset of the start menu or device-info overlay: `0` fully shown, `1` off screen.
    pub displace: f32,
    pub widgets: &'a [Widget],
    /// Scores of the last run, once one has finished.
    pub scores: Option<Scoreboard>,
    pub full_test: bool,
    pub notices: &'a [Notice],
    /// Device-info overlay lines while the overlay is up.
    pub info: Option<&'a [String]>,
    /// Extra rotation of the menu object from touch drags, radians about x and z.
    pub rotation: [f32; 2],
    /// A submission is in flight; the menu dims everything.
    pub submitting: bool,
}

pub trait MenuScene: Send {
    /// Loads the menu background resources.
    fn load(&mut self, viewport: Viewport) -> BenchResult<()>;

    fn unload(&mut self);

    fn resize(&mut self, viewport: Viewport);

    /// Called every frame in every state; draws the background only when `view.background`.
    fn draw(&mut self, view: &MenuView<'_>);
}
