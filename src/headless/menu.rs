use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::controller::menu::{MenuScene, MenuView, Notice};
use crate::controller::report::Scoreboard;
use crate::controller::state::{ControllerState, Widget};
use crate::foundation::core::Viewport;
use crate::foundation::error::{BenchError, BenchResult};

/// What the menu scene was last asked to show.
#[derive(Clone, Debug, Default)]
pub struct MenuLog {
    pub loads: u32,
    pub unloads: u32,
    pub resizes: u32,
    pub draws: u64,
    pub background_draws: u64,
    pub last_state: Option<ControllerState>,
    pub last_widgets: Vec<Widget>,
    pub last_notices: Vec<Notice>,
    pub last_scores: Option<Scoreboard>,
    pub last_fade: f32,
    pub info_shown: bool,
    pub submitting_shown: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MenuLogHandle(Arc<Mutex<MenuLog>>);

impl MenuLogHandle {
    fn lock(&self) -> MutexGuard<'_, MenuLog> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> MenuLog {
        self.lock().clone()
    }
}

/// Menu scene that draws nothing and records every view.
#[derive(Debug, Default)]
pub struct HeadlessMenu {
    loaded: bool,
    fail_load: bool,
    log: MenuLogHandle,
}

impl HeadlessMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `load` fails with a setup error.
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn log(&self) -> MenuLogHandle {
        self.log.clone()
    }
}

impl MenuScene for HeadlessMenu {
    fn load(&mut self, _viewport: Viewport) -> BenchResult<()> {
        if self.fail_load {
            return Err(BenchError::setup("menu background failed to load"));
        }
        self.loaded = true;
        self.log.lock().loads += 1;
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = false;
        self.log.lock().unloads += 1;
    }

    fn resize(&mut self, _viewport: Viewport) {
        self.log.lock().resizes += 1;
    }

    fn draw(&mut self, view: &MenuView<'_>) {
        let mut log = self.log.lock();
        log.draws += 1;
        if view.background && self.loaded {
            log.background_draws += 1;
        }
        log.last_state = Some(view.state);
        log.last_widgets = view.widgets.to_vec();
        log.last_notices = view.notices.to_vec();
        log.last_scores = view.scores;
        log.last_fade = view.fade;
        log.info_shown = view.info.is_some();
        log.submitting_shown = view.submitting;
    }
}
