use std::sync::mpsc::{Receiver, TryRecvError};

use crate::animation::scalar::ScalarAnimation;
use crate::config::BenchConfig;
use crate::controller::menu::{MenuScene, MenuView, Notice};
use crate::controller::platform::{
    DeviceInfo, Platform, SubmitOutcome, SubmitRequest, submit_channel,
};
use crate::controller::report::{ScoreReport, Scoreboard, SubmitResponse, sign};
use crate::controller::state::{Button, ControllerState, Widget, WidgetContext, visible_widgets};
use crate::foundation::clock::{Clock, TimeSample};
use crate::foundation::core::Viewport;
use crate::foundation::error::{BenchError, BenchResult};
use crate::stage::{
    ChessboardStage, FillrateStage, FractalStage, PhysicsStage, Stage, StageData, StagePhase,
    StageRenderer,
};

/// Pixels of touch drag per radian of menu object rotation.
const DRAG_PIXELS_PER_RADIAN: f32 = 300.0;

/// Hands out one renderer per stage when building the standard stage list.
pub trait RendererFactory {
    fn renderer(&mut self, stage: &str) -> Box<dyn StageRenderer>;
}

/// Drives the menus, the benchmark stages and the demo, one [`draw`](Controller::draw) per frame.
///
/// Everything happens on the caller's thread. Time is read only through the injected [`Clock`],
/// and score submission completes through a channel polled at the start of each frame.
pub struct Controller {
    cfg: BenchConfig,
    stages: Vec<Box<dyn Stage>>,
    /// Index of the next stage to set up; also the number of stages this run has reached.
    next_stage: usize,
    current: Option<usize>,
    demo: Box<dyn Stage>,
    demo_running: bool,
    menu: Box<dyn MenuScene>,
    menu_loaded: bool,
    platform: Box<dyn Platform>,
    clock: Box<dyn Clock>,

    viewport: Option<Viewport>,
    /// A resize the active stage refused while busy; retried every frame.
    pending_resize: Option<Viewport>,
    state: ControllerState,
    prev_state: ControllerState,

    full_test: bool,
    scores: Option<Scoreboard>,
    submitting: bool,
    submitted: bool,
    submit_failed: bool,
    submit_rx: Option<Receiver<SubmitOutcome>>,

    fade_in: ScalarAnimation,
    fade_out: ScalarAnimation,
    fade: f32,
    bg_fader: ScalarAnimation,
    bg_fader_alpha: f32,
    displace_anim: Option<ScalarAnimation>,
    displace: f32,
    info_visible: bool,
    exit_timer: Option<TimeSample>,
    benchmark_started: TimeSample,

    touch: Option<(f32, f32)>,
    rotation: [f32; 2],
    device: DeviceInfo,
    info_lines: Vec<String>,
}

impl Controller {
    pub fn new(
        config: BenchConfig,
        stages: Vec<Box<dyn Stage>>,
        demo: Box<dyn Stage>,
        menu: Box<dyn MenuScene>,
        platform: Box<dyn Platform>,
        clock: Box<dyn Clock>,
    ) -> BenchResult<Self> {
        config.validate()?;
        if stages.is_empty() {
            return Err(BenchError::config("controller needs at least one stage"));
        }
        let now = clock.now();
        let fade_secs = config.controller.fade_secs;
        let bg_fader = ScalarAnimation::new(
            0.0,
            config.controller.bg_fader_alpha,
            0.0,
            config.controller.bg_fader_secs,
            now,
        );
        Ok(Self {
            stages,
            next_stage: 0,
            current: None,
            demo,
            demo_running: false,
            menu,
            menu_loaded: false,
            platform,
            clock,
            viewport: None,
            pending_resize: None,
            state: ControllerState::Ready,
            prev_state: ControllerState::Ready,
            full_test: true,
            scores: None,
            submitting: false,
            submitted: false,
            submit_failed: false,
            submit_rx: None,
            fade_in: ScalarAnimation::new(1.0, 0.0, 0.0, fade_secs, now),
            fade_out: ScalarAnimation::new(0.0, 1.0, 0.0, fade_secs, now),
            fade: 0.0,
            bg_fader,
            bg_fader_alpha: 0.0,
            displace_anim: None,
            displace: 1.0,
            info_visible: false,
            exit_timer: None,
            benchmark_started: now,
            touch: None,
            rotation: [0.0; 2],
            device: DeviceInfo::default(),
            info_lines: Vec::new(),
            cfg: config,
        })
    }

    /// Controller over the fixed stage order fractal, fill rate, chessboard, physics, plus the
    /// chessboard demo.
    pub fn standard(
        config: BenchConfig,
        factory: &mut dyn RendererFactory,
        menu: Box<dyn MenuScene>,
        platform: Box<dyn Platform>,
        clock: Box<dyn Clock>,
    ) -> BenchResult<Self> {
        let scoring = config.scoring.clone();
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(FractalStage::new(
                config.fractal.clone(),
                scoring.clone(),
                factory.renderer(FractalStage::NAME),
            )),
            Box::new(FillrateStage::new(
                config.fillrate.clone(),
                scoring.clone(),
                factory.renderer(FillrateStage::NAME),
            )),
            Box::new(ChessboardStage::new(
                config.chessboard.clone(),
                scoring.clone(),
                factory.renderer(ChessboardStage::NAME),
            )),
            Box::new(PhysicsStage::new(
                config.physics.clone(),
                scoring.clone(),
                factory.renderer(PhysicsStage::NAME),
            )),
        ];
        let demo = Box::new(ChessboardStage::demo(
            config.demo.clone(),
            scoring,
            factory.renderer(ChessboardStage::DEMO_NAME),
        ));
        Self::new(config, stages, demo, menu, platform, clock)
    }

    /// Queries the platform, loads the menu and enters `Ready`.
    pub fn init(&mut self, viewport: Viewport) -> BenchResult<()> {
        let now = self.clock.now();
        self.device = self.platform.device_info();
        self.info_lines = self.device.overlay_lines();
        self.viewport = Some(viewport);
        self.state = ControllerState::Ready;
        self.prev_state = ControllerState::Ready;
        self.load_menu(now)?;
        self.fade_in.reset(1.0, 0.0, self.cfg.controller.fade_secs, now);
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            stages = self.stages.len(),
            "controller ready"
        );
        Ok(())
    }

    pub fn config(&self) -> &BenchConfig {
        &self.cfg
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn prev_state(&self) -> ControllerState {
        self.prev_state
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn pending_resize(&self) -> Option<Viewport> {
        self.pending_resize
    }

    pub fn scores(&self) -> Option<Scoreboard> {
        self.scores
    }

    pub fn is_full_test(&self) -> bool {
        self.full_test
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn score_was_submitted(&self) -> bool {
        self.submitted
    }

    pub fn submit_failed(&self) -> bool {
        self.submit_failed
    }

    pub fn info_visible(&self) -> bool {
        self.info_visible
    }

    pub fn fade(&self) -> f32 {
        self.fade
    }

    pub fn menu_rotation(&self) -> [f32; 2] {
        self.rotation
    }

    pub fn device_info(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn info_lines(&self) -> &[String] {
        &self.info_lines
    }

    pub fn demo_running(&self) -> bool {
        self.demo_running
    }

    pub fn demo(&self) -> &dyn Stage {
        self.demo.as_ref()
    }

    pub fn stages(&self) -> &[Box<dyn Stage>] {
        &self.stages
    }

    pub fn current_stage(&self) -> Option<&dyn Stage> {
        self.current.map(|i| self.stages[i].as_ref())
    }

    /// Results of the stages completed in the latest run, in run order.
    pub fn stage_results(&self) -> Vec<(&str, &StageData)> {
        self.stages[..self.next_stage]
            .iter()
            .filter_map(|s| s.stage_data().map(|d| (s.name(), d)))
            .collect()
    }

    /// Report of the latest finished run.
    pub fn report(&self) -> BenchResult<ScoreReport> {
        let scores = self
            .scores
            .ok_or_else(|| BenchError::report("no finished run to report"))?;
        let viewport = self.require_viewport()?;
        Ok(ScoreReport::build(
            &self.device,
            viewport,
            self.stage_results(),
            scores,
        ))
    }

    pub fn visible_widgets(&self) -> Vec<Widget> {
        visible_widgets(self.state, self.widget_context(self.clock.now()))
    }

    fn widget_context(&self, now: TimeSample) -> WidgetContext {
        let exit_secs = self.cfg.controller.exit_visible_secs;
        WidgetContext {
            prev_state: Some(self.prev_state),
            analyze_available: self.full_test && self.scores.is_some() && !self.submitted,
            exit_armed: self.exit_timer.is_some_and(|t| now.since(t) <= exit_secs),
        }
    }

    fn require_viewport(&self) -> BenchResult<Viewport> {
        self.viewport
            .ok_or_else(|| BenchError::lifecycle("controller used before init"))
    }

    fn change_state(&mut self, next: ControllerState) {
        tracing::debug!(from = ?self.state, to = ?next, "controller state change");
        self.state = next;
    }

    /// Advances one frame. Any error is fatal to the current run.
    pub fn draw(&mut self) -> BenchResult<()> {
        self.require_viewport()?;
        let now = self.clock.now();
        self.poll_submission();
        self.apply_pending_resize()?;

        match self.state {
            ControllerState::Running => self.handle_running(now),
            ControllerState::StartMenu => self.handle_start_menu(now),
            ControllerState::Aborting => self.handle_aborting(now),
            ControllerState::Ready | ControllerState::Finished => {
                self.fade_in.animate(now, &mut self.fade);
                self.draw_menu(now, self.state, None);
                Ok(())
            }
            ControllerState::Starting | ControllerState::StartingDemo => {
                self.handle_start_menu(now)?;
                if self.fade_out.animate(now, &mut self.fade) {
                    if self.state == ControllerState::StartingDemo {
                        self.change_state(ControllerState::RunningDemo);
                    } else {
                        self.unload_menu();
                        self.change_state(ControllerState::Running);
                    }
                }
                Ok(())
            }
            ControllerState::RunningDemo => self.handle_running_demo(now),
        }
    }

    fn handle_running(&mut self, now: TimeSample) -> BenchResult<()> {
        let Some(idx) = self.current else {
            return self.setup_next_stage(now);
        };

        if !self.stages[idx].render(now)? {
            tracing::info!(stage = self.stages[idx].name(), "stage completed");
            self.stages[idx].teardown();
            self.current = None;
            if !self.full_test {
                return self.benchmark_finished(now);
            }
        }

        if let Some(t) = self.exit_timer
            && now.since(t) > self.cfg.controller.exit_visible_secs
        {
            self.exit_timer = None;
        }
        let notices = if now.since(self.benchmark_started) <= self.cfg.controller.benchmark_info_secs
        {
            vec![Notice::RunInfo {
                full_test: self.full_test,
            }]
        } else {
            Vec::new()
        };
        self.present(now, false, &notices);
        Ok(())
    }

    #[tracing::instrument(skip(self, now), fields(index = self.next_stage))]
    fn setup_next_stage(&mut self, now: TimeSample) -> BenchResult<()> {
        if self.next_stage >= self.stages.len() {
            tracing::debug!("last stage finished");
            return self.benchmark_finished(now);
        }
        let idx = self.next_stage;
        self.next_stage += 1;
        let viewport = self.require_viewport()?;
        if let Err(e) = self.stages[idx].setup(viewport, now) {
            tracing::warn!(stage = self.stages[idx].name(), error = %e, "stage setup failed");
            self.current = None;
            return Err(e);
        }
        self.current = Some(idx);
        self.change_state(ControllerState::Running);
        Ok(())
    }

    fn benchmark_finished(&mut self, now: TimeSample) -> BenchResult<()> {
        self.submitted = false;
        self.submit_failed = false;
        self.change_state(ControllerState::Finished);
        self.load_menu(now)?;
        self.fade_in.reset(1.0, 0.0, self.cfg.controller.fade_secs, now);
        self.update_score();
        Ok(())
    }

    fn update_score(&mut self) {
        let board = Scoreboard::aggregate(
            self.stage_results().into_iter().map(|(_, d)| d),
            &self.cfg.scoring,
        );
        tracing::info!(
            overall = board.overall,
            cpu = board.cpu,
            fill_rate = board.fill_rate,
            load_time = board.load_time,
            full_test = self.full_test,
            "final scores"
        );
        self.scores = Some(board);
    }

    fn handle_start_menu(&mut self, now: TimeSample) -> BenchResult<()> {
        if let Some(anim) = self.displace_anim
            && anim.animate(now, &mut self.displace)
        {
            self.displace_anim = None;
            if self.displace >= 1.0 {
                self.change_state(self.prev_state);
                return Ok(());
            }
        }

        if !self.prev_state.is_menu() {
            return Err(BenchError::lifecycle(format!(
                "start menu over {:?}",
                self.prev_state
            )));
        }
        let select = (self.state == ControllerState::StartMenu && self.displace <= 0.0)
            .then_some(Notice::SelectBenchmark);
        self.draw_menu(now, self.prev_state, select);
        Ok(())
    }

    fn handle_running_demo(&mut self, now: TimeSample) -> BenchResult<()> {
        if !self.demo_running {
            let viewport = self.require_viewport()?;
            self.demo.setup(viewport, now)?;
            self.demo_running = true;
            tracing::info!(stage = self.demo.name(), "demo started");
            return Ok(());
        }

        if !self.demo.render(now)? {
            tracing::info!(back_to = ?self.prev_state, "demo finished");
            self.demo.teardown();
            self.demo_running = false;
            self.change_state(self.prev_state);
            self.fade_in.reset(1.0, 0.0, self.cfg.controller.fade_secs, now);
        }
        self.present(now, false, &[]);
        Ok(())
    }

    fn handle_aborting(&mut self, now: TimeSample) -> BenchResult<()> {
        self.fade_out.animate(now, &mut self.fade);
        if let Some(idx) = self.current
            && self.stages[idx].phase() == StagePhase::Running
        {
            self.stages[idx].render(now)?;
        }
        self.present(now, false, &[]);

        if self.fade_out.has_completed(now) {
            if let Some(idx) = self.current.take() {
                self.stages[idx].teardown();
            }
            tracing::info!("abort done");
            self.change_state(ControllerState::Ready);
            self.load_menu(now)?;
            self.fade_in.reset(1.0, 0.0, self.cfg.controller.fade_secs, now);
        }
        Ok(())
    }

    fn draw_menu(&mut self, now: TimeSample, base: ControllerState, extra: Option<Notice>) {
        self.bg_fader.animate(now, &mut self.bg_fader_alpha);
        if self.info_visible && !self.submitting {
            self.animate_info(now);
        }
        let mut notices = Vec::new();
        if base == ControllerState::Finished {
            if self.submit_failed {
                notices.push(Notice::SubmitFailed);
            } else if !self.submitted && self.full_test {
                notices.push(Notice::PressAnalyze);
            }
        }
        notices.extend(extra);
        self.present(now, true, &notices);
    }

    fn animate_info(&mut self, now: TimeSample) {
        if let Some(anim) = self.displace_anim
            && anim.animate(now, &mut self.displace)
        {
            self.displace_anim = None;
            if self.displace >= 1.0 {
                self.info_visible = false;
            }
        }
    }

    fn present(&mut self, now: TimeSample, background: bool, notices: &[Notice]) {
        let widgets = visible_widgets(self.state, self.widget_context(now));
        let show_info = background && self.info_visible && !self.submitting;
        let view = MenuView {
            state: self.state,
            background,
            fade: self.fade,
            bg_fader_alpha: self.bg_fader_alpha,
            displace: self.displace,
            widgets: &widgets,
            scores: self.scores,
            full_test: self.full_test,
            notices,
            info: show_info.then_some(self.info_lines.as_slice()),
            rotation: self.rotation,
            submitting: self.submitting,
        };
        self.menu.draw(&view);
    }

    fn load_menu(&mut self, now: TimeSample) -> BenchResult<()> {
        if !self.menu_loaded {
            let viewport = self.require_viewport()?;
            self.menu.load(viewport)?;
            self.menu_loaded = true;
        }
        if self.scores.is_none() {
            self.bg_fader.reset_time(now);
        }
        Ok(())
    }

    fn unload_menu(&mut self) {
        if self.menu_loaded {
            self.menu.unload();
            self.menu_loaded = false;
        }
    }

    fn start_benchmark(&mut self, full_test: bool, now: TimeSample) {
        tracing::info!(full_test, "starting benchmark");
        self.full_test = full_test;
        self.current = None;
        self.next_stage = 0;
        self.fade_out.reset(0.0, 1.0, self.cfg.controller.fade_secs, now);
        self.benchmark_started = now;
        self.exit_timer = None;
        self.change_state(ControllerState::Starting);
    }

    fn start_demo(&mut self, now: TimeSample) {
        self.fade_out.reset(0.0, 1.0, self.cfg.controller.fade_secs, now);
        // From the start menu, keep returning to the menu state underneath it.
        if self.state.is_menu() {
            self.prev_state = self.state;
        }
        self.change_state(ControllerState::StartingDemo);
    }

    fn toggle_start_menu(&mut self, now: TimeSample) {
        let secs = self.cfg.controller.displace_secs;
        if self.state == ControllerState::StartMenu {
            self.displace_anim = Some(ScalarAnimation::new(0.0, 1.0, 0.0, secs, now));
        } else if self.state.is_menu() {
            self.displace = 1.0;
            self.prev_state = self.state;
            self.change_state(ControllerState::StartMenu);
            self.displace_anim = Some(ScalarAnimation::new(1.0, 0.0, 0.0, secs, now));
        }
    }

    fn toggle_info(&mut self, now: TimeSample) {
        let secs = self.cfg.controller.displace_secs;
        if self.info_visible {
            // Still sliding in.
            if self.displace_anim.is_some() {
                return;
            }
            self.displace_anim = Some(ScalarAnimation::new(0.0, 1.0, 0.0, secs, now));
        } else {
            self.info_visible = true;
            self.displace_anim = Some(ScalarAnimation::new(1.0, 0.0, 0.0, secs, now));
        }
    }

    fn exit_pressed(&mut self, now: TimeSample) {
        if self.state == ControllerState::RunningDemo {
            self.demo
                .update_duration_from_now(self.cfg.controller.fade_secs, now);
            return;
        }
        if let Some(idx) = self.current {
            self.stages[idx].abort();
        }
        tracing::info!("benchmark aborted by user");
        self.change_state(ControllerState::Aborting);
        self.fade_out.reset(0.0, 1.0, self.cfg.controller.fade_secs, now);
    }

    /// A press on `button`. Ignored while a slide animation runs, while fading into a run, the
    /// demo or back to the menu, or when the button is hidden; dismisses the device-info overlay
    /// instead when it is up.
    pub fn button_pressed(&mut self, button: Button) -> BenchResult<()> {
        let now = self.clock.now();
        if matches!(
            self.state,
            ControllerState::Starting | ControllerState::StartingDemo | ControllerState::Aborting
        ) {
            tracing::debug!(?button, state = ?self.state, "button ignored during transition");
            return Ok(());
        }
        if self.displace_anim.is_some() {
            tracing::debug!(?button, "button ignored during slide");
            return Ok(());
        }
        if self.info_visible {
            self.toggle_info(now);
            return Ok(());
        }
        let widgets = visible_widgets(self.state, self.widget_context(now));
        if !widgets.contains(&Widget::Button(button)) {
            tracing::debug!(?button, state = ?self.state, "hidden button ignored");
            return Ok(());
        }

        match button {
            Button::Info => {
                if self.state.is_menu() {
                    self.toggle_info(now);
                }
            }
            Button::Start => self.toggle_start_menu(now),
            Button::Demo => self.start_demo(now),
            Button::Exit => self.exit_pressed(now),
            Button::CpuTest => self.start_benchmark(false, now),
            Button::FullTest => self.start_benchmark(true, now),
            Button::Analyze => self.submit_score()?,
        }
        Ok(())
    }

    /// A touch on a widget that is not a button (the start menu dimmer).
    pub fn widget_touched(&mut self) {
        if self.displace_anim.is_some() {
            return;
        }
        if self.state == ControllerState::StartMenu {
            let now = self.clock.now();
            self.toggle_start_menu(now);
        }
    }

    /// Returns `false` when the touch was discarded.
    pub fn touch_started(&mut self, x: f32, y: f32) -> bool {
        if self.displace_anim.is_some() {
            tracing::debug!("touch discarded during slide");
            return false;
        }
        if self.info_visible {
            let now = self.clock.now();
            self.toggle_info(now);
            return true;
        }
        self.touch = Some((x, y));
        true
    }

    /// Drags rotate the menu object and steer the demo camera.
    pub fn touch_moved(&mut self, x: f32, y: f32) -> bool {
        let Some((px, py)) = self.touch else {
            return false;
        };
        if !matches!(
            self.state,
            ControllerState::Ready | ControllerState::Finished | ControllerState::RunningDemo
        ) {
            return false;
        }
        let (dx, dy) = (x - px, y - py);
        self.rotation[0] += dy / DRAG_PIXELS_PER_RADIAN;
        self.rotation[1] -= dx / DRAG_PIXELS_PER_RADIAN;
        self.touch = Some((x, y));
        if self.demo_running {
            self.demo.pointer_moved(dx, dy);
        }
        true
    }

    pub fn touch_ended(&mut self) {
        self.touch = None;
    }

    /// Three or more simultaneous touches: shows the exit button for a while during a run,
    /// restarting its countdown if it is already up.
    pub fn multi_touch(&mut self) {
        if self.state == ControllerState::Running {
            self.exit_timer = Some(self.clock.now());
        }
    }

    pub fn viewport_resized(&mut self, viewport: Viewport) -> BenchResult<()> {
        if self.viewport == Some(viewport) && self.pending_resize.is_none() {
            tracing::debug!("viewport unchanged");
            return Ok(());
        }
        tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");
        self.viewport = Some(viewport);
        self.menu.resize(viewport);
        self.pending_resize = Some(viewport);
        self.apply_pending_resize()
    }

    fn apply_pending_resize(&mut self) -> BenchResult<()> {
        let Some(viewport) = self.pending_resize else {
            return Ok(());
        };
        let stage = if self.demo_running {
            Some(&mut self.demo)
        } else {
            self.current.map(|i| &mut self.stages[i])
        };
        let Some(stage) = stage else {
            self.pending_resize = None;
            return Ok(());
        };
        match stage.viewport_resized(viewport) {
            Ok(()) => {
                self.pending_resize = None;
                Ok(())
            }
            Err(e) if e.is_busy() => {
                tracing::debug!(error = %e, "resize deferred");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn submit_score(&mut self) -> BenchResult<()> {
        if self.submitting {
            return Ok(());
        }
        let report = self.report()?;
        let body = report.to_json()?;
        let sub = &self.cfg.submission;
        let request = SubmitRequest {
            url: sub.submit_url.clone(),
            signature: sign(&body, &sub.signature_salt),
            signature_header: sub.signature_header.clone(),
            body,
        };
        self.submitting = true;
        self.submit_failed = false;
        let (reply, rx) = submit_channel();
        self.submit_rx = Some(rx);
        tracing::info!(submit_id = %report.submit_id, url = %request.url, "submitting score");
        self.platform.submit_score(request, reply);
        Ok(())
    }

    fn poll_submission(&mut self) {
        let Some(rx) = self.submit_rx.as_ref() else {
            return;
        };
        let outcome = match rx.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => SubmitOutcome {
                success: false,
                body: String::new(),
            },
        };
        self.submit_rx = None;
        self.score_submitted(outcome.success, &outcome.body);
    }

    /// Completion of a score submission.
    pub fn score_submitted(&mut self, success: bool, body: &str) {
        self.submitting = false;
        self.submit_failed = !success;
        if !success {
            tracing::warn!("score submission failed");
            return;
        }
        match SubmitResponse::parse(body) {
            Ok(response) => {
                self.submitted = true;
                let url = response.view_url(&self.cfg.submission.view_url);
                tracing::info!(%url, "score submitted");
                self.platform.open_url(&url);
            }
            Err(e) => {
                tracing::warn!(error = %e, "unusable server response");
                self.platform.show_message("Failed to parse server response!");
            }
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Some(idx) = self.current.take() {
            self.stages[idx].teardown();
        }
        if self.demo_running {
            self.demo.teardown();
        }
        self.unload_menu();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/controller/machine.rs"]
mod tests;
