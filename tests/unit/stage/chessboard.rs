use super::*;
use crate::foundation::clock::{Clock, ManualClock};
use crate::headless::renderer::HeadlessRenderer;
use crate::stage::base::normalized_score;
use crate::stage::renderer::GpuFeatures;
use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn run(stage: &mut ChessboardStage, clock: &ManualClock, step: f32) -> usize {
    let mut frames = 0;
    loop {
        frames += 1;
        if !stage.render(clock.now()).unwrap() {
            return frames;
        }
        clock.advance(step);
    }
}

fn short() -> ChessboardConfig {
    ChessboardConfig { duration_secs: 4.0 }
}

#[test]
fn scored_with_base_formula() {
    let clock = ManualClock::new();
    let vp = Viewport::new(640, 480).unwrap();
    let mut stage = ChessboardStage::new(short(), ScoringConfig::default(), Box::new(HeadlessRenderer::new()));
    stage.setup(vp, clock.now()).unwrap();
    assert_eq!(run(&mut stage, &clock, 0.5), 9);

    let data = stage.stage_data().unwrap();
    assert_eq!(data.fps, 2.25);
    assert_eq!(data.score, normalized_score(2.25, vp, &ScoringConfig::default()));
    assert_eq!(data.missing_features, None);
}

#[test]
fn missing_packed_depth_stencil_halves_the_score() {
    let clock = ManualClock::new();
    let vp = Viewport::new(640, 480).unwrap();
    let renderer = HeadlessRenderer::new().with_features(GpuFeatures {
        packed_depth_stencil: false,
        depth_texture: true,
    });
    let mut stage = ChessboardStage::new(short(), ScoringConfig::default(), Box::new(renderer));
    stage.setup(vp, clock.now()).unwrap();
    run(&mut stage, &clock, 0.5);

    let data = stage.stage_data().unwrap();
    assert_eq!(data.score, normalized_score(2.25, vp, &ScoringConfig::default()) / 2);
    assert_eq!(data.missing_features.as_deref(), Some("packed_depth_stencil"));
}

#[test]
fn demo_runs_until_told_to_stop() {
    let clock = ManualClock::new();
    let r = HeadlessRenderer::new();
    let log = r.log();
    let mut demo = ChessboardStage::demo(DemoConfig::default(), ScoringConfig::default(), Box::new(r));
    assert!(demo.is_interactive());
    demo.setup(Viewport::new(320, 240).unwrap(), clock.now()).unwrap();

    for _ in 0..200 {
        assert!(demo.render(clock.now()).unwrap());
        clock.advance(0.5);
    }
    assert_eq!(log.snapshot().popup_overlays, 0);
    assert!(log.snapshot().last_overlay.unwrap().fps.is_some());

    demo.update_duration_from_now(0.5, clock.now());
    let frames = run(&mut demo, &clock, 0.25);
    assert_eq!(frames, 3);
    assert!(demo.stage_data().is_none());
    demo.teardown();
}

#[test]
fn demo_camera_follows_drags_within_limits() {
    let clock = ManualClock::new();
    let mut demo = ChessboardStage::demo(
        DemoConfig::default(),
        ScoringConfig::default(),
        Box::new(HeadlessRenderer::new()),
    );
    demo.setup(Viewport::new(320, 240).unwrap(), clock.now()).unwrap();
    let start = demo.camera().unwrap();
    assert_eq!(start.distance, 9.0);

    demo.pointer_moved(340.0, 100.0);
    let cam = demo.camera().unwrap();
    assert!((cam.angle - (start.angle + 1.0)).abs() < 1e-5);
    assert_eq!(cam.distance, 8.0);

    demo.pointer_moved(0.0, 10_000.0);
    assert_eq!(demo.camera().unwrap().distance, 2.0);
    demo.pointer_moved(0.0, -10_000.0);
    assert_eq!(demo.camera().unwrap().distance, 12.0);

    demo.render(clock.now()).unwrap();
    demo.update_duration_from_now(0.4, clock.now());
    demo.pointer_moved(340.0, 0.0);
    assert_eq!(demo.camera().unwrap().distance, 12.0);
    assert!((demo.camera().unwrap().angle - (start.angle + 1.0)).abs() < 1e-5);
}

#[test]
fn regular_stage_ignores_pointer_input() {
    let clock = ManualClock::new();
    let mut stage = ChessboardStage::new(short(), ScoringConfig::default(), Box::new(HeadlessRenderer::new()));
    stage.setup(Viewport::new(64, 64).unwrap(), clock.now()).unwrap();
    stage.pointer_moved(100.0, 100.0);
    assert!(stage.camera().is_none());
    assert!(!stage.is_interactive());
}

#[test]
fn setup_span_names_the_demo_variant() {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NEW)
        .finish();

    let clock = ManualClock::new();
    let vp = Viewport::new(64, 48).unwrap();
    let mut demo = ChessboardStage::demo(
        DemoConfig::default(),
        ScoringConfig::default(),
        Box::new(HeadlessRenderer::new()),
    );
    tracing::subscriber::with_default(subscriber, || {
        demo.setup(vp, clock.now()).unwrap();
    });
    demo.teardown();

    let logged = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
    assert!(logged.contains(ChessboardStage::DEMO_NAME), "{logged}");
}
