use super::*;
use crate::foundation::clock::{Clock, ManualClock};
use crate::headless::renderer::HeadlessRenderer;

fn config(duration_secs: f32) -> FractalConfig {
    FractalConfig {
        duration_secs,
        workers: 4,
        ..FractalConfig::default()
    }
}

fn stage_with(renderer: HeadlessRenderer, duration_secs: f32) -> FractalStage {
    FractalStage::new(
        config(duration_secs),
        ScoringConfig::default(),
        Box::new(renderer),
    )
}

fn viewport() -> Viewport {
    Viewport::new(400, 250).unwrap()
}

#[test]
fn setup_presents_the_first_frame_and_starts_the_next() {
    let clock = ManualClock::new();
    let r = HeadlessRenderer::new();
    let log = r.log();
    let mut stage = stage_with(r, 8.0);
    stage.setup(viewport(), clock.now()).unwrap();

    assert_eq!(stage.phase(), StagePhase::Running);
    assert!(stage.workers_alive());
    assert_eq!(stage.total_iterations(), 50);
    assert_eq!(stage.frames_computed(), 1);
    assert_eq!(log.snapshot().uploads, 1);
    stage.teardown();
}

#[test]
fn full_run_scores_iterations_by_area() {
    let clock = ManualClock::new();
    let r = HeadlessRenderer::new();
    let log = r.log();
    let mut stage = stage_with(r, 8.0);
    stage.setup(viewport(), clock.now()).unwrap();

    let mut stops = 0;
    let mut frames = 0;
    loop {
        frames += 1;
        if !stage.render(clock.now()).unwrap() {
            stops += 1;
            break;
        }
        if clock.elapsed() > 5.25 {
            assert!(!stage.workers_alive(), "fade-out stops the workers");
        }
        clock.advance(0.5);
    }
    assert_eq!(stops, 1);
    assert_eq!(frames, 17);

    let data = stage.stage_data().unwrap().clone();
    let expected = ((stage.total_iterations() as f64 / 10.0) * 1.0 / 2.0) as i64;
    assert_eq!(data.cpu_score, expected);
    assert_eq!(data.score, data.cpu_score);
    assert_eq!(data.num_images, stage.frames_computed());
    assert!(stage.frames_computed() > 1);
    assert!(log.snapshot().uploads as u64 >= stage.frames_computed());

    stage.teardown();
    assert_eq!(log.snapshot().unloads, 1);
}

#[test]
fn iteration_budget_grows_per_frame() {
    let clock = ManualClock::new();
    let mut stage = stage_with(HeadlessRenderer::new(), 30.0);
    stage.setup(viewport(), clock.now()).unwrap();
    for _ in 0..4 {
        clock.advance(0.5);
        stage.render(clock.now()).unwrap();
    }
    let n = stage.frames_computed();
    // 50 + 51 + ... for every presented frame.
    let expected: u64 = (0..n).map(|k| 50 + k).sum();
    assert_eq!(stage.total_iterations(), expected);
    stage.teardown();
}

#[test]
fn resize_is_refused_while_workers_run() {
    let clock = ManualClock::new();
    let mut stage = stage_with(HeadlessRenderer::new(), 8.0);
    stage.setup(viewport(), clock.now()).unwrap();

    let err = stage
        .viewport_resized(Viewport::new(200, 100).unwrap())
        .unwrap_err();
    assert!(err.is_busy());

    stage.abort();
    assert!(!stage.workers_alive());
    stage
        .viewport_resized(Viewport::new(200, 100).unwrap())
        .unwrap();
    stage.teardown();
}

#[test]
fn teardown_is_idempotent_and_stops_workers() {
    let clock = ManualClock::new();
    let r = HeadlessRenderer::new();
    let log = r.log();
    let mut stage = stage_with(r, 8.0);
    stage.setup(viewport(), clock.now()).unwrap();
    stage.teardown();
    stage.teardown();
    assert!(!stage.workers_alive());
    assert_eq!(stage.phase(), StagePhase::Idle);
    assert_eq!(log.snapshot().unloads, 1);
    assert!(stage.render(clock.now()).is_err());
}

#[test]
fn failed_setup_leaves_nothing_behind() {
    let clock = ManualClock::new();
    let mut stage = stage_with(HeadlessRenderer::new().failing_load(), 8.0);
    let err = stage.setup(viewport(), clock.now()).unwrap_err();
    assert!(err.to_string().contains("stage setup error:"));
    assert!(!stage.workers_alive());
    assert_eq!(stage.phase(), StagePhase::Idle);
}

#[test]
fn stage_can_run_again_after_teardown() {
    let clock = ManualClock::new();
    let mut stage = stage_with(HeadlessRenderer::new(), 8.0);
    stage.setup(viewport(), clock.now()).unwrap();
    clock.advance(0.5);
    stage.render(clock.now()).unwrap();
    stage.teardown();

    stage.setup(viewport(), clock.now()).unwrap();
    assert_eq!(stage.total_iterations(), 50);
    assert!(stage.stage_data().is_none());
    stage.teardown();
}
