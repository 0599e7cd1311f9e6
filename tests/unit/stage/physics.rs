use super::*;
use crate::foundation::clock::{Clock, ManualClock};
use crate::headless::renderer::HeadlessRenderer;
use crate::stage::base::normalized_score;
use crate::stage::renderer::GpuFeatures;

fn short() -> PhysicsConfig {
    PhysicsConfig {
        duration_secs: 4.0,
        ..PhysicsConfig::default()
    }
}

fn run(stage: &mut PhysicsStage, clock: &ManualClock) {
    while stage.render(clock.now()).unwrap() {
        clock.advance(0.5);
    }
}

#[test]
fn default_schedule_is_sorted() {
    let schedule = default_schedule();
    assert!(schedule.windows(2).all(|w| w[0].at <= w[1].at));
    assert_eq!(schedule.len(), 5);
}

#[test]
fn events_fire_once_in_order() {
    let clock = ManualClock::new();
    let r = HeadlessRenderer::new();
    let log = r.log();
    let schedule = vec![
        TimedEvent {
            at: 1.0,
            event: SceneEvent::Frustum { near: 1.6, far: 18.0 },
        },
        TimedEvent {
            at: 2.0,
            event: SceneEvent::VehicleStart,
        },
        TimedEvent {
            at: 2.0,
            event: SceneEvent::VehicleAccelerate,
        },
    ];
    let mut stage =
        PhysicsStage::with_schedule(short(), ScoringConfig::default(), Box::new(r), schedule.clone());
    stage.setup(Viewport::new(64, 64).unwrap(), clock.now()).unwrap();

    stage.render(clock.now()).unwrap();
    assert!(log.snapshot().scene_events.is_empty());

    clock.advance(1.0);
    stage.render(clock.now()).unwrap();
    let frame = log.snapshot().last_frame.unwrap();
    assert_eq!(frame.projection.near, 1.6);
    assert_eq!(frame.projection.far, 18.0);

    run(&mut stage, &clock);
    let events: Vec<SceneEvent> = schedule.iter().map(|e| e.event).collect();
    assert_eq!(log.snapshot().scene_events, events);
}

#[test]
fn score_is_boosted_and_halved_without_depth_textures() {
    let clock = ManualClock::new();
    let vp = Viewport::new(64, 64).unwrap();
    let base = normalized_score(2.25, vp, &ScoringConfig::default());

    let mut full = PhysicsStage::new(short(), ScoringConfig::default(), Box::new(HeadlessRenderer::new()));
    full.setup(vp, clock.now()).unwrap();
    run(&mut full, &clock);
    assert_eq!(full.stage_data().unwrap().score, (base as f64 * 2.5) as i64);

    let renderer = HeadlessRenderer::new().with_features(GpuFeatures {
        packed_depth_stencil: true,
        depth_texture: false,
    });
    let mut lacking = PhysicsStage::new(short(), ScoringConfig::default(), Box::new(renderer));
    lacking.setup(vp, clock.now()).unwrap();
    run(&mut lacking, &clock);
    let data = lacking.stage_data().unwrap();
    assert_eq!(data.score, (base as f64 * 2.5) as i64 / 2);
    assert_eq!(data.missing_features.as_deref(), Some("depth_texture"));
}

#[test]
fn rerun_replays_the_schedule() {
    let clock = ManualClock::new();
    let r = HeadlessRenderer::new();
    let log = r.log();
    let schedule = vec![TimedEvent {
        at: 0.0,
        event: SceneEvent::VehicleStart,
    }];
    let mut stage = PhysicsStage::with_schedule(short(), ScoringConfig::default(), Box::new(r), schedule);
    let vp = Viewport::new(32, 32).unwrap();
    for _ in 0..2 {
        stage.setup(vp, clock.now()).unwrap();
        stage.render(clock.now()).unwrap();
        stage.teardown();
    }
    assert_eq!(log.snapshot().scene_events.len(), 2);
    assert_eq!(log.snapshot().unloads, 2);
}
