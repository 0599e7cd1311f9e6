use super::*;
use crate::foundation::clock::{Clock, ManualClock};

#[test]
fn delay_suppresses_writes() {
    let clock = ManualClock::new();
    let anim = ScalarAnimation::new(1.0, 0.0, 2.0, 1.0, clock.now());
    let mut v = 42.0;
    clock.advance(1.0);
    assert!(!anim.animate(clock.now(), &mut v));
    assert_eq!(v, 42.0);
    assert!(!anim.is_active(clock.now()));
}

#[test]
fn interpolates_linearly_after_delay() {
    let clock = ManualClock::new();
    let anim = ScalarAnimation::new(0.0, 10.0, 1.0, 2.0, clock.now());
    let mut v = 0.0;
    clock.advance(2.0);
    assert!(!anim.animate(clock.now(), &mut v));
    assert!((v - 5.0).abs() < 1e-3);
    assert!(anim.is_active(clock.now()));
}

#[test]
fn completion_is_idempotent_and_pinned_to_end() {
    let clock = ManualClock::new();
    let anim = ScalarAnimation::new(0.0, 1.0, 0.0, 0.5, clock.now());
    let mut v = 0.0;
    clock.advance(0.6);
    assert!(anim.animate(clock.now(), &mut v));
    assert_eq!(v, 1.0);
    for _ in 0..5 {
        clock.advance(3.0);
        v = -7.0;
        assert!(anim.animate(clock.now(), &mut v));
        assert_eq!(v, 1.0);
    }
    assert!(anim.has_completed(clock.now()));
    assert!(!anim.is_active(clock.now()));
}

#[test]
fn zero_duration_completes_when_delay_runs_out() {
    let clock = ManualClock::new();
    let anim = ScalarAnimation::new(0.0, 1.0, 0.25, 0.0, clock.now());
    let mut v = 0.0;
    assert!(!anim.has_completed(clock.now()));
    clock.advance(0.25);
    assert!(anim.animate(clock.now(), &mut v));
    assert_eq!(v, 1.0);
}

#[test]
fn reset_restarts_from_new_values() {
    let clock = ManualClock::new();
    let mut anim = ScalarAnimation::new(0.0, 1.0, 0.0, 1.0, clock.now());
    clock.advance(2.0);
    assert!(anim.has_completed(clock.now()));
    anim.reset(1.0, 3.0, 2.0, clock.now());
    let mut v = 0.0;
    clock.advance(1.0);
    assert!(!anim.animate(clock.now(), &mut v));
    assert!((v - 2.0).abs() < 1e-3);
}

#[test]
fn update_timings_moves_the_window() {
    let clock = ManualClock::new();
    let mut anim = ScalarAnimation::new(0.0, 1.0, 5.0, 1.0, clock.now());
    anim.update_timings(1.0, 1.0);
    clock.advance(1.5);
    assert!(anim.is_active(clock.now()));
    assert_eq!(anim.value_at(clock.now()), Some(0.5));
}
