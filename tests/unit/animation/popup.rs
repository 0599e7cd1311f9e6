use super::*;
use crate::foundation::clock::{Clock, ManualClock};

#[test]
fn height_is_quarter_screen_clamped() {
    assert_eq!(popup_height(400), 150.0);
    assert_eq!(popup_height(1000), 250.0);
    assert_eq!(popup_height(4000), 450.0);
}

#[test]
fn slides_in_holds_and_slides_out() {
    let clock = ManualClock::new();
    let mut popup = InfoPopupAnimation::for_viewport(1.0, 2.0, 1000, clock.now());
    let mut top = 1000.0;

    clock.advance(0.5);
    assert!(!popup.animate(clock.now(), &mut top));
    assert_eq!(top, 1000.0);
    assert!(!popup.is_visible(clock.now()));

    clock.advance(0.75);
    popup.animate(clock.now(), &mut top);
    assert!(top < 1000.0 && top > 750.0);
    assert!(popup.is_visible(clock.now()));

    clock.advance(0.5);
    popup.animate(clock.now(), &mut top);
    assert_eq!(top, 750.0);

    clock.advance(1.0);
    assert!(!popup.animate(clock.now(), &mut top));
    assert_eq!(top, 750.0);
    assert!(!popup.has_completed(clock.now()));

    clock.advance(1.5);
    assert!(popup.animate(clock.now(), &mut top));
    assert_eq!(top, 1000.0);
    assert!(popup.has_completed(clock.now()));
    assert!(!popup.is_visible(clock.now()));
}

#[test]
fn reset_time_restarts_the_choreography() {
    let clock = ManualClock::new();
    let mut popup = InfoPopupAnimation::for_viewport(0.0, 0.0, 800, clock.now());
    let mut top = 0.0;
    clock.advance(1.0);
    popup.animate(clock.now(), &mut top);
    popup.animate(clock.now(), &mut top);
    assert!(popup.has_completed(clock.now()));

    popup.reset_time(clock.now());
    assert!(!popup.has_completed(clock.now()));
}
