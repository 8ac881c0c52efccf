// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the feedback overlay

use facecapture::overlay::{
    FeedbackOverlay, FeedbackPhase, OverlayInputState, Viewport, VisibilityPhase,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

fn set(overlay: &mut FeedbackOverlay, active: bool, capturing: bool, now: Instant) {
    overlay.set_inputs(OverlayInputState { active, capturing }, now);
}

#[test]
fn test_interrupted_fade_in_reverses_from_current_value() {
    let t0 = Instant::now();
    let mut overlay = FeedbackOverlay::default();

    set(&mut overlay, true, false, t0);
    let interrupted = overlay.opacity_at(t0 + ms(120));
    assert!(interrupted > 0.0 && interrupted < 1.0);

    set(&mut overlay, false, false, t0 + ms(120));
    assert_eq!(overlay.visibility(), VisibilityPhase::FadingOut);
    assert!((overlay.opacity_at(t0 + ms(120)) - interrupted).abs() < 1e-4);
    assert!(overlay.opacity_at(t0 + ms(220)) < interrupted);

    // Fade-out lasts 200ms from the interruption
    overlay.tick(t0 + ms(320));
    assert_eq!(overlay.visibility(), VisibilityPhase::Hidden);
    assert_eq!(overlay.opacity_at(t0 + ms(320)), 0.0);
}

#[test]
fn test_one_callback_per_capture_cycle() {
    let count = Arc::new(AtomicU32::new(0));
    let count_clone = Arc::clone(&count);
    let mut overlay = FeedbackOverlay::default().on_animation_complete(move || {
        count_clone.fetch_add(1, Ordering::SeqCst);
    });

    let mut now = Instant::now();
    set(&mut overlay, true, false, now);

    for cycle in 1..=3 {
        set(&mut overlay, true, true, now);
        assert_eq!(overlay.feedback(), FeedbackPhase::Pulsing);
        now += ms(400);
        overlay.tick(now);
        set(&mut overlay, true, false, now);
        now += ms(400);
        overlay.tick(now);
        assert_eq!(overlay.feedback(), FeedbackPhase::Idle);
        assert_eq!(count.load(Ordering::SeqCst), cycle);
    }
}

#[test]
fn test_overlay_never_intercepts_input() {
    let t0 = Instant::now();
    let mut overlay = FeedbackOverlay::default();
    set(&mut overlay, true, false, t0);

    let frame = overlay
        .frame(Viewport::new(390.0, 844.0), t0 + ms(400))
        .expect("visible");
    assert!(!frame.intercepts_input(0.0, 0.0));
    assert!(!frame.intercepts_input(195.0, 372.0));
    assert_eq!(frame.mask_alpha_at(195.0, 372.0), 0.0);
    assert!(frame.mask_alpha_at(5.0, 5.0) > 0.0);
}
