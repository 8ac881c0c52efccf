// SPDX-License-Identifier: GPL-3.0-only

//! Face-frame feedback overlay
//!
//! A dimmed full-screen backdrop with a circular cutout where the face is
//! expected. The overlay is purely presentational. The parent pushes two
//! flags into it and it derives its animation state from their edges:
//!
//! - `active` drives the **visibility axis**: `Hidden`, `FadingIn`,
//!   `Visible`, `FadingOut`
//! - `capturing` drives the **capture-feedback axis**: `Idle`, `Pulsing`,
//!   `Settling`
//!
//! The axes are independent and each owns its animated values. When a
//! capture pulse runs to completion, the overlay invokes the completion
//! callback once. That callback is its only output besides the rendered
//! frame.
//!
//! # Coordinate System
//!
//! All geometry is in viewport pixels with the origin at the top-left.
//! Frontends with non-square cells (the terminal renders two vertical
//! pixels per cell) pass their own pixel viewport.

pub mod geometry;
pub mod widget;

pub use geometry::{CutoutGeometry, CutoutLayout, Viewport};

use crate::animation::AnimatedValue;
use crate::constants::{overlay, overlay_timing};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Flags owned by the parent screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayInputState {
    /// Whether the overlay should be shown at all
    pub active: bool,
    /// Whether a capture is currently underway
    pub capturing: bool,
}

/// Visibility axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibilityPhase {
    #[default]
    Hidden,
    FadingIn,
    Visible,
    /// Not drawn; opacity keeps ramping so a fade-in that interrupts it
    /// resumes from the current value
    FadingOut,
}

/// Capture-feedback axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackPhase {
    /// Nothing in flight
    #[default]
    Idle,
    /// Scale pulse and backdrop darkening running as one group
    Pulsing,
    /// Returning to rest after capturing ended
    Settling,
}

/// Animation durations in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayTimings {
    /// Opacity ramp when becoming active
    pub fade_in_ms: u64,
    /// Opacity ramp when becoming inactive
    pub fade_out_ms: u64,
    /// Each of the two scale pulse phases
    pub pulse_phase_ms: u64,
    /// Backdrop darkening while capturing
    pub darken_ms: u64,
    /// Return to rest when capturing ends
    pub settle_ms: u64,
}

impl Default for OverlayTimings {
    fn default() -> Self {
        Self {
            fade_in_ms: overlay_timing::FADE_IN.as_millis() as u64,
            fade_out_ms: overlay_timing::FADE_OUT.as_millis() as u64,
            pulse_phase_ms: overlay_timing::PULSE_PHASE.as_millis() as u64,
            darken_ms: overlay_timing::DARKEN.as_millis() as u64,
            settle_ms: overlay_timing::SETTLE.as_millis() as u64,
        }
    }
}

impl OverlayTimings {
    pub fn fade_in(&self) -> Duration {
        Duration::from_millis(self.fade_in_ms)
    }

    pub fn fade_out(&self) -> Duration {
        Duration::from_millis(self.fade_out_ms)
    }

    pub fn pulse_phase(&self) -> Duration {
        Duration::from_millis(self.pulse_phase_ms)
    }

    pub fn darken(&self) -> Duration {
        Duration::from_millis(self.darken_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

type CompletionCallback = Box<dyn FnMut() + Send>;

/// Feedback overlay state machine
pub struct FeedbackOverlay {
    timings: OverlayTimings,
    layout: CutoutLayout,
    inputs: OverlayInputState,
    visibility: VisibilityPhase,
    feedback: FeedbackPhase,
    /// Visibility opacity, 0 = hidden
    opacity: AnimatedValue,
    /// Cutout scale, 1 = rest
    scale: AnimatedValue,
    /// Backdrop darkening, 0.1 = rest
    darkening: AnimatedValue,
    /// End of the running pulse group; `None` once fired or abandoned
    pulse_deadline: Option<Instant>,
    on_complete: Option<CompletionCallback>,
}

impl Default for FeedbackOverlay {
    fn default() -> Self {
        Self::new(OverlayTimings::default(), CutoutLayout::default())
    }
}

impl std::fmt::Debug for FeedbackOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackOverlay")
            .field("inputs", &self.inputs)
            .field("visibility", &self.visibility)
            .field("feedback", &self.feedback)
            .field("pulse_deadline", &self.pulse_deadline)
            .finish_non_exhaustive()
    }
}

impl FeedbackOverlay {
    /// Create a hidden overlay
    pub fn new(timings: OverlayTimings, layout: CutoutLayout) -> Self {
        Self {
            timings,
            layout,
            inputs: OverlayInputState::default(),
            visibility: VisibilityPhase::Hidden,
            feedback: FeedbackPhase::Idle,
            opacity: AnimatedValue::new(0.0),
            scale: AnimatedValue::new(overlay::REST_SCALE),
            darkening: AnimatedValue::new(overlay::REST_DARKENING),
            pulse_deadline: None,
            on_complete: None,
        }
    }

    /// Set the callback invoked when a capture pulse runs to completion
    pub fn on_animation_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Push the parent's flags
    ///
    /// Only edges matter: pushing the same flags again is a no-op, so the
    /// parent may call this on every render.
    pub fn set_inputs(&mut self, inputs: OverlayInputState, now: Instant) {
        let previous = self.inputs;
        self.inputs = inputs;

        if inputs.active != previous.active {
            if inputs.active {
                debug!("Overlay fading in");
                self.visibility = VisibilityPhase::FadingIn;
                self.opacity.animate_to(1.0, self.timings.fade_in(), now);
            } else {
                debug!("Overlay fading out");
                self.visibility = VisibilityPhase::FadingOut;
                self.opacity.animate_to(0.0, self.timings.fade_out(), now);
                self.reset_feedback();
            }
        }

        // Capture edges while hidden are recorded above but start nothing
        if inputs.active && inputs.capturing != previous.capturing {
            if inputs.capturing {
                self.start_pulse(now);
            } else {
                self.start_settle(now);
            }
        }
    }

    /// Advance phase transitions; fires the completion callback when due
    pub fn tick(&mut self, now: Instant) {
        match self.visibility {
            VisibilityPhase::FadingIn if self.opacity.is_settled(now) => {
                self.opacity.settle(now);
                self.visibility = VisibilityPhase::Visible;
            }
            VisibilityPhase::FadingOut if self.opacity.is_settled(now) => {
                self.opacity.settle(now);
                self.visibility = VisibilityPhase::Hidden;
            }
            _ => {}
        }

        match self.feedback {
            FeedbackPhase::Pulsing => {
                if let Some(deadline) = self.pulse_deadline
                    && now >= deadline
                {
                    self.pulse_deadline = None;
                    self.scale.settle(now);
                    self.darkening.settle(now);
                    self.feedback = FeedbackPhase::Idle;
                    debug!("Capture pulse complete");
                    if let Some(callback) = self.on_complete.as_mut() {
                        callback();
                    }
                }
            }
            FeedbackPhase::Settling => {
                if self.scale.is_settled(now) && self.darkening.is_settled(now) {
                    self.scale.settle(now);
                    self.darkening.settle(now);
                    self.feedback = FeedbackPhase::Idle;
                }
            }
            FeedbackPhase::Idle => {}
        }
    }

    /// Render state for this instant, or `None` while inactive
    ///
    /// The cutout is derived from `viewport` on every call.
    pub fn frame(&self, viewport: Viewport, now: Instant) -> Option<OverlayFrame> {
        if !self.inputs.active {
            return None;
        }

        let cutout = CutoutGeometry::compute(viewport, self.layout);
        Some(OverlayFrame {
            viewport,
            cutout: cutout.scaled(self.scale.value_at(now)),
            opacity: self.opacity.value_at(now).clamp(0.0, 1.0),
            darkening: self.darkening.value_at(now).clamp(0.0, 1.0),
        })
    }

    /// Whether any animation is still running at `now`
    pub fn is_animating(&self, now: Instant) -> bool {
        !(self.opacity.is_settled(now) && self.scale.is_settled(now) && self.darkening.is_settled(now))
    }

    pub fn inputs(&self) -> OverlayInputState {
        self.inputs
    }

    pub fn visibility(&self) -> VisibilityPhase {
        self.visibility
    }

    pub fn feedback(&self) -> FeedbackPhase {
        self.feedback
    }

    pub fn opacity_at(&self, now: Instant) -> f32 {
        self.opacity.value_at(now)
    }

    pub fn scale_at(&self, now: Instant) -> f32 {
        self.scale.value_at(now)
    }

    pub fn darkening_at(&self, now: Instant) -> f32 {
        self.darkening.value_at(now)
    }

    pub fn layout(&self) -> CutoutLayout {
        self.layout
    }

    /// Start the scale pulse and the darkening ramp as one group
    fn start_pulse(&mut self, now: Instant) {
        if self.pulse_deadline.is_some() {
            debug!("Abandoning unfinished capture pulse");
        }

        let phase = self.timings.pulse_phase();
        self.scale.animate_sequence(
            &[(overlay::PULSE_SCALE, phase), (overlay::REST_SCALE, phase)],
            now,
        );
        self.darkening
            .animate_to(overlay::CAPTURE_DARKENING, self.timings.darken(), now);

        let deadline = [self.scale.finishes_at(), self.darkening.finishes_at()]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or(now);

        self.pulse_deadline = Some(deadline);
        self.feedback = FeedbackPhase::Pulsing;
    }

    /// Return scale and darkening to rest without a completion callback
    fn start_settle(&mut self, now: Instant) {
        let settle = self.timings.settle();
        self.pulse_deadline = None;
        self.scale.animate_to(overlay::REST_SCALE, settle, now);
        self.darkening
            .animate_to(overlay::REST_DARKENING, settle, now);
        self.feedback = FeedbackPhase::Settling;
    }

    /// Drop all capture feedback immediately
    fn reset_feedback(&mut self) {
        self.pulse_deadline = None;
        self.scale.jump_to(overlay::REST_SCALE);
        self.darkening.jump_to(overlay::REST_DARKENING);
        self.feedback = FeedbackPhase::Idle;
    }
}

/// Everything needed to draw the overlay at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFrame {
    pub viewport: Viewport,
    /// Cutout with the current pulse scale applied
    pub cutout: CutoutGeometry,
    /// Visibility opacity
    pub opacity: f32,
    /// Extra darkening composited over the backdrop
    pub darkening: f32,
}

impl OverlayFrame {
    /// Backdrop coverage at a point, before visibility opacity
    pub fn backdrop_alpha(&self) -> f32 {
        1.0 - (1.0 - overlay::BACKDROP_ALPHA) * (1.0 - self.darkening)
    }

    /// Coverage of the dimming mask at a point
    ///
    /// The cutout is subtracted from the backdrop, so this is exactly zero
    /// anywhere inside it however many layers are composited.
    pub fn mask_alpha_at(&self, x: f32, y: f32) -> f32 {
        if self.cutout.contains(x, y) {
            0.0
        } else {
            self.opacity * self.backdrop_alpha()
        }
    }

    /// The overlay never takes pointer or key input
    pub fn intercepts_input(&self, _x: f32, _y: f32) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn inputs(active: bool, capturing: bool) -> OverlayInputState {
        OverlayInputState { active, capturing }
    }

    fn counting_overlay() -> (FeedbackOverlay, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = Arc::clone(&count);
        let overlay = FeedbackOverlay::default().on_animation_complete(move || {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        (overlay, count)
    }

    /// Tick every 16ms from `from` to `to` inclusive
    fn run(overlay: &mut FeedbackOverlay, from: Instant, to: Instant) {
        let mut now = from;
        while now < to {
            overlay.tick(now);
            now += ms(16);
        }
        overlay.tick(to);
    }

    #[test]
    fn test_inactive_renders_nothing() {
        let t0 = Instant::now();
        let viewport = Viewport::new(390.0, 844.0);
        let mut overlay = FeedbackOverlay::default();

        assert!(overlay.frame(viewport, t0).is_none());
        overlay.set_inputs(inputs(false, true), t0);
        assert!(overlay.frame(viewport, t0).is_none());
        assert_eq!(overlay.feedback(), FeedbackPhase::Idle);
    }

    #[test]
    fn test_fade_in_reaches_visible() {
        let t0 = Instant::now();
        let mut overlay = FeedbackOverlay::default();
        overlay.set_inputs(inputs(true, false), t0);
        assert_eq!(overlay.visibility(), VisibilityPhase::FadingIn);
        assert_eq!(overlay.opacity_at(t0), 0.0);

        run(&mut overlay, t0, t0 + ms(300));
        assert_eq!(overlay.visibility(), VisibilityPhase::Visible);
        assert_eq!(overlay.opacity_at(t0 + ms(300)), 1.0);
    }

    #[test]
    fn test_interrupted_fade_out_starts_from_current_opacity() {
        let t0 = Instant::now();
        let mut overlay = FeedbackOverlay::default();
        overlay.set_inputs(inputs(true, false), t0);

        let t1 = t0 + ms(120);
        let reached = overlay.opacity_at(t1);
        assert!(reached > 0.0 && reached < 1.0);

        overlay.set_inputs(inputs(false, false), t1);
        assert_eq!(overlay.visibility(), VisibilityPhase::FadingOut);
        assert_eq!(overlay.opacity_at(t1), reached);
        assert!(overlay.opacity_at(t1 + ms(100)) < reached);

        run(&mut overlay, t1, t1 + ms(200));
        assert_eq!(overlay.visibility(), VisibilityPhase::Hidden);
        assert_eq!(overlay.opacity_at(t1 + ms(200)), 0.0);
    }

    #[test]
    fn test_rapid_toggle_ends_hidden() {
        let t0 = Instant::now();
        let mut overlay = FeedbackOverlay::default();
        overlay.set_inputs(inputs(true, false), t0);
        overlay.set_inputs(inputs(false, false), t0 + ms(10));
        overlay.set_inputs(inputs(true, false), t0 + ms(20));
        overlay.set_inputs(inputs(false, false), t0 + ms(30));

        run(&mut overlay, t0 + ms(30), t0 + ms(400));
        assert_eq!(overlay.visibility(), VisibilityPhase::Hidden);
        assert_eq!(overlay.opacity_at(t0 + ms(400)), 0.0);
        assert!(overlay.frame(Viewport::new(100.0, 100.0), t0 + ms(400)).is_none());
    }

    #[test]
    fn test_pulse_fires_callback_once() {
        let t0 = Instant::now();
        let (mut overlay, count) = counting_overlay();
        overlay.set_inputs(inputs(true, false), t0);
        overlay.set_inputs(inputs(true, true), t0);
        assert_eq!(overlay.feedback(), FeedbackPhase::Pulsing);

        let peak = overlay.scale_at(t0 + ms(150));
        assert!((peak - 1.1).abs() < 1e-4);

        run(&mut overlay, t0, t0 + ms(299));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        run(&mut overlay, t0 + ms(299), t0 + ms(1000));
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(overlay.feedback(), FeedbackPhase::Idle);
        assert_eq!(overlay.scale_at(t0 + ms(1000)), 1.0);
        assert!((overlay.darkening_at(t0 + ms(1000)) - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_retrigger_abandons_previous_pulse() {
        let t0 = Instant::now();
        let (mut overlay, count) = counting_overlay();
        overlay.set_inputs(inputs(true, false), t0);
        overlay.set_inputs(inputs(true, true), t0);
        run(&mut overlay, t0, t0 + ms(100));

        // false -> true again before the first pulse settled
        overlay.set_inputs(inputs(true, false), t0 + ms(100));
        overlay.set_inputs(inputs(true, true), t0 + ms(110));
        assert_eq!(overlay.feedback(), FeedbackPhase::Pulsing);

        run(&mut overlay, t0 + ms(110), t0 + ms(2000));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capturing_false_settles_without_callback() {
        let t0 = Instant::now();
        let (mut overlay, count) = counting_overlay();
        overlay.set_inputs(inputs(true, true), t0);
        overlay.set_inputs(inputs(true, false), t0 + ms(50));
        assert_eq!(overlay.feedback(), FeedbackPhase::Settling);

        run(&mut overlay, t0 + ms(50), t0 + ms(1000));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(overlay.feedback(), FeedbackPhase::Idle);
        assert_eq!(overlay.scale_at(t0 + ms(1000)), 1.0);
        assert!((overlay.darkening_at(t0 + ms(1000)) - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_deactivating_drops_pending_pulse() {
        let t0 = Instant::now();
        let (mut overlay, count) = counting_overlay();
        overlay.set_inputs(inputs(true, true), t0);
        overlay.set_inputs(inputs(false, true), t0 + ms(50));

        run(&mut overlay, t0 + ms(50), t0 + ms(1000));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(overlay.feedback(), FeedbackPhase::Idle);
    }

    #[test]
    fn test_repeated_identical_inputs_are_noops() {
        let t0 = Instant::now();
        let (mut overlay, count) = counting_overlay();
        overlay.set_inputs(inputs(true, true), t0);
        for step in 1..20 {
            overlay.set_inputs(inputs(true, true), t0 + ms(step * 16));
            overlay.tick(t0 + ms(step * 16));
        }
        run(&mut overlay, t0 + ms(320), t0 + ms(1000));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mask_is_clear_inside_cutout() {
        let t0 = Instant::now();
        let mut overlay = FeedbackOverlay::default();
        overlay.set_inputs(inputs(true, false), t0);
        let frame = overlay
            .frame(Viewport::new(390.0, 844.0), t0 + ms(300))
            .expect("active overlay renders");

        assert_eq!(frame.mask_alpha_at(195.0, 372.0), 0.0);
        assert!(frame.mask_alpha_at(5.0, 5.0) > 0.0);
        assert!(!frame.intercepts_input(195.0, 372.0));
        assert!(!frame.intercepts_input(5.0, 5.0));
    }

    #[test]
    fn test_frame_geometry_tracks_viewport_changes() {
        let t0 = Instant::now();
        let mut overlay = FeedbackOverlay::default();
        overlay.set_inputs(inputs(true, false), t0);

        let portrait = overlay.frame(Viewport::new(390.0, 844.0), t0).map(|f| f.cutout);
        let landscape = overlay.frame(Viewport::new(844.0, 390.0), t0).map(|f| f.cutout);
        let portrait = portrait.expect("rendered");
        let landscape = landscape.expect("rendered");
        assert_eq!(portrait.center_y, 372.0);
        assert_eq!(landscape.center_y, 145.0);
    }
}
