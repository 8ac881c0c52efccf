// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use facecapture::constants::{overlay, overlay_timing};

#[test]
fn test_pulse_fits_inside_darkening() {
    // Both pulse phases together end no later than the darkening ramp
    assert!(overlay_timing::PULSE_PHASE * 2 <= overlay_timing::DARKEN);
}

#[test]
fn test_fade_out_is_shorter_than_fade_in() {
    assert!(overlay_timing::FADE_OUT < overlay_timing::FADE_IN);
}

#[test]
fn test_darkening_levels_are_ordered() {
    assert!(overlay::REST_DARKENING < overlay::CAPTURE_DARKENING);
    assert!(overlay::CAPTURE_DARKENING + overlay::BACKDROP_ALPHA <= 1.0);
}

#[test]
fn test_pulse_grows_the_cutout() {
    assert!(overlay::PULSE_SCALE > overlay::REST_SCALE);
}
