// SPDX-License-Identifier: GPL-3.0-only

//! Cutout geometry for the feedback overlay
//!
//! Geometry is a pure function of the viewport. Callers compute it on every
//! render so a rotation or terminal resize is picked up immediately.

use crate::constants::overlay::{CUTOUT_RADIUS_FACTOR, VERTICAL_OFFSET};
use serde::{Deserialize, Serialize};

/// Viewport dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Length of the shorter side
    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Layout constants the geometry is derived with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutoutLayout {
    /// Radius as a fraction of the shorter viewport side
    pub radius_factor: f32,
    /// Upward shift of the center from the geometric middle
    pub vertical_offset: f32,
}

impl Default for CutoutLayout {
    fn default() -> Self {
        Self {
            radius_factor: CUTOUT_RADIUS_FACTOR,
            vertical_offset: VERTICAL_OFFSET,
        }
    }
}

/// Circular face-frame cutout at rest scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoutGeometry {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

impl CutoutGeometry {
    /// Derive the cutout for a viewport
    pub fn compute(viewport: Viewport, layout: CutoutLayout) -> Self {
        Self {
            center_x: viewport.width / 2.0,
            center_y: viewport.height / 2.0 - layout.vertical_offset,
            radius: layout.radius_factor * viewport.min_side().max(0.0),
        }
    }

    /// Same cutout with its radius multiplied by `scale`
    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            radius: self.radius * scale.max(0.0),
            ..*self
        }
    }

    /// Whether a point lies inside the cutout (boundary included)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_portrait_geometry() {
        let geometry = CutoutGeometry::compute(Viewport::new(390.0, 844.0), CutoutLayout::default());
        assert!((geometry.radius - 156.0).abs() < 1e-3);
        assert_eq!(geometry.center_x, 195.0);
        assert_eq!(geometry.center_y, 372.0);
    }

    #[test]
    fn test_radius_follows_shorter_side_after_rotation() {
        let layout = CutoutLayout::default();
        let portrait = CutoutGeometry::compute(Viewport::new(390.0, 844.0), layout);
        let landscape = CutoutGeometry::compute(Viewport::new(844.0, 390.0), layout);
        assert_eq!(portrait.radius, landscape.radius);
        assert_eq!(landscape.center_x, 422.0);
        assert_eq!(landscape.center_y, 145.0);
    }

    #[test]
    fn test_repeated_compute_is_identical() {
        let viewport = Viewport::new(1280.0, 720.0);
        let first = CutoutGeometry::compute(viewport, CutoutLayout::default());
        let second = CutoutGeometry::compute(viewport, CutoutLayout::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_radius_strictly_increases_with_min_side() {
        let layout = CutoutLayout::default();
        let mut previous = 0.0;
        for side in [100.0, 200.0, 390.0, 720.0] {
            let radius = CutoutGeometry::compute(Viewport::new(side, 2000.0), layout).radius;
            assert!(radius > previous);
            previous = radius;
        }
    }

    #[test]
    fn test_contains_and_scaled() {
        let geometry = CutoutGeometry {
            center_x: 100.0,
            center_y: 100.0,
            radius: 10.0,
        };
        assert!(geometry.contains(100.0, 110.0));
        assert!(!geometry.contains(100.0, 110.5));
        assert!(geometry.scaled(1.1).contains(100.0, 110.5));
    }
}
