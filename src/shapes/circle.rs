//! Ellipse geometry.

use bevy::math::Vec2;

/// Radii of the ellipse drawn inside a box, inset by half the stroke width.
pub fn inset_radii(size: Vec2, stroke_width: f32) -> Vec2 {
    (size * 0.5 - Vec2::splat(stroke_width * 0.5)).max(Vec2::ZERO)
}

pub(super) fn ellipse_contains(local: Vec2, half: Vec2, tolerance: f32) -> bool {
    let r = half + Vec2::splat(tolerance);
    if r.x <= 0.0 || r.y <= 0.0 {
        return false;
    }
    (local.x / r.x).powi(2) + (local.y / r.y).powi(2) <= 1.0
}
