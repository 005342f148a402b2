//! Box geometry.

use bevy::math::Vec2;

/// Top-left corner and extent of the rectangle drawn inside a box, inset by half
/// the stroke width so the stroke stays within the box.
pub fn inset_rect(size: Vec2, stroke_width: f32) -> (Vec2, Vec2) {
    let extent = (size - Vec2::splat(stroke_width)).max(Vec2::ZERO);
    (-extent * 0.5, extent)
}
