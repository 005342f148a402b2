//! Arrow polygon: a straight shaft with a triangular head.

use bevy::math::Vec2;

pub const ARROW_POINT_COUNT: usize = 7;

/// Head length and head width as multiples of the stroke width
const HEAD_LENGTH_FACTOR: f32 = 4.0;
const HEAD_WIDTH_FACTOR: f32 = 4.0;

/// Shaft left between the tail and the head, as a multiple of the stroke width
const MIN_SHAFT_FACTOR: f32 = 1.2;

/// Height of the arrow's box (the head width) for a stroke width.
pub fn arrow_height(stroke_width: f32) -> f32 {
    stroke_width * HEAD_WIDTH_FACTOR
}

/// Head length for an arrow of the given length, capped so the head never eats
/// into the last `1.2 * stroke_width` of shaft.
pub fn arrow_head_length(length: f32, stroke_width: f32) -> f32 {
    (stroke_width * HEAD_LENGTH_FACTOR)
        .min(length - MIN_SHAFT_FACTOR * stroke_width)
        .max(0.0)
}

/// The arrow outline in local coordinates (tail at `-length / 2`, tip at
/// `+length / 2`), symmetric about the local x axis.
pub fn arrow_polygon(length: f32, stroke_width: f32) -> [Vec2; ARROW_POINT_COUNT] {
    let half_len = length * 0.5;
    let shaft = stroke_width * 0.5;
    let head_half = arrow_height(stroke_width) * 0.5;
    let neck = half_len - arrow_head_length(length, stroke_width);
    [
        Vec2::new(-half_len, -shaft),
        Vec2::new(neck, -shaft),
        Vec2::new(neck, -head_half),
        Vec2::new(half_len, 0.0),
        Vec2::new(neck, head_half),
        Vec2::new(neck, shaft),
        Vec2::new(-half_len, shaft),
    ]
}
