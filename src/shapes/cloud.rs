//! Scalloped cloud outline.
//!
//! Each side of the inset box is covered with bezier bumps of a fixed arc width:
//! `floor(usable / arc_width)` full arcs plus one partial arc for the remainder.
//! The usable length keeps a fixed distance from each corner, and the corners are
//! bridged with one diagonal bump each.

use bevy::math::Vec2;

/// Arc width as a multiple of the stroke width
const ARC_WIDTH_FACTOR: f32 = 8.0;
const MIN_ARC_WIDTH: f32 = 4.0;

/// Bump height as a fraction of the bump's chord
const BUMP_HEIGHT: f32 = 0.5;

/// Partial arcs shorter than this are folded into the corner bump
const MIN_PARTIAL_ARC: f32 = 0.01;

/// Cloud outline for a box of `size`, as `[start, (c1, c2, end)*]` in local
/// coordinates. Empty when the box has no area.
pub fn cloud_outline(size: Vec2, stroke_width: f32) -> Vec<Vec2> {
    let half = size * 0.5 - Vec2::splat(stroke_width * 0.5);
    if half.x <= 0.0 || half.y <= 0.0 {
        return Vec::new();
    }
    let arc_width = (stroke_width * ARC_WIDTH_FACTOR).max(MIN_ARC_WIDTH);
    let corner_offset = stroke_width.min(half.x).min(half.y);

    let corners = [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ];
    let normals = [Vec2::NEG_Y, Vec2::X, Vec2::Y, Vec2::NEG_X];

    let mut outline = Vec::new();
    for side in 0..4 {
        let a = corners[side];
        let b = corners[(side + 1) % 4];
        let dir = (b - a).normalize_or_zero();
        let start = a + dir * corner_offset;
        let usable = a.distance(b) - 2.0 * corner_offset;

        if outline.is_empty() {
            outline.push(start);
        }

        let full = (usable / arc_width).floor().max(0.0) as usize;
        let remainder = usable - full as f32 * arc_width;
        let mut cursor = start;
        for _ in 0..full {
            let next = cursor + dir * arc_width;
            push_bump(&mut outline, cursor, next, normals[side]);
            cursor = next;
        }
        if remainder > MIN_PARTIAL_ARC {
            let next = cursor + dir * remainder;
            push_bump(&mut outline, cursor, next, normals[side]);
            cursor = next;
        }

        // Bridge the corner to the start of the next side
        let next_side = (side + 1) % 4;
        let next_dir = (corners[(next_side + 1) % 4] - b).normalize_or_zero();
        let next_start = b + next_dir * corner_offset;
        let out = (normals[side] + normals[next_side]).normalize_or_zero();
        push_bump(&mut outline, cursor, next_start, out);
    }
    outline
}

fn push_bump(outline: &mut Vec<Vec2>, from: Vec2, to: Vec2, out: Vec2) {
    let h = from.distance(to) * BUMP_HEIGHT;
    outline.push(from + out * h);
    outline.push(to + out * h);
    outline.push(to);
}
