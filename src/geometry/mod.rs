//! Geometry: 2D vector helpers and the markup ↔ client coordinate mapping.
//!
//! Annotations live in *markup space*, a 2D plane anchored in the model that does
//! not move with the camera. The overlay is drawn in *client space* (window pixels,
//! y down). [`CoordinateMapper`] converts between the two using the camera state
//! current at the time of the call.
//!
//! ## Module Structure
//!
//! - [`camera`] - Camera snapshot and the markup plane definition
//! - [`mapper`] - Bidirectional point/size/distance mapping

mod camera;
mod mapper;

#[cfg(test)]
mod tests;

pub use camera::{CameraState, MarkupPlane};
pub use mapper::CoordinateMapper;

use bevy::math::Vec2;

/// Rotate a point around a center by the given angle (in radians)
pub fn rotate_point(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    rotate_vector(point - center, angle) + center
}

/// Rotate a vector about the origin by the given angle (in radians)
pub fn rotate_vector(v: Vec2, angle: f32) -> Vec2 {
    let (sin_a, cos_a) = angle.sin_cos();
    Vec2::new(v.x * cos_a - v.y * sin_a, v.x * sin_a + v.y * cos_a)
}

/// Express `point` in the local frame of a box centered at `center` rotated by `angle`.
pub fn to_local(point: Vec2, center: Vec2, angle: f32) -> Vec2 {
    rotate_vector(point - center, -angle)
}

/// Angle of the vector from `from` to `to`, in radians.
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Snap an angle (radians) to the nearest multiple of `increment` (radians).
///
/// A non-positive increment leaves the angle untouched.
pub fn snap_angle(angle: f32, increment: f32) -> f32 {
    if increment <= 0.0 {
        return angle;
    }
    (angle / increment).round() * increment
}

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// True when both components are finite numbers.
pub fn is_finite_point(p: Vec2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Axis-aligned bounds `(min, max)` of a point list, or `None` when empty.
pub fn bounds_of(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
    )
}

/// Distance from `p` to the segment `a`-`b`.
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}
