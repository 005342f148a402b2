//! Freehand stroke storage.

use bevy::math::Vec2;

use crate::geometry::{bounds_of, distance_to_segment};

/// A stroke path frozen at the bounding box it was drawn in.
///
/// Points are relative to the center of that box. Rendering scales them by
/// `current_size / frozen_size` per axis, so resizing never resamples the path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreehandPath {
    pub points: Vec<Vec2>,
    pub frozen_size: Vec2,
}

impl FreehandPath {
    /// Build a path from markup-space samples, returning it with its box center and size.
    pub fn from_points(points: &[Vec2]) -> (Self, Vec2, Vec2) {
        let Some((min, max)) = bounds_of(points) else {
            return (Self::default(), Vec2::ZERO, Vec2::ZERO);
        };
        let center = (min + max) * 0.5;
        let size = max - min;
        let path = Self {
            points: points.iter().map(|p| *p - center).collect(),
            frozen_size: size,
        };
        (path, center, size)
    }

    /// Per-axis scale from the frozen box to `size`. Degenerate axes keep scale 1.
    pub fn scale_for(&self, size: Vec2) -> Vec2 {
        let axis = |current: f32, frozen: f32| {
            if frozen.abs() <= f32::EPSILON {
                1.0
            } else {
                current / frozen
            }
        };
        Vec2::new(
            axis(size.x, self.frozen_size.x),
            axis(size.y, self.frozen_size.y),
        )
    }

    /// Points scaled to a box of `size`, in local coordinates.
    pub fn scaled_points(&self, size: Vec2) -> Vec<Vec2> {
        let scale = self.scale_for(size);
        self.points.iter().map(|p| *p * scale).collect()
    }

    /// Distance from a local point to the scaled stroke.
    pub fn distance_to(&self, local: Vec2, size: Vec2) -> f32 {
        let points = self.scaled_points(size);
        match points.as_slice() {
            [] => f32::INFINITY,
            [single] => local.distance(*single),
            _ => points
                .windows(2)
                .map(|w| distance_to_segment(local, w[0], w[1]))
                .fold(f32::INFINITY, f32::min),
        }
    }
}
