//! Bidirectional markup ↔ client mapping.

use bevy::math::{Affine2, Mat2, Vec2, Vec3, Vec4};

use super::{CameraState, MarkupPlane, is_finite_point};

/// Maps points between markup space and client space through the current camera.
///
/// Built on demand from borrowed state; every call reprojects from scratch.
/// All methods return `None` when the viewport is degenerate or the result is not
/// a finite number, so callers can skip the update instead of writing NaN into
/// the scene.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper<'a> {
    camera: &'a CameraState,
    plane: &'a MarkupPlane,
}

impl<'a> CoordinateMapper<'a> {
    pub fn new(camera: &'a CameraState, plane: &'a MarkupPlane) -> Self {
        Self { camera, plane }
    }

    /// Overlay size in client pixels.
    pub fn viewport_size(&self) -> Vec2 {
        self.camera.viewport
    }

    pub fn is_degenerate(&self) -> bool {
        self.camera.is_degenerate()
    }

    /// Project a markup-space point into client pixels.
    pub fn markup_to_client(&self, p: Vec2) -> Option<Vec2> {
        if self.is_degenerate() {
            return None;
        }
        let world = self.plane.to_world(p);
        let clip = self.camera.clip_from_world() * world.extend(1.0);
        if clip.w.abs() <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let viewport = self.camera.viewport;
        let client = Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        );
        is_finite_point(client).then_some(client)
    }

    /// Unproject a client pixel onto the markup plane.
    pub fn client_to_markup(&self, p: Vec2) -> Option<Vec2> {
        if self.is_degenerate() {
            return None;
        }
        let viewport = self.camera.viewport;
        let ndc_x = 2.0 * p.x / viewport.x - 1.0;
        let ndc_y = 1.0 - 2.0 * p.y / viewport.y;

        let world_from_clip = self.camera.clip_from_world().inverse();
        // Two depths along the pick ray; both stay finite for standard and
        // reversed-infinite projections.
        let a = unproject(world_from_clip, Vec3::new(ndc_x, ndc_y, 1.0))?;
        let b = unproject(world_from_clip, Vec3::new(ndc_x, ndc_y, 0.5))?;

        let dir = b - a;
        let normal = self.plane.normal();
        let denom = normal.dot(dir);
        if denom.abs() <= f32::EPSILON {
            return None;
        }
        let t = normal.dot(self.plane.origin - a) / denom;
        let hit = self.plane.from_world(a + dir * t);
        is_finite_point(hit).then_some(hit)
    }

    /// Client-space extent of a markup-space size (always non-negative).
    pub fn markup_to_client_size(&self, size: Vec2) -> Option<Vec2> {
        let a = self.markup_to_client(Vec2::ZERO)?;
        let b = self.markup_to_client(size)?;
        Some((b - a).abs())
    }

    /// Markup-space extent of a client-space size (always non-negative).
    pub fn client_to_markup_size(&self, size: Vec2) -> Option<Vec2> {
        let a = self.client_to_markup(Vec2::ZERO)?;
        let b = self.client_to_markup(size)?;
        Some((b - a).abs())
    }

    /// Length in markup units of `distance` client pixels, measured at the viewport center.
    pub fn client_to_markup_distance(&self, distance: f32) -> Option<f32> {
        let center = self.camera.viewport * 0.5;
        let a = self.client_to_markup(center)?;
        let b = self.client_to_markup(center + Vec2::new(distance, 0.0))?;
        Some(a.distance(b))
    }

    /// Length in client pixels of `distance` markup units, measured at the markup origin.
    pub fn markup_to_client_distance(&self, distance: f32) -> Option<f32> {
        let a = self.markup_to_client(Vec2::ZERO)?;
        let b = self.markup_to_client(Vec2::new(distance, 0.0))?;
        Some(a.distance(b))
    }

    /// Affine approximation of the markup → client mapping around the markup origin.
    ///
    /// Exact for orthographic cameras; used for the root transform of the vector layer.
    pub fn markup_to_client_affine(&self) -> Option<Affine2> {
        let origin = self.markup_to_client(Vec2::ZERO)?;
        let x = self.markup_to_client(Vec2::X)? - origin;
        let y = self.markup_to_client(Vec2::Y)? - origin;
        Some(Affine2::from_mat2_translation(
            Mat2::from_cols(x, y),
            origin,
        ))
    }

    /// Clamp a client point to the viewport rectangle.
    pub fn clamp_to_viewport(&self, p: Vec2) -> Vec2 {
        p.clamp(Vec2::ZERO, self.camera.viewport.max(Vec2::ZERO))
    }
}

fn unproject(world_from_clip: bevy::math::Mat4, ndc: Vec3) -> Option<Vec3> {
    let v: Vec4 = world_from_clip * ndc.extend(1.0);
    if v.w.abs() <= f32::EPSILON {
        return None;
    }
    let p = v.truncate() / v.w;
    (p.x.is_finite() && p.y.is_finite() && p.z.is_finite()).then_some(p)
}
