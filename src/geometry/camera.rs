//! Camera snapshot consumed by the mapper, and the plane markups are stored in.

use bevy::math::{Mat4, Vec2, Vec3};

/// Near/far bounds used by the 2D orthographic helpers
const ORTHO_DEPTH: f32 = 1000.0;

/// The host camera as seen by the markup engine.
///
/// Hosts push a fresh snapshot on every camera-change or resize notification.
/// Nothing derived from it is cached, so the next mapping call always sees the
/// newest state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    /// World → view transform (inverse of the camera's global transform)
    pub view_from_world: Mat4,
    /// View → clip projection (perspective or orthographic)
    pub clip_from_view: Mat4,
    /// Overlay size in client pixels
    pub viewport: Vec2,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            view_from_world: Mat4::IDENTITY,
            clip_from_view: Mat4::IDENTITY,
            viewport: Vec2::ZERO,
        }
    }
}

impl CameraState {
    /// A top-down orthographic camera centered on `center` (world units) where one
    /// client pixel covers `units_per_pixel` world units.
    pub fn orthographic_2d(center: Vec2, units_per_pixel: f32, viewport: Vec2) -> Self {
        let half = viewport * 0.5 * units_per_pixel;
        Self {
            view_from_world: Mat4::from_translation(Vec3::new(-center.x, -center.y, 0.0)),
            clip_from_view: Mat4::orthographic_rh(
                -half.x,
                half.x,
                -half.y,
                half.y,
                -ORTHO_DEPTH,
                ORTHO_DEPTH,
            ),
            viewport,
        }
    }

    /// An orthographic camera where markup coordinates (on the default plane)
    /// equal client pixels.
    pub fn screen_aligned(viewport: Vec2) -> Self {
        Self::orthographic_2d(Vec2::new(viewport.x * 0.5, -viewport.y * 0.5), 1.0, viewport)
    }

    /// A perspective camera at `eye` looking at `target`.
    pub fn perspective(eye: Vec3, target: Vec3, up: Vec3, fov_y: f32, viewport: Vec2) -> Self {
        let aspect = viewport.x / viewport.y;
        Self {
            view_from_world: Mat4::look_at_rh(eye, target, up),
            clip_from_view: Mat4::perspective_rh(fov_y, aspect, 0.1, 10_000.0),
            viewport,
        }
    }

    /// Combined world → clip matrix.
    pub fn clip_from_world(&self) -> Mat4 {
        self.clip_from_view * self.view_from_world
    }

    /// True when the viewport has no area (e.g. mid-resize) and mapping is undefined.
    pub fn is_degenerate(&self) -> bool {
        !(self.viewport.x > 0.0 && self.viewport.y > 0.0)
    }
}

/// The plane in world space that markup coordinates are measured on.
///
/// The default plane is world XY with markup y pointing down world -Y, so markup
/// space has the same handedness as client space and SVG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkupPlane {
    pub origin: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
}

impl Default for MarkupPlane {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            x_axis: Vec3::X,
            y_axis: Vec3::NEG_Y,
        }
    }
}

impl MarkupPlane {
    /// World position of a markup-space point.
    pub fn to_world(&self, p: Vec2) -> Vec3 {
        self.origin + self.x_axis * p.x + self.y_axis * p.y
    }

    /// Markup coordinates of a world point lying on the plane.
    pub fn from_world(&self, world: Vec3) -> Vec2 {
        let rel = world - self.origin;
        Vec2::new(
            rel.dot(self.x_axis) / self.x_axis.length_squared(),
            rel.dot(self.y_axis) / self.y_axis.length_squared(),
        )
    }

    /// Plane normal (not normalized).
    pub fn normal(&self) -> Vec3 {
        self.x_axis.cross(self.y_axis)
    }
}
