//! Gizmo-backed raster context.
//!
//! Bevy gizmos only draw lines, so paths are flattened into client-space line
//! strips and projected back onto the world plane the camera sees. Fills are
//! outlined in their fill color. Text is collected as [`CanvasLabel`]s for the
//! egui pass.

use bevy::color::Alpha;
use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::math::Affine2;
use bevy::prelude::*;

use crate::surface::RasterContext;

use super::camera::MarkupsCamera;
use super::CanvasLabels;

/// Segments used to flatten one cubic bezier
const BEZIER_SEGMENTS: usize = 12;

/// Segments used to flatten a full ellipse
const ELLIPSE_SEGMENTS: usize = 48;

/// Gizmo group for markup rendering
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct MarkupGizmoGroup;

pub fn configure_markup_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<MarkupGizmoGroup>();
    config.line.width = 2.0;
}

/// Text queued by [`RasterContext::fill_text`], in client pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasLabel {
    pub text: String,
    pub position: Vec2,
    pub font_size: f32,
    pub color: Color,
}

/// Flattened path painted in one color, in client pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStrip {
    pub points: Vec<Vec2>,
    pub color: Color,
}

#[derive(Debug, Clone, Copy)]
struct PaintState {
    transform: Affine2,
    stroke: Color,
    fill: Color,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            stroke: Color::BLACK,
            fill: Color::NONE,
        }
    }
}

/// Transform stack and flattened path state shared by gizmo drawing.
///
/// Strokes and fills both become [`LineStrip`]s. A fill is drawn as the
/// outline of its subpaths in the fill color.
#[derive(Debug, Default)]
pub struct PathRecorder {
    state: PaintState,
    stack: Vec<PaintState>,
    subpaths: Vec<Vec<Vec2>>,
    strips: Vec<LineStrip>,
    labels: Vec<CanvasLabel>,
}

impl PathRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattened subpaths in client pixels.
    pub fn subpaths(&self) -> &[Vec<Vec2>] {
        &self.subpaths
    }

    pub fn stroke_color(&self) -> Color {
        self.state.stroke
    }

    pub fn fill_color(&self) -> Color {
        self.state.fill
    }

    /// Strips painted since the last [`PathRecorder::take_strips`].
    pub fn strips(&self) -> &[LineStrip] {
        &self.strips
    }

    pub fn take_strips(&mut self) -> Vec<LineStrip> {
        std::mem::take(&mut self.strips)
    }

    pub fn labels(&self) -> &[CanvasLabel] {
        &self.labels
    }

    pub fn into_labels(self) -> Vec<CanvasLabel> {
        self.labels
    }

    fn apply(&self, p: Vec2) -> Vec2 {
        self.state.transform.transform_point2(p)
    }

    fn current(&mut self) -> &mut Vec<Vec2> {
        if self.subpaths.is_empty() {
            self.subpaths.push(Vec::new());
        }
        let last = self.subpaths.len() - 1;
        &mut self.subpaths[last]
    }

    fn last_point(&self) -> Option<Vec2> {
        self.subpaths.last().and_then(|s| s.last().copied())
    }

    fn concat(&mut self, local: Affine2) {
        self.state.transform = self.state.transform * local;
    }

    fn paint(&mut self, color: Color) {
        if color.alpha() <= 0.0 {
            return;
        }
        let strips = self
            .subpaths
            .iter()
            .filter(|points| points.len() > 1)
            .map(|points| LineStrip {
                points: points.clone(),
                color,
            });
        self.strips.extend(strips);
    }
}

impl RasterContext for PathRecorder {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.concat(Affine2::from_translation(Vec2::new(x, y)));
    }

    fn rotate(&mut self, angle: f32) {
        self.concat(Affine2::from_angle(angle));
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.concat(Affine2::from_scale(Vec2::new(x, y)));
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, p: Vec2) {
        let p = self.apply(p);
        self.subpaths.push(vec![p]);
    }

    fn line_to(&mut self, p: Vec2) {
        let p = self.apply(p);
        self.current().push(p);
    }

    fn bezier_curve_to(&mut self, c1: Vec2, c2: Vec2, p: Vec2) {
        let (c1, c2, p) = (self.apply(c1), self.apply(c2), self.apply(p));
        let Some(p0) = self.last_point() else {
            self.subpaths.push(vec![p]);
            return;
        };
        let points = self.current();
        for i in 1..=BEZIER_SEGMENTS {
            let t = i as f32 / BEZIER_SEGMENTS as f32;
            let u = 1.0 - t;
            points.push(
                p0 * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + p * (t * t * t),
            );
        }
    }

    fn close_path(&mut self) {
        let Some(first) = self.subpaths.last().and_then(|s| s.first().copied()) else {
            return;
        };
        self.current().push(first);
    }

    fn ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32) {
        let (sin_r, cos_r) = rotation.sin_cos();
        let points = (0..=ELLIPSE_SEGMENTS)
            .map(|i| {
                let a = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
                let local = Vec2::new(radii.x * a.cos(), radii.y * a.sin());
                let rotated = Vec2::new(
                    local.x * cos_r - local.y * sin_r,
                    local.x * sin_r + local.y * cos_r,
                );
                self.apply(center + rotated)
            })
            .collect();
        self.subpaths.push(points);
    }

    fn set_stroke(&mut self, color: Color, _width: f32) {
        self.state.stroke = color;
    }

    fn set_fill(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn stroke(&mut self) {
        self.paint(self.state.stroke);
    }

    fn fill(&mut self) {
        self.paint(self.state.fill);
    }

    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32) {
        let scale = self.state.transform.matrix2.y_axis.length();
        self.labels.push(CanvasLabel {
            text: text.to_string(),
            position: self.apply(position),
            font_size: font_size * scale,
            color: self.state.fill,
        });
    }
}

/// [`RasterContext`] that paints through gizmos of the markups camera.
pub struct GizmoCanvas<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's, MarkupGizmoGroup>,
    camera: &'a Camera,
    camera_transform: &'a GlobalTransform,
    recorder: PathRecorder,
}

impl<'a, 'w, 's> GizmoCanvas<'a, 'w, 's> {
    pub fn new(
        gizmos: &'a mut Gizmos<'w, 's, MarkupGizmoGroup>,
        camera: &'a Camera,
        camera_transform: &'a GlobalTransform,
    ) -> Self {
        Self {
            gizmos,
            camera,
            camera_transform,
            recorder: PathRecorder::new(),
        }
    }

    pub fn into_labels(self) -> Vec<CanvasLabel> {
        self.recorder.into_labels()
    }

    fn flush(&mut self) {
        for strip in self.recorder.take_strips() {
            let world: Option<Vec<Vec2>> = strip
                .points
                .iter()
                .map(|p| {
                    self.camera
                        .viewport_to_world_2d(self.camera_transform, *p)
                        .ok()
                })
                .collect();
            if let Some(points) = world {
                self.gizmos.linestrip_2d(points, strip.color);
            }
        }
    }
}

impl RasterContext for GizmoCanvas<'_, '_, '_> {
    fn save(&mut self) {
        self.recorder.save();
    }

    fn restore(&mut self) {
        self.recorder.restore();
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.recorder.translate(x, y);
    }

    fn rotate(&mut self, angle: f32) {
        self.recorder.rotate(angle);
    }

    fn scale(&mut self, x: f32, y: f32) {
        self.recorder.scale(x, y);
    }

    fn begin_path(&mut self) {
        self.recorder.begin_path();
    }

    fn move_to(&mut self, p: Vec2) {
        self.recorder.move_to(p);
    }

    fn line_to(&mut self, p: Vec2) {
        self.recorder.line_to(p);
    }

    fn bezier_curve_to(&mut self, c1: Vec2, c2: Vec2, p: Vec2) {
        self.recorder.bezier_curve_to(c1, c2, p);
    }

    fn close_path(&mut self) {
        self.recorder.close_path();
    }

    fn ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32) {
        self.recorder.ellipse(center, radii, rotation);
    }

    fn set_stroke(&mut self, color: Color, width: f32) {
        self.recorder.set_stroke(color, width);
    }

    fn set_fill(&mut self, color: Color) {
        self.recorder.set_fill(color);
    }

    fn stroke(&mut self) {
        self.recorder.stroke();
        self.flush();
    }

    fn fill(&mut self) {
        self.recorder.fill();
        self.flush();
    }

    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32) {
        self.recorder.fill_text(text, position, font_size);
    }
}

/// Paint the markups through gizmos and queue their labels for egui.
pub fn draw_markups(
    core: Res<crate::engine::MarkupsCore>,
    mut gizmos: Gizmos<MarkupGizmoGroup>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MarkupsCamera>>,
    mut labels: ResMut<CanvasLabels>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let mut canvas = GizmoCanvas::new(&mut gizmos, camera, camera_transform);
    core.render_to_canvas(&mut canvas);
    labels.0 = canvas.into_labels();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Markup, MarkupKind, Style};

    #[test]
    fn test_translate_and_scale_apply_to_points() {
        let mut recorder = PathRecorder::new();
        recorder.concat(Affine2::from_translation(Vec2::new(10.0, 20.0)));
        recorder.concat(Affine2::from_scale(Vec2::splat(2.0)));
        recorder.begin_path();
        recorder.move_to(Vec2::new(1.0, 1.0));
        recorder.line_to(Vec2::new(3.0, 1.0));
        assert_eq!(
            recorder.subpaths(),
            &[vec![Vec2::new(12.0, 22.0), Vec2::new(16.0, 22.0)]]
        );
    }

    #[test]
    fn test_restore_pops_transform() {
        let mut recorder = PathRecorder::new();
        recorder.save();
        recorder.concat(Affine2::from_translation(Vec2::new(5.0, 0.0)));
        recorder.restore();
        recorder.move_to(Vec2::ZERO);
        assert_eq!(recorder.subpaths()[0][0], Vec2::ZERO);
    }

    #[test]
    fn test_close_path_returns_to_start() {
        let mut recorder = PathRecorder::new();
        recorder.move_to(Vec2::ZERO);
        recorder.line_to(Vec2::new(10.0, 0.0));
        recorder.line_to(Vec2::new(10.0, 10.0));
        recorder.close_path();
        let path = &recorder.subpaths()[0];
        assert_eq!(path.len(), 4);
        assert_eq!(path[3], Vec2::ZERO);
    }

    #[test]
    fn test_bezier_is_flattened_to_its_end_point() {
        let mut recorder = PathRecorder::new();
        recorder.move_to(Vec2::ZERO);
        recorder.bezier_curve_to(Vec2::new(0.0, 10.0), Vec2::new(10.0, 10.0), Vec2::new(10.0, 0.0));
        let path = &recorder.subpaths()[0];
        assert_eq!(path.len(), BEZIER_SEGMENTS + 1);
        assert!((path[BEZIER_SEGMENTS] - Vec2::new(10.0, 0.0)).length() < 1e-4);
        // Midpoint of this symmetric curve sits at 3/4 of the control height.
        assert!((path[BEZIER_SEGMENTS / 2] - Vec2::new(5.0, 7.5)).length() < 1e-4);
    }

    #[test]
    fn test_ellipse_is_a_closed_ring() {
        let mut recorder = PathRecorder::new();
        recorder.ellipse(Vec2::new(50.0, 50.0), Vec2::new(20.0, 10.0), 0.0);
        let ring = &recorder.subpaths()[0];
        assert_eq!(ring.len(), ELLIPSE_SEGMENTS + 1);
        assert!((ring[0] - Vec2::new(70.0, 50.0)).length() < 1e-4);
        assert!((ring[ELLIPSE_SEGMENTS] - ring[0]).length() < 1e-3);
    }

    #[test]
    fn test_begin_path_discards_previous_subpaths() {
        let mut recorder = PathRecorder::new();
        recorder.move_to(Vec2::ZERO);
        recorder.line_to(Vec2::ONE);
        recorder.begin_path();
        assert!(recorder.subpaths().is_empty());
    }

    #[test]
    fn test_arrow_is_outlined_in_its_color() {
        let style = Style::defaults(MarkupKind::Arrow, 3.0, 16.0);
        let mut arrow = Markup::new(MarkupKind::Arrow, 1, style);
        arrow.set_arrow(Vec2::ZERO, Vec2::new(100.0, 0.0));
        let mut recorder = PathRecorder::new();
        arrow.render_to_canvas(&mut recorder);

        let strips = recorder.strips();
        assert_eq!(strips.len(), 1);
        assert_eq!(strips[0].color, arrow.style().stroke_color());
        assert!(strips[0].color.alpha() > 0.0);
        // Seven polygon corners plus the closing point.
        assert_eq!(strips[0].points.len(), 8);
        assert_eq!(strips[0].points.first(), strips[0].points.last());
    }

    #[test]
    fn test_fill_paints_outline_and_transparent_paint_is_skipped() {
        let mut recorder = PathRecorder::new();
        recorder.move_to(Vec2::ZERO);
        recorder.line_to(Vec2::new(10.0, 0.0));
        recorder.fill();
        assert!(recorder.strips().is_empty());

        recorder.set_fill(Color::WHITE);
        recorder.fill();
        assert_eq!(
            recorder.take_strips(),
            vec![LineStrip {
                points: vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
                color: Color::WHITE,
            }]
        );
        assert!(recorder.strips().is_empty());
    }

    #[test]
    fn test_single_point_subpath_paints_nothing() {
        let mut recorder = PathRecorder::new();
        recorder.move_to(Vec2::ONE);
        recorder.stroke();
        assert!(recorder.strips().is_empty());
    }

    #[test]
    fn test_text_is_queued_in_client_space() {
        let mut recorder = PathRecorder::new();
        recorder.state.fill = Color::WHITE;
        recorder.concat(Affine2::from_translation(Vec2::new(100.0, 0.0)));
        recorder.concat(Affine2::from_scale(Vec2::splat(2.0)));
        recorder.fill_text("note", Vec2::new(5.0, 5.0), 12.0);
        assert_eq!(
            recorder.labels(),
            &[CanvasLabel {
                text: "note".to_string(),
                position: Vec2::new(110.0, 10.0),
                font_size: 24.0,
                color: Color::WHITE,
            }]
        );
    }
}
