//! Immediate-mode raster target.

use bevy::color::Color;
use bevy::math::Vec2;

/// The subset of a 2D canvas context the engine paints with.
///
/// Coordinates are in the context's current transform; the engine sets that up so
/// shapes draw in markup units and land in client pixels.
pub trait RasterContext {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, x: f32, y: f32);
    fn begin_path(&mut self);
    fn move_to(&mut self, p: Vec2);
    fn line_to(&mut self, p: Vec2);
    fn bezier_curve_to(&mut self, c1: Vec2, c2: Vec2, p: Vec2);
    fn close_path(&mut self);
    /// Full ellipse outline as a closed subpath.
    fn ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32);
    fn set_stroke(&mut self, color: Color, width: f32);
    fn set_fill(&mut self, color: Color);
    fn stroke(&mut self);
    fn fill(&mut self);
    /// Draw a single line of text with its top-left corner at `position`.
    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32);
}

/// One recorded call on a [`RecordingCanvas`].
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasOp {
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Scale(Vec2),
    BeginPath,
    MoveTo(Vec2),
    LineTo(Vec2),
    BezierTo(Vec2, Vec2, Vec2),
    ClosePath,
    Ellipse { center: Vec2, radii: Vec2, rotation: f32 },
    SetStroke(Color, f32),
    SetFill(Color),
    Stroke,
    Fill,
    FillText { text: String, position: Vec2, font_size: f32 },
}

/// A raster context that records every call, for inspection in tests and for
/// replaying onto another context later.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<CanvasOp>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&CanvasOp) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    /// Replay the recording onto another context.
    pub fn replay(&self, ctx: &mut dyn RasterContext) {
        for op in &self.ops {
            match op {
                CanvasOp::Save => ctx.save(),
                CanvasOp::Restore => ctx.restore(),
                CanvasOp::Translate(v) => ctx.translate(v.x, v.y),
                CanvasOp::Rotate(a) => ctx.rotate(*a),
                CanvasOp::Scale(v) => ctx.scale(v.x, v.y),
                CanvasOp::BeginPath => ctx.begin_path(),
                CanvasOp::MoveTo(p) => ctx.move_to(*p),
                CanvasOp::LineTo(p) => ctx.line_to(*p),
                CanvasOp::BezierTo(c1, c2, p) => ctx.bezier_curve_to(*c1, *c2, *p),
                CanvasOp::ClosePath => ctx.close_path(),
                CanvasOp::Ellipse {
                    center,
                    radii,
                    rotation,
                } => ctx.ellipse(*center, *radii, *rotation),
                CanvasOp::SetStroke(c, w) => ctx.set_stroke(*c, *w),
                CanvasOp::SetFill(c) => ctx.set_fill(*c),
                CanvasOp::Stroke => ctx.stroke(),
                CanvasOp::Fill => ctx.fill(),
                CanvasOp::FillText {
                    text,
                    position,
                    font_size,
                } => ctx.fill_text(text, *position, *font_size),
            }
        }
    }
}

impl RasterContext for RecordingCanvas {
    fn save(&mut self) {
        self.ops.push(CanvasOp::Save);
    }
    fn restore(&mut self) {
        self.ops.push(CanvasOp::Restore);
    }
    fn translate(&mut self, x: f32, y: f32) {
        self.ops.push(CanvasOp::Translate(Vec2::new(x, y)));
    }
    fn rotate(&mut self, angle: f32) {
        self.ops.push(CanvasOp::Rotate(angle));
    }
    fn scale(&mut self, x: f32, y: f32) {
        self.ops.push(CanvasOp::Scale(Vec2::new(x, y)));
    }
    fn begin_path(&mut self) {
        self.ops.push(CanvasOp::BeginPath);
    }
    fn move_to(&mut self, p: Vec2) {
        self.ops.push(CanvasOp::MoveTo(p));
    }
    fn line_to(&mut self, p: Vec2) {
        self.ops.push(CanvasOp::LineTo(p));
    }
    fn bezier_curve_to(&mut self, c1: Vec2, c2: Vec2, p: Vec2) {
        self.ops.push(CanvasOp::BezierTo(c1, c2, p));
    }
    fn close_path(&mut self) {
        self.ops.push(CanvasOp::ClosePath);
    }
    fn ellipse(&mut self, center: Vec2, radii: Vec2, rotation: f32) {
        self.ops.push(CanvasOp::Ellipse {
            center,
            radii,
            rotation,
        });
    }
    fn set_stroke(&mut self, color: Color, width: f32) {
        self.ops.push(CanvasOp::SetStroke(color, width));
    }
    fn set_fill(&mut self, color: Color) {
        self.ops.push(CanvasOp::SetFill(color));
    }
    fn stroke(&mut self) {
        self.ops.push(CanvasOp::Stroke);
    }
    fn fill(&mut self) {
        self.ops.push(CanvasOp::Fill);
    }
    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32) {
        self.ops.push(CanvasOp::FillText {
            text: text.to_string(),
            position,
            font_size,
        });
    }
}
