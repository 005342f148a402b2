//! Drawing the frame.

use bevy::math::Vec2;

use crate::shapes::fmt_num;
use crate::surface::{NodeId, RasterContext, VectorSurface};
use crate::theme;

use super::FrameLayout;

/// Frame nodes in the client-space overlay group. Never serialized.
#[derive(Debug, Default)]
pub struct FrameOverlay {
    nodes: Vec<NodeId>,
}

impl FrameOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of overlay nodes currently on the surface.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Redraw the overlay under `parent`, or clear it when `frame` is `None`.
    pub fn update(
        &mut self,
        surface: &mut dyn VectorSurface,
        parent: NodeId,
        frame: Option<&FrameLayout>,
    ) {
        self.clear(surface);
        let Some(frame) = frame else {
            return;
        };
        let stroke = theme::hex(theme::FRAME_COLOR);
        let fill = theme::hex(theme::HANDLE_FILL);

        let outline = surface.create_node("polygon");
        let points: Vec<String> = frame
            .corners
            .iter()
            .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
            .collect();
        surface.set_attribute(outline, "class", "edit-frame");
        surface.set_attribute(outline, "points", &points.join(" "));
        surface.set_attribute(outline, "fill", "none");
        surface.set_attribute(outline, "stroke", &stroke);
        surface.set_attribute(outline, "stroke-width", "1");
        self.push(surface, parent, outline);

        if let Some(handle) = frame.rotation_handle {
            let stem = surface.create_node("line");
            surface.set_attribute(stem, "x1", &fmt_num(frame.top_mid.x));
            surface.set_attribute(stem, "y1", &fmt_num(frame.top_mid.y));
            surface.set_attribute(stem, "x2", &fmt_num(handle.x));
            surface.set_attribute(stem, "y2", &fmt_num(handle.y));
            surface.set_attribute(stem, "stroke", &stroke);
            surface.set_attribute(stem, "stroke-width", "1");
            self.push(surface, parent, stem);

            let knob = surface.create_node("circle");
            surface.set_attribute(knob, "class", "edit-frame-rotate");
            surface.set_attribute(knob, "cx", &fmt_num(handle.x));
            surface.set_attribute(knob, "cy", &fmt_num(handle.y));
            surface.set_attribute(knob, "r", &fmt_num(frame.handle_size * 0.5));
            surface.set_attribute(knob, "fill", &fill);
            surface.set_attribute(knob, "stroke", &stroke);
            self.push(surface, parent, knob);
        }

        let size = frame.handle_size;
        for (_, position) in &frame.handles {
            let rect = surface.create_node("rect");
            surface.set_attribute(rect, "class", "edit-frame-handle");
            surface.set_attribute(rect, "x", &fmt_num(position.x - size * 0.5));
            surface.set_attribute(rect, "y", &fmt_num(position.y - size * 0.5));
            surface.set_attribute(rect, "width", &fmt_num(size));
            surface.set_attribute(rect, "height", &fmt_num(size));
            surface.set_attribute(rect, "fill", &fill);
            surface.set_attribute(rect, "stroke", &stroke);
            self.push(surface, parent, rect);
        }
    }

    pub fn clear(&mut self, surface: &mut dyn VectorSurface) {
        for node in self.nodes.drain(..) {
            surface.remove_node(node);
        }
    }

    fn push(&mut self, surface: &mut dyn VectorSurface, parent: NodeId, node: NodeId) {
        surface.append_child(parent, node);
        self.nodes.push(node);
    }
}

impl FrameLayout {
    /// Paint the frame in client pixels.
    pub fn render_to_canvas(&self, ctx: &mut dyn RasterContext) {
        ctx.save();
        ctx.set_stroke(theme::FRAME_COLOR, 1.0);
        ctx.begin_path();
        ctx.move_to(self.corners[0]);
        for corner in &self.corners[1..] {
            ctx.line_to(*corner);
        }
        ctx.close_path();
        ctx.stroke();

        ctx.set_fill(theme::HANDLE_FILL);
        if let Some(handle) = self.rotation_handle {
            ctx.begin_path();
            ctx.move_to(self.top_mid);
            ctx.line_to(handle);
            ctx.stroke();

            ctx.begin_path();
            ctx.ellipse(handle, Vec2::splat(self.handle_size * 0.5), 0.0);
            ctx.fill();
            ctx.stroke();
        }

        let half = self.handle_size * 0.5;
        for (_, position) in &self.handles {
            ctx.begin_path();
            ctx.move_to(*position + Vec2::new(-half, -half));
            ctx.line_to(*position + Vec2::new(half, -half));
            ctx.line_to(*position + Vec2::new(half, half));
            ctx.line_to(*position + Vec2::new(-half, half));
            ctx.close_path();
            ctx.fill();
            ctx.stroke();
        }
        ctx.restore();
    }
}
