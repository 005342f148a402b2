//! Rendering shapes into the vector surface and onto a raster context.

use std::fmt::Write;

use bevy::math::Vec2;

use super::circle::inset_radii;
use super::rectangle::inset_rect;
use super::style::{self, Style};
use super::text::LINE_HEIGHT_FACTOR;
use super::{Markup, RenderNodes, ShapeData, arrow_polygon};
use crate::geometry::is_finite_point;
use crate::surface::{NodeId, RasterContext, VectorSurface};

/// Format a number for SVG attributes; `{}` round-trips f32 exactly.
pub(crate) fn fmt_num(v: f32) -> String {
    format!("{}", v)
}

fn body_tag(data: &ShapeData) -> &'static str {
    match data {
        ShapeData::Circle => "ellipse",
        ShapeData::Rectangle => "rect",
        ShapeData::Text(_) => "text",
        ShapeData::Arrow { .. } | ShapeData::Cloud { .. } | ShapeData::Freehand(_) => "path",
    }
}

fn polygon_path(points: &[Vec2], close: bool) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{} {} ", cmd, fmt_num(p.x), fmt_num(p.y));
    }
    if close && !points.is_empty() {
        d.push('Z');
    }
    d.trim_end().to_string()
}

fn cloud_path(outline: &[Vec2]) -> String {
    let Some(start) = outline.first() else {
        return String::new();
    };
    let mut d = format!("M{} {}", fmt_num(start.x), fmt_num(start.y));
    for c in outline[1..].chunks_exact(3) {
        let _ = write!(
            d,
            " C{} {} {} {} {} {}",
            fmt_num(c[0].x),
            fmt_num(c[0].y),
            fmt_num(c[1].x),
            fmt_num(c[1].y),
            fmt_num(c[2].x),
            fmt_num(c[2].y)
        );
    }
    d.push_str(" Z");
    d
}

fn apply_stroke(surface: &mut dyn VectorSurface, node: NodeId, style: &Style, filled: bool) {
    surface.set_attribute(node, "stroke", style.get(style::STROKE_COLOR).unwrap_or("none"));
    surface.set_attribute(node, "stroke-width", &fmt_num(style.stroke_width()));
    surface.set_attribute(node, "stroke-opacity", &fmt_num(style.stroke_opacity()));
    if filled && style.has_fill() {
        surface.set_attribute(node, "fill", style.get(style::FILL_COLOR).unwrap_or("none"));
        surface.set_attribute(node, "fill-opacity", &fmt_num(style.fill_opacity()));
    } else {
        surface.set_attribute(node, "fill", "none");
        surface.remove_attribute(node, "fill-opacity");
    }
}

impl Markup {
    /// Create this shape's nodes under `parent` and render it.
    pub fn attach(&mut self, surface: &mut dyn VectorSurface, parent: NodeId) {
        if self.nodes.is_some() {
            self.update_style(surface);
            return;
        }
        let group = surface.create_node("g");
        let body = surface.create_node(body_tag(&self.data));
        surface.append_child(group, body);
        surface.append_child(parent, group);
        self.nodes = Some(RenderNodes {
            group,
            body,
            lines: Vec::new(),
        });
        self.update_style(surface);
    }

    /// The group node of an attached shape.
    pub fn node(&self) -> Option<NodeId> {
        self.nodes.as_ref().map(|n| n.group)
    }

    /// Recompute the rendered transform and visual attributes. Idempotent.
    ///
    /// Non-finite geometry leaves the previous attributes in place.
    pub fn update_style(&mut self, surface: &mut dyn VectorSurface) {
        let Some(nodes) = self.nodes.as_mut() else {
            return;
        };
        if !is_finite_point(self.position) || !is_finite_point(self.size) || !self.rotation.is_finite()
        {
            return;
        }

        let transform = format!(
            "translate({} {}) rotate({})",
            fmt_num(self.position.x),
            fmt_num(self.position.y),
            fmt_num(self.rotation.to_degrees())
        );
        surface.set_attribute(nodes.group, "transform", &transform);
        surface.set_attribute(nodes.group, "data-markup-id", &self.id.to_string());
        let mut class = String::from("markup");
        if self.selected {
            class.push_str(" selected");
        }
        if self.highlighted {
            class.push_str(" highlighted");
        }
        surface.set_attribute(nodes.group, "class", &class);

        let body = nodes.body;
        let stroke = self.style.stroke_width();
        match &self.data {
            ShapeData::Arrow { .. } => {
                let d = polygon_path(&arrow_polygon(self.size.x, stroke), true);
                surface.set_attribute(body, "d", &d);
                surface.set_attribute(body, "stroke", "none");
                surface.set_attribute(
                    body,
                    "fill",
                    self.style.get(style::STROKE_COLOR).unwrap_or("none"),
                );
                surface.set_attribute(body, "fill-opacity", &fmt_num(self.style.stroke_opacity()));
            }
            ShapeData::Circle => {
                let r = inset_radii(self.size, stroke);
                surface.set_attribute(body, "cx", "0");
                surface.set_attribute(body, "cy", "0");
                surface.set_attribute(body, "rx", &fmt_num(r.x));
                surface.set_attribute(body, "ry", &fmt_num(r.y));
                apply_stroke(surface, body, &self.style, true);
            }
            ShapeData::Rectangle => {
                let (origin, extent) = inset_rect(self.size, stroke);
                surface.set_attribute(body, "x", &fmt_num(origin.x));
                surface.set_attribute(body, "y", &fmt_num(origin.y));
                surface.set_attribute(body, "width", &fmt_num(extent.x));
                surface.set_attribute(body, "height", &fmt_num(extent.y));
                apply_stroke(surface, body, &self.style, true);
            }
            ShapeData::Cloud { outline } => {
                surface.set_attribute(body, "d", &cloud_path(outline));
                apply_stroke(surface, body, &self.style, true);
            }
            ShapeData::Freehand(path) => {
                let d = polygon_path(&path.scaled_points(self.size), false);
                surface.set_attribute(body, "d", &d);
                surface.set_attribute(body, "stroke-linecap", "round");
                surface.set_attribute(body, "stroke-linejoin", "round");
                apply_stroke(surface, body, &self.style, false);
            }
            ShapeData::Text(text) => {
                let font_size = self.style.font_size();
                surface.set_attribute(body, "font-size", &fmt_num(font_size));
                for key in [style::FONT_FAMILY, style::FONT_STYLE, style::FONT_WEIGHT] {
                    if let Some(value) = self.style.get(key) {
                        surface.set_attribute(body, key, value);
                    }
                }
                surface.set_attribute(body, "fill", self.style.get(style::FILL_COLOR).unwrap_or("none"));
                surface.set_attribute(body, "fill-opacity", &fmt_num(self.style.fill_opacity()));
                surface.set_attribute(
                    body,
                    "stroke",
                    self.style.get(style::STROKE_COLOR).unwrap_or("none"),
                );
                surface.set_attribute(body, "stroke-width", "0");

                for line in nodes.lines.drain(..) {
                    surface.remove_node(line);
                }
                let left = -self.size.x * 0.5;
                let top = -self.size.y * 0.5;
                for (i, line) in text.lines.iter().enumerate() {
                    let span = surface.create_node("tspan");
                    surface.set_attribute(span, "x", &fmt_num(left));
                    let baseline = top + font_size * (i as f32 * LINE_HEIGHT_FACTOR + 1.0);
                    surface.set_attribute(span, "y", &fmt_num(baseline));
                    surface.set_text(span, line);
                    surface.append_child(body, span);
                    nodes.lines.push(span);
                }
            }
        }
    }

    /// Remove this shape's nodes from the surface.
    pub fn destroy(&mut self, surface: &mut dyn VectorSurface) {
        if let Some(nodes) = self.nodes.take() {
            surface.remove_node(nodes.group);
        }
    }

    /// Paint the shape in markup units onto a raster context.
    pub fn render_to_canvas(&self, ctx: &mut dyn RasterContext) {
        if !is_finite_point(self.position) || !is_finite_point(self.size) {
            return;
        }
        let stroke = self.style.stroke_width();
        ctx.save();
        ctx.translate(self.position.x, self.position.y);
        ctx.rotate(self.rotation);
        match &self.data {
            ShapeData::Arrow { .. } => {
                let points = arrow_polygon(self.size.x, stroke);
                trace_polygon(ctx, &points, true);
                ctx.set_fill(self.style.stroke_color());
                ctx.fill();
            }
            ShapeData::Circle => {
                ctx.begin_path();
                ctx.ellipse(Vec2::ZERO, inset_radii(self.size, stroke), 0.0);
                fill_and_stroke(ctx, &self.style);
            }
            ShapeData::Rectangle => {
                let (origin, extent) = inset_rect(self.size, stroke);
                let corners = [
                    origin,
                    origin + Vec2::new(extent.x, 0.0),
                    origin + extent,
                    origin + Vec2::new(0.0, extent.y),
                ];
                trace_polygon(ctx, &corners, true);
                fill_and_stroke(ctx, &self.style);
            }
            ShapeData::Cloud { outline } => {
                if let Some(start) = outline.first() {
                    ctx.begin_path();
                    ctx.move_to(*start);
                    for c in outline[1..].chunks_exact(3) {
                        ctx.bezier_curve_to(c[0], c[1], c[2]);
                    }
                    ctx.close_path();
                    fill_and_stroke(ctx, &self.style);
                }
            }
            ShapeData::Freehand(path) => {
                trace_polygon(ctx, &path.scaled_points(self.size), false);
                ctx.set_stroke(self.style.stroke_color(), stroke);
                ctx.stroke();
            }
            ShapeData::Text(text) => {
                let font_size = self.style.font_size();
                let top_left = -self.size * 0.5;
                ctx.set_fill(self.style.fill_color());
                for (i, line) in text.lines.iter().enumerate() {
                    let offset = Vec2::new(0.0, i as f32 * font_size * LINE_HEIGHT_FACTOR);
                    ctx.fill_text(line, top_left + offset, font_size);
                }
            }
        }
        ctx.restore();
    }
}

fn trace_polygon(ctx: &mut dyn RasterContext, points: &[Vec2], close: bool) {
    ctx.begin_path();
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            ctx.move_to(*p);
        } else {
            ctx.line_to(*p);
        }
    }
    if close {
        ctx.close_path();
    }
}

fn fill_and_stroke(ctx: &mut dyn RasterContext, style: &Style) {
    if style.has_fill() {
        ctx.set_fill(style.fill_color());
        ctx.fill();
    }
    ctx.set_stroke(style.stroke_color(), style.stroke_width());
    ctx.stroke();
}
