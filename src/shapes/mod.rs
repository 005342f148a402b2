//! Annotation shapes.
//!
//! A [`Markup`] is one annotation: an arrow, circle, rectangle, cloud, freehand
//! stroke or text label. All kinds share position (the shape center), size,
//! rotation, style and constraint state; the per-kind extras live in
//! [`ShapeData`]. Geometry is stored in markup space and rendered either into a
//! [`VectorSurface`](crate::surface::VectorSurface) or a
//! [`RasterContext`](crate::surface::RasterContext).
//!
//! ## Module Structure
//!
//! - [`style`] - Per-kind style dictionaries and color parsing
//! - [`arrow`] - Arrow polygon
//! - [`circle`] / [`rectangle`] - Inset box geometry
//! - [`cloud`] - Scalloped outline generation
//! - [`freehand`] - Frozen-scale point paths
//! - [`text`] - Word wrapping
//! - [`render`] - Vector surface and raster rendering
//! - [`metadata`] - Serialization fragment in and out
//! - [`store`] - The live shape collection

mod arrow;
mod circle;
mod cloud;
mod freehand;
mod metadata;
mod rectangle;
mod render;
mod store;
pub mod style;
mod text;


pub use arrow::{ARROW_POINT_COUNT, arrow_head_length, arrow_polygon};
pub use cloud::cloud_outline;
pub use freehand::FreehandPath;
pub(crate) use render::fmt_num;
pub use metadata::{ELEMENT_TAG, METADATA_TAG, MarkupMetadata, MetadataError};
pub use store::MarkupStore;
pub use style::Style;
pub use text::{TextBody, wrap_text};

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::{angle_between, rotate_vector, to_local};
use crate::surface::NodeId;

/// Session-unique shape identifier.
pub type MarkupId = u32;

/// The closed set of shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MarkupKind {
    Arrow,
    Circle,
    Rectangle,
    Cloud,
    Freehand,
    Text,
}

impl MarkupKind {
    pub const ALL: [MarkupKind; 6] = [
        MarkupKind::Arrow,
        MarkupKind::Circle,
        MarkupKind::Rectangle,
        MarkupKind::Cloud,
        MarkupKind::Freehand,
        MarkupKind::Text,
    ];

    /// Name used in serialized metadata.
    pub fn type_name(self) -> &'static str {
        match self {
            MarkupKind::Arrow => "arrow",
            MarkupKind::Circle => "circle",
            MarkupKind::Rectangle => "rectangle",
            MarkupKind::Cloud => "cloud",
            MarkupKind::Freehand => "freehand",
            MarkupKind::Text => "label",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MarkupKind::Arrow => "Arrow",
            MarkupKind::Circle => "Circle",
            MarkupKind::Rectangle => "Rectangle",
            MarkupKind::Cloud => "Cloud",
            MarkupKind::Freehand => "Freehand",
            MarkupKind::Text => "Text",
        }
    }
}

/// Per-axis edit locks honored by the edit frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    pub width_locked: bool,
    pub height_locked: bool,
    pub rotation_locked: bool,
}

/// Complete arrow geometry, used to restore an arrow exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGeometry {
    pub tail: Vec2,
    pub head: Vec2,
    pub position: Vec2,
    pub size: Vec2,
    pub rotation: f32,
}

/// Complete freehand geometry, used to restore a stroke exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct FreehandGeometry {
    pub position: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub path: FreehandPath,
}

/// Kind-specific state.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeData {
    Arrow { tail: Vec2, head: Vec2 },
    Circle,
    Rectangle,
    /// Outline as `[start, (c1, c2, end)*]` in local coordinates
    Cloud { outline: Vec<Vec2> },
    Freehand(FreehandPath),
    Text(TextBody),
}

/// Surface nodes owned by an attached shape.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderNodes {
    pub group: NodeId,
    pub body: NodeId,
    pub lines: Vec<NodeId>,
}

/// One annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Markup {
    id: MarkupId,
    position: Vec2,
    size: Vec2,
    rotation: f32,
    style: Style,
    selected: bool,
    highlighted: bool,
    constraints: Constraints,
    data: ShapeData,
    nodes: Option<RenderNodes>,
}

impl Markup {
    /// A new, zero-sized shape of the given kind.
    pub fn new(kind: MarkupKind, id: MarkupId, style: Style) -> Self {
        let data = match kind {
            MarkupKind::Arrow => ShapeData::Arrow {
                tail: Vec2::ZERO,
                head: Vec2::ZERO,
            },
            MarkupKind::Circle => ShapeData::Circle,
            MarkupKind::Rectangle => ShapeData::Rectangle,
            MarkupKind::Cloud => ShapeData::Cloud {
                outline: Vec::new(),
            },
            MarkupKind::Freehand => ShapeData::Freehand(FreehandPath::default()),
            MarkupKind::Text => ShapeData::Text(TextBody::default()),
        };
        let constraints = Constraints {
            height_locked: kind == MarkupKind::Arrow,
            ..Default::default()
        };
        let mut markup = Self {
            id,
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            rotation: 0.0,
            style,
            selected: false,
            highlighted: false,
            constraints,
            data,
            nodes: None,
        };
        markup.refresh_derived();
        markup
    }

    pub fn id(&self) -> MarkupId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: MarkupId) {
        self.id = id;
    }

    pub fn kind(&self) -> MarkupKind {
        match self.data {
            ShapeData::Arrow { .. } => MarkupKind::Arrow,
            ShapeData::Circle => MarkupKind::Circle,
            ShapeData::Rectangle => MarkupKind::Rectangle,
            ShapeData::Cloud { .. } => MarkupKind::Cloud,
            ShapeData::Freehand(_) => MarkupKind::Freehand,
            ShapeData::Text(_) => MarkupKind::Text,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn data(&self) -> &ShapeData {
        &self.data
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    pub fn is_attached(&self) -> bool {
        self.nodes.is_some()
    }

    /// Text content for text labels.
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            ShapeData::Text(body) => Some(&body.text),
            _ => None,
        }
    }

    /// Arrow tail/head points in markup space.
    pub fn arrow_points(&self) -> Option<(Vec2, Vec2)> {
        match self.data {
            ShapeData::Arrow { tail, head } => Some((tail, head)),
            _ => None,
        }
    }

    /// Initialize an arrow from its two end points. No-op for other kinds.
    pub fn set_arrow(&mut self, tail: Vec2, head: Vec2) {
        let ShapeData::Arrow {
            tail: t, head: h, ..
        } = &mut self.data
        else {
            return;
        };
        *t = tail;
        *h = head;
        self.position = (tail + head) * 0.5;
        self.size = Vec2::new(tail.distance(head), arrow::arrow_height(self.style.stroke_width()));
        self.rotation = if tail == head {
            0.0
        } else {
            angle_between(tail, head)
        };
    }

    pub fn arrow_geometry(&self) -> Option<ArrowGeometry> {
        let (tail, head) = self.arrow_points()?;
        Some(ArrowGeometry {
            tail,
            head,
            position: self.position,
            size: self.size,
            rotation: self.rotation,
        })
    }

    pub fn restore_arrow(&mut self, geometry: &ArrowGeometry) {
        if let ShapeData::Arrow { tail, head } = &mut self.data {
            *tail = geometry.tail;
            *head = geometry.head;
            self.position = geometry.position;
            self.size = geometry.size;
            self.rotation = geometry.rotation;
        }
    }

    /// Initialize a freehand stroke from markup-space samples. No-op for other kinds.
    pub fn set_freehand(&mut self, points: &[Vec2]) {
        if !matches!(self.data, ShapeData::Freehand(_)) {
            return;
        }
        let (path, center, size) = FreehandPath::from_points(points);
        self.position = center;
        self.size = size;
        self.rotation = 0.0;
        self.data = ShapeData::Freehand(path);
    }

    pub fn freehand_geometry(&self) -> Option<FreehandGeometry> {
        match &self.data {
            ShapeData::Freehand(path) => Some(FreehandGeometry {
                position: self.position,
                size: self.size,
                rotation: self.rotation,
                path: path.clone(),
            }),
            _ => None,
        }
    }

    pub fn restore_freehand(&mut self, geometry: &FreehandGeometry) {
        if let ShapeData::Freehand(path) = &mut self.data {
            *path = geometry.path.clone();
            self.position = geometry.position;
            self.size = geometry.size;
            self.rotation = geometry.rotation;
        }
    }

    /// Replace the text of a label and rewrap it. No-op for other kinds.
    pub fn set_text(&mut self, text: &str) {
        if let ShapeData::Text(body) = &mut self.data {
            body.text = text.to_string();
        }
        self.refresh_derived();
    }

    pub fn set_position(&mut self, position: Vec2) {
        let delta = position - self.position;
        if let ShapeData::Arrow { tail, head } = &mut self.data {
            *tail += delta;
            *head += delta;
        }
        self.position = position;
    }

    /// Resize around a new center. Arrows resize along their axis only.
    pub fn set_size(&mut self, position: Vec2, width: f32, height: f32) {
        let size = Vec2::new(width.abs(), height.abs());
        self.position = position;
        if let ShapeData::Arrow { tail, head } = &mut self.data {
            let half = rotate_vector(Vec2::new(size.x * 0.5, 0.0), self.rotation);
            *tail = position - half;
            *head = position + half;
            self.size = Vec2::new(size.x, arrow::arrow_height(self.style.stroke_width()));
            return;
        }
        self.size = size;
        self.refresh_derived();
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        if let ShapeData::Arrow { tail, head } = &mut self.data {
            let half = rotate_vector(Vec2::new(self.size.x * 0.5, 0.0), rotation);
            *tail = self.position - half;
            *head = self.position + half;
        }
    }

    pub fn set_style(&mut self, style: &Style) {
        self.style.merge_from(style);
        if matches!(self.data, ShapeData::Arrow { .. }) {
            self.size.y = arrow::arrow_height(self.style.stroke_width());
        }
        self.refresh_derived();
    }

    pub fn set_constraints(&mut self, constraints: Constraints) {
        self.constraints = constraints;
    }

    /// Deep copy with no surface references.
    pub fn clone_shape(&self) -> Markup {
        Markup {
            nodes: None,
            selected: false,
            highlighted: false,
            ..self.clone()
        }
    }

    /// Hit test a markup-space point, with `tolerance` markup units of slop.
    pub fn contains(&self, point: Vec2, tolerance: f32) -> bool {
        let local = to_local(point, self.position, self.rotation);
        let half = self.size * 0.5;
        match &self.data {
            ShapeData::Arrow { .. } => {
                local.x.abs() <= half.x + tolerance && local.y.abs() <= half.y + tolerance
            }
            ShapeData::Circle => circle::ellipse_contains(local, half, tolerance),
            ShapeData::Rectangle | ShapeData::Cloud { .. } | ShapeData::Text(_) => {
                local.x.abs() <= half.x + tolerance && local.y.abs() <= half.y + tolerance
            }
            ShapeData::Freehand(path) => {
                let reach = self.style.stroke_width() * 0.5 + tolerance;
                path.distance_to(local, self.size) <= reach
            }
        }
    }

    /// Recompute state derived from size and style (cloud outline, wrapped lines).
    fn refresh_derived(&mut self) {
        let stroke = self.style.stroke_width();
        let font_size = self.style.font_size();
        let size = self.size;
        match &mut self.data {
            ShapeData::Cloud { outline } => *outline = cloud_outline(size, stroke),
            ShapeData::Text(body) => body.lines = wrap_text(&body.text, size.x, font_size),
            _ => {}
        }
    }
}
