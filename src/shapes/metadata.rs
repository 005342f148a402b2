//! Serialization fragment for a shape.
//!
//! Every serialized shape carries a `<markup_element>` holding its exact state:
//! `type`, `position`, `size`, `rotation`, one attribute per style key, and the
//! kind extras (`tail`/`head` for arrows, `points`/`frozen-size` for freehand,
//! character data for text). Numbers use the shortest exact representation so a
//! load restores bit-identical values.

use bevy::math::Vec2;
use thiserror::Error;

use super::render::fmt_num;
use super::style::style_keys;
use super::{
    ArrowGeometry, FreehandGeometry, FreehandPath, Markup, MarkupId, MarkupKind, ShapeData, Style,
};
use crate::surface::{NodeId, VectorSurface, XmlElement};

pub const METADATA_TAG: &str = "metadata";
pub const ELEMENT_TAG: &str = "markup_element";

#[derive(Debug, Error, PartialEq)]
pub enum MetadataError {
    #[error("markup element is missing attribute `{0}`")]
    MissingAttribute(&'static str),
    #[error("attribute `{attr}` has invalid value {value:?}")]
    InvalidValue { attr: &'static str, value: String },
    #[error("unknown markup type {0:?}")]
    UnknownKind(String),
    #[error("shape group has no markup metadata")]
    MissingElement,
}

/// Attributes and text of a `<markup_element>`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkupMetadata {
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
}

impl MarkupMetadata {
    /// Write this fragment as `<metadata><markup_element/></metadata>` under `parent`.
    /// Returns the `<metadata>` node so the caller can remove it again.
    pub fn inject(&self, surface: &mut dyn VectorSurface, parent: NodeId) -> NodeId {
        let metadata = surface.create_node(METADATA_TAG);
        let element = surface.create_node(ELEMENT_TAG);
        for (name, value) in &self.attributes {
            surface.set_attribute(element, name, value);
        }
        if let Some(text) = &self.text {
            surface.set_text(element, text);
        }
        surface.append_child(metadata, element);
        surface.append_child(parent, metadata);
        metadata
    }
}

fn fmt_vec(v: Vec2) -> String {
    format!("{} {}", fmt_num(v.x), fmt_num(v.y))
}

fn parse_f32(attr: &'static str, value: &str) -> Result<f32, MetadataError> {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MetadataError::InvalidValue {
            attr,
            value: value.to_string(),
        })
}

fn parse_vec(attr: &'static str, value: &str) -> Result<Vec2, MetadataError> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(x), Some(y), None) => Ok(Vec2::new(parse_f32(attr, x)?, parse_f32(attr, y)?)),
        _ => Err(MetadataError::InvalidValue {
            attr,
            value: value.to_string(),
        }),
    }
}

fn parse_points(attr: &'static str, value: &str) -> Result<Vec<Vec2>, MetadataError> {
    value
        .split_whitespace()
        .map(|pair| {
            let (x, y) = pair.split_once(',').ok_or_else(|| MetadataError::InvalidValue {
                attr,
                value: pair.to_string(),
            })?;
            Ok(Vec2::new(parse_f32(attr, x)?, parse_f32(attr, y)?))
        })
        .collect()
}

fn required<'a>(element: &'a XmlElement, attr: &'static str) -> Result<&'a str, MetadataError> {
    element.attr(attr).ok_or(MetadataError::MissingAttribute(attr))
}

impl Markup {
    /// The serialization fragment describing this shape.
    pub fn metadata(&self) -> MarkupMetadata {
        let mut attributes = vec![
            ("type".to_string(), self.kind().type_name().to_string()),
            ("position".to_string(), fmt_vec(self.position)),
            ("size".to_string(), fmt_vec(self.size)),
            ("rotation".to_string(), fmt_num(self.rotation)),
        ];
        attributes.extend(self.style.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let mut text = None;
        match &self.data {
            ShapeData::Arrow { tail, head } => {
                attributes.push(("tail".to_string(), fmt_vec(*tail)));
                attributes.push(("head".to_string(), fmt_vec(*head)));
            }
            ShapeData::Freehand(path) => {
                let points = path
                    .points
                    .iter()
                    .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
                    .collect::<Vec<_>>()
                    .join(" ");
                attributes.push(("points".to_string(), points));
                attributes.push(("frozen-size".to_string(), fmt_vec(path.frozen_size)));
            }
            ShapeData::Text(body) => text = Some(body.text.clone()),
            ShapeData::Circle | ShapeData::Rectangle | ShapeData::Cloud { .. } => {}
        }
        MarkupMetadata { attributes, text }
    }

    /// Rebuild a shape from a parsed `<markup_element>`.
    pub fn from_metadata(id: MarkupId, element: &XmlElement) -> Result<Markup, MetadataError> {
        let type_name = required(element, "type")?;
        let kind = MarkupKind::from_type_name(type_name)
            .ok_or_else(|| MetadataError::UnknownKind(type_name.to_string()))?;
        let position = parse_vec("position", required(element, "position")?)?;
        let size = parse_vec("size", required(element, "size")?)?;
        let rotation = parse_f32("rotation", required(element, "rotation")?)?;

        let mut style = Style::defaults(kind, 1.0, 1.0);
        for key in style_keys(kind) {
            if let Some(value) = element.attr(key) {
                style.set(key, value);
            }
        }

        let mut markup = Markup::new(kind, id, style);
        match kind {
            MarkupKind::Arrow => {
                let tail = parse_vec("tail", required(element, "tail")?)?;
                let head = parse_vec("head", required(element, "head")?)?;
                markup.restore_arrow(&ArrowGeometry {
                    tail,
                    head,
                    position,
                    size,
                    rotation,
                });
            }
            MarkupKind::Freehand => {
                let points = parse_points("points", required(element, "points")?)?;
                let frozen_size = parse_vec("frozen-size", required(element, "frozen-size")?)?;
                markup.restore_freehand(&FreehandGeometry {
                    position,
                    size,
                    rotation,
                    path: FreehandPath {
                        points,
                        frozen_size,
                    },
                });
            }
            MarkupKind::Text => {
                markup.set_text(&element.text());
                markup.set_size(position, size.x, size.y);
                markup.set_rotation(rotation);
            }
            MarkupKind::Circle | MarkupKind::Rectangle | MarkupKind::Cloud => {
                markup.set_size(position, size.x, size.y);
                markup.set_rotation(rotation);
            }
        }
        Ok(markup)
    }
}
