//! Per-kind style dictionaries.

use bevy::color::{Alpha, Color, Srgba};
use serde::{Deserialize, Serialize};

use super::MarkupKind;

pub const STROKE_WIDTH: &str = "stroke-width";
pub const STROKE_COLOR: &str = "stroke-color";
pub const STROKE_OPACITY: &str = "stroke-opacity";
pub const FILL_COLOR: &str = "fill-color";
pub const FILL_OPACITY: &str = "fill-opacity";
pub const FONT_SIZE: &str = "font-size";
pub const FONT_FAMILY: &str = "font-family";
pub const FONT_STYLE: &str = "font-style";
pub const FONT_WEIGHT: &str = "font-weight";

const LINE_KEYS: &[&str] = &[STROKE_WIDTH, STROKE_COLOR, STROKE_OPACITY];
const AREA_KEYS: &[&str] = &[
    STROKE_WIDTH,
    STROKE_COLOR,
    STROKE_OPACITY,
    FILL_COLOR,
    FILL_OPACITY,
];
const TEXT_KEYS: &[&str] = &[
    FONT_SIZE,
    FONT_FAMILY,
    FONT_STYLE,
    FONT_WEIGHT,
    STROKE_COLOR,
    FILL_COLOR,
    FILL_OPACITY,
];

/// Style attributes that apply to a shape kind, in display order.
pub fn style_keys(kind: MarkupKind) -> &'static [&'static str] {
    match kind {
        MarkupKind::Arrow | MarkupKind::Freehand => LINE_KEYS,
        MarkupKind::Circle | MarkupKind::Rectangle | MarkupKind::Cloud => AREA_KEYS,
        MarkupKind::Text => TEXT_KEYS,
    }
}

/// Flat, ordered `attribute → value` dictionary with a key set fixed per kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    entries: Vec<(String, String)>,
}

impl Style {
    /// Default style for a kind. Widths and font sizes are in markup units.
    pub fn defaults(kind: MarkupKind, stroke_width: f32, font_size: f32) -> Self {
        let entries = style_keys(kind)
            .iter()
            .map(|key| {
                let value = match *key {
                    STROKE_WIDTH => format!("{}", stroke_width),
                    STROKE_COLOR if kind == MarkupKind::Text => "#000000".to_string(),
                    STROKE_COLOR => "#ff0000".to_string(),
                    STROKE_OPACITY => "1".to_string(),
                    FILL_COLOR if kind == MarkupKind::Text => "#ff0000".to_string(),
                    FILL_COLOR => "#ff0000".to_string(),
                    FILL_OPACITY if kind == MarkupKind::Text => "1".to_string(),
                    FILL_OPACITY => "0".to_string(),
                    FONT_SIZE => format!("{}", font_size),
                    FONT_FAMILY => "Arial".to_string(),
                    FONT_STYLE | FONT_WEIGHT => "normal".to_string(),
                    _ => String::new(),
                };
                (key.to_string(), value)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an existing attribute. Keys outside this style's key set are ignored
    /// and `false` is returned.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => {
                *v = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Copy every attribute of `other` this style also carries.
    pub fn merge_from(&mut self, other: &Style) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn number(&self, key: &str) -> Option<f32> {
        self.get(key)?.trim().parse().ok().filter(|v: &f32| v.is_finite())
    }

    pub fn stroke_width(&self) -> f32 {
        self.number(STROKE_WIDTH).unwrap_or(0.0).max(0.0)
    }

    pub fn font_size(&self) -> f32 {
        self.number(FONT_SIZE).unwrap_or(1.0).max(0.0)
    }

    pub fn stroke_opacity(&self) -> f32 {
        self.number(STROKE_OPACITY).unwrap_or(1.0).clamp(0.0, 1.0)
    }

    pub fn fill_opacity(&self) -> f32 {
        self.number(FILL_OPACITY).unwrap_or(0.0).clamp(0.0, 1.0)
    }

    pub fn stroke_color(&self) -> Color {
        parse_color(self.get(STROKE_COLOR), self.stroke_opacity())
    }

    pub fn fill_color(&self) -> Color {
        parse_color(self.get(FILL_COLOR), self.fill_opacity())
    }

    /// True when the fill is visible at all.
    pub fn has_fill(&self) -> bool {
        self.get(FILL_COLOR).is_some() && self.fill_opacity() > 0.0
    }
}

/// Parse a `#rrggbb` color and apply an opacity, falling back to red.
pub fn parse_color(hex: Option<&str>, opacity: f32) -> Color {
    let srgba = hex
        .and_then(|h| Srgba::hex(h.trim()).ok())
        .unwrap_or(Srgba::RED);
    Color::from(srgba).with_alpha(opacity)
}
