//! Markups: a 2D annotation engine.
//!
//! Shapes (arrows, circles, rectangles, clouds, freehand strokes and text
//! labels) live in a markup plane anchored to the scene and are drawn over a
//! camera-driven viewport. The engine handles creation, selection, the
//! move/resize/rotate edit frame, undo/redo, a clipboard, and a portable SVG
//! serialization that can be loaded back as read-only layers.
//!
//! [`engine::MarkupsCore`] is the entry point. [`plugin::MarkupsPlugin`] hosts it
//! inside a Bevy app.

pub mod clipboard;
pub mod config;
pub mod constants;
pub mod edit_frame;
pub mod edit_mode;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod input;
pub mod paths;
pub mod plugin;
pub mod shapes;
pub mod surface;
pub mod theme;

pub use config::{ConfigPlugin, MarkupsConfig};
pub use engine::MarkupsCore;
pub use plugin::MarkupsPlugin;
