//! Centralized constants used across the engine.
//!
//! Thresholds that a host may want to tune live in [`crate::config::MarkupsConfig`];
//! the values here are their defaults and the fixed geometry of the shapes.

/// Default window width in pixels for the demo host
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels for the demo host
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Maximum number of action groups kept on the undo stack
pub const DEFAULT_HISTORY_SIZE: usize = 50;

/// Minimum client-space diagonal (pixels) a freshly created shape must reach.
/// Zero disables the check.
pub const DEFAULT_MIN_CREATE_SIZE_PX: f32 = 9.0;

/// Cursor travel (pixels) before a shift-constrained move commits to an axis
pub const DEFAULT_AXIS_LOCK_DEAD_ZONE_PX: f32 = 15.0;

/// Rotation snap increment in degrees when shift is held
pub const DEFAULT_ROTATION_SNAP_DEGREES: f32 = 22.5;

/// Screen-space offset applied to each successive paste
pub const DEFAULT_PASTE_OFFSET_PX: f32 = 20.0;

/// Resize handle edge length in pixels
pub const DEFAULT_HANDLE_SIZE_PX: f32 = 8.0;

/// Distance from the top edge of the frame to the rotation handle in pixels
pub const DEFAULT_ROTATION_HANDLE_OFFSET_PX: f32 = 25.0;

/// Stroke width of new shapes, in screen pixels
pub const DEFAULT_STROKE_WIDTH_PX: f32 = 3.0;

/// Font size of new text labels, in screen pixels
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// Minimum distance between consecutive freehand samples, in screen pixels
pub const FREEHAND_MIN_SAMPLE_DISTANCE_PX: f32 = 2.0;

/// Box used for a text label when the creation drag is too small to size it
pub const DEFAULT_TEXT_BOX_PX: (f32, f32) = (200.0, 50.0);

/// Hit slop around thin shapes (arrows, freehand strokes), in screen pixels
pub const HIT_TOLERANCE_PX: f32 = 4.0;

/// Version written into the document metadata block
pub const MARKUP_DATA_VERSION: u32 = 4;
