//! Centralized color theme.
//!
//! Colors for the edit frame overlay and the demo host's toolbar. Modify values
//! here to change the look of the manipulator.

use bevy::prelude::Color;
use bevy_egui::egui;

// ============================================================================
// Edit Frame Colors
// ============================================================================

/// Light blue for the frame outline and handle borders
pub const FRAME_COLOR: Color = Color::srgb(0.2, 0.6, 1.0);

/// White handle fill
pub const HANDLE_FILL: Color = Color::srgb(1.0, 1.0, 1.0);

// ============================================================================
// Markup Colors
// ============================================================================

/// Stroke color palette for the toolbar picker, as style hex values
pub fn markup_colors() -> [(&'static str, &'static str, egui::Color32); 8] {
    [
        ("#ff0000", "Red", egui::Color32::RED),
        ("#0000ff", "Blue", egui::Color32::BLUE),
        ("#00cc00", "Green", egui::Color32::from_rgb(0, 204, 0)),
        ("#ffff00", "Yellow", egui::Color32::YELLOW),
        ("#000000", "Black", egui::Color32::BLACK),
        ("#ffffff", "White", egui::Color32::WHITE),
        ("#ff8000", "Orange", egui::Color32::from_rgb(255, 128, 0)),
        ("#800080", "Purple", egui::Color32::from_rgb(128, 0, 128)),
    ]
}

// ============================================================================
// UI Colors (egui)
// ============================================================================

pub mod ui {
    use bevy_egui::egui;

    /// Dark grey panel background (tool settings bar)
    pub const PANEL_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(45, 45, 48);

    /// Light grey for label text
    pub const LABEL_TEXT: egui::Color32 = egui::Color32::LIGHT_GRAY;

    /// Grey for help/hint text
    pub const HINT_TEXT: egui::Color32 = egui::Color32::GRAY;

    /// White for selected button borders
    pub const SELECTED_BORDER: egui::Color32 = egui::Color32::WHITE;

    /// Dark grey for unselected button borders
    pub const UNSELECTED_BORDER: egui::Color32 = egui::Color32::DARK_GRAY;
}

// ============================================================================
// Color Conversion Utilities
// ============================================================================

/// `#rrggbb` form of a color, for SVG attributes
pub fn hex(color: Color) -> String {
    let srgba = color.to_srgba();
    format!(
        "#{:02x}{:02x}{:02x}",
        (srgba.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (srgba.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (srgba.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Convert a Bevy Color to egui Color32 (preserving alpha)
pub fn bevy_to_egui(color: Color) -> egui::Color32 {
    let srgba = color.to_srgba();
    egui::Color32::from_rgba_unmultiplied(
        (srgba.red * 255.0) as u8,
        (srgba.green * 255.0) as u8,
        (srgba.blue * 255.0) as u8,
        (srgba.alpha * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_formats_frame_color() {
        assert_eq!(hex(FRAME_COLOR), "#3399ff");
        assert_eq!(hex(HANDLE_FILL), "#ffffff");
    }

    #[test]
    fn test_palette_entries_parse_as_style_colors() {
        for (value, _, _) in markup_colors() {
            assert!(bevy::color::Srgba::hex(value).is_ok(), "{value}");
        }
    }
}
