//! Bevy host for the markups engine.
//!
//! [`MarkupsPlugin`] owns a [`MarkupsCore`] resource and wires it into a Bevy
//! app: window input becomes engine pointer and key events, the 2D camera is
//! snapshotted into the engine each frame, and the engine paints itself through
//! gizmos with label text drawn by egui.
//!
//! ## Module Structure
//!
//! - [`camera`] - Camera spawn, pan/zoom navigation and camera snapshots
//! - [`input`] - Mouse, touch, shortcut and text input
//! - [`gizmo`] - Gizmo-backed raster context
//! - [`ui`] - Toolbar, style bar and label text

pub mod camera;
pub mod gizmo;
pub mod input;
mod ui;

pub use camera::{MarkupsCamera, camera_state};
pub use gizmo::{CanvasLabel, GizmoCanvas, LineStrip, MarkupGizmoGroup, PathRecorder};

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::{ConfigLoaded, MarkupsConfig};
use crate::engine::MarkupsCore;

/// Label text the engine painted this frame, in client pixels
#[derive(Resource, Default)]
pub struct CanvasLabels(pub Vec<CanvasLabel>);

/// Push the loaded or edited config into the engine
fn apply_config(config: Res<MarkupsConfig>, mut core: ResMut<MarkupsCore>) {
    if *core.config() != *config {
        core.set_config(config.clone());
    }
}

fn enter_edit_mode(mut core: ResMut<MarkupsCore>) {
    core.enter_edit_mode();
}

pub struct MarkupsPlugin;

impl Plugin for MarkupsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(MarkupsCore::with_svg_scene(MarkupsConfig::default()))
            .init_resource::<CanvasLabels>()
            .init_gizmo_group::<MarkupGizmoGroup>()
            .add_systems(
                Startup,
                (
                    camera::spawn_camera,
                    gizmo::configure_markup_gizmos,
                    (apply_config, enter_edit_mode).chain().after(ConfigLoaded),
                ),
            )
            .add_systems(
                Update,
                (
                    camera::update_navigation_mode,
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::apply_camera_zoom,
                    camera::sync_camera,
                    apply_config.run_if(resource_changed::<MarkupsConfig>),
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    input::handle_shortcuts,
                    input::handle_text_input,
                    input::handle_mouse_input,
                    input::handle_touch_input,
                    input::update_cursor_icon,
                    gizmo::draw_markups,
                )
                    .chain()
                    .after(camera::sync_camera),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    ui::toolbar_ui,
                    ui::style_settings_ui,
                    ui::render_labels,
                    ui::config_reset_ui,
                ),
            );
    }
}
