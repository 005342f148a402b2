use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::engine::MarkupsCore;
use crate::geometry::CameraState;
use crate::shapes::MarkupKind;

#[derive(Component)]
pub struct MarkupsCamera;

#[derive(Component)]
pub struct CameraZoom {
    pub scale: f32,
}

impl Default for CameraZoom {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        MarkupsCamera,
        CameraZoom::default(),
        Transform::from_translation(Vec3::new(0.0, 0.0, 1000.0)),
    ));
}

/// Middle mouse or a held space bar puts the engine in navigation mode, so
/// pointer input reaches the camera instead of the markups. Space types into a
/// selected label instead.
pub fn update_navigation_mode(
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut core: ResMut<MarkupsCore>,
) {
    let space = keyboard.pressed(KeyCode::Space) && core.selected_kind() != Some(MarkupKind::Text);
    let navigating = mouse_button.pressed(MouseButton::Middle) || space;
    if navigating != core.is_navigating() {
        core.set_navigation_mode(navigating);
    }
}

pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    core: Res<MarkupsCore>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut camera_query: Query<(&mut Transform, &CameraZoom), With<MarkupsCamera>>,
) {
    let dragging = mouse_button.pressed(MouseButton::Middle)
        || (core.is_navigating() && mouse_button.pressed(MouseButton::Left));
    if !dragging {
        mouse_motion.clear();
        return;
    }

    let Ok((mut transform, zoom)) = camera_query.single_mut() else {
        return;
    };

    for event in mouse_motion.read() {
        let delta = event.delta * zoom.scale;
        transform.translation.x -= delta.x;
        transform.translation.y += delta.y;
    }
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut CameraZoom, With<MarkupsCamera>>,
) {
    let Ok(mut zoom) = camera_query.single_mut() else {
        return;
    };

    for event in scroll_events.read() {
        let scroll_amount = match event.unit {
            MouseScrollUnit::Line => event.y * 0.1,
            MouseScrollUnit::Pixel => event.y * 0.001,
        };

        zoom.scale = (zoom.scale - scroll_amount).clamp(0.1, 10.0);
    }
}

pub fn apply_camera_zoom(
    mut camera_query: Query<(&CameraZoom, &mut Projection), (With<MarkupsCamera>, Changed<CameraZoom>)>,
) {
    for (zoom, mut projection) in camera_query.iter_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = zoom.scale;
        }
    }
}

/// Snapshot of a Bevy camera in the form the engine maps with.
pub fn camera_state(camera: &Camera, transform: &GlobalTransform) -> Option<CameraState> {
    Some(CameraState {
        view_from_world: Mat4::from(transform.affine().inverse()),
        clip_from_view: camera.clip_from_view(),
        viewport: camera.logical_viewport_size()?,
    })
}

/// Hand the engine a fresh camera snapshot whenever the camera moves or the
/// window resizes.
pub fn sync_camera(
    camera_query: Query<(&Camera, &GlobalTransform), With<MarkupsCamera>>,
    mut core: ResMut<MarkupsCore>,
) {
    let Ok((camera, transform)) = camera_query.single() else {
        return;
    };
    let Some(state) = camera_state(camera, transform) else {
        return;
    };
    if state != *core.camera() {
        core.set_camera(state);
    }
}
