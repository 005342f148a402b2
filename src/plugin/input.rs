use bevy::input::ButtonState;
use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::touch::{Touch, Touches};
use bevy::prelude::*;
use bevy::window::{CursorIcon, CursorMoved, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use crate::engine::MarkupsCore;
use crate::input::{KeyInput, Modifiers, PointerPhase, TouchPoint};
use crate::shapes::MarkupKind;

/// Layer id used for the exported file when it is loaded back
pub const SAVED_LAYER_ID: &str = "saved";

/// Check if cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}

fn wants_keyboard(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false)
}

fn modifiers(keyboard: &ButtonInput<KeyCode>) -> Modifiers {
    Modifiers {
        shift: keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        ctrl: keyboard.any_pressed([
            KeyCode::ControlLeft,
            KeyCode::ControlRight,
            KeyCode::SuperLeft,
            KeyCode::SuperRight,
        ]),
    }
}

/// Tool shortcut for each shape kind.
pub fn kind_shortcut(kind: MarkupKind) -> KeyCode {
    match kind {
        MarkupKind::Arrow => KeyCode::KeyA,
        MarkupKind::Circle => KeyCode::KeyC,
        MarkupKind::Rectangle => KeyCode::KeyR,
        MarkupKind::Cloud => KeyCode::KeyK,
        MarkupKind::Freehand => KeyCode::KeyF,
        MarkupKind::Text => KeyCode::KeyT,
    }
}

pub fn shortcut_label(kind: MarkupKind) -> &'static str {
    match kind_shortcut(kind) {
        KeyCode::KeyA => "A",
        KeyCode::KeyC => "C",
        KeyCode::KeyR => "R",
        KeyCode::KeyK => "K",
        KeyCode::KeyF => "F",
        KeyCode::KeyT => "T",
        _ => "",
    }
}

/// Feed the primary mouse button and cursor movement to the engine.
pub fn handle_mouse_input(
    mut core: ResMut<MarkupsCore>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut cursor_moved: MessageReader<CursorMoved>,
    mut contexts: EguiContexts,
) {
    let moved = cursor_moved.read().last().is_some();
    let Ok(window) = window_query.single() else {
        return;
    };
    let Some(position) = window.cursor_position() else {
        return;
    };
    let mods = modifiers(&keyboard);

    if mouse_button.just_pressed(MouseButton::Left) {
        if is_cursor_over_ui(&mut contexts) {
            return;
        }
        core.handle_mouse(PointerPhase::Down, position, mods);
    }
    if moved {
        core.handle_mouse(PointerPhase::Move, position, mods);
    }
    if mouse_button.just_released(MouseButton::Left) {
        core.handle_mouse(PointerPhase::Up, position, mods);
    }
}

/// Feed touch contacts to the engine. The engine follows the first finger.
pub fn handle_touch_input(
    mut core: ResMut<MarkupsCore>,
    touches: Res<Touches>,
    keyboard: Res<ButtonInput<KeyCode>>,
) {
    let mods = modifiers(&keyboard);
    let point = |touch: &Touch| TouchPoint {
        id: touch.id(),
        position: touch.position(),
    };

    let pressed: Vec<TouchPoint> = touches.iter_just_pressed().map(point).collect();
    if !pressed.is_empty() {
        core.handle_touch(PointerPhase::Down, &pressed, mods);
    }
    let moved: Vec<TouchPoint> = touches
        .iter()
        .filter(|t| t.delta() != Vec2::ZERO)
        .map(point)
        .collect();
    if !moved.is_empty() {
        core.handle_touch(PointerPhase::Move, &moved, mods);
    }
    let released: Vec<TouchPoint> = touches
        .iter_just_released()
        .chain(touches.iter_just_canceled())
        .map(point)
        .collect();
    if !released.is_empty() {
        core.handle_touch(PointerPhase::Up, &released, mods);
    }
}

/// Editing shortcuts. Letters type into a selected label instead of switching
/// tools.
pub fn handle_shortcuts(
    mut core: ResMut<MarkupsCore>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
) {
    if wants_keyboard(&mut contexts) {
        return;
    }
    let mods = modifiers(&keyboard);

    if mods.ctrl {
        if keyboard.just_pressed(KeyCode::KeyZ) {
            if mods.shift {
                core.redo();
            } else {
                core.undo();
            }
        } else if keyboard.just_pressed(KeyCode::KeyY) {
            core.redo();
        } else if keyboard.just_pressed(KeyCode::KeyC) {
            core.copy();
        } else if keyboard.just_pressed(KeyCode::KeyX) {
            core.cut();
        } else if keyboard.just_pressed(KeyCode::KeyV) {
            core.paste();
        } else if keyboard.just_pressed(KeyCode::KeyS) {
            save_markups(&mut core);
        } else if keyboard.just_pressed(KeyCode::KeyO) {
            load_saved_markups(&mut core);
        }
        return;
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        core.handle_key(KeyInput::Escape);
    }
    if keyboard.just_pressed(KeyCode::Delete) {
        core.handle_key(KeyInput::Delete);
    }
    if keyboard.just_pressed(KeyCode::Backspace) {
        core.handle_key(KeyInput::Backspace);
    }

    if core.selected_kind() == Some(MarkupKind::Text) {
        return;
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        if core.is_editing() {
            core.leave_edit_mode();
        } else {
            core.enter_edit_mode();
        }
    }
    if keyboard.just_pressed(KeyCode::KeyH) {
        if core.is_visible() {
            core.hide();
        } else {
            core.show();
        }
    }
    if core.is_editing()
        && let Some(kind) = MarkupKind::ALL
            .into_iter()
            .find(|kind| keyboard.just_pressed(kind_shortcut(*kind)))
    {
        core.change_edit_mode(kind);
    }
}

/// Characters typed while a label is selected.
pub fn handle_text_input(
    mut core: ResMut<MarkupsCore>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut key_events: MessageReader<KeyboardInput>,
    mut contexts: EguiContexts,
) {
    let typing = core.selected_kind() == Some(MarkupKind::Text)
        && !modifiers(&keyboard).ctrl
        && !wants_keyboard(&mut contexts);
    if !typing {
        key_events.clear();
        return;
    }
    for event in key_events.read() {
        if event.state != ButtonState::Pressed {
            continue;
        }
        let typed = match &event.logical_key {
            Key::Character(text) => text.to_string(),
            Key::Space => " ".to_string(),
            _ => continue,
        };
        core.handle_key(KeyInput::Text(typed));
    }
}

pub fn update_cursor_icon(
    core: Res<MarkupsCore>,
    window_query: Query<Entity, With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok(entity) = window_query.single() else {
        return;
    };

    let icon = if is_cursor_over_ui(&mut contexts) {
        CursorIcon::System(SystemCursorIcon::Default)
    } else if core.is_navigating() {
        CursorIcon::System(SystemCursorIcon::Grab)
    } else if let Some(icon) = core.cursor_icon() {
        icon
    } else if core.is_editing() {
        CursorIcon::System(SystemCursorIcon::Crosshair)
    } else {
        CursorIcon::System(SystemCursorIcon::Default)
    };
    commands.entity(entity).insert(icon);
}

fn save_markups(core: &mut MarkupsCore) {
    let path = crate::paths::export_file();
    if let Err(e) = crate::paths::ensure_directories() {
        warn!("Failed to create data directories: {}", e);
    }
    match std::fs::write(&path, core.generate_data()) {
        Ok(()) => info!("Saved markups to {:?}", path),
        Err(e) => error!("Failed to save markups to {:?}: {}", path, e),
    }
}

fn load_saved_markups(core: &mut MarkupsCore) {
    let path = crate::paths::export_file();
    match std::fs::read_to_string(&path) {
        Ok(data) => {
            if core.load_markups(&data, SAVED_LAYER_ID) {
                info!("Loaded saved markups from {:?}", path);
            }
        }
        Err(e) => warn!("Could not read saved markups {:?}: {}", path, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_distinct_shortcut() {
        let mut keys: Vec<&str> = MarkupKind::ALL.into_iter().map(shortcut_label).collect();
        assert!(keys.iter().all(|k| !k.is_empty()));
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), MarkupKind::ALL.len());
    }

    #[test]
    fn test_modifiers_from_keyboard() {
        let mut keyboard = ButtonInput::<KeyCode>::default();
        assert_eq!(modifiers(&keyboard), Modifiers::NONE);
        keyboard.press(KeyCode::ShiftRight);
        keyboard.press(KeyCode::ControlLeft);
        assert_eq!(modifiers(&keyboard), Modifiers { shift: true, ctrl: true });
    }
}
