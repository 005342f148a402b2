//! Pointer and keyboard input, normalized for the engine.
//!
//! Mouse and touch both become [`PointerEvent`]s in client pixels. Touch only
//! follows the first finger down; additional fingers are left to the host for
//! navigation gestures.

use bevy::math::Vec2;

/// Stage of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Modifier keys held during a pointer event. Shift drives axis lock, aspect
/// lock and rotation snap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    /// Client pixels, origin top-left, y down
    pub position: Vec2,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, position: Vec2, modifiers: Modifiers) -> Self {
        Self {
            phase,
            position,
            modifiers,
        }
    }

    pub fn down(position: Vec2) -> Self {
        Self::new(PointerPhase::Down, position, Modifiers::NONE)
    }

    pub fn moved(position: Vec2) -> Self {
        Self::new(PointerPhase::Move, position, Modifiers::NONE)
    }

    pub fn up(position: Vec2) -> Self {
        Self::new(PointerPhase::Up, position, Modifiers::NONE)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// One active touch contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Vec2,
}

/// Keyboard input the engine reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Escape,
    Delete,
    Backspace,
    /// Characters typed while a label is selected
    Text(String),
}

/// What the engine did with a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerResponse {
    /// Not consumed; the host should use it (camera navigation, edit mode off)
    Passthrough,
    /// Consumed by the edit frame, a selection change or an edit mode
    Handled,
    /// Consumed but nothing happened
    Ignored,
}

impl PointerResponse {
    pub fn is_consumed(self) -> bool {
        self != PointerResponse::Passthrough
    }
}

/// Tracks which touch contact drives the pointer.
#[derive(Debug, Clone, Default)]
pub struct InputHandler {
    active_touch: Option<u64>,
    pressed: bool,
    last_position: Option<Vec2>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True between a down and its matching up.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn last_position(&self) -> Option<Vec2> {
        self.last_position
    }

    /// Normalize a mouse event. Moves with no button held still pass through,
    /// so the engine can update hover state.
    pub fn mouse(&mut self, phase: PointerPhase, position: Vec2, modifiers: Modifiers) -> PointerEvent {
        match phase {
            PointerPhase::Down => self.pressed = true,
            PointerPhase::Up => self.pressed = false,
            PointerPhase::Move => {}
        }
        self.last_position = Some(position);
        PointerEvent::new(phase, position, modifiers)
    }

    /// Normalize a touch event. `touches` are the contacts that changed in this
    /// phase; only the first finger down produces pointer events.
    pub fn touch(
        &mut self,
        phase: PointerPhase,
        touches: &[TouchPoint],
        modifiers: Modifiers,
    ) -> Option<PointerEvent> {
        let touch = match (phase, self.active_touch) {
            (PointerPhase::Down, None) => {
                let first = touches.first()?;
                self.active_touch = Some(first.id);
                self.pressed = true;
                first
            }
            (PointerPhase::Down, Some(_)) => return None,
            (_, Some(active)) => touches.iter().find(|t| t.id == active)?,
            (_, None) => return None,
        };
        if phase == PointerPhase::Up {
            self.active_touch = None;
            self.pressed = false;
        }
        self.last_position = Some(touch.position);
        Some(PointerEvent::new(phase, touch.position, modifiers))
    }

    /// Forget any gesture in progress.
    pub fn reset(&mut self) {
        self.active_touch = None;
        self.pressed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(id: u64, x: f32, y: f32) -> TouchPoint {
        TouchPoint {
            id,
            position: Vec2::new(x, y),
        }
    }

    #[test]
    fn test_mouse_tracks_pressed_state() {
        let mut input = InputHandler::new();
        let event = input.mouse(PointerPhase::Down, Vec2::new(3.0, 4.0), Modifiers::SHIFT);
        assert!(input.is_pressed());
        assert!(event.modifiers.shift);

        input.mouse(PointerPhase::Up, Vec2::new(5.0, 4.0), Modifiers::NONE);
        assert!(!input.is_pressed());
        assert_eq!(input.last_position(), Some(Vec2::new(5.0, 4.0)));
    }

    #[test]
    fn test_touch_follows_first_finger_only() {
        let mut input = InputHandler::new();
        let down = input
            .touch(PointerPhase::Down, &[touch(1, 10.0, 10.0)], Modifiers::NONE)
            .unwrap();
        assert_eq!(down.position, Vec2::new(10.0, 10.0));

        // A second finger does not start another gesture.
        assert!(input
            .touch(PointerPhase::Down, &[touch(2, 50.0, 50.0)], Modifiers::NONE)
            .is_none());
        assert!(input
            .touch(PointerPhase::Move, &[touch(2, 60.0, 60.0)], Modifiers::NONE)
            .is_none());

        let moved = input
            .touch(
                PointerPhase::Move,
                &[touch(2, 61.0, 61.0), touch(1, 20.0, 15.0)],
                Modifiers::NONE,
            )
            .unwrap();
        assert_eq!(moved.phase, PointerPhase::Move);
        assert_eq!(moved.position, Vec2::new(20.0, 15.0));

        let up = input
            .touch(PointerPhase::Up, &[touch(1, 22.0, 15.0)], Modifiers::NONE)
            .unwrap();
        assert_eq!(up.phase, PointerPhase::Up);
        assert!(!input.is_pressed());
    }

    #[test]
    fn test_touch_without_contacts_is_ignored() {
        let mut input = InputHandler::new();
        assert!(input.touch(PointerPhase::Down, &[], Modifiers::NONE).is_none());
        assert!(input.touch(PointerPhase::Move, &[touch(1, 0.0, 0.0)], Modifiers::NONE).is_none());
    }

    #[test]
    fn test_passthrough_is_not_consumed() {
        assert!(!PointerResponse::Passthrough.is_consumed());
        assert!(PointerResponse::Handled.is_consumed());
        assert!(PointerResponse::Ignored.is_consumed());
    }
}
