//! Pointer and keyboard routing.
//!
//! Priority for pointer events: navigation passes through to the host, then an
//! active edit frame gesture, then the selected shape's handles, then picking a
//! shape, then the active edit mode. A click on empty surface clears the
//! selection instead of starting a new shape.

use bevy::log::debug;
use bevy::math::Vec2;

use crate::edit_frame::{DragMode, hit_test};
use crate::edit_mode::CreationOutcome;
use crate::history::EditAction;
use crate::input::{KeyInput, Modifiers, PointerEvent, PointerPhase, PointerResponse, TouchPoint};
use crate::shapes::{MarkupId, MarkupKind};

use super::{MarkupsCore, edit_context};

impl MarkupsCore {
    /// Feed a mouse event in client pixels.
    pub fn handle_mouse(
        &mut self,
        phase: PointerPhase,
        position: Vec2,
        modifiers: Modifiers,
    ) -> PointerResponse {
        let event = self.input.mouse(phase, position, modifiers);
        self.handle_pointer(event)
    }

    /// Feed a touch event. Only the first finger drives the pointer.
    pub fn handle_touch(
        &mut self,
        phase: PointerPhase,
        touches: &[TouchPoint],
        modifiers: Modifiers,
    ) -> PointerResponse {
        match self.input.touch(phase, touches, modifiers) {
            Some(event) => self.handle_pointer(event),
            None => PointerResponse::Passthrough,
        }
    }

    /// Route one normalized pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> PointerResponse {
        if !self.editing || !self.visible || self.navigation {
            return PointerResponse::Passthrough;
        }
        let response = match event.phase {
            PointerPhase::Down => self.pointer_down(event.position),
            PointerPhase::Move => self.pointer_move(event.position, event.modifiers.shift),
            PointerPhase::Up => self.pointer_up(event.position, event.modifiers.shift),
        };
        if response == PointerResponse::Handled {
            self.refresh();
        }
        response
    }

    fn pointer_down(&mut self, client: Vec2) -> PointerResponse {
        if self.frame.is_active() || self.modes.active().is_creating() {
            return PointerResponse::Ignored;
        }

        if let Some(id) = self.selected {
            let mode = self.handle_under(id, client);
            if mode != DragMode::None {
                self.frame.begin(&mut edit_context!(self), id, mode, client);
                return PointerResponse::Handled;
            }
        }

        if let Some(id) = self.shape_under(client) {
            self.apply_selection(Some(id));
            self.set_hovered(None);
            self.frame
                .begin(&mut edit_context!(self), id, DragMode::Move, client);
            return PointerResponse::Handled;
        }

        if self.selected.is_some() {
            self.apply_selection(None);
            return PointerResponse::Handled;
        }

        if self
            .modes
            .active_mut()
            .on_pointer_down(&mut edit_context!(self), client)
        {
            self.set_hovered(None);
            PointerResponse::Handled
        } else {
            PointerResponse::Ignored
        }
    }

    fn pointer_move(&mut self, client: Vec2, shift: bool) -> PointerResponse {
        if self.frame.is_active() {
            self.frame.drag(&mut edit_context!(self), client, shift);
            return PointerResponse::Handled;
        }
        if self.modes.active().is_creating() {
            self.modes
                .active_mut()
                .on_pointer_move(&mut edit_context!(self), client);
            return PointerResponse::Handled;
        }

        self.hover_mode = match self.selected {
            Some(id) => self.handle_under(id, client),
            None => DragMode::None,
        };
        let hovered = self.shape_under(client);
        if hovered.is_some() && self.hover_mode == DragMode::None {
            self.hover_mode = DragMode::Move;
        }
        if hovered != self.hovered {
            self.set_hovered(hovered);
            return PointerResponse::Handled;
        }
        PointerResponse::Ignored
    }

    fn pointer_up(&mut self, client: Vec2, shift: bool) -> PointerResponse {
        if self.frame.is_active() {
            self.frame.drag(&mut edit_context!(self), client, shift);
            self.frame.end(&mut edit_context!(self));
            return PointerResponse::Handled;
        }
        let outcome = self
            .modes
            .active_mut()
            .on_pointer_up(&mut edit_context!(self), client);
        match outcome {
            CreationOutcome::Created { id, selected } => {
                debug!("Created markup {}", id);
                if selected {
                    self.apply_selection(Some(id));
                }
                PointerResponse::Handled
            }
            CreationOutcome::Cancelled => PointerResponse::Handled,
            CreationOutcome::Idle => PointerResponse::Ignored,
        }
    }

    /// Feed a key press. Returns true when the engine used it.
    pub fn handle_key(&mut self, key: KeyInput) -> bool {
        if !self.editing {
            return false;
        }
        let handled = match key {
            KeyInput::Escape => {
                if self.frame.is_active() {
                    self.frame.cancel(&mut edit_context!(self));
                    true
                } else if self.modes.active().is_creating() {
                    self.modes.active_mut().abort(&mut edit_context!(self));
                    true
                } else if self.selected.is_some() {
                    self.apply_selection(None);
                    true
                } else {
                    false
                }
            }
            KeyInput::Delete => self.delete_selection(),
            KeyInput::Backspace => match self.selected_label() {
                Some((id, mut text)) => {
                    text.pop();
                    self.replace_label_text(id, &text)
                }
                None => self.delete_selection(),
            },
            KeyInput::Text(typed) => match self.selected_label() {
                Some((id, mut text)) => {
                    text.push_str(&typed);
                    self.replace_label_text(id, &text)
                }
                None => false,
            },
        };
        if handled {
            self.refresh();
        }
        handled
    }

    fn delete_selection(&mut self) -> bool {
        if self.frame.is_active() {
            return false;
        }
        match self.selected {
            Some(id) => self.delete_markup(id),
            None => false,
        }
    }

    fn selected_label(&self) -> Option<(MarkupId, String)> {
        let id = self.selected?;
        let markup = self.store.get(id)?;
        if markup.kind() != MarkupKind::Text {
            return None;
        }
        Some((id, markup.text().unwrap_or_default().to_string()))
    }

    fn replace_label_text(&mut self, id: MarkupId, text: &str) -> bool {
        match EditAction::set_text(&self.store, id, text) {
            Some(action) => {
                edit_context!(self).execute(action);
                true
            }
            None => false,
        }
    }

    fn handle_under(&self, id: MarkupId, client: Vec2) -> DragMode {
        match self.store.get(id) {
            Some(markup) => hit_test(&self.mapper(), markup, &self.config, client),
            None => DragMode::None,
        }
    }

    fn shape_under(&self, client: Vec2) -> Option<MarkupId> {
        let point = self.markup_point(client)?;
        self.store.hit_test(point, self.client_tolerance())
    }
}
