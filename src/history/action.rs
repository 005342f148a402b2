//! Atomic, undoable mutations of one shape.

use bevy::math::Vec2;

use crate::shapes::{ArrowGeometry, FreehandGeometry, Markup, MarkupId, MarkupStore, Style};

/// Type tag used for merging and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Create,
    Delete,
    Clone,
    SetPosition,
    SetSize,
    SetRotation,
    SetStyle,
    SetText,
    SetArrow,
    SetFreehand,
}

impl ActionType {
    pub fn name(self) -> &'static str {
        match self {
            ActionType::Create => "CREATE",
            ActionType::Delete => "DELETE",
            ActionType::Clone => "CLONE",
            ActionType::SetPosition => "SET-POSITION",
            ActionType::SetSize => "SET-SIZE",
            ActionType::SetRotation => "SET-ROTATION",
            ActionType::SetStyle => "SET-STYLE",
            ActionType::SetText => "SET-TEXT",
            ActionType::SetArrow => "SET-ARROW",
            ActionType::SetFreehand => "SET-FREEHAND",
        }
    }
}

/// Center and size of a box-shaped markup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxState {
    pub position: Vec2,
    pub size: Vec2,
}

/// Old/new snapshots for each operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Create { markup: Box<Markup> },
    Clone { markup: Box<Markup> },
    Delete { markup: Box<Markup>, index: usize },
    SetPosition { old: Vec2, new: Vec2 },
    SetSize { old: BoxState, new: BoxState },
    SetRotation { old: f32, new: f32 },
    SetStyle { old: Style, new: Style },
    SetText { old: String, new: String },
    SetArrow { old: ArrowGeometry, new: ArrowGeometry },
    SetFreehand { old: Box<FreehandGeometry>, new: Box<FreehandGeometry> },
}

/// An undoable mutation targeting one shape.
///
/// `redo` applies the new state (it is also the first execution) and `undo`
/// restores the old one. A target that no longer exists turns both into no-ops.
#[derive(Debug, Clone, PartialEq)]
pub struct EditAction {
    pub kind: ActionKind,
    pub target_id: Option<MarkupId>,
    pub add_to_history: bool,
    pub select_on_execution: bool,
}

impl EditAction {
    fn new(kind: ActionKind, target_id: MarkupId) -> Self {
        Self {
            kind,
            target_id: Some(target_id),
            add_to_history: true,
            select_on_execution: false,
        }
    }

    /// Add a new shape on top of the stack.
    pub fn create(markup: Markup) -> Self {
        let id = markup.id();
        let mut action = Self::new(
            ActionKind::Create {
                markup: Box::new(markup.clone_shape()),
            },
            id,
        );
        action.select_on_execution = true;
        action
    }

    /// Add a copy of an existing shape (already carrying its new id).
    pub fn clone_markup(markup: Markup) -> Self {
        let id = markup.id();
        let mut action = Self::new(
            ActionKind::Clone {
                markup: Box::new(markup.clone_shape()),
            },
            id,
        );
        action.select_on_execution = true;
        action
    }

    pub fn delete(store: &MarkupStore, id: MarkupId) -> Option<Self> {
        let index = store.iter().position(|m| m.id() == id)?;
        let markup = store.get(id)?.clone_shape();
        Some(Self::new(
            ActionKind::Delete {
                markup: Box::new(markup),
                index,
            },
            id,
        ))
    }

    pub fn set_position(store: &MarkupStore, id: MarkupId, position: Vec2) -> Option<Self> {
        let old = store.get(id)?.position();
        Some(Self::new(ActionKind::SetPosition { old, new: position }, id))
    }

    pub fn set_size(store: &MarkupStore, id: MarkupId, position: Vec2, size: Vec2) -> Option<Self> {
        let markup = store.get(id)?;
        let old = BoxState {
            position: markup.position(),
            size: markup.size(),
        };
        Some(Self::new(
            ActionKind::SetSize {
                old,
                new: BoxState { position, size },
            },
            id,
        ))
    }

    pub fn set_rotation(store: &MarkupStore, id: MarkupId, rotation: f32) -> Option<Self> {
        let old = store.get(id)?.rotation();
        Some(Self::new(ActionKind::SetRotation { old, new: rotation }, id))
    }

    /// Change style attributes; keys the shape does not carry are ignored.
    pub fn set_style(store: &MarkupStore, id: MarkupId, style: &Style) -> Option<Self> {
        let old = store.get(id)?.style().clone();
        let mut new = old.clone();
        new.merge_from(style);
        Some(Self::new(ActionKind::SetStyle { old, new }, id))
    }

    pub fn set_text(store: &MarkupStore, id: MarkupId, text: &str) -> Option<Self> {
        let old = store.get(id)?.text()?.to_string();
        Some(Self::new(
            ActionKind::SetText {
                old,
                new: text.to_string(),
            },
            id,
        ))
    }

    pub fn set_arrow(store: &MarkupStore, id: MarkupId, tail: Vec2, head: Vec2) -> Option<Self> {
        let markup = store.get(id)?;
        let old = markup.arrow_geometry()?;
        let mut scratch = markup.clone_shape();
        scratch.set_arrow(tail, head);
        let new = scratch.arrow_geometry()?;
        Some(Self::new(ActionKind::SetArrow { old, new }, id))
    }

    pub fn set_freehand(store: &MarkupStore, id: MarkupId, points: &[Vec2]) -> Option<Self> {
        let markup = store.get(id)?;
        let old = markup.freehand_geometry()?;
        let mut scratch = markup.clone_shape();
        scratch.set_freehand(points);
        let new = scratch.freehand_geometry()?;
        Some(Self::new(
            ActionKind::SetFreehand {
                old: Box::new(old),
                new: Box::new(new),
            },
            id,
        ))
    }

    pub fn with_history(mut self, add_to_history: bool) -> Self {
        self.add_to_history = add_to_history;
        self
    }

    pub fn with_selection(mut self, select_on_execution: bool) -> Self {
        self.select_on_execution = select_on_execution;
        self
    }

    pub fn action_type(&self) -> ActionType {
        match self.kind {
            ActionKind::Create { .. } => ActionType::Create,
            ActionKind::Clone { .. } => ActionType::Clone,
            ActionKind::Delete { .. } => ActionType::Delete,
            ActionKind::SetPosition { .. } => ActionType::SetPosition,
            ActionKind::SetSize { .. } => ActionType::SetSize,
            ActionKind::SetRotation { .. } => ActionType::SetRotation,
            ActionKind::SetStyle { .. } => ActionType::SetStyle,
            ActionKind::SetText { .. } => ActionType::SetText,
            ActionKind::SetArrow { .. } => ActionType::SetArrow,
            ActionKind::SetFreehand { .. } => ActionType::SetFreehand,
        }
    }

    /// Apply the new state.
    pub fn redo(&mut self, store: &mut MarkupStore) {
        let Some(id) = self.target_id else {
            return;
        };
        match &mut self.kind {
            ActionKind::Create { markup } | ActionKind::Clone { markup } => {
                store.insert(markup.clone_shape(), None);
            }
            ActionKind::Delete { markup, index } => {
                if let Some((removed, at)) = store.remove(id) {
                    **markup = removed;
                    *index = at;
                }
            }
            kind => {
                if let Some(target) = store.get_mut(id) {
                    apply(kind, target, true);
                }
            }
        }
    }

    /// Restore the old state.
    pub fn undo(&mut self, store: &mut MarkupStore) {
        let Some(id) = self.target_id else {
            return;
        };
        match &mut self.kind {
            ActionKind::Create { .. } | ActionKind::Clone { .. } => {
                store.remove(id);
            }
            ActionKind::Delete { markup, index } => {
                if !store.contains(id) {
                    store.insert(markup.clone_shape(), Some(*index));
                }
            }
            kind => {
                if let Some(target) = store.get_mut(id) {
                    apply(kind, target, false);
                }
            }
        }
    }

    /// Fold a newer action of the same type and target into this one, keeping
    /// this action's old state and taking the newer one's new state.
    pub fn merge(&mut self, newer: &EditAction) -> bool {
        if self.target_id != newer.target_id || self.action_type() != newer.action_type() {
            return false;
        }
        match (&mut self.kind, &newer.kind) {
            (ActionKind::SetPosition { new, .. }, ActionKind::SetPosition { new: n, .. }) => {
                *new = *n
            }
            (ActionKind::SetSize { new, .. }, ActionKind::SetSize { new: n, .. }) => *new = *n,
            (ActionKind::SetRotation { new, .. }, ActionKind::SetRotation { new: n, .. }) => {
                *new = *n
            }
            (ActionKind::SetStyle { new, .. }, ActionKind::SetStyle { new: n, .. }) => {
                *new = n.clone()
            }
            (ActionKind::SetText { new, .. }, ActionKind::SetText { new: n, .. }) => {
                *new = n.clone()
            }
            (ActionKind::SetArrow { new, .. }, ActionKind::SetArrow { new: n, .. }) => *new = *n,
            (ActionKind::SetFreehand { new, .. }, ActionKind::SetFreehand { new: n, .. }) => {
                *new = n.clone()
            }
            _ => return false,
        }
        true
    }

    /// True when applying the action changes nothing.
    pub fn is_identity(&self) -> bool {
        match &self.kind {
            ActionKind::Create { .. } | ActionKind::Clone { .. } | ActionKind::Delete { .. } => {
                false
            }
            ActionKind::SetPosition { old, new } => old == new,
            ActionKind::SetSize { old, new } => old == new,
            ActionKind::SetRotation { old, new } => old == new,
            ActionKind::SetStyle { old, new } => old == new,
            ActionKind::SetText { old, new } => old == new,
            ActionKind::SetArrow { old, new } => old == new,
            ActionKind::SetFreehand { old, new } => old == new,
        }
    }
}

fn apply(kind: &ActionKind, target: &mut Markup, forward: bool) {
    match kind {
        ActionKind::SetPosition { old, new } => {
            target.set_position(if forward { *new } else { *old })
        }
        ActionKind::SetSize { old, new } => {
            let state = if forward { new } else { old };
            target.set_size(state.position, state.size.x, state.size.y);
        }
        ActionKind::SetRotation { old, new } => {
            target.set_rotation(if forward { *new } else { *old })
        }
        ActionKind::SetStyle { old, new } => target.set_style(if forward { new } else { old }),
        ActionKind::SetText { old, new } => target.set_text(if forward { new } else { old }),
        ActionKind::SetArrow { old, new } => target.restore_arrow(if forward { new } else { old }),
        ActionKind::SetFreehand { old, new } => {
            target.restore_freehand(if forward { new } else { old })
        }
        ActionKind::Create { .. } | ActionKind::Clone { .. } | ActionKind::Delete { .. } => {}
    }
}
