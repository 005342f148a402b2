//! Bounded undo/redo stacks of action groups.

use std::fmt;

use bevy::log::debug;

use crate::constants::DEFAULT_HISTORY_SIZE;
use crate::shapes::{MarkupId, MarkupStore};

use super::{EditAction, EditActionGroup};

/// What changed the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Execute,
    Undo,
    Redo,
    Cancel,
    Clear,
}

/// Notification fired after every history change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEvent {
    pub action: HistoryAction,
    pub target_id: Option<MarkupId>,
}

pub type HistoryListener = Box<dyn FnMut(&HistoryEvent) + Send + Sync>;

/// Owns the undo/redo stacks and the lifecycle of the open group.
///
/// At most one group is open at a time. Executed actions join the open group,
/// or form a closed one-action group when none is open.
pub struct EditActionManager {
    /// Groups that can be undone (most recent last)
    undo_stack: Vec<EditActionGroup>,
    /// Groups that can be redone (most recent last)
    redo_stack: Vec<EditActionGroup>,
    open_group: Option<EditActionGroup>,
    history_size: usize,
    listeners: Vec<HistoryListener>,
}

impl Default for EditActionManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl fmt::Debug for EditActionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditActionManager")
            .field("undo_stack", &self.undo_stack.len())
            .field("redo_stack", &self.redo_stack.len())
            .field("group_open", &self.open_group.is_some())
            .field("history_size", &self.history_size)
            .finish()
    }
}

impl EditActionManager {
    pub fn new(history_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            open_group: None,
            history_size,
            listeners: Vec::new(),
        }
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }

    pub fn set_history_size(&mut self, history_size: usize) {
        self.history_size = history_size;
        self.trim();
    }

    /// Register a callback for history events.
    pub fn add_listener(&mut self, listener: HistoryListener) {
        self.listeners.push(listener);
    }

    fn emit(&mut self, action: HistoryAction, target_id: Option<MarkupId>) -> HistoryEvent {
        let event = HistoryEvent { action, target_id };
        for listener in &mut self.listeners {
            listener(&event);
        }
        event
    }

    fn trim(&mut self) {
        while self.undo_stack.len() > self.history_size {
            self.undo_stack.remove(0);
            debug!("Evicted oldest undo group (limit {})", self.history_size);
        }
    }

    fn push_undo(&mut self, mut group: EditActionGroup) {
        group.close();
        if !group.has_recorded() {
            return;
        }
        self.undo_stack.push(group);
        self.trim();
    }

    /// Apply an action and record it.
    pub fn execute(&mut self, mut action: EditAction, store: &mut MarkupStore) -> HistoryEvent {
        self.redo_stack.clear();
        action.redo(store);
        let target = action.target_id;

        if action.add_to_history {
            match self.open_group.as_mut() {
                Some(group) => group.add_action(action),
                None => {
                    let mut group = EditActionGroup::new();
                    group.add_action(action);
                    self.push_undo(group);
                }
            }
        }
        self.emit(HistoryAction::Execute, target)
    }

    /// Start batching actions into one undo unit, closing any group still open.
    pub fn begin_action_group(&mut self) {
        self.close_action_group();
        self.open_group = Some(EditActionGroup::new());
    }

    /// Finish the open group. Groups that never saw a change are dropped.
    pub fn close_action_group(&mut self) {
        if let Some(group) = self.open_group.take() {
            self.push_undo(group);
        }
    }

    /// Undo and discard the open group.
    pub fn cancel_action_group(&mut self, store: &mut MarkupStore) -> Option<HistoryEvent> {
        let mut group = self.open_group.take()?;
        let target = group.undo(store);
        Some(self.emit(HistoryAction::Cancel, target))
    }

    pub fn is_group_open(&self) -> bool {
        self.open_group.is_some()
    }

    pub fn undo(&mut self, store: &mut MarkupStore) -> Option<HistoryEvent> {
        self.close_action_group();
        let mut group = self.undo_stack.pop()?;
        let target = group.undo(store);
        self.redo_stack.push(group);
        Some(self.emit(HistoryAction::Undo, target))
    }

    pub fn redo(&mut self, store: &mut MarkupStore) -> Option<HistoryEvent> {
        self.close_action_group();
        let mut group = self.redo_stack.pop()?;
        let target = group.redo(store);
        self.undo_stack.push(group);
        self.trim();
        Some(self.emit(HistoryAction::Redo, target))
    }

    /// Forget all history. Shapes are left as they are.
    pub fn clear(&mut self) -> HistoryEvent {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open_group = None;
        self.emit(HistoryAction::Clear, None)
    }

    pub fn is_undo_stack_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    pub fn is_redo_stack_empty(&self) -> bool {
        self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}
