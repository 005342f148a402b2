//! One undo unit.

use crate::shapes::{MarkupId, MarkupStore};

use super::EditAction;

/// Actions recorded during one continuous interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditActionGroup {
    actions: Vec<EditAction>,
    closed: bool,
    /// Set once a real change was added, even if later changes cancel it out
    recorded: bool,
}

impl EditActionGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action and compact the group. Ignored once the group is closed.
    pub fn add_action(&mut self, action: EditAction) {
        if self.closed {
            return;
        }
        self.recorded |= !action.is_identity();
        self.actions.push(action);
        self.compact();
    }

    /// Drop identity actions and fold later same-type, same-target actions into
    /// the earliest one.
    fn compact(&mut self) {
        let mut i = 0;
        while i < self.actions.len() {
            let mut j = i + 1;
            while j < self.actions.len() {
                let (head, tail) = self.actions.split_at_mut(j);
                if head[i].merge(&tail[0]) {
                    self.actions.remove(j);
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        self.actions.retain(|a| !a.is_identity());
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// True when the group saw a real change. A gesture that returned to its
    /// start still counts, so it stays an undo step of its own.
    pub fn has_recorded(&self) -> bool {
        self.recorded
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn actions(&self) -> &[EditAction] {
        &self.actions
    }

    /// Undo every action newest first. Returns the last target touched.
    pub fn undo(&mut self, store: &mut MarkupStore) -> Option<MarkupId> {
        let mut touched = None;
        for action in self.actions.iter_mut().rev() {
            action.undo(store);
            touched = action.target_id.or(touched);
        }
        touched
    }

    /// Redo every action oldest first. Returns the last target touched.
    pub fn redo(&mut self, store: &mut MarkupStore) -> Option<MarkupId> {
        let mut touched = None;
        for action in &mut self.actions {
            action.redo(store);
            touched = action.target_id.or(touched);
        }
        touched
    }
}
