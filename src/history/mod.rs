//! Undo/redo for markup edits.
//!
//! Every mutation of the shape collection is an [`EditAction`]: creating,
//! deleting or cloning a shape, or changing one of its properties. Actions from
//! one continuous gesture are batched into an [`EditActionGroup`], which is the
//! unit of undo. [`EditActionManager`] keeps the bounded undo and redo stacks.
//!
//! ## Supported Operations
//!
//! - Shape creation, deletion and cloning
//! - Position, size, rotation, style and text changes
//! - Arrow end points and freehand paths
//!
//! ## Module Structure
//!
//! - [`action`] - EditAction and its per-operation snapshots
//! - [`group`] - EditActionGroup with compaction
//! - [`manager`] - EditActionManager stacks, group lifecycle and events

mod action;
mod group;
mod manager;

#[cfg(test)]
mod tests;

pub use action::{ActionKind, ActionType, BoxState, EditAction};
pub use group::EditActionGroup;
pub use manager::{EditActionManager, HistoryAction, HistoryEvent, HistoryListener};
