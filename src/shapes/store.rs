//! The live shape collection.

use std::collections::BTreeSet;

use bevy::log::debug;
use bevy::math::Vec2;

use super::{Markup, MarkupId, MarkupKind};
use crate::surface::{NodeId, VectorSurface};

/// Ordered (bottom to top) collection of live shapes.
///
/// Only edit actions insert or remove shapes. Mutations are recorded so that
/// [`MarkupStore::sync`] can bring the vector surface up to date afterwards.
#[derive(Debug, Default)]
pub struct MarkupStore {
    markups: Vec<Markup>,
    last_id: MarkupId,
    dirty: BTreeSet<MarkupId>,
    /// Removed shapes whose surface nodes still need destroying
    detached: Vec<Markup>,
}

impl MarkupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh, session-unique id.
    pub fn allocate_id(&mut self) -> MarkupId {
        self.last_id += 1;
        self.last_id
    }

    pub fn get(&self, id: MarkupId) -> Option<&Markup> {
        self.markups.iter().find(|m| m.id() == id)
    }

    /// Mutable access; the shape is re-rendered on the next sync.
    pub fn get_mut(&mut self, id: MarkupId) -> Option<&mut Markup> {
        let markup = self.markups.iter_mut().find(|m| m.id() == id)?;
        self.dirty.insert(id);
        Some(markup)
    }

    pub fn contains(&self, id: MarkupId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Markup> {
        self.markups.iter()
    }

    pub fn len(&self) -> usize {
        self.markups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markups.is_empty()
    }

    pub fn ids(&self) -> Vec<MarkupId> {
        self.markups.iter().map(Markup::id).collect()
    }

    /// Insert a shape at `index` (or on top). Replaces a shape with the same id.
    pub(crate) fn insert(&mut self, mut markup: Markup, index: Option<usize>) {
        let id = markup.id();
        if let Some(previous) = self.take(id) {
            self.detached.push(previous.0);
        }
        markup.nodes = None;
        self.last_id = self.last_id.max(id);
        let index = index.unwrap_or(self.markups.len()).min(self.markups.len());
        self.markups.insert(index, markup);
        self.dirty.insert(id);
    }

    /// Remove a shape, returning a surface-free copy and its stacking index.
    pub(crate) fn remove(&mut self, id: MarkupId) -> Option<(Markup, usize)> {
        let (markup, index) = self.take(id)?;
        let copy = markup.clone_shape();
        self.detached.push(markup);
        Some((copy, index))
    }

    fn take(&mut self, id: MarkupId) -> Option<(Markup, usize)> {
        let index = self.markups.iter().position(|m| m.id() == id)?;
        self.dirty.remove(&id);
        Some((self.markups.remove(index), index))
    }

    /// Remove every shape.
    pub fn clear(&mut self) {
        self.detached.append(&mut self.markups);
        self.dirty.clear();
    }

    /// Topmost shape containing a markup-space point.
    pub fn hit_test(&self, point: Vec2, tolerance: f32) -> Option<MarkupId> {
        self.markups
            .iter()
            .rev()
            .find(|m| m.contains(point, tolerance))
            .map(Markup::id)
    }

    /// Flag every shape for re-rendering (camera or style changes).
    pub fn mark_all_dirty(&mut self) {
        self.dirty.extend(self.markups.iter().map(Markup::id));
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.dirty.is_empty() || !self.detached.is_empty()
    }

    /// Apply recorded changes to the surface: destroy removed shapes, attach new
    /// ones under `parent` and re-render modified ones.
    pub fn sync(&mut self, surface: &mut dyn VectorSurface, parent: NodeId) {
        for mut markup in self.detached.drain(..) {
            markup.destroy(surface);
        }
        let mut order_changed = false;
        for markup in &mut self.markups {
            if !markup.is_attached() {
                markup.attach(surface, parent);
                order_changed = true;
                if markup.kind() == MarkupKind::Text {
                    // First render of a label needs a highlight flip to settle.
                    let highlighted = markup.is_highlighted();
                    markup.set_highlighted(!highlighted);
                    markup.update_style(surface);
                    markup.set_highlighted(highlighted);
                    markup.update_style(surface);
                }
            } else if self.dirty.contains(&markup.id()) {
                markup.update_style(surface);
            }
        }
        if order_changed {
            // Re-append in stacking order so restored shapes land at their index.
            for markup in &self.markups {
                if let Some(node) = markup.node() {
                    surface.append_child(parent, node);
                }
            }
        }
        if !self.dirty.is_empty() {
            debug!("Synced {} markup(s) to the surface", self.dirty.len());
        }
        self.dirty.clear();
    }

    /// Destroy every surface node without touching the shapes themselves.
    pub fn detach_all(&mut self, surface: &mut dyn VectorSurface) {
        for mut markup in self.detached.drain(..) {
            markup.destroy(surface);
        }
        for markup in &mut self.markups {
            markup.destroy(surface);
        }
    }
}
