//! Copy, cut and paste of a single shape.
//!
//! The clipboard keeps a detached clone of the copied shape and a running paste
//! anchor. Every paste moves the anchor by a fixed on-screen offset, so repeated
//! pastes cascade instead of stacking on top of each other.

use bevy::log::debug;
use bevy::math::Vec2;

use crate::edit_mode::EditContext;
use crate::history::EditAction;
use crate::shapes::{Markup, MarkupId, MarkupStore};

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<Markup>,
    anchor: Vec2,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    pub fn clear(&mut self) {
        self.content = None;
    }

    /// The copied shape, if any.
    pub fn content(&self) -> Option<&Markup> {
        self.content.as_ref()
    }

    /// Remember a clone of `id` and reset the paste anchor to its position.
    pub fn copy(&mut self, store: &MarkupStore, id: MarkupId) -> bool {
        let Some(markup) = store.get(id) else {
            return false;
        };
        self.anchor = markup.position();
        self.content = Some(markup.clone_shape());
        true
    }

    /// Copy `id`, then delete it through history.
    pub fn cut(&mut self, ctx: &mut EditContext<'_>, id: MarkupId) -> bool {
        if !self.copy(ctx.store, id) {
            return false;
        }
        match EditAction::delete(ctx.store, id) {
            Some(action) => {
                ctx.execute(action);
                true
            }
            None => false,
        }
    }

    /// Insert a new clone one paste offset past the previous one. Returns the new id.
    pub fn paste(&mut self, ctx: &mut EditContext<'_>) -> Option<MarkupId> {
        let source = self.content.as_ref()?;
        let offset = ctx
            .mapper
            .client_to_markup_distance(ctx.config.paste_offset_px)?;
        let anchor = self.anchor + Vec2::splat(offset);

        let id = ctx.store.allocate_id();
        let mut markup = source.clone_shape();
        markup.set_id(id);
        markup.set_position(anchor);
        self.anchor = anchor;
        debug!("Pasting {} as markup {}", markup.kind().display_name(), id);
        ctx.execute(EditAction::clone_markup(markup)).or(Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkupsConfig;
    use crate::geometry::{CameraState, CoordinateMapper, MarkupPlane};
    use crate::history::EditActionManager;
    use crate::shapes::{MarkupKind, Style};

    fn setup() -> (MarkupStore, EditActionManager, MarkupId) {
        let mut store = MarkupStore::new();
        let mut history = EditActionManager::default();
        let id = store.allocate_id();
        let mut markup = Markup::new(
            MarkupKind::Circle,
            id,
            Style::defaults(MarkupKind::Circle, 2.0, 16.0),
        );
        markup.set_size(Vec2::new(100.0, 100.0), 30.0, 30.0);
        history.execute(EditAction::create(markup), &mut store);
        (store, history, id)
    }

    #[test]
    fn test_paste_cascades_by_screen_offset() {
        let (mut store, mut history, id) = setup();
        let camera = CameraState::screen_aligned(Vec2::new(800.0, 600.0));
        let plane = MarkupPlane::default();
        let config = MarkupsConfig::default();
        let mut clipboard = Clipboard::default();
        assert!(clipboard.copy(&store, id));

        let mut ctx = EditContext {
            store: &mut store,
            history: &mut history,
            mapper: CoordinateMapper::new(&camera, &plane),
            config: &config,
        };
        let first = clipboard.paste(&mut ctx).unwrap();
        let second = clipboard.paste(&mut ctx).unwrap();

        assert_ne!(first, id);
        assert_ne!(first, second);
        let p1 = store.get(first).unwrap().position();
        let p2 = store.get(second).unwrap().position();
        assert!((p1 - Vec2::new(120.0, 120.0)).length() < 1e-3);
        assert!((p2 - Vec2::new(140.0, 140.0)).length() < 1e-3);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_cut_removes_shape_and_is_undoable() {
        let (mut store, mut history, id) = setup();
        let camera = CameraState::screen_aligned(Vec2::new(800.0, 600.0));
        let plane = MarkupPlane::default();
        let config = MarkupsConfig::default();
        let mut clipboard = Clipboard::default();

        let mut ctx = EditContext {
            store: &mut store,
            history: &mut history,
            mapper: CoordinateMapper::new(&camera, &plane),
            config: &config,
        };
        assert!(clipboard.cut(&mut ctx, id));
        assert!(ctx.store.is_empty());
        assert!(!clipboard.is_empty());

        history.undo(&mut store);
        assert!(store.contains(id));
    }

    #[test]
    fn test_copy_of_missing_shape_keeps_clipboard_empty() {
        let store = MarkupStore::new();
        let mut clipboard = Clipboard::default();
        assert!(!clipboard.copy(&store, 7));
        assert!(clipboard.is_empty());
    }
}
