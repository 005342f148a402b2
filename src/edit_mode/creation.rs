//! Geometry of a shape while it is being dragged out.

use bevy::math::Vec2;

use crate::constants::DEFAULT_TEXT_BOX_PX;
use crate::geometry::CoordinateMapper;
use crate::history::EditAction;
use crate::shapes::{Markup, MarkupId, MarkupKind, MarkupStore};

use super::EditContext;

/// Zero-sized starting geometry at the anchor.
pub(super) fn initialize(markup: &mut Markup, anchor: Vec2) {
    match markup.kind() {
        MarkupKind::Arrow => markup.set_arrow(anchor, anchor),
        MarkupKind::Freehand => markup.set_freehand(&[anchor]),
        MarkupKind::Text => {
            markup.set_text("");
            markup.set_size(anchor, 0.0, 0.0);
        }
        MarkupKind::Circle | MarkupKind::Rectangle | MarkupKind::Cloud => {
            markup.set_size(anchor, 0.0, 0.0)
        }
    }
}

/// The action that stretches the shape from `anchor` to `end`.
pub(super) fn drag_action(
    kind: MarkupKind,
    store: &MarkupStore,
    id: MarkupId,
    anchor: Vec2,
    end: Vec2,
    samples: &mut Vec<Vec2>,
    min_spacing: f32,
) -> Option<EditAction> {
    match kind {
        MarkupKind::Arrow => EditAction::set_arrow(store, id, anchor, end),
        MarkupKind::Freehand => {
            let far_enough = samples
                .last()
                .is_none_or(|last| last.distance(end) >= min_spacing);
            if !far_enough {
                return None;
            }
            samples.push(end);
            EditAction::set_freehand(store, id, samples)
        }
        MarkupKind::Circle | MarkupKind::Rectangle | MarkupKind::Cloud | MarkupKind::Text => {
            EditAction::set_size(store, id, (anchor + end) * 0.5, (end - anchor).abs())
        }
    }
}

/// On-screen extent of a shape: arrow length, or the diagonal of its box.
pub(crate) fn client_extent(mapper: &CoordinateMapper<'_>, markup: &Markup) -> Option<f32> {
    if let Some((tail, head)) = markup.arrow_points() {
        let a = mapper.markup_to_client(tail)?;
        let b = mapper.markup_to_client(head)?;
        return Some(a.distance(b));
    }
    Some(mapper.markup_to_client_size(markup.size())?.length())
}

/// Give a label that was clicked rather than dragged the default box, with its
/// top-left corner at the click.
pub(super) fn settle_text_box(ctx: &mut EditContext<'_>, id: MarkupId, anchor: Vec2) {
    let Some(markup) = ctx.store.get(id) else {
        return;
    };
    let extent = client_extent(&ctx.mapper, markup).unwrap_or(0.0);
    let size = markup.size();
    if extent >= ctx.config.min_create_size_px && size.x > 0.0 && size.y > 0.0 {
        return;
    }
    let default_box = Vec2::new(DEFAULT_TEXT_BOX_PX.0, DEFAULT_TEXT_BOX_PX.1);
    let Some(size) = ctx.mapper.client_to_markup_size(default_box) else {
        return;
    };
    if let Some(action) = EditAction::set_size(ctx.store, id, anchor + size * 0.5, size) {
        ctx.execute(action);
    }
}
