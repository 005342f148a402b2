//! Edit modes: turning pointer gestures into shape-creating actions.
//!
//! One [`EditMode`] exists per shape kind and one is active at a time. A mode
//! keeps the style new shapes get and runs the create-drag state machine:
//! pointer-down opens an action group and creates the shape, every move issues a
//! mergeable `Set*` action, and pointer-up either keeps the shape or cancels the
//! whole group when it ended up too small to see.
//!
//! ## Module Structure
//!
//! - [`creation`] - Per-kind geometry for shapes being dragged out

mod creation;

#[cfg(test)]
mod tests;

use bevy::log::debug;
use bevy::math::Vec2;

use crate::config::MarkupsConfig;
use crate::geometry::CoordinateMapper;
use crate::history::{EditAction, EditActionManager};
use crate::shapes::style::style_keys;
use crate::shapes::{Markup, MarkupId, MarkupKind, MarkupStore, Style};

/// Everything an edit gesture needs to issue actions.
pub struct EditContext<'a> {
    pub store: &'a mut MarkupStore,
    pub history: &'a mut EditActionManager,
    pub mapper: CoordinateMapper<'a>,
    pub config: &'a MarkupsConfig,
}

impl EditContext<'_> {
    /// Execute an action and report whether it asked to be selected.
    pub fn execute(&mut self, action: EditAction) -> Option<MarkupId> {
        let select = action.select_on_execution;
        let event = self.history.execute(action, self.store);
        if select { event.target_id } else { None }
    }
}

/// How a creation gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationOutcome {
    /// The shape was kept; `selected` tells whether it stays selected
    Created { id: MarkupId, selected: bool },
    /// The shape was too small and its group was cancelled
    Cancelled,
    /// No creation was in progress
    Idle,
}

/// Input state machine for one shape kind.
#[derive(Debug, Clone)]
pub struct EditMode {
    kind: MarkupKind,
    style: Style,
    style_customized: bool,
    selected: Option<MarkupId>,
    creating: bool,
    /// Client-space extent of the shape being created
    size: Vec2,
    anchor: Vec2,
    anchor_client: Vec2,
    samples: Vec<Vec2>,
}

impl EditMode {
    pub fn new(kind: MarkupKind, style: Style) -> Self {
        Self {
            kind,
            style,
            style_customized: false,
            selected: None,
            creating: false,
            size: Vec2::ZERO,
            anchor: Vec2::ZERO,
            anchor_client: Vec2::ZERO,
            samples: Vec::new(),
        }
    }

    pub fn kind(&self) -> MarkupKind {
        self.kind
    }

    /// Style applied to shapes this mode creates.
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// Style attributes this mode accepts.
    pub fn style_keys(&self) -> &'static [&'static str] {
        style_keys(self.kind)
    }

    /// Update the creation style. Keys that do not apply to this kind are ignored.
    pub fn set_style(&mut self, style: &Style) {
        self.style.merge_from(style);
        self.style_customized = true;
    }

    pub fn set_style_value(&mut self, key: &str, value: &str) -> bool {
        let accepted = self.style.set(key, value);
        self.style_customized |= accepted;
        accepted
    }

    /// Reseed the default style from the current zoom unless the user changed it.
    pub fn seed_style(&mut self, stroke_width: f32, font_size: f32) {
        if !self.style_customized {
            self.style = Style::defaults(self.kind, stroke_width, font_size);
        }
    }

    pub fn selected(&self) -> Option<MarkupId> {
        self.selected
    }

    pub fn set_selected(&mut self, selected: Option<MarkupId>) {
        self.selected = selected;
    }

    pub fn is_creating(&self) -> bool {
        self.creating
    }

    /// Client-space extent of the shape currently being created.
    pub fn creation_size(&self) -> Vec2 {
        self.size
    }

    /// Begin creating a shape at `client`. Returns false when a shape is selected
    /// (the edit frame handles it) or the pointer cannot be mapped.
    pub fn on_pointer_down(&mut self, ctx: &mut EditContext<'_>, client: Vec2) -> bool {
        if self.creating || self.selected.is_some() {
            return false;
        }
        let client = ctx.mapper.clamp_to_viewport(client);
        let Some(anchor) = ctx.mapper.client_to_markup(client) else {
            return false;
        };

        ctx.history.begin_action_group();
        let id = ctx.store.allocate_id();
        let mut markup = Markup::new(self.kind, id, self.style.clone());
        creation::initialize(&mut markup, anchor);

        self.anchor = anchor;
        self.anchor_client = client;
        self.size = Vec2::ZERO;
        self.samples = vec![anchor];
        self.creating = true;
        self.selected = ctx.execute(EditAction::create(markup)).or(Some(id));
        true
    }

    /// Grow the shape being created toward `client`.
    pub fn on_pointer_move(&mut self, ctx: &mut EditContext<'_>, client: Vec2) {
        if !self.creating {
            return;
        }
        let Some(id) = self.selected else {
            return;
        };
        let client = ctx.mapper.clamp_to_viewport(client);
        let Some(end) = ctx.mapper.client_to_markup(client) else {
            return;
        };

        let min_spacing = ctx
            .mapper
            .client_to_markup_distance(crate::constants::FREEHAND_MIN_SAMPLE_DISTANCE_PX)
            .unwrap_or(0.0);
        let action = creation::drag_action(
            self.kind,
            ctx.store,
            id,
            self.anchor,
            end,
            &mut self.samples,
            min_spacing,
        );
        if let Some(action) = action {
            ctx.execute(action);
        }
        self.size = (client - self.anchor_client).abs();
    }

    /// Finish the creation gesture.
    pub fn on_pointer_up(&mut self, ctx: &mut EditContext<'_>, client: Vec2) -> CreationOutcome {
        if !self.creating {
            return CreationOutcome::Idle;
        }
        self.on_pointer_move(ctx, client);
        self.creating = false;
        self.samples.clear();
        let Some(id) = self.selected else {
            ctx.history.close_action_group();
            return CreationOutcome::Idle;
        };

        if self.kind == MarkupKind::Text {
            creation::settle_text_box(ctx, id, self.anchor);
            ctx.history.close_action_group();
            return CreationOutcome::Created { id, selected: true };
        }

        let extent = ctx
            .store
            .get(id)
            .and_then(|m| creation::client_extent(&ctx.mapper, m))
            .unwrap_or(0.0);
        let min = ctx.config.min_create_size_px;
        if min > 0.0 && extent < min {
            debug!(
                "Cancelled {} creation: {:.1}px is below the {:.1}px minimum",
                self.kind.display_name(),
                extent,
                min
            );
            ctx.history.cancel_action_group(ctx.store);
            self.selected = None;
            return CreationOutcome::Cancelled;
        }

        ctx.history.close_action_group();
        self.selected = None;
        CreationOutcome::Created {
            id,
            selected: false,
        }
    }

    /// Drop an unfinished creation.
    pub fn abort(&mut self, ctx: &mut EditContext<'_>) {
        if self.creating {
            ctx.history.cancel_action_group(ctx.store);
            self.creating = false;
            self.selected = None;
            self.samples.clear();
        }
    }
}

/// The per-kind edit modes and which one is active.
#[derive(Debug, Clone)]
pub struct EditModes {
    modes: Vec<EditMode>,
    active: MarkupKind,
}

impl EditModes {
    pub fn new(stroke_width: f32, font_size: f32) -> Self {
        Self {
            modes: MarkupKind::ALL
                .into_iter()
                .map(|kind| EditMode::new(kind, Style::defaults(kind, stroke_width, font_size)))
                .collect(),
            active: MarkupKind::Arrow,
        }
    }

    pub fn active_kind(&self) -> MarkupKind {
        self.active
    }

    pub fn set_active(&mut self, kind: MarkupKind) {
        self.active = kind;
    }

    pub fn get(&self, kind: MarkupKind) -> &EditMode {
        let index = MarkupKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        &self.modes[index]
    }

    pub fn get_mut(&mut self, kind: MarkupKind) -> &mut EditMode {
        let index = MarkupKind::ALL.iter().position(|k| *k == kind).unwrap_or(0);
        &mut self.modes[index]
    }

    pub fn active(&self) -> &EditMode {
        self.get(self.active)
    }

    pub fn active_mut(&mut self) -> &mut EditMode {
        self.get_mut(self.active)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EditMode> {
        self.modes.iter_mut()
    }
}
