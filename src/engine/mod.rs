//! The markups engine.
//!
//! [`MarkupsCore`] owns the live shapes, their history, the per-kind edit modes,
//! the edit frame, the clipboard and any loaded read-only layers, and keeps the
//! vector surface in step with all of them. Hosts drive it through a small
//! control surface: pointer and key events in, camera snapshots in, serialized
//! markup strings out.
//!
//! Surface layout:
//!
//! ```text
//! <svg>
//!   <g class="markups-view" transform="matrix(...)">   markup space
//!     <g class="markups-layer" data-layer-id="...">    loaded layers
//!     <g class="markups">                              editable shapes
//!   <g class="markups-overlay">                        client space, edit frame
//! ```
//!
//! ## Module Structure
//!
//! - [`pointer`] - Pointer and keyboard routing
//! - [`serialize`] - `generate_data` and raster rendering
//! - [`layers`] - Loaded read-only layers

mod layers;
mod pointer;
mod serialize;


use bevy::log::{debug, info};
use bevy::math::Vec2;
use bevy::prelude::Resource;
use bevy::window::CursorIcon;

use crate::clipboard::Clipboard;
use crate::config::MarkupsConfig;
use crate::edit_frame::{DragMode, EditFrame, FrameLayout, FrameListener, FrameOverlay, layout};
use crate::edit_mode::EditModes;
use crate::geometry::{CameraState, CoordinateMapper, MarkupPlane};
use crate::history::{EditAction, EditActionManager, HistoryListener};
use crate::input::InputHandler;
use crate::shapes::{MarkupId, MarkupKind, MarkupStore, Style};
use crate::surface::{NodeId, SvgScene, VectorSurface};

pub use layers::Layer;
pub use serialize::{DOCUMENT_TAG, DOCUMENT_VERSION_ATTR};

/// Build an [`EditContext`] from the core's fields without borrowing all of `self`.
macro_rules! edit_context {
    ($core:expr) => {
        $crate::edit_mode::EditContext {
            store: &mut $core.store,
            history: &mut $core.history,
            mapper: $crate::geometry::CoordinateMapper::new(&$core.camera, &$core.plane),
            config: &$core.config,
        }
    };
}
pub(crate) use edit_context;

#[derive(Resource)]
pub struct MarkupsCore {
    surface: Box<dyn VectorSurface>,
    view_node: NodeId,
    markups_node: NodeId,
    overlay_node: NodeId,

    store: MarkupStore,
    history: EditActionManager,
    modes: EditModes,
    frame: EditFrame,
    overlay: FrameOverlay,
    clipboard: Clipboard,
    input: InputHandler,
    layers: Vec<Layer>,

    config: MarkupsConfig,
    camera: CameraState,
    plane: MarkupPlane,

    editing: bool,
    visible: bool,
    navigation: bool,
    selected: Option<MarkupId>,
    hovered: Option<MarkupId>,
    hover_mode: DragMode,
}

impl MarkupsCore {
    /// Create an engine drawing into `surface`.
    pub fn new(mut surface: Box<dyn VectorSurface>, config: MarkupsConfig) -> Self {
        let root = surface.root();
        let view_node = surface.create_node("g");
        surface.set_attribute(view_node, "class", "markups-view");
        surface.append_child(root, view_node);
        let markups_node = surface.create_node("g");
        surface.set_attribute(markups_node, "class", "markups");
        surface.append_child(view_node, markups_node);
        let overlay_node = surface.create_node("g");
        surface.set_attribute(overlay_node, "class", "markups-overlay");
        surface.append_child(root, overlay_node);

        let camera = CameraState::default();
        let plane = MarkupPlane::default();
        let mapper = CoordinateMapper::new(&camera, &plane);
        let stroke = mapper
            .client_to_markup_distance(config.default_stroke_width_px)
            .unwrap_or(config.default_stroke_width_px);
        let font = mapper
            .client_to_markup_distance(config.default_font_size_px)
            .unwrap_or(config.default_font_size_px);

        let mut core = Self {
            surface,
            view_node,
            markups_node,
            overlay_node,
            store: MarkupStore::new(),
            history: EditActionManager::new(config.history_size),
            modes: EditModes::new(stroke, font),
            frame: EditFrame::new(),
            overlay: FrameOverlay::new(),
            clipboard: Clipboard::default(),
            input: InputHandler::new(),
            layers: Vec::new(),
            config,
            camera,
            plane,
            editing: false,
            visible: true,
            navigation: false,
            selected: None,
            hovered: None,
            hover_mode: DragMode::None,
        };
        core.update_view_transform();
        core
    }

    /// Create an engine backed by an in-memory [`SvgScene`].
    pub fn with_svg_scene(config: MarkupsConfig) -> Self {
        Self::new(Box::new(SvgScene::new()), config)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn store(&self) -> &MarkupStore {
        &self.store
    }

    pub fn history(&self) -> &EditActionManager {
        &self.history
    }

    pub fn config(&self) -> &MarkupsConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn plane(&self) -> &MarkupPlane {
        &self.plane
    }

    pub fn surface(&self) -> &dyn VectorSurface {
        self.surface.as_ref()
    }

    pub fn mapper(&self) -> CoordinateMapper<'_> {
        CoordinateMapper::new(&self.camera, &self.plane)
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    /// The whole surface, overlay included, as SVG text.
    pub fn svg(&self) -> String {
        self.surface.serialize(self.surface.root())
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_navigating(&self) -> bool {
        self.navigation
    }

    pub fn add_history_listener(&mut self, listener: HistoryListener) {
        self.history.add_listener(listener);
    }

    pub fn add_frame_listener(&mut self, listener: FrameListener) {
        self.frame.add_listener(listener);
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start accepting edits. Creation styles are reseeded for the current zoom.
    pub fn enter_edit_mode(&mut self) {
        if self.editing {
            return;
        }
        self.show();
        self.editing = true;
        self.seed_styles();
        self.refresh();
        info!("Entered markup edit mode");
    }

    /// Stop accepting edits, finishing any gesture in progress.
    pub fn leave_edit_mode(&mut self) {
        if !self.editing {
            return;
        }
        self.finish_gestures();
        self.apply_selection(None);
        self.editing = false;
        self.refresh();
        info!("Left markup edit mode");
    }

    pub fn show(&mut self) {
        self.visible = true;
        self.surface.remove_attribute(self.view_node, "visibility");
        self.surface.remove_attribute(self.overlay_node, "visibility");
        self.refresh();
    }

    /// Hide all markups. Leaves edit mode first.
    pub fn hide(&mut self) {
        self.leave_edit_mode();
        self.visible = false;
        self.surface.set_attribute(self.view_node, "visibility", "hidden");
        self.surface.set_attribute(self.overlay_node, "visibility", "hidden");
        self.refresh();
    }

    /// While navigating, pointer input passes through to the host.
    pub fn set_navigation_mode(&mut self, navigating: bool) {
        if navigating && !self.navigation {
            self.finish_gestures();
        }
        self.navigation = navigating;
    }

    /// Camera-change notification. Re-renders the view transform and the frame.
    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = camera;
        self.update_view_transform();
        self.update_overlay();
    }

    pub fn set_plane(&mut self, plane: MarkupPlane) {
        self.plane = plane;
        self.update_view_transform();
        self.update_overlay();
    }

    /// Replace the configuration. History size applies immediately.
    pub fn set_config(&mut self, config: MarkupsConfig) {
        self.history.set_history_size(config.history_size);
        self.config = config;
        self.update_overlay();
    }

    /// Remove every editable shape and forget history.
    pub fn clear(&mut self) {
        self.finish_gestures();
        self.apply_selection(None);
        self.store.clear();
        self.history.clear();
        self.refresh();
        debug!("Cleared all markups");
    }

    // ------------------------------------------------------------------
    // Modes and styles
    // ------------------------------------------------------------------

    pub fn edit_mode(&self) -> MarkupKind {
        self.modes.active_kind()
    }

    /// Switch the shape kind new drags create. Clears the selection.
    pub fn change_edit_mode(&mut self, kind: MarkupKind) {
        self.finish_gestures();
        self.apply_selection(None);
        self.modes.set_active(kind);
        self.refresh();
    }

    /// Style of the active edit mode.
    pub fn get_style(&self) -> Style {
        self.modes.active().style().clone()
    }

    /// Style keys the active edit mode accepts.
    pub fn style_keys(&self) -> &'static [&'static str] {
        self.modes.active().style_keys()
    }

    /// Update the active mode's style and restyle the selection if it is of the
    /// same kind.
    pub fn set_style(&mut self, style: &Style) {
        self.modes.active_mut().set_style(style);
        let kind = self.modes.active_kind();
        if let Some(id) = self.selected
            && self.store.get(id).is_some_and(|m| m.kind() == kind)
            && let Some(action) = EditAction::set_style(&self.store, id, self.modes.active().style())
        {
            edit_context!(self).execute(action);
        }
        self.refresh();
    }

    /// Set one style attribute. Returns false for keys the active kind does not have.
    pub fn set_style_value(&mut self, key: &str, value: &str) -> bool {
        let mut style = self.get_style();
        if !style.set(key, value) {
            return false;
        }
        self.set_style(&style);
        true
    }

    /// Replace the text of the selected label.
    pub fn set_text(&mut self, text: &str) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        let Some(action) = EditAction::set_text(&self.store, id, text) else {
            return false;
        };
        edit_context!(self).execute(action);
        self.refresh();
        true
    }

    // ------------------------------------------------------------------
    // Selection and editing
    // ------------------------------------------------------------------

    pub fn select_markup(&mut self, id: Option<MarkupId>) {
        if self.frame.is_active() {
            return;
        }
        self.apply_selection(id);
        self.refresh();
    }

    pub fn get_selection(&self) -> Option<MarkupId> {
        self.selected
    }

    /// Kind of the selected shape.
    pub fn selected_kind(&self) -> Option<MarkupKind> {
        self.store.get(self.selected?).map(|m| m.kind())
    }

    /// Delete a shape through history. Missing ids are ignored.
    pub fn delete_markup(&mut self, id: MarkupId) -> bool {
        let Some(action) = EditAction::delete(&self.store, id) else {
            return false;
        };
        if self.selected == Some(id) {
            self.finish_gestures();
            self.apply_selection(None);
        }
        edit_context!(self).execute(action);
        self.refresh();
        true
    }

    pub fn undo(&mut self) -> bool {
        self.finish_gestures();
        let Some(event) = self.history.undo(&mut self.store) else {
            return false;
        };
        self.select_after_history(event.target_id);
        true
    }

    pub fn redo(&mut self) -> bool {
        self.finish_gestures();
        let Some(event) = self.history.redo(&mut self.store) else {
            return false;
        };
        self.select_after_history(event.target_id);
        true
    }

    pub fn is_undo_stack_empty(&self) -> bool {
        self.history.is_undo_stack_empty()
    }

    pub fn is_redo_stack_empty(&self) -> bool {
        self.history.is_redo_stack_empty()
    }

    pub fn copy(&mut self) -> bool {
        match self.selected {
            Some(id) => self.clipboard.copy(&self.store, id),
            None => false,
        }
    }

    pub fn cut(&mut self) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        self.finish_gestures();
        self.apply_selection(None);
        let cut = self.clipboard.cut(&mut edit_context!(self), id);
        self.refresh();
        cut
    }

    /// Paste the clipboard and select the pasted shape.
    pub fn paste(&mut self) -> Option<MarkupId> {
        if !self.editing {
            return None;
        }
        self.finish_gestures();
        let id = self.clipboard.paste(&mut edit_context!(self))?;
        self.apply_selection(Some(id));
        self.refresh();
        Some(id)
    }

    // ------------------------------------------------------------------
    // Edit frame
    // ------------------------------------------------------------------

    /// The frame around the selection, in client pixels.
    pub fn frame_layout(&self) -> Option<FrameLayout> {
        if !self.editing || !self.visible {
            return None;
        }
        let markup = self.store.get(self.selected?)?;
        layout(&self.mapper(), markup, &self.config)
    }

    /// Cursor for the current gesture, or for what is under the pointer.
    pub fn cursor_icon(&self) -> Option<CursorIcon> {
        if self.frame.is_active() {
            self.frame.mode().cursor_icon()
        } else {
            self.hover_mode.cursor_icon()
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn seed_styles(&mut self) {
        let mapper = CoordinateMapper::new(&self.camera, &self.plane);
        let (Some(stroke), Some(font)) = (
            mapper.client_to_markup_distance(self.config.default_stroke_width_px),
            mapper.client_to_markup_distance(self.config.default_font_size_px),
        ) else {
            return;
        };
        for mode in self.modes.iter_mut() {
            mode.seed_style(stroke, font);
        }
    }

    /// End frame gestures and drop unfinished creations.
    fn finish_gestures(&mut self) {
        if self.frame.is_active() {
            self.frame.end(&mut edit_context!(self));
        }
        self.modes.active_mut().abort(&mut edit_context!(self));
        self.input.reset();
    }

    fn select_after_history(&mut self, target: Option<MarkupId>) {
        let target = target.filter(|id| self.editing && self.store.contains(*id));
        self.apply_selection(target);
        self.refresh();
    }

    /// Move the selection flag and point the edit modes at the new selection.
    fn apply_selection(&mut self, id: Option<MarkupId>) {
        if let Some(previous) = self.selected.take()
            && let Some(markup) = self.store.get_mut(previous)
        {
            markup.set_selected(false);
        }
        let id = id.filter(|id| self.store.contains(*id));
        if let Some(markup) = id.and_then(|id| self.store.get_mut(id)) {
            markup.set_selected(true);
            let kind = markup.kind();
            self.modes.set_active(kind);
        }
        self.selected = id;
        for mode in self.modes.iter_mut() {
            if !mode.is_creating() {
                mode.set_selected(None);
            }
        }
        if !self.modes.active().is_creating() {
            self.modes.active_mut().set_selected(id);
        }
    }

    fn set_hovered(&mut self, id: Option<MarkupId>) {
        if self.hovered == id {
            return;
        }
        if let Some(previous) = self.hovered.take()
            && let Some(markup) = self.store.get_mut(previous)
        {
            markup.set_highlighted(false);
        }
        if let Some(markup) = id.and_then(|id| self.store.get_mut(id)) {
            markup.set_highlighted(true);
            self.hovered = id;
        }
    }

    /// Push pending shape changes and the frame overlay to the surface.
    fn refresh(&mut self) {
        if let Some(id) = self.selected
            && !self.store.contains(id)
        {
            self.apply_selection(None);
        }
        if let Some(id) = self.hovered
            && !self.store.contains(id)
        {
            self.hovered = None;
        }
        self.store.sync(self.surface.as_mut(), self.markups_node);
        self.update_overlay();
    }

    fn update_overlay(&mut self) {
        let frame = self.frame_layout();
        self.overlay
            .update(self.surface.as_mut(), self.overlay_node, frame.as_ref());
    }

    /// Point the markup-space group at the current camera. Degenerate cameras keep
    /// the previous transform.
    fn update_view_transform(&mut self) {
        let Some(affine) = self.mapper().markup_to_client_affine() else {
            debug!("Skipping view update for a degenerate camera");
            return;
        };
        let x = affine.matrix2.x_axis;
        let y = affine.matrix2.y_axis;
        let t = affine.translation;
        let values: [f32; 6] = [x.x, x.y, y.x, y.y, t.x, t.y];
        if values.iter().any(|v| !v.is_finite()) {
            return;
        }
        let matrix = format!(
            "matrix({})",
            values
                .iter()
                .map(|v| crate::shapes::fmt_num(*v))
                .collect::<Vec<_>>()
                .join(" ")
        );
        self.surface.set_attribute(self.view_node, "transform", &matrix);
    }

    fn client_tolerance(&self) -> f32 {
        self.mapper()
            .client_to_markup_distance(crate::constants::HIT_TOLERANCE_PX)
            .unwrap_or(0.0)
    }

    fn markup_point(&self, client: Vec2) -> Option<Vec2> {
        self.mapper().client_to_markup(client)
    }
}
