//! The edit frame: the manipulator drawn around the selected shape.
//!
//! The frame is laid out in client space so handles keep a constant pixel size
//! regardless of zoom. Gestures convert the pointer back to markup space and
//! issue `SetPosition` / `SetSize` / `SetRotation` actions inside one action
//! group per drag, so a whole drag undoes in one step.
//!
//! ## Module Structure
//!
//! - [`layout`] - Handle positions and hit testing
//! - [`render`] - Overlay rendering into the vector surface and raster context

mod layout;
mod render;

#[cfg(test)]
mod tests;

use std::fmt;

use bevy::log::debug;
use bevy::math::Vec2;
use bevy::window::{CursorIcon, SystemCursorIcon};

use crate::edit_mode::EditContext;
use crate::geometry::{angle_between, normalize_angle, rotate_vector, snap_angle};
use crate::history::EditAction;
use crate::shapes::MarkupId;

pub use layout::{FrameLayout, hit_test, layout};
pub use render::FrameOverlay;

/// Which part of the frame a drag grabbed.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum DragMode {
    #[default]
    None,
    Move,
    Rotate,
    ResizeN,
    ResizeS,
    ResizeE,
    ResizeW,
    ResizeNE,
    ResizeNW,
    ResizeSE,
    ResizeSW,
}

impl DragMode {
    /// Get the appropriate cursor icon for this drag mode.
    pub fn cursor_icon(&self) -> Option<CursorIcon> {
        match self {
            DragMode::None => None,
            DragMode::Move => Some(CursorIcon::System(SystemCursorIcon::Move)),
            DragMode::Rotate => Some(CursorIcon::System(SystemCursorIcon::Grab)),
            DragMode::ResizeN | DragMode::ResizeS => {
                Some(CursorIcon::System(SystemCursorIcon::NsResize))
            }
            DragMode::ResizeE | DragMode::ResizeW => {
                Some(CursorIcon::System(SystemCursorIcon::EwResize))
            }
            DragMode::ResizeNE | DragMode::ResizeSW => {
                Some(CursorIcon::System(SystemCursorIcon::NeswResize))
            }
            DragMode::ResizeNW | DragMode::ResizeSE => {
                Some(CursorIcon::System(SystemCursorIcon::NwseResize))
            }
        }
    }

    /// Check if this is a resize mode.
    pub fn is_resize(&self) -> bool {
        !matches!(self, DragMode::None | DragMode::Move | DragMode::Rotate)
    }

    /// Check if this is a corner handle.
    pub fn is_corner(&self) -> bool {
        matches!(
            self,
            DragMode::ResizeNE | DragMode::ResizeNW | DragMode::ResizeSE | DragMode::ResizeSW
        )
    }

    /// Which local edges this handle moves: -1 for west/north, 1 for east/south.
    ///
    /// Markup space is y-down, so north is local -y.
    pub fn resize_signs(&self) -> Vec2 {
        match self {
            DragMode::ResizeN => Vec2::new(0.0, -1.0),
            DragMode::ResizeS => Vec2::new(0.0, 1.0),
            DragMode::ResizeE => Vec2::new(1.0, 0.0),
            DragMode::ResizeW => Vec2::new(-1.0, 0.0),
            DragMode::ResizeNE => Vec2::new(1.0, -1.0),
            DragMode::ResizeNW => Vec2::new(-1.0, -1.0),
            DragMode::ResizeSE => Vec2::new(1.0, 1.0),
            DragMode::ResizeSW => Vec2::new(-1.0, 1.0),
            DragMode::None | DragMode::Move | DragMode::Rotate => Vec2::ZERO,
        }
    }
}

/// Fired when a frame gesture starts or ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameEvent {
    EditionStarted { target: MarkupId, mode: DragMode },
    EditionEnded { target: MarkupId, mode: DragMode },
}

pub type FrameListener = Box<dyn FnMut(&FrameEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Shape state captured when a gesture starts.
#[derive(Debug, Clone, Copy)]
struct GestureStart {
    target: MarkupId,
    client: Vec2,
    markup: Vec2,
    position: Vec2,
    size: Vec2,
    rotation: f32,
}

/// Drag state of the manipulator.
#[derive(Default)]
pub struct EditFrame {
    mode: DragMode,
    start: Option<GestureStart>,
    locked_axis: Option<Axis>,
    listeners: Vec<FrameListener>,
}

impl fmt::Debug for EditFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditFrame")
            .field("mode", &self.mode)
            .field("target", &self.target())
            .field("locked_axis", &self.locked_axis)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EditFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: FrameListener) {
        self.listeners.push(listener);
    }

    /// True while a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    /// Shape being manipulated by the current gesture.
    pub fn target(&self) -> Option<MarkupId> {
        self.start.map(|s| s.target)
    }

    /// Start a gesture on `target` with the handle `mode` grabbed at `client`.
    pub fn begin(
        &mut self,
        ctx: &mut EditContext<'_>,
        target: MarkupId,
        mode: DragMode,
        client: Vec2,
    ) -> Option<FrameEvent> {
        if mode == DragMode::None || self.is_active() {
            return None;
        }
        let markup = ctx.store.get(target)?;
        let constraints = markup.constraints();
        if mode == DragMode::Rotate && constraints.rotation_locked {
            return None;
        }
        let grabbed = ctx.mapper.client_to_markup(client)?;

        self.start = Some(GestureStart {
            target,
            client,
            markup: grabbed,
            position: markup.position(),
            size: markup.size(),
            rotation: markup.rotation(),
        });
        self.mode = mode;
        self.locked_axis = None;
        ctx.history.begin_action_group();
        debug!("Edit frame {:?} started on markup {}", mode, target);
        Some(self.emit(FrameEvent::EditionStarted { target, mode }))
    }

    /// Continue the gesture with the pointer at `client`.
    pub fn drag(&mut self, ctx: &mut EditContext<'_>, client: Vec2, shift: bool) {
        let Some(start) = self.start else {
            return;
        };
        let action = match self.mode {
            DragMode::None => None,
            DragMode::Move => self
                .move_target(ctx, &start, client, shift)
                .and_then(|position| EditAction::set_position(ctx.store, start.target, position)),
            DragMode::Rotate => rotation_target(ctx, &start, client, shift)
                .and_then(|rotation| EditAction::set_rotation(ctx.store, start.target, rotation)),
            mode => resize_target(ctx, &start, mode, client, shift).and_then(|(position, size)| {
                EditAction::set_size(ctx.store, start.target, position, size)
            }),
        };
        if let Some(action) = action {
            ctx.execute(action);
        }
    }

    /// Finish the gesture and close its action group.
    pub fn end(&mut self, ctx: &mut EditContext<'_>) -> Option<FrameEvent> {
        let start = self.start.take()?;
        let mode = std::mem::take(&mut self.mode);
        self.locked_axis = None;
        ctx.history.close_action_group();
        Some(self.emit(FrameEvent::EditionEnded {
            target: start.target,
            mode,
        }))
    }

    /// Abandon the gesture, reverting everything it changed.
    pub fn cancel(&mut self, ctx: &mut EditContext<'_>) -> Option<FrameEvent> {
        let start = self.start.take()?;
        let mode = std::mem::take(&mut self.mode);
        self.locked_axis = None;
        ctx.history.cancel_action_group(ctx.store);
        Some(self.emit(FrameEvent::EditionEnded {
            target: start.target,
            mode,
        }))
    }

    fn emit(&mut self, event: FrameEvent) -> FrameEvent {
        for listener in &mut self.listeners {
            listener(&event);
        }
        event
    }

    /// New center for a move gesture. With shift, the first axis to leave the
    /// dead zone wins and the other one stays put until the gesture ends.
    fn move_target(
        &mut self,
        ctx: &EditContext<'_>,
        start: &GestureStart,
        client: Vec2,
        shift: bool,
    ) -> Option<Vec2> {
        let mut delta = client - start.client;
        if shift {
            if self.locked_axis.is_none() {
                let dead_zone = ctx.config.axis_lock_dead_zone_px;
                if delta.x.abs() > dead_zone || delta.y.abs() > dead_zone {
                    self.locked_axis = Some(if delta.x.abs() >= delta.y.abs() {
                        Axis::X
                    } else {
                        Axis::Y
                    });
                }
            }
            match self.locked_axis {
                Some(Axis::X) => delta.y = 0.0,
                Some(Axis::Y) => delta.x = 0.0,
                None => delta = Vec2::ZERO,
            }
        }
        let moved = ctx.mapper.client_to_markup(start.client + delta)?;
        Some(start.position + (moved - start.markup))
    }
}

fn rotation_target(
    ctx: &EditContext<'_>,
    start: &GestureStart,
    client: Vec2,
    shift: bool,
) -> Option<f32> {
    let current = ctx.mapper.client_to_markup(client)?;
    let a0 = angle_between(start.position, start.markup);
    let a1 = angle_between(start.position, current);
    let mut rotation = start.rotation + (a1 - a0);
    if shift {
        rotation = snap_angle(rotation, ctx.config.rotation_snap_radians());
    }
    Some(normalize_angle(rotation))
}

/// New `(center, size)` for a resize gesture.
fn resize_target(
    ctx: &EditContext<'_>,
    start: &GestureStart,
    mode: DragMode,
    client: Vec2,
    shift: bool,
) -> Option<(Vec2, Vec2)> {
    let constraints = ctx.store.get(start.target)?.constraints();
    let mut signs = mode.resize_signs();
    if constraints.width_locked {
        signs.x = 0.0;
    }
    if constraints.height_locked {
        signs.y = 0.0;
    }
    if signs == Vec2::ZERO {
        return None;
    }

    let current = ctx.mapper.client_to_markup(client)?;
    let local_delta = rotate_vector(current - start.markup, -start.rotation);
    let mut size = (start.size + signs * local_delta).max(Vec2::ONE);
    if signs.x == 0.0 {
        size.x = start.size.x;
    }
    if signs.y == 0.0 {
        size.y = start.size.y;
    }

    if shift && mode.is_corner() && signs.x != 0.0 && signs.y != 0.0 {
        size = aspect_locked(start.size, size);
    }

    let local_shift = signs * (size - start.size) * 0.5;
    let position = start.position + rotate_vector(local_shift, start.rotation);
    Some((position, size))
}

/// Scale `start` uniformly by whichever axis of `size` changed the most.
fn aspect_locked(start: Vec2, size: Vec2) -> Vec2 {
    if start.x <= 0.0 || start.y <= 0.0 {
        return size;
    }
    let scale = size / start;
    let s = if (scale.x - 1.0).abs() >= (scale.y - 1.0).abs() {
        scale.x
    } else {
        scale.y
    };
    (start * s).max(Vec2::ONE)
}
