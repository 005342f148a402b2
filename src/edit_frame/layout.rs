//! Handle positions and hit testing.

use bevy::math::Vec2;

use crate::config::MarkupsConfig;
use crate::constants::HIT_TOLERANCE_PX;
use crate::geometry::{CoordinateMapper, rotate_vector, to_local};
use crate::shapes::{Markup, MarkupId};

use super::DragMode;

/// The frame around one shape, in client pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub target: MarkupId,
    /// NW, NE, SE, SW
    pub corners: [Vec2; 4],
    /// Visible resize handles
    pub handles: Vec<(DragMode, Vec2)>,
    /// Middle of the top edge, where the rotation stem starts
    pub top_mid: Vec2,
    pub rotation_handle: Option<Vec2>,
    pub handle_size: f32,
}

/// Lay out the frame for `markup`. `None` when the shape cannot be mapped.
pub fn layout(
    mapper: &CoordinateMapper<'_>,
    markup: &Markup,
    config: &MarkupsConfig,
) -> Option<FrameLayout> {
    let half = markup.size() * 0.5;
    let center = markup.position();
    let rotation = markup.rotation();
    let to_client =
        |local: Vec2| mapper.markup_to_client(center + rotate_vector(local, rotation));

    let corners = [
        to_client(Vec2::new(-half.x, -half.y))?,
        to_client(Vec2::new(half.x, -half.y))?,
        to_client(Vec2::new(half.x, half.y))?,
        to_client(Vec2::new(-half.x, half.y))?,
    ];
    let top_mid = to_client(Vec2::new(0.0, -half.y))?;

    let constraints = markup.constraints();
    let mut handles = Vec::with_capacity(8);
    if !constraints.width_locked && !constraints.height_locked {
        handles.push((DragMode::ResizeNW, corners[0]));
        handles.push((DragMode::ResizeNE, corners[1]));
        handles.push((DragMode::ResizeSE, corners[2]));
        handles.push((DragMode::ResizeSW, corners[3]));
    }
    if !constraints.height_locked {
        handles.push((DragMode::ResizeN, top_mid));
        handles.push((DragMode::ResizeS, to_client(Vec2::new(0.0, half.y))?));
    }
    if !constraints.width_locked {
        handles.push((DragMode::ResizeE, to_client(Vec2::new(half.x, 0.0))?));
        handles.push((DragMode::ResizeW, to_client(Vec2::new(-half.x, 0.0))?));
    }

    let rotation_handle = if constraints.rotation_locked {
        None
    } else {
        let center_client = to_client(Vec2::ZERO)?;
        let mut up = (top_mid - center_client).normalize_or_zero();
        if up == Vec2::ZERO {
            up = (to_client(Vec2::new(0.0, -1.0))? - center_client).normalize_or_zero();
        }
        Some(top_mid + up * config.rotation_handle_offset_px)
    };

    Some(FrameLayout {
        target: markup.id(),
        corners,
        handles,
        top_mid,
        rotation_handle,
        handle_size: config.handle_size_px,
    })
}

/// Which part of the frame around `markup` is under `client`.
pub fn hit_test(
    mapper: &CoordinateMapper<'_>,
    markup: &Markup,
    config: &MarkupsConfig,
    client: Vec2,
) -> DragMode {
    let Some(frame) = layout(mapper, markup, config) else {
        return DragMode::None;
    };
    let reach = frame.handle_size;

    if let Some(handle) = frame.rotation_handle
        && handle.distance(client) <= reach
    {
        return DragMode::Rotate;
    }
    // Corners come first in the list so they win over edges on tiny shapes.
    for (mode, position) in &frame.handles {
        if position.distance(client) <= reach {
            return *mode;
        }
    }

    let Some(point) = mapper.client_to_markup(client) else {
        return DragMode::None;
    };
    let tolerance = mapper
        .client_to_markup_distance(HIT_TOLERANCE_PX)
        .unwrap_or(0.0);
    let local = to_local(point, markup.position(), markup.rotation());
    let half = markup.size() * 0.5;
    if local.x.abs() <= half.x + tolerance && local.y.abs() <= half.y + tolerance {
        DragMode::Move
    } else {
        DragMode::None
    }
}
