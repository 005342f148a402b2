//! Unit tests for the edit frame.

use std::f32::consts::FRAC_PI_2;
use std::sync::{Arc, Mutex};

use bevy::math::Vec2;

use super::*;
use crate::config::MarkupsConfig;
use crate::geometry::{CameraState, CoordinateMapper, MarkupPlane};
use crate::history::EditActionManager;
use crate::shapes::{Constraints, Markup, MarkupKind, MarkupStore, Style};
use crate::surface::{CanvasOp, RecordingCanvas, SvgScene, VectorSurface};

struct Harness {
    store: MarkupStore,
    history: EditActionManager,
    camera: CameraState,
    plane: MarkupPlane,
    config: MarkupsConfig,
}

impl Harness {
    fn new() -> Self {
        Self {
            store: MarkupStore::new(),
            history: EditActionManager::default(),
            camera: CameraState::screen_aligned(Vec2::new(800.0, 600.0)),
            plane: MarkupPlane::default(),
            config: MarkupsConfig::default(),
        }
    }

    fn ctx(&mut self) -> EditContext<'_> {
        EditContext {
            store: &mut self.store,
            history: &mut self.history,
            mapper: CoordinateMapper::new(&self.camera, &self.plane),
            config: &self.config,
        }
    }

    fn add(&mut self, markup: Markup) -> MarkupId {
        let id = markup.id();
        self.history.execute(EditAction::create(markup), &mut self.store);
        id
    }

    /// A 40x20 rectangle centered on (100, 100).
    fn rectangle(&mut self) -> MarkupId {
        let id = self.store.allocate_id();
        let mut markup = Markup::new(
            MarkupKind::Rectangle,
            id,
            Style::defaults(MarkupKind::Rectangle, 2.0, 16.0),
        );
        markup.set_size(Vec2::new(100.0, 100.0), 40.0, 20.0);
        self.add(markup)
    }

    fn gesture(&mut self, frame: &mut EditFrame, id: MarkupId, mode: DragMode, path: &[Vec2], shift: bool) {
        let (first, rest) = path.split_first().unwrap();
        assert!(frame.begin(&mut self.ctx(), id, mode, *first).is_some());
        for p in rest {
            frame.drag(&mut self.ctx(), *p, shift);
        }
        assert!(frame.end(&mut self.ctx()).is_some());
    }

    fn frame_layout(&self, id: MarkupId) -> FrameLayout {
        let mapper = CoordinateMapper::new(&self.camera, &self.plane);
        layout(&mapper, self.store.get(id).unwrap(), &self.config).unwrap()
    }

    fn hit(&self, id: MarkupId, client: Vec2) -> DragMode {
        let mapper = CoordinateMapper::new(&self.camera, &self.plane);
        hit_test(&mapper, self.store.get(id).unwrap(), &self.config, client)
    }
}

fn approx(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < 1e-3
}

#[test]
fn test_drag_mode_default() {
    assert_eq!(DragMode::default(), DragMode::None);
}

#[test]
fn test_cursor_icons() {
    assert!(DragMode::None.cursor_icon().is_none());
    assert!(DragMode::Move.cursor_icon().is_some());
    assert!(DragMode::Rotate.cursor_icon().is_some());
    assert_eq!(DragMode::ResizeNE.cursor_icon(), DragMode::ResizeSW.cursor_icon());
}

#[test]
fn test_is_resize() {
    assert!(!DragMode::None.is_resize());
    assert!(!DragMode::Move.is_resize());
    assert!(!DragMode::Rotate.is_resize());
    assert!(DragMode::ResizeN.is_resize());
    assert!(DragMode::ResizeSW.is_resize());
    assert!(DragMode::ResizeSW.is_corner());
    assert!(!DragMode::ResizeS.is_corner());
}

#[test]
fn test_layout_of_unrotated_rectangle() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let frame = h.frame_layout(id);

    assert!(approx(frame.corners[0], Vec2::new(80.0, 90.0)));
    assert!(approx(frame.corners[2], Vec2::new(120.0, 110.0)));
    assert_eq!(frame.handles.len(), 8);
    assert!(approx(frame.top_mid, Vec2::new(100.0, 90.0)));
    assert!(approx(frame.rotation_handle.unwrap(), Vec2::new(100.0, 65.0)));
}

#[test]
fn test_locked_axes_hide_handles() {
    let mut h = Harness::new();
    let id = h.rectangle();
    h.store.get_mut(id).unwrap().set_constraints(Constraints {
        width_locked: true,
        height_locked: false,
        rotation_locked: true,
    });
    let frame = h.frame_layout(id);
    let modes: Vec<DragMode> = frame.handles.iter().map(|(m, _)| *m).collect();

    assert_eq!(modes, vec![DragMode::ResizeN, DragMode::ResizeS]);
    assert!(frame.rotation_handle.is_none());
}

#[test]
fn test_arrow_frame_only_resizes_along_its_axis() {
    let mut h = Harness::new();
    let id = h.store.allocate_id();
    let mut arrow = Markup::new(MarkupKind::Arrow, id, Style::defaults(MarkupKind::Arrow, 2.0, 16.0));
    arrow.set_arrow(Vec2::new(100.0, 200.0), Vec2::new(200.0, 200.0));
    h.add(arrow);

    let modes: Vec<DragMode> = h.frame_layout(id).handles.iter().map(|(m, _)| *m).collect();
    assert_eq!(modes, vec![DragMode::ResizeE, DragMode::ResizeW]);

    let mut frame = EditFrame::new();
    h.gesture(
        &mut frame,
        id,
        DragMode::ResizeE,
        &[Vec2::new(200.0, 200.0), Vec2::new(220.0, 230.0)],
        false,
    );
    let (tail, head) = h.store.get(id).unwrap().arrow_points().unwrap();
    assert!(approx(tail, Vec2::new(100.0, 200.0)));
    assert!(approx(head, Vec2::new(220.0, 200.0)));
}

#[test]
fn test_hit_test_priorities() {
    let mut h = Harness::new();
    let id = h.rectangle();

    assert_eq!(h.hit(id, Vec2::new(81.0, 91.0)), DragMode::ResizeNW);
    assert_eq!(h.hit(id, Vec2::new(120.0, 100.0)), DragMode::ResizeE);
    assert_eq!(h.hit(id, Vec2::new(100.0, 66.0)), DragMode::Rotate);
    assert_eq!(h.hit(id, Vec2::new(95.0, 102.0)), DragMode::Move);
    assert_eq!(h.hit(id, Vec2::new(300.0, 300.0)), DragMode::None);
}

#[test]
fn test_move_gesture_merges_into_one_undo_step() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let before = h.history.undo_len();
    let mut frame = EditFrame::new();

    let start = Vec2::new(100.0, 100.0);
    h.gesture(
        &mut frame,
        id,
        DragMode::Move,
        &[start, start + Vec2::new(5.0, 5.0), start + Vec2::new(-5.0, -5.0)],
        false,
    );

    assert!(approx(h.store.get(id).unwrap().position(), Vec2::new(95.0, 95.0)));
    assert_eq!(h.history.undo_len(), before + 1);

    h.history.undo(&mut h.store);
    assert!(approx(h.store.get(id).unwrap().position(), start));
}

#[test]
fn test_shift_move_locks_first_axis_past_dead_zone() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let mut frame = EditFrame::new();
    let start = Vec2::new(100.0, 100.0);

    frame.begin(&mut h.ctx(), id, DragMode::Move, start);
    frame.drag(&mut h.ctx(), Vec2::new(110.0, 103.0), true);
    assert!(approx(h.store.get(id).unwrap().position(), start));

    frame.drag(&mut h.ctx(), Vec2::new(120.0, 104.0), true);
    assert!(approx(h.store.get(id).unwrap().position(), Vec2::new(120.0, 100.0)));

    frame.drag(&mut h.ctx(), Vec2::new(125.0, 140.0), true);
    assert!(approx(h.store.get(id).unwrap().position(), Vec2::new(125.0, 100.0)));
    frame.end(&mut h.ctx());
}

#[test]
fn test_rotation_snaps_to_increment_with_shift() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let center = Vec2::new(100.0, 100.0);
    let grab = center + Vec2::new(50.0, 0.0);
    let forty = 40f32.to_radians();
    let target = center + Vec2::new(forty.cos(), forty.sin()) * 50.0;

    let mut frame = EditFrame::new();
    h.gesture(&mut frame, id, DragMode::Rotate, &[grab, target], true);
    let rotation = h.store.get(id).unwrap().rotation();
    assert!((rotation - 45f32.to_radians()).abs() < 1e-4);

    h.gesture(&mut frame, id, DragMode::Rotate, &[grab, target], false);
    let rotation = h.store.get(id).unwrap().rotation();
    assert!((rotation - 85f32.to_radians()).abs() < 1e-3);
}

#[test]
fn test_rotation_locked_refuses_rotate_gesture() {
    let mut h = Harness::new();
    let id = h.rectangle();
    h.store.get_mut(id).unwrap().set_constraints(Constraints {
        rotation_locked: true,
        ..Default::default()
    });
    assert_ne!(h.hit(id, Vec2::new(100.0, 66.0)), DragMode::Rotate);
    let mut frame = EditFrame::new();
    assert!(frame.begin(&mut h.ctx(), id, DragMode::Rotate, Vec2::ZERO).is_none());
    assert!(!frame.is_active());
}

#[test]
fn test_resize_east_keeps_west_edge() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let mut frame = EditFrame::new();
    h.gesture(
        &mut frame,
        id,
        DragMode::ResizeE,
        &[Vec2::new(120.0, 100.0), Vec2::new(140.0, 130.0)],
        false,
    );

    let markup = h.store.get(id).unwrap();
    assert!(approx(markup.size(), Vec2::new(60.0, 20.0)));
    assert!(approx(markup.position(), Vec2::new(110.0, 100.0)));
}

#[test]
fn test_resize_works_in_the_rotated_frame() {
    let mut h = Harness::new();
    let id = h.rectangle();
    h.store.get_mut(id).unwrap().set_rotation(FRAC_PI_2);
    let mut frame = EditFrame::new();

    // Rotated a quarter turn, the east handle points down the screen.
    h.gesture(
        &mut frame,
        id,
        DragMode::ResizeE,
        &[Vec2::new(100.0, 120.0), Vec2::new(100.0, 140.0)],
        false,
    );

    let markup = h.store.get(id).unwrap();
    assert!(approx(markup.size(), Vec2::new(60.0, 20.0)));
    assert!(approx(markup.position(), Vec2::new(100.0, 110.0)));
}

#[test]
fn test_shift_corner_resize_keeps_aspect_ratio() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let mut frame = EditFrame::new();
    h.gesture(
        &mut frame,
        id,
        DragMode::ResizeSE,
        &[Vec2::new(120.0, 110.0), Vec2::new(160.0, 115.0)],
        true,
    );

    let markup = h.store.get(id).unwrap();
    assert!(approx(markup.size(), Vec2::new(80.0, 40.0)));
    assert!(approx(markup.position(), Vec2::new(120.0, 110.0)));
}

#[test]
fn test_resize_never_collapses_below_one_unit() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let mut frame = EditFrame::new();
    h.gesture(
        &mut frame,
        id,
        DragMode::ResizeE,
        &[Vec2::new(120.0, 100.0), Vec2::new(0.0, 100.0)],
        false,
    );
    assert!((h.store.get(id).unwrap().size().x - 1.0).abs() < 1e-4);
}

#[test]
fn test_gesture_events_reach_listeners() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut frame = EditFrame::new();
    frame.add_listener(Box::new(move |event: &FrameEvent| {
        sink.lock().unwrap().push(*event);
    }));

    h.gesture(
        &mut frame,
        id,
        DragMode::Move,
        &[Vec2::new(100.0, 100.0), Vec2::new(110.0, 100.0)],
        false,
    );

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            FrameEvent::EditionStarted {
                target: id,
                mode: DragMode::Move
            },
            FrameEvent::EditionEnded {
                target: id,
                mode: DragMode::Move
            },
        ]
    );
    assert!(!frame.is_active());
    assert_eq!(frame.mode(), DragMode::None);
}

#[test]
fn test_cancel_reverts_the_gesture() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let before = h.history.undo_len();
    let mut frame = EditFrame::new();

    frame.begin(&mut h.ctx(), id, DragMode::Move, Vec2::new(100.0, 100.0));
    frame.drag(&mut h.ctx(), Vec2::new(150.0, 100.0), false);
    assert!(frame.cancel(&mut h.ctx()).is_some());

    assert!(approx(h.store.get(id).unwrap().position(), Vec2::new(100.0, 100.0)));
    assert_eq!(h.history.undo_len(), before);
}

#[test]
fn test_begin_on_missing_target_is_ignored() {
    let mut h = Harness::new();
    let mut frame = EditFrame::new();
    assert!(frame.begin(&mut h.ctx(), 42, DragMode::Move, Vec2::ZERO).is_none());
    assert!(!h.history.is_group_open());
}

#[test]
fn test_overlay_redraws_and_clears() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let frame = h.frame_layout(id);
    let mut scene = SvgScene::new();
    let root = scene.root();
    let base = scene.len();
    let mut overlay = FrameOverlay::new();

    overlay.update(&mut scene, root, Some(&frame));
    // Outline, rotation stem and knob, eight handles.
    assert_eq!(overlay.node_count(), 11);
    assert_eq!(scene.len(), base + 11);

    overlay.update(&mut scene, root, Some(&frame));
    assert_eq!(scene.len(), base + 11);

    overlay.update(&mut scene, root, None);
    assert_eq!(overlay.node_count(), 0);
    assert_eq!(scene.len(), base);
}

#[test]
fn test_frame_paints_outline_and_handles() {
    let mut h = Harness::new();
    let id = h.rectangle();
    let frame = h.frame_layout(id);
    let mut canvas = RecordingCanvas::new();
    frame.render_to_canvas(&mut canvas);

    assert_eq!(canvas.count(|op| matches!(op, CanvasOp::Fill)), 9);
    assert_eq!(canvas.count(|op| matches!(op, CanvasOp::Ellipse { .. })), 1);
    assert_eq!(canvas.ops.first(), Some(&CanvasOp::Save));
    assert_eq!(canvas.ops.last(), Some(&CanvasOp::Restore));
}
