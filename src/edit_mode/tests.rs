//! Unit tests for edit modes.

use bevy::math::Vec2;

use super::*;
use crate::geometry::{CameraState, MarkupPlane};
use crate::shapes::{ShapeData, style};

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

    fn drag(&mut self, mode: &mut EditMode, path: &[Vec2]) -> CreationOutcome {
        let (first, rest) = path.split_first().unwrap();
        assert!(mode.on_pointer_down(&mut self.ctx(), *first));
        for p in rest {
            mode.on_pointer_move(&mut self.ctx(), *p);
        }
        let last = *path.last().unwrap();
        mode.on_pointer_up(&mut self.ctx(), last)
    }
}

fn mode(kind: MarkupKind) -> EditMode {
    EditMode::new(kind, Style::defaults(kind, 2.0, 16.0))
}

#[test]
fn test_rectangle_drag_creates_one_undo_step() {
    let mut h = Harness::new();
    let mut rect = mode(MarkupKind::Rectangle);
    let outcome = h.drag(
        &mut rect,
        &[Vec2::new(10.0, 10.0), Vec2::new(30.0, 20.0), Vec2::new(50.0, 50.0)],
    );

    let CreationOutcome::Created { id, selected } = outcome else {
        panic!("expected a shape, got {:?}", outcome);
    };
    assert!(!selected);
    assert_eq!(rect.selected(), None);
    assert!(!rect.is_creating());

    let markup = h.store.get(id).unwrap();
    assert!((markup.position() - Vec2::new(30.0, 30.0)).length() < 1e-3);
    assert!((markup.size() - Vec2::new(40.0, 40.0)).length() < 1e-3);
    assert_eq!(h.history.undo_len(), 1);

    h.history.undo(&mut h.store);
    assert!(h.store.is_empty());
}

#[test]
fn test_too_small_rectangle_is_cancelled() {
    let mut h = Harness::new();
    let mut rect = mode(MarkupKind::Rectangle);
    let outcome = h.drag(
        &mut rect,
        &[Vec2::new(100.0, 100.0), Vec2::new(140.0, 140.0), Vec2::new(105.0, 105.0)],
    );
    assert_eq!(outcome, CreationOutcome::Cancelled);
    assert!(h.store.is_empty());
    assert!(h.history.is_undo_stack_empty());
    assert!(!h.history.is_group_open());
}

#[test]
fn test_minimum_size_is_configurable() {
    let mut h = Harness::new();
    h.config.min_create_size_px = 15.0;
    let mut rect = mode(MarkupKind::Rectangle);
    let outcome = h.drag(
        &mut rect,
        &[Vec2::new(100.0, 100.0), Vec2::new(140.0, 140.0), Vec2::new(110.0, 110.0)],
    );
    assert_eq!(outcome, CreationOutcome::Cancelled);

    h.config.min_create_size_px = 0.0;
    let outcome = h.drag(&mut rect, &[Vec2::new(100.0, 100.0)]);
    assert!(matches!(outcome, CreationOutcome::Created { .. }));
    assert_eq!(h.store.len(), 1);
}

#[test]
fn test_arrow_follows_pointer() {
    let mut h = Harness::new();
    let mut arrow = mode(MarkupKind::Arrow);
    let outcome = h.drag(&mut arrow, &[Vec2::ZERO, Vec2::new(100.0, 0.0)]);
    let CreationOutcome::Created { id, .. } = outcome else {
        panic!("expected an arrow");
    };
    let markup = h.store.get(id).unwrap();
    let (tail, head) = markup.arrow_points().unwrap();
    assert!(tail.length() < 1e-3);
    assert!((head - Vec2::new(100.0, 0.0)).length() < 1e-3);
    assert!((markup.size().x - 100.0).abs() < 1e-3);
}

#[test]
fn test_pointer_is_clamped_to_viewport() {
    let mut h = Harness::new();
    let mut rect = mode(MarkupKind::Rectangle);
    let outcome = h.drag(&mut rect, &[Vec2::new(700.0, 500.0), Vec2::new(2000.0, 2000.0)]);
    let CreationOutcome::Created { id, .. } = outcome else {
        panic!("expected a shape");
    };
    let size = h.store.get(id).unwrap().size();
    assert!((size - Vec2::new(100.0, 100.0)).length() < 1e-3);
}

#[test]
fn test_freehand_samples_respect_spacing() {
    let mut h = Harness::new();
    let mut pen = mode(MarkupKind::Freehand);
    let outcome = h.drag(
        &mut pen,
        &[
            Vec2::new(10.0, 10.0),
            Vec2::new(10.5, 10.0),
            Vec2::new(20.0, 20.0),
            Vec2::new(30.0, 10.0),
        ],
    );
    let CreationOutcome::Created { id, .. } = outcome else {
        panic!("expected a stroke");
    };
    let ShapeData::Freehand(path) = h.store.get(id).unwrap().data() else {
        panic!("expected freehand data");
    };
    assert_eq!(path.points.len(), 3);
    assert_eq!(h.history.undo_len(), 1);
}

#[test]
fn test_text_click_uses_default_box_and_stays_selected() {
    let mut h = Harness::new();
    let mut text = mode(MarkupKind::Text);
    let outcome = h.drag(&mut text, &[Vec2::new(50.0, 60.0)]);
    let CreationOutcome::Created { id, selected } = outcome else {
        panic!("expected a label");
    };
    assert!(selected);
    assert_eq!(text.selected(), Some(id));

    let markup = h.store.get(id).unwrap();
    assert!((markup.size() - Vec2::new(200.0, 50.0)).length() < 1e-3);
    assert!((markup.position() - Vec2::new(150.0, 85.0)).length() < 1e-3);
    assert_eq!(markup.text(), Some(""));
}

#[test]
fn test_pointer_down_with_selection_is_not_handled() {
    let mut h = Harness::new();
    let mut circle = mode(MarkupKind::Circle);
    circle.set_selected(Some(42));
    assert!(!circle.on_pointer_down(&mut h.ctx(), Vec2::new(5.0, 5.0)));
    assert!(h.store.is_empty());
}

#[test]
fn test_abort_discards_creation() {
    let mut h = Harness::new();
    let mut cloud = mode(MarkupKind::Cloud);
    assert!(cloud.on_pointer_down(&mut h.ctx(), Vec2::new(5.0, 5.0)));
    cloud.on_pointer_move(&mut h.ctx(), Vec2::new(80.0, 80.0));
    cloud.abort(&mut h.ctx());
    assert!(h.store.is_empty());
    assert!(!cloud.is_creating());
}

#[test]
fn test_mode_style_accepts_only_its_keys() {
    let mut arrow = mode(MarkupKind::Arrow);
    assert!(arrow.set_style_value(style::STROKE_WIDTH, "6"));
    assert!(!arrow.set_style_value(style::FILL_COLOR, "#00ff00"));
    assert_eq!(arrow.style().get(style::FILL_COLOR), None);
    assert_eq!(arrow.style_keys().len(), 3);

    // Customized styles survive reseeding
    arrow.seed_style(9.0, 9.0);
    assert_eq!(arrow.style().number(style::STROKE_WIDTH), Some(6.0));
}

#[test]
fn test_edit_modes_switch_active_kind() {
    let mut modes = EditModes::new(2.0, 16.0);
    assert_eq!(modes.active_kind(), MarkupKind::Arrow);
    modes.set_active(MarkupKind::Text);
    assert_eq!(modes.active().kind(), MarkupKind::Text);
    modes.active_mut().set_style_value(style::FONT_SIZE, "30");
    assert_eq!(
        modes.get(MarkupKind::Text).style().number(style::FONT_SIZE),
        Some(30.0)
    );
}
