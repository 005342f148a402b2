//! Unit tests for the history module.

use std::sync::{Arc, Mutex};

use bevy::math::Vec2;

use super::*;
use crate::shapes::{Markup, MarkupId, MarkupKind, MarkupStore, Style, style};

fn new_shape(store: &mut MarkupStore, kind: MarkupKind) -> Markup {
    let id = store.allocate_id();
    let mut markup = Markup::new(kind, id, Style::defaults(kind, 2.0, 16.0));
    match kind {
        MarkupKind::Arrow => markup.set_arrow(Vec2::ZERO, Vec2::new(40.0, 10.0)),
        MarkupKind::Freehand => markup.set_freehand(&[Vec2::ZERO, Vec2::new(5.0, 8.0)]),
        _ => markup.set_size(Vec2::new(20.0, 20.0), 40.0, 30.0),
    }
    markup.set_text("hello");
    markup
}

fn create(history: &mut EditActionManager, store: &mut MarkupStore, kind: MarkupKind) -> MarkupId {
    let markup = new_shape(store, kind);
    let id = markup.id();
    history.execute(EditAction::create(markup), store);
    id
}

/// Observable state used by the round-trip law.
fn observe(store: &MarkupStore, id: MarkupId) -> Option<(Vec2, Vec2, f32, Style, Option<String>)> {
    store.get(id).map(|m| {
        (
            m.position(),
            m.size(),
            m.rotation(),
            m.style().clone(),
            m.text().map(str::to_string),
        )
    })
}

#[test]
fn test_execute_undo_redo_round_trip_for_every_action() {
    for kind in MarkupKind::ALL {
        let mut store = MarkupStore::new();
        let mut history = EditActionManager::default();
        let id = create(&mut history, &mut store, kind);

        let mut red = Style::defaults(kind, 5.0, 30.0);
        red.set(style::STROKE_COLOR, "#00ff00");

        type MakeAction = Box<dyn Fn(&MarkupStore) -> Option<EditAction>>;
        let makers: Vec<MakeAction> = vec![
            Box::new(move |s: &MarkupStore| EditAction::set_position(s, id, Vec2::new(7.5, -3.25))),
            Box::new(move |s: &MarkupStore| {
                EditAction::set_size(s, id, Vec2::new(1.0, 2.0), Vec2::new(60.0, 45.0))
            }),
            Box::new(move |s: &MarkupStore| EditAction::set_rotation(s, id, 0.75)),
            Box::new(move |s: &MarkupStore| EditAction::set_style(s, id, &red)),
            Box::new(move |s: &MarkupStore| EditAction::set_text(s, id, "changed")),
            Box::new(move |s: &MarkupStore| {
                EditAction::set_arrow(s, id, Vec2::new(1.0, 1.0), Vec2::new(9.0, 30.0))
            }),
            Box::new(move |s: &MarkupStore| EditAction::set_freehand(s, id, &[Vec2::ONE, Vec2::new(30.0, 2.0)])),
        ];

        for make in &makers {
            let Some(action) = make(&store) else {
                continue;
            };
            let before = observe(&store, id);
            history.execute(action, &mut store);
            let after = observe(&store, id);

            history.undo(&mut store);
            assert_eq!(observe(&store, id), before, "{:?} undo", kind);
            history.redo(&mut store);
            assert_eq!(observe(&store, id), after, "{:?} redo", kind);
        }
    }
}

#[test]
fn test_create_delete_and_clone_round_trip() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let a = create(&mut history, &mut store, MarkupKind::Rectangle);
    let b = create(&mut history, &mut store, MarkupKind::Circle);

    let delete = EditAction::delete(&store, a).unwrap();
    history.execute(delete, &mut store);
    assert!(!store.contains(a));

    history.undo(&mut store);
    // Restored at its original stacking position
    assert_eq!(store.ids(), vec![a, b]);

    let mut copy = store.get(b).unwrap().clone_shape();
    let c = store.allocate_id();
    copy.set_id(c);
    history.execute(EditAction::clone_markup(copy), &mut store);
    assert_eq!(store.ids(), vec![a, b, c]);
    history.undo(&mut store);
    assert_eq!(store.ids(), vec![a, b]);
    history.redo(&mut store);
    assert_eq!(store.ids(), vec![a, b, c]);
}

#[test]
fn test_execute_clears_redo() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let id = create(&mut history, &mut store, MarkupKind::Circle);
    let action = EditAction::set_position(&store, id, Vec2::ONE).unwrap();
    history.execute(action, &mut store);

    history.undo(&mut store);
    assert!(!history.is_redo_stack_empty());

    let action = EditAction::set_rotation(&store, id, 1.0).unwrap();
    history.execute(action, &mut store);
    assert!(history.is_redo_stack_empty());
}

#[test]
fn test_undo_stack_is_bounded_fifo() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::new(3);
    let id = create(&mut history, &mut store, MarkupKind::Rectangle);
    for i in 1..=5 {
        let action = EditAction::set_position(&store, id, Vec2::splat(i as f32)).unwrap();
        history.execute(action, &mut store);
        assert!(history.undo_len() <= 3);
    }
    assert_eq!(history.undo_len(), 3);

    // The oldest groups (create, move to 1, move to 2) were evicted
    while history.undo(&mut store).is_some() {}
    assert_eq!(store.get(id).map(|m| m.position()), Some(Vec2::splat(2.0)));
}

#[test]
fn test_identity_actions_are_dropped() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let id = create(&mut history, &mut store, MarkupKind::Circle);
    let undo_len = history.undo_len();

    let same = store.get(id).unwrap().position();
    let action = EditAction::set_position(&store, id, same).unwrap();
    assert!(action.is_identity());
    history.execute(action, &mut store);
    assert_eq!(history.undo_len(), undo_len);
}

#[test]
fn test_group_merges_drag_into_one_step() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let id = create(&mut history, &mut store, MarkupKind::Circle);
    let start = store.get(id).unwrap().position();

    history.begin_action_group();
    for offset in [Vec2::new(5.0, 5.0), Vec2::new(-5.0, -5.0)] {
        let action = EditAction::set_position(&store, id, start + offset).unwrap();
        history.execute(action, &mut store);
    }
    history.close_action_group();
    assert_eq!(history.undo_len(), 2);

    let event = history.undo(&mut store).unwrap();
    assert_eq!(event.target_id, Some(id));
    assert_eq!(store.get(id).unwrap().position(), start);
    assert!(store.contains(id));
}

#[test]
fn test_compaction_keeps_earliest_old_and_newest_new() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let id = create(&mut history, &mut store, MarkupKind::Rectangle);

    let mut group = EditActionGroup::new();
    for r in [0.1, 0.2, 0.3] {
        let mut action = EditAction::set_rotation(&store, id, r).unwrap();
        action.redo(&mut store);
        group.add_action(action);
    }
    assert_eq!(group.len(), 1);
    assert_eq!(
        group.actions()[0].kind,
        ActionKind::SetRotation { old: 0.0, new: 0.3 }
    );

    // Returning to the start makes the merged action an identity
    let mut back = EditAction::set_rotation(&store, id, 0.0).unwrap();
    back.redo(&mut store);
    group.add_action(back);
    assert!(group.is_empty());
}

#[test]
fn test_group_with_returning_move_stays_an_undo_step() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let id = create(&mut history, &mut store, MarkupKind::Circle);
    let start = store.get(id).unwrap().position();

    history.begin_action_group();
    for p in [start + Vec2::ONE, start] {
        let action = EditAction::set_position(&store, id, p).unwrap();
        history.execute(action, &mut store);
    }
    history.close_action_group();
    assert_eq!(history.undo_len(), 2);

    history.undo(&mut store);
    assert!(store.contains(id));
    assert_eq!(store.get(id).unwrap().position(), start);
    assert_eq!(history.undo_len(), 1);
}

#[test]
fn test_group_with_only_identity_actions_is_dropped_on_close() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let id = create(&mut history, &mut store, MarkupKind::Circle);
    let start = store.get(id).unwrap().position();

    history.begin_action_group();
    let action = EditAction::set_position(&store, id, start).unwrap();
    history.execute(action, &mut store);
    history.close_action_group();
    assert_eq!(history.undo_len(), 1);
}

#[test]
fn test_cancel_group_discards_creation() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();

    history.begin_action_group();
    let markup = new_shape(&mut store, MarkupKind::Rectangle);
    let id = markup.id();
    history.execute(EditAction::create(markup), &mut store);
    let action = EditAction::set_size(&store, id, Vec2::ZERO, Vec2::splat(2.0)).unwrap();
    history.execute(action, &mut store);

    let event = history.cancel_action_group(&mut store).unwrap();
    assert_eq!(event.action, HistoryAction::Cancel);
    assert!(!store.contains(id));
    assert!(history.is_undo_stack_empty());
    assert!(!history.is_group_open());
}

#[test]
fn test_actions_outside_history_are_applied_only() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let markup = new_shape(&mut store, MarkupKind::Cloud);
    let id = markup.id();
    history.execute(EditAction::create(markup).with_history(false), &mut store);
    assert!(store.contains(id));
    assert!(history.is_undo_stack_empty());
}

#[test]
fn test_missing_target_is_noop() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let id = create(&mut history, &mut store, MarkupKind::Rectangle);
    let mut action = EditAction::set_position(&store, id, Vec2::splat(9.0)).unwrap();

    let delete = EditAction::delete(&store, id).unwrap();
    history.execute(delete, &mut store);

    action.redo(&mut store);
    action.undo(&mut store);
    assert!(store.is_empty());
    assert!(EditAction::set_position(&store, id, Vec2::ZERO).is_none());
}

#[test]
fn test_listeners_receive_events() {
    let seen: Arc<Mutex<Vec<HistoryEvent>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    history.add_listener(Box::new(move |event| {
        if let Ok(mut events) = sink.lock() {
            events.push(*event);
        }
    }));

    let id = create(&mut history, &mut store, MarkupKind::Arrow);
    history.undo(&mut store);
    history.redo(&mut store);
    history.clear();

    let events = seen.lock().unwrap();
    let actions: Vec<_> = events.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            HistoryAction::Execute,
            HistoryAction::Undo,
            HistoryAction::Redo,
            HistoryAction::Clear
        ]
    );
    assert_eq!(events[1].target_id, Some(id));
    assert!(history.is_undo_stack_empty() && history.is_redo_stack_empty());
}

#[test]
fn test_merge_requires_same_type_and_target() {
    let mut store = MarkupStore::new();
    let mut history = EditActionManager::default();
    let a = create(&mut history, &mut store, MarkupKind::Rectangle);
    let b = create(&mut history, &mut store, MarkupKind::Rectangle);

    let mut move_a = EditAction::set_position(&store, a, Vec2::ONE).unwrap();
    let move_b = EditAction::set_position(&store, b, Vec2::ONE).unwrap();
    let rotate_a = EditAction::set_rotation(&store, a, 1.0).unwrap();
    assert!(!move_a.merge(&move_b));
    assert!(!move_a.merge(&rotate_a));
    assert_eq!(move_a.action_type().name(), "SET-POSITION");
}
