//! Tests for the value cache

#![cfg(test)]

use super::{EntryKind, InspectedValue, MemberKey, Representation, RepresentationKind};
use crate::display::{DisplaySurface, RowKind};
use crate::error::MemberError;
use crate::provider::{LiveValue, MemberDesc, TypeRef};
use crate::test_utils::{Harness, ints};

#[test]
fn test_build_does_not_walk_or_attach() {
    let mut h = Harness::new(10);
    let list = h.heap.alloc_list("List<int>", "int", ints(0..5));

    let cached = InspectedValue::build(
        &h.heap,
        &h.config,
        MemberKey::from("scores"),
        Ok(list),
        TypeRef::object(),
    );
    assert_eq!(cached.row(), None);
    assert_eq!(
        cached.representation().kind(),
        Some(RepresentationKind::Container)
    );
    let exp = cached.expansion().unwrap();
    assert!(exp.entries().is_empty());
    assert_eq!(exp.stats().walks, 0);
    assert_eq!(h.surface.live_rows(), 0);
}

#[test]
fn test_container_label_before_and_after_walk() {
    let mut h = Harness::new(10);
    let list = h.heap.alloc_list("List<int>", "int", ints(0..3));
    let queue = h.heap.alloc_sequence("Queue<int>", "int", ints(0..4));

    let mut list = h.root("list", list);
    let mut queue = h.root("queue", queue);
    assert_eq!(h.row_text(&list), "list: [3] List<int>");
    assert_eq!(h.row_text(&queue), "queue: [?] Queue<int>");

    h.toggle(&mut list, true);
    h.toggle(&mut queue, true);
    assert_eq!(h.row_text(&queue), "queue: [4] Queue<int>");
    assert_eq!(h.row_text(&list), "list: [3] List<int>");
}

#[test]
fn test_scalar_labels() {
    let mut h = Harness::new(10);
    let mode = h.heap.define_enum("Mode", &["Idle", "Run"]);
    let hp = h.root("hp", LiveValue::Int(12));
    let name = h.root("name", LiveValue::Str("manny".into()));
    let state = h.root(
        "state",
        LiveValue::Enum {
            ty: mode,
            variant: "Run".into(),
        },
    );
    let nothing = h.root("nothing", LiveValue::Null);

    assert_eq!(h.row_text(&hp), "hp: 12");
    assert_eq!(h.row_text(&name), "name: \"manny\"");
    assert_eq!(h.row_text(&state), "state: Mode::Run");
    assert_eq!(h.row_text(&nothing), "nothing: null");
}

#[test]
fn test_kind_change_keeps_row() {
    let mut h = Harness::new(10);
    let mut slot = h.root("slot", LiveValue::Int(1));
    let row = slot.row().unwrap();
    assert_eq!(h.surface.row(row).unwrap().kind, RowKind::Value);

    let list = h.heap.alloc_list("List<int>", "int", ints(0..2));
    slot.set_value(&h.heap, &mut h.surface, &h.config, Ok(list));
    slot.sync_row(&mut h.surface);

    assert_eq!(slot.row(), Some(row));
    assert_eq!(h.surface.row(row).unwrap().kind, RowKind::Expandable);
    assert_eq!(h.row_text(&slot), "slot: [2] List<int>");
}

#[test]
fn test_kind_change_tears_down_subtree() {
    let mut h = Harness::new(10);
    let list = h.heap.alloc_list("List<int>", "int", ints(0..4));
    let mut slot = h.root("slot", list);
    h.toggle(&mut slot, true);
    assert_eq!(h.shown_entries(&slot).len(), 4);

    slot.set_value(&h.heap, &mut h.surface, &h.config, Ok(LiveValue::Int(9)));
    slot.sync_row(&mut h.surface);

    assert_eq!(h.surface.live_rows(), 1);
    assert!(slot.expansion().is_none());
    assert_eq!(h.row_text(&slot), "slot: 9");
}

#[test]
fn test_failure_is_inline_cell() {
    let mut h = Harness::new(10);
    let mut hp = h.root("hp", LiveValue::Int(3));

    hp.set_value(
        &h.heap,
        &mut h.surface,
        &h.config,
        Err(MemberError::Read("boom".into())),
    );
    assert!(hp.representation().is_failed());
    assert!(hp.is_dirty());

    hp.sync_row(&mut h.surface);
    assert!(!hp.is_dirty());
    assert_eq!(h.row_text(&hp), "hp: <error: read failed: boom>");
}

#[test]
fn test_dirty_only_when_display_changes() {
    let mut h = Harness::new(10);
    let mut hp = h.root("hp", LiveValue::Int(3));
    assert!(!hp.is_dirty());

    hp.set_value(&h.heap, &mut h.surface, &h.config, Ok(LiveValue::Int(3)));
    assert!(!hp.is_dirty());

    hp.set_value(&h.heap, &mut h.surface, &h.config, Ok(LiveValue::Int(4)));
    assert!(hp.is_dirty());
    let updates = h.surface.stats().text_updates;
    hp.sync_row(&mut h.surface);
    assert_eq!(h.surface.stats().text_updates, updates + 1);
}

#[test]
fn test_unreadable_value() {
    let mut h = Harness::new(10);
    let ghost = h.heap.alloc_struct("Ghost", vec![("hp", LiveValue::Int(1))]);
    h.heap.free(&ghost);

    let cached = InspectedValue::build(
        &h.heap,
        &h.config,
        MemberKey::from("ghost"),
        Ok(ghost),
        TypeRef::object(),
    );
    assert!(matches!(
        cached.representation(),
        Representation::Unreadable(_)
    ));
    assert!(cached.display().starts_with("<unreadable:"));
}

#[test]
fn test_struct_members_and_methods() {
    let mut h = Harness::new(10);
    let player = h.heap.alloc_struct(
        "Player",
        vec![("hp", LiveValue::Int(10)), ("name", LiveValue::Str("a".into()))],
    );
    h.heap
        .add_method(&player, "total_score", "int", Ok(LiveValue::Int(99)));
    h.heap
        .declare_member("Player", MemberDesc::property("level", "int", false));

    let mut player = h.root("player", player);
    assert_eq!(h.row_text(&player), "player: Player");
    h.toggle(&mut player, true);

    let exp = player.expansion().unwrap();
    let kinds: Vec<EntryKind> = exp.entries().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        [
            EntryKind::Field,
            EntryKind::Field,
            EntryKind::Method,
            EntryKind::Property
        ]
    );
    // `level` is declared but has no stored value
    assert!(exp.entry(&MemberKey::from("level")).unwrap().is_failed());
    assert!(!exp.entry(&MemberKey::from("level")).unwrap().access().write);
    assert_eq!(
        h.shown_entries(&player),
        [
            "hp: 10",
            "name: \"a\"",
            "total_score: <not evaluated>",
            "level: <error: read failed: no field 'level'>",
        ]
    );
}

#[test]
fn test_destroy_removes_rows() {
    let mut h = Harness::new(10);
    let list = h.heap.alloc_list("List<int>", "int", ints(0..3));
    let mut list = h.root("list", list);
    h.toggle(&mut list, true);
    let row = list.row().unwrap();

    list.destroy(&mut h.surface);
    assert!(!h.surface.row_exists(row));
    assert_eq!(h.surface.live_rows(), 0);
}
