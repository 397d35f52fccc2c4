//! Drag reconciliation scenarios and properties.

use folio_core::reorder::{plan_move, reconcile_move, resolve_insertion};
use folio_core::{DropTarget, EntryStore, ViewSnapshot};
use folio_model::{ByteSize, EntryId, MetadataPatch, SortKey};
use proptest::prelude::*;

fn store_of(names: &[&str]) -> (EntryStore, Vec<EntryId>) {
    let mut store = EntryStore::new();
    let ids = store
        .append(names.iter().copied(), None)
        .expect("admit entries");
    (store, ids)
}

fn canonical_names(store: &EntryStore) -> Vec<String> {
    store
        .entries()
        .iter()
        .map(|entry| entry.display_name.clone())
        .collect()
}

/// Drag the entry at view slot `from` onto `to`, as a gesture would.
fn drag(store: &mut EntryStore, key: SortKey, from: usize, to: DropTarget) {
    let at_start = ViewSnapshot::capture(store, key);
    let source = at_start.id_at(from).expect("source slot");
    let at_drop = ViewSnapshot::capture(store, key);
    reconcile_move(store, &at_drop, source, to).expect("reconcile");
}

#[test]
fn backward_drag_to_front() {
    let (mut store, _) = store_of(&["A", "B", "C"]);
    drag(&mut store, SortKey::Default, 2, DropTarget::Slot(0));
    assert_eq!(canonical_names(&store), ["C", "A", "B"]);
}

#[test]
fn forward_drag_lands_before_target() {
    let (mut store, _) = store_of(&["A", "B", "C", "D"]);
    drag(&mut store, SortKey::Default, 0, DropTarget::Slot(3));
    assert_eq!(canonical_names(&store), ["B", "C", "A", "D"]);
}

#[test]
fn drag_to_end_appends() {
    let (mut store, _) = store_of(&["A", "B", "C"]);
    drag(&mut store, SortKey::Default, 0, DropTarget::End);
    assert_eq!(canonical_names(&store), ["B", "C", "A"]);
}

#[test]
fn name_sorted_drag_resolves_through_ids() {
    let (mut store, ids) = store_of(&["c.pdf", "a.pdf", "b.pdf"]);
    let view = ViewSnapshot::capture(&store, SortKey::Name);
    assert_eq!(view.ids(), [ids[1], ids[2], ids[0]]);

    // a.pdf onto the slot showing c.pdf, which is canonical index 0.
    let plan = reconcile_move(&mut store, &view, ids[1], DropTarget::Slot(2))
        .expect("reconcile")
        .expect("order changes");
    assert_eq!((plan.from, plan.to), (1, 0));
    assert_eq!(canonical_names(&store), ["a.pdf", "c.pdf", "b.pdf"]);
}

#[test]
fn name_sorted_drag_to_end_appends_canonically() {
    let (mut store, _) = store_of(&["c.pdf", "a.pdf", "b.pdf"]);
    drag(&mut store, SortKey::Name, 0, DropTarget::End);
    assert_eq!(canonical_names(&store), ["c.pdf", "b.pdf", "a.pdf"]);
}

#[test]
fn sort_change_during_drag_uses_drop_time_view() {
    let (mut store, ids) = store_of(&["big.pdf", "small.pdf", "mid.pdf"]);
    for (id, bytes) in ids.iter().zip([900, 10, 500]) {
        let patch = MetadataPatch {
            byte_size: Some(ByteSize::new(bytes)),
            ..MetadataPatch::default()
        };
        store.patch(*id, &patch);
    }

    // Drag starts under the default order on small.pdf.
    let at_start = ViewSnapshot::capture(&store, SortKey::Default);
    let source = at_start.id_at(1).expect("source slot");

    // Drop lands after switching to size order: big, mid, small.
    let at_drop = ViewSnapshot::capture(&store, SortKey::Size);
    reconcile_move(&mut store, &at_drop, source, DropTarget::Slot(0)).expect("reconcile");
    assert_eq!(canonical_names(&store), ["small.pdf", "big.pdf", "mid.pdf"]);
}

#[test]
fn external_insert_at_sorted_slot() {
    let (mut store, _) = store_of(&["c.pdf", "a.pdf", "b.pdf"]);
    let view = ViewSnapshot::capture(&store, SortKey::Name);
    // Slot 0 shows a.pdf, canonical index 1.
    let at = resolve_insertion(&store, &view, DropTarget::Slot(0)).expect("resolve");
    store.append(["new.pdf"], Some(at)).expect("admit");
    assert_eq!(canonical_names(&store), ["c.pdf", "new.pdf", "a.pdf", "b.pdf"]);
}

#[test]
fn planning_does_not_mutate() {
    let (store, ids) = store_of(&["A", "B", "C"]);
    let view = ViewSnapshot::capture(&store, SortKey::Default);
    let revision = store.revision();
    let plan = plan_move(&store, &view, ids[0], DropTarget::End).expect("plan");
    assert!(plan.is_some());
    assert_eq!(store.revision(), revision);
    assert_eq!(canonical_names(&store), ["A", "B", "C"]);
}

/// Remove `from` and reinsert so the item lands where slot `to` was.
fn splice(mut items: Vec<usize>, from: usize, to: Option<usize>) -> Vec<usize> {
    let item = items.remove(from);
    let at = match to {
        Some(to) if from < to => to - 1,
        Some(to) => to,
        None => items.len(),
    };
    items.insert(at, item);
    items
}

fn len_and_slots() -> impl Strategy<Value = (usize, usize, Option<usize>)> {
    (2usize..12).prop_flat_map(|len| (Just(len), 0..len, prop::option::of(0..len)))
}

proptest! {
    #[test]
    fn identity_sort_drag_matches_list_splice((len, from, to) in len_and_slots()) {
        prop_assume!(to != Some(from));
        let names: Vec<String> = (0..len).map(|i| i.to_string()).collect();
        let mut store = EntryStore::new();
        store.append(names.iter().map(String::as_str), None).expect("admit");

        let target = to.map_or(DropTarget::End, DropTarget::Slot);
        drag(&mut store, SortKey::Default, from, target);

        let expected: Vec<String> = splice((0..len).collect(), from, to)
            .into_iter()
            .map(|i| i.to_string())
            .collect();
        prop_assert_eq!(canonical_names(&store), expected);
    }

    #[test]
    fn sorted_drag_keeps_every_id(
        (len, from, to) in len_and_slots(),
        sizes in prop::collection::vec(0u64..5, 12),
        by_name in any::<bool>(),
    ) {
        let names: Vec<String> = (0..len).map(|i| format!("doc-{}.pdf", (len - i) % 4)).collect();
        let mut store = EntryStore::new();
        let ids = store.append(names.iter().map(String::as_str), None).expect("admit");
        for (id, bytes) in ids.iter().zip(&sizes) {
            let patch = MetadataPatch {
                byte_size: Some(ByteSize::new(*bytes)),
                ..MetadataPatch::default()
            };
            store.patch(*id, &patch);
        }
        let key = if by_name { SortKey::Name } else { SortKey::Size };
        let view = ViewSnapshot::capture(&store, key);
        let source = view.id_at(from).expect("source slot");
        let target = to.map_or(DropTarget::End, DropTarget::Slot);

        reconcile_move(&mut store, &view, source, target).expect("reconcile");

        let mut before = ids.clone();
        let mut after: Vec<EntryId> = store.entries().iter().map(|entry| entry.id).collect();
        before.sort_by_key(|id| *id.as_uuid());
        after.sort_by_key(|id| *id.as_uuid());
        prop_assert_eq!(before, after);

        // The dragged entry sits just before the target entry, or last.
        let position = store.position(source).expect("source kept");
        match to.and_then(|slot| view.id_at(slot)) {
            Some(target_id) if target_id != source => {
                prop_assert_eq!(store.position(target_id), Some(position + 1));
            }
            Some(_) => {}
            None => prop_assert_eq!(position, store.len() - 1),
        }
    }
}
