//! Display order derived from the canonical order.

use std::cmp::Ordering;

use folio_model::{Entry, EntryId, SortKey};
use icu_collator::CollatorBorrowed;
use icu_collator::options::{CollatorOptions, Strength};
use tracing::warn;

use crate::store::EntryStore;

/// Entries in display order for `key`.
///
/// `Default` keeps canonical order. `Name` collates names with the root
/// locale at tertiary strength, so accented letters sort next to their base
/// letter and lowercase precedes uppercase; names the collator considers
/// equal fall back to the raw string. `Size` is descending with unresolved
/// sizes counted as zero. The sort is stable, so ties keep their canonical
/// order.
pub fn project(entries: &[Entry], key: SortKey) -> Vec<&Entry> {
    let mut view: Vec<&Entry> = entries.iter().collect();
    match key {
        SortKey::Default => {}
        SortKey::Name => {
            let collator = name_collator();
            view.sort_by(|a, b| compare_names(collator.as_ref(), &a.display_name, &b.display_name));
        }
        SortKey::Size => view.sort_by_key(|entry| std::cmp::Reverse(entry.size_key())),
    }
    view
}

fn name_collator() -> Option<CollatorBorrowed<'static>> {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Tertiary);
    match CollatorBorrowed::try_new(Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(error) => {
            warn!(%error, "name collation unavailable, sorting by code point");
            None
        }
    }
}

fn compare_names(collator: Option<&CollatorBorrowed<'static>>, a: &str, b: &str) -> Ordering {
    let collated = collator.map_or(Ordering::Equal, |collator| collator.compare(a, b));
    collated.then_with(|| a.cmp(b))
}

/// Ids in display order, captured at one store revision.
///
/// Gestures address the view by slot index; the snapshot translates those
/// slots back to stable ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSnapshot {
    key: SortKey,
    revision: u64,
    ids: Vec<EntryId>,
}

impl ViewSnapshot {
    pub fn capture(store: &EntryStore, key: SortKey) -> Self {
        let ids = project(store.entries(), key)
            .into_iter()
            .map(|entry| entry.id)
            .collect();
        Self {
            key,
            revision: store.revision(),
            ids,
        }
    }

    pub fn key(&self) -> SortKey {
        self.key
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn ids(&self) -> &[EntryId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id_at(&self, index: usize) -> Option<EntryId> {
        self.ids.get(index).copied()
    }

    pub fn index_of(&self, id: EntryId) -> Option<usize> {
        self.ids.iter().position(|candidate| *candidate == id)
    }

    /// True once the store has been mutated since capture.
    pub fn is_stale(&self, store: &EntryStore) -> bool {
        self.revision != store.revision()
    }
}

#[cfg(test)]
mod tests {
    use folio_model::{ByteSize, MetadataPatch};

    use super::*;

    fn names<'a>(view: &[&'a Entry]) -> Vec<&'a str> {
        view.iter().map(|entry| entry.display_name.as_str()).collect()
    }

    fn sized(store: &mut EntryStore, id: EntryId, bytes: u64) {
        let patch = MetadataPatch {
            byte_size: Some(ByteSize::new(bytes)),
            ..MetadataPatch::default()
        };
        store.patch(id, &patch);
    }

    #[test]
    fn default_is_canonical() {
        let mut store = EntryStore::new();
        store.append(["b.pdf", "a.pdf"], None).unwrap();
        assert_eq!(names(&project(store.entries(), SortKey::Default)), ["b.pdf", "a.pdf"]);
    }

    #[test]
    fn name_sort_ignores_case_before_letters() {
        let mut store = EntryStore::new();
        store
            .append(["beta.pdf", "Alpha.pdf", "alpha.pdf", "Gamma.pdf"], None)
            .unwrap();
        assert_eq!(
            names(&project(store.entries(), SortKey::Name)),
            ["alpha.pdf", "Alpha.pdf", "beta.pdf", "Gamma.pdf"]
        );
    }

    #[test]
    fn name_sort_places_accents_with_base_letter() {
        let mut store = EntryStore::new();
        store
            .append(["f.pdf", "é.pdf", "e.pdf", "Zeta.pdf", "Ärzte.pdf"], None)
            .unwrap();
        assert_eq!(
            names(&project(store.entries(), SortKey::Name)),
            ["Ärzte.pdf", "e.pdf", "é.pdf", "f.pdf", "Zeta.pdf"]
        );
    }

    #[test]
    fn size_sort_is_descending_and_stable() {
        let mut store = EntryStore::new();
        let ids = store
            .append(["small.pdf", "pending.pdf", "big.pdf", "tie.pdf"], None)
            .unwrap();
        sized(&mut store, ids[0], 10);
        sized(&mut store, ids[2], 500);
        sized(&mut store, ids[3], 10);
        assert_eq!(
            names(&project(store.entries(), SortKey::Size)),
            ["big.pdf", "small.pdf", "tie.pdf", "pending.pdf"]
        );
    }

    #[test]
    fn snapshot_goes_stale_on_mutation() {
        let mut store = EntryStore::new();
        let ids = store.append(["a.pdf", "b.pdf"], None).unwrap();
        let snapshot = ViewSnapshot::capture(&store, SortKey::Default);
        assert_eq!(snapshot.id_at(1), Some(ids[1]));
        assert_eq!(snapshot.index_of(ids[0]), Some(0));
        assert_eq!(snapshot.id_at(2), None);
        assert!(!snapshot.is_stale(&store));
        store.remove(ids[0]);
        assert!(snapshot.is_stale(&store));
    }
}
