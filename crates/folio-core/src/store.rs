//! Canonical ordering of the working set.
//!
//! The store's sequence order is the merge order. Every view is derived from
//! it and every mutation goes through it.

use std::path::PathBuf;

use folio_model::{Entry, EntryId, MetadataPatch, ModelError};
use tracing::debug;

use crate::error::StoreError;

/// Ordered collection of admitted entries, with unique ids.
#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    entries: Vec<Entry>,
    revision: u64,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in canonical order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counter bumped by every mutation that changes the store.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Canonical index of `id`.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.position(id).is_some()
    }

    /// Source paths in canonical order, as handed to the merge engine.
    pub fn ordered_sources(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|entry| entry.source.clone()).collect()
    }

    /// Admit `sources` as new pending entries.
    ///
    /// Entries are appended, or inserted contiguously starting at `at` when
    /// given (clamped to the current length). Either every source is admitted
    /// or none is.
    pub fn append<I, P>(&mut self, sources: I, at: Option<usize>) -> Result<Vec<EntryId>, ModelError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let admitted = sources
            .into_iter()
            .map(Entry::admit)
            .collect::<Result<Vec<_>, _>>()?;
        if admitted.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<EntryId> = admitted.iter().map(|entry| entry.id).collect();
        let index = at.map_or(self.entries.len(), |at| at.min(self.entries.len()));
        self.entries.splice(index..index, admitted);
        self.bump();
        debug!(count = ids.len(), index, len = self.entries.len(), "admitted entries");
        Ok(ids)
    }

    /// Remove the entry with `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let index = self.position(id)?;
        let removed = self.entries.remove(index);
        self.bump();
        debug!(%id, index, "removed entry");
        Some(removed)
    }

    /// Merge metadata into the entry with `id`.
    ///
    /// Returns whether the entry changed. A patch for an id that is no longer
    /// present is discarded.
    pub fn patch(&mut self, id: EntryId, patch: &MetadataPatch) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.id == id) else {
            debug!(%id, "discarding metadata for removed entry");
            return false;
        };
        let changed = entry.apply(patch);
        if changed {
            self.bump();
        }
        changed
    }

    /// Move `id` so that it ends up at canonical index `to`.
    ///
    /// `to` is an index into the sequence after the entry has been taken out,
    /// clamped to its end. The removal and reinsertion happen as one step.
    pub fn move_entry(&mut self, id: EntryId, to: usize) -> Result<(), StoreError> {
        let from = self.position(id).ok_or(StoreError::UnknownEntry(id))?;
        let entry = self.entries.remove(from);
        let to = to.min(self.entries.len());
        self.entries.insert(to, entry);
        if from != to {
            self.bump();
            debug!(%id, from, to, "moved entry");
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let count = self.entries.len();
        self.entries.clear();
        self.bump();
        debug!(count, "cleared working set");
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(store: &EntryStore) -> Vec<&str> {
        store
            .entries()
            .iter()
            .map(|entry| entry.display_name.as_str())
            .collect()
    }

    #[test]
    fn append_at_index_is_contiguous() {
        let mut store = EntryStore::new();
        store.append(["a.pdf", "d.pdf"], None).unwrap();
        store.append(["b.pdf", "c.pdf"], Some(1)).unwrap();
        assert_eq!(names(&store), ["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
    }

    #[test]
    fn append_clamps_index() {
        let mut store = EntryStore::new();
        store.append(["a.pdf"], Some(9)).unwrap();
        store.append(["b.pdf"], Some(9)).unwrap();
        assert_eq!(names(&store), ["a.pdf", "b.pdf"]);
    }

    #[test]
    fn append_is_all_or_nothing() {
        let mut store = EntryStore::new();
        let err = store.append(["a.pdf", ""], None).unwrap_err();
        assert!(matches!(err, ModelError::EmptySource));
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut store = EntryStore::new();
        store.append(["a.pdf"], None).unwrap();
        let revision = store.revision();
        assert!(store.remove(EntryId::new()).is_none());
        assert_eq!(store.revision(), revision);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn move_entry_unknown_id_fails() {
        let mut store = EntryStore::new();
        let id = EntryId::new();
        assert_eq!(store.move_entry(id, 0), Err(StoreError::UnknownEntry(id)));
    }

    #[test]
    fn move_entry_to_end() {
        let mut store = EntryStore::new();
        let ids = store.append(["a.pdf", "b.pdf", "c.pdf"], None).unwrap();
        store.move_entry(ids[0], 2).unwrap();
        assert_eq!(names(&store), ["b.pdf", "c.pdf", "a.pdf"]);
    }

    #[test]
    fn clear_bumps_revision_once() {
        let mut store = EntryStore::new();
        store.append(["a.pdf", "b.pdf"], None).unwrap();
        let revision = store.revision();
        store.clear();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.revision(), revision + 1);
    }
}
