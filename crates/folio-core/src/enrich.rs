//! Background metadata resolution.
//!
//! Every admitted entry gets one lookup. Lookups run concurrently and finish
//! in any order; results are matched back to entries by id, so an entry that
//! moved in the meantime is still patched and one that was removed is skipped.

use std::path::PathBuf;
use std::sync::Arc;

use folio_model::{DocumentInfo, EntryId, MetadataPatch};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::engine::DocumentEngine;
use crate::error::EngineError;
use crate::store::EntryStore;

/// A finished lookup for one entry.
#[derive(Debug)]
pub struct Enrichment {
    pub id: EntryId,
    pub source: PathBuf,
    pub result: Result<DocumentInfo, EngineError>,
}

/// What applying an [`Enrichment`] did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    Patched(EntryId),
    /// The metadata matched what the entry already had.
    Unchanged(EntryId),
    /// The entry was removed before the lookup finished.
    Discarded(EntryId),
    /// The lookup failed; the entry stays pending.
    Failed(EntryId),
}

/// In-flight metadata lookups.
pub struct EnrichmentPipeline<E: ?Sized> {
    engine: Arc<E>,
    inflight: JoinSet<Enrichment>,
}

impl<E> EnrichmentPipeline<E>
where
    E: DocumentEngine + ?Sized + 'static,
{
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            engine,
            inflight: JoinSet::new(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inflight.len()
    }

    /// Start a lookup for `id`. Must be called from within a Tokio runtime.
    pub fn request(&mut self, id: EntryId, source: PathBuf) {
        let engine = Arc::clone(&self.engine);
        debug!(%id, source = %source.display(), "requesting metadata");
        self.inflight.spawn(async move {
            let result = engine.fetch_metadata(&source).await;
            Enrichment { id, source, result }
        });
    }

    /// Next finished lookup, or `None` once nothing is in flight.
    pub async fn next(&mut self) -> Option<Enrichment> {
        loop {
            match self.inflight.join_next().await? {
                Ok(enrichment) => return Some(enrichment),
                Err(err) if err.is_cancelled() => debug!("metadata lookup aborted"),
                Err(err) => warn!(error = %err, "metadata task did not complete"),
            }
        }
    }

    /// Stop every outstanding lookup. Aborted lookups yield nothing from
    /// [`next`](Self::next).
    pub fn abort_all(&mut self) {
        self.inflight.abort_all();
    }

    /// Wait for every outstanding lookup and apply it to `store`.
    pub async fn settle(&mut self, store: &mut EntryStore) -> Vec<EnrichmentOutcome> {
        let mut outcomes = Vec::new();
        while let Some(enrichment) = self.next().await {
            outcomes.push(apply(store, enrichment));
        }
        outcomes
    }
}

/// Patch the entry a lookup belongs to.
pub fn apply(store: &mut EntryStore, enrichment: Enrichment) -> EnrichmentOutcome {
    let Enrichment { id, source, result } = enrichment;
    match result {
        Ok(info) => {
            if !store.contains(id) {
                debug!(%id, "entry removed before metadata arrived");
                return EnrichmentOutcome::Discarded(id);
            }
            if store.patch(id, &MetadataPatch::from(info)) {
                EnrichmentOutcome::Patched(id)
            } else {
                EnrichmentOutcome::Unchanged(id)
            }
        }
        Err(err) => {
            warn!(%id, source = %source.display(), error = %err, "metadata lookup failed");
            EnrichmentOutcome::Failed(id)
        }
    }
}
