//! One working set and the merge that runs over it.
//!
//! [`Session`] is the single owner of the store, the drag gesture and the
//! progress value. Every edit is refused while a merge is running.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_model::{Entry, EntryId, SortKey};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::engine::{DocumentEngine, FileDialogs};
use crate::enrich::{self, EnrichmentOutcome, EnrichmentPipeline};
use crate::error::SessionError;
use crate::progress::{ProgressController, ProgressPhase, SampleOutcome, TickOutcome};
use crate::reorder::{self, DragController, DragPayload, DropOutcome, DropTarget};
use crate::store::EntryStore;
use crate::ticker::{TickSchedule, Ticker};
use crate::view::{self, ViewSnapshot};

/// Whether `path` may be admitted: only `.pdf` files, in any case.
pub fn accepts_source(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Something the caller may want to show while a merge runs.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeEvent {
    Started { documents: usize, output: PathBuf },
    Progress { phase: ProgressPhase, value: f64 },
    /// The engine accepted the job; finishing starts from `start`.
    Accepted { start: f64 },
    Succeeded { output: PathBuf },
    Failed { reason: String },
    Cancelled,
}

/// How a merge ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Succeeded { output: PathBuf },
    Failed { reason: String },
    /// Cancelled by the caller, or no output was picked.
    Cancelled,
}

pub struct Session<E: DocumentEngine + ?Sized + 'static> {
    engine: Arc<E>,
    store: EntryStore,
    sort: SortKey,
    drag: DragController,
    progress: ProgressController,
    enrichment: EnrichmentPipeline<E>,
    schedule: TickSchedule,
}

impl<E: DocumentEngine + ?Sized + 'static> Session<E> {
    pub fn new(engine: Arc<E>) -> Self {
        Self {
            enrichment: EnrichmentPipeline::new(Arc::clone(&engine)),
            engine,
            store: EntryStore::new(),
            sort: SortKey::default(),
            drag: DragController::new(),
            progress: ProgressController::new(),
            schedule: TickSchedule::default(),
        }
    }

    pub fn with_schedule(mut self, schedule: TickSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    pub fn progress(&self) -> &ProgressController {
        &self.progress
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn set_sort(&mut self, key: SortKey) {
        if self.sort != key {
            debug!(sort = %key, "sort key changed");
            self.sort = key;
        }
    }

    /// Entries in display order.
    pub fn view(&self) -> Vec<&Entry> {
        view::project(self.store.entries(), self.sort)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot::capture(&self.store, self.sort)
    }

    /// Drop target for a zone index in the current view.
    pub fn target_at(&self, view_index: usize) -> DropTarget {
        DropTarget::from_view_index(view_index, self.store.len())
    }

    pub fn is_merging(&self) -> bool {
        self.progress.is_active()
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.is_merging() {
            debug!("refusing edit while merging");
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    /// Admit `sources`, appending them or inserting them at `target`.
    ///
    /// Paths that are not PDF documents are skipped. Each admitted entry gets
    /// a metadata lookup; this must run inside a Tokio runtime.
    pub fn admit<I, P>(
        &mut self,
        sources: I,
        target: Option<DropTarget>,
    ) -> Result<Vec<EntryId>, SessionError>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.ensure_idle()?;
        let accepted: Vec<PathBuf> = sources
            .into_iter()
            .map(Into::into)
            .filter(|source| {
                let ok = accepts_source(source);
                if !ok {
                    debug!(source = %source.display(), "skipping non-PDF source");
                }
                ok
            })
            .collect();
        if accepted.is_empty() {
            return Ok(Vec::new());
        }

        let at = match target {
            Some(target) => Some(reorder::resolve_insertion(
                &self.store,
                &self.snapshot(),
                target,
            )?),
            None => None,
        };
        let ids = self.store.append(accepted.iter().cloned(), at)?;
        for (id, source) in ids.iter().zip(accepted) {
            self.enrichment.request(*id, source);
        }
        Ok(ids)
    }

    /// Pick documents and admit them at `target`. Picking nothing is a no-op.
    pub async fn add_from_picker<D>(
        &mut self,
        dialogs: &D,
        target: Option<DropTarget>,
    ) -> Result<Vec<EntryId>, SessionError>
    where
        D: FileDialogs + ?Sized,
    {
        self.ensure_idle()?;
        let picked = dialogs.pick_input_paths().await;
        if picked.is_empty() {
            debug!("input picker dismissed");
            return Ok(Vec::new());
        }
        self.admit(picked, target)
    }

    /// Remove an entry. Returns whether it was present.
    pub fn remove(&mut self, id: EntryId) -> Result<bool, SessionError> {
        self.ensure_idle()?;
        Ok(self.store.remove(id).is_some())
    }

    /// Remove every entry and drop the lookups still running for them.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.enrichment.abort_all();
        self.store.clear();
        Ok(())
    }

    /// Start dragging the entry at `view_index` of the current view.
    pub fn begin_reorder(&mut self, view_index: usize) -> Result<EntryId, SessionError> {
        self.ensure_idle()?;
        let snapshot = self.snapshot();
        Ok(self.drag.begin_reorder(&snapshot, view_index)?)
    }

    /// Start dragging files from outside the working set.
    pub fn begin_external(&mut self, sources: Vec<PathBuf>) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.drag.begin_external(sources);
        Ok(())
    }

    pub fn hover(&mut self, target: DropTarget) {
        self.drag.hover(target);
    }

    /// Whether an insertion marker belongs at `target` right now.
    pub fn shows_indicator(&self, target: DropTarget) -> bool {
        self.drag.shows_indicator(&self.snapshot(), target)
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Commit the current gesture at `target`, resolved against the view as
    /// it is now.
    pub fn drop_at(&mut self, target: DropTarget) -> Result<DropOutcome, SessionError> {
        let payload = self.drag.take().ok_or(SessionError::NoDrag)?;
        self.ensure_idle()?;
        match payload {
            DragPayload::Reorder { source } => {
                let snapshot = self.snapshot();
                let result = reorder::reconcile_move(&mut self.store, &snapshot, source, target);
                if let Err(err) = &result {
                    error!(%source, ?target, error = %err, "reorder contract violated");
                }
                debug_assert!(result.is_ok(), "reorder contract violated: {result:?}");
                Ok(result?.map_or(DropOutcome::Unchanged, DropOutcome::Moved))
            }
            DragPayload::ExternalInsert { sources } => {
                let ids = self.admit(sources, Some(target))?;
                if ids.is_empty() {
                    Ok(DropOutcome::Unchanged)
                } else {
                    Ok(DropOutcome::Inserted(ids))
                }
            }
        }
    }

    pub fn pending_lookups(&self) -> usize {
        self.enrichment.in_flight()
    }

    /// Apply the next finished metadata lookup.
    pub async fn next_enrichment(&mut self) -> Option<EnrichmentOutcome> {
        let enrichment = self.enrichment.next().await?;
        Some(enrich::apply(&mut self.store, enrichment))
    }

    /// Wait for every outstanding metadata lookup.
    pub async fn settle(&mut self) -> Vec<EnrichmentOutcome> {
        self.enrichment.settle(&mut self.store).await
    }

    /// Merge the working set in canonical order.
    ///
    /// Metadata lookups that finish meanwhile are still applied. `cancel`
    /// resolving ends the merge as cancelled; the engine is not told.
    pub async fn merge<D, C, F>(
        &mut self,
        dialogs: &D,
        cancel: C,
        mut on_event: F,
    ) -> Result<MergeOutcome, SessionError>
    where
        D: FileDialogs + ?Sized,
        C: Future<Output = ()>,
        F: FnMut(&MergeEvent),
    {
        self.ensure_idle()?;
        let count = self.store.len();
        if count < 2 {
            return Err(SessionError::TooFewDocuments { count });
        }
        let Some(output) = dialogs.pick_output_path().await else {
            info!("output picker dismissed, merge not started");
            return Ok(MergeOutcome::Cancelled);
        };

        self.drag.cancel();
        let ordered = self.store.ordered_sources();
        info!(documents = ordered.len(), output = %output.display(), "dispatching merge");
        self.progress.start();
        on_event(&MergeEvent::Started {
            documents: ordered.len(),
            output: output.clone(),
        });

        let engine = Arc::clone(&self.engine);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatch = engine.merge_documents(&ordered, &output, tx);
        tokio::pin!(cancel);

        let accepted = loop {
            tokio::select! {
                biased;
                () = &mut cancel => {
                    return Ok(self.cancelled(&mut on_event));
                }
                Some(raw) = rx.recv() => {
                    self.record_sample(raw, &mut on_event);
                }
                result = &mut dispatch => break result,
                Some(enrichment) = self.enrichment.next(), if self.enrichment.in_flight() > 0 => {
                    enrich::apply(&mut self.store, enrichment);
                }
            }
        };
        drop(dispatch);
        while let Ok(raw) = rx.try_recv() {
            self.record_sample(raw, &mut on_event);
        }

        let reason = match accepted {
            Ok(true) => None,
            Ok(false) => Some("the engine did not accept the merge".to_string()),
            Err(err) => Some(err.to_string()),
        };
        if let Some(reason) = reason {
            warn!(%reason, "merge failed");
            self.progress.fail();
            on_event(&MergeEvent::Failed {
                reason: reason.clone(),
            });
            return Ok(MergeOutcome::Failed { reason });
        }

        let Some(start) = self.progress.begin_finishing(self.schedule.ticks) else {
            return Ok(self.cancelled(&mut on_event));
        };
        info!(start, "merge accepted, finishing");
        on_event(&MergeEvent::Accepted { start });

        let mut ticker = Ticker::start(self.schedule);
        loop {
            tokio::select! {
                biased;
                () = &mut cancel => {
                    ticker.stop();
                    return Ok(self.cancelled(&mut on_event));
                }
                tick = ticker.next() => {
                    let value = match tick.map(|_| self.progress.tick()) {
                        Some(TickOutcome::Advanced(value)) => {
                            on_event(&MergeEvent::Progress {
                                phase: ProgressPhase::Finishing,
                                value,
                            });
                            continue;
                        }
                        Some(TickOutcome::Completed(value)) => value,
                        Some(TickOutcome::Ignored) => continue,
                        None => self.progress.displayed(),
                    };
                    ticker.stop();
                    on_event(&MergeEvent::Progress {
                        phase: ProgressPhase::Finishing,
                        value,
                    });
                    break;
                }
                Some(enrichment) = self.enrichment.next(), if self.enrichment.in_flight() > 0 => {
                    enrich::apply(&mut self.store, enrichment);
                }
            }
        }

        info!(output = %output.display(), "merge completed");
        on_event(&MergeEvent::Succeeded {
            output: output.clone(),
        });
        self.progress.complete();
        Ok(MergeOutcome::Succeeded { output })
    }

    fn record_sample<F: FnMut(&MergeEvent)>(&mut self, raw: f64, on_event: &mut F) {
        if let SampleOutcome::Accepted(value) = self.progress.sample(raw) {
            on_event(&MergeEvent::Progress {
                phase: ProgressPhase::Live,
                value,
            });
        }
    }

    fn cancelled<F: FnMut(&MergeEvent)>(&mut self, on_event: &mut F) -> MergeOutcome {
        info!(phase = ?self.progress.phase(), "merge cancelled");
        self.progress.cancel();
        on_event(&MergeEvent::Cancelled);
        MergeOutcome::Cancelled
    }
}
