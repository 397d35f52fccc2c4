//! Translating drag gestures in view space into canonical splices.
//!
//! A gesture carries a [`DragPayload`] from start to drop. Sources are held
//! by id from the moment the drag starts; the drop slot is resolved against
//! the view that is current when the drop lands. Nothing in the store changes
//! until the drop commits.

use std::path::PathBuf;

use folio_model::EntryId;
use tracing::{debug, trace};

use crate::error::ReconcileError;
use crate::store::EntryStore;
use crate::view::ViewSnapshot;

/// Where a drop lands, in view space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropTarget {
    /// The zone in front of the entry shown at this view index.
    Slot(usize),
    /// The trailing zone after the last entry. Always appends canonically.
    End,
}

impl DropTarget {
    /// Map a zone index in a view of `view_len` entries. Indices at or past
    /// the end select the trailing zone.
    pub fn from_view_index(index: usize, view_len: usize) -> Self {
        if index >= view_len {
            Self::End
        } else {
            Self::Slot(index)
        }
    }
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// An entry already in the working set.
    Reorder { source: EntryId },
    /// Files from outside that are not admitted yet.
    ExternalInsert { sources: Vec<PathBuf> },
}

/// Lifecycle of one drag gesture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        payload: DragPayload,
        hover: Option<DropTarget>,
    },
}

/// Result of a committed drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The drop did not change the canonical order.
    Unchanged,
    Moved(MovePlan),
    Inserted(Vec<EntryId>),
}

/// A canonical move computed from a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePlan {
    pub entry: EntryId,
    /// Canonical index before the move.
    pub from: usize,
    /// Canonical index after the move.
    pub to: usize,
}

/// Compute the canonical move for dropping `source` at `target`.
///
/// The destination is the canonical position the target entry occupies once
/// the source has been taken out: one less than its original index when the
/// source sat before it, unchanged otherwise. `Ok(None)` means the drop
/// leaves the order as it is.
pub fn plan_move(
    store: &EntryStore,
    view: &ViewSnapshot,
    source: EntryId,
    target: DropTarget,
) -> Result<Option<MovePlan>, ReconcileError> {
    let target_id = match target {
        DropTarget::Slot(index) => Some(view.id_at(index).ok_or(
            ReconcileError::SlotOutOfRange {
                index,
                len: view.len(),
            },
        )?),
        DropTarget::End => None,
    };
    if target_id == Some(source) {
        return Ok(None);
    }

    let from = store
        .position(source)
        .ok_or(ReconcileError::UnknownSource(source))?;
    let to = match target_id {
        Some(target_id) => {
            let target_index = store
                .position(target_id)
                .ok_or(ReconcileError::UnknownTarget(target_id))?;
            if from < target_index {
                target_index - 1
            } else {
                target_index
            }
        }
        None => store.len() - 1,
    };

    if from == to {
        return Ok(None);
    }
    Ok(Some(MovePlan {
        entry: source,
        from,
        to,
    }))
}

/// Plan and apply a move in one step.
pub fn reconcile_move(
    store: &mut EntryStore,
    view: &ViewSnapshot,
    source: EntryId,
    target: DropTarget,
) -> Result<Option<MovePlan>, ReconcileError> {
    let Some(plan) = plan_move(store, view, source, target)? else {
        trace!(%source, ?target, "drop leaves order unchanged");
        return Ok(None);
    };
    store.move_entry(plan.entry, plan.to)?;
    debug_assert_eq!(store.position(plan.entry), Some(plan.to));
    debug!(entry = %plan.entry, from = plan.from, to = plan.to, "reordered entry");
    Ok(Some(plan))
}

/// Canonical index at which external files dropped on `target` are admitted.
pub fn resolve_insertion(
    store: &EntryStore,
    view: &ViewSnapshot,
    target: DropTarget,
) -> Result<usize, ReconcileError> {
    match target {
        DropTarget::Slot(index) => {
            let id = view.id_at(index).ok_or(ReconcileError::SlotOutOfRange {
                index,
                len: view.len(),
            })?;
            store
                .position(id)
                .ok_or(ReconcileError::UnknownTarget(id))
        }
        DropTarget::End => Ok(store.len()),
    }
}

/// Drives [`DragState`] through one gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn payload(&self) -> Option<&DragPayload> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { payload, .. } => Some(payload),
        }
    }

    pub fn hover_target(&self) -> Option<DropTarget> {
        match &self.state {
            DragState::Idle => None,
            DragState::Dragging { hover, .. } => *hover,
        }
    }

    /// Start dragging the entry shown at `view_index`, capturing its id.
    pub fn begin_reorder(
        &mut self,
        view: &ViewSnapshot,
        view_index: usize,
    ) -> Result<EntryId, ReconcileError> {
        let source = view
            .id_at(view_index)
            .ok_or(ReconcileError::SlotOutOfRange {
                index: view_index,
                len: view.len(),
            })?;
        self.begin(DragPayload::Reorder { source });
        Ok(source)
    }

    /// Start dragging files from outside the working set.
    pub fn begin_external(&mut self, sources: Vec<PathBuf>) {
        self.begin(DragPayload::ExternalInsert { sources });
    }

    fn begin(&mut self, payload: DragPayload) {
        if self.is_dragging() {
            debug!("replacing unfinished drag gesture");
        }
        trace!(?payload, "drag started");
        self.state = DragState::Dragging {
            payload,
            hover: None,
        };
    }

    /// Record the zone under the pointer. Ignored while idle.
    pub fn hover(&mut self, target: DropTarget) {
        if let DragState::Dragging { hover, .. } = &mut self.state {
            *hover = Some(target);
        }
    }

    /// The pointer left every zone or the drag ended without a drop.
    pub fn cancel(&mut self) {
        if self.is_dragging() {
            trace!("drag cancelled");
        }
        self.state = DragState::Idle;
    }

    /// Finish the gesture, handing back its payload for committing.
    pub fn take(&mut self) -> Option<DragPayload> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging { payload, .. } => Some(payload),
        }
    }

    /// Whether an insertion marker belongs at `target` in `view`.
    ///
    /// The zone directly in front of the dragged entry is suppressed since a
    /// drop there is a no-op.
    pub fn shows_indicator(&self, view: &ViewSnapshot, target: DropTarget) -> bool {
        let DragState::Dragging { payload, hover } = &self.state else {
            return false;
        };
        if *hover != Some(target) {
            return false;
        }
        match (payload, target) {
            (DragPayload::Reorder { source }, DropTarget::Slot(index)) => {
                view.id_at(index) != Some(*source)
            }
            _ => true,
        }
    }
}
