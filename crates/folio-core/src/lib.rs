//! Folio core: the working set of documents and the state that drives a merge.
//!
//! - [`store`] owns the canonical (merge) order of entries.
//! - [`view`] derives the displayed order for a [`SortKey`](folio_model::SortKey).
//! - [`reorder`] turns drag gestures in view space into canonical splices.
//! - [`enrich`] resolves entry metadata in the background.
//! - [`progress`] and [`ticker`] drive the two-phase progress value.
//! - [`session`] ties them together behind one owner.

#![deny(unsafe_code)]

pub mod engine;
pub mod enrich;
pub mod error;
pub mod progress;
pub mod reorder;
pub mod session;
pub mod store;
pub mod ticker;
pub mod view;

pub use engine::{DocumentEngine, FileDialogs, ProgressSender};
pub use enrich::{Enrichment, EnrichmentOutcome, EnrichmentPipeline};
pub use error::{EngineError, ReconcileError, SessionError, StoreError};
pub use progress::{
    FINISH_CAP, LIVE_SCALE, ProgressController, ProgressPhase, SampleOutcome, TickOutcome,
};
pub use reorder::{DragController, DragPayload, DragState, DropOutcome, DropTarget, MovePlan};
pub use session::{MergeEvent, MergeOutcome, Session, accepts_source};
pub use store::EntryStore;
pub use ticker::{TickSchedule, Ticker};
pub use view::{ViewSnapshot, project};
