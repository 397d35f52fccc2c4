//! Collaborators the session depends on but does not implement.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use folio_model::DocumentInfo;
use tokio::sync::mpsc;

use crate::error::EngineError;

/// Channel on which an engine reports raw merge progress in `[0, 100]`.
pub type ProgressSender = mpsc::UnboundedSender<f64>;

/// Reads document metadata and performs merges.
#[async_trait]
pub trait DocumentEngine: Send + Sync {
    /// Page count, byte size and first-page preview of one document.
    async fn fetch_metadata(&self, source: &Path) -> Result<DocumentInfo, EngineError>;

    /// Merge `ordered` into `output`, reporting progress on `progress`.
    ///
    /// Returns `Ok(true)` once the engine has accepted the job. Progress
    /// samples may still arrive out of order or past their useful range.
    async fn merge_documents(
        &self,
        ordered: &[PathBuf],
        output: &Path,
        progress: ProgressSender,
    ) -> Result<bool, EngineError>;
}

/// File pickers and the "show in folder" action.
#[async_trait]
pub trait FileDialogs: Send + Sync {
    /// Documents to admit. Empty when the picker was dismissed.
    async fn pick_input_paths(&self) -> Vec<PathBuf>;

    /// Destination of a merge. `None` when the picker was dismissed.
    async fn pick_output_path(&self) -> Option<PathBuf>;

    fn reveal_in_file_system(&self, path: &Path);
}
