//! Non-interactive stand-ins for the file pickers.
//!
//! On the command line every "picked" path is already known from the
//! arguments, so the pickers simply hand back what they were built with.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use folio_core::FileDialogs;

#[derive(Debug, Clone, Default)]
pub struct PresetDialogs {
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
}

impl PresetDialogs {
    pub fn new(inputs: Vec<PathBuf>, output: Option<PathBuf>) -> Self {
        Self { inputs, output }
    }

    pub fn with_output(output: PathBuf) -> Self {
        Self::new(Vec::new(), Some(output))
    }
}

#[async_trait]
impl FileDialogs for PresetDialogs {
    async fn pick_input_paths(&self) -> Vec<PathBuf> {
        self.inputs.clone()
    }

    async fn pick_output_path(&self) -> Option<PathBuf> {
        self.output.clone()
    }

    fn reveal_in_file_system(&self, path: &Path) {
        let folder = reveal_target(path);
        if let Err(error) = open::that(&folder) {
            tracing::warn!(path = %folder.display(), %error, "failed to open folder");
        }
    }
}

/// Folder to open for `path`: its parent, or the current directory for a bare
/// file name.
pub fn reveal_target(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
