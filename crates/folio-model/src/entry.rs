//! Admitted documents and their lazily resolved metadata.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::EntryId;
use crate::metadata::{ByteSize, DocumentInfo, PreviewImage};

/// A metadata field that is filled in after admission.
///
/// `Pending` is shown distinctly from any resolved value. A field whose
/// lookup failed simply stays pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum Resolution<T> {
    #[default]
    Pending,
    Resolved(T),
}

impl<T> Resolution<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Pending => None,
            Self::Resolved(value) => Some(value),
        }
    }
}

/// Partial metadata merged into an entry by id.
///
/// Each field is independent; `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataPatch {
    pub page_count: Option<u32>,
    pub byte_size: Option<ByteSize>,
    pub preview: Option<PreviewImage>,
}

impl MetadataPatch {
    pub fn is_empty(&self) -> bool {
        self.page_count.is_none() && self.byte_size.is_none() && self.preview.is_none()
    }
}

impl From<DocumentInfo> for MetadataPatch {
    fn from(info: DocumentInfo) -> Self {
        Self {
            page_count: Some(info.page_count),
            byte_size: Some(info.byte_size),
            preview: Some(info.preview),
        }
    }
}

/// One document in the working set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub source: PathBuf,
    pub display_name: String,
    pub page_count: Resolution<u32>,
    pub byte_size: Resolution<ByteSize>,
    pub preview: Resolution<PreviewImage>,
}

impl Entry {
    /// Create a pending entry with a fresh id.
    pub fn admit(source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        if source.as_os_str().is_empty() {
            return Err(ModelError::EmptySource);
        }
        Ok(Self {
            id: EntryId::new(),
            display_name: display_name_for(&source),
            source,
            page_count: Resolution::Pending,
            byte_size: Resolution::Pending,
            preview: Resolution::Pending,
        })
    }

    /// True once every metadata field has been resolved.
    pub fn is_resolved(&self) -> bool {
        !self.page_count.is_pending() && !self.byte_size.is_pending() && !self.preview.is_pending()
    }

    /// Merge a patch into this entry. Returns whether anything changed.
    ///
    /// Applying the same patch twice leaves the entry as after the first.
    pub fn apply(&mut self, patch: &MetadataPatch) -> bool {
        let mut changed = false;
        if let Some(pages) = patch.page_count {
            changed |= merge_field(&mut self.page_count, pages);
        }
        if let Some(size) = patch.byte_size {
            changed |= merge_field(&mut self.byte_size, size);
        }
        if let Some(preview) = &patch.preview {
            changed |= merge_field(&mut self.preview, preview.clone());
        }
        changed
    }

    /// Numeric size used for ordering; unresolved sizes count as zero.
    pub fn size_key(&self) -> u64 {
        self.byte_size.resolved().map_or(0, ByteSize::as_u64)
    }
}

fn merge_field<T: PartialEq>(slot: &mut Resolution<T>, value: T) -> bool {
    if slot.resolved() == Some(&value) {
        return false;
    }
    *slot = Resolution::Resolved(value);
    true
}

/// Name shown for a source path: its last component.
///
/// Both separators are honoured so Windows paths render the same on every
/// platform.
pub fn display_name_for(source: &Path) -> String {
    let text = source.to_string_lossy();
    match text.rsplit(['/', '\\']).next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => text.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_uses_last_component() {
        assert_eq!(display_name_for(Path::new("/docs/a.pdf")), "a.pdf");
        assert_eq!(display_name_for(Path::new(r"C:\docs\b.pdf")), "b.pdf");
        assert_eq!(display_name_for(Path::new("plain.pdf")), "plain.pdf");
    }

    #[test]
    fn empty_source_is_rejected() {
        assert!(matches!(Entry::admit(""), Err(ModelError::EmptySource)));
    }

    #[test]
    fn apply_reports_changes_once() {
        let mut entry = Entry::admit("a.pdf").unwrap();
        let patch = MetadataPatch {
            page_count: Some(4),
            ..MetadataPatch::default()
        };
        assert!(entry.apply(&patch));
        assert!(!entry.apply(&patch));
        assert_eq!(entry.page_count, Resolution::Resolved(4));
        assert!(entry.byte_size.is_pending());
    }
}
