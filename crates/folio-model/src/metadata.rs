//! Resolved document metadata as reported by the merge engine.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File size in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ByteSize(u64);

impl ByteSize {
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        let bytes = self.0;
        if bytes >= GB {
            write!(f, "{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            write!(f, "{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            write!(f, "{:.1} KB", bytes as f64 / KB as f64)
        } else {
            write!(f, "{bytes} B")
        }
    }
}

/// Encoded first-page thumbnail (PNG bytes).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewImage {
    png: Vec<u8>,
}

impl PreviewImage {
    pub fn from_png(png: Vec<u8>) -> Self {
        Self { png }
    }

    /// Decode a base64 PNG as produced by the helper process.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let png = STANDARD.decode(encoded.trim())?;
        Ok(Self { png })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn len(&self) -> usize {
        self.png.len()
    }

    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }
}

impl fmt::Debug for PreviewImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewImage")
            .field("bytes", &self.png.len())
            .finish()
    }
}

/// Everything the engine reports for one source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub page_count: u32,
    pub byte_size: ByteSize,
    pub preview: PreviewImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_size_display() {
        assert_eq!(ByteSize::new(512).to_string(), "512 B");
        assert_eq!(ByteSize::new(1536).to_string(), "1.5 KB");
        assert_eq!(ByteSize::new(52_428_800).to_string(), "50.0 MB");
        assert_eq!(ByteSize::new(3 * 1024 * 1024 * 1024).to_string(), "3.0 GB");
    }

    #[test]
    fn preview_base64_round_trip() {
        let preview = PreviewImage::from_base64("iVBORw0KGgo=").expect("decode preview");
        assert_eq!(preview.as_bytes(), &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn invalid_preview_is_an_error() {
        assert!(PreviewImage::from_base64("not base64!").is_err());
    }
}
