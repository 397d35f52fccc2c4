//! Display ordering options.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Key used to derive the displayed order from the canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Canonical (insertion) order.
    #[default]
    Default,
    /// Ascending by display name.
    Name,
    /// Descending by byte size; unresolved sizes last.
    Size,
}

impl SortKey {
    pub const fn all() -> &'static [SortKey] {
        &[Self::Default, Self::Name, Self::Size]
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Default => "Default order",
            Self::Name => "File name",
            Self::Size => "File size",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
