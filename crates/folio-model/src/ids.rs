#![deny(unsafe_code)]

use std::fmt;

use uuid::Uuid;

/// Stable identity of an admitted document.
///
/// Ids are random, never derived from a position and never reused, so they
/// stay valid across every reorder, insert and removal of the working set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Allocate a fresh id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First eight hex digits, for log lines.
    pub fn short(&self) -> String {
        let mut text = self.0.simple().to_string();
        text.truncate(8);
        text
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn fresh_ids_are_distinct() {
        let ids: HashSet<EntryId> = (0..256).map(|_| EntryId::new()).collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn short_form_is_eight_hex_digits() {
        let short = EntryId::new().short();
        assert_eq!(short.len(), 8);
        assert!(short.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
