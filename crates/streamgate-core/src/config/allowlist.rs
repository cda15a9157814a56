//! Base-URL allowlist for playback authorization.

use std::collections::BTreeSet;

/// Read-only set of base URLs whose tokens may request playback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
    entries: BTreeSet<String>,
}

impl Allowlist {
    /// Build from explicit entries. Blank entries are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Parse the comma-separated form used by the `WHITE_LIST` binding.
    /// All spaces are removed before splitting.
    pub fn from_csv(raw: &str) -> Self {
        let compact = raw.replace(' ', "");
        Self::from_entries(compact.split(',').map(str::to_string))
    }

    pub fn contains(&self, base_url: &str) -> bool {
        self.entries.contains(base_url)
    }

    pub fn extend(&mut self, other: Allowlist) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}
