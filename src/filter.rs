//! Selective import filter.
//!
//! An [`AllowList`] holds folder paths chosen for import. A record passes when
//! one of those paths is a segment-wise prefix of the record's path, so
//! choosing a folder also chooses everything below it. An empty list admits
//! everything.
//!
//! ```
//! use remark_sync::{AllowList, BookmarkPath};
//!
//! let allow = AllowList::from_joined(["Work"]);
//! assert!(allow.is_allowed(&BookmarkPath::from(["Work", "Sub"])));
//! assert!(!allow.is_allowed(&BookmarkPath::from(["Play"])));
//! assert!(AllowList::default().is_allowed(&BookmarkPath::from(["Play"])));
//! ```

use crate::tree::BookmarkPath;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    prefixes: Vec<BookmarkPath>,
}

impl AllowList {
    /// Admit everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(prefixes: impl IntoIterator<Item = BookmarkPath>) -> Self {
        let mut list = Self::default();
        for prefix in prefixes {
            list.insert(prefix);
        }
        list
    }

    /// Build from `###`-joined folder-title chains. Blank entries are ignored;
    /// an explicitly empty prefix would otherwise admit everything.
    pub fn from_joined<S: AsRef<str>>(joined: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            joined
                .into_iter()
                .filter(|s| !s.as_ref().is_empty())
                .map(|s| BookmarkPath::parse_joined(s.as_ref())),
        )
    }

    /// Add a prefix, keeping insertion order and dropping exact repeats.
    pub fn insert(&mut self, prefix: BookmarkPath) {
        if prefix.is_empty() || self.prefixes.contains(&prefix) {
            return;
        }
        self.prefixes.push(prefix);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }

    #[must_use]
    pub fn prefixes(&self) -> &[BookmarkPath] {
        &self.prefixes
    }

    #[must_use]
    pub fn is_allowed(&self, path: &BookmarkPath) -> bool {
        self.prefixes.is_empty() || self.prefixes.iter().any(|p| path.starts_with(p))
    }

    /// The `###`-joined form, for handing back to whatever persists the selection.
    #[must_use]
    pub fn to_joined(&self) -> Vec<String> {
        self.prefixes.iter().map(BookmarkPath::join).collect()
    }
}
