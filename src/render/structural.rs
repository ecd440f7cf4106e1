//! Structural snapshot: the tree as pretty-printed JSON.
//!
//! The output is an array of top-level roots using browser field names
//! (`id`, `title`, `url`, `children`, `dateAdded`), so
//! [`BookmarkTree::from_json`] reads it back unchanged.

use crate::tree::BookmarkTree;

/// Render `tree` as pretty-printed JSON.
pub fn render_structural(tree: &BookmarkTree) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tree)
}
