//! Path resolution against the local store.
//!
//! Maps a folder-title path onto the local store, creating whatever folders
//! are missing. A leading segment naming a reserved root ("Bookmarks Bar",
//! "barre de favoris", ...) selects that root; otherwise resolution starts
//! at the bookmarks bar.
//!
//! There is no rollback: if a create fails halfway, the folders already made
//! stay, and the next attempt finds them instead of creating them again.

use tracing::debug;

use crate::storage::traits::{LocalStore, RootFolder, StoreError};
use crate::tree::{BookmarkPath, NodeId};

/// Human-readable root names (lowercase) in the locales we know about.
const ROOT_ALIASES: &[(&str, RootFolder)] = &[
    ("bookmarks bar", RootFolder::BookmarksBar),
    ("barre de favoris", RootFolder::BookmarksBar),
    ("other bookmarks", RootFolder::Other),
    ("autres favoris", RootFolder::Other),
    ("mobile bookmarks", RootFolder::Mobile),
    ("favoris sur mobile", RootFolder::Mobile),
];

/// Where resolution starts when the first segment is not a root alias.
pub const DEFAULT_ROOT: RootFolder = RootFolder::BookmarksBar;

/// Reserved root named by `title`, compared case-insensitively.
#[must_use]
pub fn root_alias(title: &str) -> Option<RootFolder> {
    let lower = title.to_lowercase();
    ROOT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, root)| *root)
}

fn same_title(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Resolve `path` to a folder in `store`, creating missing folders on the way.
pub async fn ensure_path(store: &dyn LocalStore, path: &BookmarkPath) -> Result<NodeId, StoreError> {
    let segments = path.segments();
    let (root, rest) = match segments.split_first() {
        Some((first, rest)) => match root_alias(first) {
            Some(root) => (root, rest),
            None => (DEFAULT_ROOT, segments),
        },
        None => (DEFAULT_ROOT, segments),
    };

    let mut current = store.root_id(root);
    for title in rest {
        let existing = store
            .children(&current)
            .await?
            .into_iter()
            .find(|child| child.is_folder() && same_title(child.title(), title))
            .map(|child| child.id().clone());

        current = match existing {
            Some(id) => id,
            None => {
                let id = store.create_folder(&current, title).await?;
                debug!(parent = %current, folder = %id, title = %title, "Created folder");
                id
            }
        };
    }
    Ok(current)
}
