// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Remote-to-local merge.
//!
//! Flattens the remote tree, drops records the [`AllowList`] rejects, and
//! creates each remaining link locally unless its url is already there.
//! Merging only ever adds: nothing local is moved, renamed or removed.
//!
//! # Duplicate scope
//!
//! ```text
//! Anywhere  url present anywhere in the local store   → duplicate (default)
//! SamePath  url present directly in the target folder → duplicate
//! ```
//!
//! With `SamePath` the target folder is resolved (and possibly created)
//! before the duplicate check.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::filter::AllowList;
use crate::flatten::{flatten, FlatRecord};
use crate::resolver::ensure_path;
use crate::storage::traits::{LocalStore, StoreError};
use crate::tree::{BookmarkTree, Node};

/// What counts as "already present".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateScope {
    /// Same url anywhere in the local store.
    #[default]
    Anywhere,
    /// Same url among the direct children of the folder the link would go in.
    SamePath,
}

/// Outcome counts of one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Links created locally
    pub added: usize,
    /// Records rejected by the allow-list
    pub skipped: usize,
    /// Records whose url was already present
    pub duplicates: usize,
}

impl MergeReport {
    /// Records looked at, excluding url-less ones.
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.skipped + self.duplicates
    }
}

impl std::fmt::Display for MergeReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "+{} added, {} filtered, {} already present",
            self.added, self.skipped, self.duplicates
        )
    }
}

/// Merge `remote` into `store`, importing only what `allow` admits.
#[instrument(skip(store, remote, allow), fields(allowed = allow.prefixes().len()))]
pub async fn merge(
    store: &dyn LocalStore,
    remote: &BookmarkTree,
    allow: &AllowList,
    scope: DuplicateScope,
) -> Result<MergeReport, StoreError> {
    let mut report = MergeReport::default();

    for record in flatten(remote) {
        if record.url.is_empty() {
            continue;
        }
        if !allow.is_allowed(&record.path) {
            report.skipped += 1;
            continue;
        }

        let created = match scope {
            DuplicateScope::Anywhere => merge_anywhere(store, &record).await?,
            DuplicateScope::SamePath => merge_same_path(store, &record).await?,
        };
        if created {
            report.added += 1;
        } else {
            report.duplicates += 1;
        }
    }

    debug!(%report, "Merge finished");
    Ok(report)
}

async fn merge_anywhere(store: &dyn LocalStore, record: &FlatRecord) -> Result<bool, StoreError> {
    if !store.search_by_url(&record.url).await?.is_empty() {
        return Ok(false);
    }
    let parent = ensure_path(store, &record.path).await?;
    store.create_link(&parent, &record.title, &record.url).await?;
    debug!(url = %record.url, path = %record.path, "Added link");
    Ok(true)
}

async fn merge_same_path(store: &dyn LocalStore, record: &FlatRecord) -> Result<bool, StoreError> {
    let parent = ensure_path(store, &record.path).await?;
    let present = store
        .children(&parent)
        .await?
        .iter()
        .any(|child| matches!(child, Node::Link(l) if l.url == record.url));
    if present {
        return Ok(false);
    }
    store.create_link(&parent, &record.title, &record.url).await?;
    debug!(url = %record.url, path = %record.path, "Added link");
    Ok(true)
}
