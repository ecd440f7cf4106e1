// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! One sync cycle: fetch, merge, render, push.

use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn, Span};

use super::types::{CycleMode, CycleReport, PushedArtifact, SyncError, SyncPhase};
use super::SyncEngine;
use crate::filter::AllowList;
use crate::merge::{merge, MergeReport};
use crate::metrics;
use crate::render::{render_netscape, render_readme, render_structural};
use crate::resilience::retry::retry;
use crate::tree::BookmarkTree;

impl SyncEngine {
    /// Run one cycle with the configured allow-list.
    pub async fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        let allow = self.config.allow_list();
        self.run_cycle_with(&allow).await
    }

    /// Run one cycle importing only what `allow` admits.
    ///
    /// A conflict on any push fails the cycle unless `conflict_retries` is
    /// non-zero, in which case the whole cycle (fetch included) is re-run.
    /// Artifacts pushed before a failure stay pushed.
    #[tracing::instrument(skip(self, allow), fields(mode = tracing::field::Empty))]
    pub async fn run_cycle_with(&self, allow: &AllowList) -> Result<CycleReport, SyncError> {
        let start = Instant::now();
        info!("Starting sync...");

        let retry_config = self.config.retry_config();
        let result = retry("sync_cycle", &retry_config, SyncError::is_conflict, || {
            self.cycle_once(allow)
        })
        .await;

        match &result {
            Ok(report) => {
                Span::current().record("mode", report.mode.as_label());
                metrics::record_cycle(report.mode, start.elapsed());
                self.set_phase(SyncPhase::Complete);
                info!(%report, "Sync complete!");
            }
            Err(e) => {
                metrics::record_cycle_failure(e.is_conflict());
                self.set_phase(SyncPhase::Failed);
                error!(error = %e, "Sync failed");
            }
        }
        result
    }

    async fn cycle_once(&self, allow: &AllowList) -> Result<CycleReport, SyncError> {
        self.set_phase(SyncPhase::FetchingRemote);
        info!(file = %self.config.structural_file, "Fetching remote bookmarks...");
        let (mode, merge) = match self.remote.fetch(&self.config.structural_file).await? {
            Some(text) if !text.trim().is_empty() => match BookmarkTree::from_json(&text) {
                Ok(remote) => (CycleMode::Merged, Some(self.merge_remote(&remote, allow).await?)),
                Err(e) => {
                    warn!(error = %e, "Remote bookmarks malformed; overwriting with local data");
                    (CycleMode::RemoteMalformed, None)
                }
            },
            _ => {
                info!("No remote bookmarks yet; uploading local data");
                (CycleMode::FirstSync, None)
            }
        };

        self.set_phase(SyncPhase::Rendering);
        info!("Generating updated files...");
        let tree = self.local.read_tree().await?;
        let artifacts = [
            (&self.config.structural_file, render_structural(&tree)?),
            (&self.config.exchange_file, render_netscape(&tree)),
            (&self.config.readme_file, render_readme(&tree, Utc::now())),
        ];

        self.set_phase(SyncPhase::Pushing);
        info!(count = artifacts.len(), "Pushing artifacts...");
        let mut pushed = Vec::with_capacity(artifacts.len());
        for (name, content) in &artifacts {
            match self.remote.push(name, content).await {
                Ok(revision) => {
                    metrics::record_push(name, "success");
                    pushed.push(PushedArtifact { name: name.to_string(), revision });
                }
                Err(e) => {
                    metrics::record_push(name, if e.is_conflict() { "conflict" } else { "error" });
                    return Err(e.into());
                }
            }
        }

        Ok(CycleReport { mode, merge, artifacts: pushed })
    }

    async fn merge_remote(&self, remote: &BookmarkTree, allow: &AllowList) -> Result<MergeReport, SyncError> {
        self.set_phase(SyncPhase::Merging);
        info!(links = remote.link_count(), "Merging remote changes...");
        let report = merge(self.local.as_ref(), remote, allow, self.config.duplicate_scope).await?;
        metrics::record_merge(&report);
        info!(%report, "Merge complete");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::storage::memory::{InMemoryBookmarkStore, InMemoryRemoteStore};
    use crate::storage::traits::RootFolder;
    use crate::storage::LocalStore;
    use crate::tree::{BookmarkPath, Node};
    use std::sync::Arc;

    fn local_with_site() -> Arc<InMemoryBookmarkStore> {
        let local = Arc::new(InMemoryBookmarkStore::new());
        let bar = local.root_id(RootFolder::BookmarksBar);
        local.add_link(&bar, "Site", "https://e.example").unwrap();
        local
    }

    fn remote_snapshot() -> String {
        let tree = BookmarkTree::new(vec![Node::folder("1", "Bookmarks Bar", vec![
            Node::folder("4", "Work", vec![Node::link("5", "Wiki", "https://wiki.example")]),
            Node::folder("6", "Play", vec![Node::link("7", "Game", "https://game.example")]),
        ])]);
        render_structural(&tree).unwrap()
    }

    #[tokio::test]
    async fn test_first_sync_pushes_all_artifacts() {
        let remote = Arc::new(InMemoryRemoteStore::new());
        let engine = SyncEngine::new(SyncConfig::default(), local_with_site(), remote.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.mode, CycleMode::FirstSync);
        assert!(report.merge.is_none());

        let names: Vec<_> = report.artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["bookmarks.json", "bookmarks.html", "README.md"]);
        assert!(remote.content("bookmarks.json").unwrap().contains("https://e.example"));
        assert_eq!(engine.phase(), SyncPhase::Complete);
    }

    #[tokio::test]
    async fn test_blank_remote_is_first_sync() {
        let remote = Arc::new(InMemoryRemoteStore::new());
        remote.insert("bookmarks.json", "  \n");
        let engine = SyncEngine::new(SyncConfig::default(), local_with_site(), remote);

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.mode, CycleMode::FirstSync);
    }

    #[tokio::test]
    async fn test_explicit_allow_list_overrides_config() {
        let remote = Arc::new(InMemoryRemoteStore::new());
        remote.insert("bookmarks.json", &remote_snapshot());
        let local = local_with_site();
        let engine = SyncEngine::new(SyncConfig::default(), local.clone(), remote);

        let allow = AllowList::new([BookmarkPath::from(["Bookmarks Bar", "Play"])]);
        let report = engine.run_cycle_with(&allow).await.unwrap();

        let merge = report.merge.unwrap();
        assert_eq!((merge.added, merge.skipped), (1, 1));
        assert_eq!(local.search_by_url("https://game.example").await.unwrap().len(), 1);
        assert!(local.search_by_url("https://wiki.example").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_remote_is_overwritten() {
        let remote = Arc::new(InMemoryRemoteStore::new());
        remote.insert("bookmarks.json", "{not json");
        let engine = SyncEngine::new(SyncConfig::default(), local_with_site(), remote.clone());

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.mode, CycleMode::RemoteMalformed);
        let snapshot = remote.content("bookmarks.json").unwrap();
        assert!(BookmarkTree::from_json(&snapshot).is_ok());
    }

    #[tokio::test]
    async fn test_conflict_fails_cycle() {
        let remote = Arc::new(InMemoryRemoteStore::new());
        remote.force_conflicts(1);
        let engine = SyncEngine::new(SyncConfig::default(), local_with_site(), remote);

        let err = engine.run_cycle().await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(engine.phase(), SyncPhase::Failed);
    }

    #[tokio::test]
    async fn test_phase_receiver_sees_completion() {
        let remote = Arc::new(InMemoryRemoteStore::new());
        let engine = SyncEngine::new(SyncConfig::default(), local_with_site(), remote);
        let mut rx = engine.phase_receiver();

        engine.run_cycle().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), SyncPhase::Complete);
    }
}
