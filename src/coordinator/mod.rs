// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Sync engine coordinator.
//!
//! The [`SyncEngine`] ties the pieces together for one sync cycle:
//! - fetch the remote structural snapshot
//! - merge it into the local store (allow-list applied)
//! - re-read the local tree and render the three artifacts
//! - push them back with revision preconditions
//!
//! # Phases
//!
//! ```text
//! Idle → FetchingRemote → Merging → Rendering → Pushing → Complete
//!                                                └──────→ Failed
//! ```
//!
//! Cycles are not guarded against each other; callers run one at a time.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use remark_sync::{InMemoryBookmarkStore, InMemoryRemoteStore, SyncConfig, SyncEngine, SyncPhase};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let engine = SyncEngine::new(
//!     SyncConfig::default(),
//!     Arc::new(InMemoryBookmarkStore::new()),
//!     Arc::new(InMemoryRemoteStore::new()),
//! );
//! assert_eq!(engine.phase(), SyncPhase::Idle);
//!
//! let report = engine.run_cycle().await.expect("sync failed");
//! println!("{}", report);
//! # }
//! ```

mod types;
mod cycle;

pub use types::{CycleMode, CycleReport, PushedArtifact, SyncError, SyncPhase};

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::config::{SyncConfig, SyncCredentials};
use crate::flatten::folder_paths;
use crate::remote::RemoteSyncClient;
use crate::storage::github::GitHubContentsStore;
use crate::storage::traits::{LocalStore, RemoteStore};
use crate::tree::{BookmarkPath, BookmarkTree};

/// Main sync engine coordinator.
pub struct SyncEngine {
    pub(super) config: SyncConfig,

    /// Local bookmark store (merge target, render source)
    pub(super) local: Arc<dyn LocalStore>,

    /// Remote content store behind the optimistic-concurrency client
    pub(super) remote: RemoteSyncClient,

    /// Phase broadcast
    pub(super) phase: watch::Sender<SyncPhase>,
    pub(super) phase_rx: watch::Receiver<SyncPhase>,
}

impl SyncEngine {
    /// Create an engine over the given stores. Nothing is read until a cycle runs.
    pub fn new(config: SyncConfig, local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteStore>) -> Self {
        let (phase, phase_rx) = watch::channel(SyncPhase::Idle);
        let remote = RemoteSyncClient::new(remote, config.commit_message_prefix.clone());
        Self {
            config,
            local,
            remote,
            phase,
            phase_rx,
        }
    }

    /// Create an engine backed by the GitHub contents API at `config.api_base`.
    ///
    /// Fails with [`SyncError::Config`] on missing credentials, before any request.
    pub fn github(
        config: SyncConfig,
        credentials: SyncCredentials,
        local: Arc<dyn LocalStore>,
    ) -> Result<Self, SyncError> {
        let remote = GitHubContentsStore::new(&config.api_base, credentials)?;
        Ok(Self::new(config, local, Arc::new(remote)))
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> SyncPhase {
        *self.phase_rx.borrow()
    }

    /// Watch phase transitions.
    #[must_use]
    pub fn phase_receiver(&self) -> watch::Receiver<SyncPhase> {
        self.phase_rx.clone()
    }

    pub(super) fn set_phase(&self, phase: SyncPhase) {
        debug!(%phase, "Phase transition");
        let _ = self.phase.send(phase);
    }

    /// Folder paths of the remote snapshot, for choosing what to import.
    ///
    /// Empty when the remote has no snapshot yet. Unlike a cycle, an
    /// unparseable snapshot is an error here: there is nothing to offer.
    #[tracing::instrument(skip(self))]
    pub async fn remote_folders(&self) -> Result<Vec<BookmarkPath>, SyncError> {
        let name = &self.config.structural_file;
        let content = match self.remote.fetch(name).await? {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Ok(Vec::new()),
        };
        let tree = BookmarkTree::from_json(&content).map_err(|e| SyncError::MalformedRemote {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(folder_paths(&tree))
    }
}
