// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # ReMark Sync
//!
//! Two-way bookmark synchronization between a local browser bookmark store
//! and a remote versioned content store (a GitHub repository by default).
//!
//! ## Architecture
//!
//! One sync cycle moves data in both directions:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Remote Content Store                     │
//! │  • bookmarks.json  (structural snapshot, merge source)     │
//! │  • bookmarks.html  (Netscape exchange file)                │
//! │  • README.md       (collapsible Markdown index)            │
//! └─────────────────────────────────────────────────────────────┘
//!            │ fetch                          ▲ push (revision-guarded)
//!            ▼                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Sync Engine                          │
//! │  • flatten remote tree into (title, url, path) records     │
//! │  • allow-list filter on folder-path prefixes               │
//! │  • create missing folders, skip already-present URLs       │
//! │  • render all three artifacts from the merged local tree   │
//! └─────────────────────────────────────────────────────────────┘
//!            │ merge                          ▲ read_tree
//!            ▼                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Local Bookmark Store                     │
//! │  • Bookmarks Bar / Other Bookmarks / Mobile Bookmarks      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Merging only ever adds. Nothing local is deleted, moved or renamed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use remark_sync::{InMemoryBookmarkStore, SyncConfig, SyncCredentials, SyncEngine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SyncConfig {
//!         allowed_paths: vec!["Bookmarks Bar###Work".into()],
//!         ..Default::default()
//!     };
//!     let credentials = SyncCredentials::new("octo", "bookmarks", "ghp_...");
//!
//!     let engine = SyncEngine::github(config, credentials, Arc::new(InMemoryBookmarkStore::new()))
//!         .expect("Invalid configuration");
//!
//!     match engine.run_cycle().await {
//!         Ok(report) => println!("Sync complete: {}", report),
//!         Err(e) => eprintln!("Sync failed: {}", e),
//!     }
//! }
//! ```
//!
//! ## Configuration
//!
//! See [`SyncConfig`] for all configuration options.
//!
//! ## Modules
//!
//! - [`coordinator`]: The main [`SyncEngine`] running sync cycles
//! - [`tree`]: Bookmark tree model and structural JSON ingestion
//! - [`flatten`]: Tree to path-annotated records
//! - [`filter`]: Folder-path allow-list
//! - [`resolver`]: Root aliasing and folder creation in the local store
//! - [`merge`]: Additive merge of remote records
//! - [`render`]: Structural, Netscape and Markdown artifacts
//! - [`remote`]: Optimistic-concurrency client over the remote store
//! - [`storage`]: Store traits plus in-memory and GitHub backends
//! - [`resilience`]: Retry with backoff for conflict re-runs

pub mod config;
pub mod tree;
pub mod flatten;
pub mod filter;
pub mod resolver;
pub mod merge;
pub mod render;
pub mod remote;
pub mod storage;
pub mod resilience;
pub mod coordinator;
pub mod metrics;

pub use config::{ConfigError, SyncConfig, SyncCredentials};
pub use tree::{BookmarkPath, BookmarkTree, Folder, Link, Node, NodeId};
pub use flatten::{flatten, folder_paths, FlatRecord};
pub use filter::AllowList;
pub use resolver::ensure_path;
pub use merge::{merge, DuplicateScope, MergeReport};
pub use render::{render_netscape, render_readme, render_structural};
pub use remote::RemoteSyncClient;
pub use storage::traits::{LocalStore, RemoteArtifact, RemoteStore, Revision, RootFolder, StoreError};
pub use storage::memory::{InMemoryBookmarkStore, InMemoryRemoteStore};
pub use storage::github::GitHubContentsStore;
pub use coordinator::{CycleMode, CycleReport, PushedArtifact, SyncEngine, SyncError, SyncPhase};
pub use resilience::retry::RetryConfig;
