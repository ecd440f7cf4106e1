// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! One sync cycle against a real GitHub repository.
//!
//! The local side is an in-memory store seeded with a couple of links, so
//! the demo shows the remote artifacts without touching a browser profile.
//!
//! ```bash
//! REMARK_ACCOUNT=octo REMARK_REPOSITORY=bookmarks REMARK_TOKEN=ghp_... \
//! REMARK_ALLOWED_PATHS="Bookmarks Bar###Work" \
//! RUST_LOG=remark_sync=debug cargo run --example github_sync
//! ```

use std::env;
use std::sync::Arc;

use remark_sync::{InMemoryBookmarkStore, LocalStore, RootFolder, SyncConfig, SyncCredentials, SyncEngine};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let credentials = SyncCredentials::new(
        env::var("REMARK_ACCOUNT").unwrap_or_default(),
        env::var("REMARK_REPOSITORY").unwrap_or_default(),
        env::var("REMARK_TOKEN").unwrap_or_default(),
    );

    let mut config = SyncConfig::default();
    if let Ok(api_base) = env::var("REMARK_API_BASE") {
        config.api_base = api_base;
    }
    if let Ok(paths) = env::var("REMARK_ALLOWED_PATHS") {
        config.allowed_paths = paths.split(',').map(|p| p.trim().to_string()).collect();
    }

    let local = Arc::new(InMemoryBookmarkStore::new());
    let bar = local.root_id(RootFolder::BookmarksBar);
    let _ = local.add_link(&bar, "Rust", "https://www.rust-lang.org");
    if let Ok(docs) = local.add_folder(&bar, "Docs") {
        let _ = local.add_link(&docs, "std", "https://doc.rust-lang.org/std/");
    }

    let engine = match SyncEngine::github(config, credentials, local.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Cannot start sync");
            std::process::exit(2);
        }
    };

    match engine.remote_folders().await {
        Ok(folders) => {
            for folder in folders {
                info!(%folder, "Remote folder");
            }
        }
        Err(e) => info!(error = %e, "No remote folder list"),
    }

    match engine.run_cycle().await {
        Ok(report) => {
            info!(%report, local_nodes = local.len(), "Done");
            for artifact in &report.artifacts {
                info!(name = %artifact.name, revision = %artifact.revision, "Artifact");
            }
        }
        Err(e) => {
            error!(error = %e, conflict = e.is_conflict(), "Sync failed");
            std::process::exit(1);
        }
    }
}
