//! Integration Tests for ReMark Sync
//!
//! End-to-end sync cycles over the in-memory local and remote stores.
//! No network or browser required.
//!
//! # Running Tests
//! ```bash
//! cargo test --test integration
//!
//! # Run only failure scenario tests
//! cargo test --test integration failure
//! ```
//!
//! # Test Organization
//! - `happy_*` - Normal operation: first sync, selective merge, idempotence, aliasing
//! - `failure_*` - Failure scenarios: malformed remote, conflicts, bad credentials

use std::sync::Arc;

use remark_sync::{
    AllowList, BookmarkPath, BookmarkTree, CycleMode, DuplicateScope, InMemoryBookmarkStore,
    InMemoryRemoteStore, LocalStore, Node, RootFolder, SyncConfig, SyncCredentials, SyncEngine,
    SyncError, SyncPhase,
};

// =============================================================================
// Helpers
// =============================================================================

/// Local store holding one link ("Site") on the bookmarks bar
fn local_with_site() -> Arc<InMemoryBookmarkStore> {
    let local = Arc::new(InMemoryBookmarkStore::new());
    let bar = local.root_id(RootFolder::BookmarksBar);
    local.add_link(&bar, "Site", "https://e.example").unwrap();
    local
}

/// Browser-shaped structural snapshot: synthetic root wrapping `roots`
fn remote_json(roots: Vec<Node>) -> String {
    let wrapped = serde_json::json!([{
        "id": "0",
        "title": "",
        "children": BookmarkTree::new(roots),
    }]);
    serde_json::to_string(&wrapped).unwrap()
}

fn work_and_play() -> Vec<Node> {
    vec![
        Node::folder("10", "Work", vec![Node::link("11", "Wiki", "https://wiki.example")]),
        Node::folder("12", "Play", vec![]),
    ]
}

fn config(allowed: &[&str]) -> SyncConfig {
    SyncConfig {
        allowed_paths: allowed.iter().map(|s| s.to_string()).collect(),
        retry_initial_delay_ms: 1,
        retry_max_delay_ms: 5,
        ..Default::default()
    }
}

fn folder_named<'a>(nodes: &'a [Node], title: &str) -> Option<&'a Node> {
    nodes.iter().find(|n| n.is_folder() && n.title() == title)
}

// =============================================================================
// Happy Path
// =============================================================================

#[tokio::test]
async fn happy_first_sync_uploads_all_artifacts() {
    let local = local_with_site();
    let remote = Arc::new(InMemoryRemoteStore::new());
    let engine = SyncEngine::new(SyncConfig::default(), local.clone(), remote.clone());

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.mode, CycleMode::FirstSync);
    assert_eq!(report.added(), 0);
    assert_eq!(report.artifacts.len(), 3);
    for name in ["bookmarks.json", "bookmarks.html", "README.md"] {
        let content = remote.content(name).unwrap_or_else(|| panic!("{} not pushed", name));
        assert!(content.contains("Site"), "{} missing title", name);
        assert!(content.contains("https://e.example"), "{} missing url", name);
    }

    // The snapshot reads back as the local tree
    let snapshot = BookmarkTree::from_json(&remote.content("bookmarks.json").unwrap()).unwrap();
    assert_eq!(snapshot, local.read_tree().await.unwrap());

    let commits = remote.commits();
    assert_eq!(commits.len(), 3);
    assert!(commits.iter().all(|(_, message)| message.starts_with("Sync ")));
    assert_eq!(engine.phase(), SyncPhase::Complete);
}

#[tokio::test]
async fn happy_allow_list_imports_selected_folder() {
    let local = local_with_site();
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.insert("bookmarks.json", &remote_json(work_and_play()));
    let engine = SyncEngine::new(config(&["Work"]), local.clone(), remote.clone());

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.mode, CycleMode::Merged);
    let merge = report.merge.unwrap();
    assert_eq!(merge.added, 1);
    assert_eq!(merge.skipped, 0);

    // Non-alias first segment lands under the bookmarks bar
    let bar = local.children(&local.root_id(RootFolder::BookmarksBar)).await.unwrap();
    let work = folder_named(&bar, "Work").expect("Work folder created");
    assert_eq!(work.children().unwrap()[0].url(), Some("https://wiki.example"));
    assert!(remote.content("README.md").unwrap().contains("https://wiki.example"));
}

#[tokio::test]
async fn happy_allow_list_skips_unselected_folder() {
    let local = local_with_site();
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.insert("bookmarks.json", &remote_json(work_and_play()));
    let engine = SyncEngine::new(config(&["Play"]), local.clone(), remote);

    let merge = engine.run_cycle().await.unwrap().merge.unwrap();

    assert_eq!((merge.added, merge.skipped), (0, 1));
    assert!(local.search_by_url("https://wiki.example").await.unwrap().is_empty());
}

#[tokio::test]
async fn happy_prefix_is_segment_wise() {
    let local = Arc::new(InMemoryBookmarkStore::new());
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.insert(
        "bookmarks.json",
        &remote_json(vec![
            Node::folder("10", "A", vec![Node::link("11", "in a", "https://a.example")]),
            Node::folder("12", "AB", vec![Node::link("13", "in ab", "https://ab.example")]),
        ]),
    );
    let engine = SyncEngine::new(config(&["A"]), local.clone(), remote);

    let merge = engine.run_cycle().await.unwrap().merge.unwrap();

    assert_eq!((merge.added, merge.skipped), (1, 1));
    assert!(local.search_by_url("https://ab.example").await.unwrap().is_empty());
}

#[tokio::test]
async fn happy_second_cycle_is_idempotent() {
    let local = local_with_site();
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.insert("bookmarks.json", &remote_json(work_and_play()));
    let engine = SyncEngine::new(SyncConfig::default(), local.clone(), remote.clone());

    engine.run_cycle().await.unwrap();
    let after_first = local.read_tree().await.unwrap();
    let snapshot_first = remote.content("bookmarks.json").unwrap();

    let second = engine.run_cycle().await.unwrap();
    let merge = second.merge.unwrap();

    assert_eq!(merge.added, 0);
    assert_eq!(merge.duplicates, 2);
    assert_eq!(local.read_tree().await.unwrap(), after_first);
    assert_eq!(remote.content("bookmarks.json").unwrap(), snapshot_first);
}

#[tokio::test]
async fn happy_root_aliases_resolve_to_reserved_roots() {
    let local = Arc::new(InMemoryBookmarkStore::new());
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.insert(
        "bookmarks.json",
        &remote_json(vec![
            Node::folder("1", "Barre de favoris", vec![Node::folder("10", "Dev", vec![
                Node::link("11", "Docs", "https://docs.example"),
            ])]),
            Node::folder("2", "Autres favoris", vec![Node::link("12", "News", "https://news.example")]),
            Node::folder("3", "MOBILE BOOKMARKS", vec![Node::link("13", "Phone", "https://phone.example")]),
        ]),
    );
    let engine = SyncEngine::new(SyncConfig::default(), local.clone(), remote);

    let merge = engine.run_cycle().await.unwrap().merge.unwrap();
    assert_eq!(merge.added, 3);

    let bar = local.children(&local.root_id(RootFolder::BookmarksBar)).await.unwrap();
    assert!(folder_named(&bar, "Barre de favoris").is_none());
    let dev = folder_named(&bar, "Dev").expect("Dev created under the bar");
    assert_eq!(dev.children().unwrap()[0].url(), Some("https://docs.example"));

    let other = local.children(&local.root_id(RootFolder::Other)).await.unwrap();
    assert_eq!(other[0].url(), Some("https://news.example"));

    let mobile = local.children(&local.root_id(RootFolder::Mobile)).await.unwrap();
    assert_eq!(mobile[0].url(), Some("https://phone.example"));
}

#[tokio::test]
async fn happy_existing_folder_reused_case_insensitively() {
    let local = Arc::new(InMemoryBookmarkStore::new());
    let bar = local.root_id(RootFolder::BookmarksBar);
    let work = local.add_folder(&bar, "work").unwrap();
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.insert("bookmarks.json", &remote_json(work_and_play()));
    let engine = SyncEngine::new(SyncConfig::default(), local.clone(), remote);

    engine.run_cycle().await.unwrap();

    let children = local.children(&bar).await.unwrap();
    assert_eq!(children.iter().filter(|n| n.title().eq_ignore_ascii_case("work")).count(), 1);
    assert_eq!(local.children(&work).await.unwrap()[0].url(), Some("https://wiki.example"));
}

#[tokio::test]
async fn happy_same_path_scope_adds_url_present_elsewhere() {
    let local = Arc::new(InMemoryBookmarkStore::new());
    let other = local.root_id(RootFolder::Other);
    local.add_link(&other, "Wiki", "https://wiki.example").unwrap();
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.insert("bookmarks.json", &remote_json(work_and_play()));

    let anywhere = SyncEngine::new(SyncConfig::default(), local.clone(), remote.clone());
    assert_eq!(anywhere.run_cycle().await.unwrap().added(), 0);

    // Reset the remote so the second engine sees the original snapshot
    remote.insert("bookmarks.json", &remote_json(work_and_play()));
    let same_path = SyncEngine::new(
        SyncConfig { duplicate_scope: DuplicateScope::SamePath, ..Default::default() },
        local.clone(),
        remote,
    );
    assert_eq!(same_path.run_cycle().await.unwrap().added(), 1);
    assert_eq!(local.search_by_url("https://wiki.example").await.unwrap().len(), 2);
}

#[tokio::test]
async fn happy_remote_folders_feed_allow_list() {
    let local = local_with_site();
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.insert("bookmarks.json", &remote_json(work_and_play()));
    let engine = SyncEngine::new(SyncConfig::default(), local.clone(), remote);

    let folders = engine.remote_folders().await.unwrap();
    assert_eq!(folders, vec![BookmarkPath::from(["Work"]), BookmarkPath::from(["Play"])]);

    let allow = AllowList::new(folders.into_iter().filter(|p| p.segments()[0] == "Play"));
    let merge = engine.run_cycle_with(&allow).await.unwrap().merge.unwrap();
    assert_eq!((merge.added, merge.skipped), (0, 1));
}

// =============================================================================
// Failure Scenarios
// =============================================================================

#[tokio::test]
async fn failure_malformed_remote_falls_back_to_upload() {
    let local = local_with_site();
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.insert("bookmarks.json", "<!DOCTYPE html><p>not json</p>");
    let engine = SyncEngine::new(SyncConfig::default(), local.clone(), remote.clone());

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.mode, CycleMode::RemoteMalformed);
    assert!(report.merge.is_none());
    let snapshot = BookmarkTree::from_json(&remote.content("bookmarks.json").unwrap()).unwrap();
    assert_eq!(snapshot, local.read_tree().await.unwrap());
}

#[tokio::test]
async fn failure_conflict_surfaces_without_retries() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.force_conflicts(1);
    let engine = SyncEngine::new(config(&[]), local_with_site(), remote.clone());

    let err = engine.run_cycle().await.unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(engine.phase(), SyncPhase::Failed);
    assert!(remote.is_empty());
}

#[tokio::test]
async fn failure_conflict_recovered_by_cycle_retry() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.force_conflicts(2);
    let engine = SyncEngine::new(
        SyncConfig { conflict_retries: 2, ..config(&[]) },
        local_with_site(),
        remote.clone(),
    );

    let report = engine.run_cycle().await.unwrap();

    assert_eq!(report.artifacts.len(), 3);
    assert_eq!(remote.len(), 3);
    assert_eq!(engine.phase(), SyncPhase::Complete);
}

#[tokio::test]
async fn failure_conflict_retries_exhausted() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    remote.force_conflicts(5);
    let engine = SyncEngine::new(
        SyncConfig { conflict_retries: 1, ..config(&[]) },
        local_with_site(),
        remote,
    );

    assert!(engine.run_cycle().await.unwrap_err().is_conflict());
}

#[test]
fn failure_missing_token_fails_fast() {
    let local = Arc::new(InMemoryBookmarkStore::new());

    let result = SyncEngine::github(SyncConfig::default(), SyncCredentials::new("octo", "marks", ""), local);

    match result {
        Err(SyncError::Config(e)) => assert!(e.to_string().contains("token")),
        Err(e) => panic!("expected config error, got {}", e),
        Ok(_) => panic!("expected config error"),
    }
}
