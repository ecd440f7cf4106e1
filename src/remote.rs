//! Optimistic-concurrency client over a [`RemoteStore`].
//!
//! `push` is a read-modify-write: it reads the file's current revision and
//! sends it back as the write precondition. A concurrent writer in between
//! turns the write into [`StoreError::Conflict`]; nothing here retries it.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::storage::traits::{RemoteArtifact, RemoteStore, Revision, StoreError};

pub struct RemoteSyncClient {
    store: Arc<dyn RemoteStore>,
    message_prefix: String,
}

impl RemoteSyncClient {
    pub fn new(store: Arc<dyn RemoteStore>, message_prefix: impl Into<String>) -> Self {
        Self {
            store,
            message_prefix: message_prefix.into(),
        }
    }

    /// File content, or `None` when it does not exist.
    pub async fn fetch(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.fetch_artifact(name).await?.map(|a| a.content))
    }

    /// File content with its revision, or `None` when it does not exist.
    pub async fn fetch_artifact(&self, name: &str) -> Result<Option<RemoteArtifact>, StoreError> {
        let artifact = self.store.get(name).await?;
        debug!(name, found = artifact.is_some(), "Fetched remote artifact");
        Ok(artifact)
    }

    /// Write `content` to `name`, guarded by the revision seen just before.
    pub async fn push(&self, name: &str, content: &str) -> Result<Revision, StoreError> {
        self.push_dated(name, content, Utc::now().date_naive()).await
    }

    pub(crate) async fn push_dated(
        &self,
        name: &str,
        content: &str,
        date: NaiveDate,
    ) -> Result<Revision, StoreError> {
        let expected = self.store.get(name).await?.and_then(|a| a.revision);
        let message = commit_message(&self.message_prefix, date);

        let revision = self.store.put(name, content, expected.as_ref(), &message).await?;
        info!(
            name,
            bytes = content.len(),
            created = expected.is_none(),
            revision = %revision,
            "Pushed artifact"
        );
        Ok(revision)
    }
}

/// "Sync 2026-10-14"
pub(crate) fn commit_message(prefix: &str, date: NaiveDate) -> String {
    format!("{} {}", prefix, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryRemoteStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
    }

    #[test]
    fn test_commit_message_format() {
        assert_eq!(commit_message("Sync", date()), "Sync 2026-01-31");
    }

    #[tokio::test]
    async fn test_fetch_absent_is_none() {
        let client = RemoteSyncClient::new(Arc::new(InMemoryRemoteStore::new()), "Sync");
        assert!(client.fetch("bookmarks.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_push_creates_then_updates() {
        let remote = Arc::new(InMemoryRemoteStore::new());
        let client = RemoteSyncClient::new(remote.clone(), "Sync");

        let first = client.push_dated("a.json", "v1", date()).await.unwrap();
        let second = client.push_dated("a.json", "v2", date()).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(client.fetch("a.json").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(remote.commits().len(), 2);
        assert_eq!(remote.commits()[0].1, "Sync 2026-01-31");
    }

    /// Remote that records the precondition of every write.
    struct Recording {
        inner: InMemoryRemoteStore,
        seen: Mutex<Vec<Option<Revision>>>,
    }

    #[async_trait]
    impl RemoteStore for Recording {
        async fn get(&self, name: &str) -> Result<Option<RemoteArtifact>, StoreError> {
            self.inner.get(name).await
        }

        async fn put(
            &self,
            name: &str,
            content: &str,
            expected: Option<&Revision>,
            message: &str,
        ) -> Result<Revision, StoreError> {
            self.seen.lock().push(expected.cloned());
            self.inner.put(name, content, expected, message).await
        }
    }

    #[tokio::test]
    async fn test_push_sends_current_revision_as_precondition() {
        let remote = Arc::new(Recording {
            inner: InMemoryRemoteStore::new(),
            seen: Mutex::new(Vec::new()),
        });
        let existing = remote.inner.insert("a.json", "old");
        let client = RemoteSyncClient::new(remote.clone(), "Sync");

        client.push_dated("a.json", "new", date()).await.unwrap();
        client.push_dated("b.json", "new", date()).await.unwrap();

        assert_eq!(*remote.seen.lock(), vec![Some(existing), None]);
    }

    #[tokio::test]
    async fn test_conflict_surfaces_distinctly() {
        let remote = Arc::new(InMemoryRemoteStore::new());
        remote.insert("a.json", "old");
        remote.force_conflicts(1);
        let client = RemoteSyncClient::new(remote.clone(), "Sync");

        let err = client.push_dated("a.json", "new", date()).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(remote.content("a.json").as_deref(), Some("old"));
    }
}
