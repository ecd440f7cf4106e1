use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::{BookmarkTree, Link, Node, NodeId};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Node not found: {0}")]
    NotFound(NodeId),
    #[error("Node '{0}' is not a folder")]
    NotAFolder(NodeId),
    #[error("Write to '{name}' rejected: remote revision changed since it was read")]
    Conflict { name: String },
    #[error("Remote store rejected credentials (HTTP {0})")]
    Unauthorized(u16),
    #[error("Remote store error: HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Malformed remote response: {0}")]
    Decode(String),
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// A stale-precondition rejection, as opposed to any other failure.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// The reserved top-level collections of a browser bookmark store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootFolder {
    BookmarksBar,
    Other,
    Mobile,
}

impl std::fmt::Display for RootFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BookmarksBar => write!(f, "Bookmarks Bar"),
            Self::Other => write!(f, "Other Bookmarks"),
            Self::Mobile => write!(f, "Mobile Bookmarks"),
        }
    }
}

/// The local tree-structured bookmark store.
///
/// Every call is an individual suspending operation; implementations are not
/// asked to batch or transact them.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Full tree, synthetic root already stripped.
    async fn read_tree(&self) -> Result<BookmarkTree, StoreError>;

    /// Every link anywhere in the store whose url matches exactly.
    async fn search_by_url(&self, url: &str) -> Result<Vec<Link>, StoreError>;

    /// Direct children of a folder, in order.
    async fn children(&self, folder: &NodeId) -> Result<Vec<Node>, StoreError>;

    async fn create_folder(&self, parent: &NodeId, title: &str) -> Result<NodeId, StoreError>;

    async fn create_link(&self, parent: &NodeId, title: &str, url: &str) -> Result<NodeId, StoreError>;

    /// Store id of a reserved root collection.
    fn root_id(&self, root: RootFolder) -> NodeId;
}

/// Opaque version marker for a remote artifact (e.g. a blob hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named text file in the remote store, as last read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteArtifact {
    pub name: String,
    pub content: String,
    pub revision: Option<Revision>,
}

/// The remote file-based content store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// `Ok(None)` when the file does not exist.
    async fn get(&self, name: &str) -> Result<Option<RemoteArtifact>, StoreError>;

    /// Create or update `name`.
    ///
    /// With `expected` set, the write must be rejected with
    /// [`StoreError::Conflict`] unless the current revision matches. Without
    /// it the write is unconditional. Returns the new revision.
    async fn put(
        &self,
        name: &str,
        content: &str,
        expected: Option<&Revision>,
        message: &str,
    ) -> Result<Revision, StoreError>;
}
