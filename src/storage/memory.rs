//! In-memory [`LocalStore`] and [`RemoteStore`] implementations.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as Slot;
use parking_lot::{Mutex, RwLock};
use sha2::{Digest, Sha256};

use crate::tree::{BookmarkTree, Folder, Link, Node, NodeId, SYNTHETIC_ROOT_ID};
use super::traits::{LocalStore, RemoteArtifact, RemoteStore, Revision, RootFolder, StoreError};

const RESERVED_ROOTS: [(&str, RootFolder); 3] = [
    ("1", RootFolder::BookmarksBar),
    ("2", RootFolder::Other),
    ("3", RootFolder::Mobile),
];

struct Entry {
    title: String,
    url: Option<String>,
    date_added: Option<u64>,
    children: Vec<NodeId>,
}

struct Arena {
    entries: HashMap<NodeId, Entry>,
    next_id: u64,
}

impl Arena {
    fn allocate(&mut self) -> NodeId {
        let id = NodeId::new(self.next_id.to_string());
        self.next_id += 1;
        id
    }

    fn insert(&mut self, parent: &NodeId, entry: Entry) -> Result<NodeId, StoreError> {
        self.folder(parent)?;
        let id = self.allocate();
        self.entries.insert(id.clone(), entry);
        if let Some(p) = self.entries.get_mut(parent) {
            p.children.push(id.clone());
        }
        Ok(id)
    }

    fn folder(&self, id: &NodeId) -> Result<&Entry, StoreError> {
        match self.entries.get(id) {
            Some(e) if e.url.is_none() => Ok(e),
            Some(_) => Err(StoreError::NotAFolder(id.clone())),
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    fn node(&self, id: &NodeId) -> Option<Node> {
        let entry = self.entries.get(id)?;
        Some(match &entry.url {
            Some(url) => Node::Link(Link {
                id: id.clone(),
                title: entry.title.clone(),
                date_added: entry.date_added,
                url: url.clone(),
            }),
            None => Node::Folder(Folder {
                id: id.clone(),
                title: entry.title.clone(),
                date_added: entry.date_added,
                children: entry.children.iter().filter_map(|c| self.node(c)).collect(),
            }),
        })
    }

    fn load(&mut self, parent: &NodeId, node: Node) {
        let mut id = node.id().clone();
        if let Ok(n) = id.as_str().parse::<u64>() {
            self.next_id = self.next_id.max(n + 1);
        }
        if id.as_str().is_empty() || self.entries.contains_key(&id) {
            id = self.allocate();
        }
        let entry = match node {
            Node::Link(l) => Entry {
                title: l.title,
                url: Some(l.url),
                date_added: l.date_added,
                children: Vec::new(),
            },
            Node::Folder(f) => {
                let entry = Entry {
                    title: f.title,
                    url: None,
                    date_added: f.date_added,
                    children: Vec::new(),
                };
                self.entries.insert(id.clone(), entry);
                if let Some(p) = self.entries.get_mut(parent) {
                    p.children.push(id.clone());
                }
                for child in f.children {
                    self.load(&id, child);
                }
                return;
            }
        };
        self.entries.insert(id.clone(), entry);
        if let Some(p) = self.entries.get_mut(parent) {
            p.children.push(id);
        }
    }
}

/// Browser-shaped bookmark store held in memory.
///
/// Mirrors the usual browser layout: synthetic root `"0"` wrapping the
/// reserved roots `"1"` (bookmarks bar), `"2"` (other) and `"3"` (mobile).
pub struct InMemoryBookmarkStore {
    arena: RwLock<Arena>,
}

impl InMemoryBookmarkStore {
    /// Empty store with the three reserved roots.
    #[must_use]
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(NodeId::from(SYNTHETIC_ROOT_ID), Entry {
            title: String::new(),
            url: None,
            date_added: None,
            children: RESERVED_ROOTS.iter().map(|(id, _)| NodeId::from(*id)).collect(),
        });
        for (id, root) in RESERVED_ROOTS {
            entries.insert(NodeId::from(id), Entry {
                title: root.to_string(),
                url: None,
                date_added: None,
                children: Vec::new(),
            });
        }
        Self {
            arena: RwLock::new(Arena { entries, next_id: 4 }),
        }
    }

    /// Load a whole tree, keeping its ids. Reserved roots the tree lacks are
    /// added empty after its own roots.
    #[must_use]
    pub fn from_tree(tree: BookmarkTree) -> Self {
        let root = NodeId::from(SYNTHETIC_ROOT_ID);
        let mut entries = HashMap::new();
        entries.insert(root.clone(), Entry {
            title: String::new(),
            url: None,
            date_added: None,
            children: Vec::new(),
        });
        let mut arena = Arena { entries, next_id: 4 };
        for node in tree.into_roots() {
            arena.load(&root, node);
        }
        for (id, kind) in RESERVED_ROOTS {
            let id = NodeId::from(id);
            if !arena.entries.contains_key(&id) {
                arena.load(&root, Node::folder(id.as_str(), kind.to_string(), Vec::new()));
            }
        }
        Self {
            arena: RwLock::new(arena),
        }
    }

    /// Add a folder without going through the async trait.
    pub fn add_folder(&self, parent: &NodeId, title: &str) -> Result<NodeId, StoreError> {
        self.arena.write().insert(parent, Entry {
            title: title.to_string(),
            url: None,
            date_added: None,
            children: Vec::new(),
        })
    }

    /// Add a link without going through the async trait.
    pub fn add_link(&self, parent: &NodeId, title: &str, url: &str) -> Result<NodeId, StoreError> {
        self.arena.write().insert(parent, Entry {
            title: title.to_string(),
            url: Some(url.to_string()),
            date_added: None,
            children: Vec::new(),
        })
    }

    /// Current tree, synchronously.
    #[must_use]
    pub fn snapshot(&self) -> BookmarkTree {
        let arena = self.arena.read();
        let roots: Vec<Node> = arena
            .entries
            .get(&NodeId::from(SYNTHETIC_ROOT_ID))
            .map(|r| r.children.iter().filter_map(|c| arena.node(c)).collect())
            .unwrap_or_default();
        BookmarkTree::new(roots)
    }

    /// Number of nodes, reserved roots included, synthetic root excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.read().entries.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBookmarkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocalStore for InMemoryBookmarkStore {
    async fn read_tree(&self) -> Result<BookmarkTree, StoreError> {
        Ok(self.snapshot())
    }

    async fn search_by_url(&self, url: &str) -> Result<Vec<Link>, StoreError> {
        Ok(self.snapshot().find_by_url(url).into_iter().cloned().collect())
    }

    async fn children(&self, folder: &NodeId) -> Result<Vec<Node>, StoreError> {
        let arena = self.arena.read();
        let entry = arena.folder(folder)?;
        Ok(entry.children.iter().filter_map(|c| arena.node(c)).collect())
    }

    async fn create_folder(&self, parent: &NodeId, title: &str) -> Result<NodeId, StoreError> {
        self.add_folder(parent, title)
    }

    async fn create_link(&self, parent: &NodeId, title: &str, url: &str) -> Result<NodeId, StoreError> {
        self.add_link(parent, title, url)
    }

    fn root_id(&self, root: RootFolder) -> NodeId {
        let id = RESERVED_ROOTS
            .iter()
            .find(|(_, kind)| *kind == root)
            .map_or("1", |(id, _)| *id);
        NodeId::from(id)
    }
}

/// Revision token for a given content: hex SHA-256.
#[must_use]
pub fn content_revision(content: &str) -> Revision {
    Revision::new(hex::encode(Sha256::digest(content.as_bytes())))
}

/// Remote content store held in memory, with content-hash revisions.
pub struct InMemoryRemoteStore {
    files: DashMap<String, RemoteArtifact>,
    commits: Mutex<Vec<(String, String)>>,
    forced_conflicts: AtomicUsize,
}

impl InMemoryRemoteStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: DashMap::new(),
            commits: Mutex::new(Vec::new()),
            forced_conflicts: AtomicUsize::new(0),
        }
    }

    /// Seed a file directly, as if another client had written it.
    pub fn insert(&self, name: &str, content: &str) -> Revision {
        let revision = content_revision(content);
        self.files.insert(name.to_string(), RemoteArtifact {
            name: name.to_string(),
            content: content.to_string(),
            revision: Some(revision.clone()),
        });
        revision
    }

    /// Current content of a file.
    #[must_use]
    pub fn content(&self, name: &str) -> Option<String> {
        self.files.get(name).map(|f| f.content.clone())
    }

    /// Reject the next `n` writes with [`StoreError::Conflict`].
    pub fn force_conflicts(&self, n: usize) {
        self.forced_conflicts.store(n, Ordering::SeqCst);
    }

    /// `(file, message)` of every accepted write, oldest first.
    #[must_use]
    pub fn commits(&self) -> Vec<(String, String)> {
        self.commits.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn get(&self, name: &str) -> Result<Option<RemoteArtifact>, StoreError> {
        Ok(self.files.get(name).map(|r| r.value().clone()))
    }

    async fn put(
        &self,
        name: &str,
        content: &str,
        expected: Option<&Revision>,
        message: &str,
    ) -> Result<Revision, StoreError> {
        let forced = self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if forced {
            return Err(StoreError::Conflict { name: name.to_string() });
        }

        let revision = content_revision(content);
        let artifact = RemoteArtifact {
            name: name.to_string(),
            content: content.to_string(),
            revision: Some(revision.clone()),
        };
        match (self.files.entry(name.to_string()), expected) {
            (Slot::Occupied(mut slot), Some(expected)) => {
                if slot.get().revision.as_ref() != Some(expected) {
                    return Err(StoreError::Conflict { name: name.to_string() });
                }
                slot.insert(artifact);
            }
            (Slot::Occupied(mut slot), None) => {
                slot.insert(artifact);
            }
            (Slot::Vacant(_), Some(_)) => {
                return Err(StoreError::Conflict { name: name.to_string() });
            }
            (Slot::Vacant(slot), None) => {
                slot.insert(artifact);
            }
        }

        self.commits.lock().push((name.to_string(), message.to_string()));
        Ok(revision)
    }
}
