// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Bookmark tree model.
//!
//! A [`BookmarkTree`] is an ordered list of top-level roots (toolbar, other,
//! mobile...). Browser stores hand out trees wrapped in a synthetic root node
//! with id [`SYNTHETIC_ROOT_ID`]; that wrapper is stripped once, when the
//! tree is parsed, so nothing downstream ever sees it.
//!
//! # Example
//!
//! ```
//! use remark_sync::BookmarkTree;
//!
//! let json = r#"[{"id":"0","title":"","children":[
//!     {"id":"1","title":"Bookmarks Bar","children":[
//!         {"id":"5","title":"Site","url":"https://e.example"}
//!     ]}
//! ]}]"#;
//!
//! let tree = BookmarkTree::from_json(json).unwrap();
//! assert_eq!(tree.roots().len(), 1);
//! assert_eq!(tree.roots()[0].title(), "Bookmarks Bar");
//! assert_eq!(tree.link_count(), 1);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Id of the non-semantic wrapper node that groups the named root collections.
pub const SYNTHETIC_ROOT_ID: &str = "0";

/// Joins path segments on the configuration surface (`allowed_paths`).
pub const PATH_SEPARATOR: &str = "###";

/// Opaque identifier of a node in a bookmark store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_synthetic_root(&self) -> bool {
        self.0 == SYNTHETIC_ROOT_ID
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A folder: titled, ordered container of child nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folder {
    pub id: NodeId,
    pub title: String,
    #[serde(rename = "dateAdded", skip_serializing_if = "Option::is_none")]
    pub date_added: Option<u64>,
    pub children: Vec<Node>,
}

/// A labeled link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: NodeId,
    pub title: String,
    #[serde(rename = "dateAdded", skip_serializing_if = "Option::is_none")]
    pub date_added: Option<u64>,
    pub url: String,
}

/// One node of a bookmark hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Folder(Folder),
    Link(Link),
}

impl Node {
    pub fn folder(id: impl Into<String>, title: impl Into<String>, children: Vec<Node>) -> Self {
        Self::Folder(Folder {
            id: NodeId::new(id),
            title: title.into(),
            date_added: None,
            children,
        })
    }

    pub fn link(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Link(Link {
            id: NodeId::new(id),
            title: title.into(),
            date_added: None,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Folder(f) => &f.id,
            Self::Link(l) => &l.id,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Folder(f) => &f.title,
            Self::Link(l) => &l.title,
        }
    }

    #[must_use]
    pub fn date_added(&self) -> Option<u64> {
        match self {
            Self::Folder(f) => f.date_added,
            Self::Link(l) => l.date_added,
        }
    }

    /// A node is a folder iff it exposes children.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    /// A node is a link iff it exposes a url.
    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_))
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Link(l) => Some(&l.url),
            Self::Folder(_) => None,
        }
    }

    #[must_use]
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Self::Folder(f) => Some(&f.children),
            Self::Link(_) => None,
        }
    }
}

/// Ordered top-level roots of a bookmark hierarchy, synthetic root removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BookmarkTree {
    roots: Vec<Node>,
}

impl BookmarkTree {
    /// Build a tree from top-level roots. Any synthetic root among them is
    /// replaced by its children.
    pub fn new(roots: Vec<Node>) -> Self {
        Self {
            roots: strip_synthetic(roots),
        }
    }

    /// Parse a structural snapshot or a browser `getTree()` dump.
    ///
    /// Accepts an array of nodes or a single node, with or without the
    /// synthetic root wrapper.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let doc: RawDocument = serde_json::from_str(json)?;
        let raw = match doc {
            RawDocument::Many(nodes) => nodes,
            RawDocument::One(node) => vec![node],
        };
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: Vec<RawNode>) -> Self {
        Self {
            roots: convert_children(raw),
        }
    }

    #[must_use]
    pub fn roots(&self) -> &[Node] {
        &self.roots
    }

    #[must_use]
    pub fn into_roots(self) -> Vec<Node> {
        self.roots
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    #[must_use]
    pub fn link_count(&self) -> usize {
        self.iter().filter(|n| n.is_link()).count()
    }

    #[must_use]
    pub fn folder_count(&self) -> usize {
        self.iter().filter(|n| n.is_folder()).count()
    }

    /// Every link whose url equals `url` exactly.
    #[must_use]
    pub fn find_by_url(&self, url: &str) -> Vec<&Link> {
        self.iter()
            .filter_map(|n| match n {
                Node::Link(l) if l.url == url => Some(l),
                _ => None,
            })
            .collect()
    }

    /// Depth-first, pre-order iteration over every node.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack: Vec<&Node> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            if let Node::Folder(f) = node {
                stack.extend(f.children.iter().rev());
            }
            Some(node)
        })
    }
}

impl From<Vec<Node>> for BookmarkTree {
    fn from(roots: Vec<Node>) -> Self {
        Self::new(roots)
    }
}

fn strip_synthetic(nodes: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Folder(f) if f.id.is_synthetic_root() => out.extend(strip_synthetic(f.children)),
            Node::Folder(mut f) => {
                f.children = strip_synthetic(f.children);
                out.push(Node::Folder(f));
            }
            link => out.push(link),
        }
    }
    out
}

// -----------------------------------------------------------------------------
// Wire shape
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Many(Vec<RawNode>),
    One(RawNode),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(u64),
}

/// A node as browsers emit it. Unknown fields (`index`, `parentId`, ...) are ignored.
#[derive(Deserialize)]
struct RawNode {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "dateAdded")]
    date_added: Option<serde_json::Number>,
    #[serde(default)]
    children: Option<Vec<RawNode>>,
}

impl RawNode {
    fn id(&self) -> NodeId {
        match &self.id {
            Some(RawId::Text(s)) => NodeId::new(s.clone()),
            Some(RawId::Number(n)) => NodeId::new(n.to_string()),
            None => NodeId::new(String::new()),
        }
    }

    fn date_added(&self) -> Option<u64> {
        let n = self.date_added.as_ref()?;
        n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
    }
}

fn convert_children(raw: Vec<RawNode>) -> Vec<Node> {
    let mut out = Vec::with_capacity(raw.len());
    for node in raw {
        let id = node.id();
        let date_added = node.date_added();
        let title = node.title.unwrap_or_default();

        match (node.url, node.children) {
            (Some(url), None) => out.push(Node::Link(Link {
                id,
                title,
                date_added,
                url,
            })),
            (Some(url), Some(children)) if !url.is_empty() => {
                if !children.is_empty() {
                    debug!(%id, dropped = children.len(), "Link carries children; keeping the link only");
                }
                out.push(Node::Link(Link {
                    id,
                    title,
                    date_added,
                    url,
                }));
            }
            (_, Some(children)) if id.is_synthetic_root() => out.extend(convert_children(children)),
            (_, Some(children)) => out.push(Node::Folder(Folder {
                id,
                title,
                date_added,
                children: convert_children(children),
            })),
            // Neither a link nor a folder: nothing to render or merge.
            _ => {}
        }
    }
    out
}

// -----------------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------------

/// Ordered chain of folder titles from a root down to some folder.
///
/// Segments are kept apart; they are only joined with [`PATH_SEPARATOR`]
/// on the configuration surface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkPath(Vec<String>);

impl BookmarkPath {
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Split a `###`-joined path. An empty string is the empty path.
    #[must_use]
    pub fn parse_joined(joined: &str) -> Self {
        if joined.is_empty() {
            return Self::root();
        }
        Self(joined.split(PATH_SEPARATOR).map(str::to_string).collect())
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This path extended with one more folder title.
    #[must_use]
    pub fn child(&self, title: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(title.to_string());
        Self(segments)
    }

    /// Segment-wise prefix test: `["A"]` is a prefix of `["A", "B"]` but not of `["AB"]`.
    #[must_use]
    pub fn starts_with(&self, prefix: &BookmarkPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    #[must_use]
    pub fn join(&self) -> String {
        self.0.join(PATH_SEPARATOR)
    }
}

impl std::fmt::Display for BookmarkPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.0.join("/"))
    }
}

impl<S: Into<String>> FromIterator<S> for BookmarkPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for BookmarkPath {
    fn from(segments: [S; N]) -> Self {
        segments.into_iter().collect()
    }
}
