// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Tree flattening.
//!
//! Turns a [`BookmarkTree`] into one [`FlatRecord`] per link, each carrying
//! the chain of folder titles above it.
//!
//! ```
//! use remark_sync::{flatten, BookmarkPath, BookmarkTree, Node};
//!
//! let tree = BookmarkTree::new(vec![
//!     Node::folder("1", "F1", vec![
//!         Node::folder("2", "F2", vec![Node::link("3", "L", "https://l.example")]),
//!     ]),
//! ]);
//!
//! let records = flatten(&tree);
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].path, BookmarkPath::from(["F1", "F2"]));
//! ```

use serde::Serialize;

use crate::tree::{BookmarkPath, BookmarkTree, Node};

/// A link together with the folder path it is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlatRecord {
    pub title: String,
    pub url: String,
    /// Folder titles from a root to the link's parent. Never includes the link's own title.
    pub path: BookmarkPath,
}

/// Flatten the tree depth-first, pre-order.
#[must_use]
pub fn flatten(tree: &BookmarkTree) -> Vec<FlatRecord> {
    let mut out = Vec::new();
    flatten_into(tree.roots(), &BookmarkPath::root(), &mut out);
    out
}

fn flatten_into(nodes: &[Node], path: &BookmarkPath, out: &mut Vec<FlatRecord>) {
    for node in nodes {
        match node {
            Node::Link(link) => out.push(FlatRecord {
                title: link.title.clone(),
                url: link.url.clone(),
                path: path.clone(),
            }),
            Node::Folder(folder) => flatten_into(&folder.children, &path.child(&folder.title), out),
        }
    }
}

/// Path of every folder in the tree, pre-order.
///
/// This is the list a caller offers when letting a user choose which remote
/// folders to import.
#[must_use]
pub fn folder_paths(tree: &BookmarkTree) -> Vec<BookmarkPath> {
    let mut out = Vec::new();
    collect_folders(tree.roots(), &BookmarkPath::root(), &mut out);
    out
}

fn collect_folders(nodes: &[Node], parent: &BookmarkPath, out: &mut Vec<BookmarkPath>) {
    for node in nodes {
        if let Node::Folder(folder) = node {
            let path = parent.child(&folder.title);
            out.push(path.clone());
            collect_folders(&folder.children, &path, out);
        }
    }
}
