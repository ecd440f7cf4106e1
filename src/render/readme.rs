//! Human-readable Markdown index.
//!
//! Folders render as `<details>` so the index collapses on repository hosts
//! that render inline HTML in Markdown. Links carry a link marker, folders a
//! folder marker; both are emitted as numeric entities.

use chrono::{DateTime, Utc};

use super::escape_html;
use crate::tree::{BookmarkTree, Node};

const LINK_MARKER: &str = "&#x1F517;";
const FOLDER_MARKER: &str = "&#x1F4C1;";
const UNTITLED: &str = "Untitled";

const PREAMBLE: &str = "# \u{1F4D1} ReMarks: Synced Bookmarks\n\n\
### \u{1F4C2} Interactive Bookmark Explorer\n\
Click folders to expand.\n\n\
<ul>\n";

/// Render the index, stamped with `generated_at`.
#[must_use]
pub fn render_readme(tree: &BookmarkTree, generated_at: DateTime<Utc>) -> String {
    let mut out = String::from(PREAMBLE);
    render_nodes(tree.roots(), &mut out);
    out.push_str("</ul>\n\n---\n*Last Updated: ");
    out.push_str(&generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    out.push_str("*\n");
    out
}

fn display_title(title: &str) -> String {
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        escape_html(title)
    }
}

fn render_nodes(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Link(link) => {
                out.push_str("<li>");
                out.push_str(LINK_MARKER);
                out.push_str(" <a href=\"");
                out.push_str(&escape_html(&link.url));
                out.push_str("\">");
                out.push_str(&display_title(&link.title));
                out.push_str("</a></li>\n");
            }
            Node::Folder(folder) => {
                out.push_str("<li><details><summary><strong>");
                out.push_str(FOLDER_MARKER);
                out.push(' ');
                out.push_str(&display_title(&folder.title));
                out.push_str("</strong></summary><ul>");
                render_nodes(&folder.children, out);
                out.push_str("</ul></details></li>\n");
            }
        }
    }
}
