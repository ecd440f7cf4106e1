//! Netscape bookmark file, the cross-browser import/export format.
//!
//! ```text
//! <!DOCTYPE NETSCAPE-Bookmark-file-1>
//! ...header...
//! <DL><p>
//!     <DT><H3>Folder</H3>
//!     <DL><p>
//!         <DT><A HREF="https://...">Link</A>
//!     </DL><p>
//! </DL><p>
//! ```

use super::escape_html;
use crate::tree::{BookmarkTree, Node};

const HEADER: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
<!-- This is an automatically generated file.\n     It will be read and overwritten.\n     DO NOT EDIT! -->\n\
<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n\
<TITLE>Bookmarks</TITLE>\n\
<H1>Bookmarks</H1>\n\
<DL><p>\n";

const FOOTER: &str = "</DL><p>\n";

#[must_use]
pub fn render_netscape(tree: &BookmarkTree) -> String {
    let mut out = String::from(HEADER);
    render_nodes(tree.roots(), 1, &mut out);
    out.push_str(FOOTER);
    out
}

fn add_date(date_added: Option<u64>) -> String {
    date_added.map(|ms| format!(" ADD_DATE=\"{}\"", ms / 1000)).unwrap_or_default()
}

fn render_nodes(nodes: &[Node], depth: usize, out: &mut String) {
    let indent = "    ".repeat(depth);
    for node in nodes {
        out.push_str(&indent);
        match node {
            Node::Link(link) => {
                out.push_str("<DT><A HREF=\"");
                out.push_str(&escape_html(&link.url));
                out.push('"');
                out.push_str(&add_date(link.date_added));
                out.push('>');
                out.push_str(&escape_html(&link.title));
                out.push_str("</A>\n");
            }
            Node::Folder(folder) => {
                out.push_str("<DT><H3");
                out.push_str(&add_date(folder.date_added));
                out.push('>');
                out.push_str(&escape_html(&folder.title));
                out.push_str("</H3>\n");
                out.push_str(&indent);
                out.push_str("<DL><p>\n");
                render_nodes(&folder.children, depth + 1, out);
                out.push_str(&indent);
                out.push_str("</DL><p>\n");
            }
        }
    }
}
