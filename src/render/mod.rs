//! Renderers for the three remote artifacts.
//!
//! - [`structural`]: lossless JSON snapshot, read back at the next sync
//! - [`netscape`]: Netscape bookmark file, importable by any browser
//! - [`readme`]: Markdown index with collapsible folders
//!
//! All three walk the same [`BookmarkTree`](crate::BookmarkTree) and render
//! every folder, empty or not. Markup output escapes titles and urls.

pub mod structural;
pub mod netscape;
pub mod readme;

pub use structural::render_structural;
pub use netscape::render_netscape;
pub use readme::render_readme;

/// Escape text for HTML element content and double- or single-quoted attributes.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("https://e.example/?a=1&b=2"), "https://e.example/?a=1&amp;b=2");
    }
}
