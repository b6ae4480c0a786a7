//! Table of contents built from rendered headings.

use quill_diagrams::escape_html;

/// A heading that appears in the table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// Nested `<ul>` navigation for `entries`, empty when there are none.
///
/// Nesting follows level differences between consecutive headings and is
/// always balanced, even when a later heading is shallower than the first.
#[must_use]
pub fn toc_html(entries: &[TocEntry]) -> String {
    let Some(first) = entries.first() else {
        return String::new();
    };

    let mut html = String::from("<ul>");
    let mut current = first.level;
    // Lists opened beyond the outermost one
    let mut depth = 0usize;

    for (index, entry) in entries.iter().enumerate() {
        if entry.level > current {
            let open = usize::from(entry.level - current);
            html.push_str(&"<ul>".repeat(open));
            depth += open;
        } else if entry.level < current {
            let close = usize::from(current - entry.level).min(depth);
            html.push_str(&"</ul>".repeat(close));
            depth -= close;
        }

        html.push_str(&format!(
            r##"<li><a href="#{id}" class="toc-link toc-level-{level}" data-index="{index}">{title}</a></li>"##,
            id = escape_html(&entry.id),
            level = entry.level,
            title = escape_html(&entry.title),
        ));
        current = entry.level;
    }

    html.push_str(&"</ul>".repeat(depth + 1));
    html
}
