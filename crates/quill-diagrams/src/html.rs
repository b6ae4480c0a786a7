//! Placeholder markup emitted by the build phase.
//!
//! Remote dialects get an `<img>` pointing at the rendering service; local
//! dialects carry their escaped source text for the in-page renderer:
//!
//! ```text
//! <div class="diagram-container"><div id="kroki-plantuml-…" class="kroki-diagram" data-dialect="plantuml"><img …/></div></div>
//! <div class="mermaid-diagram"><div id="mermaid-mermaid-…" class="mermaid" data-dialect="mermaid">graph TD; …</div></div>
//! ```

use crate::block::DiagramBlock;
use crate::consts::DEFAULT_KROKI_URL;
use crate::language::RenderStrategy;

/// Class marking a remotely rendered placeholder.
pub const REMOTE_CLASS: &str = "kroki-diagram";

/// Class marking a locally rendered placeholder.
pub const LOCAL_CLASS: &str = "mermaid";

/// Escape text for safe inclusion in HTML element content or attributes.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Base URL of the remote rendering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceUrl {
    base: String,
}

impl ServiceUrl {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `GET` URL returning the SVG rendering of `block`:
    /// `<base>/<dialect>/svg/<token>`.
    #[must_use]
    pub fn diagram_url(&self, block: &DiagramBlock) -> String {
        format!(
            "{}/{}/svg/{}",
            self.base,
            block.dialect().endpoint(),
            block.token()
        )
    }
}

impl Default for ServiceUrl {
    fn default() -> Self {
        Self::new(DEFAULT_KROKI_URL)
    }
}

/// Render the placeholder element for a diagram block.
///
/// `url` is only consulted for remote dialects and should come from
/// [`ServiceUrl::diagram_url`].
#[must_use]
pub fn placeholder_html(block: &DiagramBlock, url: &str) -> String {
    let id = block.dom_id();
    let dialect = block.dialect();
    let endpoint = dialect.endpoint();

    match dialect.strategy() {
        RenderStrategy::Remote => format!(
            r#"<div class="diagram-container"><div id="{id}" class="{REMOTE_CLASS}" data-dialect="{endpoint}"><img src="{src}" alt="{label} Diagram" loading="lazy" /></div></div>"#,
            src = escape_html(url),
            label = dialect.label(),
        ),
        RenderStrategy::Local => format!(
            r#"<div class="mermaid-diagram"><div id="{id}" class="{LOCAL_CLASS}" data-dialect="{endpoint}">{source}</div></div>"#,
            source = escape_html(block.source()),
        ),
    }
}
