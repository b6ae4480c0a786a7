//! Template tag expansion for diagram blocks.
//!
//! This module provides [`TagProcessor`], which finds Liquid-style diagram
//! block tags in post content and replaces them with placeholder markup:
//!
//! ```text
//! {% plantuml %}                 {% kroki graphviz %}
//! Alice -> Bob: hello            digraph { a -> b }
//! {% endplantuml %}              {% endkroki %}
//! ```
//!
//! Supported tags are `plantuml`, `graphviz`, `svgbob`, `mermaid`, and the
//! generic `kroki <dialect>` (an empty dialect argument means `plantuml`).

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::block::DiagramBlock;
use crate::html::{ServiceUrl, placeholder_html};
use crate::language::{Dialect, RenderStrategy};

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%-?\s*(plantuml|graphviz|svgbob|mermaid|kroki)\b([^%]*?)\s*-?%\}").unwrap()
});

static CLOSE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{%-?\s*end(plantuml|graphviz|svgbob|mermaid|kroki)\s*-?%\}").unwrap()
});

/// Piece of scanned content.
enum Segment<'a> {
    Text(&'a str),
    Diagram(DiagramBlock),
}

/// Content with diagram tags swapped for comment markers.
///
/// Used when the content still has to pass through a markdown renderer: the
/// markers survive rendering untouched and [`Extraction::apply`] swaps them
/// for the placeholder markup afterwards.
#[derive(Debug)]
pub struct Extraction {
    /// Content with one marker per diagram, each on its own paragraph.
    pub content: String,
    replacements: Vec<(String, String)>,
}

impl Extraction {
    /// Replace every marker in `html` with its placeholder markup.
    #[must_use]
    pub fn apply(&self, html: &str) -> String {
        let mut result = html.to_owned();
        for (marker, markup) in &self.replacements {
            result = result.replace(marker, markup);
        }
        result
    }

    /// Number of diagrams extracted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.replacements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replacements.is_empty()
    }
}

/// Expands diagram block tags into placeholder markup.
///
/// Blocks with the same identity share a single encoded URL.
///
/// # Example
///
/// ```
/// use quill_diagrams::{ServiceUrl, TagProcessor};
///
/// let mut processor = TagProcessor::new(ServiceUrl::default());
/// let html = processor.expand("{% graphviz %}digraph { a -> b }{% endgraphviz %}");
///
/// assert!(html.contains("https://kroki.io/graphviz/svg/"));
/// assert_eq!(processor.blocks().len(), 1);
/// ```
pub struct TagProcessor {
    service: ServiceUrl,
    /// Service URL per block identity.
    urls: HashMap<String, String>,
    /// Blocks found so far, in document order.
    blocks: Vec<DiagramBlock>,
    /// Warnings (accumulated during processing).
    warnings: Vec<String>,
}

impl TagProcessor {
    #[must_use]
    pub fn new(service: ServiceUrl) -> Self {
        Self {
            service,
            urls: HashMap::new(),
            blocks: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Replace every diagram tag in `content` with its placeholder markup.
    pub fn expand(&mut self, content: &str) -> String {
        let segments = self.scan(content);
        let mut out = String::with_capacity(content.len());

        for segment in segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Diagram(block) => {
                    let html = self.render_block(&block);
                    out.push_str(&html);
                    self.blocks.push(block);
                }
            }
        }
        out
    }

    /// Replace every diagram tag in `content` with a comment marker.
    pub fn extract(&mut self, content: &str) -> Extraction {
        let segments = self.scan(content);
        let mut out = String::with_capacity(content.len());
        let mut replacements = Vec::new();

        for segment in segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Diagram(block) => {
                    let marker = format!("<!-- quill:diagram:{} -->", self.blocks.len());
                    out.push_str("\n\n");
                    out.push_str(&marker);
                    out.push_str("\n\n");
                    replacements.push((marker, self.render_block(&block)));
                    self.blocks.push(block);
                }
            }
        }

        Extraction {
            content: out,
            replacements,
        }
    }

    /// Diagram blocks found so far, in document order.
    #[must_use]
    pub fn blocks(&self) -> &[DiagramBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    #[must_use]
    pub fn service(&self) -> &ServiceUrl {
        &self.service
    }

    /// Service URL for a remote block, encoding it at most once per identity.
    pub fn url_for(&mut self, block: &DiagramBlock) -> String {
        if let Some(url) = self.urls.get(block.identity()) {
            tracing::debug!(identity = %block.identity(), "Reusing encoded diagram");
            return url.clone();
        }
        let url = self.service.diagram_url(block);
        self.urls.insert(block.identity().to_owned(), url.clone());
        url
    }

    fn render_block(&mut self, block: &DiagramBlock) -> String {
        match block.dialect().strategy() {
            RenderStrategy::Remote => {
                let url = self.url_for(block);
                placeholder_html(block, &url)
            }
            RenderStrategy::Local => placeholder_html(block, ""),
        }
    }

    fn scan<'a>(&mut self, content: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut cursor = 0;
        let mut search_from = 0;

        while let Some(open) = OPEN_TAG.captures_at(content, search_from) {
            let whole = open.get(0).unwrap();
            let tag = open.get(1).unwrap().as_str();
            let argument = open.get(2).map_or("", |m| m.as_str()).trim();
            let line = line_number(content, whole.start());

            let Some(close) = find_close(content, whole.end(), tag) else {
                self.warnings
                    .push(format!("line {line}: unclosed '{{% {tag} %}}' block ignored"));
                search_from = whole.end();
                continue;
            };

            let Some(dialect) = tag_dialect(tag, argument) else {
                self.warnings.push(format!(
                    "line {line}: unknown diagram dialect '{argument}', block left as-is"
                ));
                search_from = close.1;
                continue;
            };

            let body = content[whole.end()..close.0].trim();
            segments.push(Segment::Text(&content[cursor..whole.start()]));
            segments.push(Segment::Diagram(DiagramBlock::new(dialect, body)));
            cursor = close.1;
            search_from = close.1;
        }

        segments.push(Segment::Text(&content[cursor..]));
        segments
    }
}

/// Resolve the dialect for a tag name and its argument.
fn tag_dialect(tag: &str, argument: &str) -> Option<Dialect> {
    match tag {
        "plantuml" => Some(Dialect::PlantUml),
        "graphviz" => Some(Dialect::GraphViz),
        "svgbob" => Some(Dialect::Svgbob),
        "mermaid" => Some(Dialect::Mermaid),
        "kroki" if argument.is_empty() => Some(Dialect::PlantUml),
        "kroki" => Dialect::parse(argument),
        _ => None,
    }
}

/// Find the `{% end<tag> %}` matching an opening tag, as (start, end) offsets.
fn find_close(content: &str, from: usize, tag: &str) -> Option<(usize, usize)> {
    CLOSE_TAG
        .captures_iter(&content[from..])
        .find(|caps| &caps[1] == tag)
        .map(|caps| {
            let m = caps.get(0).unwrap();
            (from + m.start(), from + m.end())
        })
}

fn line_number(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}
