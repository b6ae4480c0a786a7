//! Markdown to HTML for posts, with diagrams, heading anchors and a TOC.

use std::borrow::Cow;

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use quill_diagrams::{DiagramBlock, ServiceUrl, TagProcessor, escape_html};

use crate::emoji::strip_emoji;
use crate::reading::reading_minutes;
use crate::slug::heading_slug;
use crate::toc::{TocEntry, toc_html};

/// Result of rendering one post.
#[derive(Clone, Debug)]
pub struct RenderedPost {
    /// Rendered HTML with diagram placeholders in place.
    pub html: String,
    /// Headings in document order.
    pub toc: Vec<TocEntry>,
    pub reading_minutes: usize,
    /// Diagram blocks found in the post.
    pub diagrams: Vec<DiagramBlock>,
    /// Warnings generated while expanding diagram tags.
    pub warnings: Vec<String>,
}

impl RenderedPost {
    /// Table of contents as nested lists.
    #[must_use]
    pub fn toc_html(&self) -> String {
        toc_html(&self.toc)
    }
}

/// Renders post markdown to page HTML.
///
/// Emoji are stripped first, then diagram tags are swapped for markers that
/// survive markdown rendering and are replaced by placeholder markup last.
pub struct PostRenderer {
    service: ServiceUrl,
    keep_emoji: bool,
}

/// A heading being collected.
struct OpenHeading<'a> {
    level: u8,
    id: Option<String>,
    classes: Vec<String>,
    title: String,
    events: Vec<Event<'a>>,
}

impl PostRenderer {
    #[must_use]
    pub fn new(service: ServiceUrl) -> Self {
        Self {
            service,
            keep_emoji: false,
        }
    }

    /// Keep emoji in the output instead of stripping them.
    #[must_use]
    pub fn with_emoji(mut self, keep: bool) -> Self {
        self.keep_emoji = keep;
        self
    }

    pub fn render(&self, markdown: &str) -> RenderedPost {
        let content = if self.keep_emoji {
            Cow::Borrowed(markdown)
        } else {
            strip_emoji(markdown)
        };

        let mut processor = TagProcessor::new(self.service.clone());
        let extraction = processor.extract(&content);
        let (body, toc, words) = render_markdown(&extraction.content);
        let html = extraction.apply(&body);

        for warning in processor.warnings() {
            tracing::warn!(%warning, "Diagram tag");
        }
        tracing::debug!(
            diagrams = processor.blocks().len(),
            headings = toc.len(),
            "Rendered post"
        );

        RenderedPost {
            html,
            toc,
            reading_minutes: reading_minutes(&words),
            diagrams: processor.blocks().to_vec(),
            warnings: processor.warnings().to_vec(),
        }
    }
}

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_GFM
}

/// Render markdown, returning the HTML, the headings and the plain text.
fn render_markdown(markdown: &str) -> (String, Vec<TocEntry>, String) {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut toc = Vec::new();
    let mut words = String::new();
    let mut heading: Option<OpenHeading<'_>> = None;

    for event in Parser::new_ext(markdown, parser_options()) {
        match event {
            Event::Start(Tag::Heading {
                level, id, classes, ..
            }) => {
                heading = Some(OpenHeading {
                    level: heading_level_to_num(level),
                    id: id.map(|id| id.to_string()),
                    classes: classes.iter().map(ToString::to_string).collect(),
                    title: String::new(),
                    events: Vec::new(),
                });
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(open) = heading.take() {
                    let entry = close_heading(open, toc.len(), &mut events);
                    toc.push(entry);
                }
            }
            other => {
                if let Event::Text(text) | Event::Code(text) = &other {
                    words.push_str(text);
                    words.push(' ');
                    if let Some(open) = heading.as_mut() {
                        open.title.push_str(text);
                    }
                }
                match heading.as_mut() {
                    Some(open) => open.events.push(other),
                    None => events.push(other),
                }
            }
        }
    }

    let mut html_out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut html_out, events.into_iter());
    (html_out, toc, words)
}

/// Emit a collected heading with its anchor id.
///
/// Headings without an explicit `{#id}` get `<slug>-<index>`.
fn close_heading(open: OpenHeading<'_>, index: usize, events: &mut Vec<Event<'_>>) -> TocEntry {
    let id = open
        .id
        .unwrap_or_else(|| format!("{}-{index}", heading_slug(&open.title)));

    let mut inner = String::new();
    html::push_html(&mut inner, open.events.into_iter());

    let class = if open.classes.is_empty() {
        String::new()
    } else {
        format!(r#" class="{}""#, escape_html(&open.classes.join(" ")))
    };
    let level = open.level;
    events.push(Event::Html(CowStr::from(format!(
        "<h{level} id=\"{}\"{class}>{inner}</h{level}>\n",
        escape_html(&id)
    ))));

    TocEntry {
        level,
        title: open.title,
        id,
    }
}

fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
