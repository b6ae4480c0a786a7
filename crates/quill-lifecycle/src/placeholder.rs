//! Placeholders discovered on the page and what they currently display.

use quill_diagrams::{Dialect, LOCAL_CLASS, REMOTE_CLASS, decode, escape_html};

use crate::event::Control;
use crate::state::RenderState;

/// Render strategy of a placeholder, fixed at discovery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Rendered in the page by the local diagram library.
    Local { source: String },
    /// Rendered by the remote service; the build phase embedded the image.
    Remote { src: String },
}

impl Backend {
    /// Best available diagram source text.
    ///
    /// Remote placeholders carry no source in the page, but their image URL
    /// ends in the encoded token, which decodes back to it.
    #[must_use]
    pub fn source_text(&self) -> String {
        match self {
            Self::Local { source } => source.clone(),
            Self::Remote { src } => src
                .rsplit('/')
                .next()
                .and_then(|token| decode(token).ok())
                .unwrap_or_else(|| src.clone()),
        }
    }
}

/// Inline error shown in place of a diagram that could not render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBlock {
    pub title: String,
    pub summary: String,
    /// Offending source, kept verbatim for debugging.
    pub source: Option<String>,
    /// Underlying error text.
    pub message: String,
}

impl ErrorBlock {
    /// Error for a local render that failed on both render paths.
    #[must_use]
    pub fn syntax(dialect: Dialect, source: &str, message: impl Into<String>) -> Self {
        Self {
            title: format!("{} Syntax Error", dialect.label()),
            summary: "Unable to render diagram. Please check the syntax:".to_owned(),
            source: Some(source.to_owned()),
            message: message.into(),
        }
    }

    /// Error for a remote image that failed to load.
    #[must_use]
    pub fn load(dialect: Dialect, source: Option<String>, message: impl Into<String>) -> Self {
        Self {
            title: format!("{} Error", dialect.label()),
            summary: format!("Error loading {} diagram.", dialect.label()),
            source,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!(
            r#"<div class="diagram-error"><h4>{}</h4><p>{}</p>"#,
            escape_html(&self.title),
            escape_html(&self.summary)
        );
        if let Some(source) = &self.source {
            html.push_str(&format!("<pre><code>{}</code></pre>", escape_html(source)));
        }
        html.push_str(&format!(
            "<p><strong>Error:</strong> {}</p></div>",
            escape_html(&self.message)
        ));
        html
    }
}

/// Current inner content of a placeholder element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Raw source text awaiting local rendering.
    Source(String),
    /// Image reference emitted by the build phase.
    Image { src: String },
    /// Rendered markup (usually SVG).
    Markup(String),
    Error(ErrorBlock),
}

impl Content {
    #[must_use]
    pub fn to_html(&self, alt: &str) -> String {
        match self {
            Self::Source(source) => escape_html(source),
            Self::Image { src } => format!(
                r#"<img src="{}" alt="{}" loading="lazy" />"#,
                escape_html(src),
                escape_html(alt)
            ),
            Self::Markup(markup) => markup.clone(),
            Self::Error(block) => block.to_html(),
        }
    }

    /// The first `<svg>…</svg>` element in rendered markup.
    #[must_use]
    pub fn svg(&self) -> Option<&str> {
        let Self::Markup(markup) = self else {
            return None;
        };
        let start = markup.find("<svg")?;
        let end = markup.rfind("</svg>")? + "</svg>".len();
        (end > start).then(|| &markup[start..end])
    }
}

/// Container with interactive controls around a rendered diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wrapper {
    pub controls: Vec<Control>,
}

impl Wrapper {
    fn new() -> Self {
        Self {
            controls: Control::ALL.to_vec(),
        }
    }
}

/// A diagram placeholder element and its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    pub(crate) element_id: String,
    pub(crate) dialect: Dialect,
    pub(crate) backend: Backend,
    pub(crate) state: RenderState,
    pub(crate) content: Content,
    pub(crate) wrapper: Option<Wrapper>,
}

impl Placeholder {
    #[must_use]
    pub fn new(element_id: impl Into<String>, dialect: Dialect, backend: Backend) -> Self {
        let content = match &backend {
            Backend::Local { source } => Content::Source(source.clone()),
            Backend::Remote { src } => Content::Image { src: src.clone() },
        };
        Self {
            element_id: element_id.into(),
            dialect,
            backend,
            state: RenderState::Pending,
            content,
            wrapper: None,
        }
    }

    /// A placeholder the page already marked as rendered, showing `markup`.
    #[must_use]
    pub(crate) fn already_rendered(mut self, markup: impl Into<String>) -> Self {
        self.state = RenderState::Rendered;
        self.content = Content::Markup(markup.into());
        self
    }

    /// A placeholder that already sits inside a control wrapper.
    #[must_use]
    pub(crate) fn already_wrapped(mut self) -> Self {
        self.wrapper = Some(Wrapper::new());
        self
    }

    #[must_use]
    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    #[must_use]
    pub fn state(&self) -> RenderState {
        self.state
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    #[must_use]
    pub fn wrapper(&self) -> Option<&Wrapper> {
        self.wrapper.as_ref()
    }

    /// Attach the control wrapper. Returns `false` when already wrapped.
    pub(crate) fn wrap(&mut self) -> bool {
        if self.wrapper.is_some() {
            return false;
        }
        self.wrapper = Some(Wrapper::new());
        true
    }

    /// Outer HTML of the placeholder, including the wrapper once decorated.
    #[must_use]
    pub fn to_html(&self) -> String {
        let class = match self.backend {
            Backend::Local { .. } => LOCAL_CLASS,
            Backend::Remote { .. } => REMOTE_CLASS,
        };
        let rendered = if self.state == RenderState::Rendered {
            r#" data-rendered="true""#
        } else {
            ""
        };
        let alt = format!("{} Diagram", self.dialect.label());
        let element = format!(
            r#"<div id="{}" class="{class}" data-dialect="{}"{rendered}>{}</div>"#,
            escape_html(&self.element_id),
            self.dialect.endpoint(),
            self.content.to_html(&alt)
        );

        let Some(wrapper) = &self.wrapper else {
            return element;
        };
        let buttons: String = wrapper
            .controls
            .iter()
            .map(|c| format!(r#"<button class="{}" title="{}"></button>"#, c.class(), c.title()))
            .collect();
        format!(
            r#"<div class="diagram-wrapper">{element}<div class="diagram-controls">{buttons}</div></div>"#
        )
    }
}
