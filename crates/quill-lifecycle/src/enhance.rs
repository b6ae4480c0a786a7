//! Reading aids on post pages: copy buttons on code blocks, an image
//! lightbox, and heading links copied to the clipboard.
//!
//! [`decorate_post`] adds the copy buttons to rendered post markup.
//! [`PostEnhancer`] scans the same markup and reacts to [`PostEvent`]s
//! through the page [`Host`].

use std::time::{Duration, Instant};

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quill_diagrams::escape_html;

use crate::discover::{attribute, decode_entity, has_class, is_void};
use crate::event::Key;
use crate::host::Host;
use crate::notify::Notifications;

/// Toast shown after a heading link is copied.
pub const LINK_COPIED: &str = "Link copied to clipboard!";

/// How long a copy button shows its outcome before resetting.
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

/// Class of the button appended to each code block.
pub const COPY_CODE_CLASS: &str = "copy-code-btn";

/// Elements whose images belong to a diagram, which has its own fullscreen view.
const DIAGRAM_CLASSES: [&str; 3] = ["mermaid", "kroki-diagram", "diagram-wrapper"];

/// Styles for the copy buttons, the lightbox and toasts.
pub const ENHANCEMENT_STYLESHEET: &str = r"
.copy-code-btn { position: absolute; top: 0.5rem; right: 0.5rem; background: rgba(0, 0, 0, 0.8); color: white; border: none; padding: 0.5rem 1rem; border-radius: 6px; font-size: 0.8rem; cursor: pointer; transition: all 0.3s ease; z-index: 10; }
.copy-code-btn.copied { background: #10b981; }
pre { position: relative; }
.post-content img { cursor: zoom-in; transition: transform 0.3s ease; }
.image-lightbox { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.9); display: flex; align-items: center; justify-content: center; z-index: 10000; cursor: zoom-out; }
.lightbox-content { position: relative; max-width: 90vw; max-height: 90vh; }
.lightbox-content img { max-width: 100%; max-height: 90vh; border-radius: 8px; }
.lightbox-close { position: absolute; top: -40px; right: 0; background: none; border: none; color: white; font-size: 2rem; cursor: pointer; }
.toast-notification { position: fixed; bottom: 2rem; left: 50%; transform: translateX(-50%); background: #1f2937; color: white; padding: 0.75rem 1.5rem; border-radius: 8px; z-index: 10000; }
";

/// Label state of one copy-code button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyButton {
    Idle,
    Copied,
    Failed,
}

impl CopyButton {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "\u{1F4CB} Copy",
            Self::Copied => "\u{2705} Copied!",
            Self::Failed => "\u{274C} Failed",
        }
    }
}

/// A `<pre><code>` block on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Text content of the `<code>` element, entities resolved.
    pub text: String,
    pub button: CopyButton,
    reset_at: Option<Instant>,
}

/// An image in the post body that opens in the lightbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostImage {
    pub src: String,
    pub alt: String,
}

/// Enlarged view of one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lightbox {
    pub image: PostImage,
}

impl Lightbox {
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            r#"<div class="image-lightbox"><div class="lightbox-content"><img src="{}" alt="{}" /><button class="lightbox-close" aria-label="Close">&#x2715;</button></div></div>"#,
            escape_html(&self.image.src),
            escape_html(&self.image.alt)
        )
    }
}

/// Part of the lightbox that received a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxTarget {
    /// The dimmed area around the image.
    Backdrop,
    Image,
    CloseButton,
}

/// Interactions with a post page outside of diagrams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostEvent {
    /// Copy button of the code block at `index` (document order).
    CopyCodeClicked { index: usize },
    /// A heading with this `id` was clicked.
    HeadingClicked { id: String },
    /// Image at `index` (document order) was clicked.
    ImageClicked { index: usize },
    LightboxClicked(LightboxTarget),
    KeyPressed(Key),
}

/// What a post page offers besides diagrams.
#[derive(Debug, Default, PartialEq, Eq)]
struct PostScan {
    code_blocks: Vec<CodeBlock>,
    images: Vec<PostImage>,
    heading_ids: Vec<String>,
}

/// An element open during a scan.
struct Frame {
    name: Vec<u8>,
    diagram: bool,
}

/// Drives code copying, heading links and the image lightbox for one page.
pub struct PostEnhancer<H: Host> {
    host: H,
    page_url: String,
    scan: PostScan,
    lightbox: Option<Lightbox>,
    notifications: Notifications,
}

impl<H: Host> PostEnhancer<H> {
    /// `page_url` is the address heading links are built from.
    pub fn new(host: H, page_url: impl Into<String>) -> Self {
        Self {
            host,
            page_url: page_url.into(),
            scan: PostScan::default(),
            lightbox: None,
            notifications: Notifications::default(),
        }
    }

    /// Read code blocks, images and heading ids from the post markup,
    /// replacing whatever an earlier scan found.
    pub fn scan(&mut self, html: &str) {
        self.scan = scan_post(html);
        self.lightbox = None;
        tracing::debug!(
            code_blocks = self.scan.code_blocks.len(),
            images = self.scan.images.len(),
            headings = self.scan.heading_ids.len(),
            "Scanned post"
        );
    }

    pub async fn dispatch(&mut self, event: PostEvent) {
        match event {
            PostEvent::CopyCodeClicked { index } => self.copy_code(index, Instant::now()).await,
            PostEvent::HeadingClicked { id } => self.copy_heading_link(&id).await,
            PostEvent::ImageClicked { index } => {
                if let Some(image) = self.scan.images.get(index) {
                    self.lightbox = Some(Lightbox {
                        image: image.clone(),
                    });
                }
            }
            PostEvent::LightboxClicked(LightboxTarget::Backdrop | LightboxTarget::CloseButton)
            | PostEvent::KeyPressed(Key::Escape) => self.lightbox = None,
            PostEvent::LightboxClicked(LightboxTarget::Image)
            | PostEvent::KeyPressed(Key::Other(_)) => {}
        }
    }

    async fn copy_code(&mut self, index: usize, now: Instant) {
        let Some(text) = self.scan.code_blocks.get(index).map(|b| b.text.clone()) else {
            tracing::debug!(index, "Copy for unknown code block");
            return;
        };
        let button = match self.host.write_clipboard(&text).await {
            Ok(()) => CopyButton::Copied,
            Err(e) => {
                tracing::warn!(index, error = %e, "Failed to copy code");
                CopyButton::Failed
            }
        };
        if let Some(block) = self.scan.code_blocks.get_mut(index) {
            block.button = button;
            block.reset_at = Some(now + COPY_FEEDBACK);
        }
    }

    async fn copy_heading_link(&mut self, id: &str) {
        if !self.scan.heading_ids.iter().any(|h| h == id) {
            return;
        }
        let url = anchor_url(&self.page_url, id);
        match self.host.write_clipboard(&url).await {
            Ok(()) => self.notifications.push(LINK_COPIED),
            Err(e) => tracing::warn!(id, error = %e, "Failed to copy heading link"),
        }
    }

    /// Reset copy buttons whose feedback has been shown long enough.
    pub fn tick(&mut self, now: Instant) {
        for block in &mut self.scan.code_blocks {
            if block.reset_at.is_some_and(|at| at <= now) {
                block.button = CopyButton::Idle;
                block.reset_at = None;
            }
        }
    }

    #[must_use]
    pub fn code_blocks(&self) -> &[CodeBlock] {
        &self.scan.code_blocks
    }

    #[must_use]
    pub fn images(&self) -> &[PostImage] {
        &self.scan.images
    }

    #[must_use]
    pub fn heading_ids(&self) -> &[String] {
        &self.scan.heading_ids
    }

    #[must_use]
    pub fn lightbox(&self) -> Option<&Lightbox> {
        self.lightbox.as_ref()
    }

    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }
}

/// `page_url` with its fragment replaced by `#id`.
#[must_use]
pub fn anchor_url(page_url: &str, id: &str) -> String {
    let base = page_url.split_once('#').map_or(page_url, |(base, _)| base);
    format!("{base}#{id}")
}

fn is_heading(name: &[u8]) -> bool {
    matches!(name, [b'h' | b'H', b'1'..=b'6'])
}

fn in_diagram(stack: &[Frame]) -> bool {
    stack.iter().any(|f| f.diagram)
}

fn inside(stack: &[Frame], name: &[u8]) -> bool {
    stack.iter().any(|f| f.name.eq_ignore_ascii_case(name))
}

fn scan_post(html: &str) -> PostScan {
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut scan = PostScan::default();
    let mut stack: Vec<Frame> = Vec::new();
    // Text of the `<pre><code>` being read
    let mut code: Option<String> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "Stopping post scan at malformed markup");
                break;
            }
        };

        match event {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_ascii_lowercase();
                if name == b"img" {
                    push_image(&mut scan, &stack, &e);
                }
                if is_void(&e) {
                    continue;
                }
                if is_heading(&name)
                    && let Some(id) = attribute(&e, b"id").filter(|id| !id.is_empty())
                {
                    scan.heading_ids.push(id);
                }
                if name == b"code" && inside(&stack, b"pre") && code.is_none() {
                    code = Some(String::new());
                }
                let diagram = DIAGRAM_CLASSES.iter().any(|class| has_class(&e, class));
                stack.push(Frame { name, diagram });
            }
            Event::Empty(e) => {
                if e.local_name().as_ref().eq_ignore_ascii_case(b"img") {
                    push_image(&mut scan, &stack, &e);
                }
            }
            Event::Text(e) => {
                if let Some(text) = code.as_mut() {
                    let decoded = reader.decoder().decode(&e).map_or_else(
                        |_| String::from_utf8_lossy(&e).into_owned(),
                        std::borrow::Cow::into_owned,
                    );
                    text.push_str(&decoded);
                }
            }
            Event::GeneralRef(e) => {
                if let Some(text) = code.as_mut() {
                    text.push_str(&decode_entity(&String::from_utf8_lossy(&e)));
                }
            }
            Event::CData(e) => {
                if let Some(text) = code.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                stack.pop();
                if e.local_name().as_ref().eq_ignore_ascii_case(b"code")
                    && let Some(text) = code.take()
                {
                    scan.code_blocks.push(CodeBlock {
                        text,
                        button: CopyButton::Idle,
                        reset_at: None,
                    });
                }
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    scan
}

fn push_image(scan: &mut PostScan, stack: &[Frame], e: &BytesStart<'_>) {
    if in_diagram(stack) {
        return;
    }
    if let Some(src) = attribute(e, b"src") {
        scan.images.push(PostImage {
            src,
            alt: attribute(e, b"alt").unwrap_or_default(),
        });
    }
}

/// Append a copy button to every `<pre>` that holds a `<code>` element.
///
/// Buttons carry `data-index` in document order, matching
/// [`PostEvent::CopyCodeClicked`]. Markup that cannot be parsed is returned
/// unchanged.
#[must_use]
pub fn decorate_post(html: &str) -> String {
    match try_decorate(html) {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "Leaving post markup undecorated");
            html.to_owned()
        }
    }
}

fn try_decorate(html: &str) -> Result<String, Box<dyn std::error::Error>> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().trim_text(false);
    reader.config_mut().check_end_names = false;

    let mut writer = Writer::new(Vec::with_capacity(html.len() + 128));
    // For each open `<pre>`: whether it already holds code or a button
    let mut pres: Vec<(bool, bool)> = Vec::new();
    let mut index = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name().as_ref().to_ascii_lowercase();
                if name == b"pre" {
                    pres.push((false, false));
                } else if let Some(pre) = pres.last_mut() {
                    if name == b"code" {
                        pre.0 = true;
                    } else if name == b"button" && has_class(&e, COPY_CODE_CLASS) {
                        pre.1 = true;
                    }
                }
                writer.write_event(Event::Start(e))?;
            }
            Event::End(e) => {
                if e.local_name().as_ref().eq_ignore_ascii_case(b"pre")
                    && let Some((has_code, has_button)) = pres.pop()
                    && has_code
                    && !has_button
                {
                    write_copy_button(&mut writer, index)?;
                    index += 1;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_copy_button(writer: &mut Writer<Vec<u8>>, index: usize) -> std::io::Result<()> {
    let mut button = BytesStart::new("button");
    button.push_attribute(("class", COPY_CODE_CLASS));
    button.push_attribute(("aria-label", "Copy code"));
    button.push_attribute(("data-index", index.to_string().as_str()));
    writer.write_event(Event::Start(button))?;
    writer.write_event(Event::Text(BytesText::new(CopyButton::Idle.label())))?;
    writer.write_event(Event::End(BytesEnd::new("button")))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::host::{HostError, RenderError};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct ClipboardHost {
        clipboard: RefCell<Vec<String>>,
        denied: bool,
    }

    impl Host for ClipboardHost {
        async fn render(&self, _id: &str, _source: &str) -> Result<String, RenderError> {
            Err(RenderError::Unavailable("not used".to_owned()))
        }

        async fn render_auto(&self, _source: &str) -> Result<String, RenderError> {
            Err(RenderError::Unavailable("not used".to_owned()))
        }

        async fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
            if self.denied {
                return Err(HostError::PermissionDenied("clipboard-write".to_owned()));
            }
            self.clipboard.borrow_mut().push(text.to_owned());
            Ok(())
        }

        fn save_file(&self, _name: &str, _mime: &str, _contents: &[u8]) -> Result<(), HostError> {
            Ok(())
        }

        fn prefers_dark(&self) -> bool {
            false
        }
    }

    const POST: &str = r#"<h1 id="intro-0">Intro</h1>
<p>See <img src="/img/a.png" alt="Chart" /> and <img src="/img/b.png"></p>
<pre><code class="language-rust">fn main() {
    println!("a &lt; b");
}
</code></pre>
<h2 id="usage-1">Usage</h2>
<div class="diagram-container"><div id="k1" class="kroki-diagram"><img src="https://kroki.io/graphviz/svg/x" alt="Graphviz Diagram" /></div></div>
<pre><code>$ quill new</code></pre>
<h3>No id</h3>
"#;

    fn enhancer(host: ClipboardHost) -> PostEnhancer<ClipboardHost> {
        let mut enhancer =
            PostEnhancer::new(host, "https://blog.example.com/2025/03/07/hello.html#top");
        enhancer.scan(POST);
        enhancer
    }

    #[test]
    fn test_scan_finds_code_images_and_headings() {
        let enhancer = enhancer(ClipboardHost::default());

        let code: Vec<&str> = enhancer
            .code_blocks()
            .iter()
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(code, ["fn main() {\n    println!(\"a < b\");\n}\n", "$ quill new"]);
        assert_eq!(
            enhancer.images(),
            [
                PostImage {
                    src: "/img/a.png".to_owned(),
                    alt: "Chart".to_owned(),
                },
                PostImage {
                    src: "/img/b.png".to_owned(),
                    alt: String::new(),
                },
            ]
        );
        assert_eq!(enhancer.heading_ids(), ["intro-0", "usage-1"]);
    }

    #[tokio::test]
    async fn test_copy_code_feedback_resets() {
        let mut enhancer = enhancer(ClipboardHost::default());
        let start = Instant::now();

        enhancer.copy_code(1, start).await;

        assert_eq!(enhancer.host().clipboard.borrow().as_slice(), ["$ quill new"]);
        assert_eq!(enhancer.code_blocks()[1].button, CopyButton::Copied);
        assert_eq!(enhancer.code_blocks()[1].button.label(), "\u{2705} Copied!");

        enhancer.tick(start + Duration::from_secs(1));
        assert_eq!(enhancer.code_blocks()[1].button, CopyButton::Copied);
        enhancer.tick(start + COPY_FEEDBACK);
        assert_eq!(enhancer.code_blocks()[1].button, CopyButton::Idle);
    }

    #[tokio::test]
    async fn test_copy_code_failure_shows_failed() {
        let mut enhancer = enhancer(ClipboardHost {
            denied: true,
            ..ClipboardHost::default()
        });
        enhancer.dispatch(PostEvent::CopyCodeClicked { index: 0 }).await;

        assert_eq!(enhancer.code_blocks()[0].button, CopyButton::Failed);
        assert!(enhancer.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_heading_click_copies_link() {
        let mut enhancer = enhancer(ClipboardHost::default());
        enhancer
            .dispatch(PostEvent::HeadingClicked {
                id: "usage-1".to_owned(),
            })
            .await;
        enhancer
            .dispatch(PostEvent::HeadingClicked {
                id: "missing".to_owned(),
            })
            .await;

        assert_eq!(
            enhancer.host().clipboard.borrow().as_slice(),
            ["https://blog.example.com/2025/03/07/hello.html#usage-1"]
        );
        assert_eq!(enhancer.notifications().last(), Some(LINK_COPIED));
        assert_eq!(enhancer.notifications().len(), 1);
    }

    #[tokio::test]
    async fn test_lightbox_open_and_dismiss() {
        let mut enhancer = enhancer(ClipboardHost::default());

        enhancer.dispatch(PostEvent::ImageClicked { index: 0 }).await;
        let html = enhancer.lightbox().unwrap().to_html();
        assert!(html.contains(r#"<img src="/img/a.png" alt="Chart" />"#));

        enhancer.dispatch(PostEvent::LightboxClicked(LightboxTarget::Image)).await;
        assert!(enhancer.lightbox().is_some());
        enhancer.dispatch(PostEvent::KeyPressed(Key::Escape)).await;
        assert!(enhancer.lightbox().is_none());

        enhancer.dispatch(PostEvent::ImageClicked { index: 1 }).await;
        enhancer.dispatch(PostEvent::LightboxClicked(LightboxTarget::Backdrop)).await;
        assert!(enhancer.lightbox().is_none());

        enhancer.dispatch(PostEvent::ImageClicked { index: 7 }).await;
        assert!(enhancer.lightbox().is_none());
    }

    #[test]
    fn test_anchor_url_replaces_fragment() {
        assert_eq!(anchor_url("https://x.dev/p.html", "a-0"), "https://x.dev/p.html#a-0");
        assert_eq!(anchor_url("https://x.dev/p.html#old", "a-0"), "https://x.dev/p.html#a-0");
    }

    #[test]
    fn test_decorate_post_adds_one_button_per_code_block() {
        let html = decorate_post(POST);

        assert_eq!(html.matches(r#"class="copy-code-btn""#).count(), 2);
        assert!(html.contains(
            "}\n</code><button class=\"copy-code-btn\" aria-label=\"Copy code\" data-index=\"0\">\u{1F4CB} Copy</button></pre>"
        ));
        assert!(html.contains(r#"data-index="1""#));
        assert!(html.contains("a &lt; b"));
        assert_eq!(decorate_post(&html), html);
    }

    #[test]
    fn test_decorate_post_skips_plain_pre() {
        let html = "<pre>ascii art</pre>";
        assert_eq!(decorate_post(html), html);
    }
}
