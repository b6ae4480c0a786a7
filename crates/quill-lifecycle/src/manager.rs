//! Event-driven lifecycle manager for the diagrams on one page.
//!
//! The manager owns every placeholder's state machine and reacts to
//! [`PageEvent`]s delivered by the host. Events are handled one at a time;
//! a failure only ever affects the placeholder or user action that caused it.

use chrono::Utc;

use crate::context::{LifecycleConfig, PageContext};
use crate::discover::discover;
use crate::event::{Control, Key, OverlayTarget, PageEvent, THEME_ATTRIBUTE};
use crate::host::Host;
use crate::notify::Notifications;
use crate::placeholder::{Backend, Content, ErrorBlock, Placeholder};
use crate::recolor::{Palette, recolor_svg};
use crate::state::RenderState;
use crate::visibility::IntersectionEntry;

const COPIED_SVG: &str = "Diagram copied to clipboard!";
const COPIED_SOURCE: &str = "Diagram source copied to clipboard!";
const COPY_FAILED: &str = "Failed to copy diagram";
const DOWNLOADED: &str = "Diagram downloaded!";
const NO_SVG: &str = "No SVG found to download";
const DOWNLOAD_FAILED: &str = "Failed to download diagram";

/// MIME type of downloaded diagrams.
const SVG_MIME: &str = "image/svg+xml";

/// Active color scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Light,
    Dark,
}

/// Fullscreen view of one rendered diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub element_id: String,
    /// Recolored copy of the diagram markup.
    pub markup: String,
}

/// Drives discovery, lazy rendering, decoration and theming for one page.
pub struct DiagramManager<H: Host> {
    host: H,
    config: LifecycleConfig,
    context: PageContext,
    placeholders: Vec<Placeholder>,
    overlay: Option<Overlay>,
    notifications: Notifications,
    system_dark: bool,
    theme_attribute: Option<String>,
}

impl<H: Host> DiagramManager<H> {
    /// Create a manager for a freshly loaded page.
    pub fn new(host: H, config: LifecycleConfig) -> Self {
        let context = PageContext::new(&config);
        let system_dark = host.prefers_dark();
        Self {
            host,
            config,
            context,
            placeholders: Vec::new(),
            overlay: None,
            notifications: Notifications::default(),
            system_dark,
            theme_attribute: None,
        }
    }

    /// Register the placeholders found in `html`.
    ///
    /// Placeholders that are already known are left alone, so the pass can
    /// run again after the page inserts more content. Returns the number of
    /// newly registered placeholders.
    pub fn discover(&mut self, html: &str) -> usize {
        let palette = self.palette().clone();
        let mut added = 0;
        for mut placeholder in discover(html, &self.config.service) {
            if self.position(placeholder.element_id()).is_some() {
                continue;
            }
            // Markup the page rendered earlier follows the current scheme too
            if let Content::Markup(markup) = &placeholder.content {
                placeholder.content = Content::Markup(recolor_svg(markup, &palette));
            }
            self.placeholders.push(placeholder);
            added += 1;
        }
        tracing::debug!(added, total = self.placeholders.len(), "Discovery pass");
        added
    }

    /// Handle one page event.
    pub async fn dispatch(&mut self, event: PageEvent) {
        match event {
            PageEvent::Intersected(entry) => self.on_intersection(&entry).await,
            PageEvent::ImageLoaded { element_id, svg } => self.on_image_loaded(&element_id, svg),
            PageEvent::ImageFailed { element_id, reason } => {
                self.on_image_failed(&element_id, &reason);
            }
            PageEvent::SystemSchemeChanged { prefers_dark } => {
                self.system_dark = prefers_dark;
                self.apply_theme();
            }
            PageEvent::AttributeChanged { attribute, value } => {
                if attribute == THEME_ATTRIBUTE {
                    self.theme_attribute = value;
                    self.apply_theme();
                }
            }
            PageEvent::ControlClicked {
                element_id,
                control,
            } => match control {
                Control::Fullscreen => self.open_overlay(&element_id),
                Control::Copy => self.copy(&element_id).await,
                Control::Download => self.download(&element_id),
            },
            PageEvent::KeyPressed(Key::Escape) => self.close_overlay(),
            PageEvent::KeyPressed(Key::Other(_)) => {}
            PageEvent::OverlayClicked(target) => match target {
                OverlayTarget::Background | OverlayTarget::CloseButton => self.close_overlay(),
                OverlayTarget::Content => {}
            },
        }
    }

    async fn on_intersection(&mut self, entry: &IntersectionEntry) {
        if !self.context.observer().accepts(entry) {
            return;
        }
        let Some(index) = self.position(&entry.element_id) else {
            tracing::debug!(element_id = %entry.element_id, "Intersection for unknown element");
            return;
        };

        let placeholder = &mut self.placeholders[index];
        if placeholder.state != RenderState::Pending {
            return;
        }
        if let Backend::Local { source } = &placeholder.backend
            && source.trim().is_empty()
        {
            tracing::warn!(element_id = %entry.element_id, "Skipping diagram with empty source");
            return;
        }
        if !transition(placeholder, RenderState::Queued) {
            return;
        }

        // Remote images load on their own; the host reports the outcome
        if matches!(placeholder.backend, Backend::Local { .. }) {
            self.render_local(index).await;
        }
    }

    async fn render_local(&mut self, index: usize) {
        let placeholder = &mut self.placeholders[index];
        let Backend::Local { source } = &placeholder.backend else {
            return;
        };
        let source = source.clone();
        let element_id = placeholder.element_id.clone();
        if !transition(placeholder, RenderState::Rendering) {
            return;
        }

        let render_id = self.context.next_render_id();
        let result = match self.host.render(&render_id, &source).await {
            Ok(markup) => Ok(markup),
            Err(primary) => {
                tracing::warn!(%element_id, error = %primary, "Render failed, trying automatic detection");
                match self.host.render_auto(&source).await {
                    Ok(markup) => Ok(markup),
                    Err(fallback) => {
                        tracing::error!(%element_id, error = %fallback, "Fallback render failed");
                        Err(primary)
                    }
                }
            }
        };

        let palette = self.palette().clone();
        let placeholder = &mut self.placeholders[index];
        match result {
            Ok(markup) => {
                placeholder.content = Content::Markup(recolor_svg(&markup, &palette));
                if transition(placeholder, RenderState::Rendered) {
                    self.context.record_rendered();
                    tracing::info!(%element_id, %render_id, "Rendered diagram");
                    self.decorate(&element_id);
                }
            }
            Err(e) => {
                placeholder.content =
                    Content::Error(ErrorBlock::syntax(placeholder.dialect, &source, e.to_string()));
                if transition(placeholder, RenderState::Failed) {
                    self.context.record_failed();
                }
            }
        }
    }

    fn on_image_loaded(&mut self, element_id: &str, svg: Option<String>) {
        let palette = self.palette().clone();
        let Some(placeholder) = self.remote_mut(element_id) else {
            return;
        };
        if !start_image(placeholder) {
            return;
        }
        if let Some(svg) = svg {
            placeholder.content = Content::Markup(recolor_svg(&svg, &palette));
        }
        if transition(placeholder, RenderState::Rendered) {
            self.context.record_rendered();
            tracing::info!(element_id, "Remote diagram loaded");
            self.decorate(element_id);
        }
    }

    fn on_image_failed(&mut self, element_id: &str, reason: &str) {
        let Some(placeholder) = self.remote_mut(element_id) else {
            return;
        };
        if !start_image(placeholder) {
            return;
        }
        tracing::error!(element_id, reason, "Remote diagram failed to load");
        let source = placeholder.backend.source_text();
        placeholder.content =
            Content::Error(ErrorBlock::load(placeholder.dialect, Some(source), reason));
        if transition(placeholder, RenderState::Failed) {
            self.context.record_failed();
        }
    }

    /// Attach fullscreen, copy and download controls to a rendered diagram.
    ///
    /// Returns `true` when the wrapper was added, `false` when the element is
    /// unknown, not rendered, or already decorated.
    pub fn decorate(&mut self, element_id: &str) -> bool {
        let Some(index) = self.position(element_id) else {
            return false;
        };
        let placeholder = &mut self.placeholders[index];
        if placeholder.state != RenderState::Rendered {
            return false;
        }
        placeholder.wrap()
    }

    fn open_overlay(&mut self, element_id: &str) {
        let Some(placeholder) = self.rendered(element_id) else {
            return;
        };
        let markup = match &placeholder.content {
            Content::Markup(markup) => recolor_svg(markup, self.palette()),
            other => other.to_html(&format!("{} Diagram", placeholder.dialect.label())),
        };
        tracing::debug!(element_id, "Opening fullscreen view");
        self.overlay = Some(Overlay {
            element_id: element_id.to_owned(),
            markup,
        });
    }

    fn close_overlay(&mut self) {
        if self.overlay.take().is_some() {
            tracing::debug!("Closed fullscreen view");
        }
    }

    async fn copy(&mut self, element_id: &str) {
        let Some(placeholder) = self.rendered(element_id) else {
            return;
        };
        let (text, message) = match placeholder.content.svg() {
            Some(svg) => (svg.to_owned(), COPIED_SVG),
            None => (placeholder.backend.source_text(), COPIED_SOURCE),
        };

        match self.host.write_clipboard(&text).await {
            Ok(()) => self.notifications.push(message),
            Err(e) => {
                tracing::warn!(element_id, error = %e, "Clipboard write failed");
                self.notifications.push(COPY_FAILED);
            }
        }
    }

    fn download(&mut self, element_id: &str) {
        let Some(placeholder) = self.rendered(element_id) else {
            return;
        };
        let Some(svg) = placeholder.content.svg() else {
            self.notifications.push(NO_SVG);
            return;
        };

        let name = format!("diagram-{}.svg", Utc::now().timestamp_millis());
        match self.host.save_file(&name, SVG_MIME, svg.as_bytes()) {
            Ok(()) => self.notifications.push(DOWNLOADED),
            Err(e) => {
                tracing::warn!(element_id, error = %e, "Download failed");
                self.notifications.push(DOWNLOAD_FAILED);
            }
        }
    }

    /// Re-apply text colors for the current scheme to every rendered diagram
    /// and the overlay. Never re-renders.
    fn apply_theme(&mut self) {
        let scheme = self.scheme();
        let palette = self.palette().clone();
        let mut recolored = 0;

        for placeholder in &mut self.placeholders {
            if let Content::Markup(markup) = &placeholder.content {
                placeholder.content = Content::Markup(recolor_svg(markup, &palette));
                recolored += 1;
            }
        }
        if let Some(overlay) = &mut self.overlay {
            overlay.markup = recolor_svg(&overlay.markup, &palette);
        }

        tracing::info!(?scheme, recolored, "Adapted diagram text colors");
    }

    /// Dark when the system prefers dark or the page forces `data-mode="dark"`.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        if self.system_dark || self.theme_attribute.as_deref() == Some("dark") {
            Scheme::Dark
        } else {
            Scheme::Light
        }
    }

    fn palette(&self) -> &Palette {
        match self.scheme() {
            Scheme::Light => &self.config.light,
            Scheme::Dark => &self.config.dark,
        }
    }

    #[must_use]
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    #[must_use]
    pub fn placeholder(&self, element_id: &str) -> Option<&Placeholder> {
        self.placeholders
            .iter()
            .find(|p| p.element_id == element_id)
    }

    #[must_use]
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    #[must_use]
    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    #[must_use]
    pub fn context(&self) -> &PageContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut PageContext {
        &mut self.context
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Drop all page state before navigating away.
    pub fn teardown(&mut self) {
        self.context.teardown();
        self.placeholders.clear();
        self.overlay = None;
        self.notifications.clear();
    }

    fn position(&self, element_id: &str) -> Option<usize> {
        self.placeholders
            .iter()
            .position(|p| p.element_id == element_id)
    }

    fn rendered(&self, element_id: &str) -> Option<&Placeholder> {
        self.placeholder(element_id)
            .filter(|p| p.state == RenderState::Rendered)
    }

    fn remote_mut(&mut self, element_id: &str) -> Option<&mut Placeholder> {
        let placeholder = self
            .placeholders
            .iter_mut()
            .find(|p| p.element_id == element_id)?;
        if matches!(placeholder.backend, Backend::Remote { .. }) {
            Some(placeholder)
        } else {
            tracing::warn!(element_id, "Image event for a locally rendered diagram");
            None
        }
    }
}

/// Apply a transition, logging and ignoring illegal ones.
fn transition(placeholder: &mut Placeholder, next: RenderState) -> bool {
    match placeholder.state.advance(next) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(element_id = %placeholder.element_id, error = %e, "Ignoring transition");
            false
        }
    }
}

/// Bring a remote placeholder to `Rendering` once its image settles.
///
/// Browsers may load a lazy image before the intersection event arrives, so
/// a still-pending placeholder is queued first.
fn start_image(placeholder: &mut Placeholder) -> bool {
    if placeholder.state == RenderState::Pending && !transition(placeholder, RenderState::Queued) {
        return false;
    }
    transition(placeholder, RenderState::Rendering)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::host::{HostError, RenderError};
    use pretty_assertions::assert_eq;
    use quill_diagrams::{DiagramBlock, Dialect, ServiceUrl};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    enum Outcome {
        #[default]
        Primary,
        Fallback,
        Broken,
    }

    #[derive(Default)]
    struct FakeHost {
        outcome: Outcome,
        render_calls: Cell<usize>,
        auto_calls: Cell<usize>,
        render_ids: RefCell<Vec<String>>,
        clipboard: RefCell<Vec<String>>,
        clipboard_denied: bool,
        saved: RefCell<Vec<(String, String, Vec<u8>)>>,
        dark: bool,
    }

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><g class="note"><text>note</text></g><text>Alice</text></svg>"#;

    impl Host for FakeHost {
        async fn render(&self, id: &str, _source: &str) -> Result<String, RenderError> {
            self.render_calls.set(self.render_calls.get() + 1);
            self.render_ids.borrow_mut().push(id.to_owned());
            match self.outcome {
                Outcome::Primary => Ok(format!("<div>{SVG}</div>")),
                Outcome::Fallback | Outcome::Broken => Err(RenderError::Syntax(
                    "Parse error on line 1: Expecting 'SOLID_ARROW'".to_owned(),
                )),
            }
        }

        async fn render_auto(&self, _source: &str) -> Result<String, RenderError> {
            self.auto_calls.set(self.auto_calls.get() + 1);
            match self.outcome {
                Outcome::Fallback => Ok(SVG.to_owned()),
                Outcome::Primary | Outcome::Broken => {
                    Err(RenderError::Syntax("No diagram type detected".to_owned()))
                }
            }
        }

        async fn write_clipboard(&self, text: &str) -> Result<(), HostError> {
            if self.clipboard_denied {
                return Err(HostError::PermissionDenied("clipboard-write".to_owned()));
            }
            self.clipboard.borrow_mut().push(text.to_owned());
            Ok(())
        }

        fn save_file(&self, name: &str, mime: &str, contents: &[u8]) -> Result<(), HostError> {
            self.saved
                .borrow_mut()
                .push((name.to_owned(), mime.to_owned(), contents.to_vec()));
            Ok(())
        }

        fn prefers_dark(&self) -> bool {
            self.dark
        }
    }

    fn page() -> String {
        let block = DiagramBlock::new(Dialect::PlantUml, "Alice -> Bob: hi");
        let src = ServiceUrl::default().diagram_url(&block);
        format!(
            r#"<article>
<div class="mermaid-diagram"><div id="m1" class="mermaid" data-dialect="mermaid">sequenceDiagram
  Alice-&gt;&gt;Bob: hi
</div></div>
<div class="diagram-container"><div id="k1" class="kroki-diagram" data-dialect="plantuml"><img src="{src}" alt="PlantUML Diagram" loading="lazy" /></div></div>
</article>"#
        )
    }

    fn manager(host: FakeHost) -> DiagramManager<FakeHost> {
        let mut manager = DiagramManager::new(host, LifecycleConfig::default());
        manager.discover(&page());
        manager
    }

    fn visible(element_id: &str) -> PageEvent {
        PageEvent::Intersected(IntersectionEntry {
            element_id: element_id.to_owned(),
            is_intersecting: true,
            ratio: 0.5,
        })
    }

    fn clicked(element_id: &str, control: Control) -> PageEvent {
        PageEvent::ControlClicked {
            element_id: element_id.to_owned(),
            control,
        }
    }

    fn dark_mode(value: &str) -> PageEvent {
        PageEvent::AttributeChanged {
            attribute: THEME_ATTRIBUTE.to_owned(),
            value: Some(value.to_owned()),
        }
    }

    #[test]
    fn test_discovery_is_idempotent() {
        let mut manager = manager(FakeHost::default());

        assert_eq!(manager.placeholders().len(), 2);
        assert_eq!(manager.discover(&page()), 0);
        assert_eq!(manager.placeholders().len(), 2);
    }

    #[tokio::test]
    async fn test_local_render_success() {
        let mut manager = manager(FakeHost::default());
        manager.dispatch(visible("m1")).await;

        let placeholder = manager.placeholder("m1").unwrap();
        assert_eq!(placeholder.state(), RenderState::Rendered);
        assert!(placeholder.wrapper().is_some());
        assert_eq!(manager.host().render_calls.get(), 1);
        assert_eq!(manager.host().auto_calls.get(), 0);
        assert_eq!(manager.context().rendered(), 1);
        assert!(manager.host().render_ids.borrow()[0].starts_with("mermaid-"));
    }

    #[tokio::test]
    async fn test_below_threshold_is_ignored() {
        let mut manager = manager(FakeHost::default());
        manager
            .dispatch(PageEvent::Intersected(IntersectionEntry {
                element_id: "m1".to_owned(),
                is_intersecting: true,
                ratio: 0.05,
            }))
            .await;

        assert_eq!(manager.placeholder("m1").unwrap().state(), RenderState::Pending);
        assert_eq!(manager.host().render_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_fallback_success_ends_rendered() {
        let mut manager = manager(FakeHost {
            outcome: Outcome::Fallback,
            ..FakeHost::default()
        });
        manager.dispatch(visible("m1")).await;

        let placeholder = manager.placeholder("m1").unwrap();
        assert_eq!(placeholder.state(), RenderState::Rendered);
        assert_eq!(manager.host().auto_calls.get(), 1);
        assert_eq!(manager.context().failed(), 0);
    }

    #[tokio::test]
    async fn test_both_paths_fail_shows_source_verbatim() {
        let mut manager = manager(FakeHost {
            outcome: Outcome::Broken,
            ..FakeHost::default()
        });
        manager.dispatch(visible("m1")).await;

        let placeholder = manager.placeholder("m1").unwrap();
        assert_eq!(placeholder.state(), RenderState::Failed);
        assert!(placeholder.wrapper().is_none());
        assert_eq!(
            placeholder.content(),
            &Content::Error(ErrorBlock {
                title: "Mermaid Syntax Error".to_owned(),
                summary: "Unable to render diagram. Please check the syntax:".to_owned(),
                source: Some("sequenceDiagram\n  Alice->>Bob: hi".to_owned()),
                message: "Parse error on line 1: Expecting 'SOLID_ARROW'".to_owned(),
            })
        );
        assert_eq!(manager.context().failed(), 1);
    }

    #[tokio::test]
    async fn test_failed_is_terminal() {
        let mut manager = manager(FakeHost {
            outcome: Outcome::Broken,
            ..FakeHost::default()
        });
        manager.dispatch(visible("m1")).await;
        manager.dispatch(visible("m1")).await;

        assert_eq!(manager.host().render_calls.get(), 1);
    }

    #[tokio::test]
    async fn test_rendered_markup_is_never_reprocessed() {
        let host = FakeHost::default();
        let mut manager = DiagramManager::new(host, LifecycleConfig::default());
        manager.discover(r#"<div id="m9" class="mermaid" data-rendered="true"><svg></svg></div>"#);
        manager.dispatch(visible("m9")).await;

        assert_eq!(manager.host().render_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_prerendered_wrapped_diagram() {
        let mut manager = DiagramManager::new(
            FakeHost {
                dark: true,
                ..FakeHost::default()
            },
            LifecycleConfig::default(),
        );
        manager.discover(&format!(
            r#"<div class="diagram-wrapper"><div id="m9" class="mermaid" data-rendered="true">{SVG}</div><div class="diagram-controls"><button class="diagram-btn copy-btn" title="Copy Diagram"></button></div></div>"#
        ));

        assert!(!manager.decorate("m9"));
        let html = manager.placeholder("m9").unwrap().to_html();
        assert_eq!(html.matches("diagram-controls").count(), 1);
        assert!(html.contains("fill: #f9fafb"));

        manager.dispatch(clicked("m9", Control::Copy)).await;
        assert!(manager.host().clipboard.borrow()[0].starts_with("<svg"));
        assert_eq!(manager.notifications().last(), Some("Diagram copied to clipboard!"));
        assert_eq!(manager.host().render_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_empty_source_stays_pending() {
        let mut manager = DiagramManager::new(FakeHost::default(), LifecycleConfig::default());
        manager.discover(r#"<div id="m0" class="mermaid">   </div>"#);
        manager.dispatch(visible("m0")).await;

        assert_eq!(manager.placeholder("m0").unwrap().state(), RenderState::Pending);
        assert_eq!(manager.host().render_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_remote_image_lifecycle() {
        let mut manager = manager(FakeHost::default());
        manager.dispatch(visible("k1")).await;
        assert_eq!(manager.placeholder("k1").unwrap().state(), RenderState::Queued);

        manager
            .dispatch(PageEvent::ImageLoaded {
                element_id: "k1".to_owned(),
                svg: Some(SVG.to_owned()),
            })
            .await;

        let placeholder = manager.placeholder("k1").unwrap();
        assert_eq!(placeholder.state(), RenderState::Rendered);
        assert!(placeholder.wrapper().is_some());
        assert!(placeholder.content().svg().unwrap().contains("fill: #1f2937"));
        assert_eq!(manager.host().render_calls.get(), 0);
    }

    #[tokio::test]
    async fn test_remote_image_failure() {
        let mut manager = manager(FakeHost::default());
        manager
            .dispatch(PageEvent::ImageFailed {
                element_id: "k1".to_owned(),
                reason: "HTTP 400".to_owned(),
            })
            .await;

        let placeholder = manager.placeholder("k1").unwrap();
        assert_eq!(placeholder.state(), RenderState::Failed);
        let Content::Error(block) = placeholder.content() else {
            panic!("expected error block, got {:?}", placeholder.content());
        };
        assert_eq!(block.title, "PlantUML Error");
        assert_eq!(block.message, "HTTP 400");
    }

    #[tokio::test]
    async fn test_decorate_is_idempotent() {
        let mut manager = manager(FakeHost::default());
        manager.dispatch(visible("m1")).await;

        assert!(!manager.decorate("m1"));
        assert!(!manager.decorate("m1"));
        let html = manager.placeholder("m1").unwrap().to_html();
        assert_eq!(html.matches("diagram-controls").count(), 1);
        assert_eq!(html.matches("<button").count(), 3);
    }

    #[test]
    fn test_pending_is_not_decorated() {
        let mut manager = manager(FakeHost::default());
        assert!(!manager.decorate("m1"));
        assert!(!manager.decorate("missing"));
    }

    #[tokio::test]
    async fn test_theme_toggle_recolors_without_rendering() {
        let mut manager = manager(FakeHost::default());
        manager.dispatch(visible("m1")).await;
        assert_eq!(manager.scheme(), Scheme::Light);
        let calls = manager.host().render_calls.get();

        manager.dispatch(dark_mode("dark")).await;

        assert_eq!(manager.scheme(), Scheme::Dark);
        assert_eq!(manager.host().render_calls.get(), calls);
        let svg = manager.placeholder("m1").unwrap().content().svg().unwrap();
        assert!(svg.contains(r##"<text style="fill: #f9fafb; font-weight: 500">Alice</text>"##));
        assert!(svg.contains("fill: #e5e7eb; font-weight: 500; font-size: 12px"));
        assert!(!svg.contains("#1f2937"));

        manager.dispatch(dark_mode("light")).await;
        assert_eq!(manager.scheme(), Scheme::Light);
        assert_eq!(manager.host().render_calls.get(), calls);
    }

    #[tokio::test]
    async fn test_system_preference_wins() {
        let mut manager = manager(FakeHost {
            dark: true,
            ..FakeHost::default()
        });
        assert_eq!(manager.scheme(), Scheme::Dark);

        manager.dispatch(dark_mode("light")).await;
        assert_eq!(manager.scheme(), Scheme::Dark);

        manager
            .dispatch(PageEvent::SystemSchemeChanged {
                prefers_dark: false,
            })
            .await;
        assert_eq!(manager.scheme(), Scheme::Light);
    }

    #[tokio::test]
    async fn test_unrelated_attribute_is_ignored() {
        let mut manager = manager(FakeHost::default());
        manager
            .dispatch(PageEvent::AttributeChanged {
                attribute: "class".to_owned(),
                value: Some("dark".to_owned()),
            })
            .await;

        assert_eq!(manager.scheme(), Scheme::Light);
    }

    #[tokio::test]
    async fn test_overlay_dismissal() {
        let mut manager = manager(FakeHost::default());
        manager.dispatch(visible("m1")).await;

        manager.dispatch(clicked("m1", Control::Fullscreen)).await;
        assert_eq!(manager.overlay().unwrap().element_id, "m1");

        manager.dispatch(PageEvent::OverlayClicked(OverlayTarget::Content)).await;
        assert!(manager.overlay().is_some());

        manager.dispatch(PageEvent::KeyPressed(Key::Other("a".to_owned()))).await;
        assert!(manager.overlay().is_some());

        manager.dispatch(PageEvent::KeyPressed(Key::Escape)).await;
        assert!(manager.overlay().is_none());

        manager.dispatch(clicked("m1", Control::Fullscreen)).await;
        manager.dispatch(PageEvent::OverlayClicked(OverlayTarget::Background)).await;
        assert!(manager.overlay().is_none());
    }

    #[tokio::test]
    async fn test_overlay_follows_theme() {
        let mut manager = manager(FakeHost::default());
        manager.dispatch(visible("m1")).await;
        manager.dispatch(clicked("m1", Control::Fullscreen)).await;

        manager.dispatch(dark_mode("dark")).await;
        assert!(manager.overlay().unwrap().markup.contains("fill: #f9fafb"));
    }

    #[tokio::test]
    async fn test_copy_prefers_svg() {
        let mut manager = manager(FakeHost::default());
        manager.dispatch(visible("m1")).await;
        manager.dispatch(clicked("m1", Control::Copy)).await;

        let clipboard = manager.host().clipboard.borrow().clone();
        assert!(clipboard[0].starts_with("<svg"));
        assert!(clipboard[0].ends_with("</svg>"));
        assert_eq!(manager.notifications().last(), Some("Diagram copied to clipboard!"));
    }

    #[tokio::test]
    async fn test_copy_falls_back_to_source() {
        let mut manager = manager(FakeHost::default());
        manager
            .dispatch(PageEvent::ImageLoaded {
                element_id: "k1".to_owned(),
                svg: None,
            })
            .await;
        manager.dispatch(clicked("k1", Control::Copy)).await;

        assert_eq!(
            manager.host().clipboard.borrow().as_slice(),
            ["@startuml\nAlice -> Bob: hi\n@enduml"]
        );
        assert_eq!(
            manager.notifications().last(),
            Some("Diagram source copied to clipboard!")
        );
    }

    #[tokio::test]
    async fn test_copy_failure_notifies() {
        let mut manager = manager(FakeHost {
            clipboard_denied: true,
            ..FakeHost::default()
        });
        manager.dispatch(visible("m1")).await;
        manager.dispatch(clicked("m1", Control::Copy)).await;

        assert_eq!(manager.notifications().last(), Some("Failed to copy diagram"));
    }

    #[tokio::test]
    async fn test_download_svg() {
        let mut manager = manager(FakeHost::default());
        manager.dispatch(visible("m1")).await;
        manager.dispatch(clicked("m1", Control::Download)).await;

        let saved = manager.host().saved.borrow();
        let (name, mime, contents) = &saved[0];
        assert!(name.starts_with("diagram-") && name.ends_with(".svg"));
        assert_eq!(mime, "image/svg+xml");
        assert!(contents.starts_with(b"<svg"));
        assert_eq!(manager.notifications().last(), Some("Diagram downloaded!"));
    }

    #[tokio::test]
    async fn test_download_without_svg_notifies() {
        let mut manager = manager(FakeHost::default());
        manager
            .dispatch(PageEvent::ImageLoaded {
                element_id: "k1".to_owned(),
                svg: None,
            })
            .await;
        manager.dispatch(clicked("k1", Control::Download)).await;

        assert!(manager.host().saved.borrow().is_empty());
        assert_eq!(manager.notifications().last(), Some("No SVG found to download"));
    }

    #[tokio::test]
    async fn test_teardown_clears_page_state() {
        let mut manager = manager(FakeHost::default());
        manager.dispatch(visible("m1")).await;
        manager.dispatch(clicked("m1", Control::Fullscreen)).await;
        manager.dispatch(clicked("m1", Control::Copy)).await;

        manager.teardown();

        assert!(manager.placeholders().is_empty());
        assert!(manager.overlay().is_none());
        assert!(manager.notifications().is_empty());
        assert_eq!(manager.context().rendered(), 0);
    }
}
