//! Per-page state shared by every placeholder on one page.
//!
//! A context is created when a page loads and dropped (after
//! [`PageContext::teardown`]) when the reader navigates away; nothing
//! outlives it.

use quill_config::Config;
use quill_diagrams::ServiceUrl;
use uuid::Uuid;

use crate::recolor::Palette;
use crate::visibility::ObserverOptions;

/// Length of the random suffix in render ids.
const RENDER_ID_SUFFIX_LEN: usize = 9;

/// Styles for error blocks, controls, the overlay and notices.
pub const STYLESHEET: &str = r"
@keyframes slideIn { from { transform: translateX(100%); opacity: 0; } to { transform: translateX(0); opacity: 1; } }
@keyframes slideOut { from { transform: translateX(0); opacity: 1; } to { transform: translateX(100%); opacity: 0; } }
.diagram-wrapper { position: relative; }
.diagram-controls { position: absolute; top: 0.5rem; right: 0.5rem; display: flex; gap: 0.25rem; }
.diagram-overlay { position: fixed; inset: 0; background: rgba(0, 0, 0, 0.85); z-index: 9999; display: flex; align-items: center; justify-content: center; }
.diagram-overlay .diagram-content { max-width: 90vw; max-height: 90vh; overflow: auto; }
.diagram-notification { position: fixed; top: 20px; right: 20px; padding: 12px 24px; border-radius: 8px; color: white; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); z-index: 10000; font-size: 14px; font-weight: 500; animation: slideIn 0.3s ease-out; }
.diagram-error { background: #fee2e2; border: 1px solid #fecaca; color: #991b1b; padding: 1rem; border-radius: 8px; margin: 1rem 0; }
.diagram-error h4 { margin: 0 0 0.5rem 0; font-size: 1.1rem; }
.diagram-error p { margin: 0.5rem 0; }
.diagram-error pre { background: #f9fafb; padding: 0.5rem; border-radius: 4px; overflow-x: auto; font-size: 0.9rem; }
";

/// Settings the lifecycle manager needs from the site configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    /// Diagram service used to build image URLs for remote placeholders
    /// that only carry source text.
    pub service: ServiceUrl,
    pub observer: ObserverOptions,
    pub light: Palette,
    pub dark: Palette,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for LifecycleConfig {
    fn from(config: &Config) -> Self {
        Self {
            service: ServiceUrl::new(config.diagrams.kroki_url.as_str()),
            observer: ObserverOptions::from(&config.lazy),
            light: Palette::from(&config.theme.light),
            dark: Palette::from(&config.theme.dark),
        }
    }
}

/// Page-wide counters, id generation and one-time style injection.
#[derive(Debug)]
pub struct PageContext {
    observer: ObserverOptions,
    rendered: usize,
    failed: usize,
    style_injected: bool,
}

impl PageContext {
    #[must_use]
    pub fn new(config: &LifecycleConfig) -> Self {
        Self {
            observer: config.observer,
            rendered: 0,
            failed: 0,
            style_injected: false,
        }
    }

    #[must_use]
    pub fn observer(&self) -> &ObserverOptions {
        &self.observer
    }

    /// Fresh identifier for one local render call, e.g. `mermaid-3f2a9c0d1`.
    #[must_use]
    pub fn next_render_id(&self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("mermaid-{}", &suffix[..RENDER_ID_SUFFIX_LEN])
    }

    pub(crate) fn record_rendered(&mut self) {
        self.rendered += 1;
    }

    pub(crate) fn record_failed(&mut self) {
        self.failed += 1;
    }

    /// Diagrams rendered on this page so far.
    #[must_use]
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// The stylesheet, the first time it is asked for on this page.
    pub fn take_stylesheet(&mut self) -> Option<&'static str> {
        if self.style_injected {
            return None;
        }
        self.style_injected = true;
        Some(STYLESHEET)
    }

    /// Reset for navigation away from the page.
    pub fn teardown(&mut self) {
        tracing::debug!(
            rendered = self.rendered,
            failed = self.failed,
            "Tearing down page context"
        );
        self.rendered = 0;
        self.failed = 0;
        self.style_injected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_ids_are_unique() {
        let context = PageContext::new(&LifecycleConfig::default());
        let a = context.next_render_id();
        let b = context.next_render_id();

        assert!(a.starts_with("mermaid-"));
        assert_eq!(a.len(), "mermaid-".len() + 9);
        assert_ne!(a, b);
    }

    #[test]
    fn test_stylesheet_injected_once() {
        let mut context = PageContext::new(&LifecycleConfig::default());

        assert!(context.take_stylesheet().is_some_and(|css| css.contains(".diagram-error")));
        assert_eq!(context.take_stylesheet(), None);

        context.teardown();
        assert!(context.take_stylesheet().is_some());
    }

    #[test]
    fn test_config_from_site_config() {
        let mut config = Config::default();
        config.diagrams.kroki_url = "https://kroki.internal".to_owned();
        config.lazy.root_margin_px = 200;

        let lifecycle = LifecycleConfig::from(&config);
        assert_eq!(lifecycle.service.base(), "https://kroki.internal");
        assert_eq!(lifecycle.observer.root_margin(), "200px 0px");
        assert_eq!(lifecycle.dark.text, "#f9fafb");
    }
}
