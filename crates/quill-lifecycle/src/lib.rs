//! In-page lifecycle of quill diagrams.
//!
//! [`DiagramManager`] discovers the placeholders the build phase emitted,
//! defers rendering until a placeholder nears the viewport, renders local
//! dialects through the [`Host`], falls back to automatic detection once,
//! decorates rendered diagrams with fullscreen, copy and download controls,
//! and keeps diagram text legible when the color scheme changes.
//!
//! All browser capabilities sit behind [`Host`]; everything else is plain
//! state driven by [`PageEvent`]s.
//!
//! # Architecture
//!
//! - [`state`]: Per-placeholder `RenderState` machine
//! - [`discover`]: Tolerant placeholder scan of page markup
//! - [`visibility`]: Intersection ratio and threshold gating
//! - [`placeholder`]: Placeholders, error blocks and control wrappers
//! - [`recolor`]: Scheme-dependent `<text>` style pass
//! - [`enhance`]: Copy-code buttons, heading links and the image lightbox
//! - [`context`]: `PageContext` created on load, torn down on navigation
//! - [`manager`]: Event dispatch tying it all together
//!
//! # Example
//!
//! ```
//! use quill_lifecycle::{LifecycleConfig, RenderState, discover};
//! use quill_diagrams::ServiceUrl;
//!
//! let html = r#"<div id="m1" class="mermaid">graph TD; A--&gt;B</div>"#;
//! let found = discover(html, &ServiceUrl::default());
//! assert_eq!(found[0].state(), RenderState::Pending);
//! ```

mod context;
mod discover;
mod enhance;
mod event;
mod host;
mod manager;
mod notify;
mod placeholder;
mod recolor;
mod settings;
mod state;
mod visibility;

pub use context::{LifecycleConfig, PageContext, STYLESHEET};
pub use discover::discover;
pub use enhance::{
    COPY_CODE_CLASS, COPY_FEEDBACK, CodeBlock, CopyButton, ENHANCEMENT_STYLESHEET, LINK_COPIED,
    Lightbox, LightboxTarget, PostEnhancer, PostEvent, PostImage, anchor_url, decorate_post,
};
pub use event::{Control, Key, OverlayTarget, PageEvent, THEME_ATTRIBUTE};
pub use host::{Host, HostError, RenderError};
pub use manager::{DiagramManager, Overlay, Scheme};
pub use notify::{NOTIFICATION_TTL, Notification, Notifications};
pub use placeholder::{Backend, Content, ErrorBlock, Placeholder, Wrapper};
pub use recolor::{Palette, recolor_svg};
pub use settings::{FlowchartSettings, MermaidSettings, ThemeVariables};
pub use state::{RenderState, TransitionError};
pub use visibility::{IntersectionEntry, ObserverOptions, Rect};
