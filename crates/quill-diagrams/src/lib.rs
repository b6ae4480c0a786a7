//! Build-time diagram support for quill.
//!
//! This crate turns diagram template tags in post content into placeholder
//! markup for the page:
//! - Remote dialects (`PlantUML`, `GraphViz`, Svgbob, ...) become `<img>` tags
//!   pointing at a Kroki-compatible service, the source embedded in the URL
//!   as a compressed, URL-safe token
//! - Local dialects (Mermaid) keep their escaped source for in-page rendering
//!
//! # Architecture
//!
//! - [`language`]: Dialects and their render strategy (`Dialect`, `RenderStrategy`)
//! - [`encode`]: Source to token encoding and its inverse
//! - [`block`]: `DiagramBlock` and its content identity
//! - [`html`]: Placeholder markup and service URLs
//! - [`processor`]: `TagProcessor` for `{% plantuml %}`-style block tags
//! - [`probe`]: Parallel reachability checks of service URLs
//!
//! # Example
//!
//! ```
//! use quill_diagrams::{Dialect, decode, encode};
//!
//! let token = encode("Alice -> Bob", Dialect::PlantUml);
//! assert_eq!(decode(token.as_str()).unwrap(), "@startuml\nAlice -> Bob\n@enduml");
//! ```

mod block;
mod consts;
mod encode;
mod html;
mod language;
mod probe;
mod processor;

pub use block::{DiagramBlock, DiagramKey};
pub use consts::{DEFAULT_KROKI_URL, DEFAULT_TIMEOUT};
pub use encode::{DecodeError, Token, decode, encode, wrap_markers};
pub use html::{LOCAL_CLASS, REMOTE_CLASS, ServiceUrl, escape_html, placeholder_html};
pub use language::{Dialect, RenderStrategy};
pub use probe::{
    ProbeError, ProbeErrorKind, ProbeRequest, ProbeSuccess, create_agent, probe_all,
};
pub use processor::{Extraction, TagProcessor};
