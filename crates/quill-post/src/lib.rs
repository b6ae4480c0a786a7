//! Post rendering and scaffolding for quill sites.
//!
//! - [`PostRenderer`] turns post markdown into page HTML: emoji removal,
//!   diagram tag expansion, heading anchors, a table of contents and a
//!   reading time estimate
//! - [`Scaffolder`] writes new dated posts from templates
//! - [`reading`] holds the scroll helpers behind the progress bar, the active
//!   TOC entry and the back-to-top button

mod emoji;
pub mod reading;
mod render;
mod scaffold;
mod slug;
mod toc;

pub use emoji::strip_emoji;
pub use reading::reading_minutes;
pub use render::{PostRenderer, RenderedPost};
pub use scaffold::{DEFAULT_TEMPLATE, PostOptions, ScaffoldError, Scaffolder};
pub use slug::{heading_slug, slugify};
pub use toc::{TocEntry, toc_html};
