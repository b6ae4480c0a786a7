//! The seam between the lifecycle manager and the page it runs in.
//!
//! A browser binding implements [`Host`] on top of the local diagram library,
//! the clipboard API and file downloads; tests implement it with fakes.

use std::future::Future;

/// Failure reported by the local rendering library.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The diagram source could not be parsed.
    #[error("{0}")]
    Syntax(String),
    /// The rendering library is missing or crashed.
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a user-initiated host operation (clipboard, file save).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("{0}")]
    Failed(String),
}

/// Page capabilities the lifecycle manager drives.
///
/// Async methods suspend the single UI task without blocking it; no method
/// is ever called concurrently for the same placeholder.
pub trait Host {
    /// Render `source` with the local diagram library under a unique `id`,
    /// returning the produced markup.
    fn render(&self, id: &str, source: &str) -> impl Future<Output = Result<String, RenderError>>;

    /// Fallback render using the library's automatic-detection mode.
    fn render_auto(&self, source: &str) -> impl Future<Output = Result<String, RenderError>>;

    /// Write text to the system clipboard.
    fn write_clipboard(&self, text: &str) -> impl Future<Output = Result<(), HostError>>;

    /// Offer `contents` to the user as a file download.
    fn save_file(&self, name: &str, mime: &str, contents: &[u8]) -> Result<(), HostError>;

    /// Whether the system color scheme currently prefers dark.
    fn prefers_dark(&self) -> bool;
}
