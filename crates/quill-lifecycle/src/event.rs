//! Page events delivered to the lifecycle manager.

use crate::visibility::IntersectionEntry;

/// Attribute on the document root carrying an explicit theme override.
pub const THEME_ATTRIBUTE: &str = "data-mode";

/// Interactive control attached to a decorated diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Fullscreen,
    Copy,
    Download,
}

impl Control {
    /// Controls in the order they are attached.
    pub const ALL: [Self; 3] = [Self::Fullscreen, Self::Copy, Self::Download];

    /// Button tooltip.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Fullscreen => "View Fullscreen",
            Self::Copy => "Copy Diagram",
            Self::Download => "Download as SVG",
        }
    }

    /// Button CSS class.
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::Fullscreen => "diagram-btn fullscreen-btn",
            Self::Copy => "diagram-btn copy-btn",
            Self::Download => "diagram-btn download-btn",
        }
    }
}

/// Key presses the manager reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

/// Part of the fullscreen overlay that received a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTarget {
    /// The dimmed backdrop around the content.
    Background,
    /// The cloned diagram itself.
    Content,
    CloseButton,
}

/// Everything the page can tell the manager.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Intersection watcher fired for a placeholder.
    Intersected(IntersectionEntry),
    /// A remote placeholder's image finished loading. `svg` carries the
    /// image's markup when the host fetched it inline.
    ImageLoaded {
        element_id: String,
        svg: Option<String>,
    },
    /// A remote placeholder's image failed (network error or non-2xx).
    ImageFailed { element_id: String, reason: String },
    /// The system color scheme changed.
    SystemSchemeChanged { prefers_dark: bool },
    /// An attribute on the document root changed.
    AttributeChanged {
        attribute: String,
        value: Option<String>,
    },
    ControlClicked { element_id: String, control: Control },
    KeyPressed(Key),
    OverlayClicked(OverlayTarget),
}
