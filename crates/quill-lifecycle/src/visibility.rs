//! Viewport gating for deferred rendering.
//!
//! The page reports intersections through [`IntersectionEntry`]; a host
//! without a native observer can compute ratios with
//! [`ObserverOptions::intersection_ratio`].

use quill_config::LazyConfig;

/// Axis-aligned rectangle in CSS pixels (page or viewport coordinates).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Rect {
    #[must_use]
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    fn area(&self) -> f64 {
        (self.bottom - self.top).max(0.0) * (self.right - self.left).max(0.0)
    }

    fn intersect(&self, other: &Self) -> Option<Self> {
        let r = Self {
            top: self.top.max(other.top),
            left: self.left.max(other.left),
            bottom: self.bottom.min(other.bottom),
            right: self.right.min(other.right),
        };
        (r.top <= r.bottom && r.left <= r.right).then_some(r)
    }
}

/// One observation of a placeholder crossing the (margin-expanded) viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    pub element_id: String,
    pub is_intersecting: bool,
    /// Visible fraction of the element, `0.0..=1.0`.
    pub ratio: f64,
}

/// Intersection watcher options: pre-fetch margin plus minimum ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    /// Vertical margin added above and below the viewport.
    pub root_margin_px: f64,
    /// Minimum intersection ratio that counts as visible.
    pub threshold: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin_px: 50.0,
            threshold: 0.1,
        }
    }
}

impl From<&LazyConfig> for ObserverOptions {
    fn from(config: &LazyConfig) -> Self {
        Self {
            root_margin_px: f64::from(config.root_margin_px),
            threshold: config.threshold,
        }
    }
}

impl ObserverOptions {
    /// CSS `rootMargin` value, e.g. `"50px 0px"`.
    #[must_use]
    pub fn root_margin(&self) -> String {
        format!("{}px 0px", self.root_margin_px)
    }

    /// Fraction of `element` inside `viewport` grown vertically by the margin.
    ///
    /// A zero-area element counts as fully visible when it touches the
    /// expanded viewport.
    #[must_use]
    pub fn intersection_ratio(&self, element: Rect, viewport: Rect) -> f64 {
        let expanded = Rect {
            top: viewport.top - self.root_margin_px,
            bottom: viewport.bottom + self.root_margin_px,
            ..viewport
        };
        let Some(overlap) = element.intersect(&expanded) else {
            return 0.0;
        };
        let area = element.area();
        if area == 0.0 {
            return 1.0;
        }
        (overlap.area() / area).clamp(0.0, 1.0)
    }

    /// Build an entry for `element_id` from geometry.
    #[must_use]
    pub fn observe(&self, element_id: &str, element: Rect, viewport: Rect) -> IntersectionEntry {
        let ratio = self.intersection_ratio(element, viewport);
        IntersectionEntry {
            element_id: element_id.to_owned(),
            is_intersecting: ratio > 0.0,
            ratio,
        }
    }

    /// Whether an entry is visible enough to start rendering.
    #[must_use]
    pub fn accepts(&self, entry: &IntersectionEntry) -> bool {
        entry.is_intersecting && entry.ratio >= self.threshold
    }
}
