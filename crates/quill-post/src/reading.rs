//! Reading time and scroll-position helpers for post pages.

/// Reading speed used for time estimates.
pub const WORDS_PER_MINUTE: usize = 200;

/// Scroll offset below which a heading counts as the one being read.
pub const ACTIVE_HEADING_OFFSET: f64 = 120.0;

/// Scroll position past which the back-to-top button shows.
pub const BACK_TO_TOP_THRESHOLD: f64 = 300.0;

/// Estimated reading time in whole minutes, at least one.
#[must_use]
pub fn reading_minutes(text: &str) -> usize {
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1)
}

/// Percentage of the page scrolled, `0.0..=100.0`.
///
/// A page whose content fits the viewport reports zero.
#[must_use]
pub fn reading_progress(scroll_top: f64, scroll_height: f64, client_height: f64) -> f64 {
    let scrollable = scroll_height - client_height;
    if scrollable <= 0.0 {
        return 0.0;
    }
    (scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
}

/// Index of the last heading at or above the reading position.
///
/// `heading_offsets` are the headings' distances from the top of the page,
/// in document order.
#[must_use]
pub fn active_heading(heading_offsets: &[f64], scroll_y: f64) -> Option<usize> {
    let position = scroll_y + ACTIVE_HEADING_OFFSET;
    heading_offsets
        .iter()
        .rposition(|&offset| offset <= position)
}

#[must_use]
pub fn show_back_to_top(scroll_y: f64) -> bool {
    scroll_y > BACK_TO_TOP_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_minutes() {
        assert_eq!(reading_minutes(""), 1);
        assert_eq!(reading_minutes(&"word ".repeat(200)), 1);
        assert_eq!(reading_minutes(&"word ".repeat(201)), 2);
        assert_eq!(reading_minutes(&"word\n\t".repeat(1000)), 5);
    }

    #[test]
    fn test_reading_progress() {
        assert!((reading_progress(0.0, 2000.0, 1000.0)).abs() < f64::EPSILON);
        assert!((reading_progress(500.0, 2000.0, 1000.0) - 50.0).abs() < f64::EPSILON);
        assert!((reading_progress(1500.0, 2000.0, 1000.0) - 100.0).abs() < f64::EPSILON);
        assert!((reading_progress(10.0, 800.0, 1000.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_active_heading() {
        let offsets = [100.0, 600.0, 1400.0];

        assert_eq!(active_heading(&offsets, 0.0), Some(0));
        assert_eq!(active_heading(&offsets, 480.0), Some(1));
        assert_eq!(active_heading(&offsets, 5000.0), Some(2));
        assert_eq!(active_heading(&[200.0], 0.0), None);
        assert_eq!(active_heading(&[], 100.0), None);
    }

    #[test]
    fn test_back_to_top() {
        assert!(!show_back_to_top(300.0));
        assert!(show_back_to_top(300.5));
    }
}
