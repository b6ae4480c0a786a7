//! URL slugs for post file names and heading anchors.

use std::sync::LazyLock;

use regex::Regex;

static NOT_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());

static NOT_ANCHOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_\s-]").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").unwrap());

/// Slug for a post title: `"Hello, World!"` becomes `hello-world`.
///
/// Leading and trailing dashes are stripped.
#[must_use]
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept = NOT_SLUG.replace_all(&lower, "");
    let dashed = WHITESPACE.replace_all(&kept, "-");
    DASHES
        .replace_all(&dashed, "-")
        .trim_matches('-')
        .to_owned()
}

/// Slug for heading text. Keeps underscores and only trims whitespace.
#[must_use]
pub fn heading_slug(text: &str) -> String {
    let lower = text.to_lowercase();
    let kept = NOT_ANCHOR.replace_all(&lower, "");
    let dashed = WHITESPACE.replace_all(&kept, "-");
    DASHES.replace_all(&dashed, "-").trim().to_owned()
}
