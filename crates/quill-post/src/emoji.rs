//! Emoji removal for HTML output.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Misc symbols, dingbats and the pictograph blocks.
static EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{1F300}-\x{1FAFF}\x{2600}-\x{27BF}]").unwrap());

/// Remove emoji code points from `content`.
///
/// Borrows the input when there is nothing to remove.
#[must_use]
pub fn strip_emoji(content: &str) -> Cow<'_, str> {
    EMOJI.replace_all(content, "")
}
