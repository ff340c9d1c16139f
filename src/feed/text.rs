//! Text cleanup for advisory descriptions and ticket summaries.

use std::sync::LazyLock;

use regex::Regex;

/// Longest summary kept before truncation kicks in.
pub const SUMMARY_MAX_CHARS: usize = 500;

/// A sentence end before this many chars is too early to cut at.
const SENTENCE_CUT_MIN_CHARS: usize = 400;

/// Longest ticket title the tracker accepts.
pub const TITLE_MAX_CHARS: usize = 255;

#[allow(clippy::expect_used)]
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));

/// Remove anything that looks like an HTML tag.
#[must_use]
pub fn strip_html_tags(text: &str) -> String {
    HTML_TAG.replace_all(text, "").into_owned()
}

/// Trim `text` and cap it at [`SUMMARY_MAX_CHARS`].
///
/// Long text is cut after the last `.`, `!`, or `?` when that lies past
/// char 400; otherwise it is cut hard and suffixed with `...`.
#[must_use]
pub fn summarize(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= SUMMARY_MAX_CHARS {
        return text.to_owned();
    }

    let truncated: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    match truncated.rfind(['.', '!', '?']) {
        Some(end) if truncated[..end].chars().count() > SENTENCE_CUT_MIN_CHARS => {
            truncated[..=end].to_owned()
        }
        _ => format!("{truncated}..."),
    }
}

/// Trim a title and cap it at [`TITLE_MAX_CHARS`], ellipsis included.
#[must_use]
pub fn ticket_title(title: &str) -> String {
    let title = title.trim();
    if title.chars().count() <= TITLE_MAX_CHARS {
        return title.to_owned();
    }
    let head: String = title.chars().take(TITLE_MAX_CHARS - 3).collect();
    format!("{head}...")
}
