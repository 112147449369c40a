//! Shaping a [`FeedItem`] into the text posted on the destination.

use crate::contract::FeedItem;

/// Appended when a message is cut to fit the budget.
pub const ELLIPSIS: &str = " ...";

/// Smallest budget that still fits one character of text plus [`ELLIPSIS`].
/// Budgets below this cannot carry the marker when a message is cut.
pub const MIN_MAX_CHARS: usize = ELLIPSIS.len() + 1;

/// `"{author name}: {text}"`, truncated to `max_chars` characters.
pub fn compose(item: &FeedItem, max_chars: usize) -> String {
    truncate_chars(&format!("{}: {}", item.author_name, item.text), max_chars)
}

/// Cut `text` to at most `max_chars` Unicode scalar values.
///
/// Text within budget is returned unchanged. Longer text keeps its first
/// `max_chars - 4` characters followed by [`ELLIPSIS`], so the result is
/// exactly `max_chars` characters long.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let marker_len = ELLIPSIS.chars().count();
    if max_chars <= marker_len {
        return text.chars().take(max_chars).collect();
    }

    let mut out: String = text.chars().take(max_chars - marker_len).collect();
    out.push_str(ELLIPSIS);
    out
}
