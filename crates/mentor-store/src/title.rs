//! Session title derivation.

/// Maximum number of characters kept from the first user message.
pub const TITLE_MAX_CHARS: usize = 30;

/// Appended when the first user message was longer than the limit.
pub const TRUNCATION_MARKER: &str = "...";

/// Title for a session whose first user message is `text`.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn derive_title(text: &str) -> String {
    match text.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
