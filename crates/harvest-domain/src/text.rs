//! Character-safe text helpers
//!
//! Documents are measured in chars, never bytes, so slicing must land on
//! char boundaries.

/// Maximum length of raw text carried inside error messages
pub const EXCERPT_CHARS: usize = 500;

/// Number of chars in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The first `max_chars` chars of `text`
///
/// # Examples
///
/// ```
/// use harvest_domain::text::truncate_chars;
///
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// assert_eq!(truncate_chars("hi", 10), "hi");
/// ```
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// A bounded excerpt for diagnostics, marked with `...` when cut
pub fn excerpt(text: &str) -> String {
    let head = truncate_chars(text, EXCERPT_CHARS);
    if head.len() < text.len() {
        format!("{}...", head)
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "ααααα";
        assert_eq!(truncate_chars(text, 3), "ααα");
        assert_eq!(truncate_chars(text, 0), "");
    }

    #[test]
    fn test_excerpt_bounded() {
        let long = "x".repeat(2000);
        let cut = excerpt(&long);
        assert_eq!(char_len(&cut), EXCERPT_CHARS + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_excerpt_short_text_untouched() {
        assert_eq!(excerpt("short"), "short");
    }
}
