//! Shared utility functions for common operations.

/// Truncate to at most `max_chars` characters, appending `...` when cut.
///
/// Counts chars rather than bytes so multi-byte text never splits mid-character.
pub fn truncate_chars(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &content[..byte_idx]),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        let text = "物理研究部はレゴ";
        assert_eq!(truncate_chars(text, 5), "物理研究部...");
    }
}
