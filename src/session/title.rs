// src/session/title.rs

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Title for a topic created from its first message: the whole message when
/// it fits in `max_chars`, otherwise the first `max_chars` characters of the
/// whitespace-flattened text followed by `...`.
pub fn topic_title(message: &str, max_chars: usize) -> String {
    let message = message.trim();
    if message.chars().count() <= max_chars {
        return message.to_string();
    }

    let flat = WHITESPACE.replace_all(message, " ");

    let head: String = flat.chars().take(max_chars).collect();
    format!("{}...", head.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_message_is_ellipsized() {
        let msg = "Will the quarterly report be ready by Friday?";
        assert_eq!(msg.chars().count(), 45);
        assert_eq!(topic_title(msg, 25), "Will the quarterly report...");
    }

    #[test]
    fn test_short_message_unchanged() {
        assert_eq!(topic_title("Hello there", 25), "Hello there");
        let exact = "abcdefghijklmnopqrstuvwxy";
        assert_eq!(exact.len(), 25);
        assert_eq!(topic_title(exact, 25), exact);
    }

    #[test]
    fn test_short_message_keeps_its_whitespace() {
        assert_eq!(topic_title("  line one\n\nline two ", 25), "line one\n\nline two");
        assert_eq!(topic_title("a  b", 25), "a  b");
    }

    #[test]
    fn test_long_message_is_flattened_before_cut() {
        let msg = "first line\n\nsecond   line goes on and on";
        assert_eq!(topic_title(msg, 25), "first line second line go...");
    }

    #[test]
    fn test_multibyte_is_cut_on_char_boundary() {
        let msg = "é".repeat(30);
        assert_eq!(topic_title(&msg, 25), format!("{}...", "é".repeat(25)));
    }
}
