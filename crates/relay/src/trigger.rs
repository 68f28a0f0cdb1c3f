//! Trigger prefixes that address the assistant in a chat.

use std::sync::LazyLock;

use regex::Regex;

pub const TRIGGERS: &[&str] = &["@ai", "!ai", "/ai", "ai:", "assistant:", "help:", "bot:"];

static TRIGGER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = TRIGGERS.iter().map(|t| regex::escape(t)).collect();
    Regex::new(&format!("(?i){}", alternatives.join("|"))).expect("valid regex")
});

/// True when a trigger opens the message or follows a space.
pub fn is_addressed(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    TRIGGERS
        .iter()
        .any(|t| lowered.starts_with(t) || lowered.contains(&format!(" {t}")))
}

/// Message text with every trigger occurrence removed.
pub fn extract_command(text: &str) -> String {
    TRIGGER_PATTERN.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_triggers_at_start_or_after_space() {
        assert!(is_addressed("@ai plan my day"));
        assert!(is_addressed("  BOT: hello"));
        assert!(is_addressed("hey @AI what's next"));
        assert!(is_addressed("question for assistant: summarize"));
        assert!(!is_addressed("email@ai.com is my address"));
        assert!(!is_addressed("plain message"));
        assert!(!is_addressed(""));
    }

    #[test]
    fn strips_every_trigger() {
        assert_eq!(extract_command("@ai plan my day"), "plan my day");
        assert_eq!(extract_command("Help: !AI review bot: ideas"), "review  ideas");
        assert_eq!(extract_command("/ai"), "");
    }
}
