//! Keyword-based intent detection for assistant messages.
//!
//! The first category in [`KEYWORDS`] with a substring hit wins, so a message
//! mentioning both an idea and a habit is an idea analysis. Callers rely on
//! this ordering; reordering the table changes which prompt is used.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Intent {
    IdeaAnalysis,
    KnowledgeSummary,
    SmartGoals,
    Flashcard,
    TaskPrioritization,
    ContentRecommendations,
    HabitSuggestions,
    ReviewInsights,
    General,
}

pub const KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::IdeaAnalysis, &["idea", "analyze", "evaluate"]),
    (Intent::KnowledgeSummary, &["summarize", "knowledge", "notes", "synthesis"]),
    (Intent::SmartGoals, &["goal", "smart", "objective"]),
    (Intent::Flashcard, &["flashcard", "learn", "memorize"]),
    (Intent::TaskPrioritization, &["task", "prioritize", "productivity"]),
    (Intent::ContentRecommendations, &["recommend", "content", "resource", "learning"]),
    (Intent::HabitSuggestions, &["habit", "routine", "behavior"]),
    (Intent::ReviewInsights, &["review", "insight", "reflection"]),
];

pub fn classify(message: &str) -> Intent {
    let lower = message.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_keyword() {
        assert_eq!(classify("Can you analyze this idea?"), Intent::IdeaAnalysis);
        assert_eq!(classify("Summarize my reading"), Intent::KnowledgeSummary);
        assert_eq!(classify("Help me set a GOAL"), Intent::SmartGoals);
        assert_eq!(classify("make flashcards"), Intent::Flashcard);
        assert_eq!(classify("What should I do first today? prioritize"), Intent::TaskPrioritization);
        assert_eq!(classify("any resource on rust?"), Intent::ContentRecommendations);
        assert_eq!(classify("morning routine"), Intent::HabitSuggestions);
        assert_eq!(classify("weekly reflection"), Intent::ReviewInsights);
        assert_eq!(classify("hello there"), Intent::General);
    }

    #[test]
    fn earlier_categories_take_precedence() {
        assert_eq!(classify("an idea for a new habit"), Intent::IdeaAnalysis);
        // "learning" contains "learn", which belongs to the earlier flashcard category
        assert_eq!(classify("learning plan"), Intent::Flashcard);
        // "tasks" mentions a task but "notes" comes first
        assert_eq!(classify("turn my notes into tasks"), Intent::KnowledgeSummary);
    }

    #[test]
    fn wire_names_are_kebab_case() {
        assert_eq!(Intent::TaskPrioritization.to_string(), "task-prioritization");
        assert_eq!(
            serde_json::to_string(&Intent::ContentRecommendations).unwrap(),
            "\"content-recommendations\""
        );
    }
}
