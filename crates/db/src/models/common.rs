use serde::{Deserialize, Serialize};
use sqlx::Type;
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Ids arrive as free-form strings; anything that is not a UUID cannot exist.
pub fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

/// Trim, drop blanks and duplicates while keeping first-seen order.
pub fn normalize_labels(labels: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}

/// Reject blank required text fields.
pub fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(())
    }
}

pub fn require_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), String> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} must be between {min} and {max}"))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn priority_wire_format() {
        assert_eq!(Priority::High.to_string(), "high");
        assert_eq!(Priority::from_str("low").unwrap(), Priority::Low);
        assert_eq!(serde_json::to_string(&Priority::default()).unwrap(), "\"medium\"");
    }

    #[test]
    fn parse_id_rejects_timestamps() {
        assert!(parse_id("1706177400000").is_none());
        assert!(parse_id(&Uuid::new_v4().to_string()).is_some());
    }

    #[test]
    fn labels_are_trimmed_and_deduplicated() {
        let labels = vec![" work ".into(), "".into(), "work".into(), "deadline".into()];
        assert_eq!(normalize_labels(labels), vec!["work", "deadline"]);
    }

    #[test]
    fn range_check_is_inclusive() {
        assert!(require_range("impact", 1, 1, 10).is_ok());
        assert!(require_range("impact", 10, 1, 10).is_ok());
        assert_eq!(
            require_range("impact", 11, 1, 10).unwrap_err(),
            "impact must be between 1 and 10"
        );
    }
}
