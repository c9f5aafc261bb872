use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A unit of work on the board. Its position inside the owning column is the
/// index in `Column::cards`; there is no separate numeric field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    pub stage_id: String,
    #[serde(default)]
    pub role_id: Option<String>,
    #[serde(default)]
    pub importance_id: Option<String>,
    #[serde(default)]
    pub assignee_ids: Vec<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Card {
    pub fn new(id: impl Into<String>, title: impl Into<String>, stage_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: None,
            stage_id: stage_id.into(),
            role_id: None,
            importance_id: None,
            assignee_ids: Vec::new(),
            due_date: None,
        }
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assignee_ids.iter().any(|id| id == user_id)
    }

    /// Case-insensitive substring match against title and content.
    /// `needle` must already be lowercased.
    pub fn matches_query(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(needle)
            || self
                .content
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_query_title_and_content() {
        let mut card = Card::new("c1", "Fix Login bug", "todo");
        assert!(card.matches_query("login"));
        assert!(!card.matches_query("docs"));

        card.content = Some("Update the DOCS page".into());
        assert!(card.matches_query("docs"));
        assert!(card.matches_query(""));
    }

    #[test]
    fn test_is_assigned_to() {
        let mut card = Card::new("c1", "Task", "todo");
        card.assignee_ids = vec!["u1".into(), "u2".into()];
        assert!(card.is_assigned_to("u2"));
        assert!(!card.is_assigned_to("u3"));
    }
}
