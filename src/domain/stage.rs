use serde::{Deserialize, Serialize};

use super::Card;

/// A stage of the board, rendered as one column. `cards` order is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub stage_id: String,
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
    pub display_order: i64,
    /// Marks the "done" stage. When no column sets it, the last-ordered
    /// column is treated as terminal.
    #[serde(default)]
    pub is_terminal: bool,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(stage_id: impl Into<String>, title: impl Into<String>, display_order: i64) -> Self {
        Self {
            stage_id: stage_id.into(),
            title: title.into(),
            color: None,
            display_order,
            is_terminal: false,
            cards: Vec::new(),
        }
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    pub fn card_ids(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.id.as_str()).collect()
    }
}

/// Resolves which stage counts as completed for the given (display-ordered) columns.
pub fn terminal_stage_id(columns: &[Column]) -> Option<&str> {
    columns
        .iter()
        .find(|c| c.is_terminal)
        .or_else(|| columns.iter().max_by_key(|c| c.display_order))
        .map(|c| c.stage_id.as_str())
}
