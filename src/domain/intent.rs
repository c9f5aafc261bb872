use serde::{Deserialize, Serialize};

/// A committed reorder, carrying enough to replay it against durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChangeIntent {
    CardMoved {
        card_id: String,
        new_stage_id: String,
        new_index: usize,
    },
    ColumnMoved { column_id: String, new_index: usize },
}

impl ChangeIntent {
    pub fn subject_id(&self) -> &str {
        match self {
            ChangeIntent::CardMoved { card_id, .. } => card_id,
            ChangeIntent::ColumnMoved { column_id, .. } => column_id,
        }
    }
}
