use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One selectable value of a custom field (role or importance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct FieldOption {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    pub display_order: i64,
    /// Numeric weight, only meaningful for importance options.
    #[serde(default)]
    pub level: i64,
}

impl FieldOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>, display_order: i64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            color: None,
            display_order,
            level: 0,
        }
    }

    pub fn with_level(mut self, level: i64) -> Self {
        self.level = level;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Role,
    Importance,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Role => "role",
            FieldKind::Importance => "importance",
        }
    }
}

/// Externally supplied option lists used for display grouping and sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLookups {
    #[serde(default)]
    pub roles: Vec<FieldOption>,
    #[serde(default)]
    pub importances: Vec<FieldOption>,
    /// user id -> display name
    #[serde(default)]
    pub users: BTreeMap<String, String>,
}

impl FieldLookups {
    pub fn options(&self, kind: FieldKind) -> &[FieldOption] {
        match kind {
            FieldKind::Role => &self.roles,
            FieldKind::Importance => &self.importances,
        }
    }

    pub fn role(&self, id: Option<&str>) -> Option<&FieldOption> {
        let id = id?;
        self.roles.iter().find(|o| o.id == id)
    }

    pub fn importance(&self, id: Option<&str>) -> Option<&FieldOption> {
        let id = id?;
        self.importances.iter().find(|o| o.id == id)
    }

    pub fn user_name<'a>(&'a self, user_id: &'a str) -> &'a str {
        self.users.get(user_id).map(String::as_str).unwrap_or(user_id)
    }
}
