use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOption {
    #[default]
    All,
    AssignedToMe,
    HighImportance,
    Urgent,
    HideCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    #[default]
    Stage,
    Role,
    Importance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Grid,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Title,
    Stage,
    Role,
    Importance,
    Assignee,
    DueDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Session-local display preferences. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub search_query: String,
    pub filter_option: FilterOption,
    pub group_by: GroupBy,
    pub layout: Layout,
    pub show_completed: bool,
    pub sort_column: Option<SortColumn>,
    pub sort_direction: SortDirection,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            filter_option: FilterOption::All,
            group_by: GroupBy::Stage,
            layout: Layout::Grid,
            show_completed: false,
            sort_column: None,
            sort_direction: SortDirection::Asc,
        }
    }
}

/// Thresholds behind the importance and urgency filters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewConfig {
    pub high_importance_level: i64,
    pub urgent_importance_level: i64,
    pub urgent_due_window_days: i64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            high_importance_level: 3,
            urgent_importance_level: 4,
            urgent_due_window_days: 1,
        }
    }
}

impl FilterOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOption::All => "all",
            FilterOption::AssignedToMe => "assigned_to_me",
            FilterOption::HighImportance => "high_importance",
            FilterOption::Urgent => "urgent",
            FilterOption::HideCompleted => "hide_completed",
        }
    }
}

impl fmt::Display for FilterOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(FilterOption::All),
            "assigned_to_me" => Ok(FilterOption::AssignedToMe),
            "high_importance" => Ok(FilterOption::HighImportance),
            "urgent" => Ok(FilterOption::Urgent),
            "hide_completed" => Ok(FilterOption::HideCompleted),
            _ => Err(format!("Invalid filter: {}", s)),
        }
    }
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Stage => "stage",
            GroupBy::Role => "role",
            GroupBy::Importance => "importance",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stage" => Ok(GroupBy::Stage),
            "role" => Ok(GroupBy::Role),
            "importance" => Ok(GroupBy::Importance),
            _ => Err(format!("Invalid group: {}", s)),
        }
    }
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Grid => "grid",
            Layout::Table => "table",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(Layout::Grid),
            "table" => Ok(Layout::Table),
            _ => Err(format!("Invalid layout: {}", s)),
        }
    }
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Title => "title",
            SortColumn::Stage => "stage",
            SortColumn::Role => "role",
            SortColumn::Importance => "importance",
            SortColumn::Assignee => "assignee",
            SortColumn::DueDate => "due_date",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "title" => Ok(SortColumn::Title),
            "stage" => Ok(SortColumn::Stage),
            "role" => Ok(SortColumn::Role),
            "importance" => Ok(SortColumn::Importance),
            "assignee" => Ok(SortColumn::Assignee),
            "due_date" => Ok(SortColumn::DueDate),
            _ => Err(format!("Invalid sort column: {}", s)),
        }
    }
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid sort direction: {}", s)),
        }
    }
}
