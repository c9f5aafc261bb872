use serde::Deserialize;

use crate::domain::KanbanError;
use crate::view::{FilterOption, GroupBy, Layout, SortColumn, SortDirection, ViewState};

/// Query string of the projection endpoint. Every field is optional and
/// falls back to the default view.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub show_completed: Option<bool>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

fn parse_opt<T: std::str::FromStr<Err = String>>(raw: Option<&str>) -> Result<Option<T>, KanbanError> {
    raw.filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(KanbanError::BadRequest))
        .transpose()
}

impl ViewQuery {
    pub fn to_view_state(&self) -> Result<ViewState, KanbanError> {
        let mut state = ViewState::default();

        if let Some(search) = &self.search {
            state.search_query = search.clone();
        }
        if let Some(filter) = parse_opt::<FilterOption>(self.filter.as_deref())? {
            state.filter_option = filter;
        }
        if let Some(group_by) = parse_opt::<GroupBy>(self.group_by.as_deref())? {
            state.group_by = group_by;
        }
        if let Some(layout) = parse_opt::<Layout>(self.layout.as_deref())? {
            state.layout = layout;
        }
        if let Some(show) = self.show_completed {
            state.show_completed = show;
        }
        state.sort_column = parse_opt::<SortColumn>(self.sort.as_deref())?;
        if let Some(direction) = parse_opt::<SortDirection>(self.direction.as_deref())? {
            state.sort_direction = direction;
        }

        Ok(state)
    }
}

#[derive(Debug, Deserialize)]
pub struct MoveCardRequest {
    pub stage_id: String,
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct MoveStageRequest {
    pub index: usize,
}
