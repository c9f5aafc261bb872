use chrono::{Local, NaiveDate};

use crate::board::BoardStore;
use crate::domain::FieldLookups;

use super::projection::{self, Projection, ProjectionContext};
use super::state::{FilterOption, GroupBy, Layout, SortColumn, ViewConfig, ViewState};

/// Owns the view preferences of one board session and derives projections
/// from a [`BoardStore`].
#[derive(Debug, Clone)]
pub struct ViewStateManager {
    state: ViewState,
    config: ViewConfig,
    lookups: FieldLookups,
    current_user: Option<String>,
    reference_date: NaiveDate,
}

impl ViewStateManager {
    pub fn new(config: ViewConfig, lookups: FieldLookups) -> Self {
        Self {
            state: ViewState::default(),
            config,
            lookups,
            current_user: None,
            reference_date: Local::now().date_naive(),
        }
    }

    pub fn with_state(mut self, state: ViewState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn lookups(&self) -> &FieldLookups {
        &self.lookups
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.state.search_query = text.into();
    }

    pub fn set_filter(&mut self, option: FilterOption) {
        self.state.filter_option = option;
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.state.layout = layout;
    }

    pub fn set_show_completed(&mut self, show: bool) {
        self.state.show_completed = show;
    }

    pub fn set_group_by(&mut self, group_by: GroupBy) {
        self.state.group_by = group_by;
    }

    /// Picking the active sort column again flips the direction; any other
    /// column starts ascending.
    pub fn set_sort(&mut self, column: SortColumn) {
        if self.state.sort_column == Some(column) {
            self.state.sort_direction = self.state.sort_direction.toggled();
        } else {
            self.state.sort_column = Some(column);
            self.state.sort_direction = Default::default();
        }
    }

    pub fn clear_sort(&mut self) {
        self.state.sort_column = None;
        self.state.sort_direction = Default::default();
    }

    pub fn set_lookups(&mut self, lookups: FieldLookups) {
        self.lookups = lookups;
    }

    pub fn set_current_user(&mut self, user_id: Option<String>) {
        self.current_user = user_id;
    }

    /// Date the urgency window is measured from.
    pub fn set_reference_date(&mut self, date: NaiveDate) {
        self.reference_date = date;
    }

    pub fn project(&self, store: &BoardStore) -> Projection {
        let ctx = ProjectionContext {
            lookups: &self.lookups,
            config: &self.config,
            current_user: self.current_user.as_deref(),
            reference_date: self.reference_date,
        };
        projection::project(store, &self.state, &ctx)
    }
}
