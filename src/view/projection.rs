use chrono::NaiveDate;
use serde::Serialize;

use crate::board::BoardStore;
use crate::domain::{terminal_stage_id, Card, FieldLookups};

use super::filter::{self, FilterContext};
use super::group;
use super::sort;
use super::state::{GroupBy, Layout, ViewConfig, ViewState};

/// A card with its display metadata attached. The extra fields are copies for
/// rendering and never written back to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedCard {
    #[serde(flatten)]
    pub card: Card,
    pub stage_name: String,
    pub stage_color: Option<String>,
    pub role_label: Option<String>,
    pub importance_label: Option<String>,
    pub importance_level: Option<i64>,
    pub assignee_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedColumn {
    pub id: String,
    pub title: String,
    pub color: Option<String>,
    pub cards: Vec<ProjectedCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub layout: Layout,
    pub group_by: GroupBy,
    pub columns: Vec<ProjectedColumn>,
    /// Flat filtered and sorted list, filled for the table layout only.
    pub rows: Vec<ProjectedCard>,
    pub total_cards: usize,
    pub visible_cards: usize,
}

/// Everything besides the store and the view state that a projection reads.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionContext<'a> {
    pub lookups: &'a FieldLookups,
    pub config: &'a ViewConfig,
    pub current_user: Option<&'a str>,
    pub reference_date: NaiveDate,
}

/// Derives the renderable view: flatten, search, filter, sort, group.
/// Reads `store` only; the result shares nothing with it.
pub fn project(store: &BoardStore, state: &ViewState, ctx: &ProjectionContext<'_>) -> Projection {
    let columns = store.columns();
    let terminal_stage = terminal_stage_id(columns);

    let flattened = flatten(store, ctx.lookups);
    let total_cards = flattened.len();

    let filter_ctx = FilterContext {
        terminal_stage,
        config: ctx.config,
        current_user: ctx.current_user,
        reference_date: ctx.reference_date,
    };
    let mut visible = filter::apply(flattened, state, &filter_ctx);

    if let Some(column) = state.sort_column {
        sort::sort_cards(&mut visible, column, state.sort_direction);
    }

    let visible_cards = visible.len();
    let rows = match state.layout {
        Layout::Table => visible.clone(),
        Layout::Grid => Vec::new(),
    };

    let hidden_stage = if filter::hides_completed(state) {
        terminal_stage
    } else {
        None
    };
    let columns = group::group_cards(visible, state.group_by, columns, ctx.lookups, hidden_stage);

    Projection {
        layout: state.layout,
        group_by: state.group_by,
        columns,
        rows,
        total_cards,
        visible_cards,
    }
}

fn flatten(store: &BoardStore, lookups: &FieldLookups) -> Vec<ProjectedCard> {
    store
        .columns()
        .iter()
        .flat_map(|column| {
            column.cards.iter().map(move |card| {
                let role = lookups.role(card.role_id.as_deref());
                let importance = lookups.importance(card.importance_id.as_deref());
                ProjectedCard {
                    card: card.clone(),
                    stage_name: column.title.clone(),
                    stage_color: column.color.clone(),
                    role_label: role.map(|o| o.label.clone()),
                    importance_label: importance.map(|o| o.label.clone()),
                    importance_level: importance.map(|o| o.level),
                    assignee_names: card
                        .assignee_ids
                        .iter()
                        .map(|id| lookups.user_name(id).to_string())
                        .collect(),
                }
            })
        })
        .collect()
}
