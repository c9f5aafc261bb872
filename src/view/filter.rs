use chrono::{Days, NaiveDate};

use super::projection::ProjectedCard;
use super::state::{FilterOption, ViewConfig, ViewState};

pub(crate) struct FilterContext<'a> {
    pub terminal_stage: Option<&'a str>,
    pub config: &'a ViewConfig,
    pub current_user: Option<&'a str>,
    pub reference_date: NaiveDate,
}

/// Completed cards are hidden unless the user opted in, or when the
/// `hide_completed` filter is picked.
pub(crate) fn hides_completed(state: &ViewState) -> bool {
    !state.show_completed || state.filter_option == FilterOption::HideCompleted
}

pub(crate) fn apply(
    cards: Vec<ProjectedCard>,
    state: &ViewState,
    ctx: &FilterContext<'_>,
) -> Vec<ProjectedCard> {
    let needle = state.search_query.trim().to_lowercase();
    let hide_completed = hides_completed(state);

    cards
        .into_iter()
        .filter(|c| c.card.matches_query(&needle))
        .filter(|c| !(hide_completed && Some(c.card.stage_id.as_str()) == ctx.terminal_stage))
        .filter(|c| matches_option(c, state.filter_option, ctx))
        .collect()
}

fn matches_option(card: &ProjectedCard, option: FilterOption, ctx: &FilterContext<'_>) -> bool {
    match option {
        FilterOption::All | FilterOption::HideCompleted => true,
        FilterOption::AssignedToMe => ctx
            .current_user
            .is_some_and(|user| card.card.is_assigned_to(user)),
        FilterOption::HighImportance => card
            .importance_level
            .is_some_and(|level| level >= ctx.config.high_importance_level),
        FilterOption::Urgent => {
            let urgent_level = card
                .importance_level
                .is_some_and(|level| level >= ctx.config.urgent_importance_level);
            urgent_level || is_due_soon(card, ctx)
        }
    }
}

fn is_due_soon(card: &ProjectedCard, ctx: &FilterContext<'_>) -> bool {
    let Some(due) = card.card.due_date else {
        return false;
    };
    let window = u64::try_from(ctx.config.urgent_due_window_days).unwrap_or(0);
    match ctx.reference_date.checked_add_days(Days::new(window)) {
        Some(limit) => due <= limit,
        None => true,
    }
}
