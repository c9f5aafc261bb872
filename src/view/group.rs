use std::collections::HashMap;

use crate::domain::{Column, FieldKind, FieldLookups, FieldOption};

use super::projection::{ProjectedCard, ProjectedColumn};
use super::state::GroupBy;

pub const UNASSIGNED_COLUMN_ID: &str = "unassigned";
const UNASSIGNED_TITLE: &str = "Unassigned";
const UNASSIGNED_COLOR: &str = "#B3B3B3";

/// Re-buckets already filtered and sorted cards into display columns. Card
/// order inside each bucket follows the input order.
pub(crate) fn group_cards(
    cards: Vec<ProjectedCard>,
    group_by: GroupBy,
    columns: &[Column],
    lookups: &FieldLookups,
    hidden_stage: Option<&str>,
) -> Vec<ProjectedColumn> {
    match group_by {
        GroupBy::Stage => by_stage(cards, columns, hidden_stage),
        GroupBy::Role => by_field(cards, lookups.options(FieldKind::Role), |c| {
            c.card.role_id.as_deref()
        }),
        GroupBy::Importance => by_field(cards, lookups.options(FieldKind::Importance), |c| {
            c.card.importance_id.as_deref()
        }),
    }
}

fn by_stage(
    cards: Vec<ProjectedCard>,
    columns: &[Column],
    hidden_stage: Option<&str>,
) -> Vec<ProjectedColumn> {
    let mut buckets: Vec<ProjectedColumn> = columns
        .iter()
        .filter(|c| Some(c.stage_id.as_str()) != hidden_stage)
        .map(|c| ProjectedColumn {
            id: c.stage_id.clone(),
            title: c.title.clone(),
            color: c.color.clone(),
            cards: Vec::new(),
        })
        .collect();

    let index = bucket_index(&buckets);
    for card in cards {
        if let Some(&idx) = index.get(card.card.stage_id.as_str()) {
            buckets[idx].cards.push(card);
        }
    }

    buckets
}

fn by_field<F>(cards: Vec<ProjectedCard>, options: &[FieldOption], field: F) -> Vec<ProjectedColumn>
where
    F: Fn(&ProjectedCard) -> Option<&str>,
{
    let mut ordered: Vec<&FieldOption> = options.iter().collect();
    ordered.sort_by_key(|o| o.display_order);

    let mut buckets: Vec<ProjectedColumn> = ordered
        .into_iter()
        .map(|o| ProjectedColumn {
            id: o.id.clone(),
            title: o.label.clone(),
            color: o.color.clone(),
            cards: Vec::new(),
        })
        .collect();
    buckets.push(ProjectedColumn {
        id: UNASSIGNED_COLUMN_ID.to_string(),
        title: UNASSIGNED_TITLE.to_string(),
        color: Some(UNASSIGNED_COLOR.to_string()),
        cards: Vec::new(),
    });

    let unassigned = buckets.len() - 1;
    let index = bucket_index(&buckets[..unassigned]);

    for card in cards {
        let idx = field(&card)
            .and_then(|id| index.get(id).copied())
            .unwrap_or(unassigned);
        buckets[idx].cards.push(card);
    }

    buckets
}

fn bucket_index(buckets: &[ProjectedColumn]) -> HashMap<String, usize> {
    buckets
        .iter()
        .enumerate()
        .map(|(idx, b)| (b.id.clone(), idx))
        .collect()
}
