use chrono::NaiveDate;

use super::projection::ProjectedCard;
use super::state::{SortColumn, SortDirection};

/// `None` orders below every real value through `Option`'s own ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(Option<String>),
    Number(Option<i64>),
    Date(Option<NaiveDate>),
}

fn sort_key(card: &ProjectedCard, column: SortColumn) -> SortKey {
    match column {
        SortColumn::Title => SortKey::Text(Some(card.card.title.to_lowercase())),
        SortColumn::Stage => SortKey::Text(Some(card.stage_name.to_lowercase())),
        SortColumn::Role => SortKey::Text(card.role_label.as_ref().map(|l| l.to_lowercase())),
        SortColumn::Importance => SortKey::Number(card.importance_level),
        SortColumn::Assignee => {
            SortKey::Text(card.assignee_names.first().map(|n| n.to_lowercase()))
        }
        SortColumn::DueDate => SortKey::Date(card.card.due_date),
    }
}

/// Stable sort; cards with equal keys keep their relative order in both
/// directions.
pub(crate) fn sort_cards(cards: &mut Vec<ProjectedCard>, column: SortColumn, direction: SortDirection) {
    let mut keyed: Vec<(SortKey, ProjectedCard)> = cards
        .drain(..)
        .map(|card| (sort_key(&card, column), card))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match direction {
        SortDirection::Asc => a.cmp(b),
        SortDirection::Desc => b.cmp(a),
    });

    cards.extend(keyed.into_iter().map(|(_, card)| card));
}
