use std::collections::HashSet;

use crate::domain::{Card, Column, KanbanError};

/// Canonical columns and cards. Columns are kept in `display_order`, which is
/// always dense `0..n-1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardStore {
    columns: Vec<Column>,
}

/// Deep copy of a [`BoardStore`], used to roll back optimistic mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    columns: Vec<Column>,
}

impl BoardSnapshot {
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl BoardStore {
    /// Builds a store from an initial load. Columns are ordered by
    /// `display_order` (ties keep input order) and renumbered densely.
    pub fn new(mut columns: Vec<Column>) -> Result<Self, KanbanError> {
        columns.sort_by_key(|c| c.display_order);
        renumber(&mut columns);

        let store = Self { columns };
        store.check_invariants()?;
        Ok(store)
    }

    /// Groups a flat card list into the given stages, the way the board fetch
    /// does: cards without a stage land in the first column, cards naming an
    /// unknown stage are dropped.
    pub fn from_stage_cards(stages: Vec<Column>, cards: Vec<Card>) -> Result<Self, KanbanError> {
        let mut columns = stages;
        columns.sort_by_key(|c| c.display_order);

        for mut card in cards {
            let target = if card.stage_id.is_empty() {
                columns.first_mut()
            } else {
                columns.iter_mut().find(|c| c.stage_id == card.stage_id)
            };

            match target {
                Some(column) => {
                    card.stage_id = column.stage_id.clone();
                    column.cards.push(card);
                }
                None => {
                    tracing::warn!(
                        card_id = card.id.as_str(),
                        stage_id = card.stage_id.as_str(),
                        "Dropping card with unknown stage during load"
                    );
                }
            }
        }

        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.stage_id == column_id)
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.stage_id == column_id)
    }

    /// Returns `(column index, card index)` of a card.
    pub fn locate_card(&self, card_id: &str) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(ci, column)| column.card_index(card_id).map(|idx| (ci, idx)))
    }

    pub fn card(&self, card_id: &str) -> Option<&Card> {
        self.locate_card(card_id)
            .map(|(ci, idx)| &self.columns[ci].cards[idx])
    }

    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }

    /// Card ids in board order: column by column, top to bottom.
    pub fn card_ids(&self) -> Vec<&str> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter().map(|card| card.id.as_str()))
            .collect()
    }

    /// Moves a card inside its column. `target_index` is the card's index
    /// after the move and is clamped to the column. Returns whether anything
    /// changed.
    pub fn move_card_within_column(
        &mut self,
        column_id: &str,
        card_id: &str,
        target_index: usize,
    ) -> Result<bool, KanbanError> {
        let ci = self
            .column_index(column_id)
            .ok_or_else(|| KanbanError::column_not_found(column_id))?;
        let column = &mut self.columns[ci];
        let from = column
            .card_index(card_id)
            .ok_or_else(|| KanbanError::card_not_found(card_id))?;

        let to = target_index.min(column.cards.len() - 1);
        if to == from {
            return Ok(false);
        }

        let card = column.cards.remove(from);
        column.cards.insert(to, card);

        tracing::debug!(card_id, column_id, from, to, "Card moved within column");
        self.debug_check();
        Ok(true)
    }

    /// Moves a card into another column, at `target_index` (clamped) or at the
    /// end. Returns the card's final index. Nothing is mutated on error.
    pub fn move_card_across_columns(
        &mut self,
        card_id: &str,
        from_column_id: &str,
        to_column_id: &str,
        target_index: Option<usize>,
    ) -> Result<usize, KanbanError> {
        let from_ci = self
            .column_index(from_column_id)
            .ok_or_else(|| KanbanError::column_not_found(from_column_id))?;
        let to_ci = self
            .column_index(to_column_id)
            .ok_or_else(|| KanbanError::column_not_found(to_column_id))?;
        let from_idx = self.columns[from_ci]
            .card_index(card_id)
            .ok_or_else(|| KanbanError::card_not_found(card_id))?;

        if from_ci == to_ci {
            let last = self.columns[to_ci].cards.len() - 1;
            let to = target_index.unwrap_or(last).min(last);
            self.move_card_within_column(to_column_id, card_id, to)?;
            return Ok(to);
        }

        let mut card = self.columns[from_ci].cards.remove(from_idx);
        card.stage_id = self.columns[to_ci].stage_id.clone();

        let target = &mut self.columns[to_ci].cards;
        let to = target_index.unwrap_or(target.len()).min(target.len());
        target.insert(to, card);

        tracing::debug!(
            card_id,
            from_column_id,
            to_column_id,
            to,
            "Card moved across columns"
        );
        self.debug_check();
        Ok(to)
    }

    /// Puts a card at `index` of `stage_id` wherever it currently is. Applying
    /// the same placement twice leaves the store unchanged the second time.
    pub fn place_card(&mut self, card_id: &str, stage_id: &str, index: usize) -> Result<usize, KanbanError> {
        let (ci, _) = self
            .locate_card(card_id)
            .ok_or_else(|| KanbanError::card_not_found(card_id))?;
        let from = self.columns[ci].stage_id.clone();

        if from == stage_id {
            let to = index.min(self.columns[ci].cards.len() - 1);
            self.move_card_within_column(stage_id, card_id, to)?;
            Ok(to)
        } else {
            self.move_card_across_columns(card_id, &from, stage_id, Some(index))
        }
    }

    /// Moves a column to `target_index` (clamped) and renumbers
    /// `display_order` densely. Returns whether the order changed.
    pub fn move_column(&mut self, column_id: &str, target_index: usize) -> Result<bool, KanbanError> {
        let from = self
            .column_index(column_id)
            .ok_or_else(|| KanbanError::column_not_found(column_id))?;
        let to = target_index.min(self.columns.len() - 1);

        if from != to {
            let column = self.columns.remove(from);
            self.columns.insert(to, column);
            tracing::debug!(column_id, from, to, "Column moved");
        }
        renumber(&mut self.columns);

        self.debug_check();
        Ok(from != to)
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            columns: self.columns.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: BoardSnapshot) {
        tracing::debug!(columns = snapshot.columns.len(), "Board restored from snapshot");
        self.columns = snapshot.columns;
    }

    /// Membership and uniqueness rules every state of the store satisfies.
    pub fn check_invariants(&self) -> Result<(), KanbanError> {
        let mut stage_ids = HashSet::new();
        let mut card_ids = HashSet::new();

        for (idx, column) in self.columns.iter().enumerate() {
            if !stage_ids.insert(column.stage_id.as_str()) {
                return Err(KanbanError::InvalidBoard(format!(
                    "duplicate column id: {}",
                    column.stage_id
                )));
            }
            if column.display_order != idx as i64 {
                return Err(KanbanError::InvalidBoard(format!(
                    "column {} has display order {} at index {}",
                    column.stage_id, column.display_order, idx
                )));
            }
            for card in &column.cards {
                if !card_ids.insert(card.id.as_str()) {
                    return Err(KanbanError::InvalidBoard(format!(
                        "card {} appears more than once",
                        card.id
                    )));
                }
                if card.stage_id != column.stage_id {
                    return Err(KanbanError::InvalidBoard(format!(
                        "card {} has stage {} but sits in column {}",
                        card.id, card.stage_id, column.stage_id
                    )));
                }
            }
        }

        Ok(())
    }

    fn debug_check(&self) {
        debug_assert!(
            self.check_invariants().is_ok(),
            "board invariants violated: {:?}",
            self.check_invariants()
        );
    }
}

fn renumber(columns: &mut [Column]) {
    for (idx, column) in columns.iter_mut().enumerate() {
        column.display_order = idx as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(id: &str, order: i64, cards: &[&str]) -> Column {
        Column::new(id, id.to_uppercase(), order)
            .with_cards(cards.iter().map(|c| Card::new(*c, *c, id)).collect())
    }

    fn board() -> BoardStore {
        BoardStore::new(vec![
            column("todo", 0, &["A", "B", "C"]),
            column("doing", 1, &["D"]),
            column("done", 2, &[]),
        ])
        .unwrap()
    }

    fn ids(store: &BoardStore, column_id: &str) -> Vec<String> {
        store
            .column(column_id)
            .unwrap()
            .card_ids()
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_new_sorts_and_renumbers_columns() {
        let store = BoardStore::new(vec![
            column("done", 40, &[]),
            column("todo", 10, &[]),
            column("doing", 20, &[]),
        ])
        .unwrap();

        let order: Vec<_> = store
            .columns()
            .iter()
            .map(|c| (c.stage_id.as_str(), c.display_order))
            .collect();
        assert_eq!(order, vec![("todo", 0), ("doing", 1), ("done", 2)]);
    }

    #[test]
    fn test_new_rejects_duplicate_card() {
        let result = BoardStore::new(vec![column("todo", 0, &["A"]), column("done", 1, &["A"])]);
        assert!(matches!(result, Err(KanbanError::InvalidBoard(_))));
    }

    #[test]
    fn test_new_rejects_mismatched_stage() {
        let mut todo = column("todo", 0, &["A"]);
        todo.cards[0].stage_id = "done".into();
        let result = BoardStore::new(vec![todo, column("done", 1, &[])]);
        assert!(matches!(result, Err(KanbanError::InvalidBoard(_))));
    }

    #[test]
    fn test_from_stage_cards_groups_and_drops_unknown() {
        let stages = vec![Column::new("done", "Done", 1), Column::new("todo", "Todo", 0)];
        let cards = vec![
            Card::new("A", "A", "done"),
            Card::new("B", "B", ""),
            Card::new("C", "C", "ghost"),
            Card::new("D", "D", "todo"),
        ];

        let store = BoardStore::from_stage_cards(stages, cards).unwrap();
        assert_eq!(ids(&store, "todo"), vec!["B", "D"]);
        assert_eq!(ids(&store, "done"), vec!["A"]);
        assert_eq!(store.card("B").unwrap().stage_id, "todo");
        assert!(store.card("C").is_none());
    }

    #[test]
    fn test_move_within_column() {
        let mut store = board();
        assert!(store.move_card_within_column("todo", "C", 0).unwrap());
        assert_eq!(ids(&store, "todo"), vec!["C", "A", "B"]);

        assert!(store.move_card_within_column("todo", "C", 99).unwrap());
        assert_eq!(ids(&store, "todo"), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_move_within_column_same_slot_is_noop() {
        let mut store = board();
        let before = store.snapshot();
        assert!(!store.move_card_within_column("todo", "B", 1).unwrap());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_move_within_column_not_found() {
        let mut store = board();
        assert!(matches!(
            store.move_card_within_column("ghost", "A", 0),
            Err(KanbanError::NotFound(_))
        ));
        assert!(matches!(
            store.move_card_within_column("todo", "D", 0),
            Err(KanbanError::NotFound(_))
        ));
    }

    #[test]
    fn test_move_across_columns_appends() {
        let mut store = board();
        let idx = store.move_card_across_columns("A", "todo", "done", None).unwrap();

        assert_eq!(idx, 0);
        assert_eq!(ids(&store, "todo"), vec!["B", "C"]);
        assert_eq!(ids(&store, "done"), vec!["A"]);
        assert_eq!(store.card("A").unwrap().stage_id, "done");
        assert_eq!(store.card_count(), 4);
    }

    #[test]
    fn test_move_across_columns_at_index() {
        let mut store = board();
        let idx = store.move_card_across_columns("B", "todo", "doing", Some(0)).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(ids(&store, "doing"), vec!["B", "D"]);

        let idx = store.move_card_across_columns("C", "todo", "doing", Some(10)).unwrap();
        assert_eq!(idx, 2);
        assert_eq!(ids(&store, "doing"), vec!["B", "D", "C"]);
    }

    #[test]
    fn test_move_across_columns_failure_leaves_store_untouched() {
        let mut store = board();
        let before = store.snapshot();

        assert!(store.move_card_across_columns("A", "todo", "ghost", None).is_err());
        assert!(store.move_card_across_columns("D", "todo", "done", None).is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_place_card_is_idempotent() {
        let mut store = board();
        assert_eq!(store.place_card("B", "doing", 1).unwrap(), 1);
        let after_first = store.snapshot();

        assert_eq!(store.place_card("B", "doing", 1).unwrap(), 1);
        assert_eq!(store.snapshot(), after_first);
        assert_eq!(ids(&store, "doing"), vec!["D", "B"]);

        assert_eq!(store.place_card("B", "doing", 0).unwrap(), 0);
        assert_eq!(ids(&store, "doing"), vec!["B", "D"]);
    }

    #[test]
    fn test_move_column_keeps_dense_order() {
        let mut store = board();
        assert!(store.move_column("done", 0).unwrap());

        let order: Vec<_> = store
            .columns()
            .iter()
            .map(|c| (c.stage_id.as_str(), c.display_order))
            .collect();
        assert_eq!(order, vec![("done", 0), ("todo", 1), ("doing", 2)]);
        assert!(store.check_invariants().is_ok());
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut store = board();
        let snapshot = store.snapshot();
        store.move_card_across_columns("A", "todo", "done", None).unwrap();
        store.move_column("done", 0).unwrap();

        store.restore(snapshot.clone());
        assert_eq!(store.snapshot(), snapshot);
        assert_eq!(ids(&store, "todo"), vec!["A", "B", "C"]);
    }
}
