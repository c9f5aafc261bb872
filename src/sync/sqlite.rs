use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteConnection;
use sqlx::{FromRow, SqlitePool};

use crate::board::BoardStore;
use crate::domain::{Card, Column, FieldKind, FieldLookups, FieldOption, KanbanError};

use super::PersistenceSync;

#[derive(Debug, FromRow)]
struct StageRow {
    id: String,
    title: String,
    color: Option<String>,
    display_order: i64,
    is_terminal: bool,
}

#[derive(Debug, FromRow)]
struct CardRow {
    id: String,
    stage_id: String,
    title: String,
    content: Option<String>,
    role_id: Option<String>,
    importance_id: Option<String>,
    assignee_ids: String,
    due_date: Option<String>,
}

impl From<StageRow> for Column {
    fn from(row: StageRow) -> Self {
        Column {
            stage_id: row.id,
            title: row.title,
            color: row.color,
            display_order: row.display_order,
            is_terminal: row.is_terminal,
            cards: Vec::new(),
        }
    }
}

impl TryFrom<CardRow> for Card {
    type Error = KanbanError;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        let assignee_ids: Vec<String> = serde_json::from_str(&row.assignee_ids)?;
        let due_date = row.due_date.as_deref().and_then(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| {
                    tracing::warn!(card_id = row.id.as_str(), due_date = raw, error = %e, "Ignoring malformed due date");
                })
                .ok()
        });

        Ok(Card {
            id: row.id,
            title: row.title,
            content: row.content,
            stage_id: row.stage_id,
            role_id: row.role_id,
            importance_id: row.importance_id,
            assignee_ids,
            due_date,
        })
    }
}

/// SQLite persistence for one board. Card order is stored as a dense
/// `position` per stage and rewritten on every move.
#[derive(Clone)]
pub struct SqliteSync {
    pool: SqlitePool,
    board_id: String,
}

impl SqliteSync {
    pub fn new(pool: SqlitePool, board_id: impl Into<String>) -> Self {
        Self {
            pool,
            board_id: board_id.into(),
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }

    pub async fn fetch_lookups(&self) -> Result<FieldLookups, KanbanError> {
        let roles = self.fetch_options(FieldKind::Role).await?;
        let importances = self.fetch_options(FieldKind::Importance).await?;

        let users: Vec<(String, String)> = sqlx::query_as("SELECT id, name FROM users")
            .fetch_all(&self.pool)
            .await?;

        Ok(FieldLookups {
            roles,
            importances,
            users: users.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }

    async fn fetch_options(&self, kind: FieldKind) -> Result<Vec<FieldOption>, KanbanError> {
        let options = sqlx::query_as::<_, FieldOption>(
            "SELECT id, label, color, display_order, level FROM field_options WHERE board_id = ? AND kind = ? ORDER BY display_order, id",
        )
        .bind(&self.board_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    /// Writes a whole board, replacing anything stored under this board id.
    pub async fn import_board(&self, columns: &[Column], lookups: &FieldLookups) -> Result<(), KanbanError> {
        let mut tx = self.pool.begin().await?;

        for table in ["cards", "stages", "field_options"] {
            sqlx::query(&format!("DELETE FROM {} WHERE board_id = ?", table))
                .bind(&self.board_id)
                .execute(&mut *tx)
                .await?;
        }

        for column in columns {
            sqlx::query(
                "INSERT INTO stages (id, board_id, title, color, display_order, is_terminal) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&column.stage_id)
            .bind(&self.board_id)
            .bind(&column.title)
            .bind(&column.color)
            .bind(column.display_order)
            .bind(column.is_terminal)
            .execute(&mut *tx)
            .await?;

            for (position, card) in column.cards.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO cards (id, board_id, stage_id, title, content, role_id, importance_id, assignee_ids, due_date, position) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&card.id)
                .bind(&self.board_id)
                .bind(&column.stage_id)
                .bind(&card.title)
                .bind(&card.content)
                .bind(&card.role_id)
                .bind(&card.importance_id)
                .bind(serde_json::to_string(&card.assignee_ids)?)
                .bind(card.due_date.map(|d| d.format("%Y-%m-%d").to_string()))
                .bind(position as i64)
                .execute(&mut *tx)
                .await?;
            }
        }

        for (kind, options) in [
            (FieldKind::Role, &lookups.roles),
            (FieldKind::Importance, &lookups.importances),
        ] {
            for option in options {
                sqlx::query(
                    "INSERT INTO field_options (id, board_id, kind, label, color, display_order, level) VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&option.id)
                .bind(&self.board_id)
                .bind(kind.as_str())
                .bind(&option.label)
                .bind(&option.color)
                .bind(option.display_order)
                .bind(option.level)
                .execute(&mut *tx)
                .await?;
            }
        }

        for (id, name) in &lookups.users {
            sqlx::query("INSERT OR REPLACE INTO users (id, name) VALUES (?, ?)")
                .bind(id)
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            board_id = self.board_id.as_str(),
            columns = columns.len(),
            "Board imported"
        );
        Ok(())
    }
}

async fn stage_ids(conn: &mut SqliteConnection, board_id: &str) -> Result<Vec<String>, KanbanError> {
    let ids = sqlx::query_scalar("SELECT id FROM stages WHERE board_id = ? ORDER BY display_order, id")
        .bind(board_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(ids)
}

async fn stage_card_ids(
    conn: &mut SqliteConnection,
    board_id: &str,
    stage_id: &str,
) -> Result<Vec<String>, KanbanError> {
    let ids = sqlx::query_scalar(
        "SELECT id FROM cards WHERE board_id = ? AND stage_id = ? ORDER BY position, id",
    )
    .bind(board_id)
    .bind(stage_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(ids)
}

async fn assign_stageless_cards(
    conn: &mut SqliteConnection,
    board_id: &str,
    stage_id: &str,
) -> Result<(), KanbanError> {
    let moved = sqlx::query("UPDATE cards SET stage_id = ? WHERE board_id = ? AND stage_id = ''")
        .bind(stage_id)
        .bind(board_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    if moved > 0 {
        tracing::debug!(board_id, stage_id, moved, "Assigned stage-less cards to first stage");
    }
    Ok(())
}

async fn write_positions(conn: &mut SqliteConnection, stage_id: &str, ids: &[String]) -> Result<(), KanbanError> {
    for (position, id) in ids.iter().enumerate() {
        sqlx::query("UPDATE cards SET stage_id = ?, position = ? WHERE id = ?")
            .bind(stage_id)
            .bind(position as i64)
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl PersistenceSync for SqliteSync {
    async fn submit_card_move(
        &self,
        card_id: &str,
        new_stage_id: &str,
        new_index: usize,
    ) -> Result<(), KanbanError> {
        let mut tx = self.pool.begin().await?;

        let current: Option<String> =
            sqlx::query_scalar("SELECT stage_id FROM cards WHERE id = ? AND board_id = ?")
                .bind(card_id)
                .bind(&self.board_id)
                .fetch_optional(&mut *tx)
                .await?;
        let mut from_stage = current.ok_or_else(|| {
            KanbanError::PersistenceRejected(format!("Card not found: {}", card_id))
        })?;

        let stages = stage_ids(&mut tx, &self.board_id).await?;
        if !stages.iter().any(|id| id == new_stage_id) {
            return Err(KanbanError::PersistenceRejected(format!(
                "Column not found: {}",
                new_stage_id
            )));
        }

        // stage-less cards are shown in the first column; store them there
        // before positions are rewritten
        if let Some(first) = stages.first() {
            assign_stageless_cards(&mut tx, &self.board_id, first).await?;
            if from_stage.is_empty() {
                from_stage = first.clone();
            }
        }
        if !stages.contains(&from_stage) {
            return Err(KanbanError::PersistenceRejected(format!(
                "Card not found: {}",
                card_id
            )));
        }

        if from_stage != new_stage_id {
            let mut source = stage_card_ids(&mut tx, &self.board_id, &from_stage).await?;
            source.retain(|id| id != card_id);
            write_positions(&mut tx, &from_stage, &source).await?;
        }

        let mut target = stage_card_ids(&mut tx, &self.board_id, new_stage_id).await?;
        target.retain(|id| id != card_id);
        let index = new_index.min(target.len());
        target.insert(index, card_id.to_string());
        write_positions(&mut tx, new_stage_id, &target).await?;

        tx.commit().await?;

        tracing::info!(card_id, new_stage_id, index, "Card move persisted");
        Ok(())
    }

    async fn submit_column_move(&self, column_id: &str, new_index: usize) -> Result<(), KanbanError> {
        let mut tx = self.pool.begin().await?;

        let mut stages = stage_ids(&mut tx, &self.board_id).await?;
        let from = stages
            .iter()
            .position(|id| id == column_id)
            .ok_or_else(|| KanbanError::PersistenceRejected(format!("Column not found: {}", column_id)))?;

        let id = stages.remove(from);
        let index = new_index.min(stages.len());
        stages.insert(index, id);

        for (order, id) in stages.iter().enumerate() {
            sqlx::query("UPDATE stages SET display_order = ? WHERE id = ?")
                .bind(order as i64)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(column_id, index, "Column move persisted");
        Ok(())
    }

    async fn fetch_columns(&self) -> Result<Vec<Column>, KanbanError> {
        let stages = sqlx::query_as::<_, StageRow>(
            "SELECT id, title, color, display_order, is_terminal FROM stages WHERE board_id = ? ORDER BY display_order, id",
        )
        .bind(&self.board_id)
        .fetch_all(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, CardRow>(
            "SELECT id, stage_id, title, content, role_id, importance_id, assignee_ids, due_date FROM cards WHERE board_id = ? ORDER BY position, id",
        )
        .bind(&self.board_id)
        .fetch_all(&self.pool)
        .await?;

        let cards = rows
            .into_iter()
            .map(Card::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let store = BoardStore::from_stage_cards(stages.into_iter().map(Column::from).collect(), cards)?;
        Ok(store.into_columns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    async fn seeded() -> SqliteSync {
        let sync = SqliteSync::new(pool().await, "main");
        let mut card = Card::new("A", "Write docs", "todo");
        card.assignee_ids = vec!["u1".into()];
        card.due_date = NaiveDate::from_ymd_opt(2024, 5, 1);

        let columns = vec![
            Column::new("todo", "Todo", 0).with_cards(vec![
                card,
                Card::new("B", "Fix bug", "todo"),
                Card::new("C", "Review", "todo"),
            ]),
            Column::new("done", "Done", 1),
        ];
        let mut lookups = FieldLookups::default();
        lookups.roles.push(FieldOption::new("dev", "Developer", 0));
        lookups.importances.push(FieldOption::new("hi", "High", 0).with_level(3));
        lookups.users.insert("u1".into(), "Kim".into());

        sync.import_board(&columns, &lookups).await.unwrap();
        sync
    }

    #[tokio::test]
    async fn test_fetch_round_trips_imported_board() {
        let sync = seeded().await;

        let columns = sync.fetch_columns().await.unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].card_ids(), vec!["A", "B", "C"]);
        assert_eq!(columns[0].cards[0].assignee_ids, vec!["u1"]);
        assert_eq!(columns[0].cards[0].due_date, NaiveDate::from_ymd_opt(2024, 5, 1));

        let lookups = sync.fetch_lookups().await.unwrap();
        assert_eq!(lookups.roles[0].label, "Developer");
        assert_eq!(lookups.importances[0].level, 3);
        assert_eq!(lookups.user_name("u1"), "Kim");
    }

    #[tokio::test]
    async fn test_card_move_rewrites_positions() {
        let sync = seeded().await;

        sync.submit_card_move("A", "done", 0).await.unwrap();
        sync.submit_card_move("C", "todo", 0).await.unwrap();

        let columns = sync.fetch_columns().await.unwrap();
        assert_eq!(columns[0].card_ids(), vec!["C", "B"]);
        assert_eq!(columns[1].card_ids(), vec!["A"]);
        assert_eq!(columns[1].cards[0].stage_id, "done");
    }

    #[tokio::test]
    async fn test_repeated_card_move_is_idempotent() {
        let sync = seeded().await;

        sync.submit_card_move("B", "done", 5).await.unwrap();
        let once = sync.fetch_columns().await.unwrap();
        sync.submit_card_move("B", "done", 5).await.unwrap();

        assert_eq!(sync.fetch_columns().await.unwrap(), once);
    }

    #[tokio::test]
    async fn test_column_move_keeps_order_dense() {
        let sync = seeded().await;

        sync.submit_column_move("done", 0).await.unwrap();

        let columns = sync.fetch_columns().await.unwrap();
        assert_eq!(columns[0].stage_id, "done");
        assert_eq!(
            columns.iter().map(|c| c.display_order).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[tokio::test]
    async fn test_unknown_ids_are_rejected() {
        let sync = seeded().await;

        let err = sync.submit_card_move("ghost", "done", 0).await.unwrap_err();
        assert!(matches!(err, KanbanError::PersistenceRejected(_)));

        let err = sync.submit_card_move("A", "ghost", 0).await.unwrap_err();
        assert!(matches!(err, KanbanError::PersistenceRejected(_)));

        let err = sync.submit_column_move("ghost", 0).await.unwrap_err();
        assert!(matches!(err, KanbanError::PersistenceRejected(_)));

        assert_eq!(sync.fetch_columns().await.unwrap()[0].card_ids(), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_stageless_cards_keep_first_column_order() {
        let sync = seeded().await;
        sqlx::query("UPDATE cards SET stage_id = '' WHERE id = 'A'")
            .execute(&sync.pool)
            .await
            .unwrap();
        assert_eq!(sync.fetch_columns().await.unwrap()[0].card_ids(), vec!["A", "B", "C"]);

        sync.submit_card_move("C", "todo", 0).await.unwrap();
        let columns = sync.fetch_columns().await.unwrap();
        assert_eq!(columns[0].card_ids(), vec!["C", "A", "B"]);

        let stage: String = sqlx::query_scalar("SELECT stage_id FROM cards WHERE id = 'A'")
            .fetch_one(&sync.pool)
            .await
            .unwrap();
        assert_eq!(stage, "todo");
    }

    #[tokio::test]
    async fn test_stageless_card_can_be_moved() {
        let sync = seeded().await;
        sqlx::query("UPDATE cards SET stage_id = '' WHERE id = 'B'")
            .execute(&sync.pool)
            .await
            .unwrap();

        sync.submit_card_move("B", "done", 0).await.unwrap();

        let columns = sync.fetch_columns().await.unwrap();
        assert_eq!(columns[0].card_ids(), vec!["A", "C"]);
        assert_eq!(columns[1].card_ids(), vec!["B"]);
    }
}
