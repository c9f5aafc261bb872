//! Contract with durable storage and the collaborators that implement it.
//!
//! The board core never waits on storage: committed drops are queued on a
//! [`SyncDispatcher`] and their outcomes come back as [`SyncReport`]s that the
//! owner of the store must reconcile.

pub mod dispatcher;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use crate::domain::{ChangeIntent, Column, KanbanError};

pub use dispatcher::{SyncDispatcher, SyncReport};
pub use memory::MemorySync;
pub use sqlite::SqliteSync;

/// Durable side of the board. Submissions describe final states, so
/// submitting the same move twice must leave storage as the first call did.
#[async_trait]
pub trait PersistenceSync: Send + Sync {
    async fn submit_card_move(
        &self,
        card_id: &str,
        new_stage_id: &str,
        new_index: usize,
    ) -> Result<(), KanbanError>;

    async fn submit_column_move(&self, column_id: &str, new_index: usize) -> Result<(), KanbanError>;

    /// Canonical board state, used for the initial load and for reconciling
    /// after a rejection.
    async fn fetch_columns(&self) -> Result<Vec<Column>, KanbanError>;

    async fn submit(&self, intent: &ChangeIntent) -> Result<(), KanbanError> {
        match intent {
            ChangeIntent::CardMoved {
                card_id,
                new_stage_id,
                new_index,
            } => self.submit_card_move(card_id, new_stage_id, *new_index).await,
            ChangeIntent::ColumnMoved {
                column_id,
                new_index,
            } => self.submit_column_move(column_id, *new_index).await,
        }
    }
}
