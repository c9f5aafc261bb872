use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::board::BoardStore;
use crate::domain::{Column, KanbanError};

use super::PersistenceSync;

/// In-process persistence backed by its own [`BoardStore`]. Used by tests and
/// local sessions that have no database.
pub struct MemorySync {
    board: Mutex<BoardStore>,
    reject_with: Mutex<Option<String>>,
}

impl MemorySync {
    pub fn new(columns: Vec<Column>) -> Result<Self, KanbanError> {
        Ok(Self {
            board: Mutex::new(BoardStore::new(columns)?),
            reject_with: Mutex::new(None),
        })
    }

    /// Every following submission fails with `reason` until cleared.
    pub async fn reject_all(&self, reason: impl Into<String>) {
        *self.reject_with.lock().await = Some(reason.into());
    }

    pub async fn accept_all(&self) {
        *self.reject_with.lock().await = None;
    }

    async fn check_accepting(&self) -> Result<(), KanbanError> {
        match self.reject_with.lock().await.as_ref() {
            Some(reason) => Err(KanbanError::PersistenceRejected(reason.clone())),
            None => Ok(()),
        }
    }
}

fn rejected(err: KanbanError) -> KanbanError {
    match err {
        KanbanError::NotFound(msg) => KanbanError::PersistenceRejected(msg),
        other => other,
    }
}

#[async_trait]
impl PersistenceSync for MemorySync {
    async fn submit_card_move(
        &self,
        card_id: &str,
        new_stage_id: &str,
        new_index: usize,
    ) -> Result<(), KanbanError> {
        self.check_accepting().await?;
        let mut board = self.board.lock().await;
        board
            .place_card(card_id, new_stage_id, new_index)
            .map_err(rejected)?;
        Ok(())
    }

    async fn submit_column_move(&self, column_id: &str, new_index: usize) -> Result<(), KanbanError> {
        self.check_accepting().await?;
        let mut board = self.board.lock().await;
        board.move_column(column_id, new_index).map_err(rejected)?;
        Ok(())
    }

    async fn fetch_columns(&self) -> Result<Vec<Column>, KanbanError> {
        Ok(self.board.lock().await.columns().to_vec())
    }
}
