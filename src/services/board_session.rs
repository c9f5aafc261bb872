use std::sync::Arc;

use crate::board::BoardStore;
use crate::domain::KanbanError;
use crate::drag::{DragReorderEngine, DragSession, DragState, DropOutcome};
use crate::sync::{PersistenceSync, SyncDispatcher, SyncReport};
use crate::view::{Projection, ViewStateManager};

/// One open board: the canonical store, the view preferences over it, the
/// active drag gesture and the queue of intents waiting on storage.
///
/// Drops are applied locally first. Rejections reported by storage are folded
/// back in by [`BoardSession::reconcile`] or [`BoardSession::settle`], which
/// replace the local board with the canonical one once no intent is still in
/// flight.
pub struct BoardSession {
    store: BoardStore,
    view: ViewStateManager,
    drag: DragReorderEngine,
    sync: SyncDispatcher,
    stale: bool,
}

impl BoardSession {
    pub async fn load(sink: Arc<dyn PersistenceSync>, view: ViewStateManager) -> Result<Self, KanbanError> {
        let columns = sink.fetch_columns().await?;
        let store = BoardStore::new(columns)?;

        tracing::info!(
            columns = store.columns().len(),
            cards = store.card_count(),
            "Board session loaded"
        );

        Ok(Self {
            store,
            view,
            drag: DragReorderEngine::new(),
            sync: SyncDispatcher::new(sink),
            stale: false,
        })
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn view(&self) -> &ViewStateManager {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewStateManager {
        &mut self.view
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn projection(&self) -> Projection {
        self.view.project(&self.store)
    }

    pub fn begin_card_drag(&mut self, card_id: &str, column_id: &str) -> Result<(), KanbanError> {
        if self.store.column(column_id).and_then(|c| c.card_index(card_id)).is_none() {
            return Err(KanbanError::card_not_found(card_id));
        }
        self.drag.begin_card_drag(card_id, column_id)
    }

    pub fn begin_column_drag(&mut self, column_id: &str) -> Result<(), KanbanError> {
        if self.store.column(column_id).is_none() {
            return Err(KanbanError::column_not_found(column_id));
        }
        self.drag.begin_column_drag(column_id)
    }

    pub fn hover_card(&mut self, card_id: &str) -> Result<(), KanbanError> {
        self.drag.hover_card(card_id)
    }

    pub fn leave_card(&mut self) -> Result<(), KanbanError> {
        self.drag.leave_card()
    }

    pub fn hover_column(&mut self, column_id: &str) -> Result<(), KanbanError> {
        self.drag.hover_column(column_id)
    }

    pub fn cancel_drag(&mut self) -> Option<DragSession> {
        self.drag.cancel()
    }

    /// Commits the active drag, queues its intent for storage and returns the
    /// projection of the updated board.
    pub fn drop(&mut self) -> Result<Projection, KanbanError> {
        if let DropOutcome::Moved(intent) = self.drag.drop(&mut self.store)? {
            self.sync.submit(intent);
        }
        Ok(self.projection())
    }

    /// Intents whose outcome has not been reconciled yet.
    pub fn pending_sync(&self) -> usize {
        self.sync.outstanding()
    }

    /// A rejection was reported but the reload is waiting for in-flight
    /// intents. The local board may differ from storage until then.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Folds in every report already delivered without waiting. Returns the
    /// number of rejected intents.
    pub async fn reconcile(&mut self) -> Result<usize, KanbanError> {
        let mut reports = Vec::new();
        while let Some(report) = self.sync.try_next_report() {
            reports.push(report);
        }
        self.absorb(reports).await
    }

    /// Waits for every outstanding intent, then reconciles.
    pub async fn settle(&mut self) -> Result<usize, KanbanError> {
        let mut reports = Vec::new();
        while self.sync.outstanding() > 0 {
            match self.sync.next_report().await {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        self.absorb(reports).await
    }

    /// Replaces the local board with the canonical one from storage.
    pub async fn refresh(&mut self) -> Result<(), KanbanError> {
        let columns = self.sync.sink().fetch_columns().await?;
        let canonical = BoardStore::new(columns)?;
        self.store.restore(canonical.snapshot());
        self.stale = false;
        Ok(())
    }

    /// A reload taken while intents are still queued would miss the ones
    /// storage accepts afterwards, so it waits until the queue is empty.
    async fn absorb(&mut self, reports: Vec<SyncReport>) -> Result<usize, KanbanError> {
        let rejected = reports.iter().filter(|r| r.is_rejected()).count();
        if rejected > 0 {
            tracing::warn!(rejected, "Storage rejected optimistic changes");
            self.stale = true;
        }

        if self.stale {
            let pending = self.sync.outstanding();
            if pending > 0 {
                tracing::debug!(pending, "Deferring board reload until in-flight intents settle");
            } else {
                tracing::info!("Reloading board from storage");
                self.refresh().await?;
            }
        }
        Ok(rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::domain::{Card, Column, FieldLookups};
    use crate::sync::MemorySync;
    use crate::view::ViewConfig;

    /// Refuses card moves at once; holds column moves until `gate` opens.
    struct GatedSync {
        inner: MemorySync,
        gate: Notify,
    }

    #[async_trait]
    impl PersistenceSync for GatedSync {
        async fn submit_card_move(&self, _: &str, _: &str, _: usize) -> Result<(), KanbanError> {
            Err(KanbanError::PersistenceRejected("card moves are locked".into()))
        }

        async fn submit_column_move(&self, column_id: &str, new_index: usize) -> Result<(), KanbanError> {
            self.gate.notified().await;
            self.inner.submit_column_move(column_id, new_index).await
        }

        async fn fetch_columns(&self) -> Result<Vec<Column>, KanbanError> {
            self.inner.fetch_columns().await
        }
    }

    fn columns() -> Vec<Column> {
        vec![
            Column::new("todo", "Todo", 0).with_cards(vec![
                Card::new("A", "A", "todo"),
                Card::new("B", "B", "todo"),
                Card::new("C", "C", "todo"),
            ]),
            Column::new("done", "Done", 1),
        ]
    }

    async fn session(sink: Arc<MemorySync>) -> BoardSession {
        let mut view = ViewStateManager::new(ViewConfig::default(), FieldLookups::default());
        view.set_show_completed(true);
        BoardSession::load(sink, view).await.unwrap()
    }

    #[tokio::test]
    async fn test_drop_is_optimistic_and_confirmed() {
        let sink = Arc::new(MemorySync::new(columns()).unwrap());
        let mut session = session(sink.clone()).await;

        session.begin_card_drag("C", "todo").unwrap();
        session.hover_column("todo").unwrap();
        session.hover_card("A").unwrap();
        let projection = session.drop().unwrap();

        let ids: Vec<_> = projection.columns[0].cards.iter().map(|c| c.card.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        assert_eq!(session.pending_sync(), 1);

        assert_eq!(session.settle().await.unwrap(), 0);
        assert_eq!(session.pending_sync(), 0);
        assert_eq!(sink.fetch_columns().await.unwrap()[0].card_ids(), vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_rejected_drop_is_reconciled() {
        let sink = Arc::new(MemorySync::new(columns()).unwrap());
        let mut session = session(sink.clone()).await;
        sink.reject_all("conflict").await;

        session.begin_card_drag("A", "todo").unwrap();
        session.hover_column("done").unwrap();
        session.drop().unwrap();
        assert_eq!(session.store().column("done").unwrap().card_ids(), vec!["A"]);

        assert_eq!(session.settle().await.unwrap(), 1);
        assert_eq!(session.store().columns(), columns().as_slice());
    }

    #[tokio::test]
    async fn test_unchanged_drop_submits_nothing() {
        let sink = Arc::new(MemorySync::new(columns()).unwrap());
        let mut session = session(sink).await;

        session.begin_column_drag("todo").unwrap();
        session.hover_column("todo").unwrap();
        session.drop().unwrap();

        assert_eq!(session.pending_sync(), 0);
        assert_eq!(session.reconcile().await.unwrap(), 0);
        assert_eq!(session.drag_state(), DragState::Idle);
    }

    #[tokio::test]
    async fn test_begin_drag_rejects_unknown_ids() {
        let sink = Arc::new(MemorySync::new(columns()).unwrap());
        let mut session = session(sink).await;

        assert!(matches!(session.begin_card_drag("A", "done"), Err(KanbanError::NotFound(_))));
        assert!(matches!(session.begin_column_drag("ghost"), Err(KanbanError::NotFound(_))));
        assert_eq!(session.drag_state(), DragState::Idle);
    }

    #[tokio::test]
    async fn test_reload_waits_for_in_flight_intents() {
        let sink = Arc::new(GatedSync {
            inner: MemorySync::new(columns()).unwrap(),
            gate: Notify::new(),
        });
        let mut view = ViewStateManager::new(ViewConfig::default(), FieldLookups::default());
        view.set_show_completed(true);
        let mut session = BoardSession::load(sink.clone(), view).await.unwrap();

        session.begin_card_drag("A", "todo").unwrap();
        session.hover_column("done").unwrap();
        session.drop().unwrap();

        session.begin_column_drag("done").unwrap();
        session.hover_column("todo").unwrap();
        session.drop().unwrap();

        let rejected = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let rejected = session.reconcile().await.unwrap();
                if rejected > 0 {
                    return rejected;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        assert_eq!(rejected, 1);
        assert!(session.is_stale());
        assert_eq!(session.pending_sync(), 1);

        sink.gate.notify_one();
        assert_eq!(session.settle().await.unwrap(), 0);

        let stored = sink.fetch_columns().await.unwrap();
        assert!(!session.is_stale());
        assert_eq!(session.store().columns(), stored.as_slice());
        assert_eq!(stored[0].stage_id, "done");
        assert_eq!(stored[1].card_ids(), vec!["A", "B", "C"]);
    }
}
