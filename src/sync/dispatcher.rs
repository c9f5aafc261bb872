use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::{ChangeIntent, KanbanError};

use super::PersistenceSync;

/// Outcome of one submitted intent.
#[derive(Debug)]
pub struct SyncReport {
    pub intent: ChangeIntent,
    pub result: Result<(), KanbanError>,
}

impl SyncReport {
    pub fn is_rejected(&self) -> bool {
        self.result.is_err()
    }
}

/// Fire-and-forget submission of change intents. A background worker sends
/// them to the sink one at a time, in submission order, and reports every
/// outcome back.
pub struct SyncDispatcher {
    sink: Arc<dyn PersistenceSync>,
    intents_tx: mpsc::UnboundedSender<ChangeIntent>,
    reports_tx: mpsc::UnboundedSender<SyncReport>,
    reports_rx: mpsc::UnboundedReceiver<SyncReport>,
    outstanding: usize,
}

impl SyncDispatcher {
    /// Spawns the worker; must be called within a tokio runtime.
    pub fn new(sink: Arc<dyn PersistenceSync>) -> Self {
        let (intents_tx, mut intents_rx) = mpsc::unbounded_channel::<ChangeIntent>();
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();

        let worker_sink = Arc::clone(&sink);
        let worker_reports = reports_tx.clone();
        tokio::spawn(async move {
            while let Some(intent) = intents_rx.recv().await {
                let result = worker_sink.submit(&intent).await;
                match &result {
                    Ok(()) => {
                        tracing::info!(subject_id = intent.subject_id(), "Change intent confirmed")
                    }
                    Err(e) => tracing::warn!(
                        subject_id = intent.subject_id(),
                        error = %e,
                        "Change intent rejected"
                    ),
                }
                if worker_reports.send(SyncReport { intent, result }).is_err() {
                    break;
                }
            }
            tracing::debug!("Sync worker stopped");
        });

        Self {
            sink,
            intents_tx,
            reports_tx,
            reports_rx,
            outstanding: 0,
        }
    }

    pub fn sink(&self) -> &Arc<dyn PersistenceSync> {
        &self.sink
    }

    /// Intents submitted whose report has not been taken yet.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Queues an intent without waiting for storage.
    pub fn submit(&mut self, intent: ChangeIntent) {
        self.outstanding += 1;
        if let Err(mpsc::error::SendError(intent)) = self.intents_tx.send(intent) {
            let _ = self.reports_tx.send(SyncReport {
                intent,
                result: Err(KanbanError::PersistenceRejected("sync worker stopped".into())),
            });
        }
    }

    pub async fn next_report(&mut self) -> Option<SyncReport> {
        let report = self.reports_rx.recv().await;
        if report.is_some() {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
        report
    }

    pub fn try_next_report(&mut self) -> Option<SyncReport> {
        let report = self.reports_rx.try_recv().ok();
        if report.is_some() {
            self.outstanding = self.outstanding.saturating_sub(1);
        }
        report
    }
}
