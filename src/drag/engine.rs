use serde::Serialize;

use crate::board::BoardStore;
use crate::domain::{ChangeIntent, KanbanError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    Card,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragState {
    Idle,
    DraggingCard,
    DraggingColumn,
}

/// One pointer-drag gesture. Lives from `begin_*` to `drop`/`cancel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub kind: DragKind,
    pub source_id: String,
    /// Column the dragged card started in. `None` for column drags.
    pub source_column_id: Option<String>,
    pub hover_target_id: Option<String>,
    pub hover_column_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The session ended without touching the store.
    Unchanged,
    Moved(ChangeIntent),
}

/// Tracks the active drag and commits it to a [`BoardStore`] on drop.
/// Hover updates never touch the store.
#[derive(Debug, Default)]
pub struct DragReorderEngine {
    session: Option<DragSession>,
}

impl DragReorderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        match self.session.as_ref().map(|s| s.kind) {
            None => DragState::Idle,
            Some(DragKind::Card) => DragState::DraggingCard,
            Some(DragKind::Column) => DragState::DraggingColumn,
        }
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn begin_card_drag(&mut self, card_id: &str, column_id: &str) -> Result<(), KanbanError> {
        self.begin(DragSession {
            kind: DragKind::Card,
            source_id: card_id.to_string(),
            source_column_id: Some(column_id.to_string()),
            hover_target_id: None,
            hover_column_id: None,
        })
    }

    pub fn begin_column_drag(&mut self, column_id: &str) -> Result<(), KanbanError> {
        self.begin(DragSession {
            kind: DragKind::Column,
            source_id: column_id.to_string(),
            source_column_id: None,
            hover_target_id: None,
            hover_column_id: None,
        })
    }

    fn begin(&mut self, session: DragSession) -> Result<(), KanbanError> {
        if let Some(active) = &self.session {
            return Err(KanbanError::InvalidDragState(format!(
                "cannot start dragging {} while {} is being dragged",
                session.source_id, active.source_id
            )));
        }
        tracing::debug!(kind = ?session.kind, source_id = session.source_id.as_str(), "Drag started");
        self.session = Some(session);
        Ok(())
    }

    pub fn hover_card(&mut self, card_id: &str) -> Result<(), KanbanError> {
        self.active_mut("hover_card")?.hover_target_id = Some(card_id.to_string());
        Ok(())
    }

    /// Pointer left the hovered card; the drop falls back to the column end.
    pub fn leave_card(&mut self) -> Result<(), KanbanError> {
        self.active_mut("leave_card")?.hover_target_id = None;
        Ok(())
    }

    pub fn hover_column(&mut self, column_id: &str) -> Result<(), KanbanError> {
        self.active_mut("hover_column")?.hover_column_id = Some(column_id.to_string());
        Ok(())
    }

    /// Discards the active session, if any. The store is never touched.
    pub fn cancel(&mut self) -> Option<DragSession> {
        let session = self.session.take();
        if let Some(s) = &session {
            tracing::debug!(source_id = s.source_id.as_str(), "Drag cancelled");
        }
        session
    }

    /// Commits the active drag. The engine is idle afterwards whatever the
    /// result. If the store rejects the move it is restored to its pre-drop
    /// state and `ReorderFailed` is returned.
    pub fn drop(&mut self, store: &mut BoardStore) -> Result<DropOutcome, KanbanError> {
        let session = self
            .session
            .take()
            .ok_or_else(|| KanbanError::InvalidDragState("drop without an active drag".into()))?;

        let snapshot = store.snapshot();
        let result = match session.kind {
            DragKind::Card => drop_card(&session, store),
            DragKind::Column => drop_column(&session, store),
        };

        match result {
            Ok(DropOutcome::Moved(intent)) => {
                tracing::info!(?intent, "Drop committed");
                Ok(DropOutcome::Moved(intent))
            }
            Ok(DropOutcome::Unchanged) => {
                tracing::debug!(source_id = session.source_id.as_str(), "Drop left board unchanged");
                Ok(DropOutcome::Unchanged)
            }
            Err(err) => {
                store.restore(snapshot);
                tracing::warn!(
                    source_id = session.source_id.as_str(),
                    error = %err,
                    "Drop rolled back"
                );
                Err(KanbanError::ReorderFailed(err.to_string()))
            }
        }
    }

    fn active_mut(&mut self, op: &str) -> Result<&mut DragSession, KanbanError> {
        self.session
            .as_mut()
            .ok_or_else(|| KanbanError::InvalidDragState(format!("{} without an active drag", op)))
    }
}

fn drop_card(session: &DragSession, store: &mut BoardStore) -> Result<DropOutcome, KanbanError> {
    let card_id = session.source_id.as_str();
    let source_column = session
        .source_column_id
        .as_deref()
        .ok_or_else(|| KanbanError::InvalidDragState("card drag without source column".into()))?;
    let Some(hover_column) = session.hover_column_id.as_deref() else {
        return Ok(DropOutcome::Unchanged);
    };

    if hover_column == source_column {
        let target = match session.hover_target_id.as_deref() {
            None => return Ok(DropOutcome::Unchanged),
            Some(target) if target == card_id => return Ok(DropOutcome::Unchanged),
            Some(target) => target,
        };

        let column = store
            .column(source_column)
            .ok_or_else(|| KanbanError::column_not_found(source_column))?;
        let from = column
            .card_index(card_id)
            .ok_or_else(|| KanbanError::card_not_found(card_id))?;
        let hovered = column
            .card_index(target)
            .ok_or_else(|| KanbanError::card_not_found(target))?;

        // land immediately before the hovered card once the dragged one is removed
        let to = if from < hovered { hovered - 1 } else { hovered };
        if !store.move_card_within_column(source_column, card_id, to)? {
            return Ok(DropOutcome::Unchanged);
        }

        return Ok(DropOutcome::Moved(ChangeIntent::CardMoved {
            card_id: card_id.to_string(),
            new_stage_id: source_column.to_string(),
            new_index: to,
        }));
    }

    let target_index = match session.hover_target_id.as_deref() {
        Some(target) => Some(
            store
                .column(hover_column)
                .ok_or_else(|| KanbanError::column_not_found(hover_column))?
                .card_index(target)
                .ok_or_else(|| KanbanError::card_not_found(target))?,
        ),
        None => None,
    };

    let new_index = store.move_card_across_columns(card_id, source_column, hover_column, target_index)?;

    Ok(DropOutcome::Moved(ChangeIntent::CardMoved {
        card_id: card_id.to_string(),
        new_stage_id: hover_column.to_string(),
        new_index,
    }))
}

fn drop_column(session: &DragSession, store: &mut BoardStore) -> Result<DropOutcome, KanbanError> {
    let column_id = session.source_id.as_str();
    let hover_column = match session.hover_column_id.as_deref() {
        None => return Ok(DropOutcome::Unchanged),
        Some(hover) if hover == column_id => return Ok(DropOutcome::Unchanged),
        Some(hover) => hover,
    };

    let new_index = store
        .column_index(hover_column)
        .ok_or_else(|| KanbanError::column_not_found(hover_column))?;
    if !store.move_column(column_id, new_index)? {
        return Ok(DropOutcome::Unchanged);
    }

    Ok(DropOutcome::Moved(ChangeIntent::ColumnMoved {
        column_id: column_id.to_string(),
        new_index,
    }))
}
