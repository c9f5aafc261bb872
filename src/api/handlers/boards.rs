use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::api::dto::{MoveCardRequest, MoveStageRequest, ViewQuery};
use crate::api::state::AppState;
use crate::board::BoardStore;
use crate::domain::{Column, KanbanError};
use crate::sync::{PersistenceSync, SqliteSync};
use crate::view::{Projection, ViewStateManager};

async fn load_columns(sync: &SqliteSync) -> Result<Vec<Column>, KanbanError> {
    let columns = sync.fetch_columns().await?;
    if columns.is_empty() {
        return Err(KanbanError::NotFound(format!(
            "Board not found: {}",
            sync.board_id()
        )));
    }
    Ok(columns)
}

pub async fn get_projection(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Query(query): Query<ViewQuery>,
) -> Result<Json<Projection>, KanbanError> {
    let view_state = query.to_view_state()?;
    let sync = state.board_sync(&board_id)?;

    let store = BoardStore::new(load_columns(&sync).await?)?;
    let lookups = sync.fetch_lookups().await?;

    let mut manager = ViewStateManager::new(state.config.view.clone(), lookups).with_state(view_state);
    manager.set_current_user(query.user.clone().filter(|u| !u.is_empty()));

    let projection = manager.project(&store);
    tracing::debug!(
        board_id = board_id.as_str(),
        visible = projection.visible_cards,
        total = projection.total_cards,
        "Projection computed"
    );

    Ok(Json(projection))
}

pub async fn get_columns(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> Result<Json<Vec<Column>>, KanbanError> {
    let sync = state.board_sync(&board_id)?;
    Ok(Json(load_columns(&sync).await?))
}

pub async fn move_card(
    State(state): State<AppState>,
    Path((board_id, card_id)): Path<(String, String)>,
    Json(req): Json<MoveCardRequest>,
) -> Result<Json<Vec<Column>>, KanbanError> {
    let sync = state.board_sync(&board_id)?;
    sync.submit_card_move(&card_id, &req.stage_id, req.index).await?;
    Ok(Json(sync.fetch_columns().await?))
}

pub async fn move_stage(
    State(state): State<AppState>,
    Path((board_id, stage_id)): Path<(String, String)>,
    Json(req): Json<MoveStageRequest>,
) -> Result<Json<Vec<Column>>, KanbanError> {
    let sync = state.board_sync(&board_id)?;
    sync.submit_column_move(&stage_id, req.index).await?;
    Ok(Json(sync.fetch_columns().await?))
}
