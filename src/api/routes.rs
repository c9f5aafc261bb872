use axum::http::HeaderValue;
use axum::routing::{get, patch};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::api::state::AppState;
use crate::config::Config;

pub fn create_router(state: AppState, config: &Config) -> Router {
    let origins: Vec<HeaderValue> = config
        .cors_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let board_routes = Router::new()
        .route("/{board_id}/projection", get(handlers::boards::get_projection))
        .route("/{board_id}/columns", get(handlers::boards::get_columns))
        .route(
            "/{board_id}/cards/{card_id}/move",
            patch(handlers::boards::move_card),
        )
        .route(
            "/{board_id}/stages/{stage_id}/move",
            patch(handlers::boards::move_stage),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness))
        .nest("/api/boards", board_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
