#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use stageboard::api::{create_router, AppState};
use stageboard::config::Config;
use stageboard::domain::{Card, Column, FieldLookups, FieldOption};
use stageboard::sync::SqliteSync;

pub const BOARD_ID: &str = "main";

/// In-memory database with migrations applied. A single connection keeps
/// every query on the same in-memory database.
pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn card(id: &str, title: &str, stage_id: &str) -> Card {
    Card::new(id, title, stage_id)
}

/// Todo: c1 "Fix login bug", c2 "Update docs"; Doing: c3 "Refactor login
/// form"; Done (terminal): c4 "Ship release".
pub fn sample_columns() -> Vec<Column> {
    let mut c1 = card("c1", "Fix login bug", "todo");
    c1.role_id = Some("dev".into());
    c1.importance_id = Some("high".into());
    c1.assignee_ids = vec!["u1".into()];
    c1.due_date = NaiveDate::from_ymd_opt(2024, 1, 2);

    let mut c2 = card("c2", "Update docs", "todo");
    c2.role_id = Some("pm".into());
    c2.importance_id = Some("low".into());

    let mut c3 = card("c3", "Refactor login form", "doing");
    c3.importance_id = Some("critical".into());
    c3.assignee_ids = vec!["u2".into()];

    let mut done = Column::new("done", "Done", 2).with_cards(vec![card("c4", "Ship release", "done")]);
    done.is_terminal = true;

    vec![
        Column::new("todo", "Todo", 0).with_cards(vec![c1, c2]),
        Column::new("doing", "In Progress", 1).with_cards(vec![c3]),
        done,
    ]
}

pub fn sample_lookups() -> FieldLookups {
    let mut lookups = FieldLookups::default();
    lookups.roles = vec![
        FieldOption::new("dev", "Developer", 0),
        FieldOption::new("pm", "Planner", 1),
    ];
    lookups.importances = vec![
        FieldOption::new("low", "Low", 0).with_level(1),
        FieldOption::new("high", "High", 1).with_level(3),
        FieldOption::new("critical", "Critical", 2).with_level(4),
    ];
    lookups.users.insert("u1".into(), "Kim".into());
    lookups.users.insert("u2".into(), "Lee".into());
    lookups
}

pub async fn seed_board(pool: &SqlitePool) -> SqliteSync {
    let sync = SqliteSync::new(pool.clone(), BOARD_ID);
    sync.import_board(&sample_columns(), &sample_lookups())
        .await
        .expect("Failed to seed board");
    sync
}

pub fn test_config() -> Arc<Config> {
    Arc::new(Config {
        database_url: "sqlite::memory:".to_string(),
        ..Config::default()
    })
}

pub fn test_app(pool: Option<SqlitePool>) -> Router {
    let config = test_config();
    let state = AppState::new(pool, config.clone());
    create_router(state, &config)
}

pub async fn make_request(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, String) {
    let mut request = Request::builder().uri(uri).method(method);

    if body.is_some() {
        request = request.header("content-type", "application/json");
    }

    let request = request
        .body(Body::from(body.unwrap_or_default()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body_str = String::from_utf8(body.to_vec()).unwrap();

    (status, body_str)
}
