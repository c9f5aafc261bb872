use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;

/// Opens (creating if needed) the board database, enables WAL and applies
/// pending migrations.
pub async fn init_db(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    tracing::info!(database_url, "Database initialized");

    Ok(pool)
}

pub async fn journal_mode(pool: &SqlitePool) -> Result<String, sqlx::Error> {
    let row = sqlx::query("PRAGMA journal_mode")
        .fetch_one(pool)
        .await?;

    Ok(row.get::<String, _>(0))
}
