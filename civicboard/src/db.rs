//! SQLite pool setup. Migrations are embedded so a fresh data directory is
//! usable without any external tooling.

use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::application::config::Configuration;

pub type SqlDb = Arc<SqlitePool>;

pub async fn init_sqlite_db(config: &Configuration) -> anyhow::Result<SqlDb> {
    tokio::fs::create_dir_all(&config.data_dir).await?;
    let database_path = config.database_path();
    info!(database = %database_path.display(), "initializing sqlite database");
    let options = SqliteConnectOptions::new()
        .filename(&database_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(Arc::new(pool))
}

// Every connection to :memory: opens a separate database, so the test pool is
// capped at a single connection.
#[cfg(test)]
pub(crate) async fn init_test_db() -> SqlDb {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite should open");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations should apply");
    Arc::new(pool)
}
