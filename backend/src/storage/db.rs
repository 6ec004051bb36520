use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Handle to the SQLite pool, built once at startup and cloned into every
/// repository. There is no global connection state; the handle owns the
/// lifecycle.
#[derive(Clone)]
pub struct DbConnection {
    pool: SqlitePool,
}

impl DbConnection {
    /// Open (creating if necessary) the database at `url` and set up the
    /// schema.
    pub async fn new(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Initialize a uniquely named shared in-memory database for tests.
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let url = format!("sqlite:file:memdb_{}?mode=memory&cache=shared", test_id);
        Self::new(&url).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool; called at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS technicians (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                pending_days INTEGER NOT NULL DEFAULT 0 CHECK (pending_days >= 0),
                active INTEGER NOT NULL DEFAULT 1
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS shifts (
                id TEXT PRIMARY KEY,
                technician_id TEXT NOT NULL REFERENCES technicians(id),
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                external_event_id TEXT,
                UNIQUE (technician_id, start_date)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rest_days (
                id TEXT PRIMARY KEY,
                technician_id TEXT NOT NULL REFERENCES technicians(id),
                date TEXT NOT NULL,
                processed INTEGER NOT NULL DEFAULT 0,
                processed_at TEXT,
                external_event_id TEXT,
                UNIQUE (technician_id, date)
            );
            "#,
        )
        .execute(pool)
        .await?;

        // The reconciliation sweep selects rest days by date every run.
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_rest_days_date ON rest_days(date);
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_shifts_start_date ON shifts(start_date);
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
