use chrono::Utc;
use flashlearn_core::{decode_collection, encode_collection, Card, CardStore, CoreError, COLLECTION_KEY};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Row, SqlitePool,
};
use std::path::Path;

/// Key-value table in an embedded SQLite database. The collection lives in
/// one row under [`COLLECTION_KEY`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .map_err(|e| sql_error("sqlite connect", e))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn open_memory() -> Result<Self, CoreError> {
        // A single connection, otherwise each pooled connection would get
        // its own empty in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| sql_error("sqlite connect", e))?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), CoreError> {
        const STMT: &str = r#"
        CREATE TABLE IF NOT EXISTS kv (
          key         TEXT PRIMARY KEY,
          value       TEXT NOT NULL,
          updated_at  TEXT NOT NULL
        )
        "#;
        sqlx::query(STMT)
            .execute(&self.pool)
            .await
            .map_err(|e| sql_error("sqlite schema", e))?;
        Ok(())
    }

    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, CoreError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key=?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| sql_error("read entry", e))?;
        Ok(row.map(|r| r.get::<String, _>("value")))
    }

    pub async fn put_raw(&self, key: &str, value: &str) -> Result<(), CoreError> {
        sqlx::query(
            "INSERT INTO kv (key,value,updated_at) VALUES (?,?,?) \
             ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| sql_error("write entry", e))?;
        Ok(())
    }
}

fn sql_error(what: &'static str, e: sqlx::Error) -> CoreError {
    log::error!("{what}: {e}");
    CoreError::Storage(what)
}

#[async_trait::async_trait]
impl CardStore for SqliteStore {
    async fn load(&self) -> Result<Vec<Card>, CoreError> {
        Ok(self
            .get_raw(COLLECTION_KEY)
            .await?
            .map(|raw| decode_collection(&raw))
            .unwrap_or_default())
    }

    async fn save(&self, cards: &[Card]) -> Result<(), CoreError> {
        let raw = encode_collection(cards)?;
        self.put_raw(COLLECTION_KEY, &raw).await?;
        log::debug!("saved {} cards to sqlite", cards.len());
        Ok(())
    }
}
