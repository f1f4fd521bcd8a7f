//! # SQLite Key-Value Store
//!
//! [`KeyValueStore`] over the `kv_store` table.
//!
//! ```text
//! kv_store
//! ┌──────────────────┬─────────────────────────────┬──────────────────────┐
//! │ key (PK)         │ value (JSON text)           │ updated_at (RFC3339) │
//! ├──────────────────┼─────────────────────────────┼──────────────────────┤
//! │ cash_box.session │ {"id":"…","openingAmount"…} │ 2026-03-14T09:02:11Z │
//! │ cash_box.history │ [{…},{…}]                   │ 2026-03-13T21:40:03Z │
//! └──────────────────┴─────────────────────────────┴──────────────────────┘
//! ```
//!
//! Writing `null` deletes the row.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::kv::KeyValueStore;

/// Key-value store persisted in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteKvStore { pool }
    }

    async fn write(tx: &mut Transaction<'_, Sqlite>, key: &str, value: &Value) -> DbResult<()> {
        if value.is_null() {
            sqlx::query("DELETE FROM kv_store WHERE key = ?")
                .bind(key)
                .execute(&mut **tx)
                .await?;
            return Ok(());
        }

        let text = serde_json::to_string(value)?;
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(text)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKvStore {
    async fn get(&self, key: &str) -> DbResult<Option<Value>> {
        let row: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Ok(None),
            Some(text) => {
                let value: Value =
                    serde_json::from_str(&text).map_err(|e| DbError::corrupted(key, e))?;
                Ok(Some(value).filter(|v| !v.is_null()))
            }
        }
    }

    async fn set(&self, key: &str, value: &Value) -> DbResult<()> {
        debug!(key = %key, "kv set");
        let mut tx = self.pool.begin().await?;
        Self::write(&mut tx, key, value).await?;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, Value)]) -> DbResult<()> {
        debug!(count = entries.len(), "kv set_many");
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            Self::write(&mut tx, key, value).await?;
        }
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
