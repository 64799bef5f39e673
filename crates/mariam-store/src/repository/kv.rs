//! # Key-Value Repository
//!
//! SQLite implementation of [`KeyValueStore`].
//!
//! ## Table
//! ```text
//! key_value_store
//! ┌──────────────────────┬───────────────────────────┬──────────────────────┐
//! │ key (PK)             │ value                     │ updated_at           │
//! ├──────────────────────┼───────────────────────────┼──────────────────────┤
//! │ @mariam_pos_cart     │ [{"productId":"12",...}]  │ 2026-01-05T10:12:03Z │
//! │ @mariam_pos_api_url  │ http://192.168.0.17:3001  │ 2026-01-02T08:00:00Z │
//! └──────────────────────┴───────────────────────────┴──────────────────────┘
//! ```
//!
//! Writes are upserts; the last write for a key wins.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StoreResult;
use crate::kv::KeyValueStore;

/// Repository for the `key_value_store` table.
#[derive(Debug, Clone)]
pub struct KeyValueRepository {
    pool: SqlitePool,
}

impl KeyValueRepository {
    /// Creates a new KeyValueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KeyValueRepository { pool }
    }
}

#[async_trait]
impl KeyValueStore for KeyValueRepository {
    async fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let value = sqlx::query_scalar("SELECT value FROM key_value_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO key_value_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM key_value_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key, removed = result.rows_affected(), "Removed value");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
