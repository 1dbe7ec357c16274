//! # Local Storage Repository
//!
//! String key/value persistence, the storefront's only local state.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  local_storage                                                          │
//! │  ┌──────────────────┬────────────────────────────────┬───────────────┐  │
//! │  │ key              │ value                          │ updated_at    │  │
//! │  ├──────────────────┼────────────────────────────────┼───────────────┤  │
//! │  │ cart             │ [{"id":"3","name":..}]         │ 2026-..       │  │
//! │  │ user             │ {"name":..,"role":"admin"}     │ 2026-..       │  │
//! │  │ email            │ ana@shop.test                  │ 2026-..       │  │
//! │  │ is_frequent      │ true                           │ 2026-..       │  │
//! │  │ discount         │ {"id":1,"discountAvg":10,..}   │ 2026-..       │  │
//! │  │ specialDiscount  │ 50                             │ 2026-..       │  │
//! │  └──────────────────┴────────────────────────────────┴───────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are plain strings. Typed access goes through [`LocalStorage::get_json`]
//! and [`LocalStorage::set_json`]; a value that no longer decodes surfaces as
//! [`DbError::InvalidValue`] instead of being silently dropped.

use std::fmt;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Keys the storefront persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Cart,
    Discount,
    SpecialDiscount,
    IsFrequent,
    Email,
    User,
}

impl StorageKey {
    pub const ALL: [StorageKey; 6] = [
        StorageKey::Cart,
        StorageKey::Discount,
        StorageKey::SpecialDiscount,
        StorageKey::IsFrequent,
        StorageKey::Email,
        StorageKey::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Cart => "cart",
            StorageKey::Discount => "discount",
            StorageKey::SpecialDiscount => "specialDiscount",
            StorageKey::IsFrequent => "is_frequent",
            StorageKey::Email => "email",
            StorageKey::User => "user",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository over the `local_storage` table.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pool: SqlitePool,
}

impl LocalStorage {
    /// Creates a new LocalStorage.
    pub fn new(pool: SqlitePool) -> Self {
        LocalStorage { pool }
    }

    /// Reads a raw value. Missing keys are `None`.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_storage WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Writes a raw value, replacing any previous one.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, "Writing local value");

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a key. Removing a missing key is not an error.
    pub async fn remove(&self, key: &str) -> DbResult<()> {
        debug!(key = %key, "Removing local value");

        sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deletes every key.
    pub async fn clear(&self) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM local_storage")
            .execute(&self.pool)
            .await?;

        debug!(removed = result.rows_affected(), "Cleared local storage");
        Ok(())
    }

    /// Lists stored keys in alphabetical order.
    pub async fn keys(&self) -> DbResult<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(keys)
    }

    /// Reads and decodes a JSON value.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> DbResult<Option<T>> {
        match self.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| DbError::invalid_value(key, e)),
            None => Ok(None),
        }
    }

    /// Encodes and writes a JSON value.
    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> DbResult<()> {
        let raw = serde_json::to_string(value).map_err(|e| DbError::invalid_value(key, e))?;
        self.set(key, &raw).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn storage() -> LocalStorage {
        Database::new(DbConfig::in_memory()).await.unwrap().storage()
    }

    #[tokio::test]
    async fn test_set_get_overwrite_remove() {
        let storage = storage().await;

        assert_eq!(storage.get("email").await.unwrap(), None);

        storage.set("email", "ana@shop.test").await.unwrap();
        storage.set("email", "bo@shop.test").await.unwrap();
        assert_eq!(storage.get("email").await.unwrap().as_deref(), Some("bo@shop.test"));

        storage.remove("email").await.unwrap();
        storage.remove("email").await.unwrap();
        assert_eq!(storage.get("email").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let storage = storage().await;

        for key in StorageKey::ALL {
            storage.set(key.as_str(), "x").await.unwrap();
        }
        assert_eq!(storage.keys().await.unwrap().len(), StorageKey::ALL.len());

        storage.clear().await.unwrap();
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_values() {
        let storage = storage().await;

        storage.set_json("numbers", &vec![1, 2, 3]).await.unwrap();
        let numbers: Option<Vec<i32>> = storage.get_json("numbers").await.unwrap();
        assert_eq!(numbers, Some(vec![1, 2, 3]));

        storage.set("numbers", "not json").await.unwrap();
        let err = storage.get_json::<Vec<i32>>("numbers").await.unwrap_err();
        assert!(matches!(err, DbError::InvalidValue { ref key, .. } if key == "numbers"));
    }
}
