//! # Session Repository
//!
//! Identity and discount state kept between CLI invocations.
//!
//! ## Keys
//! ```text
//! ┌──────────────────┬──────────────────────────┬──────────────────────────┐
//! │ key              │ written by               │ cleared by               │
//! ├──────────────────┼──────────────────────────┼──────────────────────────┤
//! │ user             │ login, profile update    │ logout                   │
//! │ email            │ login                    │ logout                   │
//! │ is_frequent      │ login, profile update    │ logout                   │
//! │ discount         │ login, admin discount    │ logout, window closed    │
//! │ specialDiscount  │ random order             │ checkout, line removal   │
//! └──────────────────┴──────────────────────────┴──────────────────────────┘
//! ```

use std::str::FromStr;

use tracing::debug;

use shopfront_core::pricing::DiscountState;
use shopfront_core::{Discount, Percent, SessionUser};

use super::storage::{LocalStorage, StorageKey};
use crate::error::{DbError, DbResult};

/// Repository for session and discount keys.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    storage: LocalStorage,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(storage: LocalStorage) -> Self {
        SessionRepository { storage }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub async fn user(&self) -> DbResult<Option<SessionUser>> {
        self.storage.get_json(StorageKey::User.as_str()).await
    }

    pub async fn set_user(&self, user: &SessionUser) -> DbResult<()> {
        self.storage.set_json(StorageKey::User.as_str(), user).await
    }

    pub async fn email(&self) -> DbResult<Option<String>> {
        self.storage.get(StorageKey::Email.as_str()).await
    }

    pub async fn set_email(&self, email: &str) -> DbResult<()> {
        self.storage.set(StorageKey::Email.as_str(), email).await
    }

    /// Frequent-customer flag. Missing means `false`.
    pub async fn is_frequent(&self) -> DbResult<bool> {
        let key = StorageKey::IsFrequent.as_str();
        match self.storage.get(key).await? {
            Some(raw) => bool::from_str(raw.trim()).map_err(|e| DbError::invalid_value(key, e)),
            None => Ok(false),
        }
    }

    /// Stores `"true"` for frequent customers; anyone else has no key at all.
    pub async fn set_is_frequent(&self, frequent: bool) -> DbResult<()> {
        let key = StorageKey::IsFrequent.as_str();
        if frequent {
            self.storage.set(key, "true").await
        } else {
            self.storage.remove(key).await
        }
    }

    // =========================================================================
    // Discounts
    // =========================================================================

    pub async fn discount(&self) -> DbResult<Option<Discount>> {
        self.storage.get_json(StorageKey::Discount.as_str()).await
    }

    pub async fn set_discount(&self, discount: &Discount) -> DbResult<()> {
        debug!(discount_id = discount.id, percent = %discount.discount_avg, "Storing active discount");
        self.storage.set_json(StorageKey::Discount.as_str(), discount).await
    }

    pub async fn remove_discount(&self) -> DbResult<()> {
        self.storage.remove(StorageKey::Discount.as_str()).await
    }

    /// One-shot special discount, stored as a bare percent number (`50`).
    pub async fn special_discount(&self) -> DbResult<Option<Percent>> {
        let key = StorageKey::SpecialDiscount.as_str();
        match self.storage.get(key).await? {
            Some(raw) => Percent::from_str(&raw)
                .map(Some)
                .map_err(|e| DbError::invalid_value(key, e)),
            None => Ok(None),
        }
    }

    pub async fn set_special_discount(&self, pct: Percent) -> DbResult<()> {
        let raw = pct.to_string();
        self.storage
            .set(StorageKey::SpecialDiscount.as_str(), raw.trim_end_matches('%'))
            .await
    }

    pub async fn clear_special_discount(&self) -> DbResult<()> {
        self.storage.remove(StorageKey::SpecialDiscount.as_str()).await
    }

    /// Assembles the pricing inputs from the stored keys.
    pub async fn discount_state(&self) -> DbResult<DiscountState> {
        let discount_avg = self
            .discount()
            .await?
            .map(|d| d.discount_avg)
            .unwrap_or_default();

        Ok(DiscountState {
            discount_avg,
            is_frequent: self.is_frequent().await?,
            special_discount: self.special_discount().await?,
        })
    }

    /// Logout: every key goes, cart included.
    pub async fn clear_all(&self) -> DbResult<()> {
        self.storage.clear().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
