//! # Cart Repository
//!
//! Persists the cart under the `cart` key as a JSON array of lines.
//!
//! The stored array is the source of truth between CLI invocations: every
//! mutation in the app writes the whole cart back before returning.

use tracing::debug;

use shopfront_core::cart::Cart;

use super::storage::{LocalStorage, StorageKey};
use crate::error::DbResult;

/// Repository for the persisted cart.
#[derive(Debug, Clone)]
pub struct CartRepository {
    storage: LocalStorage,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(storage: LocalStorage) -> Self {
        CartRepository { storage }
    }

    /// Loads the cart. A missing key is an empty cart.
    pub async fn load(&self) -> DbResult<Cart> {
        let cart: Option<Cart> = self.storage.get_json(StorageKey::Cart.as_str()).await?;

        // Re-run the quantity repair on whatever was stored
        Ok(cart
            .map(|c| Cart::from_lines(c.lines().to_vec()))
            .unwrap_or_default())
    }

    /// Writes the whole cart back.
    pub async fn save(&self, cart: &Cart) -> DbResult<()> {
        debug!(lines = cart.line_count(), items = cart.item_count(), "Saving cart");
        self.storage.set_json(StorageKey::Cart.as_str(), cart).await
    }

    /// Removes the cart key entirely.
    pub async fn clear(&self) -> DbResult<()> {
        self.storage.remove(StorageKey::Cart.as_str()).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
