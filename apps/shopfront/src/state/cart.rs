//! # Cart Store
//!
//! The cart shared by every command, its persistence, and its change feed.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Command                  CartStore              Side effects           │
//! │  ───────                  ─────────              ────────────           │
//! │                                                                         │
//! │  add / qty / remove ────► mutate(|cart| ..) ───► save to `cart` key    │
//! │  random-order                  │                 CartEvent::Changed     │
//! │                                │                                        │
//! │  checkout success ──────► clear() ─────────────► remove `cart` key     │
//! │                                                  CartEvent::Changed     │
//! │                                                                         │
//! │  logout ────────────────► reset() ─────────────► CartEvent::Changed     │
//! │                           (storage already wiped)                       │
//! │                                                                         │
//! │  NOTE: the Mutex guard is dropped before any await. Mutations run on   │
//! │        a copy, which replaces the shared cart only after it is saved.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each operation fires exactly one [`CartEvent`].

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use shopfront_core::cart::Cart;
use shopfront_core::CoreResult;
use shopfront_db::CartRepository;

use crate::error::AppResult;

/// Buffered events per subscriber before the oldest are dropped.
const EVENT_CAPACITY: usize = 16;

/// Broadcast after every cart-affecting change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartEvent {
    /// `item_count` is Σ quantity, for the cart badge.
    #[serde(rename_all = "camelCase")]
    Changed { item_count: i64 },
}

/// Shared cart with persistence and notifications.
#[derive(Debug, Clone)]
pub struct CartStore {
    cart: Arc<Mutex<Cart>>,
    repo: CartRepository,
    events: broadcast::Sender<CartEvent>,
}

impl CartStore {
    /// Loads the persisted cart.
    pub async fn load(repo: CartRepository) -> AppResult<Self> {
        let cart = repo.load().await?;
        debug!(lines = cart.line_count(), "Cart loaded");

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(CartStore {
            cart: Arc::new(Mutex::new(cart)),
            repo,
            events,
        })
    }

    /// Subscribes to cart events.
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// A copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.with_cart(Cart::clone)
    }

    /// Applies a mutation, persists the result, and notifies.
    ///
    /// A failed mutation leaves the cart, the store, and subscribers untouched.
    pub async fn mutate<F, R>(&self, f: F) -> AppResult<R>
    where
        F: FnOnce(&mut Cart) -> CoreResult<R>,
    {
        // Work on a copy; the shared cart only changes once storage has it
        let mut draft = self.snapshot();
        let result = f(&mut draft)?;

        self.repo.save(&draft).await?;

        let item_count = draft.item_count();
        self.with_cart_mut(|cart| *cart = draft);
        self.notify(item_count);
        Ok(result)
    }

    /// Empties the cart and removes it from storage.
    pub async fn clear(&self) -> AppResult<()> {
        self.with_cart_mut(Cart::clear);
        self.repo.clear().await?;
        self.notify(0);
        Ok(())
    }

    /// Empties the in-memory cart after storage was wiped elsewhere.
    pub fn reset(&self) {
        self.with_cart_mut(Cart::clear);
        self.notify(0);
    }

    /// Fires a change event for the current contents without mutating them.
    ///
    /// Used when pricing inputs change under an unchanged cart.
    pub fn notify_changed(&self) {
        let item_count = self.with_cart(Cart::item_count);
        self.notify(item_count);
    }

    fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    fn notify(&self, item_count: i64) {
        // No subscribers is fine
        let receivers = self.events.send(CartEvent::Changed { item_count }).unwrap_or(0);
        debug!(item_count, receivers, "Cart changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_core::cart::CartLine;
    use shopfront_core::{CoreError, Money};
    use shopfront_db::{Database, DbConfig};

    async fn store() -> (Database, CartStore) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = CartStore::load(db.cart()).await.unwrap();
        (db, store)
    }

    fn line(id: &str, cents: i64, quantity: i64) -> CartLine {
        CartLine::new(id, format!("Product {}", id), Money::from_cents(cents), quantity)
    }

    #[tokio::test]
    async fn test_mutate_persists_and_notifies_once() {
        let (db, store) = store().await;
        let mut events = store.subscribe();

        store
            .mutate(|cart| {
                cart.replace(vec![line("1", 500, 2), line("2", 100, 1)]);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(events.try_recv().unwrap(), CartEvent::Changed { item_count: 3 });
        assert!(events.try_recv().is_err());
        assert_eq!(db.cart().load().await.unwrap().item_count(), 3);
    }

    #[tokio::test]
    async fn test_failed_mutation_changes_nothing() {
        let (db, store) = store().await;
        let mut events = store.subscribe();

        let err = store
            .mutate(|cart| cart.remove("9").map(|_| ()))
            .await
            .unwrap_err();

        assert_eq!(err.message, CoreError::LineNotInCart("9".into()).to_string());
        assert!(events.try_recv().is_err());
        assert_eq!(db.storage().get("cart").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_cart() {
        let (db, store) = store().await;
        store
            .mutate(|cart| {
                cart.replace(vec![line("1", 500, 1)]);
                Ok(())
            })
            .await
            .unwrap();

        let mut events = store.subscribe();
        db.close().await;

        let result = store
            .mutate(|cart| {
                cart.replace(vec![line("2", 100, 3)]);
                Ok(())
            })
            .await;

        assert!(result.is_err());
        let cart = store.snapshot();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.lines()[0].id, "1");
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_clear_removes_stored_cart() {
        let (db, store) = store().await;
        store
            .mutate(|cart| {
                cart.replace(vec![line("1", 500, 1)]);
                Ok(())
            })
            .await
            .unwrap();

        let mut events = store.subscribe();
        store.clear().await.unwrap();

        assert!(store.snapshot().is_empty());
        assert_eq!(db.storage().get("cart").await.unwrap(), None);
        assert_eq!(events.try_recv().unwrap(), CartEvent::Changed { item_count: 0 });
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_load_picks_up_persisted_cart() {
        let (db, store) = store().await;
        store
            .mutate(|cart| {
                cart.replace(vec![line("4", 250, 4)]);
                Ok(())
            })
            .await
            .unwrap();

        let reloaded = CartStore::load(db.cart()).await.unwrap();
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }
}
