//! # State Module
//!
//! Everything a command needs, bundled in [`AppContext`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        AppContext                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │          │              │               │                │             │
//! │          ▼              ▼               ▼                ▼             │
//! │  ┌────────────┐  ┌────────────┐  ┌────────────┐  ┌────────────────┐   │
//! │  │ AppConfig  │  │ CartStore  │  │  Session   │  │ dyn ShopBackend│   │
//! │  │            │  │            │  │            │  │                │   │
//! │  │ api_url    │  │ Arc<Mutex< │  │ identity,  │  │ HttpBackend or │   │
//! │  │ currency   │  │   Cart>>   │  │ discounts  │  │ a test fake    │   │
//! │  └────────────┘  └────────────┘  └────────────┘  └────────────────┘   │
//! │                        │               │                               │
//! │                        └───────┬───────┘                               │
//! │                                ▼                                        │
//! │                        Database (SQLite)                                │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartStore: Arc<Mutex<Cart>>, never locked across an await           │
//! │  • Session / Database: pool-backed, cloneable                          │
//! │  • AppConfig: read-only after load                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod session;

pub use cart::{CartEvent, CartStore};
pub use config::AppConfig;
pub use session::Session;

use std::sync::Arc;

use shopfront_api::ShopBackend;
use shopfront_db::Database;

use crate::error::AppResult;

/// Shared state handed to every command.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub db: Database,
    pub cart: CartStore,
    pub session: Session,
    pub backend: Arc<dyn ShopBackend>,
}

impl AppContext {
    /// Builds the context, loading the persisted cart.
    pub async fn new(
        config: AppConfig,
        db: Database,
        backend: Arc<dyn ShopBackend>,
    ) -> AppResult<Self> {
        let cart = CartStore::load(db.cart()).await?;
        let session = Session::new(db.session());

        Ok(AppContext {
            config,
            db,
            cart,
            session,
            backend,
        })
    }

    /// Shorthand for the backend trait object.
    pub fn backend(&self) -> &dyn ShopBackend {
        self.backend.as_ref()
    }
}
