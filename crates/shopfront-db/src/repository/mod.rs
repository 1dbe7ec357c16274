//! # Repository Module
//!
//! Typed access to the local key/value store.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.cart().load()  /  db.session().discount_state()            │
//! │       ▼                                                                 │
//! │  CartRepository          SessionRepository                             │
//! │  ├── load / save         ├── user / email / is_frequent                │
//! │  └── clear               ├── discount / special_discount               │
//! │       │                  └── discount_state / clear_all                │
//! │       │                        │                                        │
//! │       └──────────┬─────────────┘                                        │
//! │                  ▼                                                      │
//! │           LocalStorage (get / set / remove / clear, JSON helpers)      │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │           local_storage table                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod session;
pub mod storage;
