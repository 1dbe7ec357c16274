//! # shopfront-api: Storefront Backend Client
//!
//! Typed REST access to the storefront backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  apps/shopfront commands                                               │
//! │       │  &dyn ShopBackend                                              │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 shopfront-api (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ShopBackend (trait) ◄──── HttpBackend (reqwest)               │   │
//! │  │          ▲                                                      │   │
//! │  │          └───────────────── FakeBackend (app tests)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  REST backend  (default http://localhost:8080/api)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopfront_api::{HttpBackend, ShopBackend};
//!
//! let backend = HttpBackend::new("http://localhost:8080/api")?;
//! let products = backend.active_products().await?;
//! ```

pub mod backend;
pub mod error;
pub mod http;

pub use backend::ShopBackend;
pub use error::{BackendError, BackendResult};
pub use http::{HttpBackend, DEFAULT_API_URL};
