//! # shopfront-core: Pure Storefront Logic for Shopfront
//!
//! This crate is the **heart** of Shopfront. It contains the cart, pricing,
//! catalog and validation rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopfront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    CLI (apps/shopfront)                         │   │
//! │  │    products ──► add ──► cart ──► checkout ──► sales             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shopfront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  pricing  │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │ Discount  │  │   │
//! │  │   │   Sale    │  │  Percent  │  │ CartLine  │  │  State    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐                                 │   │
//! │  │   │  catalog  │  │validation │                                 │   │
//! │  │   └───────────┘  └───────────┘                                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                 │                                   │                   │
//! │  ┌──────────────▼──────────────┐   ┌────────────────▼──────────────┐   │
//! │  │  shopfront-db (local state) │   │  shopfront-api (REST backend) │   │
//! │  └─────────────────────────────┘   └───────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Backend entities and request bodies (Product, Sale, Person, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The client-local cart and its mutation rules
//! - [`pricing`] - Discount stacking and cart totals
//! - [`catalog`] - Product search and sort
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use shopfront_core::cart::CartLine;
//! use shopfront_core::pricing::{price_cart, DiscountState};
//! use shopfront_core::{Money, Percent};
//!
//! let lines = vec![CartLine::new("1", "Lamp", Money::from_cents(10_000), 1)];
//! let discounts = DiscountState {
//!     discount_avg: Percent::from_whole(10),
//!     is_frequent: true,
//!     special_discount: Some(Percent::from_whole(50)),
//! };
//!
//! let breakdown = price_cart(&lines, &discounts);
//! assert_eq!(breakdown.final_total.to_string(), "$35.00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use shopfront_core::Money` instead of
// `use shopfront_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat bonus granted to customers in the backend's frequent-customer ranking.
pub const FREQUENT_CUSTOMER_BONUS: Percent = Percent::from_whole(5);

/// One-shot promotional discount activated by the random order generator.
///
/// ## Lifecycle
/// Consumed (removed from local storage) when any cart line is removed or
/// when checkout succeeds.
pub const SPECIAL_DISCOUNT: Percent = Percent::from_whole(50);

/// Number of products the random order generator places in the cart.
pub const RANDOM_ORDER_SIZE: usize = 4;

/// Maximum distinct lines allowed in a single cart
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single cart line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;
