//! # Commands Module
//!
//! Every storefront action, as an async function over [`AppContext`].
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports, NextView)
//! ├── catalog.rs   ◄─── product list/search/sort, detail, home
//! ├── cart.rs      ◄─── view, add, quantity, remove, random order
//! ├── checkout.rs  ◄─── sale + line items, cart cleanup
//! ├── account.rs   ◄─── login, register, logout
//! ├── profile.rs   ◄─── profile view and update
//! ├── sales.rs     ◄─── sales history, sale detail
//! ├── admin.rs     ◄─── product / user / discount edit tables
//! └── reports.rs   ◄─── admin reports
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  cli.rs                                                                 │
//! │    Command::Add { id } ──► commands::cart::add_to_cart(&ctx, id)       │
//! │                                    │                                    │
//! │                                    │  guards (identity, admin, input)   │
//! │                                    │  backend calls via ctx.backend()   │
//! │                                    │  state changes via ctx.cart /      │
//! │                                    │                   ctx.session      │
//! │                                    ▼                                    │
//! │                          AppResult<CartView>                            │
//! │    rendered as text, or as JSON with --json                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`AppContext`]: crate::state::AppContext

use serde::Serialize;

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod profile;
pub mod reports;
pub mod sales;

/// Where the user is sent after a flow completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NextView {
    Reports,
    SalesHistory,
}

impl NextView {
    /// The subcommand that shows this view.
    pub fn command(&self) -> &'static str {
        match self {
            NextView::Reports => "reports",
            NextView::SalesHistory => "sales",
        }
    }
}
