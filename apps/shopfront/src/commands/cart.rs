//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Sales   │       │
//! │  │  Cart    │     │          │     │          │     │ History  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │       │                │                                                │
//! │       │           add_to_cart        special discount (50%)            │
//! │       │           change_quantity    ├── set by random_order            │
//! │       │           remove_from_cart   └── dropped by remove / checkout   │
//! │       │                                                                 │
//! │       └──── random_order ──► replaces the whole cart                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use shopfront_core::cart::{random_selection, CartLine};
use shopfront_core::pricing::{price_cart, PriceBreakdown};
use shopfront_core::{CoreError, SPECIAL_DISCOUNT};

use crate::error::{AppError, AppResult};
use crate::state::AppContext;

/// Cart contents with their priced breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub breakdown: PriceBreakdown,
}

/// Prices the current cart under the stored discounts.
pub async fn view_cart(ctx: &AppContext) -> AppResult<CartView> {
    debug!("view_cart command");

    let discounts = ctx.session.discount_state().await?;
    let lines = ctx.cart.with_cart(|c| c.lines().to_vec());
    let breakdown = price_cart(&lines, &discounts);

    if breakdown.exceeds_subtotal() {
        warn!(
            percent = %breakdown.total_discount_percent,
            "Stacked discounts exceed the subtotal"
        );
    }

    Ok(CartView { lines, breakdown })
}

/// Adds one unit of a product, at its current price.
///
/// ## Behavior
/// - Requires a signed-in user (checked before the product lookup)
/// - Already in cart: quantity + 1
/// - Not in cart: appended with quantity 1
pub async fn add_to_cart(ctx: &AppContext, product_id: i64) -> AppResult<CartView> {
    debug!(product_id, "add_to_cart command");

    ctx.session.require_user().await?;

    let product = ctx
        .backend()
        .product(product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", product_id))?;

    ctx.cart.mutate(|c| c.add_product(&product)).await?;
    info!(product_id, name = %product.name, "Added to cart");

    view_cart(ctx).await
}

/// Changes a line's quantity by `delta`, flooring at 1.
pub async fn change_quantity(ctx: &AppContext, product_id: &str, delta: i64) -> AppResult<CartView> {
    debug!(product_id = %product_id, delta, "change_quantity command");

    let quantity = ctx
        .cart
        .mutate(|c| c.change_quantity(product_id, delta))
        .await?;
    debug!(product_id = %product_id, quantity, "Quantity changed");

    view_cart(ctx).await
}

/// Removes a line. An active special discount is consumed.
pub async fn remove_from_cart(ctx: &AppContext, product_id: &str) -> AppResult<CartView> {
    debug!(product_id = %product_id, "remove_from_cart command");

    let removed = ctx.cart.mutate(|c| c.remove(product_id)).await?;

    let store = ctx.session.store();
    if store.special_discount().await?.is_some() {
        store.clear_special_discount().await?;
        info!("Special discount dropped after line removal");
    }

    info!(product_id = %removed.id, "Removed from cart");
    view_cart(ctx).await
}

/// Replaces the cart with up to four random active products at quantity 1
/// and activates the special discount.
pub async fn random_order(ctx: &AppContext) -> AppResult<CartView> {
    debug!("random_order command");

    ctx.session.require_user().await?;

    let products = ctx.backend().active_products().await?;
    let lines = {
        let mut rng = rand::rng();
        random_selection(&products, &mut rng)
    };

    if lines.is_empty() {
        return Err(CoreError::NoActiveProducts.into());
    }

    let picked = lines.len();
    ctx.cart.mutate(move |c| Ok(c.replace(lines))).await?;
    ctx.session.store().set_special_discount(SPECIAL_DISCOUNT).await?;

    info!(lines = picked, special = %SPECIAL_DISCOUNT, "Random order placed in cart");
    view_cart(ctx).await
}
