//! # Checkout Command
//!
//! Turns the cart into a sale on the backend.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Checkout State Machine                               │
//! │                                                                         │
//! │  ┌────────┐    ┌────────────┐    ┌────────────┐    ┌─────────┐         │
//! │  │  Idle  │───►│ Validating │───►│ Submitting │───►│ Success │         │
//! │  └────────┘    └────────────┘    └────────────┘    └─────────┘         │
//! │                      │                 │                                │
//! │                      │ empty cart      │ any backend error              │
//! │                      │ no email        │                                │
//! │                      ▼                 ▼                                │
//! │                ┌──────────────────────────┐                            │
//! │                │          Failed          │                            │
//! │                └──────────────────────────┘                            │
//! │                                                                         │
//! │  Validating: no backend calls at all                                   │
//! │  Submitting: POST /sales, then one POST /sale-products per line,       │
//! │              issued together and awaited as a group                    │
//! │  Success:    cart + special discount removed, one cart event           │
//! │  Failed:     cart untouched; a created sale is NOT rolled back         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use futures_util::future::try_join_all;
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use shopfront_core::cart::CartLine;
use shopfront_core::pricing::{price_cart, PriceBreakdown};
use shopfront_core::{CoreError, CoreResult, NewSale, SaleLine};

use crate::commands::NextView;
use crate::error::{AppError, AppResult};
use crate::state::AppContext;

/// Phases of one checkout attempt, as logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutPhase {
    Idle,
    Validating,
    Submitting,
    Success,
    Failed,
}

/// What a successful checkout returns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Client-side id tying together the log lines of this attempt.
    pub checkout_id: Uuid,
    pub sale_id: i64,
    pub lines: Vec<CartLine>,
    pub breakdown: PriceBreakdown,
    pub next_view: NextView,
}

/// Inputs that passed validation.
struct ValidatedCheckout {
    email: String,
    lines: Vec<CartLine>,
    sale_lines: Vec<SaleLine>,
    breakdown: PriceBreakdown,
}

/// Places the current cart as a sale.
///
/// ## Errors
/// - `EmptyCart` / `MissingIdentity`: nothing was sent
/// - Network: the sale or one of its lines failed; the cart is kept
pub async fn checkout(ctx: &AppContext) -> AppResult<Receipt> {
    let checkout_id = Uuid::new_v4();
    debug!(%checkout_id, phase = ?CheckoutPhase::Idle, "checkout command");

    debug!(%checkout_id, phase = ?CheckoutPhase::Validating, "Validating checkout");
    let validated = validate(ctx).await.inspect_err(|e| {
        info!(%checkout_id, phase = ?CheckoutPhase::Failed, reason = %e, "Checkout rejected");
    })?;

    debug!(
        %checkout_id,
        phase = ?CheckoutPhase::Submitting,
        lines = validated.sale_lines.len(),
        discount = %validated.breakdown.total_discount_percent,
        "Submitting sale"
    );
    let sale_id = submit(ctx, checkout_id, &validated).await?;

    ctx.cart.clear().await?;
    ctx.session.store().clear_special_discount().await?;

    info!(
        %checkout_id,
        phase = ?CheckoutPhase::Success,
        sale_id,
        total = %validated.breakdown.final_total,
        "Checkout completed"
    );

    Ok(Receipt {
        checkout_id,
        sale_id,
        lines: validated.lines,
        breakdown: validated.breakdown,
        next_view: NextView::SalesHistory,
    })
}

async fn validate(ctx: &AppContext) -> AppResult<ValidatedCheckout> {
    let lines = ctx.cart.with_cart(|c| c.lines().to_vec());
    if lines.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let email = ctx.session.require_email().await?;

    // Sale id is filled in once the header exists
    let sale_lines = lines
        .iter()
        .map(|line| line.to_sale_line(0))
        .collect::<CoreResult<Vec<_>>>()?;

    let discounts = ctx.session.discount_state().await?;
    let breakdown = price_cart(&lines, &discounts);

    Ok(ValidatedCheckout {
        email,
        lines,
        sale_lines,
        breakdown,
    })
}

async fn submit(ctx: &AppContext, checkout_id: Uuid, validated: &ValidatedCheckout) -> AppResult<i64> {
    let backend = ctx.backend();

    let sale = backend
        .create_sale(&NewSale {
            person_email: validated.email.clone(),
            discount: validated.breakdown.total_discount_percent,
        })
        .await
        .map_err(|e| {
            error!(%checkout_id, phase = ?CheckoutPhase::Failed, error = %e, "Sale creation failed");
            checkout_failed()
        })?;

    let lines: Vec<SaleLine> = validated
        .sale_lines
        .iter()
        .cloned()
        .map(|line| SaleLine {
            sale_id: Some(sale.id),
            ..line
        })
        .collect();

    try_join_all(lines.iter().map(|line| backend.create_sale_line(line)))
        .await
        .map_err(|e| {
            error!(
                %checkout_id,
                phase = ?CheckoutPhase::Failed,
                sale_id = sale.id,
                error = %e,
                "Line item creation failed; sale left without all its lines"
            );
            checkout_failed()
        })?;

    Ok(sale.id)
}

fn checkout_failed() -> AppError {
    AppError::network("Checkout failed. Please try again.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::CartEvent;
    use crate::test_support::{context, product, sign_in, FakeBackend};
    use shopfront_core::{Money, Percent, Role};
    use std::sync::atomic::Ordering;

    async fn filled_context(backend: std::sync::Arc<FakeBackend>) -> AppContext {
        *backend.products.lock().unwrap() = vec![
            product(1, "Lamp", 10_000, true),
            product(2, "Mug", 1_250, true),
        ];
        let ctx = context(backend).await;
        sign_in(&ctx, "ana@shop.test", Role::User).await;
        crate::commands::cart::add_to_cart(&ctx, 1).await.unwrap();
        crate::commands::cart::add_to_cart(&ctx, 2).await.unwrap();
        crate::commands::cart::add_to_cart(&ctx, 2).await.unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_empty_cart_makes_no_backend_calls() {
        let backend = FakeBackend::new();
        let ctx = context(backend.clone()).await;
        sign_in(&ctx, "ana@shop.test", Role::User).await;

        let err = checkout(&ctx).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "The cart is empty");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_email_makes_no_backend_calls() {
        let backend = FakeBackend::new();
        let ctx = filled_context(backend.clone()).await;
        ctx.session.store().clear_all().await.unwrap();
        let before = backend.call_count();

        let err = checkout(&ctx).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(backend.call_count(), before);
    }

    #[tokio::test]
    async fn test_success_clears_cart_and_special_once() {
        let backend = FakeBackend::new();
        let ctx = filled_context(backend.clone()).await;
        let store = ctx.session.store();
        store.set_special_discount(Percent::from_whole(50)).await.unwrap();
        store.set_is_frequent(true).await.unwrap();

        let mut events = ctx.cart.subscribe();
        let receipt = checkout(&ctx).await.unwrap();

        assert_eq!(receipt.sale_id, 100);
        assert_eq!(receipt.next_view, NextView::SalesHistory);
        assert_eq!(receipt.breakdown.total_discount_percent, Percent::from_whole(55));

        let sales = backend.sales.lock().unwrap().clone();
        assert_eq!(sales[0].person_email.as_deref(), Some("ana@shop.test"));
        assert_eq!(sales[0].discount, Percent::from_whole(55));

        let mut lines = backend.sale_lines.lock().unwrap().clone();
        lines.sort_by_key(|l| l.product_id);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.sale_id == Some(100)));
        assert_eq!(lines[1].quantity, 2);
        assert_eq!(lines[1].unit_price, Money::from_cents(1_250));

        assert!(ctx.cart.snapshot().is_empty());
        assert_eq!(ctx.db.storage().get("cart").await.unwrap(), None);
        assert_eq!(store.special_discount().await.unwrap(), None);
        assert!(store.is_frequent().await.unwrap());

        assert_eq!(events.try_recv().unwrap(), CartEvent::Changed { item_count: 0 });
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_line_failure_keeps_cart() {
        let backend = FakeBackend::new();
        let ctx = filled_context(backend.clone()).await;
        ctx.session
            .store()
            .set_special_discount(Percent::from_whole(50))
            .await
            .unwrap();
        backend.fail_sale_lines.store(true, Ordering::SeqCst);

        let mut events = ctx.cart.subscribe();
        let err = checkout(&ctx).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::NetworkError);
        // Header stays on the backend
        assert_eq!(backend.sales.lock().unwrap().len(), 1);
        assert_eq!(ctx.cart.snapshot().item_count(), 3);
        assert!(ctx.session.store().special_discount().await.unwrap().is_some());
        assert!(events.try_recv().is_err());
    }
}
