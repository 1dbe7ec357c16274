//! # Sales Commands
//!
//! Past sales of the signed-in person.
//!
//! Totals are rebuilt client-side: `Σ quantity × unitPrice`, less the
//! discount percent recorded on the sale. In the history, a sale whose lines
//! cannot be fetched is still listed, without totals.

use futures_util::future::{join_all, try_join_all};
use serde::Serialize;
use tracing::{debug, warn};

use shopfront_core::pricing::{sale_totals, SaleTotals};
use shopfront_core::{Product, Sale, SaleLine};

use crate::error::{AppError, AppResult};
use crate::state::AppContext;

/// One row of the sales history.
///
/// `item_count` and `totals` are `None` when the sale's lines failed to load.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummary {
    pub sale: Sale,
    pub item_count: Option<i64>,
    pub totals: Option<SaleTotals>,
}

/// A line of a sale with its product, when the product still exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetailLine {
    pub line: SaleLine,
    pub product: Option<Product>,
}

/// A sale with its lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetail {
    pub sale: Sale,
    pub lines: Vec<SaleDetailLine>,
    pub totals: SaleTotals,
}

/// Lists the signed-in person's sales with their totals.
pub async fn sales_history(ctx: &AppContext) -> AppResult<Vec<SaleSummary>> {
    debug!("sales_history command");

    let email = ctx.session.require_email().await?;
    let backend = ctx.backend();

    let sales = backend.sales_by_person(&email).await?;
    let lines = join_all(sales.iter().map(|sale| backend.sale_lines(sale.id))).await;

    let summaries: Vec<SaleSummary> = sales
        .into_iter()
        .zip(lines)
        .map(|(sale, lines)| match lines {
            Ok(lines) => SaleSummary {
                item_count: Some(lines.iter().map(|l| l.quantity).sum()),
                totals: Some(sale_totals(&lines, sale.discount)),
                sale,
            },
            Err(e) => {
                warn!(sale_id = sale.id, error = %e, "Sale lines unavailable; listing without total");
                SaleSummary {
                    item_count: None,
                    totals: None,
                    sale,
                }
            }
        })
        .collect();

    debug!(count = summaries.len(), "Sales history loaded");
    Ok(summaries)
}

/// Loads one sale, its lines and their products.
pub async fn sale_detail(ctx: &AppContext, sale_id: i64) -> AppResult<SaleDetail> {
    debug!(sale_id, "sale_detail command");

    let backend = ctx.backend();
    let sale = backend
        .sale(sale_id)
        .await?
        .ok_or_else(|| AppError::not_found("Sale", sale_id))?;

    let lines = backend.sale_lines(sale_id).await?;
    let products = try_join_all(lines.iter().map(|line| backend.product(line.product_id))).await?;

    let totals = sale_totals(&lines, sale.discount);
    let lines = lines
        .into_iter()
        .zip(products)
        .map(|(line, product)| SaleDetailLine { line, product })
        .collect();

    Ok(SaleDetail { sale, lines, totals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{context, product, sign_in, FakeBackend};
    use shopfront_core::{Money, Percent, Role};

    fn sale(id: i64, email: &str, discount: u32) -> Sale {
        Sale {
            id,
            person_email: Some(email.to_string()),
            discount: Percent::from_whole(discount),
            created_at: None,
        }
    }

    fn line(sale_id: i64, product_id: i64, quantity: i64, cents: i64) -> SaleLine {
        SaleLine {
            sale_id: Some(sale_id),
            product_id,
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn test_history_totals_apply_sale_discount() {
        let backend = FakeBackend::new();
        *backend.sales.lock().unwrap() = vec![
            sale(1, "ana@shop.test", 10),
            sale(2, "bob@shop.test", 0),
            sale(3, "ana@shop.test", 0),
        ];
        *backend.sale_lines.lock().unwrap() = vec![
            line(1, 1, 2, 5_000),
            line(1, 2, 1, 1_000),
            line(3, 2, 3, 1_000),
        ];
        let ctx = context(backend).await;
        sign_in(&ctx, "ana@shop.test", Role::User).await;

        let history = sales_history(&ctx).await.unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].item_count, Some(3));
        let totals = history[0].totals.unwrap();
        assert_eq!(totals.subtotal, Money::from_cents(11_000));
        assert_eq!(totals.total, Money::from_cents(9_900));
        assert_eq!(history[1].totals.unwrap().total, Money::from_cents(3_000));
    }

    #[tokio::test]
    async fn test_history_survives_one_failed_line_fetch() {
        let backend = FakeBackend::new();
        *backend.sales.lock().unwrap() = vec![
            sale(1, "ana@shop.test", 0),
            sale(2, "ana@shop.test", 0),
            sale(3, "ana@shop.test", 0),
        ];
        *backend.sale_lines.lock().unwrap() = vec![
            line(1, 1, 1, 1_000),
            line(2, 1, 2, 1_000),
            line(3, 1, 3, 1_000),
        ];
        *backend.fail_sale_lines_for.lock().unwrap() = Some(2);
        let ctx = context(backend).await;
        sign_in(&ctx, "ana@shop.test", Role::User).await;

        let history = sales_history(&ctx).await.unwrap();

        let ids: Vec<i64> = history.iter().map(|s| s.sale.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(history[1].totals.is_none());
        assert_eq!(history[1].item_count, None);
        assert_eq!(history[0].totals.unwrap().total, Money::from_cents(1_000));
        assert_eq!(history[2].totals.unwrap().total, Money::from_cents(3_000));
    }

    #[tokio::test]
    async fn test_detail_includes_products() {
        let backend = FakeBackend::new();
        *backend.products.lock().unwrap() = vec![product(1, "Lamp", 5_000, true)];
        *backend.sales.lock().unwrap() = vec![sale(7, "ana@shop.test", 50)];
        *backend.sale_lines.lock().unwrap() = vec![line(7, 1, 1, 5_000), line(7, 9, 1, 1_000)];
        let ctx = context(backend).await;

        let detail = sale_detail(&ctx, 7).await.unwrap();

        assert_eq!(detail.lines.len(), 2);
        assert_eq!(detail.lines[0].product.as_ref().unwrap().name, "Lamp");
        assert!(detail.lines[1].product.is_none());
        assert_eq!(detail.totals.total, Money::from_cents(3_000));
    }

    #[tokio::test]
    async fn test_missing_sale_is_not_found() {
        let backend = FakeBackend::new();
        let ctx = context(backend).await;
        assert_eq!(sale_detail(&ctx, 404).await.unwrap_err().code, ErrorCode::NotFound);
    }
}
