//! # Catalog Commands
//!
//! Product listing with client-side search and sort, product detail, and
//! the home page's top sellers.

use serde::Serialize;
use tracing::debug;

use shopfront_core::catalog::{browse, SortOption};
use shopfront_core::validation::validate_search_query;
use shopfront_core::{Product, TopSellingProduct};

use crate::error::{AppError, AppResult};
use crate::state::AppContext;

/// Lists products matching `query`, in `sort` order.
pub async fn list_products(
    ctx: &AppContext,
    query: &str,
    sort: SortOption,
) -> AppResult<Vec<Product>> {
    let query = validate_search_query(query)?;
    debug!(query = %query, sort = %sort, "list_products command");

    let products = ctx.backend().products().await?;
    Ok(browse(&products, &query, sort))
}

/// A single product. Absent is `NotFound`.
pub async fn product_detail(ctx: &AppContext, id: i64) -> AppResult<Product> {
    debug!(id, "product_detail command");

    ctx.backend()
        .product(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product", id))
}

/// What the home page shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeView {
    pub top_selling: Vec<TopSellingProduct>,
}

/// Top-selling products in backend ranking order.
pub async fn home(ctx: &AppContext) -> AppResult<HomeView> {
    debug!("home command");

    let top_selling = ctx.backend().top_selling_products().await?;
    Ok(HomeView { top_selling })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{context, product, FakeBackend};

    #[tokio::test]
    async fn test_list_products_searches_and_sorts() {
        let backend = FakeBackend::new();
        *backend.products.lock().unwrap() = vec![
            product(1, "Desk Lamp", 2499, true),
            product(2, "Lamp Shade", 900, true),
            product(3, "Mug", 1000, true),
        ];
        let ctx = context(backend.clone()).await;

        let found = list_products(&ctx, "lamp", SortOption::PriceAsc).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(backend.calls(), vec!["products"]);
    }

    #[tokio::test]
    async fn test_overlong_query_is_rejected_before_backend() {
        let backend = FakeBackend::new();
        let ctx = context(backend.clone()).await;

        let err = list_products(&ctx, &"x".repeat(101), SortOption::Default)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_product_detail_not_found() {
        let backend = FakeBackend::new();
        let ctx = context(backend).await;

        let err = product_detail(&ctx, 42).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_home_keeps_ranking_order() {
        let backend = FakeBackend::new();
        *backend.top_selling.lock().unwrap() = vec![
            TopSellingProduct {
                product: product(1, "Lamp", 2499, true),
                total_sold: 30,
            },
            TopSellingProduct {
                product: product(2, "Old Mug", 500, false),
                total_sold: 12,
            },
        ];
        let ctx = context(backend).await;

        let view = home(&ctx).await.unwrap();
        let ids: Vec<i64> = view.top_selling.iter().map(|t| t.product.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
