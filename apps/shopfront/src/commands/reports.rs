//! # Reports Command
//!
//! Admin dashboard data, fetched in one concurrent batch.

use serde::Serialize;
use tracing::{debug, error};

use shopfront_core::{FrequentCustomer, Product, TopSellingProduct};

use crate::error::{AppError, AppResult};
use crate::state::AppContext;

/// The three admin reports.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reports {
    pub active_products: Vec<Product>,
    pub top_selling: Vec<TopSellingProduct>,
    pub frequent_customers: Vec<FrequentCustomer>,
}

/// Loads all reports; one failing query fails the whole view.
pub async fn reports(ctx: &AppContext) -> AppResult<Reports> {
    debug!("reports command");

    ctx.session.require_admin().await?;

    let backend = ctx.backend();
    let (active_products, top_selling, frequent_customers) = tokio::try_join!(
        backend.active_products(),
        backend.top_selling_products(),
        backend.top_frequent_customers(),
    )
    .map_err(|e| {
        error!(error = %e, "Report query failed");
        AppError::network("Failed to load reports")
    })?;

    debug!(
        active = active_products.len(),
        top = top_selling.len(),
        frequent = frequent_customers.len(),
        "Reports loaded"
    );

    Ok(Reports {
        active_products,
        top_selling,
        frequent_customers,
    })
}
