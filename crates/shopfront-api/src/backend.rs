//! # Backend Seam
//!
//! [`ShopBackend`] is everything the client asks of the storefront backend.
//! Commands take `&dyn ShopBackend`, so tests swap in an in-process fake and
//! the binary plugs in [`HttpBackend`](crate::HttpBackend).
//!
//! ## Endpoints
//! ```text
//! ┌───────────────┬───────────────────────────────────────┬─────────────────────────┐
//! │ Group         │ Route                                 │ Method                  │
//! ├───────────────┼───────────────────────────────────────┼─────────────────────────┤
//! │ products      │ GET  /products                        │ products                │
//! │               │ GET  /products/active                 │ active_products         │
//! │               │ GET  /products/{id}                   │ product                 │
//! │               │ PUT  /products/{id}                   │ update_product          │
//! │ persons       │ GET  /persons                         │ persons                 │
//! │               │ GET  /persons/{email}                 │ person                  │
//! │               │ PUT  /persons/{email}                 │ update_person           │
//! │               │ POST /persons/login                   │ login                   │
//! │               │ POST /persons                         │ register                │
//! │ discounts     │ GET  /discounts                       │ discounts               │
//! │               │ GET  /discounts/active                │ active_discount         │
//! │               │ PUT  /discounts/{id}                  │ update_discount         │
//! │ sales         │ POST /sales                           │ create_sale             │
//! │               │ GET  /sales/{id}                      │ sale                    │
//! │               │ GET  /sales/person/{email}            │ sales_by_person         │
//! │               │ GET  /sales/top-frequent-customers    │ top_frequent_customers  │
//! │ sale-products │ POST /sale-products                   │ create_sale_line        │
//! │               │ GET  /sale-products/sale/{id}         │ sale_lines              │
//! │               │ GET  /sale-products/top-products      │ top_selling_products    │
//! └───────────────┴───────────────────────────────────────┴─────────────────────────┘
//! ```

use async_trait::async_trait;

use shopfront_core::{
    CreatedSale, Discount, DiscountUpdate, FrequentCustomer, LoginRequest, LoginResponse,
    NewSale, Person, PersonUpdate, Product, ProductUpdate, Registration, Sale, SaleLine,
    TopSellingProduct,
};

use crate::error::BackendResult;

/// The storefront REST backend.
#[async_trait]
pub trait ShopBackend: Send + Sync {
    // =========================================================================
    // Products
    // =========================================================================

    async fn products(&self) -> BackendResult<Vec<Product>>;

    async fn active_products(&self) -> BackendResult<Vec<Product>>;

    /// A product by id. Any non-success answer is `None`.
    async fn product(&self, id: i64) -> BackendResult<Option<Product>>;

    /// Returns the product as stored after the update.
    async fn update_product(&self, id: i64, update: &ProductUpdate) -> BackendResult<Product>;

    async fn top_selling_products(&self) -> BackendResult<Vec<TopSellingProduct>>;

    // =========================================================================
    // Persons
    // =========================================================================

    async fn persons(&self) -> BackendResult<Vec<Person>>;

    /// A person by email. Missing is [`BackendError::NotFound`](crate::BackendError::NotFound).
    async fn person(&self, email: &str) -> BackendResult<Person>;

    async fn update_person(&self, email: &str, update: &PersonUpdate) -> BackendResult<Person>;

    async fn login(&self, request: &LoginRequest) -> BackendResult<LoginResponse>;

    async fn register(&self, registration: &Registration) -> BackendResult<()>;

    // =========================================================================
    // Discounts
    // =========================================================================

    async fn discounts(&self) -> BackendResult<Vec<Discount>>;

    /// The recurring discount whose window is open now.
    ///
    /// `Some` only on HTTP 200; every other status is `None`. Only transport
    /// failures are errors.
    async fn active_discount(&self) -> BackendResult<Option<Discount>>;

    async fn update_discount(&self, id: i64, update: &DiscountUpdate) -> BackendResult<Discount>;

    // =========================================================================
    // Sales
    // =========================================================================

    async fn create_sale(&self, sale: &NewSale) -> BackendResult<CreatedSale>;

    /// A sale by id. Any non-success answer is `None`.
    async fn sale(&self, id: i64) -> BackendResult<Option<Sale>>;

    async fn sales_by_person(&self, email: &str) -> BackendResult<Vec<Sale>>;

    async fn top_frequent_customers(&self) -> BackendResult<Vec<FrequentCustomer>>;

    // =========================================================================
    // Sale Products
    // =========================================================================

    async fn create_sale_line(&self, line: &SaleLine) -> BackendResult<()>;

    async fn sale_lines(&self, sale_id: i64) -> BackendResult<Vec<SaleLine>>;
}
