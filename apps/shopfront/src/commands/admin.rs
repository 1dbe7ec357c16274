//! # Admin Commands
//!
//! Edit tables for products, users and discounts.
//!
//! ## Edit Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Admin Edit Flow (all three entities)                 │
//! │                                                                         │
//! │  1. require_admin()                                                     │
//! │  2. GET full list ─────────────────► AdminTable<T>                      │
//! │  3. select row by key ─────────────► absent: NotFound                   │
//! │  4. merge form over row ───────────► ProductUpdate / PersonUpdate /     │
//! │                                      DiscountUpdate                     │
//! │  5. PUT update ────────────────────► updated T                          │
//! │  6. splice updated T into the table, report success                    │
//! │                                                                         │
//! │  Last write wins: there is no version check between 2 and 5.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use shopfront_core::validation::{
    validate_discount_percentage, validate_email, validate_price, validate_required,
    validate_stock, validate_window,
};
use shopfront_core::{
    Discount, DiscountUpdate, Money, Percent, Person, PersonUpdate, Product, ProductUpdate, Role,
};

use crate::error::{AppError, AppResult};
use crate::state::AppContext;

// =============================================================================
// Edit Table
// =============================================================================

/// A row an admin table can look up and replace.
pub trait AdminRow: Clone {
    type Key: PartialEq + ?Sized;

    fn key(&self) -> &Self::Key;
}

impl AdminRow for Product {
    type Key = i64;

    fn key(&self) -> &i64 {
        &self.id
    }
}

impl AdminRow for Person {
    type Key = str;

    fn key(&self) -> &str {
        &self.email
    }
}

impl AdminRow for Discount {
    type Key = i64;

    fn key(&self) -> &i64 {
        &self.id
    }
}

/// The in-memory list behind an edit form.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AdminTable<T> {
    rows: Vec<T>,
}

impl<T: AdminRow> AdminTable<T> {
    pub fn new(rows: Vec<T>) -> Self {
        AdminTable { rows }
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn find(&self, key: &T::Key) -> Option<&T> {
        self.rows.iter().find(|row| row.key() == key)
    }

    /// Replaces the row with the same key. Returns false when none matched.
    pub fn splice(&mut self, updated: T) -> bool {
        match self.rows.iter_mut().find(|row| row.key() == updated.key()) {
            Some(row) => {
                *row = updated;
                true
            }
            None => false,
        }
    }

    /// Replaces the row stored under `key`, keeping its position, even when
    /// `updated` carries a new key. Appends when no row matched.
    pub fn replace(&mut self, key: &T::Key, updated: T) {
        match self.rows.iter().position(|row| row.key() == key) {
            Some(index) => self.rows[index] = updated,
            None => self.rows.push(updated),
        }
    }
}

/// Result of a successful edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditOutcome<T> {
    pub updated: T,
    pub table: AdminTable<T>,
    pub message: String,
}

// =============================================================================
// Products
// =============================================================================

/// Changed product fields.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

/// All products, by id ascending.
pub async fn list_products(ctx: &AppContext) -> AppResult<AdminTable<Product>> {
    debug!("admin list_products command");

    ctx.session.require_admin().await?;

    let mut products = ctx.backend().products().await?;
    products.sort_by_key(|p| p.id);
    Ok(AdminTable::new(products))
}

/// Edits a product. The update always reactivates it and records the
/// editing admin.
pub async fn edit_product(
    ctx: &AppContext,
    id: i64,
    form: ProductForm,
) -> AppResult<EditOutcome<Product>> {
    debug!(id, "admin edit_product command");

    ctx.session.require_admin().await?;
    let editor = ctx.session.require_email().await?;

    let mut table = list_products(ctx).await?;
    let current = table
        .find(&id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Product", id))?;

    let update = ProductUpdate {
        name: match form.name {
            Some(name) => validate_required("name", &name)?,
            None => current.name,
        },
        description: form.description.unwrap_or(current.description),
        price: form.price.unwrap_or(current.price),
        stock: form.stock.unwrap_or(current.stock),
        is_active: true,
        updated_by_email: editor,
    };
    validate_price(update.price)?;
    validate_stock(update.stock)?;

    let updated = ctx.backend().update_product(id, &update).await?;
    table.splice(updated.clone());

    info!(id, by = %update.updated_by_email, "Product updated");
    Ok(EditOutcome {
        message: format!("Product '{}' updated", updated.name),
        updated,
        table,
    })
}

// =============================================================================
// Users
// =============================================================================

/// Changed person fields.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub email: Option<String>,
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
}

/// All persons.
pub async fn list_users(ctx: &AppContext) -> AppResult<AdminTable<Person>> {
    debug!("admin list_users command");

    ctx.session.require_admin().await?;
    Ok(AdminTable::new(ctx.backend().persons().await?))
}

/// Edits a person, addressed by their current email.
pub async fn edit_user(ctx: &AppContext, email: &str, form: UserForm) -> AppResult<EditOutcome<Person>> {
    debug!(email = %email, "admin edit_user command");

    ctx.session.require_admin().await?;

    let mut table = list_users(ctx).await?;
    let current = table
        .find(email)
        .cloned()
        .ok_or_else(|| AppError::not_found("User", email))?;

    let update = PersonUpdate {
        email: Some(match form.email {
            Some(new_email) => validate_email(&new_email)?,
            None => current.email.clone(),
        }),
        name: form.name.unwrap_or(current.name),
        address: form.address.unwrap_or(current.address),
        phone: form.phone.unwrap_or(current.phone),
        is_frequent_customer: None,
        role: form.role.unwrap_or(current.role),
    };

    let updated = ctx.backend().update_person(&current.email, &update).await?;

    // A changed email no longer matches its row by key
    table.replace(&current.email, updated.clone());

    info!(email = %updated.email, role = %updated.role, "User updated");
    Ok(EditOutcome {
        message: format!("User '{}' updated", updated.email),
        updated,
        table,
    })
}

// =============================================================================
// Discounts
// =============================================================================

/// Changed discount fields.
#[derive(Debug, Clone, Default)]
pub struct DiscountForm {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub discount_percentage: Option<Percent>,
}

/// All discounts.
pub async fn list_discounts(ctx: &AppContext) -> AppResult<AdminTable<Discount>> {
    debug!("admin list_discounts command");

    ctx.session.require_admin().await?;
    Ok(AdminTable::new(ctx.backend().discounts().await?))
}

/// Edits a discount and re-evaluates the locally cached active discount.
///
/// ## Local Effect
/// - now inside `[start, end]`: the updated discount becomes the stored one
/// - otherwise: the stored discount is removed
///
/// Either way the cart is re-announced so open views reprice.
pub async fn edit_discount(
    ctx: &AppContext,
    id: i64,
    form: DiscountForm,
) -> AppResult<EditOutcome<Discount>> {
    edit_discount_at(ctx, id, form, Utc::now()).await
}

async fn edit_discount_at(
    ctx: &AppContext,
    id: i64,
    form: DiscountForm,
    now: DateTime<Utc>,
) -> AppResult<EditOutcome<Discount>> {
    debug!(id, "admin edit_discount command");

    ctx.session.require_admin().await?;

    let mut table = list_discounts(ctx).await?;
    let current = table
        .find(&id)
        .cloned()
        .ok_or_else(|| AppError::not_found("Discount", id))?;

    let update = DiscountUpdate {
        start_date: form.start_date.unwrap_or(current.start_date),
        end_date: form.end_date.unwrap_or(current.end_date),
        discount_percentage: form.discount_percentage.unwrap_or(current.discount_avg),
    };
    validate_window(update.start_date, update.end_date)?;
    validate_discount_percentage(update.discount_percentage)?;

    let updated = ctx.backend().update_discount(id, &update).await?;
    table.splice(updated.clone());

    let store = ctx.session.store();
    let active = updated.is_active_at(now);
    if active {
        store.set_discount(&updated).await?;
    } else {
        store.remove_discount().await?;
    }
    ctx.cart.notify_changed();

    info!(id, percent = %updated.discount_avg, active, "Discount updated");
    Ok(EditOutcome {
        message: format!("Discount {} updated", updated.id),
        updated,
        table,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::CartEvent;
    use crate::test_support::{context, person, product, sign_in, FakeBackend};
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_non_admin_is_forbidden_before_any_call() {
        let backend = FakeBackend::new();
        let ctx = context(backend.clone()).await;
        sign_in(&ctx, "ana@shop.test", Role::User).await;

        assert_eq!(list_products(&ctx).await.unwrap_err().code, ErrorCode::Forbidden);
        assert_eq!(
            edit_discount(&ctx, 1, DiscountForm::default()).await.unwrap_err().code,
            ErrorCode::Forbidden
        );
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_products_sorted_and_edit_spliced() {
        let backend = FakeBackend::new();
        *backend.products.lock().unwrap() = vec![
            product(3, "Desk", 9_900, true),
            product(1, "Lamp", 2_499, false),
            product(2, "Mug", 800, true),
        ];
        let ctx = context(backend.clone()).await;
        sign_in(&ctx, "root@shop.test", Role::Admin).await;

        let table = list_products(&ctx).await.unwrap();
        let ids: Vec<i64> = table.rows().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let outcome = edit_product(
            &ctx,
            1,
            ProductForm {
                price: Some(Money::from_cents(1_999)),
                ..ProductForm::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.updated.price, Money::from_cents(1_999));
        assert!(outcome.updated.is_active);
        assert_eq!(outcome.updated.updated_by_email.as_deref(), Some("root@shop.test"));
        assert_eq!(outcome.table.rows()[0], outcome.updated);
        assert_eq!(outcome.table.rows()[0].name, "Lamp");
    }

    #[tokio::test]
    async fn test_negative_stock_is_rejected() {
        let backend = FakeBackend::new();
        *backend.products.lock().unwrap() = vec![product(1, "Lamp", 2_499, true)];
        let ctx = context(backend.clone()).await;
        sign_in(&ctx, "root@shop.test", Role::Admin).await;

        let form = ProductForm {
            stock: Some(-1),
            ..ProductForm::default()
        };
        assert!(edit_product(&ctx, 1, form).await.is_err());
        assert_eq!(backend.calls_to("update_product"), 0);
    }

    #[tokio::test]
    async fn test_edit_user_role() {
        let backend = FakeBackend::new();
        backend
            .persons
            .lock()
            .unwrap()
            .push(person("ana@shop.test", "Ana", Role::User));
        let ctx = context(backend).await;
        sign_in(&ctx, "root@shop.test", Role::Admin).await;

        let outcome = edit_user(
            &ctx,
            "ana@shop.test",
            UserForm {
                role: Some(Role::Admin),
                ..UserForm::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.updated.role, Role::Admin);
        assert_eq!(outcome.table.find("ana@shop.test").unwrap().role, Role::Admin);

        let missing = edit_user(&ctx, "nobody@shop.test", UserForm::default()).await;
        assert_eq!(missing.unwrap_err().code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_email_change_keeps_row_position() {
        let backend = FakeBackend::new();
        *backend.persons.lock().unwrap() = vec![
            person("ana@shop.test", "Ana", Role::User),
            person("bob@shop.test", "Bob", Role::User),
            person("cy@shop.test", "Cy", Role::User),
        ];
        let ctx = context(backend).await;
        sign_in(&ctx, "root@shop.test", Role::Admin).await;

        let outcome = edit_user(
            &ctx,
            "ana@shop.test",
            UserForm {
                email: Some("ana.m@shop.test".to_string()),
                ..UserForm::default()
            },
        )
        .await
        .unwrap();

        let emails: Vec<&str> = outcome.table.rows().iter().map(|p| p.email.as_str()).collect();
        assert_eq!(emails, vec!["ana.m@shop.test", "bob@shop.test", "cy@shop.test"]);
        assert!(outcome.table.find("ana@shop.test").is_none());
    }

    #[tokio::test]
    async fn test_discount_edit_updates_stored_discount() {
        let backend = FakeBackend::new();
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        *backend.discounts.lock().unwrap() = vec![Discount {
            id: 1,
            start_date: now - Duration::days(30),
            end_date: now - Duration::days(1),
            discount_avg: Percent::from_whole(10),
        }];
        let ctx = context(backend).await;
        sign_in(&ctx, "root@shop.test", Role::Admin).await;
        let mut events = ctx.cart.subscribe();

        let form = DiscountForm {
            end_date: Some(now + Duration::days(10)),
            discount_percentage: Some(Percent::from_whole(15)),
            ..DiscountForm::default()
        };
        let outcome = edit_discount_at(&ctx, 1, form, now).await.unwrap();

        assert_eq!(outcome.updated.discount_avg, Percent::from_whole(15));
        assert_eq!(
            ctx.session.store().discount().await.unwrap(),
            Some(outcome.updated.clone())
        );
        assert_eq!(events.try_recv().unwrap(), CartEvent::Changed { item_count: 0 });

        // Window moved into the past: the cached discount goes away
        let form = DiscountForm {
            end_date: Some(now - Duration::days(2)),
            ..DiscountForm::default()
        };
        edit_discount_at(&ctx, 1, form, now).await.unwrap();
        assert_eq!(ctx.session.store().discount().await.unwrap(), None);
        assert!(events.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_discount_window_validated() {
        let backend = FakeBackend::new();
        let now = Utc::now();
        *backend.discounts.lock().unwrap() = vec![Discount {
            id: 1,
            start_date: now,
            end_date: now + Duration::days(1),
            discount_avg: Percent::from_whole(10),
        }];
        let ctx = context(backend.clone()).await;
        sign_in(&ctx, "root@shop.test", Role::Admin).await;

        let form = DiscountForm {
            end_date: Some(now - Duration::days(1)),
            ..DiscountForm::default()
        };
        assert!(edit_discount(&ctx, 1, form).await.is_err());

        let form = DiscountForm {
            discount_percentage: Some(Percent::from_whole(150)),
            ..DiscountForm::default()
        };
        assert!(edit_discount(&ctx, 1, form).await.is_err());
        assert_eq!(backend.calls_to("update_discount"), 0);
    }
}
