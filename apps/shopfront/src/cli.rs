//! # Command-Line Interface
//!
//! Subcommand definitions, dispatch to [`crate::commands`], and output
//! rendering.
//!
//! ## Usage
//! ```bash
//! shopfront login ana@shop.test --password secret
//! shopfront products --query lamp --sort price-asc
//! shopfront add 3
//! shopfront qty 3 -1
//! shopfront random-order
//! shopfront checkout
//! shopfront sales
//! shopfront admin edit-product 3 --price 19.99
//! shopfront --json reports
//! ```
//!
//! ## Output
//! Plain text by default. With `--json` every command prints its result as
//! pretty JSON on stdout; errors go to stderr as `{ code, message }`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use shopfront_core::catalog::SortOption;
use shopfront_core::types::timestamp;
use shopfront_core::{Money, Percent, Product, Role};

use crate::commands::account::{self, RegistrationForm};
use crate::commands::admin::{self, DiscountForm, ProductForm, UserForm};
use crate::commands::cart::{self, CartView};
use crate::commands::profile::{self, ProfileForm};
use crate::commands::{catalog, checkout, reports, sales, NextView};
use crate::error::{AppError, AppResult};
use crate::state::{AppConfig, AppContext, CartEvent};

#[derive(Debug, Parser)]
#[command(name = "shopfront")]
#[command(author, version, about = "Shopfront storefront client")]
pub struct Cli {
    /// Config file (defaults to shopfront.toml in the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List products, optionally filtered and sorted
    Products {
        /// Matches name, description, or an exact price
        #[arg(short, long, default_value = "")]
        query: String,

        /// default, price-asc, price-desc, name-asc, name-desc
        #[arg(short, long, default_value = "default")]
        sort: SortOption,
    },
    /// Show one product
    Product { id: i64 },
    /// Top-selling products
    Home,
    /// Show the cart with its discounts
    Cart,
    /// Add one unit of a product to the cart
    Add { id: i64 },
    /// Change a cart line's quantity by a signed amount
    Qty {
        id: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove a cart line
    Remove { id: String },
    /// Replace the cart with random products at 50% off
    RandomOrder,
    /// Place the cart as a sale
    Checkout,
    /// Sign in
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        address: String,
        #[arg(long)]
        phone: String,
    },
    /// Sign out and clear local data
    Logout,
    /// Show the profile, or update it when a field is given
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Your past sales
    Sales,
    /// One sale with its lines
    Sale { id: i64 },
    /// Admin edit tables
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Admin reports
    Reports,
}

#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// List products by id
    Products,
    /// Edit a product (always reactivates it)
    EditProduct {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_money)]
        price: Option<Money>,
        #[arg(long)]
        stock: Option<i64>,
    },
    /// List users
    Users,
    /// Edit a user by email
    EditUser {
        email: String,
        #[arg(long = "new-email")]
        new_email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// user or admin
        #[arg(long)]
        role: Option<Role>,
    },
    /// List discounts
    Discounts,
    /// Edit a discount window or rate
    EditDiscount {
        id: i64,
        #[arg(long, value_parser = parse_timestamp)]
        start: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_timestamp)]
        end: Option<DateTime<Utc>>,
        #[arg(long)]
        percentage: Option<Percent>,
    },
}

fn parse_money(input: &str) -> Result<Money, String> {
    Money::parse_decimal(input).ok_or_else(|| format!("'{}' is not an amount", input))
}

fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, String> {
    timestamp::parse(input).ok_or_else(|| format!("'{}' is not a date (YYYY-MM-DD or RFC 3339)", input))
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one subcommand against the context and prints its result.
///
/// Commands that change the cart are followed by the cart badge, read from
/// the [`CartEvent`] feed.
pub async fn dispatch(ctx: &AppContext, command: Command, json: bool) -> AppResult<()> {
    let mut cart_events = ctx.cart.subscribe();

    run_command(ctx, command, json).await?;

    if let Some(item_count) = latest_cart_count(&mut cart_events) {
        if !json {
            println!("{}", cart_badge(item_count));
        }
    }
    Ok(())
}

/// Drains the feed and keeps the newest item count.
fn latest_cart_count(events: &mut broadcast::Receiver<CartEvent>) -> Option<i64> {
    let mut latest = None;
    loop {
        match events.try_recv() {
            Ok(CartEvent::Changed { item_count }) => latest = Some(item_count),
            Err(TryRecvError::Lagged(skipped)) => debug!(skipped, "Cart events lagged"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => return latest,
        }
    }
}

fn cart_badge(item_count: i64) -> String {
    format!("Cart: {} item{}", item_count, if item_count == 1 { "" } else { "s" })
}

async fn run_command(ctx: &AppContext, command: Command, json: bool) -> AppResult<()> {
    let out = Output {
        json,
        config: &ctx.config,
    };

    match command {
        Command::Products { query, sort } => {
            let products = catalog::list_products(ctx, &query, sort).await?;
            out.emit(&products, |p| out.product_table(p))
        }
        Command::Product { id } => {
            let product = catalog::product_detail(ctx, id).await?;
            out.emit(&product, |p| {
                format!(
                    "#{} {}\n{}\nPrice: {}  Stock: {}{}",
                    p.id,
                    p.name,
                    p.description,
                    out.money(p.price),
                    p.stock,
                    if p.is_active { "" } else { "  (inactive)" }
                )
            })
        }
        Command::Home => {
            let home = catalog::home(ctx).await?;
            out.emit(&home, |h| {
                let mut text = String::from("Top sellers\n");
                for top in &h.top_selling {
                    text.push_str(&format!(
                        "  #{:<4} {:<30} {:>10}  sold {}\n",
                        top.product.id,
                        top.product.name,
                        out.money(top.product.price),
                        top.total_sold
                    ));
                }
                text
            })
        }
        Command::Cart => out.emit_cart(&cart::view_cart(ctx).await?),
        Command::Add { id } => out.emit_cart(&cart::add_to_cart(ctx, id).await?),
        Command::Qty { id, delta } => out.emit_cart(&cart::change_quantity(ctx, &id, delta).await?),
        Command::Remove { id } => out.emit_cart(&cart::remove_from_cart(ctx, &id).await?),
        Command::RandomOrder => {
            let view = cart::random_order(ctx).await?;
            if !json {
                println!("Random order added with 50% discount");
            }
            out.emit_cart(&view)
        }
        Command::Checkout => {
            let receipt = checkout::checkout(ctx).await?;
            out.emit(&receipt, |r| {
                format!(
                    "Sale #{} placed. Total {}\n{}",
                    r.sale_id,
                    out.money(r.breakdown.final_total),
                    next_hint(r.next_view)
                )
            })
        }
        Command::Login { email, password } => {
            let outcome = account::login(ctx, &email, &password).await?;
            out.emit(&outcome, |o| {
                format!(
                    "Welcome, {}{}\n{}",
                    o.user.name,
                    if o.is_frequent { " (frequent customer, +5%)" } else { "" },
                    next_hint(o.next_view)
                )
            })
        }
        Command::Register {
            email,
            password,
            name,
            address,
            phone,
        } => {
            let form = RegistrationForm {
                email,
                password,
                name,
                address,
                phone,
            };
            account::register(ctx, form).await?;
            out.emit(&Message::new("Registered. You can log in now."), |m| m.message.clone())
        }
        Command::Logout => {
            account::logout(ctx).await?;
            out.emit(&Message::new("Logged out"), |m| m.message.clone())
        }
        Command::Profile {
            name,
            address,
            phone,
        } => {
            let person = if name.is_none() && address.is_none() && phone.is_none() {
                profile::profile(ctx).await?
            } else {
                profile::update_profile(ctx, ProfileForm {
                    name,
                    address,
                    phone,
                })
                .await?
            };
            out.emit(&person, |p| {
                format!(
                    "{} <{}>\n{}\n{}\nRole: {}{}",
                    p.name,
                    p.email,
                    p.address,
                    p.phone,
                    p.role,
                    if p.is_frequent_customer { "  (frequent customer)" } else { "" }
                )
            })
        }
        Command::Sales => {
            let history = sales::sales_history(ctx).await?;
            out.emit(&history, |h| {
                if h.is_empty() {
                    return "No sales yet".to_string();
                }
                h.iter()
                    .map(|s| match (s.item_count, s.totals) {
                        (Some(items), Some(totals)) => format!(
                            "#{:<6} {:>3} items  discount {:>6}  total {:>10}",
                            s.sale.id,
                            items,
                            s.sale.discount.to_string(),
                            out.money(totals.total)
                        ),
                        _ => format!(
                            "#{:<6}   ? items  discount {:>6}  total unavailable",
                            s.sale.id,
                            s.sale.discount.to_string()
                        ),
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        Command::Sale { id } => {
            let detail = sales::sale_detail(ctx, id).await?;
            out.emit(&detail, |d| {
                let mut text = format!("Sale #{}\n", d.sale.id);
                for entry in &d.lines {
                    let name = entry
                        .product
                        .as_ref()
                        .map(|p| p.name.as_str())
                        .unwrap_or("(removed product)");
                    text.push_str(&format!(
                        "  {:<30} {:>3} x {:>10}\n",
                        name,
                        entry.line.quantity,
                        out.money(entry.line.unit_price)
                    ));
                }
                text.push_str(&format!(
                    "Subtotal {}  Discount {} (-{})  Total {}",
                    out.money(d.totals.subtotal),
                    d.sale.discount,
                    out.money(d.totals.discount_amount),
                    out.money(d.totals.total)
                ));
                text
            })
        }
        Command::Admin { action } => dispatch_admin(ctx, action, &out).await,
        Command::Reports => {
            let reports = reports::reports(ctx).await?;
            out.emit(&reports, |r| {
                let mut text = format!("Active products: {}\n\nTop sellers\n", r.active_products.len());
                for top in &r.top_selling {
                    text.push_str(&format!("  {:<30} sold {}\n", top.product.name, top.total_sold));
                }
                text.push_str("\nFrequent customers\n");
                for customer in &r.frequent_customers {
                    text.push_str(&format!(
                        "  {:<30} {:<30} avg {:.2}\n",
                        customer.name, customer.email, customer.avg_sales
                    ));
                }
                text
            })
        }
    }
}

async fn dispatch_admin(ctx: &AppContext, action: AdminAction, out: &Output<'_>) -> AppResult<()> {
    match action {
        AdminAction::Products => {
            let table = admin::list_products(ctx).await?;
            out.emit(&table, |t| out.product_table(t.rows()))
        }
        AdminAction::EditProduct {
            id,
            name,
            description,
            price,
            stock,
        } => {
            let form = ProductForm {
                name,
                description,
                price,
                stock,
            };
            let outcome = admin::edit_product(ctx, id, form).await?;
            out.emit(&outcome, |o| o.message.clone())
        }
        AdminAction::Users => {
            let table = admin::list_users(ctx).await?;
            out.emit(&table, |t| {
                t.rows()
                    .iter()
                    .map(|p| format!("{:<30} {:<24} {:<6}", p.email, p.name, p.role.to_string()))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        AdminAction::EditUser {
            email,
            new_email,
            name,
            address,
            phone,
            role,
        } => {
            let form = UserForm {
                email: new_email,
                name,
                address,
                phone,
                role,
            };
            let outcome = admin::edit_user(ctx, &email, form).await?;
            out.emit(&outcome, |o| o.message.clone())
        }
        AdminAction::Discounts => {
            let table = admin::list_discounts(ctx).await?;
            out.emit(&table, |t| {
                t.rows()
                    .iter()
                    .map(|d| {
                        format!(
                            "#{:<4} {} .. {}  {}",
                            d.id,
                            d.start_date.format("%Y-%m-%d"),
                            d.end_date.format("%Y-%m-%d"),
                            d.discount_avg
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        AdminAction::EditDiscount {
            id,
            start,
            end,
            percentage,
        } => {
            let form = DiscountForm {
                start_date: start,
                end_date: end,
                discount_percentage: percentage,
            };
            let outcome = admin::edit_discount(ctx, id, form).await?;
            out.emit(&outcome, |o| o.message.clone())
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

#[derive(Debug, Serialize)]
struct Message {
    message: String,
}

impl Message {
    fn new(message: impl Into<String>) -> Self {
        Message {
            message: message.into(),
        }
    }
}

struct Output<'a> {
    json: bool,
    config: &'a AppConfig,
}

impl Output<'_> {
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&T) -> String) -> AppResult<()> {
        if self.json {
            let rendered = serde_json::to_string_pretty(value)
                .map_err(|e| AppError::internal(format!("Cannot render output: {}", e)))?;
            println!("{}", rendered);
        } else {
            println!("{}", text(value));
        }
        Ok(())
    }

    fn money(&self, amount: Money) -> String {
        self.config.format_currency(amount)
    }

    fn product_table(&self, products: &[Product]) -> String {
        if products.is_empty() {
            return "No products found".to_string();
        }
        products
            .iter()
            .map(|p| {
                format!(
                    "#{:<4} {:<30} {:>10}  stock {:<4}{}",
                    p.id,
                    p.name,
                    self.money(p.price),
                    p.stock,
                    if p.is_active { "" } else { " (inactive)" }
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn emit_cart(&self, view: &CartView) -> AppResult<()> {
        let b = &view.breakdown;
        if b.exceeds_subtotal() {
            warn!(percent = %b.total_discount_percent, "Discounts exceed the cart subtotal");
        }

        self.emit(view, |v| {
            if v.lines.is_empty() {
                return "Your cart is empty".to_string();
            }

            let mut text = String::new();
            for line in &v.lines {
                text.push_str(&format!(
                    "  [{}] {:<30} {:>3} x {:>10} = {:>10}\n",
                    line.id,
                    line.name,
                    line.quantity,
                    self.money(line.price),
                    self.money(line.line_total())
                ));
            }

            text.push_str(&format!("Subtotal:  {}\n", self.money(b.subtotal)));
            if !b.discount_percent.is_zero() {
                text.push_str(&format!(
                    "Discount:  -{} ({}{})\n",
                    self.money(b.discount_amount),
                    b.discount_percent,
                    if b.is_frequent { ", incl. frequent customer 5%" } else { "" }
                ));
            }
            if let Some(special) = b.special_discount {
                text.push_str(&format!(
                    "Special:   -{} ({})\n",
                    self.money(b.special_discount_amount),
                    special
                ));
            }
            text.push_str(&format!("Total:     {}", self.money(b.final_total)));
            if b.exceeds_subtotal() {
                text.push_str("\nWarning: discounts exceed the subtotal");
            }
            text
        })
    }
}

fn next_hint(view: NextView) -> String {
    format!("Next: shopfront {}", view.command())
}
