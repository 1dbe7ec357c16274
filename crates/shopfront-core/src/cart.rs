//! # Cart
//!
//! The client-local shopping cart and its mutation rules.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  User Action              Cart Method              Cart Change          │
//! │  ───────────              ───────────              ───────────          │
//! │                                                                         │
//! │  Add from detail ────────► add_product() ────────► qty+1 or push(qty 1) │
//! │                                                                         │
//! │  +/- buttons ────────────► change_quantity() ────► qty = max(1, q+Δ)    │
//! │                                                                         │
//! │  Remove ─────────────────► remove() ─────────────► lines.remove(i)      │
//! │                                                                         │
//! │  Random order ───────────► replace() ────────────► lines = picks        │
//! │                                                                         │
//! │  Checkout / logout ──────► clear() ──────────────► lines.clear()        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `id` (adding the same product increases quantity)
//! - Quantity is always ≥ 1; removal is the only way a line leaves the cart
//! - Maximum lines: [`MAX_CART_ITEMS`], maximum quantity: [`MAX_ITEM_QUANTITY`]

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::{major_units, Money};
use crate::types::{Product, SaleLine};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, RANDOM_ORDER_SIZE};

/// One product entry in the cart.
///
/// The price is frozen when the line is created; later catalog price
/// changes do not touch lines already in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product id, kept as a string the way it is persisted.
    pub id: String,

    pub name: String,

    #[serde(with = "major_units")]
    pub price: Money,

    pub quantity: i64,
}

impl CartLine {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, quantity: i64) -> Self {
        CartLine {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Creates a quantity-1 line from a catalog product.
    pub fn from_product(product: &Product) -> Self {
        CartLine::new(product.id.to_string(), product.name.clone(), product.price, 1)
    }

    /// Calculates the line total (price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Builds the sale line sent to the backend at checkout.
    pub fn to_sale_line(&self, sale_id: i64) -> CoreResult<SaleLine> {
        let product_id = self
            .id
            .parse::<i64>()
            .map_err(|_| CoreError::InvalidLineId(self.id.clone()))?;

        Ok(SaleLine {
            sale_id: Some(sale_id),
            product_id,
            quantity: self.quantity,
            unit_price: self.price,
        })
    }
}

/// The shopping cart.
///
/// Persisted as a bare JSON array of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Creates a cart from already-persisted lines.
    ///
    /// Quantities below 1 are raised to 1 so a hand-edited store cannot break
    /// the quantity invariant.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let lines = lines
            .into_iter()
            .map(|mut line| {
                line.quantity = line.quantity.max(1);
                line
            })
            .collect();
        Cart { lines }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity + 1 (price stays frozen)
    /// - Product not in cart: appended with quantity 1 at its current price
    pub fn add_product(&mut self, product: &Product) -> CoreResult<()> {
        let id = product.id.to_string();

        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            let requested = line.quantity + 1;
            if requested > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = requested;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
        }

        self.lines.push(CartLine::from_product(product));
        Ok(())
    }

    /// Shifts a line's quantity by `delta`, flooring at 1.
    ///
    /// ## Returns
    /// The new quantity. Decrementing a quantity-1 line is a no-op.
    pub fn change_quantity(&mut self, id: &str, delta: i64) -> CoreResult<i64> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| CoreError::LineNotInCart(id.to_string()))?;

        let requested = line.quantity.saturating_add(delta).max(1);
        if requested > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            });
        }

        line.quantity = requested;
        Ok(requested)
    }

    /// Removes a line by product id and returns it.
    pub fn remove(&mut self, id: &str) -> CoreResult<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| CoreError::LineNotInCart(id.to_string()))?;

        Ok(self.lines.remove(index))
    }

    /// Replaces every line at once (random order generator).
    pub fn replace(&mut self, lines: Vec<CartLine>) {
        *self = Cart::from_lines(lines);
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity of all lines (the cart badge number).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Calculates the subtotal (Σ price × quantity).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

/// Picks up to [`RANDOM_ORDER_SIZE`] distinct products at quantity 1.
///
/// ## Selection
/// `products` is the pool as served by `/products/active`; it is taken
/// as-is, without re-checking `is_active`. The pool is shuffled with the
/// caller's `rng` and the first picks are taken. Passing the generator in
/// keeps this function deterministic under test.
pub fn random_selection<R: Rng + ?Sized>(products: &[Product], rng: &mut R) -> Vec<CartLine> {
    let mut pool: Vec<&Product> = products.iter().collect();
    pool.shuffle(rng);
    pool.into_iter()
        .take(RANDOM_ORDER_SIZE)
        .map(CartLine::from_product)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
