//! # Pricing Calculator
//!
//! Pure function of cart contents + discount state → totals.
//!
//! ## Discount Stacking
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Three Independent Discount Sources                   │
//! │                                                                         │
//! │  ┌────────────────────┐  ┌────────────────────┐  ┌──────────────────┐  │
//! │  │ Recurring discount │  │ Frequent customer  │  │ Special discount │  │
//! │  │ discount_avg       │  │ flat 5%            │  │ flat 50%         │  │
//! │  │ (active window,    │  │ (top-N ranking at  │  │ (random order,   │  │
//! │  │  fetched at login) │  │  login)            │  │  one-shot)       │  │
//! │  └─────────┬──────────┘  └─────────┬──────────┘  └────────┬─────────┘  │
//! │            └───────────┬───────────┘                      │            │
//! │                        ▼                                  ▼            │
//! │          discount_amount = subtotal × (avg + 5)   special_amount =     │
//! │                                                   subtotal × 50        │
//! │                        │                                  │            │
//! │                        └──────────────┬───────────────────┘            │
//! │                                       ▼                                 │
//! │             final_total = subtotal − discount_amount − special_amount  │
//! │                                                                         │
//! │  Percentages are ADDED, never compounded, and never clamped: a stack   │
//! │  above 100% yields a negative final total (see `exceeds_subtotal`).    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each discount amount is rounded half-up to the cent on its own, and the
//! final total is derived from the rounded amounts, so the printed lines
//! always add up exactly.

use serde::Serialize;

use crate::cart::CartLine;
use crate::money::Money;
use crate::types::{Percent, SaleLine};
use crate::{FREQUENT_CUSTOMER_BONUS, SPECIAL_DISCOUNT};

// =============================================================================
// Discount State
// =============================================================================

/// The discount inputs read from local storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiscountState {
    /// Recurring site-wide discount (zero when none is active).
    pub discount_avg: Percent,

    /// Whether the signed-in user is in the frequent-customer ranking.
    pub is_frequent: bool,

    /// One-shot special discount, present only after a random order.
    pub special_discount: Option<Percent>,
}

impl DiscountState {
    /// Recurring discount plus the frequent-customer bonus.
    pub fn recurring_percent(&self) -> Percent {
        if self.is_frequent {
            self.discount_avg + FREQUENT_CUSTOMER_BONUS
        } else {
            self.discount_avg
        }
    }

    /// Special discount, or zero when absent.
    pub fn special_percent(&self) -> Percent {
        self.special_discount.unwrap_or_default()
    }

    /// The combined percent recorded on the sale at checkout.
    pub fn total_percent(&self) -> Percent {
        self.recurring_percent() + self.special_percent()
    }

    /// Returns a copy with the special discount activated.
    pub fn with_special(self) -> Self {
        DiscountState {
            special_discount: Some(SPECIAL_DISCOUNT),
            ..self
        }
    }
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Everything the cart view prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    /// Σ quantity, shown on the cart badge.
    pub item_count: i64,

    pub subtotal: Money,

    /// Recurring + frequent percent.
    pub discount_percent: Percent,

    pub discount_amount: Money,

    pub is_frequent: bool,

    pub special_discount: Option<Percent>,

    pub special_discount_amount: Money,

    pub final_total: Money,

    /// Percent sent with the sale (`discount_percent` + special).
    pub total_discount_percent: Percent,
}

impl PriceBreakdown {
    /// True when stacked discounts push the total below zero.
    pub fn exceeds_subtotal(&self) -> bool {
        self.final_total.is_negative()
    }
}

/// Prices a cart under the given discount state.
///
/// ## Formula
/// ```text
/// subtotal                = Σ price × quantity
/// discount_amount         = subtotal × (discount_avg + frequent bonus) / 100
/// special_discount_amount = subtotal × special / 100   (0 when absent)
/// final_total             = subtotal − discount_amount − special_discount_amount
/// ```
///
/// ## Example
/// ```rust
/// use shopfront_core::cart::CartLine;
/// use shopfront_core::pricing::{price_cart, DiscountState};
/// use shopfront_core::{Money, Percent};
///
/// let lines = vec![CartLine::new("1", "Mug", Money::from_cents(2000), 2)];
/// let breakdown = price_cart(&lines, &DiscountState {
///     discount_avg: Percent::from_whole(10),
///     ..DiscountState::default()
/// });
///
/// assert_eq!(breakdown.subtotal.cents(), 4000);
/// assert_eq!(breakdown.discount_amount.cents(), 400);
/// assert_eq!(breakdown.final_total.cents(), 3600);
/// ```
pub fn price_cart(lines: &[CartLine], discounts: &DiscountState) -> PriceBreakdown {
    let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
    let discount_percent = discounts.recurring_percent();
    let discount_amount = subtotal.percentage(discount_percent);
    let special_discount_amount = subtotal.percentage(discounts.special_percent());

    PriceBreakdown {
        item_count: lines.iter().map(|l| l.quantity).sum(),
        subtotal,
        discount_percent,
        discount_amount,
        is_frequent: discounts.is_frequent,
        special_discount: discounts.special_discount,
        special_discount_amount,
        final_total: subtotal - discount_amount - special_discount_amount,
        total_discount_percent: discounts.total_percent(),
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Totals of a past sale, rebuilt from its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    pub total: Money,
}

/// Applies a sale's recorded discount percent to its lines.
pub fn sale_totals(lines: &[SaleLine], discount: Percent) -> SaleTotals {
    let subtotal: Money = lines.iter().map(SaleLine::line_total).sum();
    let discount_amount = subtotal.percentage(discount);
    SaleTotals {
        subtotal,
        discount_amount,
        total: subtotal - discount_amount,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, cents: i64, qty: i64) -> CartLine {
        CartLine::new(id, format!("Item {}", id), Money::from_cents(cents), qty)
    }

    #[test]
    fn test_full_stack_example() {
        // {price:100, quantity:1}, discount_avg 10, frequent, special 50
        let lines = vec![line("1", 10_000, 1)];
        let state = DiscountState {
            discount_avg: Percent::from_whole(10),
            is_frequent: true,
            special_discount: Some(Percent::from_whole(50)),
        };

        let breakdown = price_cart(&lines, &state);

        assert_eq!(breakdown.subtotal, Money::from_cents(10_000));
        assert_eq!(breakdown.discount_percent, Percent::from_whole(15));
        assert_eq!(breakdown.discount_amount, Money::from_cents(1_500));
        assert_eq!(breakdown.special_discount_amount, Money::from_cents(5_000));
        assert_eq!(breakdown.total_discount_percent, Percent::from_whole(65));
        assert_eq!(breakdown.final_total.to_string(), "$35.00");
    }

    #[test]
    fn test_no_discounts() {
        let lines = vec![line("1", 1999, 3)];
        let breakdown = price_cart(&lines, &DiscountState::default());

        assert_eq!(breakdown.item_count, 3);
        assert_eq!(breakdown.subtotal, Money::from_cents(5997));
        assert_eq!(breakdown.final_total, breakdown.subtotal);
        assert!(breakdown.total_discount_percent.is_zero());
    }

    #[test]
    fn test_empty_cart_prices_to_zero() {
        let breakdown = price_cart(&[], &DiscountState::default().with_special());
        assert_eq!(breakdown.subtotal, Money::zero());
        assert_eq!(breakdown.final_total, Money::zero());
        assert_eq!(breakdown.item_count, 0);
    }

    #[test]
    fn test_final_total_identity_holds_with_rounding() {
        let carts = [
            vec![line("1", 333, 1)],
            vec![line("1", 1999, 7), line("2", 1, 3)],
            vec![line("1", 12_345, 2), line("2", 99, 11)],
        ];
        let states = [
            DiscountState {
                discount_avg: Percent::from_bps(1250),
                is_frequent: true,
                special_discount: None,
            },
            DiscountState {
                discount_avg: Percent::from_whole(7),
                is_frequent: false,
                special_discount: Some(Percent::from_whole(50)),
            },
        ];

        for lines in &carts {
            for state in &states {
                let b = price_cart(lines, state);
                assert_eq!(
                    b.final_total,
                    b.subtotal - b.discount_amount - b.special_discount_amount
                );
            }
        }
    }

    #[test]
    fn test_stack_above_hundred_goes_negative() {
        let lines = vec![line("1", 10_000, 1)];
        let state = DiscountState {
            discount_avg: Percent::from_whole(60),
            is_frequent: true,
            special_discount: Some(Percent::from_whole(50)),
        };

        let breakdown = price_cart(&lines, &state);

        assert_eq!(breakdown.final_total, Money::from_cents(-1_500));
        assert!(breakdown.exceeds_subtotal());
    }

    #[test]
    fn test_sale_totals() {
        let lines = vec![
            SaleLine {
                sale_id: Some(1),
                product_id: 1,
                quantity: 2,
                unit_price: Money::from_cents(1500),
            },
            SaleLine {
                sale_id: Some(1),
                product_id: 2,
                quantity: 1,
                unit_price: Money::from_cents(1000),
            },
        ];

        let totals = sale_totals(&lines, Percent::from_whole(65));

        assert_eq!(totals.subtotal, Money::from_cents(4000));
        assert_eq!(totals.discount_amount, Money::from_cents(2600));
        assert_eq!(totals.total, Money::from_cents(1400));
    }
}
