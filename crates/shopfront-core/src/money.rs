//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The storefront backend speaks JSON numbers:                            │
//! │    19.99 * 3 = 59.97000000000001  ❌ WRONG!                            │
//! │                                                                         │
//! │  Stacked percentage discounts make it worse:                            │
//! │    subtotal − 15% − 50% computed in floats drifts by fractions of a    │
//! │    cent, and the printed total stops matching the printed lines.       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices are converted to cents ONCE, at the JSON boundary, and every │
//! │    sum, product and discount is integer math from then on.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! The backend sends prices in major units (`"price": 12.5` or
//! `"price": "12.50"`). Fields that cross that boundary use
//! `#[serde(with = "shopfront_core::money::major_units")]`, which decodes to
//! cents and encodes back to a decimal number.
//!
//! ## Usage
//! ```rust
//! use shopfront_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(1099); // $10.99
//!
//! // Arithmetic operations
//! let doubled = price * 2;            // $21.98
//! let total = price + Money::from_cents(500); // $15.99
//! assert_eq!(total.cents(), 1599);
//! assert_eq!(doubled.cents(), 2198);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::Percent;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative totals when stacked discounts exceed 100%
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price ──┬──► CartLine.price ──► CartLine.line_total           │
/// │                  │                                                      │
/// │                  └──► Displayed as "$10.99" in the catalog              │
/// │                                                                         │
/// │  Cart subtotal ──► discount amounts ──► final total ──► SaleLine       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a major-unit float from the wire, rounding to the nearest cent.
    ///
    /// Only used at the JSON boundary; nothing inside the crate does float
    /// arithmetic on money.
    pub fn from_major_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let cents = (value * 100.0).round();
        if cents.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// Parses a decimal string such as `"12"`, `"12.5"` or `"-0.99"`.
    ///
    /// Digits past the second decimal place are rounded half-up.
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("12.5"), Some(Money::from_cents(1250)));
    /// assert_eq!(Money::parse_decimal("0.999"), Some(Money::from_cents(100)));
    /// assert_eq!(Money::parse_decimal("abc"), None);
    /// ```
    pub fn parse_decimal(input: &str) -> Option<Self> {
        let input = input.trim();
        let (negative, digits) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input.strip_prefix('+').unwrap_or(input)),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return None;
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

        let mut frac_digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = frac_digits.next().unwrap_or(0);
        let hundredths = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().is_some_and(|d| d >= 5);

        let mut cents = whole.checked_mul(100)?.checked_add(tenths * 10 + hundredths)?;
        if round_up {
            cents += 1;
        }

        Some(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value in major units as a float, for the JSON boundary only.
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates `rate` of this amount, rounding half-up to the cent.
    ///
    /// ## Implementation
    /// Integer math over basis points: `(amount * bps + 5000) / 10000`.
    /// The +5000 provides rounding (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    /// use shopfront_core::Percent;
    ///
    /// let subtotal = Money::from_cents(1999); // $19.99
    /// let off = subtotal.percentage(Percent::from_whole(15));
    /// // $19.99 × 15% = $2.9985 → $3.00
    /// assert_eq!(off.cents(), 300);
    /// ```
    ///
    /// ## Workflow
    /// ```text
    /// Cart subtotal: $100.00
    ///      │
    ///      ├── percentage(15%) ← recurring + frequent bonus ──► $15.00
    ///      │
    ///      └── percentage(50%) ← special discount ────────────► $50.00
    ///      │
    ///      ▼
    /// Final total: $35.00
    /// ```
    pub fn percentage(&self, rate: Percent) -> Money {
        // i128 prevents overflow on large amounts
        let amount = (self.0 as i128 * rate.bps() as i128 + 5000).div_euclid(10000);
        Money::from_cents(amount as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299); // $2.99
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 897); // $8.97
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Wire Format (major units)
// =============================================================================

/// Serde adapter for prices expressed in major units on the wire.
///
/// ## Accepted Inputs
/// - JSON integers: `12` → 1200 cents
/// - JSON floats: `12.5` → 1250 cents (rounded to the nearest cent)
/// - Numeric strings: `"12.50"` → 1250 cents
///
/// Output is always a JSON number in major units.
pub mod major_units {
    use super::Money;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        if value.cents() % 100 == 0 {
            serializer.serialize_i64(value.dollars())
        } else {
            serializer.serialize_f64(value.to_major_f64())
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        deserializer.deserialize_any(MajorUnitsVisitor)
    }

    struct MajorUnitsVisitor;

    impl<'de> Visitor<'de> for MajorUnitsVisitor {
        type Value = Money;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a price in major units, as a number or numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
            v.checked_mul(100)
                .map(Money::from_cents)
                .ok_or_else(|| E::custom("price out of range"))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
            i64::try_from(v)
                .map_err(|_| E::custom("price out of range"))
                .and_then(|v| self.visit_i64(v))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
            Money::from_major_f64(v).ok_or_else(|| E::custom("price is not a finite number"))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
            Money::parse_decimal(v).ok_or_else(|| E::custom(format!("invalid price '{}'", v)))
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Priced {
        #[serde(with = "major_units")]
        price: Money,
    }

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // $0.10 at 5% = 0.5 cents → 1 cent
        assert_eq!(Money::from_cents(10).percentage(Percent::from_whole(5)).cents(), 1);
        // $0.09 at 5% = 0.45 cents → 0 cents
        assert_eq!(Money::from_cents(9).percentage(Percent::from_whole(5)).cents(), 0);
        // fractional rate: $100.00 at 12.5%
        assert_eq!(
            Money::from_cents(10_000).percentage(Percent::from_bps(1250)).cents(),
            1250
        );
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("10"), Some(Money::from_cents(1000)));
        assert_eq!(Money::parse_decimal("10.5"), Some(Money::from_cents(1050)));
        assert_eq!(Money::parse_decimal(".75"), Some(Money::from_cents(75)));
        assert_eq!(Money::parse_decimal("-2.25"), Some(Money::from_cents(-225)));
        assert_eq!(Money::parse_decimal("1.005"), Some(Money::from_cents(101)));
        assert_eq!(Money::parse_decimal(""), None);
        assert_eq!(Money::parse_decimal("."), None);
        assert_eq!(Money::parse_decimal("1.2.3"), None);
        assert_eq!(Money::parse_decimal("lamp"), None);
    }

    #[test]
    fn test_major_units_accepts_numbers_and_strings() {
        let from_int: Priced = serde_json::from_str(r#"{"price": 12}"#).unwrap();
        let from_float: Priced = serde_json::from_str(r#"{"price": 19.99}"#).unwrap();
        let from_str: Priced = serde_json::from_str(r#"{"price": "7.50"}"#).unwrap();

        assert_eq!(from_int.price.cents(), 1200);
        assert_eq!(from_float.price.cents(), 1999);
        assert_eq!(from_str.price.cents(), 750);

        assert!(serde_json::from_str::<Priced>(r#"{"price": "free"}"#).is_err());
    }

    #[test]
    fn test_major_units_serializes_as_decimal() {
        let whole = serde_json::to_string(&Priced { price: Money::from_cents(1200) }).unwrap();
        let fractional =
            serde_json::to_string(&Priced { price: Money::from_cents(1999) }).unwrap();

        assert_eq!(whole, r#"{"price":12}"#);
        assert_eq!(fractional, r#"{"price":19.99}"#);
    }
}
