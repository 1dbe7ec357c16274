//! # Domain Types
//!
//! Entities exchanged with the storefront backend, plus the request bodies
//! the client sends to it.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  sale_id (FK)   │       │
//! │  │  name, price    │   │  person_email   │   │  product_id     │       │
//! │  │  stock          │   │  discount (%)   │   │  quantity       │       │
//! │  │  is_active      │   │  created_at     │   │  unit_price     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Person       │   │    Discount     │   │    Percent      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  email (key)    │   │  start_date     │   │  bps (u32)      │       │
//! │  │  role           │   │  end_date       │   │  1000 = 10%     │       │
//! │  │  is_frequent_.. │   │  discount_avg   │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Field Naming
//! The backend is not consistent: persons and products use camelCase
//! (`isActive`, `isFrequentCustomer`), discounts answer in snake_case
//! (`start_date`, `discount_avg`) but accept camelCase updates, and sale
//! lines mix both (`product_id` next to `unitPrice`). Each type below pins
//! its own wire names instead of relying on one global convention.

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::{major_units, Money};

// =============================================================================
// Percent
// =============================================================================

/// A percentage represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01%. Admins may enter fractional discount rates
/// (12.5%), so whole percents are not enough, and floats are not allowed
/// anywhere near money.
///
/// On the wire a `Percent` is a plain JSON number in percent units
/// (`15`, `12.5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percent(u32);

impl Percent {
    /// Creates a percent from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percent from a whole number of percent.
    #[inline]
    pub const fn from_whole(pct: u32) -> Self {
        Percent(pct * 100)
    }

    /// Creates a percent from a float, rounded to the nearest basis point.
    ///
    /// Returns `None` for negative or non-finite input.
    pub fn from_percentage(pct: f64) -> Option<Self> {
        if !pct.is_finite() || pct < 0.0 {
            return None;
        }
        let bps = (pct * 100.0).round();
        if bps > u32::MAX as f64 {
            return None;
        }
        Some(Percent(bps as u32))
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero percent.
    #[inline]
    pub const fn zero() -> Self {
        Percent(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns the rate as a float (for display and the wire only).
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Add for Percent {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Percent(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / 100;
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}%", whole)
        } else if frac % 10 == 0 {
            write!(f, "{}.{}%", whole, frac / 10)
        } else {
            write!(f, "{}.{:02}%", whole, frac)
        }
    }
}

impl FromStr for Percent {
    type Err = ValidationError;

    /// Parses `"15"`, `"12.5"` or `"15%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%').trim();
        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Percent::from_percentage)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "percentage".to_string(),
                reason: format!("'{}' is not a non-negative number", s),
            })
    }
}

impl Serialize for Percent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 100 == 0 {
            serializer.serialize_u32(self.0 / 100)
        } else {
            serializer.serialize_f64(self.as_f64())
        }
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PercentVisitor;

        impl<'de> Visitor<'de> for PercentVisitor {
            type Value = Percent;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative percentage")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Percent, E> {
                u32::try_from(v)
                    .ok()
                    .and_then(|v| v.checked_mul(100))
                    .map(Percent::from_bps)
                    .ok_or_else(|| E::custom("percentage out of range"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Percent, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom("percentage must not be negative"))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Percent, E> {
                Percent::from_percentage(v).ok_or_else(|| E::custom("invalid percentage"))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Percent, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PercentVisitor)
    }
}

// =============================================================================
// Timestamps
// =============================================================================

/// Lenient timestamp decoding for backend dates.
///
/// The backend emits RFC 3339 (`2025-03-01T00:00:00Z`), zone-less local
/// datetimes (`2025-03-01T00:00:00`), or bare dates (`2025-03-01`). The last
/// two are taken as UTC. Encoding is always RFC 3339.
pub mod timestamp {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Parses any of the accepted timestamp shapes.
    pub fn parse(input: &str) -> Option<DateTime<Utc>> {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
    }

    /// Same as the parent module for optional fields.
    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(deserializer)?;
            match raw {
                None => Ok(None),
                Some(raw) => super::parse(&raw).map(Some).ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid timestamp '{}'", raw))
                }),
            }
        }
    }
}

// =============================================================================
// Role
// =============================================================================

/// Access role of a person. Admins get the edit forms and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(ValidationError::NotAllowed {
                field: "role".to_string(),
                allowed: vec!["user".to_string(), "admin".to_string()],
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the backend catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Current price; frozen into the cart line when added.
    #[serde(with = "major_units")]
    pub price: Money,

    #[serde(default)]
    pub stock: i64,

    /// Missing on the wire decodes as `false`.
    #[serde(default)]
    pub is_active: bool,

    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Admin who last edited the product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by_email: Option<String>,
}

/// A product row from the top-sellers ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSellingProduct {
    #[serde(flatten)]
    pub product: Product,

    pub total_sold: i64,
}

// =============================================================================
// Person
// =============================================================================

/// A registered person (customer or admin), keyed by email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub email: String,

    pub name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub is_frequent_customer: bool,

    #[serde(default)]
    pub role: Role,

    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A row of the frequent-customer ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequentCustomer {
    pub email: String,

    #[serde(default)]
    pub name: String,

    /// Ranking metric computed by the backend; display only.
    #[serde(default)]
    pub avg_sales: f64,
}

/// The identity kept in local storage after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: String,
    pub role: Role,
    pub email: String,
}

// =============================================================================
// Discount
// =============================================================================

/// A recurring site-wide discount with an activity window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: i64,

    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,

    #[serde(with = "timestamp")]
    pub end_date: DateTime<Utc>,

    /// Percentage taken off every cart while the window is open.
    pub discount_avg: Percent,
}

impl Discount {
    /// Checks whether `now` falls inside `[start_date, end_date]`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.start_date <= now && now <= self.end_date
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale header created at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_email: Option<String>,

    /// Total discount percent applied when the sale was placed.
    #[serde(default)]
    pub discount: Percent,

    #[serde(default, with = "timestamp::option", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One line item of a sale.
///
/// Serves as both the create request body and the response row of
/// `sale-products/sale/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<i64>,

    pub product_id: i64,

    pub quantity: i64,

    /// Price frozen from the cart at checkout time.
    #[serde(rename = "unitPrice", with = "major_units")]
    pub unit_price: Money,
}

impl SaleLine {
    /// Returns the line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Request Bodies
// =============================================================================

/// `POST /sales` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub person_email: String,
    pub discount: Percent,
}

/// `POST /sales` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedSale {
    pub id: i64,
}

/// `POST /persons/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /persons/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub person: LoginPerson,
    pub role: Role,
}

/// The subset of the person record returned by login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPerson {
    pub name: String,
    pub email: String,
}

/// `POST /persons` body. New accounts are always plain users.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub is_frequent_customer: bool,
    pub role: Role,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        address: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Registration {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            address: address.into(),
            phone: phone.into(),
            is_frequent_customer: false,
            role: Role::User,
        }
    }
}

/// `PUT /products/{id}` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    #[serde(with = "major_units")]
    pub price: Money,
    pub stock: i64,
    pub is_active: bool,
    pub updated_by_email: String,
}

/// `PUT /persons/{email}` body. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_frequent_customer: Option<bool>,
    pub role: Role,
}

/// `PUT /discounts/{id}` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountUpdate {
    #[serde(with = "timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub end_date: DateTime<Utc>,
    pub discount_percentage: Percent,
}

// =============================================================================
// Unit Tests
// =============================================================================
