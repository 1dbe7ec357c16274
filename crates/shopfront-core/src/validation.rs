//! # Validation Module
//!
//! Input validation for account forms and admin edit buffers.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI parsing (clap)                                           │
//! │  ├── Types: ids are integers, prices parse as Money                    │
//! │  └── Immediate usage errors                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, ranges                                  │
//! │  └── Runs before any backend call                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Storefront backend                                           │
//! │  └── Authoritative checks (duplicate email, credentials, ...)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Percent;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound accepted for free-text fields.
const MAX_TEXT_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates that a field is present and not absurdly long.
///
/// ## Returns
/// The trimmed value.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LEN,
        });
    }

    Ok(value.to_string())
}

/// Validates an email address.
///
/// ## Rules
/// - Required
/// - Exactly one `@`, with a non-empty local part and a dotted domain
///
/// ## Example
/// ```rust
/// use shopfront_core::validation::validate_email;
///
/// assert!(validate_email("ana@shop.test").is_ok());
/// assert!(validate_email("ana.shop.test").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_required("email", email)?;

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };

    if !valid || email.contains(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected an address like name@example.com".to_string(),
        });
    }

    Ok(email)
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all products)
/// - Maximum 100 characters
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an admin-entered price (zero is allowed, negative is not).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX / 100,
        });
    }
    Ok(())
}

/// Validates an admin-entered stock level.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a discount percentage entered by an admin (0% to 100%).
pub fn validate_discount_percentage(pct: Percent) -> ValidationResult<()> {
    if pct > Percent::from_whole(100) {
        return Err(ValidationError::OutOfRange {
            field: "discountPercentage".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Validates that a discount window does not end before it starts.
pub fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> ValidationResult<()> {
    if end < start {
        return Err(ValidationError::InvalidFormat {
            field: "endDate".to_string(),
            reason: "must not be before startDate".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_validate_required() {
        assert_eq!(validate_required("name", "  Ana ").unwrap(), "Ana");
        assert!(matches!(
            validate_required("name", "   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_required("name", &"x".repeat(201)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" ana@shop.test ").unwrap(), "ana@shop.test");
        assert!(validate_email("").is_err());
        assert!(validate_email("@shop.test").is_err());
        assert!(validate_email("ana@shop").is_err());
        assert!(validate_email("ana@@shop.test").is_err());
        assert!(validate_email("a na@shop.test").is_err());
    }

    #[test]
    fn test_numeric_validators() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-3).is_err());
        assert!(validate_discount_percentage(Percent::from_whole(100)).is_ok());
        assert!(validate_discount_percentage(Percent::from_bps(10_001)).is_err());
    }

    #[test]
    fn test_validate_window() {
        let start = Utc::now();
        assert!(validate_window(start, start).is_ok());
        assert!(validate_window(start, start + Duration::days(1)).is_ok());
        assert!(validate_window(start, start - Duration::seconds(1)).is_err());
    }
}
