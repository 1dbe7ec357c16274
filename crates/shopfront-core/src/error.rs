//! # Error Types
//!
//! Domain-specific error types for shopfront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopfront-core errors (this file)                                     │
//! │  ├── CoreError        - Cart and checkout rule violations              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopfront-db errors (separate crate)                                  │
//! │  └── DbError          - Local storage failures                         │
//! │                                                                         │
//! │  shopfront-api errors (separate crate)                                 │
//! │  └── BackendError     - REST backend failures                          │
//! │                                                                         │
//! │  App errors                                                            │
//! │  └── AppError         - What the user sees (code + message)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, field name, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every variant that can block checkout is raised BEFORE any network call

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core storefront errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout was attempted with no cart lines.
    #[error("The cart is empty")]
    EmptyCart,

    /// An action that needs a signed-in user ran without one.
    ///
    /// ## When This Occurs
    /// - Checkout with no stored email
    /// - Add to cart before logging in
    /// - Profile or admin edits before logging in
    #[error("No signed-in user; please log in first")]
    MissingIdentity,

    /// An admin-only action was attempted by a regular user.
    #[error("This action requires the admin role")]
    AdminOnly,

    /// The cart has no line with the given product id.
    #[error("Product {0} is not in the cart")]
    LineNotInCart(String),

    /// The random order generator found nothing to pick from.
    #[error("No active products are available")]
    NoActiveProducts,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A cart line id cannot be sent to the backend as a product id.
    #[error("Cart line '{0}' does not reference a valid product id")]
    InvalidLineId(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any backend call runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed email, unparsable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(CoreError::EmptyCart.to_string(), "The cart is empty");
        assert_eq!(
            CoreError::QuantityTooLarge { requested: 1000, max: 999 }.to_string(),
            "Quantity 1000 exceeds maximum allowed (999)"
        );
        assert_eq!(
            CoreError::LineNotInCart("7".to_string()).to_string(),
            "Product 7 is not in the cart"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(validation_err.to_string(), "email is required");

        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
