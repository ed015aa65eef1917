//! # Validation Module
//!
//! Input validation for checkout operations.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Layer 1: Mobile app                                                    │
//! │  └── quantity steppers, code input length                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── caller mistakes become ValidationError                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Managed backend                                              │
//! │  └── authoritative checks at order creation                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Upstream data defects are NOT validated here; they degrade (see
//! [`crate::records`]).

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest promo code accepted from the input field.
pub const MAX_PROMO_CODE_LEN: usize = 32;

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY
///
/// ```rust
/// use dishdash_core::validation::validate_quantity;
///
/// assert!(validate_quantity(3).is_ok());
/// assert!(validate_quantity(0).is_err());
/// ```
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(())
}

/// Validates a promo code typed by the customer and returns it trimmed.
///
/// ## Rules
/// - Must not be empty
/// - At most 32 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use dishdash_core::validation::validate_promo_code_format;
///
/// assert_eq!(validate_promo_code_format(" SAVE-10 ").unwrap(), "SAVE-10");
/// assert!(validate_promo_code_format("SAVE 10").is_err());
/// ```
pub fn validate_promo_code_format(code: &str) -> ValidationResult<&str> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "promo code".to_string(),
        });
    }

    if code.chars().count() > MAX_PROMO_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "promo code".to_string(),
            max: MAX_PROMO_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "promo code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(code)
}

/// Validates a price. Zero is allowed (free items).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the number of cart entries against `max`.
pub fn validate_cart_size(entries: usize, max: usize) -> ValidationResult<()> {
    if entries > max {
        return Err(ValidationError::OutOfRange {
            field: "cart entries".to_string(),
            min: 0,
            max: i64::try_from(max).unwrap_or(i64::MAX),
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

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_promo_code_format() {
        assert_eq!(validate_promo_code_format("save_10").unwrap(), "save_10");
        assert!(validate_promo_code_format("").is_err());
        assert!(validate_promo_code_format("   ").is_err());
        assert!(validate_promo_code_format("50%OFF").is_err());
        assert!(validate_promo_code_format(&"A".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(15_000)).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_cart_size() {
        assert!(validate_cart_size(100, 100).is_ok());
        assert!(validate_cart_size(101, 100).is_err());
    }
}
