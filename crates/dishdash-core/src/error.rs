//! # Error Types
//!
//! Domain-specific error types for dishdash-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dishdash-core errors (this file)                                      │
//! │  ├── CoreError        - Caller mistakes during cart assembly           │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── RecordError      - Backend records that cannot be identified      │
//! │                                                                         │
//! │  promotions::Ineligible - why a promotion does not apply (a value the   │
//! │                           UI renders, not a failure)                    │
//! │                                                                         │
//! │  dishdash-checkout errors (separate crate)                             │
//! │  └── CheckoutError    - What the app sees                              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → App               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! Upstream data defects (malformed dates, non-numeric strings, missing
//! prices) degrade to safe values: inactive promotion, zero discount,
//! fallback price. Checkout availability comes first.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Paid drinks were selected but there is no order line to bill them on.
    ///
    /// ## When This Occurs
    /// ```text
    /// Pack screen: user picks 1 paid soda, quantity stepper at 0,
    ///              no saved draft lines
    ///      │
    ///      ▼
    /// proceed_to_cart() → NoLineForPaidDrinks
    ///      │
    ///      ▼
    /// UI shows: "Select at least one item"
    /// ```
    #[error("Paid drinks need at least one order line to be billed on")]
    NoLineForPaidDrinks,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Record error (wraps RecordError).
    #[error("Record error: {0}")]
    Record(#[from] RecordError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
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

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Record Error
// =============================================================================

/// Errors raised while ingesting backend JSON records.
///
/// Only identity problems are errors. Everything else degrades.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record is not a JSON object.
    #[error("{kind} record is not a JSON object")]
    NotAnObject { kind: &'static str },

    /// A field needed to reference the record is missing or empty.
    #[error("{kind} record is missing `{field}`")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
