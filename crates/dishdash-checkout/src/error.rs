//! # Checkout Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Cart          │  │     Promotion           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Core           │  │  UnknownPromoCode       │ │
//! │  │  Io / Toml      │  │  (assembler)    │  │  Ineligible             │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use dishdash_core::{CoreError, Ineligible, ValidationError};
use thiserror::Error;

/// Result type alias for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;

/// Errors surfaced to the app by the checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid checkout configuration.
    #[error("Invalid checkout configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read or written.
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML.
    #[error("Failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// No path to save the config to.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Cart Errors
    // =========================================================================
    /// Cart assembly failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Promotion Errors
    // =========================================================================
    /// The typed code is malformed.
    #[error(transparent)]
    InvalidPromoCode(#[from] ValidationError),

    /// No promotion has this code.
    #[error("Unknown promo code: {0}")]
    UnknownPromoCode(String),

    /// The promotion exists but does not apply to this order.
    #[error("Promo code {code} cannot be used: {reason}")]
    Ineligible { code: String, reason: Ineligible },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CheckoutError::Ineligible {
            code: "SAVE".to_string(),
            reason: Ineligible::NotActive,
        };
        assert_eq!(
            err.to_string(),
            "Promo code SAVE cannot be used: Promotion is not active"
        );

        let err: CheckoutError = CoreError::NoLineForPaidDrinks.into();
        assert_eq!(
            err.to_string(),
            "Paid drinks need at least one order line to be billed on"
        );
    }
}
