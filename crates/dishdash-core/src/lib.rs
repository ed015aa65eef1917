//! # dishdash-core: Pure Pricing Logic for DishDash
//!
//! This crate holds the checkout pricing rules of the DishDash food-delivery
//! app as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        DishDash Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Mobile app (customer checkout)                  │   │
//! │  │    Pack screen ──► Cart ──► Promo code ──► Confirm order        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 dishdash-checkout (session, config)             │   │
//! │  │    proceed_to_cart, apply_promo_code, quote                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ dishdash-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌──────────┐  │   │
//! │  │   │   money   │  │ promotions │  │ assembler │  │ pricing  │  │   │
//! │  │   │   Money   │  │ evaluator  │  │ CartEntry │  │ totals   │  │   │
//! │  │   │ DiscRate  │  │   cache    │  │  id gen   │  │          │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK READS • NO GLOBAL STATE                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic, discount rates
//! - [`types`] - Domain types (PromoCode, MenuItem, OrderLine, CartEntry)
//! - [`promotions`] - Promotion validity, eligibility and discount math
//! - [`activity_cache`] - Caller-owned TTL cache of promotion activity
//! - [`records`] - Lenient ingestion of backend JSON records
//! - [`assembler`] - Pack/variant order assembly into cart entries
//! - [`pricing`] - Order totals after promotions
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: time is passed in as `now`, same input = same output
//! 2. **Degrade, don't fail**: bad upstream data yields inactive promotions,
//!    zero discounts and fallback prices instead of errors
//! 3. **Integer Money**: all monetary values are in the smallest currency unit
//! 4. **Explicit Errors**: caller mistakes are typed errors, never panics
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use dishdash_core::money::Money;
//! use dishdash_core::promotions::PromotionEvaluator;
//! use dishdash_core::types::{DiscountKind, PromoCode};
//!
//! let now = Utc::now();
//! let mut promo = PromoCode::new(
//!     "p-1",
//!     "SAVE200",
//!     DiscountKind::FixedAmount { amount: Money::from_cents(20_000) },
//!     now - Duration::days(1),
//!     now + Duration::days(1),
//! );
//! promo.maximum_discount_amount = Some(Money::from_cents(15_000));
//!
//! let evaluator = PromotionEvaluator::default();
//! let discount = evaluator.calculate_discount(&promo, Money::from_cents(100_000), now);
//! assert_eq!(discount.cents(), 15_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod activity_cache;
pub mod assembler;
pub mod error;
pub mod money;
pub mod pricing;
pub mod promotions;
pub mod records;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use activity_cache::ActivityCache;
pub use assembler::{AssemblerOptions, CartIdGenerator, OrderAssembler};
pub use error::{CoreError, CoreResult, RecordError, ValidationError};
pub use money::{DiscountRate, Money};
pub use pricing::OrderTotals;
pub use promotions::{
    AppliedPromotion, Ineligible, OrderContext, PromotionEvaluator, UsageLimitPolicy,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum cart entries produced by a single checkout.
pub const MAX_CART_ENTRIES: usize = 100;

/// Maximum quantity of a single order line.
///
/// ## Business Reason
/// Saved lines are expanded into one entry per unit, so the quantity bound
/// also bounds the size of the assembled cart.
pub const MAX_ITEM_QUANTITY: u32 = 99;

/// Price used when neither the saved line, the variant nor the menu item
/// carries a usable price (500.00 in the smallest currency unit).
pub const DEFAULT_PLACEHOLDER_PRICE: Money = Money::from_cents(50_000);
