//! # Order Totals
//!
//! What the checkout screen shows once the cart is assembled and a promotion
//! (maybe) applied.
//!
//! ```text
//! subtotal           Σ entry.unit_price × entry.quantity
//! - item discount    AppliedPromotion.item_discount, at most subtotal
//! + delivery fee
//! - delivery disc.   AppliedPromotion.delivery_discount, at most the fee
//! ─────────────────
//! = total            never negative
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::promotions::AppliedPromotion;
use crate::types::CartEntry;

/// Totals of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub item_discount: Money,
    pub delivery_fee: Money,
    pub delivery_discount: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Computes totals for `entries`.
    ///
    /// ## Example
    /// ```rust
    /// use dishdash_core::money::Money;
    /// use dishdash_core::pricing::OrderTotals;
    ///
    /// let totals = OrderTotals::compute(&[], Money::from_cents(2_000), None);
    /// assert_eq!(totals.total.cents(), 2_000);
    /// ```
    pub fn compute(
        entries: &[CartEntry],
        delivery_fee: Money,
        promotion: Option<&AppliedPromotion>,
    ) -> Self {
        let subtotal: Money = entries.iter().map(CartEntry::line_total).sum();
        let delivery_fee = delivery_fee.max(Money::zero());

        let (item_discount, delivery_discount) = match promotion {
            Some(applied) => (
                applied
                    .item_discount
                    .clamp_between(Money::zero(), subtotal),
                applied
                    .delivery_discount
                    .clamp_between(Money::zero(), delivery_fee),
            ),
            None => (Money::zero(), Money::zero()),
        };

        let total = (subtotal - item_discount + delivery_fee - delivery_discount).max(Money::zero());

        OrderTotals {
            subtotal,
            item_discount,
            delivery_fee,
            delivery_discount,
            total,
        }
    }

    /// Everything discounted.
    pub fn savings(&self) -> Money {
        self.item_discount + self.delivery_discount
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
