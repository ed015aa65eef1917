//! # Promotion Evaluator
//!
//! Validity, eligibility and discount math for promo codes.
//!
//! ## Evaluation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Applying a promo code                                │
//! │                                                                         │
//! │  is_active ── status == active                                         │
//! │      │        now ∈ [valid_from, valid_until)                           │
//! │      │        used_count < usage_limit (zero per UsageLimitPolicy)      │
//! │      ▼                                                                  │
//! │  check_eligibility ── restaurant scope, per-user limit,                 │
//! │      │                minimum order, allow-lists                        │
//! │      ▼                                                                  │
//! │  calculate_discount ── by DiscountKind, capped, clamped to [0, amount] │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  AppliedPromotion { item_discount, delivery_discount }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is pure: `used_count` is only read. Incrementing it is the
//! backend's order-finalization job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CartEntry, DiscountKind, MenuItem, PromoCode, PromoStatus};

// =============================================================================
// Usage Limit Policy
// =============================================================================

/// How a usage or per-user limit of zero is read.
///
/// The backend has stored `0` both for "no limit" and for "no redemptions
/// left". The deployment picks one reading explicitly, and it applies to
/// both `usage_limit` and `per_user_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageLimitPolicy {
    /// A limit of `0` means unlimited.
    #[default]
    #[serde(alias = "unlimited")]
    ZeroIsUnlimited,
    /// A limit of `0` means no redemptions are allowed.
    #[serde(alias = "exhausted")]
    ZeroIsExhausted,
}

impl UsageLimitPolicy {
    /// Checks whether another redemption fits under `limit`.
    pub fn allows(&self, limit: Option<u32>, used: u32) -> bool {
        match limit {
            None => true,
            Some(0) => *self == UsageLimitPolicy::ZeroIsUnlimited,
            Some(limit) => used < limit,
        }
    }
}

// =============================================================================
// Order Context
// =============================================================================

/// One order line as the evaluator sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextLine {
    pub menu_item_id: String,
    pub category_id: Option<String>,
    pub line_total: Money,
}

/// The order a promotion is evaluated against.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderContext {
    pub restaurant_id: String,
    pub subtotal: Money,
    pub lines: Vec<ContextLine>,
    /// How many times this customer already redeemed the promotion.
    pub prior_uses: u32,
}

impl OrderContext {
    /// Builds a context for a plain amount with no line detail.
    pub fn for_amount(restaurant_id: impl Into<String>, subtotal: Money) -> Self {
        OrderContext {
            restaurant_id: restaurant_id.into(),
            subtotal,
            lines: Vec::new(),
            prior_uses: 0,
        }
    }

    /// Builds a context from assembled cart entries.
    ///
    /// Categories are looked up in `menu`; entries whose item is not on the
    /// menu carry no category.
    pub fn from_entries(
        restaurant_id: impl Into<String>,
        entries: &[CartEntry],
        menu: &[MenuItem],
        prior_uses: u32,
    ) -> Self {
        let lines: Vec<ContextLine> = entries
            .iter()
            .map(|entry| ContextLine {
                menu_item_id: entry.menu_item_id.clone(),
                category_id: menu
                    .iter()
                    .find(|item| item.id == entry.menu_item_id)
                    .and_then(|item| item.category_id.clone()),
                line_total: entry.line_total(),
            })
            .collect();

        OrderContext {
            restaurant_id: restaurant_id.into(),
            subtotal: lines.iter().map(|line| line.line_total).sum(),
            lines,
            prior_uses,
        }
    }

    /// Part of the subtotal the promotion's allow-lists cover.
    ///
    /// Without allow-lists, or without line detail, the whole subtotal.
    pub fn applicable_subtotal(&self, promo: &PromoCode) -> Money {
        if !promo.has_allow_list() || self.lines.is_empty() {
            return self.subtotal;
        }
        self.lines
            .iter()
            .filter(|line| promo.covers(&line.menu_item_id, line.category_id.as_deref()))
            .map(|line| line.line_total)
            .sum()
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Why a promotion does not apply to an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Ineligible {
    #[error("Promotion is not active")]
    NotActive,

    #[error("Promotion is not valid at this restaurant")]
    WrongRestaurant,

    #[error("Promotion already used the maximum of {limit} times")]
    PerUserLimitReached { limit: u32 },

    #[error("Order must be at least {minimum} to use this promotion")]
    BelowMinimumOrder { minimum: Money },

    #[error("No item in the order qualifies for this promotion")]
    NoApplicableItems,
}

/// A promotion applied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedPromotion {
    pub promo_id: String,
    pub code: String,
    pub kind: DiscountKind,
    /// Discount on the item subtotal.
    pub item_discount: Money,
    /// Discount on the delivery fee.
    pub delivery_discount: Money,
}

impl AppliedPromotion {
    /// Everything the customer saves with this promotion.
    pub fn total_saving(&self) -> Money {
        self.item_discount + self.delivery_discount
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Evaluates promotions under a fixed usage-limit policy.
///
/// Stateless apart from the policy; cheap to copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromotionEvaluator {
    policy: UsageLimitPolicy,
}

impl PromotionEvaluator {
    pub fn new(policy: UsageLimitPolicy) -> Self {
        PromotionEvaluator { policy }
    }

    pub fn policy(&self) -> UsageLimitPolicy {
        self.policy
    }

    /// Checks whether a promotion can be used at `now`.
    ///
    /// A promotion with a missing (or unparseable) window bound is never
    /// active.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{Duration, Utc};
    /// use dishdash_core::promotions::PromotionEvaluator;
    /// use dishdash_core::types::{DiscountKind, PromoCode};
    ///
    /// let now = Utc::now();
    /// let expired = PromoCode::new(
    ///     "p-1",
    ///     "OLD",
    ///     DiscountKind::FreeDelivery,
    ///     now - Duration::days(10),
    ///     now - Duration::days(1),
    /// );
    /// assert!(!PromotionEvaluator::default().is_active(&expired, now));
    /// ```
    pub fn is_active(&self, promo: &PromoCode, now: DateTime<Utc>) -> bool {
        if promo.status != PromoStatus::Active {
            return false;
        }

        let (Some(from), Some(until)) = (promo.valid_from, promo.valid_until) else {
            return false;
        };
        if now < from || now >= until {
            return false;
        }

        self.policy.allows(promo.usage_limit, promo.used_count)
    }

    /// Discount on `order_amount`, always within `[0, order_amount]`.
    ///
    /// Inactive promotions, free delivery and buy-one-get-one give zero here.
    /// The minimum order amount is an eligibility rule, see
    /// [`check_eligibility`](Self::check_eligibility).
    pub fn calculate_discount(
        &self,
        promo: &PromoCode,
        order_amount: Money,
        now: DateTime<Utc>,
    ) -> Money {
        if !self.is_active(promo, now) {
            return Money::zero();
        }
        discount_on(promo, order_amount)
    }

    /// Checks every rule besides the discount math.
    pub fn check_eligibility(
        &self,
        promo: &PromoCode,
        ctx: &OrderContext,
        now: DateTime<Utc>,
    ) -> Result<(), Ineligible> {
        check_rules(promo, ctx, self.is_active(promo, now), self.policy)
    }

    /// Applies a promotion to an order with the given delivery fee.
    pub fn apply(
        &self,
        promo: &PromoCode,
        ctx: &OrderContext,
        delivery_fee: Money,
        now: DateTime<Utc>,
    ) -> Result<AppliedPromotion, Ineligible> {
        self.apply_with_activity(promo, ctx, delivery_fee, self.is_active(promo, now))
    }

    /// Like [`apply`](Self::apply), with activity decided by the caller
    /// (typically an [`ActivityCache`](crate::activity_cache::ActivityCache)).
    pub fn apply_with_activity(
        &self,
        promo: &PromoCode,
        ctx: &OrderContext,
        delivery_fee: Money,
        active: bool,
    ) -> Result<AppliedPromotion, Ineligible> {
        check_rules(promo, ctx, active, self.policy)?;

        let delivery_discount = match promo.discount {
            DiscountKind::FreeDelivery => delivery_fee.max(Money::zero()),
            _ => Money::zero(),
        };

        Ok(AppliedPromotion {
            promo_id: promo.id.clone(),
            code: promo.code.clone(),
            kind: promo.discount,
            item_discount: discount_on(promo, ctx.applicable_subtotal(promo)),
            delivery_discount,
        })
    }

    /// Public, active promotions usable at `restaurant_id`, for the offers list.
    pub fn visible_promotions<'a>(
        &self,
        promos: &'a [PromoCode],
        restaurant_id: &str,
        now: DateTime<Utc>,
    ) -> Vec<&'a PromoCode> {
        promos
            .iter()
            .filter(|promo| promo.is_listed_at(restaurant_id))
            .filter(|promo| self.is_active(promo, now))
            .collect()
    }

    /// The eligible promotion saving the customer the most.
    ///
    /// Ties go to the promotion listed first.
    pub fn best_promotion(
        &self,
        promos: &[PromoCode],
        ctx: &OrderContext,
        delivery_fee: Money,
        now: DateTime<Utc>,
    ) -> Option<AppliedPromotion> {
        promos
            .iter()
            .filter_map(|promo| self.apply(promo, ctx, delivery_fee, now).ok())
            .fold(None, |best: Option<AppliedPromotion>, candidate| match best {
                Some(current) if current.total_saving() >= candidate.total_saving() => {
                    Some(current)
                }
                _ => Some(candidate),
            })
    }
}

/// Finds a promotion by the code the customer typed.
///
/// Surrounding whitespace and letter case are ignored.
pub fn find_by_code<'a>(promos: &'a [PromoCode], code: &str) -> Option<&'a PromoCode> {
    let wanted = code.trim();
    promos
        .iter()
        .find(|promo| promo.code.trim().eq_ignore_ascii_case(wanted))
}

// =============================================================================
// Rules
// =============================================================================

fn check_rules(
    promo: &PromoCode,
    ctx: &OrderContext,
    active: bool,
    policy: UsageLimitPolicy,
) -> Result<(), Ineligible> {
    if !active {
        return Err(Ineligible::NotActive);
    }

    if !promo.is_scoped_to(&ctx.restaurant_id) {
        return Err(Ineligible::WrongRestaurant);
    }

    if let Some(limit) = promo.per_user_limit {
        if !policy.allows(Some(limit), ctx.prior_uses) {
            return Err(Ineligible::PerUserLimitReached { limit });
        }
    }

    if ctx.subtotal < promo.minimum_order_amount {
        return Err(Ineligible::BelowMinimumOrder {
            minimum: promo.minimum_order_amount,
        });
    }

    if promo.has_allow_list()
        && !ctx.lines.is_empty()
        && !ctx
            .lines
            .iter()
            .any(|line| promo.covers(&line.menu_item_id, line.category_id.as_deref()))
    {
        return Err(Ineligible::NoApplicableItems);
    }

    Ok(())
}

/// Subtotal discount by kind, ignoring activity.
fn discount_on(promo: &PromoCode, order_amount: Money) -> Money {
    if !order_amount.is_positive() {
        return Money::zero();
    }

    let raw = match promo.discount {
        DiscountKind::Percentage { rate } => order_amount.percentage_of(rate),
        DiscountKind::FixedAmount { amount } => amount,
        DiscountKind::FreeDelivery | DiscountKind::BuyOneGetOne => Money::zero(),
    };

    let capped = match promo.maximum_discount_amount {
        Some(cap) => raw.min(cap),
        None => raw,
    };

    capped.clamp_between(Money::zero(), order_amount)
}

// =============================================================================
// Unit Tests
// =============================================================================
