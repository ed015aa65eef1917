//! # Checkout Session
//!
//! One customer's path from the pack screen to a priced order.
//!
//! ```text
//! ┌──────────────┐   proceed_to_cart   ┌──────────────┐
//! │ saved lines  │ ──────────────────► │ cart entries │
//! │ + selection  │   (assembler)       └──────┬───────┘
//! └──────────────┘                            │ OrderContext
//!                                             ▼
//!                     apply_promo_code ┌──────────────────┐
//!      typed code ───────────────────► │ AppliedPromotion │
//!      (format, lookup, cached         └────────┬─────────┘
//!       activity, eligibility)                  │
//!                                               ▼
//!                                  quote ──► OrderTotals
//! ```
//!
//! The session is the only place that reads the wall clock. Every
//! operation has an `*_at(now)` twin taking the time explicitly.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use dishdash_core::assembler::{CartIdGenerator, OrderAssembler};
use dishdash_core::promotions::find_by_code;
use dishdash_core::validation::validate_promo_code_format;
use dishdash_core::{
    ActivityCache, AppliedPromotion, CartEntry, CurrentSelection, MenuItem, Money, OrderContext,
    OrderLine, OrderTotals, PromoCode, PromotionEvaluator,
};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult};

/// Checkout state for one customer.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    config: CheckoutConfig,
    evaluator: PromotionEvaluator,
    activity: ActivityCache,
    ids: CartIdGenerator,
    delivery_fee: Money,
}

impl CheckoutSession {
    pub fn new(config: CheckoutConfig) -> Self {
        Self::with_id_generator(config, CartIdGenerator::new())
    }

    /// Creates a session with a caller-supplied id generator.
    pub fn with_id_generator(config: CheckoutConfig, ids: CartIdGenerator) -> Self {
        CheckoutSession {
            evaluator: PromotionEvaluator::new(config.usage_limit_policy()),
            activity: ActivityCache::new(config.activity_ttl()),
            delivery_fee: config.default_delivery_fee(),
            ids,
            config,
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub fn delivery_fee(&self) -> Money {
        self.delivery_fee
    }

    /// Sets the delivery fee of the restaurant being ordered from.
    pub fn set_delivery_fee(&mut self, fee: Money) {
        self.delivery_fee = fee.max(Money::zero());
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Turns saved lines plus the current selection into cart entries.
    pub fn proceed_to_cart(
        &mut self,
        menu: &[MenuItem],
        saved: &[OrderLine],
        current: &CurrentSelection,
    ) -> CheckoutResult<Vec<CartEntry>> {
        self.proceed_to_cart_at(menu, saved, current, Utc::now())
    }

    pub fn proceed_to_cart_at(
        &mut self,
        menu: &[MenuItem],
        saved: &[OrderLine],
        current: &CurrentSelection,
        now: DateTime<Utc>,
    ) -> CheckoutResult<Vec<CartEntry>> {
        let assembler = OrderAssembler::new(menu, self.config.assembler_options());
        let entries = assembler.assemble(saved, current, now, &mut self.ids)?;

        info!(
            saved_lines = saved.len(),
            entries = entries.len(),
            menu_item_id = %current.menu_item_id,
            "Cart assembled"
        );
        Ok(entries)
    }

    // =========================================================================
    // Promotions
    // =========================================================================

    /// Applies the code the customer typed to `ctx`.
    ///
    /// ## Errors
    /// - `InvalidPromoCode` when the code is malformed
    /// - `UnknownPromoCode` when no promotion has this code
    /// - `Ineligible` when the promotion does not apply to this order
    pub fn apply_promo_code(
        &mut self,
        code: &str,
        promos: &[PromoCode],
        ctx: &OrderContext,
    ) -> CheckoutResult<AppliedPromotion> {
        self.apply_promo_code_at(code, promos, ctx, Utc::now())
    }

    pub fn apply_promo_code_at(
        &mut self,
        code: &str,
        promos: &[PromoCode],
        ctx: &OrderContext,
        now: DateTime<Utc>,
    ) -> CheckoutResult<AppliedPromotion> {
        let code = validate_promo_code_format(code)?;

        let promo = find_by_code(promos, code).ok_or_else(|| {
            debug!(code, "Promo code not found");
            CheckoutError::UnknownPromoCode(code.to_string())
        })?;

        let active = self.activity.is_active(&self.evaluator, promo, now);
        let applied = self
            .evaluator
            .apply_with_activity(promo, ctx, self.delivery_fee, active)
            .map_err(|reason| {
                debug!(code, promo_id = %promo.id, %reason, "Promo code rejected");
                CheckoutError::Ineligible {
                    code: promo.code.clone(),
                    reason,
                }
            })?;

        info!(
            code = %applied.code,
            promo_id = %applied.promo_id,
            item_discount = %applied.item_discount,
            delivery_discount = %applied.delivery_discount,
            "Promo code applied"
        );
        Ok(applied)
    }

    /// Public promotions currently usable at `restaurant_id`.
    pub fn available_promotions<'a>(
        &mut self,
        promos: &'a [PromoCode],
        restaurant_id: &str,
    ) -> Vec<&'a PromoCode> {
        self.available_promotions_at(promos, restaurant_id, Utc::now())
    }

    pub fn available_promotions_at<'a>(
        &mut self,
        promos: &'a [PromoCode],
        restaurant_id: &str,
        now: DateTime<Utc>,
    ) -> Vec<&'a PromoCode> {
        promos
            .iter()
            .filter(|promo| promo.is_listed_at(restaurant_id))
            .filter(|promo| self.activity.is_active(&self.evaluator, promo, now))
            .collect()
    }

    /// Forgets the cached activity of a promotion whose record changed.
    pub fn invalidate_promotion(&mut self, promo_id: &str) {
        self.activity.invalidate(promo_id);
    }

    // =========================================================================
    // Totals
    // =========================================================================

    /// Totals for `entries` with the session's delivery fee.
    pub fn quote(&self, entries: &[CartEntry], promo: Option<&AppliedPromotion>) -> OrderTotals {
        OrderTotals::compute(entries, self.delivery_fee, promo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use dishdash_core::{DiscountKind, DiscountRate, Ineligible, PromoStatus, UsageLimitPolicy};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn promo(id: &str, code: &str, discount: DiscountKind) -> PromoCode {
        PromoCode::new(
            id,
            code,
            discount,
            now() - Duration::days(1),
            now() + Duration::days(1),
        )
    }

    fn menu() -> Vec<MenuItem> {
        vec![MenuItem::new("duo", "Duo pack", Money::from_cents(65_000))]
    }

    fn session() -> CheckoutSession {
        CheckoutSession::with_id_generator(CheckoutConfig::default(), CartIdGenerator::with_seed(7))
    }

    #[test]
    fn test_proceed_to_cart_uses_config_limits() {
        let mut config = CheckoutConfig::default();
        config.limits.max_cart_entries = 2;
        let mut session = CheckoutSession::with_id_generator(config, CartIdGenerator::with_seed(1));

        let saved = vec![OrderLine {
            menu_item_id: "duo".to_string(),
            quantity: 3,
            ..OrderLine::default()
        }];
        let current = CurrentSelection {
            menu_item_id: "duo".to_string(),
            ..CurrentSelection::default()
        };

        let result = session.proceed_to_cart_at(&menu(), &saved, &current, now());
        assert!(matches!(
            result,
            Err(CheckoutError::Core(dishdash_core::CoreError::Validation(
                dishdash_core::ValidationError::OutOfRange { max: 2, .. }
            )))
        ));
    }

    #[test]
    fn test_proceed_to_cart_falls_back_to_configured_placeholder() {
        let mut config = CheckoutConfig::default();
        config.pricing.placeholder_price = 12_300;
        let mut session = CheckoutSession::with_id_generator(config, CartIdGenerator::with_seed(1));

        let current = CurrentSelection {
            menu_item_id: "unknown".to_string(),
            quantity: 1,
            ..CurrentSelection::default()
        };
        let entries = session.proceed_to_cart_at(&[], &[], &current, now()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].unit_price.cents(), 12_300);
    }

    #[test]
    fn test_apply_promo_code() {
        let mut session = session();
        let promos = vec![promo(
            "p-1",
            "TENOFF",
            DiscountKind::Percentage {
                rate: DiscountRate::from_percentage(10.0),
            },
        )];
        let ctx = OrderContext::for_amount("r-1", Money::from_cents(100_000));

        let applied = session
            .apply_promo_code_at("  tenoff ", &promos, &ctx, now())
            .unwrap();
        assert_eq!(applied.promo_id, "p-1");
        assert_eq!(applied.item_discount.cents(), 10_000);
    }

    #[test]
    fn test_apply_promo_code_errors() {
        let mut session = session();
        let mut expired = promo("p-2", "OLD", DiscountKind::FreeDelivery);
        expired.valid_until = Some(now() - Duration::hours(1));
        let promos = vec![expired];
        let ctx = OrderContext::for_amount("r-1", Money::from_cents(100_000));

        assert!(matches!(
            session.apply_promo_code_at("", &promos, &ctx, now()),
            Err(CheckoutError::InvalidPromoCode(_))
        ));
        assert!(matches!(
            session.apply_promo_code_at("NOPE", &promos, &ctx, now()),
            Err(CheckoutError::UnknownPromoCode(code)) if code == "NOPE"
        ));
        assert!(matches!(
            session.apply_promo_code_at("old", &promos, &ctx, now()),
            Err(CheckoutError::Ineligible { reason: Ineligible::NotActive, .. })
        ));
    }

    #[test]
    fn test_code_is_rejected_once_window_closes() {
        let mut session = session();
        let mut closing = promo("p-1", "LASTCALL", DiscountKind::FreeDelivery);
        let ends = now() + Duration::seconds(5);
        closing.valid_until = Some(ends);
        let promos = vec![closing];
        let ctx = OrderContext::for_amount("r-1", Money::from_cents(100_000));

        // Warms the activity cache with an "active" answer
        assert!(session.apply_promo_code_at("LASTCALL", &promos, &ctx, now()).is_ok());
        assert_eq!(session.available_promotions_at(&promos, "r-1", now()).len(), 1);

        // Well within the cache TTL, but past the end of the window
        let after = ends + Duration::seconds(1);
        assert!(matches!(
            session.apply_promo_code_at("LASTCALL", &promos, &ctx, after),
            Err(CheckoutError::Ineligible { reason: Ineligible::NotActive, .. })
        ));
        assert!(session.available_promotions_at(&promos, "r-1", after).is_empty());
    }

    #[test]
    fn test_free_delivery_uses_session_fee() {
        let mut session = session();
        session.set_delivery_fee(Money::from_cents(20_000));
        let promos = vec![promo("p-1", "SHIPFREE", DiscountKind::FreeDelivery)];
        let ctx = OrderContext::for_amount("r-1", Money::from_cents(100_000));

        let applied = session
            .apply_promo_code_at("SHIPFREE", &promos, &ctx, now())
            .unwrap();
        assert!(applied.item_discount.is_zero());
        assert_eq!(applied.delivery_discount.cents(), 20_000);

        let totals = session.quote(&[], Some(&applied));
        assert_eq!(totals.delivery_fee.cents(), 20_000);
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_usage_limit_policy_comes_from_config() {
        let mut exhausted = promo(
            "p-1",
            "ZERO",
            DiscountKind::FixedAmount {
                amount: Money::from_cents(1_000),
            },
        );
        exhausted.usage_limit = Some(0);
        let promos = vec![exhausted];
        let ctx = OrderContext::for_amount("r-1", Money::from_cents(100_000));

        assert!(session().apply_promo_code_at("ZERO", &promos, &ctx, now()).is_ok());

        let mut config = CheckoutConfig::default();
        config.pricing.usage_limit_zero = UsageLimitPolicy::ZeroIsExhausted;
        let mut strict = CheckoutSession::with_id_generator(config, CartIdGenerator::with_seed(1));
        assert!(strict.apply_promo_code_at("ZERO", &promos, &ctx, now()).is_err());
    }

    #[test]
    fn test_activity_is_cached_until_invalidated() {
        let mut session = session();
        let mut promos = vec![promo("p-1", "FLASH", DiscountKind::FreeDelivery)];

        assert_eq!(session.available_promotions_at(&promos, "r-1", now()).len(), 1);

        // Paused upstream; the cached answer still holds within the TTL.
        promos[0].status = PromoStatus::Paused;
        let later = now() + Duration::seconds(10);
        assert_eq!(session.available_promotions_at(&promos, "r-1", later).len(), 1);

        session.invalidate_promotion("p-1");
        assert!(session.available_promotions_at(&promos, "r-1", later).is_empty());
    }

    #[test]
    fn test_available_promotions_filters_scope_and_visibility() {
        let mut session = session();
        let mut hidden = promo("p-1", "STAFF", DiscountKind::FreeDelivery);
        hidden.is_public = false;
        let mut elsewhere = promo("p-2", "OTHER", DiscountKind::FreeDelivery);
        elsewhere.restaurant_id = Some("r-2".to_string());
        let open = promo("p-3", "OPEN", DiscountKind::FreeDelivery);
        let promos = vec![hidden, elsewhere, open];

        let visible = session.available_promotions_at(&promos, "r-1", now());
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "p-3");
    }

    #[test]
    fn test_negative_delivery_fee_is_clamped() {
        let mut session = session();
        session.set_delivery_fee(Money::from_cents(-5));
        assert!(session.delivery_fee().is_zero());
    }
}
