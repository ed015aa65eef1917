//! # Activity Cache
//!
//! Caller-owned memo of "is this promotion active?" keyed by promotion id.
//!
//! ```text
//! is_active(promo, now)
//!      │
//!      ├── cached, younger than ttl, and no window
//!      │   boundary crossed since? ──────────► cached answer
//!      │
//!      └── otherwise ──► PromotionEvaluator::is_active ──► store, return
//! ```
//!
//! There is no process-wide cache. Whoever owns the checkout session owns
//! the cache, and can drop it, clear it, or invalidate one id after the
//! backend reports a redemption.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::promotions::PromotionEvaluator;
use crate::types::PromoCode;

#[derive(Debug, Clone, Copy)]
struct CachedActivity {
    active: bool,
    computed_at: DateTime<Utc>,
}

impl CachedActivity {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = now - self.computed_at;
        age >= Duration::zero() && age < ttl
    }
}

/// True when `valid_from` or `valid_until` lies in `(since, now]`, i.e. the
/// promotion may have opened or closed after the answer was computed.
fn window_boundary_crossed(promo: &PromoCode, since: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    [promo.valid_from, promo.valid_until]
        .into_iter()
        .flatten()
        .any(|bound| since < bound && bound <= now)
}

/// TTL cache of promotion activity.
#[derive(Debug, Clone)]
pub struct ActivityCache {
    ttl: Duration,
    entries: HashMap<String, CachedActivity>,
}

impl ActivityCache {
    /// Creates an empty cache. A zero or negative `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        ActivityCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns whether `promo` is active at `now`, reusing a fresh answer.
    ///
    /// An entry computed "in the future" (clock moved backwards) is stale, as
    /// is one computed before `valid_from` or `valid_until` was reached.
    /// Expired entries for other promotions are dropped on every store.
    pub fn is_active(
        &mut self,
        evaluator: &PromotionEvaluator,
        promo: &PromoCode,
        now: DateTime<Utc>,
    ) -> bool {
        if let Some(cached) = self.entries.get(&promo.id) {
            if cached.is_fresh(now, self.ttl)
                && !window_boundary_crossed(promo, cached.computed_at, now)
            {
                return cached.active;
            }
        }

        let active = evaluator.is_active(promo, now);
        let ttl = self.ttl;
        self.entries.retain(|_, cached| cached.is_fresh(now, ttl));
        self.entries.insert(
            promo.id.clone(),
            CachedActivity {
                active,
                computed_at: now,
            },
        );
        active
    }

    /// Forgets the answer for one promotion.
    pub fn invalidate(&mut self, promo_id: &str) {
        self.entries.remove(promo_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
