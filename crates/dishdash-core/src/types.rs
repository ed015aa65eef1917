//! # Domain Types
//!
//! Core domain types for promotion evaluation and cart assembly.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   PromoCode     │   │    MenuItem     │   │   OrderLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code           │   │  price          │   │  saved draft    │       │
//! │  │  discount ──────┼─┐ │  lto (optional) │   │  free/paid      │       │
//! │  │  validity       │ │ └─────────────────┘   │  drinks         │       │
//! │  └─────────────────┘ │                       └────────┬────────┘       │
//! │                      ▼                                │ assembler      │
//! │  ┌──────────────────────────┐                ┌────────▼────────┐       │
//! │  │      DiscountKind        │                │   CartEntry     │       │
//! │  │  Percentage { rate }     │                │  unit_price     │       │
//! │  │  FixedAmount { amount }  │                │  quantity       │       │
//! │  │  FreeDelivery            │                │  customizations │       │
//! │  │  BuyOneGetOne            │                └─────────────────┘       │
//! │  └──────────────────────────┘                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records come from the managed backend already resolved; see
//! [`crate::records`] for the lenient JSON ingestion.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::{DiscountRate, Money};

// =============================================================================
// Promotion Status
// =============================================================================

/// Lifecycle status of a promotion as set by restaurant/admin tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PromoStatus {
    Active,
    /// Also the fallback for unknown status strings.
    #[default]
    Inactive,
    Expired,
    Paused,
}

// =============================================================================
// Discount Kind
// =============================================================================

/// What a promotion gives, with the payload each kind needs.
///
/// ## Subtotal Effect
/// ```text
/// Percentage   ── rate × order amount, capped
/// FixedAmount  ── amount, capped, never above order amount
/// FreeDelivery ── 0 on subtotal (waives the delivery fee instead)
/// BuyOneGetOne ── 0 on subtotal (handled on line items by the app)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountKind {
    Percentage { rate: DiscountRate },
    FixedAmount { amount: Money },
    FreeDelivery,
    BuyOneGetOne,
}

impl DiscountKind {
    /// Short machine name, matching the backend's `discount_type` column.
    pub fn name(&self) -> &'static str {
        match self {
            DiscountKind::Percentage { .. } => "percentage",
            DiscountKind::FixedAmount { .. } => "fixed_amount",
            DiscountKind::FreeDelivery => "free_delivery",
            DiscountKind::BuyOneGetOne => "buy_one_get_one",
        }
    }
}

impl fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Promo Code
// =============================================================================

/// A promotion as stored by the managed backend.
///
/// Read-only to this crate. `used_count` is incremented by the backend's
/// order-finalization step, never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromoCode {
    /// Backend identifier.
    pub id: String,

    /// Code typed by the customer.
    pub code: String,

    /// Restaurant this promotion is limited to (None = platform-wide).
    pub restaurant_id: Option<String>,

    pub discount: DiscountKind,

    /// Order subtotal required before the promotion applies.
    pub minimum_order_amount: Money,

    /// Cap on the subtotal discount.
    pub maximum_discount_amount: Option<Money>,

    /// Start of the validity window (inclusive). None = never active.
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity window (exclusive). None = never active.
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,

    pub status: PromoStatus,

    /// Total redemptions allowed. Zero is interpreted per `UsageLimitPolicy`.
    pub usage_limit: Option<u32>,

    /// Redemptions so far.
    pub used_count: u32,

    /// Redemptions allowed per customer.
    pub per_user_limit: Option<u32>,

    /// Category allow-list (empty = every category).
    pub applicable_categories: Vec<String>,

    /// Menu item allow-list (empty = every item).
    pub applicable_items: Vec<String>,

    /// Listed in the app's offers screen. Hidden codes still apply when typed.
    pub is_public: bool,
}

impl PromoCode {
    /// Creates an active, public, platform-wide promotion with no limits.
    ///
    /// Remaining fields are public and can be adjusted afterwards.
    pub fn new(
        id: impl Into<String>,
        code: impl Into<String>,
        discount: DiscountKind,
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> Self {
        PromoCode {
            id: id.into(),
            code: code.into(),
            restaurant_id: None,
            discount,
            minimum_order_amount: Money::zero(),
            maximum_discount_amount: None,
            valid_from: Some(valid_from),
            valid_until: Some(valid_until),
            status: PromoStatus::Active,
            usage_limit: None,
            used_count: 0,
            per_user_limit: None,
            applicable_categories: Vec::new(),
            applicable_items: Vec::new(),
            is_public: true,
        }
    }

    /// Checks whether the promotion may be used at `restaurant_id`.
    pub fn is_scoped_to(&self, restaurant_id: &str) -> bool {
        self.restaurant_id
            .as_deref()
            .map_or(true, |scope| scope == restaurant_id)
    }

    /// Checks whether the promotion belongs on the offers list of `restaurant_id`.
    ///
    /// Activity is not considered here; see `PromotionEvaluator::visible_promotions`.
    pub fn is_listed_at(&self, restaurant_id: &str) -> bool {
        self.is_public && self.is_scoped_to(restaurant_id)
    }

    /// Checks whether the promotion targets specific items or categories.
    pub fn has_allow_list(&self) -> bool {
        !self.applicable_categories.is_empty() || !self.applicable_items.is_empty()
    }

    /// Checks whether a line (by item and category) is covered by the allow-lists.
    pub fn covers(&self, menu_item_id: &str, category_id: Option<&str>) -> bool {
        if !self.has_allow_list() {
            return true;
        }
        if self.applicable_items.iter().any(|id| id == menu_item_id) {
            return true;
        }
        category_id.is_some_and(|category| {
            self.applicable_categories.iter().any(|c| c == category)
        })
    }
}

// =============================================================================
// Menu Item
// =============================================================================

/// Limited-Time Offer: a discounted price for a menu item within a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LimitedTimeOffer {
    pub offer_price: Money,
    #[ts(as = "String")]
    pub starts_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub ends_at: DateTime<Utc>,
}

impl LimitedTimeOffer {
    /// Checks whether `now` falls within `[starts_at, ends_at)`.
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now < self.ends_at
    }
}

/// A menu item (single dish or pack).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub category_id: Option<String>,
    /// Listed price. None when the backend row has no usable price.
    pub price: Option<Money>,
    pub lto: Option<LimitedTimeOffer>,
}

impl MenuItem {
    /// Creates a menu item with a listed price and no category or offer.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        MenuItem {
            id: id.into(),
            name: name.into(),
            category_id: None,
            price: Some(price),
            lto: None,
        }
    }

    /// Price charged at `now`: the LTO price while the offer runs, else
    /// the listed price.
    pub fn effective_price(&self, now: DateTime<Utc>) -> Option<Money> {
        match &self.lto {
            Some(lto) if lto.is_running(now) => Some(lto.offer_price),
            _ => self.price,
        }
    }
}

// =============================================================================
// Selections
// =============================================================================

/// An extra added to an item (sauce, cheese, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplement {
    pub name: String,
    pub price: Money,
}

impl Supplement {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Supplement {
            name: name.into(),
            price,
        }
    }
}

/// A size/variant of a pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Variant {
    pub id: String,
    pub name: String,
    /// Variant price, when the variant is priced on its own.
    pub price: Option<Money>,
}

/// A drink selection: quantity plus the price recorded when it was picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DrinkPick {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl DrinkPick {
    pub fn new(name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        DrinkPick {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    /// Quantity × unit price.
    pub fn total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Drink id → pick. Ordered so assembled output is deterministic.
pub type DrinkPicks = BTreeMap<String, DrinkPick>;

/// A draft order line saved from an earlier visit to the pack screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub menu_item_id: String,
    pub quantity: u32,
    /// Per-unit base price recorded with the draft.
    pub saved_unit_price: Option<Money>,
    pub variant: Option<Variant>,
    pub supplements: Vec<Supplement>,
    /// Free drinks per unit.
    pub free_drinks: DrinkPicks,
    /// Paid drinks, billed once per checkout.
    pub paid_drinks: DrinkPicks,
}

/// What the user is selecting right now on the pack screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrentSelection {
    pub menu_item_id: String,
    /// Zero when the screen only carries drink picks for the saved lines.
    pub quantity: u32,
    pub variant: Option<Variant>,
    pub supplements: Vec<Supplement>,
    /// Free drinks per unit.
    pub free_drinks: DrinkPicks,
    pub paid_drinks: DrinkPicks,
}

impl CurrentSelection {
    /// Checks whether a drink id is picked in the current selection.
    pub fn picks_drink(&self, drink_id: &str) -> bool {
        self.free_drinks.contains_key(drink_id) || self.paid_drinks.contains_key(drink_id)
    }
}

// =============================================================================
// Cart Entry
// =============================================================================

/// Opaque cart entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartEntryId(pub Uuid);

impl fmt::Display for CartEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Resolved drink/supplement breakdown carried by a cart entry for display
/// and billing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customizations {
    pub variant: Option<Variant>,
    pub supplements: Vec<Supplement>,
    /// Free drinks, already scaled by the entry quantity.
    pub free_drinks: DrinkPicks,
    /// Paid drinks. Only the first entry of a checkout carries any.
    pub paid_drinks: DrinkPicks,
    pub paid_drinks_total: Money,
}

/// A priced line of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartEntry {
    #[ts(as = "String")]
    pub id: CartEntryId,
    pub menu_item_id: String,
    pub name: String,
    /// Final per-unit price, paid drinks included.
    pub unit_price: Money,
    pub quantity: u32,
    pub customizations: Customizations,
}

impl CartEntry {
    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
