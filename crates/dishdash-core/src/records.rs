//! # Backend Records
//!
//! Lenient conversion of the managed backend's JSON rows into domain types.
//!
//! ## Degradation Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Field problem                        Result                            │
//! │  ───────────────────────────────────  ──────────────────────────────    │
//! │  missing id / code                    RecordError (row is skipped)      │
//! │  malformed or missing date            None → promotion never active     │
//! │  numeric field present, unparseable   0 (zero discount, zero limit)     │
//! │  unknown status                       Inactive                          │
//! │  unknown discount_type                FixedAmount of 0                  │
//! │  menu item price unusable             None → assembler fallback chain   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Numbers may arrive as JSON numbers or numeric strings (`"150.00"`), since
//! decimal columns are serialized as strings by the backend.
//!
//! ## Usage
//! ```rust
//! use dishdash_core::records::promo_from_json;
//! use dishdash_core::types::{DiscountKind, PromoStatus};
//!
//! let row = serde_json::json!({
//!     "id": "p-1",
//!     "code": "SAVE200",
//!     "discount_type": "fixed_amount",
//!     "value": "200",
//!     "minimum_order_amount": 500,
//!     "status": "active",
//!     "start_date": "2026-01-01T00:00:00Z",
//!     "end_date": "not a date"
//! });
//! let promo = promo_from_json(&row).unwrap();
//! assert_eq!(promo.status, PromoStatus::Active);
//! assert!(promo.valid_until.is_none());
//! assert!(matches!(promo.discount, DiscountKind::FixedAmount { .. }));
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::RecordError;
use crate::money::{DiscountRate, Money};
use crate::types::{DiscountKind, LimitedTimeOffer, MenuItem, PromoCode, PromoStatus};

const PROMO: &str = "promo";
const MENU_ITEM: &str = "menu item";

// =============================================================================
// Promotions
// =============================================================================

/// Converts one promotion row.
pub fn promo_from_json(value: &Value) -> Result<PromoCode, RecordError> {
    let row = value
        .as_object()
        .ok_or(RecordError::NotAnObject { kind: PROMO })?;

    let id = identity(row, &["id"], PROMO, "id")?;
    let code = identity(row, &["code", "promo_code"], PROMO, "code")?;

    Ok(PromoCode {
        restaurant_id: text(row, &["restaurant_id", "restaurantId"]),
        discount: discount_kind(row, &id),
        minimum_order_amount: money(row, &["minimum_order_amount", "minimumOrderAmount"], &id)
            .unwrap_or_default(),
        maximum_discount_amount: money(
            row,
            &["maximum_discount_amount", "maximumDiscountAmount"],
            &id,
        ),
        valid_from: timestamp(row, &["start_date", "offer_start_at", "startDate"], &id),
        valid_until: timestamp(row, &["end_date", "offer_end_at", "endDate"], &id),
        status: status(row),
        usage_limit: count(row, &["usage_limit", "usageLimit"], &id),
        used_count: count(row, &["used_count", "usedCount"], &id).unwrap_or(0),
        per_user_limit: count(row, &["per_user_limit", "perUserLimit"], &id),
        applicable_categories: text_list(row, &["applicable_categories", "applicableCategories"]),
        applicable_items: text_list(row, &["applicable_items", "applicableItems"]),
        is_public: flag(row, &["is_public", "isPublic"]).unwrap_or(true),
        id,
        code,
    })
}

/// Converts an array of promotion rows, skipping rows without identity.
pub fn promos_from_json(value: &Value) -> Vec<PromoCode> {
    let Some(rows) = value.as_array() else {
        warn!("Promotion payload is not an array, ignoring it");
        return Vec::new();
    };

    rows.iter()
        .filter_map(|row| match promo_from_json(row) {
            Ok(promo) => Some(promo),
            Err(e) => {
                warn!(error = %e, "Skipping promotion row");
                None
            }
        })
        .collect()
}

// =============================================================================
// Menu Items
// =============================================================================

/// Converts one menu item row, including its limited-time offer if complete.
pub fn menu_item_from_json(value: &Value) -> Result<MenuItem, RecordError> {
    let row = value
        .as_object()
        .ok_or(RecordError::NotAnObject { kind: MENU_ITEM })?;

    let id = identity(row, &["id"], MENU_ITEM, "id")?;

    let price = money(row, &["price"], &id).filter(|price| !price.is_negative());
    let lto = match (
        money(row, &["offer_price", "lto_price"], &id),
        timestamp(row, &["offer_start_at"], &id),
        timestamp(row, &["offer_end_at"], &id),
    ) {
        (Some(offer_price), Some(starts_at), Some(ends_at)) if !offer_price.is_negative() => {
            Some(LimitedTimeOffer {
                offer_price,
                starts_at,
                ends_at,
            })
        }
        _ => None,
    };

    Ok(MenuItem {
        name: text(row, &["name"]).unwrap_or_default(),
        category_id: text(row, &["category_id", "categoryId"]),
        price,
        lto,
        id,
    })
}

// =============================================================================
// Scalars
// =============================================================================

/// Parses a backend timestamp.
///
/// Accepts RFC 3339 (`2026-05-01T10:00:00+01:00`), zone-less date-times
/// (read as UTC, with `T` or a space) and plain dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Reads a major-unit amount from a JSON number or a numeric string.
///
/// Plain decimals are parsed exactly; anything else a float parser accepts
/// (exponents, `inf`) goes through f64 and degrades like
/// [`Money::from_major_f64`].
pub fn parse_money(value: &Value) -> Option<Money> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return None,
    };
    Money::from_decimal_str(&raw).or_else(|| parse_number(value).map(Money::from_major_f64))
}

/// Reads a number from a JSON number or a numeric string.
pub fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

// =============================================================================
// Field Helpers
// =============================================================================

/// First present, non-null field among `names`.
fn field<'a>(row: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| row.get(*name))
        .find(|value| !value.is_null())
}

fn text(row: &Map<String, Value>, names: &[&str]) -> Option<String> {
    match field(row, names)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn identity(
    row: &Map<String, Value>,
    names: &[&str],
    kind: &'static str,
    label: &'static str,
) -> Result<String, RecordError> {
    text(row, names).ok_or(RecordError::MissingField { kind, field: label })
}

/// Absent → None. Present but unparseable → Some(0).
fn money(row: &Map<String, Value>, names: &[&str], record_id: &str) -> Option<Money> {
    let value = field(row, names)?;
    parse_money(value).or_else(|| {
        warn!(record_id, field = names[0], raw = %value, "Unparseable amount, using 0");
        Some(Money::zero())
    })
}

/// Absent → None. Present but unparseable or negative → Some(0).
fn count(row: &Map<String, Value>, names: &[&str], record_id: &str) -> Option<u32> {
    let value = field(row, names)?;
    match parse_number(value) {
        Some(n) if n >= 0.0 => Some(n.min(f64::from(u32::MAX)).floor() as u32),
        _ => {
            warn!(record_id, field = names[0], raw = %value, "Unparseable count, using 0");
            Some(0)
        }
    }
}

fn timestamp(row: &Map<String, Value>, names: &[&str], record_id: &str) -> Option<DateTime<Utc>> {
    let value = field(row, names)?;
    let parsed = match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    if parsed.is_none() {
        warn!(record_id, field = names[0], raw = %value, "Malformed timestamp");
    }
    parsed
}

fn flag(row: &Map<String, Value>, names: &[&str]) -> Option<bool> {
    match field(row, names)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

fn text_list(row: &Map<String, Value>, names: &[&str]) -> Vec<String> {
    let Some(Value::Array(items)) = field(row, names) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

fn status(row: &Map<String, Value>) -> PromoStatus {
    if let Some(raw) = text(row, &["status"]) {
        return match raw.to_ascii_lowercase().as_str() {
            "active" => PromoStatus::Active,
            "inactive" => PromoStatus::Inactive,
            "expired" => PromoStatus::Expired,
            "paused" => PromoStatus::Paused,
            other => {
                debug!(status = other, "Unknown promotion status, treating as inactive");
                PromoStatus::Inactive
            }
        };
    }

    // Older rows only carry a boolean
    match flag(row, &["is_active", "isActive"]) {
        Some(true) => PromoStatus::Active,
        _ => PromoStatus::Inactive,
    }
}

fn discount_kind(row: &Map<String, Value>, record_id: &str) -> DiscountKind {
    let raw_type = text(row, &["discount_type", "discountType", "type"]).unwrap_or_default();
    let normalized: String = raw_type
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    let raw_value = field(row, &["value", "discount_value"]);
    let value = match raw_value {
        Some(raw) => parse_number(raw).unwrap_or_else(|| {
            warn!(record_id, raw = %raw, "Unparseable discount value, using 0");
            0.0
        }),
        None => 0.0,
    };

    match normalized.as_str() {
        "percentage" | "percent" => DiscountKind::Percentage {
            rate: DiscountRate::from_percentage(value),
        },
        "fixedamount" | "fixed" | "amount" => DiscountKind::FixedAmount {
            amount: raw_value
                .and_then(parse_money)
                .unwrap_or_default()
                .max(Money::zero()),
        },
        "freedelivery" => DiscountKind::FreeDelivery,
        "buyonegetone" | "bogo" => DiscountKind::BuyOneGetOne,
        _ => {
            warn!(record_id, discount_type = %raw_type, "Unknown discount type, giving no discount");
            DiscountKind::FixedAmount {
                amount: Money::zero(),
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
