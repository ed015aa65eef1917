//! # Order Assembler
//!
//! Turns saved draft lines plus the in-progress pack selection into priced
//! cart entries.
//!
//! ## Billing Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Free vs paid drinks                                 │
//! │                                                                         │
//! │  Paid drinks   ── billed ONCE per checkout, on the first emitted entry  │
//! │  Free drinks   ── per line, scaled by that entry's quantity             │
//! │                                                                         │
//! │  Same drink id in a saved line AND the current selection:               │
//! │      the current selection's classification, quantity and price win     │
//! │                                                                         │
//! │  Saved line, quantity 3, paid soda 150, free water ×1:                  │
//! │                                                                         │
//! │      entry 1: base + 150   paid: soda   free: water ×1                  │
//! │      entry 2: base         paid: -      free: water ×1                  │
//! │      entry 3: base         paid: -      free: water ×1                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Base Price Fallback
//! saved unit price → variant price → menu item price (LTO aware) →
//! placeholder price. Add-to-cart never fails for lack of a price.
//!
//! The assembler is stateless: the same input gives the same entries, apart
//! from the ids handed out by the caller's [`CartIdGenerator`].

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    CartEntry, CartEntryId, CurrentSelection, Customizations, DrinkPick, DrinkPicks, MenuItem,
    OrderLine, Supplement, Variant,
};
use crate::validation::{validate_cart_size, validate_price, validate_quantity, ValidationResult};
use crate::{DEFAULT_PLACEHOLDER_PRICE, MAX_CART_ENTRIES};

// =============================================================================
// Options
// =============================================================================

/// Knobs the checkout configuration feeds into the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Last-resort unit price when no price data is available.
    pub placeholder_price: Money,
    pub max_cart_entries: usize,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        AssemblerOptions {
            placeholder_price: DEFAULT_PLACEHOLDER_PRICE,
            max_cart_entries: MAX_CART_ENTRIES,
        }
    }
}

// =============================================================================
// Id Generator
// =============================================================================

/// Hands out opaque, monotonically increasing cart entry ids.
///
/// Ids are UUIDs built from a per-generator seed and a counter, so two
/// generators with the same seed produce the same sequence.
#[derive(Debug, Clone)]
pub struct CartIdGenerator {
    seed: u64,
    next: u64,
}

impl CartIdGenerator {
    /// Creates a generator with a random seed.
    pub fn new() -> Self {
        Self::with_seed(Uuid::new_v4().as_u64_pair().0)
    }

    pub fn with_seed(seed: u64) -> Self {
        CartIdGenerator { seed, next: 0 }
    }

    pub fn next_id(&mut self) -> CartEntryId {
        let id = Uuid::from_u64_pair(self.seed, self.next);
        self.next = self.next.wrapping_add(1);
        CartEntryId(id)
    }
}

impl Default for CartIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Assembler
// =============================================================================

/// Assembles cart entries against a menu.
#[derive(Debug, Clone, Copy)]
pub struct OrderAssembler<'a> {
    menu: &'a [MenuItem],
    options: AssemblerOptions,
}

impl<'a> OrderAssembler<'a> {
    pub fn new(menu: &'a [MenuItem], options: AssemblerOptions) -> Self {
        OrderAssembler { menu, options }
    }

    /// Merges saved draft lines with the current selection into cart entries.
    ///
    /// ## Emission Order
    /// 1. Saved lines in input order, one entry per unit
    /// 2. The current selection's own line, if its quantity is above zero
    ///
    /// The first emitted entry carries every paid drink. A current line of
    /// quantity N that carries them is priced `total / N`; when that does
    /// not divide evenly, one unit is split off to carry the remainder so
    /// `unit_price × quantity` always adds back up to the total.
    ///
    /// ## Errors
    /// - `Validation` for a line above `MAX_ITEM_QUANTITY`, a negative
    ///   supplement or drink price, or a cart above `max_cart_entries`
    /// - `NoLineForPaidDrinks` when paid drinks are picked but nothing is
    ///   ordered
    pub fn assemble(
        &self,
        saved: &[OrderLine],
        current: &CurrentSelection,
        now: DateTime<Utc>,
        ids: &mut CartIdGenerator,
    ) -> CoreResult<Vec<CartEntry>> {
        validate_line(
            current.quantity,
            &current.supplements,
            [&current.free_drinks, &current.paid_drinks],
        )?;
        for line in saved {
            validate_line(line.quantity, &line.supplements, [&line.free_drinks, &line.paid_drinks])?;
        }

        // Upper bound on emitted entries, checked before any are built
        let planned: u64 = saved.iter().map(|line| u64::from(line.quantity)).sum::<u64>()
            + u64::from(current.quantity.min(2));
        validate_cart_size(
            usize::try_from(planned).unwrap_or(usize::MAX),
            self.options.max_cart_entries,
        )?;

        let paid = merged_paid_drinks(saved, current);
        let paid_total: Money = paid.values().map(DrinkPick::total).sum();
        let mut paid_pending = !paid.is_empty();
        let mut entries = Vec::new();

        for line in saved {
            if line.quantity == 0 {
                debug!(menu_item_id = %line.menu_item_id, "Skipping saved line with quantity 0");
                continue;
            }

            let unit = self.base_unit_price(
                &line.menu_item_id,
                line.saved_unit_price,
                line.variant.as_ref(),
                now,
            ) + supplements_total(&line.supplements);
            let free = saved_free_drinks(line, current);

            for _ in 0..line.quantity {
                let draft = EntryDraft {
                    menu_item_id: &line.menu_item_id,
                    variant: line.variant.as_ref(),
                    supplements: &line.supplements,
                    per_unit_free: &free,
                };
                if paid_pending {
                    paid_pending = false;
                    entries.push(self.entry(ids, draft, unit + paid_total, 1, Some((&paid, paid_total))));
                } else {
                    entries.push(self.entry(ids, draft, unit, 1, None));
                }
            }
        }

        if current.quantity > 0 {
            let n = current.quantity;
            let unit = self.base_unit_price(
                &current.menu_item_id,
                None,
                current.variant.as_ref(),
                now,
            ) + supplements_total(&current.supplements);
            let draft = EntryDraft {
                menu_item_id: &current.menu_item_id,
                variant: current.variant.as_ref(),
                supplements: &current.supplements,
                per_unit_free: &current.free_drinks,
            };

            if paid_pending {
                paid_pending = false;
                let total = unit * n + paid_total;
                let (share, rest) = total.split_evenly(n);
                if rest.is_zero() {
                    entries.push(self.entry(ids, draft, share, n, Some((&paid, paid_total))));
                } else {
                    entries.push(self.entry(ids, draft, share + rest, 1, Some((&paid, paid_total))));
                    entries.push(self.entry(ids, draft, share, n - 1, None));
                }
            } else {
                entries.push(self.entry(ids, draft, unit, n, None));
            }
        }

        if paid_pending {
            return Err(CoreError::NoLineForPaidDrinks);
        }

        validate_cart_size(entries.len(), self.options.max_cart_entries)?;

        debug!(
            entries = entries.len(),
            saved_lines = saved.len(),
            paid_total = %paid_total,
            "Assembled cart entries"
        );
        Ok(entries)
    }

    /// Resolves the per-unit base price of an item, before supplements.
    pub fn base_unit_price(
        &self,
        menu_item_id: &str,
        saved_unit_price: Option<Money>,
        variant: Option<&Variant>,
        now: DateTime<Utc>,
    ) -> Money {
        if let Some(price) = saved_unit_price.filter(|p| !p.is_negative()) {
            return price;
        }
        if let Some(price) = variant.and_then(|v| v.price).filter(|p| !p.is_negative()) {
            return price;
        }
        if let Some(price) = self
            .menu_item(menu_item_id)
            .and_then(|item| item.effective_price(now))
            .filter(|p| !p.is_negative())
        {
            return price;
        }

        warn!(
            menu_item_id,
            placeholder = %self.options.placeholder_price,
            "No price data for item, using placeholder price"
        );
        self.options.placeholder_price
    }

    fn menu_item(&self, id: &str) -> Option<&'a MenuItem> {
        self.menu.iter().find(|item| item.id == id)
    }

    fn entry(
        &self,
        ids: &mut CartIdGenerator,
        draft: EntryDraft<'_>,
        unit_price: Money,
        quantity: u32,
        paid: Option<(&DrinkPicks, Money)>,
    ) -> CartEntry {
        let name = self
            .menu_item(draft.menu_item_id)
            .map(|item| item.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| draft.menu_item_id.to_string());
        let (paid_drinks, paid_drinks_total) = match paid {
            Some((picks, total)) => (picks.clone(), total),
            None => (DrinkPicks::new(), Money::zero()),
        };

        CartEntry {
            id: ids.next_id(),
            menu_item_id: draft.menu_item_id.to_string(),
            name,
            unit_price,
            quantity,
            customizations: Customizations {
                variant: draft.variant.cloned(),
                supplements: draft.supplements.to_vec(),
                free_drinks: scale_drinks(draft.per_unit_free, quantity),
                paid_drinks,
                paid_drinks_total,
            },
        }
    }
}

/// The parts of a line every entry cut from it shares.
#[derive(Clone, Copy)]
struct EntryDraft<'s> {
    menu_item_id: &'s str,
    variant: Option<&'s Variant>,
    supplements: &'s [Supplement],
    per_unit_free: &'s DrinkPicks,
}

// =============================================================================
// Drink Merging
// =============================================================================

/// Paid drinks billed for the whole checkout.
///
/// The current selection's paid drinks, plus saved paid drinks the current
/// selection does not mention. A drink repeated across saved lines counts
/// once (first occurrence).
pub fn merged_paid_drinks(saved: &[OrderLine], current: &CurrentSelection) -> DrinkPicks {
    let mut paid = current.paid_drinks.clone();
    for line in saved {
        for (id, pick) in &line.paid_drinks {
            if !current.picks_drink(id) {
                paid.entry(id.clone()).or_insert_with(|| pick.clone());
            }
        }
    }
    paid.retain(|_, pick| pick.quantity > 0);
    paid
}

/// Per-unit free drinks of a saved line after merging with the current
/// selection.
pub fn saved_free_drinks(line: &OrderLine, current: &CurrentSelection) -> DrinkPicks {
    let mut free: DrinkPicks = line
        .free_drinks
        .iter()
        .filter(|(id, _)| !current.picks_drink(id))
        .map(|(id, pick)| (id.clone(), pick.clone()))
        .collect();

    for (id, pick) in &current.free_drinks {
        if line.free_drinks.contains_key(id) || line.paid_drinks.contains_key(id) {
            free.insert(id.clone(), pick.clone());
        }
    }

    free.retain(|_, pick| pick.quantity > 0);
    free
}

fn scale_drinks(per_unit: &DrinkPicks, factor: u32) -> DrinkPicks {
    per_unit
        .iter()
        .map(|(id, pick)| {
            let mut scaled = pick.clone();
            scaled.quantity = pick.quantity.saturating_mul(factor);
            (id.clone(), scaled)
        })
        .collect()
}

fn supplements_total(supplements: &[Supplement]) -> Money {
    supplements.iter().map(|s| s.price).sum()
}

/// Caller-supplied line data: quantity when the line is ordered at all, and
/// every supplement and drink price.
fn validate_line(
    quantity: u32,
    supplements: &[Supplement],
    drinks: [&DrinkPicks; 2],
) -> ValidationResult<()> {
    if quantity > 0 {
        validate_quantity(quantity)?;
    }
    for supplement in supplements {
        validate_price(supplement.price)?;
    }
    for pick in drinks.into_iter().flat_map(|picks| picks.values()) {
        validate_price(pick.unit_price)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
