//! End-to-end checkout pricing: backend rows in, totals out.

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;

use dishdash_core::assembler::{AssemblerOptions, CartIdGenerator, OrderAssembler};
use dishdash_core::money::Money;
use dishdash_core::pricing::OrderTotals;
use dishdash_core::promotions::{find_by_code, Ineligible, OrderContext, PromotionEvaluator};
use dishdash_core::records::{menu_item_from_json, promos_from_json};
use dishdash_core::types::{CartEntry, CurrentSelection, DrinkPick, DrinkPicks, OrderLine};

fn drinks(entries: &[(&str, u32, i64)]) -> DrinkPicks {
    entries
        .iter()
        .map(|(id, qty, price)| {
            (
                id.to_string(),
                DrinkPick::new(*id, *qty, Money::from_cents(*price)),
            )
        })
        .collect()
}

#[test]
fn saved_pack_with_promo_code_end_to_end() {
    let now = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();

    let menu = vec![menu_item_from_json(&json!({
        "id": "duo",
        "name": "Duo pack",
        "category_id": "packs",
        "price": "650"
    }))
    .unwrap()];

    let promos = promos_from_json(&json!([
        {
            "id": "p-1",
            "code": "SAVE200",
            "discount_type": "fixed_amount",
            "value": 200,
            "minimum_order_amount": 500,
            "maximum_discount_amount": 150,
            "start_date": "2026-06-01T00:00:00Z",
            "end_date": "2026-07-01T00:00:00Z",
            "status": "active"
        },
        {
            "id": "p-2",
            "code": "OLD",
            "discount_type": "percentage",
            "value": 50,
            "start_date": "2026-01-01T00:00:00Z",
            "end_date": "2026-02-01T00:00:00Z",
            "status": "active"
        }
    ]));
    assert_eq!(promos.len(), 2);

    let saved = vec![OrderLine {
        menu_item_id: "duo".to_string(),
        quantity: 3,
        free_drinks: drinks(&[("water", 1, 0)]),
        paid_drinks: drinks(&[("soda", 1, 15_000)]),
        ..OrderLine::default()
    }];
    let current = CurrentSelection {
        menu_item_id: "duo".to_string(),
        ..CurrentSelection::default()
    };

    let assembler = OrderAssembler::new(&menu, AssemblerOptions::default());
    let entries = assembler
        .assemble(&saved, &current, now, &mut CartIdGenerator::with_seed(1))
        .unwrap();
    assert_eq!(entries.len(), 3);

    let subtotal: Money = entries.iter().map(CartEntry::line_total).sum();
    assert_eq!(subtotal.cents(), 3 * 65_000 + 15_000);

    let evaluator = PromotionEvaluator::default();
    let ctx = OrderContext::from_entries("r-1", &entries, &menu, 0);
    assert_eq!(ctx.subtotal, subtotal);

    let promo = find_by_code(&promos, "save200").unwrap();
    let applied = evaluator.apply(promo, &ctx, Money::from_cents(20_000), now).unwrap();
    assert_eq!(applied.item_discount.cents(), 15_000);

    let expired = find_by_code(&promos, "OLD").unwrap();
    assert_eq!(
        evaluator.apply(expired, &ctx, Money::from_cents(20_000), now),
        Err(Ineligible::NotActive)
    );
    assert!(evaluator.calculate_discount(expired, subtotal, now).is_zero());

    let totals = OrderTotals::compute(&entries, Money::from_cents(20_000), Some(&applied));
    assert_eq!(totals.total.cents(), subtotal.cents() - 15_000 + 20_000);
}

#[test]
fn assembling_twice_differs_only_in_ids() {
    let now = Utc::now();
    let menu = vec![menu_item_from_json(&json!({ "id": "duo", "name": "Duo", "price": 650 })).unwrap()];
    let saved = vec![OrderLine {
        menu_item_id: "duo".to_string(),
        quantity: 2,
        paid_drinks: drinks(&[("soda", 1, 15_000)]),
        ..OrderLine::default()
    }];
    let current = CurrentSelection {
        menu_item_id: "duo".to_string(),
        quantity: 1,
        free_drinks: drinks(&[("water", 2, 0)]),
        ..CurrentSelection::default()
    };

    let assembler = OrderAssembler::new(&menu, AssemblerOptions::default());
    let mut ids = CartIdGenerator::new();
    let first = assembler.assemble(&saved, &current, now, &mut ids).unwrap();
    let second = assembler.assemble(&saved, &current, now, &mut ids).unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_ne!(a.id, b.id);
        assert_eq!(a.unit_price, b.unit_price);
        assert_eq!(a.quantity, b.quantity);
        assert_eq!(a.customizations, b.customizations);
    }
}

#[test]
fn below_minimum_order_is_reported() {
    let now = Utc::now();
    let promos = promos_from_json(&json!([{
        "id": "p-1",
        "code": "BIG",
        "discount_type": "percentage",
        "value": 10,
        "minimum_order_amount": 5000,
        "start_date": (now - Duration::days(1)).to_rfc3339(),
        "end_date": (now + Duration::days(1)).to_rfc3339(),
        "status": "active"
    }]));
    let ctx = OrderContext::for_amount("r-1", Money::from_cents(100_000));

    let result = PromotionEvaluator::default().apply(&promos[0], &ctx, Money::zero(), now);
    assert_eq!(
        result,
        Err(Ineligible::BelowMinimumOrder {
            minimum: Money::from_cents(500_000)
        })
    );
}

#[test]
fn absurd_backend_price_gives_saturated_totals() {
    let now = Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap();
    let menu = vec![menu_item_from_json(&json!({
        "id": "gold",
        "name": "Gold pack",
        "price": "50000000000000000"
    }))
    .unwrap()];
    assert_eq!(menu[0].price, Some(Money::from_cents(5_000_000_000_000_000_000)));

    let current = CurrentSelection {
        menu_item_id: "gold".to_string(),
        quantity: 2,
        ..CurrentSelection::default()
    };
    let entries = OrderAssembler::new(&menu, AssemblerOptions::default())
        .assemble(&[], &current, now, &mut CartIdGenerator::with_seed(3))
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].line_total().cents(), i64::MAX);

    let totals = OrderTotals::compute(&entries, Money::from_cents(2_000), None);
    assert_eq!(totals.subtotal.cents(), i64::MAX);
    assert_eq!(totals.total.cents(), i64::MAX);
    assert!(totals.savings().is_zero());
}
