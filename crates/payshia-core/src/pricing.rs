//! # Pricing Engine
//!
//! Derives the totals of an order. Pure and deterministic: the same order
//! always prices to the same totals, so totals are recomputed on every
//! render instead of being stored.
//!
//! ## Formula
//! ```text
//! subtotal        = Σ unit_price × quantity
//! item_discounts  = Σ line discount
//! after_item      = subtotal − item_discounts
//! tax             = round_half_up(after_item × tax rate)
//! total           = after_item + tax + service_charge − order_discount
//! ```
//!
//! Service charge and order discount sit outside the tax base. The engine
//! never clamps; a negative total is refused later, at checkout.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::order::OrderState;
use crate::types::TaxRate;

/// Derived totals for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub item_discounts: Money,
    pub after_item_discounts: Money,
    pub tax: Money,
    pub service_charge: Money,
    pub order_discount: Money,
    pub total: Money,
    pub line_count: usize,
    pub total_quantity: i64,
}

/// Prices orders at a flat tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PricingEngine {
    tax_rate: TaxRate,
}

impl PricingEngine {
    pub fn new(tax_rate: TaxRate) -> Self {
        PricingEngine { tax_rate }
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn price(&self, order: &OrderState) -> OrderTotals {
        let subtotal: Money = order.lines().iter().map(|l| l.gross()).sum();
        let item_discounts: Money = order.lines().iter().map(|l| l.discount).sum();
        let after_item_discounts = subtotal - item_discounts;
        let tax = after_item_discounts.calculate_tax(self.tax_rate);
        let service_charge = order.service_charge();
        let order_discount = order.order_discount();

        OrderTotals {
            subtotal,
            item_discounts,
            after_item_discounts,
            tax,
            service_charge,
            order_discount,
            total: after_item_discounts + tax + service_charge - order_discount,
            line_count: order.line_count(),
            total_quantity: order.total_quantity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductVariant, StockBatch};
    use proptest::prelude::*;

    fn variant(id: &str, price_cents: i64) -> ProductVariant {
        ProductVariant::new("P1", id, format!("SKU-{id}"), "Item", Money::from_cents(price_cents))
    }

    #[test]
    fn test_empty_order_prices_to_zero() {
        let order = OrderState::new(1);
        let totals = PricingEngine::default().price(&order);

        assert_eq!(totals, OrderTotals::default());
    }

    #[test]
    fn test_worked_example() {
        let mut order = OrderState::new(1);
        order
            .add_item(
                &variant("V1", 1000),
                3,
                Money::from_cents(200),
                &StockBatch::new("P1", "V1", "B-01", 5),
            )
            .unwrap();
        order.set_service_charge(Money::from_cents(150)).unwrap();
        order.set_order_discount(Money::from_cents(50)).unwrap();

        let totals = PricingEngine::default().price(&order);

        assert_eq!(totals.subtotal.cents(), 3000);
        assert_eq!(totals.item_discounts.cents(), 200);
        assert_eq!(totals.after_item_discounts.cents(), 2800);
        assert_eq!(totals.tax.cents(), 224);
        assert_eq!(totals.total.cents(), 3124);
        assert_eq!(totals.line_count, 1);
        assert_eq!(totals.total_quantity, 3);
    }

    #[test]
    fn test_tax_rounds_to_nearest_cent() {
        // 0.07 × 8% = 0.0056 → 0.01
        let mut order = OrderState::new(1);
        order
            .add_item(&variant("V1", 7), 1, Money::zero(), &StockBatch::new("P1", "V1", "B", 1))
            .unwrap();
        assert_eq!(PricingEngine::default().price(&order).tax.cents(), 1);

        // 0.06 × 8% = 0.0048 → 0.00
        let mut order = OrderState::new(1);
        order
            .add_item(&variant("V1", 6), 1, Money::zero(), &StockBatch::new("P1", "V1", "B", 1))
            .unwrap();
        assert_eq!(PricingEngine::default().price(&order).tax.cents(), 0);
    }

    #[test]
    fn test_order_discount_can_drive_total_negative() {
        let mut order = OrderState::new(1);
        order
            .add_item(&variant("V1", 100), 1, Money::zero(), &StockBatch::new("P1", "V1", "B", 1))
            .unwrap();
        order.set_order_discount(Money::from_cents(500)).unwrap();

        let totals = PricingEngine::default().price(&order);
        assert_eq!(totals.total.cents(), 100 + 8 - 500);
    }

    #[test]
    fn test_custom_tax_rate() {
        let mut order = OrderState::new(1);
        order
            .add_item(&variant("V1", 1000), 1, Money::zero(), &StockBatch::new("P1", "V1", "B", 1))
            .unwrap();

        let totals = PricingEngine::new(TaxRate::zero()).price(&order);
        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.total.cents(), 1000);
    }

    #[test]
    fn test_largest_accepted_order_prices_without_overflow() {
        use crate::{MAX_AMOUNT_CENTS, MAX_ITEM_QUANTITY, MAX_ORDER_LINES};

        let mut order = OrderState::new(1);
        for i in 0..MAX_ORDER_LINES {
            let id = format!("V{i}");
            let v = ProductVariant::new("P1", id.clone(), format!("SKU-{i}"), "Item", Money::from_cents(MAX_AMOUNT_CENTS));
            order
                .add_item(&v, MAX_ITEM_QUANTITY, Money::zero(), &StockBatch::new("P1", id, "B", MAX_ITEM_QUANTITY))
                .unwrap();
        }
        order.set_service_charge(Money::from_cents(MAX_AMOUNT_CENTS)).unwrap();

        let totals = PricingEngine::new(TaxRate::from_bps(10_000)).price(&order);

        let subtotal = MAX_AMOUNT_CENTS * MAX_ITEM_QUANTITY * MAX_ORDER_LINES as i64;
        assert_eq!(totals.subtotal.cents(), subtotal);
        assert_eq!(totals.total.cents(), subtotal * 2 + MAX_AMOUNT_CENTS);
    }

    proptest! {
        #[test]
        fn prop_pricing_is_deterministic_and_consistent(
            lines in prop::collection::vec((1i64..=50_000, 1i64..=20, 0i64..=100), 0..=10),
            service in 0i64..=10_000,
            order_discount in 0i64..=10_000,
        ) {
            let mut order = OrderState::new(1);
            for (i, (price, qty, pct)) in lines.iter().enumerate() {
                let id = format!("V{i}");
                let v = ProductVariant::new("P1", id.clone(), format!("SKU-{i}"), "Item", Money::from_cents(*price));
                let discount = Money::from_cents(price * qty * pct / 100);
                order.add_item(&v, *qty, discount, &StockBatch::new("P1", id, "B", *qty)).unwrap();
            }
            order.set_service_charge(Money::from_cents(service)).unwrap();
            order.set_order_discount(Money::from_cents(order_discount)).unwrap();

            let engine = PricingEngine::default();
            let first = engine.price(&order);
            let second = engine.price(&order.clone());

            prop_assert_eq!(first, second);
            prop_assert_eq!(first.after_item_discounts, first.subtotal - first.item_discounts);
            prop_assert!(first.item_discounts <= first.subtotal);
            prop_assert_eq!(
                first.total,
                first.after_item_discounts + first.tax + first.service_charge - first.order_discount
            );
        }
    }
}
