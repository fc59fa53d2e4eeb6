//! # Cart Commands
//!
//! Edits to the lines and charges of the current order.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  pay /   │────►│ Invoiced │       │
//! │  │  Order   │     │          │     │  hold    │     │ (removed)│       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                                │
//! │                   confirm (stock.rs)                                   │
//! │                   update_quantity                                      │
//! │                   remove_item                                          │
//! │                   set_order_discount / set_service_charge              │
//! │                   set_customer / set_fulfillment                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command answers with the whole cart and freshly priced totals.

use payshia_core::{
    CartLine, CoreResult, Fulfillment, Money, OrderId, OrderState, OrderTotals, PricingEngine,
};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{ErpState, SessionState};

/// The current order with its totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub order_id: OrderId,
    pub order_name: String,
    pub customer_id: String,
    pub fulfillment: Fulfillment,
    pub lines: Vec<CartLine>,
    pub totals: OrderTotals,
}

impl CartResponse {
    pub fn from_order(order: &OrderState, pricing: &PricingEngine) -> Self {
        CartResponse {
            order_id: order.id().clone(),
            order_name: order.name().to_string(),
            customer_id: order.customer_id().to_string(),
            fulfillment: order.fulfillment().clone(),
            lines: order.lines().to_vec(),
            totals: pricing.price(order),
        }
    }
}

/// Applies `f` to the current order and returns the repriced cart.
pub(crate) fn mutate_current<F>(
    session: &SessionState,
    erp: &ErpState,
    f: F,
) -> Result<CartResponse, ApiError>
where
    F: FnOnce(&mut OrderState) -> CoreResult<()>,
{
    session.with_registry_mut(|registry| {
        let order = registry.current_mut()?;
        f(order)?;
        Ok(CartResponse::from_order(order, erp.pricing()))
    })
}

/// Finds the variant id of the line matching `key` (SKU or variant id)
/// and `batch_code`.
fn line_variant(order: &OrderState, key: &str, batch_code: &str) -> Option<String> {
    order
        .lines()
        .iter()
        .find(|l| {
            l.batch_code == batch_code && (l.sku.eq_ignore_ascii_case(key) || l.variant_id == key)
        })
        .map(|l| l.variant_id.clone())
}

pub fn get_cart(session: &SessionState, erp: &ErpState) -> Result<CartResponse, ApiError> {
    debug!("get_cart command");
    session.with_registry(|registry| {
        let order = registry.current()?;
        Ok(CartResponse::from_order(order, erp.pricing()))
    })
}

/// Sets a line's quantity; zero or less removes it.
pub fn update_quantity(
    session: &SessionState,
    erp: &ErpState,
    key: &str,
    batch_code: &str,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(key, batch_code, quantity, "update_quantity command");
    let mut missing = false;
    let response = mutate_current(session, erp, |order| {
        match line_variant(order, key, batch_code) {
            Some(variant_id) => order.update_quantity(&variant_id, batch_code, quantity),
            None => {
                missing = true;
                Ok(())
            }
        }
    })?;

    if missing {
        return Err(ApiError::not_found("Line", &format!("{} / {}", key, batch_code)));
    }
    Ok(response)
}

pub fn remove_item(
    session: &SessionState,
    erp: &ErpState,
    key: &str,
    batch_code: &str,
) -> Result<CartResponse, ApiError> {
    debug!(key, batch_code, "remove_item command");
    let mut missing = false;
    let response = mutate_current(session, erp, |order| {
        match line_variant(order, key, batch_code) {
            Some(variant_id) => order.remove_item(&variant_id, batch_code).map(|_| ()),
            None => {
                missing = true;
                Ok(())
            }
        }
    })?;

    if missing {
        return Err(ApiError::not_found("Line", &format!("{} / {}", key, batch_code)));
    }
    Ok(response)
}

pub fn set_order_discount(
    session: &SessionState,
    erp: &ErpState,
    amount: Money,
) -> Result<CartResponse, ApiError> {
    debug!(amount = %amount, "set_order_discount command");
    mutate_current(session, erp, |order| order.set_order_discount(amount))
}

pub fn set_service_charge(
    session: &SessionState,
    erp: &ErpState,
    amount: Money,
) -> Result<CartResponse, ApiError> {
    debug!(amount = %amount, "set_service_charge command");
    mutate_current(session, erp, |order| order.set_service_charge(amount))
}

pub fn set_customer(
    session: &SessionState,
    erp: &ErpState,
    customer_id: &str,
) -> Result<CartResponse, ApiError> {
    debug!(customer_id, "set_customer command");
    mutate_current(session, erp, |order| order.set_customer(customer_id))
}

pub fn set_fulfillment(
    session: &SessionState,
    erp: &ErpState,
    fulfillment: Fulfillment,
) -> Result<CartResponse, ApiError> {
    debug!(fulfillment = %fulfillment, "set_fulfillment command");
    mutate_current(session, erp, |order| order.set_fulfillment(fulfillment))
}
