//! # Order Commands
//!
//! Open, park, resume and discard orders on this terminal.
//!
//! ```text
//! new ──────► Order 3 current, Order 2 held
//! park ─────► Order 3 held,    Order 4 current
//! select 2 ─► Order 2 current, Order 3 and Order 4 held
//! clear ────► Order 2 dropped, a fresh order if none is current
//! ```
//!
//! Parking is local to the terminal. The backend only sees an order when it
//! is paid or held through checkout.

use payshia_core::{CoreError, Money, OrderId, OrderRegistry, OrderState, PricingEngine};
use serde::Serialize;
use tracing::{debug, info};

use super::cart::CartResponse;
use crate::error::ApiError;
use crate::state::{ErpState, SessionState};

/// One row in the order list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub name: String,
    pub customer_id: String,
    pub fulfillment: String,
    pub line_count: usize,
    pub total_quantity: i64,
    pub total: Money,
    pub current: bool,
}

impl OrderSummary {
    fn new(order: &OrderState, pricing: &PricingEngine, current: bool) -> Self {
        OrderSummary {
            id: order.id().clone(),
            name: order.name().to_string(),
            customer_id: order.customer_id().to_string(),
            fulfillment: order.fulfillment().to_string(),
            line_count: order.line_count(),
            total_quantity: order.total_quantity(),
            total: pricing.price(order).total,
            current,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkResponse {
    pub parked: OrderSummary,
    pub cart: CartResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub cleared: String,
    pub cart: CartResponse,
}

fn current_cart(registry: &OrderRegistry, pricing: &PricingEngine) -> Result<CartResponse, ApiError> {
    let order = registry.current()?;
    Ok(CartResponse::from_order(order, pricing))
}

/// Every order in the session, in creation order.
pub fn list_orders(session: &SessionState, erp: &ErpState) -> Result<Vec<OrderSummary>, ApiError> {
    debug!("list_orders command");
    Ok(session.with_registry(|registry| {
        let current = registry.current_id();
        registry
            .orders()
            .iter()
            .map(|o| OrderSummary::new(o, erp.pricing(), current == Some(o.id())))
            .collect()
    }))
}

/// Opens a new empty order; the previous one stays held.
pub fn new_order(session: &SessionState, erp: &ErpState) -> Result<CartResponse, ApiError> {
    debug!("new_order command");
    session.with_registry_mut(|registry| {
        let id = registry.create_order();
        info!(order_id = %id, orders = registry.len(), "Order created");
        current_cart(registry, erp.pricing())
    })
}

/// Resumes a held order by display number (`2` for "Order 2") or by id.
pub fn select_order(
    session: &SessionState,
    erp: &ErpState,
    key: &str,
) -> Result<CartResponse, ApiError> {
    debug!(key, "select_order command");
    session.with_registry_mut(|registry| {
        let id = match key.parse::<u64>() {
            Ok(sequence) => registry
                .find_by_sequence(sequence)
                .map(|o| o.id().clone())
                .ok_or_else(|| ApiError::not_found("Order", key))?,
            Err(_) => OrderId::from(key),
        };

        registry.select_held(&id)?;
        info!(order_id = %id, "Order resumed");
        current_cart(registry, erp.pricing())
    })
}

/// Parks the current order and starts a fresh one.
pub fn park_order(session: &SessionState, erp: &ErpState) -> Result<ParkResponse, ApiError> {
    debug!("park_order command");
    session.with_registry_mut(|registry| {
        let parked_id = registry.current_id().cloned().ok_or(CoreError::NoCurrentOrder)?;
        let new_id = registry.hold_and_start_new()?;

        let parked = registry
            .get(&parked_id)
            .map(|o| OrderSummary::new(o, erp.pricing(), false))
            .ok_or_else(|| ApiError::internal("Parked order disappeared"))?;

        info!(parked = %parked.name, order_id = %new_id, "Order parked");
        Ok(ParkResponse {
            parked,
            cart: current_cart(registry, erp.pricing())?,
        })
    })
}

/// Discards the current order without invoicing it.
pub fn clear_order(session: &SessionState, erp: &ErpState) -> Result<ClearResponse, ApiError> {
    debug!("clear_order command");
    session.with_registry_mut(|registry| {
        let id = registry.current_id().cloned().ok_or(CoreError::NoCurrentOrder)?;
        let removed = registry.clear(&id)?;

        info!(order = %removed.name(), lines = removed.line_count(), "Order cleared");
        Ok(ClearResponse {
            cleared: removed.name().to_string(),
            cart: current_cart(registry, erp.pricing())?,
        })
    })
}
