//! # Add-Item Commands
//!
//! Drives the add-item dialog: pick a product, look up its batches, pick a
//! batch, confirm a quantity.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open_item("TEA-100")                                                   │
//! │     │  lock selection ─► open() ─► ticket 7 ─► unlock                   │
//! │     │                                                                   │
//! │     │  GET stock-entries/summary          (no lock held)                │
//! │     │                                                                   │
//! │     │  lock selection ─► attach_stock(ticket 7, ..) ─► unlock           │
//! │     ▼                                                                   │
//! │  select_batch("B-02")     optional, first batch is preselected          │
//! │     ▼                                                                   │
//! │  confirm_item(6, 0.00)                                                  │
//! │     lock selection + registry ─► order.add_item(..) ─► unlock          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! When the lookup fails the dialog stays open with zero stock: the cashier
//! sees the reason and confirming is blocked.

use payshia_core::{ItemSelection, Money, StockAvailability, StockBatch};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::cart::CartResponse;
use crate::error::{ApiError, ErrorCode};
use crate::state::{ErpState, SessionState};

/// What the add-item dialog shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResponse {
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub total_stock: i64,
    pub batches: Vec<StockBatch>,
    pub selected_batch: Option<String>,
    /// Why stock could not be loaded, if it could not.
    pub stock_error: Option<String>,
}

impl SelectionResponse {
    fn from_selection(selection: &ItemSelection, stock_error: Option<String>) -> Result<Self, ApiError> {
        let variant = selection
            .variant()
            .ok_or_else(|| ApiError::new(ErrorCode::OrderError, "No item is being added"))?;
        let stock = selection.stock().cloned().unwrap_or_default();

        Ok(SelectionResponse {
            sku: variant.sku.clone(),
            name: variant.name.clone(),
            unit_price: variant.unit_price,
            total_stock: stock.total_stock,
            batches: stock.batches,
            selected_batch: selection.selected_batch().map(|b| b.batch_code.clone()),
            stock_error,
        })
    }
}

/// Opens the dialog for a SKU (or variant id) and loads its stock.
pub async fn open_item(
    session: &SessionState,
    erp: &ErpState,
    key: &str,
) -> Result<SelectionResponse, ApiError> {
    debug!(key, "open_item command");

    let variant = erp
        .catalog()
        .lookup(key)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Product", key))?;

    let ticket = session.with_selection_mut(|selection| selection.open(variant.clone()));

    let (stock, stock_error) = match erp.stock().resolve(&variant, erp.location_id()).await {
        Ok(stock) => (stock, None),
        Err(e) => {
            warn!(sku = %variant.sku, error = %e, "Showing zero stock");
            (StockAvailability::unavailable(), Some(ApiError::from(e).message))
        }
    };

    session.with_selection_mut(|selection| {
        if !selection.attach_stock(ticket, stock) {
            debug!(ticket = ticket.value(), "Stale stock response dropped");
            return Err(ApiError::new(
                ErrorCode::OrderError,
                format!("Selection of {} was replaced", variant.sku),
            ));
        }
        SelectionResponse::from_selection(selection, stock_error)
    })
}

/// Picks a batch other than the preselected one.
pub fn select_batch(session: &SessionState, batch_code: &str) -> Result<SelectionResponse, ApiError> {
    debug!(batch_code, "select_batch command");
    session.with_selection_mut(|selection| {
        selection.select_batch(batch_code)?;
        SelectionResponse::from_selection(selection, None)
    })
}

/// Adds the open selection to the current order.
///
/// Fails with `INSUFFICIENT_STOCK` when the quantity (merged with any line
/// already drawn from the batch) exceeds what the batch holds. The dialog
/// stays open on failure.
pub fn confirm_item(
    session: &SessionState,
    erp: &ErpState,
    quantity: i64,
    discount: Money,
) -> Result<CartResponse, ApiError> {
    debug!(quantity, discount = %discount, "confirm_item command");
    session.with_selection_and_registry(|selection, registry| {
        let sku = selection.variant().map(|v| v.sku.clone()).unwrap_or_default();
        let batch = selection.selected_batch().map(|b| b.batch_code.clone()).unwrap_or_default();

        let order = registry.current_mut()?;
        selection.confirm(order, quantity, discount)?;

        info!(order = %order.name(), sku = %sku, batch = %batch, quantity, "Item added");
        Ok(CartResponse::from_order(order, erp.pricing()))
    })
}

pub fn cancel_item(session: &SessionState) {
    debug!("cancel_item command");
    session.with_selection_mut(ItemSelection::cancel);
}

/// One-step add: open, take the preselected batch, confirm.
pub async fn add_item(
    session: &SessionState,
    erp: &ErpState,
    key: &str,
    quantity: i64,
    discount: Money,
) -> Result<CartResponse, ApiError> {
    debug!(key, quantity, "add_item command");
    let opened = open_item(session, erp, key).await?;

    if let Some(reason) = opened.stock_error {
        cancel_item(session);
        return Err(ApiError::new(ErrorCode::StockUnavailable, reason));
    }

    let result = confirm_item(session, erp, quantity, discount);
    if result.is_err() {
        cancel_item(session);
    }
    result
}
