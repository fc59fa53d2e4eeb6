//! # Item Selection
//!
//! The add-item dialog as a plain value.
//!
//! ```text
//! open(variant) ──► ticket 7 ──► stock lookup in flight
//!                                     │
//!      open(other) ──► ticket 8       │   (cashier moved on)
//!                                     ▼
//!                    attach_stock(ticket 7, ..) → ignored
//! ```
//!
//! A stock response is only applied if it carries the ticket of the dialog
//! that is open right now. The first batch of the snapshot (soonest expiry)
//! is preselected; the cashier may pick another one before confirming.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::order::OrderState;
use crate::types::{ProductVariant, StockAvailability, StockBatch};

/// Identifies one opening of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SelectionTicket(u64);

impl SelectionTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct OpenSelection {
    ticket: SelectionTicket,
    variant: ProductVariant,
    stock: Option<StockAvailability>,
    selected_batch: Option<String>,
}

/// At most one open add-item dialog.
#[derive(Debug, Clone, Default)]
pub struct ItemSelection {
    last_ticket: u64,
    open: Option<OpenSelection>,
}

impl ItemSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the dialog for `variant`, replacing any dialog already open.
    pub fn open(&mut self, variant: ProductVariant) -> SelectionTicket {
        self.last_ticket += 1;
        let ticket = SelectionTicket(self.last_ticket);
        self.open = Some(OpenSelection {
            ticket,
            variant,
            stock: None,
            selected_batch: None,
        });
        ticket
    }

    /// Applies a stock snapshot. Returns `false` when the ticket is stale.
    pub fn attach_stock(&mut self, ticket: SelectionTicket, stock: StockAvailability) -> bool {
        match self.open.as_mut() {
            Some(open) if open.ticket == ticket => {
                open.selected_batch = stock.default_batch().map(|b| b.batch_code.clone());
                open.stock = Some(stock);
                true
            }
            _ => false,
        }
    }

    /// Overrides the preselected batch.
    pub fn select_batch(&mut self, batch_code: &str) -> CoreResult<()> {
        let open = self.open.as_mut().ok_or(CoreError::NoOpenSelection)?;
        let stock = open
            .stock
            .as_ref()
            .ok_or_else(|| CoreError::StockNotLoaded(open.variant.sku.clone()))?;

        if stock.batch(batch_code).is_none() {
            return Err(CoreError::BatchNotFound {
                sku: open.variant.sku.clone(),
                batch_code: batch_code.to_string(),
            });
        }

        open.selected_batch = Some(batch_code.to_string());
        Ok(())
    }

    /// Adds the selection to `order` and closes the dialog.
    ///
    /// On error the dialog stays open so the cashier can correct the
    /// quantity. With no batch on hand the add is blocked as if the
    /// available quantity were zero.
    pub fn confirm(&mut self, order: &mut OrderState, quantity: i64, discount: Money) -> CoreResult<()> {
        let open = self.open.as_ref().ok_or(CoreError::NoOpenSelection)?;
        let stock = open
            .stock
            .as_ref()
            .ok_or_else(|| CoreError::StockNotLoaded(open.variant.sku.clone()))?;

        let batch = open
            .selected_batch
            .as_deref()
            .and_then(|code| stock.batch(code))
            .ok_or_else(|| CoreError::InsufficientStock {
                sku: open.variant.sku.clone(),
                batch: "-".to_string(),
                available: 0,
                requested: quantity,
            })?;

        order.add_item(&open.variant, quantity, discount, batch)?;
        self.open = None;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.open = None;
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn ticket(&self) -> Option<SelectionTicket> {
        self.open.as_ref().map(|o| o.ticket)
    }

    pub fn variant(&self) -> Option<&ProductVariant> {
        self.open.as_ref().map(|o| &o.variant)
    }

    pub fn stock(&self) -> Option<&StockAvailability> {
        self.open.as_ref().and_then(|o| o.stock.as_ref())
    }

    pub fn selected_batch(&self) -> Option<&StockBatch> {
        let open = self.open.as_ref()?;
        let code = open.selected_batch.as_deref()?;
        open.stock.as_ref()?.batch(code)
    }
}
