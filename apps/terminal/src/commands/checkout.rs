//! # Checkout Commands
//!
//! Sends the current order to the ERP as a paid or pending invoice.
//!
//! ```text
//! pay cash 5000 ──► invoice status 1, change returned ──► order removed
//! hold          ──► invoice status 2 (pending)         ──► order removed
//! ```
//!
//! If the backend refuses, the order stays current and untouched so the
//! cashier can fix it and try again.

use payshia_core::{CheckoutMode, CoreError, Money, PaymentMethod};
use payshia_erp::CheckoutReceipt;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::{ErpState, SessionState};

async fn checkout_current(
    session: &SessionState,
    erp: &ErpState,
    mode: CheckoutMode,
) -> Result<CheckoutReceipt, ApiError> {
    let order_id = session
        .with_registry(|registry| registry.current_id().cloned())
        .ok_or(CoreError::NoCurrentOrder)?;

    erp.checkout()
        .checkout(session.registry(), &order_id, mode)
        .await
        .map_err(|e| {
            warn!(order_id = %order_id, error = %e, "Checkout did not complete");
            ApiError::from(e)
        })
}

/// Settles the current order. `tendered` only matters for cash.
pub async fn pay(
    session: &SessionState,
    erp: &ErpState,
    method: PaymentMethod,
    tendered: Option<Money>,
) -> Result<CheckoutReceipt, ApiError> {
    debug!(method = method.code(), tendered = ?tendered, "pay command");
    checkout_current(session, erp, CheckoutMode::Pay { method, tendered }).await
}

/// Records the current order as a pending invoice.
pub async fn hold(session: &SessionState, erp: &ErpState) -> Result<CheckoutReceipt, ApiError> {
    debug!("hold command");
    checkout_current(session, erp, CheckoutMode::Hold).await
}
