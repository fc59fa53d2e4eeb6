//! # Checkout Coordinator
//!
//! Turns an open order into a backend invoice.
//!
//! ## Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. lock registry ─► snapshot order + totals ─► local checks ─► unlock  │
//! │                                                                         │
//! │       empty order ──────────────► Rejected(EmptyOrder)                  │
//! │       total < 0 ────────────────► Rejected(NegativeTotal)               │
//! │       cash tendered < total ────► Rejected(InsufficientTender)          │
//! │                                                                         │
//! │  2. POST /pos-invoices  (no lock held)                                  │
//! │                                                                         │
//! │       failure ──────────────────► Submission(..), order untouched       │
//! │       2xx, unreadable body ─────► Unconfirmed(..), order untouched      │
//! │                                                                         │
//! │  3. lock registry ─► checkout_success(order) ─► unlock                  │
//! │                                                                         │
//! │  4. receipt { invoice number, totals, change, print url }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pay and Hold take the same path; they differ in the settlement block
//! and the status flag.

use std::sync::{Mutex, MutexGuard, PoisonError};

use payshia_core::{
    CheckoutMode, CoreError, InvoiceStatus, Money, OrderId, OrderRegistry, OrderTotals,
    PaymentMethod, PricingEngine,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::ErpConfig;
use crate::error::{CheckoutError, ErpError};
use crate::invoice::{InvoiceContext, InvoiceGateway, InvoicePayload, Settlement};

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutReceipt {
    pub order_id: OrderId,
    pub order_name: String,
    pub invoice_id: String,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub payment_method: Option<PaymentMethod>,
    pub totals: OrderTotals,
    pub tendered: Money,
    pub change: Money,
    pub print_url: Option<String>,
}

/// Submits orders through an [`InvoiceGateway`].
pub struct CheckoutCoordinator<G> {
    gateway: G,
    pricing: PricingEngine,
    context: InvoiceContext,
    config: ErpConfig,
}

impl<G: InvoiceGateway> CheckoutCoordinator<G> {
    /// Builds a coordinator from terminal configuration.
    pub fn from_config(gateway: G, config: &ErpConfig) -> Self {
        CheckoutCoordinator {
            gateway,
            pricing: PricingEngine::new(config.tax_rate()),
            context: InvoiceContext {
                company_id: config.terminal.company_id.clone(),
                location_id: config.terminal.location_id.clone(),
                cashier_id: config.terminal.cashier_id.clone(),
            },
            config: config.clone(),
        }
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Checks out `order_id` from `registry`.
    ///
    /// The registry lock is never held across the network call.
    pub async fn checkout(
        &self,
        registry: &Mutex<OrderRegistry>,
        order_id: &OrderId,
        mode: CheckoutMode,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let (payload, totals, settlement, order_name) = {
            let registry = lock(registry);
            let order = registry
                .get(order_id)
                .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;
            let totals = self.pricing.price(order);

            if order.is_empty() {
                warn!(order_id = %order_id, "Checkout refused: no items");
                return Err(CoreError::EmptyOrder(order.name().to_string()).into());
            }
            if totals.total.is_negative() {
                warn!(order_id = %order_id, total = %totals.total, "Checkout refused: negative total");
                return Err(CoreError::NegativeTotal {
                    total: totals.total.to_string(),
                }
                .into());
            }

            let settlement = settle(mode, totals.total)?;
            let payload = InvoicePayload::build(order, &totals, &self.context, &settlement);
            (payload, totals, settlement, order.name().to_string())
        };

        let ack = self.gateway.submit(&payload).await.map_err(|e| {
            error!(order_id = %order_id, error = %e, "Invoice submission failed");
            match e {
                unreadable @ ErpError::InvalidResponse(_) => CheckoutError::Unconfirmed(unreadable),
                other => CheckoutError::Submission(other),
            }
        })?;

        // The order may have been cleared while the request was in flight;
        // the invoice exists either way.
        if let Err(e) = lock(registry).checkout_success(order_id) {
            warn!(order_id = %order_id, error = %e, "Order vanished during checkout");
        }

        info!(
            order_id = %order_id,
            invoice = %ack.invoice_number,
            status = ?settlement.status,
            total = %totals.total,
            "Checkout complete"
        );

        let print_url = self.config.receipt_url_for(&ack.invoice_number);

        Ok(CheckoutReceipt {
            order_id: order_id.clone(),
            order_name,
            invoice_id: ack.invoice_id,
            invoice_number: ack.invoice_number,
            status: settlement.status,
            payment_method: settlement.method,
            totals,
            tendered: settlement.tendered,
            change: settlement.balance,
            print_url,
        })
    }
}

fn lock(registry: &Mutex<OrderRegistry>) -> MutexGuard<'_, OrderRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Works out tendered amount and change for `mode`.
fn settle(mode: CheckoutMode, total: Money) -> Result<Settlement, CoreError> {
    match mode {
        CheckoutMode::Hold => Ok(Settlement {
            method: None,
            tendered: Money::zero(),
            balance: Money::zero(),
            status: InvoiceStatus::Pending,
        }),
        CheckoutMode::Pay { method, tendered } => {
            let tendered = match (method, tendered) {
                (PaymentMethod::Cash, Some(amount)) => {
                    if amount < total {
                        return Err(CoreError::InsufficientTender {
                            tendered: amount.to_string(),
                            total: total.to_string(),
                        });
                    }
                    amount
                }
                _ => total,
            };
            Ok(Settlement {
                method: Some(method),
                tendered,
                balance: tendered - total,
                status: InvoiceStatus::Paid,
            })
        }
    }
}
