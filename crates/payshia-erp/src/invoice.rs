//! # POS Invoices
//!
//! The payload sent to `POST /pos-invoices` and the gateway that sends it.
//!
//! ## Payload Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  who/where   company_id, location_id, customer_id, created_by          │
//! │  how         order_type, table_id, steward_id                          │
//! │  what        items[] (product, variant, batch, price, discount, qty,   │
//! │              cost)                                                      │
//! │  totals      sub_total, item_discount, order_discount, service_charge, │
//! │              tax_amount, grand_total                                   │
//! │  settlement  payment_method, tendered_amount, balance_amount,          │
//! │              invoice_status (1 paid / 2 pending)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Amounts travel as two-decimal strings.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use payshia_core::money::serde_decimal;
use payshia_core::{CartLine, InvoiceStatus, Money, OrderState, OrderTotals, PaymentMethod};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::client::ErpClient;
use crate::error::{ErpError, ErpResult};

/// Terminal identity stamped on every invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceContext {
    pub company_id: String,
    pub location_id: String,
    pub cashier_id: String,
}

/// How the invoice is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    /// `None` for pending invoices.
    pub method: Option<PaymentMethod>,
    pub tendered: Money,
    /// Change due to the customer.
    pub balance: Money,
    pub status: InvoiceStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceItem {
    pub product_id: String,
    pub product_variant_id: String,
    pub patch_code: String,
    #[serde(with = "serde_decimal")]
    pub item_price: Money,
    #[serde(with = "serde_decimal")]
    pub item_discount: Money,
    pub quantity: i64,
    #[serde(with = "serde_decimal")]
    pub cost_price: Money,
}

impl From<&CartLine> for InvoiceItem {
    fn from(line: &CartLine) -> Self {
        InvoiceItem {
            product_id: line.product_id.clone(),
            product_variant_id: line.variant_id.clone(),
            patch_code: line.batch_code.clone(),
            item_price: line.unit_price,
            item_discount: line.discount,
            quantity: line.quantity,
            cost_price: line.cost_price,
        }
    }
}

/// Body of `POST /pos-invoices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoicePayload {
    /// Local order id, for tracing a submission back to the terminal.
    pub reference: String,
    pub invoice_date: DateTime<Utc>,
    pub company_id: String,
    pub location_id: String,
    pub customer_id: String,
    pub created_by: String,
    pub order_type: String,
    pub table_id: Option<String>,
    pub steward_id: Option<String>,
    pub items: Vec<InvoiceItem>,
    #[serde(with = "serde_decimal")]
    pub sub_total: Money,
    #[serde(with = "serde_decimal")]
    pub item_discount: Money,
    #[serde(with = "serde_decimal")]
    pub order_discount: Money,
    #[serde(with = "serde_decimal")]
    pub service_charge: Money,
    #[serde(with = "serde_decimal")]
    pub tax_amount: Money,
    #[serde(with = "serde_decimal")]
    pub grand_total: Money,
    pub payment_method: Option<String>,
    #[serde(with = "serde_decimal")]
    pub tendered_amount: Money,
    #[serde(with = "serde_decimal")]
    pub balance_amount: Money,
    pub invoice_status: u8,
}

impl InvoicePayload {
    pub fn build(
        order: &OrderState,
        totals: &OrderTotals,
        context: &InvoiceContext,
        settlement: &Settlement,
    ) -> Self {
        let fulfillment = order.fulfillment();
        InvoicePayload {
            reference: order.id().to_string(),
            invoice_date: Utc::now(),
            company_id: context.company_id.clone(),
            location_id: context.location_id.clone(),
            customer_id: order.customer_id().to_string(),
            created_by: context.cashier_id.clone(),
            order_type: fulfillment.code().to_string(),
            table_id: fulfillment.table().map(str::to_string),
            steward_id: fulfillment.steward().map(str::to_string),
            items: order.lines().iter().map(InvoiceItem::from).collect(),
            sub_total: totals.subtotal,
            item_discount: totals.item_discounts,
            order_discount: totals.order_discount,
            service_charge: totals.service_charge,
            tax_amount: totals.tax,
            grand_total: totals.total,
            payment_method: settlement.method.map(|m| m.code().to_string()),
            tendered_amount: settlement.tendered,
            balance_amount: settlement.balance,
            invoice_status: settlement.status.wire_code(),
        }
    }
}

/// What the backend hands back for a created invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceAck {
    pub invoice_id: String,
    pub invoice_number: String,
}

impl InvoiceAck {
    /// Reads the ack from either the top level or a `data` envelope.
    pub fn from_value(value: &Value) -> ErpResult<Self> {
        let body = value.get("data").filter(|d| d.is_object()).unwrap_or(value);

        let field = |names: &[&str]| {
            names.iter().find_map(|name| match body.get(*name) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
        };

        let invoice_number = field(&["invoice_number", "invoice_no"]).ok_or_else(|| {
            ErpError::InvalidResponse("invoice response has no invoice_number".to_string())
        })?;
        let invoice_id = field(&["invoice_id", "id"]).unwrap_or_else(|| invoice_number.clone());

        Ok(InvoiceAck {
            invoice_id,
            invoice_number,
        })
    }
}

/// Where invoices are submitted.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    async fn submit(&self, payload: &InvoicePayload) -> ErpResult<InvoiceAck>;
}

#[async_trait]
impl<T: InvoiceGateway + ?Sized> InvoiceGateway for Arc<T> {
    async fn submit(&self, payload: &InvoicePayload) -> ErpResult<InvoiceAck> {
        (**self).submit(payload).await
    }
}

#[async_trait]
impl InvoiceGateway for ErpClient {
    async fn submit(&self, payload: &InvoicePayload) -> ErpResult<InvoiceAck> {
        let body: Value = self.post_json("pos-invoices", payload).await?;
        InvoiceAck::from_value(&body).map_err(|e| {
            error!(body = %body, error = %e, "Invoice accepted but acknowledgement unreadable");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payshia_core::{Fulfillment, PricingEngine, ProductVariant, StockBatch};
    use serde_json::json;

    fn context() -> InvoiceContext {
        InvoiceContext {
            company_id: "1".into(),
            location_id: "3".into(),
            cashier_id: "cashier-9".into(),
        }
    }

    fn sample_order() -> OrderState {
        let tea = ProductVariant::new("P1", "V1", "TEA-100", "Tea", Money::from_cents(1000))
            .with_cost_price(Money::from_cents(600));
        let mut order = OrderState::new(1);
        order
            .add_item(&tea, 3, Money::from_cents(200), &StockBatch::new("P1", "V1", "B-01", 5))
            .unwrap();
        order.set_service_charge(Money::from_cents(150)).unwrap();
        order.set_order_discount(Money::from_cents(50)).unwrap();
        order
            .set_fulfillment(Fulfillment::DineIn {
                table: Some("T4".into()),
                steward: Some("S1".into()),
            })
            .unwrap();
        order
    }

    #[test]
    fn test_payload_wire_format() {
        let order = sample_order();
        let totals = PricingEngine::default().price(&order);
        let settlement = Settlement {
            method: Some(PaymentMethod::Cash),
            tendered: Money::from_cents(4000),
            balance: Money::from_cents(876),
            status: InvoiceStatus::Paid,
        };

        let payload = InvoicePayload::build(&order, &totals, &context(), &settlement);
        let wire = serde_json::to_value(&payload).unwrap();

        assert_eq!(wire["location_id"], "3");
        assert_eq!(wire["customer_id"], "walk-in");
        assert_eq!(wire["created_by"], "cashier-9");
        assert_eq!(wire["order_type"], "dine_in");
        assert_eq!(wire["table_id"], "T4");
        assert_eq!(wire["steward_id"], "S1");
        assert_eq!(wire["sub_total"], "30.00");
        assert_eq!(wire["item_discount"], "2.00");
        assert_eq!(wire["tax_amount"], "2.24");
        assert_eq!(wire["grand_total"], "31.24");
        assert_eq!(wire["payment_method"], "cash");
        assert_eq!(wire["balance_amount"], "8.76");
        assert_eq!(wire["invoice_status"], 1);
        assert_eq!(
            wire["items"][0],
            json!({
                "product_id": "P1",
                "product_variant_id": "V1",
                "patch_code": "B-01",
                "item_price": "10.00",
                "item_discount": "2.00",
                "quantity": 3,
                "cost_price": "6.00"
            })
        );
    }

    #[test]
    fn test_pending_payload_has_no_method() {
        let order = sample_order();
        let totals = PricingEngine::default().price(&order);
        let settlement = Settlement {
            method: None,
            tendered: Money::zero(),
            balance: Money::zero(),
            status: InvoiceStatus::Pending,
        };

        let wire = serde_json::to_value(InvoicePayload::build(&order, &totals, &context(), &settlement)).unwrap();
        assert_eq!(wire["invoice_status"], 2);
        assert!(wire["payment_method"].is_null());
    }

    #[test]
    fn test_ack_parsing() {
        let ack = InvoiceAck::from_value(&json!({"invoice_id": 55, "invoice_number": "INV-0055"})).unwrap();
        assert_eq!(ack.invoice_id, "55");
        assert_eq!(ack.invoice_number, "INV-0055");

        let ack = InvoiceAck::from_value(&json!({"message": "ok", "data": {"id": "9", "invoice_number": "INV-9"}})).unwrap();
        assert_eq!(ack.invoice_id, "9");

        let ack = InvoiceAck::from_value(&json!({"invoice_number": "INV-1"})).unwrap();
        assert_eq!(ack.invoice_id, "INV-1");

        assert!(matches!(
            InvoiceAck::from_value(&json!({"message": "ok"})),
            Err(ErpError::InvalidResponse(_))
        ));
    }
}
