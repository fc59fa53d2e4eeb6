//! # Domain Types
//!
//! Reference data and closed enums used throughout Payshia POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ProductVariant  │   │   StockBatch    │   │ StockAvailability│      │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │   │  batch_code     │   │  total_stock    │       │
//! │  │  variant_id     │   │  expiry_date    │   │  batches (FIFO) │       │
//! │  │  sku, price     │   │  quantity       │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Fulfillment    │   │ PaymentMethod   │   │  CheckoutMode   │       │
//! │  │  TakeAway       │   │  Cash           │   │  Pay{method,..} │       │
//! │  │  Delivery       │   │  Card           │   │  Hold           │       │
//! │  │  DineIn{table,  │   │  Credit         │   │                 │       │
//! │  │    steward}     │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reference data (variants, batches) is fetched from the ERP backend and is
//! never mutated by the cart.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 800 bps = 8%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate(crate::DEFAULT_TAX_RATE_BPS)
    }
}

// =============================================================================
// Product Variant
// =============================================================================

/// A sellable unit as listed by the ERP catalog.
///
/// Immutable reference data. Cart lines keep their own frozen copy so a
/// catalog reload never changes the price of an order in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub product_id: String,
    pub variant_id: String,
    /// Stock Keeping Unit, what the cashier types or scans.
    pub sku: String,
    /// Display name shown on the order and the receipt.
    pub name: String,
    pub unit_price: Money,
    /// Cost price, forwarded to the invoice for margin reporting.
    pub cost_price: Money,
}

impl ProductVariant {
    pub fn new(
        product_id: impl Into<String>,
        variant_id: impl Into<String>,
        sku: impl Into<String>,
        name: impl Into<String>,
        unit_price: Money,
    ) -> Self {
        ProductVariant {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            sku: sku.into(),
            name: name.into(),
            unit_price,
            cost_price: Money::zero(),
        }
    }

    pub fn with_cost_price(mut self, cost_price: Money) -> Self {
        self.cost_price = cost_price;
        self
    }
}

// =============================================================================
// Stock Batch
// =============================================================================

/// One inbound stock lot of a variant at a location.
///
/// A read-only snapshot taken when the add-item dialog opens. It is not
/// refreshed while the dialog stays open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBatch {
    pub product_id: String,
    pub variant_id: String,
    /// Batch ("patch") code grouping the lot.
    pub batch_code: String,
    pub expiry_date: Option<NaiveDate>,
    /// Quantity available at snapshot time.
    pub quantity: i64,
}

impl StockBatch {
    pub fn new(
        product_id: impl Into<String>,
        variant_id: impl Into<String>,
        batch_code: impl Into<String>,
        quantity: i64,
    ) -> Self {
        StockBatch {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            batch_code: batch_code.into(),
            expiry_date: None,
            quantity,
        }
    }

    pub fn with_expiry(mut self, expiry_date: NaiveDate) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }
}

/// Stock of one variant at one location, as resolved for the add-item dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAvailability {
    /// Location-wide balance reported by the backend.
    pub total_stock: i64,
    /// Batches with a positive balance, soonest expiry first.
    pub batches: Vec<StockBatch>,
}

impl StockAvailability {
    /// Builds an availability, dropping batches that have nothing left.
    ///
    /// Backend order is preserved: the first batch is the one that expires
    /// soonest and becomes the default selection.
    pub fn new(total_stock: i64, batches: Vec<StockBatch>) -> Self {
        StockAvailability {
            total_stock,
            batches: batches.into_iter().filter(|b| b.quantity > 0).collect(),
        }
    }

    /// Zero stock. What the terminal shows when the lookup failed.
    pub fn unavailable() -> Self {
        StockAvailability::default()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn default_batch(&self) -> Option<&StockBatch> {
        self.batches.first()
    }

    pub fn batch(&self, batch_code: &str) -> Option<&StockBatch> {
        self.batches.iter().find(|b| b.batch_code == batch_code)
    }
}

// =============================================================================
// Fulfillment
// =============================================================================

/// How the order leaves the counter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fulfillment {
    #[default]
    TakeAway,
    Delivery,
    /// Served at a table, optionally by an assigned steward.
    DineIn {
        table: Option<String>,
        steward: Option<String>,
    },
}

impl Fulfillment {
    /// Wire code used in the invoice payload.
    pub fn code(&self) -> &'static str {
        match self {
            Fulfillment::TakeAway => "take_away",
            Fulfillment::Delivery => "delivery",
            Fulfillment::DineIn { .. } => "dine_in",
        }
    }

    pub fn table(&self) -> Option<&str> {
        match self {
            Fulfillment::DineIn { table, .. } => table.as_deref(),
            Fulfillment::TakeAway | Fulfillment::Delivery => None,
        }
    }

    pub fn steward(&self) -> Option<&str> {
        match self {
            Fulfillment::DineIn { steward, .. } => steward.as_deref(),
            Fulfillment::TakeAway | Fulfillment::Delivery => None,
        }
    }
}

impl fmt::Display for Fulfillment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fulfillment::TakeAway => write!(f, "Take Away"),
            Fulfillment::Delivery => write!(f, "Delivery"),
            Fulfillment::DineIn { table, steward } => {
                write!(f, "Dine-In")?;
                if let Some(table) = table {
                    write!(f, " (table {})", table)?;
                }
                if let Some(steward) = steward {
                    write!(f, " [steward {}]", steward)?;
                }
                Ok(())
            }
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash; the tendered amount determines the change.
    Cash,
    /// Card on an external terminal (simulated).
    Card,
    /// Charged to the customer's account.
    Credit,
}

impl PaymentMethod {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Credit => "credit",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" | "credit_card" | "debit" => Ok(PaymentMethod::Card),
            "credit" | "account" => Ok(PaymentMethod::Credit),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec!["cash".to_string(), "card".to_string(), "credit".to_string()],
            }),
        }
    }
}

// =============================================================================
// Checkout Mode & Invoice Status
// =============================================================================

/// What the cashier asked checkout to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CheckoutMode {
    /// Settle the order now.
    Pay {
        method: PaymentMethod,
        /// Amount handed over. Defaults to the total when absent.
        tendered: Option<Money>,
    },
    /// Save the order on the backend as a pending invoice.
    Hold,
}

impl CheckoutMode {
    pub fn invoice_status(&self) -> InvoiceStatus {
        match self {
            CheckoutMode::Pay { .. } => InvoiceStatus::Paid,
            CheckoutMode::Hold => InvoiceStatus::Pending,
        }
    }
}

/// Status flag of a POS invoice on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Paid,
    Pending,
}

impl InvoiceStatus {
    /// Numeric flag expected by `POST /pos-invoices` (1 paid, 2 pending).
    pub const fn wire_code(&self) -> u8 {
        match self {
            InvoiceStatus::Paid => 1,
            InvoiceStatus::Pending => 2,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_default_is_eight_percent() {
        let rate = TaxRate::default();
        assert_eq!(rate.bps(), 800);
        assert!((rate.percentage() - 8.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_availability_filters_empty_batches_and_keeps_order() {
        let availability = StockAvailability::new(
            7,
            vec![
                StockBatch::new("P1", "V1", "B-EMPTY", 0),
                StockBatch::new("P1", "V1", "B-SOON", 3),
                StockBatch::new("P1", "V1", "B-NEG", -2),
                StockBatch::new("P1", "V1", "B-LATER", 4),
            ],
        );

        let codes: Vec<_> = availability.batches.iter().map(|b| b.batch_code.as_str()).collect();
        assert_eq!(codes, vec!["B-SOON", "B-LATER"]);
        assert_eq!(availability.default_batch().unwrap().batch_code, "B-SOON");
        assert!(availability.batch("B-EMPTY").is_none());
    }

    #[test]
    fn test_unavailable_has_no_batches() {
        let availability = StockAvailability::unavailable();
        assert!(availability.is_empty());
        assert_eq!(availability.total_stock, 0);
        assert!(availability.default_batch().is_none());
    }

    #[test]
    fn test_fulfillment_accessors() {
        let dine_in = Fulfillment::DineIn {
            table: Some("T4".to_string()),
            steward: Some("S1".to_string()),
        };
        assert_eq!(dine_in.code(), "dine_in");
        assert_eq!(dine_in.table(), Some("T4"));
        assert_eq!(dine_in.steward(), Some("S1"));
        assert_eq!(dine_in.to_string(), "Dine-In (table T4) [steward S1]");

        assert_eq!(Fulfillment::default(), Fulfillment::TakeAway);
        assert_eq!(Fulfillment::Delivery.table(), None);
    }

    #[test]
    fn test_payment_method_from_str() {
        assert_eq!("Cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert_eq!("credit".parse::<PaymentMethod>().unwrap(), PaymentMethod::Credit);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_checkout_mode_status_codes() {
        let pay = CheckoutMode::Pay {
            method: PaymentMethod::Cash,
            tendered: None,
        };
        assert_eq!(pay.invoice_status().wire_code(), 1);
        assert_eq!(CheckoutMode::Hold.invoice_status().wire_code(), 2);
    }
}
