//! # Orders and Cart Lines
//!
//! One customer order and the lines in it.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Mutations                                      │
//! │                                                                         │
//! │  Cashier Action            Operation                 Line Change        │
//! │  ──────────────            ─────────                 ───────────        │
//! │                                                                         │
//! │  Confirm dialog ─────────► add_item() ─────────────► push / merge       │
//! │                                                                         │
//! │  +/- stepper ────────────► update_quantity() ──────► qty = n (≤ ceiling)│
//! │                                                      n ≤ 0 → remove     │
//! │                                                                         │
//! │  Remove ─────────────────► remove_item() ──────────► lines.remove(i)    │
//! │                                                                         │
//! │  Order discount ─────────► set_order_discount()                         │
//! │  Service charge ─────────► set_service_charge()                         │
//! │                                                                         │
//! │  Every check runs before anything is written: a rejected operation     │
//! │  leaves the order exactly as it was.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Fulfillment, ProductVariant, StockBatch};
use crate::validation::{
    validate_amount, validate_line_capacity, validate_quantity, validate_reference,
};
use crate::WALK_IN_CUSTOMER;

// =============================================================================
// Order Id
// =============================================================================

/// Opaque order identifier, generated locally when the order is opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn generate() -> Self {
        OrderId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        OrderId(value.to_string())
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        OrderId(value)
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// A variant drawn from a specific stock batch.
///
/// ## Design Notes
/// - Product data is frozen at add time so a catalog reload never reprices
///   an order in progress.
/// - `available` is the batch balance recorded when the line was last fed
///   from a stock snapshot. Every quantity change is checked against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub variant_id: String,
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub cost_price: Money,
    pub batch_code: String,
    pub expiry_date: Option<NaiveDate>,
    /// Batch ceiling recorded at add time.
    pub available: i64,
    pub quantity: i64,
    /// Line discount, absolute amount for the whole line.
    pub discount: Money,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_selection(variant: &ProductVariant, batch: &StockBatch, quantity: i64, discount: Money) -> Self {
        CartLine {
            product_id: variant.product_id.clone(),
            variant_id: variant.variant_id.clone(),
            sku: variant.sku.clone(),
            name: variant.name.clone(),
            unit_price: variant.unit_price,
            cost_price: variant.cost_price,
            batch_code: batch.batch_code.clone(),
            expiry_date: batch.expiry_date,
            available: batch.quantity,
            quantity,
            discount,
            added_at: Utc::now(),
        }
    }

    fn matches(&self, variant_id: &str, batch_code: &str) -> bool {
        self.variant_id == variant_id && self.batch_code == batch_code
    }

    /// Unit price × quantity.
    pub fn gross(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Gross less the line discount.
    pub fn net(&self) -> Money {
        self.gross() - self.discount
    }
}

// =============================================================================
// Order State
// =============================================================================

/// One customer order.
///
/// ## Invariants
/// - Lines are unique by (variant id, batch code)
/// - Every quantity is > 0 and ≤ the line's recorded ceiling
/// - Every line discount is ≥ 0 and ≤ the line's gross
/// - Order discount and service charge are ≥ 0
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderState {
    id: OrderId,
    name: String,
    sequence: u64,
    lines: Vec<CartLine>,
    customer_id: String,
    order_discount: Money,
    service_charge: Money,
    fulfillment: Fulfillment,
    created_at: DateTime<Utc>,
}

impl OrderState {
    /// Opens an empty order; `sequence` drives the display name.
    pub fn new(sequence: u64) -> Self {
        Self::for_customer(sequence, WALK_IN_CUSTOMER.to_string())
    }

    pub(crate) fn for_customer(sequence: u64, customer_id: String) -> Self {
        OrderState {
            id: OrderId::generate(),
            name: format!("Order {}", sequence),
            sequence,
            lines: Vec::new(),
            customer_id,
            order_discount: Money::zero(),
            service_charge: Money::zero(),
            fulfillment: Fulfillment::default(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, variant_id: &str, batch_code: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(variant_id, batch_code))
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn order_discount(&self) -> Money {
        self.order_discount
    }

    pub fn service_charge(&self) -> Money {
        self.service_charge
    }

    pub fn fulfillment(&self) -> &Fulfillment {
        &self.fulfillment
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Adds a variant drawn from `batch`, merging with an existing line.
    ///
    /// ## Behavior
    /// - Same (variant, batch) already present: quantity and discount are
    ///   summed into that line, and the line's ceiling is refreshed from
    ///   this snapshot
    /// - Otherwise a new line is appended
    ///
    /// ## Errors
    /// - `Validation` for a non-positive quantity, or a discount or unit
    ///   price that is negative or above `MAX_AMOUNT_CENTS`
    /// - `BatchMismatch` when the batch belongs to another variant
    /// - `InsufficientStock` when the resulting quantity exceeds the batch
    /// - `DiscountExceedsAmount` when the discount exceeds the line gross
    /// - `CartTooLarge` when a new line would exceed the line limit
    pub fn add_item(
        &mut self,
        variant: &ProductVariant,
        quantity: i64,
        discount: Money,
        batch: &StockBatch,
    ) -> CoreResult<()> {
        validate_quantity(quantity)?;
        validate_amount("discount", discount)?;
        validate_amount("unit price", variant.unit_price)?;

        if batch.variant_id != variant.variant_id {
            return Err(CoreError::BatchMismatch {
                variant_id: variant.variant_id.clone(),
                batch_code: batch.batch_code.clone(),
            });
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.matches(&variant.variant_id, &batch.batch_code))
        {
            let merged_qty = line.quantity + quantity;
            let merged_discount = line.discount + discount;
            validate_quantity(merged_qty)?;
            check_ceiling(&line.sku, &batch.batch_code, batch.quantity, merged_qty)?;
            check_discount(&line.sku, line.unit_price, merged_qty, merged_discount)?;

            line.quantity = merged_qty;
            line.discount = merged_discount;
            line.available = batch.quantity;
            return Ok(());
        }

        check_ceiling(&variant.sku, &batch.batch_code, batch.quantity, quantity)?;
        check_discount(&variant.sku, variant.unit_price, quantity, discount)?;
        validate_line_capacity(self.lines.len())
            .map_err(|_| CoreError::CartTooLarge { max: crate::MAX_ORDER_LINES })?;

        self.lines
            .push(CartLine::from_selection(variant, batch, quantity, discount));
        Ok(())
    }

    /// Sets a line's quantity directly (the cart stepper).
    ///
    /// ## Behavior
    /// - `new_quantity <= 0`: the line is removed
    /// - Otherwise checked against the line's recorded ceiling
    /// - A discount larger than the new gross is reduced to the gross
    pub fn update_quantity(
        &mut self,
        variant_id: &str,
        batch_code: &str,
        new_quantity: i64,
    ) -> CoreResult<()> {
        if new_quantity <= 0 {
            return self.remove_item(variant_id, batch_code).map(|_| ());
        }

        validate_quantity(new_quantity)?;

        let line = self
            .lines
            .iter_mut()
            .find(|l| l.matches(variant_id, batch_code))
            .ok_or_else(|| line_not_found(variant_id, batch_code))?;

        check_ceiling(&line.sku, &line.batch_code, line.available, new_quantity)?;

        line.quantity = new_quantity;
        let gross = line.gross();
        if line.discount > gross {
            line.discount = gross;
        }
        Ok(())
    }

    /// Removes the matching line and returns it.
    pub fn remove_item(&mut self, variant_id: &str, batch_code: &str) -> CoreResult<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|l| l.matches(variant_id, batch_code))
            .ok_or_else(|| line_not_found(variant_id, batch_code))?;

        Ok(self.lines.remove(index))
    }

    pub fn set_order_discount(&mut self, amount: Money) -> CoreResult<()> {
        validate_amount("order discount", amount)?;
        self.order_discount = amount;
        Ok(())
    }

    pub fn set_service_charge(&mut self, amount: Money) -> CoreResult<()> {
        validate_amount("service charge", amount)?;
        self.service_charge = amount;
        Ok(())
    }

    pub fn set_customer(&mut self, customer_id: &str) -> CoreResult<()> {
        self.customer_id = validate_reference("customer", customer_id)?;
        Ok(())
    }

    /// Changes the fulfillment type; table and steward only exist for Dine-In.
    pub fn set_fulfillment(&mut self, fulfillment: Fulfillment) -> CoreResult<()> {
        let fulfillment = match fulfillment {
            Fulfillment::DineIn { table, steward } => Fulfillment::DineIn {
                table: table.map(|t| validate_reference("table", &t)).transpose()?,
                steward: steward.map(|s| validate_reference("steward", &s)).transpose()?,
            },
            other => other,
        };
        self.fulfillment = fulfillment;
        Ok(())
    }
}

fn check_ceiling(sku: &str, batch_code: &str, available: i64, requested: i64) -> CoreResult<()> {
    if requested > available {
        return Err(CoreError::InsufficientStock {
            sku: sku.to_string(),
            batch: batch_code.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

fn check_discount(sku: &str, unit_price: Money, quantity: i64, discount: Money) -> CoreResult<()> {
    let gross = unit_price.multiply_quantity(quantity);
    if discount > gross {
        return Err(CoreError::DiscountExceedsAmount {
            sku: sku.to_string(),
            discount: discount.to_string(),
            amount: gross.to_string(),
        });
    }
    Ok(())
}

fn line_not_found(variant_id: &str, batch_code: &str) -> CoreError {
    CoreError::LineNotFound {
        variant_id: variant_id.to_string(),
        batch_code: batch_code.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
