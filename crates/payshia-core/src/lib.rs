//! # payshia-core: Pure Order Logic for Payshia POS
//!
//! This crate is the **heart** of the POS terminal. It holds the multi-order
//! cart, the pricing engine and every business rule as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Payshia POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Terminal (apps/terminal)                     │   │
//! │  │    stock, confirm, qty, park, pay, hold ...                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ payshia-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │  order   │ │ registry │ │ pricing  │ │selection │          │   │
//! │  │   │ CartLine │ │ current/ │ │ totals   │ │ batch    │          │   │
//! │  │   │OrderState│ │  held    │ │ tax      │ │ dialog   │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              payshia-erp (ERP REST boundary)                    │   │
//! │  │          stock summary, catalog, pos-invoices                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Reference data (variants, batches) and closed enums
//! - [`order`] - `CartLine` and `OrderState` mutations
//! - [`registry`] - `OrderRegistry`, the current/held order state machine
//! - [`pricing`] - `PricingEngine` and `OrderTotals`
//! - [`selection`] - The add-item dialog as a value (`ItemSelection`)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use payshia_core::{Money, OrderRegistry, PricingEngine, ProductVariant, StockBatch};
//!
//! let variant = ProductVariant::new("P1", "V1", "TEA-100", "Tea 100g", Money::from_cents(1000));
//! let batch = StockBatch::new("P1", "V1", "B-01", 5);
//!
//! let mut registry = OrderRegistry::new();
//! let order = registry.current_mut().unwrap();
//! order.add_item(&variant, 3, Money::from_cents(200), &batch).unwrap();
//! order.set_service_charge(Money::from_cents(150)).unwrap();
//! order.set_order_discount(Money::from_cents(50)).unwrap();
//!
//! let totals = PricingEngine::default().price(registry.current().unwrap());
//! assert_eq!(totals.total.cents(), 3124); // 31.24
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order;
pub mod pricing;
pub mod registry;
pub mod selection;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{CartLine, OrderId, OrderState};
pub use pricing::{OrderTotals, PricingEngine};
pub use registry::{OrderRegistry, RegistryState};
pub use selection::{ItemSelection, SelectionTicket};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat tax rate applied to every order, in basis points (8%).
///
/// Terminals may override it through configuration; this is the value the
/// pricing engine uses when none is given.
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

/// Customer reference used until the cashier picks a customer.
pub const WALK_IN_CUSTOMER: &str = "walk-in";

/// Maximum distinct lines allowed in a single order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Guards against typing 10000 instead of 10. The batch ceiling is usually
/// the tighter limit.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Largest unit price, discount or service charge an order accepts, in
/// cents (1,000,000,000.00).
///
/// With `MAX_ORDER_LINES` and `MAX_ITEM_QUANTITY` this keeps every total,
/// tax included, well inside `i64`.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;
