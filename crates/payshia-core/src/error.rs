//! # Error Types
//!
//! Domain-specific error types for payshia-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  payshia-core errors (this file)                                       │
//! │  ├── CoreError        - Order/registry rule violations                 │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  payshia-erp errors (separate crate)                                   │
//! │  ├── ErpError         - Backend/transport failures                     │
//! │  └── CheckoutError    - Checkout rejected or submission failed         │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── ApiError         - What the cashier sees                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Order and registry rule violations.
///
/// Every operation that returns one of these leaves the order untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested quantity exceeds what the batch had when it was picked.
    ///
    /// ## User Workflow
    /// ```text
    /// Batch B-01 shows 5 in stock
    ///      │
    ///      ▼
    /// Cashier confirms 6
    ///      │
    ///      ▼
    /// InsufficientStock { sku: "TEA-100", batch: "B-01", available: 5, requested: 6 }
    ///      │
    ///      ▼
    /// Terminal shows: "Only 5 TEA-100 left in batch B-01"
    /// ```
    #[error("Insufficient stock for {sku} (batch {batch}): available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        batch: String,
        available: i64,
        requested: i64,
    },

    /// An action needed an editable order but none is selected.
    #[error("No order is currently selected")]
    NoCurrentOrder,

    /// Order id is not in the registry.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Tried to resume the order that is already being edited.
    #[error("Order {0} is already the current order")]
    AlreadyCurrent(String),

    /// No line with this (variant, batch) identity in the order.
    #[error("No line for variant {variant_id} in batch {batch_code}")]
    LineNotFound {
        variant_id: String,
        batch_code: String,
    },

    /// Order has reached the maximum number of distinct lines.
    #[error("Order cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line discount larger than the line's gross amount.
    #[error("Discount {discount} exceeds line amount {amount} for {sku}")]
    DiscountExceedsAmount {
        sku: String,
        discount: String,
        amount: String,
    },

    /// The batch handed to `add_item` belongs to another variant.
    #[error("Batch {batch_code} does not belong to variant {variant_id}")]
    BatchMismatch {
        variant_id: String,
        batch_code: String,
    },

    /// Batch/confirm issued while no add-item dialog is open.
    #[error("No item is being added")]
    NoOpenSelection,

    /// The dialog's stock snapshot has not arrived yet.
    #[error("Stock for {0} is still loading")]
    StockNotLoaded(String),

    /// Batch code not among the batches offered for the variant.
    #[error("Batch {batch_code} is not available for {sku}")]
    BatchNotFound { sku: String, batch_code: String },

    /// Checkout attempted on an order with no lines.
    #[error("Order {0} has no items")]
    EmptyOrder(String),

    /// Discounts exceed everything charged; checkout refuses such orders.
    #[error("Order total is negative ({total}); reduce the discount")]
    NegativeTotal { total: String },

    /// Cash handed over does not cover the total.
    #[error("Tendered {tendered} does not cover total {total}")]
    InsufficientTender { tendered: String, total: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business rule runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Amount above what an order accepts.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Invalid format (e.g. a malformed amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
