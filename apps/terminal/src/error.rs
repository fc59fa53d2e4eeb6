//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Payshia POS                            │
//! │                                                                         │
//! │  Shell                       Command layer                              │
//! │  ─────                       ─────────────                              │
//! │                                                                         │
//! │  > confirm 6                                                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Rule broken? ──── CoreError::InsufficientStock ──┐             │  │
//! │  │         │                                         │             │  │
//! │  │         ▼                                         ▼             │  │
//! │  │  Backend failed? ── ErpError / CheckoutError ── ApiError ──────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ! [INSUFFICIENT_STOCK] Insufficient stock for TEA-100 (batch B-01):   │
//! │    available 5, requested 6                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The shell prints the error and keeps going. Nothing is retried.

use payshia_core::{CoreError, ValidationError};
use payshia_erp::{CheckoutError, ConfigError, ErpError};
use serde::Serialize;
use thiserror::Error;

/// Error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for TEA-100 (batch B-01): available 5, requested 6"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable message for the cashier
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Order, line, product or batch not found
    NotFound,

    /// Input could not be parsed or failed validation
    ValidationError,

    /// Quantity above what the batch holds
    InsufficientStock,

    /// Stock lookup failed; the item cannot be added
    StockUnavailable,

    /// Action needs an order but none is current
    NoCurrentOrder,

    /// Order rule violated (line limit, discount above amount...)
    OrderError,

    /// Checkout refused before reaching the backend
    CheckoutRejected,

    /// Backend refused or could not be reached
    BackendError,

    /// Anything else
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::StockUnavailable => "STOCK_UNAVAILABLE",
            ErrorCode::NoCurrentOrder => "NO_CURRENT_ORDER",
            ErrorCode::OrderError => "ORDER_ERROR",
            ErrorCode::CheckoutRejected => "CHECKOUT_REJECTED",
            ErrorCode::BackendError => "BACKEND_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::NoCurrentOrder => ErrorCode::NoCurrentOrder,
            CoreError::OrderNotFound(_)
            | CoreError::LineNotFound { .. }
            | CoreError::BatchNotFound { .. } => ErrorCode::NotFound,
            CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::EmptyOrder(_)
            | CoreError::NegativeTotal { .. }
            | CoreError::InsufficientTender { .. } => ErrorCode::CheckoutRejected,
            CoreError::AlreadyCurrent(_)
            | CoreError::CartTooLarge { .. }
            | CoreError::DiscountExceedsAmount { .. }
            | CoreError::BatchMismatch { .. }
            | CoreError::NoOpenSelection
            | CoreError::StockNotLoaded(_) => ErrorCode::OrderError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts ERP errors to API errors.
impl From<ErpError> for ApiError {
    fn from(err: ErpError) -> Self {
        match &err {
            ErpError::StockFetch { .. } => ApiError::new(ErrorCode::StockUnavailable, err.to_string()),
            ErpError::Api { .. } => ApiError::new(ErrorCode::BackendError, err.to_string()),
            ErpError::Http(e) => {
                tracing::error!("ERP request failed: {}", e);
                ApiError::new(ErrorCode::BackendError, "Could not reach the ERP server")
            }
            ErpError::InvalidResponse(e) => {
                tracing::error!("Unexpected ERP response: {}", e);
                ApiError::new(ErrorCode::BackendError, "Unexpected response from the ERP server")
            }
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Rejected(e) => ApiError::from(e),
            CheckoutError::Submission(e) => {
                let inner = ApiError::from(e);
                ApiError::new(inner.code, format!("Checkout failed: {}", inner.message))
            }
            unconfirmed @ CheckoutError::Unconfirmed(_) => {
                ApiError::new(ErrorCode::BackendError, unconfirmed.to_string())
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Reasons the terminal could not start.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("ERP client error: {0}")]
    Erp(#[from] ErpError),

    #[error("Invalid terminal setting: {0}")]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
