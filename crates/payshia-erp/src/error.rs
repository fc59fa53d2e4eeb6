//! # ERP Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ConfigError    - pos.toml / PAYSHIA_* could not be turned into config  │
//! │  ErpError       - a call to the backend failed                         │
//! │  CheckoutError  - checkout refused locally, or submission failed       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here retries. The cashier sees the message and decides.

use payshia_core::CoreError;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },

    #[error("Missing required setting: {0}")]
    Missing(String),
}

/// Failures talking to the ERP backend.
#[derive(Debug, Error)]
pub enum ErpError {
    /// Connection refused, timeout, TLS failure...
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer. `message` is the backend's own text when it sent one.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },

    /// 2xx answer whose body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Stock lookup for the add-item dialog failed.
    #[error("Could not load stock for {sku}: {reason}")]
    StockFetch { sku: String, reason: String },
}

impl ErpError {
    /// Wraps any backend failure as a stock lookup failure for `sku`.
    pub fn stock_fetch(sku: &str, source: ErpError) -> Self {
        ErpError::StockFetch {
            sku: sku.to_string(),
            reason: source.to_string(),
        }
    }
}

pub type ErpResult<T> = Result<T, ErpError>;

/// Why a checkout did not go through.
///
/// `Rejected` never reached the network; `Submission` did and the backend
/// (or the transport) said no. `Unconfirmed` means the backend accepted the
/// invoice but its answer could not be read. In every case the order is
/// still open.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    Rejected(#[from] CoreError),

    #[error("Checkout failed: {0}")]
    Submission(#[source] ErpError),

    /// Retrying may create a second invoice.
    #[error("The invoice may already exist; check the ERP before retrying ({0})")]
    Unconfirmed(#[source] ErpError),
}
