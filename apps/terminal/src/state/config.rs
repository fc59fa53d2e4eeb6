//! # Configuration State
//!
//! Display settings for the terminal. Backend settings live in
//! `payshia_erp::ErpConfig`.
//!
//! ## Sources (Priority Order)
//! 1. Environment variables (`PAYSHIA_STORE_NAME`, `PAYSHIA_CURRENCY_SYMBOL`)
//! 2. Defaults (this file)
//!
//! Read-only after startup, so no mutex.

use payshia_core::Money;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Shown in the shell banner and on receipts.
    pub store_name: String,

    /// Currency code (ISO 4217)
    pub currency_code: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            store_name: "Payshia POS".to_string(),
            currency_code: "LKR".to_string(),
            currency_symbol: "Rs. ".to_string(),
        }
    }
}

impl ConfigState {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(name) = lookup("PAYSHIA_STORE_NAME") {
            config.store_name = name;
        }
        if let Some(code) = lookup("PAYSHIA_CURRENCY_CODE") {
            config.currency_code = code;
        }
        if let Some(symbol) = lookup("PAYSHIA_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        config
    }

    /// Formats an amount with the currency symbol.
    ///
    /// ## Example
    /// ```rust
    /// use payshia_core::Money;
    /// use payshia_terminal::state::ConfigState;
    ///
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(3124)), "Rs. 31.24");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.currency_symbol, (-amount).to_decimal_string())
        } else {
            format!("{}{}", self.currency_symbol, amount.to_decimal_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_positive() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_cents(1234)), "Rs. 12.34");
        assert_eq!(config.format_currency(Money::from_cents(1)), "Rs. 0.01");
        assert_eq!(config.format_currency(Money::zero()), "Rs. 0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(Money::from_cents(-1234)), "-Rs. 12.34");
    }

    #[test]
    fn test_lookup_overrides() {
        let config = ConfigState::from_lookup(|key| match key {
            "PAYSHIA_STORE_NAME" => Some("Kandy Branch".to_string()),
            "PAYSHIA_CURRENCY_SYMBOL" => Some("$".to_string()),
            _ => None,
        });
        assert_eq!(config.store_name, "Kandy Branch");
        assert_eq!(config.currency_code, "LKR");
        assert_eq!(config.format_currency(Money::from_cents(500)), "$5.00");
    }
}
