//! # ERP Configuration
//!
//! Where the terminal finds its backend and who it sells as.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PAYSHIA_BASE_URL=https://server-erp.payshia.com                    │
//! │     PAYSHIA_LOCATION_ID=3                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $PAYSHIA_CONFIG, or                                                │
//! │     ~/.config/payshia-pos/pos.toml (Linux)                             │
//! │     ~/Library/Application Support/com.payshia.payshia-pos/pos.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pos.toml
//! [api]
//! base_url = "https://server-erp.payshia.com"
//! token = "..."
//! timeout_secs = 30
//! receipt_url = "https://erp.example.com/print/{invoice_number}"
//!
//! [terminal]
//! company_id = "1"
//! location_id = "3"
//! cashier_id = "admin"
//! default_customer = "walk-in"
//!
//! [pricing]
//! tax_rate_bps = 800
//! ```

use std::path::PathBuf;
use std::time::Duration;

use payshia_core::validation::validate_tax_rate_bps;
use payshia_core::{TaxRate, DEFAULT_TAX_RATE_BPS, WALK_IN_CUSTOMER};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::ConfigError;

/// Placeholder substituted with the invoice number in `receipt_url`.
pub const INVOICE_NUMBER_PLACEHOLDER: &str = "{invoice_number}";

pub const DEFAULT_BASE_URL: &str = "https://server-erp.payshia.com";

// =============================================================================
// Sections
// =============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token; sent only when set.
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Receipt print URL with an `{invoice_number}` placeholder.
    #[serde(default)]
    pub receipt_url: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout(),
            receipt_url: None,
        }
    }
}

/// Who this terminal sells as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalSettings {
    #[serde(default = "default_company")]
    pub company_id: String,

    #[serde(default = "default_location")]
    pub location_id: String,

    /// Recorded as `created_by` on every invoice.
    #[serde(default = "default_cashier")]
    pub cashier_id: String,

    #[serde(default = "default_customer")]
    pub default_customer: String,
}

fn default_company() -> String {
    "1".to_string()
}

fn default_location() -> String {
    "1".to_string()
}

fn default_cashier() -> String {
    "pos".to_string()
}

fn default_customer() -> String {
    WALK_IN_CUSTOMER.to_string()
}

impl Default for TerminalSettings {
    fn default() -> Self {
        TerminalSettings {
            company_id: default_company(),
            location_id: default_location(),
            cashier_id: default_cashier(),
            default_customer: default_customer(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    #[serde(default = "default_tax_rate")]
    pub tax_rate_bps: u32,
}

fn default_tax_rate() -> u32 {
    DEFAULT_TAX_RATE_BPS
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            tax_rate_bps: default_tax_rate(),
        }
    }
}

// =============================================================================
// ErpConfig
// =============================================================================

/// Complete terminal configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErpConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub terminal: TerminalSettings,

    #[serde(default)]
    pub pricing: PricingSettings,
}

impl ErpConfig {
    /// Loads configuration: file (if present), then environment, then validation.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var("PAYSHIA_CONFIG").ok().map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading terminal config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Platform config location of `pos.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "payshia", "payshia-pos")
            .map(|dirs| dirs.config_dir().join("pos.toml"))
    }

    /// Applies `PAYSHIA_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PAYSHIA_BASE_URL") {
            debug!(base_url = %url, "Overriding base URL from environment");
            self.api.base_url = url;
        }
        if let Some(token) = lookup("PAYSHIA_API_TOKEN") {
            self.api.token = Some(token);
        }
        if let Some(timeout) = lookup("PAYSHIA_TIMEOUT_SECS") {
            self.api.timeout_secs = parse_number("PAYSHIA_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(url) = lookup("PAYSHIA_RECEIPT_URL") {
            self.api.receipt_url = Some(url);
        }
        if let Some(id) = lookup("PAYSHIA_COMPANY_ID") {
            self.terminal.company_id = id;
        }
        if let Some(id) = lookup("PAYSHIA_LOCATION_ID") {
            debug!(location_id = %id, "Overriding location from environment");
            self.terminal.location_id = id;
        }
        if let Some(id) = lookup("PAYSHIA_CASHIER_ID") {
            self.terminal.cashier_id = id;
        }
        if let Some(customer) = lookup("PAYSHIA_DEFAULT_CUSTOMER") {
            self.terminal.default_customer = customer;
        }
        if let Some(bps) = lookup("PAYSHIA_TAX_RATE_BPS") {
            self.pricing.tax_rate_bps = parse_number("PAYSHIA_TAX_RATE_BPS", &bps)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.api.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Base URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        for (key, value) in [
            ("company_id", &self.terminal.company_id),
            ("location_id", &self.terminal.location_id),
            ("cashier_id", &self.terminal.cashier_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(key.to_string()));
            }
        }

        validate_tax_rate_bps(self.pricing.tax_rate_bps).map_err(|e| ConfigError::Invalid {
            key: "tax_rate_bps".into(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.pricing.tax_rate_bps)
    }

    /// Print URL for an invoice, when a receipt URL is configured.
    pub fn receipt_url_for(&self, invoice_number: &str) -> Option<String> {
        self.api
            .receipt_url
            .as_ref()
            .map(|template| template.replace(INVOICE_NUMBER_PLACEHOLDER, invoice_number))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key: key.to_string(),
        reason: format!("'{}' is not a valid number", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = ErpConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.tax_rate().bps(), 800);
        assert_eq!(config.terminal.default_customer, WALK_IN_CUSTOMER);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ErpConfig::from_toml(
            r#"
            [terminal]
            location_id = "7"

            [pricing]
            tax_rate_bps = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.terminal.location_id, "7");
        assert_eq!(config.terminal.company_id, "1");
        assert_eq!(config.pricing.tax_rate_bps, 1500);
        assert_eq!(config.api.timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ErpConfig::from_toml(
            r#"
            [api]
            base_url = "https://file.example.com"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            ("PAYSHIA_BASE_URL", "http://127.0.0.1:9000"),
            ("PAYSHIA_TIMEOUT_SECS", "5"),
            ("PAYSHIA_LOCATION_ID", "3"),
        ]
        .into_iter()
        .collect();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.terminal.location_id, "3");
    }

    #[test]
    fn test_bad_numeric_override() {
        let mut config = ErpConfig::default();
        let result = config.apply_overrides(|key| {
            (key == "PAYSHIA_TAX_RATE_BPS").then(|| "eight".to_string())
        });
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ErpConfig::default();
        config.api.base_url = "ftp://server".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        let mut config = ErpConfig::default();
        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        let mut config = ErpConfig::default();
        config.terminal.location_id = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));

        let mut config = ErpConfig::default();
        config.pricing.tax_rate_bps = 20_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_receipt_url_for() {
        let mut config = ErpConfig::default();
        assert_eq!(config.receipt_url_for("INV-1"), None);

        config.api.receipt_url = Some("https://print.example.com/{invoice_number}".into());
        assert_eq!(
            config.receipt_url_for("INV-1").as_deref(),
            Some("https://print.example.com/INV-1")
        );
    }
}
