//! # Stock Batch Resolution
//!
//! Answers "how much of this variant is on hand here, and in which batches?"
//! for the add-item dialog.
//!
//! ```text
//! GET /stock-entries/summary?company_id=1&product_id=P1&product_variant_id=V1&location_id=3
//!
//! {
//!   "total_stock": [ { "stock_balance": "8.000" } ],
//!   "grouped_by_expire_date": [
//!     { "patch_code": "B-01", "expire_date": "2025-03-01", "stock_balance": "3" },
//!     { "patch_code": "B-02", "expire_date": "2025-06-01", "stock_balance": "5" }
//!   ]
//! }
//! ```
//!
//! Batches come back soonest expiry first and keep that order. Batches with
//! nothing left are dropped.
//!
//! Lines are sold in whole units. A fractional balance ("2.500") is offered
//! as its whole part and logged; a batch with less than one unit is dropped.

use async_trait::async_trait;
use chrono::NaiveDate;
use payshia_core::{ProductVariant, StockAvailability, StockBatch};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::ErpClient;
use crate::error::{ErpError, ErpResult};
use crate::wire::{self, Balance};

/// Source of stock snapshots.
#[async_trait]
pub trait StockResolver: Send + Sync {
    /// Fails with `ErpError::StockFetch`; callers then treat the variant as
    /// having no stock.
    async fn resolve(
        &self,
        variant: &ProductVariant,
        location_id: &str,
    ) -> ErpResult<StockAvailability>;
}

#[derive(Debug, Deserialize)]
struct StockSummary {
    #[serde(default)]
    total_stock: Vec<TotalStock>,
    #[serde(default)]
    grouped_by_expire_date: Vec<BatchRow>,
}

#[derive(Debug, Deserialize)]
struct TotalStock {
    #[serde(default, deserialize_with = "wire::balance")]
    stock_balance: Balance,
}

#[derive(Debug, Deserialize)]
struct BatchRow {
    #[serde(alias = "batch_code", deserialize_with = "wire::id")]
    patch_code: String,
    #[serde(default, alias = "expiry_date")]
    expire_date: Option<String>,
    #[serde(default, deserialize_with = "wire::balance")]
    stock_balance: Balance,
}

impl StockSummary {
    fn into_availability(self, variant: &ProductVariant) -> StockAvailability {
        let total = self
            .total_stock
            .first()
            .map(|t| t.stock_balance.whole_units())
            .unwrap_or(0);

        let batches = self
            .grouped_by_expire_date
            .into_iter()
            .map(|row| {
                if row.stock_balance.is_fractional() {
                    warn!(
                        sku = %variant.sku,
                        batch = %row.patch_code,
                        balance = row.stock_balance.value(),
                        sellable = row.stock_balance.whole_units(),
                        "Fractional stock balance, selling whole units only"
                    );
                }
                let batch = StockBatch::new(
                    variant.product_id.clone(),
                    variant.variant_id.clone(),
                    row.patch_code,
                    row.stock_balance.whole_units(),
                );
                match row.expire_date.as_deref().and_then(parse_expiry) {
                    Some(date) => batch.with_expiry(date),
                    None => batch,
                }
            })
            .collect();

        StockAvailability::new(total, batches)
    }
}

/// Accepts `2025-03-01` and `2025-03-01 00:00:00`.
fn parse_expiry(raw: &str) -> Option<NaiveDate> {
    let date = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[async_trait]
impl StockResolver for ErpClient {
    async fn resolve(
        &self,
        variant: &ProductVariant,
        location_id: &str,
    ) -> ErpResult<StockAvailability> {
        let query = [
            ("company_id", self.company_id()),
            ("product_id", variant.product_id.as_str()),
            ("product_variant_id", variant.variant_id.as_str()),
            ("location_id", location_id),
        ];

        let summary: StockSummary = self
            .get_json("stock-entries/summary", &query)
            .await
            .map_err(|e| {
                warn!(sku = %variant.sku, error = %e, "Stock lookup failed");
                ErpError::stock_fetch(&variant.sku, e)
            })?;

        let availability = summary.into_availability(variant);
        debug!(
            sku = %variant.sku,
            total = availability.total_stock,
            batches = availability.batches.len(),
            "Stock resolved"
        );
        Ok(availability)
    }
}
