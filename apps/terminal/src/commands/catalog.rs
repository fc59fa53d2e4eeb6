//! Catalog lookups. The catalog is loaded once at startup.

use payshia_core::ProductVariant;
use tracing::debug;

use crate::error::ApiError;
use crate::state::ErpState;

/// Variants whose SKU or name contains `query`; everything when empty.
pub fn search_catalog(erp: &ErpState, query: &str) -> Result<Vec<ProductVariant>, ApiError> {
    debug!(query, "search_catalog command");
    Ok(erp.catalog().search(query).into_iter().cloned().collect())
}
