//! # Product Catalog
//!
//! Loaded once when the terminal starts, from `GET /products/with-variants`.
//! Every sellable unit is a variant; the cashier looks one up by SKU.

use async_trait::async_trait;
use payshia_core::{Money, ProductVariant};
use serde::Deserialize;
use tracing::info;

use crate::client::ErpClient;
use crate::error::ErpResult;
use crate::wire;

/// Source of the product list.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load_variants(&self) -> ErpResult<Vec<ProductVariant>>;
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProductList {
    Bare(Vec<ProductRow>),
    Wrapped { data: Vec<ProductRow> },
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    #[serde(alias = "id", deserialize_with = "wire::id")]
    product_id: String,
    #[serde(default, alias = "name")]
    product_name: String,
    #[serde(default)]
    variants: Vec<VariantRow>,
}

#[derive(Debug, Deserialize)]
struct VariantRow {
    #[serde(alias = "variant_id", deserialize_with = "wire::id")]
    id: String,
    sku: String,
    #[serde(default, alias = "name")]
    variant_name: Option<String>,
    #[serde(default, alias = "price", with = "payshia_core::money::serde_decimal")]
    selling_price: Money,
    #[serde(default, with = "payshia_core::money::serde_decimal")]
    cost_price: Money,
}

impl ProductList {
    fn into_variants(self) -> Vec<ProductVariant> {
        let rows = match self {
            ProductList::Bare(rows) | ProductList::Wrapped { data: rows } => rows,
        };

        rows.into_iter()
            .flat_map(|product| {
                let ProductRow {
                    product_id,
                    product_name,
                    variants,
                } = product;
                variants.into_iter().map(move |v| {
                    let name = match v.variant_name.as_deref().map(str::trim) {
                        Some(suffix) if !suffix.is_empty() => format!("{} {}", product_name, suffix),
                        _ => product_name.clone(),
                    };
                    ProductVariant::new(product_id.clone(), v.id, v.sku, name, v.selling_price)
                        .with_cost_price(v.cost_price)
                })
            })
            .collect()
    }
}

#[async_trait]
impl CatalogSource for ErpClient {
    async fn load_variants(&self) -> ErpResult<Vec<ProductVariant>> {
        let list: ProductList = self.get_json("products/with-variants", &[]).await?;
        Ok(list.into_variants())
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// In-memory variant list with lookups.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    variants: Vec<ProductVariant>,
}

impl Catalog {
    pub fn new(variants: Vec<ProductVariant>) -> Self {
        Catalog { variants }
    }

    pub async fn load(source: &dyn CatalogSource) -> ErpResult<Self> {
        let variants = source.load_variants().await?;
        info!(variants = variants.len(), "Catalog loaded");
        Ok(Catalog::new(variants))
    }

    /// SKU match ignores case.
    pub fn by_sku(&self, sku: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.sku.eq_ignore_ascii_case(sku))
    }

    pub fn by_variant_id(&self, variant_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.variant_id == variant_id)
    }

    /// SKU first, then variant id.
    pub fn lookup(&self, key: &str) -> Option<&ProductVariant> {
        self.by_sku(key).or_else(|| self.by_variant_id(key))
    }

    /// Variants whose name or SKU contains `query` (case-insensitive).
    pub fn search(&self, query: &str) -> Vec<&ProductVariant> {
        let query = query.trim().to_lowercase();
        self.variants
            .iter()
            .filter(|v| {
                query.is_empty()
                    || v.name.to_lowercase().contains(&query)
                    || v.sku.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn variants(&self) -> &[ProductVariant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
