//! # ERP State
//!
//! Handles to the backend: the catalog loaded at startup, the stock
//! resolver and the checkout coordinator. Shared read-only by commands.

use std::sync::Arc;

use payshia_core::PricingEngine;
use payshia_erp::{
    Catalog, CheckoutCoordinator, ErpClient, ErpConfig, InvoiceGateway, StockResolver,
};

pub struct ErpState {
    catalog: Catalog,
    stock: Arc<dyn StockResolver>,
    checkout: CheckoutCoordinator<Arc<dyn InvoiceGateway>>,
    location_id: String,
}

impl ErpState {
    pub fn new(
        catalog: Catalog,
        stock: Arc<dyn StockResolver>,
        invoices: Arc<dyn InvoiceGateway>,
        config: &ErpConfig,
    ) -> Self {
        ErpState {
            catalog,
            stock,
            checkout: CheckoutCoordinator::from_config(invoices, config),
            location_id: config.terminal.location_id.clone(),
        }
    }

    /// Wires every seam to the same HTTP client.
    pub fn from_client(catalog: Catalog, client: ErpClient, config: &ErpConfig) -> Self {
        let client = Arc::new(client);
        Self::new(catalog, client.clone(), client, config)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stock(&self) -> &dyn StockResolver {
        self.stock.as_ref()
    }

    pub fn checkout(&self) -> &CheckoutCoordinator<Arc<dyn InvoiceGateway>> {
        &self.checkout
    }

    pub fn pricing(&self) -> &PricingEngine {
        self.checkout.pricing()
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }
}
