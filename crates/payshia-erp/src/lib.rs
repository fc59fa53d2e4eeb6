//! # payshia-erp: ERP REST Boundary
//!
//! Every request the terminal makes to the Payshia ERP backend goes through
//! this crate.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET  /products/with-variants  ──► catalog::Catalog                    │
//! │  GET  /stock-entries/summary   ──► stock::StockResolver                │
//! │  POST /pos-invoices            ──► invoice::InvoiceGateway             │
//! │                                      ▲                                  │
//! │                 checkout::CheckoutCoordinator                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three endpoints sit behind `async_trait` seams so the terminal and
//! the tests can swap the HTTP client for something else.

pub mod catalog;
pub mod checkout;
pub mod client;
pub mod config;
pub mod error;
pub mod invoice;
pub mod stock;
mod wire;

pub use catalog::{Catalog, CatalogSource};
pub use checkout::{CheckoutCoordinator, CheckoutReceipt};
pub use client::ErpClient;
pub use config::ErpConfig;
pub use error::{CheckoutError, ConfigError, ErpError, ErpResult};
pub use invoice::{InvoiceAck, InvoiceContext, InvoiceGateway, InvoicePayload, Settlement};
pub use stock::StockResolver;
