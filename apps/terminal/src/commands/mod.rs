//! # Terminal Commands
//!
//! Every cashier action is one function here. Commands take the state they
//! need, return `Result<Response, ApiError>`, and never print.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Module      Commands                                                   │
//! │  ──────      ────────                                                   │
//! │  order       list_orders, new_order, select_order, park_order,          │
//! │              clear_order                                                │
//! │  stock       open_item, select_batch, confirm_item, cancel_item,        │
//! │              add_item                                                   │
//! │  cart        get_cart, update_quantity, remove_item,                    │
//! │              set_order_discount, set_service_charge, set_customer,      │
//! │              set_fulfillment                                            │
//! │  checkout    pay, hold                                                  │
//! │  catalog     search_catalog                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod order;
pub mod stock;

pub use cart::CartResponse;
pub use order::{ClearResponse, OrderSummary, ParkResponse};
pub use stock::SelectionResponse;
