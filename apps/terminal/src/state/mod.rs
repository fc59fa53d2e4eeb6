//! # State Module
//!
//! Separate state types, each command asks only for what it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────┐      │
//! │  │  SessionState    │  │    ErpState      │  │   ConfigState    │      │
//! │  │                  │  │                  │  │                  │      │
//! │  │  Arc<Mutex<      │  │  catalog         │  │  store_name      │      │
//! │  │   OrderRegistry  │  │  stock resolver  │  │  currency        │      │
//! │  │  >>              │  │  checkout        │  │                  │      │
//! │  │  + add-item      │  │                  │  │                  │      │
//! │  │    dialog        │  │                  │  │                  │      │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • SessionState: Arc<Mutex<T>>, short critical sections                │
//! │  • ErpState: immutable after startup, HTTP client is Sync              │
//! │  • ConfigState: read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod erp;
mod session;

pub use config::ConfigState;
pub use erp::ErpState;
pub use session::SessionState;
