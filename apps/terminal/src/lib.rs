//! # Payshia Terminal
//!
//! Cashier terminal for Payshia POS: several orders in flight, batch-aware
//! item entry, pricing, and checkout against the Payshia ERP.
//!
//! ## Module Organization
//! ```text
//! payshia_terminal/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── shell.rs        ◄─── Line parser and renderer
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── session.rs  ◄─── Orders and the add-item dialog
//! │   ├── erp.rs      ◄─── Catalog, stock resolver, checkout
//! │   └── config.rs   ◄─── Display settings
//! ├── commands/
//! │   ├── order.rs    ◄─── new / select / park / clear
//! │   ├── stock.rs    ◄─── add-item dialog
//! │   ├── cart.rs     ◄─── line and charge edits
//! │   ├── checkout.rs ◄─── pay / hold
//! │   └── catalog.rs  ◄─── product search
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod shell;
pub mod state;

use payshia_core::OrderRegistry;
use payshia_erp::{Catalog, ErpClient, ErpConfig};
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use error::StartupError;
use shell::Shell;
use state::{ConfigState, ErpState, SessionState};

/// Runs the terminal on stdin/stdout until `quit` or end of input.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize logging (stderr, RUST_LOG or "info,payshia=debug")      │
/// │  2. Load ErpConfig: env > pos.toml > defaults                          │
/// │  3. Build the HTTP client                                              │
/// │  4. Load the catalog (an empty catalog if the ERP is unreachable)      │
/// │  5. Open the first order for the default customer                      │
/// │  6. Read commands                                                      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), StartupError> {
    init_tracing();
    info!("Starting Payshia POS terminal");

    let config = ErpConfig::load(None)?;
    info!(
        base_url = %config.api.base_url,
        location_id = %config.terminal.location_id,
        "Configuration loaded"
    );

    let client = ErpClient::new(&config)?;
    let catalog = match Catalog::load(&client).await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, "Catalog unavailable, starting with no products");
            Catalog::default()
        }
    };

    let erp = ErpState::from_client(catalog, client, &config);
    let session = SessionState::from_registry(OrderRegistry::with_default_customer(
        &config.terminal.default_customer,
    )?);
    let display = ConfigState::from_env();

    let shell = Shell::new(&session, &erp, &display);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    shell.run(stdin, &mut stdout).await?;

    info!("Terminal closed");
    Ok(())
}

/// Initializes the tracing subscriber. Logs go to stderr so they do not
/// interleave with shell output.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages everywhere
/// - `RUST_LOG=payshia_erp=trace` - Trace the ERP client only
/// - Default: INFO, DEBUG for payshia crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,payshia=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
