//! # Payshia POS Entry Point
//!
//! Starts the cashier shell on stdin/stdout. Setup lives in `lib.rs` so the
//! shell can be driven from tests.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match payshia_terminal::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("payshia-pos: {}", e);
            ExitCode::FAILURE
        }
    }
}
