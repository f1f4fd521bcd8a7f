//! # Caja Terminal Entry Point
//!
//! Boots the terminal: logging, configuration, backend, cash box store,
//! catalog. The setup itself lives in lib.rs so tests can build a
//! [`caja_terminal::Terminal`] on fakes.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (defaults, terminal.toml, CAJA_* variables)
//! 3. Connect to the backend and open the SQLite store
//! 4. Restore today's cash box session
//! 5. Load the catalog snapshot

use std::process::ExitCode;

use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    match caja_terminal::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(code = ?err.code, message = %err.message, "Terminal failed to start");
            ExitCode::FAILURE
        }
    }
}
