//! # Caja Terminal Library
//!
//! Host-facing layer of the Caja POS counter terminal. Wires the pure core,
//! the local cash box store and the REST backend into the commands a UI
//! calls.
//!
//! ## Module Organization
//! ```text
//! caja_terminal/
//! ├── lib.rs          ◄─── You are here (startup, Terminal wiring)
//! ├── main.rs         ◄─── Binary entry point
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── TerminalConfig (TOML + CAJA_* env)
//! │   ├── catalog.rs  ◄─── Catalog snapshot behind a RwLock
//! │   ├── cart.rs     ◄─── Sale and withdrawal carts behind a Mutex
//! │   └── cash_box.rs ◄─── Cash box plus its persistence
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── product.rs  ◄─── Browse / CRUD / refresh
//! │   ├── cart.rs     ◄─── Sale cart manipulation
//! │   ├── sale.rs     ◄─── Sale commit
//! │   ├── withdrawal.rs ◄─ Withdrawal cart and commit
//! │   ├── cash_box.rs ◄─── Open / close / history
//! │   ├── report.rs   ◄─── Dashboards
//! │   └── config.rs   ◄─── Configuration retrieval
//! └── error.rs        ◄─── ApiError for the host
//! ```
//!
//! ## State Management
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Terminal State                                       │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │  CatalogState    │ │  SaleCartState   │ │  CashBoxState        │   │
//! │  │                  │ │  WithdrawalCart  │ │                      │   │
//! │  │  • Snapshot      │ │  State           │ │  • Today's session   │   │
//! │  │  • Backend       │ │  • Lines, totals │ │  • KV persistence    │   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! │                                                                         │
//! │  Each command takes only the state it needs.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use caja_client::{Backend, HttpBackend};
use caja_db::{Database, DbConfig, KeyValueStore};
use chrono::{DateTime, FixedOffset, Local};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use error::ApiError;
use state::{CashBoxState, CatalogState, SaleCartState, TerminalConfig, WithdrawalCartState};

/// Current local time with its UTC offset. The cash box day boundary is
/// the calendar day of this value.
pub fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Every piece of state a host needs, wired together.
pub struct Terminal {
    pub config: TerminalConfig,
    pub backend: Arc<dyn Backend>,
    pub catalog: CatalogState,
    pub sale_cart: SaleCartState,
    pub withdrawal_cart: WithdrawalCartState,
    pub cash_box: CashBoxState,
}

impl Terminal {
    /// Builds the terminal on an explicit backend and store.
    ///
    /// ## Startup Sequence
    /// ```text
    /// 1. Restore today's cash box session (stale or unreadable: discarded)
    /// 2. Load the catalog (failure: warn, start with an empty snapshot)
    /// 3. Empty sale and withdrawal carts
    /// ```
    pub async fn new(
        config: TerminalConfig,
        backend: Arc<dyn Backend>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ApiError> {
        let cash_box = CashBoxState::new(caja_db::CashBoxRepository::new(store));
        let restored = cash_box.load_on_startup(now().date_naive()).await?;

        let catalog = CatalogState::new(backend.clone(), config.catalog_limit);
        if let Err(err) = catalog.refresh().await {
            warn!(error = %err, "Initial catalog load failed, starting with an empty catalog");
        }

        info!(
            store = %config.store_name,
            products = catalog.with_snapshot(|s| s.len()),
            cash_box_restored = restored,
            "Terminal ready"
        );

        Ok(Terminal {
            config,
            backend,
            catalog,
            sale_cart: SaleCartState::new(),
            withdrawal_cart: WithdrawalCartState::new(),
            cash_box,
        })
    }

    /// Builds the production terminal: HTTP backend and SQLite store.
    pub async fn connect(config: TerminalConfig) -> Result<Self, ApiError> {
        let backend = HttpBackend::new(config.client_config()?)?;
        info!(base_url = %backend.config().base_url(), "Backend configured");

        let db_path = config.database_path()?;
        info!(?db_path, "Database path determined");
        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        Terminal::new(config, Arc::new(backend), Arc::new(db.kv())).await
    }
}

/// Starts the terminal and logs its status.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter                                │
/// │     • Default: info,caja=debug,sqlx=warn; RUST_LOG overrides            │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults → terminal.toml → CAJA_* variables                       │
/// │                                                                         │
/// │  3. Connect ──────────────────────────────────────────────────────────► │
/// │     • HTTP backend, SQLite cash box store                               │
/// │                                                                         │
/// │  4. Restore cash box, load catalog ───────────────────────────────────► │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<Terminal, ApiError> {
    init_tracing();

    info!("Starting Caja POS terminal");

    let config = TerminalConfig::load(None)?;
    let terminal = Terminal::connect(config).await?;

    match terminal.cash_box.summary() {
        Some(summary) => info!(
            operator = %summary.operator_name,
            expected_cash = %terminal.config.format_money(summary.expected_cash),
            sales = summary.sale_count,
            "Cash box open"
        ),
        None => info!("Cash box closed"),
    }

    Ok(terminal)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=caja=trace` - Show trace for caja crates only
/// - Default: `info,caja=debug,sqlx=warn`
///
/// Does nothing if a subscriber is already installed.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,caja=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

// =============================================================================
// Test Support
// =============================================================================
