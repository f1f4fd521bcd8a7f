//! # State Module
//!
//! Each piece of terminal state is its own type, so a command takes exactly
//! the state it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐ ┌────────────────┐ │
//! │  │ CatalogState │ │ SaleCartState│ │ Withdrawal-  │ │ CashBoxState   │ │
//! │  │              │ │              │ │ CartState    │ │                │ │
//! │  │ RwLock<      │ │ Arc<Mutex<   │ │ Arc<Mutex<   │ │ Mutex<CashBox> │ │
//! │  │  Snapshot>   │ │  SaleCart>>  │ │  Withdr…>>   │ │ + repository   │ │
//! │  │ + Backend    │ │              │ │              │ │                │ │
//! │  └──────────────┘ └──────────────┘ └──────────────┘ └────────────────┘ │
//! │                                                                         │
//! │  TerminalConfig: read-only after startup                                │
//! │                                                                         │
//! │  No lock is held across an .await.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod cash_box;
mod catalog;
mod config;

pub use cart::{CartState, SaleCartState, WithdrawalCartState};
pub use cash_box::CashBoxState;
pub use catalog::CatalogState;
pub use config::{ConfigError, ConfigResult, TerminalConfig};
