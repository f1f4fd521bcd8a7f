//! # caja-core: Pure Business Logic for Caja POS
//!
//! Cart, cash box and reporting rules for a liquor store counter, as pure
//! functions and plain state machines. No I/O happens in this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caja POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host UI (browser)                            │   │
//! │  │   Product grid ──► Cart panel ──► Cash box panel ──► Reports    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/terminal (commands)                     │   │
//! │  └──────────┬──────────────────┬──────────────────────┬────────────┘   │
//! │             │                  │                      │                 │
//! │  ┌──────────▼──────────────────────────────────────┐  │                 │
//! │  │           ★ caja-core (THIS CRATE) ★            │  │                 │
//! │  │                                                 │  │                 │
//! │  │  catalog   cart      cashbox    report          │  │                 │
//! │  │  Snapshot  Cart<D>   CashBox    by hour/method  │  │                 │
//! │  │  Filter    Requests  Records    top products    │  │                 │
//! │  │                                                 │  │                 │
//! │  │  NO I/O • NO DATABASE • NO NETWORK              │  │                 │
//! │  └─────────────────────────────────────────────────┘  │                 │
//! │             │                                         │                 │
//! │  ┌──────────▼─────────────┐          ┌────────────────▼─────────────┐  │
//! │  │ caja-db (SQLite KV)    │          │ caja-client (REST backend)   │  │
//! │  └────────────────────────┘          └──────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Signed integer money with es-CL display
//! - [`types`] - Product, payment methods, withdrawal reasons
//! - [`catalog`] - Product snapshot and browse filters
//! - [`cart`] - Sale and withdrawal carts
//! - [`cashbox`] - Daily cash session and close reconciliation
//! - [`report`] - Sales aggregations
//! - [`validation`] - Product draft and input rules
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use caja_core::{CashBox, Money};
//! use chrono::{FixedOffset, TimeZone};
//!
//! let now = FixedOffset::west_opt(3 * 3600)
//!     .unwrap()
//!     .with_ymd_and_hms(2026, 3, 14, 10, 0, 0)
//!     .unwrap();
//!
//! let mut cash_box = CashBox::new();
//! cash_box.open(Money::from_units(10_000), "Marta", now).unwrap();
//! cash_box.register_sale(Money::from_units(5_000), "cash");
//!
//! let record = cash_box.close(Money::from_units(14_500), now).unwrap();
//! assert_eq!(record.difference, Money::from_units(-500));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod cashbox;
pub mod catalog;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{
    Cart, CartLine, SaleCart, SaleDetails, SaleItemRequest, SaleRequest, WithdrawalCart,
    WithdrawalDetails, WithdrawalItemRequest, WithdrawalRequest,
};
pub use cashbox::{
    CashBox, CashBoxSession, CashBoxSummary, CashCloseRecord, CloseOutcome, Registration,
};
pub use catalog::{CatalogSnapshot, ProductFilter};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{
    DailyStats, DailySummary, HourTotal, LowStockReport, MethodTotal, ProductRanking,
    Transaction, TransactionItem,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Reorder threshold applied when the backend omits one.
pub const DEFAULT_REORDER_THRESHOLD: i64 = 5;
