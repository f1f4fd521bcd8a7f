//! # caja-db: Local Persistence for Caja POS
//!
//! The terminal keeps very little on disk: the open cash box session and
//! the history of closed sessions. Everything else lives in the backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caja POS Data Flow                               │
//! │                                                                         │
//! │  Terminal command (open_cash_box, close_cash_box, commit_sale)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     caja-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────────┐  ┌────────────┐  │   │
//! │  │   │   Database    │    │ CashBoxRepository   │  │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │  session / history  │  │ (embedded) │  │   │
//! │  │   └───────┬───────┘    └──────────┬──────────┘  └────────────┘  │   │
//! │  │           │                       │                             │   │
//! │  │           │              trait KeyValueStore                    │   │
//! │  │           │               ├── SqliteKvStore                     │   │
//! │  │           └──────────────►└── MemoryKv                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (platform data dir, or CAJA_DB_PATH)                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use caja_db::{CashBoxRepository, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("caja.db")).await?;
//! let repo = CashBoxRepository::new(Arc::new(db.kv()));
//! let session = repo.load_session().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use kv::{KeyValueStore, MemoryKv};
pub use pool::{Database, DbConfig};
pub use repository::cash_box::{
    CashBoxRepository, HISTORY_BACKUP_KEY, HISTORY_KEY, SESSION_KEY,
};
pub use repository::kv::SqliteKvStore;
