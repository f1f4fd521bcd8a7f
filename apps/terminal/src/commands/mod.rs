//! # Terminal Commands
//!
//! Everything the host UI can ask the terminal to do.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs         ◄─── You are here (exports)
//! ├── product.rs     ◄─── Browse, lookup, create/update/delete, refresh
//! ├── cart.rs        ◄─── Sale cart manipulation
//! ├── sale.rs        ◄─── Sale commit
//! ├── withdrawal.rs  ◄─── Withdrawal cart and commit
//! ├── cash_box.rs    ◄─── Open, withdraw cash, close, history
//! ├── report.rs      ◄─── Sales/withdrawal dashboards, low stock, daily stats
//! └── config.rs      ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Host UI                                                                │
//! │  ───────                                                                │
//! │  add_to_sale_cart(productId: 12)                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Rust                                                                   │
//! │  ────                                                                   │
//! │  fn add_to_sale_cart(                                                   │
//! │      catalog: &CatalogState,    ◄── only the state it needs             │
//! │      cart: &SaleCartState,                                              │
//! │      product_id: i64,                                                   │
//! │  ) -> Result<SaleCartView, ApiError>                                    │
//! │         │                                                               │
//! │         │ (JSON, camelCase)                                             │
//! │         ▼                                                               │
//! │  Host receives: SaleCartView  or  { code, message }                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands never panic and never hold a lock across an `.await`.

pub mod cart;
pub mod cash_box;
pub mod config;
pub mod product;
pub mod report;
pub mod sale;
pub mod withdrawal;
