//! # caja-client: REST Backend Client
//!
//! The terminal's only route to the backend that owns products, sales and
//! withdrawals.
//!
//! ```text
//! apps/terminal
//!      │  Arc<dyn Backend>
//!      ▼
//! ┌──────────────────────────────┐         ┌──────────────────────────┐
//! │ HttpBackend (reqwest)        │ ──────► │ REST backend             │
//! │  • JSON bodies (camelCase)   │  HTTP   │  /products /sales        │
//! │  • {detail} → Rejected       │ ◄────── │  /withdrawals /stats     │
//! │  • read retry with backoff   │         └──────────────────────────┘
//! └──────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use caja_client::{Backend, ClientConfig, HttpBackend};
//!
//! let backend = HttpBackend::new(ClientConfig::new("http://localhost:8000/api")?)?;
//! let products = backend.list_products(500).await?;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod http;

pub use backend::Backend;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
