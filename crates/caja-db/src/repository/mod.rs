//! # Repositories
//!
//! - [`kv`] - SQLite implementation of the key-value store
//! - [`cash_box`] - Typed cash box session and history on any key-value store

pub mod cash_box;
pub mod kv;
