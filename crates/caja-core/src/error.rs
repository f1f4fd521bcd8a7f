//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  caja-core errors (this file)                                           │
//! │  ├── CoreError        - Cart, cash box and catalog rule violations      │
//! │  └── ValidationError  - Product draft / input validation failures       │
//! │                                                                         │
//! │  caja-db errors (separate crate)                                        │
//! │  └── DbError          - Local persistence failures                      │
//! │                                                                         │
//! │  caja-client errors (separate crate)                                    │
//! │  └── ClientError      - Backend rejected or unreachable                 │
//! │                                                                         │
//! │  Terminal errors (in app)                                               │
//! │  └── ApiError         - What the host UI sees (serialized)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant here is returned, never panicked. A failed operation
//! leaves the cart or cash box exactly as it was before the call.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product id is not in the current catalog snapshot.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Product cannot be put in a cart.
    ///
    /// ## When This Occurs
    /// - Product is inactive (soft deleted on the backend)
    /// - Product has zero stock in the snapshot
    #[error("Product {code} is not available")]
    ProductUnavailable { code: String },

    /// Requested quantity is above the stock captured when the line was created.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan PISCO-750 (stock 3) ×3   → quantity 3
    ///      │
    ///      ▼
    /// Scan again                    → requested 4
    ///      │
    ///      ▼
    /// OutOfStock { code: "PISCO-750", available: 3, requested: 4 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 PISCO-750 in stock", cart unchanged
    /// ```
    #[error("Not enough stock for {code}: available {available}, requested {requested}")]
    OutOfStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Checkout attempted on a cart without lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// A monetary amount was rejected (negative opening, counted cash, etc.).
    #[error("Invalid amount for {field}: {amount}")]
    InvalidAmount { field: String, amount: Money },

    /// A cash box session is already open for today.
    #[error("Cash box is already open (operator: {operator})")]
    SessionAlreadyOpen { operator: String },

    /// Close requested while no session is open.
    #[error("Cash box is not open")]
    SessionNotOpen,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything reaches the backend, so the operator can fix the
/// form without a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// One field must not be lower than another (sale price vs purchase price).
    #[error("{field} cannot be lower than {other}")]
    BelowField { field: String, other: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
