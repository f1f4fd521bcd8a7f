//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  caja-core   CoreError ───────┐                                         │
//! │  caja-db     DbError ─────────┤                                         │
//! │  caja-client ClientError ─────┼──► ApiError { code, message } ──► host │
//! │  config      ConfigError ─────┘                                         │
//! │                                                                         │
//! │  host:                                                                  │
//! │    switch (e.code) {                                                    │
//! │      case 'OUT_OF_STOCK':     flash the line, keep the cart             │
//! │      case 'BACKEND_REJECTED': show e.message verbatim                   │
//! │      case 'NETWORK_FAILURE':  "sin conexión", retry later               │
//! │    }                                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Serialized form:
//! ```json
//! { "code": "OUT_OF_STOCK", "message": "Not enough stock for 7801: available 3, requested 4" }
//! ```

use caja_client::ClientError;
use caja_core::{CoreError, ValidationError};
use caja_db::DbError;
use serde::Serialize;

use crate::state::ConfigError;

/// Error returned from every fallible command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,

    // Cart
    ProductUnavailable,
    OutOfStock,
    EmptyCart,
    CartTooLarge,

    // Cash box
    InvalidAmount,
    SessionAlreadyOpen,
    SessionNotOpen,

    // Backend
    BackendRejected,
    NetworkFailure,

    DatabaseError,
    ConfigError,
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ProductNotFound(id) => return ApiError::not_found("Product", id),
            CoreError::ProductUnavailable { .. } => ErrorCode::ProductUnavailable,
            CoreError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::CartTooLarge { .. } => ErrorCode::CartTooLarge,
            CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CoreError::SessionAlreadyOpen { .. } => ErrorCode::SessionAlreadyOpen,
            CoreError::SessionNotOpen => ErrorCode::SessionNotOpen,
            CoreError::Validation(e) => return ApiError::from(e.clone()),
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Corrupted { ref key, .. } => {
                tracing::error!("{}", err);
                ApiError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored data for '{}' is unreadable", key),
                )
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::BackendRejected { detail, .. } => {
                ApiError::new(ErrorCode::BackendRejected, detail)
            }
            ClientError::Network(_) => ApiError::new(ErrorCode::NetworkFailure, err.to_string()),
            ClientError::InvalidUrl(_) => ApiError::new(ErrorCode::ConfigError, err.to_string()),
            other => {
                tracing::error!("Backend client error: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use caja_core::Money;

    #[test]
    fn test_serializes_screaming_snake_code() {
        let err = ApiError::from(CoreError::OutOfStock {
            code: "7801".into(),
            available: 3,
            requested: 4,
        });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "OUT_OF_STOCK");
        assert_eq!(
            json["message"],
            "Not enough stock for 7801: available 3, requested 4"
        );
    }

    #[test]
    fn test_core_mapping() {
        assert_eq!(ApiError::from(CoreError::EmptyCart).code, ErrorCode::EmptyCart);
        assert_eq!(
            ApiError::from(CoreError::SessionNotOpen).code,
            ErrorCode::SessionNotOpen
        );
        assert_eq!(
            ApiError::from(CoreError::InvalidAmount {
                field: "opening_amount".into(),
                amount: Money::from_units(-1),
            })
            .code,
            ErrorCode::InvalidAmount
        );
        assert_eq!(
            ApiError::from(CoreError::ProductNotFound(9)).message,
            "Product not found: 9"
        );
        let validation = ApiError::from(CoreError::Validation(ValidationError::Required {
            field: "operator_name".into(),
        }));
        assert_eq!(validation.code, ErrorCode::ValidationError);
        assert_eq!(validation.message, "operator_name is required");
    }

    #[test]
    fn test_backend_detail_is_verbatim() {
        let err = ApiError::from(ClientError::rejected(400, "Stock insuficiente"));
        assert_eq!(err.code, ErrorCode::BackendRejected);
        assert_eq!(err.message, "Stock insuficiente");

        let err = ApiError::from(ClientError::Network("connection refused".into()));
        assert_eq!(err.code, ErrorCode::NetworkFailure);
    }

    #[test]
    fn test_db_errors_hide_details() {
        let err = ApiError::from(DbError::QueryFailed("no such table: kv_store".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database operation failed");
    }
}
