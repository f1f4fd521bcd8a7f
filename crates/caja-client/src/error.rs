//! # Client Error Types
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────────────┐
//! │ Backend answered             │ Backend unreachable                      │
//! │                              │                                          │
//! │  BackendRejected{status,     │  Network   (connect, timeout, reset)     │
//! │                  detail}     │                                          │
//! │  InvalidResponse             │                                          │
//! ├──────────────────────────────┴──────────────────────────────────────────┤
//! │ Local                                                                   │
//! │  InvalidUrl   Serialization   Setup                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `BackendRejected` displays the backend's `detail` verbatim, so the host
//! can show it to the cashier as-is ("Stock insuficiente para Pisco ...").

use thiserror::Error;

/// Result type alias for backend calls.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The backend answered with a non-success status.
    #[error("{detail}")]
    BackendRejected { status: u16, detail: String },

    /// The request never got an answer (refused, reset, timed out).
    #[error("Network failure: {0}")]
    Network(String),

    /// The backend answered 2xx with a body we could not read.
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The HTTP client itself could not be built (TLS backend, etc.).
    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            ClientError::Setup(err.to_string())
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else if err.is_timeout() {
            ClientError::Network(format!("request timed out: {}", err))
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Builds a rejection.
    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        ClientError::BackendRejected {
            status,
            detail: detail.into(),
        }
    }

    /// True when the backend could not be reached.
    ///
    /// Reads are retried on these; the catalog keeps its last snapshot.
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Network(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::BackendRejected { status: 404, .. })
    }

    /// The backend's own message, when it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ClientError::BackendRejected { detail, .. } => Some(detail),
            _ => None,
        }
    }
}
