//! # HTTP Backend
//!
//! [`Backend`] over reqwest.
//!
//! ## Request Flow
//! ```text
//! list_products(500)
//!      │
//!      ▼
//! GET {base}/products?limit=500 ──► network error? ──► backoff, retry (reads only)
//!      │                                  │
//!      │                                  └── window spent ──► ClientError::Network
//!      ▼
//! status 2xx? ── no ──► BackendRejected { status, detail }
//!      │
//!      ▼
//! decode JSON ── fails ──► InvalidResponse
//! ```
//!
//! Writes (`POST`, `PUT`, `DELETE`) are sent once. A timed-out sale may
//! already be committed on the backend; retrying it could sell twice.

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use caja_core::{
    CommitReceipt, DailyStats, Product, ProductDraft, SaleRequest, Transaction, WithdrawalRequest,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// reqwest-backed [`Backend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(HttpBackend { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint_with_limit(&self, path: &str, limit: usize) -> ClientResult<Url> {
        let mut url = self.config.endpoint(path)?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        Ok(url)
    }

    // =========================================================================
    // Request Helpers
    // =========================================================================

    /// GET with retry on network errors.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        if self.config.retry_window.is_zero() {
            return self.execute(self.client.get(url)).await;
        }

        let mut backoff = self.create_backoff();
        backoff.reset();
        loop {
            match self.execute(self.client.get(url.clone())).await {
                Err(err) if err.is_network() => match backoff.next_backoff() {
                    Some(delay) => {
                        warn!(url = %url, error = %err, ?delay, "Backend unreachable, retrying");
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(err),
                },
                other => return other,
            }
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let body = Self::check_status(response).await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Sends a request whose response body is ignored.
    async fn execute_unit(&self, request: RequestBuilder) -> ClientResult<()> {
        let response = request.send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    /// Returns the body of a 2xx response, or the rejection.
    async fn check_status(response: Response) -> ClientResult<Vec<u8>> {
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            debug!(url = %url, status = status.as_u16(), bytes = body.len(), "Backend response");
            return Ok(body);
        }

        let detail = rejection_detail(status, &body);
        warn!(url = %url, status = status.as_u16(), detail = %detail, "Backend rejected request");
        Err(ClientError::rejected(status.as_u16(), detail))
    }

    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.config.initial_backoff,
            max_interval: self.config.retry_window,
            multiplier: 2.0,
            max_elapsed_time: Some(self.config.retry_window),
            ..Default::default()
        }
    }
}

/// Extracts the human-readable message from an error body.
///
/// `{"detail": "..."}` yields the string as-is. Any other JSON is rendered
/// compactly; plain text is trimmed. An empty body falls back to the status
/// reason ("Not Found").
pub fn rejection_detail(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(detail)) => detail.clone(),
            Some(other) => other.to_string(),
            None => Value::Object(map).to_string(),
        },
        Ok(other) => other.to_string(),
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                text
            }
        }
    }
}

// =============================================================================
// Backend Implementation
// =============================================================================

#[async_trait]
impl Backend for HttpBackend {
    async fn list_products(&self, limit: usize) -> ClientResult<Vec<Product>> {
        let url = self.endpoint_with_limit("products", limit)?;
        let products: Vec<Product> = self.get(url).await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    async fn get_product(&self, id: i64) -> ClientResult<Product> {
        let url = self.config.endpoint(&format!("products/{}", id))?;
        self.get(url).await
    }

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<Product> {
        let url = self.config.endpoint("products")?;
        debug!(code = %draft.code, "Creating product");
        self.execute(self.client.post(url).json(draft)).await
    }

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> ClientResult<Product> {
        let url = self.config.endpoint(&format!("products/{}", id))?;
        debug!(product_id = id, "Updating product");
        self.execute(self.client.put(url).json(draft)).await
    }

    async fn delete_product(&self, id: i64) -> ClientResult<()> {
        let url = self.config.endpoint(&format!("products/{}", id))?;
        debug!(product_id = id, "Deleting product");
        self.execute_unit(self.client.delete(url)).await
    }

    async fn submit_sale(&self, request: &SaleRequest) -> ClientResult<CommitReceipt> {
        let url = self.config.endpoint("sales")?;
        debug!(
            lines = request.items.len(),
            total = %request.total,
            method = %request.payment_method,
            "Submitting sale"
        );
        self.execute(self.client.post(url).json(request)).await
    }

    async fn submit_withdrawal(&self, request: &WithdrawalRequest) -> ClientResult<CommitReceipt> {
        let url = self.config.endpoint("withdrawals")?;
        debug!(
            lines = request.items.len(),
            reason = %request.reason,
            "Submitting withdrawal"
        );
        self.execute(self.client.post(url).json(request)).await
    }

    async fn list_sales(&self, limit: usize) -> ClientResult<Vec<Transaction>> {
        let url = self.endpoint_with_limit("sales", limit)?;
        self.get(url).await
    }

    async fn list_withdrawals(&self, limit: usize) -> ClientResult<Vec<Transaction>> {
        let url = self.endpoint_with_limit("withdrawals", limit)?;
        self.get(url).await
    }

    async fn stats(&self) -> ClientResult<DailyStats> {
        let url = self.config.endpoint("stats")?;
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string() {
        let body = br#"{"detail": "Stock insuficiente para Cerveza Kunstmann"}"#;
        assert_eq!(
            rejection_detail(StatusCode::BAD_REQUEST, body),
            "Stock insuficiente para Cerveza Kunstmann"
        );
    }

    #[test]
    fn test_detail_structured() {
        let body = br#"{"detail": [{"loc": ["body", "items"], "msg": "field required"}]}"#;
        let detail = rejection_detail(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(detail.starts_with('['));
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_detail_plain_text_and_empty() {
        assert_eq!(
            rejection_detail(StatusCode::BAD_GATEWAY, b"  upstream down \n"),
            "upstream down"
        );
        assert_eq!(rejection_detail(StatusCode::NOT_FOUND, b""), "Not Found");
    }

    #[test]
    fn test_limit_query() {
        let backend = HttpBackend::new(ClientConfig::new("http://localhost:8000/api").unwrap())
            .unwrap();
        let url = backend.endpoint_with_limit("sales", 100).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/sales?limit=100");
    }
}
