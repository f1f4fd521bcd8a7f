//! # Backend Trait
//!
//! Everything the terminal asks of the REST backend. [`crate::HttpBackend`]
//! is the production implementation; terminal tests substitute a fake.
//!
//! | Method               | Endpoint                   |
//! |----------------------|----------------------------|
//! | `list_products`      | `GET /products?limit=N`    |
//! | `get_product`        | `GET /products/{id}`       |
//! | `create_product`     | `POST /products`           |
//! | `update_product`     | `PUT /products/{id}`       |
//! | `delete_product`     | `DELETE /products/{id}`    |
//! | `submit_sale`        | `POST /sales`              |
//! | `submit_withdrawal`  | `POST /withdrawals`        |
//! | `list_sales`         | `GET /sales?limit=N`       |
//! | `list_withdrawals`   | `GET /withdrawals?limit=N` |
//! | `stats`              | `GET /stats`               |

use async_trait::async_trait;
use caja_core::{
    CommitReceipt, DailyStats, Product, ProductDraft, SaleRequest, Transaction, WithdrawalRequest,
};

use crate::error::ClientResult;

#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_products(&self, limit: usize) -> ClientResult<Vec<Product>>;

    async fn get_product(&self, id: i64) -> ClientResult<Product>;

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<Product>;

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> ClientResult<Product>;

    /// Soft delete: the backend marks the product inactive.
    async fn delete_product(&self, id: i64) -> ClientResult<()>;

    /// Commits a sale. The backend decrements stock and may reject with a
    /// `detail` message (insufficient stock, inactive product).
    async fn submit_sale(&self, request: &SaleRequest) -> ClientResult<CommitReceipt>;

    async fn submit_withdrawal(&self, request: &WithdrawalRequest) -> ClientResult<CommitReceipt>;

    async fn list_sales(&self, limit: usize) -> ClientResult<Vec<Transaction>>;

    async fn list_withdrawals(&self, limit: usize) -> ClientResult<Vec<Transaction>>;

    async fn stats(&self) -> ClientResult<DailyStats>;
}
