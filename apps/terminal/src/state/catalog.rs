//! # Catalog State
//!
//! The product snapshot shared by both carts, and the way it is refreshed.
//!
//! ```text
//! refresh()
//!    │  backend.list_products(limit).await      (no lock held)
//!    ├── Ok(products) ──► write lock, replace snapshot wholesale
//!    └── Err(Network) ──► keep last snapshot, return the error
//! ```

use std::sync::{Arc, RwLock};

use caja_client::{Backend, ClientResult};
use caja_core::{CatalogSnapshot, CoreResult, Product};
use chrono::Utc;
use tracing::{info, warn};

pub struct CatalogState {
    snapshot: RwLock<CatalogSnapshot>,
    backend: Arc<dyn Backend>,
    limit: usize,
}

impl std::fmt::Debug for CatalogState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogState")
            .field("limit", &self.limit)
            .field("products", &self.with_snapshot(|s| s.len()))
            .finish_non_exhaustive()
    }
}

impl CatalogState {
    /// An empty catalog. Call [`CatalogState::refresh`] to populate it.
    pub fn new(backend: Arc<dyn Backend>, limit: usize) -> Self {
        CatalogState {
            snapshot: RwLock::new(CatalogSnapshot::empty()),
            backend,
            limit,
        }
    }

    /// Refetches the product list and replaces the snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> ClientResult<usize> {
        let products = match self.backend.list_products(self.limit).await {
            Ok(products) => products,
            Err(err) => {
                warn!(error = %err, "Catalog refresh failed, keeping last snapshot");
                return Err(err);
            }
        };

        let count = products.len();
        let snapshot = CatalogSnapshot::new(products, Utc::now());
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = snapshot;
        info!(count, "Catalog refreshed");
        Ok(count)
    }

    /// Runs `f` against the current snapshot.
    pub fn with_snapshot<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CatalogSnapshot) -> R,
    {
        let snapshot = self.snapshot.read().unwrap_or_else(|e| e.into_inner());
        f(&snapshot)
    }

    /// Clone of the product with `id`, or `ProductNotFound`.
    pub fn product(&self, id: i64) -> CoreResult<Product> {
        self.with_snapshot(|s| s.require(id).cloned())
    }

    /// Clone of the whole snapshot.
    pub fn snapshot(&self) -> CatalogSnapshot {
        self.with_snapshot(CatalogSnapshot::clone)
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product, FakeBackend};
    use caja_core::CoreError;

    #[tokio::test]
    async fn test_refresh_replaces_snapshot() {
        let backend = Arc::new(FakeBackend::with_products(vec![
            product(1, 5, 1000),
            product(2, 0, 2000),
        ]));
        let catalog = CatalogState::new(backend.clone(), 500);
        assert_eq!(catalog.with_snapshot(|s| s.len()), 0);

        assert_eq!(catalog.refresh().await.unwrap(), 2);
        assert_eq!(catalog.product(1).unwrap().stock, 5);
        assert!(catalog.snapshot().fetched_at().is_some());

        backend.set_products(vec![product(1, 4, 1000)]);
        catalog.refresh().await.unwrap();
        assert_eq!(catalog.product(1).unwrap().stock, 4);
        assert!(matches!(catalog.product(2), Err(CoreError::ProductNotFound(2))));
        assert_eq!(backend.last_product_limit(), Some(500));
    }

    #[tokio::test]
    async fn test_network_failure_keeps_last_snapshot() {
        let backend = Arc::new(FakeBackend::with_products(vec![product(1, 5, 1000)]));
        let catalog = CatalogState::new(backend.clone(), 500);
        catalog.refresh().await.unwrap();

        backend.go_offline();
        let err = catalog.refresh().await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(catalog.product(1).unwrap().stock, 5);
    }
}
