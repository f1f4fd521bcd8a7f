//! # Product Commands
//!
//! Browsing reads the in-memory snapshot. Writes go to the backend and are
//! followed by a snapshot refresh.
//!
//! ## Write Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Create / Update                              │
//! │                                                                         │
//! │  ProductDraft from the form                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_product_draft ──── invalid ──► VALIDATION_ERROR (no request)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  POST /products  or  PUT /products/{id}                                 │
//! │       │                                                                 │
//! │       ├── {detail} ──► BACKEND_REJECTED ("Código ya existe")            │
//! │       ▼                                                                 │
//! │  refresh snapshot (failure logged, write still succeeds)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use caja_core::validation::validate_product_draft;
use caja_core::{Product, ProductDraft, ProductFilter};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::CatalogState;

/// Product grid contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Active products in the snapshot, before filtering.
    pub total_active: usize,
}

/// Filters the snapshot. Inactive products never appear.
pub fn browse_products(catalog: &CatalogState, filter: &ProductFilter) -> ProductPage {
    debug!(?filter, "browse_products command");

    catalog.with_snapshot(|s| ProductPage {
        products: s.browse(filter).into_iter().cloned().collect(),
        total_active: s.products().iter().filter(|p| p.active).count(),
    })
}

pub fn get_product(catalog: &CatalogState, product_id: i64) -> Result<Product, ApiError> {
    debug!(product_id, "get_product command");
    Ok(catalog.product(product_id)?)
}

/// Exact code lookup (barcode scanner input).
pub fn find_product_by_code(catalog: &CatalogState, code: &str) -> Result<Product, ApiError> {
    debug!(code = %code, "find_product_by_code command");

    catalog
        .with_snapshot(|s| s.find_by_code(code).cloned())
        .ok_or_else(|| ApiError::not_found("Product", code.trim()))
}

/// Sorted distinct categories for the filter dropdown.
pub fn get_categories(catalog: &CatalogState) -> Vec<String> {
    catalog.with_snapshot(|s| s.categories())
}

pub fn get_brands(catalog: &CatalogState) -> Vec<String> {
    catalog.with_snapshot(|s| s.brands())
}

/// Refetches the catalog. Returns the number of products loaded.
///
/// ## Errors
/// `NETWORK_FAILURE` when the backend is unreachable. The previous snapshot
/// stays in place.
pub async fn refresh_catalog(catalog: &CatalogState) -> Result<usize, ApiError> {
    debug!("refresh_catalog command");
    Ok(catalog.refresh().await?)
}

pub async fn create_product(
    catalog: &CatalogState,
    draft: &ProductDraft,
) -> Result<Product, ApiError> {
    debug!(code = %draft.code, "create_product command");

    validate_product_draft(draft)?;
    let product = catalog.backend().create_product(draft).await?;
    info!(product_id = product.id, code = %product.code, "Product created");

    refresh_after_write(catalog, product.id).await;
    Ok(product)
}

pub async fn update_product(
    catalog: &CatalogState,
    product_id: i64,
    draft: &ProductDraft,
) -> Result<Product, ApiError> {
    debug!(product_id, "update_product command");

    validate_product_draft(draft)?;
    let product = catalog.backend().update_product(product_id, draft).await?;
    info!(product_id, "Product updated");

    refresh_after_write(catalog, product_id).await;
    Ok(product)
}

/// Soft delete: the backend marks the product inactive.
pub async fn delete_product(catalog: &CatalogState, product_id: i64) -> Result<(), ApiError> {
    debug!(product_id, "delete_product command");

    catalog.backend().delete_product(product_id).await?;
    info!(product_id, "Product deleted");

    refresh_after_write(catalog, product_id).await;
    Ok(())
}

async fn refresh_after_write(catalog: &CatalogState, product_id: i64) {
    if let Err(err) = catalog.refresh().await {
        warn!(product_id, error = %err, "Catalog refresh after product write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{catalog_on, product, FakeBackend};
    use caja_core::Money;
    use std::sync::Arc;

    fn draft(code: &str) -> ProductDraft {
        let mut draft = ProductDraft::from(&product(0, 12, 8990));
        draft.code = code.to_string();
        draft.name = "Pisco Mistral 35°".to_string();
        draft
    }

    #[tokio::test]
    async fn test_browse_filters_snapshot() {
        let mut inactive = product(3, 10, 1000);
        inactive.active = false;
        let mut beer = product(2, 2, 1500);
        beer.category = Some("Cervezas".to_string());
        beer.brand = Some("Kunstmann".to_string());
        let backend = Arc::new(FakeBackend::with_products(vec![
            product(1, 20, 8990),
            beer,
            inactive,
        ]));
        let catalog = catalog_on(backend).await;

        let page = browse_products(&catalog, &ProductFilter::default());
        assert_eq!(page.products.len(), 2);
        assert_eq!(page.total_active, 2);

        let filter = ProductFilter {
            low_stock_only: true,
            ..ProductFilter::default()
        };
        let page = browse_products(&catalog, &filter);
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].id, 2);

        assert_eq!(get_categories(&catalog), vec!["Cervezas", "Piscos"]);
        assert_eq!(get_brands(&catalog), vec!["Kunstmann", "Mistral"]);
    }

    #[tokio::test]
    async fn test_lookups() {
        let catalog = catalog_on(Arc::new(FakeBackend::with_products(vec![product(
            4, 5, 1000,
        )])))
        .await;

        assert_eq!(get_product(&catalog, 4).unwrap().code, "SKU-4");
        assert_eq!(get_product(&catalog, 5).unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(find_product_by_code(&catalog, "SKU-4").unwrap().id, 4);
        assert_eq!(
            find_product_by_code(&catalog, "SKU-5").unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_create_refreshes_catalog() {
        let backend = Arc::new(FakeBackend::default());
        let catalog = catalog_on(backend.clone()).await;

        let created = create_product(&catalog, &draft("PIS-035")).await.unwrap();
        assert_eq!(created.code, "PIS-035");
        assert_eq!(find_product_by_code(&catalog, "PIS-035").unwrap().id, created.id);

        let mut edit = draft("PIS-035");
        edit.sale_price = Money::from_units(9990);
        let updated = update_product(&catalog, created.id, &edit).await.unwrap();
        assert_eq!(updated.sale_price, Money::from_units(9990));
        assert_eq!(
            get_product(&catalog, created.id).unwrap().sale_price,
            Money::from_units(9990)
        );

        delete_product(&catalog, created.id).await.unwrap();
        assert!(browse_products(&catalog, &ProductFilter::default())
            .products
            .is_empty());
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::default());
        let catalog = catalog_on(backend.clone()).await;

        let mut bad = draft("PIS-035");
        bad.sale_price = Money::from_units(100);
        let err = create_product(&catalog, &bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = create_product(&catalog, &draft("")).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(catalog.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_offline_refresh_keeps_snapshot() {
        let backend = Arc::new(FakeBackend::with_products(vec![product(1, 5, 1000)]));
        let catalog = catalog_on(backend.clone()).await;

        backend.go_offline();
        let err = refresh_catalog(&catalog).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NetworkFailure);
        assert_eq!(get_product(&catalog, 1).unwrap().stock, 5);
    }
}
