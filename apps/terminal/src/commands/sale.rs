//! # Sale Commands
//!
//! ## Commit Flow
//! ```text
//! commit_sale()
//!    │
//!    ├─ 1. checkout (pure)           EmptyCart ─────────────► error, cart kept
//!    ├─ 2. POST /sales               BackendRejected/Network ► error, cart kept
//!    ├─ 3. clear cart
//!    ├─ 4. register with cash box    closed box: skipped, not an error
//!    └─ 5. refresh catalog           failure: logged, commit still succeeds
//! ```
//!
//! Stock is never decremented locally; step 5 brings the new stock figures.

use caja_client::Backend;
use caja_core::{CommitReceipt, PaymentMethod, Registration};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::commands::cart::SaleCartView;
use crate::error::ApiError;
use crate::state::{CashBoxState, CatalogState, SaleCartState};

/// Result of a committed sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCommitted {
    pub receipt: CommitReceipt,
    pub payment_method: PaymentMethod,
    /// What the cash box did with the sale.
    pub cash_box: Registration,
    /// False when the post-commit catalog refresh failed.
    pub catalog_refreshed: bool,
    /// The now-empty cart.
    pub cart: SaleCartView,
}

/// True when the cart is set to cash and no session is open.
///
/// The host uses this to offer opening the cash box first. Committing does
/// not require it.
pub fn requires_open_cash_box(cart: &SaleCartState, cash_box: &CashBoxState) -> bool {
    let is_cash = cart.with_cart(|c| c.details().payment_method.is_cash());
    is_cash && !cash_box.is_open()
}

/// Submits the sale cart to the backend.
///
/// ## Errors
/// - `EMPTY_CART` with nothing to sell
/// - `BACKEND_REJECTED` with the backend's message (e.g. insufficient stock)
/// - `NETWORK_FAILURE` when the backend is unreachable
///
/// The cart is untouched on every error.
pub async fn commit_sale(
    backend: &dyn Backend,
    catalog: &CatalogState,
    cart: &SaleCartState,
    cash_box: &CashBoxState,
) -> Result<SaleCommitted, ApiError> {
    debug!("commit_sale command");

    let request = cart.with_cart(|c| c.checkout())?;
    let receipt = backend.submit_sale(&request).await?;

    info!(
        sale_id = receipt.id,
        total = %request.total,
        method = %request.payment_method,
        lines = request.items.len(),
        "Sale committed"
    );

    let view = cart.with_cart_mut(|c| {
        c.clear();
        SaleCartView::from(&*c)
    });

    let registration = cash_box
        .register_sale(request.total, request.payment_method)
        .await;
    if registration == Registration::SessionClosed {
        debug!(sale_id = receipt.id, "No open cash box, sale not registered");
    }

    let catalog_refreshed = match catalog.refresh().await {
        Ok(_) => true,
        Err(err) => {
            warn!(sale_id = receipt.id, error = %err, "Catalog refresh after sale failed");
            false
        }
    };

    Ok(SaleCommitted {
        receipt,
        payment_method: request.payment_method,
        cash_box: registration,
        catalog_refreshed,
        cart: view,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::{add_to_sale_cart, set_discount, set_payment_method};
    use crate::error::ErrorCode;
    use crate::testing::{at, cash_box_state, catalog_on, product, FakeBackend};
    use caja_core::Money;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_commit_clears_registers_and_refreshes() {
        let backend = Arc::new(FakeBackend::with_products(vec![product(1, 5, 5000)]));
        let catalog = catalog_on(backend.clone()).await;
        let cart = SaleCartState::new();
        let cash_box = cash_box_state();
        cash_box
            .open(Money::from_units(10000), "Marta", at(14, 9))
            .await
            .unwrap();

        add_to_sale_cart(&catalog, &cart, 1).unwrap();
        backend.set_products(vec![product(1, 4, 5000)]);

        let committed = commit_sale(backend.as_ref(), &catalog, &cart, &cash_box)
            .await
            .unwrap();

        assert_eq!(committed.receipt.total, Money::from_units(5000));
        assert_eq!(committed.cash_box, Registration::Recorded);
        assert!(committed.catalog_refreshed);
        assert!(committed.cart.lines.is_empty());
        assert_eq!(catalog.product(1).unwrap().stock, 4);

        let summary = cash_box.summary().unwrap();
        assert_eq!(summary.cash_sales, Money::from_units(5000));
        assert_eq!(summary.expected_cash, Money::from_units(15000));
        assert_eq!(backend.sales().len(), 1);
    }

    #[tokio::test]
    async fn test_rejection_keeps_cart_and_cash_box() {
        let backend = Arc::new(FakeBackend::with_products(vec![product(1, 5, 5000)]));
        let catalog = catalog_on(backend.clone()).await;
        let cart = SaleCartState::new();
        let cash_box = cash_box_state();
        cash_box
            .open(Money::from_units(10000), "Marta", at(14, 9))
            .await
            .unwrap();
        add_to_sale_cart(&catalog, &cart, 1).unwrap();

        backend.reject_next("Stock insuficiente para SKU-1");
        let err = commit_sale(backend.as_ref(), &catalog, &cart, &cash_box)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::BackendRejected);
        assert_eq!(err.message, "Stock insuficiente para SKU-1");
        assert_eq!(cart.with_cart(|c| c.total_quantity()), 1);
        assert_eq!(cash_box.summary().unwrap().cash_sales, Money::zero());
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_locally() {
        let backend = Arc::new(FakeBackend::default());
        let catalog = catalog_on(backend.clone()).await;
        let err = commit_sale(
            backend.as_ref(),
            &catalog,
            &SaleCartState::new(),
            &cash_box_state(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::EmptyCart);
        assert!(backend.sales().is_empty());
    }

    #[tokio::test]
    async fn test_sale_without_open_cash_box_still_commits() {
        let backend = Arc::new(FakeBackend::with_products(vec![product(1, 5, 5000)]));
        let catalog = catalog_on(backend.clone()).await;
        let cart = SaleCartState::new();
        let cash_box = cash_box_state();
        add_to_sale_cart(&catalog, &cart, 1).unwrap();

        assert!(requires_open_cash_box(&cart, &cash_box));
        set_payment_method(&cart, "card").unwrap();
        assert!(!requires_open_cash_box(&cart, &cash_box));

        let committed = commit_sale(backend.as_ref(), &catalog, &cart, &cash_box)
            .await
            .unwrap();
        assert_eq!(committed.cash_box, Registration::SessionClosed);
        assert_eq!(committed.payment_method, PaymentMethod::Card);
    }

    #[tokio::test]
    async fn test_refresh_failure_does_not_fail_commit() {
        let backend = Arc::new(FakeBackend::with_products(vec![product(1, 5, 5000)]));
        let catalog = catalog_on(backend.clone()).await;
        let cart = SaleCartState::new();
        add_to_sale_cart(&catalog, &cart, 1).unwrap();
        set_discount(&cart, Money::from_units(-1000));

        backend.fail_product_reads();
        let committed = commit_sale(backend.as_ref(), &catalog, &cart, &cash_box_state())
            .await
            .unwrap();

        assert!(!committed.catalog_refreshed);
        assert_eq!(backend.sales()[0].total, Money::from_units(4000));
        assert_eq!(backend.sales()[0].discount, Money::from_units(-1000));
        assert_eq!(catalog.product(1).unwrap().stock, 5);
    }
}
