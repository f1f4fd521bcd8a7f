//! # Sale Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌──────────┐  add / adjust / remove   ┌──────────┐   commit_sale    ┌──────────┐
//! │  Empty   │ ───────────────────────► │ In Cart  │ ───────────────► │  Empty   │
//! └──────────┘                          └──────────┘   (sale.rs)      └──────────┘
//!                                          │   ▲
//!                     set_payment_method   │   │  BackendRejected:
//!                     set_discount         └───┘  cart kept as-is
//! ```
//!
//! Every command returns the full [`SaleCartView`] so the host can redraw the
//! cart panel from one value.

use caja_core::{CartLine, Money, PaymentMethod, SaleCart};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CatalogState, SaleCartState};

/// Cart panel contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleCartView {
    pub lines: Vec<CartLine>,
    /// Distinct products (badge count).
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
}

impl From<&SaleCart> for SaleCartView {
    fn from(cart: &SaleCart) -> Self {
        SaleCartView {
            lines: cart.lines().to_vec(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal: cart.subtotal(),
            discount: cart.details().discount,
            total: cart.total(),
            payment_method: cart.details().payment_method,
        }
    }
}

pub fn get_sale_cart(cart: &SaleCartState) -> SaleCartView {
    cart.with_cart(|c| SaleCartView::from(c))
}

/// Adds one unit of a catalog product.
///
/// ## Errors
/// - `NOT_FOUND` if the id is not in the current snapshot
/// - `PRODUCT_UNAVAILABLE` for inactive or zero-stock products
/// - `OUT_OF_STOCK` when the line is already at the snapshot stock
/// - `CART_TOO_LARGE` past 100 distinct lines
pub fn add_to_sale_cart(
    catalog: &CatalogState,
    cart: &SaleCartState,
    product_id: i64,
) -> Result<SaleCartView, ApiError> {
    debug!(product_id, "add_to_sale_cart command");

    let product = catalog.product(product_id)?;
    cart.with_cart_mut(|c| {
        c.add(&product)?;
        Ok(SaleCartView::from(&*c))
    })
}

/// Adds one unit of the product with the typed or scanned `code`.
pub fn add_code_to_sale_cart(
    catalog: &CatalogState,
    cart: &SaleCartState,
    code: &str,
) -> Result<SaleCartView, ApiError> {
    debug!(code = %code, "add_code_to_sale_cart command");

    let product = catalog
        .with_snapshot(|s| s.find_by_code(code).cloned())
        .ok_or_else(|| ApiError::not_found("Product", code.trim()))?;
    cart.with_cart_mut(|c| {
        c.add(&product)?;
        Ok(SaleCartView::from(&*c))
    })
}

/// Changes a line's quantity by `delta`. Reaching zero removes the line.
pub fn adjust_sale_line(
    cart: &SaleCartState,
    product_id: i64,
    delta: i64,
) -> Result<SaleCartView, ApiError> {
    debug!(product_id, delta, "adjust_sale_line command");

    cart.with_cart_mut(|c| {
        c.adjust(product_id, delta)?;
        Ok(SaleCartView::from(&*c))
    })
}

pub fn remove_from_sale_cart(cart: &SaleCartState, product_id: i64) -> SaleCartView {
    debug!(product_id, "remove_from_sale_cart command");

    cart.with_cart_mut(|c| {
        c.remove(product_id);
        SaleCartView::from(&*c)
    })
}

/// Empties the cart and resets discount and payment method.
pub fn clear_sale_cart(cart: &SaleCartState) -> SaleCartView {
    debug!("clear_sale_cart command");

    cart.with_cart_mut(|c| {
        c.clear();
        SaleCartView::from(&*c)
    })
}

/// Accepts `cash`/`card`/`transfer` and the Spanish names.
pub fn set_payment_method(cart: &SaleCartState, method: &str) -> Result<SaleCartView, ApiError> {
    debug!(method = %method, "set_payment_method command");

    let method: PaymentMethod = method.parse()?;
    Ok(cart.with_cart_mut(|c| {
        c.set_payment_method(method);
        SaleCartView::from(&*c)
    }))
}

/// Negative amounts discount, positive amounts surcharge. The total never
/// goes below zero.
pub fn set_discount(cart: &SaleCartState, discount: Money) -> SaleCartView {
    debug!(discount = %discount, "set_discount command");

    cart.with_cart_mut(|c| {
        c.set_discount(discount);
        SaleCartView::from(&*c)
    })
}
