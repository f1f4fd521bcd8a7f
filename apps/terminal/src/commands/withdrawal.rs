//! # Withdrawal Commands
//!
//! Stock leaving the shelf without payment: breakage, expired product,
//! tastings, owner consumption.
//!
//! ```text
//! add / adjust / remove ──► set_withdrawal_reason ──► commit_withdrawal
//!                           set_withdrawal_notes        │
//!                                                       ├─ POST /withdrawals
//!                                                       ├─ clear cart
//!                                                       └─ refresh catalog
//! ```
//!
//! Inventory withdrawals do not touch the cash box. Cash taken out of the
//! drawer is recorded with `withdraw_cash` in the cash box commands.

use caja_client::Backend;
use caja_core::{CartLine, CommitReceipt, Money, WithdrawalCart, WithdrawalReason};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{CatalogState, WithdrawalCartState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalCartView {
    pub lines: Vec<CartLine>,
    pub item_count: usize,
    pub total_quantity: i64,
    /// Value of the goods at their sale price.
    pub value: Money,
    pub reason: WithdrawalReason,
    pub notes: String,
}

impl From<&WithdrawalCart> for WithdrawalCartView {
    fn from(cart: &WithdrawalCart) -> Self {
        WithdrawalCartView {
            lines: cart.lines().to_vec(),
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            value: cart.subtotal(),
            reason: cart.details().reason,
            notes: cart.details().notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalCommitted {
    pub receipt: CommitReceipt,
    pub reason: WithdrawalReason,
    pub catalog_refreshed: bool,
    pub cart: WithdrawalCartView,
}

pub fn get_withdrawal_cart(cart: &WithdrawalCartState) -> WithdrawalCartView {
    cart.with_cart(|c| WithdrawalCartView::from(c))
}

pub fn add_to_withdrawal_cart(
    catalog: &CatalogState,
    cart: &WithdrawalCartState,
    product_id: i64,
) -> Result<WithdrawalCartView, ApiError> {
    debug!(product_id, "add_to_withdrawal_cart command");

    let product = catalog.product(product_id)?;
    cart.with_cart_mut(|c| {
        c.add(&product)?;
        Ok(WithdrawalCartView::from(&*c))
    })
}

pub fn adjust_withdrawal_line(
    cart: &WithdrawalCartState,
    product_id: i64,
    delta: i64,
) -> Result<WithdrawalCartView, ApiError> {
    debug!(product_id, delta, "adjust_withdrawal_line command");

    cart.with_cart_mut(|c| {
        c.adjust(product_id, delta)?;
        Ok(WithdrawalCartView::from(&*c))
    })
}

pub fn remove_from_withdrawal_cart(cart: &WithdrawalCartState, product_id: i64) -> WithdrawalCartView {
    debug!(product_id, "remove_from_withdrawal_cart command");

    cart.with_cart_mut(|c| {
        c.remove(product_id);
        WithdrawalCartView::from(&*c)
    })
}

pub fn clear_withdrawal_cart(cart: &WithdrawalCartState) -> WithdrawalCartView {
    debug!("clear_withdrawal_cart command");

    cart.with_cart_mut(|c| {
        c.clear();
        WithdrawalCartView::from(&*c)
    })
}

/// Accepts the wire names (`breakage`) and the Spanish ones (`perdida`).
pub fn set_withdrawal_reason(
    cart: &WithdrawalCartState,
    reason: &str,
) -> Result<WithdrawalCartView, ApiError> {
    debug!(reason = %reason, "set_withdrawal_reason command");

    let reason: WithdrawalReason = reason.parse()?;
    Ok(cart.with_cart_mut(|c| {
        c.set_reason(reason);
        WithdrawalCartView::from(&*c)
    }))
}

pub fn set_withdrawal_notes(cart: &WithdrawalCartState, notes: &str) -> WithdrawalCartView {
    cart.with_cart_mut(|c| {
        c.set_notes(notes);
        WithdrawalCartView::from(&*c)
    })
}

/// Submits the withdrawal cart. Same error contract as `commit_sale`.
pub async fn commit_withdrawal(
    backend: &dyn Backend,
    catalog: &CatalogState,
    cart: &WithdrawalCartState,
) -> Result<WithdrawalCommitted, ApiError> {
    debug!("commit_withdrawal command");

    let request = cart.with_cart(|c| c.checkout())?;
    let receipt = backend.submit_withdrawal(&request).await?;

    info!(
        withdrawal_id = receipt.id,
        reason = %request.reason,
        lines = request.items.len(),
        "Withdrawal committed"
    );

    let view = cart.with_cart_mut(|c| {
        c.clear();
        WithdrawalCartView::from(&*c)
    });

    let catalog_refreshed = match catalog.refresh().await {
        Ok(_) => true,
        Err(err) => {
            warn!(withdrawal_id = receipt.id, error = %err, "Catalog refresh after withdrawal failed");
            false
        }
    };

    Ok(WithdrawalCommitted {
        receipt,
        reason: request.reason,
        catalog_refreshed,
        cart: view,
    })
}
