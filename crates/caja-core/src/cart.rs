//! # Cart Module
//!
//! One cart type serves both flows at the counter:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart<D>                                         │
//! │                                                                         │
//! │   lines: [CartLine]  (one per product, ≤ MAX_CART_LINES)                │
//! │   details: D                                                            │
//! │                                                                         │
//! │   ┌──────────────────────────┐      ┌──────────────────────────────┐   │
//! │   │ SaleCart                 │      │ WithdrawalCart               │   │
//! │   │ D = SaleDetails          │      │ D = WithdrawalDetails        │   │
//! │   │  • payment_method        │      │  • reason                    │   │
//! │   │  • discount (signed)     │      │  • notes                     │   │
//! │   │ checkout → SaleRequest   │      │ checkout → WithdrawalRequest │   │
//! │   └──────────────────────────┘      └──────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Ceiling
//! When a line is created it captures `stock_available` from the catalog
//! snapshot. The quantity of that line can never go above it. The snapshot
//! may be stale by the time the cart is committed; the backend has the
//! final word and rejects the commit if stock ran out meanwhile.
//!
//! ## Failure Semantics
//! Every mutating operation either succeeds completely or returns an error
//! with the cart untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{PaymentMethod, Product, WithdrawalReason};
use crate::MAX_CART_LINES;

// =============================================================================
// Cart Line
// =============================================================================

/// A product in the cart.
///
/// Code, name and price are frozen at the moment the line is created, so a
/// catalog refresh never changes what the customer was quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    pub product_id: i64,
    pub code: String,
    pub name: String,
    pub unit_price: Money,
    /// Always in `1..=stock_available`.
    pub quantity: i64,
    /// Stock in the snapshot when this line was created.
    pub stock_available: i64,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    fn from_product(product: &Product, now: DateTime<Utc>) -> Self {
        CartLine {
            product_id: product.id,
            code: product.code.clone(),
            name: product.name.clone(),
            unit_price: product.sale_price,
            quantity: 1,
            stock_available: product.stock,
            added_at: now,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    fn out_of_stock(&self, requested: i64) -> CoreError {
        CoreError::OutOfStock {
            code: self.code.clone(),
            available: self.stock_available,
            requested,
        }
    }
}

// =============================================================================
// Details
// =============================================================================

/// Extra state carried by a sale cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleDetails {
    pub payment_method: PaymentMethod,
    /// Negative is a discount, positive a surcharge.
    pub discount: Money,
}

/// Extra state carried by a withdrawal cart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WithdrawalDetails {
    pub reason: WithdrawalReason,
    pub notes: String,
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered lines plus flow-specific details.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart<D> {
    lines: Vec<CartLine>,
    details: D,
}

/// Cart for an outgoing sale.
pub type SaleCart = Cart<SaleDetails>;

/// Cart for stock leaving without payment.
pub type WithdrawalCart = Cart<WithdrawalDetails>;

impl<D: Default> Cart<D> {
    /// Creates an empty cart with default details.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            details: D::default(),
        }
    }

    /// Adds one unit of `product`, stamping a new line with the current time.
    pub fn add(&mut self, product: &Product) -> CoreResult<()> {
        self.add_at(product, Utc::now())
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// ```text
    /// inactive or stock 0 ──────────────► ProductUnavailable
    /// line exists, qty < stock_available ► qty += 1
    /// line exists, qty = stock_available ► OutOfStock (unchanged)
    /// new line, cart full ──────────────► CartTooLarge
    /// new line ─────────────────────────► push qty 1, price frozen
    /// ```
    pub fn add_at(&mut self, product: &Product, now: DateTime<Utc>) -> CoreResult<()> {
        if !product.is_sellable() {
            return Err(CoreError::ProductUnavailable {
                code: product.code.clone(),
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let requested = line.quantity + 1;
            if requested > line.stock_available {
                return Err(line.out_of_stock(requested));
            }
            line.quantity = requested;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::from_product(product, now));
        Ok(())
    }

    /// Removes the line for `product_id`. Absent products are ignored.
    pub fn remove(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Changes a line's quantity by `delta`.
    ///
    /// A resulting quantity of zero or less removes the line. Going above
    /// `stock_available` fails with `OutOfStock` and changes nothing.
    /// Unknown products are a no-op.
    pub fn adjust(&mut self, product_id: i64, delta: i64) -> CoreResult<()> {
        let Some(index) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return Ok(());
        };

        let line = &mut self.lines[index];
        // Saturates so an oversized delta reads as OutOfStock or removal.
        let new_quantity = line.quantity.saturating_add(delta);

        if new_quantity <= 0 {
            self.lines.remove(index);
            return Ok(());
        }

        if new_quantity > line.stock_available {
            return Err(line.out_of_stock(new_quantity));
        }

        line.quantity = new_quantity;
        Ok(())
    }

    /// Empties the cart and resets details to their defaults.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.details = D::default();
    }
}

impl<D> Cart<D> {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn details(&self) -> &D {
        &self.details
    }

    pub fn details_mut(&mut self) -> &mut D {
        &mut self.details
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities across lines (the cart badge).
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of `unit_price × quantity`.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

// =============================================================================
// Sale Cart
// =============================================================================

impl Cart<SaleDetails> {
    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.details.payment_method = method;
    }

    /// Sets the signed adjustment applied on top of the subtotal.
    pub fn set_discount(&mut self, discount: Money) {
        self.details.discount = discount;
    }

    /// `max(0, subtotal + discount)`.
    ///
    /// ```rust
    /// use caja_core::{Money, SaleCart};
    ///
    /// let mut cart = SaleCart::new();
    /// cart.set_discount(Money::from_units(-5000));
    /// assert_eq!(cart.total(), Money::zero());
    /// ```
    pub fn total(&self) -> Money {
        (self.subtotal() + self.details.discount).clamp_non_negative()
    }

    /// Builds the `POST /sales` body.
    pub fn checkout(&self) -> CoreResult<SaleRequest> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        Ok(SaleRequest {
            items: self
                .lines
                .iter()
                .map(|l| SaleItemRequest {
                    product_id: l.product_id,
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                })
                .collect(),
            payment_method: self.details.payment_method,
            total: self.total(),
            discount: self.details.discount,
        })
    }
}

// =============================================================================
// Withdrawal Cart
// =============================================================================

impl Cart<WithdrawalDetails> {
    pub fn set_reason(&mut self, reason: WithdrawalReason) {
        self.details.reason = reason;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.details.notes = notes.into();
    }

    /// Builds the `POST /withdrawals` body.
    pub fn checkout(&self) -> CoreResult<WithdrawalRequest> {
        if self.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        Ok(WithdrawalRequest {
            items: self
                .lines
                .iter()
                .map(|l| WithdrawalItemRequest {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
            reason: self.details.reason,
            notes: self.details.notes.clone(),
        })
    }
}

// =============================================================================
// Wire Requests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleItemRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Body of `POST /sales`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SaleRequest {
    pub items: Vec<SaleItemRequest>,
    pub payment_method: PaymentMethod,
    pub total: Money,
    pub discount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WithdrawalItemRequest {
    pub product_id: i64,
    pub quantity: i64,
}

/// Body of `POST /withdrawals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WithdrawalRequest {
    pub items: Vec<WithdrawalItemRequest>,
    pub reason: WithdrawalReason,
    pub notes: String,
}

// =============================================================================
// Unit Tests
// =============================================================================
