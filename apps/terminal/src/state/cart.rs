//! # Cart State
//!
//! The two carts the counter works with, each behind its own lock.
//!
//! ```text
//! ┌──────────────────────────────┐    ┌──────────────────────────────┐
//! │ SaleCartState                │    │ WithdrawalCartState          │
//! │ Arc<Mutex<Cart<SaleDetails>>>│    │ Arc<Mutex<Cart<Withdrawal…>>>│
//! └──────────────────────────────┘    └──────────────────────────────┘
//!        independent: a sale in progress never blocks a withdrawal
//! ```
//!
//! Closures passed to `with_cart`/`with_cart_mut` run synchronously with the
//! lock held. Nothing async happens inside them.

use std::sync::{Arc, Mutex};

use caja_core::{Cart, SaleDetails, WithdrawalDetails};

/// Shared handle to one cart.
#[derive(Debug)]
pub struct CartState<D> {
    cart: Arc<Mutex<Cart<D>>>,
}

pub type SaleCartState = CartState<SaleDetails>;
pub type WithdrawalCartState = CartState<WithdrawalDetails>;

impl<D: Default> CartState<D> {
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }
}

impl<D> CartState<D> {
    /// Runs `f` with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart<D>) -> R,
    {
        // Cart methods validate before writing, so a poisoned cart is consistent.
        let cart = self.cart.lock().unwrap_or_else(|e| e.into_inner());
        f(&cart)
    }

    /// Runs `f` with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart<D>) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut cart)
    }
}

impl<D: Default> Default for CartState<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> Clone for CartState<D> {
    fn clone(&self) -> Self {
        CartState {
            cart: Arc::clone(&self.cart),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::product;

    #[test]
    fn test_clones_share_the_cart() {
        let state = SaleCartState::new();
        let other = state.clone();

        state.with_cart_mut(|c| c.add(&product(1, 5, 1000))).unwrap();
        assert_eq!(other.with_cart(|c| c.item_count()), 1);
    }

    #[test]
    fn test_carts_are_independent() {
        let sale = SaleCartState::new();
        let withdrawal = WithdrawalCartState::new();

        sale.with_cart_mut(|c| c.add(&product(1, 5, 1000))).unwrap();
        assert!(withdrawal.with_cart(|c| c.is_empty()));
    }
}
