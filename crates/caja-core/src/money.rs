//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer smallest units                                   │
//! │    Chilean pesos have no minor unit, so 1 unit = $1.                    │
//! │    A currency with cents would store 1 unit = $0.01.                    │
//! │    Either way every total is an exact integer sum.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use caja_core::money::Money;
//!
//! let price = Money::from_units(4990);
//! let line = price * 3;
//! assert_eq!(line.units(), 14970);
//! assert_eq!(line.to_string(), "$14.970");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A signed amount in the smallest currency unit.
///
/// ## Where Money is Used
/// ```text
/// Product.sale_price ──► CartLine.unit_price ──► Cart.subtotal ──► Cart.total
///                                                                     │
/// CashBoxSession.cash_sales ◄──────────── register_sale ◄─────────────┘
///        │
///        ▼
/// expected_cash ──► CashCloseRecord.difference
/// ```
///
/// Negative values are legal: discounts, shortages and refunds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from smallest currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in smallest currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// let unit_price = Money::from_units(1290);
    /// assert_eq!(unit_price.multiply_quantity(3).units(), 3870);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Floors the value at zero.
    ///
    /// Used for sale totals where a discount larger than the subtotal
    /// must not produce a negative charge.
    #[inline]
    pub fn clamp_non_negative(self) -> Self {
        self.max(Money::zero())
    }

    /// Share of `whole` represented by `self`, in basis points (1/100 of a percent).
    ///
    /// Returns 0 when `whole` is zero. Integer division truncates toward zero.
    ///
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// let part = Money::from_units(2500);
    /// let whole = Money::from_units(10000);
    /// assert_eq!(part.share_bps_of(whole), 2500); // 25.00%
    /// ```
    pub fn share_bps_of(&self, whole: Money) -> i64 {
        if whole.is_zero() {
            return 0;
        }
        ((self.0 as i128 * 10_000) / whole.0 as i128) as i64
    }

    /// Formats with a custom currency symbol and es-CL thousands grouping.
    ///
    /// ```rust
    /// use caja_core::money::Money;
    ///
    /// assert_eq!(Money::from_units(1234567).format_with("CLP "), "CLP 1.234.567");
    /// assert_eq!(Money::from_units(-500).format_with("$"), "-$500");
    /// ```
    pub fn format_with(&self, symbol: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}{}", sign, symbol, group_thousands(self.0.unsigned_abs()))
    }
}

/// Inserts a `.` every three digits, counting from the right.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the Chilean convention: `$15.000`, `-$500`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with("$"))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
