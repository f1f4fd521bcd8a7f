//! # Domain Types
//!
//! Core domain types shared by the catalog, the carts and the backend client.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  ProductDraft   │   │  CommitReceipt  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (backend)   │   │  create/update  │   │  id             │       │
//! │  │  code (SKU)     │   │  form body      │   │  total          │       │
//! │  │  sale_price     │   │                 │   │  created_at     │       │
//! │  │  stock          │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │  StockLevel     │   │ PaymentMethod   │   │ WithdrawalReason     │  │
//! │  │  OutOfStock     │   │  Cash           │   │  InternalConsumption │  │
//! │  │  Low            │   │  Card           │   │  Breakage ... Other  │  │
//! │  │  Normal         │   │  Transfer       │   │                      │  │
//! │  └─────────────────┘   └─────────────────┘   └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products are owned by the backend. The terminal only ever holds a
//! read-only snapshot of them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::DEFAULT_REORDER_THRESHOLD;

fn default_reorder_threshold() -> i64 {
    DEFAULT_REORDER_THRESHOLD
}

fn default_active() -> bool {
    true
}

// =============================================================================
// Product
// =============================================================================

/// A product as published by the backend catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Backend identifier.
    pub id: i64,

    /// Unique SKU / barcode text (código).
    pub code: String,

    /// Display name shown to the cashier.
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub brand: Option<String>,

    /// Cost to the store.
    pub purchase_price: Money,

    /// Shelf price charged to customers.
    pub sale_price: Money,

    /// Units on hand when the snapshot was taken.
    pub stock: i64,

    /// `stock <= reorder_threshold` flags the product as low stock.
    #[serde(default = "default_reorder_threshold")]
    pub reorder_threshold: i64,

    /// Inactive products are hidden from browse and cannot enter a cart.
    #[serde(default = "default_active")]
    pub active: bool,

    /// Container size, paired with `unit` (750 + "ml").
    #[serde(default)]
    pub volume: Option<f64>,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Gross margin per unit (sale price minus purchase price).
    #[inline]
    pub fn margin(&self) -> Money {
        self.sale_price - self.purchase_price
    }

    /// Margin as a share of the sale price, in basis points.
    /// Purchase 6.000 / sale 8.000 gives 2500 (25%).
    pub fn margin_bps(&self) -> i64 {
        self.margin().share_bps_of(self.sale_price)
    }

    /// Classifies the snapshot stock against the reorder threshold.
    pub fn stock_level(&self) -> StockLevel {
        if self.stock <= 0 {
            StockLevel::OutOfStock
        } else if self.stock <= self.reorder_threshold {
            StockLevel::Low
        } else {
            StockLevel::Normal
        }
    }

    /// True when stock is at or below the reorder threshold (out of stock included).
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.reorder_threshold
    }

    /// Checks whether the product may be added to a cart.
    #[inline]
    pub fn is_sellable(&self) -> bool {
        self.active && self.stock > 0
    }

    /// Human label for the container size, e.g. `750 ml`.
    pub fn measure_label(&self) -> Option<String> {
        match (self.volume, self.unit.as_deref()) {
            (Some(volume), Some(unit)) => Some(format!("{} {}", volume, unit)),
            _ => None,
        }
    }
}

// =============================================================================
// Stock Level
// =============================================================================

/// Stock classification used by browse filters and the low-stock report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StockLevel {
    OutOfStock,
    Low,
    Normal,
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    /// Notes and coins into the drawer.
    #[default]
    Cash,
    /// Debit or credit card on an external terminal.
    Card,
    /// Bank transfer.
    Transfer,
}

impl PaymentMethod {
    /// Every method, in display order.
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Transfer,
    ];

    /// Wire name (`cash`, `card`, `transfer`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Transfer => "transfer",
        }
    }

    /// Only cash sales move money in the physical drawer.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses wire names and the Spanish labels older backends emit.
impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" | "efectivo" => Ok(PaymentMethod::Cash),
            "card" | "tarjeta" => Ok(PaymentMethod::Card),
            "transfer" | "transferencia" => Ok(PaymentMethod::Transfer),
            _ => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Withdrawal Reason
// =============================================================================

/// Why stock left the shelf without a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum WithdrawalReason {
    /// Consumed by the store itself.
    #[default]
    InternalConsumption,
    /// Broken or lost.
    Breakage,
    /// Past its expiry date.
    Expired,
    /// Damaged packaging or contents.
    Damaged,
    /// Given away as a sample or gift.
    Sample,
    /// Correction after a physical count.
    InventoryAdjustment,
    Other,
}

impl WithdrawalReason {
    pub const ALL: [WithdrawalReason; 7] = [
        WithdrawalReason::InternalConsumption,
        WithdrawalReason::Breakage,
        WithdrawalReason::Expired,
        WithdrawalReason::Damaged,
        WithdrawalReason::Sample,
        WithdrawalReason::InventoryAdjustment,
        WithdrawalReason::Other,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            WithdrawalReason::InternalConsumption => "internal_consumption",
            WithdrawalReason::Breakage => "breakage",
            WithdrawalReason::Expired => "expired",
            WithdrawalReason::Damaged => "damaged",
            WithdrawalReason::Sample => "sample",
            WithdrawalReason::InventoryAdjustment => "inventory_adjustment",
            WithdrawalReason::Other => "other",
        }
    }
}

impl fmt::Display for WithdrawalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalReason {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reason = match s.trim().to_lowercase().as_str() {
            "internal_consumption" | "consumo_interno" => WithdrawalReason::InternalConsumption,
            "breakage" | "perdida" | "pérdida" => WithdrawalReason::Breakage,
            "expired" | "vencido" => WithdrawalReason::Expired,
            "damaged" | "deteriorado" => WithdrawalReason::Damaged,
            "sample" | "muestra" => WithdrawalReason::Sample,
            "inventory_adjustment" | "inventario" => WithdrawalReason::InventoryAdjustment,
            "other" | "otro" => WithdrawalReason::Other,
            _ => {
                return Err(ValidationError::NotAllowed {
                    field: "reason".to_string(),
                    allowed: WithdrawalReason::ALL
                        .iter()
                        .map(|r| r.as_str().to_string())
                        .collect(),
                })
            }
        };
        Ok(reason)
    }
}

// =============================================================================
// Product Draft
// =============================================================================

/// Body for product create and update requests.
///
/// Checked with [`crate::validation::validate_product_draft`] before it is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDraft {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    pub purchase_price: Money,
    pub sale_price: Money,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_reorder_threshold")]
    pub reorder_threshold: i64,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<&Product> for ProductDraft {
    /// Pre-fills an edit form from an existing product.
    fn from(product: &Product) -> Self {
        ProductDraft {
            code: product.code.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            category: product.category.clone(),
            brand: product.brand.clone(),
            purchase_price: product.purchase_price,
            sale_price: product.sale_price,
            stock: product.stock,
            reorder_threshold: product.reorder_threshold,
            volume: product.volume,
            unit: product.unit.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

// =============================================================================
// Commit Receipt
// =============================================================================

/// Backend acknowledgement of a committed sale or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CommitReceipt {
    pub id: i64,
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<FixedOffset>,
}

// =============================================================================
// Unit Tests
// =============================================================================
