//! # Report Module
//!
//! Pure aggregations over sales, withdrawals and the catalog.
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input                       Function                   Output          │
//! │  ─────                       ────────                   ──────          │
//! │  [Transaction] ────────────► totals_by_hour ──────────► 24 × HourTotal  │
//! │  [Transaction] ────────────► totals_by_payment_method ► 3 × MethodTotal │
//! │  [Transaction] ────────────► top_products(n) ─────────► [ProductRanking]│
//! │  [Product] ────────────────► low_stock_report ────────► LowStockReport  │
//! │  DailyStats (GET /stats) ──► daily_summary ───────────► DailySummary    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here reads the clock or the network; the caller fetches the data.

use chrono::{DateTime, FixedOffset, Timelike};
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{PaymentMethod, Product, StockLevel, WithdrawalReason};

// =============================================================================
// Input Types
// =============================================================================

/// A line of a historical sale or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionItem {
    pub product_id: i64,
    #[serde(alias = "productName")]
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// A historical sale or withdrawal as returned by `GET /sales` or `GET /withdrawals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<FixedOffset>,
    pub total: Money,
    /// Present on sales. Unknown method names read as `None`.
    #[serde(default, deserialize_with = "lenient_payment_method")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub discount: Money,
    /// Present on withdrawals.
    #[serde(default)]
    pub reason: Option<WithdrawalReason>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<TransactionItem>,
}

fn lenient_payment_method<'de, D>(deserializer: D) -> Result<Option<PaymentMethod>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

// =============================================================================
// Totals by Hour
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HourTotal {
    /// 0..=23
    pub hour: u32,
    pub total: Money,
    pub count: u32,
}

/// Groups totals into 24 hour-of-day buckets.
///
/// The hour is taken in each transaction's own UTC offset, so a sale at
/// 21:30 -03:00 lands in bucket 21 regardless of where the report runs.
pub fn totals_by_hour(transactions: &[Transaction]) -> Vec<HourTotal> {
    let mut buckets: Vec<HourTotal> = (0..24)
        .map(|hour| HourTotal {
            hour,
            total: Money::zero(),
            count: 0,
        })
        .collect();

    for tx in transactions {
        let bucket = &mut buckets[tx.created_at.hour() as usize];
        bucket.total += tx.total;
        bucket.count += 1;
    }

    buckets
}

// =============================================================================
// Totals by Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub total: Money,
    pub count: u32,
    /// Share of the grand total in basis points (10000 = 100%).
    pub share_bps: i64,
}

/// Per-method totals for every payment method, in [`PaymentMethod::ALL`] order.
///
/// Transactions without a payment method are skipped.
pub fn totals_by_payment_method(transactions: &[Transaction]) -> Vec<MethodTotal> {
    let mut totals: Vec<MethodTotal> = PaymentMethod::ALL
        .iter()
        .map(|&method| MethodTotal {
            method,
            total: Money::zero(),
            count: 0,
            share_bps: 0,
        })
        .collect();

    for tx in transactions {
        let Some(method) = tx.payment_method else {
            continue;
        };
        if let Some(entry) = totals.iter_mut().find(|t| t.method == method) {
            entry.total += tx.total;
            entry.count += 1;
        }
    }

    let grand_total: Money = totals.iter().map(|t| t.total).sum();
    for entry in &mut totals {
        entry.share_bps = entry.total.share_bps_of(grand_total);
    }

    totals
}

// =============================================================================
// Top Products
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductRanking {
    pub name: String,
    pub quantity: i64,
    pub revenue: Money,
}

/// The `n` best sellers by quantity.
///
/// Items are consolidated by product name. Ties keep the order in which the
/// product first appeared in `transactions`.
pub fn top_products(transactions: &[Transaction], n: usize) -> Vec<ProductRanking> {
    let mut rankings: Vec<ProductRanking> = Vec::new();

    for item in transactions.iter().flat_map(|tx| tx.items.iter()) {
        match rankings.iter_mut().find(|r| r.name == item.name) {
            Some(ranking) => {
                ranking.quantity += item.quantity;
                ranking.revenue += item.subtotal;
            }
            None => rankings.push(ProductRanking {
                name: item.name.clone(),
                quantity: item.quantity,
                revenue: item.subtotal,
            }),
        }
    }

    // sort_by is stable
    rankings.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    rankings.truncate(n);
    rankings
}

// =============================================================================
// Low Stock Report
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LowStockReport {
    pub out_of_stock: Vec<Product>,
    pub low_stock: Vec<Product>,
    pub normal: Vec<Product>,
}

impl LowStockReport {
    /// Products that need restocking (out of stock plus low).
    pub fn attention_count(&self) -> usize {
        self.out_of_stock.len() + self.low_stock.len()
    }
}

/// Partitions active products by [`StockLevel`]. Inactive products are dropped.
pub fn low_stock_report(products: &[Product]) -> LowStockReport {
    let mut report = LowStockReport::default();

    for product in products.iter().filter(|p| p.active) {
        let bucket = match product.stock_level() {
            StockLevel::OutOfStock => &mut report.out_of_stock,
            StockLevel::Low => &mut report.low_stock,
            StockLevel::Normal => &mut report.normal,
        };
        bucket.push(product.clone());
    }

    report
}

// =============================================================================
// Daily Summary
// =============================================================================

/// Body of `GET /stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyStats {
    pub sales_today: Money,
    pub withdrawals_today: Money,
    pub active_products: i64,
    pub low_stock_products: i64,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub last_sale_at: Option<DateTime<FixedOffset>>,
}

/// Dashboard projection of [`DailyStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailySummary {
    pub sales_today: Money,
    pub withdrawals_today: Money,
    /// `sales_today - withdrawals_today`
    pub net: Money,
    pub active_products: i64,
    pub low_stock_products: i64,
    #[ts(as = "Option<String>")]
    pub last_sale_at: Option<DateTime<FixedOffset>>,
}

pub fn daily_summary(stats: &DailyStats) -> DailySummary {
    DailySummary {
        sales_today: stats.sales_today,
        withdrawals_today: stats.withdrawals_today,
        net: stats.sales_today - stats.withdrawals_today,
        active_products: stats.active_products,
        low_stock_products: stats.low_stock_products,
        last_sale_at: stats.last_sale_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tests::test_product;
    use chrono::TimeZone;

    fn at(hour: u32, offset_hours: i32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 14, hour, 15, 0)
            .unwrap()
    }

    fn sale(id: i64, hour: u32, total: i64, method: Option<PaymentMethod>) -> Transaction {
        Transaction {
            id,
            created_at: at(hour, -3),
            total: Money::from_units(total),
            payment_method: method,
            discount: Money::zero(),
            reason: None,
            notes: None,
            items: Vec::new(),
        }
    }

    fn item(name: &str, quantity: i64, unit_price: i64) -> TransactionItem {
        TransactionItem {
            product_id: 0,
            name: name.to_string(),
            quantity,
            unit_price: Money::from_units(unit_price),
            subtotal: Money::from_units(unit_price * quantity),
        }
    }

    #[test]
    fn test_totals_by_hour_uses_own_offset() {
        let mut late = sale(2, 21, 3000, Some(PaymentMethod::Cash));
        late.created_at = at(21, -4);
        let txs = vec![sale(1, 9, 1000, Some(PaymentMethod::Cash)), late, sale(3, 9, 500, None)];

        let hours = totals_by_hour(&txs);

        assert_eq!(hours.len(), 24);
        assert_eq!(hours[9].total, Money::from_units(1500));
        assert_eq!(hours[9].count, 2);
        assert_eq!(hours[21].total, Money::from_units(3000));
        assert_eq!(hours[0].total, Money::zero());
        assert_eq!(hours[0].count, 0);
    }

    #[test]
    fn test_totals_by_payment_method() {
        let txs = vec![
            sale(1, 10, 6000, Some(PaymentMethod::Cash)),
            sale(2, 11, 3000, Some(PaymentMethod::Card)),
            sale(3, 12, 1000, Some(PaymentMethod::Cash)),
            sale(4, 12, 9999, None),
        ];

        let totals = totals_by_payment_method(&txs);

        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].method, PaymentMethod::Cash);
        assert_eq!(totals[0].total, Money::from_units(7000));
        assert_eq!(totals[0].count, 2);
        assert_eq!(totals[0].share_bps, 7000);
        assert_eq!(totals[1].share_bps, 3000);
        assert_eq!(totals[2].total, Money::zero());
        assert_eq!(totals[2].share_bps, 0);
    }

    #[test]
    fn test_top_products_stable_ties() {
        let mut a = sale(1, 10, 0, Some(PaymentMethod::Cash));
        a.items = vec![item("Ron", 3, 1000), item("Pisco", 2, 5000)];
        let mut b = sale(2, 11, 0, Some(PaymentMethod::Cash));
        b.items = vec![item("Vodka", 3, 7000), item("Pisco", 3, 5000)];

        let top = top_products(&[a.clone(), b.clone()], 3);

        let names: Vec<&str> = top.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Pisco", "Ron", "Vodka"]);
        assert_eq!(top[0].quantity, 5);
        assert_eq!(top[0].revenue, Money::from_units(25000));
        assert_eq!(top[1].quantity, 3);
        assert_eq!(top[2].quantity, 3);

        // The cut falls inside the tie: first seen wins
        let top = top_products(&[a, b], 2);
        let names: Vec<&str> = top.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Pisco", "Ron"]);
    }

    #[test]
    fn test_top_products_truncates() {
        let mut a = sale(1, 10, 0, None);
        a.items = vec![item("A", 1, 1), item("B", 2, 1), item("C", 3, 1)];
        let top = top_products(&[a], 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "C");
        assert!(top_products(&[], 5).is_empty());
    }

    #[test]
    fn test_low_stock_report() {
        let mut inactive = test_product(4, 0, 1000);
        inactive.active = false;
        let products = vec![
            test_product(1, 0, 1000),
            test_product(2, 5, 1000),
            test_product(3, 40, 1000),
            inactive,
        ];

        let report = low_stock_report(&products);

        assert_eq!(report.out_of_stock.len(), 1);
        assert_eq!(report.low_stock.len(), 1);
        assert_eq!(report.normal.len(), 1);
        assert_eq!(report.attention_count(), 2);
    }

    #[test]
    fn test_daily_summary_net() {
        let stats = DailyStats {
            sales_today: Money::from_units(150_000),
            withdrawals_today: Money::from_units(12_000),
            active_products: 320,
            low_stock_products: 14,
            last_sale_at: None,
        };
        let summary = daily_summary(&stats);
        assert_eq!(summary.net, Money::from_units(138_000));
        assert_eq!(summary.low_stock_products, 14);
    }

    #[test]
    fn test_transaction_lenient_method() {
        let json = serde_json::json!({
            "id": 1,
            "createdAt": "2026-03-14T20:05:00-03:00",
            "total": 4500,
            "paymentMethod": "efectivo",
            "items": [{
                "productId": 9, "productName": "Pisco", "quantity": 1,
                "unitPrice": 4500, "subtotal": 4500
            }]
        });
        let tx: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(tx.items[0].name, "Pisco");

        let json = serde_json::json!({
            "id": 2,
            "createdAt": "2026-03-14T20:05:00-03:00",
            "total": 100,
            "paymentMethod": "cheque"
        });
        let tx: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(tx.payment_method, None);
    }
}
