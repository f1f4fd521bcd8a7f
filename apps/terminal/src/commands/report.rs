//! # Report Commands
//!
//! Fetch history from the backend, aggregate with the pure functions in
//! `caja_core::report`.
//!
//! ```text
//! GET /sales?limit=N ──► Vec<Transaction> ──┬─► totals_by_hour
//!                                           ├─► totals_by_payment_method
//!                                           └─► top_products(n)
//!
//! catalog snapshot ─────────────────────────► low_stock_report
//! GET /stats ───────────────────────────────► daily_summary
//! ```

use caja_client::Backend;
use caja_core::report::{
    daily_summary, low_stock_report, top_products, totals_by_hour, totals_by_payment_method,
};
use caja_core::{
    DailySummary, HourTotal, LowStockReport, MethodTotal, Money, ProductRanking, Transaction,
};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::CatalogState;

/// Sales dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub transaction_count: usize,
    pub total: Money,
    pub by_hour: Vec<HourTotal>,
    pub by_payment_method: Vec<MethodTotal>,
    pub top_products: Vec<ProductRanking>,
}

impl SalesReport {
    pub fn from_transactions(transactions: &[Transaction], top: usize) -> Self {
        SalesReport {
            transaction_count: transactions.len(),
            total: transactions.iter().map(|t| t.total).sum(),
            by_hour: totals_by_hour(transactions),
            by_payment_method: totals_by_payment_method(transactions),
            top_products: top_products(transactions, top),
        }
    }
}

/// Withdrawals dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalReport {
    pub transaction_count: usize,
    pub total: Money,
    pub top_products: Vec<ProductRanking>,
    pub recent: Vec<Transaction>,
}

pub async fn get_sales_report(
    backend: &dyn Backend,
    limit: usize,
    top: usize,
) -> Result<SalesReport, ApiError> {
    debug!(limit, top, "get_sales_report command");

    let sales = backend.list_sales(limit).await?;
    Ok(SalesReport::from_transactions(&sales, top))
}

pub async fn get_withdrawal_report(
    backend: &dyn Backend,
    limit: usize,
    top: usize,
) -> Result<WithdrawalReport, ApiError> {
    debug!(limit, top, "get_withdrawal_report command");

    let withdrawals = backend.list_withdrawals(limit).await?;
    Ok(WithdrawalReport {
        transaction_count: withdrawals.len(),
        total: withdrawals.iter().map(|t| t.total).sum(),
        top_products: top_products(&withdrawals, top),
        recent: withdrawals,
    })
}

/// Active products split by stock level, from the current snapshot.
pub fn get_low_stock_report(catalog: &CatalogState) -> LowStockReport {
    catalog.with_snapshot(|s| low_stock_report(s.products()))
}

pub async fn get_daily_summary(backend: &dyn Backend) -> Result<DailySummary, ApiError> {
    debug!("get_daily_summary command");

    let stats = backend.stats().await?;
    Ok(daily_summary(&stats))
}
