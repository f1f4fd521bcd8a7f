//! # Cash Box Commands
//!
//! ## Daily Cycle
//! ```text
//!   morning                    during the day                    night
//! ┌───────────────┐   ┌──────────────────────────────┐   ┌─────────────────────┐
//! │ open_cash_box │──►│ commit_sale (auto-registers) │──►│ close_cash_box      │
//! │  opening $    │   │ withdraw_cash                │   │  counted $          │
//! │  operator     │   │ get_cash_box_summary         │   │  → difference       │
//! └───────────────┘   └──────────────────────────────┘   │  → Cuadrada /       │
//!                                                        │    Faltante /       │
//!                                                        │    Sobrante         │
//!                                                        └─────────────────────┘
//! ```

use caja_core::{CashBoxSession, CashBoxSummary, CashCloseRecord, Money, Registration};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::CashBoxState;

/// Cash box panel contents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashBoxStatus {
    pub is_open: bool,
    pub summary: Option<CashBoxSummary>,
}

pub fn get_cash_box_status(cash_box: &CashBoxState) -> CashBoxStatus {
    let summary = cash_box.summary();
    CashBoxStatus {
        is_open: summary.is_some(),
        summary,
    }
}

/// Opens today's session.
///
/// ## Errors
/// - `SESSION_ALREADY_OPEN` if a session is open (it is left as is)
/// - `INVALID_AMOUNT` for a negative opening amount
/// - `VALIDATION_ERROR` for a blank operator name
pub async fn open_cash_box(
    cash_box: &CashBoxState,
    opening_amount: Money,
    operator_name: &str,
    now: DateTime<FixedOffset>,
) -> Result<CashBoxSession, ApiError> {
    debug!(opening_amount = %opening_amount, operator = %operator_name, "open_cash_box command");
    cash_box.open(opening_amount, operator_name, now).await
}

/// Records cash taken out of the drawer (paying a supplier, change run).
pub async fn withdraw_cash(
    cash_box: &CashBoxState,
    amount: Money,
) -> Result<Registration, ApiError> {
    debug!(amount = %amount, "withdraw_cash command");
    cash_box.withdraw_cash(amount).await
}

/// Closes the session against the counted cash and returns the record.
pub async fn close_cash_box(
    cash_box: &CashBoxState,
    actual_cash_counted: Money,
    now: DateTime<FixedOffset>,
) -> Result<CashCloseRecord, ApiError> {
    debug!(counted = %actual_cash_counted, "close_cash_box command");
    cash_box.close(actual_cash_counted, now).await
}

pub async fn get_cash_box_history(
    cash_box: &CashBoxState,
    limit: usize,
) -> Result<Vec<CashCloseRecord>, ApiError> {
    debug!(limit, "get_cash_box_history command");
    cash_box.history(limit).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{at, cash_box_state};
    use caja_core::{CloseOutcome, PaymentMethod};

    #[tokio::test]
    async fn test_full_day_with_shortage() {
        let cash_box = cash_box_state();
        assert!(!get_cash_box_status(&cash_box).is_open);

        open_cash_box(&cash_box, Money::from_units(10000), "Marta", at(14, 9))
            .await
            .unwrap();
        cash_box
            .register_sale(Money::from_units(5000), PaymentMethod::Cash)
            .await;
        cash_box
            .register_sale(Money::from_units(8000), PaymentMethod::Transfer)
            .await;

        let status = get_cash_box_status(&cash_box);
        let summary = status.summary.unwrap();
        assert_eq!(summary.total_sales, Money::from_units(13000));
        assert_eq!(summary.expected_cash, Money::from_units(15000));

        let record = close_cash_box(&cash_box, Money::from_units(14500), at(14, 21))
            .await
            .unwrap();
        assert_eq!(record.expected_cash, Money::from_units(15000));
        assert_eq!(record.difference, Money::from_units(-500));
        assert_eq!(record.outcome, CloseOutcome::Shortage);
    }

    #[tokio::test]
    async fn test_open_twice_and_close_closed() {
        let cash_box = cash_box_state();
        open_cash_box(&cash_box, Money::from_units(10000), "Marta", at(14, 9))
            .await
            .unwrap();
        cash_box
            .register_sale(Money::from_units(5000), PaymentMethod::Cash)
            .await;

        let err = open_cash_box(&cash_box, Money::from_units(1), "Pedro", at(14, 10))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionAlreadyOpen);
        let summary = cash_box.summary().unwrap();
        assert_eq!(summary.operator_name, "Marta");
        assert_eq!(summary.cash_sales, Money::from_units(5000));

        close_cash_box(&cash_box, Money::from_units(15000), at(14, 21))
            .await
            .unwrap();
        let err = close_cash_box(&cash_box, Money::from_units(15000), at(14, 22))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotOpen);
    }

    #[tokio::test]
    async fn test_blank_operator_is_rejected() {
        let cash_box = cash_box_state();
        let err = open_cash_box(&cash_box, Money::from_units(0), "   ", at(14, 9))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(!cash_box.is_open());
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let cash_box = cash_box_state();
        for (day, counted) in [(12, 100), (13, 200), (14, 300)] {
            open_cash_box(&cash_box, Money::from_units(counted), "Marta", at(day, 9))
                .await
                .unwrap();
            withdraw_cash(&cash_box, Money::zero()).await.unwrap();
            close_cash_box(&cash_box, Money::from_units(counted), at(day, 21))
                .await
                .unwrap();
        }

        let history = get_cash_box_history(&cash_box, 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].actual_cash_counted, Money::from_units(300));
        assert_eq!(history[1].actual_cash_counted, Money::from_units(200));
        assert_eq!(history[0].outcome, CloseOutcome::Balanced);
    }
}
