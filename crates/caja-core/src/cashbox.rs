//! # Cash Box Module
//!
//! The daily cash session ("caja") and its reconciliation at close.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            open(amount, operator)                                       │
//! │   ┌────────┐ ───────────────────────► ┌────────┐                        │
//! │   │ Closed │                          │  Open  │ ◄── register_sale      │
//! │   └────────┘ ◄─────────────────────── └────────┘ ◄── register_withdrawal│
//! │        ▲       close(counted)              │                            │
//! │        │       → CashCloseRecord           │                            │
//! │        │                                   │                            │
//! │        └─── restore(): session from a previous day is discarded         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Reconciliation
//! ```text
//! expected_cash = opening_amount + cash_sales - withdrawals_from_drawer
//! difference    = actual_cash_counted - expected_cash
//!
//! difference < 0  → Shortage (faltante)
//! difference = 0  → Balanced
//! difference > 0  → Surplus  (sobrante)
//! ```
//!
//! Card and transfer sales are tracked for the daily report but never
//! enter the drawer, so they do not move `expected_cash`.
//!
//! This module is pure: the caller supplies timestamps and persists the
//! resulting state.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentMethod;
use crate::validation::validate_operator_name;

// =============================================================================
// Session
// =============================================================================

/// An open cash session with its running per-method totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CashBoxSession {
    #[ts(as = "String")]
    pub id: Uuid,
    pub opening_amount: Money,
    pub operator_name: String,
    #[ts(as = "String")]
    pub opened_at: DateTime<FixedOffset>,
    pub cash_sales: Money,
    pub card_sales: Money,
    pub transfer_sales: Money,
    /// Cash taken out of the drawer (change runs, supplier payments).
    pub withdrawals_from_drawer: Money,
    pub sale_count: u32,
}

impl CashBoxSession {
    /// `opening_amount + cash_sales - withdrawals_from_drawer`, not clamped.
    pub fn expected_cash(&self) -> Money {
        self.opening_amount + self.cash_sales - self.withdrawals_from_drawer
    }

    /// Sales across every payment method.
    pub fn total_sales(&self) -> Money {
        self.cash_sales + self.card_sales + self.transfer_sales
    }

    /// Sessions are only valid on the calendar day they were opened.
    pub fn is_from(&self, day: NaiveDate) -> bool {
        self.opened_at.date_naive() == day
    }

    fn accumulator_mut(&mut self, method: PaymentMethod) -> &mut Money {
        match method {
            PaymentMethod::Cash => &mut self.cash_sales,
            PaymentMethod::Card => &mut self.card_sales,
            PaymentMethod::Transfer => &mut self.transfer_sales,
        }
    }
}

// =============================================================================
// Close Record
// =============================================================================

/// Result of reconciling the drawer at close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CloseOutcome {
    Balanced,
    /// Less cash than expected.
    Shortage,
    /// More cash than expected.
    Surplus,
}

impl CloseOutcome {
    pub fn from_difference(difference: Money) -> Self {
        if difference.is_negative() {
            CloseOutcome::Shortage
        } else if difference.is_positive() {
            CloseOutcome::Surplus
        } else {
            CloseOutcome::Balanced
        }
    }
}

/// Immutable record of a closed session, appended to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CashCloseRecord {
    #[serde(flatten)]
    pub session: CashBoxSession,
    #[ts(as = "String")]
    pub closed_at: DateTime<FixedOffset>,
    pub actual_cash_counted: Money,
    pub expected_cash: Money,
    pub difference: Money,
    pub total_sales: Money,
    pub outcome: CloseOutcome,
}

// =============================================================================
// Summary
// =============================================================================

/// Live view of the open session for the cash box panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CashBoxSummary {
    pub operator_name: String,
    #[ts(as = "String")]
    pub opened_at: DateTime<FixedOffset>,
    pub opening_amount: Money,
    pub cash_sales: Money,
    pub card_sales: Money,
    pub transfer_sales: Money,
    pub withdrawals_from_drawer: Money,
    pub sale_count: u32,
    pub total_sales: Money,
    pub expected_cash: Money,
}

impl From<&CashBoxSession> for CashBoxSummary {
    fn from(s: &CashBoxSession) -> Self {
        CashBoxSummary {
            operator_name: s.operator_name.clone(),
            opened_at: s.opened_at,
            opening_amount: s.opening_amount,
            cash_sales: s.cash_sales,
            card_sales: s.card_sales,
            transfer_sales: s.transfer_sales,
            withdrawals_from_drawer: s.withdrawals_from_drawer,
            sale_count: s.sale_count,
            total_sales: s.total_sales(),
            expected_cash: s.expected_cash(),
        }
    }
}

// =============================================================================
// Registration Outcome
// =============================================================================

/// What happened to a sale or drawer withdrawal sent to the cash box.
///
/// None of these are errors: a sale must still go through when nobody
/// opened the cash box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Registration {
    /// Added to the running totals. The session must be persisted.
    Recorded,
    /// No open session; nothing changed.
    SessionClosed,
    /// Payment method string not recognised; nothing changed.
    UnknownMethod,
}

impl Registration {
    pub fn changed_state(&self) -> bool {
        matches!(self, Registration::Recorded)
    }
}

// =============================================================================
// Cash Box
// =============================================================================

/// Cash box state: either no session or exactly one open session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CashBox {
    session: Option<CashBoxSession>,
}

impl CashBox {
    /// A closed cash box.
    pub fn new() -> Self {
        CashBox::default()
    }

    /// Rebuilds the cash box from a persisted session.
    ///
    /// A session opened on a day other than `today` is not resumed. It is
    /// returned as the second element so the caller can log it; it is not
    /// closed into the history.
    pub fn restore(
        persisted: Option<CashBoxSession>,
        today: NaiveDate,
    ) -> (Self, Option<CashBoxSession>) {
        match persisted {
            Some(session) if session.is_from(today) => (
                CashBox {
                    session: Some(session),
                },
                None,
            ),
            Some(stale) => (CashBox::new(), Some(stale)),
            None => (CashBox::new(), None),
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CashBoxSession> {
        self.session.as_ref()
    }

    /// Opens a new session with zeroed accumulators.
    ///
    /// ## Errors
    /// - `SessionAlreadyOpen` if a session exists (it is left untouched)
    /// - `InvalidAmount` if `opening_amount` is negative
    /// - `Validation` if the operator name is empty or too long
    pub fn open(
        &mut self,
        opening_amount: Money,
        operator_name: &str,
        now: DateTime<FixedOffset>,
    ) -> CoreResult<&CashBoxSession> {
        if let Some(current) = &self.session {
            return Err(CoreError::SessionAlreadyOpen {
                operator: current.operator_name.clone(),
            });
        }
        if opening_amount.is_negative() {
            return Err(CoreError::InvalidAmount {
                field: "opening_amount".to_string(),
                amount: opening_amount,
            });
        }
        validate_operator_name(operator_name)?;

        let session = self.session.insert(CashBoxSession {
            id: Uuid::new_v4(),
            opening_amount,
            operator_name: operator_name.trim().to_string(),
            opened_at: now,
            cash_sales: Money::zero(),
            card_sales: Money::zero(),
            transfer_sales: Money::zero(),
            withdrawals_from_drawer: Money::zero(),
            sale_count: 0,
        });
        Ok(session)
    }

    /// Adds a committed sale to the accumulator for `method`.
    ///
    /// `method` is the raw payment method string (`cash`, `efectivo`, ...).
    /// Unknown strings are ignored rather than rejected.
    pub fn register_sale(&mut self, amount: Money, method: &str) -> Registration {
        match method.parse::<PaymentMethod>() {
            Ok(method) => self.register_sale_with(amount, method),
            Err(_) => {
                if self.is_open() {
                    Registration::UnknownMethod
                } else {
                    Registration::SessionClosed
                }
            }
        }
    }

    /// Typed variant of [`CashBox::register_sale`].
    pub fn register_sale_with(&mut self, amount: Money, method: PaymentMethod) -> Registration {
        let Some(session) = self.session.as_mut() else {
            return Registration::SessionClosed;
        };
        *session.accumulator_mut(method) += amount;
        session.sale_count += 1;
        Registration::Recorded
    }

    /// Records cash physically taken out of the drawer.
    ///
    /// When closed this is a no-op for any amount. Otherwise negative amounts
    /// fail with `InvalidAmount`.
    pub fn register_withdrawal(&mut self, amount: Money) -> CoreResult<Registration> {
        let Some(session) = self.session.as_mut() else {
            return Ok(Registration::SessionClosed);
        };
        if amount.is_negative() {
            return Err(CoreError::InvalidAmount {
                field: "withdrawal_amount".to_string(),
                amount,
            });
        }
        session.withdrawals_from_drawer += amount;
        Ok(Registration::Recorded)
    }

    /// Cash that should be in the drawer right now, if a session is open.
    pub fn expected_cash(&self) -> Option<Money> {
        self.session.as_ref().map(CashBoxSession::expected_cash)
    }

    /// Live totals for the open session.
    pub fn summary(&self) -> Option<CashBoxSummary> {
        self.session.as_ref().map(CashBoxSummary::from)
    }

    /// Closes the session against the counted cash.
    ///
    /// ## Errors
    /// - `SessionNotOpen` when there is nothing to close
    /// - `InvalidAmount` if `actual_cash_counted` is negative
    ///
    /// On success the cash box is closed and the record is returned for the
    /// caller to append to the history.
    pub fn close(
        &mut self,
        actual_cash_counted: Money,
        now: DateTime<FixedOffset>,
    ) -> CoreResult<CashCloseRecord> {
        if self.session.is_none() {
            return Err(CoreError::SessionNotOpen);
        }
        if actual_cash_counted.is_negative() {
            return Err(CoreError::InvalidAmount {
                field: "actual_cash_counted".to_string(),
                amount: actual_cash_counted,
            });
        }
        let session = self.session.take().ok_or(CoreError::SessionNotOpen)?;

        let expected_cash = session.expected_cash();
        let difference = actual_cash_counted - expected_cash;
        Ok(CashCloseRecord {
            total_sales: session.total_sales(),
            session,
            closed_at: now,
            actual_cash_counted,
            expected_cash,
            difference,
            outcome: CloseOutcome::from_difference(difference),
        })
    }
}

/// Returns up to `limit` records, newest first.
///
/// `records` is the append-only history, oldest first.
pub fn newest_first(records: &[CashCloseRecord], limit: usize) -> Vec<CashCloseRecord> {
    records.iter().rev().take(limit).cloned().collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<FixedOffset> {
        FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 14, 12, 0, 0)
            .unwrap()
    }

    fn open_box(amount: i64) -> CashBox {
        let mut cash_box = CashBox::new();
        cash_box
            .open(Money::from_units(amount), "Marta", noon())
            .unwrap();
        cash_box
    }

    #[test]
    fn test_balanced_close() {
        let mut cash_box = open_box(10000);
        assert_eq!(
            cash_box.register_sale(Money::from_units(5000), "cash"),
            Registration::Recorded
        );

        let record = cash_box
            .close(Money::from_units(15000), noon() + Duration::hours(8))
            .unwrap();

        assert_eq!(record.expected_cash, Money::from_units(15000));
        assert_eq!(record.difference, Money::zero());
        assert_eq!(record.outcome, CloseOutcome::Balanced);
        assert!(!cash_box.is_open());
    }

    #[test]
    fn test_shortage_close() {
        let mut cash_box = open_box(10000);
        cash_box.register_sale(Money::from_units(5000), "cash");

        let record = cash_box.close(Money::from_units(14500), noon()).unwrap();

        assert_eq!(record.difference, Money::from_units(-500));
        assert_eq!(record.outcome, CloseOutcome::Shortage);
    }

    #[test]
    fn test_card_and_transfer_do_not_touch_drawer() {
        let mut cash_box = open_box(10000);
        cash_box.register_sale(Money::from_units(3000), "card");
        cash_box.register_sale(Money::from_units(2000), "transferencia");
        cash_box.register_withdrawal(Money::from_units(1000)).unwrap();

        let summary = cash_box.summary().unwrap();
        assert_eq!(summary.card_sales, Money::from_units(3000));
        assert_eq!(summary.transfer_sales, Money::from_units(2000));
        assert_eq!(summary.total_sales, Money::from_units(5000));
        assert_eq!(summary.sale_count, 2);
        assert_eq!(summary.expected_cash, Money::from_units(9000));

        let record = cash_box.close(Money::from_units(9500), noon()).unwrap();
        assert_eq!(record.outcome, CloseOutcome::Surplus);
        assert_eq!(record.total_sales, Money::from_units(5000));
    }

    #[test]
    fn test_expected_cash_not_clamped() {
        let mut cash_box = open_box(0);
        cash_box.register_withdrawal(Money::from_units(700)).unwrap();
        assert_eq!(cash_box.expected_cash(), Some(Money::from_units(-700)));
    }

    #[test]
    fn test_open_while_open_leaves_session_untouched() {
        let mut cash_box = open_box(10000);
        cash_box.register_sale(Money::from_units(2500), "cash");
        let before = cash_box.clone();

        let err = cash_box
            .open(Money::from_units(50000), "Pedro", noon())
            .unwrap_err();

        assert!(matches!(err, CoreError::SessionAlreadyOpen { .. }));
        assert_eq!(cash_box, before);
    }

    #[test]
    fn test_open_rejects_bad_input() {
        let mut cash_box = CashBox::new();
        assert!(matches!(
            cash_box.open(Money::from_units(-1), "Marta", noon()),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            cash_box.open(Money::from_units(1000), "  ", noon()),
            Err(CoreError::Validation(_))
        ));
        assert!(!cash_box.is_open());
    }

    #[test]
    fn test_register_when_closed_is_noop() {
        let mut cash_box = CashBox::new();
        assert_eq!(
            cash_box.register_sale(Money::from_units(1000), "cash"),
            Registration::SessionClosed
        );
        assert_eq!(
            cash_box.register_withdrawal(Money::from_units(1000)).unwrap(),
            Registration::SessionClosed
        );
        assert_eq!(
            cash_box.register_withdrawal(Money::from_units(-10)).unwrap(),
            Registration::SessionClosed
        );
        assert_eq!(cash_box, CashBox::new());
    }

    #[test]
    fn test_unknown_method_ignored() {
        let mut cash_box = open_box(1000);
        let before = cash_box.clone();
        assert_eq!(
            cash_box.register_sale(Money::from_units(500), "cheque"),
            Registration::UnknownMethod
        );
        assert_eq!(cash_box, before);
    }

    #[test]
    fn test_negative_withdrawal_rejected() {
        let mut cash_box = open_box(1000);
        assert!(matches!(
            cash_box.register_withdrawal(Money::from_units(-10)),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert_eq!(cash_box.expected_cash(), Some(Money::from_units(1000)));
    }

    #[test]
    fn test_close_errors() {
        let mut cash_box = CashBox::new();
        assert_eq!(
            cash_box.close(Money::from_units(0), noon()),
            Err(CoreError::SessionNotOpen)
        );

        let mut cash_box = open_box(1000);
        assert!(matches!(
            cash_box.close(Money::from_units(-1), noon()),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(cash_box.is_open());
    }

    #[test]
    fn test_restore_same_day_resumes() {
        let cash_box = open_box(10000);
        let persisted = cash_box.session().cloned();

        let (restored, stale) = CashBox::restore(persisted, noon().date_naive());

        assert!(restored.is_open());
        assert!(stale.is_none());
        assert_eq!(restored, cash_box);
    }

    #[test]
    fn test_restore_yesterday_discards() {
        let cash_box = open_box(10000);
        let persisted = cash_box.session().cloned();
        let tomorrow = (noon() + Duration::days(1)).date_naive();

        let (restored, stale) = CashBox::restore(persisted, tomorrow);

        assert!(!restored.is_open());
        assert_eq!(stale.map(|s| s.opening_amount), Some(Money::from_units(10000)));
    }

    #[test]
    fn test_newest_first() {
        let mut records = Vec::new();
        for amount in [100, 200, 300] {
            let mut cash_box = open_box(amount);
            records.push(cash_box.close(Money::from_units(amount), noon()).unwrap());
        }

        let latest = newest_first(&records, 2);
        let openings: Vec<i64> = latest.iter().map(|r| r.session.opening_amount.units()).collect();
        assert_eq!(openings, vec![300, 200]);
    }

    #[test]
    fn test_close_record_serializes_flat() {
        let mut cash_box = open_box(10000);
        let record = cash_box.close(Money::from_units(10000), noon()).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["openingAmount"], 10000);
        assert_eq!(json["operatorName"], "Marta");
        assert_eq!(json["outcome"], "balanced");

        let back: CashCloseRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
