//! # Cash Box State
//!
//! The in-memory [`CashBox`] plus its persistence.
//!
//! ## Transition Pattern
//! ```text
//! lock ─► clone ─► unlock
//!                    │
//!                    ▼
//!            apply transition to the copy  ── CoreError ──► nothing changed
//!                    │
//!                    ▼
//!            persist the copy (.await)     ── DbError ───► nothing changed
//!                    │
//!                    ▼
//! lock ─► replace ─► unlock
//! ```
//!
//! Commands arrive one at a time from the host's event loop; two concurrent
//! transitions would race on the final replace.
//!
//! Registering a committed sale is the exception: the backend already has the
//! sale, so the in-memory totals are updated even if the write fails.

use std::sync::{Mutex, MutexGuard};

use caja_core::cashbox::newest_first;
use caja_core::{
    CashBox, CashBoxSession, CashBoxSummary, CashCloseRecord, Money, PaymentMethod, Registration,
};
use caja_db::{CashBoxRepository, DbError};
use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::{error, info, warn};

use crate::error::ApiError;

#[derive(Debug)]
pub struct CashBoxState {
    cash_box: Mutex<CashBox>,
    repo: CashBoxRepository,
}

impl CashBoxState {
    /// A closed cash box. Call [`CashBoxState::load_on_startup`] before use.
    pub fn new(repo: CashBoxRepository) -> Self {
        CashBoxState {
            cash_box: Mutex::new(CashBox::new()),
            repo,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CashBox> {
        self.cash_box.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn current(&self) -> CashBox {
        self.lock().clone()
    }

    fn commit(&self, staged: CashBox) {
        *self.lock() = staged;
    }

    /// Restores today's session from the store.
    ///
    /// ## When This Occurs
    /// - The session was opened on an earlier day: discarded (not closed into
    ///   the history) and removed from the store
    /// - The stored session is unreadable: logged, removed, start closed
    ///
    /// Returns whether a session was restored.
    pub async fn load_on_startup(&self, today: NaiveDate) -> Result<bool, ApiError> {
        let persisted = match self.repo.load_session().await {
            Ok(persisted) => persisted,
            Err(DbError::Corrupted { key, reason }) => {
                warn!(key = %key, reason = %reason, "Stored cash box session is unreadable, starting closed");
                self.repo.save_session(None).await?;
                None
            }
            Err(err) => return Err(err.into()),
        };

        let (cash_box, stale) = CashBox::restore(persisted, today);
        if let Some(stale) = stale {
            warn!(
                session_id = %stale.id,
                operator = %stale.operator_name,
                opened_at = %stale.opened_at,
                expected_cash = %stale.expected_cash(),
                "Discarding cash box session from a previous day"
            );
            self.repo.save_session(None).await?;
        }

        let restored = cash_box.is_open();
        if let Some(session) = cash_box.session() {
            info!(session_id = %session.id, operator = %session.operator_name, "Cash box session restored");
        }
        self.commit(cash_box);
        Ok(restored)
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open()
    }

    pub fn session(&self) -> Option<CashBoxSession> {
        self.lock().session().cloned()
    }

    pub fn summary(&self) -> Option<CashBoxSummary> {
        self.lock().summary()
    }

    pub fn expected_cash(&self) -> Option<Money> {
        self.lock().expected_cash()
    }

    pub async fn open(
        &self,
        opening_amount: Money,
        operator_name: &str,
        now: DateTime<FixedOffset>,
    ) -> Result<CashBoxSession, ApiError> {
        let mut staged = self.current();
        let session = staged.open(opening_amount, operator_name, now)?.clone();

        self.repo.save_session(Some(&session)).await?;
        self.commit(staged);

        info!(
            session_id = %session.id,
            operator = %session.operator_name,
            opening_amount = %session.opening_amount,
            "Cash box opened"
        );
        Ok(session)
    }

    /// Adds a committed sale to the open session. No-op when closed.
    pub async fn register_sale(&self, amount: Money, method: PaymentMethod) -> Registration {
        let mut staged = self.current();
        let outcome = staged.register_sale_with(amount, method);

        if outcome.changed_state() {
            if let Err(err) = self.repo.save_session(staged.session()).await {
                error!(error = %err, amount = %amount, "Failed to persist cash box after sale");
            }
            self.commit(staged);
        }
        outcome
    }

    /// Records cash taken out of the drawer. No-op when closed.
    pub async fn withdraw_cash(&self, amount: Money) -> Result<Registration, ApiError> {
        let mut staged = self.current();
        let outcome = staged.register_withdrawal(amount)?;

        if outcome.changed_state() {
            self.repo.save_session(staged.session()).await?;
            self.commit(staged);
            info!(amount = %amount, "Cash withdrawn from drawer");
        }
        Ok(outcome)
    }

    /// Closes the session, appends the record to the history and clears the
    /// stored session in one write.
    pub async fn close(
        &self,
        actual_cash_counted: Money,
        now: DateTime<FixedOffset>,
    ) -> Result<CashCloseRecord, ApiError> {
        let mut staged = self.current();
        let record = staged.close(actual_cash_counted, now)?;

        self.repo.record_close(&record).await?;
        self.commit(staged);

        info!(
            session_id = %record.session.id,
            expected = %record.expected_cash,
            counted = %record.actual_cash_counted,
            difference = %record.difference,
            outcome = ?record.outcome,
            "Cash box closed"
        );
        Ok(record)
    }

    /// Up to `limit` close records, newest first.
    pub async fn history(&self, limit: usize) -> Result<Vec<CashCloseRecord>, ApiError> {
        let history = self.repo.load_history().await?;
        Ok(newest_first(&history, limit))
    }
}
