//! # Cash Box Repository
//!
//! Typed access to the two cash box keys on top of any [`KeyValueStore`].
//!
//! ## Close Flow
//! ```text
//! CashBox::close(counted) ──► CashCloseRecord
//!                                   │
//!                                   ▼
//!                 CashBoxRepository::record_close(record)
//!                   ├── history ← history + [record]
//!                   └── session ← null
//!                   (one set_many call, one SQLite transaction)
//! ```
//!
//! An unreadable history never blocks a close: the old blob moves to
//! [`HISTORY_BACKUP_KEY`] and a fresh history starts with this record.

use std::sync::Arc;

use caja_core::{CashBoxSession, CashCloseRecord};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::kv::KeyValueStore;

/// Key holding the open session, or nothing when closed.
pub const SESSION_KEY: &str = "cash_box.session";

/// Key holding the append-only array of close records, oldest first.
pub const HISTORY_KEY: &str = "cash_box.history";

/// Last history blob that failed to parse, kept for manual recovery.
pub const HISTORY_BACKUP_KEY: &str = "cash_box.history.corrupt";

/// Repository for the persisted cash box state.
#[derive(Clone)]
pub struct CashBoxRepository {
    store: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CashBoxRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CashBoxRepository").finish_non_exhaustive()
    }
}

impl CashBoxRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        CashBoxRepository { store }
    }

    /// Loads the persisted session, whatever day it was opened.
    pub async fn load_session(&self) -> DbResult<Option<CashBoxSession>> {
        match self.store.get(SESSION_KEY).await? {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DbError::corrupted(SESSION_KEY, e)),
        }
    }

    /// Saves the session, or clears it with `None`.
    pub async fn save_session(&self, session: Option<&CashBoxSession>) -> DbResult<()> {
        let value = match session {
            Some(s) => serde_json::to_value(s)?,
            None => Value::Null,
        };
        debug!(open = session.is_some(), "Saving cash box session");
        self.store.set(SESSION_KEY, &value).await
    }

    /// All close records, oldest first.
    pub async fn load_history(&self) -> DbResult<Vec<CashCloseRecord>> {
        match self.store.get(HISTORY_KEY).await? {
            None => Ok(Vec::new()),
            Some(value) => {
                serde_json::from_value(value).map_err(|e| DbError::corrupted(HISTORY_KEY, e))
            }
        }
    }

    /// Appends `record` to the history and clears the session in one write.
    ///
    /// A corrupted history is moved to [`HISTORY_BACKUP_KEY`] in the same write
    /// and replaced by a history holding only `record`.
    pub async fn record_close(&self, record: &CashCloseRecord) -> DbResult<()> {
        let mut backup = None;
        let mut history: Vec<CashCloseRecord> = match self.store.get(HISTORY_KEY).await? {
            None => Vec::new(),
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(history) => history,
                Err(err) => {
                    warn!(
                        key = HISTORY_KEY,
                        backup_key = HISTORY_BACKUP_KEY,
                        error = %err,
                        "Cash box history unreadable, starting a new one"
                    );
                    backup = Some(value);
                    Vec::new()
                }
            },
        };
        history.push(record.clone());

        let mut entries = vec![
            (HISTORY_KEY, serde_json::to_value(&history)?),
            (SESSION_KEY, Value::Null),
        ];
        if let Some(old) = backup {
            entries.push((HISTORY_BACKUP_KEY, old));
        }

        debug!(
            session_id = %record.session.id,
            difference = %record.difference,
            "Recording cash box close"
        );
        self.store.set_many(&entries).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
