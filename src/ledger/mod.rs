//! Append-only ledger of monitored rate observations.
//!
//! The full sequence lives in memory and is rewritten to a JSON file on
//! every append, atomically, before the call returns. Records are never
//! mutated or dropped; day queries filter by the market-local calendar
//! date of each record.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::persist;
use crate::time;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("ledger write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Market-local "HH:MM" label, precomputed at append time.
    pub time_label: String,
    pub value: f64,
    pub timestamp_ms: u64,
}

pub struct RateLedger {
    path: PathBuf,
    records: Vec<LedgerRecord>,
}

impl RateLedger {
    /// Loads the ledger file; an absent or unparsable file starts an
    /// empty ledger rather than failing startup.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = match persist::read_json::<Vec<LedgerRecord>>(&path) {
            Ok(Some(records)) => records,
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "corrupt ledger file; starting empty");
                Vec::new()
            }
        };

        info!(count = records.len(), path = %path.display(), "rate ledger loaded");

        Self { path, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends one observation and flushes the whole sequence to disk
    /// before returning.
    ///
    /// On a write failure the in-memory record is kept — the running
    /// process stays authoritative and only durability for this append
    /// is lost.
    pub fn append(&mut self, value: f64, observed_at_ms: u64) -> Result<(), LedgerError> {
        self.records.push(LedgerRecord {
            time_label: time::time_label(observed_at_ms),
            value,
            timestamp_ms: observed_at_ms,
        });

        persist::write_json_atomic(&self.path, &self.records)?;
        Ok(())
    }

    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    /// Records whose market-local calendar date matches `day`.
    pub fn records_for_day(&self, day: NaiveDate) -> Vec<LedgerRecord> {
        self.records
            .iter()
            .filter(|r| time::market_day(r.timestamp_ms) == day)
            .cloned()
            .collect()
    }
}
