use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use std::fmt;

/// Block height on the watched ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerRound(u64);

impl LedgerRound {
    pub const fn new(round: u64) -> Self {
        Self(round)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for LedgerRound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction seen in the pending pool, mapped but not yet confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftTransaction {
    pub tx_id: String,
    pub amount: u64,
    /// Round the watch loop had advanced to when the draft was mapped.
    pub observed_round: LedgerRound,
}

impl DraftTransaction {
    pub fn confirm(&self, block: LedgerRound) -> TransactionRecord {
        TransactionRecord {
            tx_id: self.tx_id.clone(),
            amount: self.amount,
            block,
        }
    }
}

/// Confirmed transaction, append-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub tx_id: String,
    pub amount: u64,
    pub block: LedgerRound,
}

/// Row as stored in `transactions`
#[derive(Debug, Clone, FromRow)]
pub struct TransactionRow {
    pub tx_id: String,
    pub amount: i64,
    pub block: i64,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionRow> for TransactionRecord {
    fn from(row: TransactionRow) -> Self {
        Self {
            tx_id: row.tx_id,
            amount: row.amount.max(0) as u64,
            block: LedgerRound::new(row.block.max(0) as u64),
        }
    }
}
