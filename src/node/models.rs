use serde::{Deserialize, Serialize};

use crate::ledger::models::LedgerRound;

/// `GET /v2/status` and `GET /v2/status/wait-for-block-after/{round}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeStatus {
    #[serde(rename = "last-round")]
    pub last_round: LedgerRound,
}

/// `GET /v2/accounts/{address}/transactions/pending`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingTransactionsResponse {
    #[serde(rename = "top-transactions", default)]
    pub top_transactions: Vec<PendingTransaction>,
    #[serde(rename = "total-transactions", default)]
    pub total_transactions: u64,
}

/// Signed transaction as it sits in the node's pending pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sig: Option<String>,
    pub txn: RawTransaction,
}

/// Transaction body in the node's JSON rendering. Zero values are omitted by
/// the node, hence the defaults. Byte fields are base64.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub amt: u64,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub fv: u64,
    #[serde(default)]
    pub lv: u64,
    #[serde(default)]
    pub gen: String,
    pub gh: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rcv: Option<String>,
    pub snd: String,
    #[serde(rename = "type", default)]
    pub tx_type: String,
}

/// `GET /v2/transactions/pending/{txid}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransactionInfo {
    #[serde(rename = "confirmed-round", default, skip_serializing_if = "Option::is_none")]
    pub confirmed_round: Option<LedgerRound>,
    #[serde(rename = "pool-error", default)]
    pub pool_error: String,
}

impl PendingTransactionInfo {
    /// Confirmed round, if the transaction made it into a block.
    pub fn confirmed(&self) -> Option<LedgerRound> {
        self.confirmed_round.filter(|round| round.value() > 0)
    }
}

/// `GET /v2/transactions/params`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedParams {
    #[serde(rename = "last-round")]
    pub last_round: LedgerRound,
    #[serde(rename = "genesis-id")]
    pub genesis_id: String,
    #[serde(rename = "genesis-hash")]
    pub genesis_hash: String,
    #[serde(default)]
    pub fee: u64,
    #[serde(rename = "min-fee", default)]
    pub min_fee: u64,
}

/// `POST /v2/transactions`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}
