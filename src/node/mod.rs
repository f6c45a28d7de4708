pub mod client;
pub mod models;

pub use client::{AlgodClient, NodeConfig};

use crate::algorand::Address;
use crate::error::AppResult;
use crate::ledger::models::LedgerRound;
use async_trait::async_trait;
use models::*;

/// Node operations the watcher consumes
///
/// Transport failures surface as `AppError::NodeUnavailable` and are never
/// retried here; the caller decides.
#[async_trait]
pub trait NodeApi: Send + Sync {
    async fn status(&self) -> AppResult<NodeStatus>;

    /// Long-poll until a round after `round` exists.
    async fn status_after_block(&self, round: LedgerRound) -> AppResult<NodeStatus>;

    async fn pending_transactions_by_address(
        &self,
        address: &Address,
    ) -> AppResult<PendingTransactionsResponse>;

    async fn pending_transaction_info(&self, tx_id: &str) -> AppResult<PendingTransactionInfo>;

    async fn suggested_params(&self) -> AppResult<SuggestedParams>;

    /// Submit signed msgpack bytes; returns the node-assigned transaction id.
    async fn send_raw_transaction(&self, signed: &[u8]) -> AppResult<String>;
}
