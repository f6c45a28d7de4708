//! Scripted node and in-memory store used by unit tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use parking_lot::Mutex;

use crate::{
    algorand::{mnemonic::mnemonic_from_seed, Address},
    error::{AppError, AppResult},
    ledger::{models::*, TransactionStore},
    node::{models::*, NodeApi},
};

pub const GENESIS_ID: &str = "test-v1";
pub const GENESIS_HASH: [u8; 32] = [9u8; 32];
pub const SETTLEMENT_TX_ID: &str = "SETTLEMENTTXID";

pub fn monitored_mnemonic() -> String {
    mnemonic_from_seed(&[21u8; 32])
}

pub fn destination_mnemonic() -> String {
    mnemonic_from_seed(&[22u8; 32])
}

/// Pending pool entry paying `amount` between two fixed accounts.
pub fn pending_payment(amount: u64, note: Option<&[u8]>) -> PendingTransaction {
    PendingTransaction {
        sig: Some(BASE64.encode([0u8; 64])),
        txn: RawTransaction {
            amt: amount,
            fee: 10,
            fv: 95,
            lv: 105,
            gen: GENESIS_ID.to_string(),
            gh: BASE64.encode(GENESIS_HASH),
            note: note.map(|n| BASE64.encode(n)),
            rcv: Some(Address::new([2u8; 32]).to_string()),
            snd: Address::new([1u8; 32]).to_string(),
            tx_type: "pay".to_string(),
        },
    }
}

pub fn batch(transactions: Vec<PendingTransaction>) -> PendingTransactionsResponse {
    PendingTransactionsResponse {
        total_transactions: transactions.len() as u64,
        top_transactions: transactions,
    }
}

pub fn confirmed_at(round: u64) -> PendingTransactionInfo {
    PendingTransactionInfo {
        confirmed_round: Some(LedgerRound::new(round)),
        pool_error: String::new(),
    }
}

/// Mock node. Rounds advance only through `status_after_block`.
#[derive(Default)]
pub struct MockNode {
    last_round: Mutex<u64>,
    pending_batches: Mutex<VecDeque<PendingTransactionsResponse>>,
    info_responses: Mutex<HashMap<String, VecDeque<PendingTransactionInfo>>>,
    unknown_tx_ids: Mutex<Vec<String>>,
    reject_submissions: Mutex<bool>,
    stalled_waits: Mutex<usize>,
    pub info_calls: Mutex<Vec<String>>,
    pub wait_calls: Mutex<Vec<LedgerRound>>,
    pub submitted: Mutex<Vec<Vec<u8>>>,
    pub pending_calls: Mutex<usize>,
}

impl MockNode {
    pub fn new(last_round: u64) -> Self {
        Self {
            last_round: Mutex::new(last_round),
            ..Self::default()
        }
    }

    /// Queue a pending-pool answer. Once the queue is drained the node fails
    /// with `NodeUnavailable`, which ends a running watch loop.
    pub fn push_pending(&self, response: PendingTransactionsResponse) {
        self.pending_batches.lock().push_back(response);
    }

    /// Script pending-info answers for `tx_id`; the last one repeats.
    pub fn script_info(&self, tx_id: &str, responses: Vec<PendingTransactionInfo>) {
        self.info_responses
            .lock()
            .insert(tx_id.to_string(), responses.into());
    }

    /// Make pending-info for `tx_id` answer 404.
    pub fn forget(&self, tx_id: &str) {
        self.unknown_tx_ids.lock().push(tx_id.to_string());
    }

    /// The next `count` long-polls time out on the node side and report the
    /// unchanged round.
    pub fn stall_waits(&self, count: usize) {
        *self.stalled_waits.lock() = count;
    }

    pub fn reject_submissions(&self) {
        *self.reject_submissions.lock() = true;
    }

    pub fn info_calls_for(&self, tx_id: &str) -> usize {
        self.info_calls.lock().iter().filter(|id| *id == tx_id).count()
    }
}

#[async_trait]
impl NodeApi for MockNode {
    async fn status(&self) -> AppResult<NodeStatus> {
        Ok(NodeStatus {
            last_round: LedgerRound::new(*self.last_round.lock()),
        })
    }

    async fn status_after_block(&self, round: LedgerRound) -> AppResult<NodeStatus> {
        self.wait_calls.lock().push(round);
        let mut last = self.last_round.lock();

        let mut stalled = self.stalled_waits.lock();
        if *stalled > 0 {
            *stalled -= 1;
            return Ok(NodeStatus {
                last_round: LedgerRound::new(*last),
            });
        }

        *last = (*last).max(round.value() + 1);
        Ok(NodeStatus {
            last_round: LedgerRound::new(*last),
        })
    }

    async fn pending_transactions_by_address(
        &self,
        _address: &Address,
    ) -> AppResult<PendingTransactionsResponse> {
        *self.pending_calls.lock() += 1;
        self.pending_batches
            .lock()
            .pop_front()
            .ok_or_else(|| AppError::NodeUnavailable("connection refused".to_string()))
    }

    async fn pending_transaction_info(&self, tx_id: &str) -> AppResult<PendingTransactionInfo> {
        self.info_calls.lock().push(tx_id.to_string());

        if self.unknown_tx_ids.lock().iter().any(|id| id == tx_id) {
            return Err(AppError::NotFound(format!("{} not found", tx_id)));
        }

        let mut responses = self.info_responses.lock();
        let info = match responses.get_mut(tx_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => PendingTransactionInfo::default(),
        };
        Ok(info)
    }

    async fn suggested_params(&self) -> AppResult<SuggestedParams> {
        Ok(SuggestedParams {
            last_round: LedgerRound::new(*self.last_round.lock()),
            genesis_id: GENESIS_ID.to_string(),
            genesis_hash: BASE64.encode(GENESIS_HASH),
            fee: 0,
            min_fee: 1000,
        })
    }

    async fn send_raw_transaction(&self, signed: &[u8]) -> AppResult<String> {
        if *self.reject_submissions.lock() {
            return Err(AppError::NodeRejected {
                status: 400,
                message: "account already closed".to_string(),
            });
        }
        self.submitted.lock().push(signed.to_vec());
        Ok(SETTLEMENT_TX_ID.to_string())
    }
}

/// In-memory store; the map lock plays the role of the unique index.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, TransactionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn get(&self, tx_id: &str) -> Option<TransactionRecord> {
        self.records.lock().get(tx_id).cloned()
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn find_by_tx_id(&self, tx_id: &str) -> AppResult<Option<TransactionRecord>> {
        Ok(self.get(tx_id))
    }

    async fn save(&self, record: &TransactionRecord) -> AppResult<TransactionRecord> {
        let mut records = self.records.lock();
        if records.contains_key(&record.tx_id) {
            return Err(AppError::DuplicateKey(record.tx_id.clone()));
        }
        records.insert(record.tx_id.clone(), record.clone());
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tx_id: &str, amount: u64, block: u64) -> TransactionRecord {
        TransactionRecord {
            tx_id: tx_id.to_string(),
            amount,
            block: LedgerRound::new(block),
        }
    }

    #[tokio::test]
    async fn test_memory_store_save_then_find() {
        let store = MemoryStore::new();
        store.save(&record("A", 50, 101)).await.unwrap();

        let found = store.find_by_tx_id("A").await.unwrap().unwrap();
        assert_eq!(found.amount, 50);
        assert_eq!(found.block, LedgerRound::new(101));
        assert!(store.find_by_tx_id("B").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicates() {
        let store = MemoryStore::new();
        store.save(&record("A", 50, 101)).await.unwrap();

        let err = store.save(&record("A", 99, 150)).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateKey(ref id) if id == "A"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("A").unwrap().amount, 50);
    }
}
