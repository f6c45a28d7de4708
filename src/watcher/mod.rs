// Watch loop: observe pending set -> confirm -> persist -> settle
pub mod confirmation;
pub mod pending;
pub mod round;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::{
    algorand::Address,
    error::{AppError, AppResult},
    ledger::{
        models::{DraftTransaction, LedgerRound, TransactionRecord},
        TransactionStore,
    },
    node::NodeApi,
    settlement::SettlementBuilder,
};

use confirmation::{ConfirmationResult, ConfirmationWaiter, DEFAULT_MAX_ATTEMPTS};
use round::RoundTracker;

/// Pending-pool transactions get one look per cycle; anything unconfirmed is
/// picked up again by the next poll if it is still pending.
pub const PENDING_CONFIRMATION_ATTEMPTS: u32 = 1;

/// The settlement must confirm or expire before the next poll starts.
pub const SETTLEMENT_CONFIRMATION_ATTEMPTS: u32 = DEFAULT_MAX_ATTEMPTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Polling,
    Processing,
    Settling,
    Halted,
}

impl fmt::Display for WatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WatchState::Idle => "idle",
            WatchState::Polling => "polling",
            WatchState::Processing => "processing",
            WatchState::Settling => "settling",
            WatchState::Halted => "halted",
        };
        write!(f, "{}", name)
    }
}

/// Settlement submitted during a cycle and how its wait ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub tx_id: String,
    pub result: ConfirmationResult,
}

/// What a single cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub observed: u64,
    pub saved: usize,
    pub settlement: Option<SettlementOutcome>,
}

/// Single-account watcher. Runs strictly sequentially: one outstanding node
/// query at a time, and a cycle's settlement finishes before the next poll.
pub struct WatchLoop {
    node: Arc<dyn NodeApi>,
    store: Arc<dyn TransactionStore>,
    rounds: RoundTracker,
    confirmations: ConfirmationWaiter,
    settlement: SettlementBuilder,
    monitored: Address,
    tracked_round: LedgerRound,
    state: WatchState,
}

impl WatchLoop {
    pub fn new(
        node: Arc<dyn NodeApi>,
        store: Arc<dyn TransactionStore>,
        settlement: SettlementBuilder,
    ) -> Self {
        Self {
            rounds: RoundTracker::new(node.clone()),
            confirmations: ConfirmationWaiter::new(node.clone()),
            monitored: settlement.source().address(),
            node,
            store,
            settlement,
            tracked_round: LedgerRound::default(),
            state: WatchState::Idle,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn tracked_round(&self) -> LedgerRound {
        self.tracked_round
    }

    fn transition(&mut self, next: WatchState) {
        debug!("Watch loop {} -> {}", self.state, next);
        self.state = next;
    }

    /// Run until a fatal error and return it.
    pub async fn start(&mut self) -> AppError {
        info!("👀 Watching account {}", self.monitored);

        match self.rounds.current_round().await {
            Ok(round) => self.tracked_round = round,
            Err(e) => return self.halt(e),
        }

        loop {
            match self.run_cycle().await {
                Ok(report) => debug!(
                    "Cycle done: {} observed, {} saved, settlement {:?}",
                    report.observed, report.saved, report.settlement
                ),
                Err(e) if e.is_recoverable() => {
                    warn!("⚠️ Cycle aborted, continuing: {}", e);
                }
                Err(e) => return self.halt(e),
            }
        }
    }

    fn halt(&mut self, error: AppError) -> AppError {
        error!("❌ Watch loop halted: {}", error);
        self.transition(WatchState::Halted);
        error
    }

    /// One poll cycle.
    ///
    /// The tracked round is advanced by one without re-reading the node, so
    /// it can lag the node's round when processing is slow.
    #[instrument(skip(self), fields(round = %self.tracked_round))]
    pub async fn run_cycle(&mut self) -> AppResult<CycleReport> {
        self.transition(WatchState::Polling);

        let observed_round = self.tracked_round;
        let batch = self
            .node
            .pending_transactions_by_address(&self.monitored)
            .await?;
        info!(
            "{} pending transactions after block: {}",
            batch.total_transactions, observed_round
        );

        self.tracked_round = observed_round.next();
        let drafts = pending::map_pending(&batch, self.tracked_round);

        // back-pressure: one block per cycle, even if mapping failed
        self.rounds.await_next_round(self.tracked_round).await?;
        let drafts = drafts?;

        let mut report = CycleReport {
            observed: batch.total_transactions,
            ..CycleReport::default()
        };

        if batch.total_transactions == 0 && batch.top_transactions.is_empty() {
            return Ok(report);
        }

        self.transition(WatchState::Processing);
        report.saved = self.save_confirmed(&drafts).await?;

        self.transition(WatchState::Settling);
        report.settlement = Some(self.settle().await?);

        self.transition(WatchState::Polling);
        Ok(report)
    }

    async fn save_confirmed(&self, drafts: &[DraftTransaction]) -> AppResult<usize> {
        let mut saved = 0;

        for draft in drafts {
            let result = self
                .confirmations
                .await_confirmation(&draft.tx_id, PENDING_CONFIRMATION_ATTEMPTS)
                .await?;

            match result {
                ConfirmationResult::Confirmed(block) => {
                    if self.record(draft.confirm(block)).await? {
                        saved += 1;
                    }
                }
                ConfirmationResult::Expired(reason) => {
                    info!("Transaction {} not confirmed this cycle ({})", draft.tx_id, reason);
                }
            }
        }

        Ok(saved)
    }

    /// Returns whether a new row was written.
    async fn record(&self, record: TransactionRecord) -> AppResult<bool> {
        // The read only avoids noisy duplicate errors; the unique index decides.
        if self.store.find_by_tx_id(&record.tx_id).await?.is_some() {
            debug!("Transaction {} already recorded", record.tx_id);
            return Ok(false);
        }

        match self.store.save(&record).await {
            Ok(_) => Ok(true),
            Err(AppError::DuplicateKey(tx_id)) => {
                debug!("Transaction {} recorded concurrently", tx_id);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn settle(&self) -> AppResult<SettlementOutcome> {
        let params = self.node.suggested_params().await?;
        let signed = self.settlement.build(&params)?;
        info!(
            "Submitting settlement {} (valid rounds {}..={})",
            signed.tx_id, signed.transaction.first_valid, signed.transaction.last_valid
        );

        let tx_id = self.node.send_raw_transaction(&signed.bytes).await?;
        if tx_id != signed.tx_id {
            warn!("Node reported settlement id {} (built {})", tx_id, signed.tx_id);
        }

        let result = self
            .confirmations
            .await_confirmation(&tx_id, SETTLEMENT_CONFIRMATION_ATTEMPTS)
            .await?;

        match &result {
            ConfirmationResult::Confirmed(round) => {
                info!("✅ Account closed: {} (round {})", self.monitored, round);
            }
            ConfirmationResult::Expired(reason) => {
                warn!("Settlement {} not confirmed: {}", tx_id, reason);
            }
        }

        Ok(SettlementOutcome { tx_id, result })
    }
}
