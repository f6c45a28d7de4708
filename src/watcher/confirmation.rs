use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    error::{AppError, AppResult},
    ledger::models::LedgerRound,
    node::NodeApi,
};

use super::round::RoundTracker;

/// Retry budget for the settlement transaction.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

pub const RETRY_BUDGET_EXHAUSTED: &str = "retry-budget-exhausted";

/// Terminal state of a confirmation wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationResult {
    Confirmed(LedgerRound),
    Expired(String),
}

/// Polls pending-transaction info until confirmed or out of attempts
pub struct ConfirmationWaiter {
    node: Arc<dyn NodeApi>,
    rounds: RoundTracker,
}

impl ConfirmationWaiter {
    pub fn new(node: Arc<dyn NodeApi>) -> Self {
        Self {
            rounds: RoundTracker::new(node.clone()),
            node,
        }
    }

    /// Makes at most `max_attempts` queries. Between unconfirmed attempts it
    /// blocks for one round; after the last one it returns `Expired` without
    /// waiting. A node "not found" answer counts as unconfirmed.
    pub async fn await_confirmation(
        &self,
        tx_id: &str,
        max_attempts: u32,
    ) -> AppResult<ConfirmationResult> {
        let mut round = if max_attempts > 1 {
            self.rounds.current_round().await?
        } else {
            LedgerRound::default()
        };

        for attempt in 1..=max_attempts {
            match self.node.pending_transaction_info(tx_id).await {
                Ok(info) => {
                    if let Some(confirmed) = info.confirmed() {
                        info!("Transaction {} confirmed in round {}", tx_id, confirmed);
                        return Ok(ConfirmationResult::Confirmed(confirmed));
                    }
                    if !info.pool_error.is_empty() {
                        debug!("Transaction {} pool error: {}", tx_id, info.pool_error);
                    }
                }
                Err(AppError::NotFound(message)) => {
                    debug!("Transaction {} not known to node: {}", tx_id, message);
                }
                Err(e) => return Err(e),
            }

            if attempt < max_attempts {
                round = round.next();
                self.rounds.await_next_round(round).await?;
            }
        }

        Ok(ConfirmationResult::Expired(RETRY_BUDGET_EXHAUSTED.to_string()))
    }
}
