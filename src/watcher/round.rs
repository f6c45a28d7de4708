use std::sync::Arc;

use tracing::debug;

use crate::{error::AppResult, ledger::models::LedgerRound, node::NodeApi};

/// Tracks the last observed round and blocks on the node for new ones.
pub struct RoundTracker {
    node: Arc<dyn NodeApi>,
}

impl RoundTracker {
    pub fn new(node: Arc<dyn NodeApi>) -> Self {
        Self { node }
    }

    pub async fn current_round(&self) -> AppResult<LedgerRound> {
        Ok(self.node.status().await?.last_round)
    }

    /// Blocks until the node reports a round after `round` and returns it.
    ///
    /// The node's long-poll gives up after a while and answers with the round
    /// it is still on; the poll is re-issued until the round actually moves.
    pub async fn await_next_round(&self, round: LedgerRound) -> AppResult<LedgerRound> {
        let mut status = self.node.status_after_block(round).await?;
        while status.last_round <= round {
            debug!("Node still at round {}, waiting again", status.last_round);
            status = self.node.status_after_block(round).await?;
        }

        debug!("Round {} reached (waited after {})", status.last_round, round);
        Ok(status.last_round)
    }
}
