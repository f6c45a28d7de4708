// Settlement Builder - sweeps the monitored account into the destination
//
// The payment carries amount 0 and close-remainder-to = destination, so the
// node moves the whole remaining balance and closes the source account.

use tracing::debug;

use crate::{
    algorand::{decode_genesis_hash, Account, SignedTransaction, Transaction, TransactionParams},
    error::AppResult,
    node::models::SuggestedParams,
};

/// Flat fee paid by every settlement, in microunits.
pub const SETTLEMENT_FEE: u64 = 1000;

/// Rounds the settlement stays valid for after the suggested first round.
pub const VALIDITY_WINDOW: u64 = 1000;

/// Diagnostic tag carried in the note field.
pub const SETTLEMENT_TAG: &str = "SG test";

pub struct SettlementBuilder {
    source: Account,
    destination: Account,
}

impl SettlementBuilder {
    pub fn new(source: Account, destination: Account) -> Self {
        Self { source, destination }
    }

    /// Derive both keypairs from their 25-word mnemonics.
    pub fn from_mnemonics(source_mnemonic: &str, destination_mnemonic: &str) -> AppResult<Self> {
        Ok(Self::new(
            Account::from_mnemonic(source_mnemonic)?,
            Account::from_mnemonic(destination_mnemonic)?,
        ))
    }

    pub fn source(&self) -> &Account {
        &self.source
    }

    pub fn destination(&self) -> &Account {
        &self.destination
    }

    /// Build and sign the close-out payment. No side effects.
    pub fn build(&self, params: &SuggestedParams) -> AppResult<SignedTransaction> {
        let first_valid = params.last_round.value();
        let txn_params = TransactionParams {
            fee: SETTLEMENT_FEE,
            first_valid,
            last_valid: first_valid + VALIDITY_WINDOW,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: decode_genesis_hash(&params.genesis_hash)?,
        };

        let destination = self.destination.address();
        let txn = Transaction::payment(
            self.source.address(),
            Some(destination),
            0,
            Some(destination),
            rmp_serde::to_vec(&SETTLEMENT_TAG)?,
            &txn_params,
        );

        let signed = txn.sign(&self.source)?;
        debug!(
            "Built settlement {} ({} -> {}, {} bytes)",
            signed.tx_id,
            self.source.address(),
            destination,
            signed.bytes.len()
        );

        Ok(signed)
    }
}
