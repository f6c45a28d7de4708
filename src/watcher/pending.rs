use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::{
    algorand::{decode_genesis_hash, Address, Transaction, TransactionParams},
    error::AppResult,
    ledger::models::{DraftTransaction, LedgerRound},
    node::models::{PendingTransactionsResponse, RawTransaction},
};

/// Map a pending batch to drafts, one per entry, in input order.
///
/// The draft id is recomputed from the canonical encoding of the entry so it
/// is stable across runs; it is the key the store deduplicates on.
pub fn map_pending(
    batch: &PendingTransactionsResponse,
    observed_round: LedgerRound,
) -> AppResult<Vec<DraftTransaction>> {
    batch
        .top_transactions
        .iter()
        .map(|pending| {
            let txn = canonical_transaction(&pending.txn)?;
            Ok(DraftTransaction {
                tx_id: txn.id()?,
                amount: pending.txn.amt,
                observed_round,
            })
        })
        .collect()
}

fn canonical_transaction(raw: &RawTransaction) -> AppResult<Transaction> {
    let sender: Address = raw.snd.parse()?;
    let receiver = raw.rcv.as_deref().map(str::parse::<Address>).transpose()?;

    let note = match &raw.note {
        Some(encoded) => BASE64.decode(encoded)?,
        None => Vec::new(),
    };

    let params = TransactionParams {
        fee: raw.fee,
        first_valid: raw.fv,
        last_valid: raw.lv,
        genesis_id: raw.gen.clone(),
        genesis_hash: decode_genesis_hash(&raw.gh)?,
    };

    Ok(Transaction::payment(sender, receiver, raw.amt, None, note, &params))
}
