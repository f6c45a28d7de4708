// Protocol primitives: addresses, mnemonics, canonical transactions
pub mod account;
pub mod address;
pub mod mnemonic;
pub mod transaction;

pub use account::Account;
pub use address::Address;
pub use transaction::{decode_genesis_hash, SignedTransaction, Transaction, TransactionParams};

use sha2::{Digest, Sha512_256};

pub(crate) fn sha512_256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha512_256::digest(data));
    out
}
