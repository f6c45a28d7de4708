//! Canonical payment transactions.
//!
//! Canonical form is msgpack with map keys in lexicographic order and every
//! zero / empty field omitted. The transaction id is
//! `base32(sha512_256("TX" || canonical_bytes))` without padding.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use data_encoding::BASE32_NOPAD;
use serde::{Serialize, Serializer};

use crate::error::{AppError, AppResult};

use super::{account::Account, address::Address, sha512_256};

const TX_DOMAIN: &[u8] = b"TX";
const PAYMENT_TYPE: &str = "pay";

/// Payment transaction. Field order is the canonical key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    #[serde(rename = "amt", skip_serializing_if = "is_zero")]
    pub amount: u64,

    #[serde(rename = "close", skip_serializing_if = "Option::is_none")]
    pub close_remainder_to: Option<Address>,

    #[serde(skip_serializing_if = "is_zero")]
    pub fee: u64,

    #[serde(rename = "fv", skip_serializing_if = "is_zero")]
    pub first_valid: u64,

    #[serde(rename = "gen", skip_serializing_if = "String::is_empty")]
    pub genesis_id: String,

    #[serde(rename = "gh", serialize_with = "bytes32")]
    pub genesis_hash: [u8; 32],

    #[serde(rename = "lv", skip_serializing_if = "is_zero")]
    pub last_valid: u64,

    #[serde(with = "serde_bytes", skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<u8>,

    #[serde(rename = "rcv", skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Address>,

    #[serde(rename = "snd")]
    pub sender: Address,

    #[serde(rename = "type")]
    pub tx_type: &'static str,
}

/// Validity window and genesis binding shared by every transaction built here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionParams {
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
}

impl Transaction {
    /// Payment with a flat fee.
    pub fn payment(
        sender: Address,
        receiver: Option<Address>,
        amount: u64,
        close_remainder_to: Option<Address>,
        note: Vec<u8>,
        params: &TransactionParams,
    ) -> Self {
        Self {
            amount,
            close_remainder_to,
            fee: params.fee,
            first_valid: params.first_valid,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash,
            last_valid: params.last_valid,
            note,
            receiver,
            sender,
            tx_type: PAYMENT_TYPE,
        }
    }

    pub fn encode(&self) -> AppResult<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    /// Bytes covered by the id and by the signature.
    fn signing_bytes(&self) -> AppResult<Vec<u8>> {
        let mut bytes = TX_DOMAIN.to_vec();
        bytes.extend_from_slice(&self.encode()?);
        Ok(bytes)
    }

    pub fn id(&self) -> AppResult<String> {
        let digest = sha512_256(&self.signing_bytes()?);
        Ok(BASE32_NOPAD.encode(&digest))
    }

    pub fn sign(self, account: &Account) -> AppResult<SignedTransaction> {
        let signing_bytes = self.signing_bytes()?;
        let tx_id = BASE32_NOPAD.encode(&sha512_256(&signing_bytes));
        let envelope = SignedEnvelope {
            sig: account.sign(&signing_bytes),
            txn: &self,
        };
        let bytes = rmp_serde::to_vec_named(&envelope)?;

        Ok(SignedTransaction {
            tx_id,
            bytes,
            transaction: self,
        })
    }
}

#[derive(Serialize)]
struct SignedEnvelope<'a> {
    #[serde(serialize_with = "bytes64")]
    sig: [u8; 64],
    txn: &'a Transaction,
}

/// Signed transaction ready for submission.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    pub tx_id: String,
    pub bytes: Vec<u8>,
    pub transaction: Transaction,
}

/// Genesis hashes travel as base64 in the node's JSON.
pub fn decode_genesis_hash(encoded: &str) -> AppResult<[u8; 32]> {
    let bytes = BASE64.decode(encoded)?;
    bytes.try_into().map_err(|b: Vec<u8>| {
        AppError::Encoding(format!("genesis hash is {} bytes, expected 32", b.len()))
    })
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn bytes32<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bytes(bytes)
}

fn bytes64<S: Serializer>(bytes: &[u8; 64], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TransactionParams {
        TransactionParams {
            fee: 10,
            first_valid: 95,
            last_valid: 105,
            genesis_id: "test-v1".to_string(),
            genesis_hash: [9u8; 32],
        }
    }

    fn fixture(note: Vec<u8>) -> Transaction {
        Transaction::payment(
            Address::new([1u8; 32]),
            Some(Address::new([2u8; 32])),
            50,
            None,
            note,
            &params(),
        )
    }

    #[test]
    fn test_canonical_encoding() {
        let encoded = fixture(Vec::new()).encode().unwrap();
        let expected = hex::decode(concat!(
            "89a3616d7432a36665650aa266765fa367656ea7746573742d7631a26768c420",
            "0909090909090909090909090909090909090909090909090909090909090909",
            "a26c7669a3726376c420",
            "0202020202020202020202020202020202020202020202020202020202020202",
            "a3736e64c420",
            "0101010101010101010101010101010101010101010101010101010101010101",
            "a474797065a3706179"
        ))
        .unwrap();

        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_transaction_id_vector() {
        assert_eq!(
            fixture(Vec::new()).id().unwrap(),
            "3ZK633CH7MNC2SCQTBSN4KXQACRBKIZHFH5Y2OPWRUZOIUNWFCUA"
        );
        assert_eq!(
            fixture(b"hello".to_vec()).id().unwrap(),
            "WZGUJ6UY6XVSKE6I5VS7FZR3ABJL4UR2PI4KI2TTXXZAESKN5OLQ"
        );
    }

    #[test]
    fn test_signed_envelope() {
        let account = Account::from_seed(&[4u8; 32]);
        let txn = Transaction::payment(account.address(), None, 0, None, Vec::new(), &params());
        let expected_id = txn.id().unwrap();
        let encoded_txn = txn.encode().unwrap();

        let signed = txn.sign(&account).unwrap();
        assert_eq!(signed.tx_id, expected_id);

        // {"sig": bin64, "txn": <txn>}
        assert_eq!(signed.bytes[0], 0x82);
        assert_eq!(&signed.bytes[1..5], b"\xa3sig");
        assert_eq!(&signed.bytes[5..7], &[0xc4, 0x40]);
        assert_eq!(&signed.bytes[71..75], b"\xa3txn");
        assert_eq!(&signed.bytes[75..], &encoded_txn[..]);
    }
}
