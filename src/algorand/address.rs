use std::fmt;
use std::str::FromStr;

use data_encoding::BASE32_NOPAD;
use serde::{Serialize, Serializer};

use crate::error::{AppError, AppResult};

use super::sha512_256;

const CHECKSUM_LEN: usize = 4;

/// Encoded length of an address: base32 of a 32 byte key plus a 4 byte checksum.
pub const ADDRESS_LEN: usize = 58;

/// Account address: an Ed25519 public key.
///
/// The string form is `base32(key || last4(sha512_256(key)))` without padding.
/// On the wire (msgpack) it is the raw 32 byte key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 32]);

impl Address {
    pub fn new(public_key: [u8; 32]) -> Self {
        Self(public_key)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn checksum(public_key: &[u8; 32]) -> [u8; CHECKSUM_LEN] {
        let digest = sha512_256(public_key);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[32 - CHECKSUM_LEN..]);
        checksum
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(32 + CHECKSUM_LEN);
        raw.extend_from_slice(self.as_bytes());
        raw.extend_from_slice(&Self::checksum(self.as_bytes()));
        write!(f, "{}", BASE32_NOPAD.encode(&raw))
    }
}

impl FromStr for Address {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        if s.len() != ADDRESS_LEN {
            return Err(AppError::InvalidAddress(format!(
                "expected {} characters, got {}",
                ADDRESS_LEN,
                s.len()
            )));
        }

        let raw = BASE32_NOPAD
            .decode(s.as_bytes())
            .map_err(|e| AppError::InvalidAddress(format!("{}: {}", s, e)))?;

        let (key, checksum) = raw.split_at(32);
        let key: [u8; 32] = key
            .try_into()
            .map_err(|_| AppError::InvalidAddress(s.to_string()))?;

        if checksum != Self::checksum(&key) {
            return Err(AppError::InvalidAddress(format!("checksum mismatch: {}", s)));
        }

        Ok(Self(key))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(self.as_bytes())
    }
}
