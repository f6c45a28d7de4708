use ed25519_dalek::{Signer, SigningKey};

use crate::error::AppResult;

use super::{address::Address, mnemonic::seed_from_mnemonic};

/// Ed25519 keypair derived from an account mnemonic.
pub struct Account {
    signing_key: SigningKey,
    address: Address,
}

impl Account {
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        let address = Address::new(signing_key.verifying_key().to_bytes());
        Self { signing_key, address }
    }

    pub fn from_mnemonic(mnemonic: &str) -> AppResult<Self> {
        let seed = seed_from_mnemonic(mnemonic)?;
        Ok(Self::from_seed(&seed))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

// Keep the secret out of logs.
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address.to_string())
            .finish()
    }
}
