//! Deterministic per-prover vault deployment.
//!
//! A vault's custody address is a pure function of the deployer and the
//! prover, so it can be predicted before initialization and is identical on
//! every replica.

use sha2::{Digest, Sha256};

use crate::types::Address;

/// Derives the custody address of a prover's vault.
pub trait VaultFactory {
    fn vault_address(&self, prover: &Address) -> Address;
}

/// Domain separator mixed into every derived address.
const VAULT_SALT: &[u8] = b"prover-staking/vault/v1";

/// CREATE2-style derivation: the low 20 bytes of
/// `sha256(0xff || deployer || word(prover) || salt)`.
#[derive(Debug, Clone, Copy)]
pub struct DeterministicFactory {
    deployer: Address,
}

impl DeterministicFactory {
    pub fn new(deployer: Address) -> Self {
        Self { deployer }
    }

    pub fn deployer(&self) -> Address {
        self.deployer
    }
}

impl VaultFactory for DeterministicFactory {
    fn vault_address(&self, prover: &Address) -> Address {
        let mut hasher = Sha256::new();
        hasher.update([0xffu8]);
        hasher.update(self.deployer.0);
        hasher.update(prover.to_word());
        hasher.update(VAULT_SALT);
        let digest: [u8; 32] = hasher.finalize().into();
        Address::from_word(&digest)
    }
}
