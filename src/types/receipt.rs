//! Slash receipts and prover snapshots.
//!
//! A [`ProverSnapshot`] is the SSZ-encodable summary of one prover's books;
//! the ledger state root is the SHA-256 of all snapshots in address order.
//! A [`SlashReceipt`] records one slashing event together with the root of
//! the slashed prover's snapshot after it was applied.

use ssz_rs::prelude::*;
use sha2::{Digest, Sha256};

use crate::error::StakingError;

/// Deterministic per-prover summary used for the state root.
///
/// ## SSZ Layout
///
/// Fixed-size container:
/// 32 + 1 + 16 * 3 + 4 + 16 * 2 + 8 = 125 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct ProverSnapshot {
    /// Prover address, left-padded to 32 bytes
    pub prover: [u8; 32],

    /// Lifecycle state as u8 (see `ProverState::to_u8`)
    pub state_raw: u8,

    /// Shares outstanding in the prover's ledger
    pub total_shares: u128,

    /// Collateral custodied by the ledger
    pub total_assets: u128,

    /// Withdrawal-queue scale mantissa
    pub scale: u128,

    /// Rebases applied to the scale mantissa
    pub scale_rebases: u32,

    /// Raw (un-scaled) sum of pending request values
    pub raw_outstanding: u128,

    /// Accrued, unclaimed commission
    pub unclaimed_commission: u128,

    /// Number of addresses holding shares
    pub staker_count: u64,
}

impl ProverSnapshot {
    /// SSZ encoding, as committed to the state root.
    pub fn encode(&self) -> crate::error::Result<Vec<u8>> {
        ssz_rs::serialize(self).map_err(|e| StakingError::Encoding(format!("{e:?}")))
    }

    /// SHA-256 of the SSZ encoding.
    pub fn root(&self) -> crate::error::Result<[u8; 32]> {
        Ok(compute_hash(&self.encode()?))
    }
}

/// Summary of a single slashing event.
///
/// ## Example
///
/// ```
/// use prover_staking::types::SlashReceipt;
///
/// let receipt = SlashReceipt {
///     active_slashed: 120,
///     pending_slashed: 30,
///     ..Default::default()
/// };
/// assert_eq!(receipt.total_slashed(), 150);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct SlashReceipt {
    /// Slashed prover, left-padded to 32 bytes
    pub prover: [u8; 32],

    /// Applied rate in basis points
    pub bps: u16,

    /// Collateral moved out of the active pool into the treasury
    pub active_slashed: u128,

    /// Effective pending value written down through the scale
    /// (realized lazily as withdrawals complete)
    pub pending_slashed: u128,

    /// Queue scale mantissa before the slash
    pub scale_before: u128,

    /// Queue scale mantissa after the slash
    pub scale_after: u128,

    /// Rebase count after the slash
    pub rebases: u32,

    /// True when the slash pushed the prover's self-stake under the minimum
    /// and flipped it to Deactivated
    pub deactivated: bool,

    /// Root of the prover's snapshot after the slash (SHA-256, 32 bytes)
    pub snapshot_root: [u8; 32],
}

impl SlashReceipt {
    /// Total value removed by this slash (active + pending).
    pub fn total_slashed(&self) -> u128 {
        self.active_slashed.saturating_add(self.pending_slashed)
    }

    /// Get the snapshot root as a hex string
    pub fn snapshot_root_hex(&self) -> String {
        hex::encode(self.snapshot_root)
    }
}

/// Compute SHA-256 of the given data as a 32-byte root.
pub fn compute_hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

// ============================================================================
// Unit Tests
// ============================================================================
