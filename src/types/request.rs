//! Withdrawal request type for the unbonding queue.
//!
//! ## SSZ Serialization
//!
//! Requests derive `SimpleSerialize` from ssz_rs so that pending queues can be
//! committed to deterministically. Layout is a fixed-size container:
//! `value (16) + requested_at (8) + scale_snapshot (16) + rebase_snapshot (4)`
//! = 44 bytes.
//!
//! ## Effective Value
//!
//! A request records the collateral redeemed at request time together with
//! the prover's cumulative slashing scale at that moment. The scale is kept
//! as a mantissa plus a rebase count (see [`crate::queue`]), so the request
//! is worth
//!
//! ```text
//! effective = value * scale / (scale_snapshot * REBASE_FACTOR^(rebases - rebase_snapshot))
//! ```
//!
//! which is never more than `value` because the cumulative scale only
//! decreases.

use ssz_rs::prelude::*;

use crate::queue::REBASE_FACTOR;
use crate::types::amount::{mul_div, Amount};

/// A pending withdrawal of collateral.
///
/// ## Example
///
/// ```
/// use prover_staking::types::WithdrawalRequest;
/// use prover_staking::queue::SCALE_ONE;
///
/// let request = WithdrawalRequest::new(1_000, 0, SCALE_ONE, 0);
///
/// // a 20% slash after the request was made
/// let scale_now = SCALE_ONE / 10 * 8;
/// assert_eq!(request.effective_value(scale_now, 0), 800);
///
/// assert!(!request.is_mature(100, 99));
/// assert!(request.is_mature(100, 100));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct WithdrawalRequest {
    /// Collateral redeemed at request time (base units)
    pub value: u128,

    /// Unix timestamp in seconds when the request was made
    pub requested_at: u64,

    /// Prover's cumulative slashing scale when the request was made
    pub scale_snapshot: u128,

    /// Number of scale rebases the queue had gone through at that time
    pub rebase_snapshot: u32,
}

impl WithdrawalRequest {
    /// Create a new request
    ///
    /// # Arguments
    ///
    /// * `value` - Redeemed collateral in base units
    /// * `requested_at` - Request timestamp (seconds)
    /// * `scale_snapshot` - Current scale mantissa of the prover's queue
    /// * `rebase_snapshot` - Current rebase count of the prover's queue
    pub fn new(value: Amount, requested_at: u64, scale_snapshot: u128, rebase_snapshot: u32) -> Self {
        Self {
            value,
            requested_at,
            scale_snapshot,
            rebase_snapshot,
        }
    }

    /// Value payable under the queue's current scale and rebase count.
    ///
    /// Returns the recorded value unchanged when no slash happened since the
    /// request.
    pub fn effective_value(&self, scale: u128, rebases: u32) -> Amount {
        match rebases.saturating_sub(self.rebase_snapshot) {
            0 if scale >= self.scale_snapshot => self.value,
            // scale < snapshot, so the quotient is < value and always fits
            0 => mul_div(self.value, scale, self.scale_snapshot).unwrap_or(0),
            gap => {
                // snapshot <= SCALE_ONE, so the widened divisor fits in u128
                let mut value = self
                    .scale_snapshot
                    .checked_mul(REBASE_FACTOR)
                    .and_then(|divisor| mul_div(self.value, scale, divisor))
                    .unwrap_or(0);
                for _ in 1..gap {
                    if value == 0 {
                        break;
                    }
                    value /= REBASE_FACTOR;
                }
                value
            }
        }
    }

    /// Earliest timestamp at which the request can be completed.
    pub fn matures_at(&self, unstake_delay: u64) -> u64 {
        self.requested_at.saturating_add(unstake_delay)
    }

    /// Check maturity against the delay in force *now*.
    pub fn is_mature(&self, unstake_delay: u64, now: u64) -> bool {
        self.matures_at(unstake_delay) <= now
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
