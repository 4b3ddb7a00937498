//! Delayed withdrawal queue with multiplicative slashing.
//!
//! ## Model
//!
//! Each prover owns one queue. A staker's pending withdrawals are kept in
//! request order. The queue carries a single cumulative `scale`, starting at
//! [`SCALE_ONE`], and every request snapshots it when it is created.
//!
//! Slashing the pending pool by `bps` only rescales:
//!
//! ```text
//! scale = scale * (10_000 - bps) / 10_000
//! ```
//!
//! so a slash costs O(1) no matter how many requests are outstanding. A
//! request is worth `value * scale / snapshot` when it settles; two slashes
//! compound multiplicatively.
//!
//! ## Rebasing
//!
//! The scale is stored as a mantissa plus a rebase count. Whenever a slash
//! takes the mantissa under [`REBASE_THRESHOLD`] it is multiplied by
//! [`REBASE_FACTOR`] and the count goes up by one, so the mantissa keeps at
//! least nine significant digits however deep the cumulative slash gets.
//! The cumulative scale is `mantissa / REBASE_FACTOR^rebases` and never
//! increases. Requests snapshot both parts.
//!
//! The queue also keeps a running effective total so a slash can report the
//! value it actually wrote down without walking the requests.
//!
//! ## Maturity
//!
//! Maturity is evaluated lazily against the delay in force at settlement
//! time. Changing the delay re-evaluates every outstanding request.
//!
//! ## Example
//!
//! ```
//! use prover_staking::queue::{WithdrawalQueue, SCALE_ONE};
//! use prover_staking::types::Address;
//!
//! let staker = Address::from_low_u64(7);
//! let mut queue = WithdrawalQueue::new();
//!
//! queue.enqueue(staker, 1_000, 0, 20).unwrap();
//! queue.apply_slash(2_000);
//! queue.enqueue(staker, 640, 10, 20).unwrap();
//!
//! let settlement = queue.settle(&staker, 100, 110).unwrap();
//! assert_eq!(settlement.paid, 800 + 640);
//! assert_eq!(settlement.recorded, 1_640);
//! assert_eq!(queue.scale(), SCALE_ONE / 10 * 8);
//! assert_eq!(queue.raw_outstanding(), 0);
//! ```

use std::collections::HashMap;

use crate::error::{Result, StakingError};
use crate::types::amount::{mul_div, Amount, Bps, BPS_DENOMINATOR};
use crate::types::{Address, WithdrawalRequest};

/// Initial cumulative scale (1.0 in 18-decimal fixed point).
pub const SCALE_ONE: u128 = 1_000_000_000_000_000_000;

/// Multiplier applied to the scale mantissa on each rebase.
pub const REBASE_FACTOR: u128 = 1_000_000_000;

/// Smallest mantissa kept without rebasing.
pub const REBASE_THRESHOLD: u128 = SCALE_ONE / REBASE_FACTOR;

/// Effect of a slash on the pending pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueueSlash {
    pub scale_before: u128,
    pub scale_after: u128,
    /// Rebase count after the slash
    pub rebases: u32,
    /// Drop in the effective outstanding total
    pub written_down: Amount,
}

/// Outcome of settling a staker's matured requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Settlement {
    /// Number of requests settled
    pub matured: usize,
    /// Sum of recorded (pre-slash) values
    pub recorded: Amount,
    /// Sum of effective values paid out
    pub paid: Amount,
}

impl Settlement {
    /// Value written off by slashes since the requests were made.
    pub fn shortfall(&self) -> Amount {
        self.recorded - self.paid
    }
}

/// Pending totals for one staker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingSummary {
    pub count: usize,
    pub ready_count: usize,
    /// Effective value of every pending request
    pub total_value: Amount,
    /// Effective value of the matured subset
    pub ready_value: Amount,
    /// Earliest maturity among immature requests
    pub next_maturity: Option<u64>,
}

/// Per-prover unbonding queue.
#[derive(Debug, Clone)]
pub struct WithdrawalQueue {
    /// Staker -> pending requests, oldest first
    requests: HashMap<Address, Vec<WithdrawalRequest>>,

    /// Scale mantissa, in [REBASE_THRESHOLD, SCALE_ONE]
    scale: u128,

    /// Times the mantissa has been multiplied by REBASE_FACTOR
    rebases: u32,

    /// Sum of recorded values of every pending request
    raw_outstanding: Amount,

    /// Running effective value of every pending request, written down by
    /// each slash (per-request truncation can leave it a few units off)
    effective_outstanding: Amount,
}

impl Default for WithdrawalQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WithdrawalQueue {
    pub fn new() -> Self {
        Self {
            requests: HashMap::new(),
            scale: SCALE_ONE,
            rebases: 0,
            raw_outstanding: 0,
            effective_outstanding: 0,
        }
    }

    #[inline]
    pub fn scale(&self) -> u128 {
        self.scale
    }

    #[inline]
    pub fn rebases(&self) -> u32 {
        self.rebases
    }

    #[inline]
    pub fn raw_outstanding(&self) -> Amount {
        self.raw_outstanding
    }

    /// True when no staker has anything pending.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self, staker: &Address) -> &[WithdrawalRequest] {
        self.requests.get(staker).map(|r| r.as_slice()).unwrap_or(&[])
    }

    pub fn pending_count(&self, staker: &Address) -> usize {
        self.requests(staker).len()
    }

    /// Number of stakers with at least one pending request.
    pub fn staker_count(&self) -> usize {
        self.requests.len()
    }

    /// Running effective value of everything pending.
    #[inline]
    pub fn effective_outstanding(&self) -> Amount {
        self.effective_outstanding
    }

    /// Check that `staker` may add a request worth `value`.
    pub fn check_enqueue(&self, staker: &Address, value: Amount, max_pending: usize) -> Result<()> {
        let pending = self.pending_count(staker);
        if pending >= max_pending {
            return Err(StakingError::TooManyPendingRequests {
                staker: *staker,
                pending,
                max: max_pending,
            });
        }
        self.raw_outstanding
            .checked_add(value)
            .ok_or(StakingError::Overflow)?;
        Ok(())
    }

    /// Append a request snapshotting the current scale.
    pub fn enqueue(
        &mut self,
        staker: Address,
        value: Amount,
        now: u64,
        max_pending: usize,
    ) -> Result<WithdrawalRequest> {
        self.check_enqueue(&staker, value, max_pending)?;
        let request = WithdrawalRequest::new(value, now, self.scale, self.rebases);
        self.requests.entry(staker).or_default().push(request.clone());
        self.raw_outstanding += value;
        self.effective_outstanding = self.effective_outstanding.saturating_add(value);
        Ok(request)
    }

    /// Compute what [`WithdrawalQueue::settle`] would pay without touching
    /// the queue.
    pub fn preview_settlement(&self, staker: &Address, delay: u64, now: u64) -> Result<Settlement> {
        let mut settlement = Settlement::default();
        let mut next_maturity: Option<u64> = None;

        for request in self.requests(staker) {
            if request.is_mature(delay, now) {
                settlement.matured += 1;
                settlement.recorded += request.value;
                settlement.paid += request.effective_value(self.scale, self.rebases);
            } else {
                let at = request.matures_at(delay);
                next_maturity = Some(next_maturity.map_or(at, |n| n.min(at)));
            }
        }

        if settlement.matured == 0 {
            return Err(StakingError::NotReady {
                staker: *staker,
                next_maturity,
            });
        }
        Ok(settlement)
    }

    /// Remove every matured request of `staker` and return the totals.
    ///
    /// Fails with `NotReady` if nothing has matured.
    pub fn settle(&mut self, staker: &Address, delay: u64, now: u64) -> Result<Settlement> {
        let settlement = self.preview_settlement(staker, delay, now)?;

        if let Some(pending) = self.requests.get_mut(staker) {
            pending.retain(|r| !r.is_mature(delay, now));
            if pending.is_empty() {
                self.requests.remove(staker);
            }
        }
        self.raw_outstanding -= settlement.recorded;
        self.effective_outstanding = if self.raw_outstanding == 0 {
            0
        } else {
            self.effective_outstanding.saturating_sub(settlement.paid)
        };
        Ok(settlement)
    }

    /// What a slash of `bps` would do, without touching the queue.
    ///
    /// `bps` is expected below 10_000; a full wipe would leave nothing to
    /// rebase and is clamped to the smallest mantissa.
    pub fn preview_slash(&self, bps: Bps) -> QueueSlash {
        let keep = BPS_DENOMINATOR.saturating_sub(bps as u128);
        let mut scale_after = mul_div(self.scale, keep, BPS_DENOMINATOR)
            .unwrap_or(0)
            .max(1);
        let mut rebases = self.rebases;
        if scale_after < REBASE_THRESHOLD {
            // one slash divides by at most 10^4, so a single rebase suffices
            scale_after *= REBASE_FACTOR;
            rebases = rebases.saturating_add(1);
        }

        let remaining = mul_div(self.effective_outstanding, keep, BPS_DENOMINATOR).unwrap_or(0);
        QueueSlash {
            scale_before: self.scale,
            scale_after,
            rebases,
            written_down: self.effective_outstanding - remaining,
        }
    }

    /// Shrink the scale by `bps`, rebasing when the mantissa gets small.
    pub fn apply_slash(&mut self, bps: Bps) -> QueueSlash {
        let slash = self.preview_slash(bps);
        self.commit_slash(&slash);
        slash
    }

    /// Install the outcome of an earlier [`WithdrawalQueue::preview_slash`].
    pub(crate) fn commit_slash(&mut self, slash: &QueueSlash) {
        self.scale = slash.scale_after;
        self.rebases = slash.rebases;
        self.effective_outstanding = self.effective_outstanding.saturating_sub(slash.written_down);
    }

    /// Pending totals for `staker` under the current scale and delay.
    pub fn summary(&self, staker: &Address, delay: u64, now: u64) -> PendingSummary {
        let mut summary = PendingSummary::default();
        for request in self.requests(staker) {
            let value = request.effective_value(self.scale, self.rebases);
            summary.count += 1;
            summary.total_value += value;
            if request.is_mature(delay, now) {
                summary.ready_count += 1;
                summary.ready_value += value;
            } else {
                let at = request.matures_at(delay);
                summary.next_maturity = Some(summary.next_maturity.map_or(at, |n| n.min(at)));
            }
        }
        summary
    }
}
