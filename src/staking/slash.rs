//! Slashing engine.
//!
//! ## Two pools
//!
//! A prover's slashable value is its active collateral plus the recorded
//! value of its pending withdrawals. A slash of `bps` hits both in
//! proportion:
//!
//! - **Active**: `collateral * bps / 10_000` leaves the vault for the
//!   treasury. No shares are burned, so the exchange rate drops for every
//!   holder at once.
//! - **Pending**: the queue's scale is multiplied by `(10_000 - bps) / 10_000`.
//!   Nothing moves now; each request pays less when it completes and the
//!   difference stays in the treasury. The receipt reports the drop in the
//!   queue's effective value, which shrinks as the scale does.
//!
//! Both steps are O(1), and so is the receipt: it commits to the slashed
//! prover's own snapshot, not the whole ledger. Slashing never fails because
//! the prover ends up under its minimum self-stake; an Active prover in that
//! position is deactivated instead.

use tracing::{info, warn};

use crate::access::{AccessControl, Role};
use crate::error::{Result, StakingError};
use crate::staking::Staking;
use crate::token::CollateralToken;
use crate::types::amount::{bps_of, mul_div, BPS_DENOMINATOR};
use crate::types::{Address, Amount, Bps, ProverState, SlashReceipt, StakingEvent};
use crate::vault::shares_to_assets;

impl<T: CollateralToken, A: AccessControl> Staking<T, A> {
    /// Slash `prover` by `bps` basis points of its slashable value.
    ///
    /// Requires `Role::Slasher` and `0 < bps <= max_slash_bps`. Applies to
    /// provers in any live state.
    pub fn slash(&mut self, caller: &Address, prover: Address, bps: Bps) -> Result<SlashReceipt> {
        self.ensure_not_paused()?;
        self.require_role(Role::Slasher, caller)?;
        let max = self.config.max_slash_bps;
        if bps == 0 || bps > max {
            return Err(StakingError::BpsOutOfRange { bps, max });
        }
        self.record(&prover)?;
        self.execute_slash(prover, bps)
    }

    /// Slash an absolute amount, converted to basis points of the current
    /// slashable value and capped at `max_slash_bps`.
    ///
    /// Returns the amount actually slashed (active cut plus pending
    /// write-down), which may be less than asked.
    /// Returns zero without touching anything when the amount rounds to
    /// zero basis points or the prover has nothing to slash.
    pub fn slash_by_amount(&mut self, caller: &Address, prover: Address, amount: Amount) -> Result<Amount> {
        self.ensure_not_paused()?;
        self.require_role(Role::Slasher, caller)?;
        let record = self.record(&prover)?;

        let slashable = record
            .vault
            .total_assets()
            .checked_add(record.queue.raw_outstanding())
            .ok_or(StakingError::Overflow)?;
        if amount == 0 || slashable == 0 {
            return Ok(0);
        }

        let max = self.config.max_slash_bps;
        let bps = match mul_div(amount, BPS_DENOMINATOR, slashable) {
            Some(bps) if bps < max as u128 => bps as Bps,
            _ => max,
        };
        if bps == 0 {
            return Ok(0);
        }

        let receipt = self.execute_slash(prover, bps)?;
        Ok(receipt.total_slashed())
    }

    fn execute_slash(&mut self, prover: Address, bps: Bps) -> Result<SlashReceipt> {
        let minimum = self.config.min_self_stake;
        let record = self.record(&prover)?;
        let vault_address = record.vault.address();

        let collateral = record.vault.total_assets();
        let requested = bps_of(collateral, bps).ok_or(StakingError::Overflow)?;

        // clamp to what the vault can actually hand over
        let available = self.token.balance_of(&vault_address).min(collateral);
        let active = requested.min(available);
        if active < requested {
            warn!(prover = %prover, requested, available, "active slash clamped");
        }

        let queue_slash = record.queue.preview_slash(bps);
        let remaining = collateral - active;
        let self_value = shares_to_assets(
            record.vault.balance_of(&prover),
            record.vault.total_shares(),
            remaining,
        )
        .unwrap_or(0);
        let deactivated = record.state == ProverState::Active && self_value < minimum;

        // the receipt commits to the post-slash snapshot; encode it before
        // any book changes so an encoding failure leaves nothing behind
        let mut snapshot = record.snapshot();
        snapshot.total_assets = remaining;
        snapshot.scale = queue_slash.scale_after;
        snapshot.scale_rebases = queue_slash.rebases;
        if deactivated {
            snapshot.state_raw = ProverState::Deactivated.to_u8();
        }
        let snapshot_root = snapshot.root()?;

        let record = self.record_mut(&prover)?;
        let seized = record.vault.seize(active);
        record.queue.commit_slash(&queue_slash);
        if deactivated {
            record.state = ProverState::Deactivated;
        }
        self.treasury += seized;

        self.token.transfer(&vault_address, &self.custody, seized)?;

        let pending = queue_slash.written_down;
        info!(
            prover = %prover,
            bps,
            active = seized,
            pending,
            scale = queue_slash.scale_after,
            rebases = queue_slash.rebases,
            "prover slashed"
        );
        self.emit(StakingEvent::Slashed {
            prover,
            bps,
            active: seized,
            pending,
        });
        if deactivated {
            self.note_auto_deactivation(prover, "self-stake below minimum after slash");
        }

        Ok(SlashReceipt {
            prover: prover.to_word(),
            bps,
            active_slashed: seized,
            pending_slashed: pending,
            scale_before: queue_slash.scale_before,
            scale_after: queue_slash.scale_after,
            rebases: queue_slash.rebases,
            deactivated,
            snapshot_root,
        })
    }
}
