//! Staking, the two-phase withdrawal, and share transfers.

use tracing::{debug, info};

use crate::access::AccessControl;
use crate::error::{Result, StakingError};
use crate::staking::Staking;
use crate::token::CollateralToken;
use crate::types::{Address, Amount, ProverState, StakingEvent};

impl<T: CollateralToken, A: AccessControl> Staking<T, A> {
    // ========================================================================
    // Stake
    // ========================================================================

    /// Deposit `amount` of collateral behind an Active prover.
    ///
    /// Returns the shares minted to `caller`.
    pub fn stake(&mut self, caller: Address, prover: Address, amount: Amount) -> Result<u128> {
        self.ensure_not_paused()?;
        let record = self.require_active(&prover)?;
        record.vault.preview_deposit(amount)?;
        let vault_address = record.vault.address();

        self.token.transfer(&caller, &vault_address, amount)?;

        let minimum = self.config.min_self_stake;
        let record = self.record_mut(&prover)?;
        let (shares, _) = record.with_hook(minimum, |vault, hook| vault.deposit(amount, caller, hook))?;

        debug!(prover = %prover, staker = %caller, amount, shares, "staked");
        self.emit(StakingEvent::Staked {
            prover,
            staker: caller,
            amount,
            shares,
        });
        Ok(shares)
    }

    // ========================================================================
    // Withdrawal
    // ========================================================================

    /// Burn `shares` and queue their current value for withdrawal.
    ///
    /// The value is fixed now and only shrinks if the prover is slashed
    /// before the request is completed. Rejected while the prover is
    /// jailed.
    pub fn request_unstake(
        &mut self,
        caller: Address,
        prover: Address,
        shares: u128,
        now: u64,
    ) -> Result<Amount> {
        self.ensure_not_paused()?;
        if shares == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let max_pending = self.config.max_pending_requests;
        let minimum = self.config.min_self_stake;

        let record = self.record(&prover)?;
        if record.state == ProverState::Jailed {
            return Err(StakingError::Jailed(prover));
        }
        let value = record
            .vault
            .convert_to_assets(shares)
            .ok_or(StakingError::Overflow)?;
        if value == 0 {
            return Err(StakingError::ZeroAmount);
        }
        record.queue.check_enqueue(&caller, value, max_pending)?;
        let escrow = self.escrow.checked_add(value).ok_or(StakingError::Overflow)?;
        let vault_address = record.vault.address();

        let record = self.record_mut(&prover)?;
        let (value, deactivated) =
            record.with_hook(minimum, |vault, hook| vault.burn(caller, shares, hook))?;
        let request = record.queue.enqueue(caller, value, now, max_pending)?;
        self.escrow = escrow;

        self.token.transfer(&vault_address, &self.custody, value)?;

        info!(prover = %prover, staker = %caller, shares, value, now, "unstake requested");
        self.emit(StakingEvent::UnstakeRequested {
            prover,
            staker: caller,
            shares,
            value,
            requested_at: request.requested_at,
        });
        if deactivated {
            self.note_auto_deactivation(prover, "self-stake fully withdrawn");
        }
        Ok(value)
    }

    /// Pay out every matured withdrawal of `caller` against `prover`.
    ///
    /// Each request pays its value scaled by the slashes since it was made;
    /// the difference stays with the treasury. Fails with `NotReady` if
    /// nothing has matured.
    pub fn complete_unstake(&mut self, caller: Address, prover: Address, now: u64) -> Result<Amount> {
        self.ensure_not_paused()?;
        let delay = self.config.unstake_delay;
        let preview = self
            .record(&prover)?
            .queue
            .preview_settlement(&caller, delay, now)?;
        self.ensure_custody_covers(preview.paid)?;

        let settlement = self.record_mut(&prover)?.queue.settle(&caller, delay, now)?;
        self.escrow -= settlement.recorded;
        self.treasury += settlement.shortfall();

        self.token.transfer(&self.custody, &caller, settlement.paid)?;

        info!(
            prover = %prover,
            staker = %caller,
            requests = settlement.matured,
            paid = settlement.paid,
            shortfall = settlement.shortfall(),
            "unstake completed"
        );
        self.emit(StakingEvent::UnstakeCompleted {
            prover,
            staker: caller,
            requests: settlement.matured,
            paid: settlement.paid,
            shortfall: settlement.shortfall(),
        });
        Ok(settlement.paid)
    }

    // ========================================================================
    // Share transfers
    // ========================================================================

    pub fn transfer_shares(
        &mut self,
        caller: Address,
        prover: Address,
        to: Address,
        shares: u128,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        let minimum = self.config.min_self_stake;
        let record = self.record_mut(&prover)?;
        let ((), deactivated) =
            record.with_hook(minimum, |vault, hook| vault.transfer(caller, to, shares, hook))?;
        self.after_share_transfer(prover, caller, to, shares, deactivated);
        Ok(())
    }

    /// Allow `spender` to move up to `shares` of the caller's balance.
    /// `u128::MAX` never decreases.
    pub fn approve_shares(
        &mut self,
        caller: Address,
        prover: Address,
        spender: Address,
        shares: u128,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        self.record_mut(&prover)?.vault.approve(caller, spender, shares)?;
        self.emit(StakingEvent::SharesApproved {
            prover,
            owner: caller,
            spender,
            shares,
        });
        Ok(())
    }

    pub fn transfer_shares_from(
        &mut self,
        caller: Address,
        prover: Address,
        from: Address,
        to: Address,
        shares: u128,
    ) -> Result<()> {
        self.ensure_not_paused()?;
        let minimum = self.config.min_self_stake;
        let record = self.record_mut(&prover)?;
        let ((), deactivated) = record.with_hook(minimum, |vault, hook| {
            vault.transfer_from(caller, from, to, shares, hook)
        })?;
        self.after_share_transfer(prover, from, to, shares, deactivated);
        Ok(())
    }

    fn after_share_transfer(
        &mut self,
        prover: Address,
        from: Address,
        to: Address,
        shares: u128,
        deactivated: bool,
    ) {
        debug!(prover = %prover, from = %from, to = %to, shares, "shares transferred");
        self.emit(StakingEvent::SharesTransferred {
            prover,
            from,
            to,
            shares,
        });
        if deactivated {
            self.note_auto_deactivation(prover, "self-stake transferred away");
        }
    }
}
