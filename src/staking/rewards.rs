//! Reward intake, commission accrual and commission rates.

use tracing::{debug, info};

use crate::access::{AccessControl, Role};
use crate::config::RewardGating;
use crate::error::{Result, StakingError};
use crate::staking::Staking;
use crate::token::{CollateralToken, TokenError};
use crate::types::{Address, Amount, Bps, StakingEvent};

impl<T: CollateralToken, A: AccessControl> Staking<T, A> {
    /// Pay `amount` of rewards to an Active prover's stakers.
    ///
    /// The caller is the reward source. Commission at the source's rate is
    /// booked to the prover and the remainder raises the share price.
    /// Returns `(commission, to_stakers)`.
    pub fn add_rewards(&mut self, caller: Address, prover: Address, amount: Amount) -> Result<(Amount, Amount)> {
        self.ensure_not_paused()?;
        if self.config.reward_gating == RewardGating::Restricted {
            self.require_role(Role::RewardPayer, &caller)?;
        }
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }

        let record = self.require_active(&prover)?;
        let (commission, to_stakers) = record
            .commission
            .split(amount, &caller)
            .ok_or(StakingError::Overflow)?;
        if to_stakers > 0 && record.vault.total_shares() == 0 {
            return Err(StakingError::NoSharesOutstanding(prover));
        }
        record.commission.check_accrue(commission)?;
        record
            .vault
            .total_assets()
            .checked_add(to_stakers)
            .ok_or(StakingError::Overflow)?;
        let vault_address = record.vault.address();

        // both legs must succeed, so check the source covers the whole amount
        let available = self.token.balance_of(&caller);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                holder: caller,
                available,
                requested: amount,
            }
            .into());
        }
        self.token.transfer(&caller, &self.custody, commission)?;
        self.token.transfer(&caller, &vault_address, to_stakers)?;

        let record = self.record_mut(&prover)?;
        record.commission.accrue(commission)?;
        if to_stakers > 0 {
            record.vault.donate(to_stakers)?;
        }

        info!(prover = %prover, source = %caller, commission, to_stakers, "rewards added");
        self.emit(StakingEvent::RewardsAdded {
            prover,
            source: caller,
            commission,
            to_stakers,
        });
        Ok((commission, to_stakers))
    }

    /// Pay the caller's accrued commission in full.
    ///
    /// Allowed in any lifecycle state. With nothing accrued this returns
    /// zero and changes nothing.
    pub fn claim_commission(&mut self, caller: Address) -> Result<Amount> {
        self.ensure_not_paused()?;
        let amount = self.record(&caller)?.commission.unclaimed();
        if amount == 0 {
            return Ok(0);
        }
        self.ensure_custody_covers(amount)?;

        self.record_mut(&caller)?.commission.take_unclaimed();
        self.token.transfer(&self.custody, &caller, amount)?;

        info!(prover = %caller, amount, "commission claimed");
        self.emit(StakingEvent::CommissionClaimed {
            prover: caller,
            amount,
        });
        Ok(amount)
    }

    // ========================================================================
    // Rates
    // ========================================================================

    pub fn set_default_commission_rate(&mut self, caller: Address, bps: Bps) -> Result<()> {
        self.ensure_not_paused()?;
        self.record_mut(&caller)?.commission.set_default(bps)?;
        debug!(prover = %caller, bps, "default commission rate set");
        self.emit(StakingEvent::CommissionRateSet {
            prover: caller,
            source: None,
            bps,
        });
        Ok(())
    }

    /// Override the commission rate for rewards paid by `source`.
    pub fn set_commission_rate(&mut self, caller: Address, source: Address, bps: Bps) -> Result<()> {
        self.ensure_not_paused()?;
        self.record_mut(&caller)?.commission.set_rate(source, bps)?;
        debug!(prover = %caller, source = %source, bps, "commission rate set");
        self.emit(StakingEvent::CommissionRateSet {
            prover: caller,
            source: Some(source),
            bps,
        });
        Ok(())
    }

    /// Drop the override for `source`. Returns `false` if there was none.
    pub fn reset_commission_rate(&mut self, caller: Address, source: Address) -> Result<bool> {
        self.ensure_not_paused()?;
        let removed = self.record_mut(&caller)?.commission.reset_rate(&source);
        if removed {
            debug!(prover = %caller, source = %source, "commission rate reset");
            self.emit(StakingEvent::CommissionRateReset {
                prover: caller,
                source,
            });
        }
        Ok(removed)
    }
}
