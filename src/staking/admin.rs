//! Parameter setters and treasury operations. Admin only, allowed while
//! paused.

use tracing::{info, warn};

use crate::access::{AccessControl, Role};
use crate::config::{validate_max_slash_bps, ConfigError, RewardGating};
use crate::error::{Result, StakingError};
use crate::staking::Staking;
use crate::token::CollateralToken;
use crate::types::{Address, Amount, Bps, StakingEvent};

impl<T: CollateralToken, A: AccessControl> Staking<T, A> {
    pub fn set_min_self_stake(&mut self, caller: &Address, value: Amount) -> Result<()> {
        self.require_role(Role::Admin, caller)?;
        self.config.min_self_stake = value;
        self.parameter_updated("min_self_stake", value);
        Ok(())
    }

    /// Upper bound for a single slash, at most 9_999 bps.
    pub fn set_max_slash_bps(&mut self, caller: &Address, bps: Bps) -> Result<()> {
        self.require_role(Role::Admin, caller)?;
        validate_max_slash_bps(bps)?;
        self.config.max_slash_bps = bps;
        self.parameter_updated("max_slash_bps", bps as u128);
        Ok(())
    }

    /// Applies to requests already in the queue as well.
    pub fn set_unstake_delay(&mut self, caller: &Address, seconds: u64) -> Result<()> {
        self.require_role(Role::Admin, caller)?;
        self.config.unstake_delay = seconds;
        self.parameter_updated("unstake_delay", seconds as u128);
        Ok(())
    }

    pub fn set_max_pending_requests(&mut self, caller: &Address, max: usize) -> Result<()> {
        self.require_role(Role::Admin, caller)?;
        if max == 0 {
            return Err(ConfigError::ZeroPendingCap.into());
        }
        self.config.max_pending_requests = max;
        self.parameter_updated("max_pending_requests", max as u128);
        Ok(())
    }

    pub fn set_reward_gating(&mut self, caller: &Address, gating: RewardGating) -> Result<()> {
        self.require_role(Role::Admin, caller)?;
        self.config.reward_gating = gating;
        let raw = match gating {
            RewardGating::Open => 0,
            RewardGating::Restricted => 1,
        };
        self.parameter_updated("reward_gating", raw);
        Ok(())
    }

    fn parameter_updated(&mut self, name: &'static str, value: u128) {
        info!(name, value, "parameter updated");
        self.emit(StakingEvent::ParameterUpdated { name, value });
    }

    // ========================================================================
    // Treasury
    // ========================================================================

    /// Send slashed collateral out of the treasury.
    pub fn withdraw_treasury(&mut self, caller: &Address, to: Address, amount: Amount) -> Result<()> {
        self.require_role(Role::Admin, caller)?;
        if to.is_zero() {
            return Err(StakingError::InvalidRecipient(to));
        }
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        if amount > self.treasury {
            return Err(StakingError::InsufficientFunds {
                available: self.treasury,
                requested: amount,
            });
        }
        self.ensure_custody_covers(amount)?;

        self.treasury -= amount;
        self.token.transfer(&self.custody, &to, amount)?;

        info!(to = %to, amount, "treasury withdrawn");
        self.emit(StakingEvent::TreasuryWithdrawn { to, amount });
        Ok(())
    }

    /// Collateral in custody that no book accounts for (e.g. sent there by
    /// mistake).
    pub fn recoverable_surplus(&self) -> Amount {
        let booked = self
            .escrow
            .saturating_add(self.treasury)
            .saturating_add(self.total_unclaimed_commission());
        self.token.balance_of(&self.custody).saturating_sub(booked)
    }

    /// Move unbooked custody collateral out. Only while paused.
    pub fn emergency_recover(&mut self, caller: &Address, to: Address, amount: Amount) -> Result<()> {
        self.require_role(Role::Admin, caller)?;
        if !self.access.is_paused() {
            return Err(StakingError::NotPaused);
        }
        if to.is_zero() {
            return Err(StakingError::InvalidRecipient(to));
        }
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let available = self.recoverable_surplus();
        if amount > available {
            return Err(StakingError::InsufficientFunds {
                available,
                requested: amount,
            });
        }

        self.token.transfer(&self.custody, &to, amount)?;

        warn!(to = %to, amount, "emergency recovery");
        self.emit(StakingEvent::EmergencyRecovered { to, amount });
        Ok(())
    }
}
