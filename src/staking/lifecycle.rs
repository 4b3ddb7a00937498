//! Prover lifecycle: initialization, self-service, admin transitions,
//! retirement.

use tracing::info;

use crate::access::{AccessControl, Role};
use crate::commission::CommissionLedger;
use crate::error::{Result, StakingError};
use crate::queue::WithdrawalQueue;
use crate::registry::IndexedSet;
use crate::staking::{ProverRecord, Staking};
use crate::token::CollateralToken;
use crate::types::amount::MAX_BPS;
use crate::types::{Address, Amount, Bps, ProverProfile, ProverState, StakingEvent};
use crate::vault::Vault;

/// Administrative state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Deactivated -> Active (self-stake must meet the minimum)
    Activate,
    /// Active -> Deactivated
    Deactivate,
    /// Active | Deactivated -> Jailed
    Jail,
    /// Jailed -> Active (self-stake must meet the minimum)
    Unjail,
    /// Any live state -> removed (no shares, no pending withdrawals)
    Retire,
}

impl LifecycleAction {
    fn target(self) -> ProverState {
        match self {
            LifecycleAction::Activate | LifecycleAction::Unjail => ProverState::Active,
            LifecycleAction::Deactivate => ProverState::Deactivated,
            LifecycleAction::Jail => ProverState::Jailed,
            LifecycleAction::Retire => ProverState::Null,
        }
    }
}

impl<T: CollateralToken, A: AccessControl> Staking<T, A> {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Register `caller` as a prover with an initial self-stake.
    ///
    /// The vault address is derived by the factory and the prover starts
    /// Active. An identity can be initialized exactly once, retirement
    /// included.
    pub fn initialize_prover(
        &mut self,
        caller: Address,
        self_stake: Amount,
        default_commission_bps: Bps,
        profile: ProverProfile,
        now: u64,
    ) -> Result<Address> {
        self.ensure_not_paused()?;
        if caller.is_zero() {
            return Err(StakingError::InvalidRecipient(caller));
        }
        if self.prover_index.contains_key(&caller) || self.retired.contains(&caller) {
            return Err(StakingError::AlreadyInitialized(caller));
        }
        if default_commission_bps > MAX_BPS {
            return Err(StakingError::BpsOutOfRange {
                bps: default_commission_bps,
                max: MAX_BPS,
            });
        }
        if let Some(field) = profile.oversized_field() {
            return Err(StakingError::ProfileTooLong(field));
        }
        let minimum = self.config.min_self_stake;
        if self_stake < minimum {
            return Err(StakingError::BelowMinSelfStake {
                value: self_stake,
                minimum,
            });
        }

        let vault_address = self.factory.vault_address(&caller);
        let vault = Vault::new(vault_address, caller);
        if self_stake > 0 {
            vault.preview_deposit(self_stake)?;
            self.token.transfer(&caller, &vault_address, self_stake)?;
        }

        let mut record = ProverRecord {
            id: caller,
            state: ProverState::Active,
            vault,
            queue: WithdrawalQueue::new(),
            commission: CommissionLedger::new(default_commission_bps)?,
            stakers: IndexedSet::new(),
            joined_at: now,
            profile,
        };
        if self_stake > 0 {
            record.with_hook(minimum, |vault, hook| vault.deposit(self_stake, caller, hook))?;
        }

        let key = self.provers.insert(record);
        self.prover_index.insert(caller, key);
        self.prover_ids.insert(caller);

        info!(
            prover = %caller,
            vault = %vault_address,
            self_stake,
            commission_bps = default_commission_bps,
            "prover initialized"
        );
        self.emit(StakingEvent::ProverInitialized {
            prover: caller,
            vault: vault_address,
            self_stake,
            default_commission_bps,
        });
        Ok(vault_address)
    }

    /// Replace the caller's profile metadata.
    pub fn set_profile(&mut self, caller: Address, profile: ProverProfile) -> Result<()> {
        self.ensure_not_paused()?;
        if let Some(field) = profile.oversized_field() {
            return Err(StakingError::ProfileTooLong(field));
        }
        self.record_mut(&caller)?.profile = profile;
        self.emit(StakingEvent::ProfileUpdated { prover: caller });
        Ok(())
    }

    // ========================================================================
    // Self-service
    // ========================================================================

    /// Active -> Deactivated, at the prover's own request.
    pub fn deactivate_self(&mut self, caller: Address) -> Result<()> {
        self.ensure_not_paused()?;
        let state = self.record(&caller)?.state;
        match state {
            ProverState::Active => {
                self.set_state(caller, ProverState::Deactivated)?;
                Ok(())
            }
            ProverState::Jailed => Err(StakingError::Jailed(caller)),
            _ => Err(StakingError::InvalidTransition {
                prover: caller,
                from: state,
                to: ProverState::Deactivated,
            }),
        }
    }

    /// Deactivated -> Active. Never leaves jail.
    pub fn reactivate_self(&mut self, caller: Address) -> Result<()> {
        self.ensure_not_paused()?;
        let record = self.record(&caller)?;
        let state = record.state;
        match state {
            ProverState::Deactivated => {
                self.check_self_stake(record)?;
                self.set_state(caller, ProverState::Active)?;
                Ok(())
            }
            ProverState::Jailed => Err(StakingError::Jailed(caller)),
            _ => Err(StakingError::InvalidTransition {
                prover: caller,
                from: state,
                to: ProverState::Active,
            }),
        }
    }

    // ========================================================================
    // Admin transitions
    // ========================================================================

    pub fn admin_activate(&mut self, caller: &Address, prover: Address) -> Result<()> {
        self.admin_lifecycle(caller, LifecycleAction::Activate, &[prover])
    }

    pub fn admin_deactivate(&mut self, caller: &Address, prover: Address) -> Result<()> {
        self.admin_lifecycle(caller, LifecycleAction::Deactivate, &[prover])
    }

    pub fn admin_jail(&mut self, caller: &Address, prover: Address) -> Result<()> {
        self.admin_lifecycle(caller, LifecycleAction::Jail, &[prover])
    }

    pub fn admin_unjail(&mut self, caller: &Address, prover: Address) -> Result<()> {
        self.admin_lifecycle(caller, LifecycleAction::Unjail, &[prover])
    }

    pub fn admin_retire(&mut self, caller: &Address, prover: Address) -> Result<()> {
        self.admin_lifecycle(caller, LifecycleAction::Retire, &[prover])
    }

    /// Apply one transition to a batch of provers.
    ///
    /// Every target is validated first; if any fails, none is touched.
    /// Allowed while paused.
    pub fn admin_lifecycle(
        &mut self,
        caller: &Address,
        action: LifecycleAction,
        provers: &[Address],
    ) -> Result<()> {
        self.require_role(Role::Admin, caller)?;

        let mut seen = IndexedSet::new();
        for prover in provers {
            if !seen.insert(*prover) {
                return Err(StakingError::DuplicateTarget(*prover));
            }
            self.check_transition(prover, action)?;
        }
        if action == LifecycleAction::Retire {
            let payout: Amount = provers
                .iter()
                .filter_map(|p| self.record(p).ok())
                .map(|r| r.commission.unclaimed())
                .sum();
            self.ensure_custody_covers(payout)?;
        }

        for prover in provers {
            if action == LifecycleAction::Retire {
                self.retire(*prover)?;
            } else {
                self.set_state(*prover, action.target())?;
            }
        }
        info!(by = %caller, action = ?action, count = provers.len(), "admin lifecycle applied");
        Ok(())
    }

    fn check_transition(&self, prover: &Address, action: LifecycleAction) -> Result<()> {
        let record = self.record(prover)?;
        let from = record.state;
        let invalid = || StakingError::InvalidTransition {
            prover: *prover,
            from,
            to: action.target(),
        };

        match action {
            LifecycleAction::Activate => {
                if from != ProverState::Deactivated {
                    return Err(invalid());
                }
                self.check_self_stake(record)
            }
            LifecycleAction::Deactivate => {
                if from != ProverState::Active {
                    return Err(invalid());
                }
                Ok(())
            }
            LifecycleAction::Jail => {
                if from == ProverState::Jailed {
                    return Err(invalid());
                }
                Ok(())
            }
            LifecycleAction::Unjail => {
                if from != ProverState::Jailed {
                    return Err(invalid());
                }
                self.check_self_stake(record)
            }
            LifecycleAction::Retire => {
                if record.vault.total_shares() > 0 {
                    return Err(StakingError::CollateralRemaining {
                        prover: *prover,
                        collateral: record.vault.total_assets(),
                    });
                }
                if !record.queue.is_empty() {
                    return Err(StakingError::PendingWithdrawals {
                        prover: *prover,
                        outstanding: record.queue.raw_outstanding(),
                    });
                }
                Ok(())
            }
        }
    }

    fn check_self_stake(&self, record: &ProverRecord) -> Result<()> {
        let value = record.self_stake_value();
        let minimum = self.config.min_self_stake;
        if value < minimum {
            return Err(StakingError::BelowMinSelfStake { value, minimum });
        }
        Ok(())
    }

    fn set_state(&mut self, prover: Address, to: ProverState) -> Result<()> {
        let record = self.record_mut(&prover)?;
        let from = std::mem::replace(&mut record.state, to);
        info!(prover = %prover, from = ?from, to = ?to, "prover state changed");
        self.emit(StakingEvent::StateChanged { prover, from, to });
        Ok(())
    }

    /// Remove a prover that has no shares and nothing queued.
    ///
    /// Rounding dust left in the vault goes to the treasury and unclaimed
    /// commission is paid out to the prover.
    fn retire(&mut self, prover: Address) -> Result<()> {
        let key = self.key_of(&prover)?;
        let record = self.record_mut(&prover)?;
        let vault_address = record.vault.address();
        let residual = record.vault.take_residual();
        let commission = record.commission.take_unclaimed();

        self.provers.remove(key);
        self.prover_index.remove(&prover);
        self.prover_ids.remove(&prover);
        self.retired.insert(prover);
        self.treasury += residual;

        self.token.transfer(&vault_address, &self.custody, residual)?;
        self.token.transfer(&self.custody, &prover, commission)?;

        info!(prover = %prover, residual, commission, "prover retired");
        if commission > 0 {
            self.emit(StakingEvent::CommissionClaimed {
                prover,
                amount: commission,
            });
        }
        self.emit(StakingEvent::ProverRetired { prover });
        Ok(())
    }
}
