//! Transfer hook enforcing per-prover share rules.

use crate::error::{Result, StakingError};
use crate::registry::IndexedSet;
use crate::types::{Address, Amount, ProverState};
use crate::vault::{ShareMove, TransferHook, Vault};

/// Bound to one prover record for the duration of a single vault call.
///
/// Before a movement out of the prover's own balance:
/// - a jailed prover may not move shares at all
/// - whatever remains must be worth at least `min_self_stake`, or nothing
///
/// After any movement the staker set is brought in line with the balances,
/// and an active prover whose own balance reached zero is deactivated.
pub(crate) struct ProverHook<'a> {
    prover: Address,
    state: &'a mut ProverState,
    stakers: &'a mut IndexedSet<Address>,
    min_self_stake: Amount,
    deactivated: bool,
}

impl<'a> ProverHook<'a> {
    pub(crate) fn new(
        prover: Address,
        state: &'a mut ProverState,
        stakers: &'a mut IndexedSet<Address>,
        min_self_stake: Amount,
    ) -> Self {
        Self {
            prover,
            state,
            stakers,
            min_self_stake,
            deactivated: false,
        }
    }

    /// True if the movement flipped the prover to Deactivated.
    pub(crate) fn deactivated(&self) -> bool {
        self.deactivated
    }
}

impl TransferHook for ProverHook<'_> {
    fn before_transfer(&mut self, vault: &Vault, movement: &ShareMove) -> Result<()> {
        if movement.from != Some(self.prover) {
            return Ok(());
        }
        if *self.state == ProverState::Jailed {
            return Err(StakingError::SharesLocked {
                requested: movement.shares,
                transferable: 0,
            });
        }

        let remaining = vault
            .balance_of(&self.prover)
            .saturating_sub(movement.shares);
        if remaining == 0 {
            return Ok(());
        }
        let value = vault
            .convert_to_assets(remaining)
            .ok_or(StakingError::Overflow)?;
        if value < self.min_self_stake {
            return Err(StakingError::BelowMinSelfStake {
                value,
                minimum: self.min_self_stake,
            });
        }
        Ok(())
    }

    fn after_transfer(&mut self, vault: &Vault, movement: &ShareMove) {
        if let Some(from) = movement.from {
            if vault.balance_of(&from) == 0 {
                self.stakers.remove(&from);
            }
        }
        if let Some(to) = movement.to {
            if vault.balance_of(&to) > 0 {
                self.stakers.insert(to);
            }
        }

        if movement.from == Some(self.prover)
            && vault.balance_of(&self.prover) == 0
            && *self.state == ProverState::Active
        {
            *self.state = ProverState::Deactivated;
            self.deactivated = true;
        }
    }
}
