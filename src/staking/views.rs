//! Read-only views for off-chain consumers and the marketplace.

use crate::access::AccessControl;
use crate::commission::CommissionTable;
use crate::config::StakingConfig;
use crate::error::Result;
use crate::queue::PendingSummary;
use crate::staking::{ProverRecord, Staking};
use crate::token::CollateralToken;
use crate::types::{compute_hash, Address, Amount, ProverSnapshot, ProverState, WithdrawalRequest};
use crate::vault::shares_for_value;

impl<T: CollateralToken, A: AccessControl> Staking<T, A> {
    pub fn config(&self) -> &StakingConfig {
        &self.config
    }

    /// Live provers, in registration order until the first retirement.
    pub fn prover_ids(&self) -> &[Address] {
        self.prover_ids.as_slice()
    }

    pub fn prover(&self, prover: &Address) -> Option<&ProverRecord> {
        self.record(prover).ok()
    }

    pub fn is_retired(&self, prover: &Address) -> bool {
        self.retired.contains(prover)
    }

    pub fn stakers(&self, prover: &Address) -> &[Address] {
        self.prover(prover).map(|r| r.stakers()).unwrap_or(&[])
    }

    pub fn share_balance(&self, prover: &Address, holder: &Address) -> u128 {
        self.prover(prover)
            .map(|r| r.vault.balance_of(holder))
            .unwrap_or(0)
    }

    /// Current collateral value of `holder`'s shares.
    pub fn value_of(&self, prover: &Address, holder: &Address) -> Amount {
        self.prover(prover)
            .map(|r| r.vault.value_of(holder))
            .unwrap_or(0)
    }

    pub fn self_stake_value(&self, prover: &Address) -> Amount {
        self.prover(prover)
            .map(|r| r.self_stake_value())
            .unwrap_or(0)
    }

    /// Largest partial amount `holder` may move right now.
    ///
    /// For the prover's own balance this keeps the minimum self-stake in
    /// place. Moving the entire balance is allowed regardless unless the
    /// prover is jailed.
    pub fn transferable_shares(&self, prover: &Address, holder: &Address) -> u128 {
        let Some(record) = self.prover(prover) else {
            return 0;
        };
        let balance = record.vault.balance_of(holder);
        if holder != prover {
            return balance;
        }
        if record.state == ProverState::Jailed {
            return 0;
        }
        let keep = shares_for_value(
            self.config.min_self_stake,
            record.vault.total_shares(),
            record.vault.total_assets(),
        )
        .unwrap_or(u128::MAX);
        balance.saturating_sub(keep)
    }

    pub fn pending_requests(&self, prover: &Address, staker: &Address) -> &[WithdrawalRequest] {
        self.prover(prover)
            .map(|r| r.queue.requests(staker))
            .unwrap_or(&[])
    }

    pub fn pending_summary(&self, prover: &Address, staker: &Address, now: u64) -> PendingSummary {
        self.prover(prover)
            .map(|r| r.queue.summary(staker, self.config.unstake_delay, now))
            .unwrap_or_default()
    }

    /// Scale mantissa of the prover's withdrawal queue.
    pub fn slashing_scale(&self, prover: &Address) -> Option<u128> {
        self.prover(prover).map(|r| r.queue.scale())
    }

    /// Times the prover's scale mantissa has been rebased.
    pub fn slashing_rebases(&self, prover: &Address) -> Option<u32> {
        self.prover(prover).map(|r| r.queue.rebases())
    }

    pub fn commission_table(&self, prover: &Address) -> Option<CommissionTable> {
        self.prover(prover).map(|r| r.commission.table())
    }

    pub fn unclaimed_commission(&self, prover: &Address) -> Amount {
        self.prover(prover)
            .map(|r| r.commission.unclaimed())
            .unwrap_or(0)
    }

    /// Sum of unclaimed commission across live provers.
    pub fn total_unclaimed_commission(&self) -> Amount {
        self.provers.iter().map(|(_, r)| r.commission.unclaimed()).sum()
    }

    /// Zero unless the prover is Active.
    pub fn max_deposit(&self, prover: &Address) -> Amount {
        match self.prover(prover) {
            Some(r) if r.state.is_active() => u128::MAX - r.vault.total_assets(),
            _ => 0,
        }
    }

    /// Always zero: withdrawals go through the queue.
    pub fn max_withdraw(&self, prover: &Address, holder: &Address) -> Amount {
        self.prover(prover)
            .map(|r| r.vault.max_withdraw(holder))
            .unwrap_or(0)
    }

    #[inline]
    pub fn treasury_balance(&self) -> Amount {
        self.treasury
    }

    #[inline]
    pub fn escrow_balance(&self) -> Amount {
        self.escrow
    }

    /// Marketplace eligibility: `(Active && collateral >= min_value, collateral)`.
    ///
    /// Pending withdrawals never count.
    pub fn is_prover_eligible(&self, prover: &Address, min_value: Amount) -> (bool, Amount) {
        match self.prover(prover) {
            Some(r) => {
                let collateral = r.vault.total_assets();
                (r.state.is_active() && collateral >= min_value, collateral)
            }
            None => (false, 0),
        }
    }

    pub fn snapshot(&self, prover: &Address) -> Option<ProverSnapshot> {
        self.prover(prover).map(|r| r.snapshot())
    }

    /// SHA-256 over the SSZ encoding of every prover snapshot, in address
    /// order.
    pub fn state_root(&self) -> Result<[u8; 32]> {
        let mut ids: Vec<Address> = self.prover_ids.iter().copied().collect();
        ids.sort();

        let mut data = Vec::with_capacity(ids.len() * 125);
        for id in &ids {
            if let Some(record) = self.prover(id) {
                data.extend_from_slice(&record.snapshot().encode()?);
            }
        }
        Ok(compute_hash(&data))
    }

    pub fn state_root_hex(&self) -> Result<String> {
        Ok(hex::encode(self.state_root()?))
    }
}
