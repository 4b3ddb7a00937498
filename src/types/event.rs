//! Journal entries emitted by successful ledger mutations.

use crate::types::amount::{Amount, Bps};
use crate::types::{Address, ProverState};

/// One successful state change, in emission order.
///
/// Events are appended to the orchestrator's journal and can be drained by
/// an off-chain indexer with `Staking::drain_events`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakingEvent {
    ProverInitialized {
        prover: Address,
        vault: Address,
        self_stake: Amount,
        default_commission_bps: Bps,
    },
    ProfileUpdated {
        prover: Address,
    },
    StateChanged {
        prover: Address,
        from: ProverState,
        to: ProverState,
    },
    ProverRetired {
        prover: Address,
    },
    Staked {
        prover: Address,
        staker: Address,
        amount: Amount,
        shares: u128,
    },
    SharesTransferred {
        prover: Address,
        from: Address,
        to: Address,
        shares: u128,
    },
    SharesApproved {
        prover: Address,
        owner: Address,
        spender: Address,
        shares: u128,
    },
    UnstakeRequested {
        prover: Address,
        staker: Address,
        shares: u128,
        value: Amount,
        requested_at: u64,
    },
    UnstakeCompleted {
        prover: Address,
        staker: Address,
        requests: usize,
        paid: Amount,
        shortfall: Amount,
    },
    Slashed {
        prover: Address,
        bps: Bps,
        active: Amount,
        pending: Amount,
    },
    RewardsAdded {
        prover: Address,
        source: Address,
        commission: Amount,
        to_stakers: Amount,
    },
    CommissionClaimed {
        prover: Address,
        amount: Amount,
    },
    CommissionRateSet {
        prover: Address,
        /// `None` for the default rate
        source: Option<Address>,
        bps: Bps,
    },
    CommissionRateReset {
        prover: Address,
        source: Address,
    },
    ParameterUpdated {
        name: &'static str,
        value: u128,
    },
    TreasuryWithdrawn {
        to: Address,
        amount: Amount,
    },
    EmergencyRecovered {
        to: Address,
        amount: Amount,
    },
}

impl StakingEvent {
    /// Prover the event concerns, if any.
    pub fn prover(&self) -> Option<Address> {
        match self {
            StakingEvent::ProverInitialized { prover, .. }
            | StakingEvent::ProfileUpdated { prover }
            | StakingEvent::StateChanged { prover, .. }
            | StakingEvent::ProverRetired { prover }
            | StakingEvent::Staked { prover, .. }
            | StakingEvent::SharesTransferred { prover, .. }
            | StakingEvent::SharesApproved { prover, .. }
            | StakingEvent::UnstakeRequested { prover, .. }
            | StakingEvent::UnstakeCompleted { prover, .. }
            | StakingEvent::Slashed { prover, .. }
            | StakingEvent::RewardsAdded { prover, .. }
            | StakingEvent::CommissionClaimed { prover, .. }
            | StakingEvent::CommissionRateSet { prover, .. }
            | StakingEvent::CommissionRateReset { prover, .. } => Some(*prover),
            StakingEvent::ParameterUpdated { .. }
            | StakingEvent::TreasuryWithdrawn { .. }
            | StakingEvent::EmergencyRecovered { .. } => None,
        }
    }
}
