//! Staking orchestrator.
//!
//! ## Architecture
//!
//! [`Staking`] is the only entry point. It owns the prover registry and, per
//! prover, a [`Vault`], a [`WithdrawalQueue`] and a [`CommissionLedger`]:
//!
//! - **Slab**: prover records, keyed by slot
//! - **HashMap**: prover address to slab key for O(1) lookup
//! - **IndexedSet**: live prover addresses, enumerable
//!
//! Collateral is moved through an injected [`CollateralToken`]. Stake lives
//! at each vault's custody address; queued withdrawals, the slashing
//! treasury and accrued commission live at the orchestrator's own custody
//! address.
//!
//! ## Atomicity
//!
//! Every operation takes `&mut self` and validates before it mutates:
//!
//! 1. access and pause checks
//! 2. preconditions on the prover record
//! 3. collateral pulls from the caller (may fail, nothing written yet)
//! 4. internal bookkeeping
//! 5. payouts from custody (pre-checked against custody balances)
//!
//! ## Example
//!
//! ```
//! use prover_staking::access::RoleRegistry;
//! use prover_staking::config::StakingConfig;
//! use prover_staking::staking::Staking;
//! use prover_staking::token::TokenBook;
//! use prover_staking::types::{Address, ProverProfile, ProverState};
//!
//! let admin = Address::from_low_u64(1);
//! let prover = Address::from_low_u64(2);
//!
//! let mut token = TokenBook::new();
//! token.mint(&prover, 1_000).unwrap();
//!
//! let config = StakingConfig::default().with_min_self_stake(100);
//! let mut staking = Staking::new(config, token, RoleRegistry::new(admin), Address::from_low_u64(99)).unwrap();
//!
//! staking
//!     .initialize_prover(prover, 100, 500, ProverProfile::new("p", "https://p.example"), 0)
//!     .unwrap();
//! assert_eq!(staking.prover(&prover).unwrap().state(), ProverState::Active);
//! assert_eq!(staking.self_stake_value(&prover), 100);
//! ```

mod admin;
mod hook;
mod lifecycle;
mod rewards;
mod slash;
mod stake;
mod views;

use std::collections::{HashMap, HashSet};

use slab::Slab;
use tracing::warn;

use crate::access::{AccessControl, Role, RoleRegistry};
use crate::commission::CommissionLedger;
use crate::config::StakingConfig;
use crate::error::{Result, StakingError};
use crate::factory::{DeterministicFactory, VaultFactory};
use crate::queue::WithdrawalQueue;
use crate::registry::IndexedSet;
use crate::token::CollateralToken;
use crate::types::{Address, Amount, ProverProfile, ProverSnapshot, ProverState, StakingEvent};
use crate::vault::Vault;

pub(crate) use hook::ProverHook;
pub use lifecycle::LifecycleAction;

/// Everything the ledger knows about one prover.
#[derive(Debug, Clone)]
pub struct ProverRecord {
    pub(crate) id: Address,
    pub(crate) state: ProverState,
    pub(crate) vault: Vault,
    pub(crate) queue: WithdrawalQueue,
    pub(crate) commission: CommissionLedger,
    pub(crate) stakers: IndexedSet<Address>,
    pub(crate) joined_at: u64,
    pub(crate) profile: ProverProfile,
}

impl ProverRecord {
    #[inline]
    pub fn id(&self) -> Address {
        self.id
    }

    #[inline]
    pub fn state(&self) -> ProverState {
        self.state
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn queue(&self) -> &WithdrawalQueue {
        &self.queue
    }

    pub fn commission(&self) -> &CommissionLedger {
        &self.commission
    }

    /// Addresses currently holding shares.
    pub fn stakers(&self) -> &[Address] {
        self.stakers.as_slice()
    }

    #[inline]
    pub fn joined_at(&self) -> u64 {
        self.joined_at
    }

    pub fn profile(&self) -> &ProverProfile {
        &self.profile
    }

    /// Current value of the prover's own shares.
    pub fn self_stake_value(&self) -> Amount {
        self.vault.value_of(&self.id)
    }

    /// SSZ summary committed to the state root.
    pub fn snapshot(&self) -> ProverSnapshot {
        ProverSnapshot {
            prover: self.id.to_word(),
            state_raw: self.state.to_u8(),
            total_shares: self.vault.total_shares(),
            total_assets: self.vault.total_assets(),
            scale: self.queue.scale(),
            scale_rebases: self.queue.rebases(),
            raw_outstanding: self.queue.raw_outstanding(),
            unclaimed_commission: self.commission.unclaimed(),
            staker_count: self.stakers.len() as u64,
        }
    }

    /// Run a vault mutation with this record's transfer hook attached.
    ///
    /// Returns the mutation's output and whether it deactivated the prover.
    pub(crate) fn with_hook<R>(
        &mut self,
        min_self_stake: Amount,
        f: impl FnOnce(&mut Vault, &mut ProverHook<'_>) -> Result<R>,
    ) -> Result<(R, bool)> {
        let mut hook = ProverHook::new(self.id, &mut self.state, &mut self.stakers, min_self_stake);
        let output = f(&mut self.vault, &mut hook)?;
        Ok((output, hook.deactivated()))
    }
}

/// The staking and slashing ledger.
pub struct Staking<T, A = RoleRegistry> {
    config: StakingConfig,
    token: T,
    access: A,
    factory: Box<dyn VaultFactory>,

    /// Holds escrowed withdrawals, the treasury and unclaimed commission
    custody: Address,

    /// Prover storage
    provers: Slab<ProverRecord>,

    /// Prover address -> slab key
    prover_index: HashMap<Address, usize>,

    /// Live provers, enumerable
    prover_ids: IndexedSet<Address>,

    /// Identities that retired and may never initialize again
    retired: HashSet<Address>,

    /// Slashed collateral awaiting `withdraw_treasury`
    treasury: Amount,

    /// Collateral backing pending withdrawals (recorded values)
    escrow: Amount,

    /// Event journal. Nothing trims it: embedders must call
    /// `drain_events` after each batch of operations.
    events: Vec<StakingEvent>,
}

impl<T: CollateralToken, A: AccessControl> Staking<T, A> {
    /// Create a ledger. Vault addresses are derived from `custody`.
    pub fn new(config: StakingConfig, token: T, access: A, custody: Address) -> Result<Self> {
        config.validate()?;
        if custody.is_zero() {
            return Err(StakingError::InvalidRecipient(custody));
        }
        Ok(Self {
            config,
            token,
            access,
            factory: Box::new(DeterministicFactory::new(custody)),
            custody,
            provers: Slab::new(),
            prover_index: HashMap::new(),
            prover_ids: IndexedSet::new(),
            retired: HashSet::new(),
            treasury: 0,
            escrow: 0,
            events: Vec::new(),
        })
    }

    /// Replace the vault factory. Only meaningful before the first prover
    /// is initialized.
    pub fn with_factory(mut self, factory: impl VaultFactory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    /// Mutable access control, for role management.
    pub fn access_mut(&mut self) -> &mut A {
        &mut self.access
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    #[inline]
    pub fn custody(&self) -> Address {
        self.custody
    }

    /// Events emitted since the last drain, oldest first.
    pub fn events(&self) -> &[StakingEvent] {
        &self.events
    }

    /// Take every event emitted since the last drain.
    ///
    /// The journal grows with every state change until this is called, so a
    /// long-running embedder has to drain it regularly.
    pub fn drain_events(&mut self) -> Vec<StakingEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Guards
    // ========================================================================

    fn ensure_not_paused(&self) -> Result<()> {
        if self.access.is_paused() {
            return Err(StakingError::Paused);
        }
        Ok(())
    }

    fn require_role(&self, role: Role, caller: &Address) -> Result<()> {
        if !self.access.has_role(role, caller) {
            return Err(StakingError::Unauthorized {
                caller: *caller,
                role,
            });
        }
        Ok(())
    }

    fn key_of(&self, prover: &Address) -> Result<usize> {
        self.prover_index
            .get(prover)
            .copied()
            .ok_or(StakingError::NotInitialized(*prover))
    }

    fn record(&self, prover: &Address) -> Result<&ProverRecord> {
        let key = self.key_of(prover)?;
        self.provers
            .get(key)
            .ok_or(StakingError::NotInitialized(*prover))
    }

    fn record_mut(&mut self, prover: &Address) -> Result<&mut ProverRecord> {
        let key = self.key_of(prover)?;
        self.provers
            .get_mut(key)
            .ok_or(StakingError::NotInitialized(*prover))
    }

    fn require_active(&self, prover: &Address) -> Result<&ProverRecord> {
        let record = self.record(prover)?;
        if !record.state.is_active() {
            return Err(StakingError::NotActive {
                prover: *prover,
                state: record.state,
            });
        }
        Ok(record)
    }

    /// Fail unless custody can cover a payout of `amount`.
    fn ensure_custody_covers(&self, amount: Amount) -> Result<()> {
        let available = self.token.balance_of(&self.custody);
        if available < amount {
            return Err(StakingError::InsufficientFunds {
                available,
                requested: amount,
            });
        }
        Ok(())
    }

    fn emit(&mut self, event: StakingEvent) {
        self.events.push(event);
    }

    /// Record a deactivation caused by a share movement or a slash.
    fn note_auto_deactivation(&mut self, prover: Address, reason: &'static str) {
        warn!(prover = %prover, reason, "prover deactivated");
        self.emit(StakingEvent::StateChanged {
            prover,
            from: ProverState::Active,
            to: ProverState::Deactivated,
        });
    }
}
