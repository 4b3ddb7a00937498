//! # Prover Staking
//!
//! Staking and slashing ledger for compute-proof providers.
//!
//! ## Architecture
//!
//! The ledger consists of:
//! - **Types**: Core data structures (WithdrawalRequest, ProverSnapshot, SlashReceipt)
//! - **Vault**: Per-prover share accounting with a transfer hook
//! - **Queue**: Delayed withdrawals with O(1) multiplicative slashing
//! - **Commission**: Per-source commission rates and accrued balances
//! - **Staking**: The orchestrator every caller goes through
//!
//! ## Design Principles
//!
//! 1. **Determinism**: All operations produce identical results for identical inputs
//! 2. **No Floating Point**: All math is truncating u128 integer math (18 decimals, bps rates)
//! 3. **Validate, Then Mutate**: A failed operation leaves the ledger untouched
//! 4. **O(1) Slashing**: Slash cost does not depend on how many withdrawals are queued
//!    or how many provers exist
//!
//! ## Quick Start
//!
//! ```
//! use prover_staking::{RoleRegistry, Staking, StakingConfig, TokenBook};
//! use prover_staking::access::Role;
//! use prover_staking::types::{Address, ProverProfile};
//!
//! let admin = Address::from_low_u64(1);
//! let prover = Address::from_low_u64(2);
//! let staker = Address::from_low_u64(3);
//!
//! let mut token = TokenBook::new();
//! token.mint(&prover, 100).unwrap();
//! token.mint(&staker, 500).unwrap();
//!
//! let config = StakingConfig::default().with_min_self_stake(100);
//! let mut roles = RoleRegistry::new(admin);
//! roles.grant_role(&admin, Role::Slasher, admin).unwrap();
//!
//! let mut staking = Staking::new(config, token, roles, Address::from_low_u64(99)).unwrap();
//! staking.initialize_prover(prover, 100, 0, ProverProfile::default(), 0).unwrap();
//! staking.stake(staker, prover, 500).unwrap();
//!
//! let receipt = staking.slash(&admin, prover, 2_000).unwrap();
//! assert_eq!(receipt.active_slashed, 120);
//! assert!(receipt.deactivated);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: WithdrawalRequest, ProverSnapshot, SlashReceipt, events
pub mod types;

/// Error taxonomy
pub mod error;

/// Tunable parameters
pub mod config;

/// Enumerable set used for registries
pub mod registry;

/// Roles and pausability
pub mod access;

/// Collateral token interface
pub mod token;

/// Deterministic vault addresses
pub mod factory;

/// Per-prover share ledger
pub mod vault;

/// Delayed withdrawal queue
pub mod queue;

/// Commission rates and accruals
pub mod commission;

/// Orchestrator
pub mod staking;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use access::{AccessControl, Role, RoleRegistry};
pub use config::{RewardGating, StakingConfig};
pub use error::{Result, StakingError};
pub use staking::{LifecycleAction, ProverRecord, Staking};
pub use token::{CollateralToken, TokenBook};
pub use types::{Address, ProverState, SlashReceipt, StakingEvent, WithdrawalRequest};
