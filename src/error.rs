//! Error types for the staking ledger.
//!
//! Every failure is synchronous and leaves the ledger untouched; the caller
//! corrects the input and resubmits.

use thiserror::Error;

use crate::access::Role;
use crate::config::ConfigError;
use crate::token::TokenError;
use crate::types::{Address, Amount, Bps, ProverState};

/// Errors returned by staking operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StakingError {
    // ------------------------------------------------------------------
    // Authorization
    // ------------------------------------------------------------------
    /// Caller lacks the capability required by the operation.
    #[error("{caller} is missing role {role:?}")]
    Unauthorized { caller: Address, role: Role },

    // ------------------------------------------------------------------
    // State preconditions
    // ------------------------------------------------------------------
    #[error("prover {0} is not initialized")]
    NotInitialized(Address),

    #[error("prover {0} is already initialized")]
    AlreadyInitialized(Address),

    #[error("prover {prover} is {state:?}, expected Active")]
    NotActive { prover: Address, state: ProverState },

    #[error("prover {0} is jailed")]
    Jailed(Address),

    #[error("prover {prover} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        prover: Address,
        from: ProverState,
        to: ProverState,
    },

    #[error("prover {0} appears more than once in the batch")]
    DuplicateTarget(Address),

    #[error("ledger is paused")]
    Paused,

    #[error("ledger is not paused")]
    NotPaused,

    // ------------------------------------------------------------------
    // Invariant violations
    // ------------------------------------------------------------------
    /// Self-stake would end strictly between zero and the minimum.
    #[error("self-stake {value} is below the minimum {minimum}")]
    BelowMinSelfStake { value: Amount, minimum: Amount },

    /// Share movement exceeds what the holder may currently transfer.
    #[error("requested {requested} shares but only {transferable} are transferable")]
    SharesLocked { requested: u128, transferable: u128 },

    #[error("holder {holder} has {available} shares, {requested} requested")]
    InsufficientShares {
        holder: Address,
        available: u128,
        requested: u128,
    },

    #[error("allowance of {allowance} shares is below {requested}")]
    InsufficientAllowance { allowance: u128, requested: u128 },

    #[error("{staker} already has {pending} pending withdrawals (max {max})")]
    TooManyPendingRequests {
        staker: Address,
        pending: usize,
        max: usize,
    },

    /// Donation into a ledger with no shareholders.
    #[error("ledger of prover {0} has no shares outstanding")]
    NoSharesOutstanding(Address),

    #[error("prover {prover} still custodies {collateral} collateral")]
    CollateralRemaining { prover: Address, collateral: Amount },

    #[error("prover {prover} still has {outstanding} pending withdrawals")]
    PendingWithdrawals { prover: Address, outstanding: Amount },

    #[error("requested {requested} but only {available} is available")]
    InsufficientFunds { available: Amount, requested: Amount },

    #[error("profile field `{0}` is too long")]
    ProfileTooLong(&'static str),

    // ------------------------------------------------------------------
    // Not ready
    // ------------------------------------------------------------------
    #[error("no withdrawal of {staker} has matured yet (next at {next_maturity:?})")]
    NotReady {
        staker: Address,
        next_maturity: Option<u64>,
    },

    // ------------------------------------------------------------------
    // Configuration bounds
    // ------------------------------------------------------------------
    #[error("{bps} bps is out of range (max {max})")]
    BpsOutOfRange { bps: Bps, max: Bps },

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("invalid recipient {0}")]
    InvalidRecipient(Address),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("ssz encoding failed: {0}")]
    Encoding(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StakingError>;
