//! Core data types for the prover staking ledger
//!
//! Types that are committed to the state root implement SSZ serialization
//! for deterministic encoding. All amounts are `u128` base units with
//! 18 decimals; all rates are basis points.
//!
//! ## Types
//!
//! - [`Address`]: 20-byte account identity
//! - [`ProverState`]: Null / Active / Deactivated / Jailed
//! - [`ProverProfile`]: Cosmetic prover metadata
//! - [`WithdrawalRequest`]: A pending unbonding request with its scale snapshot
//! - [`ProverSnapshot`]: Per-prover summary hashed into the state root
//! - [`SlashReceipt`]: Result of one slashing event
//! - [`StakingEvent`]: Journal entry for every successful mutation

mod address;
mod event;
mod receipt;
mod request;
mod state;
pub mod amount;

// Re-export all types at module level
pub use address::Address;
pub use amount::{Amount, Bps};
pub use event::StakingEvent;
pub use receipt::{compute_hash, ProverSnapshot, SlashReceipt};
pub use request::WithdrawalRequest;
pub use state::{ProverProfile, ProverState, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_WEBSITE_LEN};
