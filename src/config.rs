//! Configuration for the staking ledger.
//!
//! ## Loading
//!
//! Every field has a default, so a JSON document only needs the fields it
//! overrides:
//!
//! ```
//! use prover_staking::config::StakingConfig;
//!
//! let config = StakingConfig::from_json_str(r#"{ "max_slash_bps": 2500 }"#).unwrap();
//! assert_eq!(config.max_slash_bps, 2500);
//! assert_eq!(config.max_pending_requests, 20);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::amount::{to_units, Amount, Bps, UNIT};

/// Hard ceiling for `max_slash_bps`.
///
/// A 100% slash would drive the withdrawal scale to zero, after which no
/// later snapshot could be divided by it.
pub const MAX_SLASH_BPS_CEILING: Bps = 9_999;

/// Default unbonding delay: 7 days.
pub const DEFAULT_UNSTAKE_DELAY: u64 = 7 * 24 * 60 * 60;

/// Default cap on simultaneously pending withdrawals per staker per prover.
pub const DEFAULT_MAX_PENDING_REQUESTS: usize = 20;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_slash_bps must be in 1..={MAX_SLASH_BPS_CEILING}, got {0}")]
    MaxSlashBps(Bps),

    #[error("max_pending_requests must be greater than zero")]
    ZeroPendingCap,

    #[error("invalid token amount `{0}`")]
    InvalidAmount(String),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Who may call `add_rewards`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardGating {
    /// Anyone may pay rewards; the caller is the reward source.
    #[default]
    Open,
    /// Only holders of `Role::RewardPayer`.
    Restricted,
}

/// Tunable parameters of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingConfig {
    /// Minimum value (base units) a prover must keep self-staked while
    /// holding any shares at all.
    pub min_self_stake: Amount,

    /// Upper bound on a single slash, in basis points.
    pub max_slash_bps: Bps,

    /// Seconds between `request_unstake` and the earliest completion.
    ///
    /// Changing it re-evaluates every outstanding request.
    pub unstake_delay: u64,

    /// Maximum pending withdrawals per (staker, prover).
    pub max_pending_requests: usize,

    /// Reward-payer gating.
    pub reward_gating: RewardGating,
}

impl Default for StakingConfig {
    fn default() -> Self {
        Self {
            min_self_stake: 100 * UNIT,
            max_slash_bps: 5_000,
            unstake_delay: DEFAULT_UNSTAKE_DELAY,
            max_pending_requests: DEFAULT_MAX_PENDING_REQUESTS,
            reward_gating: RewardGating::Open,
        }
    }
}

impl StakingConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: StakingConfig =
            serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Check every bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_max_slash_bps(self.max_slash_bps)?;
        if self.max_pending_requests == 0 {
            return Err(ConfigError::ZeroPendingCap);
        }
        Ok(())
    }

    pub fn with_min_self_stake(mut self, min_self_stake: Amount) -> Self {
        self.min_self_stake = min_self_stake;
        self
    }

    /// Set the minimum self-stake from a human-readable token amount
    /// (e.g. `"100.5"`).
    pub fn with_min_self_stake_tokens(self, tokens: &str) -> Result<Self, ConfigError> {
        let units = to_units(tokens).ok_or_else(|| ConfigError::InvalidAmount(tokens.to_string()))?;
        Ok(self.with_min_self_stake(units))
    }

    pub fn with_max_slash_bps(mut self, max_slash_bps: Bps) -> Self {
        self.max_slash_bps = max_slash_bps;
        self
    }

    pub fn with_unstake_delay(mut self, unstake_delay: u64) -> Self {
        self.unstake_delay = unstake_delay;
        self
    }

    pub fn with_max_pending_requests(mut self, max_pending_requests: usize) -> Self {
        self.max_pending_requests = max_pending_requests;
        self
    }

    pub fn with_reward_gating(mut self, reward_gating: RewardGating) -> Self {
        self.reward_gating = reward_gating;
        self
    }
}

pub(crate) fn validate_max_slash_bps(bps: Bps) -> Result<(), ConfigError> {
    if bps == 0 || bps > MAX_SLASH_BPS_CEILING {
        return Err(ConfigError::MaxSlashBps(bps));
    }
    Ok(())
}
