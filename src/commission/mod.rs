//! Per-prover commission rates and accrued commission.
//!
//! A prover sets a default rate and may override it per reward source. When
//! rewards arrive, the commission is booked to the prover's unclaimed balance
//! and the remainder becomes staker yield. Commission is never auto-paid.
//!
//! ## Example
//!
//! ```
//! use prover_staking::commission::CommissionLedger;
//! use prover_staking::types::Address;
//!
//! let marketplace = Address::from_low_u64(50);
//! let mut ledger = CommissionLedger::new(1_000).unwrap();
//! ledger.set_rate(marketplace, 2_500).unwrap();
//!
//! assert_eq!(ledger.split(1_000, &marketplace), Some((250, 750)));
//! assert_eq!(ledger.split(1_000, &Address::from_low_u64(51)), Some((100, 900)));
//! ```

use std::collections::BTreeMap;

use crate::error::{Result, StakingError};
use crate::types::amount::{bps_of, Amount, Bps, MAX_BPS};
use crate::types::Address;

/// Rate table as exposed to off-chain readers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionTable {
    pub default_bps: Bps,
    /// Source overrides in address order
    pub overrides: Vec<(Address, Bps)>,
}

#[derive(Debug, Clone)]
pub struct CommissionLedger {
    default_bps: Bps,
    overrides: BTreeMap<Address, Bps>,
    unclaimed: Amount,
}

fn check_rate(bps: Bps) -> Result<()> {
    if bps > MAX_BPS {
        return Err(StakingError::BpsOutOfRange { bps, max: MAX_BPS });
    }
    Ok(())
}

impl CommissionLedger {
    pub fn new(default_bps: Bps) -> Result<Self> {
        check_rate(default_bps)?;
        Ok(Self {
            default_bps,
            overrides: BTreeMap::new(),
            unclaimed: 0,
        })
    }

    #[inline]
    pub fn default_rate(&self) -> Bps {
        self.default_bps
    }

    /// Rate applied to rewards paid by `source`.
    pub fn rate_for(&self, source: &Address) -> Bps {
        self.overrides.get(source).copied().unwrap_or(self.default_bps)
    }

    #[inline]
    pub fn unclaimed(&self) -> Amount {
        self.unclaimed
    }

    pub fn table(&self) -> CommissionTable {
        CommissionTable {
            default_bps: self.default_bps,
            overrides: self.overrides.iter().map(|(a, b)| (*a, *b)).collect(),
        }
    }

    pub fn set_default(&mut self, bps: Bps) -> Result<()> {
        check_rate(bps)?;
        self.default_bps = bps;
        Ok(())
    }

    pub fn set_rate(&mut self, source: Address, bps: Bps) -> Result<()> {
        check_rate(bps)?;
        self.overrides.insert(source, bps);
        Ok(())
    }

    /// Drop the override for `source`. Returns `false` if there was none.
    pub fn reset_rate(&mut self, source: &Address) -> bool {
        self.overrides.remove(source).is_some()
    }

    /// Split `amount` into `(commission, remainder)` for `source`.
    pub fn split(&self, amount: Amount, source: &Address) -> Option<(Amount, Amount)> {
        let commission = bps_of(amount, self.rate_for(source))?;
        Some((commission, amount - commission))
    }

    /// Check that `commission` can be booked without overflow.
    pub fn check_accrue(&self, commission: Amount) -> Result<()> {
        self.unclaimed
            .checked_add(commission)
            .map(|_| ())
            .ok_or(StakingError::Overflow)
    }

    pub fn accrue(&mut self, commission: Amount) -> Result<()> {
        self.unclaimed = self
            .unclaimed
            .checked_add(commission)
            .ok_or(StakingError::Overflow)?;
        Ok(())
    }

    /// Zero the unclaimed balance and return what it was.
    pub fn take_unclaimed(&mut self) -> Amount {
        std::mem::take(&mut self.unclaimed)
    }
}
