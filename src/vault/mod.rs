//! Per-prover share vault.
//!
//! ## Accounting
//!
//! A vault tracks how many shares are outstanding, who holds them, and how
//! much collateral backs them. It does not move tokens itself: the
//! orchestrator pulls collateral into the vault's custody address before a
//! mint, and pays out of it after a burn or a slash.
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `total_shares` | Sum of all holder balances |
//! | `total_assets` | Collateral backing the shares |
//! | `balances` | Shares per holder |
//! | `allowances` | Shares a spender may move for an owner |
//!
//! ## Access
//!
//! Every mutating method is `pub(crate)`: only the orchestrator can mint,
//! burn, donate or seize. Each share movement runs a [`TransferHook`] before
//! and after the balances change.
//!
//! ## Example
//!
//! ```
//! use prover_staking::types::Address;
//! use prover_staking::vault::Vault;
//!
//! let vault = Vault::new(Address::from_low_u64(100), Address::from_low_u64(1));
//!
//! // an empty vault converts 1:1
//! assert_eq!(vault.convert_to_shares(500), Some(500));
//! assert_eq!(vault.convert_to_assets(500), Some(500));
//! assert_eq!(vault.max_withdraw(&Address::from_low_u64(1)), 0);
//! ```

mod hook;
mod shares;

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, StakingError};
use crate::types::{Address, Amount};

pub use hook::{NoopHook, ShareMove, TransferHook};
pub use shares::{assets_to_shares, shares_for_value, shares_to_assets};

/// Share ledger for a single prover.
#[derive(Debug, Clone)]
pub struct Vault {
    /// Custody address holding the collateral
    address: Address,

    /// Prover this vault belongs to
    prover: Address,

    /// Shares outstanding
    total_shares: u128,

    /// Collateral backing the shares (base units)
    total_assets: Amount,

    /// Holder -> shares
    balances: HashMap<Address, u128>,

    /// (owner, spender) -> shares
    allowances: HashMap<(Address, Address), u128>,
}

impl Vault {
    pub fn new(address: Address, prover: Address) -> Self {
        Self {
            address,
            prover,
            total_shares: 0,
            total_assets: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    #[inline]
    pub fn address(&self) -> Address {
        self.address
    }

    #[inline]
    pub fn prover(&self) -> Address {
        self.prover
    }

    #[inline]
    pub fn total_shares(&self) -> u128 {
        self.total_shares
    }

    #[inline]
    pub fn total_assets(&self) -> Amount {
        self.total_assets
    }

    pub fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    /// Shares minted for `assets` at the current rate.
    pub fn convert_to_shares(&self, assets: Amount) -> Option<u128> {
        assets_to_shares(assets, self.total_shares, self.total_assets)
    }

    /// Collateral redeemable for `shares` at the current rate.
    pub fn convert_to_assets(&self, shares: u128) -> Option<Amount> {
        shares_to_assets(shares, self.total_shares, self.total_assets)
    }

    /// Current collateral value of a holder's shares.
    pub fn value_of(&self, holder: &Address) -> Amount {
        self.convert_to_assets(self.balance_of(holder)).unwrap_or(0)
    }

    /// Withdrawals always go through the delayed queue, never directly.
    #[inline]
    pub fn max_withdraw(&self, _owner: &Address) -> Amount {
        0
    }

    /// See [`Vault::max_withdraw`].
    #[inline]
    pub fn max_redeem(&self, _owner: &Address) -> u128 {
        0
    }

    /// Sum of all holder balances. Equals `total_shares`.
    pub fn sum_of_balances(&self) -> u128 {
        self.balances.values().sum()
    }

    /// Number of addresses with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    // ========================================================================
    // Mutations (orchestrator only)
    // ========================================================================

    /// Shares a deposit of `assets` would mint, rejecting dust that rounds
    /// to zero.
    pub(crate) fn preview_deposit(&self, assets: Amount) -> Result<u128> {
        if assets == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let shares = self.convert_to_shares(assets).ok_or(StakingError::Overflow)?;
        if shares == 0 {
            return Err(StakingError::ZeroAmount);
        }
        // a holder's balance never exceeds the supply, so this bounds both
        self.total_shares
            .checked_add(shares)
            .ok_or(StakingError::Overflow)?;
        self.total_assets
            .checked_add(assets)
            .ok_or(StakingError::Overflow)?;
        Ok(shares)
    }

    /// Mint shares for collateral already transferred into custody.
    pub(crate) fn deposit<H: TransferHook>(
        &mut self,
        assets: Amount,
        receiver: Address,
        hook: &mut H,
    ) -> Result<u128> {
        let shares = self.preview_deposit(assets)?;
        let movement = ShareMove::mint(receiver, shares);
        hook.before_transfer(self, &movement)?;

        let balance = self.balance_of(&receiver);
        let (Some(balance), Some(total_shares), Some(total_assets)) = (
            balance.checked_add(shares),
            self.total_shares.checked_add(shares),
            self.total_assets.checked_add(assets),
        ) else {
            return Err(StakingError::Overflow);
        };
        self.balances.insert(receiver, balance);
        self.total_shares = total_shares;
        self.total_assets = total_assets;

        debug!(prover = %self.prover, receiver = %receiver, assets, shares, "minted shares");
        hook.after_transfer(self, &movement);
        Ok(shares)
    }

    /// Burn `shares` from `holder`, returning the collateral they were worth.
    ///
    /// The collateral stays in custody; the caller moves it out.
    pub(crate) fn burn<H: TransferHook>(
        &mut self,
        holder: Address,
        shares: u128,
        hook: &mut H,
    ) -> Result<Amount> {
        self.check_balance(&holder, shares)?;
        let assets = self.convert_to_assets(shares).ok_or(StakingError::Overflow)?;
        let movement = ShareMove::burn(holder, shares);
        hook.before_transfer(self, &movement)?;

        self.debit(&holder, shares);
        self.total_shares -= shares;
        // assets <= total_assets because shares <= total_shares
        self.total_assets -= assets;

        debug!(prover = %self.prover, holder = %holder, assets, shares, "burned shares");
        hook.after_transfer(self, &movement);
        Ok(assets)
    }

    pub(crate) fn transfer<H: TransferHook>(
        &mut self,
        from: Address,
        to: Address,
        shares: u128,
        hook: &mut H,
    ) -> Result<()> {
        if to.is_zero() {
            return Err(StakingError::InvalidRecipient(to));
        }
        if shares == 0 {
            return Err(StakingError::ZeroAmount);
        }
        self.check_balance(&from, shares)?;
        let movement = ShareMove::transfer(from, to, shares);
        hook.before_transfer(self, &movement)?;

        self.debit(&from, shares);
        *self.balances.entry(to).or_insert(0) += shares;

        debug!(prover = %self.prover, from = %from, to = %to, shares, "transferred shares");
        hook.after_transfer(self, &movement);
        Ok(())
    }

    pub(crate) fn approve(&mut self, owner: Address, spender: Address, shares: u128) -> Result<()> {
        if spender.is_zero() {
            return Err(StakingError::InvalidRecipient(spender));
        }
        if shares == 0 {
            self.allowances.remove(&(owner, spender));
        } else {
            self.allowances.insert((owner, spender), shares);
        }
        Ok(())
    }

    /// Move shares on behalf of `from`. An allowance of `u128::MAX` is never
    /// decremented.
    pub(crate) fn transfer_from<H: TransferHook>(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        shares: u128,
        hook: &mut H,
    ) -> Result<()> {
        let allowance = self.allowance(&from, &spender);
        if allowance < shares {
            return Err(StakingError::InsufficientAllowance {
                allowance,
                requested: shares,
            });
        }
        self.transfer(from, to, shares, hook)?;
        if allowance != u128::MAX {
            self.approve(from, spender, allowance - shares)?;
        }
        Ok(())
    }

    /// Add collateral without minting shares, raising the rate for every
    /// holder.
    pub(crate) fn donate(&mut self, assets: Amount) -> Result<()> {
        if self.total_shares == 0 {
            return Err(StakingError::NoSharesOutstanding(self.prover));
        }
        self.total_assets = self
            .total_assets
            .checked_add(assets)
            .ok_or(StakingError::Overflow)?;
        Ok(())
    }

    /// Remove up to `assets` of collateral without burning shares, lowering
    /// the rate for every holder. Returns the amount actually removed.
    pub(crate) fn seize(&mut self, assets: Amount) -> Amount {
        let seized = assets.min(self.total_assets);
        self.total_assets -= seized;
        seized
    }

    /// Collateral left behind once every share is gone (rounding dust).
    pub(crate) fn take_residual(&mut self) -> Amount {
        if self.total_shares != 0 {
            return 0;
        }
        std::mem::take(&mut self.total_assets)
    }

    fn check_balance(&self, holder: &Address, shares: u128) -> Result<()> {
        let available = self.balance_of(holder);
        if available < shares {
            return Err(StakingError::InsufficientShares {
                holder: *holder,
                available,
                requested: shares,
            });
        }
        Ok(())
    }

    fn debit(&mut self, holder: &Address, shares: u128) {
        if let Some(balance) = self.balances.get_mut(holder) {
            *balance -= shares;
            if *balance == 0 {
                self.balances.remove(holder);
            }
        }
    }
}
