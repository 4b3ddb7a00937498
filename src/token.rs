//! Collateral token interface and an in-memory implementation.
//!
//! The ledger never holds balances for users itself; every movement of
//! collateral between a staker, a prover vault, and the orchestrator's custody
//! account goes through a [`CollateralToken`].

use std::collections::HashMap;

use thiserror::Error;

use crate::types::{Address, Amount};

/// Errors raised by a collateral token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("{holder} holds {available}, {requested} requested")]
    InsufficientBalance {
        holder: Address,
        available: Amount,
        requested: Amount,
    },

    #[error("token balance overflow")]
    Overflow,
}

/// Minimal fungible-token interface consumed by the ledger.
pub trait CollateralToken {
    /// Balance held by `holder`.
    fn balance_of(&self, holder: &Address) -> Amount;

    /// Move `amount` from `from` to `to`. Must be all-or-nothing.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError>;
}

/// HashMap-backed token ledger.
///
/// ## Example
///
/// ```
/// use prover_staking::token::{CollateralToken, TokenBook};
/// use prover_staking::types::Address;
///
/// let alice = Address::from_low_u64(1);
/// let bob = Address::from_low_u64(2);
///
/// let mut token = TokenBook::new();
/// token.mint(&alice, 100).unwrap();
/// token.transfer(&alice, &bob, 40).unwrap();
///
/// assert_eq!(token.balance_of(&alice), 60);
/// assert_eq!(token.balance_of(&bob), 40);
/// assert_eq!(token.total_supply(), 100);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TokenBook {
    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl TokenBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create new tokens out of thin air (faucet for tests and demos).
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let supply = self.total_supply.checked_add(amount).ok_or(TokenError::Overflow)?;
        let balance = self.balances.entry(*to).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        self.total_supply = supply;
        Ok(())
    }

    #[inline]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }
}

impl CollateralToken for TokenBook {
    fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<(), TokenError> {
        if amount == 0 || from == to {
            return Ok(());
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                holder: *from,
                available,
                requested: amount,
            });
        }
        let credited = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}
