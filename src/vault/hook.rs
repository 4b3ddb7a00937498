//! Callback invoked by the vault around every share movement.

use crate::error::Result;
use crate::types::Address;
use crate::vault::Vault;

/// One share movement. `from == None` is a mint, `to == None` a burn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShareMove {
    pub from: Option<Address>,
    pub to: Option<Address>,
    pub shares: u128,
}

impl ShareMove {
    pub fn mint(to: Address, shares: u128) -> Self {
        Self {
            from: None,
            to: Some(to),
            shares,
        }
    }

    pub fn burn(from: Address, shares: u128) -> Self {
        Self {
            from: Some(from),
            to: None,
            shares,
        }
    }

    pub fn transfer(from: Address, to: Address, shares: u128) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            shares,
        }
    }
}

/// Observer of share movements.
///
/// `before_transfer` sees the vault as it was and may veto the movement;
/// nothing has been written when it runs. `after_transfer` sees the vault
/// after the movement and cannot fail.
pub trait TransferHook {
    fn before_transfer(&mut self, vault: &Vault, movement: &ShareMove) -> Result<()>;
    fn after_transfer(&mut self, vault: &Vault, movement: &ShareMove);
}

/// Hook that accepts every movement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl TransferHook for NoopHook {
    fn before_transfer(&mut self, _vault: &Vault, _movement: &ShareMove) -> Result<()> {
        Ok(())
    }

    fn after_transfer(&mut self, _vault: &Vault, _movement: &ShareMove) {}
}
