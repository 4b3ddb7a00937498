//! Role-based access control and pausability.
//!
//! The orchestrator does not know how capabilities are stored; it asks an
//! injected [`AccessControl`] at the top of every operation. [`RoleRegistry`]
//! is the in-crate implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, StakingError};
use crate::registry::IndexedSet;
use crate::types::Address;

/// Capabilities checked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Lifecycle transitions, parameter setters, treasury, role management.
    Admin,
    /// May call `slash` / `slash_by_amount`.
    Slasher,
    /// May call `add_rewards` when reward gating is restricted.
    RewardPayer,
    /// May pause the ledger.
    Pauser,
}

/// Read side of access control, as consumed by the orchestrator.
pub trait AccessControl {
    fn has_role(&self, role: Role, account: &Address) -> bool;
    fn is_paused(&self) -> bool;
}

/// Role membership table plus a global pause flag.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    members: HashMap<Role, IndexedSet<Address>>,
    paused: bool,
}

impl RoleRegistry {
    /// Create a registry where `admin` holds `Admin` and `Pauser`.
    pub fn new(admin: Address) -> Self {
        let mut registry = Self {
            members: HashMap::new(),
            paused: false,
        };
        registry.members.entry(Role::Admin).or_default().insert(admin);
        registry.members.entry(Role::Pauser).or_default().insert(admin);
        registry
    }

    fn require(&self, role: Role, caller: &Address) -> Result<()> {
        if self.has_role(role, caller) {
            Ok(())
        } else {
            Err(StakingError::Unauthorized {
                caller: *caller,
                role,
            })
        }
    }

    /// Grant `role` to `account`. Admin only.
    pub fn grant_role(&mut self, caller: &Address, role: Role, account: Address) -> Result<bool> {
        self.require(Role::Admin, caller)?;
        let granted = self.members.entry(role).or_default().insert(account);
        if granted {
            info!(role = ?role, account = %account, "role granted");
        }
        Ok(granted)
    }

    /// Revoke `role` from `account`. Admin only.
    pub fn revoke_role(&mut self, caller: &Address, role: Role, account: &Address) -> Result<bool> {
        self.require(Role::Admin, caller)?;
        let revoked = self
            .members
            .get_mut(&role)
            .map(|set| set.remove(account))
            .unwrap_or(false);
        if revoked {
            info!(role = ?role, account = %account, "role revoked");
        }
        Ok(revoked)
    }

    /// Pause every non-admin mutation. Pauser only.
    pub fn pause(&mut self, caller: &Address) -> Result<()> {
        self.require(Role::Pauser, caller)?;
        if self.paused {
            return Err(StakingError::Paused);
        }
        self.paused = true;
        info!(by = %caller, "ledger paused");
        Ok(())
    }

    /// Lift the pause. Admin only.
    pub fn unpause(&mut self, caller: &Address) -> Result<()> {
        self.require(Role::Admin, caller)?;
        if !self.paused {
            return Err(StakingError::NotPaused);
        }
        self.paused = false;
        info!(by = %caller, "ledger unpaused");
        Ok(())
    }

    /// Current holders of `role`.
    pub fn members(&self, role: Role) -> &[Address] {
        self.members.get(&role).map(|set| set.as_slice()).unwrap_or(&[])
    }
}

impl AccessControl for RoleRegistry {
    fn has_role(&self, role: Role, account: &Address) -> bool {
        self.members
            .get(&role)
            .map(|set| set.contains(account))
            .unwrap_or(false)
    }

    fn is_paused(&self) -> bool {
        self.paused
    }
}
