//! Prover lifecycle state and profile metadata.

use serde::{Deserialize, Serialize};

// ============================================================================
// ProverState enum
// ============================================================================

/// Lifecycle state of a prover.
///
/// Represented as u8 in SSZ snapshots:
/// - Null = 0
/// - Active = 1
/// - Deactivated = 2
/// - Jailed = 3
///
/// ## Transitions
///
/// ```text
///            initialize
///   Null ──────────────────► Active ◄──────────┐
///                            │  ▲              │ admin unjail
///          deactivate/exit   │  │ reactivate   │
///                            ▼  │              │
///                        Deactivated ──────► Jailed
///                                     admin jail (also from Active)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProverState {
    /// Not initialized (or retired). No ledger exists.
    #[default]
    Null,
    /// Accepting stake and rewards, eligible for work.
    Active,
    /// Not accepting stake or rewards; stakers can still exit.
    Deactivated,
    /// Penalised by an administrator. Only an administrator can release it.
    Jailed,
}

impl ProverState {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            ProverState::Null => 0,
            ProverState::Active => 1,
            ProverState::Deactivated => 2,
            ProverState::Jailed => 3,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(ProverState::Null),
            1 => Some(ProverState::Active),
            2 => Some(ProverState::Deactivated),
            3 => Some(ProverState::Jailed),
            _ => None,
        }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        self == ProverState::Active
    }
}

// ============================================================================
// ProverProfile
// ============================================================================

/// Maximum byte length of [`ProverProfile::name`].
pub const MAX_NAME_LEN: usize = 64;

/// Maximum byte length of [`ProverProfile::website`].
pub const MAX_WEBSITE_LEN: usize = 256;

/// Maximum byte length of [`ProverProfile::description`].
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Cosmetic metadata a prover publishes about itself.
///
/// Carries no economic meaning; only length limits are enforced.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProverProfile {
    pub name: String,
    pub website: String,
    pub description: String,
}

impl ProverProfile {
    pub fn new(name: impl Into<String>, website: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: website.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the name of the first field exceeding its limit, if any.
    pub fn oversized_field(&self) -> Option<&'static str> {
        if self.name.len() > MAX_NAME_LEN {
            Some("name")
        } else if self.website.len() > MAX_WEBSITE_LEN {
            Some("website")
        } else if self.description.len() > MAX_DESCRIPTION_LEN {
            Some("description")
        } else {
            None
        }
    }
}
