//! 20-byte account identity shared by provers, stakers, reward sources and
//! custody accounts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An account identity.
///
/// Rendered as `0x`-prefixed lowercase hex. Ordering is bytewise, which is
/// what the state root uses to walk provers deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address. Never a valid transfer target.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Build an address whose low 8 bytes hold `n` (big-endian).
    ///
    /// Handy for tests and demos: `Address::from_low_u64(1)` is `0x00..01`.
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Address(bytes)
    }

    /// Parse a 40-hex-digit address, with or without `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Address(bytes))
    }

    /// Left-pad to a 32-byte word (for SSZ snapshots and hashing).
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }

    /// Take the low 20 bytes of a 32-byte word.
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Address(bytes)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
