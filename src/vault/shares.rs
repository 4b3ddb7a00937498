//! Share/asset conversion with a virtual offset.
//!
//! Both directions add one virtual share and one virtual asset unit to the
//! pool before dividing:
//!
//! ```text
//! shares = assets * (supply + 1) / (total + 1)
//! assets = shares * (total + 1) / (supply + 1)
//! ```
//!
//! Division truncates, so rounding always favours the pool. An empty pool
//! converts 1:1, and a pool whose collateral was slashed to zero still has a
//! non-zero denominator.

use crate::types::amount::{mul_div, Amount};

/// Shares minted for `assets` against a pool of `supply` shares backed by
/// `total` collateral. `None` on overflow.
#[inline]
pub fn assets_to_shares(assets: Amount, supply: u128, total: Amount) -> Option<u128> {
    mul_div(assets, supply.checked_add(1)?, total.checked_add(1)?)
}

/// Collateral redeemable for `shares`. `None` on overflow.
#[inline]
pub fn shares_to_assets(shares: u128, supply: u128, total: Amount) -> Option<Amount> {
    mul_div(shares, total.checked_add(1)?, supply.checked_add(1)?)
}

/// Smallest share count whose redeemable value is at least `value`.
pub fn shares_for_value(value: Amount, supply: u128, total: Amount) -> Option<u128> {
    let shares = mul_div(value, supply.checked_add(1)?, total.checked_add(1)?)?;
    // the floor above is off by at most one share
    if shares_to_assets(shares, supply, total)? >= value {
        Some(shares)
    } else {
        shares.checked_add(1)
    }
}
