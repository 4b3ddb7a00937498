//! Prover Staking - Binary Entry Point
//!
//! Walks through a slash against a prover with one outside staker and a
//! queued withdrawal, printing the books at each step.
//!
//! Set `RUST_LOG=debug` to see share movements.

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use prover_staking::access::Role;
use prover_staking::types::amount::{from_units_trimmed, UNIT};
use prover_staking::types::{Address, ProverProfile};
use prover_staking::{RoleRegistry, Staking, StakingConfig, TokenBook};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> prover_staking::Result<()> {
    println!("===========================================");
    println!("  Prover Staking - Slashing Walkthrough");
    println!("===========================================");
    println!();

    let admin = Address::from_low_u64(1);
    let prover = Address::from_low_u64(2);
    let staker = Address::from_low_u64(3);
    let custody = Address::from_low_u64(0xC0FFEE);

    let mut token = TokenBook::new();
    token.mint(&prover, 1_000 * UNIT)?;
    token.mint(&staker, 1_000 * UNIT)?;

    let config = StakingConfig::default()
        .with_min_self_stake(100 * UNIT)
        .with_max_slash_bps(5_000)
        .with_unstake_delay(7 * 24 * 60 * 60);
    let mut roles = RoleRegistry::new(admin);
    roles.grant_role(&admin, Role::Slasher, admin)?;

    let mut staking = Staking::new(config, token, roles, custody)?;

    let vault = staking.initialize_prover(
        prover,
        100 * UNIT,
        1_000,
        ProverProfile::new("demo-prover", "https://prover.example"),
        0,
    )?;
    staking.stake(staker, prover, 500 * UNIT)?;
    staking.request_unstake(staker, prover, 100 * UNIT, 10)?;

    println!("Prover {prover} initialized, vault {vault}");
    print_books(&staking, &prover, &staker);

    println!("Slashing 20%...");
    let receipt = staking.slash(&admin, prover, 2_000)?;
    println!("  Active slashed:  {}", from_units_trimmed(receipt.active_slashed));
    println!("  Pending slashed: {}", from_units_trimmed(receipt.pending_slashed));
    println!("  Scale: {} -> {}", receipt.scale_before, receipt.scale_after);
    println!("  Prover deactivated: {}", receipt.deactivated);
    println!("  Snapshot root: 0x{}", receipt.snapshot_root_hex());
    println!();
    print_books(&staking, &prover, &staker);

    let matured_at = 10 + staking.config().unstake_delay;
    let paid = staking.complete_unstake(staker, prover, matured_at)?;
    println!("Withdrawal completed at t={matured_at}: paid {}", from_units_trimmed(paid));
    println!("  Treasury: {}", from_units_trimmed(staking.treasury_balance()));
    println!();

    // SSZ encoding of the committed snapshot
    if let Some(snapshot) = staking.snapshot(&prover) {
        match ssz_rs::serialize(&snapshot) {
            Ok(bytes) => println!("Snapshot serialized to {} bytes", bytes.len()),
            Err(e) => println!("  ERROR: Failed to serialize: {:?}", e),
        }
    }
    println!("Events emitted: {}", staking.drain_events().len());
    Ok(())
}

fn print_books(staking: &Staking<TokenBook>, prover: &Address, staker: &Address) {
    let record = match staking.prover(prover) {
        Some(record) => record,
        None => return,
    };
    println!("  State: {:?}", record.state());
    println!("  Collateral: {}", from_units_trimmed(record.vault().total_assets()));
    println!("  Shares: {}", from_units_trimmed(record.vault().total_shares()));
    println!("  Prover value: {}", from_units_trimmed(staking.self_stake_value(prover)));
    println!("  Staker value: {}", from_units_trimmed(staking.value_of(prover, staker)));
    let pending = staking.pending_summary(prover, staker, 0);
    println!("  Staker pending: {} in {} request(s)", from_units_trimmed(pending.total_value), pending.count);
    println!();
}
