//! End-to-end scenarios for the staking ledger.
//!
//! Every test drives the public orchestrator API only and checks the books
//! (vault, queue, treasury, custody) after each step.
//!
//! ## Running
//!
//! ```bash
//! cargo test --test staking_scenarios
//! ```

use prover_staking::access::Role;
use prover_staking::config::RewardGating;
use prover_staking::queue::SCALE_ONE;
use prover_staking::token::{CollateralToken, TokenBook, TokenError};
use prover_staking::types::{Address, Amount, ProverProfile, ProverState, StakingEvent};
use prover_staking::{LifecycleAction, RoleRegistry, Staking, StakingConfig, StakingError};

// ============================================================================
// FIXTURES
// ============================================================================

const ADMIN: u64 = 1;
const PROVER: u64 = 2;
const ALICE: u64 = 3;
const BOB: u64 = 4;
const MARKET: u64 = 5;
const CUSTODY: u64 = 0xC0DE;

/// Starting token balance of every participant
const FUNDING: Amount = 1_000_000;

fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

fn config() -> StakingConfig {
    StakingConfig::default()
        .with_min_self_stake(100)
        .with_unstake_delay(100)
}

fn ledger(config: StakingConfig) -> Staking<TokenBook> {
    let mut token = TokenBook::new();
    for who in [PROVER, ALICE, BOB, MARKET] {
        token.mint(&addr(who), FUNDING).unwrap();
    }
    let mut roles = RoleRegistry::new(addr(ADMIN));
    roles
        .grant_role(&addr(ADMIN), Role::Slasher, addr(ADMIN))
        .unwrap();
    Staking::new(config, token, roles, addr(CUSTODY)).unwrap()
}

fn profile() -> ProverProfile {
    ProverProfile::new("prover", "https://prover.example")
}

/// Ledger with PROVER initialized at `self_stake` and no commission.
fn with_prover(self_stake: Amount) -> Staking<TokenBook> {
    let mut s = ledger(config());
    s.initialize_prover(addr(PROVER), self_stake, 0, profile(), 0)
        .unwrap();
    s
}

fn state(s: &Staking<TokenBook>) -> ProverState {
    s.prover(&addr(PROVER)).unwrap().state()
}

fn collateral(s: &Staking<TokenBook>) -> Amount {
    s.prover(&addr(PROVER)).unwrap().vault().total_assets()
}

fn balance(s: &Staking<TokenBook>, who: u64) -> Amount {
    s.token().balance_of(&addr(who))
}

/// Custody holds exactly what the books say it owes.
fn assert_custody_balanced(s: &Staking<TokenBook>) {
    let held = s.token().balance_of(&s.custody());
    let booked = s.escrow_balance() + s.treasury_balance() + s.total_unclaimed_commission();
    assert_eq!(held, booked, "custody balance diverged from the books");

    for prover in s.prover_ids() {
        let record = s.prover(prover).unwrap();
        assert_eq!(
            s.token().balance_of(&record.vault().address()),
            record.vault().total_assets(),
            "vault custody diverged for {prover}"
        );
    }
}

// ============================================================================
// WORKED SCENARIOS
// ============================================================================

#[test]
fn slash_pushes_prover_below_minimum_and_deactivates() {
    let mut s = with_prover(100);
    assert_eq!(state(&s), ProverState::Active);

    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
    assert_eq!(collateral(&s), 600);
    s.drain_events();

    let receipt = s.slash(&addr(ADMIN), addr(PROVER), 2_000).unwrap();

    assert_eq!(receipt.active_slashed, 120);
    assert_eq!(receipt.pending_slashed, 0);
    assert!(receipt.deactivated);
    assert_eq!(collateral(&s), 480);
    assert_eq!(s.self_stake_value(&addr(PROVER)), 80);
    assert_eq!(state(&s), ProverState::Deactivated);
    assert_eq!(s.treasury_balance(), 120);
    // the receipt commits to the prover's post-slash snapshot
    let snapshot = s.snapshot(&addr(PROVER)).unwrap();
    assert_eq!(receipt.snapshot_root, snapshot.root().unwrap());

    let events = s.drain_events();
    assert!(events.contains(&StakingEvent::StateChanged {
        prover: addr(PROVER),
        from: ProverState::Active,
        to: ProverState::Deactivated,
    }));
    assert_custody_balanced(&s);
}

#[test]
fn withdrawals_pay_relative_to_their_own_snapshot() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 2_000).unwrap();

    // 1:1 before any slash
    assert_eq!(s.request_unstake(addr(ALICE), addr(PROVER), 1_000, 0).unwrap(), 1_000);
    let first = s.pending_requests(&addr(PROVER), &addr(ALICE))[0].clone();
    assert_eq!(first.scale_snapshot, SCALE_ONE);

    s.slash(&addr(ADMIN), addr(PROVER), 2_000).unwrap();
    assert_eq!(s.slashing_scale(&addr(PROVER)), Some(SCALE_ONE / 10 * 8));

    // 800 shares over 1100 shares backed by 880 collateral
    assert_eq!(s.request_unstake(addr(ALICE), addr(PROVER), 800, 10).unwrap(), 640);

    let summary = s.pending_summary(&addr(PROVER), &addr(ALICE), 110);
    assert_eq!(summary.count, 2);
    assert_eq!(summary.ready_count, 2);
    assert_eq!(summary.total_value, 800 + 640);

    let before = balance(&s, ALICE);
    let paid = s.complete_unstake(addr(ALICE), addr(PROVER), 110).unwrap();
    assert_eq!(paid, 1_440);
    assert_eq!(balance(&s, ALICE), before + 1_440);

    // 220 from the active pool, 200 written off the first request
    assert_eq!(s.treasury_balance(), 420);
    assert_eq!(s.escrow_balance(), 0);
    assert_custody_balanced(&s);
}

#[test]
fn successive_slashes_compound() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 10_000).unwrap();
    s.request_unstake(addr(ALICE), addr(PROVER), 10_000, 0).unwrap();

    s.slash(&addr(ADMIN), addr(PROVER), 1_000).unwrap();
    s.slash(&addr(ADMIN), addr(PROVER), 2_000).unwrap();

    // 0.9 * 0.8 = 0.72 of the request survives, not 0.7
    let paid = s.complete_unstake(addr(ALICE), addr(PROVER), 100).unwrap();
    assert_eq!(paid, 7_200);
    assert_custody_balanced(&s);
}

#[test]
fn claim_with_nothing_accrued_is_a_noop() {
    let mut s = with_prover(100);
    s.drain_events();
    let root = s.state_root().unwrap();
    let before = balance(&s, PROVER);

    assert_eq!(s.claim_commission(addr(PROVER)).unwrap(), 0);

    assert_eq!(balance(&s, PROVER), before);
    assert_eq!(s.state_root().unwrap(), root);
    assert!(s.drain_events().is_empty());
}

#[test]
fn min_self_stake_boundary() {
    let mut s = with_prover(150);
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();

    // 150 -> 99: strictly between zero and the minimum
    assert_eq!(
        s.request_unstake(addr(PROVER), addr(PROVER), 51, 0),
        Err(StakingError::BelowMinSelfStake {
            value: 99,
            minimum: 100
        })
    );
    assert_eq!(s.transferable_shares(&addr(PROVER), &addr(PROVER)), 50);

    // 150 -> 100: exactly the minimum
    s.request_unstake(addr(PROVER), addr(PROVER), 50, 0).unwrap();
    assert_eq!(s.self_stake_value(&addr(PROVER)), 100);
    assert_eq!(state(&s), ProverState::Active);

    // transfers obey the same rule
    assert!(matches!(
        s.transfer_shares(addr(PROVER), addr(PROVER), addr(BOB), 1),
        Err(StakingError::BelowMinSelfStake { .. })
    ));

    // 100 -> 0: allowed, and deactivates
    s.request_unstake(addr(PROVER), addr(PROVER), 100, 0).unwrap();
    assert_eq!(s.self_stake_value(&addr(PROVER)), 0);
    assert_eq!(state(&s), ProverState::Deactivated);
    assert!(!s.stakers(&addr(PROVER)).contains(&addr(PROVER)));
    assert_custody_balanced(&s);
}

#[test]
fn rewards_need_outstanding_shares() {
    let mut s = ledger(config().with_min_self_stake(0));
    s.initialize_prover(addr(PROVER), 0, 0, profile(), 0).unwrap();
    assert_eq!(state(&s), ProverState::Active);

    assert_eq!(
        s.add_rewards(addr(MARKET), addr(PROVER), 1_000),
        Err(StakingError::NoSharesOutstanding(addr(PROVER)))
    );
    assert_eq!(balance(&s, MARKET), FUNDING);
    assert_eq!(collateral(&s), 0);
}

/// Ledger with no self-stake minimum and a 99.99% slash ceiling.
fn deep_slash_ledger(self_stake: Amount) -> Staking<TokenBook> {
    let mut s = ledger(config().with_min_self_stake(0).with_max_slash_bps(9_999));
    s.token_mut().mint(&addr(PROVER), self_stake).unwrap();
    s.initialize_prover(addr(PROVER), self_stake, 0, profile(), 0)
        .unwrap();
    s
}

// ============================================================================
// STAKE / UNSTAKE
// ============================================================================

#[test]
fn stake_requires_active_prover_and_funds() {
    let mut s = with_prover(100);

    assert_eq!(
        s.stake(addr(ALICE), addr(9), 10),
        Err(StakingError::NotInitialized(addr(9)))
    );
    assert_eq!(
        s.stake(addr(ALICE), addr(PROVER), FUNDING + 1),
        Err(StakingError::Token(TokenError::InsufficientBalance {
            holder: addr(ALICE),
            available: FUNDING,
            requested: FUNDING + 1,
        }))
    );
    assert_eq!(s.stake(addr(ALICE), addr(PROVER), 0), Err(StakingError::ZeroAmount));

    s.deactivate_self(addr(PROVER)).unwrap();
    assert_eq!(s.max_deposit(&addr(PROVER)), 0);
    assert_eq!(
        s.stake(addr(ALICE), addr(PROVER), 10),
        Err(StakingError::NotActive {
            prover: addr(PROVER),
            state: ProverState::Deactivated
        })
    );
}

#[test]
fn stake_rejects_share_supply_overflow() {
    let mut s = deep_slash_ledger(1_000_000_000_000_000_000_000_000_000_000);
    for _ in 0..9 {
        s.slash(&addr(ADMIN), addr(PROVER), 9_999).unwrap();
    }
    // one unit of collateral backs 10^30 shares
    assert_eq!(collateral(&s), 1);
    s.token_mut().mint(&addr(ALICE), 1_000_000_000).unwrap();

    s.stake(addr(ALICE), addr(PROVER), 300_000_000).unwrap();
    s.stake(addr(ALICE), addr(PROVER), 300_000_000).unwrap();
    let vault = s.prover(&addr(PROVER)).unwrap().vault();
    let (shares, assets) = (vault.total_shares(), vault.total_assets());
    let funds = balance(&s, ALICE);

    assert_eq!(
        s.stake(addr(ALICE), addr(PROVER), 300_000_000),
        Err(StakingError::Overflow)
    );
    let vault = s.prover(&addr(PROVER)).unwrap().vault();
    assert_eq!(vault.total_shares(), shares);
    assert_eq!(vault.total_assets(), assets);
    assert_eq!(balance(&s, ALICE), funds);
    assert_custody_balanced(&s);
}

#[test]
fn pending_request_cap() {
    let mut s = ledger(config().with_max_pending_requests(2));
    s.initialize_prover(addr(PROVER), 100, 0, profile(), 0).unwrap();
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();

    s.request_unstake(addr(ALICE), addr(PROVER), 1, 0).unwrap();
    s.request_unstake(addr(ALICE), addr(PROVER), 1, 1).unwrap();
    assert_eq!(
        s.request_unstake(addr(ALICE), addr(PROVER), 1, 2),
        Err(StakingError::TooManyPendingRequests {
            staker: addr(ALICE),
            pending: 2,
            max: 2
        })
    );
    // nothing was burned by the rejected request
    assert_eq!(s.share_balance(&addr(PROVER), &addr(ALICE)), 498);
}

#[test]
fn completion_waits_for_maturity_and_delay_changes_apply() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
    s.request_unstake(addr(ALICE), addr(PROVER), 200, 0).unwrap();

    assert_eq!(
        s.complete_unstake(addr(ALICE), addr(PROVER), 99),
        Err(StakingError::NotReady {
            staker: addr(ALICE),
            next_maturity: Some(100)
        })
    );

    // shortening the delay re-evaluates the existing request
    s.set_unstake_delay(&addr(ADMIN), 50).unwrap();
    assert_eq!(s.complete_unstake(addr(ALICE), addr(PROVER), 99).unwrap(), 200);
    assert!(s.pending_requests(&addr(PROVER), &addr(ALICE)).is_empty());
}

#[test]
fn eligibility_ignores_pending_withdrawals() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
    assert_eq!(s.is_prover_eligible(&addr(PROVER), 600), (true, 600));

    s.request_unstake(addr(ALICE), addr(PROVER), 200, 0).unwrap();
    assert_eq!(s.is_prover_eligible(&addr(PROVER), 600), (false, 400));
    assert_eq!(s.is_prover_eligible(&addr(PROVER), 400), (true, 400));

    s.deactivate_self(addr(PROVER)).unwrap();
    assert_eq!(s.is_prover_eligible(&addr(PROVER), 1), (false, 400));
    assert_eq!(s.is_prover_eligible(&addr(9), 0), (false, 0));
}

#[test]
fn delegated_share_transfer() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
    s.approve_shares(addr(ALICE), addr(PROVER), addr(BOB), 100).unwrap();

    s.transfer_shares_from(addr(BOB), addr(PROVER), addr(ALICE), addr(BOB), 60)
        .unwrap();
    assert_eq!(s.share_balance(&addr(PROVER), &addr(BOB)), 60);
    assert!(s.stakers(&addr(PROVER)).contains(&addr(BOB)));

    assert_eq!(
        s.transfer_shares_from(addr(BOB), addr(PROVER), addr(ALICE), addr(BOB), 70),
        Err(StakingError::InsufficientAllowance {
            allowance: 40,
            requested: 70
        })
    );
    assert_eq!(s.max_withdraw(&addr(PROVER), &addr(ALICE)), 0);
}

// ============================================================================
// SLASHING
// ============================================================================

#[test]
fn slash_requires_role_and_bounds() {
    let mut s = with_prover(100);

    assert_eq!(
        s.slash(&addr(ALICE), addr(PROVER), 100),
        Err(StakingError::Unauthorized {
            caller: addr(ALICE),
            role: Role::Slasher
        })
    );
    assert_eq!(
        s.slash(&addr(ADMIN), addr(PROVER), 0),
        Err(StakingError::BpsOutOfRange { bps: 0, max: 5_000 })
    );
    assert_eq!(
        s.slash(&addr(ADMIN), addr(PROVER), 5_001),
        Err(StakingError::BpsOutOfRange {
            bps: 5_001,
            max: 5_000
        })
    );
    assert_eq!(
        s.slash(&addr(ADMIN), addr(9), 100),
        Err(StakingError::NotInitialized(addr(9)))
    );
    assert_eq!(collateral(&s), 100);
}

#[test]
fn slash_by_amount_converts_and_caps() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 999_900).unwrap();
    assert_eq!(collateral(&s), 1_000_000);

    // rounds to zero bps
    assert_eq!(s.slash_by_amount(&addr(ADMIN), addr(PROVER), 50).unwrap(), 0);
    assert_eq!(s.slash_by_amount(&addr(ADMIN), addr(PROVER), 0).unwrap(), 0);
    assert_eq!(collateral(&s), 1_000_000);
    assert_eq!(s.slashing_scale(&addr(PROVER)), Some(SCALE_ONE));

    // 10 bps
    assert_eq!(s.slash_by_amount(&addr(ADMIN), addr(PROVER), 1_000).unwrap(), 1_000);
    assert_eq!(collateral(&s), 999_000);

    // capped at 50%
    assert_eq!(
        s.slash_by_amount(&addr(ADMIN), addr(PROVER), 900_000).unwrap(),
        499_500
    );
    assert_eq!(collateral(&s), 499_500);
    assert_custody_balanced(&s);
}

#[test]
fn slash_clamps_to_vault_balance() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
    let vault = s.prover(&addr(PROVER)).unwrap().vault().address();

    // custody drained behind the ledger's back
    s.token_mut().transfer(&vault, &addr(BOB), 550).unwrap();
    assert_eq!(s.token().balance_of(&vault), 50);

    // 20% of 600 would be 120, only 50 can move
    let receipt = s.slash(&addr(ADMIN), addr(PROVER), 2_000).unwrap();
    assert_eq!(receipt.active_slashed, 50);
    assert_eq!(collateral(&s), 550);
    assert_eq!(s.token().balance_of(&vault), 0);

    assert_eq!(s.treasury_balance(), 50);
    assert_eq!(s.token().balance_of(&s.custody()), 50);
    assert_eq!(
        s.token().balance_of(&s.custody()),
        s.escrow_balance() + s.treasury_balance() + s.total_unclaimed_commission()
    );
}

#[test]
fn slashes_keep_biting_after_the_scale_rebases() {
    let mut s = deep_slash_ledger(FUNDING);
    for _ in 0..5 {
        s.slash(&addr(ADMIN), addr(PROVER), 9_999).unwrap();
    }
    assert_eq!(collateral(&s), 1);
    assert_eq!(s.slashing_rebases(&addr(PROVER)), Some(2));

    // 10_000 buys 5_000_005_000 shares, redeemed for exactly 10_000
    let shares = s.stake(addr(BOB), addr(PROVER), 10_000).unwrap();
    assert_eq!(s.request_unstake(addr(BOB), addr(PROVER), shares, 0).unwrap(), 10_000);

    let receipt = s.slash(&addr(ADMIN), addr(PROVER), 5_000).unwrap();
    assert_eq!(receipt.pending_slashed, 5_000);
    assert!(receipt.scale_after < receipt.scale_before);
    assert_eq!(receipt.rebases, 2);

    let before = balance(&s, BOB);
    assert_eq!(s.complete_unstake(addr(BOB), addr(PROVER), 100).unwrap(), 5_000);
    assert_eq!(balance(&s, BOB), before + 5_000);
    assert_eq!(s.escrow_balance(), 0);
    // 999_999 seized from the active pool, 5_000 written off Bob's request
    assert_eq!(s.treasury_balance(), 1_004_999);
    assert_custody_balanced(&s);
}

#[test]
fn jailed_prover_can_still_be_slashed() {
    let mut s = with_prover(100);
    s.admin_jail(&addr(ADMIN), addr(PROVER)).unwrap();
    let receipt = s.slash(&addr(ADMIN), addr(PROVER), 5_000).unwrap();
    assert_eq!(receipt.active_slashed, 50);
    // only Active provers are flipped
    assert!(!receipt.deactivated);
    assert_eq!(state(&s), ProverState::Jailed);
}

#[test]
fn state_root_is_deterministic() {
    let build = || {
        let mut s = with_prover(100);
        s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
        s.request_unstake(addr(ALICE), addr(PROVER), 50, 3).unwrap();
        s
    };
    let mut a = build();
    let b = build();
    assert_eq!(a.state_root().unwrap(), b.state_root().unwrap());
    assert_eq!(a.state_root_hex().unwrap().len(), 64);

    a.slash(&addr(ADMIN), addr(PROVER), 100).unwrap();
    assert_ne!(a.state_root().unwrap(), b.state_root().unwrap());
}

// ============================================================================
// REWARDS & COMMISSION
// ============================================================================

#[test]
fn rewards_split_between_commission_and_stakers() {
    let mut s = ledger(config());
    s.initialize_prover(addr(PROVER), 100, 1_000, profile(), 0).unwrap();
    s.stake(addr(ALICE), addr(PROVER), 900).unwrap();

    assert_eq!(s.add_rewards(addr(MARKET), addr(PROVER), 1_000).unwrap(), (100, 900));
    assert_eq!(collateral(&s), 1_900);
    assert_eq!(s.unclaimed_commission(&addr(PROVER)), 100);
    // 900 shares * 1901 / 1001
    assert_eq!(s.value_of(&addr(PROVER), &addr(ALICE)), 1_709);
    assert_custody_balanced(&s);

    // per-source override, then back to the default
    s.set_commission_rate(addr(PROVER), addr(MARKET), 0).unwrap();
    assert_eq!(s.add_rewards(addr(MARKET), addr(PROVER), 100).unwrap(), (0, 100));
    assert_eq!(s.commission_table(&addr(PROVER)).unwrap().overrides, vec![(addr(MARKET), 0)]);
    assert!(s.reset_commission_rate(addr(PROVER), addr(MARKET)).unwrap());
    assert!(!s.reset_commission_rate(addr(PROVER), addr(MARKET)).unwrap());
    assert_eq!(s.add_rewards(addr(MARKET), addr(PROVER), 10).unwrap(), (1, 9));

    let before = balance(&s, PROVER);
    assert_eq!(s.claim_commission(addr(PROVER)).unwrap(), 101);
    assert_eq!(balance(&s, PROVER), before + 101);
    assert_eq!(s.unclaimed_commission(&addr(PROVER)), 0);
    assert_custody_balanced(&s);
}

#[test]
fn rewards_rejected_unless_active() {
    let mut s = with_prover(100);
    s.deactivate_self(addr(PROVER)).unwrap();
    assert_eq!(
        s.add_rewards(addr(MARKET), addr(PROVER), 10),
        Err(StakingError::NotActive {
            prover: addr(PROVER),
            state: ProverState::Deactivated
        })
    );
    // claiming stays possible in any state
    assert_eq!(s.claim_commission(addr(PROVER)).unwrap(), 0);
}

#[test]
fn restricted_reward_gating() {
    let mut s = ledger(config().with_reward_gating(RewardGating::Restricted));
    s.initialize_prover(addr(PROVER), 100, 0, profile(), 0).unwrap();

    assert_eq!(
        s.add_rewards(addr(MARKET), addr(PROVER), 10),
        Err(StakingError::Unauthorized {
            caller: addr(MARKET),
            role: Role::RewardPayer
        })
    );
    s.access_mut()
        .grant_role(&addr(ADMIN), Role::RewardPayer, addr(MARKET))
        .unwrap();
    assert_eq!(s.add_rewards(addr(MARKET), addr(PROVER), 10).unwrap(), (0, 10));
}

#[test]
fn commission_rate_bounds() {
    let mut s = with_prover(100);
    assert_eq!(
        s.set_default_commission_rate(addr(PROVER), 10_001),
        Err(StakingError::BpsOutOfRange {
            bps: 10_001,
            max: 10_000
        })
    );
    s.set_default_commission_rate(addr(PROVER), 10_000).unwrap();
    assert_eq!(
        s.set_commission_rate(addr(ALICE), addr(MARKET), 1),
        Err(StakingError::NotInitialized(addr(ALICE)))
    );
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[test]
fn jail_and_unjail() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();

    assert!(matches!(
        s.admin_jail(&addr(ALICE), addr(PROVER)),
        Err(StakingError::Unauthorized { .. })
    ));
    s.admin_jail(&addr(ADMIN), addr(PROVER)).unwrap();
    assert_eq!(state(&s), ProverState::Jailed);

    assert_eq!(
        s.request_unstake(addr(ALICE), addr(PROVER), 10, 0),
        Err(StakingError::Jailed(addr(PROVER)))
    );
    assert_eq!(
        s.transfer_shares(addr(PROVER), addr(PROVER), addr(BOB), 10),
        Err(StakingError::SharesLocked {
            requested: 10,
            transferable: 0
        })
    );
    assert_eq!(s.transferable_shares(&addr(PROVER), &addr(PROVER)), 0);
    assert_eq!(s.reactivate_self(addr(PROVER)), Err(StakingError::Jailed(addr(PROVER))));
    assert_eq!(s.deactivate_self(addr(PROVER)), Err(StakingError::Jailed(addr(PROVER))));

    s.admin_unjail(&addr(ADMIN), addr(PROVER)).unwrap();
    assert_eq!(state(&s), ProverState::Active);
}

#[test]
fn reactivation_requires_min_self_stake() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
    s.slash(&addr(ADMIN), addr(PROVER), 2_000).unwrap();
    assert_eq!(state(&s), ProverState::Deactivated);

    assert_eq!(
        s.reactivate_self(addr(PROVER)),
        Err(StakingError::BelowMinSelfStake {
            value: 80,
            minimum: 100
        })
    );
    assert!(s.admin_activate(&addr(ADMIN), addr(PROVER)).is_err());

    s.set_min_self_stake(&addr(ADMIN), 80).unwrap();
    s.reactivate_self(addr(PROVER)).unwrap();
    assert_eq!(state(&s), ProverState::Active);
}

#[test]
fn batch_transitions_are_all_or_nothing() {
    let mut s = with_prover(100);
    s.initialize_prover(addr(BOB), 100, 0, profile(), 0).unwrap();
    s.admin_jail(&addr(ADMIN), addr(BOB)).unwrap();

    assert_eq!(
        s.admin_lifecycle(&addr(ADMIN), LifecycleAction::Deactivate, &[addr(PROVER), addr(BOB)]),
        Err(StakingError::InvalidTransition {
            prover: addr(BOB),
            from: ProverState::Jailed,
            to: ProverState::Deactivated
        })
    );
    assert_eq!(state(&s), ProverState::Active);

    assert_eq!(
        s.admin_lifecycle(&addr(ADMIN), LifecycleAction::Jail, &[addr(PROVER), addr(PROVER)]),
        Err(StakingError::DuplicateTarget(addr(PROVER)))
    );

    s.admin_lifecycle(&addr(ADMIN), LifecycleAction::Deactivate, &[addr(PROVER)])
        .unwrap();
    s.admin_lifecycle(&addr(ADMIN), LifecycleAction::Jail, &[addr(PROVER)])
        .unwrap();
    s.admin_lifecycle(&addr(ADMIN), LifecycleAction::Unjail, &[addr(PROVER), addr(BOB)])
        .unwrap();
    assert_eq!(state(&s), ProverState::Active);
    assert_eq!(s.prover(&addr(BOB)).unwrap().state(), ProverState::Active);
}

#[test]
fn retirement_lifecycle() {
    let mut s = ledger(config());
    s.initialize_prover(addr(PROVER), 100, 1_000, profile(), 7).unwrap();
    assert_eq!(s.prover(&addr(PROVER)).unwrap().joined_at(), 7);
    s.add_rewards(addr(MARKET), addr(PROVER), 1_000).unwrap();

    assert_eq!(
        s.admin_retire(&addr(ADMIN), addr(PROVER)),
        Err(StakingError::CollateralRemaining {
            prover: addr(PROVER),
            collateral: 1_000
        })
    );

    // 100 shares * 1001 / 101
    assert_eq!(s.request_unstake(addr(PROVER), addr(PROVER), 100, 0).unwrap(), 991);
    assert_eq!(state(&s), ProverState::Deactivated);
    assert_eq!(
        s.admin_retire(&addr(ADMIN), addr(PROVER)),
        Err(StakingError::PendingWithdrawals {
            prover: addr(PROVER),
            outstanding: 991
        })
    );

    s.complete_unstake(addr(PROVER), addr(PROVER), 100).unwrap();
    s.admin_retire(&addr(ADMIN), addr(PROVER)).unwrap();

    assert!(s.prover(&addr(PROVER)).is_none());
    assert!(s.prover_ids().is_empty());
    assert!(s.is_retired(&addr(PROVER)));
    // rounding dust goes to the treasury, commission to the prover
    assert_eq!(s.treasury_balance(), 9);
    assert_eq!(balance(&s, PROVER), FUNDING - 100 + 991 + 100);
    assert_custody_balanced(&s);

    assert_eq!(
        s.initialize_prover(addr(PROVER), 100, 0, profile(), 200),
        Err(StakingError::AlreadyInitialized(addr(PROVER)))
    );
}

#[test]
fn initialization_checks() {
    let mut s = ledger(config());

    assert_eq!(
        s.initialize_prover(addr(PROVER), 99, 0, profile(), 0),
        Err(StakingError::BelowMinSelfStake {
            value: 99,
            minimum: 100
        })
    );
    assert_eq!(
        s.initialize_prover(addr(PROVER), 100, 10_001, profile(), 0),
        Err(StakingError::BpsOutOfRange {
            bps: 10_001,
            max: 10_000
        })
    );
    let long = ProverProfile::new("x".repeat(65), "");
    assert_eq!(
        s.initialize_prover(addr(PROVER), 100, 0, long, 0),
        Err(StakingError::ProfileTooLong("name"))
    );
    assert_eq!(balance(&s, PROVER), FUNDING);

    let vault = s.initialize_prover(addr(PROVER), 100, 0, profile(), 0).unwrap();
    assert_eq!(s.token().balance_of(&vault), 100);
    assert_eq!(
        s.initialize_prover(addr(PROVER), 100, 0, profile(), 0),
        Err(StakingError::AlreadyInitialized(addr(PROVER)))
    );

    s.set_profile(addr(PROVER), profile().with_description("gpu cluster"))
        .unwrap();
    assert_eq!(
        s.prover(&addr(PROVER)).unwrap().profile().description,
        "gpu cluster"
    );
}

// ============================================================================
// ADMIN
// ============================================================================

#[test]
fn pause_blocks_users_but_not_admin() {
    let mut s = with_prover(100);
    s.access_mut().pause(&addr(ADMIN)).unwrap();

    assert_eq!(s.stake(addr(ALICE), addr(PROVER), 10), Err(StakingError::Paused));
    assert_eq!(s.claim_commission(addr(PROVER)), Err(StakingError::Paused));
    assert_eq!(s.slash(&addr(ADMIN), addr(PROVER), 10), Err(StakingError::Paused));
    s.set_unstake_delay(&addr(ADMIN), 10).unwrap();
    assert_eq!(s.config().unstake_delay, 10);

    s.access_mut().unpause(&addr(ADMIN)).unwrap();
    s.stake(addr(ALICE), addr(PROVER), 10).unwrap();
}

#[test]
fn emergency_recovery_only_touches_surplus() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
    s.slash(&addr(ADMIN), addr(PROVER), 2_000).unwrap();

    let custody = s.custody();
    s.token_mut().transfer(&addr(BOB), &custody, 50).unwrap();
    assert_eq!(s.recoverable_surplus(), 50);

    assert_eq!(
        s.emergency_recover(&addr(ADMIN), addr(BOB), 50),
        Err(StakingError::NotPaused)
    );
    s.access_mut().pause(&addr(ADMIN)).unwrap();
    assert_eq!(
        s.emergency_recover(&addr(ADMIN), addr(BOB), 51),
        Err(StakingError::InsufficientFunds {
            available: 50,
            requested: 51
        })
    );
    s.emergency_recover(&addr(ADMIN), addr(BOB), 50).unwrap();
    assert_eq!(balance(&s, BOB), FUNDING);
    assert_eq!(s.treasury_balance(), 120);
    assert_custody_balanced(&s);
}

#[test]
fn treasury_withdrawal() {
    let mut s = with_prover(100);
    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
    s.slash(&addr(ADMIN), addr(PROVER), 2_000).unwrap();

    assert!(matches!(
        s.withdraw_treasury(&addr(ALICE), addr(ALICE), 1),
        Err(StakingError::Unauthorized { .. })
    ));
    assert_eq!(
        s.withdraw_treasury(&addr(ADMIN), addr(BOB), 121),
        Err(StakingError::InsufficientFunds {
            available: 120,
            requested: 121
        })
    );
    s.withdraw_treasury(&addr(ADMIN), addr(BOB), 120).unwrap();
    assert_eq!(balance(&s, BOB), FUNDING + 120);
    assert_eq!(s.treasury_balance(), 0);
    assert_custody_balanced(&s);
}

#[test]
fn parameter_setters_validate() {
    let mut s = with_prover(100);
    assert!(matches!(
        s.set_max_slash_bps(&addr(ADMIN), 10_000),
        Err(StakingError::Config(_))
    ));
    s.set_max_slash_bps(&addr(ADMIN), 9_999).unwrap();
    assert!(matches!(
        s.set_max_pending_requests(&addr(ADMIN), 0),
        Err(StakingError::Config(_))
    ));
    s.set_reward_gating(&addr(ADMIN), RewardGating::Restricted)
        .unwrap();
    assert_eq!(s.config().reward_gating, RewardGating::Restricted);
    assert!(matches!(
        s.set_min_self_stake(&addr(ALICE), 0),
        Err(StakingError::Unauthorized { .. })
    ));

    let events = s.drain_events();
    assert!(events.contains(&StakingEvent::ParameterUpdated {
        name: "max_slash_bps",
        value: 9_999
    }));
}

#[test]
fn event_journal_accumulates_until_drained() {
    let mut s = with_prover(100);
    assert!(!s.events().is_empty());
    s.drain_events();

    s.stake(addr(ALICE), addr(PROVER), 500).unwrap();
    s.request_unstake(addr(ALICE), addr(PROVER), 100, 0).unwrap();
    assert_eq!(s.events().len(), 2);
    // reading does not consume
    assert_eq!(s.events().len(), 2);

    let events = s.drain_events();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], StakingEvent::Staked { amount: 500, .. }));
    assert!(matches!(events[1], StakingEvent::UnstakeRequested { value: 100, .. }));
    assert!(s.events().is_empty());
    assert!(s.drain_events().is_empty());
}
