//! Integration tests for the staking lifecycle
//!
//! These tests drive a full ledger through deposits, tier changes, unlock
//! overrides and settlement, checking custody and the event log along the way.

use lockstake_ledger::{
    Address, EngineConfig, LedgerError, LedgerEvent, ManualClock, Position, StakingEngine,
    ONE_UNIT, SECONDS_PER_DAY,
};

const GENESIS: i64 = 1_767_225_600;

struct Fixture {
    engine: StakingEngine<ManualClock>,
    clock: ManualClock,
    admin: Address,
    signer1: Address,
    signer2: Address,
}

fn setup() -> Fixture {
    let clock = ManualClock::new(GENESIS);
    let admin = Address::repeat(0xa0);
    let engine = StakingEngine::new(admin, 10 * ONE_UNIT, EngineConfig::default(), clock.clone())
        .expect("ledger initializes");

    Fixture {
        engine,
        clock,
        admin,
        signer1: Address::repeat(0x01),
        signer2: Address::repeat(0x02),
    }
}

mod initialization_tests {
    use super::*;

    #[test]
    fn test_admin_and_default_tiers() {
        let f = setup();

        assert_eq!(f.engine.admin(), f.admin);
        assert_eq!(f.engine.tier_at(0), Some(30));
        assert_eq!(f.engine.tier_at(1), Some(90));
        assert_eq!(f.engine.tier_at(2), Some(180));
        assert_eq!(f.engine.tier_at(3), None);

        assert_eq!(f.engine.rate_for(30).unwrap(), 700);
        assert_eq!(f.engine.rate_for(90).unwrap(), 1_000);
        assert_eq!(f.engine.rate_for(180).unwrap(), 12_000);
    }

    #[test]
    fn test_reserve_in_custody() {
        let f = setup();
        assert_eq!(f.engine.custody_balance(), 10 * ONE_UNIT);
        assert_eq!(f.engine.custody().total_reserve_funded(), 10 * ONE_UNIT);
        assert!(f.engine.solvency().is_solvent());
    }
}

mod deposit_tests {
    use super::*;

    #[test]
    fn test_deposit_moves_value_into_custody() {
        let mut f = setup();
        let before = f.engine.custody_balance();

        f.engine.deposit(f.signer1, 30, 2 * ONE_UNIT).unwrap();

        assert_eq!(f.engine.custody_balance(), before + 2 * ONE_UNIT);
        assert_eq!(f.engine.custody().total_deposited(), 2 * ONE_UNIT);
    }

    #[test]
    fn test_position_record() {
        let mut f = setup();

        assert_eq!(f.engine.position(1), Position::empty());
        assert_eq!(f.engine.current_position_id(), 1);

        let id = f.engine.deposit(f.signer1, 90, ONE_UNIT).unwrap();
        let position = f.engine.position(id);

        assert_eq!(position.position_id, 1);
        assert_eq!(position.owner, f.signer1);
        assert_eq!(position.created_at, GENESIS);
        assert_eq!(position.unlock_at, GENESIS + 86_400 * 90);
        assert_eq!(position.rate_basis_points, 1_000);
        assert_eq!(position.principal, ONE_UNIT);
        assert_eq!(position.interest, ONE_UNIT * 1_000 / 10_000);
        assert!(position.open);
        assert_eq!(f.engine.current_position_id(), 2);
    }

    #[test]
    fn test_ids_follow_call_order_across_callers() {
        let mut f = setup();
        let half = ONE_UNIT / 2;

        assert_eq!(f.engine.deposit(f.signer1, 30, half).unwrap(), 1);
        assert_eq!(f.engine.deposit(f.signer1, 30, half).unwrap(), 2);
        assert_eq!(f.engine.deposit(f.signer2, 90, half).unwrap(), 3);

        assert_eq!(f.engine.position_ids_for(&f.signer1), &[1, 2]);
        assert_eq!(f.engine.position_ids_for(&f.signer2), &[3]);
        assert!(f.engine.position_ids_for(&f.admin).is_empty());
    }

    #[test]
    fn test_position_readable_by_anyone() {
        let mut f = setup();
        f.engine.deposit(f.signer1, 90, 5 * ONE_UNIT).unwrap();

        let position = f.engine.position(1);
        assert_eq!(position.owner, f.signer1);
        assert_eq!(position.interest, 5 * ONE_UNIT / 10);
    }

    #[test]
    fn test_index_keeps_closed_positions() {
        let mut f = setup();
        f.engine.deposit(f.signer1, 90, 5 * ONE_UNIT).unwrap();
        f.engine.deposit(f.signer1, 90, 10 * ONE_UNIT).unwrap();
        f.engine.close_position(f.signer1, 1).unwrap();

        assert_eq!(f.engine.position_ids_for(&f.signer1), &[1, 2]);
        let listed = f.engine.positions_for(&f.signer1);
        assert!(!listed[0].open);
        assert!(listed[1].open);
    }
}

mod tier_tests {
    use super::*;

    #[test]
    fn test_admin_creates_tier() {
        let mut f = setup();
        f.engine.modify_tier(f.admin, 100, 999).unwrap();

        assert_eq!(f.engine.rate_for(100).unwrap(), 999);
        assert_eq!(f.engine.tier_at(3), Some(100));
        assert_eq!(f.engine.list_tiers(), vec![30, 90, 180, 100]);
    }

    #[test]
    fn test_admin_overwrites_tier() {
        let mut f = setup();
        f.engine.modify_tier(f.admin, 180, 15_000).unwrap();

        assert_eq!(f.engine.rate_for(180).unwrap(), 15_000);
        assert_eq!(f.engine.list_tiers(), vec![30, 90, 180]);
    }

    #[test]
    fn test_non_admin_rejected() {
        let mut f = setup();
        let err = f.engine.modify_tier(f.signer1, 100, 999).unwrap_err();

        assert_eq!(err, LedgerError::NotAdmin(f.signer1));
        assert!(err.is_authorization());
        assert_eq!(f.engine.rate_for(100), Err(LedgerError::UnknownTier(100)));
    }

    #[test]
    fn test_new_tier_usable_for_deposits() {
        let mut f = setup();
        assert!(f.engine.deposit(f.signer1, 365, ONE_UNIT).is_err());

        f.engine.modify_tier(f.admin, 365, 2_000).unwrap();
        let id = f.engine.deposit(f.signer1, 365, ONE_UNIT).unwrap();

        assert_eq!(f.engine.position(id).interest, ONE_UNIT / 5);
        assert_eq!(f.engine.position(id).unlock_at, GENESIS + 365 * SECONDS_PER_DAY);
    }
}

mod unlock_override_tests {
    use super::*;

    #[test]
    fn test_admin_moves_unlock_date() {
        let mut f = setup();
        f.engine.deposit(f.signer1, 90, 8 * ONE_UNIT).unwrap();
        let old = f.engine.position(1);

        let new_unlock = old.unlock_at - 86_400 * 500;
        f.engine.change_unlock_date(f.admin, 1, new_unlock).unwrap();

        assert_eq!(f.engine.position(1).unlock_at, old.unlock_at - 86_400 * 500);
    }

    #[test]
    fn test_non_admin_rejected() {
        let mut f = setup();
        f.engine.deposit(f.signer1, 90, 8 * ONE_UNIT).unwrap();
        let old = f.engine.position(1);

        // even the position owner may not move it
        let err = f.engine.change_unlock_date(f.signer1, 1, old.unlock_at - 86_400 * 500);
        assert_eq!(err, Err(LedgerError::NotAdmin(f.signer1)));
        assert_eq!(f.engine.position(1), old);
    }

    #[test]
    fn test_unbounded_override_can_postpone_maturity() {
        let mut f = setup();
        f.engine.deposit(f.signer1, 30, ONE_UNIT).unwrap();
        f.clock.advance_days(31);

        // pushing unlock into the far future strips interest from a matured position
        f.engine.change_unlock_date(f.admin, 1, i64::MAX).unwrap();
        let payout = f.engine.close_position(f.signer1, 1).unwrap();

        assert_eq!(payout.amount(), ONE_UNIT);
        assert_eq!(payout.forfeited_interest, ONE_UNIT * 700 / 10_000);
    }
}

mod close_tests {
    use super::*;

    #[test]
    fn test_after_unlock_pays_principal_and_interest() {
        let mut f = setup();
        f.engine.deposit(f.signer2, 90, 8 * ONE_UNIT).unwrap();
        f.engine
            .change_unlock_date(f.admin, 1, GENESIS - 86_400 * 100)
            .unwrap();
        let position = f.engine.position(1);

        let payout = f.engine.close_position(f.signer2, 1).unwrap();

        assert_eq!(payout.recipient, f.signer2);
        assert_eq!(payout.amount(), position.principal + position.interest);
        assert!(payout.matured);
    }

    #[test]
    fn test_before_unlock_pays_principal_only() {
        let mut f = setup();
        f.engine.deposit(f.signer2, 90, 5 * ONE_UNIT).unwrap();
        let position = f.engine.position(1);

        let payout = f.engine.close_position(f.signer2, 1).unwrap();

        assert_eq!(payout.amount(), position.principal);
        assert_eq!(payout.interest, 0);
        assert_eq!(payout.forfeited_interest, position.interest);
    }

    #[test]
    fn test_exact_unlock_second_is_mature() {
        let mut f = setup();
        f.engine.deposit(f.signer1, 30, 10_000).unwrap();

        f.clock.set(GENESIS + 30 * SECONDS_PER_DAY - 1);
        assert!(!f.engine.position(1).is_unlocked(f.engine.now()));

        f.clock.advance(1);
        assert_eq!(f.engine.close_position(f.signer1, 1).unwrap().amount(), 10_700);
    }

    #[test]
    fn test_non_creator_rejected() {
        let mut f = setup();
        f.engine.deposit(f.signer2, 90, 5 * ONE_UNIT).unwrap();

        let err = f.engine.close_position(f.admin, 1).unwrap_err();
        assert_eq!(err, LedgerError::NotOwner { position_id: 1, caller: f.admin });
        assert!(err.to_string().contains("Only position creator may modify position"));
        assert!(f.engine.position(1).open);
    }

    #[test]
    fn test_already_closed_rejected() {
        let mut f = setup();
        f.engine.deposit(f.signer2, 90, 5 * ONE_UNIT).unwrap();
        f.engine.close_position(f.signer2, 1).unwrap();

        let err = f.engine.close_position(f.signer2, 1).unwrap_err();
        assert_eq!(err, LedgerError::NotOpen(1));
        assert!(err.to_string().contains("Position is closed"));
    }

    #[test]
    fn test_open_positions_wait_indefinitely() {
        let mut f = setup();
        f.engine.deposit(f.signer1, 30, 1_000).unwrap();
        f.clock.advance_days(10 * 365);

        assert!(f.engine.position(1).open);
        assert_eq!(f.engine.close_position(f.signer1, 1).unwrap().amount(), 1_070);
    }
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_one_unit_at_ninety_days() {
        let mut early = setup();
        early.engine.deposit(early.signer1, 90, 1_000_000).unwrap();
        assert_eq!(early.engine.position(1).interest, 100_000);
        assert_eq!(early.engine.close_position(early.signer1, 1).unwrap().amount(), 1_000_000);

        let mut late = setup();
        late.engine.deposit(late.signer1, 90, 1_000_000).unwrap();
        late.clock.advance_days(90);
        assert_eq!(late.engine.close_position(late.signer1, 1).unwrap().amount(), 1_100_000);
    }

    #[test]
    fn test_custody_accounting_over_mixed_lifecycle() {
        let mut f = setup();
        let reserve = f.engine.custody_balance();

        f.engine.deposit(f.signer1, 30, 1_000).unwrap();
        f.engine.deposit(f.signer2, 180, 2_000).unwrap();
        f.engine.deposit(f.signer1, 90, 3_000).unwrap();

        f.clock.advance_days(45);
        let early = f.engine.close_position(f.signer2, 2).unwrap();
        let matured = f.engine.close_position(f.signer1, 1).unwrap();

        let paid = early.amount() + matured.amount();
        assert_eq!(paid, 2_000 + 1_070);
        assert_eq!(f.engine.custody_balance(), reserve + 6_000 - paid);
        assert_eq!(f.engine.custody().total_paid_out(), paid);

        let report = f.engine.solvency();
        assert_eq!(report.obligations, 3_300);
    }

    #[test]
    fn test_event_log_tracks_mutations() {
        let mut f = setup();
        let baseline = f.engine.events().len();

        f.engine.deposit(f.signer1, 30, 1_000).unwrap();
        f.engine.modify_tier(f.admin, 30, 800).unwrap();
        f.engine.change_unlock_date(f.admin, 1, GENESIS).unwrap();
        f.engine.close_position(f.signer1, 1).unwrap();

        let events: Vec<_> = f.engine.events()[baseline..].iter().map(|r| &r.event).collect();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], LedgerEvent::PositionOpened { position } if position.position_id == 1));
        assert!(matches!(
            events[1],
            LedgerEvent::TierConfigured { lock_period_days: 30, rate_basis_points: 800, previous: Some(700) }
        ));
        assert!(matches!(events[2], LedgerEvent::UnlockDateChanged { position_id: 1, .. }));
        assert!(matches!(
            events[3],
            LedgerEvent::PositionClosed { interest_paid: 70, interest_forfeited: 0, .. }
        ));
    }
}
