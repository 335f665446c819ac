//! Seed scenario replay
//!
//! Funds a fresh in-memory ledger with 10 units, stakes five positions for
//! one depositor and pulls two unlock dates 100 days into the past.

use lockstake_ledger::{
    Address, Balance, EngineConfig, LockDays, ManualClock, Position, PositionId, SolvencyReport,
    StakingEngine, Timestamp, ONE_UNIT, SECONDS_PER_DAY,
};
use serde::Serialize;

/// Admin of the demo ledger
pub const DEMO_ADMIN: Address = Address::new([0xa0; 32]);

/// The single depositor
pub const DEMO_DEPOSITOR: Address = Address::new([0x01; 32]);

const RESERVE: Balance = 10 * ONE_UNIT;

const BACKDATE_DAYS: i64 = 100;

/// One scripted step
enum Step {
    Stake(LockDays, Balance),
    Backdate(PositionId),
}

const SCRIPT: [Step; 7] = [
    Step::Stake(30, ONE_UNIT / 2),
    Step::Stake(180, ONE_UNIT),
    Step::Stake(180, 7 * ONE_UNIT / 4),
    Step::Stake(90, 5 * ONE_UNIT),
    Step::Backdate(3),
    Step::Stake(180, 7 * ONE_UNIT / 4),
    Step::Backdate(4),
];

/// Resulting ledger state
#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub admin: Address,
    pub depositor: Address,
    pub started_at: Timestamp,
    pub positions: Vec<Position>,
    /// Positions that would pay interest if closed now
    pub matured: Vec<PositionId>,
    pub solvency: SolvencyReport,
    pub event_count: usize,
}

/// Replay the scenario starting at `now`
pub fn run(config: EngineConfig, now: Timestamp) -> lockstake_ledger::Result<DemoReport> {
    let clock = ManualClock::new(now);
    let mut engine = StakingEngine::new(DEMO_ADMIN, RESERVE, config, clock.clone())?;

    for step in &SCRIPT {
        match *step {
            Step::Stake(days, value) => {
                engine.deposit(DEMO_DEPOSITOR, days, value)?;
            }
            Step::Backdate(id) => {
                let unlock_at = engine.now() - BACKDATE_DAYS * SECONDS_PER_DAY;
                engine.change_unlock_date(DEMO_ADMIN, id, unlock_at)?;
            }
        }
        clock.advance(1);
    }

    let positions = engine.positions_for(&DEMO_DEPOSITOR);
    let matured = positions
        .iter()
        .filter(|p| p.open && p.is_unlocked(engine.now()))
        .map(|p| p.position_id)
        .collect();

    Ok(DemoReport {
        admin: DEMO_ADMIN,
        depositor: DEMO_DEPOSITOR,
        started_at: now,
        positions,
        matured,
        solvency: engine.solvency(),
        event_count: engine.events().len(),
    })
}
