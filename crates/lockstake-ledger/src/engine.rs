//! # Staking Engine
//!
//! Deposit, settlement and administrative overrides over one ledger.
//!
//! ## Position State Machine
//!
//! ```text
//!   deposit ──► Open ──close_position (owner)──► Closed
//!                │
//!                └── change_unlock_date (admin) keeps it Open
//! ```
//!
//! ## Access Rules
//!
//! | Operation | Caller |
//! |-----------|--------|
//! | deposit | anyone |
//! | close_position | position owner |
//! | change_unlock_date | admin |
//! | modify_tier | admin |
//! | fund_reserve | admin |
//! | queries | anyone |
//!
//! Each mutating call validates everything that can fail before it touches
//! state, so an error never leaves a partial change behind.

use crate::custody::{Custody, SolvencyReport};
use crate::events::{EventLog, EventRecord, LedgerEvent};
use crate::index::AddressIndex;
use crate::positions::{Position, PositionStore};
use crate::snapshot::LedgerSnapshot;
use crate::tiers::{Tier, TierTable, DEFAULT_TIERS};
use lockstake_core::{
    Address, Balance, BasisPoints, Clock, LedgerError, LockDays, PositionId, Result,
    SystemClock, Timestamp,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How zero-value deposits are treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositPolicy {
    /// Accept them as zero-principal, zero-interest positions
    #[default]
    Permissive,
    /// Fail with `ZeroDeposit`
    RejectZero,
}

/// What to do when a deposit would leave obligations above custody
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolvencyPolicy {
    /// Accept the deposit and log the shortfall
    #[default]
    Permissive,
    /// Fail with `Insolvent`
    Enforced,
}

/// Engine policy and seed configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Zero-value deposit handling
    #[serde(default)]
    pub deposit_policy: DepositPolicy,

    /// Solvency handling
    #[serde(default)]
    pub solvency_policy: SolvencyPolicy,

    /// Tiers configured at initialization
    #[serde(default = "default_tiers")]
    pub default_tiers: Vec<Tier>,
}

fn default_tiers() -> Vec<Tier> {
    DEFAULT_TIERS
        .iter()
        .map(|&(lock_period_days, rate_basis_points)| Tier {
            lock_period_days,
            rate_basis_points,
        })
        .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            deposit_policy: DepositPolicy::default(),
            solvency_policy: SolvencyPolicy::default(),
            default_tiers: default_tiers(),
        }
    }
}

impl EngineConfig {
    /// Strict configuration: no zero deposits, no uncovered obligations
    pub fn strict() -> Self {
        Self {
            deposit_policy: DepositPolicy::RejectZero,
            solvency_policy: SolvencyPolicy::Enforced,
            default_tiers: default_tiers(),
        }
    }
}

/// Value released by a closure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub position_id: PositionId,

    /// Position owner receiving the value
    pub recipient: Address,

    /// Principal returned
    pub principal: Balance,

    /// Interest paid (0 on early closure)
    pub interest: Balance,

    /// Interest given up by closing early
    pub forfeited_interest: Balance,

    /// Closed at or after unlock
    pub matured: bool,
}

impl Payout {
    /// Total value released
    pub fn amount(&self) -> Balance {
        self.principal.saturating_add(self.interest)
    }
}

/// Log a rejected operation and pass the error through
fn rejected(operation: &'static str) -> impl Fn(LedgerError) -> LedgerError {
    move |err| {
        debug!(operation, code = err.code(), error = %err, "operation rejected");
        err
    }
}

/// The staking ledger
#[derive(Debug)]
pub struct StakingEngine<C: Clock = SystemClock> {
    /// Privileged identity
    admin: Address,

    config: EngineConfig,
    tiers: TierTable,
    positions: PositionStore,
    index: AddressIndex,
    custody: Custody,
    events: EventLog,
    clock: C,
}

impl StakingEngine<SystemClock> {
    /// Create a ledger on the wall clock
    pub fn with_system_clock(admin: Address, reserve: Balance, config: EngineConfig) -> Result<Self> {
        Self::new(admin, reserve, config, SystemClock)
    }
}

impl<C: Clock> StakingEngine<C> {
    /// Create a ledger owned by `admin`, funded with an initial interest reserve
    pub fn new(admin: Address, reserve: Balance, config: EngineConfig, clock: C) -> Result<Self> {
        let now = clock.now();
        let mut engine = Self {
            admin,
            tiers: TierTable::new(),
            positions: PositionStore::new(),
            index: AddressIndex::new(),
            custody: Custody::new(),
            events: EventLog::new(),
            config,
            clock,
        };

        for tier in engine.config.default_tiers.clone() {
            let previous = engine.tiers.upsert(tier.lock_period_days, tier.rate_basis_points)?;
            engine.events.record(
                now,
                LedgerEvent::TierConfigured {
                    lock_period_days: tier.lock_period_days,
                    rate_basis_points: tier.rate_basis_points,
                    previous,
                },
            );
        }

        if reserve > 0 {
            let custody = engine.custody.receive_reserve(reserve)?;
            engine.events.record(
                now,
                LedgerEvent::ReserveFunded {
                    from: admin,
                    amount: reserve,
                    custody,
                },
            );
        }

        info!(
            admin = %admin,
            reserve = %reserve,
            tiers = engine.tiers.len(),
            "staking ledger initialized"
        );

        Ok(engine)
    }

    // === Mutations ===

    /// Lock `value` for `days`, returning the new position id
    pub fn deposit(&mut self, caller: Address, days: LockDays, value: Balance) -> Result<PositionId> {
        self.apply_deposit(caller, days, value).map_err(rejected("deposit"))
    }

    fn apply_deposit(&mut self, caller: Address, days: LockDays, value: Balance) -> Result<PositionId> {
        if value == 0 && self.config.deposit_policy == DepositPolicy::RejectZero {
            return Err(LedgerError::ZeroDeposit);
        }

        let rate = self.tiers.rate_for(days)?;
        let now = self.clock.now();
        let position = self.positions.draft(caller, days, rate, value, now)?;

        let custody_after = self.custody.balance_after_credit(value)?;
        let open_obligations = self.positions.open_obligations();
        let report = match self.config.solvency_policy {
            SolvencyPolicy::Permissive => SolvencyReport::new(
                custody_after,
                open_obligations.saturating_add(position.obligation()),
            ),
            SolvencyPolicy::Enforced => {
                let obligations_after = open_obligations
                    .checked_add(position.principal)
                    .and_then(|total| total.checked_add(position.interest))
                    .filter(|&total| total <= custody_after);
                match obligations_after {
                    Some(obligations) => SolvencyReport::new(custody_after, obligations),
                    None => {
                        return Err(LedgerError::Insolvent {
                            obligations: open_obligations.saturating_add(position.obligation()),
                            custody: custody_after,
                        })
                    }
                }
            }
        };

        // Only fallible mutation; everything after it cannot fail
        self.custody.receive_deposit(value)?;

        let id = position.position_id;
        self.positions.insert(position.clone());
        self.index.append(caller, id);

        info!(
            position_id = id,
            owner = %caller,
            days,
            rate,
            principal = %position.principal,
            interest = %position.interest,
            unlock_at = position.unlock_at,
            "position opened"
        );

        if !report.is_solvent() {
            warn!(
                position_id = id,
                custody = %report.custody,
                obligations = %report.obligations,
                shortfall = %report.shortfall,
                "open obligations exceed custody"
            );
        }

        self.events.record(now, LedgerEvent::PositionOpened { position });

        Ok(id)
    }

    /// Close an open position, releasing principal and, once unlocked, interest
    pub fn close_position(&mut self, caller: Address, id: PositionId) -> Result<Payout> {
        self.apply_close(caller, id).map_err(rejected("close_position"))
    }

    fn apply_close(&mut self, caller: Address, id: PositionId) -> Result<Payout> {
        let position = self.positions.get(id);
        if !position.open {
            return Err(LedgerError::NotOpen(id));
        }
        if position.owner != caller {
            return Err(LedgerError::NotOwner {
                position_id: id,
                caller,
            });
        }

        let now = self.clock.now();
        let (interest, forfeited_interest) = position.settle_interest(now);
        let amount = position
            .principal
            .checked_add(interest)
            .ok_or(LedgerError::Overflow("payout"))?;

        self.custody.release(amount)?;
        self.positions.close(id)?;

        let payout = Payout {
            position_id: id,
            recipient: caller,
            principal: position.principal,
            interest,
            forfeited_interest,
            matured: position.is_unlocked(now),
        };

        info!(
            position_id = id,
            owner = %caller,
            principal = %payout.principal,
            interest = %payout.interest,
            forfeited = %payout.forfeited_interest,
            "position closed"
        );

        self.events.record(
            now,
            LedgerEvent::PositionClosed {
                position_id: id,
                owner: caller,
                principal: payout.principal,
                interest_paid: interest,
                interest_forfeited: forfeited_interest,
            },
        );

        Ok(payout)
    }

    /// Overwrite a position's unlock time
    ///
    /// Accepts any timestamp, past or future.
    pub fn change_unlock_date(&mut self, caller: Address, id: PositionId, unlock_at: Timestamp) -> Result<()> {
        self.apply_change_unlock(caller, id, unlock_at)
            .map_err(rejected("change_unlock_date"))
    }

    fn apply_change_unlock(&mut self, caller: Address, id: PositionId, unlock_at: Timestamp) -> Result<()> {
        self.ensure_admin(caller)?;
        let previous = self.positions.override_unlock_at(id, unlock_at)?;

        info!(position_id = id, previous, unlock_at, "unlock date changed");
        self.events.record(
            self.clock.now(),
            LedgerEvent::UnlockDateChanged {
                position_id: id,
                previous,
                unlock_at,
            },
        );
        Ok(())
    }

    /// Create or overwrite a tier
    pub fn modify_tier(&mut self, caller: Address, days: LockDays, rate: BasisPoints) -> Result<()> {
        self.apply_modify_tier(caller, days, rate)
            .map_err(rejected("modify_tier"))
    }

    fn apply_modify_tier(&mut self, caller: Address, days: LockDays, rate: BasisPoints) -> Result<()> {
        self.ensure_admin(caller)?;
        let previous = self.tiers.upsert(days, rate)?;

        info!(days, rate, previous = ?previous, "tier configured");
        self.events.record(
            self.clock.now(),
            LedgerEvent::TierConfigured {
                lock_period_days: days,
                rate_basis_points: rate,
                previous,
            },
        );
        Ok(())
    }

    /// Add value to the interest reserve, returning the new custody balance
    pub fn fund_reserve(&mut self, caller: Address, amount: Balance) -> Result<Balance> {
        self.apply_fund(caller, amount).map_err(rejected("fund_reserve"))
    }

    fn apply_fund(&mut self, caller: Address, amount: Balance) -> Result<Balance> {
        self.ensure_admin(caller)?;
        let custody = self.custody.receive_reserve(amount)?;

        info!(amount = %amount, custody = %custody, "reserve funded");
        self.events.record(
            self.clock.now(),
            LedgerEvent::ReserveFunded {
                from: caller,
                amount,
                custody,
            },
        );
        Ok(custody)
    }

    fn ensure_admin(&self, caller: Address) -> Result<()> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(LedgerError::NotAdmin(caller))
        }
    }

    // === Queries ===

    /// Ledger admin
    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Known lock durations in registration order
    pub fn list_tiers(&self) -> Vec<LockDays> {
        self.tiers.durations()
    }

    /// Lock duration at a position of the registration order
    pub fn tier_at(&self, index: usize) -> Option<LockDays> {
        self.tiers.duration_at(index)
    }

    /// Full tier list with rates
    pub fn tiers(&self) -> Vec<Tier> {
        self.tiers.tiers()
    }

    /// Current rate for a lock duration
    pub fn rate_for(&self, days: LockDays) -> Result<BasisPoints> {
        self.tiers.rate_for(days)
    }

    /// Position snapshot; the empty record for unknown ids
    pub fn position(&self, id: PositionId) -> Position {
        self.positions.get(id)
    }

    /// Ids created by `owner`, in creation order
    pub fn position_ids_for(&self, owner: &Address) -> &[PositionId] {
        self.index.ids_for(owner)
    }

    /// Positions created by `owner`, in creation order
    pub fn positions_for(&self, owner: &Address) -> Vec<Position> {
        self.position_ids_for(owner)
            .iter()
            .map(|&id| self.positions.get(id))
            .collect()
    }

    /// Next id to be assigned
    pub fn current_position_id(&self) -> PositionId {
        self.positions.current_id()
    }

    pub fn custody(&self) -> &Custody {
        &self.custody
    }

    /// Pooled balance
    pub fn custody_balance(&self) -> Balance {
        self.custody.balance()
    }

    /// Custody against open obligations
    pub fn solvency(&self) -> SolvencyReport {
        SolvencyReport::new(self.custody.balance(), self.positions.open_obligations())
    }

    /// Event history
    pub fn events(&self) -> &[EventRecord] {
        self.events.records()
    }

    /// Events with sequence number `sequence` or later
    pub fn events_since(&self, sequence: u64) -> &[EventRecord] {
        self.events.since(sequence)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current clock time
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    // === Persistence ===

    /// Capture the full ledger state
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            admin: self.admin,
            config: self.config.clone(),
            tiers: self.tiers.clone(),
            positions: self.positions.to_positions(),
            address_index: self.index.clone(),
            custody: self.custody.clone(),
            events: self.events.clone(),
        }
    }

    /// Rebuild a ledger from a snapshot
    ///
    /// The address index is recomputed from the position sequence and must
    /// match the stored one.
    pub fn restore(snapshot: LedgerSnapshot, clock: C) -> Result<Self> {
        let positions = PositionStore::from_positions(snapshot.positions)?;

        let index = AddressIndex::rebuild(positions.iter());
        if index != snapshot.address_index {
            return Err(LedgerError::CorruptSnapshot(
                "address index does not match position owners".to_string(),
            ));
        }

        if !snapshot.events.is_contiguous() {
            return Err(LedgerError::CorruptSnapshot(
                "event sequence has gaps".to_string(),
            ));
        }

        if snapshot.tiers.durations().contains(&0) {
            return Err(LedgerError::CorruptSnapshot(
                "tier with zero-day lock period".to_string(),
            ));
        }

        info!(
            admin = %snapshot.admin,
            positions = positions.len(),
            custody = %snapshot.custody.balance(),
            "staking ledger restored"
        );

        Ok(Self {
            admin: snapshot.admin,
            config: snapshot.config,
            tiers: snapshot.tiers,
            positions,
            index,
            custody: snapshot.custody,
            events: snapshot.events,
            clock,
        })
    }
}
