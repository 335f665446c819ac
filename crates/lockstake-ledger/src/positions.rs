//! # Position Store
//!
//! Append-only record of every deposit.
//!
//! ## Position Economics
//!
//! ```text
//! unlock_at = created_at + lock_period_days × 86,400
//! interest  = ⌊principal × rate_basis_points / 10,000⌋   (fixed at creation)
//!
//! close before unlock_at  →  principal
//! close at/after unlock   →  principal + interest
//! ```
//!
//! Ids start at 1. Id 0 and every id not yet assigned read back as the empty
//! position: zero-valued, closed and ownerless.

use lockstake_core::{
    Address, Balance, BasisPoints, LedgerError, LockDays, PositionId, Result, Timestamp,
    BASIS_POINTS_DENOMINATOR, NULL_POSITION_ID, SECONDS_PER_DAY,
};
use serde::{Deserialize, Serialize};

/// First id handed out by a fresh store
pub const FIRST_POSITION_ID: PositionId = 1;

/// One deposit's ledger record
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Position id (0 for the empty record)
    pub position_id: PositionId,

    /// Depositor
    pub owner: Address,

    /// Deposit timestamp
    pub created_at: Timestamp,

    /// Earliest time at which closing pays interest
    pub unlock_at: Timestamp,

    /// Tier rate captured at deposit time
    pub rate_basis_points: BasisPoints,

    /// Deposited amount
    pub principal: Balance,

    /// Interest owed on maturity
    pub interest: Balance,

    /// Still holding funds
    pub open: bool,
}

impl Position {
    /// The zero-valued record returned for unknown ids
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if this is the empty record
    pub fn is_empty(&self) -> bool {
        self.position_id == NULL_POSITION_ID
    }

    /// Check if interest is payable at `now`
    pub fn is_unlocked(&self, now: Timestamp) -> bool {
        now >= self.unlock_at
    }

    /// Principal plus interest, the most this position can ever pay
    ///
    /// Saturates at `Balance::MAX`.
    pub fn obligation(&self) -> Balance {
        self.principal.saturating_add(self.interest)
    }

    /// Split a closure at `now` into (interest paid, interest forfeited)
    pub fn settle_interest(&self, now: Timestamp) -> (Balance, Balance) {
        if self.is_unlocked(now) {
            (self.interest, 0)
        } else {
            (0, self.interest)
        }
    }
}

/// Interest for `principal` at `rate` basis points, floored
pub fn interest_for(principal: Balance, rate: BasisPoints) -> Result<Balance> {
    principal
        .checked_mul(Balance::from(rate))
        .map(|scaled| scaled / BASIS_POINTS_DENOMINATOR)
        .ok_or(LedgerError::Overflow("interest"))
}

/// Unlock time for a deposit made at `created_at`
pub fn unlock_time(created_at: Timestamp, days: LockDays) -> Result<Timestamp> {
    i64::from(days)
        .checked_mul(SECONDS_PER_DAY)
        .and_then(|lock| created_at.checked_add(lock))
        .ok_or(LedgerError::Overflow("unlock time"))
}

/// Append-only position collection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionStore {
    /// Position `n` lives at index `n - 1`
    positions: Vec<Position>,

    /// Next id to assign
    next_id: PositionId,

    /// Running principal + interest over open positions (saturating)
    open_obligations: Balance,
}

impl Default for PositionStore {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            next_id: FIRST_POSITION_ID,
            open_obligations: 0,
        }
    }
}

impl PositionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a persisted position sequence
    ///
    /// Ids must run 1, 2, 3, ... without gaps.
    pub fn from_positions(positions: Vec<Position>) -> Result<Self> {
        for (index, position) in positions.iter().enumerate() {
            let expected = index as PositionId + FIRST_POSITION_ID;
            if position.position_id != expected {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "position at index {index} has id {}, expected {expected}",
                    position.position_id
                )));
            }
        }

        let next_id = (positions.len() as PositionId)
            .checked_add(FIRST_POSITION_ID)
            .ok_or(LedgerError::Overflow("position id"))?;

        let open_obligations = positions
            .iter()
            .filter(|p| p.open)
            .fold(0, |total: Balance, p| total.saturating_add(p.obligation()));

        Ok(Self {
            positions,
            next_id,
            open_obligations,
        })
    }

    /// Create and store an open position
    pub fn create(
        &mut self,
        owner: Address,
        days: LockDays,
        rate: BasisPoints,
        principal: Balance,
        now: Timestamp,
    ) -> Result<Position> {
        let position = self.draft(owner, days, rate, principal, now)?;
        self.insert(position.clone());
        Ok(position)
    }

    /// Compute the next position without storing it
    pub(crate) fn draft(
        &self,
        owner: Address,
        days: LockDays,
        rate: BasisPoints,
        principal: Balance,
        now: Timestamp,
    ) -> Result<Position> {
        // The counter must be able to move past the id we hand out
        self.next_id
            .checked_add(1)
            .ok_or(LedgerError::Overflow("position id"))?;

        Ok(Position {
            position_id: self.next_id,
            owner,
            created_at: now,
            unlock_at: unlock_time(now, days)?,
            rate_basis_points: rate,
            principal,
            interest: interest_for(principal, rate)?,
            open: true,
        })
    }

    /// Store a position produced by `draft`
    pub(crate) fn insert(&mut self, position: Position) {
        debug_assert_eq!(position.position_id, self.next_id);
        self.next_id = position.position_id + 1;
        self.open_obligations = self.open_obligations.saturating_add(position.obligation());
        self.positions.push(position);
    }

    /// Position snapshot; the empty record for unassigned ids
    pub fn get(&self, id: PositionId) -> Position {
        self.get_ref(id).cloned().unwrap_or_default()
    }

    /// Borrow a stored position
    pub fn get_ref(&self, id: PositionId) -> Option<&Position> {
        let index = id.checked_sub(FIRST_POSITION_ID)?;
        self.positions.get(usize::try_from(index).ok()?)
    }

    fn get_mut(&mut self, id: PositionId) -> Option<&mut Position> {
        let index = id.checked_sub(FIRST_POSITION_ID)?;
        self.positions.get_mut(usize::try_from(index).ok()?)
    }

    /// Mark a position closed
    pub(crate) fn close(&mut self, id: PositionId) -> Result<()> {
        match self.get_mut(id) {
            Some(position) if position.open => {
                position.open = false;
                let released = position.obligation();
                self.open_obligations = self.open_obligations.saturating_sub(released);
                Ok(())
            }
            _ => Err(LedgerError::NotOpen(id)),
        }
    }

    /// Replace a position's unlock time, returning the old one
    pub fn override_unlock_at(&mut self, id: PositionId, unlock_at: Timestamp) -> Result<Timestamp> {
        let position = self.get_mut(id).ok_or(LedgerError::PositionNotFound(id))?;
        Ok(std::mem::replace(&mut position.unlock_at, unlock_at))
    }

    /// Next id to be assigned
    pub fn current_id(&self) -> PositionId {
        self.next_id
    }

    /// Number of positions ever created
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// All positions in id order
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    /// Sum of principal + interest over open positions, saturating
    pub fn open_obligations(&self) -> Balance {
        self.open_obligations
    }

    /// Persisted form: the position sequence
    pub fn to_positions(&self) -> Vec<Position> {
        self.positions.clone()
    }
}
