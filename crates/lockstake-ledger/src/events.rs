//! Ledger event log
//!
//! One record per successful mutation, in execution order. Rejected
//! operations leave no trace here.

use crate::positions::Position;
use lockstake_core::{Address, Balance, BasisPoints, LockDays, PositionId, Timestamp};
use serde::{Deserialize, Serialize};

/// What happened
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Admin added value to the interest reserve
    ReserveFunded {
        from: Address,
        amount: Balance,
        custody: Balance,
    },

    /// Tier created or overwritten
    TierConfigured {
        lock_period_days: LockDays,
        rate_basis_points: BasisPoints,
        previous: Option<BasisPoints>,
    },

    /// Deposit accepted
    PositionOpened { position: Position },

    /// Position paid out
    PositionClosed {
        position_id: PositionId,
        owner: Address,
        principal: Balance,
        interest_paid: Balance,
        interest_forfeited: Balance,
    },

    /// Admin override of an unlock time
    UnlockDateChanged {
        position_id: PositionId,
        previous: Timestamp,
        unlock_at: Timestamp,
    },
}

/// Sequenced event
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at 0
    pub sequence: u64,

    /// Clock time of the operation
    pub timestamp: Timestamp,

    pub event: LedgerEvent,
}

/// Append-only event history
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number
    pub fn record(&mut self, timestamp: Timestamp, event: LedgerEvent) -> u64 {
        let sequence = self.records.len() as u64;
        self.records.push(EventRecord {
            sequence,
            timestamp,
            event,
        });
        sequence
    }

    /// All records in order
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records from `sequence` onward
    pub fn since(&self, sequence: u64) -> &[EventRecord] {
        let start = usize::try_from(sequence).unwrap_or(usize::MAX).min(self.records.len());
        &self.records[start..]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check that sequence numbers run 0, 1, 2, ...
    pub fn is_contiguous(&self) -> bool {
        self.records
            .iter()
            .enumerate()
            .all(|(i, record)| record.sequence == i as u64)
    }
}
