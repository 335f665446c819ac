//! # lockstake Ledger
//!
//! Time-locked staking: depositors lock native value for a tier's duration
//! and earn the tier's rate, fixed at deposit time.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | `TierTable` | lock duration → rate, admin-mutable |
//! | `PositionStore` | append-only deposit records |
//! | `AddressIndex` | depositor → position ids |
//! | `Custody` | pooled balance backing open positions |
//! | `EventLog` | sequenced record of every mutation |
//! | `StakingEngine` | access control, deposits and settlement |
//! | `SharedEngine` | serialized multi-threaded access |
//! | `LedgerSnapshot` | persisted, checksummed state |
//!
//! ## Settlement Rule
//!
//! Closing always returns principal. Interest, computed once as
//! `⌊principal × rate / 10,000⌋`, is paid only when the position is closed
//! at or after its unlock time.

pub mod custody;
pub mod engine;
pub mod events;
pub mod index;
pub mod positions;
pub mod shared;
pub mod snapshot;
pub mod tiers;

// Re-exports
pub use custody::{Custody, SolvencyReport};
pub use engine::{DepositPolicy, EngineConfig, Payout, SolvencyPolicy, StakingEngine};
pub use events::{EventLog, EventRecord, LedgerEvent};
pub use index::AddressIndex;
pub use positions::{interest_for, unlock_time, Position, PositionStore};
pub use shared::SharedEngine;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
pub use tiers::{Tier, TierTable, DEFAULT_TIERS};

pub use lockstake_core::{
    Address, Balance, BasisPoints, Clock, LedgerError, LockDays, ManualClock, PositionId, Result,
    SystemClock, Timestamp, ONE_UNIT, SECONDS_PER_DAY,
};
