//! # lockstake Core
//!
//! Shared building blocks for the lockstake staking ledger:
//! - `Address` - 32-byte identity of depositors and of the ledger admin
//! - `Balance`, `Timestamp`, `PositionId` - the ledger's numeric vocabulary
//! - `Clock` - where the ledger reads `now` from
//! - `LedgerError` - every failure a ledger operation can return

pub mod clock;
pub mod error;
pub mod types;

pub use clock::*;
pub use error::*;
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::error::{LedgerError, Result};
    pub use crate::types::*;
}
