//! Error types for lockstake ledger operations

use crate::types::{Address, Balance, LockDays, PositionId};
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations
///
/// Every error aborts the attempted mutation in full.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Tier Operations ===
    /// No rate is configured for the lock duration
    #[error("Unknown tier: no rate configured for {0} days")]
    UnknownTier(LockDays),

    /// Lock durations must be at least one day
    #[error("Invalid lock period: {0} days")]
    InvalidLockPeriod(LockDays),

    // === Position Operations ===
    /// Position is closed or was never created
    #[error("Position is closed: {0}")]
    NotOpen(PositionId),

    /// Caller did not create the position
    #[error("Only position creator may modify position {position_id} (caller {caller})")]
    NotOwner { position_id: PositionId, caller: Address },

    /// Position id has not been assigned
    #[error("Position not found: {0}")]
    PositionNotFound(PositionId),

    /// Deposit carried no value under a policy that rejects it
    #[error("Deposit value must be greater than zero")]
    ZeroDeposit,

    // === Access Control ===
    /// Admin-only operation attempted by another identity
    #[error("Caller is not the ledger admin: {0}")]
    NotAdmin(Address),

    // === Custody ===
    /// Pooled balance cannot cover a payout
    #[error("Insufficient custody: requested {requested}, available {available}")]
    InsufficientCustody { requested: Balance, available: Balance },

    /// Deposit would leave obligations above custody under an enforced solvency policy
    #[error("Ledger would be insolvent: obligations {obligations} exceed custody {custody}")]
    Insolvent { obligations: Balance, custody: Balance },

    // === Arithmetic ===
    /// Checked arithmetic exceeded the representable range
    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),

    // === Input ===
    /// Malformed identity
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // === Storage Errors ===
    /// Snapshot file could not be read or written
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Snapshot could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Snapshot decoded but its contents are inconsistent
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

/// Stable error codes for front ends
impl LedgerError {
    /// Get the numeric error code
    pub fn code(&self) -> u32 {
        match self {
            Self::UnknownTier(_) => 1001,
            Self::InvalidLockPeriod(_) => 1002,
            Self::NotOpen(_) => 1101,
            Self::NotOwner { .. } => 1102,
            Self::PositionNotFound(_) => 1103,
            Self::ZeroDeposit => 1104,
            Self::NotAdmin(_) => 1201,
            Self::InsufficientCustody { .. } => 1301,
            Self::Insolvent { .. } => 1302,
            Self::Overflow(_) => 1401,
            Self::InvalidAddress(_) => 1501,
            Self::StorageError(_) | Self::SerializationError(_) | Self::CorruptSnapshot(_) => 1601,
        }
    }

    /// Check if the error was raised by an access check
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotOwner { .. } | Self::NotAdmin(_))
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}
