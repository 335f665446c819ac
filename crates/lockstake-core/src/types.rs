//! Core type definitions for lockstake
//!
//! Identities, amounts, timestamps and the unit constants shared by the
//! ledger and its front ends.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Amount of the native value asset, in the smallest unit
pub type Balance = u128;

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Position identifier; 0 is reserved for "does not exist"
pub type PositionId = u64;

/// Lock duration in whole days
pub type LockDays = u32;

/// Interest rate in basis points (10000 = 100%)
pub type BasisPoints = u32;

/// Decimal places of the native asset
pub const DECIMALS: u8 = 18;

/// One whole unit of the native asset in smallest units
pub const ONE_UNIT: Balance = 1_000_000_000_000_000_000; // 10^18

/// Basis point denominator
pub const BASIS_POINTS_DENOMINATOR: u128 = 10_000;

/// Seconds in one lock day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// The reserved "no position" id
pub const NULL_POSITION_ID: PositionId = 0;

/// Address - 32-byte identity of a depositor or of the ledger admin
///
/// Displayed and parsed as lowercase hex, with an optional `0x` prefix on input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    bytes: [u8; 32],
}

impl Address {
    /// Create an address from raw bytes
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Address whose every byte is `byte` (handy for fixtures)
    pub const fn repeat(byte: u8) -> Self {
        Self { bytes: [byte; 32] }
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// True for the all-zero address used by the empty position record
    pub fn is_zero(&self) -> bool {
        self.bytes == [0u8; 32]
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> Result<Self, LedgerError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let raw = hex::decode(digits).map_err(|e| LedgerError::InvalidAddress(format!("{s}: {e}")))?;
        let bytes: [u8; 32] = raw.try_into().map_err(|raw: Vec<u8>| {
            LedgerError::InvalidAddress(format!("{s}: expected 32 bytes, got {}", raw.len()))
        })?;

        Ok(Self { bytes })
    }

    /// Zero/null address (owner of the empty position record)
    pub const ZERO: Self = Self { bytes: [0u8; 32] };
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Address {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self::new(bytes)
    }
}
