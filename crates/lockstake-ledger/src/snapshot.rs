//! # Ledger Snapshots
//!
//! The persisted state layout: tier table, position sequence and address
//! index, plus custody, admin, policy and the event log.
//!
//! ## File Format
//!
//! ```text
//! {
//!   "version": 1,
//!   "checksum": "<blake3 hex of the serialized ledger>",
//!   "ledger": { ... }
//! }
//! ```
//!
//! Files are written to a sibling temporary path and renamed into place.

use crate::custody::Custody;
use crate::engine::EngineConfig;
use crate::events::EventLog;
use crate::index::AddressIndex;
use crate::positions::Position;
use crate::tiers::TierTable;
use lockstake_core::{Address, LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Complete ledger state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub admin: Address,
    pub config: EngineConfig,
    pub tiers: TierTable,
    /// Positions in id order, starting at 1
    pub positions: Vec<Position>,
    pub address_index: AddressIndex,
    pub custody: Custody,
    pub events: EventLog,
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    checksum: String,
    ledger: LedgerSnapshot,
}

fn encode_err(err: serde_json::Error) -> LedgerError {
    LedgerError::SerializationError(err.to_string())
}

impl LedgerSnapshot {
    /// BLAKE3 digest of the serialized ledger, hex encoded
    pub fn checksum(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self).map_err(encode_err)?;
        Ok(hex::encode(blake3::hash(&bytes).as_bytes()))
    }

    /// Encode with version and checksum
    pub fn to_json(&self) -> Result<String> {
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            checksum: self.checksum()?,
            ledger: self.clone(),
        };
        serde_json::to_string_pretty(&file).map_err(encode_err)
    }

    /// Decode and verify version and checksum
    pub fn from_json(json: &str) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(json).map_err(encode_err)?;

        if file.version != SNAPSHOT_VERSION {
            return Err(LedgerError::CorruptSnapshot(format!(
                "unsupported snapshot version {}",
                file.version
            )));
        }

        let actual = file.ledger.checksum()?;
        if actual != file.checksum {
            return Err(LedgerError::CorruptSnapshot(format!(
                "checksum mismatch: stored {}, computed {}",
                file.checksum, actual
            )));
        }

        Ok(file.ledger)
    }

    /// Write the snapshot to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        tracing::debug!(path = %path.display(), positions = self.positions.len(), "snapshot saved");
        Ok(())
    }

    /// Read a snapshot from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&json)?;

        tracing::debug!(path = %path.display(), positions = snapshot.positions.len(), "snapshot loaded");
        Ok(snapshot)
    }
}
