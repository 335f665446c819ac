//! Per-depositor position history
//!
//! Every successful deposit appends exactly one id under its creator. Lists
//! are never reordered or pruned, so closed positions stay listed.

use crate::positions::Position;
use lockstake_core::{Address, PositionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Address → ids of positions created by that address, in creation order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressIndex {
    by_owner: BTreeMap<Address, Vec<PositionId>>,
}

impl AddressIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index from a position sequence
    pub fn rebuild<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Self {
        let mut index = Self::new();
        for position in positions {
            index.append(position.owner, position.position_id);
        }
        index
    }

    /// Record a new position for `owner`
    pub fn append(&mut self, owner: Address, id: PositionId) {
        self.by_owner.entry(owner).or_default().push(id);
    }

    /// Ids created by `owner`; empty for unknown addresses
    pub fn ids_for(&self, owner: &Address) -> &[PositionId] {
        self.by_owner.get(owner).map(Vec::as_slice).unwrap_or(&[])
    }
}
