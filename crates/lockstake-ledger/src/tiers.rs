//! # Tier Table
//!
//! Lock duration → interest rate configuration.
//!
//! ## Default Tiers
//!
//! | Lock Period | Rate (bp) | Rate (%) |
//! |-------------|-----------|----------|
//! | 30 days | 700 | 7% |
//! | 90 days | 1,000 | 10% |
//! | 180 days | 12,000 | 120% |
//!
//! Durations are enumerated in first-registration order. Reconfiguring a
//! known duration overwrites its rate but keeps its place in the sequence.

use indexmap::IndexMap;
use lockstake_core::{BasisPoints, LedgerError, LockDays, Result};
use serde::{Deserialize, Serialize};

/// Tiers seeded into every new ledger
pub const DEFAULT_TIERS: [(LockDays, BasisPoints); 3] = [(30, 700), (90, 1_000), (180, 12_000)];

/// A (lock duration, interest rate) pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Lock duration in days
    pub lock_period_days: LockDays,
    /// Interest paid on maturity, in basis points of principal
    pub rate_basis_points: BasisPoints,
}

/// Duration → rate mapping with stable enumeration order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTable {
    rates: IndexMap<LockDays, BasisPoints>,
}

impl TierTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table seeded with `tiers`, in order
    pub fn with_tiers(tiers: &[(LockDays, BasisPoints)]) -> Result<Self> {
        let mut table = Self::new();
        for &(days, rate) in tiers {
            table.upsert(days, rate)?;
        }
        Ok(table)
    }

    /// Insert or overwrite the rate for `days`
    ///
    /// Returns the previous rate when the duration was already known.
    /// Rates are not bounded.
    pub fn upsert(&mut self, days: LockDays, rate: BasisPoints) -> Result<Option<BasisPoints>> {
        if days == 0 {
            return Err(LedgerError::InvalidLockPeriod(days));
        }
        Ok(self.rates.insert(days, rate))
    }

    /// Rate for a lock duration
    pub fn rate_for(&self, days: LockDays) -> Result<BasisPoints> {
        self.rates.get(&days).copied().ok_or(LedgerError::UnknownTier(days))
    }

    /// Known durations in first-registration order
    pub fn durations(&self) -> Vec<LockDays> {
        self.rates.keys().copied().collect()
    }

    /// Duration at a position of the registration sequence
    pub fn duration_at(&self, index: usize) -> Option<LockDays> {
        self.rates.get_index(index).map(|(days, _)| *days)
    }

    /// All tiers in registration order
    pub fn tiers(&self) -> Vec<Tier> {
        self.rates
            .iter()
            .map(|(&lock_period_days, &rate_basis_points)| Tier {
                lock_period_days,
                rate_basis_points,
            })
            .collect()
    }

    /// Number of configured durations
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_table() -> TierTable {
        TierTable::with_tiers(&DEFAULT_TIERS).unwrap()
    }

    #[test]
    fn test_default_tiers() {
        let table = default_table();

        assert_eq!(table.durations(), vec![30, 90, 180]);
        assert_eq!(table.rate_for(30).unwrap(), 700);
        assert_eq!(table.rate_for(90).unwrap(), 1_000);
        assert_eq!(table.rate_for(180).unwrap(), 12_000);
    }

    #[test]
    fn test_unknown_tier() {
        let table = default_table();
        assert_eq!(table.rate_for(45), Err(LedgerError::UnknownTier(45)));
    }

    #[test]
    fn test_new_duration_is_appended() {
        let mut table = default_table();

        assert_eq!(table.upsert(100, 999).unwrap(), None);
        assert_eq!(table.rate_for(100).unwrap(), 999);
        assert_eq!(table.duration_at(3), Some(100));
        assert_eq!(table.duration_at(4), None);
    }

    #[test]
    fn test_overwrite_keeps_order() {
        let mut table = default_table();

        assert_eq!(table.upsert(30, 1_500).unwrap(), Some(700));
        assert_eq!(table.upsert(30, 1_600).unwrap(), Some(1_500));

        assert_eq!(table.rate_for(30).unwrap(), 1_600);
        assert_eq!(table.durations(), vec![30, 90, 180]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_order_is_registration_not_value() {
        let table = TierTable::with_tiers(&[(365, 1), (7, 2), (60, 3)]).unwrap();
        assert_eq!(table.durations(), vec![365, 7, 60]);
    }

    #[test]
    fn test_zero_days_rejected() {
        let mut table = TierTable::new();
        assert_eq!(table.upsert(0, 100), Err(LedgerError::InvalidLockPeriod(0)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_rates_are_unbounded() {
        let mut table = TierTable::new();
        table.upsert(1, BasisPoints::MAX).unwrap();
        table.upsert(2, 0).unwrap();

        assert_eq!(table.rate_for(1).unwrap(), BasisPoints::MAX);
        assert_eq!(table.rate_for(2).unwrap(), 0);
    }
}
