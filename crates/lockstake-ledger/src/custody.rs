//! # Custody
//!
//! The pooled balance backing every open position.
//!
//! Value enters through deposits and admin reserve funding, and leaves only
//! through position payouts. Nothing here forces the pool to cover all open
//! obligations; [`SolvencyReport`] measures the gap and the engine's
//! [`SolvencyPolicy`](crate::engine::SolvencyPolicy) decides whether to act on it.

use lockstake_core::{Balance, LedgerError, Result};
use serde::{Deserialize, Serialize};

/// Pooled value held by the ledger
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Custody {
    /// Current pooled balance
    balance: Balance,

    /// Lifetime deposits received
    total_deposited: Balance,

    /// Lifetime admin reserve funding
    total_reserve_funded: Balance,

    /// Lifetime payouts released
    total_paid_out: Balance,
}

impl Custody {
    /// Create an empty pool
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a deposit into the pool
    pub fn receive_deposit(&mut self, amount: Balance) -> Result<Balance> {
        let balance = self.balance_after_credit(amount)?;
        let total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("total deposited"))?;

        self.balance = balance;
        self.total_deposited = total_deposited;
        Ok(balance)
    }

    /// Accept reserve funding into the pool
    pub fn receive_reserve(&mut self, amount: Balance) -> Result<Balance> {
        let balance = self.balance_after_credit(amount)?;
        let total_reserve_funded = self
            .total_reserve_funded
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("total reserve"))?;

        self.balance = balance;
        self.total_reserve_funded = total_reserve_funded;
        Ok(balance)
    }

    /// Release a payout from the pool
    pub fn release(&mut self, amount: Balance) -> Result<Balance> {
        let balance = self.balance_after_release(amount)?;
        let total_paid_out = self
            .total_paid_out
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("total paid out"))?;

        self.balance = balance;
        self.total_paid_out = total_paid_out;
        Ok(balance)
    }

    /// Balance after crediting `amount`, without mutating
    pub fn balance_after_credit(&self, amount: Balance) -> Result<Balance> {
        self.balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow("custody balance"))
    }

    /// Balance after releasing `amount`, without mutating
    pub fn balance_after_release(&self, amount: Balance) -> Result<Balance> {
        self.balance
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientCustody {
                requested: amount,
                available: self.balance,
            })
    }

    /// Current pooled balance
    pub fn balance(&self) -> Balance {
        self.balance
    }

    pub fn total_deposited(&self) -> Balance {
        self.total_deposited
    }

    pub fn total_reserve_funded(&self) -> Balance {
        self.total_reserve_funded
    }

    pub fn total_paid_out(&self) -> Balance {
        self.total_paid_out
    }
}

/// Pool balance against what open positions could claim
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvencyReport {
    /// Pooled balance
    pub custody: Balance,

    /// Principal + interest over open positions
    pub obligations: Balance,

    /// How far obligations exceed custody (0 when covered)
    pub shortfall: Balance,
}

impl SolvencyReport {
    pub fn new(custody: Balance, obligations: Balance) -> Self {
        Self {
            custody,
            obligations,
            shortfall: obligations.saturating_sub(custody),
        }
    }

    /// Check if every open position could be paid in full right now
    pub fn is_solvent(&self) -> bool {
        self.shortfall == 0
    }
}
