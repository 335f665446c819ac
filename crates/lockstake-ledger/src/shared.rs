//! Thread-safe ledger handle
//!
//! Every call takes the one lock for its full duration, so operations from
//! any number of threads execute as a single total order.

use crate::engine::StakingEngine;
use lockstake_core::{Clock, SystemClock};
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable handle to one serialized ledger
pub struct SharedEngine<C: Clock = SystemClock> {
    inner: Arc<Mutex<StakingEngine<C>>>,
}

impl<C: Clock> Clone for SharedEngine<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> SharedEngine<C> {
    pub fn new(engine: StakingEngine<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run one operation with exclusive access
    pub fn execute<R>(&self, op: impl FnOnce(&mut StakingEngine<C>) -> R) -> R {
        let mut engine = self.inner.lock();
        op(&mut engine)
    }

    /// Run a query
    pub fn read<R>(&self, query: impl FnOnce(&StakingEngine<C>) -> R) -> R {
        let engine = self.inner.lock();
        query(&engine)
    }
}
