//! Gate tables for per-account serialization
//!
//! This module provides the two [`GateTable`] implementations used by the
//! engine.
//!
//! # Design
//!
//! `PerAccountGates` uses `DashMap` (a concurrent HashMap) keyed by account.
//! The first reference to an account inserts its gate through the map's
//! entry API, which holds the shard lock only for the insert-if-absent check.
//! Two concurrent first touches therefore always observe the same gate.
//! Gates are never removed, so memory grows with the number of distinct
//! accounts ever touched.
//!
//! `StripedGates` allocates a fixed number of gates up front and maps each
//! account to `account_id % stripes`. Memory is bounded, but accounts sharing
//! a stripe serialize behind each other.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use super::traits::GateTable;
use crate::types::AccountId;

/// One gate per account, created on first use
#[derive(Debug, Default)]
pub struct PerAccountGates {
    /// Gate per account ID
    ///
    /// DashMap shards its internal locking, so first touches of unrelated
    /// accounts rarely contend on the same shard.
    gates: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl PerAccountGates {
    /// Create an empty gate table
    pub fn new() -> Self {
        Self {
            gates: DashMap::new(),
        }
    }
}

impl GateTable for PerAccountGates {
    fn gate(&self, account_id: AccountId) -> Arc<Mutex<()>> {
        let entry = self
            .gates
            .entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }

    fn len(&self) -> usize {
        self.gates.len()
    }
}

/// Fixed-size table of striped gates
#[derive(Debug)]
pub struct StripedGates {
    stripes: Vec<Arc<Mutex<()>>>,
}

impl StripedGates {
    /// Create a table with `stripes` gates
    ///
    /// A stripe count of zero is coerced to one.
    pub fn new(stripes: usize) -> Self {
        let stripes = if stripes == 0 {
            tracing::warn!("Invalid stripe count (0), using a single stripe");
            1
        } else {
            stripes
        };

        Self {
            stripes: (0..stripes).map(|_| Arc::new(Mutex::new(()))).collect(),
        }
    }

    /// Index of the stripe guarding `account_id`
    pub fn stripe_of(&self, account_id: AccountId) -> usize {
        (account_id % self.stripes.len() as u64) as usize
    }
}

impl GateTable for StripedGates {
    fn gate(&self, account_id: AccountId) -> Arc<Mutex<()>> {
        Arc::clone(&self.stripes[self.stripe_of(account_id)])
    }

    fn len(&self) -> usize {
        self.stripes.len()
    }
}
