//! In-memory account store
//!
//! This module provides `MemoryStore`, the [`AccountStore`] used by the CLI
//! and the test suite. Balances and ledgers live in `DashMap`s so that calls
//! for different accounts never contend on a global lock.
//!
//! # Simulated latency
//!
//! A store built with [`StoreLatency`] sleeps for a random duration before
//! every call. This makes the gap between a mutation's read and its write
//! wide enough that unserialized callers would visibly lose updates.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rand::Rng;

use super::traits::AccountStore;
use crate::types::{AccountId, Balance, HistoryEntry, Points, StoreError, TransactionKind};

/// Random per-call delay applied by [`MemoryStore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreLatency {
    /// Upper bound of the uniformly random delay, in milliseconds (0 disables it)
    pub max_millis: u64,
}

impl StoreLatency {
    pub fn new(max_millis: u64) -> Self {
        Self { max_millis }
    }

    async fn wait(&self) {
        if self.max_millis == 0 {
            return;
        }
        let millis = rand::thread_rng().gen_range(0..=self.max_millis);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

/// Account store backed by concurrent in-memory maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Last written balance per account
    balances: DashMap<AccountId, Balance>,

    /// Ledger per account, in append order
    histories: DashMap<AccountId, Vec<HistoryEntry>>,

    /// Last assigned history entry ID
    last_history_id: AtomicU64,

    latency: StoreLatency,
}

impl MemoryStore {
    /// Create an empty store without simulated latency
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that delays every call
    pub fn with_latency(latency: StoreLatency) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Snapshot of every written balance, sorted by account ID
    pub fn accounts(&self) -> Vec<Balance> {
        let mut accounts: Vec<Balance> = self
            .balances
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by_key(|balance| balance.account_id);
        accounts
    }

    /// Snapshot of every ledger entry, sorted by entry ID
    pub fn all_history(&self) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .histories
            .iter()
            .flat_map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|entry| entry.id);
        entries
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn read_balance(&self, account_id: AccountId) -> Result<Balance, StoreError> {
        self.latency.wait().await;

        // Absence of a record is not an error; nothing is inserted
        Ok(self
            .balances
            .get(&account_id)
            .map(|balance| balance.clone())
            .unwrap_or_else(|| Balance::empty(account_id)))
    }

    async fn write_balance(
        &self,
        account_id: AccountId,
        point: Points,
    ) -> Result<Balance, StoreError> {
        self.latency.wait().await;

        let balance = Balance {
            account_id,
            point,
            updated_at: Utc::now(),
        };
        self.balances.insert(account_id, balance.clone());
        Ok(balance)
    }

    async fn append_history(
        &self,
        account_id: AccountId,
        amount: Points,
        kind: TransactionKind,
        at: DateTime<Utc>,
    ) -> Result<HistoryEntry, StoreError> {
        self.latency.wait().await;

        let mut history = self.histories.entry(account_id).or_default();
        let entry = HistoryEntry {
            id: self.last_history_id.fetch_add(1, Ordering::SeqCst) + 1,
            account_id,
            amount,
            kind,
            occurred_at: at,
        };
        history.push(entry.clone());
        Ok(entry)
    }

    async fn list_history(&self, account_id: AccountId) -> Result<Vec<HistoryEntry>, StoreError> {
        self.latency.wait().await;

        Ok(self
            .histories
            .get(&account_id)
            .map(|history| history.clone())
            .unwrap_or_default())
    }
}
