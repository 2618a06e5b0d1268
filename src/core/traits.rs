//! Core traits for the account store and the gate table
//!
//! This module defines the two seams of the engine: where balances and
//! ledgers live, and how mutations on one account are serialized.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::types::{AccountId, Balance, HistoryEntry, Points, StoreError, TransactionKind};

/// Storage capability for balances and ledgers
///
/// Each call, taken on its own, must be safe to invoke for a single account.
/// No atomicity across calls is expected here: the read, write and append of
/// one mutation are made atomic by [`PointEngine`](crate::core::PointEngine).
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Read the current balance, or a zero balance if the account was never written
    async fn read_balance(&self, account_id: AccountId) -> Result<Balance, StoreError>;

    /// Overwrite the balance and return the stored record with a fresh timestamp
    async fn write_balance(&self, account_id: AccountId, point: Points)
        -> Result<Balance, StoreError>;

    /// Append an entry to the account's ledger
    async fn append_history(
        &self,
        account_id: AccountId,
        amount: Points,
        kind: TransactionKind,
        at: DateTime<Utc>,
    ) -> Result<HistoryEntry, StoreError>;

    /// List the account's ledger in append order
    async fn list_history(&self, account_id: AccountId) -> Result<Vec<HistoryEntry>, StoreError>;
}

/// Mapping from account to its mutual-exclusion gate
///
/// Implementations must hand out the same gate for the same account on every
/// call, including under concurrent first use.
pub trait GateTable: Send + Sync {
    /// Get (or lazily create) the gate guarding `account_id`
    fn gate(&self, account_id: AccountId) -> Arc<Mutex<()>>;

    /// Number of gates currently allocated
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
