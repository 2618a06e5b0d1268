//! Serialized point mutation engine
//!
//! This module provides `PointEngine`, which turns the individual calls of an
//! [`AccountStore`] into atomic per-account mutations.
//!
//! # Design
//!
//! Every charge or use runs its read-validate-write-append sequence inside
//! [`PointEngine::run_exclusive`], holding the account's gate from the
//! [`GateTable`]. The gate is taken with `lock_owned`, so the guard is released
//! when it goes out of scope: on success, on a rejection, on a store fault and
//! when the calling future is dropped mid-flight.
//!
//! # Architecture
//!
//! ```text
//! PointEngine
//!     ├── Arc<dyn AccountStore>  (balances and ledgers)
//!     └── Arc<dyn GateTable>     (one gate per account, or striped)
//! ```
//!
//! # Consistency
//!
//! - Mutations on the same account are totally ordered.
//! - Mutations on different accounts never wait for each other (with
//!   per-account gates).
//! - `get_balance` and `get_history` do not take the gate and may observe
//!   either side of an in-flight mutation.

use std::future::Future;
use std::sync::Arc;

use super::gate_table::PerAccountGates;
use super::traits::{AccountStore, GateTable};
use crate::types::{
    AccountId, Balance, Command, HistoryEntry, PointError, Points, TransactionKind, MAX_POINT,
};

/// Point charge/use orchestrator
///
/// Cloning is cheap: clones share the same store and gate table, so an engine
/// can be handed to many tasks.
#[derive(Clone)]
pub struct PointEngine {
    store: Arc<dyn AccountStore>,
    gates: Arc<dyn GateTable>,
}

impl PointEngine {
    /// Create an engine with one gate per account
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self::with_gates(store, Arc::new(PerAccountGates::new()))
    }

    /// Create an engine with a custom gate table
    pub fn with_gates(store: Arc<dyn AccountStore>, gates: Arc<dyn GateTable>) -> Self {
        Self { store, gates }
    }

    /// The gate table used by this engine
    pub fn gates(&self) -> &Arc<dyn GateTable> {
        &self.gates
    }

    /// Run `operation` while holding the gate of `account_id`
    ///
    /// No other `run_exclusive` for the same gate runs concurrently. The gate is
    /// released exactly once, whichever way `operation` exits.
    pub async fn run_exclusive<T, F, Fut>(&self, account_id: AccountId, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _guard = self.gates.gate(account_id).lock_owned().await;
        operation().await
    }

    /// Add `amount` points to an account
    ///
    /// # Returns
    ///
    /// * `Ok(Balance)` - The updated balance
    /// * `Err(PointError::InvalidAmount)` - If `amount` is not positive
    /// * `Err(PointError::CapacityExceeded)` - If the result would exceed [`MAX_POINT`]
    /// * `Err(PointError::Store)` - If the store failed
    pub async fn charge(
        &self,
        account_id: AccountId,
        amount: Points,
    ) -> Result<Balance, PointError> {
        validate_amount(amount)?;

        self.run_exclusive(account_id, move || async move {
            let current = self.store.read_balance(account_id).await?;

            let new_point = current
                .point
                .checked_add(amount)
                .filter(|point| *point <= MAX_POINT)
                .ok_or_else(|| {
                    PointError::capacity_exceeded(account_id, current.point, amount)
                })?;

            self.commit(account_id, amount, current.point, new_point, TransactionKind::Charge)
                .await
        })
        .await
        .inspect(|balance| {
            tracing::debug!(account_id, amount, point = balance.point, "charged");
        })
        .inspect_err(|e| log_failure("charge", account_id, amount, e))
    }

    /// Spend `amount` points from an account
    ///
    /// # Returns
    ///
    /// * `Ok(Balance)` - The updated balance
    /// * `Err(PointError::InvalidAmount)` - If `amount` is not positive
    /// * `Err(PointError::InsufficientBalance)` - If the result would be negative
    /// * `Err(PointError::Store)` - If the store failed
    pub async fn use_points(
        &self,
        account_id: AccountId,
        amount: Points,
    ) -> Result<Balance, PointError> {
        validate_amount(amount)?;

        self.run_exclusive(account_id, move || async move {
            let current = self.store.read_balance(account_id).await?;

            let new_point = current.point - amount;
            if new_point < 0 {
                return Err(PointError::insufficient_balance(
                    account_id,
                    current.point,
                    amount,
                ));
            }

            self.commit(account_id, amount, current.point, new_point, TransactionKind::Use)
                .await
        })
        .await
        .inspect(|balance| {
            tracing::debug!(account_id, amount, point = balance.point, "used");
        })
        .inspect_err(|e| log_failure("use", account_id, amount, e))
    }

    /// Apply a charge or use command
    pub async fn apply(&self, command: Command) -> Result<Balance, PointError> {
        match command.kind {
            TransactionKind::Charge => self.charge(command.account_id, command.amount).await,
            TransactionKind::Use => self.use_points(command.account_id, command.amount).await,
        }
    }

    /// Current balance of an account (zero if never written)
    pub async fn get_balance(&self, account_id: AccountId) -> Result<Balance, PointError> {
        Ok(self.store.read_balance(account_id).await?)
    }

    /// Ledger of an account in acceptance order
    pub async fn get_history(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<HistoryEntry>, PointError> {
        Ok(self.store.list_history(account_id).await?)
    }

    /// Write the validated balance, then record it in the ledger
    ///
    /// If the ledger append fails, the balance is written back to `previous`
    /// so the balance still equals the ledger sum. The append error is
    /// returned unless the restoring write fails too, in which case that
    /// error is returned instead.
    ///
    /// Must only be called while holding the account's gate.
    async fn commit(
        &self,
        account_id: AccountId,
        amount: Points,
        previous: Points,
        new_point: Points,
        kind: TransactionKind,
    ) -> Result<Balance, PointError> {
        let updated = self.store.write_balance(account_id, new_point).await?;

        if let Err(error) = self
            .store
            .append_history(account_id, amount, kind, updated.updated_at)
            .await
        {
            tracing::error!(
                account_id,
                amount,
                %kind,
                restored = previous,
                %error,
                "ledger append failed, restoring balance"
            );
            self.store.write_balance(account_id, previous).await?;
            return Err(error.into());
        }

        Ok(updated)
    }
}

fn validate_amount(amount: Points) -> Result<(), PointError> {
    if amount <= 0 {
        tracing::warn!(amount, "rejected non-positive amount");
        return Err(PointError::invalid_amount(amount));
    }
    Ok(())
}

fn log_failure(operation: &str, account_id: AccountId, amount: Points, error: &PointError) {
    if error.is_rejected() {
        tracing::warn!(operation, account_id, amount, %error, "rejected");
    } else {
        tracing::error!(operation, account_id, amount, %error, "store failure");
    }
}
