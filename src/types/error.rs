//! Error types for the point ledger
//!
//! This module defines all error types that can occur while mutating or
//! querying point balances.
//!
//! # Error Categories
//!
//! - **Rejections**: invalid amount, insufficient balance, capacity exceeded.
//!   The request was refused and nothing was written.
//! - **System failures**: the account store could not complete a call.
//!   The failure is propagated as-is; the engine never retries.

use super::balance::{AccountId, Points, MAX_POINT};
use thiserror::Error;

/// Error raised by an [`AccountStore`](crate::core::AccountStore) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store cannot be reached at all
    #[error("Account store unavailable: {message}")]
    Unavailable {
        /// Description of the outage
        message: String,
    },

    /// A single store call failed
    #[error("Account store failed to {operation} for account {account_id}: {message}")]
    Fault {
        /// Store operation that failed (read, write, append, list)
        operation: String,
        /// Account the call was made for
        account_id: AccountId,
        /// Description of the failure
        message: String,
    },
}

impl StoreError {
    /// Create a Fault error
    pub fn fault(operation: &str, account_id: AccountId, message: impl Into<String>) -> Self {
        StoreError::Fault {
            operation: operation.to_string(),
            account_id,
            message: message.into(),
        }
    }
}

/// Whether an error is the caller's fault or the system's
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request was invalid or violated a balance invariant
    Rejected,

    /// The system failed to carry out a valid request
    System,
}

/// Main error type for point operations
///
/// Every variant except [`PointError::Store`] is a rejection: the request
/// left the balance and the ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointError {
    /// Amount is zero or negative
    ///
    /// Raised before the gate or the store is touched.
    #[error("Invalid amount {amount}: amount must be a positive integer")]
    InvalidAmount {
        /// The rejected amount
        amount: Points,
    },

    /// Use would drive the balance below zero
    #[error(
        "Insufficient balance for account {account_id}: balance {balance}, requested {requested}"
    )]
    InsufficientBalance {
        /// Account ID
        account_id: AccountId,
        /// Balance observed under the gate
        balance: Points,
        /// Requested use amount
        requested: Points,
    },

    /// Charge would push the balance above the maximum
    #[error("Point limit exceeded for account {account_id}: balance {balance}, requested {requested}, limit {max}")]
    CapacityExceeded {
        /// Account ID
        account_id: AccountId,
        /// Balance observed under the gate
        balance: Points,
        /// Requested charge amount
        requested: Points,
        /// The limit that would have been exceeded
        max: Points,
    },

    /// The account store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PointError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Points) -> Self {
        PointError::InvalidAmount { amount }
    }

    /// Create an InsufficientBalance error
    pub fn insufficient_balance(account_id: AccountId, balance: Points, requested: Points) -> Self {
        PointError::InsufficientBalance {
            account_id,
            balance,
            requested,
        }
    }

    /// Create a CapacityExceeded error against [`MAX_POINT`]
    pub fn capacity_exceeded(account_id: AccountId, balance: Points, requested: Points) -> Self {
        PointError::CapacityExceeded {
            account_id,
            balance,
            requested,
            max: MAX_POINT,
        }
    }

    /// Classify the error for a transport layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            PointError::InvalidAmount { .. }
            | PointError::InsufficientBalance { .. }
            | PointError::CapacityExceeded { .. } => ErrorKind::Rejected,
            PointError::Store(_) => ErrorKind::System,
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.kind() == ErrorKind::Rejected
    }
}
