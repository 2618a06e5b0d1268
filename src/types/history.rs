//! Ledger-related types for the point ledger
//!
//! This module defines the append-only history entry, the kind of
//! transaction it records, and the command shape consumed by the engine.

use super::balance::{AccountId, Points};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of accepted transaction
///
/// The direction of a history entry is carried here; the entry's amount is
/// always a positive magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Points added to the balance
    Charge,

    /// Points spent from the balance
    Use,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Charge => f.write_str("charge"),
            TransactionKind::Use => f.write_str("use"),
        }
    }
}

/// One accepted transaction in an account's ledger
///
/// Created by the account store on append and never modified afterwards.
/// Entries for the same account are ordered by the serialized mutation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Store-assigned identifier, strictly increasing in append order
    pub id: u64,

    /// The account the transaction was applied to
    #[serde(rename = "account")]
    pub account_id: AccountId,

    /// Requested amount (always positive)
    pub amount: Points,

    /// Whether this was a charge or a use
    pub kind: TransactionKind,

    /// Timestamp taken from the balance write that accepted the transaction
    pub occurred_at: DateTime<Utc>,
}

/// A single charge or use request, as produced by an input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// Charge or use
    pub kind: TransactionKind,

    /// Target account
    pub account_id: AccountId,

    /// Requested amount, validated by the engine
    pub amount: Points,
}

impl Command {
    pub fn charge(account_id: AccountId, amount: Points) -> Self {
        Command {
            kind: TransactionKind::Charge,
            account_id,
            amount,
        }
    }

    pub fn use_points(account_id: AccountId, amount: Points) -> Self {
        Command {
            kind: TransactionKind::Use,
            account_id,
            amount,
        }
    }
}
