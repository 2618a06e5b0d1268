//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `balance`: Account identifiers, point amounts and the balance record
//! - `history`: Ledger entries and transaction kinds
//! - `error`: Error types for the point engine and the account store

pub mod balance;
pub mod error;
pub mod history;

pub use balance::{AccountId, Balance, Points, MAX_POINT};
pub use error::{ErrorKind, PointError, StoreError};
pub use history::{Command, HistoryEntry, TransactionKind};
