//! Balance-related types for the point ledger
//!
//! This module defines the account identifier, the point amount type and
//! the balance record returned by the account store.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Account identifier
///
/// Opaque positive integer. Used as the key of the gate table, so the same
/// account must always be referred to by the same value.
pub type AccountId = u64;

/// Point amount
///
/// Signed so that invalid requests (zero or negative amounts) can be
/// represented and rejected instead of silently wrapping.
pub type Points = i64;

/// Maximum balance any account may hold (1,000,000,000 points)
pub const MAX_POINT: Points = 1_000_000_000;

/// Current point balance of an account
///
/// Owned by the account store. The engine never caches it between calls;
/// every mutation re-reads the latest committed value under the account's gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Balance {
    /// The account this balance belongs to
    #[serde(rename = "account")]
    pub account_id: AccountId,

    /// Current amount, always within `[0, MAX_POINT]`
    pub point: Points,

    /// When the balance was last written (or read, for a never-written account)
    pub updated_at: DateTime<Utc>,
}

impl Balance {
    /// Create an empty balance for an account that has never been written
    pub fn empty(account_id: AccountId) -> Self {
        Balance {
            account_id,
            point: 0,
            updated_at: Utc::now(),
        }
    }
}
