//! CSV format handling for point commands, balances and ledgers
//!
//! This module centralizes all CSV format concerns, providing:
//! - CommandRecord structure for deserialization
//! - Conversion from CSV records to engine commands
//! - Balance and ledger output serialization
//!
//! All functions are pure (no file I/O) for easy testing.

use crate::types::{AccountId, Balance, Command, HistoryEntry, Points, TransactionKind};
use serde::Deserialize;
use std::io::Write;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, account, amount
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CommandRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub account: AccountId,
    pub amount: Option<String>,
}

/// Convert a CommandRecord to a Command
///
/// The type is matched case-insensitively and account IDs start at 1. The
/// amount must be an integer, but its sign is not checked here: zero and negative amounts are passed through
/// so the engine rejects them as invalid.
///
/// # Returns
///
/// * `Ok(Command)` - Successfully converted record
/// * `Err(String)` - Error message describing the conversion failure
pub fn convert_csv_record(record: CommandRecord) -> Result<Command, String> {
    if record.account == 0 {
        return Err(format!(
            "Invalid account {}: account IDs start at 1",
            record.account
        ));
    }

    let kind = match record.kind.to_lowercase().as_str() {
        "charge" => TransactionKind::Charge,
        "use" => TransactionKind::Use,
        _ => {
            return Err(format!(
                "Invalid command type: '{}' for account {}",
                record.kind, record.account
            ))
        }
    };

    let amount = match record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => amount_str
            .trim()
            .parse::<Points>()
            .map_err(|_| {
                format!(
                    "Invalid amount '{}' for account {}",
                    amount_str, record.account
                )
            })?,
        _ => {
            return Err(format!(
                "{} command for account {} requires an amount",
                kind, record.account
            ))
        }
    };

    Ok(Command {
        kind,
        account_id: record.account,
        amount,
    })
}

/// Write balances to CSV format
///
/// Columns: account, point, updated_at (RFC 3339). Balances are sorted by
/// account ID for deterministic output.
pub fn write_balances_csv(balances: &[Balance], output: &mut dyn Write) -> Result<(), String> {
    let mut sorted = balances.to_vec();
    sorted.sort_by_key(|balance| balance.account_id);

    write_csv(&sorted, output)
}

/// Write ledger entries to CSV format
///
/// Columns: id, account, amount, kind, occurred_at. Entries are sorted by ID,
/// which is the order they were appended in.
pub fn write_history_csv(entries: &[HistoryEntry], output: &mut dyn Write) -> Result<(), String> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|entry| entry.id);

    write_csv(&sorted, output)
}

fn write_csv<T: serde::Serialize>(rows: &[T], output: &mut dyn Write) -> Result<(), String> {
    let mut writer = csv::Writer::from_writer(output);

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| format!("Failed to write CSV record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
