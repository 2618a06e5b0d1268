//! Point Ledger Library
//! # Overview
//!
//! This library maintains a per-account point balance and an append-only
//! ledger, and guarantees that concurrent charge/use requests for the same
//! account never interleave their read-validate-write-append sequence.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Balance, HistoryEntry, errors)
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Serialized charge/use orchestration
//!   - [`core::gate_table`] - Per-account and striped gate tables
//!   - [`core::memory_store`] - In-memory account store
//! - [`io`] - CSV command input and balance/ledger output
//! - [`strategy`] - Sequential and concurrent command replay
//! - [`cli`] - CLI arguments parsing
//! - [`telemetry`] - Tracing setup
//!
//! # Operations
//!
//! - **Charge**: add points; rejected if the balance would exceed
//!   [`MAX_POINT`](types::MAX_POINT)
//! - **Use**: spend points; rejected if the balance would go negative
//! - **Balance / History**: read-only queries that never wait on a gate
//!
//! ```no_run
//! use point_ledger::core::{MemoryStore, PointEngine};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), point_ledger::types::PointError> {
//! let engine = PointEngine::new(Arc::new(MemoryStore::new()));
//! engine.charge(1, 100).await?;
//! engine.use_points(1, 40).await?;
//! assert_eq!(engine.get_balance(1).await?.point, 60);
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod telemetry;
pub mod types;
