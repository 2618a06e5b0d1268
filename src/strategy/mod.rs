//! Replay strategy module
//!
//! This module defines the Strategy pattern for replaying a CSV file of point
//! commands through a [`PointEngine`]. Both strategies share the same engine
//! construction and outcome accounting; they differ in how commands are
//! scheduled:
//!
//! - `sequential`: one command at a time, in file order
//! - `concurrent`: every command of a batch runs as its own task, and the
//!   per-account gates decide the order

use crate::cli::{GateKind, StrategyType};
use crate::core::{
    GateTable, MemoryStore, PerAccountGates, PointEngine, StoreLatency, StripedGates,
};
use crate::types::{Balance, HistoryEntry, PointError};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub mod r#async;
pub mod sync;

pub use self::r#async::ConcurrentReplay;
pub use sync::SequentialReplay;

/// Configuration for replaying commands
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// Number of commands read (and spawned) per batch
    pub batch_size: usize,
    /// Worker threads for the concurrent strategy
    pub workers: usize,
    /// Which gate table the engine uses
    pub gates: GateKind,
    /// Stripe count when `gates` is striped
    pub stripes: usize,
    /// Simulated store latency
    pub store_latency: StoreLatency,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            workers: num_cpus::get(),
            gates: GateKind::PerAccount,
            stripes: 64,
            store_latency: StoreLatency::default(),
        }
    }
}

impl ReplayConfig {
    /// Create a ReplayConfig with custom batching values
    ///
    /// Zero values fall back to the defaults with a warning.
    pub fn new(batch_size: usize, workers: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            tracing::warn!(
                "Invalid batch_size ({}), using default ({})",
                batch_size,
                default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        let workers = if workers == 0 {
            tracing::warn!(
                "Invalid workers ({}), using default ({})",
                workers,
                default.workers
            );
            default.workers
        } else {
            workers
        };

        Self {
            batch_size,
            workers,
            ..default
        }
    }

    pub fn with_gates(mut self, gates: GateKind, stripes: usize) -> Self {
        self.gates = gates;
        self.stripes = stripes;
        self
    }

    pub fn with_store_latency(mut self, store_latency: StoreLatency) -> Self {
        self.store_latency = store_latency;
        self
    }

    /// Build a fresh in-memory store and an engine over it
    pub fn build_engine(&self) -> (PointEngine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::with_latency(self.store_latency));
        let gates: Arc<dyn GateTable> = match self.gates {
            GateKind::PerAccount => Arc::new(PerAccountGates::new()),
            GateKind::Striped => Arc::new(StripedGates::new(self.stripes)),
        };
        (PointEngine::with_gates(store.clone(), gates), store)
    }
}

/// Outcome of a replay
#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    /// Commands accepted by the engine
    pub applied: usize,
    /// Commands rejected (invalid amount, insufficient balance, limit exceeded)
    pub rejected: usize,
    /// Commands that hit a store failure
    pub failed: usize,
    /// Rows that could not be parsed into a command
    pub skipped: usize,
    /// Final balances, sorted by account
    pub balances: Vec<Balance>,
    /// Full ledger, sorted by entry ID
    pub history: Vec<HistoryEntry>,
}

impl ReplayReport {
    /// Count the outcome of one command
    pub fn record(&mut self, result: &Result<Balance, PointError>) {
        match result {
            Ok(_) => self.applied += 1,
            Err(e) if e.is_rejected() => self.rejected += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Capture the final store state
    pub fn finish(&mut self, store: &MemoryStore) {
        self.balances = store.accounts();
        self.history = store.all_history();

        tracing::info!(
            applied = self.applied,
            rejected = self.rejected,
            failed = self.failed,
            skipped = self.skipped,
            accounts = self.balances.len(),
            "replay finished"
        );
    }
}

/// Replay strategy trait
///
/// Each strategy reads commands from a CSV file, applies them through a
/// fresh engine, and writes the final balances to `output`.
pub trait ReplayStrategy: Send + Sync {
    /// Replay the commands in `input_path`
    ///
    /// Individual command failures are logged and counted in the report; only
    /// fatal errors (unreadable input, runtime or output failure) return `Err`.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<ReplayReport, String>;
}

/// Create a replay strategy based on the specified strategy type
pub fn create_strategy(
    strategy_type: StrategyType,
    config: ReplayConfig,
) -> Box<dyn ReplayStrategy> {
    match strategy_type {
        StrategyType::Sequential => Box::new(SequentialReplay::new(config)),
        StrategyType::Concurrent => Box::new(ConcurrentReplay::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StoreError;
    use rstest::rstest;

    #[rstest]
    #[case::valid(500, 4, 500, 4)]
    #[case::zero_batch(0, 4, 1000, 4)]
    #[case::zero_workers(500, 0, 500, num_cpus::get())]
    fn test_replay_config_new(
        #[case] batch_size: usize,
        #[case] workers: usize,
        #[case] expected_batch: usize,
        #[case] expected_workers: usize,
    ) {
        let config = ReplayConfig::new(batch_size, workers);

        assert_eq!(config.batch_size, expected_batch);
        assert_eq!(config.workers, expected_workers);
    }

    #[test]
    fn test_build_engine_uses_striped_gates() {
        let config = ReplayConfig::default().with_gates(GateKind::Striped, 8);

        let (engine, _) = config.build_engine();

        assert_eq!(engine.gates().len(), 8);
    }

    #[test]
    fn test_report_counts_outcomes() {
        let mut report = ReplayReport::default();

        report.record(&Ok(Balance::empty(1)));
        report.record(&Err(PointError::invalid_amount(0)));
        report.record(&Err(PointError::insufficient_balance(1, 0, 1)));
        report.record(&Err(StoreError::fault("read", 1, "down").into()));

        assert_eq!(
            (report.applied, report.rejected, report.failed),
            (1, 2, 1)
        );
    }
}
