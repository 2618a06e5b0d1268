use crate::core::StoreLatency;
use crate::strategy::ReplayConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay point charge/use commands against per-account serialized balances
#[derive(Parser, Debug)]
#[command(name = "point-ledger")]
#[command(about = "Replay point charge/use commands and print final balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing commands (type,account,amount)
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Replay strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "concurrent",
        help = "Replay strategy: 'sequential' for file order or 'concurrent' for one task per command"
    )]
    pub strategy: StrategyType,

    /// Number of commands per batch (concurrent mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of commands per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Worker threads (concurrent mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Gate table used to serialize mutations
    #[arg(long = "gates", value_name = "KIND", default_value = "per-account")]
    pub gates: GateKind,

    /// Number of stripes when using striped gates
    #[arg(long = "stripes", value_name = "COUNT", default_value_t = 64)]
    pub stripes: usize,

    /// Maximum random delay per store call, in milliseconds
    #[arg(long = "store-latency-ms", value_name = "MILLIS", default_value_t = 0)]
    pub store_latency_ms: u64,

    /// Also write the full ledger as CSV to this path
    #[arg(long = "history", value_name = "PATH")]
    pub history: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,
}

/// Available replay strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sequential,
    Concurrent,
}

/// Available gate tables
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum GateKind {
    /// One gate per account, created on first use
    PerAccount,
    /// Fixed number of gates shared by `account % stripes`
    Striped,
}

impl CliArgs {
    /// Create a ReplayConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values are replaced by
    /// the defaults with a warning.
    pub fn to_replay_config(&self) -> ReplayConfig {
        let default = ReplayConfig::default();
        ReplayConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.workers.unwrap_or(default.workers),
        )
        .with_gates(self.gates, self.stripes)
        .with_store_latency(StoreLatency::new(self.store_latency_ms))
    }
}
