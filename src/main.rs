//! Point Ledger CLI
//!
//! Replays a CSV file of point commands and prints the final balances.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > balances.csv
//! cargo run -- --strategy sequential commands.csv > balances.csv
//! cargo run -- --gates striped --stripes 16 --history ledger.csv commands.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, output failure, etc.)

use point_ledger::cli;
use point_ledger::io::write_history_csv;
use point_ledger::strategy;
use point_ledger::telemetry;
use std::fs::File;
use std::process;

fn main() {
    let args = cli::parse_args();

    if let Err(e) = telemetry::init_tracing(&args.log_level) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let strategy = strategy::create_strategy(args.strategy.clone(), args.to_replay_config());

    let mut output = std::io::stdout();
    let report = match strategy.process(&args.input_file, &mut output) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = &args.history {
        let written = File::create(path)
            .map_err(|e| format!("Failed to create '{}': {}", path.display(), e))
            .and_then(|mut file| write_history_csv(&report.history, &mut file));
        if let Err(e) = written {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
