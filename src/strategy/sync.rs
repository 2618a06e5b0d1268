//! Sequential replay strategy
//!
//! Applies commands one at a time in file order on a current-thread runtime.
//! The result is deterministic for a given input: the ledger order matches
//! the file order of the accepted commands.

use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ReplayConfig, ReplayReport, ReplayStrategy};
use std::io::Write;
use std::path::Path;

/// Sequential replay strategy
#[derive(Debug, Clone)]
pub struct SequentialReplay {
    config: ReplayConfig,
}

impl SequentialReplay {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }
}

impl ReplayStrategy for SequentialReplay {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<ReplayReport, String> {
        let reader = SyncReader::new(input_path)?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let (engine, store) = self.config.build_engine();
        let mut report = ReplayReport::default();

        runtime.block_on(async {
            for result in reader {
                match result {
                    Ok(command) => report.record(&engine.apply(command).await),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping record");
                        report.skipped += 1;
                    }
                }
            }
        });

        report.finish(&store);
        write_balances_csv(&report.balances, output)?;

        Ok(report)
    }
}
