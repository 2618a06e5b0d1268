//! Concurrent replay strategy
//!
//! This module replays commands on a multi-threaded tokio runtime, spawning
//! every command of a batch as an independent task. Nothing here orders
//! commands for the same account: that is left entirely to the engine's
//! gates, which makes this strategy a direct exercise of per-account
//! serialization.
//!
//! # Architecture
//!
//! ```text
//! ConcurrentReplay
//!     ├── ReplayConfig (batch_size, workers, gates, latency)
//!     ├── AsyncReader (batch CSV reading)
//!     └── PointEngine (shared by every spawned task)
//! ```
//!
//! Batches are processed one after another, so a command never overtakes a
//! command from an earlier batch. Within a batch, commands for the same
//! account are applied in gate-acquisition order rather than file order.

use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_balances_csv;
use crate::strategy::{ReplayConfig, ReplayReport, ReplayStrategy};
use futures::future::join_all;
use std::io::Write;
use std::path::Path;

/// Concurrent replay strategy
#[derive(Debug, Clone)]
pub struct ConcurrentReplay {
    config: ReplayConfig,
}

impl ConcurrentReplay {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }
}

impl ReplayStrategy for ConcurrentReplay {
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<ReplayReport, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.workers)
            .enable_time()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))?;

        let (engine, store) = self.config.build_engine();
        let mut report = ReplayReport::default();

        runtime.block_on(async {
            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| format!("Failed to open file '{}': {}", input_path.display(), e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let tasks = batch.into_iter().map(|command| {
                    let engine = engine.clone();
                    tokio::spawn(async move { engine.apply(command).await })
                });

                for joined in join_all(tasks).await {
                    match joined {
                        Ok(result) => report.record(&result),
                        Err(e) => {
                            tracing::error!(error = %e, "command task panicked");
                            report.failed += 1;
                        }
                    }
                }
            }

            report.skipped = reader.skipped();
            Ok::<(), String>(())
        })?;

        report.finish(&store);
        write_balances_csv(&report.balances, output)?;

        Ok(report)
    }
}
