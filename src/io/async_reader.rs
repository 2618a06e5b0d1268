//! Asynchronous CSV reader with batch interface
//!
//! Provides batches of point commands from a CSV stream for the concurrent
//! replay strategy.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of Commands
//!                  ↓
//!           csv_format module
//!           (CommandRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CommandRecord};
use crate::types::Command;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous CSV reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    skipped: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            skipped: 0,
        }
    }

    /// Read up to `batch_size` commands
    ///
    /// Rows that fail to parse or convert are logged and skipped. Returns an
    /// empty vector once the end of the input is reached.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Command> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CommandRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => match convert_csv_record(record) {
                    Ok(command) => batch.push(command),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping unconvertible record");
                        self.skipped += 1;
                    }
                },
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "skipping malformed record");
                    self.skipped += 1;
                }
                None => break,
            }
        }

        batch
    }

    /// Number of rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
