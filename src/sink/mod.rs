//! Durable history sink boundary.
//!
//! The pipeline appends exactly one record per accepted reading, in arrival
//! order. Appends are best-effort: a failing sink is logged by the caller and
//! ingestion continues, so durable history may have gaps while live state
//! does not. There is no transactional coupling between the state store
//! update and the append - a crash between the two loses at most one record.

mod sqlite;

pub use sqlite::SqliteSink;

use machwatch_types::HistoryRecord;
use parking_lot::Mutex;
use thiserror::Error;

/// Errors from a history sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The underlying SQLite store failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The sink is unavailable for another reason.
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    /// A sequence number does not fit the storage column.
    #[error("sequence {0} does not fit an sqlite integer")]
    SeqOutOfRange(u64),
}

/// Append-only persistent store of accepted readings.
///
/// The ingestion path never mutates or deletes records; clearing history is
/// an administrative action outside the pipeline.
pub trait HistorySink: Send + Sync {
    /// Append one record.
    fn append(&self, record: &HistoryRecord) -> Result<(), SinkError>;
}

/// Sink that remembers every record in memory. Test double.
#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<HistoryRecord>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Copy of everything appended so far, in order.
    pub fn records(&self) -> Vec<HistoryRecord> {
        self.records.lock().clone()
    }
}

impl HistorySink for RecordingSink {
    fn append(&self, record: &HistoryRecord) -> Result<(), SinkError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Sink that drops everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl HistorySink for NullSink {
    fn append(&self, _record: &HistoryRecord) -> Result<(), SinkError> {
        Ok(())
    }
}
