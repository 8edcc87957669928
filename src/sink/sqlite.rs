//! SQLite-backed history sink.

use std::path::Path;

use machwatch_types::HistoryRecord;
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use super::{HistorySink, SinkError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS machine_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seq INTEGER NOT NULL,
    timestamp REAL NOT NULL,
    vibration REAL NOT NULL,
    temperature REAL NOT NULL,
    pressure REAL NOT NULL,
    rms REAL NOT NULL,
    mean_temp REAL NOT NULL,
    fault_probability REAL NOT NULL,
    is_fault INTEGER NOT NULL,
    model_status TEXT NOT NULL
)";

/// Append-only history persisted to a `machine_history` table.
///
/// One row per accepted reading. The connection is serialized behind a
/// mutex; the pipeline is the only writer. Querying the history beyond what
/// the pipeline writes belongs to the hosting application, not here.
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Open (or create) the history database at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory database, for tests.
    pub fn open_in_memory() -> Result<Self, SinkError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, SinkError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of persisted records.
    pub fn count(&self) -> Result<u64, SinkError> {
        let conn = self.conn.lock();
        let count: u64 =
            conn.query_row("SELECT COUNT(*) FROM machine_history", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Administrative wipe of the history table. Never called by the
    /// ingestion path.
    pub fn clear(&self) -> Result<(), SinkError> {
        self.conn.lock().execute("DELETE FROM machine_history", [])?;
        Ok(())
    }
}

impl HistorySink for SqliteSink {
    fn append(&self, record: &HistoryRecord) -> Result<(), SinkError> {
        let seq = i64::try_from(record.seq).map_err(|_| SinkError::SeqOutOfRange(record.seq))?;
        let snapshot = &record.snapshot;
        let reading = snapshot.reading.params();
        self.conn.lock().execute(
            "INSERT INTO machine_history (
                seq, timestamp, vibration, temperature, pressure, rms, mean_temp,
                fault_probability, is_fault, model_status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                seq,
                snapshot.timestamp,
                reading[0],
                reading[1],
                reading[2],
                reading[3],
                reading[4],
                snapshot.verdict.fault_probability,
                snapshot.verdict.is_fault,
                snapshot.verdict.model_status.as_str(),
            ],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSink").finish()
    }
}
