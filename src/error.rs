//! Error types for ingestion, history storage and report rendering.
//!
//! Input errors (`Schema`, `Parse`, `EmptyDataset`) are caller mistakes and are never retried.
//! Store errors are retried once by the history repo when transient; see [`StoreError::is_transient`].

use thiserror::Error;

/// Failures of the history store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite / pool error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Distribution column could not be encoded or decoded
    #[error("distribution encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Lock contention that persisted after the retry
    #[error("history store busy after {attempts} attempts")]
    Busy { attempts: u32 },

    /// Could not create the database directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// SQLITE_BUSY / SQLITE_LOCKED (including extended codes such as BUSY_SNAPSHOT) and pool
    /// timeouts are worth one retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Database(sqlx::Error::PoolTimedOut) => true,
            StoreError::Database(sqlx::Error::Database(db)) => {
                db.code().is_some_and(|code| is_lock_contention_code(&code))
            }
            StoreError::Busy { .. } => true,
            _ => false,
        }
    }
}

const SQLITE_BUSY: i64 = 5;
const SQLITE_LOCKED: i64 = 6;

/// sqlx reports extended result codes; the primary code is the low byte.
fn is_lock_contention_code(code: &str) -> bool {
    match code.parse::<i64>() {
        Ok(n) => matches!(n & 0xff, SQLITE_BUSY | SQLITE_LOCKED),
        Err(_) => false,
    }
}

/// Failures of the upload pipeline (load -> summarize -> persist).
#[derive(Error, Debug)]
pub enum IngestError {
    /// Required CSV columns absent from the header
    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// Malformed CSV or a non-numeric cell
    #[error("parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Header present but no data rows
    #[error("dataset has no rows")]
    EmptyDataset,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of GET /api/report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// History is empty
    #[error("no data available")]
    NoData,

    /// Document could not be produced
    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
