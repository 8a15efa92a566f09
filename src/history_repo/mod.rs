// SQLite upload history. Keeps the newest `retention` summaries; older ones are evicted in the
// same transaction as the insert that pushed them out.
//
// Writes are serialized by `write_lock` (single writer) and each append is one transaction,
// so no reader ever sees more than `retention` rows or a half-applied append.
//
// Inspecting data: `cargo run --example dump_history -- [DB_PATH]`.

mod distribution;

use crate::error::StoreError;
use crate::models::{HistoryRecord, Summary};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::{Duration, sleep};
use tracing::instrument;

/// Records kept when no retention is configured.
pub const DEFAULT_RETENTION: u32 = 5;

/// How long a connection waits on a locked database before reporting SQLITE_BUSY.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Pause before the single retry of a transient append failure.
const APPEND_RETRY_BACKOFF: Duration = Duration::from_millis(50);

const SELECT_RECENT: &str = "SELECT id, uploaded_at, total_count, average_flowrate, average_pressure,
        average_temperature, equipment_type_distribution
     FROM upload_history ORDER BY uploaded_at DESC, id DESC LIMIT $1";

pub struct HistoryRepo {
    pool: SqlitePool,
    retention: u32,
    write_lock: Mutex<()>,
    schema: OnceCell<()>,
}

impl HistoryRepo {
    pub async fn connect(
        path: &str,
        max_pool_size: u32,
        retention: u32,
    ) -> Result<Self, StoreError> {
        Self::connect_with_busy_timeout(path, max_pool_size, retention, DEFAULT_BUSY_TIMEOUT).await
    }

    pub async fn connect_with_busy_timeout(
        path: &str,
        max_pool_size: u32,
        retention: u32,
        busy_timeout: Duration,
    ) -> Result<Self, StoreError> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path, max_pool_size, retention, busy_timeout, true).await
    }

    /// Opens a database that must already exist. Nothing is created on disk, so a mistyped path
    /// fails with a `NotFound` I/O error instead of yielding an empty store.
    pub async fn open_existing(
        path: &str,
        max_pool_size: u32,
        retention: u32,
    ) -> Result<Self, StoreError> {
        if !Path::new(path).is_file() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("database not found: {}", path),
            )));
        }
        Self::open(path, max_pool_size, retention, DEFAULT_BUSY_TIMEOUT, false).await
    }

    async fn open(
        path: &str,
        max_pool_size: u32,
        retention: u32,
        busy_timeout: Duration,
        create: bool,
    ) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(create)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(busy_timeout)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size.max(1))
            .connect_with(opts)
            .await?;
        Ok(Self {
            pool,
            retention: retention.max(1),
            write_lock: Mutex::new(()),
            schema: OnceCell::new(),
        })
    }

    pub fn retention(&self) -> u32 {
        self.retention
    }

    /// Creates the table and index if absent. Called once at startup; every other operation also
    /// runs it lazily on first use, so a fresh store is always safe to query.
    pub async fn init(&self) -> Result<(), StoreError> {
        self.schema
            .get_or_try_init(|| async {
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS upload_history (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        uploaded_at INTEGER NOT NULL,
                        total_count INTEGER NOT NULL,
                        average_flowrate REAL NOT NULL,
                        average_pressure REAL NOT NULL,
                        average_temperature REAL NOT NULL,
                        equipment_type_distribution TEXT NOT NULL
                    )
                    "#,
                )
                .execute(&self.pool)
                .await?;

                sqlx::query(
                    "CREATE INDEX IF NOT EXISTS idx_upload_history_uploaded_at ON upload_history(uploaded_at, id)",
                )
                .execute(&self.pool)
                .await?;
                Ok::<(), StoreError>(())
            })
            .await?;
        Ok(())
    }

    /// Stores `summary` as a new record and evicts everything beyond the newest `retention`.
    /// A transient lock failure is retried once; a second one surfaces as [`StoreError::Busy`].
    #[instrument(skip(self, summary), fields(repo = "history", operation = "append", total_count = summary.total_count))]
    pub async fn append(&self, summary: &Summary) -> Result<HistoryRecord, StoreError> {
        self.init().await?;
        let _writer = self.write_lock.lock().await;

        match self.append_once(summary).await {
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "append hit lock contention, retrying once");
                sleep(APPEND_RETRY_BACKOFF).await;
                self.append_once(summary).await.map_err(|e| {
                    if e.is_transient() {
                        StoreError::Busy { attempts: 2 }
                    } else {
                        e
                    }
                })
            }
            result => result,
        }
    }

    /// One insert + evict transaction. Dropping `tx` on any error rolls both back.
    async fn append_once(&self, summary: &Summary) -> Result<HistoryRecord, StoreError> {
        let encoded = distribution::encode(&summary.equipment_type_distribution)?;
        let mut tx = self.pool.begin().await?;

        let latest =
            sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(uploaded_at) FROM upload_history")
                .fetch_one(&mut *tx)
                .await?;
        let uploaded_at = chrono::Utc::now()
            .timestamp_millis()
            .max(latest.unwrap_or(i64::MIN));

        let id = sqlx::query(
            "INSERT INTO upload_history (uploaded_at, total_count, average_flowrate, average_pressure, average_temperature, equipment_type_distribution) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(uploaded_at)
        .bind(summary.total_count as i64)
        .bind(summary.average_flowrate)
        .bind(summary.average_pressure)
        .bind(summary.average_temperature)
        .bind(&encoded)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let evicted = sqlx::query(
            "DELETE FROM upload_history WHERE id NOT IN (
                SELECT id FROM upload_history ORDER BY uploaded_at DESC, id DESC LIMIT $1
            )",
        )
        .bind(self.retention as i64)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        tracing::debug!(id, uploaded_at, evicted, "upload recorded");

        Ok(HistoryRecord {
            id,
            uploaded_at,
            summary: summary.clone(),
        })
    }

    /// Newest record (greatest `uploaded_at`, then greatest id), or `None` when empty.
    #[instrument(skip(self), fields(repo = "history", operation = "most_recent"))]
    pub async fn most_recent(&self) -> Result<Option<HistoryRecord>, StoreError> {
        Ok(self.recent(1).await?.into_iter().next())
    }

    /// Up to `limit` records, newest first.
    #[instrument(skip(self), fields(repo = "history", operation = "recent"))]
    pub async fn recent(&self, limit: u32) -> Result<Vec<HistoryRecord>, StoreError> {
        self.init().await?;
        let rows = sqlx::query(SELECT_RECENT)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::parse_record_row).collect()
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        self.init().await?;
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM upload_history")
            .fetch_one(&self.pool)
            .await?;
        Ok(n as u64)
    }

    fn parse_record_row(row: &sqlx::sqlite::SqliteRow) -> Result<HistoryRecord, StoreError> {
        let id: i64 = row.try_get("id")?;
        let uploaded_at: i64 = row.try_get("uploaded_at")?;
        let total_count: i64 = row.try_get("total_count")?;
        let average_flowrate: f64 = row.try_get("average_flowrate")?;
        let average_pressure: f64 = row.try_get("average_pressure")?;
        let average_temperature: f64 = row.try_get("average_temperature")?;
        let dist_text: String = row.try_get("equipment_type_distribution")?;

        Ok(HistoryRecord {
            id,
            uploaded_at,
            summary: Summary {
                total_count: total_count as u64,
                average_flowrate,
                average_pressure,
                average_temperature,
                equipment_type_distribution: distribution::decode(&dist_text)?,
            },
        })
    }
}
