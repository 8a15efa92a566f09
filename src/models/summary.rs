// Batch summary and persisted history record.
// JSON field names are the wire contract of POST /api/upload and GET /api/history.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Equipment type -> number of readings. Ordered by key so iteration (and rendering) is stable.
pub type Distribution = BTreeMap<String, u64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_count: u64,
    pub average_flowrate: f64,
    pub average_pressure: f64,
    pub average_temperature: f64,
    pub equipment_type_distribution: Distribution,
}

/// A stored summary. `id` and `uploaded_at` (Unix ms, UTC) are assigned by the history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub uploaded_at: i64,
    #[serde(flatten)]
    pub summary: Summary,
}

impl HistoryRecord {
    /// `uploaded_at` as `YYYY-MM-DD HH:MM:SS UTC`; falls back to the raw millis if out of range.
    pub fn uploaded_at_display(&self) -> String {
        match chrono::DateTime::from_timestamp_millis(self.uploaded_at) {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            None => format!("{} ms", self.uploaded_at),
        }
    }
}
