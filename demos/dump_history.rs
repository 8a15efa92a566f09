// Dump retained upload_history rows as JSON, newest first.
//
// Usage: cargo run --example dump_history -- [DB_PATH] [LIMIT]
//   DB_PATH  default: ./data/history.db
//   LIMIT    default: 5
//
// The database must already exist; a missing file is reported instead of created.

use anyhow::Context;
use equipment_report::history_repo::{DEFAULT_RETENTION, HistoryRepo};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).map(String::as_str).unwrap_or("./data/history.db");
    let limit: u32 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_RETENTION);

    let repo = HistoryRepo::open_existing(path, 1, DEFAULT_RETENTION)
        .await
        .with_context(|| format!("cannot open history database {}", path))?;
    let records = repo.recent(limit).await?;

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
