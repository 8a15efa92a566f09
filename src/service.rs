// The two operations the HTTP layer calls: ingest an upload, produce the latest report.

use crate::error::{IngestError, ReportError};
use crate::history_repo::HistoryRepo;
use crate::models::Summary;
use crate::report::{self, RenderedReport, ReportSettings};
use crate::{loader, summarizer};
use tracing::{info, instrument};

/// Parses, summarizes and records one CSV upload. Nothing is stored unless all three succeed.
#[instrument(skip(repo, payload), fields(operation = "ingest", payload_bytes = payload.len()))]
pub async fn ingest(repo: &HistoryRepo, payload: &[u8]) -> Result<Summary, IngestError> {
    let rows = loader::load(payload)?;
    let summary = summarizer::summarize(&rows)?;
    let record = repo.append(&summary).await?;
    info!(
        id = record.id,
        total_count = summary.total_count,
        types = summary.equipment_type_distribution.len(),
        "upload summarized"
    );
    Ok(summary)
}

/// Renders the most recent history record; [`ReportError::NoData`] when nothing was uploaded yet.
#[instrument(skip_all, fields(operation = "report"))]
pub async fn report(
    repo: &HistoryRepo,
    settings: &ReportSettings,
) -> Result<RenderedReport, ReportError> {
    let latest = repo.most_recent().await?;
    report::render(latest.as_ref(), settings)
}
