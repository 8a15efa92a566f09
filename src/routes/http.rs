// HTTP handlers: version, upload, report, history

use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;

use super::AppState;
use super::auth::basic_auth_matches;
use crate::error::{IngestError, ReportError, StoreError};
use crate::service;
use crate::version::{NAME, VERSION};

/// Multipart field the web and desktop clients put the CSV in.
const UPLOAD_FIELD: &str = "file";

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// POST /api/upload — multipart CSV in, summary JSON out.
pub(super) async fn upload_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let payload = match read_upload(&mut multipart).await {
        Ok(Some(payload)) => payload,
        Ok(None) => return error_json(StatusCode::BAD_REQUEST, "No file uploaded"),
        Err(e) => return error_json(StatusCode::BAD_REQUEST, &e.body_text()),
    };

    match service::ingest(&state.history_repo, &payload).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => ingest_error_response(e),
    }
}

async fn read_upload(multipart: &mut Multipart) -> Result<Option<Bytes>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(Some(field.bytes().await?));
        }
    }
    Ok(None)
}

/// GET /api/report — latest summary as a PDF attachment.
pub(super) async fn report_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(auth) = &state.config.auth
        && !basic_auth_matches(&headers, auth)
    {
        return (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"equipment-report\"")],
            "Authentication required",
        )
            .into_response();
    }

    let settings = state.config.report.settings();
    match service::report(&state.history_repo, &settings).await {
        Ok(report) => (
            [
                (header::CONTENT_TYPE, report.content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", report.filename),
                ),
            ],
            report.bytes,
        )
            .into_response(),
        Err(ReportError::NoData) => (StatusCode::NOT_FOUND, "No data available").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "report failed");
            let status = match &e {
                ReportError::Store(store) => store_status(store),
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, "Report generation failed").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryParams {
    limit: Option<u32>,
}

/// GET /api/history?limit=n — retained uploads, newest first.
pub(super) async fn history_handler(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Response {
    let retention = state.history_repo.retention();
    let limit = params.limit.unwrap_or(retention).min(retention);
    match state.history_repo.recent(limit).await {
        Ok(records) => Json(records).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "history query failed");
            error_json(store_status(&e), "History unavailable")
        }
    }
}

fn ingest_error_response(e: IngestError) -> Response {
    match e {
        IngestError::Schema { .. } | IngestError::Parse { .. } | IngestError::EmptyDataset => {
            tracing::info!(error = %e, "upload rejected");
            error_json(StatusCode::BAD_REQUEST, &e.to_string())
        }
        IngestError::Store(store) => {
            tracing::error!(error = %store, "upload could not be stored");
            error_json(store_status(&store), "Upload could not be stored")
        }
    }
}

fn store_status(e: &StoreError) -> StatusCode {
    match e {
        StoreError::Busy { .. } => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
