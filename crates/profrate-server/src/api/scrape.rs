use axum::{body::Bytes, extract::State, http::StatusCode, Extension, Json};
use profrate_core::RunSummary;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Default, Deserialize)]
pub(super) struct ScrapeRequest {
    pub school_id: Option<i64>,
    /// Upper bound on professors fetched; `null` or absent fetches all.
    pub limit: Option<usize>,
}

/// Runs one scrape into Postgres and returns its summary.
///
/// The response is 200 when the summary reports success and 400 otherwise,
/// with the summary as `data` either way. A request arriving while another
/// run is in progress gets 409 without starting a run.
pub(super) async fn trigger_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<RunSummary>>), ApiError> {
    let request = parse_request(&req_id.0, &body)?;
    let school_id = request.school_id.unwrap_or(state.default_school_id);
    if school_id <= 0 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("school_id must be positive, got {school_id}"),
        ));
    }

    let Ok(_run_guard) = state.scrape_lock.try_lock() else {
        tracing::warn!(school_id, "scrape rejected: another run is in progress");
        return Err(ApiError::new(
            req_id.0,
            "conflict",
            "a scrape run is already in progress",
        ));
    };

    let summary =
        profrate_scraper::run_scrape(&state.scraper, &state.pool, school_id, request.limit).await;

    let status = if summary.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(ApiResponse::new(summary, req_id.0))))
}

/// An empty body means "defaults for everything".
fn parse_request(req_id: &str, body: &[u8]) -> Result<ScrapeRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ScrapeRequest::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        ApiError::new(
            req_id,
            "validation_error",
            format!("invalid scrape request body: {e}"),
        )
    })
}
