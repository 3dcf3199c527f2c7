use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use promodb_core::RawScrapeItem;
use promodb_pipeline::{PromotionPeriod, RunSummary};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// One scraper batch: the store it belongs to, the promotion window the
/// retailer advertises, and the raw page observations.
#[derive(Debug, Deserialize)]
pub(super) struct RunRequest {
    pub store: String,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub items: Vec<RawScrapeItem>,
}

/// Runs the reconciliation pipeline for one scraped batch.
///
/// Always answers 200 with a full [`RunSummary`] when the pipeline executed,
/// even if every single group landed in the error list — callers distinguish
/// "nothing resolved" from "the pipeline could not run" by the status code.
pub(super) async fn submit_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<RunRequest>,
) -> Result<Json<ApiResponse<RunSummary>>, ApiError> {
    if request.store.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "store must be non-empty",
        ));
    }
    if request.valid_from > request.valid_until {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "valid_from must not be after valid_until",
        ));
    }

    let logo_url = state
        .stores
        .find(&request.store)
        .and_then(|s| s.logo_url.clone());

    let period = PromotionPeriod {
        valid_from: request.valid_from,
        valid_until: request.valid_until,
    };

    let summary = state
        .reconciler
        .run(&request.store, logo_url.as_deref(), period, request.items)
        .await
        .map_err(|e| {
            tracing::error!(store = %request.store, error = %e, "reconciliation run failed");
            ApiError::new(req_id.0.clone(), "internal_error", e.to_string())
        })?;

    Ok(Json(ApiResponse {
        data: summary,
        meta: ResponseMeta::new(req_id.0),
    }))
}
