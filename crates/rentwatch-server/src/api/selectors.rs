use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use rentwatch_core::{FetchPath, DEFAULT_TIMEOUT_MS};
use rentwatch_scraper::{diagnose_selector, SelectorMatch};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct TestSelectorRequest {
    pub url: String,
    pub selector: String,
}

#[derive(Debug, Serialize)]
pub(super) struct TestSelectorResponse {
    pub url: String,
    pub tested: SelectorMatch,
    pub alternatives: Vec<SelectorMatch>,
    pub fetched_via: FetchPath,
}

/// Interactive selector diagnosis: fetch the page once, count the supplied
/// selector, and rank well-known listing patterns beside it so a human can
/// pick a replacement when a selector breaks.
pub(super) async fn test_selector(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<TestSelectorRequest>,
) -> Result<Json<ApiResponse<TestSelectorResponse>>, ApiError> {
    if body.selector.trim().is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "selector must be non-empty",
        ));
    }

    let page = state
        .fetcher
        .fetch(
            &body.url,
            DEFAULT_TIMEOUT_MS,
            &BTreeMap::new(),
            Some(body.selector.as_str()),
        )
        .await
        .map_err(|e| {
            ApiError::new(
                req_id.0.clone(),
                "upstream_error",
                format!("failed to fetch {}: {e}", body.url),
            )
        })?;

    let diagnosis = diagnose_selector(&page.html, &body.selector);

    Ok(Json(ApiResponse {
        data: TestSelectorResponse {
            url: body.url,
            tested: diagnosis.tested,
            alternatives: diagnosis.alternatives,
            fetched_via: page.via,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
