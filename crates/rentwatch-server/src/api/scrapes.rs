use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};

use rentwatch_core::AlertKind;
use rentwatch_scraper::{run_sweep, SweepEntry};

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

/// Run the full sweep over every configured platform and return the
/// outcomes. Also refreshes the in-memory latest-outcome cache.
pub(super) async fn run_all(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let mut entries = run_sweep(
        &state.executor,
        &state.platforms,
        state.max_concurrent_scrapes,
    )
    .await;
    entries.sort_by(|a, b| a.platform.cmp(&b.platform));

    store_latest(&state, &entries).await;

    Json(ApiResponse {
        data: entries,
        meta: ResponseMeta::new(req_id.0),
    })
}

/// Run one platform by name. The outcome is returned even when the scrape
/// failed — failure lives inside the record, not in the HTTP status.
pub(super) async fn run_one(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SweepEntry>>, ApiError> {
    let platform = state
        .platforms
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(&name))
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("unknown platform: {name}"),
            )
        })?;

    let outcome = state.executor.run(platform).await;
    let alert = AlertKind::classify(&outcome, platform.expected_min_listings);
    let entry = SweepEntry {
        platform: platform.name.clone(),
        outcome,
        alert,
    };

    store_latest(&state, std::slice::from_ref(&entry)).await;

    Ok(Json(ApiResponse {
        data: entry,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Latest known outcome per platform, sorted by platform name. Empty until
/// the first sweep (scheduled or manual) has run.
pub(super) async fn list_latest_outcomes(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let latest = state.latest.read().await;
    let mut entries: Vec<SweepEntry> = latest.values().cloned().collect();
    entries.sort_by(|a, b| a.platform.cmp(&b.platform));

    Json(ApiResponse {
        data: entries,
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(crate) async fn store_latest(state: &AppState, entries: &[SweepEntry]) {
    let mut latest = state.latest.write().await;
    for entry in entries {
        latest.insert(entry.platform.clone(), entry.clone());
    }
}
