use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Serialize;

use rentwatch_core::PlatformConfig;

use super::{ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct PlatformItem {
    pub name: String,
    pub url: String,
    pub candidate_selectors: Vec<String>,
    pub expected_min_listings: u32,
    pub timeout_ms: u64,
}

impl From<&PlatformConfig> for PlatformItem {
    fn from(p: &PlatformConfig) -> Self {
        Self {
            name: p.name.clone(),
            url: p.url.clone(),
            candidate_selectors: p.candidate_selectors.clone(),
            expected_min_listings: p.expected_min_listings,
            timeout_ms: p.timeout_ms,
        }
    }
}

pub(super) async fn list_platforms(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let items: Vec<PlatformItem> = state.platforms.iter().map(PlatformItem::from).collect();
    Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    })
}
