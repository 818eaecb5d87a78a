mod platforms;
mod scrapes;
mod selectors;

pub(crate) use scrapes::store_latest;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use rentwatch_core::PlatformConfig;
use rentwatch_scraper::{ContentFetcher, ScrapeExecutor, SweepEntry};

use crate::middleware::{request_id, RequestId};

/// Latest sweep entry per platform, filled by the scheduler and by manual
/// scrape-run requests. In-memory only — the durable result sink is an
/// external system.
pub type LatestOutcomes = Arc<RwLock<HashMap<String, SweepEntry>>>;

#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<ScrapeExecutor>,
    pub fetcher: Arc<ContentFetcher>,
    pub platforms: Arc<Vec<PlatformConfig>>,
    pub latest: LatestOutcomes,
    pub max_concurrent_scrapes: usize,
    pub proxy_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    platforms: usize,
    rendering_proxy: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/platforms", get(platforms::list_platforms))
        .route("/api/v1/outcomes", get(scrapes::list_latest_outcomes))
        .route("/api/v1/scrapes/run", post(scrapes::run_all))
        .route("/api/v1/scrapes/{name}/run", post(scrapes::run_one))
        .route("/api/v1/selectors/test", post(selectors::test_selector))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let rendering_proxy = if state.proxy_configured {
        "configured"
    } else {
        "disabled"
    };

    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                platforms: state.platforms.len(),
                rendering_proxy,
            },
            meta,
        }),
    )
}
