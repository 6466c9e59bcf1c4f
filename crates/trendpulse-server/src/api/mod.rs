mod trends;

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id;
use trendpulse_core::AppConfig;
use trendpulse_pipeline::{TrendCache, TrendPipeline};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TrendPipeline>,
    pub cache: Arc<TrendCache>,
    pub config: Arc<AppConfig>,
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

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
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
            "unknown_provider" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

async fn healthz() -> Json<HealthData> {
    Json(HealthData { status: "ok" })
}

/// The public surface is read-only and CDN-friendly: any origin, GET and
/// OPTIONS only.
fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    // Advertise the fresh-tier TTL so a CDN in front shares our cache
    // window.
    let cache_control = HeaderValue::from_str(&format!(
        "public, max-age={}",
        state.config.fresh_ttl_secs
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=45"));

    let api = Router::new()
        .route("/api/v1/trends", get(trends::get_trends))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            cache_control,
        ));

    Router::new()
        .route("/healthz", get(healthz))
        .merge(api)
        .layer(from_fn(request_id))
        .layer(build_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
