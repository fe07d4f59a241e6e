mod analysis;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use vastgoed_analysis::{BatchScheduler, Summarizer};
use vastgoed_providers::PropertyDataSource;

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

/// Shared handler state: the provider source, the summarizer and the
/// energy-label pacing.
pub struct AppState<S, M> {
    pub source: Arc<S>,
    pub summarizer: Arc<M>,
    pub scheduler: BatchScheduler,
    pub summarizer_configured: bool,
}

impl<S, M> Clone for AppState<S, M> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            summarizer: Arc::clone(&self.summarizer),
            scheduler: self.scheduler,
            summarizer_configured: self.summarizer_configured,
        }
    }
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
    summarizer: &'static str,
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
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
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
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router<S, M>(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState<S, M>>
where
    S: PropertyDataSource + 'static,
    M: Summarizer + 'static,
{
    Router::new()
        .route(
            "/api/v1/analysis/individual",
            post(analysis::analyze_individual::<S, M>),
        )
        .route("/api/v1/analysis/area", post(analysis::analyze_area::<S, M>))
        .route(
            "/api/v1/facts/individual",
            post(analysis::facts_individual::<S, M>),
        )
        .route("/api/v1/facts/area", post(analysis::facts_area::<S, M>))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app<S, M>(state: AppState<S, M>, auth: AuthState, rate_limit: RateLimitState) -> Router
where
    S: PropertyDataSource + 'static,
    M: Summarizer + 'static,
{
    let public_routes = Router::new().route("/api/v1/health", get(health::<S, M>));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health<S, M>(
    State(state): State<AppState<S, M>>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse
where
    S: PropertyDataSource + 'static,
    M: Summarizer + 'static,
{
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            summarizer: if state.summarizer_configured {
                "configured"
            } else {
                "fallback_only"
            },
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
