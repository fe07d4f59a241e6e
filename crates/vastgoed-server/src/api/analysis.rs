//! Analysis and fact-gathering handlers for both run modes.

use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use vastgoed_analysis::{analyze, collect_facts, AnalysisRun, Summarizer};
use vastgoed_core::{AreaSubject, CoreError, IndividualSubject, Subject};
use vastgoed_providers::PropertyDataSource;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Wizard input for one address. Missing fields arrive as empty strings and
/// are rejected by subject validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(in crate::api) struct IndividualRequest {
    pub street: String,
    pub house_number: String,
    pub addition: Option<String>,
    pub city: String,
    pub postal_code: String,
}

impl IndividualRequest {
    fn into_subject(self) -> Result<IndividualSubject, CoreError> {
        IndividualSubject::new(
            &self.street,
            &self.house_number,
            self.addition.as_deref(),
            &self.city,
            &self.postal_code,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(in crate::api) struct AreaRequest {
    pub postal_code: String,
}

impl AreaRequest {
    fn into_subject(self) -> Result<AreaSubject, CoreError> {
        if self.postal_code.trim().is_empty() {
            return Err(CoreError::MissingField("postal code"));
        }
        AreaSubject::new(&self.postal_code)
    }
}

fn validation_error(req_id: &str, error: &CoreError) -> ApiError {
    ApiError::new(req_id, "validation_error", error.to_string())
}

fn respond(req_id: RequestId, run: AnalysisRun) -> Json<ApiResponse<AnalysisRun>> {
    Json(ApiResponse {
        data: run,
        meta: ResponseMeta::new(req_id.0),
    })
}

/// POST /api/v1/analysis/individual
pub(in crate::api) async fn analyze_individual<S, M>(
    State(state): State<AppState<S, M>>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<IndividualRequest>,
) -> Result<Json<ApiResponse<AnalysisRun>>, ApiError>
where
    S: PropertyDataSource + 'static,
    M: Summarizer + 'static,
{
    let subject = body
        .into_subject()
        .map_err(|e| validation_error(&req_id.0, &e))?;

    let run = analyze(
        state.source.as_ref(),
        &state.scheduler,
        state.summarizer.as_ref(),
        Subject::Individual(subject),
    )
    .await;
    Ok(respond(req_id, run))
}

/// POST /api/v1/analysis/area
pub(in crate::api) async fn analyze_area<S, M>(
    State(state): State<AppState<S, M>>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AreaRequest>,
) -> Result<Json<ApiResponse<AnalysisRun>>, ApiError>
where
    S: PropertyDataSource + 'static,
    M: Summarizer + 'static,
{
    let subject = body
        .into_subject()
        .map_err(|e| validation_error(&req_id.0, &e))?;

    let run = analyze(
        state.source.as_ref(),
        &state.scheduler,
        state.summarizer.as_ref(),
        Subject::Area(subject),
    )
    .await;
    Ok(respond(req_id, run))
}

/// POST /api/v1/facts/individual
pub(in crate::api) async fn facts_individual<S, M>(
    State(state): State<AppState<S, M>>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<IndividualRequest>,
) -> Result<Json<ApiResponse<AnalysisRun>>, ApiError>
where
    S: PropertyDataSource + 'static,
    M: Summarizer + 'static,
{
    let subject = body
        .into_subject()
        .map_err(|e| validation_error(&req_id.0, &e))?;

    let run = collect_facts(
        state.source.as_ref(),
        &state.scheduler,
        Subject::Individual(subject),
    )
    .await;
    Ok(respond(req_id, run))
}

/// POST /api/v1/facts/area
pub(in crate::api) async fn facts_area<S, M>(
    State(state): State<AppState<S, M>>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AreaRequest>,
) -> Result<Json<ApiResponse<AnalysisRun>>, ApiError>
where
    S: PropertyDataSource + 'static,
    M: Summarizer + 'static,
{
    let subject = body
        .into_subject()
        .map_err(|e| validation_error(&req_id.0, &e))?;

    let run = collect_facts(
        state.source.as_ref(),
        &state.scheduler,
        Subject::Area(subject),
    )
    .await;
    Ok(respond(req_id, run))
}
