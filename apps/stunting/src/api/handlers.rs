//! Route handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::Serialize;
use stunting_core::{AssessmentRequest, AssessmentResult, Lookup, Sex, WhoStandardEntry};

use super::AppState;
use super::error::ApiError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub indicator: String,
    pub rows: usize,
}

#[derive(Debug, Serialize)]
pub struct StandardsResponse {
    pub gender: Sex,
    pub indicator: String,
    pub rows: Vec<WhoStandardEntry>,
}

fn parse_gender(raw: &str) -> Result<Sex, ApiError> {
    raw.parse::<Sex>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let table = state.assessor.table();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        indicator: table.indicator().to_string(),
        rows: table.len(),
    })
}

/// `POST /api/stunting/assess`
pub async fn assess(
    State(state): State<AppState>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<AssessmentResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    match state.assessor.assess_request(&request, state.today()) {
        Ok(result) => {
            tracing::debug!(
                gender = %result.gender,
                age_months = result.age_months,
                haz = result.haz_score,
                status = %result.status,
                "assessment completed"
            );
            Ok(Json(result))
        }
        Err(err) => {
            if let Some(errors) = err.validation() {
                tracing::debug!(fields = errors.len(), "assessment rejected");
            }
            Err(err.into())
        }
    }
}

/// `GET /api/stunting/standards/{gender}`
pub async fn standards_table(
    State(state): State<AppState>,
    Path(gender): Path<String>,
) -> Result<Json<StandardsResponse>, ApiError> {
    let sex = parse_gender(&gender)?;
    let table = state.assessor.table();
    Ok(Json(StandardsResponse {
        gender: sex,
        indicator: table.indicator().to_string(),
        rows: table.rows(sex).collect(),
    }))
}

/// `GET /api/stunting/standards/{gender}/{age_months}`
pub async fn standards_at(
    State(state): State<AppState>,
    Path((gender, age_months)): Path<(String, u32)>,
) -> Result<Json<Lookup>, ApiError> {
    let sex = parse_gender(&gender)?;
    Ok(Json(state.assessor.standards(sex, age_months)?))
}
