use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::audit::AuditSink;
use super::domain::{ChildEntry, Household, HouseholdSubmission, IncomeRecord, IncomeRecordSubmission};
use super::service::{BenefitEngineService, EngineResult, EngineServiceError};
use super::EngineError;

const DEFAULT_ACTOR_ROLE: &str = "system";

fn default_family_size() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    pub household: HouseholdSubmission,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    #[serde(default)]
    pub actor_role: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluateResponse {
    #[serde(flatten)]
    pub result: EngineResult,
    pub payable_amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BenefitRequest {
    #[serde(default)]
    pub children: Option<Vec<ChildEntry>>,
    #[serde(default)]
    pub actor_role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomeAnalysisRequest {
    #[serde(default)]
    pub records: Vec<IncomeRecordSubmission>,
    #[serde(default = "default_family_size")]
    pub family_size: usize,
    #[serde(default)]
    pub actor_role: Option<String>,
}

/// Router exposing the engine computations as JSON endpoints.
pub fn engine_router<S>(service: Arc<BenefitEngineService<S>>) -> Router
where
    S: AuditSink + 'static,
{
    Router::new()
        .route("/api/v1/households/evaluate", post(evaluate_handler::<S>))
        .route("/api/v1/benefit/calculate", post(benefit_handler::<S>))
        .route("/api/v1/income/analysis", post(income_analysis_handler::<S>))
        .with_state(service)
}

fn error_response(error: EngineServiceError) -> Response {
    let status = match &error {
        EngineServiceError::Engine(EngineError::InvalidInput { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn evaluate_handler<S>(
    State(service): State<Arc<BenefitEngineService<S>>>,
    axum::Json(request): axum::Json<EvaluateRequest>,
) -> Response
where
    S: AuditSink + 'static,
{
    let as_of = request
        .as_of
        .unwrap_or_else(|| Local::now().date_naive());
    let actor_role = request.actor_role.as_deref().unwrap_or(DEFAULT_ACTOR_ROLE);
    let household = Household::from(request.household);

    match service.recompute(&household, as_of, actor_role) {
        Ok(result) => {
            let payable_amount = result.payable_amount();
            let body = EvaluateResponse {
                result,
                payable_amount,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn benefit_handler<S>(
    State(service): State<Arc<BenefitEngineService<S>>>,
    axum::Json(request): axum::Json<BenefitRequest>,
) -> Response
where
    S: AuditSink + 'static,
{
    let actor_role = request.actor_role.as_deref().unwrap_or(DEFAULT_ACTOR_ROLE);
    match service.calculate_benefit(request.children.as_deref(), actor_role) {
        Ok(benefit) => (StatusCode::OK, axum::Json(benefit)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn income_analysis_handler<S>(
    State(service): State<Arc<BenefitEngineService<S>>>,
    axum::Json(request): axum::Json<IncomeAnalysisRequest>,
) -> Response
where
    S: AuditSink + 'static,
{
    let actor_role = request.actor_role.as_deref().unwrap_or(DEFAULT_ACTOR_ROLE);
    let records: Vec<IncomeRecord> = request.records.into_iter().map(IncomeRecord::from).collect();
    let analysis = service.analyze_income(&records, request.family_size, actor_role);
    (StatusCode::OK, axum::Json(analysis)).into_response()
}
