//! HTTP routes: prediction page, JSON API, health checks and Prometheus metrics

use crate::page::{render_page, PageModel, PageOutcome};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use predictor_lib::collector::{parse_raw, InputCollector, FEATURE_SCHEMA};
use predictor_lib::predictor::{format_result, AdapterState, ArtifactInfo};
use predictor_lib::{ComponentStatus, FeatureRecord, FieldIssue, HitLabel, PredictorError};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Query parameter carried by the predict button
const ACTION_PARAM: &str = "action";
const PREDICT_ACTION: &str = "predict";

/// Successful prediction payload
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub label: HitLabel,
    pub probability: f64,
    pub confidence_text: String,
    pub record: FeatureRecord,
}

/// Artifact status payload
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub state: AdapterState,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<FieldIssue>,
}

/// Maps pipeline failures onto HTTP responses
pub struct ApiError(PredictorError);

impl From<PredictorError> for ApiError {
    fn from(e: PredictorError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PredictorError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PredictorError::InferenceError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PredictorError::ModelUnavailable { .. }
            | PredictorError::ArtifactNotFound { .. }
            | PredictorError::ArtifactCorrupt { .. } => StatusCode::SERVICE_UNAVAILABLE,
        };
        let issues = match &self.0 {
            PredictorError::Validation(v) => v.issues.clone(),
            _ => Vec::new(),
        };
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
            issues,
        };
        (status, Json(body)).into_response()
    }
}

/// GET / - the interactive form
async fn index(
    State(state): State<Arc<AppState>>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Html<String> {
    let wants_prediction = params.remove(ACTION_PARAM).as_deref() == Some(PREDICT_ACTION);
    let unavailable = state.adapter.load_error().map(|e| e.to_string());

    let mut collector = InputCollector::new();
    let (record, outcome) = match collector.apply_raw(&params) {
        Ok(record) => {
            // The trigger is inert while no artifact is loaded
            let outcome = if wants_prediction && unavailable.is_none() {
                Some(match state.run_prediction(&record).await {
                    Ok(result) => PageOutcome::Prediction(format_result(&result)),
                    Err(e) => PageOutcome::Failed(e.to_string()),
                })
            } else {
                None
            };
            (record, outcome)
        }
        Err(e) => {
            state.metrics.inc_validation_rejection();
            (collector.collect(), Some(PageOutcome::Invalid(e)))
        }
    };

    Html(render_page(&PageModel {
        record: &record,
        model_path: state.adapter.model_path(),
        unavailable,
        outcome,
    }))
}

/// POST /api/v1/predict - classify a JSON object of field values
async fn predict(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<PredictResponse>, ApiError> {
    let pairs = body.into_iter().map(|(name, value)| (name, raw_value(value)));
    let record = parse_raw(pairs).map_err(|e| {
        state.metrics.inc_validation_rejection();
        PredictorError::from(e)
    })?;

    let result = state.run_prediction(&record).await?;
    let view = format_result(&result);
    Ok(Json(PredictResponse {
        label: result.label,
        probability: result.probability,
        confidence_text: view.confidence_text,
        record,
    }))
}

fn raw_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// GET /api/v1/schema - field specs in column order
async fn schema() -> impl IntoResponse {
    Json(FEATURE_SCHEMA.to_vec())
}

/// GET /api/v1/model - artifact status
async fn model_status(State(state): State<Arc<AppState>>) -> Json<ModelStatus> {
    let adapter = &state.adapter;
    Json(ModelStatus {
        state: adapter.state(),
        path: adapter.model_path().display().to_string(),
        artifact: adapter.artifact_info(),
        loaded_at: adapter.loaded_artifact().map(|l| l.loaded_at.to_rfc3339()),
        error: adapter.load_error().map(|e| e.to_string()),
    })
}

/// Health check response - returns 200 if healthy or degraded, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("failed to encode metrics: {}", e).into_bytes(),
        );
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/schema", get(schema))
        .route("/api/v1/model", get(model_status))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the HTTP server, returning once `shutdown` resolves
pub async fn serve<F>(addr: &str, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
