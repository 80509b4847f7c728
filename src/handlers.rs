use crate::config::Config;
use crate::errors::AppError;
use crate::models::{
    CustomerProfile, EngineeredFeatures, ErrorResponse, HealthResponse, ModelInfo,
    PredictionResult,
};
use crate::prediction::PredictionService;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Everything here is read-only after startup, so handlers run in parallel
/// without locking.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Prediction service wrapping the artifact loaded at startup.
    pub service: Arc<PredictionService>,
}

impl AppState {
    pub fn new(config: Config, service: PredictionService) -> Self {
        Self {
            config,
            service: Arc::new(service),
        }
    }
}

/// Unwrap a JSON body, turning axum's rejection into our error type.
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload.map(|Json(value)| value).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })
}

/// Liveness check.
///
/// Returns a fixed status so orchestrators can confirm the process is up.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "rust-churn-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /predict
///
/// Validates the ten customer attributes, runs the feature pipeline and
/// returns the churn probability with its risk tier.
#[utoipa::path(
    post,
    path = "/predict",
    request_body = CustomerProfile,
    responses(
        (status = 200, description = "Churn risk assessment", body = PredictionResult),
        (status = 400, description = "Body is not valid JSON", body = ErrorResponse),
        (status = 422, description = "A field failed validation", body = ErrorResponse)
    )
)]
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResult>, AppError> {
    let payload = json_body(payload)?;
    tracing::debug!("POST /predict - payload: {}", payload);

    let result = state.service.predict_json(&payload)?;
    Ok(Json(result))
}

/// POST /api/v1/features
///
/// Returns the engineered features of a profile exactly as the pipeline
/// computes them, for dashboards that display them next to the score.
#[utoipa::path(
    post,
    path = "/api/v1/features",
    request_body = CustomerProfile,
    responses(
        (status = 200, description = "Engineered features", body = EngineeredFeatures),
        (status = 422, description = "A field failed validation", body = ErrorResponse)
    )
)]
pub async fn preview_features(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EngineeredFeatures>, AppError> {
    let payload = json_body(payload)?;
    let features = state.service.preview_json(&payload)?;
    Ok(Json(features))
}

/// GET /api/v1/model
///
/// Describes the artifact loaded at startup.
#[utoipa::path(
    get,
    path = "/api/v1/model",
    responses((status = 200, description = "Loaded artifact", body = ModelInfo))
)]
pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfo> {
    let artifact = state.service.pipeline().artifact();
    let metadata = artifact.metadata();

    Json(ModelInfo {
        model_name: metadata.model_name.clone(),
        sha256: artifact.sha256().to_string(),
        created_at: metadata.created_at,
        loaded_at: artifact.loaded_at(),
        feature_columns: crate::features::FEATURE_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .collect(),
        input_width: artifact.preprocessor().output_width(),
        classifier: artifact.model().kind().to_string(),
    })
}
