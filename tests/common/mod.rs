#![allow(dead_code)]

use rust_churn_api::config::Config;
use rust_churn_api::handlers::AppState;
use rust_churn_api::pipeline::ChurnPipeline;
use rust_churn_api::prediction::PredictionService;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Probability recorded for the reference customer with the bundled artifact.
pub const REFERENCE_BASELINE: f64 = 0.09112296101485615;

pub fn artifact_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("models/churn_model.json")
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        model_path: artifact_path(),
        max_body_bytes: 4096,
        request_timeout: Duration::from_secs(5),
        rate_limit: None,
    }
}

pub fn bundled_service() -> PredictionService {
    PredictionService::new(ChurnPipeline::load(artifact_path()).expect("bundled artifact loads"))
}

pub fn test_state() -> Arc<AppState> {
    state_with_config(test_config())
}

pub fn state_with_config(config: Config) -> Arc<AppState> {
    Arc::new(AppState::new(config, bundled_service()))
}

/// The customer used throughout the dashboards as the form default.
pub fn reference_payload() -> serde_json::Value {
    serde_json::json!({
        "CreditScore": 650,
        "Geography": "France",
        "Gender": "Male",
        "Age": 40,
        "Tenure": 3,
        "Balance": 60000,
        "NumOfProducts": 2,
        "HasCrCard": 1,
        "IsActiveMember": 1,
        "EstimatedSalary": 50000
    })
}
