//! Prediction service: validated profile in, rounded risk assessment out.

use serde_json::Value;

use crate::errors::AppError;
use crate::models::{CustomerProfile, EngineeredFeatures, PredictionResult};
use crate::pipeline::{ChurnPipeline, PipelineError};
use crate::risk::RiskLevel;
use crate::validation::{parse_customer_profile, validate_profile};

/// Decimal places of `churn_probability`.
pub const PROBABILITY_DECIMALS: i32 = 4;
/// Decimal places of `churn_percentage`.
pub const PERCENTAGE_DECIMALS: i32 = 2;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Combine a raw probability with its risk tier.
///
/// The percentage is derived from the rounded probability so the two
/// reported fields always agree.
pub fn assess(probability: f64) -> PredictionResult {
    let risk_level = RiskLevel::from_probability(probability);
    let churn_probability = round_to(probability, PROBABILITY_DECIMALS);

    PredictionResult {
        churn_probability,
        churn_percentage: round_to(churn_probability * 100.0, PERCENTAGE_DECIMALS),
        risk_level,
        recommended_action: risk_level.recommended_action().to_string(),
    }
}

/// Stateless wrapper around the shared pipeline.
#[derive(Debug, Clone)]
pub struct PredictionService {
    pipeline: ChurnPipeline,
}

impl PredictionService {
    pub fn new(pipeline: ChurnPipeline) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &ChurnPipeline {
        &self.pipeline
    }

    /// Score an already-typed profile. Ranges are re-checked so callers that
    /// build profiles directly get the same guarantees as the HTTP boundary.
    pub fn predict(&self, profile: &CustomerProfile) -> Result<PredictionResult, PipelineError> {
        validate_profile(profile)?;
        let scored = self.pipeline.score(profile)?;
        Ok(assess(scored.probability))
    }

    /// Validate a raw JSON payload and score it.
    pub fn predict_json(&self, payload: &Value) -> Result<PredictionResult, AppError> {
        let profile = parse_customer_profile(payload)?;
        let result = self.predict(&profile)?;

        tracing::info!(
            risk_level = %result.risk_level,
            churn_probability = result.churn_probability,
            "Prediction served"
        );
        Ok(result)
    }

    /// Validate a raw JSON payload and return only its engineered features.
    pub fn preview_json(&self, payload: &Value) -> Result<EngineeredFeatures, AppError> {
        let profile = parse_customer_profile(payload)?;
        Ok(crate::features::engineer_features(&profile)?)
    }
}
