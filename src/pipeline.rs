//! Feature pipeline: engineered features, preprocessing, inference.

use std::fmt;
use std::path::Path;

use crate::artifact::{ArtifactError, ModelArtifact};
use crate::features::{engineer_features, FeatureRow};
use crate::models::{CustomerProfile, EngineeredFeatures};
use crate::validation::ValidationError;

/// Failure while scoring a single profile.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The profile cannot be turned into features.
    InvalidProfile(ValidationError),
    /// A categorical value outside the vocabulary the preprocessor was fitted on.
    UnknownCategory { column: String, value: String },
    MissingColumn(String),
    ColumnType {
        column: String,
        expected: &'static str,
    },
    /// The classifier produced something that is not a probability.
    InvalidProbability(f64),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidProfile(e) => write!(f, "{}", e),
            PipelineError::UnknownCategory { column, value } => {
                write!(f, "{}: unknown category '{}'", column, value)
            }
            PipelineError::MissingColumn(column) => {
                write!(f, "Preprocessor expects missing column '{}'", column)
            }
            PipelineError::ColumnType { column, expected } => {
                write!(f, "Preprocessor expects {} column '{}'", expected, column)
            }
            PipelineError::InvalidProbability(p) => {
                write!(f, "Classifier returned invalid probability {}", p)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        PipelineError::InvalidProfile(err)
    }
}

/// Output of scoring one profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub features: EngineeredFeatures,
    /// Unrounded probability of churn, in `[0, 1]`.
    pub probability: f64,
}

/// Immutable pipeline around a loaded artifact. Safe to share across
/// requests: scoring never mutates it.
#[derive(Debug, Clone)]
pub struct ChurnPipeline {
    artifact: ModelArtifact,
}

impl ChurnPipeline {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        ModelArtifact::load(path).map(Self::new)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Engineer features, preprocess them and score the result.
    pub fn score(&self, profile: &CustomerProfile) -> Result<Scored, PipelineError> {
        let features = engineer_features(profile)?;
        let row = FeatureRow::new(profile, &features);
        let x = self.artifact.preprocessor().transform(&row)?;
        let probability = self.artifact.model().predict_proba(&x);

        if !(0.0..=1.0).contains(&probability) {
            return Err(PipelineError::InvalidProbability(probability));
        }

        tracing::debug!(
            balance_per_product = features.balance_per_product,
            is_senior = features.is_senior,
            credit_risk = features.credit_risk,
            probability,
            "Profile scored"
        );

        Ok(Scored {
            features,
            probability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Geography};
    use serde_json::json;

    fn pipeline(categories: serde_json::Value) -> ChurnPipeline {
        let bundle = json!({
            "preprocessor": {
                "transformers": [
                    { "kind": "one_hot", "columns": ["Geography"], "categories": [categories] },
                    { "kind": "passthrough", "columns": ["IsSenior", "CreditRisk"] }
                ]
            },
            "model": {
                "kind": "logistic",
                "coefficients": [0.0, 0.0, 1.0, 0.5],
                "intercept": -1.0
            }
        });
        let artifact = ModelArtifact::from_slice(&serde_json::to_vec(&bundle).unwrap()).unwrap();
        ChurnPipeline::new(artifact)
    }

    fn profile(geography: Geography, age: i64, credit_score: i64) -> CustomerProfile {
        CustomerProfile {
            credit_score,
            geography,
            gender: Gender::Female,
            age,
            tenure: 2,
            balance: 1000.0,
            num_of_products: 1,
            has_cr_card: true,
            is_active_member: false,
            estimated_salary: 30000.0,
        }
    }

    #[test]
    fn test_score_uses_engineered_features() {
        let p = pipeline(json!(["France", "Germany"]));
        let scored = p.score(&profile(Geography::Germany, 60, 700)).unwrap();

        assert_eq!(scored.features.is_senior, 1);
        assert_eq!(scored.features.credit_risk, 2);
        // -1.0 + 1.0 * 1 + 0.5 * 2
        assert_eq!(scored.probability, crate::classifier::sigmoid(1.0));
    }

    #[test]
    fn test_unknown_category_surfaces_as_error() {
        let p = pipeline(json!(["France", "Germany"]));
        let err = p.score(&profile(Geography::Spain, 30, 700)).unwrap_err();

        assert_eq!(
            err,
            PipelineError::UnknownCategory {
                column: "Geography".to_string(),
                value: "Spain".to_string(),
            }
        );
    }

    #[test]
    fn test_unbinnable_score_is_rejected() {
        let p = pipeline(json!(["France"]));
        let err = p.score(&profile(Geography::France, 30, 2000)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidProfile(_)));
    }

    #[test]
    fn test_scoring_is_repeatable() {
        let p = pipeline(json!(["France", "Germany", "Spain"]));
        let input = profile(Geography::France, 45, 600);

        assert_eq!(p.score(&input).unwrap(), p.score(&input).unwrap());
    }
}
