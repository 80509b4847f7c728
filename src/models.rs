use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::risk::RiskLevel;

// ============ Request Models ============

/// Customer region, as seen by the model during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Geography {
    France,
    Spain,
    Germany,
}

impl Geography {
    /// All regions the model was trained on, in dashboard order.
    pub const ALL: [Geography; 3] = [Geography::France, Geography::Spain, Geography::Germany];

    pub fn as_str(&self) -> &'static str {
        match self {
            Geography::France => "France",
            Geography::Spain => "Spain",
            Geography::Germany => "Germany",
        }
    }
}

impl FromStr for Geography {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|g| g.as_str() == s).ok_or(())
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer gender category, as seen by the model during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|g| g.as_str() == s).ok_or(())
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw customer attributes accepted by the inference entry point.
///
/// Field names follow the training dataset's column names. Instances built by
/// [`crate::validation::parse_customer_profile`] are guaranteed to be within
/// the accepted ranges.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct CustomerProfile {
    /// Credit score (expected roughly 300-900).
    #[schema(example = 650)]
    pub credit_score: i64,
    pub geography: Geography,
    pub gender: Gender,
    #[schema(example = 40)]
    pub age: i64,
    /// Years with the bank.
    #[schema(example = 3)]
    pub tenure: i64,
    #[schema(example = 60000.0)]
    pub balance: f64,
    #[schema(example = 2)]
    pub num_of_products: i64,
    /// Encoded on the wire as 0/1.
    #[serde(serialize_with = "serialize_flag")]
    #[schema(value_type = u8, example = 1)]
    pub has_cr_card: bool,
    /// Encoded on the wire as 0/1.
    #[serde(serialize_with = "serialize_flag")]
    #[schema(value_type = u8, example = 1)]
    pub is_active_member: bool,
    #[schema(example = 50000.0)]
    pub estimated_salary: f64,
}

fn serialize_flag<S: serde::Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

// ============ Derived Models ============

/// Features derived from a [`CustomerProfile`] before preprocessing.
///
/// Produced only by [`crate::features::engineer_features`]; the dashboard
/// displays these exact values so they never drift from what was scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct EngineeredFeatures {
    /// `Balance / (NumOfProducts + 1)`
    pub balance_per_product: f64,
    /// 1 when `Age >= 50`.
    pub is_senior: u8,
    /// Credit score bucket in `0..=3`.
    pub credit_risk: u8,
}

// ============ Response Models ============

/// Result returned by the inference entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionResult {
    /// Probability of churn rounded to 4 decimal places.
    #[schema(example = 0.0911)]
    pub churn_probability: f64,
    /// Probability scaled to a percentage, rounded to 2 decimal places.
    #[schema(example = 9.11)]
    pub churn_percentage: f64,
    pub risk_level: RiskLevel,
    #[schema(example = "Customer likely to stay")]
    pub recommended_action: String,
}

/// Liveness check payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Description of the artifact loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelInfo {
    pub model_name: String,
    /// SHA-256 digest of the artifact file, hex encoded.
    pub sha256: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    /// Columns handed to the preprocessor, in training order.
    pub feature_columns: Vec<String>,
    /// Width of the vector produced by the preprocessor.
    pub input_width: usize,
    pub classifier: String,
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Offending request field, for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
