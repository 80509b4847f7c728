//! Mapping from churn probability to a retention decision tier.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Probabilities at or above this value are High Risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.70;
/// Probabilities at or above this value (and below [`HIGH_RISK_THRESHOLD`]) are Medium Risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.40;

/// Risk tier derived from the churn probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

/// Colour used by dashboards to render a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskColor {
    Green,
    Yellow,
    Red,
}

impl RiskLevel {
    /// Classify a probability. Each tier is closed on its lower edge.
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if probability >= MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Medium => "Medium Risk",
            RiskLevel::High => "High Risk",
        }
    }

    pub fn recommended_action(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Customer likely to stay",
            RiskLevel::Medium => "Monitor and engage customer",
            RiskLevel::High => "Immediate retention action required",
        }
    }

    pub fn color(&self) -> RiskColor {
        match self {
            RiskLevel::Low => RiskColor::Green,
            RiskLevel::Medium => RiskColor::Yellow,
            RiskLevel::High => RiskColor::Red,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl RiskColor {
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskColor::Green => "🟢",
            RiskColor::Yellow => "🟡",
            RiskColor::Red => "🔴",
        }
    }
}
