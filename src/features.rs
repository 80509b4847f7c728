//! Feature engineering shared by the inference pipeline and the dashboards.
//!
//! These formulas must match the ones applied when the model was trained.
//! A mismatch (for example an exclusive bin edge) silently produces a
//! different feature, so the boundaries are pinned down by tests.

use crate::models::{CustomerProfile, EngineeredFeatures};
use crate::validation::ValidationError;

/// Credit score bin edges. Intervals are right-closed and the lowest edge is
/// included: `[0, 580]`, `(580, 650]`, `(650, 720]`, `(720, 1000]`.
pub const CREDIT_RISK_BINS: [i64; 5] = [0, 580, 650, 720, 1000];

/// Customers at or above this age are flagged as senior.
pub const SENIOR_AGE: i64 = 50;

/// Columns handed to the preprocessor, in the order the artifact was fitted with.
pub const FEATURE_COLUMNS: [&str; 13] = [
    "CreditScore",
    "Geography",
    "Gender",
    "Age",
    "Tenure",
    "Balance",
    "NumOfProducts",
    "HasCrCard",
    "IsActiveMember",
    "EstimatedSalary",
    "BalancePerProduct",
    "IsSenior",
    "CreditRisk",
];

/// Columns of [`FEATURE_COLUMNS`] that carry a category name rather than a number.
pub const CATEGORICAL_COLUMNS: [&str; 2] = ["Geography", "Gender"];

pub fn is_categorical(column: &str) -> bool {
    CATEGORICAL_COLUMNS.contains(&column)
}

pub fn balance_per_product(balance: f64, num_of_products: i64) -> f64 {
    balance / (num_of_products as f64 + 1.0)
}

pub fn is_senior(age: i64) -> u8 {
    u8::from(age >= SENIOR_AGE)
}

/// Bucket a credit score, or `None` when it falls outside the bins.
pub fn credit_risk_bucket(credit_score: i64) -> Option<u8> {
    let (lowest, rest) = CREDIT_RISK_BINS.split_first()?;
    if credit_score < *lowest {
        return None;
    }

    rest.iter()
        .position(|&upper| credit_score <= upper)
        .map(|bucket| bucket as u8)
}

/// Derive the engineered features of a profile.
pub fn engineer_features(profile: &CustomerProfile) -> Result<EngineeredFeatures, ValidationError> {
    let credit_risk =
        credit_risk_bucket(profile.credit_score).ok_or_else(|| ValidationError::OutOfRange {
            field: "CreditScore".to_string(),
            message: format!(
                "{} is outside the credit risk bins {:?}",
                profile.credit_score, CREDIT_RISK_BINS
            ),
        })?;

    Ok(EngineeredFeatures {
        balance_per_product: balance_per_product(profile.balance, profile.num_of_products),
        is_senior: is_senior(profile.age),
        credit_risk,
    })
}

/// A single value of a named column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Category(&'static str),
}

/// One model input row: raw profile columns followed by engineered ones.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<(&'static str, FeatureValue)>,
}

impl FeatureRow {
    pub fn new(profile: &CustomerProfile, features: &EngineeredFeatures) -> Self {
        use FeatureValue::{Category, Number};

        let values = [
            Number(profile.credit_score as f64),
            Category(profile.geography.as_str()),
            Category(profile.gender.as_str()),
            Number(profile.age as f64),
            Number(profile.tenure as f64),
            Number(profile.balance),
            Number(profile.num_of_products as f64),
            Number(f64::from(u8::from(profile.has_cr_card))),
            Number(f64::from(u8::from(profile.is_active_member))),
            Number(profile.estimated_salary),
            Number(features.balance_per_product),
            Number(f64::from(features.is_senior)),
            Number(f64::from(features.credit_risk)),
        ];

        Self {
            columns: FEATURE_COLUMNS.into_iter().zip(values).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<FeatureValue> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
