//! Fitted column transformer applied between feature engineering and the classifier.
//!
//! The artifact lists transformers in order; each consumes named columns from a
//! [`FeatureRow`] and appends its outputs to the model input vector.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::artifact::ArtifactError;
use crate::features::{is_categorical, FeatureRow, FeatureValue, FEATURE_COLUMNS};
use crate::pipeline::PipelineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnTransformer {
    /// `(x - mean) / scale` per column.
    StandardScaler {
        columns: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    /// One output per known category, in the listed order.
    OneHot {
        columns: Vec<String>,
        categories: Vec<Vec<String>>,
    },
    Passthrough { columns: Vec<String> },
}

impl ColumnTransformer {
    pub fn columns(&self) -> &[String] {
        match self {
            ColumnTransformer::StandardScaler { columns, .. }
            | ColumnTransformer::OneHot { columns, .. }
            | ColumnTransformer::Passthrough { columns } => columns,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ColumnTransformer::StandardScaler { .. } => "standard_scaler",
            ColumnTransformer::OneHot { .. } => "one_hot",
            ColumnTransformer::Passthrough { .. } => "passthrough",
        }
    }

    pub fn output_width(&self) -> usize {
        match self {
            ColumnTransformer::OneHot { categories, .. } => categories.iter().map(Vec::len).sum(),
            other => other.columns().len(),
        }
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        match self {
            ColumnTransformer::StandardScaler {
                columns,
                mean,
                scale,
            } => {
                if mean.len() != columns.len() || scale.len() != columns.len() {
                    return Err(ArtifactError::Invalid(format!(
                        "standard_scaler has {} columns but {} means and {} scales",
                        columns.len(),
                        mean.len(),
                        scale.len()
                    )));
                }
                if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
                    return Err(ArtifactError::Invalid(format!(
                        "standard_scaler scale for '{}' must be finite and non-zero",
                        columns[i]
                    )));
                }
                if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
                    return Err(ArtifactError::Invalid(format!(
                        "standard_scaler mean for '{}' must be finite",
                        columns[i]
                    )));
                }
            }
            ColumnTransformer::OneHot {
                columns,
                categories,
            } => {
                if categories.len() != columns.len() {
                    return Err(ArtifactError::Invalid(format!(
                        "one_hot has {} columns but {} category lists",
                        columns.len(),
                        categories.len()
                    )));
                }
                for (column, vocabulary) in columns.iter().zip(categories) {
                    let unique: HashSet<&String> = vocabulary.iter().collect();
                    if vocabulary.is_empty() || unique.len() != vocabulary.len() {
                        return Err(ArtifactError::Invalid(format!(
                            "one_hot vocabulary for '{}' must be non-empty and unique",
                            column
                        )));
                    }
                }
            }
            ColumnTransformer::Passthrough { .. } => {}
        }
        Ok(())
    }

    fn transform_into(&self, row: &FeatureRow, out: &mut Vec<f64>) -> Result<(), PipelineError> {
        match self {
            ColumnTransformer::StandardScaler {
                columns,
                mean,
                scale,
            } => {
                for ((column, mean), scale) in columns.iter().zip(mean).zip(scale) {
                    let x = numeric(row, column)?;
                    out.push((x - mean) / scale);
                }
            }
            ColumnTransformer::OneHot {
                columns,
                categories,
            } => {
                for (column, vocabulary) in columns.iter().zip(categories) {
                    let value = categorical(row, column)?;
                    if !vocabulary.iter().any(|c| c == value) {
                        return Err(PipelineError::UnknownCategory {
                            column: column.clone(),
                            value: value.to_string(),
                        });
                    }
                    out.extend(
                        vocabulary
                            .iter()
                            .map(|c| if c == value { 1.0 } else { 0.0 }),
                    );
                }
            }
            ColumnTransformer::Passthrough { columns } => {
                for column in columns {
                    out.push(numeric(row, column)?);
                }
            }
        }
        Ok(())
    }
}

fn lookup(row: &FeatureRow, column: &str) -> Result<FeatureValue, PipelineError> {
    row.get(column)
        .ok_or_else(|| PipelineError::MissingColumn(column.to_string()))
}

fn numeric(row: &FeatureRow, column: &str) -> Result<f64, PipelineError> {
    match lookup(row, column)? {
        FeatureValue::Number(x) => Ok(x),
        FeatureValue::Category(_) => Err(PipelineError::ColumnType {
            column: column.to_string(),
            expected: "numeric",
        }),
    }
}

fn categorical(row: &FeatureRow, column: &str) -> Result<&'static str, PipelineError> {
    match lookup(row, column)? {
        FeatureValue::Category(c) => Ok(c),
        FeatureValue::Number(_) => Err(PipelineError::ColumnType {
            column: column.to_string(),
            expected: "categorical",
        }),
    }
}

/// Ordered list of fitted column transformers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    transformers: Vec<ColumnTransformer>,
}

impl Preprocessor {
    pub fn new(transformers: Vec<ColumnTransformer>) -> Self {
        Self { transformers }
    }

    /// Length of the vector produced by [`Preprocessor::transform`].
    pub fn output_width(&self) -> usize {
        self.transformers.iter().map(ColumnTransformer::output_width).sum()
    }

    /// Check internal consistency and that every referenced column is one the
    /// service produces, each consumed at most once.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        if self.transformers.is_empty() {
            return Err(ArtifactError::Invalid(
                "preprocessor has no transformers".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for transformer in &self.transformers {
            transformer.validate()?;
            for column in transformer.columns() {
                if !FEATURE_COLUMNS.contains(&column.as_str()) {
                    return Err(ArtifactError::Invalid(format!(
                        "preprocessor expects unknown column '{}'",
                        column
                    )));
                }
                let wants_category = matches!(transformer, ColumnTransformer::OneHot { .. });
                if wants_category != is_categorical(column) {
                    return Err(ArtifactError::Invalid(format!(
                        "{} cannot encode {} column '{}'",
                        transformer.kind(),
                        if is_categorical(column) { "categorical" } else { "numeric" },
                        column
                    )));
                }
                if !seen.insert(column.as_str()) {
                    return Err(ArtifactError::Invalid(format!(
                        "column '{}' is consumed by more than one transformer",
                        column
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn transform(&self, row: &FeatureRow) -> Result<Vec<f64>, PipelineError> {
        let mut out = Vec::with_capacity(self.output_width());
        for transformer in &self.transformers {
            transformer.transform_into(row, &mut out)?;
        }
        Ok(out)
    }
}
