//! Loading of the serialized model bundle.
//!
//! The artifact is a JSON document with two named members, `preprocessor` and
//! `model`, plus optional `metadata`. It is read once at startup; any failure
//! here must stop the process before it accepts traffic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::classifier::Classifier;
use crate::features::FEATURE_COLUMNS;
use crate::preprocessor::Preprocessor;

/// Failure to load or validate a model artifact.
#[derive(Debug)]
pub enum ArtifactError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    /// The bundle parsed but is internally inconsistent.
    Invalid(String),
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::Io { path, source } => {
                write!(f, "Failed to read artifact {}: {}", path.display(), source)
            }
            ArtifactError::Parse(e) => write!(f, "Failed to parse artifact: {}", e),
            ArtifactError::Invalid(msg) => write!(f, "Invalid artifact: {}", msg),
        }
    }
}

impl std::error::Error for ArtifactError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArtifactError::Io { source, .. } => Some(source),
            ArtifactError::Parse(e) => Some(e),
            ArtifactError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ArtifactError {
    fn from(err: serde_json::Error) -> Self {
        ArtifactError::Parse(err)
    }
}

/// Descriptive information recorded when the artifact was exported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub model_name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Column order the preprocessor was fitted with. When present it must
    /// match the order this service builds rows in.
    #[serde(default)]
    pub feature_columns: Vec<String>,
}

impl Default for ArtifactMetadata {
    fn default() -> Self {
        Self {
            model_name: "unnamed".to_string(),
            created_at: None,
            feature_columns: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
struct ArtifactBundle {
    #[serde(default)]
    metadata: ArtifactMetadata,
    preprocessor: Preprocessor,
    model: Classifier,
}

/// A validated, immutable model bundle.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    metadata: ArtifactMetadata,
    preprocessor: Preprocessor,
    model: Classifier,
    sha256: String,
    loaded_at: DateTime<Utc>,
}

impl ModelArtifact {
    /// Read, parse and validate the artifact at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        tracing::info!("Loading model artifact from {}", path.display());

        let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let artifact = Self::from_slice(&bytes)?;
        tracing::info!(
            model = %artifact.metadata.model_name,
            sha256 = %artifact.sha256,
            classifier = artifact.model.kind(),
            input_width = artifact.preprocessor.output_width(),
            "Model artifact loaded"
        );
        Ok(artifact)
    }

    /// Parse and validate an artifact held in memory.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let bundle: ArtifactBundle = serde_json::from_slice(bytes)?;
        let sha256 = hex::encode(Sha256::digest(bytes));

        let artifact = Self {
            metadata: bundle.metadata,
            preprocessor: bundle.preprocessor,
            model: bundle.model,
            sha256,
            loaded_at: Utc::now(),
        };
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        let columns = &self.metadata.feature_columns;
        if !columns.is_empty() && !columns.iter().map(String::as_str).eq(FEATURE_COLUMNS) {
            return Err(ArtifactError::Invalid(format!(
                "artifact was fitted on columns {:?}, this service produces {:?}",
                columns, FEATURE_COLUMNS
            )));
        }

        self.preprocessor.validate()?;
        self.model.validate(self.preprocessor.output_width())
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    pub fn model(&self) -> &Classifier {
        &self.model
    }

    /// Hex encoded SHA-256 of the artifact bytes.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
