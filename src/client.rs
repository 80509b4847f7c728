use crate::models::{CustomerProfile, EngineeredFeatures, ErrorResponse, PredictionResult};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Errors surfaced to presentation layers calling the prediction service.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Timeout or connection failure. Never retried by the client.
    Unreachable(String),
    /// The service rejected the request (4xx).
    Rejected {
        status: u16,
        message: String,
        field: Option<String>,
    },
    /// The service failed (5xx).
    Server { status: u16, message: String },
    /// The response body was not what the service contract promises.
    InvalidResponse(String),
    /// The HTTP client could not be constructed.
    Build(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Unreachable(msg) => write!(f, "Prediction service unreachable: {}", msg),
            ClientError::Rejected {
                status, message, ..
            } => write!(f, "Request rejected ({}): {}", status, message),
            ClientError::Server { status, message } => {
                write!(f, "Prediction service error ({}): {}", status, message)
            }
            ClientError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            ClientError::Build(msg) => write!(f, "Failed to create client: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            ClientError::Unreachable(err.to_string())
        } else {
            ClientError::InvalidResponse(err.to_string())
        }
    }
}

/// Client for the churn prediction service, used by dashboards.
#[derive(Clone)]
pub struct ChurnApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChurnApiClient {
    /// Creates a new `ChurnApiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root URL of the service, e.g. `http://127.0.0.1:8001`.
    /// * `timeout` - How long to wait for a response before reporting the
    ///   service as unreachable.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Calls the liveness check and returns the reported status.
    pub async fn health(&self) -> Result<String, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        let body: serde_json::Value = Self::parse(response).await?;

        body["status"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::InvalidResponse("missing status".to_string()))
    }

    /// Scores a customer profile.
    pub async fn predict(&self, profile: &CustomerProfile) -> Result<PredictionResult, ClientError> {
        tracing::debug!("Requesting churn prediction from {}", self.base_url);
        self.post("/predict", profile).await
    }

    /// Fetches the engineered features the service derives from a profile.
    pub async fn preview_features(
        &self,
        profile: &CustomerProfile,
    ) -> Result<EngineeredFeatures, ClientError> {
        self.post("/api/v1/features", profile).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ClientError::InvalidResponse(e.to_string()));
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let (message, field) = match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => (body.error, body.field),
            Err(_) => (text, None),
        };

        tracing::warn!("Prediction service returned {}: {}", status, message);
        if status.is_client_error() && status != StatusCode::REQUEST_TIMEOUT {
            Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
                field,
            })
        } else if status == StatusCode::REQUEST_TIMEOUT {
            Err(ClientError::Unreachable(format!(
                "service timed out handling the request ({})",
                status
            )))
        } else {
            Err(ClientError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}
