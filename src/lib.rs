//! Bank Customer Churn Prediction API Library
//!
//! Serves a pre-trained churn classifier over HTTP. A raw customer profile is
//! validated, turned into engineered features, preprocessed and scored by the
//! artifact loaded at startup; the probability is then mapped to a risk tier.
//!
//! # Modules
//!
//! - `api`: HTTP-facing components.
//! - `core`: Feature pipeline and risk classification.
//! - `integrations`: Artifact loading and the service client.
//! - `artifact`: Model bundle loading and validation.
//! - `classifier`: Logistic and tree-ensemble classifiers.
//! - `client`: HTTP client for presentation layers.
//! - `config`: Configuration management.
//! - `dashboard`: Terminal presentation of an assessment.
//! - `errors`: Error handling types.
//! - `features`: Shared feature engineering.
//! - `handlers`: HTTP request handlers.
//! - `models`: Request, response and derived data models.
//! - `pipeline`: Feature pipeline around the artifact.
//! - `prediction`: Prediction service and result rounding.
//! - `preprocessor`: Fitted column transformer.
//! - `risk`: Probability to risk tier mapping.
//! - `routes`: Router and OpenAPI document.
//! - `validation`: Boundary validation of request payloads.

pub mod api;
pub mod core;
pub mod integrations;

pub mod artifact;
pub mod classifier;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod features;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prediction;
pub mod preprocessor;
pub mod risk;
pub mod routes;
pub mod validation;
