//! HTTP router assembly.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{self, AppState};
use crate::models::{
    CustomerProfile, EngineeredFeatures, ErrorResponse, Gender, Geography, HealthResponse,
    ModelInfo, PredictionResult,
};
use crate::risk::RiskLevel;

#[derive(OpenApi)]
#[openapi(
    info(title = "Bank Customer Churn API", version = "1.0"),
    paths(
        handlers::health,
        handlers::predict,
        handlers::preview_features,
        handlers::model_info
    ),
    components(schemas(
        CustomerProfile,
        Geography,
        Gender,
        EngineeredFeatures,
        PredictionResult,
        RiskLevel,
        HealthResponse,
        ModelInfo,
        ErrorResponse
    ))
)]
pub struct ApiDoc;

/// Interval between two token refills for a rate of `per_second` requests.
///
/// The governor refills one token per period.
pub fn replenish_period(per_second: u64) -> Duration {
    Duration::from_nanos(1_000_000_000 / per_second.max(1))
}

/// Build the application router.
///
/// The liveness routes bypass rate limiting; the prediction routes are
/// limited per client IP when the configuration enables it, which requires
/// serving with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn build_router(state: Arc<AppState>) -> anyhow::Result<Router> {
    let config = &state.config;

    let mut prediction_routes = Router::new()
        .route("/predict", post(handlers::predict))
        .route("/api/v1/predict", post(handlers::predict))
        .route("/api/v1/features", post(handlers::preview_features))
        .route("/api/v1/model", get(handlers::model_info))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes));

    if let Some(limit) = config.rate_limit {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .period(replenish_period(limit.per_second))
                .burst_size(limit.burst)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?,
        );
        prediction_routes = prediction_routes.layer(GovernorLayer {
            config: governor_conf,
        });
    }

    let app = Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .merge(prediction_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state.clone())
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_public_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/predict"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/features"));
    }

    #[test]
    fn test_replenish_period_keeps_rate() {
        assert_eq!(replenish_period(1), Duration::from_secs(1));
        assert_eq!(replenish_period(50), Duration::from_millis(20));
        assert_eq!(replenish_period(300), Duration::from_nanos(3_333_333));
        assert_eq!(replenish_period(750), Duration::from_nanos(1_333_333));
        assert_eq!(replenish_period(1000), Duration::from_millis(1));
    }
}
