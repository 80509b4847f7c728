use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_churn_api::config::Config;
use rust_churn_api::handlers::AppState;
use rust_churn_api::pipeline::ChurnPipeline;
use rust_churn_api::prediction::PredictionService;
use rust_churn_api::routes::build_router;

/// Main entry point for the prediction service.
///
/// Initializes logging, loads configuration and the model artifact, then
/// starts the Axum server. A missing or invalid artifact aborts startup
/// before the port is bound.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_churn_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pipeline = ChurnPipeline::load(&config.model_path).with_context(|| {
        format!(
            "Failed to load model artifact from {}",
            config.model_path.display()
        )
    })?;
    tracing::info!(
        "✓ Model artifact ready: {} ({})",
        pipeline.artifact().metadata().model_name,
        pipeline.artifact().sha256()
    );

    let state = Arc::new(AppState::new(config.clone(), PredictionService::new(pipeline)));
    let app = build_router(state)?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
