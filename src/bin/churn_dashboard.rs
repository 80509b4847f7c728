//! Terminal dashboard for the churn prediction service.
//!
//! Usage: `churn-dashboard [--credit-score N] [--age N] [--tenure N]
//! [--balance X] [--products N] [--salary X] [--geography G] [--gender G]
//! [--has-cr-card Yes|No] [--active Yes|No]`

use dotenvy::dotenv;
use rust_churn_api::client::{ChurnApiClient, ClientError};
use rust_churn_api::dashboard::{parse_form, render_prediction, render_snapshot};
use std::env;
use std::time::Duration;

/// Main entry point for the dashboard.
///
/// Builds the customer profile from the command line, prints the snapshot and
/// engineered features, then asks the prediction service for the risk tier.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let base_url = env::var("CHURN_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8001".to_string());
    let timeout_secs: u64 = env::var("CHURN_API_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .map_err(|_| anyhow::anyhow!("CHURN_API_TIMEOUT_SECS must be a number of seconds"))?;

    let profile = parse_form(env::args().skip(1))?;

    println!("=== Bank Customer Churn Predictor ===\n");
    println!("{}", render_snapshot(&profile)?);

    let client = ChurnApiClient::new(base_url, Duration::from_secs(timeout_secs))?;
    match client.predict(&profile).await {
        Ok(result) => {
            println!("{}", render_prediction(&result));
            Ok(())
        }
        Err(ClientError::Unreachable(msg)) => {
            eprintln!("Error connecting to backend at {}: {}", client.base_url(), msg);
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
