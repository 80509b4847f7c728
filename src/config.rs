use std::path::PathBuf;
use std::time::Duration;

/// Per-IP rate limit applied to the prediction routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub model_path: PathBuf,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    /// `None` disables rate limiting.
    pub rate_limit: Option<RateLimit>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| std::env::var(key).ok())?;

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Model path: {}", config.model_path.display());
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!(
            "Request timeout: {}s, body limit: {} bytes",
            config.request_timeout.as_secs(),
            config.max_body_bytes
        );
        match config.rate_limit {
            Some(limit) => tracing::debug!(
                "Rate limit: {} req/s per IP, burst {}",
                limit.per_second,
                limit.burst
            ),
            None => tracing::info!("Rate limiting disabled"),
        }

        Ok(config)
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT")
            .unwrap_or_else(|| "8001".to_string())
            .parse::<u16>()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?;

        let model_path = PathBuf::from(
            var("MODEL_PATH").unwrap_or_else(|| "models/churn_model.json".to_string()),
        );

        let max_body_bytes = var("MAX_BODY_BYTES")
            .unwrap_or_else(|| "65536".to_string())
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| anyhow::anyhow!("MAX_BODY_BYTES must be a positive number"))?;

        let timeout_secs = var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be a positive number"))?;

        let per_second = var("RATE_LIMIT_PER_SECOND")
            .unwrap_or_else(|| "50".to_string())
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a number (0 disables)"))?;

        let burst = var("RATE_LIMIT_BURST")
            .unwrap_or_else(|| "100".to_string())
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| anyhow::anyhow!("RATE_LIMIT_BURST must be a positive number"))?;

        if per_second > 1000 {
            anyhow::bail!("RATE_LIMIT_PER_SECOND cannot exceed 1000");
        }

        Ok(Self {
            port,
            model_path,
            max_body_bytes,
            request_timeout: Duration::from_secs(timeout_secs),
            rate_limit: (per_second > 0).then_some(RateLimit { per_second, burst }),
        })
    }
}
