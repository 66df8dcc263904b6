use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use triage_core::{CoreConfig, TracingObserver};

const REST_ADDR_VAR: &str = "TRIAGE_REST_ADDR";
const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Main entry point for the triage service
///
/// Loads configuration from the environment (and `.env`), wires the assessment pipeline against
/// the remote healthcare API and serves the REST surface.
///
/// # Environment Variables
/// - `API_BASE_URL`: Remote healthcare API base URL (required)
/// - `API_KEY`: API key sent as `x-api-key` (required)
/// - `MAX_RETRIES`, `RETRY_DELAY`, `PAGE_DELAY`, `REQUEST_TIMEOUT_SECS`: retry and pacing tuning
/// - `TRIAGE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration is invalid or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("triage_run=info".parse()?)
                .add_directive("triage_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CoreConfig::from_lookup(|name| std::env::var(name).ok())?;
    let rest_addr = std::env::var(REST_ADDR_VAR).unwrap_or_else(|_| DEFAULT_REST_ADDR.into());

    tracing::info!("++ Remote healthcare API at {}", config.base_url());
    tracing::info!("++ Starting triage REST on {}", rest_addr);

    let assessment = triage_core::assessment_service(&config, Arc::new(TracingObserver))?;
    let app = api_rest::router(AppState { assessment });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
