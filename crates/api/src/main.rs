use anyhow::Result;
use api::{AppState, BagsClient, FeeAggregator, ReqwestTransport, UpstreamProxy};
use shared::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() -> Result<()> {
    api::logging::init_from_env();

    tracing::info!("Starting Bags Fee Tracker");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // One HTTP client for both the proxy and the aggregation engine
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream.request_timeout_secs))
        .build()?;

    let transport = Arc::new(ReqwestTransport::with_client(
        http_client.clone(),
        config.upstream.clone(),
    ));
    let bags_client = Arc::new(BagsClient::new(transport));
    tracing::info!(
        "Upstream client initialized (top tokens: {}, claim stats: {})",
        config.upstream.bags_api_base,
        config.upstream.public_api_base
    );

    let fee_aggregator = Arc::new(FeeAggregator::new(bags_client));
    tracing::info!(
        "Fee aggregator initialized (FDV ceiling ${})",
        config.tracker.max_fdv_usd
    );

    let proxy = Arc::new(UpstreamProxy::new(http_client, config.upstream.clone()));
    tracing::info!("Upstream proxy initialized");

    let app_state = Arc::new(AppState::new(
        fee_aggregator,
        proxy,
        config.tracker.clone(),
    ));

    // Create router with CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = api::routes::create_router(app_state, &config.server.static_dir).layer(cors);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Serving static files from {}", config.server.static_dir);

    axum::serve(listener, app).await?;

    Ok(())
}
