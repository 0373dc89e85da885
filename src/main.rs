//! Engram Gateway server binary.
//!
//! Startup order matters: configuration, then schema bootstrap (fatal on
//! failure), then the HTTP server. The process must not accept traffic
//! against an unbootstrapped graph.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use engram_gateway::config::{GraphStoreConfig, LlmConfig, ServerConfig, VectorStoreConfig};
use engram_gateway::engine::RemoteEngine;
use engram_gateway::handlers::{self, GatewayState};
use engram_gateway::schema::{self, SchemaStatus};
use engram_gateway::{auth, metrics, middleware};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    metrics::register_metrics().expect("Failed to register metrics");
    info!("Metrics registered at /metrics");

    info!(pid = std::process::id(), "Starting Engram Gateway...");

    // Load configuration from environment
    let server_config = ServerConfig::from_env();
    server_config.log();

    let graph_config = GraphStoreConfig::from_env()?;
    let vector_config = VectorStoreConfig::from_env()?;
    let llm_config = LlmConfig::from_env();

    info!("   Graph store: {}", graph_config.uri);
    info!(
        "   Vector store: {} (collection: {})",
        vector_config.url, vector_config.collection
    );
    info!(
        "   LLM: {}/{} (temperature: {}, max_tokens: {})",
        llm_config.provider, llm_config.model, llm_config.temperature, llm_config.max_tokens
    );

    // Schema bootstrap runs before the listener binds. A failure here is
    // fatal: serving against an unbootstrapped graph corrupts scoping.
    match schema::initialize(&graph_config).await {
        Ok(SchemaStatus::Initialized) => info!("Graph schema initialized"),
        Ok(SchemaStatus::AlreadyInitialized) => {
            info!("Graph schema already initialized, skipping")
        }
        Err(e) => {
            tracing::error!("Schema bootstrap failed: {e}");
            return Err(e.into());
        }
    }

    let engine = RemoteEngine::new();
    info!("   Engine: {}", engine.base_url());

    let state = Arc::new(GatewayState::new(Arc::new(engine), server_config.clone()));

    // Configure rate limiting from config
    let governor_conf = GovernorConfigBuilder::default()
        .per_second(server_config.rate_limit_per_second)
        .burst_size(server_config.rate_limit_burst)
        .finish()
        .expect("Failed to build governor rate limiter configuration");

    let governor_layer = GovernorLayer::new(governor_conf);

    info!(
        "Rate limiting enabled: {} req/sec, burst of {}",
        server_config.rate_limit_per_second, server_config.rate_limit_burst
    );

    let cors = server_config.cors_layer();

    // Auth and rate limiting apply to protected routes only; health and
    // metrics must stay reachable for probes and scraping.
    let protected_routes = handlers::build_protected_routes(state.clone())
        .layer(axum::middleware::from_fn(auth::auth_middleware))
        .layer(governor_layer);

    let public_routes = handlers::build_public_routes(state.clone());

    let max_concurrent = server_config.max_concurrent_requests;
    info!("Concurrency limiting enabled: max_concurrent={max_concurrent}");

    let app = axum::Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(ConcurrencyLimitLayer::new(max_concurrent))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port).parse()?;
    info!("Server listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutdown signal received, exiting");

    Ok(())
}

/// Handle graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
