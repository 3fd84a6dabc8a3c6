use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use roster_api::config::{Config, UpstreamMode};
use roster_api::routes::build_router;
use roster_api::state::AppState;
use roster_api::upstream::{HttpResumeApi, InMemoryResumeApi, ResumeApi};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Roster API v{}", env!("CARGO_PKG_VERSION"));

    let api = build_upstream(&config)?;

    let state = AppState::new(api, config.clone());

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_upstream(config: &Config) -> Result<Arc<dyn ResumeApi>> {
    match config.upstream_mode {
        UpstreamMode::Http => {
            let base_url = config
                .upstream_base_url
                .clone()
                .context("UPSTREAM_BASE_URL is required in http mode")?;
            info!(
                "Upstream: {base_url} (timeout {}s)",
                config.upstream_timeout.as_secs()
            );
            let client = HttpResumeApi::new(
                base_url,
                config.upstream_api_token.clone(),
                config.upstream_timeout,
            )?;
            Ok(Arc::new(client))
        }
        UpstreamMode::Memory => {
            info!("Upstream: in-memory demo store");
            Ok(Arc::new(InMemoryResumeApi::with_demo_data()))
        }
    }
}
