use anyhow::{Context, Result};
use sdeal_site::backend::HttpPackageApi;
use sdeal_site::config::Config;
use sdeal_site::server::{app_router, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sdeal_site=info".parse()?),
        )
        .init();

    info!("Starting SDeal site");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!("Forwarding package requests to {}", config.backend_base_url);

    let api = HttpPackageApi::new(config.backend_base_url.clone());
    let port = config.port;
    let state = Arc::new(AppState {
        config: Arc::new(config),
        api: Arc::new(api),
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app_router(state)).await?;
    Ok(())
}
