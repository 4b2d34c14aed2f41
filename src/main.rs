mod config;
mod dispatch;
mod error;
mod handlers;
mod provider;
#[cfg(test)]
mod testing;
mod types;

use std::path::Path;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use log::{info, warn};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use config::{ProviderConfig, ServerConfig};
use handlers::AppState;
use provider::{MessagingProvider, TwilioClient};

fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/send-failure-alert", post(handlers::send_failure_alert))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    pretty_env_logger::init_timed();

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Could not read .env: {}", e),
    }

    let provider_config = ProviderConfig::from_env();
    let server_config = ServerConfig::from_env();
    provider_config.log_summary();

    let provider = TwilioClient::from_config(&provider_config)
        .map(|client| Arc::new(client) as Arc<dyn MessagingProvider>);

    let state = Arc::new(AppState {
        config: provider_config,
        provider,
    });

    info!("Serving static files from {}", server_config.static_dir.display());
    let app = router(state, &server_config.static_dir);

    let addr = format!("0.0.0.0:{}", server_config.port);
    info!("Server running at http://localhost:{}", server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
