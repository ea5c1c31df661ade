//! Stopwatch - A state-managed HTTP server hosting a browser stopwatch
//!
//! This is the main entry point for the stopwatch application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use stopwatch::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::spawn_ticker,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(format!("stopwatch={},tower_http=info", config.log_level()))
        .init();

    info!("Starting stopwatch server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, stylesheet={:?}",
          config.host, config.port, config.stylesheet);

    let state = Arc::new(
        AppState::new(config.port, config.host.clone())
            .with_stylesheet(config.stylesheet.clone()),
    );

    // The ticker idles until the stopwatch is started
    let ticker = spawn_ticker(Arc::clone(&state));

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /               - Stopwatch page");
    info!("  POST /start          - Start the stopwatch");
    info!("  POST /stop           - Stop the stopwatch");
    info!("  POST /reset          - Stop and zero the stopwatch");
    info!("  GET  /status         - Current time and running state");
    info!("  GET  /events         - Display updates (server-sent events)");
    info!("  GET  /stopwatch.css  - Page stylesheet");
    info!("  GET  /health         - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    if let Err(e) = ticker.shutdown().await {
        error!("Failed to stop ticker cleanly: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
