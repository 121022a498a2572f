//! Pause Tracker - A drive/pause cycle timer for long-haul drivers
//!
//! This is the main entry point for the pause-tracker server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use pause_tracker::{
    config::Config,
    state::AppState,
    api::create_router,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pause_tracker={},tower_http=info", config.log_level()))
        .init();

    let durations = config.durations();
    info!("Starting pause-tracker server v1.0.1");
    info!("Configuration: host={}, port={}, silent={}",
          config.host, config.port, config.silent);
    info!("Cycle: warm-up={}s, driving={}s, warning={}s, rest={}s",
          durations.warm_up, durations.driving, durations.warning, durations.rest);

    // Create application state; the timer stays idle until a client starts it
    let state = Arc::new(AppState::new(config.port, config.host.clone(), durations, config.silent));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start            - Start a drive/pause cycle");
    info!("  POST /stop             - Stop the cycle");
    info!("  POST /reset            - Stop and zero the timer");
    info!("  POST /toggle           - Start or stop");
    info!("  GET  /status           - Current timer snapshot");
    info!("  GET  /events           - Timer and tone event stream");
    info!("  GET  /achievements     - Cycle report summary");
    info!("  GET  /stats            - Driving/rest totals (premium)");
    info!("  GET  /history          - Past cycle runs");
    info!("  GET  /premium          - Premium status");
    info!("  POST /premium/unlock   - Unlock premium with a code");
    info!("  POST /premium/purchase - Permanent premium unlock");
    info!("  GET  /health           - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
