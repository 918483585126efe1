//! Rajska Requester - standalone server
//!
//! Hosts the submission trigger endpoint.
//! Build: `cargo build --release --bin server`
//!
//! Environment variables:
//! - `RAJSKA_WEB_PORT` - Server port (default: 8080)
//! - `RAJSKA_BROWSER_ADDR` - DevTools address of the remote browser
//!   (overrides the config file)

use std::sync::Arc;

use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = rajska_requester::init_logging();

    info!("Starting Rajska Requester (server mode)");

    if let Some(dir) = rajska_requester::log_dir() {
        info!("Log files saved to: {}", dir.display());
    }

    // Read port from environment
    let port: u16 = std::env::var("RAJSKA_WEB_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let mut config = rajska_requester::AppConfig::load();

    if let Ok(addr) = std::env::var("RAJSKA_BROWSER_ADDR") {
        if !addr.is_empty() && addr != config.remote_browser_addr {
            info!("Using remote browser address from environment: {}", addr);
            config.remote_browser_addr = addr;
            config.save();
        }
    }

    if config.records.is_empty() {
        warn!("No user records configured - the trigger will process an empty batch");
    }

    info!(
        "Remote browser: {} | poll budget: {} x {}s",
        config.remote_browser_addr, config.poll_max_attempts, config.poll_interval_secs
    );

    let state = Arc::new(rajska_requester::AppState::with_config(config));

    info!("Trigger endpoint: http://0.0.0.0:{}/api/submit", port);

    rajska_requester::web::start_server(state, port)
        .await
        .map_err(|e| anyhow::anyhow!("web server failed: {}", e))?;

    Ok(())
}
