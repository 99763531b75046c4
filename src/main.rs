use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use todobus::config::DeployEnvironment;
use todobus::{App, Settings};

// ============================================================================
// Logging
// ============================================================================

fn init_tracing(environment: DeployEnvironment) {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    if environment.is_productive() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::new().context("failed to load configuration")?;
    init_tracing(settings.environment);

    info!(environment = settings.environment.as_str(), "Starting todobus");

    let app = App::build(&settings).await;
    app.bus.run();

    info!("Event bus running, press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down event bus");
    app.bus.stop();
    app.bus.wait_stopped().await;

    info!(
        pending = app.bus.queue_len(),
        dropped = app.bus.dropped_events(),
        in_flight = app.bus.in_flight(),
        "Event bus stopped"
    );

    Ok(())
}
