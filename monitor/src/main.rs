use anyhow::{Context, Result};
use presence_monitor::Supervisor;
use presence_tracker::config::TrackerConfig;
use std::time::Duration;
use tracing::info;

/// How long running monitors get to finish their current cycle on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "presence_monitor=info,presence_tracker=info".into()),
        )
        .init();

    info!("Presence monitor starting...");

    let config = TrackerConfig::from_env().context("Invalid configuration")?;

    info!(
        usernames = ?config.usernames,
        poll_interval_secs = config.poll_interval_secs,
        authenticated = config.roblosecurity.is_some(),
        "Configuration loaded"
    );

    let mut supervisor =
        Supervisor::from_config(&config).context("Failed to initialize supervisor")?;
    let started = supervisor.start(&config.usernames);
    info!(monitors_started = started, "Supervisor started");

    // Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c signal")?;
    info!("Shutdown signal received");

    supervisor.shutdown(SHUTDOWN_GRACE).await;
    info!("Presence monitor stopped");

    Ok(())
}
