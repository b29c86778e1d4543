//! trendies-rewards server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, restores
//! store snapshots when persistence is enabled, and runs the periodic
//! snapshot and invite-expiry tasks.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use trendies_rewards::api;
use trendies_rewards::app_state::AppState;
use trendies_rewards::config::RewardsConfig;
use trendies_rewards::notify::LoggingMailer;
use trendies_rewards::persistence::{PostgresPersistence, SnapshotCoordinator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    // Load configuration
    let config =
        RewardsConfig::from_env().map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;
    tracing::info!(addr = %config.listen_addr, "starting trendies-rewards");

    // Build domain and service layers
    let app_state = AppState::build(&config, Arc::new(LoggingMailer::new()));

    // Restore snapshots and schedule saves
    let snapshots = if config.persistence_enabled {
        let persistence = PostgresPersistence::connect(&config)
            .await
            .context("connecting to PostgreSQL")?;
        let coordinator = SnapshotCoordinator::new(persistence, app_state.stores());
        let restored = coordinator
            .restore_all()
            .await
            .context("restoring store snapshots")?;
        tracing::info!(restored, "store snapshots restored");
        spawn_snapshot_task(coordinator.clone(), config.snapshot_interval_secs);
        Some(coordinator)
    } else {
        tracing::info!("persistence disabled, stores are in-memory only");
        None
    };

    spawn_expiry_sweep(app_state.clone(), config.invite_sweep_interval_secs);

    // Build router
    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(coordinator) = snapshots {
        coordinator
            .save_all()
            .await
            .context("saving final store snapshots")?;
        tracing::info!("final store snapshots saved");
    }

    Ok(())
}

fn spawn_snapshot_task(coordinator: SnapshotCoordinator, every_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(every_secs.max(1)));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = coordinator.save_all().await {
                tracing::warn!(error = %e, "periodic snapshot failed");
            }
        }
    });
}

fn spawn_expiry_sweep(state: AppState, every_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(every_secs.max(1)));
        loop {
            ticker.tick().await;
            let expired = state.referrals.expire_stale(Utc::now()).await;
            if !expired.is_empty() {
                tracing::info!(count = expired.len(), "stale invites expired");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
