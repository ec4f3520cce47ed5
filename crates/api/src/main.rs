use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tracing::info;

use courses_api::app;
use courses_api::config::Config;
use courses_api::jobs::{JobScheduler, OutboxDispatchJob, OutboxPurgeJob, PoolMetricsJob};
use courses_api::middleware::{init_metrics, logging::init_logging};
use courses_api::services::{HttpLiveUpdateNotifier, OutboxDispatcher};
use domain::services::LiveUpdateNotifier;

/// Time given to running jobs after the server stops.
const JOB_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

fn build_scheduler(config: &Config, pool: &sqlx::PgPool) -> Result<JobScheduler> {
    let live_updates = &config.live_updates;
    let notifier: Arc<dyn LiveUpdateNotifier> =
        Arc::new(HttpLiveUpdateNotifier::new(live_updates)?);

    let mut scheduler = JobScheduler::new();
    scheduler.register(PoolMetricsJob::new(pool.clone()));
    scheduler.register(OutboxDispatchJob::new(
        OutboxDispatcher::new(pool.clone(), notifier.clone(), live_updates),
        live_updates.dispatch_interval_secs,
    ));
    scheduler.register(OutboxPurgeJob::new(
        OutboxDispatcher::new(pool.clone(), notifier, live_updates),
        live_updates.retention_days,
    ));
    Ok(scheduler)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging);
    init_metrics()?;

    info!("Starting Courses API v{}", env!("CARGO_PKG_VERSION"));

    let database: persistence::db::DatabaseConfig = (&config.database).into();
    let pool = persistence::db::create_pool(&database).await?;

    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let mut scheduler = build_scheduler(&config, &pool)?;
    scheduler.start();

    let addr = config.socket_addr()?;
    let app = app::create_app(config, pool)?;

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown(JOB_SHUTDOWN_TIMEOUT).await;

    Ok(())
}
