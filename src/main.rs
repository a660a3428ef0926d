use alert_scheduler::alerts::{LogRetentionService, ScheduleEvaluator};
use alert_scheduler::config;
use alert_scheduler::db::{self, repositories::OffHoursLogRepository, repositories::SchedulesRepository};
use anyhow::Result;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;

async fn run_app() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())?;

    // Initialize logging; RUST_LOG takes precedence over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();
    info!("Starting alert scheduler");
    info!("Configuration loaded");

    let store = db::open_store(&config.storage).await?;

    let schedules = SchedulesRepository::new(store.clone());
    let logs = OffHoursLogRepository::with_capacity(store, config.schedule.log_capacity);

    // Materializes the default schedule on first run
    let existing = schedules.list().await?;
    info!("Loaded {} alert schedules", existing.len());

    let evaluator = ScheduleEvaluator::new(schedules, config.schedule.resolution_policy);
    info!("Schedule evaluator ready ({:?})", evaluator.policy());

    let stats = logs.statistics().await?;
    info!(
        "Off-hours log: {} entries ({} critical, {} in the last 24 hours)",
        stats.total, stats.critical, stats.last_24_hours
    );

    let retention = Arc::new(LogRetentionService::new(config.retention.clone(), logs));
    let retention_task = retention.start();

    // Wait for termination signals
    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    if let Some(task) = retention_task {
        task.abort();
        if let Err(e) = task.await {
            if !e.is_cancelled() {
                warn!("Retention task ended abnormally: {}", e);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("Application error: {:#}", e);
        std::process::exit(1);
    }
}
