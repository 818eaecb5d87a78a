//! Background sweep scheduler.
//!
//! Registers one cron job that scrapes every configured platform and
//! refreshes the in-memory latest-outcome cache. Alert events are emitted
//! inside the sweep itself; the durable alert store is an external system
//! that consumes the outcome records.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use rentwatch_scraper::run_sweep;

use crate::api::AppState;

/// Builds and starts the background job scheduler with the sweep job
/// registered on `cron` (six-field expression, with seconds).
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid or the
/// scheduler cannot be initialised or started.
pub async fn build_scheduler(
    state: AppState,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job_state = state.clone();
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = job_state.clone();
        Box::pin(async move {
            run_scheduled_sweep(&state).await;
        })
    })?;
    scheduler.add(job).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

async fn run_scheduled_sweep(state: &AppState) {
    tracing::info!(platforms = state.platforms.len(), "scheduled sweep starting");

    let entries = run_sweep(
        &state.executor,
        &state.platforms,
        state.max_concurrent_scrapes,
    )
    .await;

    let alerts = entries.iter().filter(|e| e.alert.is_some()).count();
    crate::api::store_latest(state, &entries).await;

    tracing::info!(
        platforms = entries.len(),
        alerts,
        "scheduled sweep finished"
    );
}
