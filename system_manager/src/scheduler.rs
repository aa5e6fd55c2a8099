//! Cron wiring: one job per periodic task, backfill once at startup.

use std::sync::Arc;

use anyhow::{Context, anyhow};
use retrain_policy::tasks::TaskKind;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::runner::TaskRunner;

/// Build a scheduler with a job for every task that has a cadence.
pub async fn build(runner: Arc<TaskRunner>) -> anyhow::Result<JobScheduler> {
    let sched = JobScheduler::new()
        .await
        .map_err(|e| anyhow!("failed to create job scheduler: {e:?}"))?;

    for kind in TaskKind::ALL {
        let Some(expr) = kind.schedule(runner.settings()) else {
            continue;
        };
        let job_runner = Arc::clone(&runner);
        let job = Job::new_async(expr, move |_id, _sched| {
            let r = Arc::clone(&job_runner);
            Box::pin(async move {
                r.tick(kind).await;
            })
        })
        .map_err(|e| anyhow!("invalid cron expression {expr:?} for {kind}: {e:?}"))?;

        sched
            .add(job)
            .await
            .map_err(|e| anyhow!("failed to schedule {kind}: {e:?}"))?;
        info!(task = %kind, schedule = expr, "task scheduled");
    }
    Ok(sched)
}

/// Start the cadences, fire the startup backfill, and block until Ctrl-C.
pub async fn run(runner: Arc<TaskRunner>) -> anyhow::Result<()> {
    let mut sched = build(Arc::clone(&runner)).await?;
    sched
        .start()
        .await
        .map_err(|e| anyhow!("failed to start job scheduler: {e:?}"))?;
    info!(base_url = %runner.settings().service.base_url, "scheduler started");

    let startup = Arc::clone(&runner);
    tokio::spawn(async move {
        startup.tick(TaskKind::BackfillOnStartup).await;
    });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("shutdown requested");

    sched
        .shutdown()
        .await
        .map_err(|e| anyhow!("failed to shut down job scheduler: {e:?}"))?;
    info!("scheduler stopped");
    Ok(())
}
