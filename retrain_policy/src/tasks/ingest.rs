//! Ingestion trigger: one `POST /ingest`, response ignored.

use anyhow::Context;
use tracing::info;

use super::{TaskContext, TaskOutcome};

/// Ask the service to ingest recent data.
pub async fn run(ctx: &TaskContext<'_>) -> anyhow::Result<TaskOutcome> {
    if ctx.dry_run {
        info!("dry run: would trigger ingestion");
    } else {
        ctx.service.ingest().await.context("ingest failed")?;
    }
    Ok(TaskOutcome::Triggered {
        reason: "scheduled".to_string(),
    })
}
