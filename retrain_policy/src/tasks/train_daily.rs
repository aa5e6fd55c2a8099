//! Fixed-cadence retrain: runs the retrain sequence on every invocation.

use super::{TaskContext, TaskOutcome};
use crate::sequencer::RetrainAction;

/// Retrain over `min(train_days, 90)`.
pub async fn run(ctx: &TaskContext<'_>) -> anyhow::Result<TaskOutcome> {
    let action = RetrainAction::new(ctx.settings.training.lookback());
    action.run(ctx.service, ctx.dry_run).await?;
    Ok(TaskOutcome::Triggered {
        reason: format!("scheduled (days={})", action.days()),
    })
}
