//! Drift-triggered retrain: runs the drift check and retrains when it fires.

use anyhow::Context;
use tracing::info;

use super::{TaskContext, TaskOutcome};
use crate::{
    drift::{self, DriftPolicy},
    sequencer::RetrainAction,
};

/// Retrain over `min(train_days, 90)` if never trained, too old, or drifting.
pub async fn run(ctx: &TaskContext<'_>) -> anyhow::Result<TaskOutcome> {
    let training = &ctx.settings.training;
    let policy = DriftPolicy::from(training);

    let decision = drift::assess(ctx.service, &policy, ctx.now)
        .await
        .context("drift check failed")?;
    let obs = decision.observation();
    info!(
        reason = decision.reason(),
        hours_since_last_train = ?obs.hours_since_last_train,
        rolling_mape = ?obs.rolling_mape,
        min_hours = policy.min_hours,
        mape_threshold = policy.mape_threshold,
        "drift assessed"
    );

    let reason = decision.reason().to_string();
    if !decision.should_retrain() {
        return Ok(TaskOutcome::NoAction { reason });
    }

    RetrainAction::new(training.lookback())
        .run(ctx.service, ctx.dry_run)
        .await?;
    Ok(TaskOutcome::Triggered { reason })
}
