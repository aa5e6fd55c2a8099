//! Backfill on startup: coverage check, then backfill and retrain when short.
//!
//! The backfill call and the retrain sequence are independent writes. If the
//! backfill succeeds and the sequence fails, the data stays backfilled and a later
//! training task picks it up.

use anyhow::Context;
use tracing::info;

use super::{TaskContext, TaskOutcome};
use crate::{coverage, sequencer::RetrainAction};

/// Run the coverage check over `min(backfill_days, 90)` and react to it.
pub async fn run(ctx: &TaskContext<'_>) -> anyhow::Result<TaskOutcome> {
    let cfg = &ctx.settings.backfill;
    if !cfg.run_on_startup {
        info!("backfill on startup disabled");
        return Ok(TaskOutcome::Disabled);
    }

    let days = cfg.lookback();
    let obs = coverage::assess(ctx.service, days)
        .await
        .context("coverage check failed")?;
    let threshold = cfg.expected_coverage_ratio;

    info!(
        days = %days,
        expected = obs.expected_count,
        observed = obs.observed_count,
        ratio = obs.ratio,
        threshold,
        "coverage assessed"
    );

    if !obs.needs_backfill(threshold) {
        return Ok(TaskOutcome::NoAction {
            reason: format!("coverage {:.3} >= {:.3}", obs.ratio, threshold),
        });
    }

    if ctx.dry_run {
        info!("dry run: would trigger backfill");
    } else {
        info!("coverage below threshold, triggering backfill");
        ctx.service.backfill().await.context("backfill failed")?;
    }
    RetrainAction::new(days)
        .run(ctx.service, ctx.dry_run)
        .await?;

    Ok(TaskOutcome::Triggered {
        reason: format!("coverage {:.3} < {:.3}", obs.ratio, threshold),
    })
}
