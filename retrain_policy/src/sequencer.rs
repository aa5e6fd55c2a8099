//! The fixed train → rebuild series → refresh forecasts sequence.
//!
//! Every retraining trigger ends here. Order matters: the rebuild reads the model
//! the train call just produced, and the forecast refresh reads the rebuilt series.
//! A failing step aborts the rest; steps that already succeeded stand. There is no
//! rollback and no retry: the next scheduled run of the calling task is the retry.

use anyhow::Context;
use model_service_client::{LookbackDays, ModelService};
use tracing::info;

/// One step of the retrain sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrainStep {
    /// `POST /train?days={d}`
    Train,
    /// `POST /series/rebuild?days={d}`
    RebuildSeries,
    /// `POST /futures/update`
    RefreshForecasts,
}

impl RetrainStep {
    /// Steps in the order they are issued.
    pub const ORDER: [RetrainStep; 3] = [
        RetrainStep::Train,
        RetrainStep::RebuildSeries,
        RetrainStep::RefreshForecasts,
    ];

    /// Label used in logs and error context.
    pub fn as_str(self) -> &'static str {
        match self {
            RetrainStep::Train => "train",
            RetrainStep::RebuildSeries => "series rebuild",
            RetrainStep::RefreshForecasts => "forecast refresh",
        }
    }
}

/// "Retrain on this window": a command issued and forgotten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrainAction {
    days: LookbackDays,
}

impl RetrainAction {
    /// Retrain over `days`; the same window is used for train and rebuild.
    pub fn new(days: LookbackDays) -> Self {
        Self { days }
    }

    /// Window this action trains and rebuilds over.
    pub fn days(&self) -> LookbackDays {
        self.days
    }

    /// Issue the three calls in order. With `dry_run`, log each call instead.
    pub async fn run(&self, service: &dyn ModelService, dry_run: bool) -> anyhow::Result<()> {
        for step in RetrainStep::ORDER {
            if dry_run {
                info!(step = step.as_str(), days = %self.days, "dry run: would call model service");
                continue;
            }
            info!(step = step.as_str(), days = %self.days, "calling model service");
            let result = match step {
                RetrainStep::Train => service.train(self.days).await,
                RetrainStep::RebuildSeries => service.rebuild_series(self.days).await,
                RetrainStep::RefreshForecasts => service.update_futures().await,
            };
            result.with_context(|| format!("{} (days={}) failed", step.as_str(), self.days))?;
        }
        Ok(())
    }
}
