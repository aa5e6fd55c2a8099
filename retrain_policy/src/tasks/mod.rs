//! The four scheduled entry points and the boundary that runs them.
//!
//! | Task | Decision | Writes |
//! |---|---|---|
//! | [`ingest`] | none | `POST /ingest` |
//! | [`backfill`] | coverage ratio below threshold (gated by `run_on_startup`) | backfill, then retrain sequence |
//! | [`train_daily`] | none | retrain sequence |
//! | [`train_drift`] | drift policy | retrain sequence |
//!
//! [`run_task`] is the only entry point a scheduler should call. It never fails: any
//! error inside a task aborts the rest of that task, is logged with its full chain, and
//! comes back in the [`TaskReport`]. The next scheduled invocation is the recovery path.

pub mod backfill;
pub mod ingest;
pub mod train_daily;
pub mod train_drift;

use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use model_service_client::ModelService;
use tracing::{error, info};

use crate::config::Settings;

/// Which scheduled task to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Unconditional ingestion trigger.
    Ingest,
    /// Startup coverage check with conditional backfill and retrain.
    BackfillOnStartup,
    /// Unconditional retrain on a fixed cadence.
    TrainDaily,
    /// Retrain when the drift policy fires.
    TrainDrift,
}

impl TaskKind {
    /// All tasks.
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Ingest,
        TaskKind::BackfillOnStartup,
        TaskKind::TrainDaily,
        TaskKind::TrainDrift,
    ];

    /// Stable name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            TaskKind::Ingest => "ingest",
            TaskKind::BackfillOnStartup => "backfill",
            TaskKind::TrainDaily => "train_daily",
            TaskKind::TrainDrift => "train_drift",
        }
    }

    /// Per-call ceiling for this task's requests: short for ingest, long otherwise.
    pub fn timeout(self, settings: &Settings) -> Duration {
        match self {
            TaskKind::Ingest => settings.service.ingest_timeout(),
            _ => settings.service.task_timeout(),
        }
    }

    /// Cron expression for periodic tasks; `None` for the run-once backfill.
    pub fn schedule(self, settings: &Settings) -> Option<&str> {
        match self {
            TaskKind::Ingest => Some(&settings.schedule.ingest),
            TaskKind::TrainDaily => Some(&settings.schedule.train_daily),
            TaskKind::TrainDrift => Some(&settings.schedule.train_drift),
            TaskKind::BackfillOnStartup => None,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inputs of one task run. Nothing here outlives the run.
pub struct TaskContext<'a> {
    /// Model service, already configured with this task's timeout.
    pub service: &'a dyn ModelService,
    /// Process settings.
    pub settings: &'a Settings,
    /// Read and decide, but log write calls instead of issuing them.
    pub dry_run: bool,
    /// Wall-clock instant the run treats as "now".
    pub now: DateTime<Utc>,
}

impl<'a> TaskContext<'a> {
    /// Context for a live run at the current time.
    pub fn new(service: &'a dyn ModelService, settings: &'a Settings) -> Self {
        Self {
            service,
            settings,
            dry_run: false,
            now: Utc::now(),
        }
    }

    /// Same context in dry-run mode.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What a task did.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Gated off by configuration; no call was made.
    Disabled,
    /// Checks ran and no write was warranted.
    NoAction {
        /// Why nothing was written.
        reason: String,
    },
    /// Write calls were issued (or logged, in dry run).
    Triggered {
        /// Why the writes happened.
        reason: String,
    },
}

impl fmt::Display for TaskOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutcome::Disabled => f.write_str("disabled"),
            TaskOutcome::NoAction { reason } => write!(f, "no action ({reason})"),
            TaskOutcome::Triggered { reason } => write!(f, "triggered ({reason})"),
        }
    }
}

/// Result of one task run as seen from outside the task boundary.
#[derive(Debug)]
pub struct TaskReport {
    /// Task that ran.
    pub task: TaskKind,
    /// Whether write calls were suppressed.
    pub dry_run: bool,
    /// Wall time spent in the task.
    pub elapsed: Duration,
    /// Outcome, or the rendered error chain that aborted the run.
    pub result: Result<TaskOutcome, String>,
}

impl TaskReport {
    /// Whether the run finished without error.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run one task behind the failure boundary.
///
/// Never returns an error; failures are logged at `error` and recorded in the report.
pub async fn run_task(kind: TaskKind, ctx: &TaskContext<'_>) -> TaskReport {
    let started = std::time::Instant::now();
    info!(task = %kind, dry_run = ctx.dry_run, "task started");

    let result = match kind {
        TaskKind::Ingest => ingest::run(ctx).await,
        TaskKind::BackfillOnStartup => backfill::run(ctx).await,
        TaskKind::TrainDaily => train_daily::run(ctx).await,
        TaskKind::TrainDrift => train_drift::run(ctx).await,
    };
    let elapsed = started.elapsed();

    let result = match result {
        Ok(outcome) => {
            info!(task = %kind, elapsed_ms = elapsed.as_millis() as u64, %outcome, "task finished");
            Ok(outcome)
        }
        Err(e) => {
            let chain = format!("{e:#}");
            error!(task = %kind, elapsed_ms = elapsed.as_millis() as u64, error = %chain, "task failed");
            Err(chain)
        }
    };

    TaskReport {
        task: kind,
        dry_run: ctx.dry_run,
        elapsed,
        result,
    }
}
