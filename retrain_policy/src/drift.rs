//! Drift detection: has prediction error degraded enough, and has enough time
//! passed since the last training run, to justify retraining?
//!
//! ## Evaluation order
//! 1. Fetch the last training status. No successful run with a parseable
//!    completion timestamp means [`DriftDecision::NeverTrained`]: retrain now.
//! 2. Compute hours elapsed since that run (UTC).
//! 3. If a maximum age is configured and reached: [`DriftDecision::MaxAgeExceeded`].
//! 4. If fewer than `train_min_hours` have elapsed: [`DriftDecision::MinHoursNotReached`].
//!    The prediction log is not fetched.
//! 5. Otherwise fetch the last `futures_rolling_n` prediction-log entries and score
//!    them with [`rolling_mape`]. No qualifying entry gives [`DriftDecision::NoSignal`];
//!    a score at or above the threshold gives [`DriftDecision::MapeThresholdExceeded`].
//!
//! ## Rolling MAPE
//! Only entries with both an actual and an error value, and a non-zero actual, count.
//! Everything else is excluded from numerator *and* denominator. "No qualifying
//! entries" is `None`, never `0.0`.

use std::ops::ControlFlow;

use chrono::{DateTime, Utc};
use model_service_client::{
    ClientError, ModelService,
    models::{futures::FuturePoint, metrics::MetricsResponse},
};
use tracing::debug;

use crate::{config::TrainingCfg, timestamp::parse_finished_at};

/// Last training run as observed through the service's metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// No successful run, or its completion time is missing or unparseable.
    NeverTrained,
    /// Last successful run finished at this instant.
    Trained {
        /// Completion instant (UTC).
        finished_at: DateTime<Utc>,
    },
}

impl TrainingState {
    /// Interpret a metrics response.
    pub fn from_metrics(metrics: &MetricsResponse) -> Self {
        if !metrics.is_ok() {
            return TrainingState::NeverTrained;
        }
        metrics
            .finished_at
            .as_deref()
            .and_then(parse_finished_at)
            .map_or(TrainingState::NeverTrained, |finished_at| {
                TrainingState::Trained { finished_at }
            })
    }
}

/// Hours between `since` and `now`; negative if `since` is in the future.
pub fn hours_between(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - since).num_milliseconds() as f64 / 3_600_000.0
}

/// Mean absolute percentage error over the qualifying entries of a window.
///
/// Per qualifying entry: `|err_close| / |real_close| * 100`.
pub fn rolling_mape(points: &[FuturePoint]) -> Option<f64> {
    let (sum, n) = points
        .iter()
        .filter_map(|p| match (p.real_close, p.err_close) {
            (Some(real), Some(err)) if real.abs() > 0.0 => Some(err.abs() / real.abs() * 100.0),
            _ => None,
        })
        .fold((0.0_f64, 0_usize), |(sum, n), pct| (sum + pct, n + 1));

    (n > 0).then(|| sum / n as f64)
}

/// Gates applied by [`assess`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftPolicy {
    /// Minimum hours since the last run before drift is scored.
    pub min_hours: f64,
    /// Age at which a retrain happens regardless of drift.
    pub max_hours: Option<f64>,
    /// Rolling MAPE (percent) at or above which drift fires.
    pub mape_threshold: f64,
    /// Number of prediction-log entries scored.
    pub rolling_n: u32,
}

impl From<&TrainingCfg> for DriftPolicy {
    fn from(cfg: &TrainingCfg) -> Self {
        Self {
            min_hours: cfg.train_min_hours,
            max_hours: cfg.train_max_hours,
            mape_threshold: cfg.futures_mape_threshold,
            rolling_n: cfg.futures_rolling_n,
        }
    }
}

/// What the drift check observed; absent values were not computed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriftObservation {
    /// Hours since the last successful training run.
    pub hours_since_last_train: Option<f64>,
    /// Rolling MAPE in percent.
    pub rolling_mape: Option<f64>,
}

/// Outcome of the drift check, with the values that led to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftDecision {
    /// No usable record of a previous run: retrain immediately.
    NeverTrained,
    /// Last run is older than the configured maximum age: retrain.
    MaxAgeExceeded {
        /// Hours since the last run.
        hours_since_last_train: f64,
    },
    /// Last run is too recent; drift was not scored.
    MinHoursNotReached {
        /// Hours since the last run.
        hours_since_last_train: f64,
    },
    /// No entry in the window qualified for scoring.
    NoSignal {
        /// Hours since the last run.
        hours_since_last_train: f64,
    },
    /// Error is below the threshold.
    WithinThreshold {
        /// Hours since the last run.
        hours_since_last_train: f64,
        /// Rolling MAPE in percent.
        rolling_mape: f64,
    },
    /// Error reached the threshold: retrain.
    MapeThresholdExceeded {
        /// Hours since the last run.
        hours_since_last_train: f64,
        /// Rolling MAPE in percent.
        rolling_mape: f64,
    },
}

impl DriftDecision {
    /// Whether the retrain sequence should run.
    pub fn should_retrain(&self) -> bool {
        matches!(
            self,
            DriftDecision::NeverTrained
                | DriftDecision::MaxAgeExceeded { .. }
                | DriftDecision::MapeThresholdExceeded { .. }
        )
    }

    /// Short machine-friendly label for logs and reports.
    pub fn reason(&self) -> &'static str {
        match self {
            DriftDecision::NeverTrained => "no_previous_train",
            DriftDecision::MaxAgeExceeded { .. } => "max_hours_exceeded",
            DriftDecision::MinHoursNotReached { .. } => "min_hours_not_reached",
            DriftDecision::NoSignal { .. } => "no_signal",
            DriftDecision::WithinThreshold { .. } => "no_need",
            DriftDecision::MapeThresholdExceeded { .. } => "mape_threshold_exceeded",
        }
    }

    /// Values observed on the way to this decision.
    pub fn observation(&self) -> DriftObservation {
        match *self {
            DriftDecision::NeverTrained => DriftObservation::default(),
            DriftDecision::MaxAgeExceeded {
                hours_since_last_train,
            }
            | DriftDecision::MinHoursNotReached {
                hours_since_last_train,
            }
            | DriftDecision::NoSignal {
                hours_since_last_train,
            } => DriftObservation {
                hours_since_last_train: Some(hours_since_last_train),
                rolling_mape: None,
            },
            DriftDecision::WithinThreshold {
                hours_since_last_train,
                rolling_mape,
            }
            | DriftDecision::MapeThresholdExceeded {
                hours_since_last_train,
                rolling_mape,
            } => DriftObservation {
                hours_since_last_train: Some(hours_since_last_train),
                rolling_mape: Some(rolling_mape),
            },
        }
    }
}

/// Apply the age gates, before any rolling-error fetch.
///
/// Breaks with a final decision, or continues with the hours since the last run when
/// drift must be scored.
pub fn decide_by_age(
    state: TrainingState,
    policy: &DriftPolicy,
    now: DateTime<Utc>,
) -> ControlFlow<DriftDecision, f64> {
    let TrainingState::Trained { finished_at } = state else {
        return ControlFlow::Break(DriftDecision::NeverTrained);
    };
    let hours_since_last_train = hours_between(finished_at, now);

    if let Some(max) = policy.max_hours {
        if hours_since_last_train >= max {
            return ControlFlow::Break(DriftDecision::MaxAgeExceeded {
                hours_since_last_train,
            });
        }
    }
    if hours_since_last_train < policy.min_hours {
        return ControlFlow::Break(DriftDecision::MinHoursNotReached {
            hours_since_last_train,
        });
    }
    ControlFlow::Continue(hours_since_last_train)
}

/// Final decision from a scored window.
pub fn decide_by_mape(
    hours_since_last_train: f64,
    rolling_mape: Option<f64>,
    policy: &DriftPolicy,
) -> DriftDecision {
    match rolling_mape {
        None => DriftDecision::NoSignal {
            hours_since_last_train,
        },
        Some(rolling_mape) if rolling_mape >= policy.mape_threshold => {
            DriftDecision::MapeThresholdExceeded {
                hours_since_last_train,
                rolling_mape,
            }
        }
        Some(rolling_mape) => DriftDecision::WithinThreshold {
            hours_since_last_train,
            rolling_mape,
        },
    }
}

/// Run the drift check against the service. Read-only.
pub async fn assess(
    service: &dyn ModelService,
    policy: &DriftPolicy,
    now: DateTime<Utc>,
) -> Result<DriftDecision, ClientError> {
    let metrics = service.metrics().await?;
    let state = TrainingState::from_metrics(&metrics);
    debug!(?state, status = ?metrics.status, "training state observed");

    let hours_since_last_train = match decide_by_age(state, policy, now) {
        ControlFlow::Continue(hours) => hours,
        ControlFlow::Break(decision) => return Ok(decision),
    };

    let window = service.futures(policy.rolling_n).await?;
    let mape = rolling_mape(&window.points);
    debug!(
        entries = window.points.len(),
        rolling_mape = ?mape,
        "prediction error window scored"
    );
    Ok(decide_by_mape(hours_since_last_train, mape, policy))
}
