//! Coverage audit: is enough history materialized to support forecasting?
//!
//! The expected number of points assumes five-minute sampling: 25 920 points per
//! 90-day window, scaled linearly (integer arithmetic) for shorter windows.
//! An absent or malformed series counts as zero points, which drives the ratio to
//! zero and therefore triggers a backfill.

use model_service_client::{
    ClientError, LookbackDays, ModelService, models::window::MAX_LOOKBACK_DAYS,
};
use tracing::debug;

/// Points expected in a full [`MAX_LOOKBACK_DAYS`] window (90 days × 288 per day).
pub const POINTS_PER_MAX_WINDOW: u64 = 25_920;

/// Expected number of points for a window: `25920 * days / 90`, truncated.
pub fn expected_count(days: LookbackDays) -> u64 {
    POINTS_PER_MAX_WINDOW * u64::from(days.get()) / u64::from(MAX_LOOKBACK_DAYS)
}

/// Observed coverage for one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverageObservation {
    /// Window that was inspected.
    pub days: LookbackDays,
    /// Points the window should hold.
    pub expected_count: u64,
    /// Points the service reported.
    pub observed_count: u64,
    /// `observed / expected`, or `0` when nothing is expected.
    pub ratio: f64,
}

impl CoverageObservation {
    /// Derive expected count and ratio from an observed count.
    pub fn from_observed(days: LookbackDays, observed_count: u64) -> Self {
        let expected_count = expected_count(days);
        let ratio = if expected_count > 0 {
            observed_count as f64 / expected_count as f64
        } else {
            0.0
        };
        Self {
            days,
            expected_count,
            observed_count,
            ratio,
        }
    }

    /// Backfill is warranted when the ratio falls short of `threshold`.
    pub fn needs_backfill(&self, threshold: f64) -> bool {
        self.ratio < threshold
    }
}

/// Query the observed series for `days` and compute coverage. Read-only.
pub async fn assess(
    service: &dyn ModelService,
    days: LookbackDays,
) -> Result<CoverageObservation, ClientError> {
    let observed = service
        .series(days)
        .await?
        .map_or(0, |series| series.point_count() as u64);
    let obs = CoverageObservation::from_observed(days, observed);
    debug!(
        days = %days,
        expected = obs.expected_count,
        observed = obs.observed_count,
        ratio = obs.ratio,
        "coverage observed"
    );
    Ok(obs)
}
