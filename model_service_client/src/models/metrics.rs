//! Response of `GET /metrics`: status of the last training job.

use serde::Deserialize;

/// Status value the service reports for a completed training run.
pub const TRAIN_STATUS_OK: &str = "ok";

/// Last training job as reported by the service.
///
/// Both fields are optional; the service omits them before the first training run.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetricsResponse {
    /// Job status, `"ok"` when the last run finished successfully.
    #[serde(default)]
    pub status: Option<String>,
    /// Completion timestamp of the last run, as the service formats it.
    #[serde(default)]
    pub finished_at: Option<String>,
}

impl MetricsResponse {
    /// Whether the last training run is reported as successful.
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(TRAIN_STATUS_OK)
    }
}
