//! Response of `GET /futures`: the forward-looking prediction log.

use serde::Deserialize;

/// One entry of the prediction log.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FuturePoint {
    /// Target timestamp of the prediction.
    #[serde(default)]
    pub time: Option<String>,
    /// Actual close once known; `None` while the candle is still in the future.
    #[serde(default)]
    pub real_close: Option<f64>,
    /// Signed error of the prediction against `real_close`.
    #[serde(default)]
    pub err_close: Option<f64>,
}

/// Most recent entries of the prediction log.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FuturesResponse {
    #[serde(default)]
    pub points: Vec<FuturePoint>,
}
