#![allow(dead_code)]

use std::{mem, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use model_service_client::{
    ClientError, LookbackDays, ModelService,
    models::{
        futures::{FuturePoint, FuturesResponse},
        metrics::MetricsResponse,
        series::SeriesResponse,
    },
    service::StatusSnafu,
};
use retrain_policy::config::Settings;
use serde::de::IgnoredAny;

/// One recorded call against the fake service; window/limit values as sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Series(u32),
    Backfill,
    Train(u32),
    RebuildSeries(u32),
    UpdateFutures,
    Ingest,
    Metrics,
    Futures(u32),
}

/// In-memory model service that records every call in order.
#[derive(Default)]
pub struct FakeModelService {
    series_points: Option<usize>,
    metrics: MetricsResponse,
    futures: Vec<FuturePoint>,
    fail_on: Option<Call>,
    calls: Mutex<Vec<Call>>,
}

impl FakeModelService {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` makes `/series` behave as absent.
    pub fn with_series(mut self, points: Option<usize>) -> Self {
        self.series_points = points;
        self
    }

    pub fn with_metrics(mut self, status: Option<&str>, finished_at: Option<&str>) -> Self {
        self.metrics = MetricsResponse {
            status: status.map(str::to_string),
            finished_at: finished_at.map(str::to_string),
        };
        self
    }

    pub fn trained_at(self, finished_at: DateTime<Utc>) -> Self {
        let ts = finished_at.format("%Y-%m-%dT%H:%M:%S").to_string();
        self.with_metrics(Some("ok"), Some(&ts))
    }

    pub fn with_futures(mut self, points: Vec<FuturePoint>) -> Self {
        self.futures = points;
        self
    }

    /// Fail every call of the same kind as `call` (arguments ignored).
    pub fn failing_on(mut self, call: Call) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), ClientError> {
        self.calls.lock().unwrap().push(call);
        match self.fail_on {
            Some(f) if mem::discriminant(&f) == mem::discriminant(&call) => StatusSnafu {
                endpoint: format!("{call:?}"),
                status: 503u16,
                body: "unavailable",
            }
            .fail(),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ModelService for FakeModelService {
    async fn series(&self, days: LookbackDays) -> Result<Option<SeriesResponse>, ClientError> {
        self.record(Call::Series(days.get()))?;
        Ok(self.series_points.map(|n| SeriesResponse {
            points: Some(vec![IgnoredAny; n]),
        }))
    }

    async fn backfill(&self) -> Result<(), ClientError> {
        self.record(Call::Backfill)
    }

    async fn train(&self, days: LookbackDays) -> Result<(), ClientError> {
        self.record(Call::Train(days.get()))
    }

    async fn rebuild_series(&self, days: LookbackDays) -> Result<(), ClientError> {
        self.record(Call::RebuildSeries(days.get()))
    }

    async fn update_futures(&self) -> Result<(), ClientError> {
        self.record(Call::UpdateFutures)
    }

    async fn ingest(&self) -> Result<(), ClientError> {
        self.record(Call::Ingest)
    }

    async fn metrics(&self) -> Result<MetricsResponse, ClientError> {
        self.record(Call::Metrics)?;
        Ok(self.metrics.clone())
    }

    async fn futures(&self, limit: u32) -> Result<FuturesResponse, ClientError> {
        self.record(Call::Futures(limit))?;
        Ok(FuturesResponse {
            points: self.futures.clone(),
        })
    }
}

pub fn point(real: Option<f64>, err: Option<f64>) -> FuturePoint {
    FuturePoint {
        time: None,
        real_close: real,
        err_close: err,
    }
}

/// The three-call retrain sequence over `days`.
pub fn retrain_calls(days: u32) -> Vec<Call> {
    vec![Call::Train(days), Call::RebuildSeries(days), Call::UpdateFutures]
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()
}

pub fn settings() -> Settings {
    Settings::default()
}
