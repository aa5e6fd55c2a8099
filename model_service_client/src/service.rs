//! Abstraction over the model service.
//!
//! This module defines the [`ModelService`] trait, the set of calls the control
//! layer issues against the forecasting service, one method per endpoint:
//!
//! | Method | Endpoint |
//! |---|---|
//! | [`series`](ModelService::series) | `GET /series?fallback_days={d}` |
//! | [`backfill`](ModelService::backfill) | `POST /init/backfill` |
//! | [`train`](ModelService::train) | `POST /train?days={d}` |
//! | [`rebuild_series`](ModelService::rebuild_series) | `POST /series/rebuild?days={d}` |
//! | [`update_futures`](ModelService::update_futures) | `POST /futures/update` |
//! | [`ingest`](ModelService::ingest) | `POST /ingest` |
//! | [`metrics`](ModelService::metrics) | `GET /metrics` |
//! | [`futures`](ModelService::futures) | `GET /futures?limit={n}` |
//!
//! The trait is async and object safe, so tasks take `&dyn ModelService` and tests
//! substitute an in-memory fake.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use model_service_client::models::{
//!     futures::FuturesResponse, metrics::MetricsResponse, series::SeriesResponse,
//! };
//! use model_service_client::{ClientError, LookbackDays, ModelService};
//!
//! struct NeverTrained;
//!
//! #[async_trait]
//! impl ModelService for NeverTrained {
//!     async fn series(&self, _days: LookbackDays) -> Result<Option<SeriesResponse>, ClientError> {
//!         Ok(None)
//!     }
//!     async fn backfill(&self) -> Result<(), ClientError> { Ok(()) }
//!     async fn train(&self, _days: LookbackDays) -> Result<(), ClientError> { Ok(()) }
//!     async fn rebuild_series(&self, _days: LookbackDays) -> Result<(), ClientError> { Ok(()) }
//!     async fn update_futures(&self) -> Result<(), ClientError> { Ok(()) }
//!     async fn ingest(&self) -> Result<(), ClientError> { Ok(()) }
//!     async fn metrics(&self) -> Result<MetricsResponse, ClientError> {
//!         Ok(MetricsResponse::default())
//!     }
//!     async fn futures(&self, _limit: u32) -> Result<FuturesResponse, ClientError> {
//!         Ok(FuturesResponse::default())
//!     }
//! }
//! ```

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{
    futures::FuturesResponse, metrics::MetricsResponse, series::SeriesResponse,
    window::LookbackDays,
};

/// Calls the control layer issues against the model service.
///
/// Write calls return `()`: their response bodies are not inspected. None of the
/// methods retry.
#[async_trait]
pub trait ModelService: Send + Sync {
    /// Observed historical series over the last `fallback_days`.
    ///
    /// Returns `Ok(None)` when the body is empty, `null`, or not the expected shape.
    async fn series(&self, fallback_days: LookbackDays)
    -> Result<Option<SeriesResponse>, ClientError>;

    /// Trigger a bulk historical backfill.
    async fn backfill(&self) -> Result<(), ClientError>;

    /// Train the model on the last `days` of data.
    async fn train(&self, days: LookbackDays) -> Result<(), ClientError>;

    /// Rebuild the materialized series for the last `days`.
    async fn rebuild_series(&self, days: LookbackDays) -> Result<(), ClientError>;

    /// Refresh forward-looking forecasts.
    async fn update_futures(&self) -> Result<(), ClientError>;

    /// Trigger ingestion of recent data.
    async fn ingest(&self) -> Result<(), ClientError>;

    /// Status of the last training job. An empty or `null` body reads as all-absent.
    async fn metrics(&self) -> Result<MetricsResponse, ClientError>;

    /// The `limit` most recent entries of the prediction log.
    async fn futures(&self, limit: u32) -> Result<FuturesResponse, ClientError>;
}

/// Errors that can occur while talking to the model service.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClientError {
    /// The configured base URL cannot be parsed or joined with an endpoint path.
    #[snafu(display("Invalid model service URL {url:?}: {source}"))]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// Transport failure, including timeouts.
    #[snafu(display("Request to {endpoint} failed: {source}"))]
    Request {
        endpoint: String,
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The service answered with a non-success status.
    #[snafu(display("{endpoint} returned HTTP {status}: {body}"))]
    Status {
        endpoint: String,
        status: u16,
        body: String,
        backtrace: Backtrace,
    },

    /// The response body is not valid JSON of the expected shape.
    #[snafu(display("Malformed response from {endpoint}: {source}"))]
    Decode {
        endpoint: String,
        source: serde_json::Error,
        backtrace: Backtrace,
    },
}

impl ClientError {
    /// Whether this error is a request that hit its timeout ceiling.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Request { source, .. } if source.is_timeout())
    }
}
