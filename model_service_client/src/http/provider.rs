use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use tracing::{debug, warn};
use url::Url;

use crate::{
    http::endpoints,
    models::{
        futures::FuturesResponse, metrics::MetricsResponse, series::SeriesResponse,
        window::LookbackDays,
    },
    service::{ClientBuildSnafu, ClientError, DecodeSnafu, ModelService, RequestSnafu, StatusSnafu},
};

/// Ceiling applied when the caller does not pick one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Longest error body kept in [`ClientError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for the model service.
///
/// Cloning is cheap: the underlying `reqwest::Client` is reference counted. Use
/// [`with_timeout`](Self::with_timeout) to derive a handle with another per-call ceiling.
#[derive(Debug, Clone)]
pub struct HttpModelService {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl HttpModelService {
    /// Creates a client rooted at `base_url`, applying `timeout` to every call.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = endpoints::parse_base_url(base_url)?;
        let client = Client::builder().build().context(ClientBuildSnafu)?;
        Ok(Self {
            client,
            base,
            timeout,
        })
    }

    /// Same client and base URL, different per-call ceiling.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issue one request and return the body of a 2xx response.
    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<String, ClientError> {
        let url = endpoints::join(&self.base, endpoint)?;
        debug!(%method, %url, timeout_secs = self.timeout.as_secs(), "calling model service");

        let mut request = self.client.request(method, url).timeout(self.timeout);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.context(RequestSnafu { endpoint })?;
        let status = response.status();
        let body = response.text().await.context(RequestSnafu { endpoint })?;

        if !status.is_success() {
            return StatusSnafu {
                endpoint,
                status: status.as_u16(),
                body: truncate(body),
            }
            .fail();
        }
        Ok(body)
    }

    async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String, ClientError> {
        self.send(Method::GET, endpoint, query).await
    }

    async fn post(&self, endpoint: &str, query: &[(&str, String)]) -> Result<(), ClientError> {
        self.send(Method::POST, endpoint, query).await.map(|_| ())
    }
}

/// Decode a JSON body, reading an empty or `null` body as `T::default()`.
fn decode_or_default<T>(endpoint: &str, body: &str) -> Result<T, ClientError>
where
    T: DeserializeOwned + Default,
{
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    let parsed: Option<T> = serde_json::from_str(trimmed).context(DecodeSnafu { endpoint })?;
    Ok(parsed.unwrap_or_default())
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

#[async_trait]
impl ModelService for HttpModelService {
    async fn series(
        &self,
        fallback_days: LookbackDays,
    ) -> Result<Option<SeriesResponse>, ClientError> {
        let body = self
            .get(endpoints::SERIES, &[("fallback_days", fallback_days.to_string())])
            .await?;
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Option<SeriesResponse>>(trimmed) {
            Ok(series) => Ok(series),
            Err(e) => {
                warn!(error = %e, "malformed series response, treating as absent");
                Ok(None)
            }
        }
    }

    async fn backfill(&self) -> Result<(), ClientError> {
        self.post(endpoints::INIT_BACKFILL, &[]).await
    }

    async fn train(&self, days: LookbackDays) -> Result<(), ClientError> {
        self.post(endpoints::TRAIN, &[("days", days.to_string())]).await
    }

    async fn rebuild_series(&self, days: LookbackDays) -> Result<(), ClientError> {
        self.post(endpoints::SERIES_REBUILD, &[("days", days.to_string())])
            .await
    }

    async fn update_futures(&self) -> Result<(), ClientError> {
        self.post(endpoints::FUTURES_UPDATE, &[]).await
    }

    async fn ingest(&self) -> Result<(), ClientError> {
        self.post(endpoints::INGEST, &[]).await
    }

    async fn metrics(&self) -> Result<MetricsResponse, ClientError> {
        let body = self.get(endpoints::METRICS, &[]).await?;
        decode_or_default(endpoints::METRICS, &body)
    }

    async fn futures(&self, limit: u32) -> Result<FuturesResponse, ClientError> {
        let body = self
            .get(endpoints::FUTURES, &[("limit", limit.to_string())])
            .await?;
        decode_or_default(endpoints::FUTURES, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_null_bodies_decode_to_default() {
        let m: MetricsResponse = decode_or_default("/metrics", "").unwrap();
        assert_eq!(m, MetricsResponse::default());
        let m: MetricsResponse = decode_or_default("/metrics", " null ").unwrap();
        assert_eq!(m, MetricsResponse::default());
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = decode_or_default::<MetricsResponse>("/metrics", "# HELP up 1").unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
        assert!(err.to_string().contains("/metrics"));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "é".repeat(MAX_ERROR_BODY);
        let out = truncate(body);
        assert!(out.len() <= MAX_ERROR_BODY + 3);
        assert!(out.ends_with("..."));
    }
}
