//! Endpoint paths and URL construction.

use snafu::ResultExt;
use url::Url;

use crate::service::{ClientError, InvalidBaseUrlSnafu};

pub const SERIES: &str = "/series";
pub const INIT_BACKFILL: &str = "/init/backfill";
pub const TRAIN: &str = "/train";
pub const SERIES_REBUILD: &str = "/series/rebuild";
pub const FUTURES_UPDATE: &str = "/futures/update";
pub const INGEST: &str = "/ingest";
pub const METRICS: &str = "/metrics";
pub const FUTURES: &str = "/futures";

/// Parse a base URL so that endpoint paths join *under* it.
///
/// `http://host/prefix` and `http://host/prefix/` both resolve `train` to
/// `http://host/prefix/train`.
pub fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let mut base = Url::parse(trimmed).context(InvalidBaseUrlSnafu { url: trimmed })?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Resolve an endpoint path against a base produced by [`parse_base_url`].
pub fn join(base: &Url, path: &str) -> Result<Url, ClientError> {
    base.join(path.trim_start_matches('/'))
        .context(InvalidBaseUrlSnafu { url: base.as_str() })
}
