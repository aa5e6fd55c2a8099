//! Response of `GET /series`.

use serde::Deserialize;
use serde::de::IgnoredAny;

/// Materialized historical series as returned by the service.
///
/// Only the number of points matters to the control layer, so each point is
/// skipped during deserialization rather than modelled.
#[derive(Debug, Default, Deserialize)]
pub struct SeriesResponse {
    /// One entry per materialized sample. Absent or `null` reads as empty.
    #[serde(default)]
    pub points: Option<Vec<IgnoredAny>>,
}

impl SeriesResponse {
    /// Number of observed points in the series.
    pub fn point_count(&self) -> usize {
        self.points.as_ref().map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_points_without_inspecting_them() {
        let body = r#"{"points":[{"real":{"time":"2024-01-01T00:00:00"}},{},3]}"#;
        let s: SeriesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(s.point_count(), 3);
    }

    #[test]
    fn missing_or_null_points_count_as_zero() {
        let s: SeriesResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(s.point_count(), 0);
        let s: SeriesResponse = serde_json::from_str(r#"{"points":null}"#).unwrap();
        assert_eq!(s.point_count(), 0);
    }
}
