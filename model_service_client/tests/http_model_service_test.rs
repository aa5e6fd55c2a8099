use std::time::Duration;

use model_service_client::{ClientError, HttpModelService, LookbackDays, ModelService};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpModelService {
    HttpModelService::new(&server.uri(), Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn series_sends_fallback_days_and_counts_points() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/series"))
        .and(query_param("fallback_days", "30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "points": [
                {"real": {"time": "2024-01-01T00:00:00"}},
                {"real": {"time": "2024-01-01T00:05:00"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let series = client(&server)
        .series(LookbackDays::clamped(30))
        .await
        .expect("series");
    assert_eq!(series.expect("present").point_count(), 2);
}

#[tokio::test]
async fn series_with_malformed_or_null_body_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/series"))
        .and(query_param("fallback_days", "90"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/series"))
        .and(query_param("fallback_days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let c = client(&server);
    assert!(c.series(LookbackDays::clamped(90)).await.unwrap().is_none());
    assert!(c.series(LookbackDays::clamped(7)).await.unwrap().is_none());
}

#[tokio::test]
async fn write_calls_hit_expected_paths_and_queries() {
    let server = MockServer::start().await;
    for (p, q) in [
        ("/train", Some(("days", "45"))),
        ("/series/rebuild", Some(("days", "45"))),
        ("/futures/update", None),
        ("/init/backfill", None),
        ("/ingest", None),
    ] {
        let mut mock = Mock::given(method("POST")).and(path(p));
        if let Some((k, v)) = q {
            mock = mock.and(query_param(k, v));
        }
        mock.respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let c = client(&server);
    let days = LookbackDays::clamped(45);
    c.train(days).await.expect("train");
    c.rebuild_series(days).await.expect("rebuild");
    c.update_futures().await.expect("futures update");
    c.backfill().await.expect("backfill");
    c.ingest().await.expect("ingest");
}

#[tokio::test]
async fn base_url_path_prefix_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fase4/ingest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let c = HttpModelService::new(&format!("{}/fase4", server.uri()), Duration::from_secs(5))
        .expect("client");
    c.ingest().await.expect("ingest");
}

#[tokio::test]
async fn metrics_and_futures_decode_leniently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "finished_at": "2024-05-01T10:00:00",
            "val_mape": 0.42
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/futures"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "points": [
                {"time": "2024-05-01T10:00:00", "real_close": 100.0, "err_close": 2.0},
                {"time": "2024-05-01T10:05:00", "real_close": null, "err_close": null},
                {"time": "2024-05-01T10:10:00"}
            ]
        })))
        .mount(&server)
        .await;

    let c = client(&server);
    let m = c.metrics().await.expect("metrics");
    assert!(m.is_ok());
    assert_eq!(m.finished_at.as_deref(), Some("2024-05-01T10:00:00"));

    let f = c.futures(3).await.expect("futures");
    assert_eq!(f.points.len(), 3);
    assert_eq!(f.points[0].real_close, Some(100.0));
    assert_eq!(f.points[1].err_close, None);
    assert_eq!(f.points[2].real_close, None);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/train"))
        .respond_with(ResponseTemplate::new(500).set_body_string("training exploded"))
        .mount(&server)
        .await;

    let err = client(&server)
        .train(LookbackDays::clamped(90))
        .await
        .unwrap_err();
    match err {
        ClientError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "training exploded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn slow_response_hits_the_timeout_ceiling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let c = client(&server).with_timeout(Duration::from_millis(50));
    let err = c.ingest().await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err}");
}
