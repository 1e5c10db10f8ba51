mod common;

use common::db::SeededDb;
use common::http::{get, header_value, parse_response, parse_response_parts};
use common::test_server::TestServer;
use std::sync::Arc;

fn metric(body: &str, name: &str) -> Option<f64> {
    body.lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (key, value) = line.split_once(' ')?;
            (key == name).then(|| value.trim().parse().ok()).flatten()
        })
}

#[test]
fn test_metrics_endpoint_counts_requests() {
    let db = SeededDb::new();
    let server = TestServer::start(Arc::new(db.open_store()), true);

    let _ = get(&server.addr(), "/api/pets/1");
    let _ = get(&server.addr(), "/api/pets/abc");
    let _ = get(&server.addr(), "/health");

    let resp = get(&server.addr(), "/metrics");
    let (status, head, body) = parse_response_parts(&resp);
    assert_eq!(status, 200);
    assert_eq!(
        header_value(&head, "content-type"),
        Some("text/plain; version=0.0.4")
    );

    assert_eq!(metric(&body, "pet_lookup_requests_total"), Some(2.0));
    assert_eq!(metric(&body, "pet_lookup_client_errors_total"), Some(1.0));
    assert_eq!(metric(&body, "pet_lookup_server_errors_total"), Some(0.0));
    // the /metrics request itself is counted before rendering
    assert_eq!(metric(&body, "pet_lookup_top_level_requests_total"), Some(4.0));
    assert!(metric(&body, "pet_lookup_request_latency_seconds").is_some());
    assert!(body.contains("# TYPE pet_lookup_requests_total counter"));
}

#[test]
fn test_metrics_disabled_is_404() {
    let db = SeededDb::new();
    let server = TestServer::start(Arc::new(db.open_store()), false);
    let (status, body) = parse_response(&get(&server.addr(), "/metrics"));
    assert_eq!(status, 404);
    assert_eq!(body["path"], "/metrics");
}
