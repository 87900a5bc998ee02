use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, http::StatusCode, Router};
use omdb_gateway::omdb::{OmdbClient, RetryPolicy};
use omdb_gateway::server::{build_router, AppState};
use tower::ServiceExt;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn router_for(base_url: &str) -> Router {
    let client = OmdbClient::build(base_url, "test-key", Duration::from_secs(5))
        .unwrap()
        .with_retry_policy(RetryPolicy::default().with_unit(Duration::from_millis(1)));
    build_router(AppState::new(Arc::new(client)))
}

async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn lion_search_is_relayed_verbatim() {
    let upstream = serde_json::json!({
        "Search": [{
            "Title": "Lion",
            "Year": "2016",
            "imdbID": "tt3281548",
            "Type": "movie",
            "Poster": "N/A"
        }],
        "totalResults": "1",
        "Response": "True"
    });

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("s", "Lion"))
        .and(query_param("page", "1"))
        .and(query_param("type", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(&upstream))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(
        router_for(&format!("{}/", server.uri())),
        "/api/SearchOmdb/Lion/1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream);
}

#[tokio::test]
async fn not_found_payload_is_passed_through() {
    let upstream = serde_json::json!({
        "Response": "False",
        "Error": "Movie not found!"
    });

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&upstream))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(
        router_for(&format!("{}/", server.uri())),
        "/api/SearchOmdb/zzzzzz/1",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, upstream);
}

#[tokio::test]
async fn failing_upstream_maps_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let (status, body) = get(
        router_for(&format!("{}/", server.uri())),
        "/api/SearchOmdb/Lion/1",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "upstream_error");
}

#[tokio::test]
async fn malformed_upstream_body_maps_to_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = get(
        router_for(&format!("{}/", server.uri())),
        "/api/SearchOmdb/Lion/1",
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "decode_error");
}

#[tokio::test]
async fn unreachable_upstream_returns_error_status() {
    let (status, _) = get(router_for("http://127.0.0.1:1/"), "/api/SearchOmdb/Lion/1").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}
