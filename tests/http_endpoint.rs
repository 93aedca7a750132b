//! HTTP Endpoint Tests
//!
//! Drives the full router in-process against the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use searchx::executor::FanOutExecutor;
use searchx::geo::GeoDataset;
use searchx::http_server::{
    HttpServer, HttpServerConfig, CONSUMED_CAPACITY_HEADER, PARTIAL_RESULTS_HEADER, SEARCH_PATH,
};
use searchx::search::SearchService;
use searchx::store::MemoryStore;

// =============================================================================
// Test Utilities
// =============================================================================

fn listing(id: &str, latitude: f64, longitude: f64, web_available: bool) -> Value {
    json!({
        "id": id,
        "photoUriPath": format!("/photos/{}.jpg", id),
        "latitude": latitude,
        "longitude": longitude,
        "listPrice": 615000,
        "status": "Active",
        "bedroomsTotal": 2,
        "bathroomsTotalInteger": 2,
        "bathroomsHalf": 1,
        "livingArea": "1100",
        "unitAddress": format!("{} Harbor Dr #4", id),
        "city": "San Diego",
        "stateOrProvince": "CA",
        "postalCode": 92101,
        "webAvailable": web_available
    })
}

fn router() -> Router {
    let listings = json!([
        listing("L-1", 32.71, -117.16, true),
        listing("L-2", 32.72, -117.15, false),
        listing("L-3", 33.10, -117.15, true),
    ]);
    let store = Arc::new(MemoryStore::from_listings(&listings, 10).unwrap());
    let service = SearchService::new(FanOutExecutor::new(store), Arc::new(GeoDataset::empty()));
    HttpServer::with_config(HttpServerConfig::default(), Arc::new(service)).router()
}

fn search_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(SEARCH_PATH)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_returns_listings() {
    let body = json!({"north": 32.8, "south": 32.7, "east": -117.1, "west": -117.2});
    let response = router()
        .oneshot(search_request(&body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(CONSUMED_CAPACITY_HEADER));
    assert!(!response.headers().contains_key(PARTIAL_RESULTS_HEADER));

    let listings = body_json(response).await;
    let listings = listings.as_array().unwrap();
    assert_eq!(listings.len(), 2);

    let first = listings
        .iter()
        .find(|l| l["id"] == "L-1")
        .unwrap();
    assert_eq!(first["photoUri"], "/main/photos/L-1.jpg");
    assert_eq!(first["address"], "L-1 Harbor Dr");
    assert_eq!(first["unit"], "4");
    assert_eq!(first["fullBathrooms"], 1);
    assert_eq!(first["squareFeet"], 1100);
}

#[tokio::test]
async fn test_available_only_uses_web_index() {
    let body = json!({
        "north": 32.8, "south": 32.7, "east": -117.1, "west": -117.2,
        "availableOnly": 1, "per_page": 50, "propertyType": []
    });
    let response = router()
        .oneshot(search_request(&body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let listings = body_json(response).await;
    let ids: Vec<&str> = listings
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|l| l["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["L-1"]);
}

#[tokio::test]
async fn test_missing_window_is_bad_request() {
    let response = router()
        .oneshot(search_request(r#"{"minBedrooms": 2}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "SEARCH_WINDOW_MISSING");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = router()
        .oneshot(search_request("{\"north\": "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "SEARCH_INVALID_REQUEST");
}

#[tokio::test]
async fn test_get_not_allowed() {
    let request = Request::builder()
        .uri(SEARCH_PATH)
        .body(Body::empty())
        .unwrap();
    let response = router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Health & Metrics
// =============================================================================

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_metrics_count_searches() {
    let app = router();

    let body = json!({"north": 32.8, "south": 32.7, "east": -117.1, "west": -117.2});
    let response = app
        .clone()
        .oneshot(search_request(&body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .uri("/observability/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let metrics = body_json(response).await;
    assert_eq!(metrics["searches_executed"], 1);
    assert_eq!(metrics["records_returned"], 2);
}
