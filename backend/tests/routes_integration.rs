//! End-to-end tests of the HTTP API against the in-memory repository.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use bus_tracker::db::repositories::LocalRepository;
use bus_tracker::db::FullRepository;
use bus_tracker::http::{create_router, AppState};
use bus_tracker::models::Collection;

fn app(repo: &LocalRepository) -> Router {
    let repository = Arc::new(repo.clone()) as Arc<dyn FullRepository>;
    create_router(AppState::new(repository))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn delete(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, None).await
}

async fn create_route(app: &Router, title: &str, stops: &[&str]) -> String {
    let stops: Vec<Value> = stops.iter().map(|name| json!({ "name": name })).collect();
    let (status, route) = post(app, "/add-route", json!({ "title": title, "stops": stops })).await;
    assert_eq!(status, StatusCode::OK);
    route["_id"].as_str().unwrap().to_string()
}

async fn create_bus(app: &Router, name: &str, route_id: &str) -> Value {
    let (status, body) = post(app, "/add-bus", json!({ "name": name, "routeId": route_id })).await;
    assert_eq!(status, StatusCode::OK);
    body
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_store_status() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    repo.set_healthy(false);
    let (_, body) = get(&app, "/health").await;
    assert_eq!(body["database"], "disconnected");
}

// =============================================================================
// Stops
// =============================================================================

#[tokio::test]
async fn test_add_and_list_stops() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, stop) = post(
        &app,
        "/add-stop",
        json!({ "name": "Central", "latitude": 12.97, "longitude": "77.59" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stop["name"], "Central");
    assert_eq!(stop["location"]["latitude"], 12.97);
    assert_eq!(stop["location"]["longitude"], 77.59);
    assert!(stop["_id"].is_string());

    let (status, stops) = get(&app, "/stops").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stops.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_stop_without_coordinates() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, stop) = post(&app, "/add-stop", json!({ "name": "Nowhere" })).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stop["location"].get("latitude").is_none());
    assert_eq!(repo.stop_count(), 1);
}

#[tokio::test]
async fn test_delete_stop_is_idempotent() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (_, stop) = post(&app, "/add-stop", json!({ "name": "A" })).await;
    let uri = format!("/delete-stop/{}", stop["_id"].as_str().unwrap());

    let (status, body) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stop deleted successfully");
    assert_eq!(repo.stop_count(), 0);

    let (status, body) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stop deleted successfully");
}

// =============================================================================
// Routes
// =============================================================================

#[tokio::test]
async fn test_add_route_keeps_only_stop_names() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, route) = post(
        &app,
        "/add-route",
        json!({
            "title": "Line 1",
            "stops": [
                { "name": "A", "latitude": 1.0, "longitude": 2.0 },
                { "name": "B" }
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(route["title"], "Line 1");
    assert_eq!(route["stops"], json!([{ "name": "A" }, { "name": "B" }]));

    let (status, routes) = get(&app, "/routes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(routes.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_route_malformed_body_is_500() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, body) = post(&app, "/add-route", json!({ "title": "No stops" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error adding route");
    assert!(body["error"].is_string());
    assert_eq!(repo.route_count(), 0);
}

#[tokio::test]
async fn test_list_routes_failure_is_generic_500() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    repo.set_collection_failure(Collection::Routes, true);

    let (status, body) = get(&app, "/routes").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");
    assert!(body.get("error").is_none());
}

// =============================================================================
// Buses
// =============================================================================

#[tokio::test]
async fn test_add_bus_snapshots_route() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    let route_id = create_route(&app, "Line 1", &["A", "B", "C"]).await;

    let body = create_bus(&app, "B1", &route_id).await;
    assert_eq!(body["bus"]["name"], "B1");
    assert!(body["bus"].get("location").is_none());
    assert_eq!(body["busRoute"]["busName"], "B1");
    assert_eq!(body["busRoute"]["routeId"], route_id.as_str());
    assert_eq!(body["busRoute"]["route"]["title"], "Line 1");
    assert_eq!(body["busRoute"]["route"]["stops"].as_array().unwrap().len(), 3);

    assert_eq!(repo.bus_count(), 1);
    assert_eq!(repo.bus_route_count(), 1);
}

#[tokio::test]
async fn test_add_bus_unknown_route_is_404_and_writes_nothing() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, body) = post(&app, "/add-bus", json!({ "name": "B1", "routeId": "nope" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
    assert_eq!(repo.bus_count(), 0);
    assert_eq!(repo.bus_route_count(), 0);
}

#[tokio::test]
async fn test_add_bus_without_route_id_is_404_and_writes_nothing() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    create_route(&app, "Line 1", &["A"]).await;

    let (status, body) = post(&app, "/add-bus", json!({ "name": "B1" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
    assert_eq!(repo.bus_count(), 0);
    assert_eq!(repo.bus_route_count(), 0);
}

#[tokio::test]
async fn test_add_bus_snapshot_failure_removes_bus() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    let route_id = create_route(&app, "Line 1", &["A"]).await;
    repo.set_collection_failure(Collection::BusRoutes, true);

    let (status, body) = post(&app, "/add-bus", json!({ "name": "B1", "routeId": route_id })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Error adding bus");
    assert_eq!(repo.bus_count(), 0);
    assert_eq!(repo.bus_route_count(), 0);
}

#[tokio::test]
async fn test_update_location_and_bus_details() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    let route_id = create_route(&app, "Line 1", &["A"]).await;
    create_bus(&app, "B1", &route_id).await;

    let (status, bus) = post(
        &app,
        "/update-location",
        json!({ "name": "B1", "latitude": "10.5", "longitude": 20 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bus["location"], json!({ "latitude": 10.5, "longitude": 20.0 }));

    let (status, details) = get(&app, "/bus-details/name/B1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(details["location"]["latitude"], 10.5);
}

#[tokio::test]
async fn test_update_location_unknown_bus_returns_null() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, body) = post(
        &app,
        "/update-location",
        json!({ "name": "ghost", "latitude": 1, "longitude": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_update_location_only_touches_first_match() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    let route_id = create_route(&app, "Line 1", &["A"]).await;
    create_bus(&app, "dup", &route_id).await;
    create_bus(&app, "dup", &route_id).await;

    post(
        &app,
        "/update-location",
        json!({ "name": "dup", "latitude": 1, "longitude": 1 }),
    )
    .await;

    let (_, buses) = get(&app, "/buses").await;
    let buses = buses.as_array().unwrap();
    assert_eq!(buses.len(), 2);
    assert!(buses[0].get("location").is_some());
    assert!(buses[1].get("location").is_none());
}

#[tokio::test]
async fn test_bus_details_unknown_is_404() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, body) = get(&app, "/bus-details/name/ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Bus not found");
}

#[tokio::test]
async fn test_bus_details_store_failure_is_500() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    repo.set_collection_failure(Collection::Buses, true);

    let (status, body) = get(&app, "/bus-details/name/B1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("Simulated failure"));
}

#[tokio::test]
async fn test_delete_bus_keeps_bus_route() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    let route_id = create_route(&app, "Line 1", &["A", "B"]).await;
    let body = create_bus(&app, "B1", &route_id).await;
    let uri = format!("/delete-bus/{}", body["bus"]["_id"].as_str().unwrap());

    let (status, body) = delete(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bus deleted successfully");
    assert_eq!(repo.bus_count(), 0);
    assert_eq!(repo.bus_route_count(), 1);

    // The orphaned snapshot is still searchable.
    let (status, _) = post(&app, "/search-buses", json!({ "from": "A", "to": "B" })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_unknown_bus_still_succeeds() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    let route_id = create_route(&app, "Line 1", &["A"]).await;
    create_bus(&app, "B1", &route_id).await;

    let (status, body) = delete(&app, "/delete-bus/no-such-bus").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bus deleted successfully");
    assert_eq!(repo.bus_count(), 1);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_matches_in_either_direction() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    let route_id = create_route(&app, "Line 1", &["A", "B", "C"]).await;
    create_bus(&app, "B1", &route_id).await;

    let (status, forward) = post(&app, "/search-buses", json!({ "from": "A", "to": "C" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(forward.as_array().unwrap().len(), 1);
    assert_eq!(forward[0]["busName"], "B1");

    let (status, backward) = post(&app, "/search-buses", json!({ "from": "C", "to": "A" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(backward.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_search_without_match_is_404() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    let route_id = create_route(&app, "Line 1", &["A", "B"]).await;
    create_bus(&app, "B1", &route_id).await;

    let (status, body) = post(&app, "/search-buses", json!({ "from": "A", "to": "Z" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No buses found for the given route");
}

#[tokio::test]
async fn test_search_failure_is_500() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    repo.set_collection_failure(Collection::BusRoutes, true);

    let (status, body) = post(&app, "/search-buses", json!({ "from": "A", "to": "B" })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");
}

#[tokio::test]
async fn test_snapshot_is_frozen_until_refreshed() {
    let repo = LocalRepository::new();
    let app = app(&repo);
    let route_id = create_route(&app, "Line 1", &["A", "B"]).await;
    create_bus(&app, "B1", &route_id).await;

    let (_, routes) = get(&app, "/routes").await;
    let mut route: bus_tracker::models::Route = serde_json::from_value(routes[0].clone()).unwrap();
    route.stops.push(bus_tracker::models::RouteStop::named("C"));
    assert!(repo.overwrite_route(route));

    let (status, _) = post(&app, "/search-buses", json!({ "from": "A", "to": "C" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, refreshed) = post(&app, "/refresh-bus-route/B1", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed[0]["route"]["stops"].as_array().unwrap().len(), 3);

    let (status, _) = post(&app, "/search-buses", json!({ "from": "A", "to": "C" })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_unknown_bus_is_404() {
    let repo = LocalRepository::new();
    let app = app(&repo);

    let (status, body) = post(&app, "/refresh-bus-route/ghost", json!({})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Bus route not found");
}
