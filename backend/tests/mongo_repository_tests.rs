//! MongoDB repository tests.
//!
//! These need a running server: set `MONGODB_URI` to enable them. Each test
//! works in its own throwaway database.

#![cfg(feature = "mongo-repo")]

use bus_tracker::db::repositories::{MongoConfig, MongoRepository};
use bus_tracker::db::repository::*;
use bus_tracker::db::services;
use bus_tracker::models::{Bus, BusId, Location, RouteId, Stop, StopId};

async fn connect() -> Option<MongoRepository> {
    let Ok(uri) = std::env::var("MONGODB_URI") else {
        eprintln!("MONGODB_URI not set, skipping");
        return None;
    };
    let config = MongoConfig {
        connection_uri: uri,
        database: Some(format!("bus_tracker_test_{}", uuid::Uuid::new_v4().simple())),
        server_selection_timeout_sec: 5,
        ..Default::default()
    };
    Some(MongoRepository::new(config).await.unwrap())
}

#[tokio::test]
async fn test_empty_uri_is_configuration_error() {
    let err = MongoRepository::new(MongoConfig::default())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
}

#[tokio::test]
async fn test_malformed_uri_is_rejected() {
    let config = MongoConfig {
        connection_uri: "not-a-uri".to_string(),
        ..Default::default()
    };
    assert!(MongoRepository::new(config).await.is_err());
}

#[tokio::test]
async fn test_stop_roundtrip() {
    let Some(repo) = connect().await else { return };

    assert!(repo.health_check().await.unwrap());
    let stop = repo
        .insert_stop(&Stop {
            name: Some("Central".into()),
            location: Location::new(12.9, 77.6),
            ..Default::default()
        })
        .await
        .unwrap();
    let id = stop.id.clone().unwrap();
    assert_eq!(id.as_str().len(), 24);

    let stops = repo.list_stops().await.unwrap();
    assert_eq!(stops, vec![stop]);

    assert!(repo.delete_stop(&id).await.unwrap());
    assert!(!repo.delete_stop(&id).await.unwrap());

    repo.drop_database().await.unwrap();
}

#[tokio::test]
async fn test_invalid_object_id_is_validation_error() {
    let Some(repo) = connect().await else { return };

    let err = repo.delete_stop(&StopId::new("nope")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    let err = repo.delete_bus(&BusId::new("nope")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    repo.drop_database().await.unwrap();
}

#[tokio::test]
async fn test_unknown_route_is_none() {
    let Some(repo) = connect().await else { return };

    let missing = RouteId::new("0123456789abcdef01234567");
    assert!(repo.get_route(&missing).await.unwrap().is_none());

    repo.drop_database().await.unwrap();
}

#[tokio::test]
async fn test_bus_location_first_match() {
    let Some(repo) = connect().await else { return };

    for _ in 0..2 {
        repo.insert_bus(&Bus {
            name: Some("Twin".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    }

    let updated = repo
        .update_bus_location("Twin", Location::new(1.0, 2.0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.location, Some(Location::new(1.0, 2.0)));

    let with_location = repo
        .list_buses()
        .await
        .unwrap()
        .into_iter()
        .filter(|b| b.location.is_some())
        .count();
    assert_eq!(with_location, 1);

    assert!(repo
        .update_bus_location("Ghost", Location::new(0.0, 0.0))
        .await
        .unwrap()
        .is_none());

    repo.drop_database().await.unwrap();
}

#[tokio::test]
async fn test_attach_search_and_refresh() {
    let Some(repo) = connect().await else { return };

    let route = services::add_route(
        &repo,
        Some("Line 1".into()),
        vec![Some("A".into()), Some("B".into()), Some("C".into())],
    )
    .await
    .unwrap();
    let route_id = route.id.clone().unwrap();

    let (bus, bus_route) = services::add_bus(&repo, Some("B1".into()), &route_id)
        .await
        .unwrap();
    assert!(bus.id.is_some());
    assert_eq!(bus_route.route_id.as_ref(), Some(&route_id));

    let found = services::search_buses(&repo, "C", "A").await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(services::search_buses(&repo, "A", "Z")
        .await
        .unwrap()
        .is_empty());

    let fetched = services::get_bus_by_name(&repo, "B1").await.unwrap();
    assert_eq!(fetched.id, bus.id);

    let refreshed = services::refresh_bus_route(&repo, "B1").await.unwrap();
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].route.stops.len(), 3);

    repo.drop_database().await.unwrap();
}
