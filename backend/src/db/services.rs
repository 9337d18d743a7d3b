//! High-level service layer.
//!
//! Repository-agnostic operations behind each HTTP endpoint. These functions
//! hold the little business logic there is: stripping route stops down to
//! names, snapshotting a route when a bus is attached, undoing a half-finished
//! attach, and refreshing snapshots from their source route.
//!
//! # Usage
//!
//! ```no_run
//! use bus_tracker::db::{services, repositories::LocalRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let stops = services::list_stops(&repo).await?;
//!     println!("Found {} stops", stops.len());
//!     Ok(())
//! }
//! ```

use tracing::{error, info, warn};

use super::repository::{ErrorContext, FullRepository, RepositoryError, RepositoryResult};
use crate::models::{
    Bus, BusId, BusRoute, Location, Route, RouteId, RouteSnapshot, RouteStop, Stop, StopId,
};

// ==================== Health & Connection ====================

/// Check if the store is reachable.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Stops ====================

/// Store a new stop at `location`.
#[tracing::instrument(skip(repo))]
pub async fn add_stop<R: FullRepository + ?Sized>(
    repo: &R,
    name: Option<String>,
    location: Location,
) -> RepositoryResult<Stop> {
    let stop = Stop {
        id: None,
        name,
        location,
    };
    repo.insert_stop(&stop).await
}

/// Delete a stop. Succeeds whether or not the stop existed.
#[tracing::instrument(skip(repo, id), fields(stop_id = %id))]
pub async fn delete_stop<R: FullRepository + ?Sized>(repo: &R, id: &StopId) -> RepositoryResult<()> {
    if !repo.delete_stop(id).await? {
        info!("No stop matched, nothing deleted");
    }
    Ok(())
}

pub async fn list_stops<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Stop>> {
    repo.list_stops().await
}

// ==================== Routes ====================

/// Store a new route. Only stop names are kept; any coordinates sent with the
/// stops are discarded.
#[tracing::instrument(skip(repo, stop_names), fields(stops = stop_names.len()))]
pub async fn add_route<R: FullRepository + ?Sized>(
    repo: &R,
    title: Option<String>,
    stop_names: Vec<Option<String>>,
) -> RepositoryResult<Route> {
    let route = Route {
        id: None,
        title,
        stops: stop_names
            .into_iter()
            .map(|name| RouteStop {
                name,
                location: None,
            })
            .collect(),
    };
    repo.insert_route(&route).await
}

pub async fn list_routes<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Route>> {
    repo.list_routes().await
}

// ==================== Buses ====================

/// Create a bus and attach it to a route by snapshotting the route.
///
/// # Returns
/// * `Ok((Bus, BusRoute))` - Both stored documents
/// * `Err(RepositoryError::NotFound)` - The route does not exist; nothing is written
/// * `Err(RepositoryError)` - A store failure. If the snapshot write fails, the
///   bus written just before is deleted again before returning.
#[tracing::instrument(skip(repo, route_id), fields(route_id = %route_id))]
pub async fn add_bus<R: FullRepository + ?Sized>(
    repo: &R,
    name: Option<String>,
    route_id: &RouteId,
) -> RepositoryResult<(Bus, BusRoute)> {
    let route = repo.get_route(route_id).await?.ok_or_else(|| {
        RepositoryError::not_found_with_context(
            "Route not found",
            ErrorContext::new("add_bus")
                .with_entity("route")
                .with_entity_id(route_id),
        )
    })?;

    let bus = repo
        .insert_bus(&Bus {
            id: None,
            name: name.clone(),
            location: None,
        })
        .await?;

    let snapshot = BusRoute::snapshot(name, &route);
    match repo.insert_bus_route(&snapshot).await {
        Ok(bus_route) => {
            info!(bus_id = ?bus.id, stops = bus_route.route.stops.len(), "Bus attached to route");
            Ok((bus, bus_route))
        }
        Err(e) => {
            warn!(error = %e, "Bus route write failed, removing bus");
            compensate_bus_insert(repo, &bus).await;
            Err(e)
        }
    }
}

async fn compensate_bus_insert<R: FullRepository + ?Sized>(repo: &R, bus: &Bus) {
    let Some(id) = bus.id.as_ref() else {
        return;
    };
    match repo.delete_bus(id).await {
        Ok(true) => info!(bus_id = %id, "Rolled back bus insert"),
        Ok(false) => warn!(bus_id = %id, "Bus to roll back was already gone"),
        Err(e) => error!(bus_id = %id, error = %e, "Failed to roll back bus insert"),
    }
}

/// Overwrite the location of the first bus named `name`.
///
/// Returns `Ok(None)` when no bus has that name.
#[tracing::instrument(skip(repo))]
pub async fn update_bus_location<R: FullRepository + ?Sized>(
    repo: &R,
    name: &str,
    location: Location,
) -> RepositoryResult<Option<Bus>> {
    let bus = repo.update_bus_location(name, location).await?;
    if bus.is_none() {
        info!("No bus matched, location not updated");
    }
    Ok(bus)
}

pub async fn list_buses<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Vec<Bus>> {
    repo.list_buses().await
}

/// Delete a bus. Succeeds whether or not the bus existed. Bus route
/// snapshots for the bus are left in place.
#[tracing::instrument(skip(repo, id), fields(bus_id = %id))]
pub async fn delete_bus<R: FullRepository + ?Sized>(repo: &R, id: &BusId) -> RepositoryResult<()> {
    if !repo.delete_bus(id).await? {
        info!("No bus matched, nothing deleted");
    }
    Ok(())
}

/// Fetch the bus named `name`.
///
/// # Returns
/// * `Err(RepositoryError::NotFound)` - No bus has this name
pub async fn get_bus_by_name<R: FullRepository + ?Sized>(repo: &R, name: &str) -> RepositoryResult<Bus> {
    repo.find_bus_by_name(name).await?.ok_or_else(|| {
        RepositoryError::not_found_with_context(
            "Bus not found",
            ErrorContext::new("get_bus_by_name")
                .with_entity("bus")
                .with_entity_id(name),
        )
    })
}

// ==================== Search ====================

/// Bus routes whose stops include both `from` and `to`, in either order.
#[tracing::instrument(skip(repo))]
pub async fn search_buses<R: FullRepository + ?Sized>(
    repo: &R,
    from: &str,
    to: &str,
) -> RepositoryResult<Vec<BusRoute>> {
    let names = [from.to_string(), to.to_string()];
    let matches = repo.find_bus_routes_with_stops(&names).await?;
    info!(matches = matches.len(), "Bus search finished");
    Ok(matches)
}

// ==================== Snapshot refresh ====================

/// Re-copy title and stops from the source route into every bus route of
/// `bus_name`.
///
/// # Returns
/// * `Ok(Vec<BusRoute>)` - The refreshed bus routes
/// * `Err(RepositoryError::NotFound)` - No bus route exists for the bus, or
///   none of them has a source route that still exists
#[tracing::instrument(skip(repo))]
pub async fn refresh_bus_route<R: FullRepository + ?Sized>(
    repo: &R,
    bus_name: &str,
) -> RepositoryResult<Vec<BusRoute>> {
    let bus_routes = repo.find_bus_routes_by_bus(bus_name).await?;
    if bus_routes.is_empty() {
        return Err(RepositoryError::not_found_with_context(
            "Bus route not found",
            ErrorContext::new("refresh_bus_route")
                .with_entity("bus_route")
                .with_entity_id(bus_name),
        ));
    }

    let mut refreshed = Vec::with_capacity(bus_routes.len());
    for bus_route in bus_routes {
        let (Some(id), Some(route_id)) = (bus_route.id.as_ref(), bus_route.route_id.as_ref())
        else {
            warn!(bus_route_id = ?bus_route.id, "Bus route has no source route, skipping");
            continue;
        };
        let Some(route) = repo.get_route(route_id).await? else {
            warn!(%route_id, "Source route no longer exists, skipping");
            continue;
        };
        if let Some(updated) = repo
            .replace_route_snapshot(id, &RouteSnapshot::of(&route))
            .await?
        {
            refreshed.push(updated);
        }
    }

    if refreshed.is_empty() {
        return Err(RepositoryError::not_found_with_context(
            "Source route not found",
            ErrorContext::new("refresh_bus_route")
                .with_entity("route")
                .with_entity_id(bus_name),
        ));
    }
    info!(count = refreshed.len(), "Bus route snapshots refreshed");
    Ok(refreshed)
}
